//! End-to-end checks of the inlet/outlet hooks over raw JSON bodies.

use promptprefix_core::{Filter, PrefixFilter, PromptPrefixError, RequestBody, UserInfo, Valves};
use serde_json::{json, Value};

fn last_user_content(body: &Value) -> &Value {
    body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .rev()
        .find(|m| m["role"] == "user")
        .map(|m| &m["content"])
        .unwrap()
}

#[test]
fn default_prefix_on_single_message() {
    let filter = PrefixFilter::new();
    let out = filter
        .inlet_json(
            json!({"messages": [{"role": "user", "content": "Write about autumn"}]}),
            None,
        )
        .unwrap();
    assert_eq!(
        out["messages"][0]["content"],
        "Crie um poema de uma estrofe de Write about autumn"
    );
}

#[test]
fn only_user_entry_changes() {
    let input = json!({
        "messages": [
            {"role": "system", "content": "x"},
            {"role": "user", "content": "Y"},
            {"role": "assistant", "content": "Z"}
        ]
    });
    let out = PrefixFilter::new().inlet_json(input.clone(), None).unwrap();
    assert_eq!(out["messages"][0], input["messages"][0]);
    assert_eq!(out["messages"][2], input["messages"][2]);
    assert_eq!(
        out["messages"][1]["content"],
        "Crie um poema de uma estrofe de Y"
    );
}

#[test]
fn empty_conversation_is_returned_unchanged() {
    let input = json!({"model": "llama3", "messages": []});
    let out = PrefixFilter::new().inlet_json(input.clone(), None).unwrap();
    assert_eq!(out, input);
}

#[test]
fn parts_content_is_flattened() {
    let input = json!({
        "messages": [{
            "role": "user",
            "content": [
                {"type": "image_url", "image_url": {"url": "https://example.com/leaf.png"}},
                {"type": "text", "text": "this leaf"}
            ]
        }]
    });
    let out = PrefixFilter::new().inlet_json(input, None).unwrap();
    assert_eq!(
        out["messages"][0]["content"],
        "Crie um poema de uma estrofe de this leaf"
    );
}

#[test]
fn parts_without_text_are_left_alone() {
    let input = json!({
        "messages": [{
            "role": "user",
            "content": [{"type": "image_url", "image_url": {"url": "https://example.com/a.png"}}]
        }]
    });
    let out = PrefixFilter::new().inlet_json(input.clone(), None).unwrap();
    assert_eq!(out, input);
}

#[test]
fn other_keys_and_message_fields_survive() {
    let input = json!({
        "model": "llama3",
        "stream": false,
        "metadata": {"chat_id": "c-1"},
        "messages": [
            {"role": "assistant", "content": "hi", "name": "bot"},
            {"role": "user", "content": "tell me", "id": "m-2"}
        ]
    });
    let out = PrefixFilter::with_valves(Valves::default().with_prefix("Q:"))
        .inlet_json(input.clone(), None)
        .unwrap();
    assert_eq!(out["model"], input["model"]);
    assert_eq!(out["stream"], input["stream"]);
    assert_eq!(out["metadata"], input["metadata"]);
    assert_eq!(out["messages"][0], input["messages"][0]);
    assert_eq!(out["messages"][1]["id"], "m-2");
    assert_eq!(out["messages"][1]["content"], "Q: tell me");
}

#[test]
fn inlet_is_not_idempotent() {
    let filter = PrefixFilter::with_valves(Valves::default().with_prefix("P"));
    let once = filter
        .inlet_json(json!({"messages": [{"role": "user", "content": "x"}]}), None)
        .unwrap();
    let twice = filter.inlet_json(once.clone(), None).unwrap();
    assert_eq!(last_user_content(&once), "P x");
    assert_eq!(last_user_content(&twice), "P P x");
    assert_ne!(once, twice);
}

#[test]
fn missing_role_is_an_error() {
    let err = PrefixFilter::new()
        .inlet_json(json!({"messages": [{"content": "no role"}]}), None)
        .unwrap_err();
    assert!(matches!(err, PromptPrefixError::InvalidBody(_)));
}

#[test]
fn missing_messages_is_an_error() {
    let err = PrefixFilter::new().inlet_json(json!({}), None).unwrap_err();
    assert!(err.to_string().contains("messages"));
}

#[test]
fn outlet_returns_body_untouched() {
    let filter = PrefixFilter::new();
    let user = UserInfo {
        id: Some("u-1".into()),
        ..Default::default()
    };
    let body = json!({
        "messages": [{"role": "assistant", "content": "Folhas caem"}],
        "usage": {"total_tokens": 12}
    });
    assert_eq!(filter.outlet(body.clone(), Some(&user)), body);
    assert_eq!(filter.outlet(json!({}), None), json!({}));
}

#[test]
fn typed_and_json_paths_agree() {
    let raw = json!({"messages": [
        {"role": "user", "content": "a"},
        {"role": "assistant", "content": "b"},
        {"role": "user", "content": "c"}
    ]});
    let filter = PrefixFilter::new();
    let typed =
        serde_json::to_value(filter.inlet(RequestBody::from_value(raw.clone()).unwrap(), None))
            .unwrap();
    assert_eq!(typed, filter.inlet_json(raw, None).unwrap());
}

#[test]
fn shared_filter_across_threads() {
    let filter = std::sync::Arc::new(PrefixFilter::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let filter = filter.clone();
            std::thread::spawn(move || {
                filter
                    .inlet_json(
                        json!({"messages": [{"role": "user", "content": format!("n{i}")}]}),
                        None,
                    )
                    .unwrap()
            })
        })
        .collect();
    for (i, h) in handles.into_iter().enumerate() {
        let out = h.join().unwrap();
        assert_eq!(
            out["messages"][0]["content"],
            format!("Crie um poema de uma estrofe de n{i}")
        );
    }
}
