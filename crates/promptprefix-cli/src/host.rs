use std::io::{BufRead, Read, Write};

use anyhow::{Context, Result};
use promptprefix_core::{PrefixFilter, PromptPrefixError, UserInfo};
use serde_json::value::RawValue;
use serde_json::{json, Value};
use tracing::{debug, error, info};

/// Which side of the downstream call a body is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Inlet,
    Outlet,
}

impl Hook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hook::Inlet => "inlet",
            Hook::Outlet => "outlet",
        }
    }
}

/// Counts from a newline-delimited run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub processed: usize,
    pub failed: usize,
}

/// Run one body through `hook` and return the JSON text to emit.
pub fn apply(
    filter: &PrefixFilter,
    hook: Hook,
    body: &RawValue,
    user: Option<&UserInfo>,
) -> Result<String, PromptPrefixError> {
    match hook {
        Hook::Inlet => {
            let body: Value = serde_json::from_str(body.get())?;
            Ok(serde_json::to_string(&filter.inlet_json(body, user)?)?)
        }
        Hook::Outlet => Ok(filter.outlet_raw(body, user).get().to_string()),
    }
}

/// Run a single JSON document through `hook` and write it back out.
pub fn run_document<R: Read, W: Write>(
    filter: &PrefixFilter,
    hook: Hook,
    user: Option<&UserInfo>,
    mut reader: R,
    mut writer: W,
) -> Result<()> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .context("failed to read input")?;
    let body: &RawValue = serde_json::from_str(&raw).context("input is not valid JSON")?;

    let out = apply(filter, hook, body, user)
        .with_context(|| format!("{} failed", hook.as_str()))?;

    writeln!(writer, "{out}")?;
    writer.flush()?;
    Ok(())
}

/// Run every non-blank line through `hook`.
///
/// A line that cannot be processed yields `{"error": "..."}` in its place
/// so output lines stay aligned with input lines.
pub fn run_lines<R: BufRead, W: Write>(
    filter: &PrefixFilter,
    hook: Hook,
    user: Option<&UserInfo>,
    reader: R,
    mut writer: W,
) -> Result<LineStats> {
    let mut stats = LineStats::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.context("failed to read input")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let result = serde_json::from_str::<&RawValue>(trimmed)
            .map_err(PromptPrefixError::from)
            .and_then(|body| apply(filter, hook, body, user));

        let out = match result {
            Ok(v) => {
                stats.processed += 1;
                v
            }
            Err(e) => {
                error!(line = idx + 1, "{} failed: {e}", hook.as_str());
                stats.failed += 1;
                json!({ "error": e.to_string() }).to_string()
            }
        };

        writeln!(writer, "{out}")?;
        debug!(line = idx + 1, hook = hook.as_str(), "line written");
    }

    writer.flush()?;
    info!(
        processed = stats.processed,
        failed = stats.failed,
        "{} finished",
        hook.as_str()
    );
    Ok(stats)
}
