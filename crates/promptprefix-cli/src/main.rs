use std::fs::File;
use std::io::{self, BufReader};

use anyhow::{Context, Result};
use clap::Parser;
use promptprefix_cli::config::CliConfig;
use promptprefix_cli::host;
use promptprefix_core::{Filter, PrefixFilter};
use tracing::info;

fn main() -> Result<()> {
    // stdout carries JSON; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "promptprefix_cli=info,promptprefix_core=info".parse().unwrap()
            }),
        )
        .with_writer(io::stderr)
        .init();

    let config = CliConfig::parse();
    let filter = PrefixFilter::with_valves(config.load_valves()?);
    let user = config.parse_user()?;

    let Some(hook) = config.command.hook() else {
        println!("{}", serde_json::to_string_pretty(filter.valves())?);
        return Ok(());
    };

    info!("{} {} (lines={})", filter.name(), hook.as_str(), config.lines);

    let stdout = io::stdout();
    let writer = stdout.lock();

    match (&config.input, config.lines) {
        (Some(path), true) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input: {}", path.display()))?;
            host::run_lines(&filter, hook, user.as_ref(), BufReader::new(file), writer)?;
        }
        (Some(path), false) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input: {}", path.display()))?;
            host::run_document(&filter, hook, user.as_ref(), file, writer)?;
        }
        (None, true) => {
            host::run_lines(&filter, hook, user.as_ref(), io::stdin().lock(), writer)?;
        }
        (None, false) => {
            host::run_document(&filter, hook, user.as_ref(), io::stdin().lock(), writer)?;
        }
    }

    Ok(())
}
