use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use promptprefix_core::{UserInfo, Valves};

use crate::host::Hook;

#[derive(Debug, Parser)]
#[command(
    name = "promptprefix",
    about = "Prefix the last user message of chat request bodies"
)]
pub struct CliConfig {
    /// Prefix placed in front of the last user message
    #[arg(long, env = "PROMPTPREFIX_PREFIX", global = true)]
    pub prefix: Option<String>,

    /// JSON file holding the filter valves.
    /// `--prefix` takes precedence over the file.
    #[arg(long, env = "PROMPTPREFIX_VALVES", global = true)]
    pub valves: Option<PathBuf>,

    /// Caller identity as a JSON object, forwarded to the hook
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Read from this file instead of stdin
    #[arg(long, global = true)]
    pub input: Option<PathBuf>,

    /// Treat input as newline-delimited JSON, one body per line
    #[arg(long, global = true)]
    pub lines: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Rewrite request bodies before they reach the model
    Inlet,
    /// Pass response bodies through unchanged
    Outlet,
    /// Print the effective valves
    Valves,
}

impl Command {
    pub fn hook(self) -> Option<Hook> {
        match self {
            Command::Inlet => Some(Hook::Inlet),
            Command::Outlet => Some(Hook::Outlet),
            Command::Valves => None,
        }
    }
}

impl CliConfig {
    /// Defaults, overlaid by the valves file, overlaid by `--prefix`.
    pub fn load_valves(&self) -> Result<Valves> {
        let mut valves = match &self.valves {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read valves: {}", path.display()))?;
                Valves::from_json(&raw)
                    .with_context(|| format!("failed to parse valves: {}", path.display()))?
            }
            None => Valves::default(),
        };
        if let Some(prefix) = &self.prefix {
            valves = valves.with_prefix(prefix.clone());
        }
        Ok(valves)
    }

    pub fn parse_user(&self) -> Result<Option<UserInfo>> {
        self.user
            .as_deref()
            .map(|raw| serde_json::from_str(raw).context("failed to parse --user"))
            .transpose()
    }
}
