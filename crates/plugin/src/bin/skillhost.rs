//! skillhost: runs the skills plugin against a cluster from the command line.
//!
//! Subcommands:
//! - `capabilities`: list registered capabilities and their state
//! - `pools`: show the worker pools the plugin provisions
//! - `run`: execute one capability and print its output

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::info;

use skillhost_capability::Params;
use skillhost_core::{load_dotenv, Settings};
use skillhost_plugin::{bootstrap, standalone_handles, SkillsPlugin};

// ── CLI ─────────────────────────────────────────────────────────────

/// Skills plugin host.
#[derive(Parser, Debug)]
#[command(name = "skillhost", version, about)]
struct Cli {
    /// Path to a TOML settings file.
    #[arg(long, env = "SKILLS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every capability descriptor as JSON.
    Capabilities,
    /// Print the resolved worker-pool specs and their load.
    Pools,
    /// Run one capability.
    Run {
        /// Capability name, e.g. `PPLTool`.
        name: String,

        /// Create-time parameters as a JSON object.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Run input as JSON.
        #[arg(long, default_value = "{}")]
        input: String,
    },
}

fn parse_params(raw: &str) -> Result<Params> {
    match serde_json::from_str::<Value>(raw).context("--params is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("--params must be a JSON object, got {other}"),
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let cli = Cli::parse();

    let settings =
        Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    settings.log_summary();

    let handles = standalone_handles(&settings).context("failed to build host handles")?;
    let plugin = SkillsPlugin::new(settings);
    let started = bootstrap(&plugin, Handle::current(), handles)
        .context("skills plugin failed to start")?;
    info!(capabilities = started.registry.len(), "skills plugin ready");

    let output = match cli.command {
        Command::Capabilities => serde_json::to_value(started.registry.descriptors())?,
        Command::Pools => serde_json::json!({
            "specs": started.specs,
            "stats": started.executors.stats(),
        }),
        Command::Run {
            name,
            params,
            input,
        } => {
            let params = parse_params(&params)?;
            let input: Value =
                serde_json::from_str(&input).context("--input is not valid JSON")?;
            let capability = started
                .registry
                .create(&name, params)
                .with_context(|| format!("failed to create capability '{name}'"))?;
            let out = capability
                .run(input)
                .await
                .with_context(|| format!("capability '{name}' failed"))?;
            serde_json::to_value(out)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    started.executors.shutdown();
    Ok(())
}
