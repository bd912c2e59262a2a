//! luaddon - manage Lua language server addons from the command line.
//!
//! Usage:
//!   luaddon list               List installed addons
//!   luaddon enable NAME        Add an addon to the workspace library
//!   luaddon disable NAME       Remove an addon from the workspace library
//!   luaddon uninstall NAME     Delete an installed addon
//!   luaddon updates            Compare installed addons with a catalog
//!   luaddon --help             Show help

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use luaddon_core::{AddonSnapshot, Lookup, ManagerConfig};
use luaddon_engine::{AddonContext, AddonManager, RemoteRegistry};

#[derive(Parser)]
#[command(
    name = "luaddon",
    version,
    about = "Manage Lua language server addons",
    long_about = "luaddon lists the addons installed for the Lua language server and \
                  toggles them in a workspace's library setting.\n\n\
                  Defaults are read from the user config file and can be overridden \
                  with the global flags below."
)]
struct Cli {
    /// Directory holding installed addons
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Workspace whose settings hold the enabled list
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// JSON catalog of published addons, used for update checks
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List installed addons
    List,

    /// Enable an addon in the workspace
    Enable {
        /// Addon name (its directory name)
        name: String,
    },

    /// Disable an addon in the workspace
    Disable {
        /// Addon name (its directory name)
        name: String,
    },

    /// Delete an installed addon
    Uninstall {
        /// Addon name (its directory name)
        name: String,

        /// Delete permanently instead of moving to the trash
        #[arg(long)]
        no_trash: bool,
    },

    /// Check installed addons against the catalog
    Updates,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let mut ctx = AddonContext::local(config);
    if let Some(catalog) = &cli.catalog {
        let registry = RemoteRegistry::load(catalog)
            .with_context(|| format!("Could not load catalog {}", catalog.display()))?;
        if registry.is_empty() {
            tracing::warn!("catalog {} lists no addons", catalog.display());
        } else {
            tracing::debug!("loaded {} catalog entries from {}", registry.len(), catalog.display());
        }
        ctx = ctx.with_registry(registry);
    }

    let mut manager = AddonManager::new(Arc::new(ctx));
    let found = manager.scan().await.context("Could not scan addons")?;
    tracing::debug!(
        "found {found} addon(s) in {}",
        manager.context().config().install_root.display()
    );

    match cli.command {
        Command::List => run_list(&manager, cli.format).await?,
        Command::Enable { name } => run_toggle(&manager, &name, true, cli.format).await?,
        Command::Disable { name } => run_toggle(&manager, &name, false, cli.format).await?,
        Command::Uninstall { name, .. } => run_uninstall(&mut manager, &name).await?,
        Command::Updates => {
            if cli.catalog.is_none() {
                bail!("`updates` needs a catalog, pass one with --catalog");
            }
            run_updates(&manager, cli.format).await?;
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("luaddon=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file and apply command line overrides.
fn build_config(cli: &Cli) -> Result<ManagerConfig> {
    let mut config = match &cli.config {
        Some(path) => ManagerConfig::load(path)?,
        None => ManagerConfig::load_or_default()?,
    };

    if let Some(root) = &cli.root {
        config.install_root = root.clone();
    }
    if let Some(workspace) = &cli.workspace {
        let workspace = workspace.canonicalize().context("Invalid workspace path")?;
        config.workspace = Some(workspace);
    }
    if let Command::Uninstall { no_trash: true, .. } = cli.command {
        config.use_trash = false;
    }

    Ok(config)
}

async fn run_list(manager: &AddonManager, format: OutputFormat) -> Result<()> {
    if manager.is_empty() && matches!(format, OutputFormat::Text) {
        println!(
            "No addons installed in {}",
            manager.context().config().install_root.display()
        );
        return Ok(());
    }

    let snapshots = manager.snapshot_all().await?;

    match format {
        OutputFormat::Text => {

            println!(
                "{:<3} {:<24} {:<28} {:>10} {:<17} {}",
                "", "NAME", "DISPLAY NAME", "SIZE", "INSTALLED", "NOTES"
            );
            for snapshot in &snapshots {
                print_snapshot(snapshot);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&snapshots)?);
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &AddonSnapshot) {
    let marker = if snapshot.enabled { "[x]" } else { "[ ]" };
    let size = snapshot
        .size
        .clone()
        .map(format_size)
        .value()
        .unwrap_or_else(|| "?".to_string());
    let installed = snapshot
        .install_timestamp
        .clone()
        .map(format_timestamp)
        .value()
        .unwrap_or_else(|| "unknown".to_string());

    let mut notes = Vec::new();
    if snapshot.has_plugin == Lookup::Computed(true) {
        notes.push("plugin");
    }
    if snapshot.has_update == Lookup::Computed(true) {
        notes.push("update available");
    }

    println!(
        "{} {:<24} {:<28} {:>10} {:<17} {}",
        marker,
        truncate(&snapshot.name, 24),
        truncate(&snapshot.display_name, 28),
        size,
        installed,
        notes.join(", ")
    );
}

async fn run_toggle(
    manager: &AddonManager,
    name: &str,
    state: bool,
    format: OutputFormat,
) -> Result<()> {
    let outcome = manager.set_enabled(name, state).await?;
    let setting = manager.context().config().setting_name();

    match format {
        OutputFormat::Text => {
            if outcome.changed() {
                eprintln!("{name}: {outcome} in {setting}");
            } else {
                eprintln!("{name}: nothing to do ({outcome})");
            }
        }
        OutputFormat::Json => {
            let value = serde_json::json!({ "name": name, "outcome": outcome.to_string() });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

async fn run_uninstall(manager: &mut AddonManager, name: &str) -> Result<()> {
    let use_trash = manager.context().config().use_trash;
    manager
        .uninstall(name)
        .await
        .with_context(|| format!("Could not uninstall {name}"))?;

    if use_trash {
        eprintln!("Moved {name} to the trash");
    } else {
        eprintln!("Deleted {name}");
    }
    Ok(())
}

async fn run_updates(manager: &AddonManager, format: OutputFormat) -> Result<()> {
    let updates = manager.check_updates().await;

    match format {
        OutputFormat::Text => {
            let mut available = 0;
            for (name, state) in &updates {
                let status = match state {
                    Lookup::Computed(true) => {
                        available += 1;
                        "update available".to_string()
                    }
                    Lookup::Computed(false) => "up to date".to_string(),
                    Lookup::NotFound => "not in catalog".to_string(),
                    Lookup::FetchFailed(reason) => format!("check failed: {reason}"),
                };
                println!("{:<24} {}", truncate(name, 24), status);
            }
            println!();
            println!("{} of {} addon(s) can be updated", available, updates.len());
        }
        OutputFormat::Json => {
            let map: BTreeMap<String, Lookup<bool>> = updates.into_iter().collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
    }

    Ok(())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Format unix milliseconds as local time.
fn format_timestamp(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(time) => time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => "invalid".to_string(),
    }
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-addon-name", 8), "a-very-…");
    }

    #[test]
    fn test_format_timestamp_rejects_out_of_range() {
        assert_eq!(format_timestamp(i64::MAX), "invalid");
        assert_ne!(format_timestamp(1_700_000_000_000), "invalid");
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "luaddon",
            "uninstall",
            "love2d",
            "--no-trash",
            "--root",
            "/tmp/addons",
            "--format",
            "json",
        ])
        .unwrap();

        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/addons")));
        assert!(matches!(
            cli.command,
            Command::Uninstall { ref name, no_trash: true } if name == "love2d"
        ));
    }
}
