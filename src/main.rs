//! dumpthread main entry point
//!
//! This is the command-line interface for saving a Nostr thread to disk.

use anyhow::Context;
use clap::{Parser, Subcommand};
use dumpthread::config::{load_config, validate, Config};
use dumpthread::crawler::crawl;
use dumpthread::output::print_report;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// dumpthread: save a Nostr thread to the local filesystem
///
/// Fetches a note and every note replying to it from the given relays, then
/// follows the relay hints found in those notes to discover more of the thread.
#[derive(Parser, Debug)]
#[command(name = "dumpthread")]
#[command(version)]
#[command(about = "save a nostr thread to local filesystem", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save a thread on the filesystem
    #[command(visible_alias = "s")]
    Save {
        /// The path where the JSON events are saved
        #[arg(short, long, value_name = "DIR")]
        outdir: Option<PathBuf>,

        /// The event ID (note1… or nevent1…) of the first event of the thread
        #[arg(short, long, value_name = "ID")]
        eventid: String,

        /// The relays to use (can be used multiple times)
        #[arg(short, long, value_name = "URL")]
        relay: Vec<String>,

        /// Optional TOML configuration file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Save {
            outdir,
            eventid,
            relay,
            config,
        } => {
            let config = build_config(config, outdir, relay)?;
            handle_save(config, &eventid, cli.quiet).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dumpthread=info,warn"),
            1 => EnvFilter::new("dumpthread=debug,info"),
            2 => EnvFilter::new("dumpthread=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Merges the optional config file with command-line flags
///
/// Relays given on the command line come first; relays from the file follow.
fn build_config(
    path: Option<PathBuf>,
    outdir: Option<PathBuf>,
    relays: Vec<String>,
) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(&path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(outdir) = outdir {
        config.output.directory = outdir;
    }

    let file_relays = std::mem::take(&mut config.relays);
    config.relays = relays.into_iter().chain(file_relays).collect();

    validate(&config)?;

    if config.relays.is_empty() {
        anyhow::bail!("at least one relay is required (use --relay or the config file)");
    }

    Ok(config)
}

/// Handles the save command
async fn handle_save(config: Config, eventid: &str, quiet: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Saving thread to {} using {} seed relay(s)",
        config.output.directory.display(),
        config.relays.len()
    );

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, finishing pending writes");
                cancel.cancel();
            }
        });
    }

    match crawl(&config, eventid, cancel).await {
        Ok(report) => {
            if !quiet {
                print_report(&report);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
