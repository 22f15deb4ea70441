//! respak: inspect resource packs and resolve resources.
//!
//! ```bash
//! respak packs
//! respak ls base assets/respak -r --filter '*.json'
//! respak cat base assets/respak/lang/en_us.json
//! respak lang en_us menu.title
//! ```
//!
//! Logging goes to stderr and respects `RUST_LOG`.

mod commands;
mod config;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Parser)]
#[command(name = "respak", version, about = "Inspect resource packs and resolve resources")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding resource packs, overriding the configuration
    #[arg(long, global = true)]
    packs_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List discovered packs with their versions
    Packs,
    /// List a directory inside a pack
    Ls {
        /// Pack name from its descriptor
        pack: String,
        /// Directory relative to the pack root
        #[arg(default_value = "")]
        path: String,
        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
        /// Only files matching these globs, `|`-separated (e.g. `*.png|*.json`)
        #[arg(long)]
        filter: Option<String>,
    },
    /// Print a file from a pack
    Cat {
        pack: String,
        path: String,
    },
    /// Look up a language file, or one key in it
    Lang {
        /// Language identifier such as `en_us` or `mymod:de_de`
        id: String,
        key: Option<String>,
    },
}

/// Log levels used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "respak=info,respak_kernel=info";

/// `RUST_LOG`, when set, replaces the defaults entirely.
fn log_filter(rust_log: Option<String>) -> EnvFilter {
    EnvFilter::new(rust_log.as_deref().unwrap_or(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .init();

    let cli = Cli::parse();
    let mut config = config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(dir) = cli.packs_dir {
        config.packs_dir = dir;
    }
    tracing::debug!(packs_dir = %config.packs_dir.display(), "configuration loaded");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Packs => commands::packs(&config, &mut out).await?,
        Command::Ls {
            pack,
            path,
            recursive,
            filter,
        } => commands::ls(&config, &pack, &path, recursive, filter.as_deref(), &mut out).await?,
        Command::Cat { pack, path } => commands::cat(&config, &pack, &path, &mut out).await?,
        Command::Lang { id, key } => commands::lang(&config, &id, key.as_deref(), &mut out).await?,
    }
    out.flush()?;
    Ok(())
}
