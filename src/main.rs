//! # Digest Viewer CLI (`dv`)
//!
//! Browse a monthly CSV digest selected through a manifest: list months,
//! inspect tag indexes, filter records, explore interactively, or serve the
//! card page over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! dv --config ./config/dv.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dv months` | List months in the manifest |
//! | `dv tags` | Show the platform and topic tag indexes of a month |
//! | `dv search "<query>"` | Filter records by text and tags |
//! | `dv browse` | Interactive filtering session |
//! | `dv serve` | Start the HTTP viewer |
//!
//! ## Examples
//!
//! ```bash
//! # Everything in the default month
//! dv search
//!
//! # PC or PS5 entries in February mentioning "remake"
//! dv search remake --month 2024-02 --platform PC --platform PS5
//!
//! # Write a standalone page
//! dv search --format html > digest.html
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;

use digest_viewer::{browse, config, logging, months, search, server};

const DEFAULT_CONFIG: &str = "./config/dv.toml";

/// Digest Viewer — browse, search and filter monthly CSV digests.
///
/// Data location and server address come from a TOML configuration file.
/// Without `--config`, `./config/dv.toml` is used if present; otherwise
/// the manifest is read from `./data/manifest.json`.
#[derive(Parser)]
#[command(
    name = "dv",
    about = "Digest Viewer — browse, search and filter monthly CSV digests",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List the months available in the manifest.
    Months,

    /// Show the distinct tags of a month.
    Tags {
        /// Month label; defaults to the manifest's default month.
        #[arg(long)]
        month: Option<String>,

        /// Only this tag field: `platform` or `topic`.
        #[arg(long)]
        field: Option<String>,
    },

    /// Filter the records of a month.
    ///
    /// The query matches name, origin, background and impact,
    /// case-insensitively. Repeated `--platform` / `--topic` flags match
    /// records carrying any of the given tags.
    Search {
        /// Free-text query.
        query: Option<String>,

        /// Month label; defaults to the manifest's default month.
        #[arg(long)]
        month: Option<String>,

        /// Active platform chip (repeatable).
        #[arg(long = "platform")]
        platforms: Vec<String>,

        /// Active topic chip (repeatable).
        #[arg(long = "topic")]
        topics: Vec<String>,

        /// Output format: `text`, `json`, or `html` (a complete page).
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Start an interactive filtering session on stdin/stdout.
    Browse {
        /// Month to open first; defaults to the manifest's default month.
        #[arg(long)]
        month: Option<String>,
    },

    /// Start the HTTP viewer.
    ///
    /// Binds to `[server].bind` and serves the card page plus a JSON API.
    Serve,
}

fn resolve_config(path: Option<&Path>) -> anyhow::Result<config::Config> {
    match path {
        Some(path) => config::load_config(path),
        None if Path::new(DEFAULT_CONFIG).exists() => config::load_config(Path::new(DEFAULT_CONFIG)),
        None => {
            tracing::debug!("no config file found, using defaults");
            Ok(config::Config::minimal())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.command {
        Commands::Serve | Commands::Browse { .. } => Level::INFO,
        _ => Level::WARN,
    };
    logging::init(level);

    let cfg = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Months => {
            months::run_months(&cfg).await?;
        }
        Commands::Tags { month, field } => {
            search::run_tags(&cfg, month, field).await?;
        }
        Commands::Search {
            query,
            month,
            platforms,
            topics,
            format,
        } => {
            search::run_search(&cfg, query, month, platforms, topics, &format).await?;
        }
        Commands::Browse { month } => {
            browse::run_browse(&cfg, month).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
