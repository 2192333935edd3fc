//! One-shot notice commands
//!
//! Runs the same fetch, parse and diagnostics steps as the API without a
//! server. Output is JSON on stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use notices::pipeline::diagnose::DEFAULT_SNIPPET_CHARS;
use notices::types::config::DEFAULT_BASE_URL;
use notices::{
    ingest_into, parse_notices, run_probe, NoticeFetcher, PersistOutcome, PortalFetcher,
    ProbeMethods, ProbeOptions,
};
use serde::Serialize;
use server_core::config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser)]
#[command(name = "notices_cli")]
#[command(about = "Fetch, parse and diagnose portal notices")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a saved HTML fragment
    Parse {
        file: PathBuf,
        /// Base URL for relative download links
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,
    },

    /// Fetch notices from the portal
    Fetch {
        /// Record the notices in SQLite
        #[arg(long)]
        persist: bool,
        /// Database file (defaults to DB_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Diagnose what the portal returns
    Probe {
        /// get, post or both
        #[arg(long, default_value = "both")]
        method: String,
        #[arg(long, default_value_t = DEFAULT_SNIPPET_CHARS)]
        snippet_chars: usize,
    },
}

#[derive(Serialize)]
struct FetchOutput<'a> {
    notices_count: usize,
    notices: &'a [notices::Notice],
    persist: &'a PersistOutcome,
}

fn output<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn portal_fetcher(config: &Config) -> Result<PortalFetcher> {
    let fetcher = PortalFetcher::new(config.portal_config()).context("Invalid portal configuration")?;
    if !fetcher.has_cookie() {
        bail!("COOKIE must be set");
    }
    Ok(fetcher)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,notices=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { file, base_url } => {
            let html = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let base = Url::parse(&base_url).context("Invalid --base-url")?;

            output(&parse_notices(&html, &base))?;
        }

        Commands::Fetch { persist, db } => {
            let config = Config::from_env().context("Failed to load configuration")?;
            let fetcher = portal_fetcher(&config)?;

            let db_path = db.unwrap_or_else(|| config.db_path.clone());
            let outcome = ingest_into(&fetcher, persist.then_some(db_path.as_path()))
                .await
                .context("Failed to fetch notices")?;

            output(&FetchOutput {
                notices_count: outcome.notices.len(),
                notices: &outcome.notices,
                persist: &outcome.persist,
            })?;
        }

        Commands::Probe {
            method,
            snippet_chars,
        } => {
            let config = Config::from_env().context("Failed to load configuration")?;
            let fetcher = portal_fetcher(&config)?;

            let options = ProbeOptions {
                methods: ProbeMethods::from_param(&method),
                snippet_chars,
            };
            output(&run_probe(&fetcher, options).await)?;
        }
    }

    Ok(())
}
