//! # HK News Digest
//!
//! Collects the latest headlines from a handful of Hong Kong tech and travel
//! sites, both HTML listing pages and RSS/Atom feeds, filters them per
//! source, removes duplicates across sources and writes one digest.
//!
//! ## Usage
//!
//! ```sh
//! hk_news_digest -j news.json -s news_summary.txt
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Configuration**: Build and validate the source set (fatal on error)
//! 2. **Fetching**: Retrieve each source with retries and fallback (3 at a time)
//! 3. **Extraction**: Pull candidate headlines from HTML or feed content and filter them
//! 4. **Merging**: Concatenate per-source results and drop duplicate links
//! 5. **Output**: Write the JSON digest and a text summary

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod fetch;
mod filter;
mod models;
mod orchestrator;
mod outputs;
mod scrapers;
#[cfg(test)]
mod testutil;
mod urls;
mod utils;

use cli::Cli;
use fetch::HttpConnector;
use models::Digest;
use orchestrator::Orchestrator;
use outputs::{json, summary};
use utils::timestamp_now;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("hk_news_digest starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // Configuration problems abort before any network activity.
    let sources = match config::load_sources(args.sources.as_deref()) {
        Ok(sources) => sources,
        Err(e) => {
            error!(error = %e, "Invalid source configuration");
            return Err(e.into());
        }
    };

    // ---- Scrape all sources ----
    let orchestrator = Orchestrator::new(HttpConnector::default()).with_merge_order(args.merge_order);
    let articles = orchestrator.run_all(&sources).await;

    let digest = Digest::new(articles, timestamp_now());
    info!(
        total_count = digest.total_count,
        sources = ?digest.sources,
        "Digest assembled"
    );

    // ---- Outputs ----
    if let Err(e) = json::write_digest(&digest, &args.json_output).await {
        error!(path = %args.json_output, error = %e, "Failed to write JSON digest");
        return Err(e.into());
    }
    if let Err(e) = summary::write_summary(&digest, &args.summary_output).await {
        error!(path = %args.summary_output, error = %e, "Failed to write text summary");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        articles = digest.total_count,
        "Execution complete"
    );

    Ok(())
}
