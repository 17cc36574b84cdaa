//! Per-source scraping.
//!
//! Each configured source is scraped in three steps:
//!
//! 1. **Session**: open a transport session scoped to this invocation
//! 2. **Fetching**: primary URL, then fallback URL, under the retry policy
//! 3. **Extraction**: [`html`] for listing pages, [`feed`] for RSS/Atom
//!
//! | Kind | Module | Filtering |
//! |------|--------|-----------|
//! | HTML listing page | [`html`] | article filter, per-call link dedup |
//! | RSS / Atom feed | [`feed`] | optional keyword content filter |
//!
//! Every failure inside [`scrape_source`] is logged and turned into an
//! empty result, so one broken source never affects the others. The
//! session is released before the result is returned, on every path.

pub mod feed;
pub mod html;

use crate::config::{Extraction, SourceConfig};
use crate::error::ExtractError;
use crate::fetch::{Connector, Fetched, RetryPolicy};
use crate::models::Article;
use crate::utils::truncate_for_log;
use std::time::Instant;
use tracing::{error, info, instrument};

/// Scrape one source. Never fails; problems yield an empty list.
///
/// # Arguments
///
/// * `connector` - Opens the session used for this invocation only
/// * `policy` - Attempt budget for the primary and fallback URLs
/// * `source` - The source to scrape
///
/// # Returns
///
/// Up to [`MAX_NEWS_PER_SOURCE`](crate::config::MAX_NEWS_PER_SOURCE)
/// articles. Empty when the session can't be opened, no URL yields content,
/// or the content can't be extracted.
#[instrument(level = "info", skip_all, fields(source = %source.id))]
pub async fn scrape_source<C: Connector>(
    connector: &C,
    policy: &RetryPolicy,
    source: &SourceConfig,
) -> Vec<Article> {
    let t0 = Instant::now();
    info!(name = %source.source_name, url = %source.fetch_url, "Scraping source");

    let session = match connector.open(source) {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "Could not open session");
            return Vec::new();
        }
    };
    let fetched = policy.fetch_source(&session, source).await;
    drop(session);

    let content = match fetched {
        Fetched::Content(content) => content,
        Fetched::Unavailable => {
            error!(
                name = %source.source_name,
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "No content could be fetched"
            );
            return Vec::new();
        }
    };

    match extract(&content, source) {
        Ok(articles) => {
            info!(
                name = %source.source_name,
                count = articles.len(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Scraped source"
            );
            articles
        }
        Err(e) => {
            error!(
                error = %e,
                preview = %truncate_for_log(&content, 200),
                "Content could not be extracted"
            );
            Vec::new()
        }
    }
}

/// Route fetched content to the extractor for the source's kind.
pub fn extract(content: &str, source: &SourceConfig) -> Result<Vec<Article>, ExtractError> {
    match &source.extraction {
        Extraction::Html { selection } => html::extract_articles(content, selection, source),
        Extraction::Feed { .. } => feed::extract_articles(content, source),
    }
}
