//! Concurrent fan-out over all sources and cross-source deduplication.
//!
//! At most [`MAX_CONCURRENT_SOURCES`] sources are in flight at once; the
//! rest wait their turn. All sources run to completion before results are
//! merged, and the merged list keeps the first article seen for each link.

use crate::config::{MAX_CONCURRENT_SOURCES, SourceSet};
use crate::fetch::{Connector, RetryPolicy};
use crate::models::Article;
use crate::scrapers::scrape_source;
use clap::ValueEnum;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::time::Instant;
use tracing::{info, instrument};

/// How per-source results are concatenated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MergeOrder {
    /// Source declaration order, independent of timing. Reproducible.
    #[default]
    Config,
    /// Whichever source finishes first comes first.
    Completion,
}

/// Runs every source of a [`SourceSet`] and merges the results.
#[derive(Debug, Clone)]
pub struct Orchestrator<C> {
    connector: C,
    policy: RetryPolicy,
    max_concurrent: usize,
    merge_order: MergeOrder,
}

impl<C: Connector> Orchestrator<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            policy: RetryPolicy::default(),
            max_concurrent: MAX_CONCURRENT_SOURCES,
            merge_order: MergeOrder::default(),
        }
    }

    #[cfg(test)]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_merge_order(mut self, merge_order: MergeOrder) -> Self {
        self.merge_order = merge_order;
        self
    }

    /// Scrape all sources and return the merged, de-duplicated articles.
    ///
    /// Sources run on a pool of `max_concurrent` slots; a slot is handed to
    /// the next queued source as soon as its current source finishes.
    /// Merging waits for every source.
    ///
    /// # Arguments
    ///
    /// * `sources` - The validated source set to scrape
    ///
    /// # Returns
    ///
    /// All articles concatenated per the [`MergeOrder`], keeping the first
    /// article for each link. Failed sources contribute nothing.
    #[instrument(level = "info", skip_all, fields(sources = sources.len(), merge_order = ?self.merge_order))]
    pub async fn run_all(&self, sources: &SourceSet) -> Vec<Article> {
        let t0 = Instant::now();
        let mut per_source: Vec<(usize, Vec<Article>)> = stream::iter(sources.iter().enumerate())
            .map(|(index, source)| async move {
                (index, scrape_source(&self.connector, &self.policy, source).await)
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        if self.merge_order == MergeOrder::Config {
            per_source.sort_by_key(|(index, _)| *index);
        }
        let per_source: Vec<Vec<Article>> = per_source.into_iter().map(|(_, articles)| articles).collect();

        let scraped: usize = per_source.iter().map(Vec::len).sum();
        let articles = dedup_by_link(per_source.into_iter().flatten());
        info!(
            scraped,
            unique = articles.len(),
            duplicates = scraped - articles.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "All sources finished"
        );
        articles
    }
}

/// Keep the first article for each link, preserving order.
pub fn dedup_by_link(articles: impl IntoIterator<Item = Article>) -> Vec<Article> {
    articles
        .into_iter()
        .unique_by(|article| article.link.clone())
        .collect()
}
