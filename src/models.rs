//! Data models for extracted articles and the digest handed to the outputs.
//!
//! - [`Article`]: one accepted headline from one source
//! - [`Digest`]: the de-duplicated run result plus run metadata
//!
//! Field names are serialized exactly as downstream consumers of
//! `news.json` expect them (`update_time`, `total_count`, `news`, ...).

use crate::config::SourceConfig;
use crate::utils::timestamp_now;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A headline accepted from a source.
///
/// Built only by the extractors, so `link` is always an absolute URL and
/// `title` is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    /// Display name of the originating source.
    pub source: String,
    pub category: String,
    /// Extraction time, `YYYY-MM-DD HH:MM:SS` in UTC+8.
    pub scraped_at: String,
}

impl Article {
    /// Build an article stamped with the current UTC+8 time.
    pub fn new(title: impl Into<String>, link: impl Into<String>, config: &SourceConfig) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            source: config.source_name.clone(),
            category: config.category.clone(),
            scraped_at: timestamp_now(),
        }
    }
}

/// The result of one run, in the shape written to `news.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Digest {
    /// Run time, `YYYY-MM-DD HH:MM:SS` in UTC+8.
    pub update_time: String,
    pub total_count: usize,
    /// Distinct source names present in `news`, sorted.
    pub sources: Vec<String>,
    /// Distinct categories present in `news`, sorted.
    pub categories: Vec<String>,
    pub news: Vec<Article>,
}

impl Digest {
    pub fn new(news: Vec<Article>, update_time: impl Into<String>) -> Self {
        let sources: BTreeSet<&str> = news.iter().map(|a| a.source.as_str()).collect();
        let categories: BTreeSet<&str> = news.iter().map(|a| a.category.as_str()).collect();
        Self {
            update_time: update_time.into(),
            total_count: news.len(),
            sources: sources.into_iter().map(String::from).collect(),
            categories: categories.into_iter().map(String::from).collect(),
            news,
        }
    }
}
