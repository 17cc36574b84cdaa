//! Error taxonomy for the ingestion pipeline.
//!
//! Only [`ConfigError`] is allowed to abort a run. Transport and content
//! failures are contained at the source scraper boundary and turned into an
//! empty contribution for that source.

use thiserror::Error;

/// Invalid source configuration, detected at startup before any network work.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("source set is empty")]
    NoSources,

    #[error("source #{index} has an empty id")]
    EmptyId { index: usize },

    #[error("duplicate source id '{0}'")]
    DuplicateId(String),

    #[error("source '{id}': required field '{field}' is empty")]
    MissingField { id: String, field: &'static str },

    #[error("source '{id}': {field} '{url}' is not a valid absolute URL")]
    InvalidUrl {
        id: String,
        field: &'static str,
        url: String,
    },

    #[error("source '{id}': invalid selector '{selector}': {reason}")]
    InvalidSelector {
        id: String,
        selector: String,
        reason: String,
    },

    #[error("failed to read source file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse source file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A single failed fetch attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(crate::config::REQUEST_TIMEOUT.as_secs())
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else if e.is_body() || e.is_decode() {
            FetchError::Body(e.to_string())
        } else {
            FetchError::Client(e.to_string())
        }
    }
}

/// Fetched content that could not be turned into candidates.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    #[error("malformed feed: {0}")]
    MalformedFeed(String),
}

/// Failure to persist the digest.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
