//! Page retrieval with bounded retries and a fallback URL.
//!
//! # Architecture
//!
//! - [`Transport`]: a single GET returning the response body
//! - [`Connector`]: opens one [`Transport`] session per source invocation
//! - [`RetryPolicy`]: retries a URL with linear backoff and reports
//!   [`Fetched::Unavailable`] instead of an error once attempts run out
//!
//! # Retry Strategy
//!
//! - 3 attempts per URL, each bounded by a 10 second timeout
//! - Attempt `n` that fails waits `n * 1s` before the next one
//! - The fallback URL, when configured, gets a fresh attempt budget

use crate::config::{MAX_ATTEMPTS, REQUEST_TIMEOUT, RETRY_DELAY, SourceConfig, USER_AGENT};
use crate::error::FetchError;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};

/// A session able to GET a URL.
///
/// Non-2xx responses are errors; only the body of a successful response is
/// returned.
pub trait Transport {
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Opens a transport session scoped to one source invocation.
///
/// The session is dropped by the caller when the invocation ends, which
/// releases its connections.
pub trait Connector {
    type Session: Transport;

    fn open(&self, source: &SourceConfig) -> Result<Self::Session, FetchError>;
}

/// Outcome of fetching a URL under a [`RetryPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Content(String),
    Unavailable,
}

impl Fetched {
    pub fn is_available(&self) -> bool {
        matches!(self, Fetched::Content(_))
    }
}

/// Attempt budget and pacing for one URL.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, first try included.
    pub max_attempts: u32,
    /// Attempt `n` waits `n * base_delay` after failing.
    pub base_delay: Duration,
    /// Upper bound on a single attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: RETRY_DELAY,
            attempt_timeout: REQUEST_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Fetch `url`, retrying transport failures until the budget is spent.
    ///
    /// # Arguments
    ///
    /// * `transport` - The session to issue each GET on
    /// * `url` - The absolute URL to fetch
    ///
    /// # Returns
    ///
    /// [`Fetched::Content`] with the first successful body, or
    /// [`Fetched::Unavailable`] once every attempt failed or timed out.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn fetch<T: Transport>(&self, transport: &T, url: &str) -> Fetched {
        let total_t0 = Instant::now();
        for attempt in 1..=self.max_attempts {
            let attempt_t0 = Instant::now();
            let result = match timeout(self.attempt_timeout, transport.get(url)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(self.attempt_timeout.as_secs())),
            };

            match result {
                Ok(body) => {
                    debug!(
                        attempt,
                        bytes = body.len(),
                        elapsed_ms = attempt_t0.elapsed().as_millis() as u64,
                        "Fetched"
                    );
                    return Fetched::Content(body);
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max = self.max_attempts,
                        elapsed_ms_attempt = attempt_t0.elapsed().as_millis() as u64,
                        elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                        error = %e,
                        "Fetch attempt failed"
                    );
                    if attempt < self.max_attempts {
                        sleep(self.base_delay.saturating_mul(attempt)).await;
                    }
                }
            }
        }
        Fetched::Unavailable
    }

    /// Fetch the source's primary URL, then its fallback URL if the primary
    /// is unavailable.
    #[instrument(level = "info", skip_all, fields(source = %source.id))]
    pub async fn fetch_source<T: Transport>(&self, transport: &T, source: &SourceConfig) -> Fetched {
        let primary = self.fetch(transport, &source.fetch_url).await;
        if primary.is_available() {
            return primary;
        }
        let Some(fallback) = &source.fallback_url else {
            return Fetched::Unavailable;
        };
        warn!(
            primary = %source.fetch_url,
            %fallback,
            "Primary URL unavailable; trying fallback"
        );
        self.fetch(transport, fallback).await
    }
}

/// Production connector backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    user_agent: String,
    timeout: Duration,
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl Connector for HttpConnector {
    type Session = HttpSession;

    fn open(&self, source: &SourceConfig) -> Result<HttpSession, FetchError> {
        let client = Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.timeout)
            .build()?;
        debug!(source = %source.id, "Opened HTTP session");
        Ok(HttpSession {
            client,
            source: source.id.clone(),
        })
    }
}

/// One source's HTTP client. Its connection pool is closed on drop.
#[derive(Debug)]
pub struct HttpSession {
    client: Client,
    source: String,
}

impl Transport for HttpSession {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        info!(%url, status = status.as_u16(), bytes = body.len(), "HTTP GET");
        Ok(body)
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        debug!(source = %self.source, "Closed HTTP session");
    }
}
