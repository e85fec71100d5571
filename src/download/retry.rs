//! Bounded-retry fetch against the rate-limited observation service.
//!
//! The download service protects itself against request floods, so a failed
//! attempt is waited out and repeated up to a fixed budget. Exhausting the
//! budget is not an error: it resolves to an empty payload so the caller can
//! persist a zero-byte artifact and carry on with the remaining stations.

use log::{info, warn};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Cap on attempts per request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;
/// Bound on a single attempt.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
/// Wait between failed attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Decides how long to wait before the next attempt.
///
/// The service has historically been placated by a fixed five second pause;
/// tests inject a zero-delay policy to keep the retry loop fast.
pub trait BackoffPolicy: Send + Sync {
    /// Delay to apply after the given failed attempt (1-based).
    fn delay(&self, attempt: u32) -> Duration;
}

/// Waits the same amount after every failed attempt.
#[derive(Debug, Clone, Copy)]
pub struct FixedBackoff {
    delay: Duration,
}

impl FixedBackoff {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FixedBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_DELAY)
    }
}

impl BackoffPolicy for FixedBackoff {
    fn delay(&self, _attempt: u32) -> Duration {
        self.delay
    }
}

/// Terminal result of a bounded-retry fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Body of the first attempt that came back usable.
    Success(String),
    /// Every attempt failed, or the run was cancelled mid-retry.
    Exhausted,
}

impl FetchOutcome {
    /// The payload to persist: response text, or empty on exhaustion.
    pub fn into_text(self) -> String {
        match self {
            FetchOutcome::Success(text) => text,
            FetchOutcome::Exhausted => String::new(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, FetchOutcome::Exhausted)
    }
}

/// Performs HTTP GETs with a bounded number of attempts.
///
/// An attempt counts as failed when the transport errors out, the response
/// status is not a success, or the body begins with the service's literal
/// `ERROR` marker. Whether an `ERROR` body is truly transient is not
/// knowable from the outside; the retry-then-exhaust behavior is kept as
/// observed against the live service.
#[derive(Clone)]
pub struct Retrier {
    http: Client,
    max_attempts: u32,
    request_timeout: Duration,
    backoff: Arc<dyn BackoffPolicy>,
}

impl Retrier {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            backoff: Arc::new(FixedBackoff::default()),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: Arc<dyn BackoffPolicy>) -> Self {
        self.backoff = backoff;
        self
    }

    /// Fetches `uri`, retrying per the backoff policy until success,
    /// exhaustion, or cancellation.
    ///
    /// Cancellation interrupts both an in-flight attempt and an inter-attempt
    /// wait, and resolves as [`FetchOutcome::Exhausted`].
    pub async fn fetch(&self, uri: &str, cancel: &CancellationToken) -> FetchOutcome {
        for attempt in 1..=self.max_attempts {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Fetch of {uri} cancelled");
                    return FetchOutcome::Exhausted;
                }
                result = self.attempt(uri) => result,
            };

            match result {
                Ok(body) => {
                    if attempt > 1 {
                        info!("Fetch of {uri} succeeded on attempt {attempt}");
                    }
                    return FetchOutcome::Success(body);
                }
                Err(reason) => {
                    warn!(
                        "fetch({uri}) attempt {attempt}/{} failed: {reason}",
                        self.max_attempts
                    );
                }
            }

            if attempt < self.max_attempts {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Fetch of {uri} cancelled during backoff");
                        return FetchOutcome::Exhausted;
                    }
                    _ = tokio::time::sleep(self.backoff.delay(attempt)) => {}
                }
            }
        }

        warn!("Exhausted attempts to download {uri}, returning empty data");
        FetchOutcome::Exhausted
    }

    /// One GET attempt. The failure reason is only ever logged, so a plain
    /// string is enough here.
    async fn attempt(&self, uri: &str) -> Result<String, String> {
        let response = self
            .http
            .get(uri)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| format!("request error: {e}"))?;
        let response = response
            .error_for_status()
            .map_err(|e| format!("http error: {e}"))?;
        let body = response
            .text()
            .await
            .map_err(|e| format!("body read error: {e}"))?;

        if body.starts_with("ERROR") {
            let first_line = body.lines().next().unwrap_or("ERROR");
            return Err(format!("service rejection: {first_line}"));
        }
        Ok(body)
    }
}
