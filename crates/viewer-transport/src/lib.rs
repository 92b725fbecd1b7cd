//! Dual-transport resilient fetch layer.
//!
//! `ResilientFetcher` issues one apartment-record request over the primary
//! HTTP transport and, on transport-level failure only, retries exactly once
//! over a second independent transport. `ViewerSession` owns one fetch cycle
//! per identifier and supersedes in-flight cycles by explicit cancellation.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use viewer_core::{FetchError, RawRecord, attempt_with_fallback};

mod http;
mod session;

pub use http::{BlockingTransport, HttpTransport};
pub use session::ViewerSession;

/// Fixed base address of the apartment API.
pub const DEFAULT_BASE_URL: &str = "https://api.africartz.com/api";

/// Per-attempt deadline, applied independently to primary and fallback.
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(20);

/// One retrieval strategy for a JSON record.
///
/// Implementations require a 2xx status and a JSON body; a non-2xx status is
/// a definitive `ServerStatus` outcome, never a transport fault.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport label used in logs.
    fn name(&self) -> &'static str;

    /// Issue one GET for `url` with JSON content negotiation.
    async fn get_json(&self, url: &Url) -> Result<RawRecord, FetchError>;
}

/// Compose the record endpoint from the base address and identifier.
///
/// The identifier is appended as a single path segment with standard
/// path-segment encoding; no query parameters are added.
pub fn record_endpoint(base: &Url, identifier: &str) -> Result<Url, FetchError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| {
            FetchError::NetworkUnreachable("base URL cannot carry path segments".to_owned())
        })?
        .pop_if_empty()
        .push("apartment")
        .push(identifier);
    Ok(url)
}

/// Primary/fallback record fetcher with timeout and cancellation.
#[derive(Debug)]
pub struct ResilientFetcher<P = HttpTransport, F = BlockingTransport> {
    primary: P,
    fallback: F,
    base_url: Url,
    attempt_timeout: Duration,
}

impl ResilientFetcher {
    /// Build a fetcher with the stock reqwest/ureq transport pair.
    pub fn new(base_url: Url) -> Self {
        Self::with_transports(
            HttpTransport::new(),
            BlockingTransport::new(ATTEMPT_TIMEOUT),
            base_url,
            ATTEMPT_TIMEOUT,
        )
    }
}

impl<P: Transport, F: Transport> ResilientFetcher<P, F> {
    /// Build a fetcher over explicit transports; used by tests and embedders.
    pub fn with_transports(primary: P, fallback: F, base_url: Url, attempt_timeout: Duration) -> Self {
        Self {
            primary,
            fallback,
            base_url,
            attempt_timeout,
        }
    }

    /// Fetch one raw record for `identifier`.
    ///
    /// The caller's token aborts whichever attempt is in flight; a cancelled
    /// cycle resolves to `FetchError::Cancelled` without triggering the
    /// fallback hop. When both transports fail, the surfaced error is the
    /// primary's.
    pub async fn fetch(
        &self,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> Result<RawRecord, FetchError> {
        let url = record_endpoint(&self.base_url, identifier)?;
        debug!(identifier, url = %url, "starting fetch cycle");

        let attempt_timeout = self.attempt_timeout;
        let primary_attempt = async {
            let result = timed_attempt(&self.primary, &url, attempt_timeout).await;
            if let Err(err) = &result {
                if err.is_transient() {
                    warn!(
                        transport = self.primary.name(),
                        error = %err,
                        "primary transport failed; attempting fallback"
                    );
                } else {
                    debug!(
                        transport = self.primary.name(),
                        error = %err,
                        "primary attempt ended with definitive failure"
                    );
                }
            }
            result
        };

        let work = attempt_with_fallback(
            primary_attempt,
            || timed_attempt(&self.fallback, &url, attempt_timeout),
            FetchError::is_transient,
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(identifier, "fetch cycle cancelled");
                Err(FetchError::Cancelled)
            }
            result = work => result,
        }
    }
}

async fn timed_attempt<T: Transport + ?Sized>(
    transport: &T,
    url: &Url,
    limit: Duration,
) -> Result<RawRecord, FetchError> {
    match tokio::time::timeout(limit, transport.get_json(url)).await {
        Ok(result) => result,
        Err(_elapsed) => Err(FetchError::Timeout),
    }
}

/// Parse a response body, reserving `MalformedResponse` for bodies that are
/// not JSON at all. Valid JSON of any shape is handed on verbatim.
fn parse_record_body(bytes: &[u8]) -> Result<RawRecord, FetchError> {
    serde_json::from_slice::<serde_json::Value>(bytes)
        .map(RawRecord)
        .map_err(|err| FetchError::MalformedResponse(err.to_string()))
}
