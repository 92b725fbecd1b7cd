//! Concrete transports: async reqwest (primary) and blocking ureq (fallback).
//!
//! The two clients share no connection pool, resolver state, or TLS stack,
//! so a fault in one client strategy does not automatically doom the other.

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;
use url::Url;

use viewer_core::{FetchError, RawRecord};

use crate::{Transport, parse_record_body};

const ACCEPT_JSON: &str = "application/json";

/// Primary transport backed by an async `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    async fn get_json(&self, url: &Url) -> Result<RawRecord, FetchError> {
        trace!(url = %url, "issuing primary request");
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, ACCEPT_JSON)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        parse_record_body(&body)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_decode() {
        FetchError::MalformedResponse(err.to_string())
    } else {
        FetchError::NetworkUnreachable(err.to_string())
    }
}

/// Fallback transport backed by a blocking `ureq` agent.
///
/// Runs on the blocking thread pool. A superseded call keeps running there
/// until its own timeout fires, but its result is discarded by the dropped
/// future, so it can never mutate state after cancellation.
#[derive(Clone)]
pub struct BlockingTransport {
    agent: ureq::Agent,
}

impl BlockingTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

#[async_trait]
impl Transport for BlockingTransport {
    fn name(&self) -> &'static str {
        "ureq"
    }

    async fn get_json(&self, url: &Url) -> Result<RawRecord, FetchError> {
        trace!(url = %url, "issuing fallback request");
        let agent = self.agent.clone();
        let url = url.to_string();

        match tokio::task::spawn_blocking(move || fetch_blocking(&agent, &url)).await {
            Ok(result) => result,
            Err(join_err) => Err(FetchError::NetworkUnreachable(join_err.to_string())),
        }
    }
}

fn fetch_blocking(agent: &ureq::Agent, url: &str) -> Result<RawRecord, FetchError> {
    let response = agent
        .get(url)
        .set("Accept", ACCEPT_JSON)
        .call()
        .map_err(map_ureq_error)?;

    let body = response
        .into_string()
        .map_err(|err| FetchError::MalformedResponse(err.to_string()))?;
    parse_record_body(body.as_bytes())
}

fn map_ureq_error(err: ureq::Error) -> FetchError {
    match err {
        ureq::Error::Status(code, _) => FetchError::from_status(code),
        ureq::Error::Transport(transport) => {
            let message = transport.to_string();
            if message.contains("timed out") {
                FetchError::Timeout
            } else {
                FetchError::NetworkUnreachable(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ureq_status_errors_map_to_server_status() {
        let err = map_ureq_error(ureq::Error::Status(
            503,
            ureq::Response::new(503, "Service Unavailable", "try later")
                .expect("static response should build"),
        ));
        assert_eq!(err, FetchError::ServerStatus(503));
    }
}
