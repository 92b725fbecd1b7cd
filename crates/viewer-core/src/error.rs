use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal failure surfaced by one fetch cycle.
///
/// Exactly one value reaches the presentation boundary per failed cycle, so
/// callers can render an appropriate message and, for transient kinds only,
/// offer a manual retry.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum FetchError {
    /// The attempt did not complete within the per-attempt deadline.
    #[error("request timed out")]
    Timeout,
    /// Transport-level failure before a definitive server response.
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),
    /// Definitive non-2xx response from the server. Never retried.
    #[error("server responded with status {0}")]
    ServerStatus(u16),
    /// Caller-initiated cancellation. Silent; never user-visible.
    #[error("fetch cycle cancelled")]
    Cancelled,
    /// A body arrived but could not be parsed as JSON.
    #[error("malformed response body: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    /// Whether the failure is attributable to the transport layer rather than
    /// the server's definitive response, making it eligible for the single
    /// fallback hop.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::NetworkUnreachable(_) | Self::MalformedResponse(_)
        )
    }

    /// Whether the failure came from caller-initiated cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Build the error for a definitive non-2xx server response.
    pub fn from_status(status: u16) -> Self {
        Self::ServerStatus(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_transport_failures_as_transient() {
        assert!(FetchError::Timeout.is_transient());
        assert!(FetchError::NetworkUnreachable("connection refused".into()).is_transient());
        assert!(FetchError::MalformedResponse("expected value".into()).is_transient());
    }

    #[test]
    fn classifies_definitive_outcomes_as_non_transient() {
        assert!(!FetchError::ServerStatus(404).is_transient());
        assert!(!FetchError::ServerStatus(500).is_transient());
        assert!(!FetchError::Cancelled.is_transient());
    }

    #[test]
    fn cancellation_is_distinguished() {
        assert!(FetchError::Cancelled.is_cancelled());
        assert!(!FetchError::Timeout.is_cancelled());
    }
}
