//! Per-identifier fetch cycle ownership with supersession by cancellation.

use std::sync::Arc;

use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use viewer_core::{EventStream, FetchError, ViewerChannels, ViewerEvent, normalize};

use crate::{ResilientFetcher, Transport};

#[derive(Debug)]
struct ActiveCycle {
    identifier: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns at most one outstanding fetch cycle at a time.
///
/// `load` cancels any in-flight prior cycle before issuing the new request,
/// so a stale response can never overwrite newer state: supersession is
/// enforced by the explicit token, not by completion order.
pub struct ViewerSession<P: Transport + 'static, F: Transport + 'static> {
    fetcher: Arc<ResilientFetcher<P, F>>,
    channels: ViewerChannels,
    active: Mutex<Option<ActiveCycle>>,
}

impl<P: Transport + 'static, F: Transport + 'static> ViewerSession<P, F> {
    /// Wrap a fetcher with an event fan-out of the given buffer size.
    pub fn new(fetcher: ResilientFetcher<P, F>, event_buffer: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            channels: ViewerChannels::new(event_buffer),
            active: Mutex::new(None),
        }
    }

    /// Subscribe to cycle events.
    pub fn subscribe(&self) -> EventStream {
        self.channels.subscribe()
    }

    /// Start a fetch cycle for `identifier`, superseding any in-flight cycle.
    pub async fn load(&self, identifier: &str) {
        let mut guard = self.active.lock().await;
        if let Some(previous) = guard.take() {
            debug!(
                superseded = %previous.identifier,
                identifier,
                "cancelling in-flight fetch cycle"
            );
            previous.cancel.cancel();
            // Wait for the superseded task so its (silent) teardown is
            // fully ordered before the new cycle's events.
            let _ = previous.task.await;
        }

        let cancel = CancellationToken::new();
        let attempt_token = cancel.child_token();
        let fetcher = Arc::clone(&self.fetcher);
        let events = self.channels.clone();
        let id = identifier.to_owned();

        events.emit(ViewerEvent::Loading {
            identifier: id.clone(),
        });

        let task = tokio::spawn(async move {
            match fetcher.fetch(&id, &attempt_token).await {
                Ok(raw) => {
                    let record = normalize(raw);
                    events.emit(ViewerEvent::RecordLoaded {
                        identifier: id,
                        record,
                    });
                }
                Err(FetchError::Cancelled) => {
                    // Superseded cycles end silently by contract.
                    trace!(identifier = %id, "cancelled fetch cycle discarded");
                }
                Err(error) => {
                    warn!(identifier = %id, error = %error, "fetch cycle failed");
                    events.emit(ViewerEvent::FetchFailed {
                        identifier: id,
                        error,
                    });
                }
            }
        });

        *guard = Some(ActiveCycle {
            identifier: identifier.to_owned(),
            cancel,
            task,
        });
    }

    /// Cancel the in-flight cycle, if any (viewer unmount).
    pub async fn cancel(&self) {
        let previous = self.active.lock().await.take();
        if let Some(previous) = previous {
            debug!(identifier = %previous.identifier, "cancelling fetch cycle on unmount");
            previous.cancel.cancel();
            let _ = previous.task.await;
        }
    }

    /// Wait for the current cycle to finish. Used by one-shot consumers.
    pub async fn wait_for_cycle(&self) {
        let task = {
            let mut guard = self.active.lock().await;
            guard.take()
        };
        if let Some(cycle) = task {
            let _ = cycle.task.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use async_trait::async_trait;
    use serde_json::json;
    use url::Url;

    use viewer_core::RawRecord;

    use super::*;

    /// Transport routed by the trailing identifier segment. Unknown
    /// identifiers hang forever, standing in for a stalled network.
    struct RoutedTransport {
        routes: HashMap<String, Result<RawRecord, FetchError>>,
    }

    impl RoutedTransport {
        fn new(routes: Vec<(&str, Result<RawRecord, FetchError>)>) -> Self {
            Self {
                routes: routes
                    .into_iter()
                    .map(|(id, outcome)| (id.to_owned(), outcome))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl Transport for RoutedTransport {
        fn name(&self) -> &'static str {
            "routed"
        }

        async fn get_json(&self, url: &Url) -> Result<RawRecord, FetchError> {
            let identifier = url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .unwrap_or_default()
                .to_owned();
            match self.routes.get(&identifier) {
                Some(outcome) => outcome.clone(),
                None => {
                    std::future::pending::<()>().await;
                    unreachable!("pending future never resolves")
                }
            }
        }
    }

    fn session_with_routes(
        routes: Vec<(&str, Result<RawRecord, FetchError>)>,
    ) -> ViewerSession<RoutedTransport, RoutedTransport> {
        let base = Url::parse("https://api.example.com/api").expect("static base url");
        let fetcher = ResilientFetcher::with_transports(
            RoutedTransport::new(routes),
            RoutedTransport::new(Vec::new()),
            base,
            Duration::from_secs(20),
        );
        ViewerSession::new(fetcher, 16)
    }

    fn record_for(name: &str) -> RawRecord {
        RawRecord(json!({ "apartmentName": name }))
    }

    #[tokio::test]
    async fn load_emits_loading_then_record() {
        let session = session_with_routes(vec![("apt-a", Ok(record_for("A")))]);
        let mut events = session.subscribe();

        session.load("apt-a").await;
        session.wait_for_cycle().await;

        match events.recv().await.expect("loading event") {
            ViewerEvent::Loading { identifier } => assert_eq!(identifier, "apt-a"),
            other => panic!("unexpected event: {other:?}"),
        }
        match events.recv().await.expect("loaded event") {
            ViewerEvent::RecordLoaded { identifier, record } => {
                assert_eq!(identifier, "apt-a");
                assert_eq!(record.apartment_name, "A");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn superseded_cycle_never_overwrites_newer_state() {
        // "apt-a" hangs; "apt-b" resolves. Final state must reflect only B.
        let session = session_with_routes(vec![("apt-b", Ok(record_for("B")))]);
        let mut events = session.subscribe();

        session.load("apt-a").await;
        tokio::task::yield_now().await;
        session.load("apt-b").await;
        session.wait_for_cycle().await;

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }

        assert_eq!(
            seen,
            vec![
                ViewerEvent::Loading {
                    identifier: "apt-a".into()
                },
                ViewerEvent::Loading {
                    identifier: "apt-b".into()
                },
                ViewerEvent::RecordLoaded {
                    identifier: "apt-b".into(),
                    record: viewer_core::normalize(record_for("B")),
                },
            ]
        );
    }

    #[tokio::test]
    async fn terminal_errors_are_reported_once() {
        let session =
            session_with_routes(vec![("apt-a", Err(FetchError::ServerStatus(404)))]);
        let mut events = session.subscribe();

        session.load("apt-a").await;
        session.wait_for_cycle().await;

        let _loading = events.recv().await.expect("loading event");
        match events.recv().await.expect("failure event") {
            ViewerEvent::FetchFailed { identifier, error } => {
                assert_eq!(identifier, "apt-a");
                assert_eq!(error, FetchError::ServerStatus(404));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancel_discards_in_flight_cycle_silently() {
        let session = session_with_routes(Vec::new());
        let mut events = session.subscribe();

        session.load("apt-a").await;
        tokio::task::yield_now().await;
        session.cancel().await;

        let _loading = events.recv().await.expect("loading event");
        assert!(events.try_recv().is_err());
    }
}
