use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::{error::FetchError, record::NormalizedRecord};

/// Broadcast event stream type used by presentation subscribers.
pub type EventStream = broadcast::Receiver<ViewerEvent>;

/// Events emitted as a fetch cycle progresses.
///
/// Cancelled cycles are silent by contract: a superseded cycle emits nothing
/// after its `Loading` event, and the replacement cycle's events follow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ViewerEvent {
    /// A fetch cycle started for the identifier.
    Loading {
        /// Identifier the cycle targets.
        identifier: String,
    },
    /// The record was fetched and normalized.
    RecordLoaded {
        /// Identifier the cycle targeted.
        identifier: String,
        /// Display-ready record for gallery initialization.
        record: NormalizedRecord,
    },
    /// The fetch cycle ended in a terminal error.
    FetchFailed {
        /// Identifier the cycle targeted.
        identifier: String,
        /// Terminal error; `error.is_transient()` callers may offer retry.
        error: FetchError,
    },
}

/// Event fan-out shared by the session and its subscribers.
#[derive(Clone, Debug)]
pub struct ViewerChannels {
    event_tx: broadcast::Sender<ViewerEvent>,
}

impl ViewerChannels {
    /// Create a new fan-out with the given event buffer size.
    pub fn new(event_buffer: usize) -> Self {
        let (event_tx, _) = broadcast::channel(event_buffer.max(1));
        Self { event_tx }
    }

    /// Subscribe to emitted viewer events.
    pub fn subscribe(&self) -> EventStream {
        self.event_tx.subscribe()
    }

    /// Clone the event sender.
    pub fn event_sender(&self) -> broadcast::Sender<ViewerEvent> {
        self.event_tx.clone()
    }

    /// Emit an event to all subscribers.
    ///
    /// Emission is best-effort; lagged subscribers are handled by `broadcast`.
    pub fn emit(&self, event: ViewerEvent) {
        let _ = self.event_tx.send(event);
    }
}
