use tokio::sync::broadcast;
use tracing::trace;

use crate::models::DivisionId;

/// Buffered events per subscriber before it starts lagging.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Sent after a store mutation has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    DivisionsChanged,
    SelectionChanged(Option<DivisionId>),
    HolesChanged(DivisionId),
}

/// Broadcast side of the store notifications. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct StoreEvents {
    tx: broadcast::Sender<StoreEvent>,
}

impl Default for StoreEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Never blocks; with no subscribers the event is dropped.
    pub fn emit(&self, event: StoreEvent) {
        if self.tx.send(event).is_err() {
            trace!(?event, "No subscribers for store event");
        }
    }
}
