//! Outbound notification of pass results

use tokio::sync::broadcast;
use tracing::trace;

use crate::CoreEvent;

/// Receives events after each pass. Must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: CoreEvent);
}

/// Notifier fanning events out over a broadcast channel.
///
/// Slow subscribers lag and lose old events rather than holding up the
/// coordinator.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<CoreEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, event: CoreEvent) {
        if self.tx.send(event).is_err() {
            trace!("No event subscribers");
        }
    }
}
