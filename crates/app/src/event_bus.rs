//! In-process event bus over a tokio broadcast channel.
//!
//! Publishing never blocks and never fails on missing subscribers; slow
//! subscribers drop the oldest events (the audit trail is the history
//! store, not this bus).

use tokio::sync::broadcast;

use feedlot_domain::error::FeedlotError;
use feedlot_domain::event::Event;

use crate::ports::EventPublisher;

const DEFAULT_CAPACITY: usize = 256;

/// Cloneable fan-out bus for lifecycle [`Event`]s.
#[derive(Debug, Clone)]
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl Default for InProcessEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl InProcessEventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Open a new subscription receiving every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    async fn publish(&self, event: Event) -> Result<(), FeedlotError> {
        // A send error just means no subscriber is connected right now.
        let _ = self.sender.send(event);
        Ok(())
    }
}
