//! Event bus port — publishing lifecycle notifications.

use std::future::Future;

use feedlot_domain::error::FeedlotError;
use feedlot_domain::event::Event;

/// Publisher side of the lifecycle event bus.
pub trait EventPublisher {
    /// Publish an event. Succeeds even when nobody is listening.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), FeedlotError>> + Send;
}
