//! Device port — wire protocol to the feeding controller.
//!
//! The transport only knows how to perform single round-trips; connection
//! state, timeouts, and mutual exclusion live in the
//! [`DeviceManager`](crate::connectivity::DeviceManager).

use std::future::Future;

use feedlot_domain::error::DeviceUnreachableError;

/// One round-trip-at-a-time client for a feeding controller.
pub trait FeederTransport {
    /// The configured controller address, for diagnostics.
    fn address(&self) -> &str;

    /// Liveness probe. Any successful response counts as reachable.
    fn probe(&self) -> impl Future<Output = Result<(), DeviceUnreachableError>> + Send;

    /// Read the current sensor weight.
    fn read_weight(&self) -> impl Future<Output = Result<f64, DeviceUnreachableError>> + Send;

    /// Ask the controller to dispense `quantity`. The controller
    /// acknowledges acceptance and dispenses asynchronously; progress is
    /// only observable through [`FeederTransport::read_weight`].
    fn send_feed(
        &self,
        quantity: f64,
    ) -> impl Future<Output = Result<(), DeviceUnreachableError>> + Send;
}
