//! Device connectivity manager — the single owner of the controller link.
//!
//! Every probe and command goes through one [`tokio::sync::Mutex`], so
//! connection tests, dispatch commands, and monitor polls never interleave
//! on the wire. Each round-trip is bounded by the configured timeout.

use std::time::Duration;

use tokio::sync::Mutex;

use feedlot_domain::device::{DeviceConnection, DeviceStatus};
use feedlot_domain::error::DeviceUnreachableError;
use feedlot_domain::time;

use crate::ports::FeederTransport;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// State machine over one [`DeviceConnection`], backed by a
/// [`FeederTransport`].
pub struct DeviceManager<T> {
    transport: T,
    state: Mutex<DeviceConnection>,
    timeout: Duration,
}

impl<T: FeederTransport> DeviceManager<T> {
    /// Create a manager for `transport`, starting disconnected.
    pub fn new(transport: T, timeout: Duration) -> Self {
        let state = Mutex::new(DeviceConnection::new(transport.address()));
        Self {
            transport,
            state,
            timeout,
        }
    }

    /// Last known connection snapshot, without touching the device.
    pub async fn status(&self) -> DeviceConnection {
        self.state.lock().await.clone()
    }

    /// Probe the device and return the resulting snapshot.
    ///
    /// A failed probe is not an error at this level; the outcome is
    /// readable from the snapshot's `status` and `last_error`.
    #[tracing::instrument(skip(self), fields(address = self.transport.address()))]
    pub async fn test_connection(&self) -> DeviceConnection {
        let mut state = self.state.lock().await;
        begin_attempt(&mut state);

        match self.bounded(self.transport.probe()).await {
            Ok(()) => state.mark_connected(time::now()),
            Err(err) => {
                tracing::warn!(error = %err, "device probe failed");
                state.mark_error(err.to_string(), time::now());
            }
        }
        state.clone()
    }

    /// Read the current sensor weight and record it in the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceUnreachableError`] when the device does not answer
    /// within the timeout; the connection transitions to `Error`.
    pub async fn read_weight(&self) -> Result<f64, DeviceUnreachableError> {
        let mut state = self.state.lock().await;
        begin_attempt(&mut state);

        match self.bounded(self.transport.read_weight()).await {
            Ok(weight) => {
                state.mark_connected(time::now());
                state.last_weight_reading = Some(weight);
                Ok(weight)
            }
            Err(err) => {
                state.mark_error(err.to_string(), time::now());
                Err(err)
            }
        }
    }

    /// Ask the device to dispense `quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceUnreachableError`] when the device does not
    /// acknowledge within the timeout; the connection transitions to
    /// `Error`.
    #[tracing::instrument(skip(self), fields(address = self.transport.address()))]
    pub async fn send_feed_command(&self, quantity: f64) -> Result<(), DeviceUnreachableError> {
        let mut state = self.state.lock().await;
        begin_attempt(&mut state);

        match self.bounded(self.transport.send_feed(quantity)).await {
            Ok(()) => {
                state.mark_connected(time::now());
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "feed command failed");
                state.mark_error(err.to_string(), time::now());
                Err(err)
            }
        }
    }

    async fn bounded<R>(
        &self,
        call: impl Future<Output = Result<R, DeviceUnreachableError>>,
    ) -> Result<R, DeviceUnreachableError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(DeviceUnreachableError::timed_out(
                self.transport.address(),
                self.timeout,
            )),
        }
    }
}

fn begin_attempt(state: &mut DeviceConnection) {
    if state.status != DeviceStatus::Connected {
        state.status = DeviceStatus::Connecting;
    }
}
