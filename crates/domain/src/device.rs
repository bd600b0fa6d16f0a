//! Device connection — observable state of the one feeding controller.
//!
//! The connectivity manager in the app layer owns a single
//! [`DeviceConnection`] per configured device and drives its transitions:
//!
//! ```text
//! Disconnected ─┐
//!               ├─> Connecting ─> Connected ─> Error
//! Error ────────┘       │                        │
//!                       └────────> Error ────────┘ (explicit retry)
//! ```

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Connectivity state of the feeding controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    /// Initial state, no probe attempted yet.
    Disconnected,
    /// A probe is in flight.
    Connecting,
    /// Last probe or command succeeded.
    Connected,
    /// Last probe or command failed.
    Error,
}

/// Snapshot of the connection to one feeding controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConnection {
    /// Configured controller address.
    pub address: String,
    pub status: DeviceStatus,
    /// Most recent sensor reading, if any command ever succeeded.
    pub last_weight_reading: Option<f64>,
    /// Cause of the last transition into [`DeviceStatus::Error`].
    pub last_error: Option<String>,
    /// When the device last answered (or failed) a probe or command.
    pub last_checked_at: Option<Timestamp>,
}

impl DeviceConnection {
    /// Fresh, never-probed connection.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            status: DeviceStatus::Disconnected,
            last_weight_reading: None,
            last_error: None,
            last_checked_at: None,
        }
    }

    /// Record a successful probe or command.
    pub fn mark_connected(&mut self, at: Timestamp) {
        self.status = DeviceStatus::Connected;
        self.last_error = None;
        self.last_checked_at = Some(at);
    }

    /// Record a failed probe or command.
    pub fn mark_error(&mut self, reason: impl Into<String>, at: Timestamp) {
        self.status = DeviceStatus::Error;
        self.last_error = Some(reason.into());
        self.last_checked_at = Some(at);
    }
}
