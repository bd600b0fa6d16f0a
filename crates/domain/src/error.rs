//! Error taxonomy shared across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`FeedlotError`] via `#[from]`. Adapters wrap their infrastructure
//! errors (sqlx, reqwest) before they cross into the application layer.

use crate::time::Timestamp;

/// Top-level error type returned by application services.
#[derive(Debug, thiserror::Error)]
pub enum FeedlotError {
    /// A request failed domain validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced record does not exist.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// A stock reservation exceeded the remaining quantity.
    #[error("{0}")]
    InsufficientStock(#[from] InsufficientStockError),

    /// The feeding controller could not be reached.
    #[error("{0}")]
    DeviceUnreachable(#[from] DeviceUnreachableError),

    /// The request raced with conflicting state (double dispatch,
    /// cancelling a finished schedule, deleting referenced stock).
    #[error("{0}")]
    Conflict(#[from] ConflictError),

    /// The persistence layer failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated by caller input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Name field is empty.
    #[error("name must not be empty")]
    EmptyName,

    /// Feed unit field is empty.
    #[error("unit must not be empty")]
    EmptyUnit,

    /// Requested quantity is zero or negative.
    #[error("quantity must be greater than zero")]
    NonPositiveQuantity,

    /// A schedule was submitted without any feeding time.
    #[error("at least one feeding time is required")]
    EmptyFeedingTimes,

    /// A feeding time is not in the future.
    #[error("feeding time {0} is in the past")]
    PastFeedingTime(Timestamp),

    /// Remaining stock fell outside `0..=total`.
    #[error("remaining quantity must be between zero and the total quantity")]
    RemainingOutOfRange,

    /// Zone capacity is zero.
    #[error("capacity must be greater than zero")]
    NonPositiveCapacity,

    /// Zone occupancy exceeds its capacity.
    #[error("occupancy {occupancy} exceeds capacity {capacity}")]
    OccupancyExceedsCapacity { occupancy: u32, capacity: u32 },

    /// An identifier in the request could not be parsed.
    #[error("malformed identifier: {0}")]
    MalformedId(String),
}

/// A referenced record does not exist.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of record ("Zone", "FeedType", "FeedingSchedule", …).
    pub entity: &'static str,
    /// The identifier that was looked up.
    pub id: String,
}

/// A reservation was requested for more than the remaining stock.
#[derive(Debug, Clone, thiserror::Error)]
#[error("insufficient stock of feed {feed_id}: requested {requested}, remaining {remaining}")]
pub struct InsufficientStockError {
    pub feed_id: String,
    pub requested: f64,
    pub remaining: f64,
}

/// The feeding controller did not respond to a probe, command, or read.
#[derive(Debug, Clone, thiserror::Error)]
#[error("device at {address} unreachable: {reason}")]
pub struct DeviceUnreachableError {
    /// Configured device address.
    pub address: String,
    /// Human-readable failure cause (timeout, connection refused, bad payload, …).
    pub reason: String,
}

impl DeviceUnreachableError {
    /// Build an error for a probe or request that did not complete in time.
    #[must_use]
    pub fn timed_out(address: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self {
            address: address.into(),
            reason: format!("no response within {}ms", timeout.as_millis()),
        }
    }
}

/// The request conflicts with current state.
///
/// The reservation path is serialized per feed, so these arise only from
/// double dispatch, late cancellation, or deleting referenced stock.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConflictError {
    /// A completion monitor is already running for this schedule.
    #[error("a dispatch is already active for schedule {schedule_id}")]
    DispatchInProgress { schedule_id: String },

    /// The schedule already reached a terminal status.
    #[error("schedule {schedule_id} is already {status}")]
    AlreadyTerminal {
        schedule_id: String,
        status: String,
    },

    /// The feed type is still referenced by active schedules.
    #[error("feed type {feed_id} is referenced by {count} active schedule(s)")]
    FeedTypeInUse { feed_id: String, count: u64 },

    /// A release or commit referenced a token the ledger never issued.
    #[error("unknown reservation {reservation_id}")]
    UnknownReservation { reservation_id: String },
}
