//! Feeding schedule — the central record of the orchestration core.
//!
//! A schedule reserves stock at creation time. Immediate schedules are
//! handed to the dispatch coordinator; the others stay `Scheduled` until
//! cancelled. Quantity is immutable once the schedule has been dispatched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FeedlotError, ValidationError};
use crate::id::{FeedTypeId, ScheduleId, ZoneId};
use crate::time::Timestamp;

/// Lifecycle status of a [`FeedingSchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Created and stock reserved; no device command issued.
    Scheduled,
    /// Feed command acknowledged by the device; a monitor is watching.
    Dispatched,
    /// Target weight confirmed; reservation committed.
    Completed,
    /// Device failure or monitor timeout; reservation released.
    Failed,
    /// Cancelled by the operator; reservation released.
    Cancelled,
}

impl ScheduleStatus {
    /// Stable string form used for persistence and API payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Dispatched => "dispatched",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether this status can never change again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "dispatched" => Ok(Self::Dispatched),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown schedule status: {other}")),
        }
    }
}

/// A feeding request targeting one zone with one feed type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedingSchedule {
    pub id: ScheduleId,
    pub zone_id: ZoneId,
    pub feed_id: FeedTypeId,
    pub quantity: f64,
    /// Ordered, non-empty sequence of planned feeding times.
    pub feeding_times: Vec<Timestamp>,
    pub notes: Option<String>,
    /// Trigger the physical controller right away instead of only
    /// recording the schedule.
    pub immediate: bool,
    pub status: ScheduleStatus,
    pub created_at: Timestamp,
}

impl FeedingSchedule {
    /// Create a builder for constructing a [`FeedingSchedule`].
    #[must_use]
    pub fn builder() -> FeedingScheduleBuilder {
        FeedingScheduleBuilder::default()
    }

    /// Check static domain invariants (quantity, non-empty times).
    ///
    /// Whether the times lie in the future depends on the clock and is
    /// checked by the schedule manager at creation.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::Validation`] if invariants fail.
    pub fn validate(&self) -> Result<(), FeedlotError> {
        if self.quantity <= 0.0 {
            return Err(ValidationError::NonPositiveQuantity.into());
        }
        if self.feeding_times.is_empty() {
            return Err(ValidationError::EmptyFeedingTimes.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`FeedingSchedule`].
#[derive(Debug, Default)]
pub struct FeedingScheduleBuilder {
    id: Option<ScheduleId>,
    zone_id: Option<ZoneId>,
    feed_id: Option<FeedTypeId>,
    quantity: Option<f64>,
    feeding_times: Vec<Timestamp>,
    notes: Option<String>,
    immediate: bool,
    created_at: Option<Timestamp>,
}

impl FeedingScheduleBuilder {
    #[must_use]
    pub fn id(mut self, id: ScheduleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn zone_id(mut self, zone_id: ZoneId) -> Self {
        self.zone_id = Some(zone_id);
        self
    }

    #[must_use]
    pub fn feed_id(mut self, feed_id: FeedTypeId) -> Self {
        self.feed_id = Some(feed_id);
        self
    }

    #[must_use]
    pub fn quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    #[must_use]
    pub fn feeding_times(mut self, times: Vec<Timestamp>) -> Self {
        self.feeding_times = times;
        self
    }

    #[must_use]
    pub fn feeding_time(mut self, time: Timestamp) -> Self {
        self.feeding_times.push(time);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Consume the builder, validate, and return a [`FeedingSchedule`]
    /// with status [`ScheduleStatus::Scheduled`].
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::Validation`] if invariants fail.
    pub fn build(self) -> Result<FeedingSchedule, FeedlotError> {
        let schedule = FeedingSchedule {
            id: self.id.unwrap_or_default(),
            zone_id: self.zone_id.unwrap_or_default(),
            feed_id: self.feed_id.unwrap_or_default(),
            quantity: self.quantity.unwrap_or_default(),
            feeding_times: self.feeding_times,
            notes: self.notes,
            immediate: self.immediate,
            status: ScheduleStatus::Scheduled,
            created_at: self.created_at.unwrap_or_else(crate::time::now),
        };
        schedule.validate()?;
        Ok(schedule)
    }
}
