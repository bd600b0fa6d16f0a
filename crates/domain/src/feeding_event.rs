//! Feeding event — append-only audit record of a finished feeding attempt.
//!
//! Created by the history recorder when a completion monitor (or a failed
//! dispatch) reaches a terminal state. Past events are never mutated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::id::{FeedTypeId, FeedingEventId, ScheduleId};
use crate::time::Timestamp;

/// Terminal outcome of a feeding attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedingOutcome {
    /// The sensor confirmed the target quantity.
    Delivered,
    /// The target was never confirmed (deadline hit or device lost).
    TimedOut,
    /// The attempt was cancelled by the operator.
    Cancelled,
}

impl FeedingOutcome {
    /// Stable string form used for persistence and API payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FeedingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedingOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delivered" => Ok(Self::Delivered),
            "timed_out" => Ok(Self::TimedOut),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown feeding outcome: {other}")),
        }
    }
}

/// Historical record of one feeding attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedingEvent {
    pub id: FeedingEventId,
    pub schedule_id: ScheduleId,
    pub feed_id: FeedTypeId,
    pub quantity: f64,
    pub outcome: FeedingOutcome,
    pub started_at: Timestamp,
    pub completed_at: Timestamp,
    pub notes: Option<String>,
}

impl FeedingEvent {
    /// Create a builder for constructing a [`FeedingEvent`].
    #[must_use]
    pub fn builder() -> FeedingEventBuilder {
        FeedingEventBuilder::default()
    }
}

/// Step-by-step builder for [`FeedingEvent`].
#[derive(Debug, Default)]
pub struct FeedingEventBuilder {
    id: Option<FeedingEventId>,
    schedule_id: Option<ScheduleId>,
    feed_id: Option<FeedTypeId>,
    quantity: Option<f64>,
    outcome: Option<FeedingOutcome>,
    started_at: Option<Timestamp>,
    completed_at: Option<Timestamp>,
    notes: Option<String>,
}

impl FeedingEventBuilder {
    #[must_use]
    pub fn id(mut self, id: FeedingEventId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn schedule_id(mut self, schedule_id: ScheduleId) -> Self {
        self.schedule_id = Some(schedule_id);
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
    pub fn outcome(mut self, outcome: FeedingOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn started_at(mut self, started_at: Timestamp) -> Self {
        self.started_at = Some(started_at);
        self
    }

    #[must_use]
    pub fn completed_at(mut self, completed_at: Timestamp) -> Self {
        self.completed_at = Some(completed_at);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Consume the builder and return a [`FeedingEvent`].
    #[must_use]
    pub fn build(self) -> FeedingEvent {
        let completed_at = self.completed_at.unwrap_or_else(crate::time::now);
        FeedingEvent {
            id: self.id.unwrap_or_default(),
            schedule_id: self.schedule_id.unwrap_or_default(),
            feed_id: self.feed_id.unwrap_or_default(),
            quantity: self.quantity.unwrap_or_default(),
            outcome: self.outcome.unwrap_or(FeedingOutcome::TimedOut),
            started_at: self.started_at.unwrap_or(completed_at),
            completed_at,
            notes: self.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    #[test]
    fn should_build_event_with_all_fields() {
        let schedule_id = ScheduleId::new();
        let started = now();
        let event = FeedingEvent::builder()
            .schedule_id(schedule_id)
            .feed_id(FeedTypeId::new())
            .quantity(5.0)
            .outcome(FeedingOutcome::Delivered)
            .started_at(started)
            .notes("morning feed")
            .build();

        assert_eq!(event.schedule_id, schedule_id);
        assert_eq!(event.outcome, FeedingOutcome::Delivered);
        assert_eq!(event.started_at, started);
        assert!(event.completed_at >= started);
    }

    #[test]
    fn should_roundtrip_outcome_through_str() {
        for outcome in [
            FeedingOutcome::Delivered,
            FeedingOutcome::TimedOut,
            FeedingOutcome::Cancelled,
        ] {
            let parsed: FeedingOutcome = outcome.as_str().parse().unwrap();
            assert_eq!(parsed, outcome);
        }
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let event = FeedingEvent::builder()
            .schedule_id(ScheduleId::new())
            .feed_id(FeedTypeId::new())
            .quantity(2.0)
            .outcome(FeedingOutcome::Cancelled)
            .build();
        let json = serde_json::to_string(&event).unwrap();
        let parsed: FeedingEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, event.id);
        assert_eq!(parsed.outcome, FeedingOutcome::Cancelled);
    }
}
