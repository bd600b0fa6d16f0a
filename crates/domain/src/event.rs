//! Lifecycle events — transient notifications about orchestration progress.
//!
//! Published on the in-process event bus (and relayed over SSE) when
//! schedules are created, dispatches start or fail, weight readings come
//! in, and monitors reach terminal states. Not persisted; the durable
//! audit trail is [`FeedingEvent`](crate::feeding_event::FeedingEvent).

use serde::{Deserialize, Serialize};

use crate::id::{EventId, ScheduleId};
use crate::time::Timestamp;

/// Kind of lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ScheduleCreated,
    ScheduleCancelled,
    DispatchStarted,
    DispatchFailed,
    WeightReading,
    DeliveryConfirmed,
    MonitorTimedOut,
    MonitorCancelled,
}

impl EventType {
    /// Stable string form used in API payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScheduleCreated => "schedule_created",
            Self::ScheduleCancelled => "schedule_cancelled",
            Self::DispatchStarted => "dispatch_started",
            Self::DispatchFailed => "dispatch_failed",
            Self::WeightReading => "weight_reading",
            Self::DeliveryConfirmed => "delivery_confirmed",
            Self::MonitorTimedOut => "monitor_timed_out",
            Self::MonitorCancelled => "monitor_cancelled",
        }
    }
}

/// One lifecycle notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub schedule_id: Option<ScheduleId>,
    /// Free-form JSON payload (weight reading, failure reason, …).
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create a new event stamped with the current time.
    #[must_use]
    pub fn new(
        event_type: EventType,
        schedule_id: Option<ScheduleId>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            schedule_id,
            data,
            timestamp: crate::time::now(),
        }
    }
}
