//! Feeding schedule manager.
//!
//! Owns schedule creation (validation, stock reservation, persistence,
//! immediate hand-off to the dispatch coordinator) and cancellation. For a
//! `Scheduled` record the reservation token is kept here; once dispatched,
//! the completion monitor owns it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use serde::{Deserialize, Serialize};

use feedlot_domain::error::{ConflictError, FeedlotError, NotFoundError, ValidationError};
use feedlot_domain::event::{Event, EventType};
use feedlot_domain::id::{FeedTypeId, ScheduleId, ZoneId};
use feedlot_domain::reservation::ReservationToken;
use feedlot_domain::schedule::{FeedingSchedule, ScheduleStatus};
use feedlot_domain::time::{self, Timestamp};

use crate::dispatch::{DispatchCoordinator, DispatchReport};
use crate::ledger::FeedLedger;
use crate::ports::{
    EventPublisher, FeedTypeRepository, FeederTransport, HistoryStore, ScheduleRepository,
    ZoneRepository,
};

/// Payload for creating a feeding schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScheduleRequest {
    pub zone_id: ZoneId,
    pub feed_id: FeedTypeId,
    pub quantity: f64,
    pub feeding_times: Vec<Timestamp>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Trigger the controller right away instead of only recording.
    #[serde(default)]
    pub immediate: bool,
}

/// A freshly created schedule, with the dispatch report when the request
/// was immediate.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedSchedule {
    pub schedule: FeedingSchedule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchReport>,
}

/// Use-cases around [`FeedingSchedule`]s.
pub struct ScheduleService<T, R, S, H, P, Z> {
    zones: Z,
    ledger: Arc<FeedLedger<R>>,
    schedules: S,
    events: P,
    coordinator: DispatchCoordinator<T, R, S, H, P>,
    // Tokens for Scheduled records; dispatched tokens live in the monitor.
    held: Arc<StdMutex<HashMap<ScheduleId, ReservationToken>>>,
}

impl<T, R, S, H, P, Z> Clone for ScheduleService<T, R, S, H, P, Z>
where
    S: Clone,
    H: Clone,
    P: Clone,
    Z: Clone,
{
    fn clone(&self) -> Self {
        Self {
            zones: self.zones.clone(),
            ledger: Arc::clone(&self.ledger),
            schedules: self.schedules.clone(),
            events: self.events.clone(),
            coordinator: self.coordinator.clone(),
            held: Arc::clone(&self.held),
        }
    }
}

impl<T, R, S, H, P, Z> ScheduleService<T, R, S, H, P, Z>
where
    T: FeederTransport + Send + Sync + 'static,
    R: FeedTypeRepository + Send + Sync + 'static,
    S: ScheduleRepository + Clone + Send + Sync + 'static,
    H: HistoryStore + Clone + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
    Z: ZoneRepository,
{
    pub fn new(
        zones: Z,
        ledger: Arc<FeedLedger<R>>,
        schedules: S,
        events: P,
        coordinator: DispatchCoordinator<T, R, S, H, P>,
    ) -> Self {
        Self {
            zones,
            ledger,
            schedules,
            events,
            coordinator,
            held: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    /// Validate the request, reserve stock, persist the schedule, and hand
    /// off to the dispatch coordinator when `immediate`.
    ///
    /// The dispatch report says whether the feed command was *initiated*;
    /// delivery confirmation arrives later through the monitor.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::NotFound`] for an unknown zone or feed,
    /// [`FeedlotError::Validation`] for empty or past feeding times or a
    /// non-positive quantity, [`FeedlotError::InsufficientStock`] when the
    /// reservation fails, or a storage error.
    #[tracing::instrument(skip(self, request), fields(zone = %request.zone_id, feed = %request.feed_id))]
    pub async fn create(
        &self,
        request: CreateScheduleRequest,
    ) -> Result<CreatedSchedule, FeedlotError> {
        self.zones
            .get_by_id(request.zone_id)
            .await?
            .ok_or(NotFoundError {
                entity: "Zone",
                id: request.zone_id.to_string(),
            })?;
        self.ledger
            .feed_type(request.feed_id)
            .await?
            .ok_or(NotFoundError {
                entity: "FeedType",
                id: request.feed_id.to_string(),
            })?;

        if request.feeding_times.is_empty() {
            return Err(ValidationError::EmptyFeedingTimes.into());
        }
        let now = time::now();
        if let Some(past) = request.feeding_times.iter().find(|t| **t <= now) {
            return Err(ValidationError::PastFeedingTime(*past).into());
        }
        if request.quantity <= 0.0 {
            return Err(ValidationError::NonPositiveQuantity.into());
        }

        let token = self.ledger.reserve(request.feed_id, request.quantity).await?;
        match self.persist_and_dispatch(request, token).await {
            Ok(created) => Ok(created),
            Err(err) => {
                // Reservation must not outlive a failed creation.
                if let Err(release_err) = self.ledger.release(&token).await {
                    tracing::error!(error = %release_err, "reservation release failed");
                }
                Err(err)
            }
        }
    }

    async fn persist_and_dispatch(
        &self,
        request: CreateScheduleRequest,
        token: ReservationToken,
    ) -> Result<CreatedSchedule, FeedlotError> {
        let mut builder = FeedingSchedule::builder()
            .zone_id(request.zone_id)
            .feed_id(request.feed_id)
            .quantity(request.quantity)
            .feeding_times(request.feeding_times)
            .immediate(request.immediate);
        if let Some(notes) = request.notes {
            builder = builder.notes(notes);
        }
        let schedule = builder.build()?;
        let mut schedule = self.schedules.create(schedule).await?;
        tracing::info!(schedule = %schedule.id, "schedule created");

        self.publish(Event::new(
            EventType::ScheduleCreated,
            Some(schedule.id),
            serde_json::json!({ "quantity": schedule.quantity, "immediate": schedule.immediate }),
        ))
        .await;

        if !schedule.immediate {
            self.held
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .insert(schedule.id, token);
            return Ok(CreatedSchedule {
                schedule,
                dispatch: None,
            });
        }

        let report = self.coordinator.dispatch(&schedule, token).await?;
        schedule.status = match report {
            DispatchReport::Started => ScheduleStatus::Dispatched,
            DispatchReport::Failed { .. } => ScheduleStatus::Failed,
        };
        Ok(CreatedSchedule {
            schedule,
            dispatch: Some(report),
        })
    }

    /// Fetch one schedule.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::NotFound`] when the id is unknown.
    pub async fn get(&self, id: ScheduleId) -> Result<FeedingSchedule, FeedlotError> {
        self.schedules.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "FeedingSchedule",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all schedules.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list(&self) -> Result<Vec<FeedingSchedule>, FeedlotError> {
        self.schedules.get_all().await
    }

    /// Cancel a schedule: release its reservation when still `Scheduled`,
    /// stop the completion monitor when `Dispatched`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::NotFound`] for an unknown id and
    /// [`FeedlotError::Conflict`] when the schedule already reached a
    /// terminal status.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, id: ScheduleId) -> Result<(), FeedlotError> {
        let schedule = self.get(id).await?;
        if schedule.status.is_terminal() {
            return Err(ConflictError::AlreadyTerminal {
                schedule_id: id.to_string(),
                status: schedule.status.to_string(),
            }
            .into());
        }

        if schedule.status == ScheduleStatus::Dispatched {
            if self.coordinator.cancel(id) {
                // The monitor settles status, reservation, and audit trail.
                tracing::info!(schedule = %id, "monitor cancellation requested");
                return Ok(());
            }
            // No monitor anymore: it settled between the read above and
            // the cancel request. Report the fresh status instead of
            // overwriting it.
            let current = self.get(id).await?;
            if current.status.is_terminal() {
                return Err(ConflictError::AlreadyTerminal {
                    schedule_id: id.to_string(),
                    status: current.status.to_string(),
                }
                .into());
            }
        }

        let token = self
            .held
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&id);
        if let Some(token) = token {
            self.ledger.release(&token).await?;
        }
        self.schedules
            .update_status(id, ScheduleStatus::Cancelled)
            .await?;
        self.publish(Event::new(
            EventType::ScheduleCancelled,
            Some(id),
            serde_json::Value::Null,
        ))
        .await;
        tracing::info!(schedule = %id, "schedule cancelled");
        Ok(())
    }

    async fn publish(&self, event: Event) {
        if let Err(err) = self.events.publish(event).await {
            tracing::warn!(error = %err, "event publish failed");
        }
    }
}
