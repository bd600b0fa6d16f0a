//! Immediate dispatch coordinator and delivery completion monitor.
//!
//! [`DispatchCoordinator::dispatch`] sends the feed command and, on
//! acknowledgement, spawns exactly one completion monitor per schedule. The
//! monitor polls the trough scale until the dispensed weight reaches the
//! target, the deadline elapses, the device stops answering, or an
//! operator cancels it. Every exit path settles the schedule status, the
//! stock reservation, and the audit trail before the monitor slot frees.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use serde::Serialize;
use tokio::time::{Instant, interval, sleep_until};
use tokio_util::sync::CancellationToken;

use feedlot_domain::error::{ConflictError, DeviceUnreachableError, FeedlotError};
use feedlot_domain::event::{Event, EventType};
use feedlot_domain::feeding_event::{FeedingEvent, FeedingOutcome};
use feedlot_domain::id::ScheduleId;
use feedlot_domain::reservation::ReservationToken;
use feedlot_domain::schedule::{FeedingSchedule, ScheduleStatus};
use feedlot_domain::time::{self, Timestamp};

use crate::connectivity::DeviceManager;
use crate::ledger::FeedLedger;
use crate::ports::{
    EventPublisher, FeedTypeRepository, FeederTransport, HistoryStore, ScheduleRepository,
};

/// Tuning for the delivery completion monitor.
#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    /// Maximum |reading − target| that still counts as delivered.
    pub tolerance: f64,
    /// Time between scale reads.
    pub poll_interval: Duration,
    /// Give-up deadline measured from dispatch acknowledgement.
    pub max_duration: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            tolerance: 0.1,
            poll_interval: Duration::from_secs(1),
            max_duration: Duration::from_secs(60),
        }
    }
}

/// What happened to an immediate dispatch request.
///
/// A refused feed command is reported here, not as a request error; the
/// schedule is already settled as `Failed` by the time the caller sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchReport {
    /// The device acknowledged and a completion monitor is running.
    Started,
    /// The device refused or never answered; no monitor was spawned.
    Failed { reason: String },
}

enum MonitorVerdict {
    Delivered { weight: f64 },
    TimedOut { reason: String },
    Cancelled,
}

/// Sends feed commands and supervises one completion monitor per schedule.
pub struct DispatchCoordinator<T, R, S, H, P> {
    device: Arc<DeviceManager<T>>,
    ledger: Arc<FeedLedger<R>>,
    schedules: S,
    history: H,
    events: P,
    settings: MonitorSettings,
    active: Arc<StdMutex<HashMap<ScheduleId, CancellationToken>>>,
}

impl<T, R, S, H, P> Clone for DispatchCoordinator<T, R, S, H, P>
where
    S: Clone,
    H: Clone,
    P: Clone,
{
    fn clone(&self) -> Self {
        Self {
            device: Arc::clone(&self.device),
            ledger: Arc::clone(&self.ledger),
            schedules: self.schedules.clone(),
            history: self.history.clone(),
            events: self.events.clone(),
            settings: self.settings,
            active: Arc::clone(&self.active),
        }
    }
}

impl<T, R, S, H, P> DispatchCoordinator<T, R, S, H, P>
where
    T: FeederTransport + Send + Sync + 'static,
    R: FeedTypeRepository + Send + Sync + 'static,
    S: ScheduleRepository + Clone + Send + Sync + 'static,
    H: HistoryStore + Clone + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    pub fn new(
        device: Arc<DeviceManager<T>>,
        ledger: Arc<FeedLedger<R>>,
        schedules: S,
        history: H,
        events: P,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            device,
            ledger,
            schedules,
            history,
            events,
            settings,
            active: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    /// Whether a completion monitor is currently running for `schedule_id`.
    #[must_use]
    pub fn is_active(&self, schedule_id: ScheduleId) -> bool {
        self.active
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains_key(&schedule_id)
    }

    /// Cancel the active monitor for `schedule_id`, if any. Returns whether
    /// one was running; settlement happens asynchronously in the monitor.
    pub fn cancel(&self, schedule_id: ScheduleId) -> bool {
        let active = self
            .active
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match active.get(&schedule_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Send the feed command for `schedule` and spawn its completion
    /// monitor.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::Conflict`] when a monitor is already running
    /// for this schedule, or a storage error while settling a refused
    /// dispatch. Device refusal itself is reported as
    /// [`DispatchReport::Failed`].
    #[tracing::instrument(skip(self, schedule, token), fields(schedule = %schedule.id))]
    pub async fn dispatch(
        &self,
        schedule: &FeedingSchedule,
        token: ReservationToken,
    ) -> Result<DispatchReport, FeedlotError> {
        let cancel = self.claim_slot(schedule.id)?;
        let started_at = time::now();

        if let Err(err) = self.device.send_feed_command(schedule.quantity).await {
            self.free_slot(schedule.id);
            self.settle_refused_dispatch(schedule, token, &err).await?;
            return Ok(DispatchReport::Failed {
                reason: err.to_string(),
            });
        }

        if let Err(err) = self
            .schedules
            .update_status(schedule.id, ScheduleStatus::Dispatched)
            .await
        {
            // The feed command went out but the schedule could not be
            // marked dispatched; no monitor will run, so the slot and the
            // reservation must not stay claimed.
            self.free_slot(schedule.id);
            if let Err(release_err) = self.ledger.release(&token).await {
                tracing::error!(schedule = %schedule.id, error = %release_err, "reservation release failed");
            }
            return Err(err);
        }
        self.publish(Event::new(
            EventType::DispatchStarted,
            Some(schedule.id),
            serde_json::json!({ "quantity": schedule.quantity }),
        ))
        .await;

        let monitor = self.clone();
        let schedule = schedule.clone();
        tokio::spawn(async move {
            monitor.run_monitor(schedule, token, cancel, started_at).await;
        });

        Ok(DispatchReport::Started)
    }

    fn claim_slot(&self, schedule_id: ScheduleId) -> Result<CancellationToken, FeedlotError> {
        let mut active = self
            .active
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match active.entry(schedule_id) {
            Entry::Occupied(_) => Err(ConflictError::DispatchInProgress {
                schedule_id: schedule_id.to_string(),
            }
            .into()),
            Entry::Vacant(slot) => {
                let token = CancellationToken::new();
                slot.insert(token.clone());
                Ok(token)
            }
        }
    }

    fn free_slot(&self, schedule_id: ScheduleId) {
        self.active
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&schedule_id);
    }

    async fn settle_refused_dispatch(
        &self,
        schedule: &FeedingSchedule,
        token: ReservationToken,
        err: &DeviceUnreachableError,
    ) -> Result<(), FeedlotError> {
        tracing::warn!(schedule = %schedule.id, error = %err, "dispatch refused by device");
        self.schedules
            .update_status(schedule.id, ScheduleStatus::Failed)
            .await?;
        self.ledger.release(&token).await?;
        self.history
            .record(
                FeedingEvent::builder()
                    .schedule_id(schedule.id)
                    .feed_id(schedule.feed_id)
                    .quantity(schedule.quantity)
                    .outcome(FeedingOutcome::TimedOut)
                    .notes(err.to_string())
                    .build(),
            )
            .await?;
        self.publish(Event::new(
            EventType::DispatchFailed,
            Some(schedule.id),
            serde_json::json!({ "reason": err.to_string() }),
        ))
        .await;
        Ok(())
    }

    async fn run_monitor(
        self,
        schedule: FeedingSchedule,
        token: ReservationToken,
        cancel: CancellationToken,
        started_at: Timestamp,
    ) {
        let verdict = self.watch_delivery(&schedule, &cancel).await;
        self.settle(&schedule, token, verdict, started_at).await;
        self.free_slot(schedule.id);
    }

    async fn watch_delivery(
        &self,
        schedule: &FeedingSchedule,
        cancel: &CancellationToken,
    ) -> MonitorVerdict {
        let deadline = sleep_until(Instant::now() + self.settings.max_duration);
        tokio::pin!(deadline);
        let mut ticker = interval(self.settings.poll_interval);

        loop {
            tokio::select! {
                () = cancel.cancelled() => return MonitorVerdict::Cancelled,
                () = &mut deadline => return self.deadline_verdict(),
                _ = ticker.tick() => {}
            }

            // The read itself stays cancellable: a stalled device must not
            // hold the monitor past a cancel request or the deadline.
            let reading = tokio::select! {
                () = cancel.cancelled() => return MonitorVerdict::Cancelled,
                () = &mut deadline => return self.deadline_verdict(),
                reading = self.device.read_weight() => reading,
            };

            match reading {
                Ok(weight) => {
                    self.publish(Event::new(
                        EventType::WeightReading,
                        Some(schedule.id),
                        serde_json::json!({ "weight": weight }),
                    ))
                    .await;
                    if (weight - schedule.quantity).abs() <= self.settings.tolerance {
                        return MonitorVerdict::Delivered { weight };
                    }
                }
                Err(err) => {
                    return MonitorVerdict::TimedOut {
                        reason: err.to_string(),
                    };
                }
            }
        }
    }

    fn deadline_verdict(&self) -> MonitorVerdict {
        MonitorVerdict::TimedOut {
            reason: format!(
                "target weight not confirmed within {}s",
                self.settings.max_duration.as_secs()
            ),
        }
    }

    /// Settle schedule status, reservation, audit record, and lifecycle
    /// event for a finished monitor. Runs detached, so failures are logged
    /// rather than propagated.
    async fn settle(
        &self,
        schedule: &FeedingSchedule,
        token: ReservationToken,
        verdict: MonitorVerdict,
        started_at: Timestamp,
    ) {
        let (status, outcome, notes, event) = match verdict {
            MonitorVerdict::Delivered { weight } => {
                tracing::info!(schedule = %schedule.id, weight, "delivery confirmed");
                if let Err(err) = self.ledger.commit(&token) {
                    tracing::error!(schedule = %schedule.id, error = %err, "reservation commit failed");
                }
                (
                    ScheduleStatus::Completed,
                    FeedingOutcome::Delivered,
                    None,
                    Event::new(
                        EventType::DeliveryConfirmed,
                        Some(schedule.id),
                        serde_json::json!({ "weight": weight }),
                    ),
                )
            }
            MonitorVerdict::TimedOut { reason } => {
                tracing::warn!(schedule = %schedule.id, %reason, "delivery not confirmed");
                if let Err(err) = self.ledger.release(&token).await {
                    tracing::error!(schedule = %schedule.id, error = %err, "reservation release failed");
                }
                (
                    ScheduleStatus::Failed,
                    FeedingOutcome::TimedOut,
                    Some(reason.clone()),
                    Event::new(
                        EventType::MonitorTimedOut,
                        Some(schedule.id),
                        serde_json::json!({ "reason": reason }),
                    ),
                )
            }
            MonitorVerdict::Cancelled => {
                tracing::info!(schedule = %schedule.id, "monitor cancelled");
                if let Err(err) = self.ledger.release(&token).await {
                    tracing::error!(schedule = %schedule.id, error = %err, "reservation release failed");
                }
                (
                    ScheduleStatus::Cancelled,
                    FeedingOutcome::Cancelled,
                    None,
                    Event::new(
                        EventType::MonitorCancelled,
                        Some(schedule.id),
                        serde_json::Value::Null,
                    ),
                )
            }
        };

        if let Err(err) = self.schedules.update_status(schedule.id, status).await {
            tracing::error!(schedule = %schedule.id, error = %err, "status update failed");
        }

        let mut record = FeedingEvent::builder()
            .schedule_id(schedule.id)
            .feed_id(schedule.feed_id)
            .quantity(schedule.quantity)
            .outcome(outcome)
            .started_at(started_at);
        if let Some(notes) = notes {
            record = record.notes(notes);
        }
        if let Err(err) = self.history.record(record.build()).await {
            tracing::error!(schedule = %schedule.id, error = %err, "audit record failed");
        }

        self.publish(event).await;
    }

    async fn publish(&self, event: Event) {
        if let Err(err) = self.events.publish(event).await {
            tracing::warn!(error = %err, "event publish failed");
        }
    }
}
