//! In-memory fakes for the ports, shared by the unit tests in this crate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use feedlot_domain::error::{DeviceUnreachableError, FeedlotError};
use feedlot_domain::feed_type::FeedType;
use feedlot_domain::feeding_event::{FeedingEvent, FeedingOutcome};
use feedlot_domain::id::{FeedTypeId, ScheduleId, ZoneId};
use feedlot_domain::schedule::{FeedingSchedule, ScheduleStatus};
use feedlot_domain::zone::Zone;

use crate::ports::{
    FeedTypeRepository, FeederTransport, HistoryStore, ScheduleRepository, ZoneRepository,
};

#[derive(Clone, Default)]
pub(crate) struct InMemoryFeedRepo {
    store: Arc<Mutex<HashMap<FeedTypeId, FeedType>>>,
}

impl InMemoryFeedRepo {
    pub(crate) fn with(feed: FeedType) -> Self {
        let repo = Self::default();
        repo.store.lock().unwrap().insert(feed.id, feed);
        repo
    }

    pub(crate) fn remaining(&self, id: FeedTypeId) -> f64 {
        self.store.lock().unwrap()[&id].remaining_quantity
    }

    pub(crate) fn contains(&self, id: FeedTypeId) -> bool {
        self.store.lock().unwrap().contains_key(&id)
    }
}

impl FeedTypeRepository for InMemoryFeedRepo {
    fn create(&self, feed: FeedType) -> impl Future<Output = Result<FeedType, FeedlotError>> + Send {
        self.store.lock().unwrap().insert(feed.id, feed.clone());
        async { Ok(feed) }
    }

    fn get_by_id(
        &self,
        id: FeedTypeId,
    ) -> impl Future<Output = Result<Option<FeedType>, FeedlotError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<FeedType>, FeedlotError>> + Send {
        let result: Vec<FeedType> = self.store.lock().unwrap().values().cloned().collect();
        async { Ok(result) }
    }

    fn update(&self, feed: FeedType) -> impl Future<Output = Result<FeedType, FeedlotError>> + Send {
        self.store.lock().unwrap().insert(feed.id, feed.clone());
        async { Ok(feed) }
    }

    fn delete(&self, id: FeedTypeId) -> impl Future<Output = Result<(), FeedlotError>> + Send {
        self.store.lock().unwrap().remove(&id);
        async { Ok(()) }
    }
}

#[derive(Clone, Default)]
pub(crate) struct InMemoryZoneRepo {
    store: Arc<Mutex<HashMap<ZoneId, Zone>>>,
}

impl InMemoryZoneRepo {
    pub(crate) fn with(zone: Zone) -> Self {
        let repo = Self::default();
        repo.store.lock().unwrap().insert(zone.id, zone);
        repo
    }
}

impl ZoneRepository for InMemoryZoneRepo {
    fn create(&self, zone: Zone) -> impl Future<Output = Result<Zone, FeedlotError>> + Send {
        self.store.lock().unwrap().insert(zone.id, zone.clone());
        async { Ok(zone) }
    }

    fn get_by_id(
        &self,
        id: ZoneId,
    ) -> impl Future<Output = Result<Option<Zone>, FeedlotError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Zone>, FeedlotError>> + Send {
        let result: Vec<Zone> = self.store.lock().unwrap().values().cloned().collect();
        async { Ok(result) }
    }
}

#[derive(Clone, Default)]
pub(crate) struct InMemoryScheduleRepo {
    store: Arc<Mutex<HashMap<ScheduleId, FeedingSchedule>>>,
}

impl InMemoryScheduleRepo {
    pub(crate) fn status(&self, id: ScheduleId) -> ScheduleStatus {
        self.store.lock().unwrap()[&id].status
    }

    pub(crate) fn len(&self) -> usize {
        self.store.lock().unwrap().len()
    }
}

impl ScheduleRepository for InMemoryScheduleRepo {
    fn create(
        &self,
        schedule: FeedingSchedule,
    ) -> impl Future<Output = Result<FeedingSchedule, FeedlotError>> + Send {
        self.store
            .lock()
            .unwrap()
            .insert(schedule.id, schedule.clone());
        async { Ok(schedule) }
    }

    fn get_by_id(
        &self,
        id: ScheduleId,
    ) -> impl Future<Output = Result<Option<FeedingSchedule>, FeedlotError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<FeedingSchedule>, FeedlotError>> + Send {
        let result: Vec<FeedingSchedule> = self.store.lock().unwrap().values().cloned().collect();
        async { Ok(result) }
    }

    fn update_status(
        &self,
        id: ScheduleId,
        status: ScheduleStatus,
    ) -> impl Future<Output = Result<(), FeedlotError>> + Send {
        if let Some(schedule) = self.store.lock().unwrap().get_mut(&id) {
            schedule.status = status;
        }
        async { Ok(()) }
    }

    fn count_active_by_feed(
        &self,
        feed_id: FeedTypeId,
    ) -> impl Future<Output = Result<u64, FeedlotError>> + Send {
        let count = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.feed_id == feed_id && !s.status.is_terminal())
            .count() as u64;
        async move { Ok(count) }
    }
}

#[derive(Clone, Default)]
pub(crate) struct InMemoryHistory {
    records: Arc<Mutex<Vec<FeedingEvent>>>,
}

impl InMemoryHistory {
    pub(crate) fn outcomes(&self) -> Vec<FeedingOutcome> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.outcome)
            .collect()
    }
}

impl HistoryStore for InMemoryHistory {
    fn record(
        &self,
        event: FeedingEvent,
    ) -> impl Future<Output = Result<FeedingEvent, FeedlotError>> + Send {
        self.records.lock().unwrap().push(event.clone());
        async { Ok(event) }
    }

    fn list_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<FeedingEvent>, FeedlotError>> + Send {
        let mut records: Vec<FeedingEvent> =
            self.records.lock().unwrap().iter().rev().cloned().collect();
        records.truncate(limit);
        async { Ok(records) }
    }

    fn find_by_schedule(
        &self,
        schedule_id: ScheduleId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<FeedingEvent>, FeedlotError>> + Send {
        let mut records: Vec<FeedingEvent> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.schedule_id == schedule_id)
            .cloned()
            .collect();
        records.truncate(limit);
        async { Ok(records) }
    }
}

const SCRIPTED_ADDRESS: &str = "http://feeder.test:8080";

/// Transport whose behavior is driven by the test: the scale reading is
/// settable, and each operation can be made to fail or stall.
#[derive(Clone, Default)]
pub(crate) struct ScriptedFeeder {
    weight: Arc<Mutex<f64>>,
    fail: Arc<AtomicBool>,
    refuse_feed: Arc<AtomicBool>,
    drop_reads: Arc<AtomicBool>,
    stall: Arc<AtomicBool>,
}

impl ScriptedFeeder {
    pub(crate) fn set_weight(&self, weight: f64) {
        *self.weight.lock().unwrap() = weight;
    }

    pub(crate) fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_refuse_feed(&self, refuse: bool) {
        self.refuse_feed.store(refuse, Ordering::SeqCst);
    }

    pub(crate) fn set_drop_reads(&self, drop: bool) {
        self.drop_reads.store(drop, Ordering::SeqCst);
    }

    pub(crate) fn set_stall(&self, stall: bool) {
        self.stall.store(stall, Ordering::SeqCst);
    }

    fn respond<R: Send>(
        &self,
        broken: bool,
        value: R,
    ) -> impl Future<Output = Result<R, DeviceUnreachableError>> + Send {
        let stall = self.stall.load(Ordering::SeqCst);
        let fail = broken || self.fail.load(Ordering::SeqCst);
        async move {
            if stall {
                std::future::pending::<()>().await;
            }
            if fail {
                return Err(DeviceUnreachableError {
                    address: SCRIPTED_ADDRESS.to_owned(),
                    reason: "connection refused".to_owned(),
                });
            }
            Ok(value)
        }
    }
}

impl FeederTransport for ScriptedFeeder {
    fn address(&self) -> &str {
        SCRIPTED_ADDRESS
    }

    fn probe(&self) -> impl Future<Output = Result<(), DeviceUnreachableError>> + Send {
        self.respond(false, ())
    }

    fn read_weight(&self) -> impl Future<Output = Result<f64, DeviceUnreachableError>> + Send {
        let weight = *self.weight.lock().unwrap();
        self.respond(self.drop_reads.load(Ordering::SeqCst), weight)
    }

    fn send_feed(
        &self,
        _quantity: f64,
    ) -> impl Future<Output = Result<(), DeviceUnreachableError>> + Send {
        self.respond(self.refuse_feed.load(Ordering::SeqCst), ())
    }
}
