//! In-memory wiring of the whole application state, for router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use feedlot_app::connectivity::DeviceManager;
use feedlot_app::dispatch::{DispatchCoordinator, MonitorSettings};
use feedlot_app::event_bus::InProcessEventBus;
use feedlot_app::ledger::FeedLedger;
use feedlot_app::ports::{
    FeedTypeRepository, FeederTransport, HistoryStore, ScheduleRepository, ZoneRepository,
};
use feedlot_app::services::{FeedTypeService, ScheduleService, ZoneService};
use feedlot_domain::error::{DeviceUnreachableError, FeedlotError};
use feedlot_domain::feed_type::FeedType;
use feedlot_domain::feeding_event::FeedingEvent;
use feedlot_domain::id::{FeedTypeId, ScheduleId, ZoneId};
use feedlot_domain::schedule::{FeedingSchedule, ScheduleStatus};
use feedlot_domain::zone::Zone;

use crate::state::AppState;

#[derive(Clone, Default)]
pub(crate) struct InMemoryFeeds {
    store: Arc<Mutex<HashMap<FeedTypeId, FeedType>>>,
}

impl InMemoryFeeds {
    pub(crate) fn remaining(&self, id: FeedTypeId) -> f64 {
        self.store.lock().unwrap()[&id].remaining_quantity
    }
}

impl FeedTypeRepository for InMemoryFeeds {
    async fn create(&self, feed: FeedType) -> Result<FeedType, FeedlotError> {
        self.store.lock().unwrap().insert(feed.id, feed.clone());
        Ok(feed)
    }

    async fn get_by_id(&self, id: FeedTypeId) -> Result<Option<FeedType>, FeedlotError> {
        Ok(self.store.lock().unwrap().get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<FeedType>, FeedlotError> {
        Ok(self.store.lock().unwrap().values().cloned().collect())
    }

    async fn update(&self, feed: FeedType) -> Result<FeedType, FeedlotError> {
        self.store.lock().unwrap().insert(feed.id, feed.clone());
        Ok(feed)
    }

    async fn delete(&self, id: FeedTypeId) -> Result<(), FeedlotError> {
        self.store.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct InMemoryZones {
    store: Arc<Mutex<HashMap<ZoneId, Zone>>>,
}

impl ZoneRepository for InMemoryZones {
    async fn create(&self, zone: Zone) -> Result<Zone, FeedlotError> {
        self.store.lock().unwrap().insert(zone.id, zone.clone());
        Ok(zone)
    }

    async fn get_by_id(&self, id: ZoneId) -> Result<Option<Zone>, FeedlotError> {
        Ok(self.store.lock().unwrap().get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Zone>, FeedlotError> {
        Ok(self.store.lock().unwrap().values().cloned().collect())
    }
}

#[derive(Clone, Default)]
pub(crate) struct InMemorySchedules {
    store: Arc<Mutex<HashMap<ScheduleId, FeedingSchedule>>>,
}

impl InMemorySchedules {
    pub(crate) fn status(&self, id: ScheduleId) -> ScheduleStatus {
        self.store.lock().unwrap()[&id].status
    }
}

impl ScheduleRepository for InMemorySchedules {
    async fn create(&self, schedule: FeedingSchedule) -> Result<FeedingSchedule, FeedlotError> {
        self.store
            .lock()
            .unwrap()
            .insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn get_by_id(&self, id: ScheduleId) -> Result<Option<FeedingSchedule>, FeedlotError> {
        Ok(self.store.lock().unwrap().get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<FeedingSchedule>, FeedlotError> {
        Ok(self.store.lock().unwrap().values().cloned().collect())
    }

    async fn update_status(
        &self,
        id: ScheduleId,
        status: ScheduleStatus,
    ) -> Result<(), FeedlotError> {
        if let Some(schedule) = self.store.lock().unwrap().get_mut(&id) {
            schedule.status = status;
        }
        Ok(())
    }

    async fn count_active_by_feed(&self, feed_id: FeedTypeId) -> Result<u64, FeedlotError> {
        let count = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.feed_id == feed_id && !s.status.is_terminal())
            .count();
        Ok(count as u64)
    }
}

#[derive(Clone, Default)]
pub(crate) struct InMemoryHistory {
    records: Arc<Mutex<Vec<FeedingEvent>>>,
}

impl HistoryStore for InMemoryHistory {
    async fn record(&self, event: FeedingEvent) -> Result<FeedingEvent, FeedlotError> {
        self.records.lock().unwrap().push(event.clone());
        Ok(event)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<FeedingEvent>, FeedlotError> {
        let mut records: Vec<FeedingEvent> =
            self.records.lock().unwrap().iter().rev().cloned().collect();
        records.truncate(limit);
        Ok(records)
    }

    async fn find_by_schedule(
        &self,
        schedule_id: ScheduleId,
        limit: usize,
    ) -> Result<Vec<FeedingEvent>, FeedlotError> {
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
        Ok(records)
    }
}

/// Transport stub whose behavior is flipped by the test.
#[derive(Clone, Default)]
pub(crate) struct TestFeeder {
    weight: Arc<Mutex<f64>>,
    unreachable: Arc<AtomicBool>,
}

impl TestFeeder {
    pub(crate) fn set_weight(&self, weight: f64) {
        *self.weight.lock().unwrap() = weight;
    }

    pub(crate) fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), DeviceUnreachableError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(DeviceUnreachableError {
                address: "http://feeder.test:8080".to_owned(),
                reason: "connection refused".to_owned(),
            });
        }
        Ok(())
    }
}

impl FeederTransport for TestFeeder {
    fn address(&self) -> &str {
        "http://feeder.test:8080"
    }

    async fn probe(&self) -> Result<(), DeviceUnreachableError> {
        self.check()
    }

    async fn read_weight(&self) -> Result<f64, DeviceUnreachableError> {
        self.check()?;
        Ok(*self.weight.lock().unwrap())
    }

    async fn send_feed(&self, _quantity: f64) -> Result<(), DeviceUnreachableError> {
        self.check()
    }
}

pub(crate) type TestState =
    AppState<TestFeeder, InMemoryFeeds, InMemorySchedules, InMemoryHistory, InMemoryZones>;

pub(crate) struct TestContext {
    pub(crate) state: TestState,
    pub(crate) transport: TestFeeder,
    pub(crate) feeds: InMemoryFeeds,
    pub(crate) zones: InMemoryZones,
    pub(crate) schedules: InMemorySchedules,
    pub(crate) history: InMemoryHistory,
}

impl TestContext {
    pub(crate) async fn seed_zone(&self) -> ZoneId {
        let zone = Zone::builder()
            .name("Coop A")
            .capacity(120)
            .current_occupancy(80)
            .build()
            .unwrap();
        let id = zone.id;
        self.zones.create(zone).await.unwrap();
        id
    }

    pub(crate) async fn seed_feed(&self, total: f64) -> FeedTypeId {
        let feed = FeedType::builder()
            .name("Pellets")
            .unit("kg")
            .total_quantity(total)
            .build()
            .unwrap();
        let id = feed.id;
        self.feeds.create(feed).await.unwrap();
        id
    }
}

pub(crate) fn context() -> TestContext {
    let feeds = InMemoryFeeds::default();
    let zones = InMemoryZones::default();
    let schedules = InMemorySchedules::default();
    let history = InMemoryHistory::default();
    let transport = TestFeeder::default();
    let event_bus = InProcessEventBus::default();

    let device = Arc::new(DeviceManager::new(
        transport.clone(),
        Duration::from_secs(5),
    ));
    let ledger = Arc::new(FeedLedger::new(feeds.clone()));
    let coordinator = DispatchCoordinator::new(
        Arc::clone(&device),
        Arc::clone(&ledger),
        schedules.clone(),
        history.clone(),
        event_bus.clone(),
        MonitorSettings::default(),
    );
    let schedule_service = ScheduleService::new(
        zones.clone(),
        ledger,
        schedules.clone(),
        event_bus.clone(),
        coordinator,
    );
    let feed_type_service = FeedTypeService::new(feeds.clone(), schedules.clone());
    let zone_service = ZoneService::new(zones.clone());

    let state = AppState::new(
        schedule_service,
        feed_type_service,
        zone_service,
        device,
        history.clone(),
        event_bus,
    );

    TestContext {
        state,
        transport,
        feeds,
        zones,
        schedules,
        history,
    }
}
