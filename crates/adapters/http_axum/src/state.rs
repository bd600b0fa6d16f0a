//! Shared application state for axum handlers.

use std::sync::Arc;

use feedlot_app::connectivity::DeviceManager;
use feedlot_app::event_bus::InProcessEventBus;
use feedlot_app::ports::{
    FeedTypeRepository, FeederTransport, HistoryStore, ScheduleRepository, ZoneRepository,
};
use feedlot_app::services::{FeedTypeService, ScheduleService, ZoneService};

/// Application state shared across all axum handlers.
///
/// Generic over the transport and repository types to avoid dynamic
/// dispatch. The event publisher is pinned to [`InProcessEventBus`]
/// because the SSE endpoint needs its concrete `subscribe`. `Clone` is
/// implemented manually so the underlying types themselves do not need to
/// be `Clone` — only the `Arc` wrappers are cloned.
pub struct AppState<T, R, S, H, Z> {
    /// Schedule creation, cancellation, and dispatch hand-off.
    pub schedule_service: Arc<ScheduleService<T, R, S, H, InProcessEventBus, Z>>,
    /// Feed type reference data CRUD.
    pub feed_type_service: Arc<FeedTypeService<R, S>>,
    /// Zone reference data CRUD.
    pub zone_service: Arc<ZoneService<Z>>,
    /// Connectivity manager for the feeding controller.
    pub device: Arc<DeviceManager<T>>,
    /// Append-only feeding audit trail, for reporting.
    pub history: Arc<H>,
    /// Lifecycle event bus, for the SSE stream.
    pub event_bus: InProcessEventBus,
}

impl<T, R, S, H, Z> Clone for AppState<T, R, S, H, Z> {
    fn clone(&self) -> Self {
        Self {
            schedule_service: Arc::clone(&self.schedule_service),
            feed_type_service: Arc::clone(&self.feed_type_service),
            zone_service: Arc::clone(&self.zone_service),
            device: Arc::clone(&self.device),
            history: Arc::clone(&self.history),
            event_bus: self.event_bus.clone(),
        }
    }
}

impl<T, R, S, H, Z> AppState<T, R, S, H, Z>
where
    T: FeederTransport + Send + Sync + 'static,
    R: FeedTypeRepository + Send + Sync + 'static,
    S: ScheduleRepository + Clone + Send + Sync + 'static,
    H: HistoryStore + Clone + Send + Sync + 'static,
    Z: ZoneRepository + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` components.
    ///
    /// The device manager is shared with the dispatch coordinator, so it
    /// arrives already wrapped.
    pub fn new(
        schedule_service: ScheduleService<T, R, S, H, InProcessEventBus, Z>,
        feed_type_service: FeedTypeService<R, S>,
        zone_service: ZoneService<Z>,
        device: Arc<DeviceManager<T>>,
        history: H,
        event_bus: InProcessEventBus,
    ) -> Self {
        Self {
            schedule_service: Arc::new(schedule_service),
            feed_type_service: Arc::new(feed_type_service),
            zone_service: Arc::new(zone_service),
            device,
            history: Arc::new(history),
            event_bus,
        }
    }
}
