//! Application services — one per aggregate, generic over the ports.

pub mod feed_type_service;
pub mod schedule_service;
pub mod zone_service;

pub use feed_type_service::FeedTypeService;
pub use schedule_service::{CreateScheduleRequest, CreatedSchedule, ScheduleService};
pub use zone_service::ZoneService;
