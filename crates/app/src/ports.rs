//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside
//! world. They are defined here (in `app`) so that both the use-case layer
//! and the adapter layer can depend on them without creating circular
//! dependencies.

pub mod device;
pub mod event_bus;
pub mod history;
pub mod storage;

pub use device::FeederTransport;
pub use event_bus::EventPublisher;
pub use history::HistoryStore;
pub use storage::{FeedTypeRepository, ScheduleRepository, ZoneRepository};
