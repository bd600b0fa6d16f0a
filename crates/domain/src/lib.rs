//! # feedlot-domain
//!
//! Pure domain model for the feedlot feeding-orchestration system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **`FeedType`** (a finite, shared feed stock with a unit)
//! - Define **Zones** (enclosures with capacity and occupancy)
//! - Define **`FeedingSchedule`** (timed or immediate feeding requests)
//! - Define **Reservations** (provisional stock decrements)
//! - Define **`DeviceConnection`** (the feeding-controller state machine data)
//! - Define **`FeedingEvent`** (append-only feeding history records)
//! - Define **Events** (in-process lifecycle notifications)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod event;
pub mod feed_type;
pub mod feeding_event;
pub mod reservation;
pub mod schedule;
pub mod zone;
