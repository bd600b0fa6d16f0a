//! # feedlot-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `FeedTypeRepository`, `ZoneRepository`, `ScheduleRepository` — persistence
//!   - `HistoryStore` — append-only feeding audit trail
//!   - `FeederTransport` — wire protocol to the feeding controller
//!   - `EventPublisher` — lifecycle notifications
//! - Provide the **feed inventory ledger** (serialized reserve/release/commit)
//! - Provide the **device connectivity manager** (mutex-guarded state machine)
//! - Provide the **dispatch coordinator** and its bounded, cancellable
//!   completion monitors
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `feedlot-domain` only (plus `tokio::sync`/`tokio::time` and
//! `tokio-util` for channels, timers, and cancellation).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod connectivity;
pub mod dispatch;
pub mod event_bus;
pub mod ledger;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;
