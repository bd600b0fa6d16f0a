//! # feedlot-adapter-http-axum
//!
//! HTTP API adapter using [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Expose the feeding orchestration services as a JSON REST API
//! - Map [`FeedlotError`](feedlot_domain::error::FeedlotError) onto HTTP
//!   status codes
//! - Relay lifecycle events over an SSE stream
//!
//! ## Dependency rule
//! Depends on `feedlot-app` (services, ports) and `feedlot-domain`.
//! The `app` and `domain` crates must never reference this adapter.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use router::build;
pub use state::AppState;
