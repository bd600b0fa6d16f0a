//! Stock reservations — provisional decrements of feed stock.
//!
//! A token is issued by the inventory ledger when stock is reserved for a
//! schedule. It is later released (cancellation/failure) or committed
//! (delivery confirmed); both transitions are idempotent.

use serde::{Deserialize, Serialize};

use crate::id::{FeedTypeId, ReservationId};

/// Proof of a held stock reservation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReservationToken {
    pub id: ReservationId,
    pub feed_id: FeedTypeId,
    pub amount: f64,
}

impl ReservationToken {
    /// Issue a fresh token for `amount` of `feed_id`.
    #[must_use]
    pub fn new(feed_id: FeedTypeId, amount: f64) -> Self {
        Self {
            id: ReservationId::new(),
            feed_id,
            amount,
        }
    }
}

/// Ledger-side state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    /// Stock is decremented and earmarked.
    Held,
    /// Stock was restored; terminal.
    Released,
    /// Stock was consumed; terminal.
    Committed,
}
