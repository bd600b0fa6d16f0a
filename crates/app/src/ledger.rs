//! Feed inventory ledger — the single point of truth for feed stock.
//!
//! All stock movements go through [`FeedLedger::reserve`],
//! [`FeedLedger::release`], and [`FeedLedger::commit`]. The
//! check-then-decrement of a reservation is serialized per feed id by an
//! async mutex held across the repository round-trip, so concurrent
//! requests can never jointly overcommit the same feed.
//!
//! Reservation tokens are process-local. A restart loses `Held` tokens but
//! never the persisted `remaining_quantity`, so stock is never oversold
//! after a crash.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex as AsyncMutex;

use feedlot_domain::error::{
    ConflictError, FeedlotError, InsufficientStockError, NotFoundError,
};
use feedlot_domain::feed_type::FeedType;
use feedlot_domain::id::{FeedTypeId, ReservationId};
use feedlot_domain::reservation::{ReservationState, ReservationToken};

use crate::ports::FeedTypeRepository;

struct ReservationRecord {
    token: ReservationToken,
    state: ReservationState,
}

/// Serialized reserve/release/commit over a [`FeedTypeRepository`].
pub struct FeedLedger<R> {
    repo: R,
    // One async mutex per feed id, held across check-then-decrement.
    feed_locks: StdMutex<HashMap<FeedTypeId, Arc<AsyncMutex<()>>>>,
    reservations: StdMutex<HashMap<ReservationId, ReservationRecord>>,
}

impl<R: FeedTypeRepository> FeedLedger<R> {
    /// Create a ledger backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            feed_locks: StdMutex::new(HashMap::new()),
            reservations: StdMutex::new(HashMap::new()),
        }
    }

    fn feed_lock(&self, feed_id: FeedTypeId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.feed_locks.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(locks.entry(feed_id).or_default())
    }

    /// Look up a feed type (pass-through for validation and display).
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn feed_type(&self, feed_id: FeedTypeId) -> Result<Option<FeedType>, FeedlotError> {
        self.repo.get_by_id(feed_id).await
    }

    /// Atomically reserve `amount` of `feed_id`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::InsufficientStock`] when `amount` exceeds the
    /// remaining quantity at the instant of the check,
    /// [`FeedlotError::NotFound`] when the feed does not exist, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn reserve(
        &self,
        feed_id: FeedTypeId,
        amount: f64,
    ) -> Result<ReservationToken, FeedlotError> {
        let lock = self.feed_lock(feed_id);
        let _guard = lock.lock().await;

        let mut feed = self.repo.get_by_id(feed_id).await?.ok_or(NotFoundError {
            entity: "FeedType",
            id: feed_id.to_string(),
        })?;

        if amount > feed.remaining_quantity {
            return Err(InsufficientStockError {
                feed_id: feed_id.to_string(),
                requested: amount,
                remaining: feed.remaining_quantity,
            }
            .into());
        }

        feed.remaining_quantity -= amount;
        self.repo.update(feed).await?;

        let token = ReservationToken::new(feed_id, amount);
        self.track(token, ReservationState::Held);
        tracing::debug!(reservation = %token.id, amount, "stock reserved");
        Ok(token)
    }

    /// Restore a held reservation's stock. Idempotent: releasing a token
    /// that is already released or committed is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::Conflict`] for a token this ledger never
    /// issued, or a storage error from the repository.
    #[tracing::instrument(skip(self, token), fields(reservation = %token.id))]
    pub async fn release(&self, token: &ReservationToken) -> Result<(), FeedlotError> {
        if !self.transition(token, ReservationState::Released)? {
            return Ok(());
        }

        let lock = self.feed_lock(token.feed_id);
        let _guard = lock.lock().await;

        let Some(mut feed) = self.repo.get_by_id(token.feed_id).await? else {
            // Feed deleted while a reservation was in flight; nothing to
            // restore into.
            tracing::warn!(feed = %token.feed_id, "released reservation for deleted feed");
            return Ok(());
        };
        feed.remaining_quantity = (feed.remaining_quantity + token.amount).min(feed.total_quantity);
        self.repo.update(feed).await?;
        tracing::debug!(amount = token.amount, "stock released");
        Ok(())
    }

    /// Finalize a reservation as consumed. No quantity change, just state
    /// bookkeeping. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`FeedlotError::Conflict`] for a token this ledger never
    /// issued.
    pub fn commit(&self, token: &ReservationToken) -> Result<(), FeedlotError> {
        self.transition(token, ReservationState::Committed)?;
        Ok(())
    }

    /// Sum of all currently-held reservation amounts for `feed_id`.
    #[must_use]
    pub fn held_amount(&self, feed_id: FeedTypeId) -> f64 {
        let reservations = self
            .reservations
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        reservations
            .values()
            .filter(|r| r.token.feed_id == feed_id && r.state == ReservationState::Held)
            .map(|r| r.token.amount)
            .sum()
    }

    fn track(&self, token: ReservationToken, state: ReservationState) {
        let mut reservations = self
            .reservations
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // Terminal records only exist to keep a racing second release or
        // commit a no-op; once a new reservation arrives that race window
        // is over and they can go, keeping the table bounded by the number
        // of held tokens.
        reservations.retain(|_, record| record.state == ReservationState::Held);
        reservations.insert(token.id, ReservationRecord { token, state });
    }

    #[cfg(test)]
    fn tracked_reservations(&self) -> usize {
        self.reservations
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Move a reservation to `target` if it is still held. Returns whether
    /// the transition happened (false = already terminal, no-op).
    fn transition(
        &self,
        token: &ReservationToken,
        target: ReservationState,
    ) -> Result<bool, FeedlotError> {
        let mut reservations = self
            .reservations
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let record = reservations
            .get_mut(&token.id)
            .ok_or(ConflictError::UnknownReservation {
                reservation_id: token.id.to_string(),
            })?;
        if record.state != ReservationState::Held {
            return Ok(false);
        }
        record.state = target;
        Ok(true)
    }
}
