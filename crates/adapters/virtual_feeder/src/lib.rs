//! # feedlot-adapter-virtual-feeder
//!
//! Virtual/demo feeding controller for testing and demonstration. The
//! simulated feeder accepts feed commands and "dispenses" gradually: after
//! `send_feed`, the trough scale reading ramps up at a configurable rate
//! until the commanded quantity is reached, the way a real auger feeder
//! fills a trough. Time is measured with [`tokio::time::Instant`], so the
//! ramp follows paused test clocks.
//!
//! ## Dependency rule
//!
//! Depends on `feedlot-app` (port traits) and `feedlot-domain` only.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::time::Instant;

use feedlot_app::ports::FeederTransport;
use feedlot_domain::error::DeviceUnreachableError;

/// Default dispensing rate, in feed units per second.
pub const DEFAULT_RATE_PER_SECOND: f64 = 0.5;

const VIRTUAL_ADDRESS: &str = "virtual://feeder";

/// An in-flight dispense command.
#[derive(Debug, Clone, Copy)]
struct Dispense {
    quantity: f64,
    started: Instant,
}

#[derive(Debug, Default)]
struct Trough {
    /// Weight already settled in the trough before any in-flight dispense.
    base_weight: f64,
    dispensing: Option<Dispense>,
}

/// A simulated feeding controller with a trough scale.
#[derive(Debug)]
pub struct VirtualFeeder {
    rate_per_second: f64,
    trough: Mutex<Trough>,
    unreachable: AtomicBool,
}

impl Default for VirtualFeeder {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_PER_SECOND)
    }
}

impl VirtualFeeder {
    /// Create a feeder that dispenses `rate_per_second` feed units per
    /// second after each accepted command.
    #[must_use]
    pub fn new(rate_per_second: f64) -> Self {
        Self {
            rate_per_second,
            trough: Mutex::new(Trough::default()),
            unreachable: AtomicBool::new(false),
        }
    }

    /// Simulate the controller dropping off the network. While set, every
    /// round-trip fails.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Empty the trough and abort any in-flight dispense.
    pub fn reset(&self) {
        let mut trough = self.lock_trough();
        *trough = Trough::default();
    }

    fn check_reachable(&self) -> Result<(), DeviceUnreachableError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(DeviceUnreachableError {
                address: VIRTUAL_ADDRESS.to_owned(),
                reason: "simulated outage".to_owned(),
            });
        }
        Ok(())
    }

    /// Current scale reading, folding a finished dispense into the base.
    fn current_weight(&self) -> f64 {
        let mut trough = self.lock_trough();
        if let Some(dispense) = trough.dispensing {
            let elapsed = dispense.started.elapsed().as_secs_f64();
            let dispensed = (elapsed * self.rate_per_second).min(dispense.quantity);
            if dispensed >= dispense.quantity {
                trough.base_weight += dispense.quantity;
                trough.dispensing = None;
            } else {
                return trough.base_weight + dispensed;
            }
        }
        trough.base_weight
    }

    fn lock_trough(&self) -> std::sync::MutexGuard<'_, Trough> {
        self.trough
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl FeederTransport for VirtualFeeder {
    fn address(&self) -> &str {
        VIRTUAL_ADDRESS
    }

    async fn probe(&self) -> Result<(), DeviceUnreachableError> {
        self.check_reachable()
    }

    async fn read_weight(&self) -> Result<f64, DeviceUnreachableError> {
        self.check_reachable()?;
        Ok(self.current_weight())
    }

    #[tracing::instrument(skip(self))]
    async fn send_feed(&self, quantity: f64) -> Result<(), DeviceUnreachableError> {
        self.check_reachable()?;
        if quantity <= 0.0 {
            return Err(DeviceUnreachableError {
                address: VIRTUAL_ADDRESS.to_owned(),
                reason: format!("controller refused quantity {quantity}"),
            });
        }

        let mut trough = self.lock_trough();
        // A new command supersedes any in-flight dispense; settle what
        // was already dispensed first.
        if let Some(dispense) = trough.dispensing.take() {
            let elapsed = dispense.started.elapsed().as_secs_f64();
            trough.base_weight += (elapsed * self.rate_per_second).min(dispense.quantity);
        }
        trough.dispensing = Some(Dispense {
            quantity,
            started: Instant::now(),
        });
        tracing::debug!(quantity, "virtual feeder dispensing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn should_start_with_empty_trough() {
        let feeder = VirtualFeeder::default();
        assert_eq!(feeder.read_weight().await.unwrap(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_ramp_weight_while_dispensing() {
        let feeder = VirtualFeeder::new(1.0);
        feeder.send_feed(5.0).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(feeder.read_weight().await.unwrap(), 2.0);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(feeder.read_weight().await.unwrap(), 4.0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_at_commanded_quantity() {
        let feeder = VirtualFeeder::new(1.0);
        feeder.send_feed(5.0).await.unwrap();

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(feeder.read_weight().await.unwrap(), 5.0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_accumulate_across_commands() {
        let feeder = VirtualFeeder::new(1.0);
        feeder.send_feed(2.0).await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;

        feeder.send_feed(3.0).await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;

        assert_eq!(feeder.read_weight().await.unwrap(), 5.0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_settle_partial_dispense_when_superseded() {
        let feeder = VirtualFeeder::new(1.0);
        feeder.send_feed(10.0).await.unwrap();
        tokio::time::advance(Duration::from_secs(3)).await;

        // Supersede mid-dispense: 3.0 already in the trough.
        feeder.send_feed(1.0).await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;

        assert_eq!(feeder.read_weight().await.unwrap(), 4.0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_refuse_non_positive_quantity() {
        let feeder = VirtualFeeder::default();
        let err = feeder.send_feed(0.0).await.unwrap_err();
        assert!(err.reason.contains("refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn should_fail_round_trips_while_unreachable() {
        let feeder = VirtualFeeder::default();
        feeder.set_unreachable(true);

        assert!(feeder.probe().await.is_err());
        assert!(feeder.read_weight().await.is_err());
        assert!(feeder.send_feed(1.0).await.is_err());

        feeder.set_unreachable(false);
        assert!(feeder.probe().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn should_empty_trough_on_reset() {
        let feeder = VirtualFeeder::new(1.0);
        feeder.send_feed(2.0).await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(feeder.read_weight().await.unwrap(), 2.0);

        feeder.reset();
        assert_eq!(feeder.read_weight().await.unwrap(), 0.0);
    }
}
