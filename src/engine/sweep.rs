use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info};

use crate::api::health::HealthState;
use crate::engine::lifecycle::{now_ms, LifecycleManager};
use crate::ledger::LedgerStore;

/// Periodic sweep loop: every tick, find and settle expired auctions.
///
/// Cadence is tuning, not correctness — settlement is idempotent (the
/// `is_active` predicate), so double or delayed ticks are safe. A failed
/// settlement leaves its auction open and the next tick retries it.
pub struct AuctionSweeper<L: LedgerStore> {
    manager: Arc<LifecycleManager<L>>,
    health: Arc<HealthState>,
    interval_secs: u64,
}

impl<L: LedgerStore> AuctionSweeper<L> {
    pub fn new(
        manager: Arc<LifecycleManager<L>>,
        health: Arc<HealthState>,
        interval_secs: u64,
    ) -> Self {
        Self { manager, health, interval_secs }
    }

    pub async fn run(self) {
        let mut ticker = interval(Duration::from_secs(self.interval_secs));
        ticker.tick().await; // skip immediate first tick

        loop {
            ticker.tick().await;
            let now = now_ms();
            match self.manager.sweep_expired(now).await {
                Ok(summary) => {
                    self.health.set_last_sweep_ms(now);
                    if summary.expired > 0 {
                        info!(
                            expired = summary.expired,
                            closed = summary.closed,
                            no_bids = summary.no_bids,
                            failed = summary.failed,
                            "sweep complete: {} closed, {} failed",
                            summary.closed,
                            summary.failed,
                        );
                    }
                }
                Err(e) => error!("sweep failed: {e}"),
            }
        }
    }
}
