//! Shared health state for the /health endpoint.
//! Updated by the sweeper, read by the API.

use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Default)]
pub struct HealthState {
    /// Epoch-ms of the last completed sweep pass (0 = none yet).
    last_sweep_ms: AtomicI64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_last_sweep_ms(&self, ms: i64) {
        self.last_sweep_ms.store(ms, Ordering::Relaxed);
    }

    pub fn last_sweep_ms(&self) -> i64 {
        self.last_sweep_ms.load(Ordering::Relaxed)
    }
}
