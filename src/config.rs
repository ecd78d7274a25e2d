use crate::error::{AppError, Result};

/// Sweep cadence in seconds. The interval trades settlement latency for
/// load and has no correctness impact — double ticks are safe.
pub const SWEEP_INTERVAL_SECS: u64 = 5;

/// Capacity of each per-auction broadcast room. Slow subscribers past this
/// many undelivered events start lagging (broadcast semantics), they never
/// block a commit.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// How many times `place_bid` re-snapshots and re-validates after a
/// price CAS conflict before surfacing `Conflict` to the caller.
pub const MAX_BID_RETRIES: u32 = 3;

/// How many times settlement recomputes its plan after a late bid lands
/// between the winner read and the close CAS.
pub const MAX_SETTLE_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// Sweep cadence override (SWEEP_INTERVAL_SECS env var).
    pub sweep_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "settlement.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| SWEEP_INTERVAL_SECS.to_string())
                .parse::<u64>()
                .unwrap_or(SWEEP_INTERVAL_SECS),
        })
    }
}
