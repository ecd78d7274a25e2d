mod api;
mod config;
mod engine;
mod error;
mod ledger;
mod notify;
mod types;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::engine::lifecycle::LifecycleManager;
use crate::engine::sweep::AuctionSweeper;
use crate::error::Result;
use crate::ledger::{LedgerStore, SqliteLedger};
use crate::notify::AuctionRooms;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect(&format!("sqlite:{}?mode=rwc", cfg.db_path))
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Ledger ready at {}", cfg.db_path);

    // --- Shared services ---
    let ledger = SqliteLedger::new(pool);
    let rooms = Arc::new(AuctionRooms::new());
    let health = Arc::new(HealthState::new());
    let latency = Arc::new(LatencyStats::new());
    let manager = Arc::new(LifecycleManager::new(
        Arc::clone(&ledger),
        rooms.clone() as Arc<dyn notify::Notifier>,
        Arc::clone(&latency),
    ));

    let open = ledger.open_auction_count().await?;
    info!("Tracking {open} open auctions");

    // --- Periodic settlement sweep ---
    let sweeper = AuctionSweeper::new(
        Arc::clone(&manager),
        Arc::clone(&health),
        cfg.sweep_interval_secs,
    );
    tokio::spawn(async move { sweeper.run().await });
    info!("Sweep running every {}s", cfg.sweep_interval_secs);

    // --- HTTP API server ---
    let api_state = ApiState { manager, rooms, health, latency };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
