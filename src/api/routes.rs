use std::sync::Arc;

use axum::{
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::api::stream::forward_events;
use crate::engine::lifecycle::{LifecycleManager, ListingRequest};
use crate::error::{AppError, BidRejection};
use crate::ledger::LedgerStore;
use crate::notify::AuctionRooms;
use crate::types::{Auction, AuctionId, Bid, NftId, UserId};

pub struct ApiState<L: LedgerStore> {
    pub manager: Arc<LifecycleManager<L>>,
    pub rooms: Arc<AuctionRooms>,
    pub health: Arc<HealthState>,
    pub latency: Arc<LatencyStats>,
}

impl<L: LedgerStore> Clone for ApiState<L> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
            rooms: self.rooms.clone(),
            health: self.health.clone(),
            latency: self.latency.clone(),
        }
    }
}

pub fn router<L: LedgerStore>(state: ApiState<L>) -> Router {
    Router::new()
        .route("/auctions", post(create_auction))
        .route("/auctions/:id", get(get_auction))
        .route("/auctions/:id/bids", get(get_auction_bids).post(place_bid))
        .route("/auctions/:id/stream", get(auction_stream))
        .route("/health", get(get_health))
        .route("/stats/latency", get(get_stats_latency))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request/response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateAuctionRequest {
    pub nft_id: NftId,
    pub seller_id: UserId,
    pub start_price: f64,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
}

#[derive(Deserialize)]
pub struct PlaceBidRequest {
    pub bidder_id: UserId,
    pub amount: f64,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub open_auctions: i64,
    pub last_sweep_ms: i64,
}

#[derive(Serialize)]
pub struct LatencyResponse {
    pub samples: u64,
    pub p50_us: Option<u64>,
    pub p95_us: Option<u64>,
    pub p99_us: Option<u64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn create_auction<L: LedgerStore>(
    State(state): State<ApiState<L>>,
    Json(req): Json<CreateAuctionRequest>,
) -> Result<(StatusCode, Json<Auction>), AppError> {
    let auction = state
        .manager
        .list_nft(ListingRequest {
            nft_id: req.nft_id,
            seller_id: req.seller_id,
            start_price: req.start_price,
            start_time_ms: req.start_time_ms,
            end_time_ms: req.end_time_ms,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(auction)))
}

async fn get_auction<L: LedgerStore>(
    State(state): State<ApiState<L>>,
    Path(id): Path<AuctionId>,
) -> Result<Json<Auction>, AppError> {
    let auction = state
        .manager
        .ledger()
        .auction(id)
        .await?
        .ok_or(AppError::NotFound("auction"))?;
    Ok(Json(auction))
}

async fn get_auction_bids<L: LedgerStore>(
    State(state): State<ApiState<L>>,
    Path(id): Path<AuctionId>,
) -> Result<Json<Vec<Bid>>, AppError> {
    state
        .manager
        .ledger()
        .auction(id)
        .await?
        .ok_or(AppError::NotFound("auction"))?;
    let bids = state.manager.ledger().bids_for_auction(id).await?;
    Ok(Json(bids))
}

async fn place_bid<L: LedgerStore>(
    State(state): State<ApiState<L>>,
    Path(id): Path<AuctionId>,
    Json(req): Json<PlaceBidRequest>,
) -> Result<(StatusCode, Json<Bid>), AppError> {
    let bid = state.manager.place_bid(id, req.bidder_id, req.amount).await?;
    Ok((StatusCode::CREATED, Json(bid)))
}

async fn auction_stream<L: LedgerStore>(
    State(state): State<ApiState<L>>,
    Path(id): Path<AuctionId>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    // Only open auctions stream. A closed auction's room was pruned and
    // broadcast has no replay, so a late subscriber would hang on a
    // silent, freshly recreated room forever.
    let auction = state
        .manager
        .ledger()
        .auction(id)
        .await?
        .ok_or(AppError::NotFound("auction"))?;
    if !auction.is_active {
        return Err(AppError::Rejected(BidRejection::AuctionClosed));
    }
    let rx = state.rooms.subscribe(id);
    Ok(ws.on_upgrade(move |socket| forward_events(socket, rx)))
}

async fn get_health<L: LedgerStore>(
    State(state): State<ApiState<L>>,
) -> Result<Json<HealthResponse>, AppError> {
    let open_auctions = state.manager.ledger().open_auction_count().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        open_auctions,
        last_sweep_ms: state.health.last_sweep_ms(),
    }))
}

async fn get_stats_latency<L: LedgerStore>(
    State(state): State<ApiState<L>>,
) -> Json<LatencyResponse> {
    let (p50_us, p95_us, p99_us) = state.latency.percentiles();
    Json(LatencyResponse { samples: state.latency.len(), p50_us, p95_us, p99_us })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
