//! The Ledger Store seam: sole owner of durable truth.
//!
//! The engine above it is stateless; every read-then-write sequence on an
//! auction aggregate (minimum-check-then-raise-price, active-check-then-close)
//! goes through one of the two composite ops below, which serialize per
//! auction and compare-and-swap on `current_price`. Different auctions never
//! contend.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Auction, AuctionId, Bid, Nft, NftId, User, UserId};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The auction changed under the caller's snapshot (price CAS failed or
    /// the auction closed). Transient: re-snapshot and retry.
    #[error("concurrent modification of auction state")]
    Conflict,

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Everything `insert_bid` needs, captured at validation time.
#[derive(Debug, Clone)]
pub struct BidInsert {
    pub auction_id: AuctionId,
    pub bidder_id: UserId,
    pub amount: f64,
    /// `current_price` the validator saw. The insert fails with `Conflict`
    /// if the auction's price moved since — the caller re-validates.
    pub expected_price: f64,
    pub created_at_ms: i64,
}

/// Fund/ownership movement applied when an auction closes with a winner.
#[derive(Debug, Clone)]
pub struct Transfer {
    pub winner_id: UserId,
    pub seller_id: UserId,
    pub amount: f64,
    pub nft_id: NftId,
}

/// Settlement instructions computed from a snapshot of the auction.
/// `transfer` is `None` for a no-bid closure (no fund movement, NFT stays).
#[derive(Debug, Clone)]
pub struct SettlementPlan {
    /// Snapshot `current_price`; a late bid landing after the snapshot
    /// fails the CAS and the sweep recomputes the winner.
    pub expected_price: f64,
    pub transfer: Option<Transfer>,
}

#[derive(Debug, Clone)]
pub enum CloseResult {
    /// The flip and all plan mutations committed as one unit.
    Closed(Auction),
    /// `is_active` was already false — a previous sweep won. No-op.
    AlreadyClosed,
}

#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    // --- reads ---
    async fn auction(&self, id: AuctionId) -> LedgerResult<Option<Auction>>;
    async fn open_auction_by_nft(&self, nft_id: NftId) -> LedgerResult<Option<Auction>>;
    async fn highest_bid(&self, auction_id: AuctionId) -> LedgerResult<Option<Bid>>;
    /// All bids for an auction, amount descending.
    async fn bids_for_auction(&self, auction_id: AuctionId) -> LedgerResult<Vec<Bid>>;
    async fn user(&self, id: UserId) -> LedgerResult<Option<User>>;
    async fn nft(&self, id: NftId) -> LedgerResult<Option<Nft>>;
    /// Auctions with `is_active == true` and `end_time_ms <= now_ms`.
    /// The predicate is what makes the sweep idempotent.
    async fn find_expired_open(&self, now_ms: i64) -> LedgerResult<Vec<Auction>>;
    async fn open_auction_count(&self) -> LedgerResult<i64>;

    // --- row creation (seeding and listing) ---
    async fn create_user(&self, wallet_balance: f64) -> LedgerResult<User>;
    async fn create_nft(&self, creator_id: UserId) -> LedgerResult<Nft>;
    async fn create_auction(
        &self,
        nft_id: NftId,
        start_price: f64,
        start_time_ms: i64,
        end_time_ms: i64,
    ) -> LedgerResult<Auction>;
    /// Top up or withdraw wallet funds. A withdrawal may not dip below the
    /// user's committed `bids_total` — those funds back a highest bid and
    /// settlement will debit them.
    async fn adjust_balance(&self, user_id: UserId, delta: f64) -> LedgerResult<()>;

    // --- composite atomic units ---

    /// Accept a validated bid: re-check `is_active`, CAS `current_price` from
    /// `expected_price` to `amount`, insert the bid row, commit the bidder's
    /// funds (`bids_total += amount`) and release the outbid bidder's.
    /// All-or-nothing; `Conflict` if the snapshot went stale.
    async fn insert_bid(&self, insert: &BidInsert) -> LedgerResult<Bid>;

    /// Close an auction per the plan: re-check `is_active` (already closed →
    /// `AlreadyClosed`), CAS on `expected_price`, then in one unit flip
    /// `is_active = false`, debit the winner, release the winner's
    /// commitment, credit the seller, reassign the NFT. Any failure rolls
    /// the whole unit back, including the flip.
    async fn close_auction(&self, id: AuctionId, plan: &SettlementPlan) -> LedgerResult<CloseResult>;
}
