use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

// Numeric rowids; sqlite autoincrement assigns them, the in-memory ledger
// allocates them from atomics.
pub type AuctionId = i64;
pub type BidId = i64;
pub type UserId = i64;
pub type NftId = i64;

// ---------------------------------------------------------------------------
// Auction
// ---------------------------------------------------------------------------

/// A time-boxed competitive sale of one NFT.
///
/// `current_price` is monotonically non-decreasing while the auction is open
/// and always >= `start_price`. `is_active` flips true→false exactly once, at
/// settlement; a closed auction is immutable audit history. Both invariants
/// are enforced by the ledger's composite write ops, not by this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub id: AuctionId,
    pub nft_id: NftId,
    pub start_price: f64,
    /// Highest accepted bid amount, or `start_price` if no bid yet.
    pub current_price: f64,
    /// Unix epoch milliseconds.
    pub start_time_ms: i64,
    /// Unix epoch milliseconds; strictly after `start_time_ms`.
    pub end_time_ms: i64,
    pub is_active: bool,
}

impl Auction {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.end_time_ms <= now_ms
    }
}

// ---------------------------------------------------------------------------
// Bid
// ---------------------------------------------------------------------------

/// An accepted bid. Immutable once created — no edits, no retraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub auction_id: AuctionId,
    pub bidder_id: UserId,
    pub amount: f64,
    pub created_at_ms: i64,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Wallet view of a user. `bids_total` is the sum of amounts currently
/// committed to bids that are the highest on some open auction; it is
/// committed on acceptance, released when outbid, and converted into the
/// wallet debit when the auction settles in the user's favor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub wallet_balance: f64,
    pub bids_total: f64,
}

impl User {
    /// Funds not committed to an outstanding bid.
    pub fn available_balance(&self) -> f64 {
        self.wallet_balance - self.bids_total
    }
}

// ---------------------------------------------------------------------------
// NFT
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nft {
    pub id: NftId,
    /// Set at mint, never changes. Settlement credits this user.
    pub creator_id: UserId,
    /// Changes only when an auction settles with a winner.
    pub owner_id: UserId,
}

// ---------------------------------------------------------------------------
// Events — fanned out to per-auction subscriber rooms
// ---------------------------------------------------------------------------

/// Wire frames pushed to an auction's subscribers, in commit order.
/// Closure is an `auction:updated` with `is_active == false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum AuctionEvent {
    #[serde(rename = "bid:placed")]
    BidPlaced { auction_id: AuctionId, bid: Bid },
    #[serde(rename = "auction:updated")]
    AuctionUpdated { auction: Auction },
}

impl AuctionEvent {
    pub fn auction_id(&self) -> AuctionId {
        match self {
            AuctionEvent::BidPlaced { auction_id, .. } => *auction_id,
            AuctionEvent::AuctionUpdated { auction } => auction.id,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
