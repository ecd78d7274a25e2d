//! In-memory reference ledger.
//!
//! Dashmap tables plus one async lock per auction. Composite ops take the
//! auction's lock, verify every precondition, and only then mutate — a failed
//! precondition returns before anything changed, so partial state is
//! impossible without explicit rollback machinery.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::ledger::store::{
    BidInsert, CloseResult, LedgerError, LedgerResult, LedgerStore, SettlementPlan,
};
use crate::types::{Auction, AuctionId, Bid, BidId, Nft, NftId, User, UserId};

type AuctionLock = Arc<Mutex<()>>;

pub struct MemoryLedger {
    users: DashMap<UserId, User>,
    nfts: DashMap<NftId, Nft>,
    auctions: DashMap<AuctionId, Auction>,
    bids: DashMap<BidId, Bid>,
    /// auction_id → lock serializing that auction's composite ops.
    locks: DashMap<AuctionId, AuctionLock>,
    next_id: AtomicI64,
}

impl MemoryLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            users: DashMap::new(),
            nfts: DashMap::new(),
            auctions: DashMap::new(),
            bids: DashMap::new(),
            locks: DashMap::new(),
            next_id: AtomicI64::new(1),
        })
    }

    fn alloc_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn lock_for(&self, auction_id: AuctionId) -> AuctionLock {
        self.locks
            .entry(auction_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn highest_bid_sync(&self, auction_id: AuctionId) -> Option<Bid> {
        self.bids
            .iter()
            .filter(|e| e.value().auction_id == auction_id)
            .max_by(|a, b| {
                a.value()
                    .amount
                    .partial_cmp(&b.value().amount)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|e| e.value().clone())
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn auction(&self, id: AuctionId) -> LedgerResult<Option<Auction>> {
        Ok(self.auctions.get(&id).map(|a| a.clone()))
    }

    async fn open_auction_by_nft(&self, nft_id: NftId) -> LedgerResult<Option<Auction>> {
        Ok(self
            .auctions
            .iter()
            .find(|e| e.value().nft_id == nft_id && e.value().is_active)
            .map(|e| e.value().clone()))
    }

    async fn highest_bid(&self, auction_id: AuctionId) -> LedgerResult<Option<Bid>> {
        Ok(self.highest_bid_sync(auction_id))
    }

    async fn bids_for_auction(&self, auction_id: AuctionId) -> LedgerResult<Vec<Bid>> {
        let mut bids: Vec<Bid> = self
            .bids
            .iter()
            .filter(|e| e.value().auction_id == auction_id)
            .map(|e| e.value().clone())
            .collect();
        bids.sort_by(|a, b| b.amount.partial_cmp(&a.amount).unwrap_or(std::cmp::Ordering::Equal));
        Ok(bids)
    }

    async fn user(&self, id: UserId) -> LedgerResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn nft(&self, id: NftId) -> LedgerResult<Option<Nft>> {
        Ok(self.nfts.get(&id).map(|n| n.clone()))
    }

    async fn find_expired_open(&self, now_ms: i64) -> LedgerResult<Vec<Auction>> {
        Ok(self
            .auctions
            .iter()
            .filter(|e| e.value().is_active && e.value().is_expired(now_ms))
            .map(|e| e.value().clone())
            .collect())
    }

    async fn open_auction_count(&self) -> LedgerResult<i64> {
        Ok(self.auctions.iter().filter(|e| e.value().is_active).count() as i64)
    }

    async fn create_user(&self, wallet_balance: f64) -> LedgerResult<User> {
        let user = User { id: self.alloc_id(), wallet_balance, bids_total: 0.0 };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn create_nft(&self, creator_id: UserId) -> LedgerResult<Nft> {
        let nft = Nft { id: self.alloc_id(), creator_id, owner_id: creator_id };
        self.nfts.insert(nft.id, nft.clone());
        Ok(nft)
    }

    async fn create_auction(
        &self,
        nft_id: NftId,
        start_price: f64,
        start_time_ms: i64,
        end_time_ms: i64,
    ) -> LedgerResult<Auction> {
        let auction = Auction {
            id: self.alloc_id(),
            nft_id,
            start_price,
            current_price: start_price,
            start_time_ms,
            end_time_ms,
            is_active: true,
        };
        self.auctions.insert(auction.id, auction.clone());
        Ok(auction)
    }

    async fn adjust_balance(&self, user_id: UserId, delta: f64) -> LedgerResult<()> {
        let mut user = self.users.get_mut(&user_id).ok_or(LedgerError::NotFound("user"))?;
        // Committed funds are spoken for: a withdrawal may only take what
        // is not backing an outstanding highest bid.
        if user.wallet_balance + delta < user.bids_total {
            return Err(LedgerError::Constraint(
                "wallet balance may not drop below committed funds".into(),
            ));
        }
        user.wallet_balance += delta;
        Ok(())
    }

    async fn insert_bid(&self, insert: &BidInsert) -> LedgerResult<Bid> {
        let lock = self.lock_for(insert.auction_id);
        let _guard = lock.lock().await;

        // Re-check under the lock: the validator's snapshot may be stale.
        {
            let auction = self
                .auctions
                .get(&insert.auction_id)
                .ok_or(LedgerError::NotFound("auction"))?;
            if !auction.is_active || auction.current_price != insert.expected_price {
                return Err(LedgerError::Conflict);
            }
        }

        let outbid = self.highest_bid_sync(insert.auction_id);

        // Commit the bidder's funds; per-entry get_mut makes the
        // check-and-commit atomic against other auctions' ops.
        {
            let mut bidder = self
                .users
                .get_mut(&insert.bidder_id)
                .ok_or(LedgerError::NotFound("user"))?;
            if bidder.available_balance() < insert.amount {
                return Err(LedgerError::Conflict);
            }
            bidder.bids_total += insert.amount;
        }

        // Past this point every precondition held; the remaining writes
        // cannot fail (outbid bidder existed when their bid was accepted).
        if let Some(prev) = &outbid {
            if let Some(mut prev_bidder) = self.users.get_mut(&prev.bidder_id) {
                prev_bidder.bids_total -= prev.amount;
            }
        }

        let bid = Bid {
            id: self.alloc_id(),
            auction_id: insert.auction_id,
            bidder_id: insert.bidder_id,
            amount: insert.amount,
            created_at_ms: insert.created_at_ms,
        };
        self.bids.insert(bid.id, bid.clone());

        if let Some(mut auction) = self.auctions.get_mut(&insert.auction_id) {
            auction.current_price = insert.amount;
        }

        Ok(bid)
    }

    async fn close_auction(&self, id: AuctionId, plan: &SettlementPlan) -> LedgerResult<CloseResult> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        {
            let auction = self.auctions.get(&id).ok_or(LedgerError::NotFound("auction"))?;
            if !auction.is_active {
                return Ok(CloseResult::AlreadyClosed);
            }
            if auction.current_price != plan.expected_price {
                return Err(LedgerError::Conflict);
            }
        }

        // Verify every party before touching anything — close is
        // all-or-nothing and this impl has no rollback.
        if let Some(t) = &plan.transfer {
            if !self.users.contains_key(&t.winner_id) {
                return Err(LedgerError::NotFound("winner"));
            }
            if !self.users.contains_key(&t.seller_id) {
                return Err(LedgerError::NotFound("seller"));
            }
            if !self.nfts.contains_key(&t.nft_id) {
                return Err(LedgerError::NotFound("nft"));
            }
        }

        if let Some(t) = &plan.transfer {
            if let Some(mut winner) = self.users.get_mut(&t.winner_id) {
                winner.wallet_balance -= t.amount;
                winner.bids_total -= t.amount;
            }
            if let Some(mut seller) = self.users.get_mut(&t.seller_id) {
                seller.wallet_balance += t.amount;
            }
            if let Some(mut nft) = self.nfts.get_mut(&t.nft_id) {
                nft.owner_id = t.winner_id;
            }
        }

        let closed = {
            let mut auction = self.auctions.get_mut(&id).ok_or(LedgerError::NotFound("auction"))?;
            auction.is_active = false;
            auction.clone()
        };

        Ok(CloseResult::Closed(closed))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
