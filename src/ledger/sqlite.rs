//! Durable ledger over sqlite.
//!
//! Same contract as [`MemoryLedger`](crate::ledger::MemoryLedger): each
//! composite op takes the auction's async lock and additionally wraps its
//! writes in one transaction — an error anywhere rolls the whole unit back
//! when the transaction drops uncommitted.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::ledger::store::{
    BidInsert, CloseResult, LedgerError, LedgerResult, LedgerStore, SettlementPlan,
};
use crate::types::{Auction, AuctionId, Bid, BidId, Nft, NftId, User, UserId};

type AuctionLock = Arc<Mutex<()>>;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct AuctionRow {
    id: i64,
    nft_id: i64,
    start_price: f64,
    current_price: f64,
    start_time_ms: i64,
    end_time_ms: i64,
    is_active: bool,
}

impl From<AuctionRow> for Auction {
    fn from(r: AuctionRow) -> Self {
        Auction {
            id: r.id,
            nft_id: r.nft_id,
            start_price: r.start_price,
            current_price: r.current_price,
            start_time_ms: r.start_time_ms,
            end_time_ms: r.end_time_ms,
            is_active: r.is_active,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BidRow {
    id: i64,
    auction_id: i64,
    bidder_id: i64,
    amount: f64,
    created_at_ms: i64,
}

impl From<BidRow> for Bid {
    fn from(r: BidRow) -> Self {
        Bid {
            id: r.id,
            auction_id: r.auction_id,
            bidder_id: r.bidder_id,
            amount: r.amount,
            created_at_ms: r.created_at_ms,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    wallet_balance: f64,
    bids_total: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct NftRow {
    id: i64,
    creator_id: i64,
    owner_id: i64,
}

// ---------------------------------------------------------------------------
// SqliteLedger
// ---------------------------------------------------------------------------

pub struct SqliteLedger {
    pool: SqlitePool,
    locks: DashMap<AuctionId, AuctionLock>,
}

impl SqliteLedger {
    pub fn new(pool: SqlitePool) -> Arc<Self> {
        Arc::new(Self { pool, locks: DashMap::new() })
    }

    fn lock_for(&self, auction_id: AuctionId) -> AuctionLock {
        self.locks
            .entry(auction_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

const SELECT_AUCTION: &str =
    "SELECT id, nft_id, start_price, current_price, start_time_ms, end_time_ms, is_active \
     FROM auctions";

const SELECT_BID: &str =
    "SELECT id, auction_id, bidder_id, amount, created_at_ms FROM bids";

#[async_trait]
impl LedgerStore for SqliteLedger {
    async fn auction(&self, id: AuctionId) -> LedgerResult<Option<Auction>> {
        let row = sqlx::query_as::<_, AuctionRow>(&format!("{SELECT_AUCTION} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Auction::from))
    }

    async fn open_auction_by_nft(&self, nft_id: NftId) -> LedgerResult<Option<Auction>> {
        let row = sqlx::query_as::<_, AuctionRow>(&format!(
            "{SELECT_AUCTION} WHERE nft_id = ? AND is_active = 1"
        ))
        .bind(nft_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Auction::from))
    }

    async fn highest_bid(&self, auction_id: AuctionId) -> LedgerResult<Option<Bid>> {
        let row = sqlx::query_as::<_, BidRow>(&format!(
            "{SELECT_BID} WHERE auction_id = ? ORDER BY amount DESC LIMIT 1"
        ))
        .bind(auction_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Bid::from))
    }

    async fn bids_for_auction(&self, auction_id: AuctionId) -> LedgerResult<Vec<Bid>> {
        let rows = sqlx::query_as::<_, BidRow>(&format!(
            "{SELECT_BID} WHERE auction_id = ? ORDER BY amount DESC"
        ))
        .bind(auction_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Bid::from).collect())
    }

    async fn user(&self, id: UserId) -> LedgerResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, wallet_balance, bids_total FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| User { id: r.id, wallet_balance: r.wallet_balance, bids_total: r.bids_total }))
    }

    async fn nft(&self, id: NftId) -> LedgerResult<Option<Nft>> {
        let row = sqlx::query_as::<_, NftRow>(
            "SELECT id, creator_id, owner_id FROM nfts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| Nft { id: r.id, creator_id: r.creator_id, owner_id: r.owner_id }))
    }

    async fn find_expired_open(&self, now_ms: i64) -> LedgerResult<Vec<Auction>> {
        let rows = sqlx::query_as::<_, AuctionRow>(&format!(
            "{SELECT_AUCTION} WHERE is_active = 1 AND end_time_ms <= ?"
        ))
        .bind(now_ms)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Auction::from).collect())
    }

    async fn open_auction_count(&self) -> LedgerResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM auctions WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn create_user(&self, wallet_balance: f64) -> LedgerResult<User> {
        let result = sqlx::query("INSERT INTO users (wallet_balance, bids_total) VALUES (?, 0)")
            .bind(wallet_balance)
            .execute(&self.pool)
            .await?;
        Ok(User { id: result.last_insert_rowid(), wallet_balance, bids_total: 0.0 })
    }

    async fn create_nft(&self, creator_id: UserId) -> LedgerResult<Nft> {
        let result = sqlx::query("INSERT INTO nfts (creator_id, owner_id) VALUES (?, ?)")
            .bind(creator_id)
            .bind(creator_id)
            .execute(&self.pool)
            .await?;
        Ok(Nft { id: result.last_insert_rowid(), creator_id, owner_id: creator_id })
    }

    async fn create_auction(
        &self,
        nft_id: NftId,
        start_price: f64,
        start_time_ms: i64,
        end_time_ms: i64,
    ) -> LedgerResult<Auction> {
        let result = sqlx::query(
            "INSERT INTO auctions (nft_id, start_price, current_price, start_time_ms, end_time_ms, is_active) \
             VALUES (?, ?, ?, ?, ?, 1)",
        )
        .bind(nft_id)
        .bind(start_price)
        .bind(start_price)
        .bind(start_time_ms)
        .bind(end_time_ms)
        .execute(&self.pool)
        .await?;
        Ok(Auction {
            id: result.last_insert_rowid(),
            nft_id,
            start_price,
            current_price: start_price,
            start_time_ms,
            end_time_ms,
            is_active: true,
        })
    }

    async fn adjust_balance(&self, user_id: UserId, delta: f64) -> LedgerResult<()> {
        // The WHERE guard keeps committed funds untouchable: a withdrawal
        // may only take what is not backing an outstanding highest bid.
        let result = sqlx::query(
            "UPDATE users SET wallet_balance = wallet_balance + ? \
             WHERE id = ? AND wallet_balance + ? >= bids_total",
        )
        .bind(delta)
        .bind(user_id)
        .bind(delta)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(LedgerError::Constraint(
                "user missing or wallet balance would drop below committed funds".into(),
            ));
        }
        Ok(())
    }

    async fn insert_bid(&self, insert: &BidInsert) -> LedgerResult<Bid> {
        let lock = self.lock_for(insert.auction_id);
        let _guard = lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let auction = sqlx::query_as::<_, AuctionRow>(&format!("{SELECT_AUCTION} WHERE id = ?"))
            .bind(insert.auction_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(LedgerError::NotFound("auction"))?;
        if !auction.is_active || auction.current_price != insert.expected_price {
            return Err(LedgerError::Conflict);
        }

        let outbid = sqlx::query_as::<_, BidRow>(&format!(
            "{SELECT_BID} WHERE auction_id = ? ORDER BY amount DESC LIMIT 1"
        ))
        .bind(insert.auction_id)
        .fetch_optional(&mut *tx)
        .await?;

        // Commit the bidder's funds; the WHERE guard re-checks the available
        // balance inside the transaction.
        let committed = sqlx::query(
            "UPDATE users SET bids_total = bids_total + ? \
             WHERE id = ? AND wallet_balance - bids_total >= ?",
        )
        .bind(insert.amount)
        .bind(insert.bidder_id)
        .bind(insert.amount)
        .execute(&mut *tx)
        .await?;
        if committed.rows_affected() == 0 {
            let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?")
                .bind(insert.bidder_id)
                .fetch_one(&mut *tx)
                .await?;
            return Err(if exists == 0 {
                LedgerError::NotFound("user")
            } else {
                LedgerError::Conflict
            });
        }

        if let Some(prev) = &outbid {
            sqlx::query("UPDATE users SET bids_total = bids_total - ? WHERE id = ?")
                .bind(prev.amount)
                .bind(prev.bidder_id)
                .execute(&mut *tx)
                .await?;
        }

        let inserted = sqlx::query(
            "INSERT INTO bids (auction_id, bidder_id, amount, created_at_ms) VALUES (?, ?, ?, ?)",
        )
        .bind(insert.auction_id)
        .bind(insert.bidder_id)
        .bind(insert.amount)
        .bind(insert.created_at_ms)
        .execute(&mut *tx)
        .await?;
        let bid_id: BidId = inserted.last_insert_rowid();

        let raised = sqlx::query(
            "UPDATE auctions SET current_price = ? \
             WHERE id = ? AND is_active = 1 AND current_price = ?",
        )
        .bind(insert.amount)
        .bind(insert.auction_id)
        .bind(insert.expected_price)
        .execute(&mut *tx)
        .await?;
        if raised.rows_affected() != 1 {
            return Err(LedgerError::Conflict);
        }

        tx.commit().await?;

        Ok(Bid {
            id: bid_id,
            auction_id: insert.auction_id,
            bidder_id: insert.bidder_id,
            amount: insert.amount,
            created_at_ms: insert.created_at_ms,
        })
    }

    async fn close_auction(&self, id: AuctionId, plan: &SettlementPlan) -> LedgerResult<CloseResult> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let auction = sqlx::query_as::<_, AuctionRow>(&format!("{SELECT_AUCTION} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(LedgerError::NotFound("auction"))?;
        if !auction.is_active {
            return Ok(CloseResult::AlreadyClosed);
        }

        let flipped = sqlx::query(
            "UPDATE auctions SET is_active = 0 \
             WHERE id = ? AND is_active = 1 AND current_price = ?",
        )
        .bind(id)
        .bind(plan.expected_price)
        .execute(&mut *tx)
        .await?;
        if flipped.rows_affected() != 1 {
            return Err(LedgerError::Conflict);
        }

        if let Some(t) = &plan.transfer {
            let debited = sqlx::query(
                "UPDATE users SET wallet_balance = wallet_balance - ?, bids_total = bids_total - ? \
                 WHERE id = ?",
            )
            .bind(t.amount)
            .bind(t.amount)
            .bind(t.winner_id)
            .execute(&mut *tx)
            .await?;
            if debited.rows_affected() != 1 {
                return Err(LedgerError::NotFound("winner"));
            }

            let credited =
                sqlx::query("UPDATE users SET wallet_balance = wallet_balance + ? WHERE id = ?")
                    .bind(t.amount)
                    .bind(t.seller_id)
                    .execute(&mut *tx)
                    .await?;
            if credited.rows_affected() != 1 {
                return Err(LedgerError::NotFound("seller"));
            }

            let reassigned = sqlx::query("UPDATE nfts SET owner_id = ? WHERE id = ?")
                .bind(t.winner_id)
                .bind(t.nft_id)
                .execute(&mut *tx)
                .await?;
            if reassigned.rows_affected() != 1 {
                return Err(LedgerError::NotFound("nft"));
            }
        }

        tx.commit().await?;

        let mut closed = Auction::from(auction);
        closed.is_active = false;
        Ok(CloseResult::Closed(closed))
    }
}

// ---------------------------------------------------------------------------
// Tests — same flows as the memory ledger, over an in-memory pool
// ---------------------------------------------------------------------------
