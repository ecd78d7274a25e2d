//! Notification fan-out: per-auction subscriber rooms.
//!
//! Delivery is fire-and-forget. Publishing never suspends, never fails a
//! caller and never gates a ledger commit; the engine publishes strictly
//! after its ledger op returns `Ok`, so a room's stream observes events in
//! commit order.

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::config::EVENT_CHANNEL_CAPACITY;
use crate::types::{Auction, AuctionEvent, AuctionId, Bid};

pub trait Notifier: Send + Sync + 'static {
    fn bid_placed(&self, auction_id: AuctionId, bid: &Bid);
    fn auction_updated(&self, auction: &Auction);
}

// ---------------------------------------------------------------------------
// AuctionRooms
// ---------------------------------------------------------------------------

/// Broadcast room per auction, created lazily on first subscribe.
/// Publishing to an auction nobody watches is a silent no-op.
pub struct AuctionRooms {
    rooms: DashMap<AuctionId, broadcast::Sender<AuctionEvent>>,
}

impl AuctionRooms {
    pub fn new() -> Self {
        Self { rooms: DashMap::new() }
    }

    /// Join an auction's room. Subscribers that fall more than
    /// `EVENT_CHANNEL_CAPACITY` events behind start lagging; they never
    /// slow a publisher down.
    pub fn subscribe(&self, auction_id: AuctionId) -> broadcast::Receiver<AuctionEvent> {
        self.rooms
            .entry(auction_id)
            .or_insert_with(|| broadcast::channel(EVENT_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn publish(&self, event: AuctionEvent) {
        if let Some(tx) = self.rooms.get(&event.auction_id()) {
            // Err means no live receivers — nothing to deliver.
            let _ = tx.send(event);
        }
    }
}

impl Default for AuctionRooms {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for AuctionRooms {
    fn bid_placed(&self, auction_id: AuctionId, bid: &Bid) {
        self.publish(AuctionEvent::BidPlaced { auction_id, bid: bid.clone() });
    }

    fn auction_updated(&self, auction: &Auction) {
        let auction_id = auction.id;
        let closed = !auction.is_active;
        self.publish(AuctionEvent::AuctionUpdated { auction: auction.clone() });
        // A closed auction never emits again; drop its room. Live receivers
        // keep the channel alive until they hang up.
        if closed {
            self.rooms.remove(&auction_id);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
