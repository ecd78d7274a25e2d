//! Bid admission logic.
//!
//! Pure and synchronous: the caller passes a snapshot of the auction, the
//! bidder and the current highest bid, all read inside the same lock scope
//! that will perform the write. First failing check wins; `Ok(())` means the
//! bid is admissible against that snapshot and writes nothing.

use crate::error::BidRejection;
use crate::types::{Auction, Bid, User};

pub fn validate_bid(
    auction: Option<&Auction>,
    bidder: Option<&User>,
    highest: Option<&Bid>,
    amount: f64,
) -> Result<(), BidRejection> {
    let auction = auction.ok_or(BidRejection::AuctionNotFound)?;
    if !auction.is_active {
        return Err(BidRejection::AuctionClosed);
    }

    if !amount.is_finite() || amount <= 0.0 {
        return Err(BidRejection::InvalidAmount);
    }

    let bidder = bidder.ok_or(BidRejection::BidderNotFound)?;
    let available = bidder.available_balance();
    if available < amount {
        return Err(BidRejection::InsufficientFunds { required: amount, available });
    }

    let minimum = highest.map(|b| b.amount).unwrap_or(auction.start_price);
    if amount <= minimum {
        return Err(BidRejection::BidTooLow { minimum });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn open_auction() -> Auction {
        Auction {
            id: 1,
            nft_id: 1,
            start_price: 1.0,
            current_price: 1.0,
            start_time_ms: 0,
            end_time_ms: 60_000,
            is_active: true,
        }
    }

    fn bidder(wallet: f64, committed: f64) -> User {
        User { id: 2, wallet_balance: wallet, bids_total: committed }
    }

    fn bid(amount: f64) -> Bid {
        Bid { id: 3, auction_id: 1, bidder_id: 4, amount, created_at_ms: 0 }
    }

    #[test]
    fn missing_auction_rejected_first() {
        // No auction: even a nonsense amount reports AuctionNotFound.
        let result = validate_bid(None, Some(&bidder(10.0, 0.0)), None, f64::NAN);
        assert_eq!(result, Err(BidRejection::AuctionNotFound));
    }

    #[test]
    fn closed_auction_rejected() {
        let mut auction = open_auction();
        auction.is_active = false;
        let result = validate_bid(Some(&auction), Some(&bidder(10.0, 0.0)), None, 2.0);
        assert_eq!(result, Err(BidRejection::AuctionClosed));
    }

    #[test]
    fn non_finite_and_non_positive_amounts_rejected() {
        let auction = open_auction();
        let user = bidder(10.0, 0.0);
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 0.0, -1.0] {
            let result = validate_bid(Some(&auction), Some(&user), None, bad);
            assert_eq!(result, Err(BidRejection::InvalidAmount), "amount {bad}");
        }
    }

    #[test]
    fn missing_bidder_rejected_before_funds() {
        let auction = open_auction();
        let result = validate_bid(Some(&auction), None, None, 2.0);
        assert_eq!(result, Err(BidRejection::BidderNotFound));
    }

    #[test]
    fn committed_funds_reduce_available_balance() {
        let auction = open_auction();
        let user = bidder(10.0, 9.0);
        let result = validate_bid(Some(&auction), Some(&user), None, 2.0);
        assert_eq!(
            result,
            Err(BidRejection::InsufficientFunds { required: 2.0, available: 1.0 })
        );
    }

    #[test]
    fn amount_equal_to_available_is_accepted() {
        let auction = open_auction();
        let user = bidder(10.0, 8.0);
        assert_eq!(validate_bid(Some(&auction), Some(&user), None, 2.0), Ok(()));
    }

    #[test]
    fn funds_checked_before_minimum() {
        // Both checks would fail; InsufficientFunds wins by ordering.
        let auction = open_auction();
        let user = bidder(0.5, 0.0);
        let result = validate_bid(Some(&auction), Some(&user), Some(&bid(1.5)), 1.0);
        assert!(matches!(result, Err(BidRejection::InsufficientFunds { .. })));
    }

    #[test]
    fn minimum_is_start_price_without_bids() {
        let auction = open_auction();
        let user = bidder(10.0, 0.0);
        let result = validate_bid(Some(&auction), Some(&user), None, 1.0);
        assert_eq!(result, Err(BidRejection::BidTooLow { minimum: 1.0 }));
        assert_eq!(validate_bid(Some(&auction), Some(&user), None, 1.01), Ok(()));
    }

    #[test]
    fn minimum_is_highest_bid_when_one_exists() {
        let auction = open_auction();
        let user = bidder(10.0, 0.0);
        let highest = bid(1.5);
        let result = validate_bid(Some(&auction), Some(&user), Some(&highest), 1.2);
        assert_eq!(result, Err(BidRejection::BidTooLow { minimum: 1.5 }));
        // Equal to the highest bid is still too low — strictly greater wins.
        let result = validate_bid(Some(&auction), Some(&user), Some(&highest), 1.5);
        assert_eq!(result, Err(BidRejection::BidTooLow { minimum: 1.5 }));
        assert_eq!(validate_bid(Some(&auction), Some(&user), Some(&highest), 1.8), Ok(()));
    }
}
