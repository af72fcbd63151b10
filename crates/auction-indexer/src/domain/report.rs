//! # Report Lines
//!
//! Human-readable lines for applied events and highest-bid summaries.
//! Fields that were unknown at finalize time print as empty strings.
//!
//! Auction ids and durations print in canonical decimal form as parsed, so a
//! message carrying `"007"` is logged as `7`.

use super::entities::Bid;
use super::events::AppliedEvent;

/// One log line for an applied event at `height`.
pub fn format_event_line(height: u64, event: &AppliedEvent) -> String {
    match event {
        AppliedEvent::BidPlaced(bid) => format!(
            "[{}] [{}] | Placed bid on Auction id: {} | Bid Price: {} |",
            height, bid.creator, bid.auction_id, bid.bid_price
        ),
        AppliedEvent::AuctionCreated(auction) => format!(
            "[{}] [{}] | Created Auction | Name: {} | Start Price: {} | Duration: {} |",
            height, auction.creator, auction.name, auction.start_price, auction.duration
        ),
        AppliedEvent::AuctionFinalized {
            creator,
            auction,
            winning_bid,
            ..
        } => {
            let (name, start_price) = auction
                .as_ref()
                .map(|a| (a.name.as_str(), a.start_price.as_str()))
                .unwrap_or_default();
            let (final_price, winner) = winning_bid
                .as_ref()
                .map(|b| (b.bid_price.as_str(), b.creator.as_str()))
                .unwrap_or_default();
            format!(
                "[{}] [{}] | Auction Finalized | Name: {} | Start Price: {} | Final Price: {} | Winner: {} |",
                height, creator, name, start_price, final_price, winner
            )
        }
    }
}

/// One summary line for an auction's current highest bid.
pub fn format_summary_line(height: u64, auction_id: u64, bid: &Bid) -> String {
    format!(
        "[{}] | Current Highest Bid for Auction ID: {} is {} By: {}",
        height, auction_id, bid.bid_price, bid.creator
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Auction, AuctionState, MessageClassifier, RawMessage};

    #[test]
    fn test_bid_line() {
        let line = format_event_line(
            11,
            &AppliedEvent::BidPlaced(Bid {
                creator: "bob".into(),
                auction_id: 0,
                bid_price: "15".into(),
                id: 0,
            }),
        );
        assert_eq!(
            line,
            "[11] [bob] | Placed bid on Auction id: 0 | Bid Price: 15 |"
        );
    }

    #[test]
    fn test_create_line() {
        let line = format_event_line(
            10,
            &AppliedEvent::AuctionCreated(Auction {
                id: 0,
                creator: "alice".into(),
                name: "Vase".into(),
                start_price: "10".into(),
                duration: 100,
                ended: false,
            }),
        );
        assert_eq!(
            line,
            "[10] [alice] | Created Auction | Name: Vase | Start Price: 10 | Duration: 100 |"
        );
    }

    #[test]
    fn test_ids_print_canonical() {
        let event = MessageClassifier::default()
            .classify(
                &RawMessage::new("/auction.auction.MsgPlaceBid")
                    .with_field("creator", "bob")
                    .with_field("auctionId", "007")
                    .with_field("bidPrice", "15"),
            )
            .unwrap();
        let mut state = AuctionState::new();
        let applied = state.apply(event).unwrap();
        assert_eq!(
            format_event_line(11, &applied),
            "[11] [bob] | Placed bid on Auction id: 7 | Bid Price: 15 |"
        );
    }

    #[test]
    fn test_finalize_line_without_records() {
        let line = format_event_line(
            12,
            &AppliedEvent::AuctionFinalized {
                creator: "alice".into(),
                auction_id: 8,
                auction: None,
                winning_bid: None,
            },
        );
        assert_eq!(
            line,
            "[12] [alice] | Auction Finalized | Name:  | Start Price:  | Final Price:  | Winner:  |"
        );
    }

    #[test]
    fn test_summary_line() {
        let bid = Bid {
            creator: "carol".into(),
            auction_id: 4,
            bid_price: "99".into(),
            id: 2,
        };
        assert_eq!(
            format_summary_line(200, 4, &bid),
            "[200] | Current Highest Bid for Auction ID: 4 is 99 By: carol"
        );
    }
}
