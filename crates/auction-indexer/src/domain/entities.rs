//! # Domain Entities
//!
//! Auction and bid records plus the owned state store they live in.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::SnapshotError;
use super::events::{AppliedEvent, AuctionEvent};

/// An auction as tracked by the indexer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    /// Unique key. Assigned by the indexer for auctions created during replay.
    pub id: u64,
    /// Address of the account that opened the auction.
    pub creator: String,
    /// Display name.
    pub name: String,
    /// Decimal string, stored and displayed verbatim.
    pub start_price: String,
    /// Duration in chain-native units.
    pub duration: u64,
    /// Never flipped by the indexer; finalization shows up as the
    /// auction's absence from the highest-bid map instead.
    pub ended: bool,
}

/// A bid record. Only the current highest bid per auction is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Address of the bidder.
    pub creator: String,
    /// Auction this bid targets.
    pub auction_id: u64,
    /// Decimal string, stored and displayed verbatim.
    pub bid_price: String,
    /// Chain bid id for snapshot bids; always 0 for bids seen in blocks.
    pub id: u64,
}

/// Auction record as returned by the snapshot query, carrying the
/// highest-bid pointer the loader needs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotAuction {
    /// The auction itself.
    pub auction: Auction,
    /// Whether the chain has recorded at least one bid.
    pub highest_bid_exists: bool,
    /// Chain id of the highest bid; meaningless unless `highest_bid_exists`.
    pub current_highest_bid_id: u64,
}

/// Bid and auction lookups taken while finalizing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Finalization {
    /// Auction record at the finalized id, if known.
    pub auction: Option<Auction>,
    /// Highest bid removed from the map, if one was recorded.
    pub winning_bid: Option<Bid>,
}

/// In-memory derived state: every known auction plus the current highest
/// bid for each auction that has one and has not been finalized.
///
/// Constructed once from the snapshot, then mutated only through the apply
/// operations for the rest of the process lifetime.
///
/// `next_auction_id` is seeded with the snapshot's auction count. That is
/// only correct while the chain assigns auction ids densely from 0.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuctionState {
    auctions: HashMap<u64, Auction>,
    current_highest_bid: HashMap<u64, Bid>,
    next_auction_id: u64,
}

impl AuctionState {
    /// Empty state; the next created auction gets id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed state from a full snapshot.
    ///
    /// Each auction flagged with a highest bid has that bid looked up by id
    /// in `bids`. A dangling reference or a duplicate auction id rejects the
    /// whole snapshot.
    pub fn from_snapshot(
        auctions: Vec<SnapshotAuction>,
        bids: Vec<Bid>,
    ) -> Result<Self, SnapshotError> {
        let bids_by_id: HashMap<u64, Bid> = bids.into_iter().map(|b| (b.id, b)).collect();
        let next_auction_id = auctions.len() as u64;

        let mut state = Self {
            auctions: HashMap::with_capacity(auctions.len()),
            current_highest_bid: HashMap::new(),
            next_auction_id,
        };

        for entry in auctions {
            let auction_id = entry.auction.id;
            if state.auctions.contains_key(&auction_id) {
                return Err(SnapshotError::DuplicateAuction(auction_id));
            }

            if entry.highest_bid_exists {
                let bid_id = entry.current_highest_bid_id;
                let bid = bids_by_id
                    .get(&bid_id)
                    .cloned()
                    .ok_or(SnapshotError::MissingHighestBid { auction_id, bid_id })?;
                state.current_highest_bid.insert(auction_id, bid);
            }

            state.auctions.insert(auction_id, entry.auction);
        }

        Ok(state)
    }

    /// Record a bid as the auction's current highest. Last write wins.
    ///
    /// No price comparison is made: the chain only accepts winning bids,
    /// so the latest one observed is the highest.
    pub fn apply_place_bid(&mut self, auction_id: u64, creator: String, bid_price: String) -> Bid {
        let bid = Bid {
            creator,
            auction_id,
            bid_price,
            id: 0,
        };
        self.current_highest_bid.insert(auction_id, bid.clone());
        bid
    }

    /// Insert a new auction at `next_auction_id` and advance the counter.
    ///
    /// Returns the id the auction was stored under.
    pub fn apply_create_auction(
        &mut self,
        creator: String,
        name: String,
        start_price: String,
        duration: u64,
    ) -> u64 {
        let id = self.next_auction_id;
        self.auctions.insert(
            id,
            Auction {
                id,
                creator,
                name,
                start_price,
                duration,
                ended: false,
            },
        );
        self.next_auction_id += 1;
        id
    }

    /// Drop the auction's highest-bid entry. Idempotent.
    ///
    /// The auction record itself stays untouched.
    pub fn apply_finalize_auction(&mut self, auction_id: u64) -> Finalization {
        Finalization {
            auction: self.auctions.get(&auction_id).cloned(),
            winning_bid: self.current_highest_bid.remove(&auction_id),
        }
    }

    /// Apply a classified event. `Ignored` leaves state unchanged and yields `None`.
    pub fn apply(&mut self, event: AuctionEvent) -> Option<AppliedEvent> {
        match event {
            AuctionEvent::PlaceBid {
                creator,
                auction_id,
                bid_price,
            } => Some(AppliedEvent::BidPlaced(
                self.apply_place_bid(auction_id, creator, bid_price),
            )),
            AuctionEvent::CreateAuction {
                creator,
                name,
                start_price,
                duration,
            } => {
                let id = self.apply_create_auction(creator, name, start_price, duration);
                self.auctions
                    .get(&id)
                    .cloned()
                    .map(AppliedEvent::AuctionCreated)
            }
            AuctionEvent::FinalizeAuction {
                creator,
                auction_id,
            } => {
                let finalization = self.apply_finalize_auction(auction_id);
                Some(AppliedEvent::AuctionFinalized {
                    creator,
                    auction_id,
                    auction: finalization.auction,
                    winning_bid: finalization.winning_bid,
                })
            }
            AuctionEvent::Ignored => None,
        }
    }

    /// Look up an auction.
    pub fn auction(&self, auction_id: u64) -> Option<&Auction> {
        self.auctions.get(&auction_id)
    }

    /// Current highest bid for an auction, if any.
    pub fn highest_bid(&self, auction_id: u64) -> Option<&Bid> {
        self.current_highest_bid.get(&auction_id)
    }

    /// All auctions, ordered by id.
    pub fn auctions(&self) -> Vec<&Auction> {
        let mut auctions: Vec<&Auction> = self.auctions.values().collect();
        auctions.sort_by_key(|a| a.id);
        auctions
    }

    /// All highest-bid entries keyed by auction id, ordered by auction id.
    pub fn highest_bids(&self) -> Vec<(u64, &Bid)> {
        let mut bids: Vec<(u64, &Bid)> = self
            .current_highest_bid
            .iter()
            .map(|(id, bid)| (*id, bid))
            .collect();
        bids.sort_by_key(|(id, _)| *id);
        bids
    }

    /// Id the next created auction will receive.
    pub fn next_auction_id(&self) -> u64 {
        self.next_auction_id
    }

    /// Number of known auctions.
    pub fn auction_count(&self) -> usize {
        self.auctions.len()
    }

    /// Number of auctions with a recorded, unfinalized highest bid.
    pub fn open_bid_count(&self) -> usize {
        self.current_highest_bid.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snapshot_auction(id: u64, highest_bid: Option<u64>) -> SnapshotAuction {
        SnapshotAuction {
            auction: Auction {
                id,
                creator: format!("creator{}", id),
                name: format!("lot-{}", id),
                start_price: "10".to_string(),
                duration: 100,
                ended: false,
            },
            highest_bid_exists: highest_bid.is_some(),
            current_highest_bid_id: highest_bid.unwrap_or(0),
        }
    }

    fn snapshot_bid(id: u64, auction_id: u64, price: &str) -> Bid {
        Bid {
            creator: format!("bidder{}", id),
            auction_id,
            bid_price: price.to_string(),
            id,
        }
    }

    #[test]
    fn test_from_snapshot_seeds_maps_and_counter() {
        let state = AuctionState::from_snapshot(
            vec![snapshot_auction(0, None), snapshot_auction(1, Some(1))],
            vec![snapshot_bid(0, 1, "11"), snapshot_bid(1, 1, "12")],
        )
        .unwrap();

        assert_eq!(state.auction_count(), 2);
        assert_eq!(state.next_auction_id(), 2);
        assert!(state.highest_bid(0).is_none());
        assert_eq!(state.highest_bid(1).unwrap().bid_price, "12");
        assert_eq!(state.highest_bid(1).unwrap().id, 1);
    }

    #[test]
    fn test_from_snapshot_rejects_dangling_bid() {
        let result = AuctionState::from_snapshot(vec![snapshot_auction(0, Some(9))], vec![]);
        assert!(matches!(
            result,
            Err(SnapshotError::MissingHighestBid {
                auction_id: 0,
                bid_id: 9
            })
        ));
    }

    #[test]
    fn test_from_snapshot_rejects_duplicate_auction() {
        let result = AuctionState::from_snapshot(
            vec![snapshot_auction(3, None), snapshot_auction(3, None)],
            vec![],
        );
        assert!(matches!(result, Err(SnapshotError::DuplicateAuction(3))));
    }

    #[test]
    fn test_place_bid_accepts_unknown_auction() {
        let mut state = AuctionState::new();
        state.apply_place_bid(7, "alice".into(), "5".into());
        assert_eq!(state.highest_bid(7).unwrap().creator, "alice");
        assert!(state.auction(7).is_none());
    }

    #[test]
    fn test_place_bid_ignores_price_ordering() {
        let mut state = AuctionState::new();
        state.apply_place_bid(0, "alice".into(), "100".into());
        state.apply_place_bid(0, "bob".into(), "1".into());

        let bid = state.highest_bid(0).unwrap();
        assert_eq!(bid.creator, "bob");
        assert_eq!(bid.bid_price, "1");
        assert_eq!(bid.id, 0);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut state = AuctionState::new();
        let id = state.apply_create_auction("alice".into(), "Vase".into(), "10".into(), 100);
        state.apply_place_bid(id, "bob".into(), "15".into());

        let first = state.apply_finalize_auction(id);
        assert_eq!(first.winning_bid.unwrap().creator, "bob");
        let after_once = state.clone();

        let second = state.apply_finalize_auction(id);
        assert!(second.winning_bid.is_none());
        assert_eq!(second.auction.unwrap().name, "Vase");
        assert_eq!(state, after_once);
    }

    #[test]
    fn test_finalize_unknown_auction_reports_nothing() {
        let mut state = AuctionState::new();
        let finalization = state.apply_finalize_auction(42);
        assert_eq!(finalization, Finalization::default());
        assert_eq!(state, AuctionState::new());
    }

    #[test]
    fn test_finalize_keeps_auction_record() {
        let mut state = AuctionState::new();
        let id = state.apply_create_auction("alice".into(), "Vase".into(), "10".into(), 100);
        state.apply_finalize_auction(id);
        let auction = state.auction(id).unwrap();
        assert!(!auction.ended);
    }

    #[test]
    fn test_apply_ignored_leaves_state() {
        let mut state = AuctionState::new();
        assert!(state.apply(AuctionEvent::Ignored).is_none());
        assert_eq!(state, AuctionState::new());
    }

    #[test]
    fn test_highest_bids_sorted() {
        let mut state = AuctionState::new();
        state.apply_place_bid(5, "a".into(), "1".into());
        state.apply_place_bid(2, "b".into(), "1".into());
        state.apply_place_bid(9, "c".into(), "1".into());
        let ids: Vec<u64> = state.highest_bids().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    proptest! {
        #[test]
        fn prop_last_bid_wins(prices in proptest::collection::vec("[0-9]{1,6}", 1..20)) {
            let mut state = AuctionState::new();
            for (i, price) in prices.iter().enumerate() {
                state.apply_place_bid(3, format!("bidder{}", i), price.clone());
            }
            let last = prices.len() - 1;
            let bid = state.highest_bid(3).unwrap();
            prop_assert_eq!(&bid.bid_price, &prices[last]);
            prop_assert_eq!(bid.creator.clone(), format!("bidder{}", last));
        }

        #[test]
        fn prop_create_assigns_consecutive_ids(seed in 0u64..50, count in 1usize..30) {
            let auctions: Vec<SnapshotAuction> =
                (0..seed).map(|id| snapshot_auction(id, None)).collect();
            let mut state = AuctionState::from_snapshot(auctions, vec![]).unwrap();

            let ids: Vec<u64> = (0..count)
                .map(|i| state.apply_create_auction("c".into(), format!("n{}", i), "1".into(), 10))
                .collect();

            let expected: Vec<u64> = (seed..seed + count as u64).collect();
            prop_assert_eq!(ids, expected);
            prop_assert_eq!(state.next_auction_id(), seed + count as u64);
            for id in seed..seed + count as u64 {
                prop_assert!(!state.auction(id).unwrap().ended);
            }
        }
    }
}
