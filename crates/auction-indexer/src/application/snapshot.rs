//! # Snapshot Loader
//!
//! Seeds `AuctionState` from a full read of existing auctions and bids.
//! Any failure here is fatal: the indexer cannot run without initial state.

use tracing::info;

use crate::domain::{AuctionState, SnapshotError};
use crate::ports::SnapshotSource;

/// Query the snapshot source once and build the initial state.
pub async fn load_snapshot<S>(source: &S) -> Result<AuctionState, SnapshotError>
where
    S: SnapshotSource + ?Sized,
{
    let auctions = source.list_auctions().await?;
    let bids = source.list_bids().await?;
    let (auction_count, bid_count) = (auctions.len(), bids.len());

    let state = AuctionState::from_snapshot(auctions, bids)?;

    info!(
        "[indexer] Snapshot loaded: {} auctions, {} bids, {} open highest bids",
        auction_count,
        bid_count,
        state.open_bid_count()
    );
    info!("[indexer] Total Auction Now: {}", state.next_auction_id());

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Auction, Bid, SnapshotAuction, SourceError};
    use crate::ports::MockChain;

    #[tokio::test]
    async fn test_load_empty_snapshot() {
        let chain = MockChain::new(0);
        let state = load_snapshot(&chain).await.unwrap();
        assert_eq!(state.auction_count(), 0);
        assert_eq!(state.next_auction_id(), 0);
    }

    #[tokio::test]
    async fn test_load_snapshot_with_highest_bid() {
        let chain = MockChain::new(0).with_snapshot(
            vec![SnapshotAuction {
                auction: Auction {
                    id: 0,
                    name: "Clock".into(),
                    ..Default::default()
                },
                highest_bid_exists: true,
                current_highest_bid_id: 0,
            }],
            vec![Bid {
                creator: "bob".into(),
                auction_id: 0,
                bid_price: "20".into(),
                id: 0,
            }],
        );

        let state = load_snapshot(&chain).await.unwrap();
        assert_eq!(state.next_auction_id(), 1);
        assert_eq!(state.highest_bid(0).unwrap().bid_price, "20");
    }

    #[tokio::test]
    async fn test_snapshot_source_failure_is_fatal() {
        let chain = MockChain::new(0);
        chain.fail_next(SourceError::Transport("connection refused".into()));
        let result = load_snapshot(&chain).await;
        assert!(matches!(result, Err(SnapshotError::Source(_))));
    }
}
