//! # Inbound Ports (Driving Ports)
//!
//! API exposed by the reconciliation service.

use async_trait::async_trait;

use crate::domain::{AuctionState, HeightOutcome, IndexerError, IndexerStats};

/// Auction Indexer API - inbound port.
#[async_trait]
pub trait AuctionIndexerApi: Send {
    /// Block until the chain produces a new block, then apply every height
    /// not yet applied, in ascending order.
    async fn sync_next(&mut self) -> Result<Vec<HeightOutcome>, IndexerError>;

    /// Fetch and apply a single height.
    ///
    /// The caller is responsible for applying each height exactly once.
    async fn process_height(&mut self, height: u64) -> Result<HeightOutcome, IndexerError>;

    /// Current derived state.
    fn state(&self) -> &AuctionState;

    /// Cumulative counters.
    fn stats(&self) -> &IndexerStats;
}
