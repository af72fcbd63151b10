//! # Domain Value Objects
//!
//! Constants, transaction references, and per-height bookkeeping.

use serde::{Deserialize, Serialize};

use super::events::RawMessage;

/// Proto package prefix of the auction module's message type urls.
pub const DEFAULT_TYPE_URL_PREFIX: &str = "/auction.auction.";

/// Heights that are a multiple of this emit a highest-bid summary.
pub const DEFAULT_SUMMARY_INTERVAL: u64 = 100;

/// Key carrying the type url inside a JSON-encoded Cosmos message.
pub const TYPE_URL_KEY: &str = "@type";

/// A transaction included in a block, as listed by the block source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRef {
    /// Hex transaction hash.
    pub hash: String,
    /// Execution result code; 0 means the transaction succeeded.
    pub result_code: u32,
}

impl TxRef {
    /// Create a transaction reference.
    pub fn new(hash: impl Into<String>, result_code: u32) -> Self {
        Self {
            hash: hash.into(),
            result_code,
        }
    }

    /// Whether the transaction executed successfully on chain.
    pub fn succeeded(&self) -> bool {
        self.result_code == 0
    }
}

/// A successful transaction together with its decoded messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchedTx {
    /// Hex transaction hash.
    pub hash: String,
    /// Messages in transaction order.
    pub messages: Vec<RawMessage>,
}

/// What happened while applying one height.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightOutcome {
    /// Block height.
    pub height: u64,
    /// Transactions listed in the block.
    pub transactions: usize,
    /// Transactions skipped for a non-zero result code.
    pub failed_skipped: usize,
    /// PlaceBid events applied.
    pub bids_placed: usize,
    /// CreateAuction events applied.
    pub auctions_created: usize,
    /// FinalizeAuction events applied.
    pub auctions_finalized: usize,
    /// Messages of an unrelated type.
    pub ignored: usize,
    /// Auction messages skipped because their fields did not parse.
    pub malformed: usize,
    /// Whether a highest-bid summary was emitted for this height.
    pub summary_emitted: bool,
}

impl HeightOutcome {
    /// Empty outcome for a height.
    pub fn new(height: u64) -> Self {
        Self {
            height,
            ..Default::default()
        }
    }

    /// Total auction events applied.
    pub fn applied(&self) -> usize {
        self.bids_placed + self.auctions_created + self.auctions_finalized
    }
}

/// Cumulative counters across the process lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerStats {
    /// Height the loop started replaying after.
    pub start_height: Option<u64>,
    /// Most recent fully applied height.
    pub last_height: Option<u64>,
    /// Heights applied.
    pub heights_processed: u64,
    /// Transactions listed across all heights.
    pub transactions_seen: u64,
    /// Transactions skipped for a non-zero result code.
    pub failed_transactions_skipped: u64,
    /// PlaceBid events applied.
    pub bids_placed: u64,
    /// CreateAuction events applied.
    pub auctions_created: u64,
    /// FinalizeAuction events applied.
    pub auctions_finalized: u64,
    /// Messages of an unrelated type.
    pub messages_ignored: u64,
    /// Auction messages skipped as malformed.
    pub malformed_messages_skipped: u64,
    /// Fetches re-issued after a retryable error.
    pub fetch_retries: u64,
}

impl IndexerStats {
    /// Fold one height's outcome into the totals.
    pub fn record(&mut self, outcome: &HeightOutcome) {
        self.last_height = Some(outcome.height);
        self.heights_processed += 1;
        self.transactions_seen += outcome.transactions as u64;
        self.failed_transactions_skipped += outcome.failed_skipped as u64;
        self.bids_placed += outcome.bids_placed as u64;
        self.auctions_created += outcome.auctions_created as u64;
        self.auctions_finalized += outcome.auctions_finalized as u64;
        self.messages_ignored += outcome.ignored as u64;
        self.malformed_messages_skipped += outcome.malformed as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_ref_success() {
        assert!(TxRef::new("AA", 0).succeeded());
        assert!(!TxRef::new("AA", 5).succeeded());
    }

    #[test]
    fn test_stats_record() {
        let mut stats = IndexerStats::default();
        stats.record(&HeightOutcome {
            height: 10,
            transactions: 3,
            failed_skipped: 1,
            bids_placed: 2,
            ignored: 1,
            ..Default::default()
        });
        stats.record(&HeightOutcome::new(11));

        assert_eq!(stats.last_height, Some(11));
        assert_eq!(stats.heights_processed, 2);
        assert_eq!(stats.transactions_seen, 3);
        assert_eq!(stats.failed_transactions_skipped, 1);
        assert_eq!(stats.bids_placed, 2);
        assert_eq!(stats.messages_ignored, 1);
    }
}
