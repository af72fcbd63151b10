//! # Indexer Service
//!
//! The block reconciliation loop: await a block, fetch its transactions,
//! classify and apply every message in block order, report.
//!
//! ## Ordering
//!
//! A height is fetched completely (transaction list plus every successful
//! transaction body) before any of its messages touch the state. Retries
//! therefore re-fetch the same height from scratch and never double-apply,
//! and applying is synchronous, so cancelling the loop at an await point
//! never leaves a height half-applied.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::retry::RetryPolicy;
use super::snapshot::load_snapshot;
use crate::config::IndexerConfig;
use crate::domain::{
    AppliedEvent, AuctionState, FetchedTx, HeightOutcome, IndexerError, IndexerStats,
    MessageClassifier, SourceError,
};
use crate::ports::{AuctionIndexerApi, BlockSource, Reporter, SnapshotSource, TxFetcher};

/// Owns the auction state and drives it forward from the chain.
pub struct IndexerService<B: BlockSource, T: TxFetcher, R: Reporter> {
    /// Configuration.
    config: IndexerConfig,
    /// Type-url matcher built from the configured prefix.
    classifier: MessageClassifier,
    /// Backoff for retryable fetch errors.
    retry: RetryPolicy,
    /// Derived state.
    state: AuctionState,
    /// Block feed.
    block_source: Arc<B>,
    /// Transaction body lookup.
    tx_fetcher: Arc<T>,
    /// Event log sink.
    reporter: Arc<R>,
    /// Last fully applied height (or the anchor height before any).
    last_height: Option<u64>,
    /// Cumulative counters.
    stats: IndexerStats,
}

impl<B: BlockSource, T: TxFetcher, R: Reporter> IndexerService<B, T, R> {
    /// Create a service over an already-built state.
    pub fn new(
        config: IndexerConfig,
        state: AuctionState,
        block_source: Arc<B>,
        tx_fetcher: Arc<T>,
        reporter: Arc<R>,
    ) -> Self {
        Self {
            classifier: MessageClassifier::new(&config.type_url_prefix),
            retry: RetryPolicy::from_config(&config),
            config,
            state,
            block_source,
            tx_fetcher,
            reporter,
            last_height: None,
            stats: IndexerStats::default(),
        }
    }

    /// Load the snapshot and create the service. Snapshot errors are fatal.
    pub async fn bootstrap<S>(
        config: IndexerConfig,
        snapshot: &S,
        block_source: Arc<B>,
        tx_fetcher: Arc<T>,
        reporter: Arc<R>,
    ) -> Result<Self, IndexerError>
    where
        S: SnapshotSource + ?Sized,
    {
        let state = load_snapshot(snapshot).await?;
        Ok(Self::new(config, state, block_source, tx_fetcher, reporter))
    }

    /// Last fully applied height, or the anchor height if none yet.
    pub fn last_height(&self) -> Option<u64> {
        self.last_height
    }

    /// Consume the service, keeping the state.
    pub fn into_state(self) -> AuctionState {
        self.state
    }

    /// Record the current chain head as the replay starting point.
    ///
    /// The head block itself is not replayed; its effects are expected to
    /// be part of the snapshot.
    pub async fn anchor_at_head(&mut self) -> Result<u64, IndexerError> {
        let retry = self.retry;
        let blocks = self.block_source.as_ref();
        let head = retry
            .run("latest height", &mut self.stats.fetch_retries, move || {
                blocks.latest_height()
            })
            .await?;

        self.last_height = Some(head);
        self.stats.start_height = Some(head);
        info!("[indexer] Anchored at chain head #{}", head);
        Ok(head)
    }

    /// Run until `shutdown` fires or a fatal error occurs.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), IndexerError> {
        if *shutdown.borrow() {
            return Ok(());
        }

        let start = match self.last_height {
            Some(height) => height,
            None => self.anchor_at_head().await?,
        };
        info!("[indexer] Reconciliation loop started after #{}", start);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    info!("[indexer] Shutdown signal received");
                    break;
                }
                result = self.sync_next() => {
                    result?;
                }
            }
        }

        info!(
            "[indexer] Stopped at #{:?}: {} heights, {} bids, {} created, {} finalized, {} malformed skipped",
            self.stats.last_height,
            self.stats.heights_processed,
            self.stats.bids_placed,
            self.stats.auctions_created,
            self.stats.auctions_finalized,
            self.stats.malformed_messages_skipped
        );
        Ok(())
    }

    /// Apply one height's fetched transactions to the state.
    ///
    /// `transactions` is the number of transactions listed in the block,
    /// `fetched` holds the successful ones with their messages in order.
    pub fn apply_block(
        &mut self,
        height: u64,
        transactions: usize,
        fetched: Vec<FetchedTx>,
    ) -> HeightOutcome {
        let mut outcome = HeightOutcome::new(height);
        outcome.transactions = transactions;
        outcome.failed_skipped = transactions.saturating_sub(fetched.len());

        for tx in fetched {
            for msg in &tx.messages {
                let event = match self.classifier.classify(msg) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(
                            "[indexer] Skipping malformed message at #{} in tx {}: {}",
                            height, tx.hash, e
                        );
                        outcome.malformed += 1;
                        continue;
                    }
                };

                match self.state.apply(event) {
                    Some(applied) => {
                        match &applied {
                            AppliedEvent::BidPlaced(_) => outcome.bids_placed += 1,
                            AppliedEvent::AuctionCreated(_) => outcome.auctions_created += 1,
                            AppliedEvent::AuctionFinalized { .. } => {
                                outcome.auctions_finalized += 1
                            }
                        }
                        self.reporter.event_applied(height, &applied);
                    }
                    None => outcome.ignored += 1,
                }
            }
        }

        if self.config.summary_interval > 0 && height % self.config.summary_interval == 0 {
            for (auction_id, bid) in self.state.highest_bids() {
                self.reporter.highest_bid(height, auction_id, bid);
            }
            outcome.summary_emitted = true;
        }

        outcome
    }
}

/// Transaction count of a block plus the bodies of its successful transactions.
async fn fetch_block<B, T>(
    blocks: &B,
    txs: &T,
    height: u64,
) -> Result<(usize, Vec<FetchedTx>), SourceError>
where
    B: BlockSource + ?Sized,
    T: TxFetcher + ?Sized,
{
    let refs = blocks.transactions_at(height).await?;
    let mut fetched = Vec::with_capacity(refs.len());

    for tx in &refs {
        if !tx.succeeded() {
            debug!(
                "[indexer] Skipping failed tx {} at #{} (code {})",
                tx.hash, height, tx.result_code
            );
            continue;
        }
        let messages = txs.fetch_messages(&tx.hash).await?;
        fetched.push(FetchedTx {
            hash: tx.hash.clone(),
            messages,
        });
    }

    Ok((refs.len(), fetched))
}

#[async_trait]
impl<B: BlockSource, T: TxFetcher, R: Reporter> AuctionIndexerApi for IndexerService<B, T, R> {
    async fn sync_next(&mut self) -> Result<Vec<HeightOutcome>, IndexerError> {
        let last = match self.last_height {
            Some(height) => height,
            None => self.anchor_at_head().await?,
        };

        let retry = self.retry;
        let blocks = self.block_source.as_ref();
        retry
            .run("wait for next block", &mut self.stats.fetch_retries, move || {
                blocks.wait_for_next_block()
            })
            .await?;
        let latest = retry
            .run("latest height", &mut self.stats.fetch_retries, move || {
                blocks.latest_height()
            })
            .await?;

        let mut outcomes = Vec::new();
        for height in (last + 1)..=latest {
            outcomes.push(self.process_height(height).await?);
        }
        Ok(outcomes)
    }

    async fn process_height(&mut self, height: u64) -> Result<HeightOutcome, IndexerError> {
        let retry = self.retry;
        let blocks = self.block_source.as_ref();
        let txs = self.tx_fetcher.as_ref();
        let operation = format!("fetch block #{}", height);

        let (transactions, fetched) = retry
            .run(&operation, &mut self.stats.fetch_retries, move || {
                fetch_block(blocks, txs, height)
            })
            .await?;

        let outcome = self.apply_block(height, transactions, fetched);
        self.stats.record(&outcome);
        self.last_height = Some(height);

        debug!(
            "[indexer] #{}: {} txs ({} failed), {} applied, {} ignored, {} malformed",
            height,
            outcome.transactions,
            outcome.failed_skipped,
            outcome.applied(),
            outcome.ignored,
            outcome.malformed
        );
        Ok(outcome)
    }

    fn state(&self) -> &AuctionState {
        &self.state
    }

    fn stats(&self) -> &IndexerStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::RecordingReporter;
    use crate::domain::{RawMessage, TxRef};
    use crate::ports::MockChain;

    type TestService = IndexerService<MockChain, MockChain, RecordingReporter>;

    fn create_test_service(chain: MockChain) -> (TestService, Arc<MockChain>, Arc<RecordingReporter>) {
        let chain = Arc::new(chain);
        let reporter = Arc::new(RecordingReporter::new());
        let service = IndexerService::new(
            IndexerConfig::for_testing(),
            AuctionState::new(),
            Arc::clone(&chain),
            Arc::clone(&chain),
            Arc::clone(&reporter),
        );
        (service, chain, reporter)
    }

    fn bid(auction_id: &str, price: &str) -> RawMessage {
        RawMessage::new("/auction.auction.MsgPlaceBid")
            .with_field("creator", "bidder")
            .with_field("auctionId", auction_id)
            .with_field("bidPrice", price)
    }

    #[test]
    fn test_apply_block_counts_failed_transactions() {
        let (mut service, _, _) = create_test_service(MockChain::new(0));
        let outcome = service.apply_block(
            3,
            4,
            vec![FetchedTx {
                hash: "AA".into(),
                messages: vec![bid("0", "5")],
            }],
        );
        assert_eq!(outcome.transactions, 4);
        assert_eq!(outcome.failed_skipped, 3);
        assert_eq!(outcome.bids_placed, 1);
    }

    #[test]
    fn test_apply_block_skips_malformed_and_continues() {
        let (mut service, _, reporter) = create_test_service(MockChain::new(0));
        let outcome = service.apply_block(
            3,
            1,
            vec![FetchedTx {
                hash: "AA".into(),
                messages: vec![bid("0", "5"), bid("not-a-number", "6"), bid("1", "7")],
            }],
        );

        assert_eq!(outcome.malformed, 1);
        assert_eq!(outcome.bids_placed, 2);
        assert_eq!(service.state().open_bid_count(), 2);
        assert_eq!(reporter.event_lines().len(), 2);
    }

    #[test]
    fn test_summary_only_on_interval() {
        let (mut service, _, reporter) = create_test_service(MockChain::new(0));
        service.apply_block(
            199,
            1,
            vec![FetchedTx {
                hash: "AA".into(),
                messages: vec![bid("0", "5"), bid("1", "6")],
            }],
        );
        assert_eq!(reporter.summary_lines().len(), 0);

        let outcome = service.apply_block(200, 0, vec![]);
        assert!(outcome.summary_emitted);
        assert_eq!(
            reporter.summary_lines(),
            vec![
                "[200] | Current Highest Bid for Auction ID: 0 is 5 By: bidder".to_string(),
                "[200] | Current Highest Bid for Auction ID: 1 is 6 By: bidder".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_process_height_skips_failed_tx_bodies() {
        let chain = MockChain::new(0).with_block(
            1,
            vec![
                (TxRef::new("BAD", 11), vec![bid("0", "5")]),
                (TxRef::new("GOOD", 0), vec![bid("0", "6")]),
            ],
        );
        let (mut service, chain, _) = create_test_service(chain);

        let outcome = service.process_height(1).await.unwrap();
        assert_eq!(outcome.failed_skipped, 1);
        assert_eq!(chain.fetch_count("BAD"), 0);
        assert_eq!(chain.fetch_count("GOOD"), 1);
        assert_eq!(service.state().highest_bid(0).unwrap().bid_price, "6");
        assert_eq!(service.last_height(), Some(1));
    }

    #[tokio::test]
    async fn test_anchor_records_start_height() {
        let (mut service, _, _) = create_test_service(MockChain::new(57));
        assert_eq!(service.anchor_at_head().await.unwrap(), 57);
        assert_eq!(service.stats().start_height, Some(57));
    }

    #[tokio::test]
    async fn test_run_returns_immediately_when_already_shut_down() {
        let (mut service, _, _) = create_test_service(MockChain::new(0));
        let (_tx, rx) = watch::channel(true);
        service.run(rx).await.unwrap();
        assert_eq!(service.last_height(), None);
    }
}
