//! # Outbound Ports
//!
//! Traits for external collaborators: the snapshot query layer, the block
//! source, transaction lookup, and the event log sink.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use tokio::sync::watch;

use crate::domain::{AppliedEvent, Bid, RawMessage, SnapshotAuction, SourceError, TxRef};

/// Full point-in-time read of auctions and bids - outbound port.
///
/// Called once at startup.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Every existing auction, in query order.
    async fn list_auctions(&self) -> Result<Vec<SnapshotAuction>, SourceError>;

    /// Every existing bid, in query order.
    async fn list_bids(&self) -> Result<Vec<Bid>, SourceError>;
}

/// Finalized block feed - outbound port.
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Suspend until the chain head moves past its height at call time.
    async fn wait_for_next_block(&self) -> Result<(), SourceError>;

    /// Current chain head.
    async fn latest_height(&self) -> Result<u64, SourceError>;

    /// Transactions included at `height`, in block order.
    async fn transactions_at(&self, height: u64) -> Result<Vec<TxRef>, SourceError>;
}

/// Transaction body lookup - outbound port.
#[async_trait]
pub trait TxFetcher: Send + Sync {
    /// Decoded messages of a transaction, in transaction order.
    ///
    /// Fails with `NotFound` when the transaction is unknown and with
    /// `Transport` when it cannot be retrieved.
    async fn fetch_messages(&self, hash: &str) -> Result<Vec<RawMessage>, SourceError>;
}

/// Event log sink - outbound port.
///
/// Observes applied events and periodic summaries. Never mutates state.
pub trait Reporter: Send + Sync {
    /// An event was applied at `height`.
    fn event_applied(&self, height: u64, event: &AppliedEvent);

    /// Summary entry: the current highest bid of one auction.
    fn highest_bid(&self, height: u64, auction_id: u64, bid: &Bid);
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

#[derive(Default)]
struct MockChainInner {
    head: u64,
    pending_heads: VecDeque<u64>,
    blocks: HashMap<u64, Vec<TxRef>>,
    bodies: HashMap<String, Vec<RawMessage>>,
    auctions: Vec<SnapshotAuction>,
    bids: Vec<Bid>,
    failures: VecDeque<SourceError>,
    fetches: HashMap<String, usize>,
    on_drained: Option<watch::Sender<bool>>,
}

impl MockChainInner {
    fn insert_block(&mut self, height: u64, txs: Vec<(TxRef, Vec<RawMessage>)>) {
        let mut refs = Vec::with_capacity(txs.len());
        for (tx, messages) in txs {
            self.bodies.insert(tx.hash.clone(), messages);
            refs.push(tx);
        }
        self.blocks.insert(height, refs);
    }
}

/// Scripted in-memory chain implementing every chain-facing port.
///
/// Blocks registered with [`MockChain::with_block`] become visible one by
/// one: each `wait_for_next_block` call moves the head to the next queued
/// height. Once the queue is drained the call never returns, after firing
/// the optional drain signal.
#[derive(Default)]
pub struct MockChain {
    inner: Mutex<MockChainInner>,
}

impl MockChain {
    /// Chain whose head starts at `head`.
    pub fn new(head: u64) -> Self {
        let chain = Self::default();
        chain.inner.lock().head = head;
        chain
    }

    /// Snapshot returned by the `SnapshotSource` impl.
    pub fn with_snapshot(self, auctions: Vec<SnapshotAuction>, bids: Vec<Bid>) -> Self {
        {
            let mut inner = self.inner.lock();
            inner.auctions = auctions;
            inner.bids = bids;
        }
        self
    }

    /// Register a block and queue the head to advance to it.
    pub fn with_block(self, height: u64, txs: Vec<(TxRef, Vec<RawMessage>)>) -> Self {
        self.push_block(height, txs);
        self
    }

    /// Register a block without queueing a head advance.
    pub fn with_block_data(self, height: u64, txs: Vec<(TxRef, Vec<RawMessage>)>) -> Self {
        self.inner.lock().insert_block(height, txs);
        self
    }

    /// Queue a head advance to `height` (heights without data are empty blocks).
    pub fn with_head_advance(self, height: u64) -> Self {
        self.inner.lock().pending_heads.push_back(height);
        self
    }

    /// Register a block and queue the head to advance to it.
    pub fn push_block(&self, height: u64, txs: Vec<(TxRef, Vec<RawMessage>)>) {
        let mut inner = self.inner.lock();
        inner.insert_block(height, txs);
        inner.pending_heads.push_back(height);
    }

    /// Make the next chain call fail with `error`. Errors queue up.
    pub fn fail_next(&self, error: SourceError) {
        self.inner.lock().failures.push_back(error);
    }

    /// Fire `signal` once every queued head has been consumed.
    pub fn signal_when_drained(&self, signal: watch::Sender<bool>) {
        self.inner.lock().on_drained = Some(signal);
    }

    /// How often a transaction body was fetched.
    pub fn fetch_count(&self, hash: &str) -> usize {
        self.inner.lock().fetches.get(hash).copied().unwrap_or(0)
    }

    /// Current head.
    pub fn head(&self) -> u64 {
        self.inner.lock().head
    }

    fn take_failure(&self) -> Result<(), SourceError> {
        match self.inner.lock().failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SnapshotSource for MockChain {
    async fn list_auctions(&self) -> Result<Vec<SnapshotAuction>, SourceError> {
        self.take_failure()?;
        Ok(self.inner.lock().auctions.clone())
    }

    async fn list_bids(&self) -> Result<Vec<Bid>, SourceError> {
        self.take_failure()?;
        Ok(self.inner.lock().bids.clone())
    }
}

#[async_trait]
impl BlockSource for MockChain {
    async fn wait_for_next_block(&self) -> Result<(), SourceError> {
        self.take_failure()?;
        let drained_signal = {
            let mut inner = self.inner.lock();
            match inner.pending_heads.pop_front() {
                Some(height) => {
                    inner.head = inner.head.max(height);
                    return Ok(());
                }
                None => inner.on_drained.take(),
            }
        };

        if let Some(signal) = drained_signal {
            let _ = signal.send(true);
        }
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn latest_height(&self) -> Result<u64, SourceError> {
        self.take_failure()?;
        Ok(self.inner.lock().head)
    }

    async fn transactions_at(&self, height: u64) -> Result<Vec<TxRef>, SourceError> {
        self.take_failure()?;
        Ok(self
            .inner
            .lock()
            .blocks
            .get(&height)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl TxFetcher for MockChain {
    async fn fetch_messages(&self, hash: &str) -> Result<Vec<RawMessage>, SourceError> {
        self.take_failure()?;
        let mut inner = self.inner.lock();
        *inner.fetches.entry(hash.to_string()).or_default() += 1;
        inner
            .bodies
            .get(hash)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("tx {}", hash)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_chain_advances_head() {
        let chain = MockChain::new(5).with_block(6, vec![]).with_head_advance(8);
        assert_eq!(chain.latest_height().await.unwrap(), 5);

        chain.wait_for_next_block().await.unwrap();
        assert_eq!(chain.latest_height().await.unwrap(), 6);

        chain.wait_for_next_block().await.unwrap();
        assert_eq!(chain.head(), 8);
        assert!(chain.transactions_at(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mock_chain_injected_failure() {
        let chain = MockChain::new(1);
        chain.fail_next(SourceError::Transport("down".into()));
        assert!(chain.latest_height().await.is_err());
        assert!(chain.latest_height().await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_chain_unknown_tx() {
        let chain = MockChain::new(1);
        let err = chain.fetch_messages("FF").await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
        assert_eq!(chain.fetch_count("FF"), 1);
    }
}
