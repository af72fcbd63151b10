//! # Indexer Runtime
//!
//! Wires the Cosmos adapters into `IndexerService` and owns its task.
//!
//! ## Startup Sequence
//!
//! 1. Build the shared HTTP client
//! 2. Load the snapshot (fatal on error)
//! 3. Spawn the reconciliation loop with a shutdown receiver
//!
//! `shutdown` flips the watch channel. The loop stops at its next await
//! point, so a height is either fully applied or untouched, and the task
//! yields the final stats.

use std::sync::Arc;

use auction_indexer::{
    AuctionIndexerApi, CometBlockSource, HttpChainClient, IndexerError, IndexerService, IndexerStats,
    RestSnapshotSource, RestTxFetcher, TracingReporter,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::RuntimeSettings;

/// What the loop task yields: its exit status and the counters at that point.
pub type LoopExit = (Result<(), IndexerError>, IndexerStats);

/// Owns the shutdown channel of one indexer process.
pub struct IndexerRuntime {
    settings: RuntimeSettings,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl IndexerRuntime {
    /// Create a runtime; nothing is contacted until `start`.
    pub fn new(settings: RuntimeSettings) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            settings,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Load the snapshot and spawn the reconciliation loop.
    pub async fn start(&self) -> Result<JoinHandle<LoopExit>, IndexerError> {
        let endpoints = &self.settings.endpoints;
        info!(
            "[indexer] Starting: rpc={} api={}",
            endpoints.rpc_endpoint, endpoints.api_endpoint
        );

        let http = HttpChainClient::new(endpoints.request_timeout())?;
        let snapshot = RestSnapshotSource::new(http.clone(), endpoints);
        let blocks = Arc::new(CometBlockSource::new(http.clone(), endpoints));
        let txs = Arc::new(RestTxFetcher::new(http, endpoints));

        let mut service = IndexerService::bootstrap(
            self.settings.indexer.clone(),
            &snapshot,
            blocks,
            txs,
            Arc::new(TracingReporter::new()),
        )
        .await?;

        let shutdown = self.shutdown_rx.clone();
        Ok(tokio::spawn(async move {
            let result = service.run(shutdown).await;
            if let Err(e) = &result {
                error!("[indexer] Reconciliation loop stopped: {}", e);
            }
            let stats = service.stats().clone();
            (result, stats)
        }))
    }

    /// Signal the loop to stop.
    pub fn shutdown(&self) {
        info!("[indexer] Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("[indexer] Failed to send shutdown signal: {}", e);
        }
    }

    /// Settings this runtime was created with.
    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }
}
