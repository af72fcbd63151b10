//! Block source backed by the CometBFT RPC URI endpoints.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

use super::http::{join_url, HttpChainClient};
use super::wire::{RpcEnvelope, StatusResult, TxSearchEntry, TxSearchResult};
use crate::config::EndpointConfig;
use crate::domain::{SourceError, TxRef};
use crate::ports::BlockSource;

/// Polls `status` for the head and lists block transactions via `tx_search`.
#[derive(Clone, Debug)]
pub struct CometBlockSource {
    http: HttpChainClient,
    rpc_endpoint: String,
    poll_interval: Duration,
    page_size: u32,
}

impl CometBlockSource {
    /// Create a source for the configured RPC endpoint.
    pub fn new(http: HttpChainClient, endpoints: &EndpointConfig) -> Self {
        Self {
            http,
            rpc_endpoint: endpoints.rpc_endpoint.clone(),
            poll_interval: endpoints.poll_interval(),
            page_size: endpoints.tx_search_page_size.max(1),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let url = join_url(&self.rpc_endpoint, method);
        let envelope: RpcEnvelope<T> = self.http.get_json(&url, params).await?;
        envelope.into_result(method)
    }

    fn tx_search_params(&self, height: u64, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("query", format!("\"tx.height={}\"", height)),
            ("prove", "false".to_string()),
            ("page", page.to_string()),
            ("per_page", self.page_size.to_string()),
            ("order_by", "\"asc\"".to_string()),
        ]
    }
}

#[async_trait]
impl BlockSource for CometBlockSource {
    async fn wait_for_next_block(&self) -> Result<(), SourceError> {
        let start = self.latest_height().await?;
        loop {
            tokio::time::sleep(self.poll_interval).await;
            let head = self.latest_height().await?;
            if head > start {
                trace!("[indexer] head advanced {} -> {}", start, head);
                return Ok(());
            }
        }
    }

    async fn latest_height(&self) -> Result<u64, SourceError> {
        let status: StatusResult = self.call("status", &[]).await?;
        Ok(status.sync_info.latest_block_height)
    }

    async fn transactions_at(&self, height: u64) -> Result<Vec<TxRef>, SourceError> {
        let mut entries: Vec<TxSearchEntry> = Vec::new();
        let mut page = 1u32;

        loop {
            let result: TxSearchResult = self
                .call("tx_search", &self.tx_search_params(height, page))
                .await?;
            let received = result.txs.len();
            entries.extend(result.txs);

            if received == 0 || entries.len() as u64 >= result.total_count {
                break;
            }
            page += 1;
        }

        entries.sort_by_key(|entry| entry.index);
        debug!("[indexer] height {}: {} transactions", height, entries.len());
        Ok(entries.into_iter().map(TxRef::from).collect())
    }
}
