//! Transaction lookup through the Cosmos tx service REST gateway.

use async_trait::async_trait;

use super::http::{join_url, HttpChainClient};
use super::wire::{raw_message, GetTxResponse};
use crate::config::EndpointConfig;
use crate::domain::{RawMessage, SourceError};
use crate::ports::TxFetcher;

const TX_BY_HASH_PATH: &str = "/cosmos/tx/v1beta1/txs";

/// Fetches `cosmos/tx/v1beta1/txs/{hash}` and flattens the body messages.
#[derive(Clone, Debug)]
pub struct RestTxFetcher {
    http: HttpChainClient,
    base_url: String,
}

impl RestTxFetcher {
    /// Create a fetcher for the configured REST endpoint.
    pub fn new(http: HttpChainClient, endpoints: &EndpointConfig) -> Self {
        Self {
            http,
            base_url: join_url(&endpoints.api_endpoint, TX_BY_HASH_PATH),
        }
    }

    fn tx_url(&self, hash: &str) -> String {
        join_url(&self.base_url, hash)
    }
}

#[async_trait]
impl TxFetcher for RestTxFetcher {
    async fn fetch_messages(&self, hash: &str) -> Result<Vec<RawMessage>, SourceError> {
        let response: GetTxResponse = self.http.get_json(&self.tx_url(hash), &[]).await?;
        response
            .tx
            .body
            .messages
            .into_iter()
            .map(raw_message)
            .collect()
    }
}
