//! # Indexer Configuration
//!
//! Engine settings (`IndexerConfig`) and chain endpoint settings
//! (`EndpointConfig`) used by the HTTP adapters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{DEFAULT_SUMMARY_INTERVAL, DEFAULT_TYPE_URL_PREFIX};

/// Reconciliation engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Emit a highest-bid summary on heights divisible by this.
    pub summary_interval: u64,

    /// Proto package prefix of the auction message type urls.
    pub type_url_prefix: String,

    /// Retries per fetch before a retryable error becomes fatal.
    pub max_fetch_retries: u32,

    /// Delay before the first retry; doubles on each subsequent one.
    pub retry_base_delay_ms: u64,

    /// Upper bound on the retry delay.
    pub retry_max_delay_ms: u64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            summary_interval: DEFAULT_SUMMARY_INTERVAL,
            type_url_prefix: DEFAULT_TYPE_URL_PREFIX.to_string(),
            max_fetch_retries: 5,
            retry_base_delay_ms: 500,
            retry_max_delay_ms: 30_000,
        }
    }
}

impl IndexerConfig {
    /// Create a config for testing (short retry delays).
    pub fn for_testing() -> Self {
        Self {
            max_fetch_retries: 2,
            retry_base_delay_ms: 1,
            retry_max_delay_ms: 5,
            ..Self::default()
        }
    }
}

/// Where and how to reach the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// CometBFT RPC endpoint (status, tx_search).
    pub rpc_endpoint: String,

    /// Cosmos REST endpoint (module queries, tx lookup).
    pub api_endpoint: String,

    /// REST path of the all-auctions query.
    pub auctions_path: String,

    /// REST path of the all-bids query.
    pub bids_path: String,

    /// Interval between head polls while waiting for the next block.
    pub poll_interval_ms: u64,

    /// Per-request HTTP timeout.
    pub request_timeout_secs: u64,

    /// Page size for `tx_search`.
    pub tx_search_page_size: u32,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            rpc_endpoint: "http://127.0.0.1:26657".to_string(),
            api_endpoint: "http://127.0.0.1:1317".to_string(),
            auctions_path: "/auction/auction/auctions".to_string(),
            bids_path: "/auction/auction/bids".to_string(),
            poll_interval_ms: 1000,
            request_timeout_secs: 10,
            tx_search_page_size: 100,
        }
    }
}

impl EndpointConfig {
    /// Head polling interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// HTTP request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
