//! # Runtime Configuration
//!
//! Command-line flags, each also readable from an `AUCTION_INDEXER_*`
//! environment variable, validated into the library's config types.

use auction_indexer::{EndpointConfig, IndexerConfig};
use clap::Parser;
use thiserror::Error;

/// CometBFT refuses `tx_search` pages larger than this.
pub const MAX_TX_SEARCH_PAGE_SIZE: u32 = 100;

/// Auction indexer: replays chain blocks into live auction state.
#[derive(Parser, Debug, Clone)]
#[command(name = "indexer-runtime", version)]
#[command(about = "Rebuilds auction state from a snapshot plus block-by-block replay")]
pub struct CliArgs {
    /// CometBFT RPC endpoint
    #[arg(long, env = "AUCTION_INDEXER_RPC_ENDPOINT", default_value_t = EndpointConfig::default().rpc_endpoint)]
    pub rpc_endpoint: String,

    /// Cosmos REST endpoint
    #[arg(long, env = "AUCTION_INDEXER_API_ENDPOINT", default_value_t = EndpointConfig::default().api_endpoint)]
    pub api_endpoint: String,

    /// REST path listing every auction
    #[arg(long, env = "AUCTION_INDEXER_AUCTIONS_PATH", default_value_t = EndpointConfig::default().auctions_path)]
    pub auctions_path: String,

    /// REST path listing every bid
    #[arg(long, env = "AUCTION_INDEXER_BIDS_PATH", default_value_t = EndpointConfig::default().bids_path)]
    pub bids_path: String,

    /// Head polling interval in milliseconds
    #[arg(long, env = "AUCTION_INDEXER_POLL_INTERVAL_MS", default_value_t = EndpointConfig::default().poll_interval_ms)]
    pub poll_interval_ms: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "AUCTION_INDEXER_REQUEST_TIMEOUT_SECS", default_value_t = EndpointConfig::default().request_timeout_secs)]
    pub request_timeout_secs: u64,

    /// Page size for tx_search
    #[arg(long, env = "AUCTION_INDEXER_TX_SEARCH_PAGE_SIZE", default_value_t = EndpointConfig::default().tx_search_page_size)]
    pub tx_search_page_size: u32,

    /// Emit highest-bid summaries on heights divisible by this (0 disables)
    #[arg(long, env = "AUCTION_INDEXER_SUMMARY_INTERVAL", default_value_t = IndexerConfig::default().summary_interval)]
    pub summary_interval: u64,

    /// Type-url prefix of the auction module messages
    #[arg(long, env = "AUCTION_INDEXER_TYPE_URL_PREFIX", default_value_t = IndexerConfig::default().type_url_prefix)]
    pub type_url_prefix: String,

    /// Retries per fetch before giving up
    #[arg(long, env = "AUCTION_INDEXER_MAX_FETCH_RETRIES", default_value_t = IndexerConfig::default().max_fetch_retries)]
    pub max_fetch_retries: u32,

    /// First retry delay in milliseconds
    #[arg(long, env = "AUCTION_INDEXER_RETRY_BASE_DELAY_MS", default_value_t = IndexerConfig::default().retry_base_delay_ms)]
    pub retry_base_delay_ms: u64,

    /// Retry delay cap in milliseconds
    #[arg(long, env = "AUCTION_INDEXER_RETRY_MAX_DELAY_MS", default_value_t = IndexerConfig::default().retry_max_delay_ms)]
    pub retry_max_delay_ms: u64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "AUCTION_INDEXER_LOG", default_value = "info")]
    pub log_filter: String,
}

/// Rejected settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Endpoint is not an http(s) URL.
    #[error("{name} must be an http:// or https:// URL, got {value:?}")]
    InvalidEndpoint {
        /// Flag name
        name: &'static str,
        /// Rejected value
        value: String,
    },

    /// Query path does not start with '/'.
    #[error("{name} must start with '/', got {value:?}")]
    InvalidPath {
        /// Flag name
        name: &'static str,
        /// Rejected value
        value: String,
    },

    /// Type-url prefix is not of the form `/<package>.`.
    #[error("type url prefix must start with '/' and end with '.', got {0:?}")]
    InvalidTypeUrlPrefix(String),

    /// Numeric setting outside its allowed range.
    #[error("{name} must be within {min}..={max}, got {value}")]
    OutOfRange {
        /// Flag name
        name: &'static str,
        /// Rejected value
        value: u64,
        /// Lower bound
        min: u64,
        /// Upper bound
        max: u64,
    },

    /// Base retry delay larger than the cap.
    #[error("retry base delay {base_ms}ms exceeds max delay {max_ms}ms")]
    RetryDelayInverted {
        /// Base delay
        base_ms: u64,
        /// Cap
        max_ms: u64,
    },
}

/// Validated settings for one indexer process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    /// Engine settings
    pub indexer: IndexerConfig,
    /// Chain endpoints
    pub endpoints: EndpointConfig,
    /// Fallback log filter
    pub log_filter: String,
}

impl CliArgs {
    /// Validate and split into library configs.
    pub fn into_settings(self) -> Result<RuntimeSettings, ConfigError> {
        check_endpoint("rpc-endpoint", &self.rpc_endpoint)?;
        check_endpoint("api-endpoint", &self.api_endpoint)?;
        check_path("auctions-path", &self.auctions_path)?;
        check_path("bids-path", &self.bids_path)?;

        if !self.type_url_prefix.starts_with('/') || !self.type_url_prefix.ends_with('.') {
            return Err(ConfigError::InvalidTypeUrlPrefix(self.type_url_prefix));
        }

        check_range("poll-interval-ms", self.poll_interval_ms, 1, u64::MAX)?;
        check_range("request-timeout-secs", self.request_timeout_secs, 1, 3600)?;
        check_range(
            "tx-search-page-size",
            u64::from(self.tx_search_page_size),
            1,
            u64::from(MAX_TX_SEARCH_PAGE_SIZE),
        )?;

        if self.retry_base_delay_ms > self.retry_max_delay_ms {
            return Err(ConfigError::RetryDelayInverted {
                base_ms: self.retry_base_delay_ms,
                max_ms: self.retry_max_delay_ms,
            });
        }

        Ok(RuntimeSettings {
            indexer: IndexerConfig {
                summary_interval: self.summary_interval,
                type_url_prefix: self.type_url_prefix,
                max_fetch_retries: self.max_fetch_retries,
                retry_base_delay_ms: self.retry_base_delay_ms,
                retry_max_delay_ms: self.retry_max_delay_ms,
            },
            endpoints: EndpointConfig {
                rpc_endpoint: self.rpc_endpoint,
                api_endpoint: self.api_endpoint,
                auctions_path: self.auctions_path,
                bids_path: self.bids_path,
                poll_interval_ms: self.poll_interval_ms,
                request_timeout_secs: self.request_timeout_secs,
                tx_search_page_size: self.tx_search_page_size,
            },
            log_filter: self.log_filter,
        })
    }
}

fn check_endpoint(name: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidEndpoint {
            name,
            value: value.to_string(),
        })
    }
}

fn check_path(name: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::InvalidPath {
            name,
            value: value.to_string(),
        })
    }
}

fn check_range(name: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}
