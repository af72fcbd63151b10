//! Snapshot source backed by the auction module's REST list queries.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::http::{join_url, HttpChainClient};
use super::wire::{AuctionsPage, BidsPage, PagedResponse};
use crate::config::EndpointConfig;
use crate::domain::{Bid, SnapshotAuction, SourceError};
use crate::ports::SnapshotSource;

/// Reads every auction and bid through `pagination.key` paging.
#[derive(Clone, Debug)]
pub struct RestSnapshotSource {
    http: HttpChainClient,
    auctions_url: String,
    bids_url: String,
}

impl RestSnapshotSource {
    /// Create a source for the configured REST endpoint and query paths.
    pub fn new(http: HttpChainClient, endpoints: &EndpointConfig) -> Self {
        Self {
            http,
            auctions_url: join_url(&endpoints.api_endpoint, &endpoints.auctions_path),
            bids_url: join_url(&endpoints.api_endpoint, &endpoints.bids_path),
        }
    }

    async fn fetch_all<P>(&self, url: &str) -> Result<Vec<P::Item>, SourceError>
    where
        P: PagedResponse + DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut key: Option<String> = None;

        loop {
            let query: Vec<(&str, String)> = match &key {
                Some(key) => vec![("pagination.key", key.clone())],
                None => Vec::new(),
            };
            let page: P = self.http.get_json(url, &query).await?;
            let (mut batch, next) = page.into_parts();
            debug!("[indexer] {} page: {} items", url, batch.len());
            items.append(&mut batch);

            match next {
                Some(next) if key.as_ref() == Some(&next) => {
                    return Err(SourceError::Decode(format!(
                        "{} repeated pagination key {}",
                        url, next
                    )));
                }
                Some(next) => key = Some(next),
                None => return Ok(items),
            }
        }
    }
}

#[async_trait]
impl SnapshotSource for RestSnapshotSource {
    async fn list_auctions(&self) -> Result<Vec<SnapshotAuction>, SourceError> {
        self.fetch_all::<AuctionsPage>(&self.auctions_url).await
    }

    async fn list_bids(&self) -> Result<Vec<Bid>, SourceError> {
        self.fetch_all::<BidsPage>(&self.bids_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_urls_from_config() {
        let http = HttpChainClient::new(Duration::from_secs(1)).unwrap();
        let endpoints = EndpointConfig {
            api_endpoint: "http://node:1317/".into(),
            ..EndpointConfig::default()
        };
        let source = RestSnapshotSource::new(http, &endpoints);
        assert_eq!(source.auctions_url, "http://node:1317/auction/auction/auctions");
        assert_eq!(source.bids_url, "http://node:1317/auction/auction/bids");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let http = HttpChainClient::new(Duration::from_millis(200)).unwrap();
        let endpoints = EndpointConfig {
            api_endpoint: "http://127.0.0.1:1".into(),
            ..EndpointConfig::default()
        };
        let source = RestSnapshotSource::new(http, &endpoints);
        let err = source.list_auctions().await.unwrap_err();
        assert!(matches!(err, SourceError::Transport(_)));
    }
}
