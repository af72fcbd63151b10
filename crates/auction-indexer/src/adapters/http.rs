//! Shared HTTP client for the chain adapters.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::domain::SourceError;

/// Upper bound on the connect phase of a request.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest response excerpt kept in an error message.
const ERROR_BODY_EXCERPT: usize = 200;

/// JSON-over-HTTP client mapping failures onto `SourceError` kinds.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct HttpChainClient {
    client: Client,
}

impl HttpChainClient {
    /// Create a client with a per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
            .build()
            .map_err(|e| SourceError::Transport(format!("HTTP client init failed: {}", e)))?;

        Ok(Self { client })
    }

    /// GET `url` with `query` and decode the JSON body.
    ///
    /// - 404, or an error body saying "not found" → `NotFound`
    /// - connection failures, timeouts, other non-2xx → `Transport`
    /// - undecodable 2xx body → `Decode`
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        debug!("[indexer] GET {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::Transport(format!("{}: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Transport(format!("{}: {}", url, e)))?;

        if !status.is_success() {
            return Err(classify_status(url, status, &body));
        }

        serde_json::from_str(&body).map_err(|e| SourceError::Decode(format!("{}: {}", url, e)))
    }
}

/// Map a non-success response to an error kind.
fn classify_status(url: &str, status: StatusCode, body: &str) -> SourceError {
    let excerpt: String = body.chars().take(ERROR_BODY_EXCERPT).collect();
    if status == StatusCode::NOT_FOUND || body.to_ascii_lowercase().contains("not found") {
        SourceError::NotFound(format!("{} ({}): {}", url, status, excerpt))
    } else {
        SourceError::Transport(format!("{} returned {}: {}", url, status, excerpt))
    }
}

/// Join a base endpoint and an absolute path without doubling slashes.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://127.0.0.1:1317/", "/auction/auction/auctions"),
            "http://127.0.0.1:1317/auction/auction/auctions"
        );
        assert_eq!(join_url("http://h:1", "status"), "http://h:1/status");
    }

    #[test]
    fn test_classify_404() {
        let err = classify_status("u", StatusCode::NOT_FOUND, "");
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[test]
    fn test_classify_not_found_body() {
        let body = r#"{"code":5,"message":"tx not found: ABCD","details":[]}"#;
        let err = classify_status("u", StatusCode::INTERNAL_SERVER_ERROR, body);
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[test]
    fn test_classify_server_error() {
        let err = classify_status("u", StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, SourceError::Transport(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_client_builds() {
        assert!(HttpChainClient::new(Duration::from_secs(3)).is_ok());
    }
}
