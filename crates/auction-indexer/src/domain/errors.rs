//! # Domain Errors
//!
//! Error types for the auction indexer, grouped by where they arise:
//! chain collaborators, message classification, snapshot loading, and the
//! reconciliation service that decides whether to retry, skip, or abort.

use thiserror::Error;

/// Errors returned by the outbound chain and snapshot ports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The requested record (transaction, block) does not exist (yet).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Connection, timeout, or non-success HTTP status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The collaborator answered, but the payload could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl SourceError {
    /// Whether re-issuing the same request may succeed.
    ///
    /// A transaction that is not found yet usually means the REST indexer
    /// is lagging behind the RPC node, so it is retried like a transport error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Transport(_))
    }
}

/// A recognized auction message whose fields could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// A required field is absent from the message.
    #[error("{type_url}: missing field `{field}`")]
    MissingField {
        /// Message type url
        type_url: String,
        /// Name of the absent field
        field: &'static str,
    },

    /// A field that must be an unsigned integer is not one.
    #[error("{type_url}: field `{field}` is not an unsigned integer: {value:?}")]
    InvalidInteger {
        /// Message type url
        type_url: String,
        /// Name of the offending field
        field: &'static str,
        /// Raw value as received
        value: String,
    },
}

/// Failures while seeding state from the snapshot. Always fatal.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot query itself failed.
    #[error("Snapshot query failed: {0}")]
    Source(#[from] SourceError),

    /// Two snapshot auctions share an id.
    #[error("Duplicate auction id {0} in snapshot")]
    DuplicateAuction(u64),

    /// An auction claims a highest bid that the bid list does not contain.
    #[error("Auction {auction_id} references highest bid {bid_id} missing from snapshot")]
    MissingHighestBid {
        /// Auction carrying the dangling reference
        auction_id: u64,
        /// Bid id that could not be found
        bid_id: u64,
    },
}

/// Errors that stop the reconciliation service.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// Initial state could not be established.
    #[error("Startup failed: {0}")]
    Snapshot(#[from] SnapshotError),

    /// A non-retryable collaborator error during the loop.
    #[error("Chain source error: {0}")]
    Source(#[from] SourceError),

    /// A retryable error kept recurring past the retry budget.
    #[error("{operation} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        /// What was being fetched
        operation: String,
        /// Total attempts made
        attempts: u32,
        /// Error from the final attempt
        #[source]
        last_error: SourceError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(SourceError::Transport("reset".into()).is_retryable());
        assert!(SourceError::NotFound("tx".into()).is_retryable());
        assert!(!SourceError::Decode("bad json".into()).is_retryable());
    }

    #[test]
    fn test_classify_error_names_field() {
        let err = ClassifyError::InvalidInteger {
            type_url: "/auction.auction.MsgPlaceBid".to_string(),
            field: "auctionId",
            value: "abc".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("auctionId"));
        assert!(text.contains("abc"));
    }

    #[test]
    fn test_missing_highest_bid_error() {
        let err = SnapshotError::MissingHighestBid {
            auction_id: 4,
            bid_id: 17,
        };
        assert!(err.to_string().contains("17"));
    }

    #[test]
    fn test_retries_exhausted_error() {
        let err = IndexerError::RetriesExhausted {
            operation: "block 42".to_string(),
            attempts: 6,
            last_error: SourceError::Transport("timeout".into()),
        };
        let text = err.to_string();
        assert!(text.contains("block 42"));
        assert!(text.contains("6 attempts"));
    }
}
