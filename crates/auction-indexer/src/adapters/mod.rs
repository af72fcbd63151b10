//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound port traits against a Cosmos-SDK auction chain
//! and provides the event log sinks.
//!
//! | Adapter | Port | Backend |
//! |---------|------|---------|
//! | `RestSnapshotSource` | `SnapshotSource` | Cosmos REST module queries |
//! | `CometBlockSource` | `BlockSource` | CometBFT RPC `status` + `tx_search` |
//! | `RestTxFetcher` | `TxFetcher` | Cosmos REST `cosmos/tx/v1beta1/txs` |
//! | `TracingReporter` | `Reporter` | `tracing` events |
//! | `RecordingReporter` | `Reporter` | in-memory lines |

mod comet_rpc;
mod http;
mod reporter;
mod snapshot_rest;
mod tx_rest;
mod wire;

pub use comet_rpc::CometBlockSource;
pub use http::HttpChainClient;
pub use reporter::{RecordingReporter, TracingReporter, EVENT_LOG_TARGET};
pub use snapshot_rest::RestSnapshotSource;
pub use tx_rest::RestTxFetcher;
