//! # Indexer Runtime
//!
//! Process-level wiring for the auction indexer binary.
//!
//! - `config` - CLI/environment flags and their validation
//! - `runtime` - adapter wiring, loop task, graceful shutdown

pub mod config;
pub mod runtime;

pub use config::{CliArgs, ConfigError, RuntimeSettings};
pub use runtime::{IndexerRuntime, LoopExit};
