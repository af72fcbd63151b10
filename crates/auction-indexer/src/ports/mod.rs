//! # Ports Layer
//!
//! Hexagonal architecture ports (interfaces) for the auction indexer.
//!
//! - **Driving Ports (Inbound)**: the indexer API consumed by the runtime
//! - **Driven Ports (Outbound)**: snapshot, block, transaction and reporting SPIs

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
