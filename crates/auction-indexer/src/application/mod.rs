//! # Application Module
//!
//! Application services orchestrating the domain and outbound ports.

pub mod retry;
pub mod service;
pub mod snapshot;

pub use retry::RetryPolicy;
pub use service::IndexerService;
pub use snapshot::load_snapshot;
