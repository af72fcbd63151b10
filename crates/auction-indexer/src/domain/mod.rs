//! # Domain Layer
//!
//! Pure domain logic for the auction indexer.
//!
//! - `entities`: Auction, Bid, SnapshotAuction and the owned `AuctionState` store
//! - `events`: raw chain messages, the classifier, and applied-event records
//! - `report`: textual log lines for applied events and summaries
//! - `value_objects`: constants, transaction references, per-height outcomes, stats
//! - `errors`: source, classification, snapshot and service errors
//!
//! This module contains NO I/O dependencies. All external interactions
//! are abstracted through ports in the `ports` module.

pub mod entities;
pub mod errors;
pub mod events;
pub mod report;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use events::*;
pub use report::*;
pub use value_objects::*;
