//! # Auction Events
//!
//! Raw chain messages, their classification into typed auction events,
//! and the records produced once an event has been applied.

use std::collections::HashMap;

use super::entities::{Auction, Bid};
use super::errors::ClassifyError;
use super::value_objects::DEFAULT_TYPE_URL_PREFIX;

/// One decoded transaction message: its type url plus flat string fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawMessage {
    /// The message's `@type`, e.g. `/auction.auction.MsgPlaceBid`.
    pub type_url: String,
    /// Every other top-level field, stringified.
    pub fields: HashMap<String, String>,
}

impl RawMessage {
    /// Create a message with no fields.
    pub fn new(type_url: impl Into<String>) -> Self {
        Self {
            type_url: type_url.into(),
            fields: HashMap::new(),
        }
    }

    /// Builder-style field insertion.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    fn text(&self, field: &'static str) -> Result<&str, ClassifyError> {
        self.fields
            .get(field)
            .map(String::as_str)
            .ok_or_else(|| ClassifyError::MissingField {
                type_url: self.type_url.clone(),
                field,
            })
    }

    fn owned(&self, field: &'static str) -> Result<String, ClassifyError> {
        self.text(field).map(str::to_owned)
    }

    /// Plain decimal digits only; a sign prefix is rejected.
    fn uint(&self, field: &'static str) -> Result<u64, ClassifyError> {
        let raw = self.text(field)?;
        let invalid = || ClassifyError::InvalidInteger {
            type_url: self.type_url.clone(),
            field,
            value: raw.to_string(),
        };
        if raw.starts_with('+') {
            return Err(invalid());
        }
        raw.parse::<u64>().map_err(|_| invalid())
    }
}

/// A classified auction-lifecycle message with typed fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuctionEvent {
    /// A bid the chain accepted.
    PlaceBid {
        /// Bidder address
        creator: String,
        /// Target auction
        auction_id: u64,
        /// Decimal string
        bid_price: String,
    },
    /// A newly opened auction. Its id is assigned when applied.
    CreateAuction {
        /// Seller address
        creator: String,
        /// Display name
        name: String,
        /// Decimal string
        start_price: String,
        /// Chain-native duration
        duration: u64,
    },
    /// An auction closed on chain.
    FinalizeAuction {
        /// Address that sent the finalize message
        creator: String,
        /// Auction being finalized
        auction_id: u64,
    },
    /// Any other message type. Normal traffic, not an error.
    Ignored,
}

/// What an applied event changed, carrying everything the reporter prints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppliedEvent {
    /// The bid now stored as the auction's highest.
    BidPlaced(Bid),
    /// The auction as inserted, with its assigned id.
    AuctionCreated(Auction),
    /// A finalize, with whatever was known about the auction at that moment.
    AuctionFinalized {
        /// Address that sent the finalize message
        creator: String,
        /// Finalized auction id
        auction_id: u64,
        /// Auction record, if known
        auction: Option<Auction>,
        /// Highest bid removed from the map, if any
        winning_bid: Option<Bid>,
    },
}

/// Maps message type urls to auction events.
///
/// Type urls are `{prefix}MsgPlaceBid`, `{prefix}MsgCreateAuction` and
/// `{prefix}MsgFinalizeAuction`, built once from the prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageClassifier {
    place_bid: String,
    create_auction: String,
    finalize_auction: String,
}

impl MessageClassifier {
    /// Classifier for a module registered under `prefix` (e.g. `/auction.auction.`).
    pub fn new(prefix: &str) -> Self {
        Self {
            place_bid: format!("{}MsgPlaceBid", prefix),
            create_auction: format!("{}MsgCreateAuction", prefix),
            finalize_auction: format!("{}MsgFinalizeAuction", prefix),
        }
    }

    /// Classify one message and extract its typed fields.
    ///
    /// Unknown type urls yield `Ok(AuctionEvent::Ignored)`. A recognized
    /// type with missing or non-numeric fields yields `Err`.
    pub fn classify(&self, msg: &RawMessage) -> Result<AuctionEvent, ClassifyError> {
        let type_url = msg.type_url.as_str();

        if type_url == self.place_bid {
            Ok(AuctionEvent::PlaceBid {
                creator: msg.owned("creator")?,
                auction_id: msg.uint("auctionId")?,
                bid_price: msg.owned("bidPrice")?,
            })
        } else if type_url == self.create_auction {
            Ok(AuctionEvent::CreateAuction {
                creator: msg.owned("creator")?,
                name: msg.owned("name")?,
                start_price: msg.owned("startPrice")?,
                duration: msg.uint("duration")?,
            })
        } else if type_url == self.finalize_auction {
            Ok(AuctionEvent::FinalizeAuction {
                creator: msg.owned("creator")?,
                auction_id: msg.uint("auctionId")?,
            })
        } else {
            Ok(AuctionEvent::Ignored)
        }
    }
}

impl Default for MessageClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_TYPE_URL_PREFIX)
    }
}
