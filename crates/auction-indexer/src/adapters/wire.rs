//! JSON wire types of the Cosmos REST and CometBFT RPC responses.
//!
//! 64-bit integers arrive as decimal strings (proto3 JSON); numbers are
//! accepted too.

use serde::Deserialize;
use serde_json::{Map, Value};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::domain::{
    Auction, Bid, RawMessage, SnapshotAuction, SourceError, TxRef, TYPE_URL_KEY,
};

// =============================================================================
// Auction module queries
// =============================================================================

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuctionDto {
    #[serde(default)]
    pub creator: String,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "start_price")]
    pub start_price: String,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub ended: bool,
    #[serde(default, alias = "highest_bid_exists")]
    pub highest_bid_exists: bool,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    #[serde(default, alias = "current_highest_bid_id")]
    pub current_highest_bid_id: u64,
}

impl From<AuctionDto> for SnapshotAuction {
    fn from(dto: AuctionDto) -> Self {
        SnapshotAuction {
            auction: Auction {
                id: dto.id,
                creator: dto.creator,
                name: dto.name,
                start_price: dto.start_price,
                duration: dto.duration,
                ended: dto.ended,
            },
            highest_bid_exists: dto.highest_bid_exists,
            current_highest_bid_id: dto.current_highest_bid_id,
        }
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BidDto {
    #[serde(default)]
    pub creator: String,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    #[serde(default, alias = "auction_id")]
    pub auction_id: u64,
    #[serde(default, alias = "bid_price")]
    pub bid_price: String,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    #[serde(default)]
    pub id: u64,
}

impl From<BidDto> for Bid {
    fn from(dto: BidDto) -> Self {
        Bid {
            creator: dto.creator,
            auction_id: dto.auction_id,
            bid_price: dto.bid_price,
            id: dto.id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageResponse {
    #[serde(default)]
    pub next_key: Option<String>,
}

/// A page of a list query: its items and the key of the next page.
pub(crate) trait PagedResponse {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

fn next_key(pagination: Option<PageResponse>) -> Option<String> {
    pagination
        .and_then(|p| p.next_key)
        .filter(|key| !key.is_empty())
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuctionsPage {
    #[serde(default)]
    pub auction: Vec<AuctionDto>,
    #[serde(default)]
    pub pagination: Option<PageResponse>,
}

impl PagedResponse for AuctionsPage {
    type Item = SnapshotAuction;

    fn into_parts(self) -> (Vec<SnapshotAuction>, Option<String>) {
        let items = self.auction.into_iter().map(Into::into).collect();
        (items, next_key(self.pagination))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BidsPage {
    #[serde(default)]
    pub bid: Vec<BidDto>,
    #[serde(default)]
    pub pagination: Option<PageResponse>,
}

impl PagedResponse for BidsPage {
    type Item = Bid;

    fn into_parts(self) -> (Vec<Bid>, Option<String>) {
        let items = self.bid.into_iter().map(Into::into).collect();
        (items, next_key(self.pagination))
    }
}

// =============================================================================
// CometBFT RPC
// =============================================================================

/// JSON-RPC envelope returned by the CometBFT URI endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct RpcEnvelope<T> {
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl<T> RpcEnvelope<T> {
    pub fn into_result(self, method: &str) -> Result<T, SourceError> {
        if let Some(error) = self.error {
            return Err(SourceError::Transport(format!(
                "rpc {} error: {}",
                method, error
            )));
        }
        self.result
            .ok_or_else(|| SourceError::Decode(format!("rpc {} returned no result", method)))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResult {
    pub sync_info: SyncInfo,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(crate) struct SyncInfo {
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub latest_block_height: u64,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(crate) struct TxSearchResult {
    #[serde(default)]
    pub txs: Vec<TxSearchEntry>,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TxSearchEntry {
    pub hash: String,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub tx_result: TxResultDto,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TxResultDto {
    #[serde(default)]
    pub code: u32,
}

impl From<TxSearchEntry> for TxRef {
    fn from(entry: TxSearchEntry) -> Self {
        TxRef::new(entry.hash, entry.tx_result.code)
    }
}

// =============================================================================
// Cosmos tx service
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct GetTxResponse {
    pub tx: TxDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TxDto {
    pub body: TxBodyDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TxBodyDto {
    #[serde(default)]
    pub messages: Vec<Map<String, Value>>,
}

/// Flatten one `Any`-encoded message into a `RawMessage`.
///
/// String fields are kept verbatim; other values keep their JSON text.
pub(crate) fn raw_message(mut object: Map<String, Value>) -> Result<RawMessage, SourceError> {
    let type_url = match object.remove(TYPE_URL_KEY) {
        Some(Value::String(type_url)) => type_url,
        _ => {
            return Err(SourceError::Decode(format!(
                "message without string {} field",
                TYPE_URL_KEY
            )))
        }
    };

    let mut message = RawMessage::new(type_url);
    for (name, value) in object {
        let text = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        message.fields.insert(name, text);
    }
    Ok(message)
}
