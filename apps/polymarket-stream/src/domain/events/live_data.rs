//! LiveData Channel Events
//!
//! # Wire Format (JSON)
//!
//! Every frame is an envelope around a topic-specific payload:
//!
//! ```json
//! {
//!   "topic": "clob_market",
//!   "type": "agg_orderbook",
//!   "timestamp": 1757908892351,
//!   "connection_id": "Qx1Yz...",
//!   "payload": { ... }
//! }
//! ```
//!
//! `type` selects the payload schema; `topic` is carried through untouched.
//!
//! | Topic | Types |
//! |-------|-------|
//! | `activity` | `trades`, `orders_matched` |
//! | `comments` | `comment_created`, `comment_removed`, `reaction_created`, `reaction_removed` |
//! | `rfq` | `request_*`, `quote_*` (created, edited, canceled, expired) |
//! | `crypto_prices`, `crypto_prices_chainlink` | `subscribe`, `update` |
//! | `clob_market` | `agg_orderbook`, `price_change`, `last_trade_price`, `tick_size_change`, `market_created`, `market_resolved` |
//! | `clob_user` | `order`, `trade` |
//!
//! Payloads use camelCase on the activity, comments and rfq topics.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Unrecognized;
use super::market::{LastTradePrice, PriceChanges, TickSizeChange};
use super::user::{OrderEvent, TradeEvent};
use crate::domain::integrity::{OrderBookSnapshot, TickSize};
use crate::domain::wire::{self, ConditionId, Side, timestamp};

/// Envelope shared by every LiveData frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveDataMessage<P> {
    /// Topic the frame was published on
    pub topic: String,

    /// Discriminant as received
    #[serde(rename = "type")]
    pub kind: String,

    /// Server time
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,

    /// Server-assigned connection id, on some topics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,

    /// Topic payload
    pub payload: P,
}

// =============================================================================
// activity
// =============================================================================

/// A trade on the public activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTrade {
    /// Token id
    #[serde(rename = "asset")]
    pub token_id: String,
    /// Market condition id
    pub condition_id: String,
    /// Parent event slug
    pub event_slug: String,
    /// Outcome label
    pub outcome: String,
    /// Outcome index within the market
    pub outcome_index: u32,
    /// Trade price
    pub price: Decimal,
    /// Trade side
    pub side: Side,
    /// Trade size
    pub size: Decimal,
    /// Market slug
    pub slug: String,
    /// Trade time
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    /// Event title
    pub title: String,
    /// Settlement transaction hash
    pub transaction_hash: String,
    /// Trader proxy wallet
    pub proxy_wallet: String,
    /// Market icon URL
    #[serde(default)]
    pub icon: String,
    /// Trader display name
    #[serde(default)]
    pub name: String,
    /// Trader bio
    #[serde(default)]
    pub bio: String,
    /// Trader pseudonym
    #[serde(default)]
    pub pseudonym: String,
    /// Trader avatar URL
    #[serde(default)]
    pub profile_image: String,
    /// Optimised avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_optimized: Option<String>,
}

// =============================================================================
// comments
// =============================================================================

/// A comment on an event or market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Comment id
    #[serde(deserialize_with = "wire::string_or_number")]
    pub id: String,
    /// Comment text
    pub body: String,
    /// Kind of entity commented on (`Event`, `Series`, ...)
    pub parent_entity_type: String,
    /// Id of the entity commented on
    #[serde(rename = "parentEntityID", deserialize_with = "wire::string_or_number")]
    pub parent_entity_id: String,
    /// Parent comment for replies
    #[serde(
        rename = "parentCommentID",
        default,
        deserialize_with = "wire::verbatim",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_comment_id: Option<String>,
    /// Author wallet
    pub user_address: String,
    /// Wallet replied to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_address: Option<String>,
    /// Creation time
    #[serde(
        default,
        deserialize_with = "timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Last edit time
    #[serde(
        default,
        deserialize_with = "timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    /// Reaction count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_count: Option<u64>,
    /// Report count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_count: Option<u64>,
}

/// A reaction to a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    /// Reaction id
    #[serde(deserialize_with = "wire::string_or_number")]
    pub id: String,
    /// Comment reacted to
    #[serde(rename = "commentID", deserialize_with = "wire::string_or_number")]
    pub comment_id: String,
    /// Reaction kind
    pub reaction_type: String,
    /// Emoji or icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Reacting wallet
    pub user_address: String,
    /// Creation time
    #[serde(
        default,
        deserialize_with = "timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// rfq
// =============================================================================

/// Lifecycle state of an RFQ request or quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RfqState {
    /// Request expired
    StateRequestExpired,
    /// Cancelled by the requesting user
    StateUserCanceled,
    /// Request cancelled
    StateRequestCanceled,
    /// Cancelled by the maker
    StateMakerCanceled,
    /// Open for quotes
    StateAcceptingQuotes,
    /// At least one quote received
    StateRequestQuoted,
    /// A better quote arrived
    StateQuoteImproved,
}

/// Request for quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqRequest {
    /// Request id
    pub request_id: String,
    /// Requester proxy wallet
    pub proxy_address: String,
    /// Requester wallet
    pub user_address: String,
    /// Market condition id
    #[serde(rename = "market")]
    pub condition_id: ConditionId,
    /// Token requested
    #[serde(rename = "token")]
    pub token_id: String,
    /// Complementary token
    #[serde(rename = "complement")]
    pub complement_token_id: String,
    /// Current state
    pub state: RfqState,
    /// Requested side
    pub side: Side,
    /// Implied price
    pub price: Decimal,
    /// Input size
    pub size_in: Decimal,
    /// Output size
    pub size_out: Decimal,
    /// Expiry
    #[serde(
        default,
        deserialize_with = "timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry: Option<DateTime<Utc>>,
}

/// Quote answering an RFQ request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqQuote {
    /// Quote id
    pub quote_id: String,
    /// Request being quoted
    pub request_id: String,
    /// Quoter proxy wallet
    pub proxy_address: String,
    /// Quoter wallet
    pub user_address: String,
    /// Market condition id
    #[serde(rename = "condition")]
    pub condition_id: ConditionId,
    /// Token quoted
    #[serde(rename = "token")]
    pub token_id: String,
    /// Complementary token
    #[serde(rename = "complement")]
    pub complement_token_id: String,
    /// Current state
    pub state: RfqState,
    /// Quoted side
    pub side: Side,
    /// Input size
    pub size_in: Decimal,
    /// Output size
    pub size_out: Decimal,
    /// Expiry
    #[serde(
        default,
        deserialize_with = "timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry: Option<DateTime<Utc>>,
}

// =============================================================================
// crypto_prices
// =============================================================================

/// One `(time, value)` sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeseriesPoint {
    /// Sample time
    #[serde(rename = "t", alias = "timestamp", deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    /// Sample value
    #[serde(rename = "p", alias = "value")]
    pub value: Decimal,
}

/// Price history sent right after subscribing to a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoPriceSubscribe {
    /// Symbol, e.g. `btcusdt`
    pub symbol: String,
    /// Recent samples
    pub data: Vec<TimeseriesPoint>,
}

/// A single price tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoPriceUpdate {
    /// Symbol, e.g. `btcusdt`
    pub symbol: String,
    /// Sample time
    #[serde(alias = "t", deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    /// Price
    #[serde(alias = "p")]
    pub value: Decimal,
    /// Price text at full source precision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_accuracy_value: Option<String>,
}

// =============================================================================
// clob_market
// =============================================================================

/// `agg_orderbook` payload: one book or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggOrderBookPayload {
    /// Several books in one frame
    Many(Vec<OrderBookSnapshot>),
    /// A single book
    Single(OrderBookSnapshot),
}

impl AggOrderBookPayload {
    /// The books, whichever form they arrived in.
    #[must_use]
    pub fn books(&self) -> &[OrderBookSnapshot] {
        match self {
            Self::Many(books) => books,
            Self::Single(book) => std::slice::from_ref(book),
        }
    }
}

/// Market created or resolved on the CLOB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClobMarket {
    /// Outcome token ids
    #[serde(rename = "asset_ids")]
    pub token_ids: Vec<String>,
    /// Market condition id
    #[serde(rename = "market")]
    pub condition_id: ConditionId,
    /// Minimum order size
    pub min_order_size: Decimal,
    /// Tick size
    pub tick_size: TickSize,
    /// Negative-risk market flag
    pub neg_risk: bool,
}

// =============================================================================
// server errors
// =============================================================================

/// Discriminant reported for [`ServerError`] frames, which carry no `type`.
pub const SERVER_ERROR: &str = "error";

/// Error frame sent in place of an envelope, e.g. for a rejected
/// subscription request.
///
/// ```json
/// {"message": "invalid subscription", "connectionId": "Qx1Yz...", "requestId": "8f2e..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerError {
    /// Error text from the server
    pub message: String,
    /// Connection the error belongs to
    #[serde(default, alias = "connection_id", skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
    /// Request that triggered the error
    #[serde(default, alias = "request_id", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

// =============================================================================
// LiveData Event
// =============================================================================

/// LiveData channel event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveDataEvent {
    /// `trades`, `orders_matched`
    ActivityTrade(LiveDataMessage<ActivityTrade>),
    /// `comment_created`, `comment_removed`
    Comment(LiveDataMessage<Comment>),
    /// `reaction_created`, `reaction_removed`
    Reaction(LiveDataMessage<Reaction>),
    /// `request_created`, `request_edited`, `request_canceled`, `request_expired`
    Request(LiveDataMessage<RfqRequest>),
    /// `quote_created`, `quote_edited`, `quote_canceled`, `quote_expired`
    Quote(LiveDataMessage<RfqQuote>),
    /// `subscribe`
    CryptoPriceSubscribe(LiveDataMessage<CryptoPriceSubscribe>),
    /// `update`
    CryptoPriceUpdate(LiveDataMessage<CryptoPriceUpdate>),
    /// `agg_orderbook`
    AggOrderBookSummary(LiveDataMessage<AggOrderBookPayload>),
    /// `price_change`
    PriceChanges(LiveDataMessage<PriceChanges>),
    /// `last_trade_price`
    LastTradePrice(LiveDataMessage<LastTradePrice>),
    /// `tick_size_change`
    TickSizeChange(LiveDataMessage<TickSizeChange>),
    /// `market_created`, `market_resolved`
    ClobMarketStatus(LiveDataMessage<ClobMarket>),
    /// `order` on `clob_user`
    Order(LiveDataMessage<OrderEvent>),
    /// `trade` on `clob_user`
    Trade(LiveDataMessage<TradeEvent>),
    /// Error frame without a `type`
    ServerError(ServerError),
    /// Any other `type`
    Unrecognized(Unrecognized),
}

impl LiveDataEvent {
    /// The `type` this event was decoded from.
    #[must_use]
    pub fn discriminant(&self) -> &str {
        match self {
            Self::ActivityTrade(m) => &m.kind,
            Self::Comment(m) => &m.kind,
            Self::Reaction(m) => &m.kind,
            Self::Request(m) => &m.kind,
            Self::Quote(m) => &m.kind,
            Self::CryptoPriceSubscribe(m) => &m.kind,
            Self::CryptoPriceUpdate(m) => &m.kind,
            Self::AggOrderBookSummary(m) => &m.kind,
            Self::PriceChanges(m) => &m.kind,
            Self::LastTradePrice(m) => &m.kind,
            Self::TickSizeChange(m) => &m.kind,
            Self::ClobMarketStatus(m) => &m.kind,
            Self::Order(m) => &m.kind,
            Self::Trade(m) => &m.kind,
            Self::ServerError(_) => SERVER_ERROR,
            Self::Unrecognized(u) => &u.discriminant,
        }
    }

    /// Topic the frame was published on (`None` for server errors and for
    /// unrecognized frames that carried no string topic).
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        match self {
            Self::ActivityTrade(m) => Some(&m.topic),
            Self::Comment(m) => Some(&m.topic),
            Self::Reaction(m) => Some(&m.topic),
            Self::Request(m) => Some(&m.topic),
            Self::Quote(m) => Some(&m.topic),
            Self::CryptoPriceSubscribe(m) => Some(&m.topic),
            Self::CryptoPriceUpdate(m) => Some(&m.topic),
            Self::AggOrderBookSummary(m) => Some(&m.topic),
            Self::PriceChanges(m) => Some(&m.topic),
            Self::LastTradePrice(m) => Some(&m.topic),
            Self::TickSizeChange(m) => Some(&m.topic),
            Self::ClobMarketStatus(m) => Some(&m.topic),
            Self::Order(m) => Some(&m.topic),
            Self::Trade(m) => Some(&m.topic),
            Self::ServerError(_) => None,
            Self::Unrecognized(u) => u.raw.get("topic").and_then(serde_json::Value::as_str),
        }
    }
}
