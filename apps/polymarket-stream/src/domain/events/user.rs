//! User Channel Events
//!
//! # Wire Format (JSON)
//!
//! ```json
//! {"event_type": "order", "type": "PLACEMENT", "id": "0x...", "asset_id": "...", "market": "0x...",
//!  "owner": "api-key", "maker_address": "0x...", "price": "0.57", "side": "SELL",
//!  "original_size": "10", "size_matched": "0", "outcome": "YES", "order_type": "GTC",
//!  "status": "LIVE", "created_at": "1672290687", "expiration": "0", "timestamp": "1672290687"}
//!
//! {"event_type": "trade", "type": "TRADE", "id": "28c4d2eb-...", "taker_order_id": "0x...",
//!  "asset_id": "...", "market": "0x...", "owner": "api-key", "price": "0.57", "size": "10",
//!  "side": "BUY", "outcome": "YES", "status": "MATCHED", "last_update": "1672290701",
//!  "matchtime": "1672290701", "maker_orders": [{"order_id": "0x...", "owner": "...", ...}]}
//! ```
//!
//! # Owners
//!
//! `owner` is the API key of the account the event was delivered to. When
//! the server also sends `order_owner` / `trade_owner` those identify the
//! owner of the order or trade itself; otherwise it is the same account.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Tagged, Unrecognized};
use crate::domain::wire::{Address, ConditionId, Side, timestamp};

/// Time-in-force of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Good till cancelled
    Gtc,
    /// Good till date
    Gtd,
    /// Fill or kill
    Fok,
    /// Fill and kill
    Fak,
}

/// What happened to the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderEventKind {
    /// Order placed
    Placement,
    /// Order partially matched
    Update,
    /// Order cancelled
    Cancellation,
}

/// Current order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Resting on the book
    Live,
    /// Cancelled
    Canceled,
    /// Fully matched
    Matched,
}

/// Settlement status of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    /// Matched off-chain
    Matched,
    /// Included in a block
    Mined,
    /// Final on-chain
    Confirmed,
    /// Submission being retried
    Retrying,
    /// Permanently failed
    Failed,
}

/// Order lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Order id
    #[serde(rename = "id")]
    pub order_id: String,

    /// Token id
    #[serde(rename = "asset_id")]
    pub token_id: String,

    /// Market condition id
    #[serde(rename = "market")]
    pub condition_id: ConditionId,

    /// Trade ids this order participated in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_trades: Option<Vec<String>>,

    /// Maker wallet
    pub maker_address: Address,

    /// API key the event was delivered to
    pub owner: String,

    /// API key owning the order, when sent separately
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_owner: Option<String>,

    /// Limit price
    pub price: Decimal,

    /// Order side
    pub side: Side,

    /// Size matched so far
    pub size_matched: Decimal,

    /// Size at placement
    pub original_size: Decimal,

    /// Outcome label
    pub outcome: String,

    /// Time-in-force
    pub order_type: OrderType,

    /// Creation time
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,

    /// Expiry for GTD orders; `"0"` on the wire means none
    #[serde(
        default,
        deserialize_with = "timestamp::zero_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration: Option<DateTime<Utc>>,

    /// Event time
    #[serde(
        default,
        deserialize_with = "timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,

    /// Lifecycle step
    #[serde(rename = "type")]
    pub kind: OrderEventKind,

    /// Status after this event
    pub status: OrderStatus,
}

impl OrderEvent {
    /// API key owning the order.
    #[must_use]
    pub fn resolved_order_owner(&self) -> &str {
        self.order_owner.as_deref().unwrap_or(&self.owner)
    }

    /// API key the event was delivered to.
    #[must_use]
    pub fn event_owner(&self) -> &str {
        &self.owner
    }

    /// Size still open; `None` if the subtraction overflows.
    #[must_use]
    pub fn remaining_size(&self) -> Option<Decimal> {
        self.original_size.checked_sub(self.size_matched)
    }
}

/// Maker side of a trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakerOrder {
    /// Maker order id
    pub order_id: String,

    /// Maker API key
    pub owner: String,

    /// Maker wallet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maker_address: Option<Address>,

    /// Token id
    #[serde(rename = "asset_id")]
    pub token_id: String,

    /// Size matched against this maker order
    pub matched_amount: Decimal,

    /// Maker price
    pub price: Decimal,

    /// Outcome label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,

    /// Maker fee rate in basis points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_rate_bps: Option<Decimal>,

    /// Maker side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
}

/// Trade lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Trade id
    #[serde(rename = "id")]
    pub trade_id: String,

    /// Token id
    #[serde(rename = "asset_id")]
    pub token_id: String,

    /// Market condition id
    #[serde(rename = "market")]
    pub condition_id: ConditionId,

    /// Taker order id
    pub taker_order_id: String,

    /// Matched maker orders
    #[serde(default)]
    pub maker_orders: Vec<MakerOrder>,

    /// API key the event was delivered to
    pub owner: String,

    /// API key owning the trade, when sent separately
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_owner: Option<String>,

    /// Trade price
    pub price: Decimal,

    /// Trade size
    pub size: Decimal,

    /// Taker side
    pub side: Side,

    /// Outcome label
    pub outcome: String,

    /// Last status change
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub last_update: DateTime<Utc>,

    /// Match time
    #[serde(
        default,
        deserialize_with = "timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub matchtime: Option<DateTime<Utc>>,

    /// Event time
    #[serde(
        default,
        deserialize_with = "timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,

    /// Always `TRADE` when present
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Settlement status
    pub status: TradeStatus,
}

impl TradeEvent {
    /// API key owning the trade.
    #[must_use]
    pub fn resolved_trade_owner(&self) -> &str {
        self.trade_owner.as_deref().unwrap_or(&self.owner)
    }

    /// API key the event was delivered to.
    #[must_use]
    pub fn event_owner(&self) -> &str {
        &self.owner
    }
}

/// User channel event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    /// `order`
    Order(Tagged<OrderEvent>),
    /// `trade`
    Trade(Tagged<TradeEvent>),
    /// Any other `event_type`
    Unrecognized(Unrecognized),
}

impl UserEvent {
    /// The `event_type` this event was decoded from.
    #[must_use]
    pub fn discriminant(&self) -> &str {
        match self {
            Self::Order(e) => &e.event_type,
            Self::Trade(e) => &e.event_type,
            Self::Unrecognized(e) => &e.discriminant,
        }
    }
}
