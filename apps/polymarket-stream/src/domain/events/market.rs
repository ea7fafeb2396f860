//! Market Channel Events
//!
//! # Wire Format (JSON)
//!
//! Objects are tagged with `event_type`:
//!
//! ```json
//! {"event_type": "book", "market": "0x...", "asset_id": "...", "bids": [...], "asks": [...], "hash": "..."}
//! {"event_type": "price_change", "market": "0x...", "price_changes": [{"asset_id": "...", "price": "0.5", "size": "10", "side": "BUY", "hash": "...", "best_bid": "0.49", "best_ask": "0.51"}], "timestamp": "1757908892351"}
//! {"event_type": "tick_size_change", "asset_id": "...", "market": "0x...", "old_tick_size": "0.01", "new_tick_size": "0.001"}
//! {"event_type": "last_trade_price", "asset_id": "...", "market": "0x...", "price": "0.5", "size": "10", "side": "BUY", "fee_rate_bps": "0", "timestamp": "..."}
//! {"event_type": "best_bid_ask", "market": "0x...", "asset_id": "...", "best_bid": "0.49", "best_ask": "0.51", "spread": "0.02", "timestamp": "..."}
//! ```
//!
//! Right after subscribing the server sends a JSON array of `book` objects,
//! one per subscribed token.
//!
//! Price-change payloads also appear in a compact form
//! (`m`/`pc`/`t` and `a`/`p`/`s`/`si`/`h`/`bb`/`ba`); both spellings decode.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Tagged, Unrecognized};
use crate::domain::integrity::{OrderBookSnapshot, TickSize};
use crate::domain::wire::{ConditionId, Side, timestamp};

// =============================================================================
// Payloads (shared with the LiveData `clob_market` topic)
// =============================================================================

/// One entry of a price-change batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChange {
    /// Token the level belongs to
    #[serde(rename = "asset_id", alias = "a")]
    pub token_id: String,

    /// Level price
    #[serde(alias = "p")]
    pub price: Decimal,

    /// New aggregate size at the level
    #[serde(alias = "s")]
    pub size: Decimal,

    /// Book side of the level
    #[serde(alias = "si")]
    pub side: Side,

    /// Book hash after the change
    #[serde(alias = "h")]
    pub hash: String,

    /// Best bid after the change
    #[serde(alias = "bb")]
    pub best_bid: Decimal,

    /// Best ask after the change
    #[serde(alias = "ba")]
    pub best_ask: Decimal,
}

/// A batch of level updates for one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChanges {
    /// Market condition id
    #[serde(rename = "market", alias = "m")]
    pub condition_id: ConditionId,

    /// Updated levels
    #[serde(rename = "price_changes", alias = "pc")]
    pub changes: Vec<PriceChange>,

    /// Server time of the batch
    #[serde(alias = "t", deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

/// The market moved to a different tick grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSizeChange {
    /// Token id
    #[serde(rename = "asset_id")]
    pub token_id: String,

    /// Market condition id
    #[serde(rename = "market")]
    pub condition_id: ConditionId,

    /// Previous tick size
    pub old_tick_size: TickSize,

    /// New tick size
    pub new_tick_size: TickSize,
}

/// Most recent trade on a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastTradePrice {
    /// Token id
    #[serde(rename = "asset_id")]
    pub token_id: String,

    /// Market condition id
    #[serde(rename = "market")]
    pub condition_id: ConditionId,

    /// Trade price
    pub price: Decimal,

    /// Trade size
    pub size: Decimal,

    /// Taker side
    pub side: Side,

    /// Fee rate in basis points
    pub fee_rate_bps: Decimal,
}

// =============================================================================
// Market-only Payloads
// =============================================================================

/// `tick_size_change` as sent on the Market channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSizeChangeEvent {
    /// The change itself
    #[serde(flatten)]
    pub change: TickSizeChange,

    /// Server time, when sent
    #[serde(
        default,
        deserialize_with = "timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

/// `last_trade_price` as sent on the Market channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastTradePriceEvent {
    /// The trade
    #[serde(flatten)]
    pub trade: LastTradePrice,

    /// Server time of the trade
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

/// Top of book for one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestBidAsk {
    /// Market condition id
    #[serde(rename = "market")]
    pub condition_id: ConditionId,

    /// Token id
    #[serde(rename = "asset_id")]
    pub token_id: String,

    /// Best bid
    pub best_bid: Decimal,

    /// Best ask
    pub best_ask: Decimal,

    /// Ask minus bid
    pub spread: Decimal,

    /// Server time
    #[serde(alias = "t", deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

/// Headline of the event a resolved market belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMessage {
    /// Event id
    pub id: String,
    /// Event ticker
    pub ticker: String,
    /// URL slug
    pub slug: String,
    /// Event title
    pub title: String,
    /// Event description
    pub description: String,
}

/// A market settled on a winning outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketResolved {
    /// Venue market id
    #[serde(rename = "id")]
    pub market_id: String,

    /// Market condition id
    #[serde(rename = "market")]
    pub condition_id: ConditionId,

    /// Market question
    pub question: String,

    /// URL slug
    pub slug: String,

    /// Market description
    pub description: String,

    /// Outcome token ids
    #[serde(rename = "assets_ids", alias = "token_ids")]
    pub token_ids: Vec<String>,

    /// Outcome labels, parallel to `token_ids`
    pub outcomes: Vec<String>,

    /// Token id of the winning outcome
    pub winning_asset_id: String,

    /// Label of the winning outcome
    pub winning_outcome: String,

    /// Parent event
    pub event_message: EventMessage,

    /// Resolution time
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Market Event
// =============================================================================

/// Market channel event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketEvent {
    /// `book`: full orderbook snapshot (single object or burst element)
    OrderBookSummary(Tagged<OrderBookSnapshot>),
    /// `price_change`
    PriceChanges(Tagged<PriceChanges>),
    /// `tick_size_change`
    TickSizeChange(Tagged<TickSizeChangeEvent>),
    /// `last_trade_price`
    LastTradePrice(Tagged<LastTradePriceEvent>),
    /// `best_bid_ask` (custom feature)
    BestBidAsk(Tagged<BestBidAsk>),
    /// `market_resolved` (custom feature)
    MarketResolved(Tagged<MarketResolved>),
    /// Any other `event_type`
    Unrecognized(Unrecognized),
}

impl MarketEvent {
    /// The `event_type` this event was decoded from.
    #[must_use]
    pub fn discriminant(&self) -> &str {
        match self {
            Self::OrderBookSummary(e) => &e.event_type,
            Self::PriceChanges(e) => &e.event_type,
            Self::TickSizeChange(e) => &e.event_type,
            Self::LastTradePrice(e) => &e.event_type,
            Self::BestBidAsk(e) => &e.event_type,
            Self::MarketResolved(e) => &e.event_type,
            Self::Unrecognized(e) => &e.discriminant,
        }
    }

    /// Condition id of the market the event refers to, if known.
    #[must_use]
    pub const fn condition_id(&self) -> Option<&ConditionId> {
        match self {
            Self::OrderBookSummary(e) => Some(&e.payload.condition_id),
            Self::PriceChanges(e) => Some(&e.payload.condition_id),
            Self::TickSizeChange(e) => Some(&e.payload.change.condition_id),
            Self::LastTradePrice(e) => Some(&e.payload.trade.condition_id),
            Self::BestBidAsk(e) => Some(&e.payload.condition_id),
            Self::MarketResolved(e) => Some(&e.payload.condition_id),
            Self::Unrecognized(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const ZERO: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

    #[test]
    fn compact_price_change_aliases() {
        let raw = serde_json::json!({
            "m": ZERO,
            "pc": [{"a": "A", "p": "0.5", "s": "100", "si": "SELL", "h": "abc", "bb": "0.49", "ba": "0.5"}],
            "t": "1757908892351"
        });
        let changes: PriceChanges = serde_json::from_value(raw).unwrap();
        assert_eq!(changes.condition_id.as_str(), ZERO);
        assert_eq!(changes.changes.len(), 1);
        let change = &changes.changes[0];
        assert_eq!(change.token_id, "A");
        assert_eq!(change.side, Side::Sell);
        assert_eq!(change.best_ask, Decimal::from_str("0.5").unwrap());
        assert_eq!(changes.timestamp.timestamp_millis(), 1_757_908_892_351);
    }

    #[test]
    fn float_prices_keep_exact_value() {
        let raw = serde_json::json!({
            "asset_id": "A",
            "market": ZERO,
            "price": 0.1,
            "size": 12.5,
            "side": "BUY",
            "fee_rate_bps": 0
        });
        let trade: LastTradePrice = serde_json::from_value(raw).unwrap();
        assert_eq!(trade.price, Decimal::from_str("0.1").unwrap());
        assert_eq!(trade.size.to_string(), "12.5");
    }

    #[test]
    fn tick_size_change_without_timestamp() {
        let raw = serde_json::json!({
            "event_type": "tick_size_change",
            "asset_id": "A",
            "market": ZERO,
            "old_tick_size": "0.01",
            "new_tick_size": "0.001"
        });
        let event: Tagged<TickSizeChangeEvent> = serde_json::from_value(raw).unwrap();
        assert_eq!(event.event_type, "tick_size_change");
        assert_eq!(event.payload.change.new_tick_size, TickSize::Thousandth);
        assert!(event.payload.timestamp.is_none());
    }
}
