//! Orderbook Snapshot
//!
//! # Wire Format (JSON)
//!
//! ```json
//! {
//!   "market": "0x...",
//!   "asset_id": "7132...",
//!   "timestamp": "1757908892351",
//!   "hash": "0b8a...",
//!   "bids": [{"price": "0.48", "size": "30"}],
//!   "asks": [{"price": "0.52", "size": "25"}],
//!   "min_order_size": "5",
//!   "neg_risk": false,
//!   "tick_size": "0.01",
//!   "last_trade_price": "0.50"
//! }
//! ```
//!
//! # Hash
//!
//! The server hash is the SHA-1 hex digest of the compact JSON of the book
//! with `hash` set to `""`. Field order is fixed:
//!
//! `market, asset_id, timestamp, bids, asks, min_order_size, neg_risk,
//! tick_size, last_trade_price, hash`
//!
//! Decimals are written as strings with the scale they arrived with, and
//! absent optional fields are left out.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use super::IntegrityError;
use super::rounding::price_valid;
use super::tick_size::TickSize;
use crate::domain::wire::{self, ConditionId};

/// A single price level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Level price
    pub price: Decimal,
    /// Resting size at this price
    pub size: Decimal,
}

/// Full orderbook for one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Market condition id
    #[serde(rename = "market", alias = "condition_id")]
    pub condition_id: ConditionId,

    /// Token (asset) id
    #[serde(rename = "asset_id", alias = "token_id")]
    pub token_id: String,

    /// Server timestamp, kept exactly as received
    #[serde(
        default,
        deserialize_with = "wire::verbatim",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,

    /// Server-computed integrity hash
    #[serde(default)]
    pub hash: String,

    /// Bid levels in wire order
    #[serde(default)]
    pub bids: Vec<PriceLevel>,

    /// Ask levels in wire order
    #[serde(default)]
    pub asks: Vec<PriceLevel>,

    /// Minimum order size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_order_size: Option<Decimal>,

    /// Negative-risk market flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neg_risk: Option<bool>,

    /// Market tick size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_size: Option<TickSize>,

    /// Last traded price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_trade_price: Option<Decimal>,
}

impl OrderBookSnapshot {
    /// Parsed server timestamp, if present and well-formed.
    #[must_use]
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .as_deref()
            .and_then(|raw| wire::parse_timestamp(raw).ok())
    }

    /// Highest bid price.
    #[must_use]
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.iter().max_by(|a, b| a.price.cmp(&b.price))
    }

    /// Lowest ask price.
    #[must_use]
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.iter().min_by(|a, b| a.price.cmp(&b.price))
    }

    /// Levels (bids then asks) whose price is outside `[tick, 1 - tick]`.
    #[must_use]
    pub fn invalid_levels(&self, tick: TickSize) -> Vec<&PriceLevel> {
        self.bids
            .iter()
            .chain(&self.asks)
            .filter(|level| !price_valid(level.price, tick))
            .collect()
    }

    /// Recompute the hash and compare it with the one the server sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the canonical form cannot be serialized.
    pub fn verify_hash(&self) -> Result<bool, IntegrityError> {
        Ok(compute_orderbook_hash(self)? == self.hash)
    }
}

#[derive(Serialize)]
struct CanonicalBook<'a> {
    market: &'a ConditionId,
    asset_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<&'a str>,
    bids: &'a [PriceLevel],
    asks: &'a [PriceLevel],
    #[serde(skip_serializing_if = "Option::is_none")]
    min_order_size: Option<&'a Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    neg_risk: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick_size: Option<TickSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_trade_price: Option<&'a Decimal>,
    hash: &'static str,
}

impl<'a> From<&'a OrderBookSnapshot> for CanonicalBook<'a> {
    fn from(book: &'a OrderBookSnapshot) -> Self {
        Self {
            market: &book.condition_id,
            asset_id: &book.token_id,
            timestamp: book.timestamp.as_deref(),
            bids: &book.bids,
            asks: &book.asks,
            min_order_size: book.min_order_size.as_ref(),
            neg_risk: book.neg_risk,
            tick_size: book.tick_size,
            last_trade_price: book.last_trade_price.as_ref(),
            hash: "",
        }
    }
}

/// SHA-1 hex digest of the canonical form of `book` (hash field blanked).
///
/// The snapshot is only borrowed; its `hash` field is left as it was.
///
/// # Errors
///
/// Returns an error if the canonical form cannot be serialized.
pub fn compute_orderbook_hash(book: &OrderBookSnapshot) -> Result<String, IntegrityError> {
    let canonical = serde_json::to_vec(&CanonicalBook::from(book))?;
    Ok(hex::encode(Sha1::digest(&canonical)))
}
