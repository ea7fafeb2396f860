//! Event Decoder
//!
//! Maps parsed JSON frames to typed [`StreamEvent`]s.
//!
//! Decoding is two-step: read the discriminant field as a string, then
//! deserialize the whole frame into the schema that discriminant selects.
//! A discriminant nobody knows becomes an `Unrecognized` event carrying the
//! raw frame; it is never guessed and never dropped.
//!
//! # Frame Shapes
//!
//! | Channel | Discriminant | Shapes |
//! |---------|--------------|--------|
//! | Market | `event_type` | object, or array of `book` objects (initial burst) |
//! | User | `event_type` | object |
//! | LiveData | `type` | object envelope with `topic` and `payload` |
//!
//! A LiveData frame with a `message` but no `type` is the server reporting an
//! error and decodes to [`LiveDataEvent::ServerError`].
//!
//! Each element of a Market burst decodes on its own: one malformed book
//! yields one error and does not affect its siblings.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::application::error::DecodeError;
use crate::domain::events::live_data::SERVER_ERROR;
use crate::domain::events::{
    ChannelKind, LiveDataEvent, MarketEvent, StreamEvent, Unrecognized, UserEvent,
};

/// Discriminant of every element of a Market burst.
pub const BOOK_EVENT: &str = "book";

/// Outcome of decoding one value.
pub type DecodeResult = Result<StreamEvent, DecodeError>;

/// Stateless frame decoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventDecoder;

impl EventDecoder {
    /// Create a new decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode a parsed frame.
    ///
    /// Returns one outcome per event the frame contains, in frame order:
    /// usually one, one per element for a Market burst, none for an empty
    /// burst.
    #[must_use]
    pub fn decode(&self, channel: ChannelKind, value: Value) -> Vec<DecodeResult> {
        match (channel, value) {
            (ChannelKind::Market, Value::Array(items)) => {
                items.into_iter().map(Self::decode_burst_item).collect()
            }
            (ChannelKind::Market, value @ Value::Object(_)) => vec![Self::decode_market(value)],
            (ChannelKind::User, value @ Value::Object(_)) => vec![Self::decode_user(value)],
            (ChannelKind::LiveData, value @ Value::Object(_)) => {
                vec![Self::decode_live_data(value)]
            }
            (channel, raw) => vec![Err(DecodeError::UnexpectedShape {
                channel,
                expected: if channel == ChannelKind::Market {
                    "object or array"
                } else {
                    "object"
                },
                raw,
            })],
        }
    }

    // =========================================================================
    // Market
    // =========================================================================

    fn decode_burst_item(value: Value) -> DecodeResult {
        let channel = ChannelKind::Market;
        if !value.is_object() {
            return Err(DecodeError::UnexpectedShape {
                channel,
                expected: "object",
                raw: value,
            });
        }

        let discriminant = discriminant(channel, &value)?;
        if discriminant != BOOK_EVENT {
            // A burst only carries books; anything else is a malformed element.
            let source = <serde_json::Error as serde::de::Error>::custom(format!(
                "expected `{BOOK_EVENT}` in burst, got `{discriminant}`"
            ));
            return Err(DecodeError::Schema {
                channel,
                discriminant,
                raw: value,
                source,
            });
        }

        parse(channel, discriminant, value)
            .map(|e| StreamEvent::Market(MarketEvent::OrderBookSummary(e)))
    }

    fn decode_market(value: Value) -> DecodeResult {
        let channel = ChannelKind::Market;
        let discriminant = discriminant(channel, &value)?;

        let event = match discriminant.as_str() {
            BOOK_EVENT => MarketEvent::OrderBookSummary(parse(channel, discriminant, value)?),
            "price_change" => MarketEvent::PriceChanges(parse(channel, discriminant, value)?),
            "tick_size_change" => MarketEvent::TickSizeChange(parse(channel, discriminant, value)?),
            "last_trade_price" => MarketEvent::LastTradePrice(parse(channel, discriminant, value)?),
            "best_bid_ask" => MarketEvent::BestBidAsk(parse(channel, discriminant, value)?),
            "market_resolved" => MarketEvent::MarketResolved(parse(channel, discriminant, value)?),
            _ => MarketEvent::Unrecognized(Unrecognized {
                discriminant,
                raw: value,
            }),
        };

        Ok(StreamEvent::Market(event))
    }

    // =========================================================================
    // User
    // =========================================================================

    fn decode_user(value: Value) -> DecodeResult {
        let channel = ChannelKind::User;
        let discriminant = discriminant(channel, &value)?;

        let event = match discriminant.as_str() {
            "order" => UserEvent::Order(parse(channel, discriminant, value)?),
            "trade" => UserEvent::Trade(parse(channel, discriminant, value)?),
            _ => UserEvent::Unrecognized(Unrecognized {
                discriminant,
                raw: value,
            }),
        };

        Ok(StreamEvent::User(event))
    }

    // =========================================================================
    // LiveData
    // =========================================================================

    fn decode_live_data(value: Value) -> DecodeResult {
        let channel = ChannelKind::LiveData;
        if is_server_error(channel, &value) {
            let error = parse(channel, SERVER_ERROR.to_string(), value)?;
            return Ok(StreamEvent::LiveData(LiveDataEvent::ServerError(error)));
        }
        let discriminant = discriminant(channel, &value)?;

        let event = match discriminant.as_str() {
            "trades" | "orders_matched" => {
                LiveDataEvent::ActivityTrade(parse(channel, discriminant, value)?)
            }
            "comment_created" | "comment_removed" => {
                LiveDataEvent::Comment(parse(channel, discriminant, value)?)
            }
            "reaction_created" | "reaction_removed" => {
                LiveDataEvent::Reaction(parse(channel, discriminant, value)?)
            }
            "request_created" | "request_edited" | "request_canceled" | "request_expired" => {
                LiveDataEvent::Request(parse(channel, discriminant, value)?)
            }
            "quote_created" | "quote_edited" | "quote_canceled" | "quote_expired" => {
                LiveDataEvent::Quote(parse(channel, discriminant, value)?)
            }
            "subscribe" => LiveDataEvent::CryptoPriceSubscribe(parse(channel, discriminant, value)?),
            "update" => LiveDataEvent::CryptoPriceUpdate(parse(channel, discriminant, value)?),
            "agg_orderbook" => {
                LiveDataEvent::AggOrderBookSummary(parse(channel, discriminant, value)?)
            }
            "price_change" => LiveDataEvent::PriceChanges(parse(channel, discriminant, value)?),
            "last_trade_price" => {
                LiveDataEvent::LastTradePrice(parse(channel, discriminant, value)?)
            }
            "tick_size_change" => {
                LiveDataEvent::TickSizeChange(parse(channel, discriminant, value)?)
            }
            "market_created" | "market_resolved" => {
                LiveDataEvent::ClobMarketStatus(parse(channel, discriminant, value)?)
            }
            "order" => LiveDataEvent::Order(parse(channel, discriminant, value)?),
            "trade" => LiveDataEvent::Trade(parse(channel, discriminant, value)?),
            _ => LiveDataEvent::Unrecognized(Unrecognized {
                discriminant,
                raw: value,
            }),
        };

        Ok(StreamEvent::LiveData(event))
    }
}

fn is_server_error(channel: ChannelKind, value: &Value) -> bool {
    value.get(channel.discriminant_field()).is_none()
        && value.get("message").is_some_and(Value::is_string)
}

/// Read the channel's discriminant field as a string.
fn discriminant(channel: ChannelKind, value: &Value) -> Result<String, DecodeError> {
    let field = channel.discriminant_field();
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| DecodeError::MissingDiscriminant {
            channel,
            field,
            raw: value.clone(),
        })
}

/// Deserialize `value` into the schema selected by `discriminant`.
fn parse<T: DeserializeOwned>(
    channel: ChannelKind,
    discriminant: String,
    value: Value,
) -> Result<T, DecodeError> {
    // Deserialize from a borrow so the raw frame survives for the error.
    T::deserialize(&value).map_err(|source| DecodeError::Schema {
        channel,
        discriminant,
        raw: value,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

    fn decode_one(channel: ChannelKind, value: Value) -> DecodeResult {
        let mut out = EventDecoder::new().decode(channel, value);
        assert_eq!(out.len(), 1);
        out.remove(0)
    }

    #[test]
    fn unknown_market_discriminant_is_unrecognized() {
        let raw = serde_json::json!({"event_type": "brand_new", "x": 1});
        let event = decode_one(ChannelKind::Market, raw.clone()).unwrap();
        match event {
            StreamEvent::Market(MarketEvent::Unrecognized(u)) => {
                assert_eq!(u.discriminant, "brand_new");
                assert_eq!(u.raw, raw);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_discriminant_is_an_error() {
        let err = decode_one(ChannelKind::User, serde_json::json!({"id": "1"})).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingDiscriminant {
                field: "event_type",
                ..
            }
        ));

        let err = decode_one(ChannelKind::LiveData, serde_json::json!({"type": 7})).unwrap_err();
        assert!(matches!(err, DecodeError::MissingDiscriminant { field: "type", .. }));
    }

    #[test]
    fn arrays_only_on_market() {
        let err = decode_one(ChannelKind::User, serde_json::json!([])).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedShape { .. }));

        let err = decode_one(ChannelKind::LiveData, serde_json::json!("text")).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedShape { .. }));

        assert!(
            EventDecoder::new()
                .decode(ChannelKind::Market, serde_json::json!([]))
                .is_empty()
        );
    }

    #[test]
    fn schema_failure_keeps_raw_and_discriminant() {
        let raw = serde_json::json!({
            "event_type": "tick_size_change",
            "asset_id": "A",
            "market": ZERO,
            "old_tick_size": "0.05",
            "new_tick_size": "0.001"
        });
        let err = decode_one(ChannelKind::Market, raw.clone()).unwrap_err();
        assert_eq!(err.discriminant(), Some("tick_size_change"));
        assert_eq!(err.raw(), &raw);
    }

    #[test]
    fn burst_element_with_other_discriminant_fails() {
        let raw = serde_json::json!([{"event_type": "price_change", "market": ZERO}]);
        let mut out = EventDecoder::new().decode(ChannelKind::Market, raw);
        let err = out.remove(0).unwrap_err();
        assert_eq!(err.discriminant(), Some("price_change"));
        assert!(err.to_string().contains("expected `book` in burst"));
    }
}
