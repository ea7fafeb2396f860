//! Event Decoding Integration Tests
//!
//! One literal frame per known discriminant on every channel, plus the
//! Market initial burst and unknown discriminants.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Value, json};
use test_case::test_case;

use polymarket_stream::domain::events::live_data::RfqState;
use polymarket_stream::domain::events::user::{OrderEventKind, OrderStatus, TradeStatus};
use polymarket_stream::domain::wire::Side;
use polymarket_stream::{
    ChannelKind, DecodeError, EventDecoder, LiveDataEvent, MarketEvent, StreamEvent, TickSize,
    UserEvent,
};

const ZERO: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";
const CONDITION: &str = "0xbd31dc8a20211944f6b70f31557f1001557b59905b7738480ca09bd4532f84af";
const MAKER: &str = "0x1234567890abcdef1234567890abcdef12345678";

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn decode_one(channel: ChannelKind, frame: Value) -> StreamEvent {
    let mut results = EventDecoder::new().decode(channel, frame);
    assert_eq!(results.len(), 1, "expected exactly one outcome");
    results.remove(0).unwrap()
}

fn market(frame: Value) -> MarketEvent {
    match decode_one(ChannelKind::Market, frame) {
        StreamEvent::Market(event) => event,
        other => panic!("expected a market event, got {other:?}"),
    }
}

fn user(frame: Value) -> UserEvent {
    match decode_one(ChannelKind::User, frame) {
        StreamEvent::User(event) => event,
        other => panic!("expected a user event, got {other:?}"),
    }
}

fn live_data(frame: Value) -> LiveDataEvent {
    match decode_one(ChannelKind::LiveData, frame) {
        StreamEvent::LiveData(event) => event,
        other => panic!("expected a live data event, got {other:?}"),
    }
}

fn book(asset_id: &str) -> Value {
    json!({
        "event_type": "book",
        "market": CONDITION,
        "asset_id": asset_id,
        "timestamp": "1757908892351",
        "hash": "0x5c5c0b5d7a1f",
        "bids": [{"price": "0.48", "size": "30"}, {"price": "0.47", "size": "120.5"}],
        "asks": [{"price": "0.52", "size": "25"}],
        "tick_size": "0.01",
        "min_order_size": "5",
        "neg_risk": false
    })
}

fn order_payload() -> Value {
    json!({
        "id": "0xff354cd7ca7539dfa9c28d90943ab5779a4eac34b9b37a757d7b32bdfb11790b",
        "asset_id": "52114319501245915516055106046884209969926127482827954674443846427813813222426",
        "market": CONDITION,
        "associated_trades": null,
        "maker_address": MAKER,
        "owner": "9180014b-33c8-9240-a14b-bdca11c0a465",
        "price": "0.57",
        "side": "SELL",
        "size_matched": "4",
        "original_size": "10",
        "outcome": "YES",
        "order_type": "GTC",
        "created_at": "1672290687",
        "expiration": "0",
        "timestamp": "1672290687",
        "type": "UPDATE",
        "status": "LIVE"
    })
}

fn trade_payload() -> Value {
    json!({
        "id": "28c4d2eb-bbea-40e7-a9f0-b2fdb56b2c2e",
        "asset_id": "52114319501245915516055106046884209969926127482827954674443846427813813222426",
        "market": CONDITION,
        "taker_order_id": "0x06bc63e346ed4ceddce9efd6b3af37c8f8f440c92fe7da6b2d0f9e4ccbc50c42",
        "maker_orders": [{
            "order_id": "0xff354cd7ca7539dfa9c28d90943ab5779a4eac34b9b37a757d7b32bdfb11790b",
            "owner": "9180014b-33c8-9240-a14b-bdca11c0a465",
            "matched_amount": "10",
            "price": "0.57",
            "asset_id": "52114319501245915516055106046884209969926127482827954674443846427813813222426",
            "outcome": "YES"
        }],
        "owner": "9180014b-33c8-9240-a14b-bdca11c0a465",
        "trade_owner": "a1b2c3d4-0000-0000-0000-000000000000",
        "price": "0.57",
        "size": "10",
        "side": "BUY",
        "outcome": "YES",
        "last_update": "1672290701",
        "matchtime": "1672290701",
        "timestamp": "1672290701",
        "type": "TRADE",
        "status": "MATCHED"
    })
}

fn envelope(topic: &str, kind: &str, payload: Value) -> Value {
    json!({
        "topic": topic,
        "type": kind,
        "timestamp": 1_753_314_064_237_i64,
        "connection_id": "Nv1Qwc0PIAMCJ8g=",
        "payload": payload
    })
}

// =============================================================================
// Market
// =============================================================================

#[test]
fn market_book() {
    let MarketEvent::OrderBookSummary(event) = market(book("A")) else {
        panic!("expected book");
    };
    assert_eq!(event.event_type, "book");
    let snapshot = &event.payload;
    assert_eq!(snapshot.condition_id.as_str(), CONDITION);
    assert_eq!(snapshot.token_id, "A");
    assert_eq!(snapshot.timestamp.as_deref(), Some("1757908892351"));
    assert_eq!(snapshot.bids.len(), 2);
    assert_eq!(snapshot.bids[1].size, dec("120.5"));
    assert_eq!(snapshot.tick_size, Some(TickSize::Hundredth));
}

#[test]
fn market_price_change() {
    let event = market(json!({
        "event_type": "price_change",
        "market": CONDITION,
        "price_changes": [{
            "asset_id": "A",
            "price": "0.5",
            "size": "200",
            "side": "BUY",
            "hash": "56621a121a47ed9333273e21c83b660cff37ae50",
            "best_bid": "0.5",
            "best_ask": "1"
        }],
        "timestamp": "1757908892351"
    }));
    let MarketEvent::PriceChanges(event) = event else {
        panic!("expected price_change");
    };
    let change = &event.payload.changes[0];
    assert_eq!(change.token_id, "A");
    assert_eq!(change.side, Side::Buy);
    assert_eq!(change.best_ask, dec("1"));
}

#[test]
fn market_tick_size_change() {
    let event = market(json!({
        "event_type": "tick_size_change",
        "asset_id": "A",
        "market": ZERO,
        "old_tick_size": "0.01",
        "new_tick_size": "0.001"
    }));
    let MarketEvent::TickSizeChange(event) = event else {
        panic!("expected tick_size_change");
    };
    assert_eq!(event.event_type, "tick_size_change");
    assert_eq!(event.payload.change.token_id, "A");
    assert_eq!(event.payload.change.condition_id.as_str(), ZERO);
    assert_eq!(event.payload.change.old_tick_size, TickSize::Hundredth);
    assert_eq!(event.payload.change.new_tick_size, TickSize::Thousandth);
}

#[test]
fn market_last_trade_price() {
    let event = market(json!({
        "event_type": "last_trade_price",
        "asset_id": "A",
        "market": CONDITION,
        "price": "0.456",
        "size": "219.217767",
        "side": "BUY",
        "fee_rate_bps": "0",
        "timestamp": "1750428146322"
    }));
    let MarketEvent::LastTradePrice(event) = event else {
        panic!("expected last_trade_price");
    };
    assert_eq!(event.payload.trade.price, dec("0.456"));
    assert_eq!(event.payload.timestamp.timestamp_millis(), 1_750_428_146_322);
}

#[test]
fn market_best_bid_ask() {
    let event = market(json!({
        "event_type": "best_bid_ask",
        "market": CONDITION,
        "asset_id": "A",
        "best_bid": "0.73",
        "best_ask": "0.77",
        "spread": "0.04",
        "timestamp": "1766789469958"
    }));
    let MarketEvent::BestBidAsk(event) = event else {
        panic!("expected best_bid_ask");
    };
    assert_eq!(event.payload.spread, dec("0.04"));
}

#[test]
fn market_resolved() {
    let event = market(json!({
        "event_type": "market_resolved",
        "id": "1031769",
        "market": CONDITION,
        "question": "Will it rain?",
        "slug": "will-it-rain",
        "description": "Resolves YES if it rains.",
        "assets_ids": ["A", "B"],
        "outcomes": ["Yes", "No"],
        "winning_asset_id": "A",
        "winning_outcome": "Yes",
        "event_message": {
            "id": "125819",
            "ticker": "rain",
            "slug": "rain",
            "title": "Rain",
            "description": "Weather"
        },
        "timestamp": "1766790415550"
    }));
    let MarketEvent::MarketResolved(event) = event else {
        panic!("expected market_resolved");
    };
    assert_eq!(event.payload.token_ids, vec!["A", "B"]);
    assert_eq!(event.payload.winning_outcome, "Yes");
    assert_eq!(event.payload.event_message.ticker, "rain");
}

#[test]
fn market_unknown_discriminant_keeps_raw_frame() {
    let frame = json!({"event_type": "new_market", "market": CONDITION});
    let MarketEvent::Unrecognized(event) = market(frame.clone()) else {
        panic!("expected unrecognized");
    };
    assert_eq!(event.discriminant, "new_market");
    assert_eq!(event.raw, frame);
}

#[test]
fn market_burst_with_one_malformed_book() {
    let mut malformed = book("B");
    malformed["bids"] = json!([{"price": "not a number", "size": "1"}]);
    let frame = json!([book("A"), malformed, book("C")]);

    let results = EventDecoder::new().decode(ChannelKind::Market, frame);
    assert_eq!(results.len(), 3);

    let tokens: Vec<String> = results
        .iter()
        .filter_map(|r| match r {
            Ok(StreamEvent::Market(MarketEvent::OrderBookSummary(b))) => {
                Some(b.payload.token_id.clone())
            }
            _ => None,
        })
        .collect();
    assert_eq!(tokens, vec!["A", "C"]);

    let errors: Vec<&DecodeError> = results.iter().filter_map(|r| r.as_ref().err()).collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], DecodeError::Schema { .. }));
    assert_eq!(errors[0].discriminant(), Some("book"));
    assert_eq!(errors[0].raw()["asset_id"], "B");
}

#[test]
fn market_empty_burst_yields_nothing() {
    assert!(EventDecoder::new().decode(ChannelKind::Market, json!([])).is_empty());
}

// =============================================================================
// User
// =============================================================================

#[test]
fn user_order() {
    let mut frame = order_payload();
    frame["event_type"] = json!("order");
    let UserEvent::Order(event) = user(frame) else {
        panic!("expected order");
    };
    let order = &event.payload;
    assert_eq!(order.kind, OrderEventKind::Update);
    assert_eq!(order.status, OrderStatus::Live);
    assert_eq!(order.remaining_size(), Some(dec("6")));
    assert_eq!(order.maker_address.as_str(), MAKER);
    assert!(order.expiration.is_none());
}

#[test]
fn user_trade() {
    let mut frame = trade_payload();
    frame["event_type"] = json!("trade");
    let UserEvent::Trade(event) = user(frame) else {
        panic!("expected trade");
    };
    let trade = &event.payload;
    assert_eq!(trade.status, TradeStatus::Matched);
    assert_eq!(trade.maker_orders.len(), 1);
    assert_eq!(trade.maker_orders[0].matched_amount, dec("10"));
    assert_eq!(trade.event_owner(), "9180014b-33c8-9240-a14b-bdca11c0a465");
    assert_eq!(
        trade.resolved_trade_owner(),
        "a1b2c3d4-0000-0000-0000-000000000000"
    );
}

#[test]
fn user_unknown_discriminant() {
    let UserEvent::Unrecognized(event) = user(json!({"event_type": "balance"})) else {
        panic!("expected unrecognized");
    };
    assert_eq!(event.discriminant, "balance");
}

#[test]
fn user_frame_without_discriminant_fails() {
    let results = EventDecoder::new().decode(ChannelKind::User, order_payload());
    assert!(matches!(
        results.as_slice(),
        [Err(DecodeError::MissingDiscriminant { field: "event_type", .. })]
    ));
}

// =============================================================================
// LiveData
// =============================================================================

fn variant(event: &LiveDataEvent) -> &'static str {
    match event {
        LiveDataEvent::ActivityTrade(_) => "activity_trade",
        LiveDataEvent::Comment(_) => "comment",
        LiveDataEvent::Reaction(_) => "reaction",
        LiveDataEvent::Request(_) => "request",
        LiveDataEvent::Quote(_) => "quote",
        LiveDataEvent::CryptoPriceSubscribe(_) => "crypto_subscribe",
        LiveDataEvent::CryptoPriceUpdate(_) => "crypto_update",
        LiveDataEvent::AggOrderBookSummary(_) => "agg_orderbook",
        LiveDataEvent::PriceChanges(_) => "price_changes",
        LiveDataEvent::LastTradePrice(_) => "last_trade_price",
        LiveDataEvent::TickSizeChange(_) => "tick_size_change",
        LiveDataEvent::ClobMarketStatus(_) => "clob_market",
        LiveDataEvent::Order(_) => "order",
        LiveDataEvent::Trade(_) => "trade",
        LiveDataEvent::ServerError(_) => "server_error",
        LiveDataEvent::Unrecognized(_) => "unrecognized",
    }
}

fn activity_trade() -> Value {
    json!({
        "asset": "A",
        "conditionId": CONDITION,
        "eventSlug": "rain",
        "outcome": "Yes",
        "outcomeIndex": 0,
        "price": 0.63,
        "side": "BUY",
        "size": 12.5,
        "slug": "will-it-rain",
        "timestamp": 1_753_314_064,
        "title": "Will it rain?",
        "transactionHash": "0xdeadbeef",
        "proxyWallet": "0xabc"
    })
}

fn comment() -> Value {
    json!({
        "id": "1763355",
        "body": "gm",
        "parentEntityType": "Event",
        "parentEntityID": 18_396,
        "userAddress": "0xabc"
    })
}

fn reaction() -> Value {
    json!({
        "id": 42,
        "commentID": 1_763_355,
        "reactionType": "HEART",
        "userAddress": "0xabc"
    })
}

fn rfq_request() -> Value {
    json!({
        "requestId": "r-1",
        "proxyAddress": "0xproxy",
        "userAddress": "0xuser",
        "market": CONDITION,
        "token": "A",
        "complement": "B",
        "state": "STATE_ACCEPTING_QUOTES",
        "side": "BUY",
        "price": 0.5,
        "sizeIn": 100,
        "sizeOut": 50,
        "expiry": 1_753_314_664
    })
}

fn rfq_quote() -> Value {
    json!({
        "quoteId": "q-1",
        "requestId": "r-1",
        "proxyAddress": "0xproxy",
        "userAddress": "0xmaker",
        "condition": CONDITION,
        "token": "A",
        "complement": "B",
        "state": "STATE_ACCEPTING_QUOTES",
        "side": "SELL",
        "sizeIn": "50",
        "sizeOut": "100"
    })
}

fn clob_book() -> Value {
    let mut payload = book("A");
    payload.as_object_mut().unwrap().remove("event_type");
    payload
}

fn clob_price_change() -> Value {
    json!({
        "m": CONDITION,
        "pc": [{"a": "A", "p": "0.5", "s": "100", "si": "SELL", "h": "abc", "bb": "0.49", "ba": "0.5"}],
        "t": "1757908892351"
    })
}

fn clob_last_trade() -> Value {
    json!({
        "asset_id": "A",
        "market": CONDITION,
        "price": "0.5",
        "size": "10",
        "side": "SELL",
        "fee_rate_bps": "0"
    })
}

fn clob_tick_size() -> Value {
    json!({
        "asset_id": "A",
        "market": CONDITION,
        "old_tick_size": 0.01,
        "new_tick_size": 0.001
    })
}

fn clob_market() -> Value {
    json!({
        "asset_ids": ["A", "B"],
        "market": CONDITION,
        "min_order_size": "5",
        "tick_size": "0.01",
        "neg_risk": false
    })
}

#[test_case("activity", "trades", activity_trade(), "activity_trade" ; "activity trades")]
#[test_case("activity", "orders_matched", activity_trade(), "activity_trade" ; "activity orders matched")]
#[test_case("comments", "comment_created", comment(), "comment" ; "comment created")]
#[test_case("comments", "comment_removed", comment(), "comment" ; "comment removed")]
#[test_case("comments", "reaction_created", reaction(), "reaction" ; "reaction created")]
#[test_case("rfq", "request_created", rfq_request(), "request" ; "request created")]
#[test_case("rfq", "request_expired", rfq_request(), "request" ; "request expired")]
#[test_case("rfq", "quote_created", rfq_quote(), "quote" ; "quote created")]
#[test_case("rfq", "quote_canceled", rfq_quote(), "quote" ; "quote canceled")]
#[test_case("crypto_prices", "subscribe", json!({"symbol": "btcusdt", "data": [{"timestamp": 1_753_314_064_237_i64, "value": 67234.5}]}), "crypto_subscribe" ; "crypto subscribe")]
#[test_case("crypto_prices", "update", json!({"symbol": "btcusdt", "timestamp": 1_753_314_064_237_i64, "value": 67234.5, "full_accuracy_value": "67234.50000000"}), "crypto_update" ; "crypto update")]
#[test_case("clob_market", "agg_orderbook", clob_book(), "agg_orderbook" ; "agg orderbook")]
#[test_case("clob_market", "price_change", clob_price_change(), "price_changes" ; "clob price change")]
#[test_case("clob_market", "last_trade_price", clob_last_trade(), "last_trade_price" ; "clob last trade")]
#[test_case("clob_market", "tick_size_change", clob_tick_size(), "tick_size_change" ; "clob tick size")]
#[test_case("clob_market", "market_created", clob_market(), "clob_market" ; "market created")]
#[test_case("clob_market", "market_resolved", clob_market(), "clob_market" ; "clob market resolved")]
#[test_case("clob_user", "order", order_payload(), "order" ; "clob user order")]
#[test_case("clob_user", "trade", trade_payload(), "trade" ; "clob user trade")]
#[test_case("activity", "new_kind", json!({"anything": true}), "unrecognized" ; "unknown type")]
fn live_data_dispatch(topic: &str, kind: &str, payload: Value, expected: &str) {
    let event = live_data(envelope(topic, kind, payload));
    assert_eq!(variant(&event), expected);
    assert_eq!(event.discriminant(), kind);
    assert_eq!(event.topic(), Some(topic));
}

#[test]
fn live_data_activity_fields() {
    let LiveDataEvent::ActivityTrade(message) =
        live_data(envelope("activity", "trades", activity_trade()))
    else {
        panic!("expected activity trade");
    };
    assert_eq!(message.connection_id.as_deref(), Some("Nv1Qwc0PIAMCJ8g="));
    assert_eq!(message.payload.token_id, "A");
    assert_eq!(message.payload.price, dec("0.63"));
    assert_eq!(message.payload.size, dec("12.5"));
    assert!(message.payload.name.is_empty());
}

#[test]
fn live_data_rfq_fields() {
    let LiveDataEvent::Request(message) =
        live_data(envelope("rfq", "request_created", rfq_request()))
    else {
        panic!("expected rfq request");
    };
    assert_eq!(message.payload.state, RfqState::StateAcceptingQuotes);
    assert_eq!(message.payload.complement_token_id, "B");
    assert!(message.payload.expiry.is_some());
}

#[test]
fn live_data_malformed_payload_is_schema_error() {
    let results = EventDecoder::new().decode(
        ChannelKind::LiveData,
        envelope("crypto_prices", "update", json!({"symbol": "btcusdt"})),
    );
    let [Err(err)] = results.as_slice() else {
        panic!("expected one error, got {results:?}");
    };
    assert!(matches!(err, DecodeError::Schema { .. }));
    assert_eq!(err.discriminant(), Some("update"));
    assert_eq!(err.channel(), ChannelKind::LiveData);
}

#[test]
fn live_data_error_frame_is_server_error() {
    let event = live_data(json!({
        "message": "invalid subscription",
        "connectionId": "Nv1Qwc0PIAMCJ8g=",
        "requestId": "5c4e1d2a"
    }));
    assert_eq!(variant(&event), "server_error");
    assert_eq!(event.discriminant(), "error");
    assert_eq!(event.topic(), None);
    let LiveDataEvent::ServerError(error) = event else {
        unreachable!();
    };
    assert_eq!(error.message, "invalid subscription");
    assert_eq!(error.request_id.as_deref(), Some("5c4e1d2a"));
}

#[test]
fn live_data_frame_without_type_or_message_is_missing_discriminant() {
    let results = EventDecoder::new().decode(ChannelKind::LiveData, json!({"topic": "activity"}));
    assert!(matches!(
        results.as_slice(),
        [Err(DecodeError::MissingDiscriminant { .. })]
    ));
}

#[test]
fn live_data_extreme_timestamp_is_schema_error() {
    let mut frame = envelope(
        "crypto_prices",
        "update",
        json!({"symbol": "btcusdt", "timestamp": 1_753_314_064_237_i64, "value": 67234.5}),
    );
    frame["timestamp"] = json!("-9223372036854775808");
    let results = EventDecoder::new().decode(ChannelKind::LiveData, frame);
    assert!(matches!(
        results.as_slice(),
        [Err(DecodeError::Schema { .. })]
    ));
}
