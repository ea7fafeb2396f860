//! Channel Subscriptions and Handshakes
//!
//! Each channel is subscribed by sending exactly one text frame right after
//! the socket opens. The frame is a pure function of the subscription and
//! the credentials, so it is built once and re-sent after every reconnect.
//!
//! # Handshake Frames (JSON)
//!
//! ```json
//! // Market
//! {"assets_ids": ["7132...", "1042..."], "custom_feature_enabled": false}
//!
//! // User
//! {"auth": {"apiKey": "...", "secret": "...", "passphrase": "..."}}
//!
//! // LiveData
//! {"action": "subscribe", "subscriptions": [
//!   {"topic": "activity", "type": "trades"},
//!   {"topic": "clob_user", "type": "*", "clob_auth": {"key": "...", "secret": "...", "passphrase": "..."}}
//! ]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::auth::{ClobAuth, Credentials, UserAuth};
use crate::domain::events::ChannelKind;

// =============================================================================
// Endpoints
// =============================================================================

/// Default Market channel endpoint.
pub const MARKET_WS_URL: &str = "wss://ws-subscriptions-clob.polymarket.com/ws/market";

/// Default User channel endpoint.
pub const USER_WS_URL: &str = "wss://ws-subscriptions-clob.polymarket.com/ws/user";

/// Default LiveData channel endpoint.
pub const LIVE_DATA_WS_URL: &str = "wss://ws-live-data.polymarket.com";

/// LiveData topic whose entries need `clob_auth`.
pub const CLOB_USER_TOPIC: &str = "clob_user";

/// WebSocket URL per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Market channel URL
    pub market: String,
    /// User channel URL
    pub user: String,
    /// LiveData channel URL
    pub live_data: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            market: MARKET_WS_URL.to_string(),
            user: USER_WS_URL.to_string(),
            live_data: LIVE_DATA_WS_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// URL for `channel`.
    #[must_use]
    pub fn url(&self, channel: ChannelKind) -> &str {
        match channel {
            ChannelKind::Market => &self.market,
            ChannelKind::User => &self.user,
            ChannelKind::LiveData => &self.live_data,
        }
    }
}

// =============================================================================
// Subscriptions
// =============================================================================

/// One LiveData subscription entry.
///
/// Fields other than `topic`, `type` and `filters` are passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveDataSubscription {
    /// Topic, e.g. `activity`, `crypto_prices`, `clob_market`
    pub topic: String,

    /// Message type within the topic; `*` for all
    #[serde(rename = "type")]
    pub kind: String,

    /// Topic-specific filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Value>,

    /// Any other fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LiveDataSubscription {
    /// Entry for `topic` / `kind` with no filter.
    #[must_use]
    pub fn new(topic: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            kind: kind.into(),
            filters: None,
            extra: Map::new(),
        }
    }

    /// Attach a filter.
    #[must_use]
    pub fn with_filters(mut self, filters: Value) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Whether this entry needs credentials.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.topic == CLOB_USER_TOPIC
    }
}

/// Subscription parameters for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscription {
    /// Orderbook feed for a set of tokens
    Market {
        /// Token ids to subscribe to
        token_ids: Vec<String>,
        /// Also receive `best_bid_ask` and `market_resolved`
        custom_feature_enabled: bool,
    },
    /// Order and trade feed of the authenticated account
    User,
    /// Topic subscriptions on the live data feed
    LiveData {
        /// Subscription entries, sent in order
        entries: Vec<LiveDataSubscription>,
    },
}

/// The handshake frame could not be built.
#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    /// The subscription needs credentials and none were given.
    #[error("{0} subscription requires credentials")]
    AuthenticationRequired(ChannelKind),

    /// Serializing the frame failed.
    #[error("failed to serialize handshake: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct MarketSubscribeRequest<'a> {
    assets_ids: &'a [String],
    custom_feature_enabled: bool,
}

#[derive(Serialize)]
struct UserAuthRequest<'a> {
    auth: UserAuth<'a>,
}

#[derive(Serialize)]
struct LiveDataEntry<'a> {
    topic: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filters: Option<&'a Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    clob_auth: Option<ClobAuth<'a>>,
}

impl<'a> LiveDataEntry<'a> {
    /// Injected credentials replace any `clob_auth` the entry already had.
    fn new(subscription: &'a LiveDataSubscription, credentials: Option<&'a Credentials>) -> Self {
        let clob_auth = subscription
            .requires_auth()
            .then(|| credentials.map(Credentials::clob_auth))
            .flatten();
        let mut extra = subscription.extra.clone();
        if clob_auth.is_some() {
            extra.remove("clob_auth");
        }
        Self {
            topic: &subscription.topic,
            kind: &subscription.kind,
            filters: subscription.filters.as_ref(),
            extra,
            clob_auth,
        }
    }
}

#[derive(Serialize)]
struct LiveDataSubscribeRequest<'a> {
    action: &'static str,
    subscriptions: Vec<LiveDataEntry<'a>>,
}

impl Subscription {
    /// Market subscription.
    #[must_use]
    pub const fn market(token_ids: Vec<String>, custom_feature_enabled: bool) -> Self {
        Self::Market {
            token_ids,
            custom_feature_enabled,
        }
    }

    /// LiveData subscription.
    #[must_use]
    pub const fn live_data(entries: Vec<LiveDataSubscription>) -> Self {
        Self::LiveData { entries }
    }

    /// Channel this subscription is for.
    #[must_use]
    pub const fn channel(&self) -> ChannelKind {
        match self {
            Self::Market { .. } => ChannelKind::Market,
            Self::User => ChannelKind::User,
            Self::LiveData { .. } => ChannelKind::LiveData,
        }
    }

    /// Whether connecting requires credentials.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        match self {
            Self::Market { .. } => false,
            Self::User => true,
            Self::LiveData { entries } => entries.iter().any(LiveDataSubscription::requires_auth),
        }
    }

    /// Build the handshake frame.
    ///
    /// Credentials are embedded only where the channel needs them: the User
    /// frame and `clob_user` LiveData entries. Other entries pass through
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`HandshakeError::AuthenticationRequired`] if credentials are
    /// needed but missing.
    pub fn handshake(&self, credentials: Option<&Credentials>) -> Result<String, HandshakeError> {
        if self.requires_auth() && credentials.is_none() {
            return Err(HandshakeError::AuthenticationRequired(self.channel()));
        }

        let frame = match self {
            Self::Market {
                token_ids,
                custom_feature_enabled,
            } => serde_json::to_string(&MarketSubscribeRequest {
                assets_ids: token_ids,
                custom_feature_enabled: *custom_feature_enabled,
            })?,
            Self::User => {
                let credentials =
                    credentials.ok_or(HandshakeError::AuthenticationRequired(ChannelKind::User))?;
                serde_json::to_string(&UserAuthRequest {
                    auth: credentials.user_auth(),
                })?
            }
            Self::LiveData { entries } => {
                let subscriptions = entries
                    .iter()
                    .map(|subscription| LiveDataEntry::new(subscription, credentials))
                    .collect();
                serde_json::to_string(&LiveDataSubscribeRequest {
                    action: "subscribe",
                    subscriptions,
                })?
            }
        };

        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("key".into(), "secret".into(), "pass".into())
    }

    fn parse(frame: &str) -> Value {
        serde_json::from_str(frame).unwrap()
    }

    #[test]
    fn market_handshake() {
        let sub = Subscription::market(vec!["A".into(), "B".into()], true);
        let frame = parse(&sub.handshake(None).unwrap());
        assert_eq!(
            frame,
            serde_json::json!({"assets_ids": ["A", "B"], "custom_feature_enabled": true})
        );
        assert!(!sub.requires_auth());
    }

    #[test]
    fn user_handshake_embeds_aliased_credentials() {
        let frame = parse(&Subscription::User.handshake(Some(&creds())).unwrap());
        assert_eq!(
            frame,
            serde_json::json!({"auth": {"apiKey": "key", "secret": "secret", "passphrase": "pass"}})
        );
    }

    #[test]
    fn user_requires_credentials() {
        assert!(Subscription::User.requires_auth());
        assert!(matches!(
            Subscription::User.handshake(None),
            Err(HandshakeError::AuthenticationRequired(ChannelKind::User))
        ));
    }

    #[test]
    fn live_data_injects_auth_only_into_clob_user() {
        let sub = Subscription::live_data(vec![
            LiveDataSubscription::new("activity", "trades"),
            LiveDataSubscription::new(CLOB_USER_TOPIC, "*"),
        ]);
        assert!(sub.requires_auth());

        let frame = parse(&sub.handshake(Some(&creds())).unwrap());
        assert_eq!(frame["action"], "subscribe");
        let entries = frame["subscriptions"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0],
            serde_json::json!({"topic": "activity", "type": "trades"})
        );
        assert_eq!(
            entries[1]["clob_auth"],
            serde_json::json!({"key": "key", "secret": "secret", "passphrase": "pass"})
        );
    }

    #[test]
    fn live_data_without_clob_user_needs_no_credentials() {
        let sub = Subscription::live_data(vec![
            LiveDataSubscription::new("crypto_prices", "update")
                .with_filters(serde_json::json!("{\"symbol\":\"btcusdt\"}")),
        ]);
        assert!(!sub.requires_auth());
        let frame = parse(&sub.handshake(None).unwrap());
        assert_eq!(frame["subscriptions"][0]["filters"], "{\"symbol\":\"btcusdt\"}");
        assert!(frame["subscriptions"][0].get("clob_auth").is_none());
    }

    #[test]
    fn live_data_clob_user_without_credentials_fails() {
        let sub = Subscription::live_data(vec![LiveDataSubscription::new(CLOB_USER_TOPIC, "*")]);
        assert!(matches!(
            sub.handshake(None),
            Err(HandshakeError::AuthenticationRequired(ChannelKind::LiveData))
        ));
    }

    #[test]
    fn live_data_credentials_replace_existing_clob_auth() {
        let entry: LiveDataSubscription = serde_json::from_value(serde_json::json!({
            "topic": CLOB_USER_TOPIC,
            "type": "*",
            "clob_auth": {"key": "stale"}
        }))
        .unwrap();
        let frame = Subscription::live_data(vec![entry])
            .handshake(Some(&creds()))
            .unwrap();

        assert_eq!(frame.matches("\"clob_auth\"").count(), 1);
        assert!(!frame.contains("stale"));
        assert_eq!(
            parse(&frame)["subscriptions"][0]["clob_auth"],
            serde_json::json!({"key": "key", "secret": "secret", "passphrase": "pass"})
        );
    }

    #[test]
    fn existing_clob_auth_on_other_topics_passes_through() {
        let entry: LiveDataSubscription = serde_json::from_value(serde_json::json!({
            "topic": "activity",
            "type": "trades",
            "clob_auth": {"key": "own"}
        }))
        .unwrap();
        let frame = Subscription::live_data(vec![entry])
            .handshake(Some(&creds()))
            .unwrap();
        assert_eq!(frame.matches("\"clob_auth\"").count(), 1);
        assert_eq!(parse(&frame)["subscriptions"][0]["clob_auth"]["key"], "own");
    }

    #[test]
    fn live_data_entries_pass_through_extra_fields() {
        let entry: LiveDataSubscription = serde_json::from_value(serde_json::json!({
            "topic": "comments",
            "type": "*",
            "gamma_auth": {"address": "0xabc"}
        }))
        .unwrap();
        assert_eq!(entry.extra["gamma_auth"]["address"], "0xabc");
        let frame = parse(&Subscription::live_data(vec![entry]).handshake(None).unwrap());
        assert_eq!(frame["subscriptions"][0]["gamma_auth"]["address"], "0xabc");
    }
}
