//! Stream Events
//!
//! Typed event taxonomy for the three channels. Each channel has its own sum
//! type with one variant per event kind plus a mandatory `Unrecognized` arm,
//! so an unknown discriminant is always surfaced to the caller rather than
//! dropped.
//!
//! Every decoded event keeps the discriminant it was decoded from
//! (`event_type` on Market/User frames, `type` on LiveData frames).

pub mod live_data;
pub mod market;
pub mod user;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use live_data::LiveDataEvent;
pub use market::MarketEvent;
pub use user::UserEvent;

// =============================================================================
// Channel
// =============================================================================

/// The subscription channel a frame arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Public orderbook feed for a set of tokens
    Market,
    /// Authenticated order/trade feed for one account
    User,
    /// Topic-based live data feed (activity, comments, RFQ, prices, clob)
    LiveData,
}

impl ChannelKind {
    /// Stable lowercase name, used in logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::User => "user",
            Self::LiveData => "live_data",
        }
    }

    /// Field that carries the discriminant on this channel.
    #[must_use]
    pub const fn discriminant_field(self) -> &'static str {
        match self {
            Self::Market | Self::User => "event_type",
            Self::LiveData => "type",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Shared Envelopes
// =============================================================================

/// A Market/User payload together with the `event_type` it was tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tagged<T> {
    /// Discriminant as received
    pub event_type: String,

    /// Decoded payload
    #[serde(flatten)]
    pub payload: T,
}

/// A frame whose discriminant this client does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unrecognized {
    /// Discriminant as received
    pub discriminant: String,

    /// The complete frame
    pub raw: serde_json::Value,
}

// =============================================================================
// Stream Event
// =============================================================================

/// A decoded event from any channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Market channel event
    Market(MarketEvent),
    /// User channel event
    User(UserEvent),
    /// LiveData channel event
    LiveData(LiveDataEvent),
}

impl StreamEvent {
    /// Channel the event was decoded from.
    #[must_use]
    pub const fn channel(&self) -> ChannelKind {
        match self {
            Self::Market(_) => ChannelKind::Market,
            Self::User(_) => ChannelKind::User,
            Self::LiveData(_) => ChannelKind::LiveData,
        }
    }

    /// Discriminant the event was decoded from.
    #[must_use]
    pub fn discriminant(&self) -> &str {
        match self {
            Self::Market(e) => e.discriminant(),
            Self::User(e) => e.discriminant(),
            Self::LiveData(e) => e.discriminant(),
        }
    }

    /// Whether this is a catch-all `Unrecognized` event.
    #[must_use]
    pub const fn is_unrecognized(&self) -> bool {
        matches!(
            self,
            Self::Market(MarketEvent::Unrecognized(_))
                | Self::User(UserEvent::Unrecognized(_))
                | Self::LiveData(LiveDataEvent::Unrecognized(_))
        )
    }
}

impl From<MarketEvent> for StreamEvent {
    fn from(event: MarketEvent) -> Self {
        Self::Market(event)
    }
}

impl From<UserEvent> for StreamEvent {
    fn from(event: UserEvent) -> Self {
        Self::User(event)
    }
}

impl From<LiveDataEvent> for StreamEvent {
    fn from(event: LiveDataEvent) -> Self {
        Self::LiveData(event)
    }
}
