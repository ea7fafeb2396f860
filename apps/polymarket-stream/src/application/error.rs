//! Stream Errors
//!
//! Non-fatal outcomes reported to an [`ErrorSink`](super::ports::ErrorSink)
//! while a channel keeps running, plus the transport errors that send the
//! supervisor back to reconnecting.

use serde_json::Value;

use crate::domain::events::ChannelKind;

/// Transport failures. All of them are recovered by reconnecting.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Opening the socket failed.
    #[error("connect failed: {0}")]
    Connect(String),

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    Send(String),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    Receive(String),

    /// The server closed the connection or the stream ended.
    #[error("connection closed")]
    Closed,

    /// No frame or pong arrived within the heartbeat timeout.
    #[error("heartbeat timeout")]
    HeartbeatTimeout,
}

/// A frame that was valid JSON but did not decode into an event.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The discriminant matched a known kind but the payload did not fit it.
    #[error("{channel} `{discriminant}` payload failed validation: {source}")]
    Schema {
        /// Channel of the frame
        channel: ChannelKind,
        /// Discriminant that selected the schema
        discriminant: String,
        /// Offending payload
        raw: Value,
        /// Structural error
        #[source]
        source: serde_json::Error,
    },

    /// The frame carried no string discriminant.
    #[error("{channel} frame has no string `{field}` discriminant")]
    MissingDiscriminant {
        /// Channel of the frame
        channel: ChannelKind,
        /// Expected discriminant field
        field: &'static str,
        /// Offending payload
        raw: Value,
    },

    /// The frame was not the JSON shape the channel sends.
    #[error("{channel} frame has unexpected shape, expected {expected}")]
    UnexpectedShape {
        /// Channel of the frame
        channel: ChannelKind,
        /// What the channel sends
        expected: &'static str,
        /// Offending payload
        raw: Value,
    },
}

impl DecodeError {
    /// Channel the failing frame arrived on.
    #[must_use]
    pub const fn channel(&self) -> ChannelKind {
        match self {
            Self::Schema { channel, .. }
            | Self::MissingDiscriminant { channel, .. }
            | Self::UnexpectedShape { channel, .. } => *channel,
        }
    }

    /// Discriminant, when one was present.
    #[must_use]
    pub fn discriminant(&self) -> Option<&str> {
        match self {
            Self::Schema { discriminant, .. } => Some(discriminant),
            Self::MissingDiscriminant { .. } | Self::UnexpectedShape { .. } => None,
        }
    }

    /// The payload that failed to decode.
    #[must_use]
    pub const fn raw(&self) -> &Value {
        match self {
            Self::Schema { raw, .. }
            | Self::MissingDiscriminant { raw, .. }
            | Self::UnexpectedShape { raw, .. } => raw,
        }
    }
}

/// Per-frame failures. None of them stop the channel.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The frame text was not JSON.
    #[error("{channel} frame is not valid JSON: {source}")]
    FrameParse {
        /// Channel of the frame
        channel: ChannelKind,
        /// Frame text as received
        raw: String,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// The frame was JSON but did not decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The caller's handler returned an error.
    #[error("handler failed on {channel} `{discriminant}` event: {source}")]
    Handler {
        /// Channel of the event
        channel: ChannelKind,
        /// Discriminant of the event
        discriminant: String,
        /// Handler error
        #[source]
        source: anyhow::Error,
    },
}

impl StreamError {
    /// Channel the failure belongs to.
    #[must_use]
    pub const fn channel(&self) -> ChannelKind {
        match self {
            Self::FrameParse { channel, .. } | Self::Handler { channel, .. } => *channel,
            Self::Decode(e) => e.channel(),
        }
    }

    /// Short label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FrameParse { .. } => "frame_parse",
            Self::Decode(DecodeError::Schema { .. }) => "schema",
            Self::Decode(DecodeError::MissingDiscriminant { .. }) => "missing_discriminant",
            Self::Decode(DecodeError::UnexpectedShape { .. }) => "unexpected_shape",
            Self::Handler { .. } => "handler",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_accessors() {
        let err = DecodeError::MissingDiscriminant {
            channel: ChannelKind::User,
            field: "event_type",
            raw: serde_json::json!({"foo": 1}),
        };
        assert_eq!(err.channel(), ChannelKind::User);
        assert!(err.discriminant().is_none());
        assert_eq!(err.raw()["foo"], 1);
        assert_eq!(
            err.to_string(),
            "user frame has no string `event_type` discriminant"
        );
    }

    #[test]
    fn stream_error_kind_labels() {
        let source = serde_json::from_str::<Value>("{").unwrap_err();
        let err = StreamError::FrameParse {
            channel: ChannelKind::Market,
            raw: "{".to_string(),
            source,
        };
        assert_eq!(err.kind(), "frame_parse");
        assert_eq!(err.channel(), ChannelKind::Market);

        let err = StreamError::Handler {
            channel: ChannelKind::LiveData,
            discriminant: "trades".to_string(),
            source: anyhow::anyhow!("boom"),
        };
        assert_eq!(err.kind(), "handler");
        assert!(err.to_string().contains("boom"));
    }
}
