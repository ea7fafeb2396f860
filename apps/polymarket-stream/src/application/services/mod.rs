//! Default Handlers
//!
//! - [`LoggingHandler`]: logs a one-line summary of every event
//! - [`TracingErrorSink`]: logs every stream error with its raw payload

use crate::application::error::{DecodeError, StreamError};
use crate::application::ports::{ErrorSink, EventHandler};
use crate::domain::events::{LiveDataEvent, MarketEvent, StreamEvent, UserEvent};

/// Logs events at `info` (recognized) or `warn` (unrecognized).
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl LoggingHandler {
    /// Create a logging handler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EventHandler for LoggingHandler {
    fn handle(&self, event: StreamEvent) -> anyhow::Result<()> {
        let channel = event.channel();
        let discriminant = event.discriminant();

        match &event {
            StreamEvent::Market(MarketEvent::OrderBookSummary(book)) => {
                tracing::info!(
                    %channel,
                    discriminant,
                    token_id = %book.payload.token_id,
                    bids = book.payload.bids.len(),
                    asks = book.payload.asks.len(),
                    "Orderbook snapshot"
                );
            }
            StreamEvent::Market(MarketEvent::PriceChanges(changes)) => {
                tracing::info!(
                    %channel,
                    discriminant,
                    market = %changes.payload.condition_id,
                    changes = changes.payload.changes.len(),
                    "Price changes"
                );
            }
            StreamEvent::User(UserEvent::Order(order)) => {
                tracing::info!(
                    %channel,
                    discriminant,
                    order_id = %order.payload.order_id,
                    status = ?order.payload.status,
                    "Order update"
                );
            }
            StreamEvent::User(UserEvent::Trade(trade)) => {
                tracing::info!(
                    %channel,
                    discriminant,
                    trade_id = %trade.payload.trade_id,
                    status = ?trade.payload.status,
                    "Trade update"
                );
            }
            StreamEvent::LiveData(LiveDataEvent::ServerError(error)) => {
                tracing::warn!(
                    %channel,
                    message = %error.message,
                    connection_id = ?error.connection_id,
                    request_id = ?error.request_id,
                    "Server reported an error"
                );
            }
            StreamEvent::LiveData(live) if !event.is_unrecognized() => {
                tracing::info!(
                    %channel,
                    discriminant,
                    topic = live.topic().unwrap_or_default(),
                    "Live data event"
                );
            }
            _ if event.is_unrecognized() => {
                tracing::warn!(%channel, discriminant, "Unrecognized event");
            }
            _ => {
                tracing::info!(%channel, discriminant, "Market event");
            }
        }

        Ok(())
    }
}

/// Logs stream errors through `tracing`.
///
/// Decode failures include the raw payload so unknown schema changes can be
/// diagnosed from logs alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl TracingErrorSink {
    /// Create a tracing error sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ErrorSink for TracingErrorSink {
    fn report(&self, error: &StreamError) {
        let channel = error.channel();
        let kind = error.kind();

        match error {
            StreamError::FrameParse { raw, .. } => {
                tracing::warn!(%channel, kind, raw = %raw, error = %error, "Failed to parse frame");
            }
            StreamError::Decode(decode) => {
                let discriminant = decode.discriminant().unwrap_or_default();
                let raw = decode.raw();
                match decode {
                    DecodeError::Schema { .. } => tracing::warn!(
                        %channel, kind, discriminant, %raw, error = %error,
                        "Failed to decode event"
                    ),
                    DecodeError::MissingDiscriminant { .. }
                    | DecodeError::UnexpectedShape { .. } => tracing::warn!(
                        %channel, kind, %raw, error = %error,
                        "Dropped malformed frame"
                    ),
                }
            }
            StreamError::Handler { discriminant, .. } => {
                tracing::error!(
                    %channel,
                    kind,
                    %discriminant,
                    error = %error,
                    "Event handler failed"
                );
            }
        }
    }
}
