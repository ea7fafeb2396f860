//! Port Interfaces
//!
//! Contracts between the stream supervisor and the outside world, following
//! the Hexagonal Architecture pattern.
//!
//! ## Driven Ports (Outbound)
//!
//! - [`Connector`] / [`FrameSocket`]: open a WebSocket and exchange frames
//!
//! ## Driver Ports (Inbound)
//!
//! - [`EventHandler`]: receives every decoded event, in arrival order
//! - [`ErrorSink`]: receives every per-frame failure

use async_trait::async_trait;

use super::error::{StreamError, TransportError};
use crate::domain::events::StreamEvent;

// =============================================================================
// Handlers
// =============================================================================

/// Consumer of decoded events.
///
/// Called sequentially from the channel task; a slow handler delays the
/// next frame. An `Err` is reported to the [`ErrorSink`] and streaming
/// continues.
///
/// Any `Fn(StreamEvent) -> anyhow::Result<()>` closure is a handler.
#[cfg_attr(test, mockall::automock)]
pub trait EventHandler: Send + Sync {
    /// Handle one event.
    ///
    /// # Errors
    ///
    /// Implementations return an error to have it reported; it never stops
    /// the stream.
    fn handle(&self, event: StreamEvent) -> anyhow::Result<()>;
}

impl<F> EventHandler for F
where
    F: Fn(StreamEvent) -> anyhow::Result<()> + Send + Sync,
{
    fn handle(&self, event: StreamEvent) -> anyhow::Result<()> {
        self(event)
    }
}

/// Consumer of non-fatal stream errors.
#[cfg_attr(test, mockall::automock)]
pub trait ErrorSink: Send + Sync {
    /// Report one error.
    fn report(&self, error: &StreamError);
}

// =============================================================================
// Transport
// =============================================================================

/// An inbound frame after control traffic has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Text payload (binary payloads arrive here as UTF-8)
    Text(String),
    /// Reply to one of our pings
    Pong,
}

/// An open WebSocket.
#[async_trait]
pub trait FrameSocket: Send {
    /// Send a text frame.
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Send a ping.
    async fn send_ping(&mut self) -> Result<(), TransportError>;

    /// Next inbound frame; `None` once the peer closed the connection.
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>>;

    /// Close the connection, best effort.
    async fn close(&mut self);
}

/// Factory for [`FrameSocket`]s.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Socket type produced by this connector.
    type Socket: FrameSocket;

    /// Open a connection to `url`.
    async fn connect(&self, url: &str) -> Result<Self::Socket, TransportError>;
}
