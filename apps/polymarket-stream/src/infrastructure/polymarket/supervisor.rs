//! Stream Supervisor
//!
//! Keeps one channel subscribed for as long as the caller wants it.
//!
//! # Connection Lifecycle
//!
//! ```text
//! Connecting ──► Handshaking ──► Listening ──┐
//!     ▲                                      │ transport error / close / end of stream
//!     └──────────── Reconnecting ◄───────────┘
//! ```
//!
//! - Credentials are checked before the first connection attempt; a
//!   subscription that needs them and has none fails without touching the
//!   network.
//! - The handshake frame is built once and re-sent verbatim after every
//!   reconnect. Nothing is replayed: events published while disconnected
//!   are lost.
//! - Frames are decoded and handed to the handler one at a time, in order.
//!   Parse, decode and handler failures go to the error sink and never
//!   stop the loop.
//! - Cancellation is observed while connecting, while waiting for a frame
//!   and during the reconnect delay.

use std::time::Instant;

use tokio_util::sync::CancellationToken;

use super::auth::Credentials;
use super::channel::{Endpoints, HandshakeError, LiveDataSubscription, Subscription};
use super::codec::EventDecoder;
use super::heartbeat::{Heartbeat, HeartbeatAction, HeartbeatConfig};
use super::reconnect::{ReconnectConfig, ReconnectPolicy};
use super::transport::TungsteniteConnector;
use crate::application::error::{StreamError, TransportError};
use crate::application::ports::{Connector, ErrorSink, EventHandler, Frame, FrameSocket};
use crate::domain::events::ChannelKind;
use crate::infrastructure::metrics;

// =============================================================================
// Configuration
// =============================================================================

/// Supervisor configuration.
#[derive(Debug, Clone, Default)]
pub struct SupervisorConfig {
    /// WebSocket URL per channel.
    pub endpoints: Endpoints,
    /// Delay schedule between attempts.
    pub reconnect: ReconnectConfig,
    /// Keepalive pings.
    pub heartbeat: HeartbeatConfig,
}

/// Where a supervised channel currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// `run` has not been called
    #[default]
    Idle,
    /// Opening the socket
    Connecting,
    /// Sending the subscription frame
    Handshaking,
    /// Receiving frames
    Listening,
    /// Waiting out the reconnect delay
    Reconnecting,
    /// `run` has returned
    Stopped,
}

/// Fatal supervisor errors. Everything else is retried or reported.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// The subscription needs credentials and none were given.
    #[error("{channel} subscription requires credentials")]
    AuthenticationRequired {
        /// Channel that was being started
        channel: ChannelKind,
    },

    /// The configured attempt limit was reached.
    #[error("gave up after {0} consecutive reconnection attempts")]
    MaxReconnectAttempts(u32),

    /// The handshake frame could not be serialized.
    #[error("failed to build handshake: {0}")]
    Handshake(#[source] serde_json::Error),
}

impl From<HandshakeError> for SupervisorError {
    fn from(err: HandshakeError) -> Self {
        match err {
            HandshakeError::AuthenticationRequired(channel) => {
                Self::AuthenticationRequired { channel }
            }
            HandshakeError::Serialize(e) => Self::Handshake(e),
        }
    }
}

// =============================================================================
// Supervisor
// =============================================================================

/// Reconnecting supervisor for one channel subscription.
pub struct StreamSupervisor<C> {
    connector: C,
    config: SupervisorConfig,
    decoder: EventDecoder,
    cancel: CancellationToken,
    state: parking_lot::RwLock<ConnectionState>,
}

impl<C> std::fmt::Debug for StreamSupervisor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSupervisor")
            .field("config", &self.config)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl<C: Connector> StreamSupervisor<C> {
    /// Create a supervisor. Nothing connects until [`run`](Self::run).
    #[must_use]
    pub fn new(connector: C, config: SupervisorConfig, cancel: CancellationToken) -> Self {
        Self {
            connector,
            config,
            decoder: EventDecoder::new(),
            cancel,
            state: parking_lot::RwLock::new(ConnectionState::Idle),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Token that stops [`run`](Self::run) when cancelled.
    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    fn set_state(&self, channel: ChannelKind, state: ConnectionState) {
        *self.state.write() = state;
        metrics::set_connected(channel, state == ConnectionState::Listening);
        tracing::debug!(%channel, ?state, "Connection state changed");
    }

    /// Run the subscription until cancelled.
    ///
    /// Returns `Ok(())` once the cancellation token fires.
    ///
    /// # Errors
    ///
    /// - [`SupervisorError::AuthenticationRequired`] before any connection
    ///   attempt if the subscription needs credentials and has none.
    /// - [`SupervisorError::MaxReconnectAttempts`] if a finite attempt limit
    ///   is configured and exhausted.
    pub async fn run<H, S>(
        &self,
        subscription: &Subscription,
        credentials: Option<&Credentials>,
        handler: &H,
        sink: &S,
    ) -> Result<(), SupervisorError>
    where
        H: EventHandler + ?Sized,
        S: ErrorSink + ?Sized,
    {
        let channel = subscription.channel();

        if subscription.requires_auth() && credentials.is_none() {
            tracing::error!(%channel, "Subscription requires credentials, not connecting");
            self.set_state(channel, ConnectionState::Stopped);
            return Err(SupervisorError::AuthenticationRequired { channel });
        }

        let handshake = subscription.handshake(credentials)?;
        let url = self.config.endpoints.url(channel);
        let mut policy = ReconnectPolicy::new(self.config.reconnect.clone());

        let result = loop {
            if self.cancel.is_cancelled() {
                break Ok(());
            }

            match self
                .connect_and_run(channel, url, &handshake, &mut policy, handler, sink)
                .await
            {
                Ok(()) => break Ok(()),
                Err(e) => {
                    tracing::warn!(%channel, error = %e, "Connection lost");
                    self.set_state(channel, ConnectionState::Reconnecting);

                    let Some(delay) = policy.next_delay() else {
                        tracing::error!(
                            %channel,
                            attempts = policy.attempt_count(),
                            "Maximum reconnection attempts reached"
                        );
                        break Err(SupervisorError::MaxReconnectAttempts(policy.attempt_count()));
                    };

                    metrics::record_reconnect(channel);
                    tracing::info!(
                        %channel,
                        attempt = policy.attempt_count(),
                        delay_ms = delay.as_millis(),
                        "Reconnecting"
                    );

                    tokio::select! {
                        () = self.cancel.cancelled() => break Ok(()),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        };

        tracing::info!(%channel, "Stream stopped");
        self.set_state(channel, ConnectionState::Stopped);
        result
    }

    /// Connect, subscribe and listen until an error or cancellation.
    ///
    /// `Ok(())` means cancelled.
    async fn connect_and_run<H, S>(
        &self,
        channel: ChannelKind,
        url: &str,
        handshake: &str,
        policy: &mut ReconnectPolicy,
        handler: &H,
        sink: &S,
    ) -> Result<(), TransportError>
    where
        H: EventHandler + ?Sized,
        S: ErrorSink + ?Sized,
    {
        self.set_state(channel, ConnectionState::Connecting);
        tracing::info!(%channel, url, "Connecting");

        let mut socket = tokio::select! {
            () = self.cancel.cancelled() => return Ok(()),
            socket = self.connector.connect(url) => socket?,
        };

        self.set_state(channel, ConnectionState::Handshaking);
        socket.send_text(handshake.to_owned()).await?;
        policy.reset();

        self.set_state(channel, ConnectionState::Listening);
        tracing::info!(%channel, "Subscribed");

        let mut heartbeat = Heartbeat::new(self.config.heartbeat.clone());

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    socket.close().await;
                    return Ok(());
                }
                action = heartbeat.tick() => match action {
                    HeartbeatAction::SendPing => socket.send_ping().await?,
                    HeartbeatAction::Timeout => return Err(TransportError::HeartbeatTimeout),
                },
                frame = socket.next_frame() => match frame {
                    Some(Ok(Frame::Text(text))) => {
                        heartbeat.record_activity();
                        self.process_text(channel, &text, handler, sink);
                    }
                    Some(Ok(Frame::Pong)) => heartbeat.record_activity(),
                    Some(Err(e)) => return Err(e),
                    None => return Err(TransportError::Closed),
                },
            }
        }
    }

    /// Parse, decode and dispatch one text frame.
    fn process_text<H, S>(&self, channel: ChannelKind, text: &str, handler: &H, sink: &S)
    where
        H: EventHandler + ?Sized,
        S: ErrorSink + ?Sized,
    {
        let started = Instant::now();
        metrics::record_frame_received(channel);

        let value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(source) => {
                let error = StreamError::FrameParse {
                    channel,
                    raw: text.to_owned(),
                    source,
                };
                metrics::record_decode_failure(channel, error.kind());
                sink.report(&error);
                return;
            }
        };

        for outcome in self.decoder.decode(channel, value) {
            match outcome {
                Ok(event) => {
                    metrics::record_event(channel, !event.is_unrecognized());
                    let discriminant = event.discriminant().to_owned();
                    if let Err(source) = handler.handle(event) {
                        metrics::record_handler_failure(channel);
                        sink.report(&StreamError::Handler {
                            channel,
                            discriminant,
                            source,
                        });
                    }
                }
                Err(e) => {
                    let error = StreamError::Decode(e);
                    metrics::record_decode_failure(channel, error.kind());
                    sink.report(&error);
                }
            }
        }

        metrics::record_processing_duration(channel, started.elapsed());
    }
}

// =============================================================================
// Per-channel Helpers
// =============================================================================

/// Stream the Market channel for `token_ids` until cancelled.
///
/// # Errors
///
/// See [`StreamSupervisor::run`].
pub async fn market_stream<H, S>(
    config: SupervisorConfig,
    token_ids: Vec<String>,
    custom_feature_enabled: bool,
    handler: &H,
    sink: &S,
    cancel: CancellationToken,
) -> Result<(), SupervisorError>
where
    H: EventHandler + ?Sized,
    S: ErrorSink + ?Sized,
{
    let subscription = Subscription::market(token_ids, custom_feature_enabled);
    StreamSupervisor::new(TungsteniteConnector::new(), config, cancel)
        .run(&subscription, None, handler, sink)
        .await
}

/// Stream the User channel for the account behind `credentials`.
///
/// # Errors
///
/// See [`StreamSupervisor::run`].
pub async fn user_stream<H, S>(
    config: SupervisorConfig,
    credentials: &Credentials,
    handler: &H,
    sink: &S,
    cancel: CancellationToken,
) -> Result<(), SupervisorError>
where
    H: EventHandler + ?Sized,
    S: ErrorSink + ?Sized,
{
    StreamSupervisor::new(TungsteniteConnector::new(), config, cancel)
        .run(&Subscription::User, Some(credentials), handler, sink)
        .await
}

/// Stream LiveData topics. `credentials` are required for `clob_user`.
///
/// # Errors
///
/// See [`StreamSupervisor::run`].
pub async fn live_data_stream<H, S>(
    config: SupervisorConfig,
    entries: Vec<LiveDataSubscription>,
    credentials: Option<&Credentials>,
    handler: &H,
    sink: &S,
    cancel: CancellationToken,
) -> Result<(), SupervisorError>
where
    H: EventHandler + ?Sized,
    S: ErrorSink + ?Sized,
{
    let subscription = Subscription::live_data(entries);
    StreamSupervisor::new(TungsteniteConnector::new(), config, cancel)
        .run(&subscription, credentials, handler, sink)
        .await
}
