#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Polymarket Stream - CLOB WebSocket Client
//!
//! Keeps subscriptions to Polymarket's push channels alive, decodes every
//! frame into a typed event, and provides the orderbook integrity checks
//! needed to trust what arrives.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Event types and integrity rules
//!   - `events`: Per-channel event sum types with an `Unrecognized` arm
//!   - `integrity`: Tick sizes, decimal rounding, price bounds, book hashing
//!   - `wire`: Identifier, side and timestamp wire primitives
//!
//! - **Application**: Ports and errors
//!   - `ports`: Event handler, error sink, connector and socket interfaces
//!   - `services`: Logging handler and tracing error sink
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `polymarket`: Channel subscriptions, decoder, supervisor, transport
//!   - `config`: Environment configuration
//!   - `metrics`: Prometheus instrumentation
//!   - `telemetry`: Tracing subscriber and OTLP export
//!
//! # Data Flow
//!
//! ```text
//! Market WS ────┐
//!               │     ┌────────────┐     ┌─────────┐
//! User WS ──────┼────►│ Supervisor │────►│ Decoder │────► EventHandler
//!               │     └────────────┘     └─────────┘
//! LiveData WS ──┘           │                 │
//!                           └─────────────────┴─────────► ErrorSink
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Event types and integrity rules with no I/O.
pub mod domain;

/// Application layer - Ports, errors and default handlers.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Events
pub use domain::events::{
    ChannelKind, LiveDataEvent, MarketEvent, StreamEvent, Tagged, Unrecognized, UserEvent,
};

// Integrity
pub use domain::integrity::{
    IntegrityError, OrderBookSnapshot, PriceLevel, TickSize, compute_orderbook_hash,
    price_valid, round_down, round_normal, round_up,
};

// Ports and errors
pub use application::error::{DecodeError, StreamError, TransportError};
pub use application::ports::{Connector, ErrorSink, EventHandler, Frame, FrameSocket};
pub use application::services::{LoggingHandler, TracingErrorSink};

// Polymarket client
pub use infrastructure::polymarket::{
    ConnectionState, Credentials, EventDecoder, LiveDataSubscription, StreamSupervisor,
    Subscription, SupervisorConfig, SupervisorError, live_data_stream, market_stream,
    user_stream,
};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
