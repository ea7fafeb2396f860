//! Prometheus Metrics Module
//!
//! Exposes stream health via Prometheus format for monitoring.
//!
//! # Metrics Categories
//!
//! - **Frames**: Frames received and events decoded per channel
//! - **Failures**: Decode and handler failures by kind
//! - **Connections**: Connection state and reconnection attempts
//! - **Latency**: Per-frame decode and dispatch time
//!
//! # Integration
//!
//! With a listen address, the exporter serves `/metrics` on its own HTTP
//! listener. Without one, the recorder is installed and the returned
//! handle can render the text format on demand.

use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::domain::events::ChannelKind;

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Errors installing the metrics recorder.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// The exporter could not be built.
    #[error("failed to build Prometheus exporter: {0}")]
    Build(#[from] BuildError),

    /// Another global recorder is already installed.
    #[error("a global metrics recorder is already installed")]
    AlreadyInstalled,
}

/// Initialize the Prometheus metrics recorder.
///
/// Calling this again returns the handle from the first call.
///
/// # Errors
///
/// Returns an error if the exporter cannot be built or another recorder is
/// already installed.
pub fn init_metrics(listen: Option<SocketAddr>) -> Result<PrometheusHandle, MetricsError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = match listen {
        Some(addr) => {
            let (recorder, exporter) = PrometheusBuilder::new().with_http_listener(addr).build()?;
            let handle = recorder.handle();
            metrics::set_global_recorder(recorder).map_err(|_| MetricsError::AlreadyInstalled)?;
            tokio::spawn(async move {
                if let Err(e) = exporter.await {
                    tracing::error!(error = ?e, "Prometheus exporter stopped");
                }
            });
            tracing::info!(%addr, "Prometheus exporter listening");
            handle
        }
        None => PrometheusBuilder::new().install_recorder()?,
    };

    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "polymarket_stream_frames_received_total",
        "Total text frames received per channel"
    );
    describe_counter!(
        "polymarket_stream_events_total",
        "Total events decoded per channel, recognized or not"
    );
    describe_counter!(
        "polymarket_stream_decode_failures_total",
        "Total frames or burst elements that failed to decode"
    );
    describe_counter!(
        "polymarket_stream_handler_failures_total",
        "Total events the handler returned an error for"
    );
    describe_counter!(
        "polymarket_stream_reconnects_total",
        "Total reconnection attempts"
    );
    describe_gauge!(
        "polymarket_stream_connected",
        "1 while the channel is subscribed and listening"
    );
    describe_histogram!(
        "polymarket_stream_frame_processing_seconds",
        "Time to decode a frame and dispatch its events"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Record a text frame received.
pub fn record_frame_received(channel: ChannelKind) {
    counter!(
        "polymarket_stream_frames_received_total",
        "channel" => channel.as_str()
    )
    .increment(1);
}

/// Record a decoded event.
pub fn record_event(channel: ChannelKind, recognized: bool) {
    counter!(
        "polymarket_stream_events_total",
        "channel" => channel.as_str(),
        "kind" => if recognized { "recognized" } else { "unrecognized" }
    )
    .increment(1);
}

/// Record a decode failure (`kind` is a `StreamError::kind` label).
pub fn record_decode_failure(channel: ChannelKind, kind: &'static str) {
    counter!(
        "polymarket_stream_decode_failures_total",
        "channel" => channel.as_str(),
        "kind" => kind
    )
    .increment(1);
}

/// Record a handler failure.
pub fn record_handler_failure(channel: ChannelKind) {
    counter!(
        "polymarket_stream_handler_failures_total",
        "channel" => channel.as_str()
    )
    .increment(1);
}

/// Record a reconnection attempt.
pub fn record_reconnect(channel: ChannelKind) {
    counter!(
        "polymarket_stream_reconnects_total",
        "channel" => channel.as_str()
    )
    .increment(1);
}

/// Update the connected flag for a channel.
pub fn set_connected(channel: ChannelKind, connected: bool) {
    gauge!(
        "polymarket_stream_connected",
        "channel" => channel.as_str()
    )
    .set(if connected { 1.0 } else { 0.0 });
}

/// Record frame processing duration.
pub fn record_processing_duration(channel: ChannelKind, duration: Duration) {
    histogram!(
        "polymarket_stream_frame_processing_seconds",
        "channel" => channel.as_str()
    )
    .record(duration.as_secs_f64());
}

// =============================================================================
// Tests
// =============================================================================
