//! Polymarket Stream Binary
//!
//! Subscribes to the configured Polymarket channels and logs every event.
//!
//! # Usage
//!
//! ```bash
//! POLY_MARKET_TOKEN_IDS=7132...,1042... cargo run --bin polymarket-stream
//! ```
//!
//! # Environment Variables
//!
//! ## Channels (at least one)
//! - `POLY_MARKET_TOKEN_IDS`: Comma-separated token ids for the Market channel
//! - `POLY_ENABLE_USER_CHANNEL`: Run the User channel (needs credentials)
//! - `POLY_LIVE_DATA_SUBSCRIPTIONS`: JSON array of LiveData entries
//!
//! ## Optional
//! - `POLY_API_KEY`, `POLY_API_SECRET`, `POLY_API_PASSPHRASE`: CLOB credentials
//! - `POLY_CUSTOM_FEATURES`: Market `best_bid_ask` / `market_resolved` (default: false)
//! - `POLY_MARKET_WS_URL`, `POLY_USER_WS_URL`, `POLY_LIVE_DATA_WS_URL`: Endpoint overrides
//! - `STREAM_RECONNECT_DELAY_MS`: Delay between attempts (default: 1000)
//! - `STREAM_MAX_RECONNECT_ATTEMPTS`: Consecutive failures before giving up (default: 0 = never)
//! - `STREAM_METRICS_PORT`: Prometheus metrics port (default: 9090, 0 = disabled)
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)
//! - `RUST_LOG`: Log level (default: info)

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use polymarket_stream::infrastructure::config::StreamConfig;
use polymarket_stream::infrastructure::polymarket::{live_data_stream, market_stream, user_stream};
use polymarket_stream::infrastructure::telemetry;
use polymarket_stream::{LoggingHandler, TracingErrorSink, init_metrics};
use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    load_dotenv();

    let _telemetry_guard = telemetry::init()?;

    tracing::info!("Starting Polymarket stream");

    let config = StreamConfig::from_env()?;
    log_config(&config);

    if config.metrics.port != 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics.port));
        init_metrics(Some(addr)).context("failed to start metrics exporter")?;
    }

    let shutdown_token = CancellationToken::new();
    let mut tasks = JoinSet::new();

    if let Some(market) = config.market.clone() {
        let supervisor = config.supervisor.clone();
        let cancel = shutdown_token.clone();
        tasks.spawn(async move {
            let result = market_stream(
                supervisor,
                market.token_ids,
                market.custom_feature_enabled,
                &LoggingHandler,
                &TracingErrorSink,
                cancel,
            )
            .await;
            if let Err(e) = result {
                tracing::error!(error = %e, "Market stream error");
            }
        });
    }

    if config.user_channel {
        match config.credentials.clone() {
            Some(credentials) => {
                let supervisor = config.supervisor.clone();
                let cancel = shutdown_token.clone();
                tasks.spawn(async move {
                    let result = user_stream(
                        supervisor,
                        &credentials,
                        &LoggingHandler,
                        &TracingErrorSink,
                        cancel,
                    )
                    .await;
                    if let Err(e) = result {
                        tracing::error!(error = %e, "User stream error");
                    }
                });
            }
            None => tracing::error!("User channel enabled but POLY_API_* credentials are not set"),
        }
    }

    if !config.live_data.is_empty() {
        let supervisor = config.supervisor.clone();
        let entries = config.live_data.clone();
        let credentials = config.credentials.clone();
        let cancel = shutdown_token.clone();
        tasks.spawn(async move {
            let result = live_data_stream(
                supervisor,
                entries,
                credentials.as_ref(),
                &LoggingHandler,
                &TracingErrorSink,
                cancel,
            )
            .await;
            if let Err(e) = result {
                tracing::error!(error = %e, "LiveData stream error");
            }
        });
    }

    if tasks.is_empty() {
        anyhow::bail!(
            "no channel configured: set POLY_MARKET_TOKEN_IDS, POLY_ENABLE_USER_CHANNEL or POLY_LIVE_DATA_SUBSCRIPTIONS"
        );
    }

    tracing::info!(channels = tasks.len(), "Polymarket stream ready");

    tokio::select! {
        () = await_shutdown() => {}
        () = drain(&mut tasks) => {
            tracing::warn!("All channel streams ended");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
    if tokio::time::timeout(SHUTDOWN_TIMEOUT, drain(&mut tasks))
        .await
        .is_err()
    {
        tracing::warn!("Shutdown timed out, aborting remaining streams");
        tasks.abort_all();
    }

    tracing::info!("Polymarket stream stopped");
    Ok(())
}

/// Wait for every spawned stream to finish.
async fn drain(tasks: &mut JoinSet<()>) {
    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            tracing::error!(error = %e, "Stream task failed");
        }
    }
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Log the parsed configuration. Credentials are reported as present or not.
fn log_config(config: &StreamConfig) {
    tracing::info!(
        market_tokens = config.market.as_ref().map_or(0, |m| m.token_ids.len()),
        user_channel = config.user_channel,
        live_data_entries = config.live_data.len(),
        credentials = config.credentials.is_some(),
        metrics_port = config.metrics.port,
        "Configuration loaded"
    );
    tracing::debug!(
        market_url = %config.supervisor.endpoints.market,
        user_url = %config.supervisor.endpoints.user,
        live_data_url = %config.supervisor.endpoints.live_data,
        reconnect_delay_ms = config.supervisor.reconnect.delay.as_millis(),
        "WebSocket endpoints"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
async fn await_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
