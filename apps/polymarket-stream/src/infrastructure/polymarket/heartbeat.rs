//! Heartbeat
//!
//! Keeps an idle connection honest with protocol-level pings. Any inbound
//! frame counts as a sign of life; if a ping goes unanswered and nothing
//! else arrives within the timeout, the connection is treated as dead and
//! the supervisor reconnects.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Configuration for heartbeat behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatConfig {
    /// Interval between pings.
    pub ping_interval: Duration,
    /// Silence tolerated after a ping before the connection is dropped.
    pub pong_timeout: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(20),
            pong_timeout: Duration::from_secs(20),
        }
    }
}

impl HeartbeatConfig {
    /// Create a new configuration with custom values.
    #[must_use]
    pub const fn new(ping_interval: Duration, pong_timeout: Duration) -> Self {
        Self {
            ping_interval,
            pong_timeout,
        }
    }
}

/// What to do on a heartbeat tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatAction {
    /// Send a ping.
    SendPing,
    /// The peer went silent; drop the connection.
    Timeout,
}

/// Per-connection heartbeat state. Owned by the listening task.
#[derive(Debug)]
pub struct Heartbeat {
    config: HeartbeatConfig,
    interval: Interval,
    last_activity: Instant,
    waiting_for_pong: bool,
}

impl Heartbeat {
    /// Start a heartbeat; the first tick fires one interval from now.
    #[must_use]
    pub fn new(config: HeartbeatConfig) -> Self {
        let now = Instant::now();
        let mut interval = tokio::time::interval_at(now + config.ping_interval, config.ping_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            config,
            interval,
            last_activity: now,
            waiting_for_pong: false,
        }
    }

    /// Wait for the next tick and decide what to do.
    pub async fn tick(&mut self) -> HeartbeatAction {
        self.interval.tick().await;
        self.check()
    }

    fn check(&mut self) -> HeartbeatAction {
        if self.waiting_for_pong && self.last_activity.elapsed() > self.config.pong_timeout {
            tracing::warn!(
                elapsed_ms = self.last_activity.elapsed().as_millis(),
                timeout_ms = self.config.pong_timeout.as_millis(),
                "Heartbeat timeout detected"
            );
            return HeartbeatAction::Timeout;
        }
        self.waiting_for_pong = true;
        HeartbeatAction::SendPing
    }

    /// Record an inbound frame or pong.
    pub fn record_activity(&mut self) {
        self.last_activity = Instant::now();
        self.waiting_for_pong = false;
    }

    /// Whether a ping is outstanding.
    #[must_use]
    pub const fn is_waiting_for_pong(&self) -> bool {
        self.waiting_for_pong
    }
}
