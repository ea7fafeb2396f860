//! Configuration Module
//!
//! Configuration loading for the stream client binary.

mod settings;

pub use settings::{ConfigError, MarketSettings, MetricsSettings, StreamConfig};
