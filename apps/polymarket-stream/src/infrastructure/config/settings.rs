//! Stream Configuration Settings
//!
//! Configuration types for the stream client, loaded from environment variables.

use std::time::Duration;

use crate::infrastructure::polymarket::{
    Credentials, Endpoints, HeartbeatConfig, LiveDataSubscription, ReconnectConfig,
    SupervisorConfig,
};

/// Market channel settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketSettings {
    /// Token ids to subscribe to.
    pub token_ids: Vec<String>,
    /// Receive `best_bid_ask` and `market_resolved` as well.
    pub custom_feature_enabled: bool,
}

/// Prometheus exporter settings.
#[derive(Debug, Clone)]
pub struct MetricsSettings {
    /// Prometheus metrics port (0 = disabled).
    pub port: u16,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self { port: 9090 }
    }
}

/// Complete stream client configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// API credentials, if configured.
    pub credentials: Option<Credentials>,
    /// Market channel, if any token ids are configured.
    pub market: Option<MarketSettings>,
    /// Whether to run the User channel.
    pub user_channel: bool,
    /// LiveData entries (empty = channel not started).
    pub live_data: Vec<LiveDataSubscription>,
    /// Endpoints, reconnect and heartbeat settings shared by all channels.
    pub supervisor: SupervisorConfig,
    /// Metrics exporter settings.
    pub metrics: MetricsSettings,
}

impl StreamConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is present but empty or malformed, or if
    /// only part of the credential set is given.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let credentials = env.credentials()?;

        let token_ids: Vec<String> = env
            .get("POLY_MARKET_TOKEN_IDS")
            .map(|ids| {
                ids.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let market = if token_ids.is_empty() {
            None
        } else {
            Some(MarketSettings {
                token_ids,
                custom_feature_enabled: env.bool("POLY_CUSTOM_FEATURES", false)?,
            })
        };

        let live_data = match env.get("POLY_LIVE_DATA_SUBSCRIPTIONS") {
            Some(json) => serde_json::from_str(&json).map_err(|e| ConfigError::InvalidValue {
                key: "POLY_LIVE_DATA_SUBSCRIPTIONS".to_string(),
                reason: e.to_string(),
            })?,
            None => Vec::new(),
        };

        let defaults = Endpoints::default();
        let endpoints = Endpoints {
            market: env.get("POLY_MARKET_WS_URL").unwrap_or(defaults.market),
            user: env.get("POLY_USER_WS_URL").unwrap_or(defaults.user),
            live_data: env.get("POLY_LIVE_DATA_WS_URL").unwrap_or(defaults.live_data),
        };

        let supervisor = SupervisorConfig {
            endpoints,
            reconnect: env.reconnect()?,
            heartbeat: env.heartbeat()?,
        };

        let metrics = MetricsSettings {
            port: env.parse("STREAM_METRICS_PORT", MetricsSettings::default().port)?,
        };

        Ok(Self {
            credentials,
            market,
            user_channel: env.bool("POLY_ENABLE_USER_CHANNEL", false)?,
            live_data,
            supervisor,
            metrics,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable could not be parsed.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// Variable name
        key: String,
        /// What was wrong
        reason: String,
    },
}

// =============================================================================
// Lookup Helpers
// =============================================================================

const CREDENTIAL_KEYS: [&str; 3] = ["POLY_API_KEY", "POLY_API_SECRET", "POLY_API_PASSPHRASE"];

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) if raw.trim().is_empty() => Err(ConfigError::EmptyValue(key.to_string())),
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                other => Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: format!("expected a boolean, got {other:?}"),
                }),
            },
        }
    }

    fn non_zero_millis(&self, key: &str, default: Duration) -> Result<Duration, ConfigError> {
        let default_millis = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
        let millis: u64 = self.parse(key, default_millis)?;
        if millis == 0 {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(Duration::from_millis(millis))
    }

    fn credentials(&self) -> Result<Option<Credentials>, ConfigError> {
        let values = CREDENTIAL_KEYS.map(|key| self.get(key));
        if values.iter().all(Option::is_none) {
            return Ok(None);
        }

        let [api_key, api_secret, api_passphrase] = values;
        let require = |key: &str, value: Option<String>| match value {
            None => Err(ConfigError::MissingEnvVar(key.to_string())),
            Some(v) if v.is_empty() => Err(ConfigError::EmptyValue(key.to_string())),
            Some(v) => Ok(v),
        };

        Ok(Some(Credentials::new(
            require(CREDENTIAL_KEYS[0], api_key)?,
            require(CREDENTIAL_KEYS[1], api_secret)?,
            require(CREDENTIAL_KEYS[2], api_passphrase)?,
        )))
    }

    fn reconnect(&self) -> Result<ReconnectConfig, ConfigError> {
        let defaults = ReconnectConfig::default();
        let delay = self.non_zero_millis("STREAM_RECONNECT_DELAY_MS", defaults.delay)?;
        let max_delay = self.non_zero_millis("STREAM_RECONNECT_DELAY_MAX_MS", delay)?;
        let multiplier: f64 = self.parse("STREAM_RECONNECT_MULTIPLIER", defaults.multiplier)?;
        let jitter_factor: f64 = self.parse("STREAM_RECONNECT_JITTER", defaults.jitter_factor)?;
        let max_attempts: u32 = self.parse("STREAM_MAX_RECONNECT_ATTEMPTS", 0)?;

        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                key: "STREAM_RECONNECT_MULTIPLIER".to_string(),
                reason: "must be at least 1.0".to_string(),
            });
        }
        if !(0.0..1.0).contains(&jitter_factor) {
            return Err(ConfigError::InvalidValue {
                key: "STREAM_RECONNECT_JITTER".to_string(),
                reason: "must be in [0.0, 1.0)".to_string(),
            });
        }

        Ok(ReconnectConfig {
            delay,
            max_delay,
            multiplier,
            jitter_factor,
            max_attempts: (max_attempts > 0).then_some(max_attempts),
        })
    }

    fn heartbeat(&self) -> Result<HeartbeatConfig, ConfigError> {
        let defaults = HeartbeatConfig::default();
        Ok(HeartbeatConfig::new(
            self.non_zero_millis("STREAM_PING_INTERVAL_MS", defaults.ping_interval)?,
            self.non_zero_millis("STREAM_PONG_TIMEOUT_MS", defaults.pong_timeout)?,
        ))
    }
}
