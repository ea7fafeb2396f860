//! Wire Primitives
//!
//! Validated identifier newtypes and lenient timestamp parsing shared by the
//! payloads of every channel.
//!
//! # Identifiers
//!
//! - [`ConditionId`]: `0x` followed by 64 hex characters (Keccak-256 hash)
//! - [`Address`]: `0x` followed by 40 hex characters
//!
//! A missing `0x` prefix is accepted and normalised on the way in.
//!
//! # Timestamps
//!
//! The venue is inconsistent about timestamps: RFC 3339 strings, unix seconds,
//! unix milliseconds, sometimes as JSON numbers and sometimes as numeric
//! strings. Integers above [`MILLIS_THRESHOLD`] are read as milliseconds.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Unix values above this are interpreted as milliseconds.
pub const MILLIS_THRESHOLD: i64 = 20_000_000_000;

/// Errors produced while validating wire primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// Not a `0x`-prefixed 32-byte hex string.
    #[error("invalid condition id: {0}")]
    InvalidConditionId(String),

    /// Not a `0x`-prefixed 20-byte hex string.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Unparseable timestamp.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

fn normalize_hex(value: &str, hex_len: usize) -> Option<String> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    (digits.len() == hex_len && digits.bytes().all(|b| b.is_ascii_hexdigit()))
        .then(|| format!("0x{digits}"))
}

// =============================================================================
// Identifiers
// =============================================================================

/// Market condition id (Keccak-256 hash, `0x` + 64 hex chars).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConditionId(String);

impl ConditionId {
    /// Parse and normalise a condition id.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not 32 bytes of hex.
    pub fn parse(value: &str) -> Result<Self, WireError> {
        normalize_hex(value, 64)
            .map(Self)
            .ok_or_else(|| WireError::InvalidConditionId(value.to_string()))
    }

    /// The normalised `0x`-prefixed string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ConditionId {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ConditionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Wallet address (`0x` + 40 hex chars). Case is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parse and normalise an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not 20 bytes of hex.
    pub fn parse(value: &str) -> Result<Self, WireError> {
        normalize_hex(value, 40)
            .map(Self)
            .ok_or_else(|| WireError::InvalidAddress(value.to_string()))
    }

    /// The normalised `0x`-prefixed string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy / bid side
    Buy,
    /// Sell / ask side
    Sell,
}

// =============================================================================
// Timestamps
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawTimestamp {
    fn is_zero(&self) -> bool {
        match self {
            Self::Int(v) => *v == 0,
            Self::Float(v) => *v == 0.0,
            Self::Text(s) => s.trim() == "0",
        }
    }

    fn resolve(&self) -> Result<DateTime<Utc>, WireError> {
        match self {
            Self::Int(v) => from_unix_int(*v),
            Self::Float(v) => from_unix_float(*v),
            Self::Text(s) => parse_timestamp(s),
        }
    }
}

fn from_unix_int(value: i64) -> Result<DateTime<Utc>, WireError> {
    let parsed = if value.unsigned_abs() > MILLIS_THRESHOLD.unsigned_abs() {
        Utc.timestamp_millis_opt(value).single()
    } else {
        Utc.timestamp_opt(value, 0).single()
    };
    parsed.ok_or_else(|| WireError::InvalidTimestamp(value.to_string()))
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn from_unix_float(value: f64) -> Result<DateTime<Utc>, WireError> {
    if !value.is_finite() {
        return Err(WireError::InvalidTimestamp(value.to_string()));
    }
    let seconds = if value.abs() > MILLIS_THRESHOLD as f64 {
        value / 1000.0
    } else {
        value
    };
    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    Utc.timestamp_opt(whole as i64, nanos)
        .single()
        .ok_or_else(|| WireError::InvalidTimestamp(value.to_string()))
}

/// Parse a textual timestamp: RFC 3339, naive ISO 8601 (assumed UTC), or a
/// numeric unix value in seconds or milliseconds.
///
/// # Errors
///
/// Returns an error if no supported format matches.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, WireError> {
    let trimmed = raw.trim();

    if let Ok(v) = trimmed.parse::<i64>() {
        return from_unix_int(v);
    }
    if let Ok(v) = trimmed.parse::<f64>() {
        return from_unix_float(v);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(WireError::InvalidTimestamp(raw.to_string()))
}

/// `deserialize_with` helpers for [`DateTime<Utc>`] fields.
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    use super::RawTimestamp;

    /// Required timestamp.
    ///
    /// # Errors
    ///
    /// Fails if the value is not a supported timestamp form.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        RawTimestamp::deserialize(deserializer)?
            .resolve()
            .map_err(serde::de::Error::custom)
    }

    /// Optional timestamp; `null` decodes to `None`.
    ///
    /// # Errors
    ///
    /// Fails if a present value is not a supported timestamp form.
    pub fn optional<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<RawTimestamp>::deserialize(deserializer)?
            .map(|raw| raw.resolve().map_err(serde::de::Error::custom))
            .transpose()
    }

    /// Optional timestamp where `0` / `"0"` means "not set".
    ///
    /// # Errors
    ///
    /// Fails if a present, non-zero value is not a supported timestamp form.
    pub fn zero_as_none<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<RawTimestamp>::deserialize(deserializer)? {
            Some(raw) if raw.is_zero() => Ok(None),
            Some(raw) => raw.resolve().map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Keep a scalar exactly as it appeared on the wire (string or number).
///
/// # Errors
///
/// Fails if the value is an object, array or boolean.
pub fn verbatim<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Required identifier that may arrive as a string or an integer.
///
/// # Errors
///
/// Fails if the value is missing, null, or not a scalar.
pub fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    verbatim(deserializer)?.ok_or_else(|| serde::de::Error::custom("expected string or number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_CONDITION: &str =
        "0x0000000000000000000000000000000000000000000000000000000000000000";

    #[test]
    fn condition_id_accepts_prefixed() {
        let id = ConditionId::parse(ZERO_CONDITION).unwrap();
        assert_eq!(id.as_str(), ZERO_CONDITION);
    }

    #[test]
    fn condition_id_normalises_missing_prefix() {
        let id = ConditionId::parse(&ZERO_CONDITION[2..]).unwrap();
        assert_eq!(id.as_str(), ZERO_CONDITION);
    }

    #[test]
    fn condition_id_rejects_short_and_non_hex() {
        assert!(ConditionId::parse("0x1234").is_err());
        let bad = format!("0x{}", "zz".repeat(32));
        assert!(ConditionId::parse(&bad).is_err());
    }

    #[test]
    fn address_validation() {
        assert!(Address::parse("0x1234567890abcdefABCDEF1234567890abcdef12").is_ok());
        assert!(Address::parse("0x1234").is_err());
    }

    #[test]
    fn side_wire_format() {
        let side: Side = serde_json::from_str(r#""BUY""#).unwrap();
        assert_eq!(side, Side::Buy);
        assert!(serde_json::from_str::<Side>(r#""buy""#).is_err());
    }

    #[test]
    fn timestamp_from_millis_string() {
        let ts = parse_timestamp("1757908892351").unwrap();
        assert_eq!(ts.timestamp_millis(), 1_757_908_892_351);
    }

    #[test]
    fn timestamp_from_seconds_string() {
        let ts = parse_timestamp("1757908892").unwrap();
        assert_eq!(ts.timestamp(), 1_757_908_892);
    }

    #[test]
    fn timestamp_from_rfc3339_and_naive() {
        let a = parse_timestamp("2025-01-15T10:00:00Z").unwrap();
        let b = parse_timestamp("2025-01-15T10:00:00.000").unwrap();
        let c = parse_timestamp("2025-01-15 10:00:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn timestamp_rejects_out_of_range_integers() {
        assert!(parse_timestamp("-9223372036854775808").is_err());
        assert!(parse_timestamp("9223372036854775807").is_err());
        assert!(from_unix_int(i64::MIN).is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Stamped {
        #[serde(deserialize_with = "timestamp::deserialize")]
        at: DateTime<Utc>,
        #[serde(default, deserialize_with = "timestamp::zero_as_none")]
        expiry: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "verbatim")]
        raw: Option<String>,
    }

    #[test]
    fn timestamp_from_json_number_millis() {
        let s: Stamped = serde_json::from_str(r#"{"at":1757908892351}"#).unwrap();
        assert_eq!(s.at.timestamp_millis(), 1_757_908_892_351);
        assert!(s.expiry.is_none());
        assert!(s.raw.is_none());
    }

    #[test]
    fn zero_expiration_is_none() {
        let s: Stamped = serde_json::from_str(r#"{"at":"1757908892","expiry":"0"}"#).unwrap();
        assert!(s.expiry.is_none());

        let s: Stamped =
            serde_json::from_str(r#"{"at":"1757908892","expiry":"1757999999"}"#).unwrap();
        assert_eq!(s.expiry.unwrap().timestamp(), 1_757_999_999);
    }

    #[test]
    fn verbatim_keeps_wire_text() {
        let s: Stamped = serde_json::from_str(r#"{"at":1,"raw":1757908892351}"#).unwrap();
        assert_eq!(s.raw.as_deref(), Some("1757908892351"));

        let s: Stamped = serde_json::from_str(r#"{"at":1,"raw":"abc"}"#).unwrap();
        assert_eq!(s.raw.as_deref(), Some("abc"));

        assert!(serde_json::from_str::<Stamped>(r#"{"at":1,"raw":[1]}"#).is_err());
    }
}
