//! Tick Size
//!
//! # Wire Format (JSON)
//!
//! Tick sizes arrive either as strings (`"0.01"`) or as JSON numbers (`0.01`).
//! Trailing zeros are ignored (`"0.010"` is the same tick). They are always
//! serialized back as strings.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::IntegrityError;
use super::rounding::round_normal;

/// Minimum price increment of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSize {
    /// 0.1
    Tenth,
    /// 0.01
    Hundredth,
    /// 0.001
    Thousandth,
    /// 0.0001
    TenThousandth,
}

impl TickSize {
    /// All supported tick sizes, coarsest first.
    pub const ALL: [Self; 4] = [
        Self::Tenth,
        Self::Hundredth,
        Self::Thousandth,
        Self::TenThousandth,
    ];

    /// Number of fractional digits on this grid.
    #[must_use]
    pub const fn decimals(self) -> u32 {
        match self {
            Self::Tenth => 1,
            Self::Hundredth => 2,
            Self::Thousandth => 3,
            Self::TenThousandth => 4,
        }
    }

    /// Grid increment as a decimal.
    #[must_use]
    pub const fn as_decimal(self) -> Decimal {
        Decimal::from_parts(1, 0, 0, false, self.decimals())
    }

    /// Canonical wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tenth => "0.1",
            Self::Hundredth => "0.01",
            Self::Thousandth => "0.001",
            Self::TenThousandth => "0.0001",
        }
    }

    /// Round a price onto this grid (half-up).
    #[must_use]
    pub fn round_price(self, price: Decimal) -> Decimal {
        round_normal(price, self.decimals())
    }
}

/// Whether `a` is a strictly finer grid than `b`.
#[must_use]
pub fn is_tick_size_smaller(a: TickSize, b: TickSize) -> bool {
    a.as_decimal() < b.as_decimal()
}

impl TryFrom<Decimal> for TickSize {
    type Error = IntegrityError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        let normalized = value.normalize();
        Self::ALL
            .into_iter()
            .find(|tick| tick.as_decimal() == normalized)
            .ok_or_else(|| IntegrityError::UnsupportedTickSize(value.to_string()))
    }
}

impl FromStr for TickSize {
    type Err = IntegrityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| IntegrityError::UnsupportedTickSize(s.to_string()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for TickSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TickSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TickSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("0.1", TickSize::Tenth)]
    #[test_case("0.01", TickSize::Hundredth)]
    #[test_case("0.010", TickSize::Hundredth)]
    #[test_case("0.001", TickSize::Thousandth)]
    #[test_case("0.0001", TickSize::TenThousandth)]
    fn parses_supported(raw: &str, expected: TickSize) {
        assert_eq!(raw.parse::<TickSize>().unwrap(), expected);
    }

    #[test_case("0.05")]
    #[test_case("1")]
    #[test_case("abc")]
    fn rejects_unsupported(raw: &str) {
        assert!(raw.parse::<TickSize>().is_err());
    }

    #[test]
    fn deserializes_from_string_and_number() {
        let a: TickSize = serde_json::from_str(r#""0.001""#).unwrap();
        let b: TickSize = serde_json::from_str("0.001").unwrap();
        assert_eq!(a, TickSize::Thousandth);
        assert_eq!(b, TickSize::Thousandth);
        assert_eq!(serde_json::to_string(&a).unwrap(), r#""0.001""#);
    }

    #[test]
    fn decimals_match_increment_scale() {
        for tick in TickSize::ALL {
            assert_eq!(tick.as_decimal().scale(), tick.decimals());
            assert_eq!(tick.as_decimal().to_string(), tick.as_str());
        }
    }

    #[test]
    fn finer_grid_is_smaller() {
        assert!(is_tick_size_smaller(TickSize::Thousandth, TickSize::Hundredth));
        assert!(!is_tick_size_smaller(TickSize::Hundredth, TickSize::Hundredth));
        assert!(!is_tick_size_smaller(TickSize::Tenth, TickSize::TenThousandth));
    }

    #[test]
    fn round_price_snaps_to_grid() {
        let price = Decimal::from_str("0.1234").unwrap();
        assert_eq!(TickSize::Hundredth.round_price(price).to_string(), "0.12");
        assert_eq!(TickSize::Thousandth.round_price(price).to_string(), "0.123");
        let mid = Decimal::from_str("0.125").unwrap();
        assert_eq!(TickSize::Hundredth.round_price(mid).to_string(), "0.13");
    }
}
