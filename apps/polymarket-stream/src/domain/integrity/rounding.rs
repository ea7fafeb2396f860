//! Decimal rounding and price bounds.
//!
//! Every rounding function returns a value with exactly `digits` fractional
//! digits, so `round_up(0.1, 2)` is `0.10`, not `0.1`.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::IntegrityError;
use super::tick_size::TickSize;

fn quantize(x: Decimal, digits: u32, strategy: RoundingStrategy) -> Decimal {
    let mut rounded = x.round_dp_with_strategy(digits, strategy);
    rounded.rescale(digits);
    rounded
}

/// Round toward negative infinity.
#[must_use]
pub fn round_down(x: Decimal, digits: u32) -> Decimal {
    quantize(x, digits, RoundingStrategy::ToNegativeInfinity)
}

/// Round half-up (midpoint away from zero).
#[must_use]
pub fn round_normal(x: Decimal, digits: u32) -> Decimal {
    quantize(x, digits, RoundingStrategy::MidpointAwayFromZero)
}

/// Round toward positive infinity.
#[must_use]
pub fn round_up(x: Decimal, digits: u32) -> Decimal {
    quantize(x, digits, RoundingStrategy::ToPositiveInfinity)
}

/// Fractional digits of a decimal as written (`1.50` has 2).
#[must_use]
pub fn decimal_places(x: &Decimal) -> u32 {
    x.scale()
}

/// Largest scale a [`Decimal`] can hold.
const MAX_SCALE: u32 = 28;

/// Fractional digits of the shortest decimal text of a float.
///
/// # Errors
///
/// Returns [`IntegrityError::NonFinite`] for NaN or infinities and
/// [`IntegrityError::OutOfRange`] when the value does not fit a decimal,
/// including values needing more than 28 fractional digits.
pub fn decimal_places_f64(x: f64) -> Result<u32, IntegrityError> {
    if !x.is_finite() {
        return Err(IntegrityError::NonFinite(x));
    }
    let text = x.to_string();
    let written = text.split_once('.').map_or(0, |(_, fraction)| fraction.len());
    if written > MAX_SCALE as usize {
        return Err(IntegrityError::OutOfRange(x));
    }
    Decimal::from_str(&text)
        .map(|d| d.scale())
        .map_err(|_| IntegrityError::OutOfRange(x))
}

/// Whether `price` lies within `[tick, 1 - tick]`.
#[must_use]
pub fn price_valid(price: Decimal, tick: TickSize) -> bool {
    let tick = tick.as_decimal();
    tick <= price && price <= Decimal::ONE - tick
}
