//! Orderbook Integrity
//!
//! Pure validation primitives for orderbook data tied to a discrete price
//! grid:
//!
//! - [`TickSize`]: the four supported grid increments
//! - rounding to a fixed number of fractional digits ([`round_down`],
//!   [`round_normal`], [`round_up`])
//! - price bounds ([`price_valid`])
//! - canonical snapshot hashing ([`compute_orderbook_hash`])
//!
//! Nothing here performs I/O or holds state.

mod orderbook;
mod rounding;
mod tick_size;

pub use orderbook::{OrderBookSnapshot, PriceLevel, compute_orderbook_hash};
pub use rounding::{
    decimal_places, decimal_places_f64, price_valid, round_down, round_normal, round_up,
};
pub use tick_size::{TickSize, is_tick_size_smaller};

/// Errors from integrity computations.
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    /// NaN or infinite input.
    #[error("value is not finite: {0}")]
    NonFinite(f64),

    /// Finite input that does not fit a 96-bit decimal.
    #[error("value is out of decimal range: {0}")]
    OutOfRange(f64),

    /// Tick size outside the supported grid.
    #[error("unsupported tick size: {0}")]
    UnsupportedTickSize(String),

    /// Canonical serialization failed.
    #[error("failed to serialize orderbook: {0}")]
    Serialize(#[from] serde_json::Error),
}
