//! Domain Layer
//!
//! Event types and integrity rules. No I/O and no async.

pub mod events;
pub mod integrity;
pub mod wire;
