//! Application Layer - Ports, errors and default handlers.
//!
//! This layer defines how decoded events leave the client (handlers and
//! error sinks) and how the supervisor reaches the network (connector and
//! socket ports).

/// Errors reported while streaming.
pub mod error;

/// Port interfaces for handlers and transports.
pub mod ports;

/// Ready-made handler and error sink implementations.
pub mod services;
