//! groundlink - MAVLink ground-control link
//!
//! Host-side service built on the pure logic in `groundlink_core`: async
//! transports, the per-connection link, parameter download and write
//! coordination, flight commands and fused telemetry.

// Communication protocols (MAVLink link, transports, handlers)
pub mod communication;

// Link configuration (TOML + defaults)
pub mod config;

// Error types
pub mod error;

pub use communication::mavlink::{CloseReason, Link, LinkEvent};
pub use config::LinkConfig;
