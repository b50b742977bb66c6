//! Fused vehicle telemetry
//!
//! - [`state`]: the published snapshot
//! - [`fusion`]: maps decoded messages into the snapshot, arbitrating heading sources
//! - [`modes`]: ArduPilot custom-mode name tables

pub mod fusion;
pub mod modes;
pub mod state;

pub use fusion::{FusionConfig, HeadingSource, TelemetryFusion};
pub use modes::VehicleClass;
pub use state::TelemetryState;
