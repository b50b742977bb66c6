//! MAVLink Protocol Handlers
//!
//! Message-specific handlers for the ground-station side of the link.
//!
//! # Handlers
//!
//! - **Parameter**: PARAM_VALUE intake, full-table download, echo-verified writes
//! - **Telemetry**: fusion of HEARTBEAT, ATTITUDE, positions, GPS, SYS_STATUS, VFR_HUD
//! - **Command**: outbound COMMAND_LONG / SET_MODE builders
//! - **Status**: COMMAND_ACK and STATUSTEXT logging

pub mod command;
pub mod param;
pub mod status;
pub mod telemetry;

// Re-export commonly used types
pub use command::FlightCommands;
pub use param::{ParamSyncEngine, ParamWriteCoordinator};
pub use telemetry::TokioClock;
