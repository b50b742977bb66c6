//! Communication Protocols
//!
//! # Protocols
//!
//! - **MAVLink v1/v2**: link to the autopilot
//!   - Telemetry intake (HEARTBEAT, ATTITUDE, GPS, VFR_HUD, etc.)
//!   - Parameter management (PARAM_* messages)
//!   - Command execution (COMMAND_LONG, SET_MODE)
//!
//! # Transport Layers
//!
//! - UDP (port 14550), learns the vehicle endpoint
//! - TCP (SITL, port 5760)
//! - Serial device node

pub mod mavlink;
