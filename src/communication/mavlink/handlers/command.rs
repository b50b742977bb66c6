//! Flight commands
//!
//! Builds COMMAND_LONG and SET_MODE frames addressed to the resolved
//! target. Results arrive asynchronously as COMMAND_ACK and are published
//! on the event channel (see `status`).
//!
//! # Supported Commands
//!
//! - **MAV_CMD_COMPONENT_ARM_DISARM** (400): arm/disarm, optional force
//! - **SET_MODE** + **MAV_CMD_DO_SET_MODE** (176): mode change by name
//! - **MAV_CMD_NAV_TAKEOFF** (22) / **MAV_CMD_NAV_LAND** (21)
//! - **MAV_CMD_DO_REPOSITION** (192): fly to a point
//! - **MAV_CMD_DO_FENCE_ENABLE** (207)
//! - **MAV_CMD_DO_FLIGHTTERMINATION** (185)
//! - **MAV_CMD_PREFLIGHT_REBOOT_SHUTDOWN** (246)

use std::sync::Arc;

use groundlink_core::protocol::messages::{CommandLong, ModeFlags, SetMode};
use groundlink_core::telemetry::modes::custom_mode_for;
use groundlink_core::telemetry::VehicleClass;
use log::info;

use crate::communication::mavlink::link::LinkContext;
use crate::error::{CommandError, LinkError};

pub const MAV_CMD_NAV_LAND: u16 = 21;
pub const MAV_CMD_NAV_TAKEOFF: u16 = 22;
pub const MAV_CMD_DO_SET_MODE: u16 = 176;
pub const MAV_CMD_DO_FLIGHTTERMINATION: u16 = 185;
pub const MAV_CMD_DO_REPOSITION: u16 = 192;
pub const MAV_CMD_DO_FENCE_ENABLE: u16 = 207;
pub const MAV_CMD_PREFLIGHT_REBOOT_SHUTDOWN: u16 = 246;
pub const MAV_CMD_COMPONENT_ARM_DISARM: u16 = 400;

/// param2 of ARM_DISARM that bypasses pre-arm checks
pub const ARM_FORCE_MAGIC: f32 = 21196.0;

pub struct FlightCommands {
    ctx: Arc<LinkContext>,
}

impl FlightCommands {
    pub(crate) fn new(ctx: Arc<LinkContext>) -> Self {
        Self { ctx }
    }

    /// Send an arbitrary COMMAND_LONG to the resolved target.
    pub async fn command_long(&self, command: u16, params: [f32; 7]) -> Result<(), LinkError> {
        let target = self.ctx.lock().target.resolve();
        let msg = CommandLong::new(target.system_id, target.component_id, command, params);
        self.ctx.sender.send(&msg).await
    }

    pub async fn arm(&self, arm: bool, force: bool) -> Result<(), LinkError> {
        info!("{} requested{}", if arm { "Arm" } else { "Disarm" }, if force { " (forced)" } else { "" });
        let p1 = if arm { 1.0 } else { 0.0 };
        let p2 = if force { ARM_FORCE_MAGIC } else { 0.0 };
        self.command_long(MAV_CMD_COMPONENT_ARM_DISARM, [p1, p2, 0.0, 0.0, 0.0, 0.0, 0.0])
            .await
    }

    /// Change flight mode by name using the table of the current vehicle
    /// class. Sends both SET_MODE and DO_SET_MODE.
    ///
    /// Returns the custom mode number that was requested.
    pub async fn set_mode(&self, name: &str) -> Result<u32, CommandError> {
        let (class, armed) = {
            let telemetry = self.ctx.telemetry_tx.borrow();
            (
                telemetry.vehicle_class.unwrap_or(VehicleClass::FixedWing),
                telemetry.armed,
            )
        };
        let custom_mode = custom_mode_for(class, name)
            .ok_or_else(|| CommandError::UnknownMode(name.trim().to_string()))?;

        let mut base_mode = ModeFlags::CUSTOM_MODE_ENABLED;
        if armed {
            base_mode |= ModeFlags::SAFETY_ARMED;
        }
        let target = self.ctx.lock().target.resolve();
        info!("Mode change to {} ({custom_mode})", name.trim().to_ascii_uppercase());

        self.ctx
            .sender
            .send(&SetMode {
                target_system: target.system_id,
                base_mode,
                custom_mode,
            })
            .await?;
        self.command_long(
            MAV_CMD_DO_SET_MODE,
            [
                f32::from(base_mode.bits()),
                custom_mode as f32,
                0.0,
                0.0,
                0.0,
                0.0,
                0.0,
            ],
        )
        .await?;
        Ok(custom_mode)
    }

    pub async fn takeoff(&self, altitude_m: f32) -> Result<(), LinkError> {
        self.command_long(MAV_CMD_NAV_TAKEOFF, [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, altitude_m])
            .await
    }

    pub async fn land(&self) -> Result<(), LinkError> {
        self.command_long(MAV_CMD_NAV_LAND, [0.0; 7]).await
    }

    /// Fly to a point at default ground speed, keeping the current yaw
    /// behaviour.
    pub async fn reposition(&self, lat: f64, lon: f64, altitude_m: f32) -> Result<(), LinkError> {
        self.command_long(
            MAV_CMD_DO_REPOSITION,
            [-1.0, 0.0, 0.0, f32::NAN, lat as f32, lon as f32, altitude_m],
        )
        .await
    }

    pub async fn fence_enable(&self, enable: bool) -> Result<(), LinkError> {
        let p1 = if enable { 1.0 } else { 0.0 };
        self.command_long(MAV_CMD_DO_FENCE_ENABLE, [p1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
            .await
    }

    pub async fn terminate_flight(&self) -> Result<(), LinkError> {
        self.command_long(MAV_CMD_DO_FLIGHTTERMINATION, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
            .await
    }

    /// Reboot the autopilot.
    pub async fn reboot(&self) -> Result<(), LinkError> {
        self.command_long(
            MAV_CMD_PREFLIGHT_REBOOT_SHUTDOWN,
            [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        )
        .await
    }
}
