//! Vehicle discovery and target lock
//!
//! The link addresses outbound commands to one vehicle. That vehicle is
//! chosen by the first HEARTBEAT whose vehicle-type byte matches the
//! expected class; until then the fallback identity (1, 1) is used.
//!
//! ```text
//! Unlocked --matching heartbeat--> Locked --reset()--> Unlocked
//! ```

use crate::protocol::frame::DecodedMessage;
use crate::protocol::messages::{Heartbeat, MessageKind};

/// `MAV_TYPE_FIXED_WING`
pub const MAV_TYPE_FIXED_WING: u8 = 1;

/// Identity used while no vehicle is locked.
pub const FALLBACK_TARGET: TargetIdentity = TargetIdentity {
    system_id: 1,
    component_id: 1,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetIdentity {
    pub system_id: u8,
    pub component_id: u8,
}

#[derive(Debug, Clone)]
pub struct TargetLock {
    expected_vehicle_type: u8,
    locked: Option<TargetIdentity>,
}

impl TargetLock {
    pub fn new(expected_vehicle_type: u8) -> Self {
        Self {
            expected_vehicle_type,
            locked: None,
        }
    }

    /// Feed a decoded message; non-heartbeats are ignored.
    ///
    /// Returns the identity when this call performed the lock.
    pub fn observe_heartbeat(&mut self, msg: &DecodedMessage) -> Option<TargetIdentity> {
        if self.locked.is_some() || msg.kind() != Some(MessageKind::Heartbeat) {
            return None;
        }
        let heartbeat = Heartbeat::decode(msg).ok()?;
        if heartbeat.vehicle_type != self.expected_vehicle_type {
            return None;
        }
        let identity = TargetIdentity {
            system_id: msg.system_id,
            component_id: msg.component_id,
        };
        self.locked = Some(identity);
        Some(identity)
    }

    /// Locked identity, or [`FALLBACK_TARGET`].
    pub fn resolve(&self) -> TargetIdentity {
        self.locked.unwrap_or(FALLBACK_TARGET)
    }

    pub fn identity(&self) -> Option<TargetIdentity> {
        self.locked
    }

    pub fn is_locked(&self) -> bool {
        self.locked.is_some()
    }

    pub fn expected_vehicle_type(&self) -> u8 {
        self.expected_vehicle_type
    }

    /// Back to unlocked (disconnect or reconnect).
    pub fn reset(&mut self) {
        self.locked = None;
    }
}

impl Default for TargetLock {
    fn default() -> Self {
        Self::new(MAV_TYPE_FIXED_WING)
    }
}
