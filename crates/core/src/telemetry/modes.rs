//! ArduPilot custom-mode tables
//!
//! The HEARTBEAT `custom_mode` number means different things on copters
//! and planes, so the vehicle class picks the table.

use alloc::string::{String, ToString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleClass {
    RotaryWing,
    FixedWing,
}

impl VehicleClass {
    /// Classify a `MAV_TYPE`. Multirotor and helicopter types use the
    /// copter table, everything else the plane table.
    pub fn from_mav_type(mav_type: u8) -> Self {
        match mav_type {
            2 | 3 | 4 | 13 | 14 | 15 | 34 => Self::RotaryWing,
            _ => Self::FixedWing,
        }
    }

    fn table(self) -> &'static [(u32, &'static str)] {
        match self {
            Self::RotaryWing => COPTER_MODES,
            Self::FixedWing => PLANE_MODES,
        }
    }
}

const COPTER_MODES: &[(u32, &str)] = &[
    (0, "STABILIZE"),
    (1, "ACRO"),
    (2, "ALT_HOLD"),
    (3, "AUTO"),
    (4, "GUIDED"),
    (5, "LOITER"),
    (6, "RTL"),
    (7, "CIRCLE"),
    (9, "LAND"),
    (11, "DRIFT"),
    (13, "SPORT"),
    (14, "FLIP"),
    (15, "AUTOTUNE"),
    (16, "POSHOLD"),
    (17, "BRAKE"),
    (18, "THROW"),
    (19, "AVOID_ADSB"),
    (20, "GUIDED_NOGPS"),
    (21, "SMART_RTL"),
    (22, "FLOWHOLD"),
    (23, "FOLLOW"),
    (24, "ZIGZAG"),
    (25, "SYSTEMID"),
    (26, "AUTOROTATE"),
    (27, "AUTO_RTL"),
    (28, "TURTLE"),
];

const PLANE_MODES: &[(u32, &str)] = &[
    (0, "MANUAL"),
    (1, "CIRCLE"),
    (2, "STABILIZE"),
    (3, "TRAINING"),
    (4, "ACRO"),
    (5, "FBWA"),
    (6, "FBWB"),
    (7, "CRUISE"),
    (8, "AUTOTUNE"),
    (10, "AUTO"),
    (11, "RTL"),
    (12, "LOITER"),
    (13, "TAKEOFF"),
    (15, "GUIDED"),
    (16, "INITIALISING"),
    (17, "QSTABILIZE"),
    (18, "QHOVER"),
    (19, "QLOITER"),
    (20, "QLAND"),
    (21, "QRTL"),
    (22, "QAUTOTUNE"),
    (23, "QACRO"),
    (24, "THERMAL"),
];

/// Known mode name for `custom_mode`.
pub fn mode_name(class: VehicleClass, custom_mode: u32) -> Option<&'static str> {
    class
        .table()
        .iter()
        .find(|(number, _)| *number == custom_mode)
        .map(|(_, name)| *name)
}

/// Mode name, or the number itself when the table has no entry.
pub fn mode_label(class: VehicleClass, custom_mode: u32) -> String {
    match mode_name(class, custom_mode) {
        Some(name) => name.to_string(),
        None => custom_mode.to_string(),
    }
}

/// Reverse lookup, case-insensitive.
pub fn custom_mode_for(class: VehicleClass, name: &str) -> Option<u32> {
    let name = name.trim();
    class
        .table()
        .iter()
        .find(|(_, candidate)| candidate.eq_ignore_ascii_case(name))
        .map(|(number, _)| *number)
}
