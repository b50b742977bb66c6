//! Published telemetry snapshot

use alloc::string::String;

use super::modes::VehicleClass;

/// One coherent view of the vehicle.
///
/// Angles are degrees, speeds m/s, altitude metres, position decimal
/// degrees. Floating-point fields start as NaN; once any message has been
/// applied, speeds, altitude, battery and heading read 0 until reported.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryState {
    pub pitch_deg: f64,
    pub roll_deg: f64,
    /// Fused and smoothed, [0, 360)
    pub heading_deg: f64,
    pub airspeed: f64,
    pub groundspeed: f64,
    pub altitude: f64,
    pub lat: f64,
    pub lon: f64,
    pub battery_volts: f64,
    pub satellites: u8,
    pub armed: bool,
    pub mode: String,
    pub vehicle_class: Option<VehicleClass>,
}

/// Mode label before the first heartbeat.
pub const UNKNOWN_MODE: &str = "UNKNOWN";

impl Default for TelemetryState {
    fn default() -> Self {
        Self {
            pitch_deg: f64::NAN,
            roll_deg: f64::NAN,
            heading_deg: f64::NAN,
            airspeed: f64::NAN,
            groundspeed: f64::NAN,
            altitude: f64::NAN,
            lat: f64::NAN,
            lon: f64::NAN,
            battery_volts: f64::NAN,
            satellites: 0,
            armed: false,
            mode: String::from(UNKNOWN_MODE),
            vehicle_class: None,
        }
    }
}

impl TelemetryState {
    pub fn has_position(&self) -> bool {
        !self.lat.is_nan() && !self.lon.is_nan()
    }
}
