//! Telemetry fusion
//!
//! Maps decoded messages into one [`TelemetryState`]. Most fields are a
//! direct decode; heading is arbitrated between three sources:
//!
//! | Source       | Message             | Priority                          |
//! |--------------|---------------------|-----------------------------------|
//! | Air data     | VFR_HUD `heading`   | highest while fresh (1.5 s)       |
//! | GPS course   | GLOBAL_POSITION_INT | when moving and air data is stale |
//! | Attitude yaw | ATTITUDE `yaw`      | fallback, corrected by yaw bias   |
//!
//! Whenever a reference heading (air data or GPS course) is accepted, the
//! offset between it and the raw attitude yaw is blended into a yaw-bias
//! estimate. Attitude-derived headings add that bias, so falling back to
//! the attitude source does not make the heading jump.
//!
//! Every heading passes through one [`HeadingFilter`], and a vehicle-class
//! change resets all of this state.

use crate::navigation::{rad_to_deg, wrap_180, wrap_360, HeadingFilter};
use crate::protocol::frame::DecodedMessage;
use crate::protocol::messages::{
    Attitude, GlobalPositionInt, GpsRawInt, Heartbeat, LocalPositionNed, MessageKind, SysStatus,
    VfrHud,
};
use crate::traits::TimeSource;

use super::modes::{mode_label, VehicleClass};
use super::state::TelemetryState;

/// Component id of the autopilot, the only heartbeat source used for mode.
pub const AUTOPILOT_COMPONENT_ID: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingSource {
    None,
    AttitudeYaw,
    AirData,
    GpsCourse,
}

/// Fusion tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionConfig {
    /// Exchange roll and pitch (board mounted rotated 90°)
    pub swap_roll_pitch: bool,
    pub roll_sign: f64,
    pub pitch_sign: f64,
    /// Heading EMA factor
    pub heading_alpha: f64,
    pub max_slew_deg_per_s: f64,
    /// Yaw-bias EMA factor
    pub bias_alpha: f64,
    /// Groundspeed (m/s) above which GPS course is trusted
    pub gps_min_groundspeed: f64,
    /// Air-data heading counts as fresh for this long (s)
    pub air_data_fresh_s: f64,
    /// GPS course stays active this long after slowing down (s)
    pub gps_hold_s: f64,
    /// Added to every heading before smoothing
    pub heading_offset_deg: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            swap_roll_pitch: false,
            roll_sign: 1.0,
            pitch_sign: 1.0,
            heading_alpha: 0.48,
            max_slew_deg_per_s: 540.0,
            bias_alpha: 0.25,
            gps_min_groundspeed: 5.0,
            air_data_fresh_s: 1.5,
            gps_hold_s: 1.0,
            heading_offset_deg: 0.0,
        }
    }
}

pub struct TelemetryFusion<T: TimeSource> {
    config: FusionConfig,
    time: T,
    state: TelemetryState,
    filter: HeadingFilter,
    source: HeadingSource,
    yaw_bias_deg: Option<f64>,
    last_attitude_yaw_deg: Option<f64>,
    last_gps_course_us: Option<u64>,
    last_air_data_us: Option<u64>,
    /// First autopilot system seen; heartbeats from others are ignored
    active_system: Option<u8>,
}

impl<T: TimeSource> TelemetryFusion<T> {
    pub fn new(config: FusionConfig, time: T) -> Self {
        let filter = HeadingFilter::new(config.heading_alpha, config.max_slew_deg_per_s);
        Self {
            config,
            time,
            state: TelemetryState::default(),
            filter,
            source: HeadingSource::None,
            yaw_bias_deg: None,
            last_attitude_yaw_deg: None,
            last_gps_course_us: None,
            last_air_data_us: None,
            active_system: None,
        }
    }

    /// Apply one decoded message.
    ///
    /// Returns `false` (state untouched) for kinds that carry no telemetry
    /// or payloads that fail to decode.
    pub fn update(&mut self, msg: &DecodedMessage) -> bool {
        let now_us = self.time.now_us();
        let handled = match msg.kind() {
            Some(MessageKind::Heartbeat) => self.on_heartbeat(msg),
            Some(MessageKind::Attitude) => self.on_attitude(msg, now_us),
            Some(MessageKind::LocalPositionNed) => self.on_local_position(msg),
            Some(MessageKind::GlobalPositionInt) => self.on_global_position(msg, now_us),
            Some(MessageKind::GpsRawInt) => self.on_gps_raw(msg),
            Some(MessageKind::SysStatus) => self.on_sys_status(msg),
            Some(MessageKind::VfrHud) => self.on_vfr_hud(msg, now_us),
            _ => false,
        };
        if handled {
            self.apply_guards();
        }
        handled
    }

    pub fn state(&self) -> &TelemetryState {
        &self.state
    }

    pub fn heading_source(&self) -> HeadingSource {
        self.source
    }

    pub fn yaw_bias_deg(&self) -> Option<f64> {
        self.yaw_bias_deg
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Forget everything, including the active system (disconnect).
    pub fn reset(&mut self) {
        self.state = TelemetryState::default();
        self.active_system = None;
        self.reset_heading();
    }

    fn reset_heading(&mut self) {
        self.filter.reset();
        self.source = HeadingSource::None;
        self.yaw_bias_deg = None;
        self.last_attitude_yaw_deg = None;
        self.last_gps_course_us = None;
        self.last_air_data_us = None;
    }

    fn on_heartbeat(&mut self, msg: &DecodedMessage) -> bool {
        let Ok(heartbeat) = Heartbeat::decode(msg) else {
            return false;
        };
        if msg.component_id != AUTOPILOT_COMPONENT_ID {
            return false;
        }
        let active = *self.active_system.get_or_insert(msg.system_id);
        if msg.system_id != active {
            return false;
        }

        let class = VehicleClass::from_mav_type(heartbeat.vehicle_type);
        if self.state.vehicle_class != Some(class) {
            self.reset_heading();
            self.state.vehicle_class = Some(class);
        }
        self.state.armed = heartbeat.is_armed();
        self.state.mode = mode_label(class, heartbeat.custom_mode);
        true
    }

    fn on_attitude(&mut self, msg: &DecodedMessage, now_us: u64) -> bool {
        let Ok(attitude) = Attitude::decode(msg) else {
            return false;
        };
        let roll = rad_to_deg(f64::from(attitude.roll));
        let pitch = rad_to_deg(f64::from(attitude.pitch));
        if self.config.swap_roll_pitch {
            self.state.roll_deg = pitch * self.config.roll_sign;
            self.state.pitch_deg = roll * self.config.pitch_sign;
        } else {
            self.state.roll_deg = roll * self.config.roll_sign;
            self.state.pitch_deg = pitch * self.config.pitch_sign;
        }

        let yaw = rad_to_deg(f64::from(attitude.yaw));
        self.last_attitude_yaw_deg = (!yaw.is_nan()).then_some(yaw);

        if !yaw.is_nan() && !self.reference_is_fresh(now_us) {
            let heading = wrap_360(self.yaw_bias_deg.unwrap_or(0.0) + yaw);
            self.state.heading_deg = self.smooth(heading, now_us);
            self.source = HeadingSource::AttitudeYaw;
        }
        true
    }

    fn on_local_position(&mut self, msg: &DecodedMessage) -> bool {
        let Ok(local) = LocalPositionNed::decode(msg) else {
            return false;
        };
        let (vx, vy) = (f64::from(local.vx), f64::from(local.vy));
        if self.groundspeed_unset() {
            self.state.groundspeed = libm::sqrt(vx * vx + vy * vy);
        }
        true
    }

    fn on_global_position(&mut self, msg: &DecodedMessage, now_us: u64) -> bool {
        let Ok(position) = GlobalPositionInt::decode(msg) else {
            return false;
        };
        self.state.lat = f64::from(position.lat_e7) / 1e7;
        self.state.lon = f64::from(position.lon_e7) / 1e7;
        if self.state.altitude.is_nan() || self.state.altitude == 0.0 {
            self.state.altitude = f64::from(position.alt_mm) / 1000.0;
        }
        if self.groundspeed_unset() {
            let (vx, vy) = (f64::from(position.vx), f64::from(position.vy));
            self.state.groundspeed = libm::sqrt(vx * vx + vy * vy) / 100.0;
        }

        let Some(course) = position.course_deg() else {
            return true;
        };
        let course = wrap_360(course);
        let fast = self.state.groundspeed >= self.config.gps_min_groundspeed;
        let air_data_fresh = within(self.last_air_data_us, now_us, self.config.air_data_fresh_s);

        if fast && !air_data_fresh {
            self.state.heading_deg = self.smooth(course, now_us);
            self.source = HeadingSource::GpsCourse;
            self.last_gps_course_us = Some(now_us);
            self.calibrate_bias(course);
        } else if self.source == HeadingSource::GpsCourse
            && (fast || within(self.last_gps_course_us, now_us, self.config.gps_hold_s))
        {
            self.state.heading_deg = self.smooth(course, now_us);
            if fast {
                self.last_gps_course_us = Some(now_us);
            }
        }
        true
    }

    fn on_gps_raw(&mut self, msg: &DecodedMessage) -> bool {
        let Ok(gps) = GpsRawInt::decode(msg) else {
            return false;
        };
        if gps.satellites_visible != u8::MAX {
            self.state.satellites = gps.satellites_visible;
        }
        true
    }

    fn on_sys_status(&mut self, msg: &DecodedMessage) -> bool {
        let Ok(status) = SysStatus::decode(msg) else {
            return false;
        };
        if let Some(volts) = status.voltage_volts() {
            self.state.battery_volts = volts;
        }
        true
    }

    fn on_vfr_hud(&mut self, msg: &DecodedMessage, now_us: u64) -> bool {
        let Ok(hud) = VfrHud::decode(msg) else {
            return false;
        };
        self.state.airspeed = f64::from(hud.airspeed);
        self.state.groundspeed = f64::from(hud.groundspeed);
        self.state.altitude = f64::from(hud.alt);

        if hud.heading >= 0 {
            let heading = wrap_360(f64::from(hud.heading));
            self.state.heading_deg = self.smooth(heading, now_us);
            self.source = HeadingSource::AirData;
            self.last_air_data_us = Some(now_us);
            self.calibrate_bias(heading);
        }
        true
    }

    /// A reference source is active and has reported recently enough to
    /// outrank attitude yaw.
    fn reference_is_fresh(&self, now_us: u64) -> bool {
        match self.source {
            HeadingSource::AirData => {
                within(self.last_air_data_us, now_us, self.config.air_data_fresh_s)
            }
            HeadingSource::GpsCourse => {
                within(self.last_gps_course_us, now_us, self.config.gps_hold_s)
            }
            HeadingSource::None | HeadingSource::AttitudeYaw => false,
        }
    }

    fn smooth(&mut self, heading: f64, now_us: u64) -> f64 {
        let offset = wrap_360(heading + self.config.heading_offset_deg);
        self.filter.apply(offset, now_us)
    }

    fn calibrate_bias(&mut self, reference_deg: f64) {
        let Some(yaw) = self.last_attitude_yaw_deg else {
            return;
        };
        let target = wrap_180(reference_deg - yaw);
        self.yaw_bias_deg = Some(match self.yaw_bias_deg {
            None => target,
            Some(bias) => bias + self.config.bias_alpha * wrap_180(target - bias),
        });
    }

    fn groundspeed_unset(&self) -> bool {
        self.state.groundspeed.is_nan() || self.state.groundspeed <= 0.0
    }

    fn apply_guards(&mut self) {
        let state = &mut self.state;
        if state.groundspeed.is_nan() || state.groundspeed < 0.0 {
            state.groundspeed = 0.0;
        }
        if state.airspeed.is_nan() || state.airspeed < 0.0 {
            state.airspeed = 0.0;
        }
        if state.altitude.is_nan() {
            state.altitude = 0.0;
        }
        if state.battery_volts.is_nan() {
            state.battery_volts = 0.0;
        }
        if state.heading_deg.is_nan() {
            state.heading_deg = self.filter.current().unwrap_or(0.0);
        }
    }
}

fn within(since_us: Option<u64>, now_us: u64, window_s: f64) -> bool {
    since_us.map_or(false, |t| (now_us.saturating_sub(t) as f64) <= window_s * 1e6)
}
