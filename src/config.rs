//! Link configuration
//!
//! Every timing constant of the link lives here with its default. A TOML
//! file may override any subset:
//!
//! ```toml
//! expected_vehicle_type = 2
//!
//! [param_write]
//! echo_timeout_ms = 2200
//!
//! [fusion]
//! heading_offset_deg = -3.5
//!
//! [serial]
//! baud = 57600
//! ```

use std::path::Path;
use std::time::Duration;

use groundlink_core::telemetry::FusionConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Sender identity of a ground control station.
pub const GCS_SYSTEM_ID: u8 = 255;
pub const GCS_COMPONENT_ID: u8 = 190;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// System id written into outbound frames
    pub system_id: u8,
    /// Component id written into outbound frames
    pub component_id: u8,
    /// `MAV_TYPE` that a heartbeat must carry to lock the target
    pub expected_vehicle_type: u8,
    /// Capacity of the broadcast event channel
    pub event_capacity: usize,
    pub param_sync: ParamSyncSettings,
    pub param_write: ParamWriteSettings,
    pub fusion: FusionSettings,
    pub serial: SerialSettings,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            system_id: GCS_SYSTEM_ID,
            component_id: GCS_COMPONENT_ID,
            expected_vehicle_type: 1,
            event_capacity: 1024,
            param_sync: ParamSyncSettings::default(),
            param_write: ParamWriteSettings::default(),
            fusion: FusionSettings::default(),
            serial: SerialSettings::default(),
        }
    }
}

impl LinkConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.param_write.attempts == 0 {
            return Err(ConfigError::Invalid("param_write.attempts must be at least 1".into()));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid("event_capacity must be at least 1".into()));
        }
        if self.serial.baud == 0 {
            return Err(ConfigError::Invalid("serial.baud must be positive".into()));
        }
        Ok(())
    }
}

/// Full-table download timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamSyncSettings {
    /// How long a request waits for a target lock before using the fallback
    pub lock_wait_ms: u64,
    /// Delay between retry rounds
    pub retry_interval_ms: u64,
    /// Resend rounds while nothing has arrived
    pub retries: u32,
    /// Silence after which a partial download is ended
    pub grace_ms: u64,
    /// Delay between the last index arriving and the completion signal
    pub debounce_ms: u64,
}

impl Default for ParamSyncSettings {
    fn default() -> Self {
        Self {
            lock_wait_ms: 400,
            retry_interval_ms: 1500,
            retries: 3,
            grace_ms: 1000,
            debounce_ms: 150,
        }
    }
}

impl ParamSyncSettings {
    pub fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_wait_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Single-parameter write timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamWriteSettings {
    /// Wait for the echo of one attempt
    pub echo_timeout_ms: u64,
    /// Send+wait cycles before giving up
    pub attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_step_ms: u64,
}

impl Default for ParamWriteSettings {
    fn default() -> Self {
        Self {
            echo_timeout_ms: 1500,
            attempts: 3,
            backoff_base_ms: 200,
            backoff_step_ms: 200,
        }
    }
}

impl ParamWriteSettings {
    pub fn echo_timeout(&self) -> Duration {
        Duration::from_millis(self.echo_timeout_ms)
    }
}

/// Serial device line settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    pub baud: u32,
    /// Blocking read slice; an idle line is polled again after this long
    pub read_timeout_ms: u64,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud: 115_200,
            read_timeout_ms: 100,
        }
    }
}

impl SerialSettings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Serialisable mirror of [`FusionConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionSettings {
    pub swap_roll_pitch: bool,
    pub roll_sign: f64,
    pub pitch_sign: f64,
    pub heading_alpha: f64,
    pub max_slew_deg_per_s: f64,
    pub bias_alpha: f64,
    pub gps_min_groundspeed: f64,
    pub air_data_fresh_s: f64,
    pub gps_hold_s: f64,
    pub heading_offset_deg: f64,
}

impl Default for FusionSettings {
    fn default() -> Self {
        FusionConfig::default().into()
    }
}

impl From<FusionConfig> for FusionSettings {
    fn from(c: FusionConfig) -> Self {
        Self {
            swap_roll_pitch: c.swap_roll_pitch,
            roll_sign: c.roll_sign,
            pitch_sign: c.pitch_sign,
            heading_alpha: c.heading_alpha,
            max_slew_deg_per_s: c.max_slew_deg_per_s,
            bias_alpha: c.bias_alpha,
            gps_min_groundspeed: c.gps_min_groundspeed,
            air_data_fresh_s: c.air_data_fresh_s,
            gps_hold_s: c.gps_hold_s,
            heading_offset_deg: c.heading_offset_deg,
        }
    }
}

impl From<&FusionSettings> for FusionConfig {
    fn from(s: &FusionSettings) -> Self {
        Self {
            swap_roll_pitch: s.swap_roll_pitch,
            roll_sign: s.roll_sign,
            pitch_sign: s.pitch_sign,
            heading_alpha: s.heading_alpha,
            max_slew_deg_per_s: s.max_slew_deg_per_s,
            bias_alpha: s.bias_alpha,
            gps_min_groundspeed: s.gps_min_groundspeed,
            air_data_fresh_s: s.air_data_fresh_s,
            gps_hold_s: s.gps_hold_s,
            heading_offset_deg: s.heading_offset_deg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.system_id, 255);
        assert_eq!(config.component_id, 190);
        assert_eq!(config.expected_vehicle_type, 1);
        assert_eq!(config.param_sync.retry_interval(), Duration::from_millis(1500));
        assert_eq!(config.param_write.attempts, 3);
        assert_eq!(config.fusion.heading_alpha, 0.48);
        assert_eq!(config.serial.baud, 115_200);
    }

    #[test]
    fn test_serial_baud_override_and_zero_rejected() {
        let config = LinkConfig::from_toml_str("[serial]\nbaud = 57600").unwrap();
        assert_eq!(config.serial.baud, 57_600);
        assert_eq!(config.serial.read_timeout(), Duration::from_millis(100));

        let err = LinkConfig::from_toml_str("[serial]\nbaud = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = LinkConfig::from_toml_str(
            r#"
            expected_vehicle_type = 2

            [param_write]
            echo_timeout_ms = 2200

            [fusion]
            heading_offset_deg = -3.5
            "#,
        )
        .unwrap();
        assert_eq!(config.expected_vehicle_type, 2);
        assert_eq!(config.param_write.echo_timeout(), Duration::from_millis(2200));
        assert_eq!(config.param_write.attempts, 3);
        assert_eq!(config.fusion.heading_offset_deg, -3.5);
        assert_eq!(config.fusion.max_slew_deg_per_s, 540.0);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(LinkConfig::from_toml_str("").unwrap(), LinkConfig::default());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = LinkConfig::from_toml_str("[param_write]\nattempts = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = LinkConfig::from_toml_str("system_id = \"abc\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_fusion_settings_convert() {
        let settings = FusionSettings {
            swap_roll_pitch: true,
            ..FusionSettings::default()
        };
        let config = FusionConfig::from(&settings);
        assert!(config.swap_roll_pitch);
        assert_eq!(config.bias_alpha, 0.25);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = LinkConfig::load("/nonexistent/groundlink.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
