//! Slew-limited heading EMA filter
//!
//! Smooths heading readings from any source before they reach the
//! telemetry snapshot. The step towards a new reading follows the shortest
//! path around the circle and is capped by a maximum turn rate, so a
//! source switch cannot make the displayed heading jump.

use super::geo::{wrap_180, wrap_360};

/// Floor on the time step, so back-to-back updates still move a little.
const MIN_DT_S: f64 = 1e-3;

/// Exponential moving average filter for heading values.
///
/// Handles angle wrapping correctly (e.g., 350° → 10° transitions)
/// using shortest-path interpolation.
///
/// # Configuration
/// - `alpha = 1.0`: no smoothing, only the slew limit applies
/// - `alpha = 0.48`: default
/// - `max_slew_deg_per_s`: largest change per second of elapsed time
#[derive(Debug, Clone)]
pub struct HeadingFilter {
    alpha: f64,
    max_slew_deg_per_s: f64,
    prev_heading: Option<f64>,
    last_update_us: u64,
}

impl HeadingFilter {
    /// Alpha is clamped to [0.0, 1.0]. Lower alpha = more smoothing.
    pub fn new(alpha: f64, max_slew_deg_per_s: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            max_slew_deg_per_s: max_slew_deg_per_s.max(0.0),
            prev_heading: None,
            last_update_us: 0,
        }
    }

    /// Apply the filter to a raw heading (degrees) observed at `now_us`.
    ///
    /// Returns the smoothed heading in [0, 360). The first call returns the
    /// raw heading unchanged.
    pub fn apply(&mut self, heading: f64, now_us: u64) -> f64 {
        let heading = wrap_360(heading);
        let smoothed = match self.prev_heading {
            None => heading,
            Some(prev) => {
                let dt = (now_us.saturating_sub(self.last_update_us) as f64 / 1e6).max(MIN_DT_S);
                let max_step = self.max_slew_deg_per_s * dt;
                let diff = wrap_180(heading - prev).clamp(-max_step, max_step);
                wrap_360(prev + self.alpha * diff)
            }
        };
        self.prev_heading = Some(smoothed);
        self.last_update_us = now_us;
        smoothed
    }

    /// Last smoothed heading, if any.
    pub fn current(&self) -> Option<f64> {
        self.prev_heading
    }

    /// Reset the filter state, clearing the previous heading.
    pub fn reset(&mut self) {
        self.prev_heading = None;
        self.last_update_us = 0;
    }
}
