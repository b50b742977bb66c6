//! Angle normalisation and unit conversion

use core::f64::consts::PI;

/// Normalise an angle to [-180, 180).
pub fn wrap_180(deg: f64) -> f64 {
    let wrapped = (deg + 180.0) % 360.0;
    let wrapped = if wrapped < 0.0 { wrapped + 360.0 } else { wrapped };
    wrapped - 180.0
}

/// Normalise an angle to [0, 360).
pub fn wrap_360(deg: f64) -> f64 {
    let wrapped = deg % 360.0;
    let wrapped = if wrapped < 0.0 { wrapped + 360.0 } else { wrapped };
    // -1e-15 % 360 + 360 rounds to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad * (180.0 / PI)
}

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * (PI / 180.0)
}
