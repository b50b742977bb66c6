//! Angle helpers and heading smoothing

pub mod geo;
pub mod heading_filter;

pub use geo::{deg_to_rad, rad_to_deg, wrap_180, wrap_360};
pub use heading_filter::HeadingFilter;
