//! groundlink_core - Pure no_std logic for the groundlink ground station
//!
//! This crate contains the platform-agnostic half of the link: the wire
//! codec, target discovery, parameter bookkeeping and telemetry fusion.
//! Everything here can be tested on host without an async runtime.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **no_std + alloc**: Heap use is limited to `alloc` collections
//! - **Trait abstractions**: Clocks are injected via [`traits::TimeSource`]
//!
//! # Modules
//!
//! - [`protocol`]: Checksum engine, frame codec and typed payload views
//! - [`target`]: Vehicle discovery and target lock
//! - [`params`]: Parameter records, download bookkeeping and echo matching
//! - [`navigation`]: Angle helpers and the slew-limited heading filter
//! - [`telemetry`]: Fused telemetry state and flight-mode tables
//! - [`traits`]: Platform-agnostic trait abstractions (TimeSource)

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod navigation;
pub mod params;
pub mod protocol;
pub mod target;
pub mod telemetry;
pub mod traits;
