//! Core traits for platform-agnostic link functionality.
//!
//! These traits decouple the fusion and bookkeeping logic from the host
//! runtime so it can be driven by a controllable clock in tests.
//!
//! # Design
//!
//! - Trait definitions are pure and have no feature gates
//! - Mock implementations are always available for host testing
//! - Runtime implementations (tokio) live in the host crate

pub mod time;

pub use time::{MockTime, TimeSource};
