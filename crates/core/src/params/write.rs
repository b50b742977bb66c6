//! Echo verification for parameter writes
//!
//! A write is confirmed when the vehicle answers with a PARAM_VALUE for the
//! same name whose value matches the request. Integer parameters are
//! compared against the rounded request, since the vehicle stores them
//! truncated to an integer.

use super::types::ParamType;

/// Absolute tolerance for float comparisons.
pub const ECHO_TOLERANCE: f32 = 1e-3;

/// Tolerance between an integer echo and the rounded request.
const INTEGER_TOLERANCE: f32 = 0.5;

/// Why one write attempt failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EchoFailure {
    /// No echo within the attempt's timeout
    Timeout,
    /// The vehicle echoed a different value
    Mismatch { requested: f32, echoed: f32 },
}

impl core::fmt::Display for EchoFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EchoFailure::Timeout => write!(f, "no echo received"),
            EchoFailure::Mismatch { requested, echoed } => {
                write!(f, "echoed {} instead of {}", echoed, requested)
            }
        }
    }
}

/// Whether `echoed` confirms a write of `requested` with type `param_type`.
pub fn echo_matches(requested: f32, param_type: ParamType, echoed: f32) -> bool {
    if libm::fabsf(echoed - requested) <= ECHO_TOLERANCE {
        return true;
    }
    param_type.is_integer() && libm::fabsf(echoed - libm::roundf(requested)) <= INTEGER_TOLERANCE
}

/// Delay before retry number `attempt` (1-based): base + step x attempt.
pub fn backoff_ms(base_ms: u64, step_ms: u64, attempt: u32) -> u64 {
    base_ms.saturating_add(step_ms.saturating_mul(u64::from(attempt)))
}
