//! Parameter table support
//!
//! - [`types`]: parameter names, value types and records
//! - [`sync`]: full-table download bookkeeping
//! - [`write`]: echo verification for single-parameter writes

pub mod sync;
pub mod types;
pub mod write;

pub use sync::{ParamSync, ParamSyncOutcome, RetryDecision, SyncProgress};
pub use types::{normalize_name, ParamEcho, ParamName, ParamRecord, ParamType, PARAM_NAME_LEN};
pub use write::{backoff_ms, echo_matches, EchoFailure, ECHO_TOLERANCE};
