//! Telemetry fusion glue
//!
//! Feeds each message into the link's [`TelemetryFusion`] and publishes a
//! fresh snapshot on the telemetry watch channel whenever the state
//! changed.
//!
//! [`TelemetryFusion`]: groundlink_core::telemetry::TelemetryFusion

use std::sync::PoisonError;

use groundlink_core::protocol::DecodedMessage;
use groundlink_core::traits::TimeSource;
use tokio::time::Instant;

use crate::communication::mavlink::link::LinkContext;

/// [`TimeSource`] backed by the tokio clock, so paused-time tests drive
/// fusion freshness windows and parameter activity timestamps.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for TokioClock {
    fn now_us(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

pub(crate) fn on_message(ctx: &LinkContext, msg: &DecodedMessage) {
    let snapshot = {
        let mut fusion = ctx.fusion.lock().unwrap_or_else(PoisonError::into_inner);
        if !fusion.update(msg) {
            return;
        }
        fusion.state().clone()
    };
    ctx.telemetry_tx.send_replace(snapshot);
}
