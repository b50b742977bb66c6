//! Parameter protocol, ground-station side
//!
//! # Full-table download ([`ParamSyncEngine`])
//!
//! ```text
//! request_all ──> PARAM_REQUEST_LIST ──> supervisor
//!                                         │ every retry_interval, up to `retries` rounds:
//!                                         │   nothing arrived  -> resend
//!                                         │   values arriving  -> stop resending
//!                                         │ then every grace period:
//!                                         │   silent for grace -> force-complete (Partial / NoResponse)
//! PARAM_VALUE (last index) ──> debounce ──> ParamSyncFinished(Complete)
//! ```
//!
//! Every timer re-checks the download generation under the shared lock, so
//! a finished or superseded download is never reported twice.
//!
//! # Single writes ([`ParamWriteCoordinator`])
//!
//! Register a waiter, send PARAM_SET, wait for the echo. Timeouts and
//! mismatching echoes are retried with a growing backoff.

use std::sync::Arc;
use std::time::Duration;

use groundlink_core::params::{
    backoff_ms, echo_matches, normalize_name, EchoFailure, ParamEcho, ParamRecord, ParamType,
    RetryDecision, SyncProgress,
};
use groundlink_core::protocol::messages::{param_id_bytes, ParamRequestList, ParamSet, ParamValue};
use groundlink_core::protocol::DecodedMessage;
use groundlink_core::target::TargetIdentity;
use groundlink_core::traits::TimeSource;
use log::{debug, info, trace, warn};
use tokio::time::{sleep, timeout};

use crate::communication::mavlink::link::{LinkContext, LinkEvent};
use crate::error::ParamWriteError;

pub struct ParamSyncEngine {
    ctx: Arc<LinkContext>,
}

impl ParamSyncEngine {
    pub(crate) fn new(ctx: Arc<LinkContext>) -> Self {
        Self { ctx }
    }

    /// Start a download unless one is already running.
    ///
    /// Waits briefly for a target lock so the request is addressed to the
    /// real vehicle rather than the fallback identity.
    pub async fn request_all(&self) -> bool {
        let Some(generation) = self.ctx.lock().param_sync.begin() else {
            debug!("Parameter download already in progress");
            return false;
        };

        let target = self
            .ctx
            .wait_for_target(self.ctx.config.param_sync.lock_wait())
            .await;
        info!(
            "Requesting parameter list from {}/{}",
            target.system_id, target.component_id
        );
        send_request_list(&self.ctx, target).await;

        let ctx = Arc::clone(&self.ctx);
        self.ctx.spawn(supervise(ctx, generation));
        true
    }
}

async fn send_request_list(ctx: &LinkContext, target: TargetIdentity) {
    let request = ParamRequestList {
        target_system: target.system_id,
        target_component: target.component_id,
    };
    if let Err(err) = ctx.sender.send(&request).await {
        warn!("PARAM_REQUEST_LIST send failed: {err}");
    }
}

async fn supervise(ctx: Arc<LinkContext>, generation: u64) {
    let settings = ctx.config.param_sync.clone();

    for round in 1..=settings.retries {
        sleep(settings.retry_interval()).await;
        let decision = ctx.lock().param_sync.retry_decision(generation);
        match decision {
            RetryDecision::Stop => return,
            RetryDecision::DataFlowing => break,
            RetryDecision::Resend => {
                warn!(
                    "No parameters received, resending list request ({round}/{})",
                    settings.retries
                );
                let target = ctx.lock().target.resolve();
                send_request_list(&ctx, target).await;
            }
        }
    }

    let grace_us = settings.grace_ms.saturating_mul(1000);
    loop {
        sleep(settings.grace()).await;
        let outcome = {
            let mut shared = ctx.lock();
            let sync = &mut shared.param_sync;
            if sync.retry_decision(generation) == RetryDecision::Stop {
                return;
            }
            let now_us = ctx.clock.now_us();
            let stalled = sync
                .last_received_at_us()
                .map_or(true, |at| now_us.saturating_sub(at) >= grace_us);
            if !stalled {
                continue;
            }
            sync.force_complete(generation)
        };
        if let Some(outcome) = outcome {
            warn!("Parameter download ended early: {outcome:?}");
            ctx.emit(LinkEvent::ParamSyncFinished(outcome));
        }
        return;
    }
}

/// PARAM_VALUE from the vehicle: cache, publish, resolve writers, count.
pub(crate) fn on_param_value(ctx: &Arc<LinkContext>, msg: &DecodedMessage) {
    let value = match ParamValue::decode(msg) {
        Ok(value) => value,
        Err(err) => {
            debug!("Dropping PARAM_VALUE: {err}");
            return;
        }
    };
    let record = ParamRecord {
        name: value.name.clone(),
        value: value.value,
        param_type: value.param_type,
        index: value.index,
        count: value.count,
    };
    let echo = ParamEcho {
        value: value.value,
        param_type: value.param_type,
    };

    let now_us = ctx.clock.now_us();
    let progress = {
        let mut shared = ctx.lock();
        shared
            .params
            .insert(record.name.as_str().to_string(), record.clone());
        let resolved = shared.waiters.resolve(&record.name, echo);
        if resolved > 0 {
            trace!("{} resolved {resolved} waiter(s)", record.name);
        }
        shared.param_sync.on_value(&value, now_us)
    };
    ctx.emit(LinkEvent::Param(record));

    match progress {
        SyncProgress::Complete { generation } => {
            let task_ctx = Arc::clone(ctx);
            ctx.spawn(async move {
                sleep(task_ctx.config.param_sync.debounce()).await;
                let outcome = task_ctx.lock().param_sync.take_completion(generation);
                if let Some(outcome) = outcome {
                    info!("Parameter download complete: {outcome:?}");
                    task_ctx.emit(LinkEvent::ParamSyncFinished(outcome));
                }
            });
        }
        SyncProgress::OutOfRange { index } => {
            debug!("Ignoring parameter index {index} outside declared count");
        }
        SyncProgress::Progress { received, declared } => {
            trace!("Parameters {received}/{declared:?}");
        }
        SyncProgress::Idle => {}
    }
}

pub struct ParamWriteCoordinator {
    ctx: Arc<LinkContext>,
}

impl ParamWriteCoordinator {
    pub(crate) fn new(ctx: Arc<LinkContext>) -> Self {
        Self { ctx }
    }

    /// Write `name` and wait until the vehicle echoes a matching value.
    ///
    /// Returns the echo, whose type may differ from `param_type` when the
    /// vehicle normalizes it.
    pub async fn set_param(
        &self,
        name: &str,
        value: f32,
        param_type: ParamType,
    ) -> Result<ParamEcho, ParamWriteError> {
        let name = normalize_name(name);
        if param_id_bytes(name).is_err() {
            return Err(ParamWriteError::InvalidName(name.to_string()));
        }
        let settings = &self.ctx.config.param_write;

        let mut last = EchoFailure::Timeout;
        for attempt in 1..=settings.attempts {
            // The table refuses waiters once teardown has run
            let (rx, target) = {
                let mut shared = self.ctx.lock();
                let Some(rx) = shared.waiters.register(name) else {
                    return Err(ParamWriteError::LinkClosed);
                };
                (rx, shared.target.resolve())
            };
            let request = ParamSet::new(
                target.system_id,
                target.component_id,
                name,
                value,
                param_type,
            )
            .map_err(|_| ParamWriteError::InvalidName(name.to_string()))?;
            debug!("PARAM_SET {name} = {value} (attempt {attempt}/{})", settings.attempts);

            if let Err(err) = self.ctx.sender.send(&request).await {
                drop(rx);
                self.ctx.lock().waiters.prune(name);
                return Err(err.into());
            }

            match timeout(settings.echo_timeout(), rx).await {
                Ok(Ok(echo)) if echo_matches(value, param_type, echo.value) => {
                    info!("{name} set to {}", echo.value);
                    return Ok(echo);
                }
                Ok(Ok(echo)) => {
                    warn!("{name}: vehicle echoed {} instead of {value}", echo.value);
                    last = EchoFailure::Mismatch {
                        requested: value,
                        echoed: echo.value,
                    };
                }
                Ok(Err(_)) => return Err(ParamWriteError::LinkClosed),
                Err(_) => {
                    warn!("{name}: no echo within {:?}", settings.echo_timeout());
                    last = EchoFailure::Timeout;
                    self.ctx.lock().waiters.prune(name);
                }
            }

            if attempt < settings.attempts {
                let delay = backoff_ms(settings.backoff_base_ms, settings.backoff_step_ms, attempt);
                sleep(Duration::from_millis(delay)).await;
            }
        }

        warn!("{name}: write failed after {} attempts ({last})", settings.attempts);
        Err(ParamWriteError::Exhausted {
            name: name.to_string(),
            attempts: settings.attempts,
            last,
        })
    }
}
