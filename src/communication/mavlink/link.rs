//! Per-connection link service
//!
//! [`Link::start`] spawns one reader task that pulls bytes from the
//! transport, decodes frames and runs every handler synchronously per
//! message. The returned [`Link`] is a cheap `Clone` handle; all clones
//! share one [`LinkContext`].
//!
//! # Lifecycle
//!
//! ```text
//! start ──> Running ──(shutdown | end of stream | transport error)──> Closed
//! ```
//!
//! Closing aborts the reader and every timer task, resolves pending
//! parameter writes with `LinkClosed`, resets the target lock, emits
//! [`LinkEvent::Closed`] and then closes the event channel. Dropping the
//! last handle has the same effect on tasks.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use groundlink_core::params::{ParamEcho, ParamRecord, ParamSyncOutcome, ParamType};
use groundlink_core::protocol::messages::{CommandAck, ParamRequestRead};
use groundlink_core::protocol::{DecoderStats, FrameDecoder};
use groundlink_core::target::TargetIdentity;
use groundlink_core::telemetry::{TelemetryFusion, TelemetryState};
use log::{debug, info, warn};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use super::dispatcher;
use super::handlers::{FlightCommands, ParamSyncEngine, ParamWriteCoordinator, TokioClock};
use super::sender::FrameSender;
use super::state::SharedState;
use super::transport::Transport;
use crate::config::LinkConfig;
use crate::error::{LinkError, ParamWriteError};

/// Bytes requested from the transport per read.
const READ_CHUNK: usize = 1024;

/// Notifications published by the link.
#[derive(Debug, Clone)]
pub enum LinkEvent {
    /// A vehicle of the expected type was discovered
    TargetLocked(TargetIdentity),
    /// Any PARAM_VALUE, published as soon as it is decoded
    Param(ParamRecord),
    /// Once per full-table download
    ParamSyncFinished(ParamSyncOutcome),
    CommandAck(CommandAck),
    StatusText { severity: u8, text: String },
    Closed { reason: CloseReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    Shutdown,
    EndOfStream,
    Transport(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::Shutdown => write!(f, "shutdown requested"),
            CloseReason::EndOfStream => write!(f, "transport reached end of stream"),
            CloseReason::Transport(err) => write!(f, "transport failed: {err}"),
        }
    }
}

/// State shared by the reader task, timer tasks and every [`Link`] handle.
pub struct LinkContext {
    pub(crate) config: LinkConfig,
    pub(crate) sender: FrameSender,
    pub(crate) clock: TokioClock,
    shared: Mutex<SharedState>,
    pub(crate) fusion: Mutex<TelemetryFusion<TokioClock>>,
    pub(crate) telemetry_tx: watch::Sender<TelemetryState>,
    pub(crate) target_tx: watch::Sender<Option<TargetIdentity>>,
    events: Mutex<Option<broadcast::Sender<LinkEvent>>>,
    stats: Mutex<DecoderStats>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    closed: AtomicBool,
    closed_tx: watch::Sender<bool>,
}

impl LinkContext {
    fn new(transport: Arc<dyn Transport>, config: LinkConfig) -> Self {
        let clock = TokioClock::new();
        let fusion = TelemetryFusion::new((&config.fusion).into(), clock);
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            sender: FrameSender::new(transport, config.system_id, config.component_id),
            shared: Mutex::new(SharedState::new(config.expected_vehicle_type)),
            fusion: Mutex::new(fusion),
            telemetry_tx: watch::Sender::new(TelemetryState::default()),
            target_tx: watch::Sender::new(None),
            events: Mutex::new(Some(events)),
            stats: Mutex::new(DecoderStats::default()),
            tasks: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            closed_tx: watch::Sender::new(false),
            clock,
            config,
        }
    }

    /// The single shared lock. Never hold the guard across `.await`.
    pub(crate) fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn emit(&self, event: LinkEvent) {
        let events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tx) = events.as_ref() {
            // No subscribers is fine
            let _ = tx.send(event);
        }
    }

    /// Spawn a task that is aborted when the link closes.
    pub(crate) fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_closed() {
            return;
        }
        tasks.retain(|handle| !handle.is_finished());
        tasks.push(tokio::spawn(task));
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Wait until a target is locked, at most `wait`, then resolve.
    pub(crate) async fn wait_for_target(&self, wait: Duration) -> TargetIdentity {
        let mut rx = self.target_tx.subscribe();
        if tokio::time::timeout(wait, rx.wait_for(Option::is_some))
            .await
            .is_err()
        {
            debug!("No target lock after {wait:?}, using fallback");
        }
        self.lock().target.resolve()
    }

    fn record_stats(&self, stats: DecoderStats) {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner) = stats;
    }

    fn close(&self, reason: CloseReason) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        match &reason {
            CloseReason::Transport(_) => warn!("Link closed: {reason}"),
            _ => info!("Link closed: {reason}"),
        }

        self.lock().teardown();
        self.target_tx.send_replace(None);
        self.emit(LinkEvent::Closed { reason });
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.closed_tx.send_replace(true);
        self.abort_tasks();
    }

    fn abort_tasks(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for handle in tasks.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for LinkContext {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

/// Handle to a running link.
#[derive(Clone)]
pub struct Link {
    ctx: Arc<LinkContext>,
}

impl Link {
    /// Start the reader task. Must be called inside a tokio runtime.
    pub fn start(transport: Arc<dyn Transport>, config: LinkConfig) -> Self {
        info!(
            "Starting {} link as {}/{}, expecting vehicle type {}",
            transport.kind(),
            config.system_id,
            config.component_id,
            config.expected_vehicle_type
        );
        let ctx = Arc::new(LinkContext::new(Arc::clone(&transport), config));
        ctx.spawn(run_reader(Arc::downgrade(&ctx), transport));
        Self { ctx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LinkEvent> {
        let events = self.ctx.events.lock().unwrap_or_else(PoisonError::into_inner);
        match events.as_ref() {
            Some(tx) => tx.subscribe(),
            // Closed link: hand out a receiver that reports Closed at once
            None => broadcast::channel(1).1,
        }
    }

    /// Latest fused telemetry snapshot.
    pub fn telemetry(&self) -> watch::Receiver<TelemetryState> {
        self.ctx.telemetry_tx.subscribe()
    }

    /// Locked target, `None` while unlocked.
    pub fn target(&self) -> Option<TargetIdentity> {
        self.ctx.lock().target.identity()
    }

    /// Identity outbound frames are currently addressed to.
    pub fn resolved_target(&self) -> TargetIdentity {
        self.ctx.lock().target.resolve()
    }

    pub fn target_updates(&self) -> watch::Receiver<Option<TargetIdentity>> {
        self.ctx.target_tx.subscribe()
    }

    /// Start a full parameter-table download.
    ///
    /// Returns `false` if a download is already running. The result is
    /// reported as [`LinkEvent::ParamSyncFinished`].
    pub async fn request_param_list(&self) -> bool {
        ParamSyncEngine::new(Arc::clone(&self.ctx)).request_all().await
    }

    /// Ask the vehicle to report one parameter.
    pub async fn request_param(&self, name: &str) -> Result<(), LinkError> {
        let target = self.resolved_target();
        let msg = ParamRequestRead::by_name(target.system_id, target.component_id, name)?;
        self.ctx.sender.send(&msg).await
    }

    /// Write one parameter and wait for the vehicle to confirm it.
    pub async fn set_param(
        &self,
        name: &str,
        value: f32,
        param_type: ParamType,
    ) -> Result<ParamEcho, ParamWriteError> {
        ParamWriteCoordinator::new(Arc::clone(&self.ctx))
            .set_param(name, value, param_type)
            .await
    }

    /// Last reported record for `name`.
    pub fn param(&self, name: &str) -> Option<ParamRecord> {
        self.ctx.lock().params.get(name.trim()).cloned()
    }

    /// Every record seen so far, sorted by name.
    pub fn params(&self) -> Vec<ParamRecord> {
        self.ctx.lock().params.values().cloned().collect()
    }

    pub fn commands(&self) -> FlightCommands {
        FlightCommands::new(Arc::clone(&self.ctx))
    }

    pub fn decoder_stats(&self) -> DecoderStats {
        *self.ctx.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &LinkConfig {
        &self.ctx.config
    }

    pub fn shutdown(&self) {
        self.ctx.close(CloseReason::Shutdown);
    }

    pub fn is_closed(&self) -> bool {
        self.ctx.is_closed()
    }

    /// Resolves once the link has closed for any reason.
    pub async fn closed(&self) {
        let mut rx = self.ctx.closed_tx.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

async fn run_reader(weak: Weak<LinkContext>, transport: Arc<dyn Transport>) {
    let mut decoder = FrameDecoder::new();
    let mut buf = vec![0u8; READ_CHUNK];

    let reason = loop {
        let result = transport.recv(&mut buf).await;
        let Some(ctx) = weak.upgrade() else {
            return;
        };
        match result {
            Ok(0) => break CloseReason::EndOfStream,
            Ok(n) => {
                let messages: Vec<_> = decoder.push(&buf[..n]).collect();
                ctx.record_stats(decoder.stats());
                for msg in &messages {
                    dispatcher::dispatch(&ctx, msg);
                }
            }
            Err(err) => break CloseReason::Transport(err.to_string()),
        }
    };

    if let Some(ctx) = weak.upgrade() {
        ctx.close(reason);
    }
}
