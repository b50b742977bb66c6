//! Message dispatcher
//!
//! Routes every decoded message to the handlers that consume it. Runs on
//! the reader task, synchronously, in arrival order:
//!
//! 1. Target lock (heartbeats)
//! 2. Kind-specific handler (parameters, command acks, status text)
//! 3. Telemetry fusion (every message; unknown kinds are ignored there)

use std::sync::Arc;

use groundlink_core::protocol::{DecodedMessage, MessageKind};
use log::{info, trace};

use super::handlers::{param, status, telemetry};
use super::link::{LinkContext, LinkEvent};

pub(crate) fn dispatch(ctx: &Arc<LinkContext>, msg: &DecodedMessage) {
    trace!(
        "rx id {} from {}/{} seq {} ({:?})",
        msg.message_id,
        msg.system_id,
        msg.component_id,
        msg.sequence,
        msg.version
    );

    let locked = ctx.lock().target.observe_heartbeat(msg);
    if let Some(identity) = locked {
        info!(
            "Target locked: system {} component {}",
            identity.system_id, identity.component_id
        );
        ctx.target_tx.send_replace(Some(identity));
        ctx.emit(LinkEvent::TargetLocked(identity));
    }

    match msg.kind() {
        Some(MessageKind::ParamValue) => param::on_param_value(ctx, msg),
        Some(MessageKind::CommandAck) => status::on_command_ack(ctx, msg),
        Some(MessageKind::StatusText) => status::on_status_text(ctx, msg),
        _ => {}
    }

    telemetry::on_message(ctx, msg);
}
