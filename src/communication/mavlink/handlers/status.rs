//! COMMAND_ACK and STATUSTEXT handling
//!
//! Both are logged and republished on the event channel. STATUSTEXT
//! severities (`MAV_SEVERITY`, 0 = emergency .. 7 = debug) map onto log
//! levels.

use groundlink_core::protocol::messages::{CommandAck, StatusText};
use groundlink_core::protocol::DecodedMessage;
use log::{debug, info, log, warn, Level};

use crate::communication::mavlink::link::{LinkContext, LinkEvent};

/// `MAV_RESULT` names, indexed by result code.
const RESULT_NAMES: [&str; 10] = [
    "ACCEPTED",
    "TEMPORARILY_REJECTED",
    "DENIED",
    "UNSUPPORTED",
    "FAILED",
    "IN_PROGRESS",
    "CANCELLED",
    "COMMAND_LONG_ONLY",
    "COMMAND_INT_ONLY",
    "COMMAND_UNSUPPORTED_MAV_FRAME",
];

pub fn result_name(result: u8) -> &'static str {
    RESULT_NAMES
        .get(usize::from(result))
        .copied()
        .unwrap_or("UNKNOWN")
}

pub fn severity_level(severity: u8) -> Level {
    match severity {
        0..=3 => Level::Error,
        4 => Level::Warn,
        5 | 6 => Level::Info,
        _ => Level::Debug,
    }
}

pub(crate) fn on_command_ack(ctx: &LinkContext, msg: &DecodedMessage) {
    let ack = match CommandAck::decode(msg) {
        Ok(ack) => ack,
        Err(err) => {
            debug!("Dropping COMMAND_ACK: {err}");
            return;
        }
    };
    if ack.accepted() {
        info!("Command {} accepted", ack.command);
    } else {
        warn!("Command {} {}", ack.command, result_name(ack.result));
    }
    ctx.emit(LinkEvent::CommandAck(ack));
}

pub(crate) fn on_status_text(ctx: &LinkContext, msg: &DecodedMessage) {
    let status = match StatusText::decode(msg) {
        Ok(status) => status,
        Err(err) => {
            debug!("Dropping STATUSTEXT: {err}");
            return;
        }
    };
    log!(
        severity_level(status.severity),
        "[{}/{}] {}",
        msg.system_id,
        msg.component_id,
        status.text
    );
    ctx.emit(LinkEvent::StatusText {
        severity: status.severity,
        text: status.text.as_str().to_string(),
    });
}
