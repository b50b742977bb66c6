//! Outbound frame writer
//!
//! Owns the sender identity and the 8-bit sequence counter. Encoding
//! happens under a short std mutex that is released before the transport
//! write is awaited, so frames from concurrent callers get distinct
//! sequence numbers but may reach the wire in either order.

use std::sync::{Arc, Mutex, PoisonError};

use groundlink_core::protocol::messages::OutboundMessage;
use groundlink_core::protocol::{encode_v2, SequenceCounter};
use log::trace;

use super::transport::Transport;
use crate::error::LinkError;

pub struct FrameSender {
    transport: Arc<dyn Transport>,
    system_id: u8,
    component_id: u8,
    sequence: Mutex<SequenceCounter>,
}

impl FrameSender {
    pub fn new(transport: Arc<dyn Transport>, system_id: u8, component_id: u8) -> Self {
        Self {
            transport,
            system_id,
            component_id,
            sequence: Mutex::new(SequenceCounter::new()),
        }
    }

    /// Frame `msg` and consume one sequence number.
    pub fn encode<M: OutboundMessage>(&self, msg: &M) -> Result<Vec<u8>, LinkError> {
        let payload = msg.payload();
        let mut sequence = self.sequence.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(encode_v2(
            M::KIND.id(),
            self.system_id,
            self.component_id,
            &payload,
            &mut sequence,
        )?)
    }

    pub async fn send<M: OutboundMessage>(&self, msg: &M) -> Result<(), LinkError> {
        let frame = self.encode(msg)?;
        trace!("tx {:?} ({} bytes)", M::KIND, frame.len());
        self.transport.send(&frame).await?;
        Ok(())
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}
