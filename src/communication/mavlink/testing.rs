//! Helpers for link tests: an in-memory vehicle on the other end of a
//! duplex stream.

use std::sync::Arc;

use groundlink_core::protocol::messages::OutboundMessage;
use groundlink_core::protocol::{encode_v2, DecodedMessage, FrameDecoder, MessageKind, SequenceCounter};
use tokio::io::{AsyncReadExt, DuplexStream};

use super::transport::StreamTransport;
use super::Link;
use crate::config::LinkConfig;

pub(crate) fn duplex_link(config: LinkConfig) -> (Link, DuplexStream) {
    let (local, vehicle) = tokio::io::duplex(64 * 1024);
    let link = Link::start(Arc::new(StreamTransport::new("duplex", local)), config);
    (link, vehicle)
}

pub(crate) fn vehicle_frame<M: OutboundMessage>(system_id: u8, component_id: u8, msg: &M) -> Vec<u8> {
    vehicle_raw_frame(system_id, component_id, M::KIND, &msg.payload())
}

pub(crate) fn vehicle_raw_frame(
    system_id: u8,
    component_id: u8,
    kind: MessageKind,
    payload: &[u8],
) -> Vec<u8> {
    encode_v2(kind.id(), system_id, component_id, payload, &mut SequenceCounter::new()).unwrap()
}

/// Read until `count` frames sent by the link have been decoded.
pub(crate) async fn read_frames(vehicle: &mut DuplexStream, count: usize) -> Vec<DecodedMessage> {
    let mut decoder = FrameDecoder::new();
    let mut frames = Vec::new();
    let mut buf = [0u8; 512];
    while frames.len() < count {
        let n = vehicle.read(&mut buf).await.unwrap();
        assert!(n > 0, "link closed the stream");
        frames.extend(decoder.push(&buf[..n]));
    }
    frames
}
