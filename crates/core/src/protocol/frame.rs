//! Frame decoder and encoder
//!
//! # Wire layout
//!
//! ```text
//! v1: FE len seq sys comp msgid            payload crc_lo crc_hi
//! v2: FD len incompat compat seq sys comp msgid(3, LE) payload crc_lo crc_hi [signature(13)]
//! ```
//!
//! The checksum covers every byte after the magic marker up to the end of
//! the payload, plus the per-message extra byte (see [`super::crc`]).
//! Signature blocks are skipped, never validated.
//!
//! # Decoder
//!
//! [`FrameDecoder`] is incremental: bytes may arrive in arbitrary chunks.
//! Noise before a magic marker is discarded. A frame failing its checksum
//! causes the decoder to step one byte past that marker and search again,
//! so a corrupted frame never blocks the frames that follow it.

use alloc::vec::Vec;

use super::crc;
use super::messages::MessageKind;

/// v1 start-of-frame marker.
pub const MAGIC_V1: u8 = 0xFE;
/// v2 start-of-frame marker.
pub const MAGIC_V2: u8 = 0xFD;

/// Bytes before the payload, magic included.
pub const V1_HEADER_LEN: usize = 6;
pub const V2_HEADER_LEN: usize = 10;
pub const CHECKSUM_LEN: usize = 2;
pub const SIGNATURE_LEN: usize = 13;
pub const MAX_PAYLOAD_LEN: usize = 255;

/// v2 incompatibility flag marking a signed frame.
pub const INCOMPAT_FLAG_SIGNED: u8 = 0x01;

/// Upper bound on buffered, not-yet-decoded bytes.
pub const RX_BUFFER_CAPACITY: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    V1,
    V2,
}

/// One validated frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    pub version: ProtocolVersion,
    pub sequence: u8,
    pub system_id: u8,
    pub component_id: u8,
    /// 8-bit for v1, 24-bit for v2
    pub message_id: u32,
    pub payload: heapless::Vec<u8, MAX_PAYLOAD_LEN>,
}

impl DecodedMessage {
    pub fn kind(&self) -> Option<MessageKind> {
        MessageKind::from_id(self.message_id)
    }
}

/// Errors from frame encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Payload exceeds the 255-byte length field
    PayloadTooLarge(usize),
    /// Message id does not fit in 24 bits
    MessageIdOutOfRange(u32),
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::PayloadTooLarge(len) => {
                write!(f, "payload of {} bytes exceeds {}", len, MAX_PAYLOAD_LEN)
            }
            FrameError::MessageIdOutOfRange(id) => write!(f, "message id {} exceeds 24 bits", id),
        }
    }
}

/// Decoder statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Frames emitted
    pub frames: u32,
    /// Candidate frames rejected by checksum
    pub crc_errors: u32,
    /// Bytes discarded while hunting for a marker or on overflow
    pub dropped_bytes: u32,
}

enum Scan {
    /// More bytes needed to decide
    Incomplete,
    /// Checksum mismatch for the candidate at buffer start
    Corrupt,
    /// Valid frame spanning `len` bytes
    Frame(DecodedMessage, usize),
}

/// Incremental v1/v2 frame decoder.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    stats: DecoderStats,
}

impl FrameDecoder {
    /// Fresh decoder with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append received bytes.
    ///
    /// When the buffer would exceed [`RX_BUFFER_CAPACITY`], the oldest bytes
    /// are discarded.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
        if self.buffer.len() > RX_BUFFER_CAPACITY {
            let excess = self.buffer.len() - RX_BUFFER_CAPACITY;
            self.buffer.drain(..excess);
            self.stats.dropped_bytes = self.stats.dropped_bytes.saturating_add(excess as u32);
        }
    }

    /// Next valid frame from the buffered bytes, if one is complete.
    pub fn next_message(&mut self) -> Option<DecodedMessage> {
        loop {
            let start = match self
                .buffer
                .iter()
                .position(|&b| b == MAGIC_V1 || b == MAGIC_V2)
            {
                Some(start) => start,
                None => {
                    self.discard(self.buffer.len());
                    return None;
                }
            };
            self.discard(start);

            match self.scan() {
                Scan::Incomplete => return None,
                Scan::Corrupt => {
                    self.stats.crc_errors = self.stats.crc_errors.saturating_add(1);
                    // Step past this marker; the next one may start a real frame
                    self.buffer.drain(..1);
                }
                Scan::Frame(msg, len) => {
                    self.buffer.drain(..len);
                    self.stats.frames = self.stats.frames.saturating_add(1);
                    return Some(msg);
                }
            }
        }
    }

    /// Iterator over every frame currently decodable.
    pub fn drain(&mut self) -> Drain<'_> {
        Drain { decoder: self }
    }

    /// Feed `bytes` and return an iterator over the frames they complete.
    pub fn push(&mut self, bytes: &[u8]) -> Drain<'_> {
        self.feed(bytes);
        self.drain()
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Bytes buffered and not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Drop buffered bytes and statistics.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.stats = DecoderStats::default();
    }

    fn discard(&mut self, count: usize) {
        if count > 0 {
            self.buffer.drain(..count);
            self.stats.dropped_bytes = self.stats.dropped_bytes.saturating_add(count as u32);
        }
    }

    /// Examine the candidate frame at buffer start (buffer[0] is a marker).
    fn scan(&self) -> Scan {
        let buf = &self.buffer;
        let version = if buf[0] == MAGIC_V2 {
            ProtocolVersion::V2
        } else {
            ProtocolVersion::V1
        };
        let header_len = match version {
            ProtocolVersion::V1 => V1_HEADER_LEN,
            ProtocolVersion::V2 => V2_HEADER_LEN,
        };
        if buf.len() < header_len {
            return Scan::Incomplete;
        }

        let payload_len = usize::from(buf[1]);
        let signature_len = match version {
            ProtocolVersion::V2 if buf[2] & INCOMPAT_FLAG_SIGNED != 0 => SIGNATURE_LEN,
            _ => 0,
        };
        let checked_len = header_len + payload_len;
        let frame_len = checked_len + CHECKSUM_LEN + signature_len;
        if buf.len() < frame_len {
            return Scan::Incomplete;
        }

        let (sequence, system_id, component_id, message_id) = match version {
            ProtocolVersion::V1 => (buf[2], buf[3], buf[4], u32::from(buf[5])),
            ProtocolVersion::V2 => (
                buf[4],
                buf[5],
                buf[6],
                u32::from_le_bytes([buf[7], buf[8], buf[9], 0]),
            ),
        };

        let expected = crc::frame_checksum(&buf[1..checked_len], message_id);
        let received = u16::from_le_bytes([buf[checked_len], buf[checked_len + 1]]);
        if expected != received {
            return Scan::Corrupt;
        }

        let mut payload = heapless::Vec::new();
        // payload_len <= 255 by construction of the length byte
        let _ = payload.extend_from_slice(&buf[header_len..checked_len]);

        Scan::Frame(
            DecodedMessage {
                version,
                sequence,
                system_id,
                component_id,
                message_id,
                payload,
            },
            frame_len,
        )
    }
}

/// Iterator returned by [`FrameDecoder::drain`].
pub struct Drain<'a> {
    decoder: &'a mut FrameDecoder,
}

impl Iterator for Drain<'_> {
    type Item = DecodedMessage;

    fn next(&mut self) -> Option<Self::Item> {
        self.decoder.next_message()
    }
}

/// 8-bit wrapping sequence number for outbound frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceCounter(u8);

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value and advances the counter.
    pub fn next(&mut self) -> u8 {
        let seq = self.0;
        self.0 = self.0.wrapping_add(1);
        seq
    }

    /// Value the next frame will carry.
    pub fn peek(&self) -> u8 {
        self.0
    }
}

/// Build an unsigned v2 frame.
///
/// # Arguments
///
/// * `message_id` - 24-bit message id
/// * `sender_system` / `sender_component` - identity written into the header
/// * `payload` - up to 255 bytes, sent as-is (no trailing-zero truncation)
/// * `sequence` - advanced by one per call
pub fn encode_v2(
    message_id: u32,
    sender_system: u8,
    sender_component: u8,
    payload: &[u8],
    sequence: &mut SequenceCounter,
) -> Result<Vec<u8>, FrameError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FrameError::PayloadTooLarge(payload.len()));
    }
    if message_id > 0x00FF_FFFF {
        return Err(FrameError::MessageIdOutOfRange(message_id));
    }

    let id = message_id.to_le_bytes();
    let mut frame = Vec::with_capacity(V2_HEADER_LEN + payload.len() + CHECKSUM_LEN);
    frame.extend_from_slice(&[
        MAGIC_V2,
        payload.len() as u8,
        0, // incompat flags
        0, // compat flags
        sequence.next(),
        sender_system,
        sender_component,
        id[0],
        id[1],
        id[2],
    ]);
    frame.extend_from_slice(payload);

    let checksum = crc::frame_checksum(&frame[1..], message_id);
    frame.extend_from_slice(&checksum.to_le_bytes());
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Legacy frame builder for exercising the v1 path.
    fn encode_v1(message_id: u8, sys: u8, comp: u8, seq: u8, payload: &[u8]) -> Vec<u8> {
        let mut frame = vec![MAGIC_V1, payload.len() as u8, seq, sys, comp, message_id];
        frame.extend_from_slice(payload);
        let checksum = crc::frame_checksum(&frame[1..], u32::from(message_id));
        frame.extend_from_slice(&checksum.to_le_bytes());
        frame
    }

    /// Encode with either framing, drawing sequence numbers from `seq`.
    fn encode(
        version: ProtocolVersion,
        message_id: u8,
        seq: &mut SequenceCounter,
        payload: &[u8],
    ) -> Vec<u8> {
        match version {
            ProtocolVersion::V1 => encode_v1(message_id, 1, 1, seq.next(), payload),
            ProtocolVersion::V2 => encode_v2(u32::from(message_id), 1, 1, payload, seq).unwrap(),
        }
    }

    fn any_version() -> impl Strategy<Value = ProtocolVersion> {
        prop_oneof![Just(ProtocolVersion::V1), Just(ProtocolVersion::V2)]
    }

    fn heartbeat_payload(vehicle_type: u8) -> [u8; 9] {
        [0, 0, 0, 0, vehicle_type, 3, 0x81, 4, 3]
    }

    #[test]
    fn test_v2_round_trip() {
        let mut seq = SequenceCounter::new();
        let payload = [1u8, 2, 3, 4, 5];
        let frame = encode_v2(30, 255, 190, &payload, &mut seq).unwrap();
        assert_eq!(frame.len(), V2_HEADER_LEN + 5 + CHECKSUM_LEN);

        let mut decoder = FrameDecoder::new();
        let msgs: Vec<_> = decoder.push(&frame).collect();
        assert_eq!(msgs.len(), 1);
        let msg = &msgs[0];
        assert_eq!(msg.version, ProtocolVersion::V2);
        assert_eq!(msg.system_id, 255);
        assert_eq!(msg.component_id, 190);
        assert_eq!(msg.message_id, 30);
        assert_eq!(msg.sequence, 0);
        assert_eq!(msg.payload.as_slice(), &payload);
    }

    #[test]
    fn test_v1_round_trip() {
        let frame = encode_v1(0, 1, 1, 42, &heartbeat_payload(1));
        let mut decoder = FrameDecoder::new();
        let msg = decoder.push(&frame).next().unwrap();
        assert_eq!(msg.version, ProtocolVersion::V1);
        assert_eq!(msg.sequence, 42);
        assert_eq!(msg.message_id, 0);
        assert_eq!(msg.kind(), Some(MessageKind::Heartbeat));
    }

    #[test]
    fn test_sequence_wraps() {
        let mut seq = SequenceCounter(255);
        let a = encode_v2(0, 255, 190, &[], &mut seq).unwrap();
        let b = encode_v2(0, 255, 190, &[], &mut seq).unwrap();
        assert_eq!(a[4], 255);
        assert_eq!(b[4], 0);
        assert_eq!(seq.peek(), 1);
    }

    #[test]
    fn test_encode_rejects_oversized_payload() {
        let mut seq = SequenceCounter::new();
        let payload = [0u8; 256];
        assert_eq!(
            encode_v2(0, 1, 1, &payload, &mut seq),
            Err(FrameError::PayloadTooLarge(256))
        );
        assert_eq!(seq.peek(), 0, "failed encode must not consume a sequence number");
    }

    #[test]
    fn test_byte_at_a_time_feeding() {
        let mut seq = SequenceCounter::new();
        let frame = encode_v2(74, 1, 1, &[0u8; 20], &mut seq).unwrap();
        let mut decoder = FrameDecoder::new();
        let mut out = Vec::new();
        for b in &frame {
            out.extend(decoder.push(core::slice::from_ref(b)));
        }
        assert_eq!(out.len(), 1);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_leading_noise_is_discarded() {
        let mut seq = SequenceCounter::new();
        let mut stream = vec![0x00, 0x13, 0x37];
        stream.extend(encode_v2(0, 1, 1, &heartbeat_payload(1), &mut seq).unwrap());
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.push(&stream).count(), 1);
        assert_eq!(decoder.stats().dropped_bytes, 3);
    }

    #[test]
    fn test_corrupt_frame_does_not_block_next() {
        let mut seq = SequenceCounter::new();
        let mut first = encode_v2(0, 1, 1, &heartbeat_payload(1), &mut seq).unwrap();
        first[12] ^= 0xFF;
        let second = encode_v2(0, 1, 1, &heartbeat_payload(2), &mut seq).unwrap();

        let mut decoder = FrameDecoder::new();
        decoder.feed(&first);
        decoder.feed(&second);
        let msgs: Vec<_> = decoder.drain().collect();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].payload[4], 2);
        assert_eq!(msgs[0].sequence, 1);
        assert_eq!(decoder.stats().crc_errors, 1);
    }

    #[test]
    fn test_corrupt_v1_frame_does_not_block_next() {
        let mut first = encode_v1(0, 1, 1, 0, &heartbeat_payload(1));
        first[V1_HEADER_LEN] ^= 0x40;
        let second = encode_v1(0, 1, 1, 1, &heartbeat_payload(2));

        let mut decoder = FrameDecoder::new();
        decoder.feed(&first);
        decoder.feed(&second);
        let msgs: Vec<_> = decoder.drain().collect();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].version, ProtocolVersion::V1);
        assert_eq!(msgs[0].payload[4], 2);
        assert_eq!(decoder.stats().crc_errors, 1);
    }

    #[test]
    fn test_v1_frame_inside_intact_v2_payload_is_not_emitted() {
        let inner = encode_v1(0, 7, 7, 5, &heartbeat_payload(1));
        let mut seq = SequenceCounter::new();
        let outer = encode_v2(33, 1, 1, &inner, &mut seq).unwrap();

        let mut decoder = FrameDecoder::new();
        let msgs: Vec<_> = decoder.push(&outer).collect();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].version, ProtocolVersion::V2);
        assert_eq!(msgs[0].message_id, 33);
        assert_eq!(msgs[0].payload.as_slice(), inner.as_slice());
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_resync_finds_v1_frame_inside_corrupt_v2_frame() {
        let inner = encode_v1(0, 7, 7, 5, &heartbeat_payload(1));
        let mut seq = SequenceCounter::new();
        let mut outer = encode_v2(33, 1, 1, &inner, &mut seq).unwrap();
        let last = outer.len() - 1;
        outer[last] ^= 0xFF;
        let trailing = encode_v2(0, 1, 1, &heartbeat_payload(2), &mut seq).unwrap();

        let mut decoder = FrameDecoder::new();
        decoder.feed(&outer);
        decoder.feed(&trailing);
        decoder.feed(&[0u8; 300]);
        let msgs: Vec<_> = decoder.drain().collect();

        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].version, ProtocolVersion::V1);
        assert_eq!((msgs[0].system_id, msgs[0].sequence), (7, 5));
        assert_eq!(msgs[1].version, ProtocolVersion::V2);
        assert_eq!(msgs[1].payload[4], 2);
        assert!(decoder.stats().crc_errors >= 1);
    }

    #[test]
    fn test_signed_frame_skips_signature() {
        let mut seq = SequenceCounter::new();
        let mut frame = encode_v2(0, 1, 1, &heartbeat_payload(1), &mut seq).unwrap();
        // Mark as signed and recompute the checksum over the new header
        frame[2] = INCOMPAT_FLAG_SIGNED;
        let body_end = frame.len() - CHECKSUM_LEN;
        let checksum = crc::frame_checksum(&frame[1..body_end], 0);
        frame[body_end..].copy_from_slice(&checksum.to_le_bytes());
        frame.extend_from_slice(&[0xAB; SIGNATURE_LEN]);
        frame.extend(encode_v2(0, 1, 1, &heartbeat_payload(2), &mut seq).unwrap());

        let mut decoder = FrameDecoder::new();
        let msgs: Vec<_> = decoder.push(&frame).collect();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1].payload[4], 2);
    }

    #[test]
    fn test_incomplete_frame_waits() {
        let mut seq = SequenceCounter::new();
        let frame = encode_v2(30, 1, 1, &[9u8; 28], &mut seq).unwrap();
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.push(&frame[..20]).count(), 0);
        assert_eq!(decoder.buffered(), 20);
        assert_eq!(decoder.push(&frame[20..]).count(), 1);
    }

    #[test]
    fn test_unknown_message_id_uses_zero_extra() {
        let mut seq = SequenceCounter::new();
        let frame = encode_v2(0x01_2345, 7, 8, &[1, 2], &mut seq).unwrap();
        let mut decoder = FrameDecoder::new();
        let msg = decoder.push(&frame).next().unwrap();
        assert_eq!(msg.message_id, 0x01_2345);
        assert_eq!(msg.kind(), None);
    }

    #[test]
    fn test_overflow_drops_oldest_bytes() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(&[MAGIC_V2, 0xFF]);
        decoder.feed(&[0u8; RX_BUFFER_CAPACITY]);
        assert_eq!(decoder.buffered(), RX_BUFFER_CAPACITY);
        assert_eq!(decoder.stats().dropped_bytes, 2);
    }

    #[test]
    fn test_mavlink_crate_heartbeat_decodes() {
        use mavlink::common::{MavAutopilot, MavMessage, MavModeFlag, MavState, MavType, HEARTBEAT_DATA};

        let header = mavlink::MavHeader {
            system_id: 1,
            component_id: 1,
            sequence: 9,
        };
        let msg = MavMessage::HEARTBEAT(HEARTBEAT_DATA {
            custom_mode: 10,
            mavtype: MavType::MAV_TYPE_FIXED_WING,
            autopilot: MavAutopilot::MAV_AUTOPILOT_ARDUPILOTMEGA,
            base_mode: MavModeFlag::MAV_MODE_FLAG_SAFETY_ARMED,
            system_status: MavState::MAV_STATE_ACTIVE,
            mavlink_version: 3,
        });

        let mut v1 = Vec::new();
        mavlink::write_v1_msg(&mut v1, header, &msg).unwrap();
        let mut v2 = Vec::new();
        mavlink::write_v2_msg(&mut v2, header, &msg).unwrap();

        let mut decoder = FrameDecoder::new();
        decoder.feed(&v1);
        decoder.feed(&v2);
        let msgs: Vec<_> = decoder.drain().collect();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].version, ProtocolVersion::V1);
        assert_eq!(msgs[1].version, ProtocolVersion::V2);
        for m in &msgs {
            assert_eq!(m.sequence, 9);
            assert_eq!(m.payload[0], 10);
            assert_eq!(m.payload[4], 1);
        }
    }

    #[test]
    fn test_encoded_command_long_parses_with_mavlink_crate() {
        use mavlink::common::MavMessage;

        let mut payload = Vec::new();
        for p in [1.0f32, 21196.0, 0.0, 0.0, 0.0, 0.0, 0.0] {
            payload.extend_from_slice(&p.to_le_bytes());
        }
        payload.extend_from_slice(&400u16.to_le_bytes());
        payload.extend_from_slice(&[1, 1, 0]);

        let mut seq = SequenceCounter::new();
        let frame = encode_v2(76, 255, 190, &payload, &mut seq).unwrap();
        let mut reader = mavlink::peek_reader::PeekReader::new(frame.as_slice());
        let (header, msg) = mavlink::read_v2_msg::<MavMessage, _>(&mut reader).unwrap();
        assert_eq!(header.system_id, 255);
        assert_eq!(header.component_id, 190);
        match msg {
            MavMessage::COMMAND_LONG(data) => {
                assert_eq!(data.param1, 1.0);
                assert_eq!(data.param2, 21196.0);
                assert_eq!(data.target_system, 1);
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn prop_single_byte_corruption_never_blocks_following_frame(
            corrupted_version in any_version(),
            good_version in any_version(),
            payload in proptest::collection::vec(any::<u8>(), 0..64),
            position in any::<prop::sample::Index>(),
            flip in 1u8..=255,
        ) {
            let mut seq = SequenceCounter::new();
            let mut corrupted = encode(corrupted_version, 30, &mut seq, &payload);
            let good = encode(good_version, 0, &mut seq, &heartbeat_payload(1));
            let at = position.index(corrupted.len());
            corrupted[at] ^= flip;

            let mut decoder = FrameDecoder::new();
            decoder.feed(&corrupted);
            decoder.feed(&good);
            // Idle-line filler lets a corrupted length byte run to completion
            decoder.feed(&[0u8; 300]);
            let msgs: Vec<_> = decoder.drain().collect();

            let heartbeats: Vec<_> = msgs
                .iter()
                .filter(|m| m.message_id == 0 && m.sequence == 1)
                .collect();
            prop_assert_eq!(heartbeats.len(), 1);
            prop_assert_eq!(heartbeats[0].version, good_version);
        }

        #[test]
        fn prop_arbitrary_chunking_yields_same_frames(
            frames in proptest::collection::vec(
                (any_version(), proptest::collection::vec(any::<u8>(), 0..40)),
                1..6,
            ),
            chunk in 1usize..17,
        ) {
            let mut seq = SequenceCounter::new();
            let mut stream = Vec::new();
            for (version, p) in &frames {
                stream.extend(encode(*version, 33, &mut seq, p));
            }

            let mut decoder = FrameDecoder::new();
            let mut got = Vec::new();
            for piece in stream.chunks(chunk) {
                got.extend(decoder.push(piece));
            }
            prop_assert_eq!(got.len(), frames.len());
            for (msg, (version, p)) in got.iter().zip(&frames) {
                prop_assert_eq!(msg.version, *version);
                prop_assert_eq!(msg.payload.as_slice(), p.as_slice());
            }
        }
    }
}
