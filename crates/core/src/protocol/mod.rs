//! MAVLink-style wire protocol
//!
//! - [`crc`]: X.25 checksum and the per-message extra-byte table
//! - [`frame`]: v1/v2 frame decoder and v2 encoder
//! - [`messages`]: typed views over the payloads this link consumes or emits

pub mod crc;
pub mod frame;
pub mod messages;

pub use frame::{
    encode_v2, DecodedMessage, DecoderStats, FrameDecoder, FrameError, ProtocolVersion,
    SequenceCounter,
};
pub use messages::{MessageError, MessageKind};
