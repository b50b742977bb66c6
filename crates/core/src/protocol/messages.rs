//! Typed payload views and builders
//!
//! Only the message kinds this link consumes or emits are modelled. Field
//! offsets follow MAVLink wire ordering (fields sorted by size, largest
//! first), not declaration order.
//!
//! MAVLink v2 senders strip trailing zero bytes from payloads, so a v2
//! payload shorter than the wire length is zero-extended before fields are
//! read. A v1 payload must carry the full wire length.

use alloc::vec::Vec;

use bitflags::bitflags;
use heapless::String;

use super::frame::{DecodedMessage, ProtocolVersion};
use crate::params::{ParamName, ParamType, PARAM_NAME_LEN};

/// Message kinds handled by this link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Heartbeat,
    SysStatus,
    SetMode,
    ParamRequestRead,
    ParamRequestList,
    ParamValue,
    ParamSet,
    GpsRawInt,
    Attitude,
    LocalPositionNed,
    GlobalPositionInt,
    VfrHud,
    CommandLong,
    CommandAck,
    StatusText,
}

impl MessageKind {
    /// Look up a kind by numeric message id.
    pub fn from_id(id: u32) -> Option<Self> {
        Some(match id {
            0 => Self::Heartbeat,
            1 => Self::SysStatus,
            11 => Self::SetMode,
            20 => Self::ParamRequestRead,
            21 => Self::ParamRequestList,
            22 => Self::ParamValue,
            23 => Self::ParamSet,
            24 => Self::GpsRawInt,
            30 => Self::Attitude,
            32 => Self::LocalPositionNed,
            33 => Self::GlobalPositionInt,
            74 => Self::VfrHud,
            76 => Self::CommandLong,
            77 => Self::CommandAck,
            253 => Self::StatusText,
            _ => return None,
        })
    }

    pub fn id(self) -> u32 {
        match self {
            Self::Heartbeat => 0,
            Self::SysStatus => 1,
            Self::SetMode => 11,
            Self::ParamRequestRead => 20,
            Self::ParamRequestList => 21,
            Self::ParamValue => 22,
            Self::ParamSet => 23,
            Self::GpsRawInt => 24,
            Self::Attitude => 30,
            Self::LocalPositionNed => 32,
            Self::GlobalPositionInt => 33,
            Self::VfrHud => 74,
            Self::CommandLong => 76,
            Self::CommandAck => 77,
            Self::StatusText => 253,
        }
    }

    /// Extra checksum byte derived from the message definition.
    pub fn crc_extra(self) -> u8 {
        match self {
            Self::Heartbeat => 50,
            Self::SysStatus => 124,
            Self::SetMode => 89,
            Self::ParamRequestRead => 214,
            Self::ParamRequestList => 159,
            Self::ParamValue => 220,
            Self::ParamSet => 168,
            Self::GpsRawInt => 24,
            Self::Attitude => 39,
            Self::LocalPositionNed => 185,
            Self::GlobalPositionInt => 104,
            Self::VfrHud => 20,
            Self::CommandLong => 152,
            Self::CommandAck => 143,
            Self::StatusText => 83,
        }
    }
}

/// Errors from payload decoding and encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    /// Message id does not match the requested view
    WrongKind { expected: MessageKind, got: u32 },
    /// v1 payload shorter than the message's wire length
    TooShort { needed: usize, got: usize },
    /// Parameter name longer than 16 bytes or empty
    InvalidName,
}

impl core::fmt::Display for MessageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MessageError::WrongKind { expected, got } => {
                write!(f, "expected {:?} (id {}), got id {}", expected, expected.id(), got)
            }
            MessageError::TooShort { needed, got } => {
                write!(f, "payload too short: need {} bytes, got {}", needed, got)
            }
            MessageError::InvalidName => write!(f, "parameter name must be 1-16 ASCII bytes"),
        }
    }
}

/// Outbound message that can be serialised into a payload.
pub trait OutboundMessage {
    const KIND: MessageKind;

    fn payload(&self) -> Vec<u8>;
}

/// Little-endian field reader over a payload, zero-extended past its end.
struct Fields<'a> {
    bytes: &'a [u8],
}

impl<'a> Fields<'a> {
    fn of(msg: &'a DecodedMessage, kind: MessageKind, wire_len: usize) -> Result<Self, MessageError> {
        if msg.message_id != kind.id() {
            return Err(MessageError::WrongKind {
                expected: kind,
                got: msg.message_id,
            });
        }
        if msg.version == ProtocolVersion::V1 && msg.payload.len() < wire_len {
            return Err(MessageError::TooShort {
                needed: wire_len,
                got: msg.payload.len(),
            });
        }
        Ok(Self {
            bytes: &msg.payload,
        })
    }

    fn u8(&self, offset: usize) -> u8 {
        self.bytes.get(offset).copied().unwrap_or(0)
    }

    fn array<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut out = [0u8; N];
        for (i, b) in out.iter_mut().enumerate() {
            *b = self.u8(offset + i);
        }
        out
    }

    fn i8(&self, offset: usize) -> i8 {
        self.u8(offset) as i8
    }

    fn u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes(self.array(offset))
    }

    fn i16(&self, offset: usize) -> i16 {
        i16::from_le_bytes(self.array(offset))
    }

    fn u32(&self, offset: usize) -> u32 {
        u32::from_le_bytes(self.array(offset))
    }

    fn i32(&self, offset: usize) -> i32 {
        i32::from_le_bytes(self.array(offset))
    }

    fn f32(&self, offset: usize) -> f32 {
        f32::from_le_bytes(self.array(offset))
    }
}

/// Decode a NUL-terminated ASCII identifier; non-ASCII bytes become `?`.
fn read_c_str<const N: usize>(raw: &[u8]) -> String<N> {
    let mut out = String::new();
    for &b in raw.iter().take(N).take_while(|&&b| b != 0) {
        let c = if b.is_ascii() { b as char } else { '?' };
        // Capacity equals the input bound, push cannot fail
        let _ = out.push(c);
    }
    out
}

/// Encode a parameter name into its fixed 16-byte, NUL-padded field.
pub fn param_id_bytes(name: &str) -> Result<[u8; PARAM_NAME_LEN], MessageError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.len() > PARAM_NAME_LEN || !trimmed.is_ascii() {
        return Err(MessageError::InvalidName);
    }
    let mut out = [0u8; PARAM_NAME_LEN];
    out[..trimmed.len()].copy_from_slice(trimmed.as_bytes());
    Ok(out)
}

bitflags! {
    /// HEARTBEAT `base_mode` flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModeFlags: u8 {
        const CUSTOM_MODE_ENABLED = 0x01;
        const TEST_ENABLED = 0x02;
        const AUTO_ENABLED = 0x04;
        const GUIDED_ENABLED = 0x08;
        const STABILIZE_ENABLED = 0x10;
        const HIL_ENABLED = 0x20;
        const MANUAL_INPUT_ENABLED = 0x40;
        const SAFETY_ARMED = 0x80;
    }
}

/// HEARTBEAT (id 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    pub custom_mode: u32,
    pub vehicle_type: u8,
    pub autopilot: u8,
    pub base_mode: ModeFlags,
    pub system_status: u8,
    pub mavlink_version: u8,
}

impl Heartbeat {
    pub const WIRE_LEN: usize = 9;

    pub fn decode(msg: &DecodedMessage) -> Result<Self, MessageError> {
        let f = Fields::of(msg, MessageKind::Heartbeat, Self::WIRE_LEN)?;
        Ok(Self {
            custom_mode: f.u32(0),
            vehicle_type: f.u8(4),
            autopilot: f.u8(5),
            base_mode: ModeFlags::from_bits_retain(f.u8(6)),
            system_status: f.u8(7),
            mavlink_version: f.u8(8),
        })
    }

    pub fn is_armed(&self) -> bool {
        self.base_mode.contains(ModeFlags::SAFETY_ARMED)
    }
}

impl OutboundMessage for Heartbeat {
    const KIND: MessageKind = MessageKind::Heartbeat;

    fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::WIRE_LEN);
        out.extend_from_slice(&self.custom_mode.to_le_bytes());
        out.extend_from_slice(&[
            self.vehicle_type,
            self.autopilot,
            self.base_mode.bits(),
            self.system_status,
            self.mavlink_version,
        ]);
        out
    }
}

/// SYS_STATUS (id 1), battery fields only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysStatus {
    /// Millivolts, `u16::MAX` when unknown
    pub voltage_battery_mv: u16,
    /// Centiamps, -1 when unknown
    pub current_battery_ca: i16,
    /// Percent, -1 when unknown
    pub battery_remaining: i8,
}

impl SysStatus {
    pub const WIRE_LEN: usize = 31;

    pub fn decode(msg: &DecodedMessage) -> Result<Self, MessageError> {
        let f = Fields::of(msg, MessageKind::SysStatus, Self::WIRE_LEN)?;
        Ok(Self {
            voltage_battery_mv: f.u16(14),
            current_battery_ca: f.i16(16),
            battery_remaining: f.i8(30),
        })
    }

    pub fn voltage_volts(&self) -> Option<f64> {
        (self.voltage_battery_mv != u16::MAX).then(|| f64::from(self.voltage_battery_mv) / 1000.0)
    }
}

/// ATTITUDE (id 30), angles in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attitude {
    pub time_boot_ms: u32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub rollspeed: f32,
    pub pitchspeed: f32,
    pub yawspeed: f32,
}

impl Attitude {
    pub const WIRE_LEN: usize = 28;

    pub fn decode(msg: &DecodedMessage) -> Result<Self, MessageError> {
        let f = Fields::of(msg, MessageKind::Attitude, Self::WIRE_LEN)?;
        Ok(Self {
            time_boot_ms: f.u32(0),
            roll: f.f32(4),
            pitch: f.f32(8),
            yaw: f.f32(12),
            rollspeed: f.f32(16),
            pitchspeed: f.f32(20),
            yawspeed: f.f32(24),
        })
    }
}

impl OutboundMessage for Attitude {
    const KIND: MessageKind = MessageKind::Attitude;

    fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::WIRE_LEN);
        out.extend_from_slice(&self.time_boot_ms.to_le_bytes());
        for v in [
            self.roll,
            self.pitch,
            self.yaw,
            self.rollspeed,
            self.pitchspeed,
            self.yawspeed,
        ] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }
}

/// LOCAL_POSITION_NED (id 32)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPositionNed {
    pub time_boot_ms: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub vx: f32,
    pub vy: f32,
    pub vz: f32,
}

impl LocalPositionNed {
    pub const WIRE_LEN: usize = 28;

    pub fn decode(msg: &DecodedMessage) -> Result<Self, MessageError> {
        let f = Fields::of(msg, MessageKind::LocalPositionNed, Self::WIRE_LEN)?;
        Ok(Self {
            time_boot_ms: f.u32(0),
            x: f.f32(4),
            y: f.f32(8),
            z: f.f32(12),
            vx: f.f32(16),
            vy: f.f32(20),
            vz: f.f32(24),
        })
    }
}

/// GLOBAL_POSITION_INT (id 33)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalPositionInt {
    pub time_boot_ms: u32,
    pub lat_e7: i32,
    pub lon_e7: i32,
    /// Millimetres above mean sea level
    pub alt_mm: i32,
    pub relative_alt_mm: i32,
    /// cm/s
    pub vx: i16,
    pub vy: i16,
    pub vz: i16,
    /// Centidegrees, `u16::MAX` when unknown
    pub hdg_cdeg: u16,
}

impl GlobalPositionInt {
    pub const WIRE_LEN: usize = 28;

    pub fn decode(msg: &DecodedMessage) -> Result<Self, MessageError> {
        let f = Fields::of(msg, MessageKind::GlobalPositionInt, Self::WIRE_LEN)?;
        Ok(Self {
            time_boot_ms: f.u32(0),
            lat_e7: f.i32(4),
            lon_e7: f.i32(8),
            alt_mm: f.i32(12),
            relative_alt_mm: f.i32(16),
            vx: f.i16(20),
            vy: f.i16(22),
            vz: f.i16(24),
            hdg_cdeg: f.u16(26),
        })
    }

    /// Course over ground in degrees, if the sender reported one.
    pub fn course_deg(&self) -> Option<f64> {
        (self.hdg_cdeg != u16::MAX).then(|| f64::from(self.hdg_cdeg) / 100.0)
    }
}

impl OutboundMessage for GlobalPositionInt {
    const KIND: MessageKind = MessageKind::GlobalPositionInt;

    fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::WIRE_LEN);
        out.extend_from_slice(&self.time_boot_ms.to_le_bytes());
        out.extend_from_slice(&self.lat_e7.to_le_bytes());
        out.extend_from_slice(&self.lon_e7.to_le_bytes());
        out.extend_from_slice(&self.alt_mm.to_le_bytes());
        out.extend_from_slice(&self.relative_alt_mm.to_le_bytes());
        out.extend_from_slice(&self.vx.to_le_bytes());
        out.extend_from_slice(&self.vy.to_le_bytes());
        out.extend_from_slice(&self.vz.to_le_bytes());
        out.extend_from_slice(&self.hdg_cdeg.to_le_bytes());
        out
    }
}

/// GPS_RAW_INT (id 24)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpsRawInt {
    pub lat_e7: i32,
    pub lon_e7: i32,
    pub alt_mm: i32,
    /// cm/s, `u16::MAX` when unknown
    pub vel: u16,
    /// Centidegrees, `u16::MAX` when unknown
    pub cog: u16,
    pub fix_type: u8,
    /// 255 when unknown
    pub satellites_visible: u8,
}

impl GpsRawInt {
    pub const WIRE_LEN: usize = 30;

    pub fn decode(msg: &DecodedMessage) -> Result<Self, MessageError> {
        let f = Fields::of(msg, MessageKind::GpsRawInt, Self::WIRE_LEN)?;
        Ok(Self {
            lat_e7: f.i32(8),
            lon_e7: f.i32(12),
            alt_mm: f.i32(16),
            vel: f.u16(24),
            cog: f.u16(26),
            fix_type: f.u8(28),
            satellites_visible: f.u8(29),
        })
    }
}

/// VFR_HUD (id 74)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VfrHud {
    pub airspeed: f32,
    pub groundspeed: f32,
    pub alt: f32,
    pub climb: f32,
    /// Degrees 0..360
    pub heading: i16,
    pub throttle: u16,
}

impl VfrHud {
    pub const WIRE_LEN: usize = 20;

    pub fn decode(msg: &DecodedMessage) -> Result<Self, MessageError> {
        let f = Fields::of(msg, MessageKind::VfrHud, Self::WIRE_LEN)?;
        Ok(Self {
            airspeed: f.f32(0),
            groundspeed: f.f32(4),
            alt: f.f32(8),
            climb: f.f32(12),
            heading: f.i16(16),
            throttle: f.u16(18),
        })
    }
}

impl OutboundMessage for VfrHud {
    const KIND: MessageKind = MessageKind::VfrHud;

    fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::WIRE_LEN);
        for v in [self.airspeed, self.groundspeed, self.alt, self.climb] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&self.heading.to_le_bytes());
        out.extend_from_slice(&self.throttle.to_le_bytes());
        out
    }
}

/// COMMAND_ACK (id 77)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandAck {
    pub command: u16,
    pub result: u8,
}

impl CommandAck {
    pub const WIRE_LEN: usize = 3;

    pub fn decode(msg: &DecodedMessage) -> Result<Self, MessageError> {
        let f = Fields::of(msg, MessageKind::CommandAck, Self::WIRE_LEN)?;
        Ok(Self {
            command: f.u16(0),
            result: f.u8(2),
        })
    }

    /// `MAV_RESULT_ACCEPTED`
    pub fn accepted(&self) -> bool {
        self.result == 0
    }
}

/// Maximum STATUSTEXT length.
pub const STATUS_TEXT_LEN: usize = 50;

/// STATUSTEXT (id 253)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusText {
    /// `MAV_SEVERITY`, 0 = emergency .. 7 = debug
    pub severity: u8,
    pub text: String<STATUS_TEXT_LEN>,
}

impl StatusText {
    pub const WIRE_LEN: usize = 51;

    pub fn decode(msg: &DecodedMessage) -> Result<Self, MessageError> {
        let f = Fields::of(msg, MessageKind::StatusText, Self::WIRE_LEN)?;
        let raw: [u8; STATUS_TEXT_LEN] = f.array(1);
        Ok(Self {
            severity: f.u8(0),
            text: read_c_str(&raw),
        })
    }
}

/// PARAM_VALUE (id 22)
///
/// Two payload shapes are recognised: the standard 25-byte layout and a
/// 23-byte variant (value, id, type, count) without an index.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamValue {
    pub name: ParamName,
    pub value: f32,
    pub param_type: ParamType,
    /// `None` for the 23-byte variant
    pub index: Option<u16>,
    pub count: Option<u16>,
}

impl ParamValue {
    pub const WIRE_LEN: usize = 25;
    pub const VARIANT_LEN: usize = 23;

    pub fn decode(msg: &DecodedMessage) -> Result<Self, MessageError> {
        if msg.message_id == MessageKind::ParamValue.id() && msg.payload.len() == Self::VARIANT_LEN
        {
            let f = Fields {
                bytes: &msg.payload,
            };
            let raw: [u8; PARAM_NAME_LEN] = f.array(4);
            return Ok(Self {
                name: read_c_str(&raw),
                value: f.f32(0),
                param_type: ParamType::from_u8(f.u8(20)),
                index: None,
                count: Some(f.u16(21)),
            });
        }

        let f = Fields::of(msg, MessageKind::ParamValue, Self::WIRE_LEN)?;
        let raw: [u8; PARAM_NAME_LEN] = f.array(8);
        Ok(Self {
            name: read_c_str(&raw),
            value: f.f32(0),
            param_type: ParamType::from_u8(f.u8(24)),
            index: Some(f.u16(6)),
            count: Some(f.u16(4)),
        })
    }
}

impl OutboundMessage for ParamValue {
    const KIND: MessageKind = MessageKind::ParamValue;

    /// Standard 25-byte layout; absent index/count encode as 0.
    fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::WIRE_LEN);
        out.extend_from_slice(&self.value.to_le_bytes());
        out.extend_from_slice(&self.count.unwrap_or(0).to_le_bytes());
        out.extend_from_slice(&self.index.unwrap_or(0).to_le_bytes());
        let mut id = [0u8; PARAM_NAME_LEN];
        let name = self.name.as_bytes();
        id[..name.len()].copy_from_slice(name);
        out.extend_from_slice(&id);
        out.push(self.param_type.as_u8());
        out
    }
}

/// PARAM_REQUEST_LIST (id 21)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamRequestList {
    pub target_system: u8,
    pub target_component: u8,
}

impl OutboundMessage for ParamRequestList {
    const KIND: MessageKind = MessageKind::ParamRequestList;

    fn payload(&self) -> Vec<u8> {
        alloc::vec![self.target_system, self.target_component]
    }
}

/// PARAM_REQUEST_READ (id 20), by name (`param_index = -1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamRequestRead {
    pub target_system: u8,
    pub target_component: u8,
    pub param_id: [u8; PARAM_NAME_LEN],
    pub param_index: i16,
}

impl ParamRequestRead {
    pub fn by_name(target_system: u8, target_component: u8, name: &str) -> Result<Self, MessageError> {
        Ok(Self {
            target_system,
            target_component,
            param_id: param_id_bytes(name)?,
            param_index: -1,
        })
    }
}

impl OutboundMessage for ParamRequestRead {
    const KIND: MessageKind = MessageKind::ParamRequestRead;

    fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(20);
        out.extend_from_slice(&self.param_index.to_le_bytes());
        out.push(self.target_system);
        out.push(self.target_component);
        out.extend_from_slice(&self.param_id);
        out
    }
}

/// PARAM_SET (id 23)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSet {
    pub target_system: u8,
    pub target_component: u8,
    pub param_id: [u8; PARAM_NAME_LEN],
    pub value: f32,
    pub param_type: ParamType,
}

impl ParamSet {
    pub fn new(
        target_system: u8,
        target_component: u8,
        name: &str,
        value: f32,
        param_type: ParamType,
    ) -> Result<Self, MessageError> {
        Ok(Self {
            target_system,
            target_component,
            param_id: param_id_bytes(name)?,
            value,
            param_type,
        })
    }

    pub fn decode(msg: &DecodedMessage) -> Result<Self, MessageError> {
        let f = Fields::of(msg, MessageKind::ParamSet, 23)?;
        Ok(Self {
            value: f.f32(0),
            target_system: f.u8(4),
            target_component: f.u8(5),
            param_id: f.array(6),
            param_type: ParamType::from_u8(f.u8(22)),
        })
    }

    pub fn name(&self) -> ParamName {
        read_c_str(&self.param_id)
    }
}

impl OutboundMessage for ParamSet {
    const KIND: MessageKind = MessageKind::ParamSet;

    fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(23);
        out.extend_from_slice(&self.value.to_le_bytes());
        out.push(self.target_system);
        out.push(self.target_component);
        out.extend_from_slice(&self.param_id);
        out.push(self.param_type.as_u8());
        out
    }
}

/// COMMAND_LONG (id 76)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandLong {
    pub target_system: u8,
    pub target_component: u8,
    pub command: u16,
    pub confirmation: u8,
    pub params: [f32; 7],
}

impl CommandLong {
    pub const WIRE_LEN: usize = 33;

    pub fn new(target_system: u8, target_component: u8, command: u16, params: [f32; 7]) -> Self {
        Self {
            target_system,
            target_component,
            command,
            confirmation: 0,
            params,
        }
    }

    pub fn decode(msg: &DecodedMessage) -> Result<Self, MessageError> {
        let f = Fields::of(msg, MessageKind::CommandLong, Self::WIRE_LEN)?;
        let mut params = [0f32; 7];
        for (i, p) in params.iter_mut().enumerate() {
            *p = f.f32(i * 4);
        }
        Ok(Self {
            params,
            command: f.u16(28),
            target_system: f.u8(30),
            target_component: f.u8(31),
            confirmation: f.u8(32),
        })
    }
}

impl OutboundMessage for CommandLong {
    const KIND: MessageKind = MessageKind::CommandLong;

    fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::WIRE_LEN);
        for p in self.params {
            out.extend_from_slice(&p.to_le_bytes());
        }
        out.extend_from_slice(&self.command.to_le_bytes());
        out.push(self.target_system);
        out.push(self.target_component);
        out.push(self.confirmation);
        out
    }
}

/// SET_MODE (id 11)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetMode {
    pub target_system: u8,
    pub base_mode: ModeFlags,
    pub custom_mode: u32,
}

impl SetMode {
    pub const WIRE_LEN: usize = 6;

    pub fn decode(msg: &DecodedMessage) -> Result<Self, MessageError> {
        let f = Fields::of(msg, MessageKind::SetMode, Self::WIRE_LEN)?;
        Ok(Self {
            custom_mode: f.u32(0),
            target_system: f.u8(4),
            base_mode: ModeFlags::from_bits_retain(f.u8(5)),
        })
    }
}

impl OutboundMessage for SetMode {
    const KIND: MessageKind = MessageKind::SetMode;

    fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::WIRE_LEN);
        out.extend_from_slice(&self.custom_mode.to_le_bytes());
        out.push(self.target_system);
        out.push(self.base_mode.bits());
        out
    }
}
