//! Parameter names, value types and records

use heapless::String;

/// Maximum parameter name length on the wire.
pub const PARAM_NAME_LEN: usize = 16;

/// Parameter identifier, at most 16 ASCII characters.
pub type ParamName = String<PARAM_NAME_LEN>;

/// `MAV_PARAM_TYPE`
///
/// Values always travel as a 4-byte float; the type tells the receiver how
/// to interpret it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ParamType {
    Uint8,
    Int8,
    Uint16,
    Int16,
    Uint32,
    Int32,
    Uint64,
    Int64,
    #[default]
    Real32,
    Real64,
    /// Type code outside the known range, kept verbatim
    Unknown(u8),
}

impl ParamType {
    pub fn from_u8(code: u8) -> Self {
        match code {
            1 => Self::Uint8,
            2 => Self::Int8,
            3 => Self::Uint16,
            4 => Self::Int16,
            5 => Self::Uint32,
            6 => Self::Int32,
            7 => Self::Uint64,
            8 => Self::Int64,
            9 => Self::Real32,
            10 => Self::Real64,
            other => Self::Unknown(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Uint8 => 1,
            Self::Int8 => 2,
            Self::Uint16 => 3,
            Self::Int16 => 4,
            Self::Uint32 => 5,
            Self::Int32 => 6,
            Self::Uint64 => 7,
            Self::Int64 => 8,
            Self::Real32 => 9,
            Self::Real64 => 10,
            Self::Unknown(code) => code,
        }
    }

    /// True for the eight integer encodings.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Uint8
                | Self::Int8
                | Self::Uint16
                | Self::Int16
                | Self::Uint32
                | Self::Int32
                | Self::Uint64
                | Self::Int64
        )
    }
}

/// One parameter as reported by the vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamRecord {
    pub name: ParamName,
    pub value: f32,
    pub param_type: ParamType,
    /// Absent for the index-less PARAM_VALUE variant
    pub index: Option<u16>,
    pub count: Option<u16>,
}

/// Value the vehicle echoed back after a write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamEcho {
    pub value: f32,
    pub param_type: ParamType,
}

/// Key used to match writes with echoes: surrounding whitespace removed.
pub fn normalize_name(name: &str) -> &str {
    name.trim()
}
