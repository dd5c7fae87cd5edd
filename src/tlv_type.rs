//! TLV discriminants.
//!
//! Each TLV record on the wire starts with one tag byte naming the scalar kind
//! of the payload. The numbering is fixed; there is no boolean tag (booleans
//! travel as [`TlvType::UInt8`]).

use crate::{Error, Result};

/// Discriminant of a TLV payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TlvType {
    /// UTF-8 bytes plus a trailing `0x00` sentinel.
    String = 2,
    Int8 = 3,
    Int16 = 4,
    Int32 = 5,
    Int64 = 6,
    UInt8 = 7,
    UInt16 = 8,
    UInt32 = 9,
    UInt64 = 10,
    /// IEEE-754 binary64.
    Double = 11,
}

impl TlvType {
    /// All discriminants in tag order.
    pub const ALL: [TlvType; 10] = [
        TlvType::String,
        TlvType::Int8,
        TlvType::Int16,
        TlvType::Int32,
        TlvType::Int64,
        TlvType::UInt8,
        TlvType::UInt16,
        TlvType::UInt32,
        TlvType::UInt64,
        TlvType::Double,
    ];

    /// Tag byte as written on the wire.
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Maps a tag byte back to its discriminant.
    pub fn from_tag(tag: u8) -> Result<Self> {
        Ok(match tag {
            2 => Self::String,
            3 => Self::Int8,
            4 => Self::Int16,
            5 => Self::Int32,
            6 => Self::Int64,
            7 => Self::UInt8,
            8 => Self::UInt16,
            9 => Self::UInt32,
            10 => Self::UInt64,
            11 => Self::Double,
            other => return Err(Error::InvalidTag(other)),
        })
    }

    /// Payload width for numeric kinds, `None` for strings.
    pub fn fixed_width(self) -> Option<u32> {
        match self {
            Self::String => None,
            Self::Int8 | Self::UInt8 => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 => Some(4),
            Self::Int64 | Self::UInt64 | Self::Double => Some(8),
        }
    }

    /// Rust-Typname fuer Diagnosen (`TypeMismatch`, tlvdump).
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int8 => "i8",
            Self::Int16 => "i16",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::UInt8 => "u8",
            Self::UInt16 => "u16",
            Self::UInt32 => "u32",
            Self::UInt64 => "u64",
            Self::Double => "f64",
        }
    }
}

impl std::fmt::Display for TlvType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
