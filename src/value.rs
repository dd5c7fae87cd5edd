//! Tagged scalar values, the unit of TLV encoding.
//!
//! [`TlvValue`] is a closed sum type over the supported scalar kinds plus an
//! explicit [`TlvValue::Empty`] state for default-constructed values. Every
//! read site matches exhaustively, so a payload can never be reinterpreted
//! under the wrong tag.
//!
//! Payload layout (little-endian):
//! - integers: natural width (1/2/4/8 bytes)
//! - doubles: 8 bytes, `f32` input is widened before storage
//! - strings: UTF-8 bytes followed by a single `0x00` sentinel

use std::fmt;
use std::io::Write;

use crate::tlv_type::TlvType;
use crate::{Error, Result};

/// A single scalar, classified and owned.
///
/// Cloning deep-copies string payloads; two values never share a buffer.
#[derive(Debug, Clone, Default)]
pub enum TlvValue {
    /// Uninitialized value. Cannot be written and every typed access fails.
    #[default]
    Empty,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Double(f64),
    String(String),
}

/// String-Sentinel am Ende jedes String-Payloads.
const STRING_SENTINEL: u8 = 0x00;

impl TlvValue {
    /// Discriminant, `None` for [`TlvValue::Empty`].
    pub fn tlv_type(&self) -> Option<TlvType> {
        Some(match self {
            Self::Empty => return None,
            Self::Int8(_) => TlvType::Int8,
            Self::Int16(_) => TlvType::Int16,
            Self::Int32(_) => TlvType::Int32,
            Self::Int64(_) => TlvType::Int64,
            Self::UInt8(_) => TlvType::UInt8,
            Self::UInt16(_) => TlvType::UInt16,
            Self::UInt32(_) => TlvType::UInt32,
            Self::UInt64(_) => TlvType::UInt64,
            Self::Double(_) => TlvType::Double,
            Self::String(_) => TlvType::String,
        })
    }

    /// Payload length in bytes, excluding tag and length header.
    ///
    /// Zero only for [`TlvValue::Empty`]; an empty string still carries its sentinel.
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::String(s) => s.len() + 1,
            // Feste Breite aus der Typ-Tabelle
            other => other
                .tlv_type()
                .and_then(TlvType::fixed_width)
                .map_or(0, |w| w as usize),
        }
    }

    /// True for the uninitialized [`TlvValue::Empty`] state.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Type name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        self.tlv_type().map_or("empty", TlvType::name)
    }

    /// Writes the payload bytes (no tag/length header) to `out`.
    pub fn write_payload<W: Write + ?Sized>(&self, out: &mut W) -> std::io::Result<()> {
        match self {
            Self::Empty => Ok(()),
            Self::Int8(v) => out.write_all(&v.to_le_bytes()),
            Self::Int16(v) => out.write_all(&v.to_le_bytes()),
            Self::Int32(v) => out.write_all(&v.to_le_bytes()),
            Self::Int64(v) => out.write_all(&v.to_le_bytes()),
            Self::UInt8(v) => out.write_all(&v.to_le_bytes()),
            Self::UInt16(v) => out.write_all(&v.to_le_bytes()),
            Self::UInt32(v) => out.write_all(&v.to_le_bytes()),
            Self::UInt64(v) => out.write_all(&v.to_le_bytes()),
            Self::Double(v) => out.write_all(&v.to_le_bytes()),
            Self::String(s) => {
                out.write_all(s.as_bytes())?;
                out.write_all(&[STRING_SENTINEL])
            }
        }
    }

    /// Owned copy of the payload bytes.
    pub fn payload(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.len());
        self.write_payload(&mut buf)
            .expect("writing to a Vec cannot fail");
        buf
    }

    /// Rebuilds a value from a discriminant and its raw payload.
    ///
    /// Numeric payloads must have exactly the natural width. String payloads
    /// must end with the sentinel and be valid UTF-8 before it.
    pub fn from_parts(tlv_type: TlvType, payload: Vec<u8>) -> Result<Self> {
        let invalid_length = || Error::InvalidLength {
            tag: tlv_type.tag(),
            length: u32::try_from(payload.len()).unwrap_or(u32::MAX),
        };

        if let Some(width) = tlv_type.fixed_width() {
            if payload.len() != width as usize {
                return Err(invalid_length());
            }
        }

        Ok(match tlv_type {
            TlvType::Int8 => Self::Int8(i8::from_le_bytes(fixed(&payload))),
            TlvType::Int16 => Self::Int16(i16::from_le_bytes(fixed(&payload))),
            TlvType::Int32 => Self::Int32(i32::from_le_bytes(fixed(&payload))),
            TlvType::Int64 => Self::Int64(i64::from_le_bytes(fixed(&payload))),
            TlvType::UInt8 => Self::UInt8(u8::from_le_bytes(fixed(&payload))),
            TlvType::UInt16 => Self::UInt16(u16::from_le_bytes(fixed(&payload))),
            TlvType::UInt32 => Self::UInt32(u32::from_le_bytes(fixed(&payload))),
            TlvType::UInt64 => Self::UInt64(u64::from_le_bytes(fixed(&payload))),
            TlvType::Double => Self::Double(f64::from_le_bytes(fixed(&payload))),
            TlvType::String => {
                if payload.last() != Some(&STRING_SENTINEL) {
                    return Err(invalid_length());
                }
                let mut bytes = payload;
                bytes.pop();
                let s = String::from_utf8(bytes)
                    .map_err(|e| Error::InvalidValue(format!("string payload is not UTF-8: {e}")))?;
                Self::String(s)
            }
        })
    }

    /// Typed accessor. Fails with `TypeMismatch` on [`TlvValue::Empty`] or when
    /// the stored discriminant is not the one `T` maps to.
    pub fn get<T: FromTlv>(&self) -> Result<T> {
        T::from_tlv(self).ok_or_else(|| Error::type_mismatch(T::TLV_TYPE.name(), self.kind_name()))
    }

    /// Borrowed string view, without copying.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(Error::type_mismatch(TlvType::String.name(), other.kind_name())),
        }
    }
}

/// Kopiert einen Slice bekannter Laenge in ein Array (Laenge vorher geprueft).
fn fixed<const N: usize>(payload: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&payload[..N]);
    out
}

/// Same discriminant and byte-identical payload. Doubles compare by bit
/// pattern, so `NaN == NaN` holds and `0.0 != -0.0`.
impl PartialEq for TlvValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Int8(a), Self::Int8(b)) => a == b,
            (Self::Int16(a), Self::Int16(b)) => a == b,
            (Self::Int32(a), Self::Int32(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::UInt8(a), Self::UInt8(b)) => a == b,
            (Self::UInt16(a), Self::UInt16(b)) => a == b,
            (Self::UInt32(a), Self::UInt32(b)) => a == b,
            (Self::UInt64(a), Self::UInt64(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TlvValue {}

/// Scalar types the typed accessor can produce.
pub trait FromTlv: Sized {
    /// Discriminant this type is stored under.
    const TLV_TYPE: TlvType;

    /// Extracts the scalar, `None` on any other variant.
    fn from_tlv(value: &TlvValue) -> Option<Self>;
}

macro_rules! scalar_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for TlvValue {
                #[inline]
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }

            impl FromTlv for $ty {
                const TLV_TYPE: TlvType = TlvType::$variant;

                #[inline]
                fn from_tlv(value: &TlvValue) -> Option<Self> {
                    match value {
                        TlvValue::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

scalar_conversions! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f64 => Double,
}

impl From<f32> for TlvValue {
    /// Single precision is widened; it is not round-tripped as `f32`.
    fn from(v: f32) -> Self {
        Self::Double(f64::from(v))
    }
}

impl From<bool> for TlvValue {
    /// There is no boolean tag: `true`/`false` become `UInt8` 1/0.
    fn from(v: bool) -> Self {
        Self::UInt8(u8::from(v))
    }
}

impl From<&str> for TlvValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for TlvValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl FromTlv for String {
    const TLV_TYPE: TlvType = TlvType::String;

    fn from_tlv(value: &TlvValue) -> Option<Self> {
        match value {
            TlvValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Debug-Darstellung: `type: <tag> <name> size: <len> value: <value>`.
impl fmt::Display for TlvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(ty) = self.tlv_type() else {
            return f.write_str("- - - - - - ");
        };
        write!(f, "type: {:<4} {:<10} size: {:<4} value: ", ty.tag(), ty.name(), self.len())?;
        match self {
            Self::Empty => Ok(()),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}
