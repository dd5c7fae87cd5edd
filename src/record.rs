//! Flat JSON records and scalar classification.
//!
//! A record is one JSON object whose values are strings, integers, floats or
//! booleans. Parsing and classification happen completely before the encoder
//! touches the dictionary or the sink, so a rejected line leaves no trace.
//!
//! Integer width selection (first match wins, in ascending order):
//! - non-negative: u8, u16, u32, u64, where a width is taken only if the value
//!   also fits the signed type of the same width (127 is `UInt8`, 128 is
//!   `UInt16`); values above `i64::MAX` are `UInt64`
//! - negative: i8, i16, i32, i64
//!
//! Floats are always `Double`; booleans are `UInt8` 0/1. An integer literal
//! `-0` is the integer 0 (`UInt8`), while `-0.0` stays a `Double`.

use serde_json::{Map, Value};

use crate::value::TlvValue;
use crate::{Error, Result};

/// One decoded input line: field name and classified value, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, TlvValue)>,
}

impl Record {
    /// Parses one JSON line into a record.
    ///
    /// Invalid JSON, a non-object top level and nested arrays/objects are
    /// `ParseError` (the line is not flat-scalar JSON). `null` is a scalar
    /// outside the supported set and yields `UnsupportedType`.
    pub fn parse(line: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(line)
            .map_err(|e| Error::parse_error(0, format!("invalid JSON: {e}")))?;
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(Error::parse_error(
                0,
                format!("expected a JSON object, found {}", json_kind(&other)),
            )),
        }
    }

    /// Classifies every field of an already parsed object.
    pub fn from_map(map: Map<String, Value>) -> Result<Self> {
        let mut fields = Vec::with_capacity(map.len());
        for (key, value) in map {
            let classified = classify(&value).map_err(|e| match e {
                Error::ParseError { line, message } => Error::ParseError {
                    line,
                    message: format!("field {key:?}: {message}"),
                },
                Error::UnsupportedType(kind) => Error::UnsupportedType(format!("{kind} (field {key:?})")),
                other => other,
            })?;
            fields.push((key, classified));
        }
        Ok(Self { fields })
    }

    /// Builds a record from already classified fields.
    pub fn from_fields(fields: Vec<(String, TlvValue)>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[(String, TlvValue)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> Vec<(String, TlvValue)> {
        self.fields
    }
}

/// Converts one JSON scalar into its TLV representation.
pub fn classify(value: &Value) -> Result<TlvValue> {
    match value {
        Value::Bool(b) => Ok(TlvValue::from(*b)),
        Value::String(s) => Ok(TlvValue::from(s.as_str())),
        Value::Number(n) => {
            // arbitrary_precision: das Literal bleibt erhalten, `-0` ist also
            // eine Ganzzahl (as_i64 == 0) und `-0.0` ein Double
            if let Some(u) = n.as_u64() {
                Ok(narrowest_unsigned(u))
            } else if let Some(i) = n.as_i64() {
                Ok(match u64::try_from(i) {
                    Ok(u) => narrowest_unsigned(u),
                    Err(_) => narrowest_signed(i),
                })
            } else if let Some(f) = n.as_f64() {
                Ok(TlvValue::Double(f))
            } else {
                // Nicht als endliches f64 darstellbar (z.B. 1e400)
                Err(Error::parse_error(0, format!("number {n} is out of range")))
            }
        }
        Value::Null => Err(Error::UnsupportedType("null".to_string())),
        Value::Array(_) | Value::Object(_) => Err(Error::parse_error(
            0,
            format!("nested {} values are not supported", json_kind(value)),
        )),
    }
}

/// Smallest unsigned width for a non-negative `v`.
///
/// The width must also hold `v` as its signed counterpart, so a payload can be
/// read back as either signedness without loss.
pub fn narrowest_unsigned(v: u64) -> TlvValue {
    if v <= i8::MAX as u64 {
        TlvValue::UInt8(v as u8)
    } else if v <= i16::MAX as u64 {
        TlvValue::UInt16(v as u16)
    } else if v <= i32::MAX as u64 {
        TlvValue::UInt32(v as u32)
    } else {
        TlvValue::UInt64(v)
    }
}

/// Smallest signed width containing `v`.
///
/// Intended for negative values (non-negative JSON integers go through
/// [`narrowest_unsigned`]); short-circuits at the first width that fits.
pub fn narrowest_signed(v: i64) -> TlvValue {
    if let Ok(x) = i8::try_from(v) {
        TlvValue::Int8(x)
    } else if let Ok(x) = i16::try_from(v) {
        TlvValue::Int16(x)
    } else if let Ok(x) = i32::try_from(v) {
        TlvValue::Int32(x)
    } else {
        TlvValue::Int64(v)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
