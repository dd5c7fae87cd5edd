//! Central error types for the JSON-lines to TLV encoder.
//!
//! Only [`Error::ParseError`] is recoverable: the offending input line is
//! skipped and the run continues. Every other variant aborts the encoding pass
//! and leaves the output written so far on the sink.

use core::fmt;
use std::borrow::Cow;

/// All error kinds produced by the codec, the dictionary and the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Operation attempted on a codec without an open sink/source.
    NotOpen,
    /// Short read or write, or read past end-of-stream before the declared length.
    IoError(String),
    /// Typed accessor invoked against an incompatible or uninitialized value.
    TypeMismatch {
        /// Angefragter Typ.
        expected: Cow<'static, str>,
        /// Tatsaechlich gespeicherter Typ (`"empty"` fuer uninitialisierte Werte).
        found: Cow<'static, str>,
    },
    /// A scalar kind outside the closed set was found during classification.
    UnsupportedType(String),
    /// An input line is not valid flat-scalar JSON.
    ParseError {
        /// 1-basierte Zeilennummer (0 wenn nicht bekannt).
        line: u64,
        message: String,
    },
    /// A tag byte on the wire does not name a known discriminant.
    InvalidTag(u8),
    /// A declared payload length does not fit the discriminant.
    InvalidLength { tag: u8, length: u32 },
    /// A payload could not be turned into a value (e.g. invalid UTF-8).
    InvalidValue(String),
    /// A payload exceeds the configured maximum value length.
    ValueLengthExceeded { length: u64, max: u32 },
    /// All 16-bit dictionary ids are in use.
    DictionaryFull,
    /// A decoded dictionary block is inconsistent.
    InvalidDictionary(String),
    /// Entries in a TLV stream appear in an order the layout does not allow.
    InvalidStructure(String),
    /// An invalid combination of encoder options was specified.
    InvalidOption(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOpen => write!(f, "no open stream to read or write"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: requested {expected}, value holds {found}")
            }
            Self::UnsupportedType(kind) => write!(f, "unsupported data type in JSON: {kind}"),
            Self::ParseError { line, message } => {
                if *line == 0 {
                    write!(f, "parse error: {message}")
                } else {
                    write!(f, "parse error on line {line}: {message}")
                }
            }
            Self::InvalidTag(tag) => write!(f, "invalid TLV tag {tag}"),
            Self::InvalidLength { tag, length } => {
                write!(f, "invalid length {length} for TLV tag {tag}")
            }
            Self::InvalidValue(msg) => write!(f, "invalid value: {msg}"),
            Self::ValueLengthExceeded { length, max } => {
                write!(f, "value length {length} exceeds maximum {max}")
            }
            Self::DictionaryFull => {
                write!(f, "dictionary full: more than {} distinct keys", u16::MAX)
            }
            Self::InvalidDictionary(msg) => write!(f, "invalid dictionary: {msg}"),
            Self::InvalidStructure(msg) => write!(f, "invalid TLV stream structure: {msg}"),
            Self::InvalidOption(msg) => write!(f, "invalid option: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

impl Error {
    /// Erstellt einen `TypeMismatch` Fehler.
    pub fn type_mismatch(
        expected: impl Into<Cow<'static, str>>,
        found: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Erstellt einen `ParseError` fuer eine Eingabezeile.
    pub fn parse_error(line: u64, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Setzt die Zeilennummer eines `ParseError` (andere Varianten bleiben unveraendert).
    pub fn at_line(self, line: u64) -> Self {
        match self {
            Self::ParseError { message, .. } => Self::ParseError { line, message },
            other => other,
        }
    }

    /// True if the encoder may skip the current line and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ParseError { .. })
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
