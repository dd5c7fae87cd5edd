//! TLV writer/reader over a byte sink/source.
//!
//! Wire format of one value: 1 tag byte, 4-byte little-endian payload length,
//! then exactly `length` payload bytes. No padding, no alignment.
//!
//! Every transfer is all-or-nothing: a short write or a read that runs out of
//! input before the declared length is an [`Error::IoError`]. A codec without
//! an open stream fails every operation with [`Error::NotOpen`].

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::tlv_type::TlvType;
use crate::value::TlvValue;
use crate::{Error, Result};

/// Groesse des Headers: Tag (1) + Laenge (4).
pub const HEADER_LEN: usize = 5;

/// Obergrenze fuer die initiale Puffer-Allokation beim Lesen eines Payloads.
/// Groessere Payloads wachsen inkrementell, damit eine korrupte Laenge keine
/// riesige Allokation ausloest.
const READ_CHUNK_HINT: usize = 64 * 1024;

/// TLV codec over a stream `S`.
///
/// Write methods need `S: Write`, read methods `S: Read`, [`reset`](Self::reset)
/// needs `S: Seek`. The production pipeline only writes.
#[derive(Debug)]
pub struct TlvCodec<S> {
    stream: Option<S>,
    /// Optionale Obergrenze fuer String-Payloads (Schreiben und Lesen).
    max_value_length: Option<u32>,
    bytes_written: u64,
}

impl<S> Default for TlvCodec<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> TlvCodec<S> {
    /// Creates a codec without a stream. Every operation fails with `NotOpen`
    /// until [`open`](Self::open) is called.
    pub fn new() -> Self {
        Self {
            stream: None,
            max_value_length: None,
            bytes_written: 0,
        }
    }

    /// Creates a codec over an already opened stream.
    pub fn with_stream(stream: S) -> Self {
        Self {
            stream: Some(stream),
            max_value_length: None,
            bytes_written: 0,
        }
    }

    /// Attaches a stream, replacing (and dropping) any previous one.
    pub fn open(&mut self, stream: S) {
        self.stream = Some(stream);
        self.bytes_written = 0;
    }

    /// Limits string payload lengths; `None` removes the limit.
    pub fn with_max_value_length(mut self, max: Option<u32>) -> Self {
        self.max_value_length = max;
        self
    }

    /// See [`with_max_value_length`](Self::with_max_value_length).
    pub fn set_max_value_length(&mut self, max: Option<u32>) {
        self.max_value_length = max;
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Total bytes written through this codec since the stream was attached.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn get_ref(&self) -> Option<&S> {
        self.stream.as_ref()
    }

    /// Detaches and returns the stream.
    pub fn into_inner(self) -> Result<S> {
        self.stream.ok_or(Error::NotOpen)
    }

    #[inline]
    fn stream_mut(&mut self) -> Result<&mut S> {
        self.stream.as_mut().ok_or(Error::NotOpen)
    }

    fn check_string_length(&self, length: u64) -> Result<()> {
        match self.max_value_length {
            Some(max) if length > u64::from(max) => Err(Error::ValueLengthExceeded { length, max }),
            _ => Ok(()),
        }
    }
}

impl TlvCodec<File> {
    /// Creates (or truncates) `path` for reading and writing.
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| Error::IoError(format!("cannot open '{}': {e}", path.display())))?;
        Ok(Self::with_stream(file))
    }
}

impl<S: Write> TlvCodec<S> {
    /// Emits tag, length and payload of `value`.
    ///
    /// `Empty` values cannot be encoded and fail with `TypeMismatch`.
    pub fn write_value(&mut self, value: &TlvValue) -> Result<()> {
        let Some(tlv_type) = value.tlv_type() else {
            return Err(Error::type_mismatch("initialized value", value.kind_name()));
        };
        let length = value.len() as u64;
        if tlv_type == TlvType::String {
            self.check_string_length(length)?;
        }
        let wire_len = u32::try_from(length)
            .map_err(|_| Error::ValueLengthExceeded { length, max: u32::MAX })?;

        let mut header = [0u8; HEADER_LEN];
        header[0] = tlv_type.tag();
        header[1..].copy_from_slice(&wire_len.to_le_bytes());

        let stream = self.stream_mut()?;
        stream.write_all(&header).map_err(write_error)?;
        value.write_payload(stream).map_err(write_error)?;
        self.bytes_written += HEADER_LEN as u64 + length;
        Ok(())
    }

    /// Fixed-width passthrough: writes `bytes` verbatim, without a header.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream_mut()?.write_all(bytes).map_err(write_error)?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stream_mut()?.flush().map_err(write_error)
    }
}

impl<S: Read> TlvCodec<S> {
    /// Fills `buf` completely from the stream.
    pub fn read_raw(&mut self, buf: &mut [u8]) -> Result<()> {
        read_exact_or_eof(self.stream_mut()?, buf, "raw bytes")
    }

    /// Reads one value. End-of-stream anywhere, including before the tag, is an error.
    pub fn read_value(&mut self) -> Result<TlvValue> {
        self.try_read_value()?.ok_or_else(|| {
            Error::IoError("attempt to read past the end of the stream".to_string())
        })
    }

    /// Reads one value, or `None` if the stream ends cleanly before the tag byte.
    pub fn try_read_value(&mut self) -> Result<Option<TlvValue>> {
        let max_value_length = self.max_value_length;
        let stream = self.stream_mut()?;

        let mut tag = [0u8; 1];
        loop {
            match stream.read(&mut tag) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::IoError(format!("error reading the stream: {e}"))),
            }
        }
        let tlv_type = TlvType::from_tag(tag[0])?;

        let mut len_bytes = [0u8; 4];
        read_exact_or_eof(stream, &mut len_bytes, "length")?;
        let length = u32::from_le_bytes(len_bytes);

        // Laenge vor dem Lesen des Payloads pruefen
        match tlv_type.fixed_width() {
            Some(width) if width != length => {
                return Err(Error::InvalidLength { tag: tag[0], length });
            }
            None if length == 0 => {
                return Err(Error::InvalidLength { tag: tag[0], length });
            }
            None => {
                if let Some(max) = max_value_length {
                    if length > max {
                        return Err(Error::ValueLengthExceeded { length: u64::from(length), max });
                    }
                }
            }
            Some(_) => {}
        }

        let expected = length as usize;
        let mut payload = Vec::with_capacity(expected.min(READ_CHUNK_HINT));
        let got = stream
            .take(u64::from(length))
            .read_to_end(&mut payload)
            .map_err(|e| Error::IoError(format!("error reading the stream: {e}")))?;
        if got != expected {
            return Err(Error::IoError(format!(
                "attempt to read past the end of the stream: payload declared {expected} bytes, got {got}"
            )));
        }

        TlvValue::from_parts(tlv_type, payload).map(Some)
    }
}

impl<S: Seek> TlvCodec<S> {
    /// Repositions to the start of the stream (read-after-write verification).
    pub fn reset(&mut self) -> Result<u64> {
        self.stream_mut()?
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::IoError(format!("seek failed: {e}")))
    }

    /// Current offset in the stream.
    pub fn position(&mut self) -> Result<u64> {
        self.stream_mut()?
            .stream_position()
            .map_err(|e| Error::IoError(format!("seek failed: {e}")))
    }
}

fn write_error(e: std::io::Error) -> Error {
    Error::IoError(format!("error writing the stream: {e}"))
}

fn read_exact_or_eof<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            Error::IoError(format!("attempt to read past the end of the stream ({what})"))
        } else {
            Error::IoError(format!("error reading the stream ({what}): {e}"))
        }
    })
}
