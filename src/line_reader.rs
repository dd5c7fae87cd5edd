//! Line-oriented input: yields one JSON line at a time.
//!
//! Only the current line is held in memory. Trailing `\n` and `\r` are
//! stripped; bytes are passed on unvalidated (UTF-8 is checked by the JSON
//! parser, so an invalid line becomes a skippable parse error).

use std::io::BufRead;

use crate::{Error, Result};

/// Streaming line reader over any buffered source.
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
    /// Nummer der zuletzt gelieferten Zeile (1-basiert).
    line_number: u64,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(1024),
            line_number: 0,
        }
    }

    /// Reads the next line. Returns `None` at end of input.
    ///
    /// The returned slice borrows the internal buffer and is valid until the
    /// next call.
    pub fn next_line(&mut self) -> Result<Option<(u64, &[u8])>> {
        self.buf.clear();
        let n = self
            .inner
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| Error::IoError(format!("error reading input line {}: {e}", self.line_number + 1)))?;
        if n == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let mut end = self.buf.len();
        while end > 0 && matches!(self.buf[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        Ok(Some((self.line_number, &self.buf[..end])))
    }

    /// Number of lines returned so far.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}
