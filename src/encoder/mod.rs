//! Record encoder – JSON lines to TLV with dictionary-encoded keys.
//!
//! For every field of a record, in document order, the encoder resolves the
//! field name to its dictionary id and emits two TLVs: the id (`UInt16`) and
//! the classified value. At end-of-stream [`RecordEncoder::finish`] appends
//! the dictionary as (`String` key, `UInt16` id) pairs in first-seen order.
//!
//! Single writer, strictly sequential: ids depend on the order records are
//! fed in.
//!
//! # Beispiel
//!
//! ```
//! use jsontlv::encoder::encode_lines;
//! use jsontlv::options::EncoderOptions;
//!
//! let input = b"{\"key1\":\"value\",\"key2\":42}\n{\"key2\":-5}\n";
//! let bytes = encode_lines(input, &EncoderOptions::default()).unwrap();
//!
//! // Erstes Feld: id 1 als UInt16 (Tag 8, Laenge 2)
//! assert_eq!(&bytes[..7], &[8, 2, 0, 0, 0, 1, 0]);
//! ```

use std::io::Write;

use log::{info, warn};

use crate::codec::TlvCodec;
use crate::dictionary::{KeyDictionary, KeyId};
use crate::error::{Error, Result};
use crate::line_reader::LineReader;
use crate::options::EncoderOptions;
use crate::record::Record;
use crate::value::TlvValue;

/// Counters for one encoding session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Input lines seen, including blank and skipped ones.
    pub lines: u64,
    /// Records written to the output.
    pub records: u64,
    /// Malformed lines skipped.
    pub skipped: u64,
    /// Field pairs written.
    pub fields: u64,
}

/// Result of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSummary {
    pub stats: EncodeStats,
    /// Distinct keys in the trailing dictionary block.
    pub keys: usize,
    /// Total bytes written, dictionary block included.
    pub bytes_written: u64,
}

/// What happened to one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// The record was written with this many fields.
    Encoded { fields: usize },
    /// The line was not flat-scalar JSON and was skipped.
    Skipped,
    /// Empty or whitespace-only line, ignored.
    Blank,
}

/// Streaming encoder owning the output sink and the session dictionary.
pub struct RecordEncoder<W: Write> {
    codec: TlvCodec<W>,
    dictionary: KeyDictionary,
    options: EncoderOptions,
    stats: EncodeStats,
}

impl<W: Write> RecordEncoder<W> {
    /// Erstellt einen neuen Encoder.
    ///
    /// Gibt Fehler zurueck wenn die Options ungueltig sind.
    pub fn new(writer: W, options: EncoderOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            codec: TlvCodec::with_stream(writer).with_max_value_length(options.max_value_length),
            dictionary: KeyDictionary::new(),
            options,
            stats: EncodeStats::default(),
        })
    }

    pub fn dictionary(&self) -> &KeyDictionary {
        &self.dictionary
    }

    pub fn stats(&self) -> EncodeStats {
        self.stats
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    pub fn bytes_written(&self) -> u64 {
        self.codec.bytes_written()
    }

    /// Writes one already classified record.
    pub fn encode_record(&mut self, record: &Record) -> Result<()> {
        for (key, value) in record.fields() {
            let id = self.dictionary.resolve(key)?;
            self.write_pair(id, value)?;
        }
        self.stats.records += 1;
        self.stats.fields += record.len() as u64;
        Ok(())
    }

    /// Parses and writes one input line.
    ///
    /// A line that is not flat-scalar JSON is skipped with a warning (or fails
    /// in strict mode). All other errors abort the run.
    pub fn encode_line(&mut self, line_number: u64, line: &[u8]) -> Result<LineOutcome> {
        self.stats.lines += 1;
        if line.iter().all(u8::is_ascii_whitespace) {
            return Ok(LineOutcome::Blank);
        }

        match Record::parse(line) {
            Ok(record) => {
                self.encode_record(&record)?;
                Ok(LineOutcome::Encoded { fields: record.len() })
            }
            Err(e) if e.is_recoverable() && !self.options.strict => {
                warn!("skipping line {line_number}: {}", e.at_line(line_number));
                self.stats.skipped += 1;
                Ok(LineOutcome::Skipped)
            }
            Err(Error::UnsupportedType(kind)) => {
                Err(Error::UnsupportedType(format!("{kind} on line {line_number}")))
            }
            Err(e) => Err(e.at_line(line_number)),
        }
    }

    /// Writes the dictionary block, flushes and returns the sink.
    ///
    /// Consumes the encoder: the block is written exactly once.
    pub fn finish(mut self) -> Result<(W, EncodeSummary)> {
        for (key, id) in self.dictionary.flush() {
            self.codec.write_value(&TlvValue::from(key))?;
            self.codec.write_value(&TlvValue::UInt16(id))?;
        }
        self.codec.flush()?;

        let summary = EncodeSummary {
            stats: self.stats,
            keys: self.dictionary.len(),
            bytes_written: self.codec.bytes_written(),
        };
        info!(
            "encoded {} records ({} lines skipped), {} keys, {} bytes",
            summary.stats.records, summary.stats.skipped, summary.keys, summary.bytes_written
        );
        Ok((self.codec.into_inner()?, summary))
    }

    /// Id zuerst, dann der Wert.
    #[inline]
    fn write_pair(&mut self, id: KeyId, value: &TlvValue) -> Result<()> {
        self.codec.write_value(&TlvValue::UInt16(id))?;
        self.codec.write_value(value)
    }
}

/// Encodes a complete in-memory JSON-lines buffer.
pub fn encode_lines(input: &[u8], options: &EncoderOptions) -> Result<Vec<u8>> {
    let mut encoder = RecordEncoder::new(Vec::new(), *options)?;
    let mut lines = LineReader::new(input);
    while let Some((number, line)) = lines.next_line()? {
        encoder.encode_line(number, line)?;
    }
    let (bytes, _summary) = encoder.finish()?;
    Ok(bytes)
}

// ============================================================================
// Tests
// ============================================================================
