//! Streaming JSON lines → TLV with bounded memory use.
//!
//! The input is never loaded completely: only the current line and the
//! dictionary stay resident. The output goes through a `BufWriter`, so the
//! sink sees large writes even though every TLV is emitted separately.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::info;

use crate::encoder::{EncodeSummary, RecordEncoder};
use crate::line_reader::LineReader;
use crate::options::EncoderOptions;
use crate::{Error, Result};

/// Lese-Puffer fuer die JSON-Eingabe.
const READ_BUFFER: usize = 64 * 1024;

/// Encodiert einen JSON-Lines-Stream zu TLV.
///
/// Returns the sink-side summary. On error the sink holds whatever was
/// written before the failure; callers writing files should use a temporary
/// path (see [`encode_file`]).
pub fn encode_stream(
    json_reader: impl Read,
    tlv_writer: impl Write,
    options: &EncoderOptions,
) -> Result<EncodeSummary> {
    let mut lines = LineReader::new(BufReader::with_capacity(READ_BUFFER, json_reader));
    let mut encoder = RecordEncoder::new(BufWriter::new(tlv_writer), *options)?;

    while let Some((number, line)) = lines.next_line()? {
        encoder.encode_line(number, line)?;
    }

    let (writer, summary) = encoder.finish()?;
    // BufWriter::into_inner flusht; ein Fehler dabei darf nicht verloren gehen
    writer
        .into_inner()
        .map_err(|e| Error::IoError(format!("error flushing output: {}", e.error())))?;
    Ok(summary)
}

/// Encodiert eine JSON-Lines-Datei zu einer TLV-Datei.
///
/// The output file is created (or truncated) before the first line is read.
pub fn encode_file(json_path: &Path, tlv_path: &Path, options: &EncoderOptions) -> Result<EncodeSummary> {
    options.validate()?;
    let json_file = File::open(json_path)
        .map_err(|e| Error::IoError(format!("cannot open input file '{}': {e}", json_path.display())))?;
    let tlv_file = File::create(tlv_path)
        .map_err(|e| Error::IoError(format!("cannot create output file '{}': {e}", tlv_path.display())))?;

    let summary = encode_stream(json_file, tlv_file, options)?;
    info!("{} -> {}", json_path.display(), tlv_path.display());
    Ok(summary)
}
