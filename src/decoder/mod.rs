//! TLV stream reader – inverse of the record encoder.
//!
//! Liest eine erzeugte Datei als Folge von Paaren zurueck:
//!
//! - `UInt16` id, value  → [`Entry::Field`]
//! - `String` key, `UInt16` id → [`Entry::Key`]
//!
//! All field pairs come first; the first pair starting with a String TLV opens
//! the trailing dictionary block, after which only key pairs may follow.
//! Record boundaries are not part of the wire format and cannot be recovered.
//!
//! # Beispiel
//!
//! ```
//! use jsontlv::decoder::decode;
//! use jsontlv::encoder::encode_lines;
//! use jsontlv::options::EncoderOptions;
//!
//! // Encode → Decode Round-Trip
//! let bytes = encode_lines(b"{\"key1\":\"value\",\"key2\":42}\n", &EncoderOptions::default()).unwrap();
//! let decoded = decode(&bytes).unwrap();
//! let named: Vec<_> = decoded.named_fields().map(|(k, v)| (k, v.to_string())).collect();
//! assert_eq!(named.len(), 2);
//! assert_eq!(named[0].0, "key1");
//! assert_eq!(decoded.dictionary().get("key2"), Some(2));
//! ```

use std::io::{BufReader, Read};

use log::debug;

use crate::codec::TlvCodec;
use crate::dictionary::{KeyDictionary, KeyId};
use crate::options::EncoderOptions;
use crate::value::TlvValue;
use crate::{Error, Result};

/// One pair read from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Field of a record: dictionary id and value.
    Field { id: KeyId, value: TlvValue },
    /// Mapping from the trailing dictionary block.
    Key { name: String, id: KeyId },
}

/// Position im Stream: zuerst Felder, danach nur noch das Dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Fields,
    Dictionary,
}

/// Pull reader over a TLV stream produced by the encoder.
///
/// Also an [`Iterator`] over `Result<Entry>`; after the first error the
/// iterator is exhausted.
pub struct TlvStreamReader<R: Read> {
    codec: TlvCodec<R>,
    section: Section,
    /// Anzahl gelesener Paare (fuer Fehlermeldungen).
    pairs: u64,
    failed: bool,
}

impl<R: Read> TlvStreamReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            codec: TlvCodec::with_stream(reader),
            section: Section::Fields,
            pairs: 0,
            failed: false,
        }
    }

    /// Rejects string payloads longer than `max` (`None` = unbegrenzt).
    pub fn with_max_value_length(mut self, max: Option<u32>) -> Self {
        self.codec.set_max_value_length(max);
        self
    }

    /// True once the first dictionary pair has been read.
    pub fn in_dictionary(&self) -> bool {
        self.section == Section::Dictionary
    }

    /// Number of complete pairs read so far.
    pub fn pairs_read(&self) -> u64 {
        self.pairs
    }

    /// Reads the next pair. `Ok(None)` at a clean end-of-stream.
    pub fn next_entry(&mut self) -> Result<Option<Entry>> {
        let Some(first) = self.codec.try_read_value()? else {
            return Ok(None);
        };

        let entry = match (self.section, first) {
            (Section::Fields, TlvValue::UInt16(id)) => {
                if id == 0 {
                    return Err(Error::InvalidStructure(format!(
                        "field id 0 in pair {}",
                        self.pairs + 1
                    )));
                }
                let value = self.second_half("field id")?;
                Entry::Field { id, value }
            }
            (Section::Dictionary, TlvValue::UInt16(id)) => {
                return Err(Error::InvalidStructure(format!(
                    "field id {id} after the start of the dictionary block"
                )));
            }
            (_, TlvValue::String(name)) => {
                if self.section == Section::Fields {
                    debug!("dictionary block starts at pair {}", self.pairs + 1);
                    self.section = Section::Dictionary;
                }
                let id = match self.second_half("dictionary key")? {
                    TlvValue::UInt16(id) => id,
                    other => {
                        return Err(Error::InvalidStructure(format!(
                            "dictionary key {name:?} followed by {} instead of a u16 id",
                            other.kind_name()
                        )));
                    }
                };
                Entry::Key { name, id }
            }
            (_, other) => {
                return Err(Error::InvalidStructure(format!(
                    "pair {} starts with {}, expected a u16 id or a string key",
                    self.pairs + 1,
                    other.kind_name()
                )));
            }
        };
        self.pairs += 1;
        Ok(Some(entry))
    }

    /// Liest die zweite Haelfte eines Paars; Stream-Ende ist hier ein Fehler.
    fn second_half(&mut self, what: &str) -> Result<TlvValue> {
        self.codec.try_read_value()?.ok_or_else(|| {
            Error::IoError(format!(
                "stream ends after the {what} of pair {}",
                self.pairs + 1
            ))
        })
    }

    pub fn into_inner(self) -> Result<R> {
        self.codec.into_inner()
    }
}

impl<R: Read> Iterator for TlvStreamReader<R> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_entry() {
            Ok(entry) => entry.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Completely decoded stream: all field pairs plus the rebuilt dictionary.
#[derive(Debug, Clone, Default)]
pub struct DecodedStream {
    fields: Vec<(KeyId, TlvValue)>,
    dictionary: KeyDictionary,
}

impl DecodedStream {
    /// Field pairs in stream order.
    pub fn fields(&self) -> &[(KeyId, TlvValue)] {
        &self.fields
    }

    pub fn dictionary(&self) -> &KeyDictionary {
        &self.dictionary
    }

    /// Field pairs with their ids resolved to key names.
    pub fn named_fields(&self) -> impl Iterator<Item = (&str, &TlvValue)> + '_ {
        // Ids wurden in decode_stream gegen das Dictionary geprueft
        self.fields
            .iter()
            .filter_map(|(id, value)| self.dictionary.key(*id).map(|name| (name, value)))
    }

    pub fn into_parts(self) -> (Vec<(KeyId, TlvValue)>, KeyDictionary) {
        (self.fields, self.dictionary)
    }
}

// ============================================================================
// High-Level API
// ============================================================================

/// Decodiert einen TLV-Puffer vollstaendig.
pub fn decode(data: &[u8]) -> Result<DecodedStream> {
    collect(TlvStreamReader::new(data))
}

/// Decodiert einen TLV-Stream vollstaendig (gepuffert).
pub fn decode_stream(reader: impl Read) -> Result<DecodedStream> {
    decode_stream_with_options(reader, &EncoderOptions::default())
}

/// Like [`decode_stream`], honoring `max_value_length` from `options`.
pub fn decode_stream_with_options(reader: impl Read, options: &EncoderOptions) -> Result<DecodedStream> {
    options.validate()?;
    collect(TlvStreamReader::new(BufReader::new(reader)).with_max_value_length(options.max_value_length))
}

fn collect<R: Read>(reader: TlvStreamReader<R>) -> Result<DecodedStream> {
    let mut fields = Vec::new();
    let mut keys = Vec::new();
    for entry in reader {
        match entry? {
            Entry::Field { id, value } => fields.push((id, value)),
            Entry::Key { name, id } => keys.push((name, id)),
        }
    }

    let dictionary = KeyDictionary::from_entries(keys)?;
    if let Some((id, _)) = fields.iter().find(|(id, _)| dictionary.key(*id).is_none()) {
        return Err(Error::InvalidDictionary(format!(
            "field id {id} has no entry in the dictionary block"
        )));
    }
    Ok(DecodedStream { fields, dictionary })
}

// ============================================================================
// Tests
// ============================================================================
