//! jsontlv – JSON lines to compact TLV with dictionary-encoded keys
//!
//! Every input line holds one flat JSON object. Each field is written as two
//! TLVs: the key's dictionary id (`UInt16`) followed by the value in the
//! narrowest fitting numeric type, as `Double`, or as a string. After the last
//! record the dictionary is appended as (key, id) pairs.
//!
//! # Beispiel
//!
//! ```
//! use jsontlv::{decode, encode_lines, EncoderOptions, TlvValue};
//!
//! // Encode
//! let input = b"{\"key1\":\"value\",\"key2\":42,\"key3\":true}\n{\"key2\":-5,\"sadsf\":\"dsewtew\"}\n";
//! let bytes = encode_lines(input, &EncoderOptions::default()).unwrap();
//!
//! // Decode
//! let decoded = decode(&bytes).unwrap();
//! assert_eq!(decoded.fields().len(), 5);
//! assert_eq!(decoded.fields()[3], (2, TlvValue::Int8(-5)));
//! assert_eq!(decoded.dictionary().key(4), Some("sadsf"));
//! ```

pub mod codec;
pub mod decoder;
pub mod dictionary;
pub mod encoder;
pub mod error;
pub mod line_reader;
pub mod options;
pub mod record;
pub mod streaming;
pub mod tlv_type;
pub mod value;

pub use error::{Error, Result};

/// IndexMap mit ahash (deterministische Iteration + schnelles Hashing).
pub(crate) type FastIndexMap<K, V> = indexmap::IndexMap<K, V, ahash::RandomState>;

// Public API: Wire-Format
pub use codec::TlvCodec;
pub use tlv_type::TlvType;
pub use value::{FromTlv, TlvValue};

// Public API: Dictionary + Records
pub use dictionary::{KeyDictionary, KeyId};
pub use record::Record;

// Public API: Options
pub use options::EncoderOptions;

// Public API: Encoder/Decoder
pub use decoder::{decode, decode_stream, decode_stream_with_options, DecodedStream, Entry, TlvStreamReader};
pub use encoder::{encode_lines, EncodeStats, EncodeSummary, LineOutcome, RecordEncoder};

// Public API: Streaming
pub use streaming::{encode_file, encode_stream};
