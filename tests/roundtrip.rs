//! Library-level round trips: JSON lines -> TLV -> decoded pairs.

use std::io::Cursor;

use jsontlv::{
    decode, decode_stream, encode_stream, EncoderOptions, Entry, Error, KeyDictionary, TlvStreamReader,
    TlvValue,
};

/// Erzeugt eine deterministische Folge von Records mit wechselnden Keys.
fn generated_input(records: usize) -> String {
    let mut out = String::new();
    for i in 0..records {
        let key = format!("k{}", i % 37);
        out.push_str(&format!(
            "{{\"{key}\":{i},\"neg\":-{i},\"f\":{i}.5,\"s\":\"row {i}\",\"b\":{}}}\n",
            i % 2 == 0
        ));
    }
    out
}

#[test]
fn roundtrip_generated_records() {
    let input = generated_input(500);
    let mut bytes = Vec::new();
    let summary = encode_stream(Cursor::new(input.as_bytes()), &mut bytes, &EncoderOptions::default()).unwrap();
    assert_eq!(summary.stats.records, 500);
    assert_eq!(summary.stats.fields, 2500);
    assert_eq!(summary.keys, 37 + 4);

    let decoded = decode_stream(bytes.as_slice()).unwrap();
    assert_eq!(decoded.fields().len(), 2500);

    // Werte pro Record in Dokumentreihenfolge
    let named: Vec<(&str, &TlvValue)> = decoded.named_fields().collect();
    for (i, record) in named.chunks(5).enumerate() {
        assert_eq!(record[0].0, format!("k{}", i % 37));
        assert_eq!(record[0].1.get::<u64>().ok().or_else(|| widen(record[0].1)), Some(i as u64));
        assert_eq!(record[1].0, "neg");
        if i == 0 {
            // "-0" ist die Ganzzahl 0
            assert_eq!(record[1].1, &TlvValue::UInt8(0));
        } else {
            assert_eq!(widen_signed(record[1].1), Some(-(i as i64)));
        }
        assert_eq!(record[2].1, &TlvValue::Double(i as f64 + 0.5));
        assert_eq!(record[3].1.as_str().unwrap(), format!("row {i}"));
        assert_eq!(record[4].1, &TlvValue::UInt8(u8::from(i % 2 == 0)));
    }
}

fn widen(v: &TlvValue) -> Option<u64> {
    match v {
        TlvValue::UInt8(x) => Some(u64::from(*x)),
        TlvValue::UInt16(x) => Some(u64::from(*x)),
        TlvValue::UInt32(x) => Some(u64::from(*x)),
        _ => None,
    }
}

fn widen_signed(v: &TlvValue) -> Option<i64> {
    match v {
        TlvValue::Int8(x) => Some(i64::from(*x)),
        TlvValue::Int16(x) => Some(i64::from(*x)),
        _ => None,
    }
}

/// Die Dictionary-IDs folgen der Reihenfolge des ersten Auftretens.
#[test]
fn dictionary_follows_first_seen_order() {
    let input = "{\"zeta\":1,\"alpha\":2}\n{\"mid\":3,\"zeta\":4}\n";
    let mut bytes = Vec::new();
    encode_stream(Cursor::new(input), &mut bytes, &EncoderOptions::default()).unwrap();

    let keys: Vec<Entry> = TlvStreamReader::new(bytes.as_slice())
        .map(Result::unwrap)
        .filter(|e| matches!(e, Entry::Key { .. }))
        .collect();
    assert_eq!(
        keys,
        vec![
            Entry::Key { name: "zeta".into(), id: 1 },
            Entry::Key { name: "alpha".into(), id: 2 },
            Entry::Key { name: "mid".into(), id: 3 },
        ]
    );
}

#[test]
fn unicode_keys_and_values() {
    let input = "{\"gr\u{fc}\u{df}e\":\"\u{65e5}\u{672c}\",\"emoji\":\"\u{1f980}\"}\n";
    let mut bytes = Vec::new();
    encode_stream(Cursor::new(input), &mut bytes, &EncoderOptions::default()).unwrap();
    let decoded = decode(&bytes).unwrap();
    let named: Vec<(&str, String)> = decoded
        .named_fields()
        .map(|(k, v)| (k, v.get::<String>().unwrap()))
        .collect();
    assert_eq!(
        named,
        vec![
            ("gr\u{fc}\u{df}e", "\u{65e5}\u{672c}".to_string()),
            ("emoji", "\u{1f980}".to_string()),
        ]
    );
}

/// Mehr als 65535 verschiedene Keys: DictionaryFull bricht ab.
#[test]
fn dictionary_full_aborts() {
    let mut input = String::new();
    for i in 0..=u16::MAX as u32 {
        input.push_str(&format!("{{\"key{i}\":1}}\n"));
    }
    let mut bytes = Vec::new();
    let err = encode_stream(Cursor::new(input), &mut bytes, &EncoderOptions::default()).unwrap_err();
    assert_eq!(err, Error::DictionaryFull);
}

#[test]
fn dictionary_rebuilt_from_stream_matches() {
    let mut bytes = Vec::new();
    encode_stream(Cursor::new(generated_input(50)), &mut bytes, &EncoderOptions::default()).unwrap();
    let decoded = decode(&bytes).unwrap();

    let rebuilt = KeyDictionary::from_entries(decoded.dictionary().iter().map(|(k, id)| (k.to_string(), id))).unwrap();
    assert_eq!(rebuilt.len(), decoded.dictionary().len());
    assert_eq!(rebuilt.get("neg"), decoded.dictionary().get("neg"));
}
