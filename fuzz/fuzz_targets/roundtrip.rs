#![no_main]
use libfuzzer_sys::fuzz_target;
use jsontlv::EncoderOptions;

fuzz_target!(|data: &[u8]| {
    // Alles was der Encoder schreibt, muss der Decoder wieder lesen koennen.
    if let Ok(bytes) = jsontlv::encode_lines(data, &EncoderOptions::default()) {
        let decoded = jsontlv::decode(&bytes).expect("encoder output must decode");
        assert_eq!(decoded.named_fields().count(), decoded.fields().len());
    }
});
