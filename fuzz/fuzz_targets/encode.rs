#![no_main]
use libfuzzer_sys::fuzz_target;
use jsontlv::EncoderOptions;

fuzz_target!(|data: &[u8]| {
    // Arbitrary input lines: malformed ones are skipped, nothing may panic.
    let _ = jsontlv::encode_lines(data, &EncoderOptions::default());
    let _ = jsontlv::encode_lines(data, &EncoderOptions::default().with_strict());
});
