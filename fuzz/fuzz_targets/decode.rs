#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Beliebige Bytes duerfen den Reader nie zum Panic bringen; das Limit
    // verhindert riesige Allokationen durch korrupte Laengen.
    let reader = jsontlv::TlvStreamReader::new(data).with_max_value_length(Some(1 << 20));
    for entry in reader {
        if entry.is_err() {
            break;
        }
    }
    let _ = jsontlv::decode(data);
});
