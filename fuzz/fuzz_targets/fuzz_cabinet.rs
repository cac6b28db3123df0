#![no_main]
use libfuzzer_sys::fuzz_target;
use quantum_cab::{decode_cabinet, CabinetParser, DecodeOptions};

fuzz_target!(|data: &[u8]| {
    let Ok(cabinet) = CabinetParser::parse(data) else {
        return;
    };
    // Keep zero-filled fallbacks small.
    let options = DecodeOptions {
        fallback_block_size: 64,
        ..Default::default()
    };
    let _ = decode_cabinet(&cabinet, &options);
});
