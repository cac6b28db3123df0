#![no_main]
use libfuzzer_sys::fuzz_target;
use quantum_cab::CabinetParser;

fuzz_target!(|data: &[u8]| {
    let _ = CabinetParser::parse(data);
});
