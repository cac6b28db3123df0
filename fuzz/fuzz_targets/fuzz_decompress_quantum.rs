#![no_main]
use libfuzzer_sys::fuzz_target;
use quantum_cab::QuantumDecoder;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    // First byte picks the window, the next two the block size.
    let window_bits = 10 + data[0] % 12;
    let block_size = u16::from_le_bytes([data[1], data[2]]) as usize;

    let Ok(mut decoder) = QuantumDecoder::new(window_bits, 0) else {
        return;
    };
    // Two blocks on one decoder, as a folder would.
    let payload = &data[3..];
    let (first, second) = payload.split_at(payload.len() / 2);
    let _ = decoder.decompress(first, block_size.min(decoder.window_size()));
    let remaining = decoder.window_size() - decoder.position();
    let _ = decoder.decompress(second, block_size.min(remaining));
});
