//! CFDATA checksum.
//!
//! Not a CRC: the payload is folded into 32 bits by XOR of little-endian
//! words, with the trailing bytes packed high to low.

/// Fold `data` into `seed`.
pub fn cab_checksum(data: &[u8], seed: u32) -> u32 {
    let mut checksum = seed;
    let mut words = data.chunks_exact(4);
    for word in &mut words {
        checksum ^= u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
    }

    let tail = words
        .remainder()
        .iter()
        .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
    checksum ^ tail
}

/// Checksum stored in a CFDATA header: the payload folded together with the
/// header's `cbData` and `cbUncomp` fields.
pub fn data_block_checksum(data: &[u8], compressed_size: u16, uncompressed_size: u16) -> u32 {
    let payload = cab_checksum(data, 0);
    let mut sizes = [0u8; 4];
    sizes[..2].copy_from_slice(&compressed_size.to_le_bytes());
    sizes[2..].copy_from_slice(&uncompressed_size.to_le_bytes());
    cab_checksum(&sizes, payload)
}
