//! Data block header parser.
//!
//! Every CFDATA record is an 8-byte header, an optional reserve area and the
//! compressed payload.

use super::cabinet_header::{ensure_len, read_u16, read_u32};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader {
    /// Zero when the block carries no checksum.
    pub checksum: u32,
    pub compressed_size: u16,
    pub uncompressed_size: u16,
}

pub struct DataHeaderParser;

impl DataHeaderParser {
    pub const HEADER_SIZE: usize = 8;

    pub fn parse(buffer: &[u8]) -> Result<DataHeader> {
        ensure_len(buffer, Self::HEADER_SIZE)?;

        Ok(DataHeader {
            checksum: read_u32(buffer, 0),
            compressed_size: read_u16(buffer, 4),
            uncompressed_size: read_u16(buffer, 6),
        })
    }
}
