//! Folder header parser.
//!
//! One CFFOLDER record per folder follows the cabinet header. It locates the
//! folder's first data block and names its compression method.

use super::cabinet_header::{ensure_len, read_u16, read_u32};
use crate::error::Result;
use crate::formats::CompressionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FolderHeader {
    /// Offset of the first CFDATA record from the start of the cabinet.
    pub data_offset: u32,
    pub block_count: u16,
    pub compression: CompressionType,
}

pub struct FolderHeaderParser;

impl FolderHeaderParser {
    pub const HEADER_SIZE: usize = 8;

    /// Parse one CFFOLDER. `reserve` is the per-folder reserve size from the
    /// cabinet header; the record occupies `HEADER_SIZE + reserve` bytes.
    pub fn parse(buffer: &[u8], reserve: u8) -> Result<FolderHeader> {
        ensure_len(buffer, Self::HEADER_SIZE + reserve as usize)?;

        Ok(FolderHeader {
            data_offset: read_u32(buffer, 0),
            block_count: read_u16(buffer, 4),
            compression: CompressionType::from_raw(read_u16(buffer, 6)),
        })
    }
}
