//! Cabinet header parser.
//!
//! The CFHEADER is the first 36 bytes of a cabinet, followed by optional
//! reserve sizes and the names of the neighbouring cabinets in a set.

use crate::error::{CabError, Result};
use crate::formats::CAB_SIGNATURE;

/// CFHEADER flag: a previous cabinet exists.
pub const FLAG_PREV_CABINET: u16 = 0x0001;
/// CFHEADER flag: a next cabinet exists.
pub const FLAG_NEXT_CABINET: u16 = 0x0002;
/// CFHEADER flag: reserve sizes are present.
pub const FLAG_RESERVE_PRESENT: u16 = 0x0004;

/// Name and disk label of a neighbouring cabinet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CabinetLink {
    pub cabinet: String,
    pub disk: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CabinetHeader {
    pub cabinet_size: u32,
    pub files_offset: u32,
    pub version_minor: u8,
    pub version_major: u8,
    pub folder_count: u16,
    pub file_count: u16,
    pub flags: u16,
    pub set_id: u16,
    pub cabinet_index: u16,
    // Reserve sizes, zero unless FLAG_RESERVE_PRESENT
    pub header_reserve: u16,
    pub folder_reserve: u8,
    pub data_reserve: u8,
    pub previous: Option<CabinetLink>,
    pub next: Option<CabinetLink>,
    /// Bytes consumed, up to the first CFFOLDER.
    pub size: usize,
}

pub struct CabinetHeaderParser;

impl CabinetHeaderParser {
    pub const HEADER_SIZE: usize = 36;
    const RESERVE_SIZE: usize = 4;

    pub fn parse(buffer: &[u8]) -> Result<CabinetHeader> {
        if !buffer.starts_with(CAB_SIGNATURE) {
            return Err(CabError::InvalidSignature);
        }
        ensure_len(buffer, Self::HEADER_SIZE)?;

        let cabinet_size = read_u32(buffer, 8);
        let files_offset = read_u32(buffer, 16);
        let version_minor = buffer[24];
        let version_major = buffer[25];
        let folder_count = read_u16(buffer, 26);
        let file_count = read_u16(buffer, 28);
        let flags = read_u16(buffer, 30);
        let set_id = read_u16(buffer, 32);
        let cabinet_index = read_u16(buffer, 34);

        let mut offset = Self::HEADER_SIZE;
        let (mut header_reserve, mut folder_reserve, mut data_reserve) = (0, 0, 0);
        if flags & FLAG_RESERVE_PRESENT != 0 {
            ensure_len(buffer, offset + Self::RESERVE_SIZE)?;
            header_reserve = read_u16(buffer, offset);
            folder_reserve = buffer[offset + 2];
            data_reserve = buffer[offset + 3];
            offset += Self::RESERVE_SIZE + header_reserve as usize;
            ensure_len(buffer, offset)?;
        }

        let previous = if flags & FLAG_PREV_CABINET != 0 {
            Some(read_link(buffer, &mut offset)?)
        } else {
            None
        };
        let next = if flags & FLAG_NEXT_CABINET != 0 {
            Some(read_link(buffer, &mut offset)?)
        } else {
            None
        };

        Ok(CabinetHeader {
            cabinet_size,
            files_offset,
            version_minor,
            version_major,
            folder_count,
            file_count,
            flags,
            set_id,
            cabinet_index,
            header_reserve,
            folder_reserve,
            data_reserve,
            previous,
            next,
            size: offset,
        })
    }
}

pub(crate) fn ensure_len(buffer: &[u8], needed: usize) -> Result<()> {
    if buffer.len() < needed {
        return Err(CabError::BufferTooSmall {
            needed,
            have: buffer.len(),
        });
    }
    Ok(())
}

#[inline]
pub(crate) fn read_u16(buffer: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buffer[offset], buffer[offset + 1]])
}

#[inline]
pub(crate) fn read_u32(buffer: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buffer[offset],
        buffer[offset + 1],
        buffer[offset + 2],
        buffer[offset + 3],
    ])
}

fn read_link(buffer: &[u8], offset: &mut usize) -> Result<CabinetLink> {
    let cabinet = read_cstring(buffer, offset)?;
    let disk = read_cstring(buffer, offset)?;
    Ok(CabinetLink { cabinet, disk })
}

fn read_cstring(buffer: &[u8], offset: &mut usize) -> Result<String> {
    let rest = buffer.get(*offset..).unwrap_or_default();
    let len = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or(CabError::UnterminatedString)?;
    *offset += len + 1;
    Ok(String::from_utf8_lossy(&rest[..len]).into_owned())
}
