//! Cabinet header parsing.
//!
//! [`CabinetParser`] walks the CFHEADER, the CFFOLDER table and each folder's
//! chain of CFDATA records, borrowing block payloads from the input buffer.
//! File records (CFFILE) are not read: folders are decoded as whole streams.

pub mod cabinet_header;
pub mod data_header;
pub mod folder_header;

pub use cabinet_header::{CabinetHeader, CabinetHeaderParser, CabinetLink};
pub use data_header::{DataHeader, DataHeaderParser};
pub use folder_header::{FolderHeader, FolderHeaderParser};

use crate::error::{CabError, Result};
use crate::folder::DataBlock;
use crate::formats::CompressionType;

/// A parsed cabinet.
#[derive(Debug, Clone)]
pub struct Cabinet<'a> {
    pub header: CabinetHeader,
    pub folders: Vec<Folder<'a>>,
}

/// One folder and its data blocks in file order.
#[derive(Debug, Clone)]
pub struct Folder<'a> {
    pub header: FolderHeader,
    pub blocks: Vec<DataBlock<'a>>,
}

impl Folder<'_> {
    pub fn compression(&self) -> CompressionType {
        self.header.compression
    }

    /// Sum of the blocks' uncompressed sizes.
    pub fn uncompressed_size(&self) -> usize {
        self.blocks.iter().map(|b| b.uncompressed_size).sum()
    }
}

pub struct CabinetParser;

impl CabinetParser {
    /// Parse a cabinet held entirely in memory.
    ///
    /// Header errors are fatal. A data block that runs past the end of the
    /// buffer is kept with `data: None` so the folder decoder can zero-fill it.
    pub fn parse(data: &[u8]) -> Result<Cabinet<'_>> {
        let header = CabinetHeaderParser::parse(data)?;
        let folder_size = FolderHeaderParser::HEADER_SIZE + header.folder_reserve as usize;

        let mut folders = Vec::with_capacity(header.folder_count as usize);
        let mut offset = header.size;
        for _ in 0..header.folder_count {
            let folder = FolderHeaderParser::parse(&data[offset..], header.folder_reserve)?;
            offset += folder_size;
            let blocks = parse_blocks(data, &folder, header.data_reserve)?;
            folders.push(Folder {
                header: folder,
                blocks,
            });
        }

        tracing::debug!(
            folders = folders.len(),
            files = header.file_count,
            set_id = header.set_id,
            "parsed cabinet"
        );
        Ok(Cabinet { header, folders })
    }
}

fn parse_blocks<'a>(
    data: &'a [u8],
    folder: &FolderHeader,
    reserve: u8,
) -> Result<Vec<DataBlock<'a>>> {
    let start = folder.data_offset as usize;
    if start > data.len() {
        return Err(CabError::InvalidOffset {
            offset: u64::from(folder.data_offset),
            length: data.len() as u64,
        });
    }

    let record_size = DataHeaderParser::HEADER_SIZE + reserve as usize;
    let mut blocks = Vec::with_capacity(folder.block_count as usize);
    let mut pos = start;
    for index in 0..folder.block_count {
        if pos + record_size > data.len() {
            tracing::warn!(index, offset = pos, "data block header truncated");
            blocks.push(DataBlock::missing(0));
            pos = data.len();
            continue;
        }
        let header = DataHeaderParser::parse(&data[pos..])?;

        let payload_start = pos + record_size;
        let payload_end = payload_start + header.compressed_size as usize;
        let payload = data.get(payload_start..payload_end);
        if payload.is_none() {
            tracing::warn!(
                index,
                offset = payload_start,
                size = header.compressed_size,
                "data block payload truncated"
            );
        }

        blocks.push(DataBlock {
            checksum: header.checksum,
            data: payload,
            compressed_size: header.compressed_size as usize,
            uncompressed_size: header.uncompressed_size as usize,
        });
        pos = payload_end.min(data.len());
    }

    Ok(blocks)
}


#[cfg(test)]
mod tests {
    use super::builder::CabinetBuilder;
    use super::*;
    use crate::checksum::data_block_checksum;

    #[test]
    fn test_parse_folders_and_blocks() {
        let cab = CabinetBuilder::new()
            .folder(0x0000, vec![(b"hello".to_vec(), 5), (b"world!".to_vec(), 6)])
            .folder(0x0F42, vec![(vec![1, 2, 3], 100)])
            .build();

        let cabinet = CabinetParser::parse(&cab).unwrap();
        assert_eq!(cabinet.header.folder_count, 2);
        assert_eq!(cabinet.folders.len(), 2);

        let stored = &cabinet.folders[0];
        assert_eq!(stored.compression(), CompressionType::None);
        assert_eq!(stored.blocks.len(), 2);
        assert_eq!(stored.blocks[0].data, Some(&b"hello"[..]));
        assert_eq!(stored.blocks[1].data, Some(&b"world!"[..]));
        assert_eq!(stored.blocks[1].checksum, data_block_checksum(b"world!", 6, 6));
        assert_eq!(stored.uncompressed_size(), 11);

        let quantum = &cabinet.folders[1];
        assert_eq!(
            quantum.compression(),
            CompressionType::Quantum {
                level: 4,
                window_bits: 15
            }
        );
        assert_eq!(quantum.blocks[0].compressed_size, 3);
        assert_eq!(quantum.blocks[0].uncompressed_size, 100);
    }

    #[test]
    fn test_parse_with_reserve() {
        let cab = CabinetBuilder::new()
            .reserve(6, 3, 2)
            .folder(0x0000, vec![(b"abc".to_vec(), 3), (b"defg".to_vec(), 4)])
            .build();

        let cabinet = CabinetParser::parse(&cab).unwrap();
        assert_eq!(cabinet.header.header_reserve, 6);
        let blocks = &cabinet.folders[0].blocks;
        assert_eq!(blocks[0].data, Some(&b"abc"[..]));
        assert_eq!(blocks[1].data, Some(&b"defg"[..]));
        assert!(blocks.iter().all(|b| b.verify_checksum().is_ok()));
    }

    #[test]
    fn test_truncated_payload_is_missing() {
        let cab = CabinetBuilder::new()
            .folder(
                0x0000,
                vec![(vec![7; 10], 10), (vec![8; 40], 40), (vec![9; 5], 5)],
            )
            .build();
        // Cut into the second payload.
        let cut = &cab[..cab.len() - 5 - 8 - 20];

        let cabinet = CabinetParser::parse(cut).unwrap();
        let blocks = &cabinet.folders[0].blocks;
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].data, Some(&[7u8; 10][..]));
        assert_eq!(blocks[1].data, None);
        assert_eq!(blocks[1].uncompressed_size, 40);
        assert_eq!(blocks[2].data, None);
        assert_eq!(blocks[2].uncompressed_size, 0);
    }

    #[test]
    fn test_bad_folder_offset() {
        let mut cab = CabinetBuilder::new()
            .folder(0x0000, vec![(b"x".to_vec(), 1)])
            .build();
        let len = cab.len();
        cab[36..40].copy_from_slice(&0xFFFF_u32.to_le_bytes());

        assert_eq!(
            CabinetParser::parse(&cab).err(),
            Some(CabError::InvalidOffset {
                offset: 0xFFFF,
                length: len as u64
            })
        );
    }

    #[test]
    fn test_missing_folder_table() {
        let cab = CabinetBuilder::new()
            .folder(0x0000, vec![(b"x".to_vec(), 1)])
            .build();
        assert!(matches!(
            CabinetParser::parse(&cab[..40]),
            Err(CabError::BufferTooSmall { .. })
        ));
    }
}
