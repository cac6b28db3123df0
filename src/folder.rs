//! Folder decoding sessions.
//!
//! A [`FolderDecoder`] turns the CFDATA blocks of one folder back into bytes.
//! Quantum folders keep a single [`QuantumDecoder`] for the whole folder so
//! matches can reach into earlier blocks.
//!
//! Decoding never fails at this level: a block that cannot be decoded comes
//! back as zeros of its declared size, and a warning is logged. Use
//! [`FolderDecoder::try_decode_block`] to see the error instead.

use crate::checksum::data_block_checksum;
use crate::decompress::{DecompressError, QuantumDecoder};
use crate::error::{CabError, Result};
use crate::formats::CompressionType;
use crate::parsing::{Cabinet, Folder};

/// One CFDATA record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataBlock<'a> {
    /// Stored checksum, zero when absent.
    pub checksum: u32,
    /// Payload, `None` when it is missing from the cabinet.
    pub data: Option<&'a [u8]>,
    pub compressed_size: usize,
    /// Declared output size; zero when unknown.
    pub uncompressed_size: usize,
}

impl<'a> DataBlock<'a> {
    /// A block with no stored checksum.
    pub fn new(data: &'a [u8], uncompressed_size: usize) -> Self {
        Self {
            checksum: 0,
            data: Some(data),
            compressed_size: data.len(),
            uncompressed_size,
        }
    }

    /// A block whose payload is unavailable.
    pub fn missing(uncompressed_size: usize) -> Self {
        Self {
            checksum: 0,
            data: None,
            compressed_size: 0,
            uncompressed_size,
        }
    }

    /// Check the stored checksum, if there is one.
    pub fn verify_checksum(&self) -> Result<()> {
        if self.checksum == 0 {
            return Ok(());
        }
        let data = self.data.ok_or(CabError::MissingData)?;
        let actual = data_block_checksum(
            data,
            self.compressed_size as u16,
            self.uncompressed_size as u16,
        );
        if actual != self.checksum {
            return Err(CabError::ChecksumMismatch {
                expected: self.checksum,
                actual,
            });
        }
        Ok(())
    }
}

/// Options for folder decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Zero-fill blocks whose checksum does not match.
    pub verify_checksums: bool,
    /// Output size used for a failed block that declares no size.
    pub fallback_block_size: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            verify_checksums: true,
            fallback_block_size: 32768,
        }
    }
}

enum Session {
    Stored,
    Quantum(QuantumDecoder),
    /// The folder's Quantum parameters were rejected.
    Invalid(DecompressError),
    Unsupported(CompressionType),
}

/// Decodes the blocks of one folder at a time, in order.
pub struct FolderDecoder {
    compression: CompressionType,
    options: DecodeOptions,
    session: Session,
    block_index: usize,
}

impl FolderDecoder {
    /// Create a decoder and start the first folder with `compression`.
    pub fn new(compression: CompressionType, options: DecodeOptions) -> Self {
        let mut decoder = Self {
            compression,
            options,
            session: Session::Unsupported(compression),
            block_index: 0,
        };
        decoder.start_folder(compression);
        decoder
    }

    /// Compression of the folder currently being decoded.
    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Begin a new folder. All history from the previous folder is dropped;
    /// a Quantum window allocation is reused.
    pub fn start_folder(&mut self, compression: CompressionType) {
        let previous = match std::mem::replace(&mut self.session, Session::Stored) {
            Session::Quantum(decoder) => Some(decoder),
            _ => None,
        };

        self.session = match compression {
            CompressionType::None => Session::Stored,
            CompressionType::Quantum { level, window_bits } => {
                let decoder = match previous {
                    Some(mut decoder) => decoder.init(window_bits, level).map(|()| decoder),
                    None => QuantumDecoder::new(window_bits, level),
                };
                match decoder {
                    Ok(decoder) => Session::Quantum(decoder),
                    Err(e) => {
                        tracing::warn!(window_bits, error = %e, "rejecting Quantum folder");
                        Session::Invalid(e)
                    }
                }
            }
            other => {
                tracing::warn!(method = other.name(), "compression method not supported");
                Session::Unsupported(other)
            }
        };

        tracing::debug!(method = compression.name(), "starting folder");
        self.compression = compression;
        self.block_index = 0;
    }

    /// Decode the next block of the folder, reporting any failure.
    ///
    /// A checksum mismatch is reported only after the payload has been fed to
    /// the decoder, so later blocks still see the right history.
    pub fn try_decode_block(&mut self, block: &DataBlock<'_>) -> Result<Vec<u8>> {
        let data = match block.data {
            Some(data) if block.compressed_size > 0 => data,
            _ => return Err(CabError::MissingData),
        };
        let checksum = if self.options.verify_checksums {
            block.verify_checksum()
        } else {
            Ok(())
        };

        let output = match &mut self.session {
            Session::Stored => {
                let mut output = data[..data.len().min(block.uncompressed_size)].to_vec();
                output.resize(block.uncompressed_size, 0);
                output
            }
            Session::Quantum(decoder) => decoder.decompress(data, block.uncompressed_size)?,
            Session::Invalid(e) => return Err(e.clone().into()),
            Session::Unsupported(method) => return Err(CabError::UnsupportedMethod(*method)),
        };

        checksum?;
        Ok(output)
    }

    /// Decode the next block of the folder. Never fails: undecodable blocks
    /// come back as zeros.
    pub fn decode_block(&mut self, block: &DataBlock<'_>) -> Vec<u8> {
        let index = self.block_index;
        self.block_index += 1;
        tracing::trace!(
            index,
            compressed = block.compressed_size,
            uncompressed = block.uncompressed_size,
            "decoding block"
        );

        match self.try_decode_block(block) {
            Ok(output) => output,
            Err(e) => {
                let length = if block.uncompressed_size == 0 {
                    self.options.fallback_block_size
                } else {
                    block.uncompressed_size
                };
                tracing::warn!(index, length, error = %e, "zero-filling block");
                vec![0; length]
            }
        }
    }

    /// Decode a whole folder from its first block.
    pub fn decode_folder(&mut self, folder: &Folder<'_>) -> Vec<u8> {
        self.start_folder(folder.compression());
        let mut output = Vec::with_capacity(folder.uncompressed_size());
        for block in &folder.blocks {
            output.extend_from_slice(&self.decode_block(block));
        }
        output
    }
}

/// Decode every folder of a cabinet, one after another on one decoder.
pub fn decode_cabinet(cabinet: &Cabinet<'_>, options: &DecodeOptions) -> Vec<Vec<u8>> {
    let mut decoder = FolderDecoder::new(CompressionType::None, options.clone());
    cabinet
        .folders
        .iter()
        .map(|folder| decoder.decode_folder(folder))
        .collect()
}

/// Decode the folders of a cabinet in parallel, one decoder per folder.
#[cfg(feature = "parallel")]
pub fn decode_folders_parallel(cabinet: &Cabinet<'_>, options: &DecodeOptions) -> Vec<Vec<u8>> {
    use rayon::prelude::*;

    cabinet
        .folders
        .par_iter()
        .map(|folder| {
            FolderDecoder::new(folder.compression(), options.clone()).decode_folder(folder)
        })
        .collect()
}
