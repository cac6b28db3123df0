//! Error types for cabinet parsing and folder decoding.
//!
//! This module provides the [`CabError`] type returned by the container
//! layer. Quantum stream errors are [`DecompressError`]s and convert into
//! [`CabError::Decompress`].
//!
//! ## Error Categories
//!
//! | Category | Errors | Description |
//! |----------|--------|-------------|
//! | Format | [`InvalidSignature`], [`UnterminatedString`] | Not a valid cabinet |
//! | Bounds | [`BufferTooSmall`], [`InvalidOffset`] | Truncated or inconsistent headers |
//! | Data | [`ChecksumMismatch`], [`MissingData`] | A CFDATA block is damaged |
//! | Decompression | [`UnsupportedMethod`], [`Decompress`] | The folder cannot be decoded |
//!
//! ## Example
//!
//! ```rust
//! use quantum_cab::{CabError, CabinetParser};
//!
//! match CabinetParser::parse(b"not a cabinet") {
//!     Ok(cab) => println!("{} folders", cab.folders.len()),
//!     Err(CabError::InvalidSignature) => eprintln!("Not a cabinet"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```
//!
//! [`InvalidSignature`]: CabError::InvalidSignature
//! [`UnterminatedString`]: CabError::UnterminatedString
//! [`BufferTooSmall`]: CabError::BufferTooSmall
//! [`InvalidOffset`]: CabError::InvalidOffset
//! [`ChecksumMismatch`]: CabError::ChecksumMismatch
//! [`MissingData`]: CabError::MissingData
//! [`UnsupportedMethod`]: CabError::UnsupportedMethod
//! [`Decompress`]: CabError::Decompress

use std::fmt;

use crate::decompress::DecompressError;
use crate::formats::CompressionType;

/// Error type for cabinet operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CabError {
    /// The buffer does not start with `MSCF`.
    InvalidSignature,

    /// A header runs past the end of the buffer.
    BufferTooSmall {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        have: usize,
    },

    /// A header points outside the buffer.
    InvalidOffset {
        /// The offset read from the header.
        offset: u64,
        /// The buffer length.
        length: u64,
    },

    /// A cabinet name string has no NUL terminator.
    UnterminatedString,

    /// A CFDATA checksum does not match its payload.
    ChecksumMismatch {
        /// Checksum stored in the header.
        expected: u32,
        /// Checksum of the payload.
        actual: u32,
    },

    /// A CFDATA payload is missing or cut short.
    MissingData,

    /// The folder uses a method this crate does not decode.
    UnsupportedMethod(CompressionType),

    /// The Quantum stream is corrupt.
    Decompress(DecompressError),
}

impl fmt::Display for CabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSignature => write!(f, "Invalid cabinet signature"),
            Self::BufferTooSmall { needed, have } => {
                write!(f, "Buffer too small: need {} bytes, have {}", needed, have)
            }
            Self::InvalidOffset { offset, length } => {
                write!(f, "Invalid offset: {} (cabinet length: {})", offset, length)
            }
            Self::UnterminatedString => write!(f, "Unterminated cabinet name"),
            Self::ChecksumMismatch { expected, actual } => write!(
                f,
                "Checksum mismatch: expected 0x{:08x}, got 0x{:08x}",
                expected, actual
            ),
            Self::MissingData => write!(f, "Data block payload missing"),
            Self::UnsupportedMethod(method) => {
                write!(
                    f,
                    "Unsupported compression: {} (0x{:04x})",
                    method.name(),
                    method.to_raw()
                )
            }
            Self::Decompress(e) => write!(f, "Quantum error: {}", e),
        }
    }
}

impl std::error::Error for CabError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decompress(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DecompressError> for CabError {
    fn from(e: DecompressError) -> Self {
        Self::Decompress(e)
    }
}

pub type Result<T> = std::result::Result<T, CabError>;
