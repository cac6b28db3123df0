//! Quantum decompression for Microsoft Cabinet folders.
//!
//! Decodes Quantum-compressed (compression type 2) cabinet and InstallShield
//! folders, bit for bit, and reads the cabinet structure around them.
//!
//! ## Layers
//! - [`decompress`] - the Quantum decoder: range coder, adaptive models and
//!   sliding window. Works on raw block payloads.
//! - [`parsing`] - CFHEADER, CFFOLDER and CFDATA records.
//! - [`FolderDecoder`] - feeds a folder's blocks through one decoder and
//!   zero-fills blocks that cannot be decoded.
//!
//! ## Features
//! - `parallel` - Decode independent folders on a rayon thread pool
//!
//! ## Example
//!
//! ```rust,no_run
//! use quantum_cab::{decode_cabinet, CabinetParser, DecodeOptions};
//!
//! let bytes = std::fs::read("setup.cab")?;
//! let cabinet = CabinetParser::parse(&bytes)?;
//! for folder in decode_cabinet(&cabinet, &DecodeOptions::default()) {
//!     println!("{} bytes", folder.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod checksum;
pub mod decompress;
pub mod error;
mod folder;
pub mod formats;
pub mod parsing;

pub use checksum::{cab_checksum, data_block_checksum};
pub use error::CabError;
pub use folder::{decode_cabinet, DataBlock, DecodeOptions, FolderDecoder};
pub use formats::CompressionType;
pub use parsing::{Cabinet, CabinetParser, Folder};

#[cfg(feature = "parallel")]
pub use folder::decode_folders_parallel;

// Re-export decompression types
pub use decompress::{DecompressError, QuantumDecoder};
