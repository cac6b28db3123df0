//! Quantum decompression.
//!
//! Quantum is the LZ77 + adaptive arithmetic coding scheme used for
//! Microsoft Cabinet (and InstallShield) folders with compression type 2.
//!
//! ## Architecture
//!
//! ```text
//! Compressed Block
//!       ↓
//! ┌──────────────┐
//! │ BitReader    │ ← MSB-first bits, zero padded past the end
//! └──────────────┘
//!       ↓
//! ┌──────────────┐
//! │ RangeDecoder │ ← 16-bit arithmetic decoder
//! └──────────────┘
//!       ↓
//! ┌──────────────┐
//! │ Models       │ ← Eight adaptive frequency tables
//! └──────────────┘
//!       ↓
//! ┌──────────────┐
//! │ Window       │ ← Literals and back-references
//! └──────────────┘
//!       ↓
//! Decompressed Block
//! ```
//!
//! ## Models
//!
//! | Selector | Meaning | Model | Entries |
//! |----------|---------|-------|---------|
//! | 0-3 | Literal byte | one per 64-byte band | 64 |
//! | 4 | Match, length 3 | position slots | up to 24 |
//! | 5 | Match, length 4 | position slots | up to 36 |
//! | 6 | Match, variable length | length slots + position slots | 27 + up to 42 |
//!
//! ## Example
//!
//! ```rust
//! use quantum_cab::QuantumDecoder;
//!
//! // Window bits and level come from the folder's compression type.
//! let mut decoder = QuantumDecoder::new(15, 4).unwrap();
//!
//! // One call per CFDATA block, in file order, on the same decoder.
//! // let block = decoder.decompress(&payload, uncompressed_size)?;
//! ```
//!
//! A decoder owns all of its state. Blocks of one folder must go through the
//! same decoder in order because matches may reach into earlier blocks;
//! independent folders can be decoded on separate threads.

mod bit_reader;
mod model;
mod quantum;
mod range_coder;
pub mod tables;
mod window;

#[cfg(test)]
pub(crate) mod test_encoder;

pub use bit_reader::BitReader;
pub use model::FrequencyModel;
pub use quantum::{QuantumDecoder, Selector, MAX_WINDOW_BITS, MIN_WINDOW_BITS};
pub use range_coder::RangeDecoder;
pub use window::SlidingWindow;

pub(crate) use quantum::QuantumModels;

use std::fmt;

/// Decompression errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecompressError {
    /// Window size outside `2^10..=2^21`.
    InvalidWindowSize(u8),
    /// The compressed block ran out before the requested output was produced.
    StreamExhausted,
    /// A run or match would cross the end of the window or the requested run.
    WindowOverrun {
        position: usize,
        length: usize,
        window_size: usize,
    },
    /// The selector model produced a value outside 0-6.
    InvalidSelector(u8),
    /// A back-reference of zero or beyond the window size.
    InvalidBackReference { offset: u32, position: u32 },
}

impl fmt::Display for DecompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWindowSize(bits) => write!(
                f,
                "Invalid Quantum window size: 2^{} (expected 2^{}..=2^{})",
                bits, MIN_WINDOW_BITS, MAX_WINDOW_BITS
            ),
            Self::StreamExhausted => write!(f, "Compressed stream exhausted"),
            Self::WindowOverrun {
                position,
                length,
                window_size,
            } => write!(
                f,
                "Run of {} bytes at window position {} overruns window of {} bytes",
                length, position, window_size
            ),
            Self::InvalidSelector(s) => write!(f, "Invalid selector: {}", s),
            Self::InvalidBackReference { offset, position } => write!(
                f,
                "Invalid back reference: offset {} at window position {}",
                offset, position
            ),
        }
    }
}

impl std::error::Error for DecompressError {}

pub type Result<T> = std::result::Result<T, DecompressError>;
