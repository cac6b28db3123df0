//! Quantum block decoder.
//!
//! Implements the decompression side of Cinematronics' Quantum format as
//! stored in cabinet folders. One [`QuantumDecoder`] holds everything that
//! persists between the blocks of a folder: the window and all eight models.
//! The arithmetic decoder itself restarts at every block.

use super::{
    tables::{LENGTH_BASE, LENGTH_EXTRA_BITS, POSITION_BASE, POSITION_EXTRA_BITS},
    BitReader, DecompressError, FrequencyModel, RangeDecoder, Result, SlidingWindow,
};

/// Smallest window: 1 KiB.
pub const MIN_WINDOW_BITS: u8 = 10;

/// Largest window: 2 MiB.
pub const MAX_WINDOW_BITS: u8 = 21;

/// Zero bits the decoder may pull past the end of a block before the block
/// counts as exhausted. The range decoder reads 16 bits ahead of the encoder.
const INPUT_PADDING_BITS: u64 = 16;

/// Length added to variable match lengths.
const MIN_VARIABLE_LENGTH: usize = 5;

/// What follows a decoded selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// A literal from the 64-byte band `0x00`, `0x40`, `0x80` or `0xC0`.
    Literal(usize),
    /// A match of length 3.
    Match3,
    /// A match of length 4.
    Match4,
    /// A match with its own length slot.
    MatchVariable,
}

impl Selector {
    /// Map a decoded selector symbol to its action; `None` above 6.
    pub fn from_symbol(symbol: u8) -> Option<Self> {
        match symbol {
            0..=3 => Some(Self::Literal(symbol as usize)),
            4 => Some(Self::Match3),
            5 => Some(Self::Match4),
            6 => Some(Self::MatchVariable),
            _ => None,
        }
    }

    /// The selector symbol that encodes this action.
    pub fn symbol(self) -> u8 {
        match self {
            Self::Literal(band) => band as u8,
            Self::Match3 => 4,
            Self::Match4 => 5,
            Self::MatchVariable => 6,
        }
    }
}

/// The eight adaptive models of a Quantum stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QuantumModels {
    pub selector: FrequencyModel,
    pub literals: [FrequencyModel; 4],
    pub match3_positions: FrequencyModel,
    pub match4_positions: FrequencyModel,
    pub match_lengths: FrequencyModel,
    pub match_positions: FrequencyModel,
}

impl QuantumModels {
    pub fn new(window_bits: u8) -> Self {
        let slots = window_bits as usize * 2;
        Self {
            selector: FrequencyModel::new(7, 0),
            literals: [
                FrequencyModel::new(64, 0x00),
                FrequencyModel::new(64, 0x40),
                FrequencyModel::new(64, 0x80),
                FrequencyModel::new(64, 0xC0),
            ],
            match3_positions: FrequencyModel::new(slots.min(24), 0),
            match4_positions: FrequencyModel::new(slots.min(36), 0),
            match_lengths: FrequencyModel::new(27, 0),
            match_positions: FrequencyModel::new(slots.min(42), 0),
        }
    }
}

/// Quantum decoder state for one cabinet folder.
pub struct QuantumDecoder {
    window_bits: u8,
    level: u8,
    window: SlidingWindow,
    models: QuantumModels,
}

impl QuantumDecoder {
    /// Create a decoder for a `2^window_bits` byte window.
    ///
    /// `level` is carried for reference only; it does not change decoding.
    pub fn new(window_bits: u8, level: u8) -> Result<Self> {
        check_window_bits(window_bits)?;
        tracing::debug!(window_bits, level, "initialising Quantum decoder");
        Ok(Self {
            window_bits,
            level,
            window: SlidingWindow::new(1 << window_bits),
            models: QuantumModels::new(window_bits),
        })
    }

    /// Reset for a new folder, reusing the window allocation when it is big
    /// enough.
    pub fn init(&mut self, window_bits: u8, level: u8) -> Result<()> {
        check_window_bits(window_bits)?;
        tracing::debug!(window_bits, level, "resetting Quantum decoder");
        self.window_bits = window_bits;
        self.level = level;
        self.window.reset(1 << window_bits);
        self.models = QuantumModels::new(window_bits);
        Ok(())
    }

    /// log2 of the window size.
    pub fn window_bits(&self) -> u8 {
        self.window_bits
    }

    /// Compression level from the folder header. Informational only.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Window size in bytes.
    pub fn window_size(&self) -> usize {
        self.window.size()
    }

    /// Current window write position.
    pub fn position(&self) -> usize {
        self.window.position()
    }

    pub(crate) fn models(&self) -> &QuantumModels {
        &self.models
    }

    /// Decompress one block of `output_len` bytes.
    ///
    /// On error the window and models are left wherever decoding stopped;
    /// later blocks of the same folder will usually fail as well.
    pub fn decompress(&mut self, input: &[u8], output_len: usize) -> Result<Vec<u8>> {
        let window_size = self.window.size();
        let position = self.window.position();

        // A block never straddles the window end.
        if output_len > window_size - position {
            return Err(DecompressError::WindowOverrun {
                position,
                length: output_len,
                window_size,
            });
        }

        let mut reader = BitReader::new(input);
        let mut coder = RangeDecoder::new(&mut reader);
        let models = &mut self.models;
        let mut remaining = output_len;

        while remaining > 0 {
            if reader.bits_past_end() > INPUT_PADDING_BITS {
                return Err(DecompressError::StreamExhausted);
            }

            let symbol = coder.decode_symbol(&mut models.selector, &mut reader);
            let selector =
                Selector::from_symbol(symbol).ok_or(DecompressError::InvalidSelector(symbol))?;

            let (offset, length) = match selector {
                Selector::Literal(band) => {
                    let byte = coder.decode_symbol(&mut models.literals[band], &mut reader);
                    self.window.write_literal(byte);
                    remaining -= 1;
                    continue;
                }
                Selector::Match3 => {
                    let slot = coder.decode_symbol(&mut models.match3_positions, &mut reader);
                    (read_offset(&mut reader, slot), 3)
                }
                Selector::Match4 => {
                    let slot = coder.decode_symbol(&mut models.match4_positions, &mut reader);
                    (read_offset(&mut reader, slot), 4)
                }
                Selector::MatchVariable => {
                    let slot = coder.decode_symbol(&mut models.match_lengths, &mut reader) as usize;
                    let extra = reader.read_bits(u32::from(LENGTH_EXTRA_BITS[slot]));
                    let length = (LENGTH_BASE[slot] + extra) as usize + MIN_VARIABLE_LENGTH;
                    let slot = coder.decode_symbol(&mut models.match_positions, &mut reader);
                    (read_offset(&mut reader, slot), length)
                }
            };

            if length > remaining {
                return Err(DecompressError::WindowOverrun {
                    position: self.window.position(),
                    length,
                    window_size,
                });
            }
            self.window.copy_match(offset, length)?;
            remaining -= length;
        }

        Ok(self.window.read_tail(output_len))
    }
}

fn check_window_bits(window_bits: u8) -> Result<()> {
    if (MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window_bits) {
        Ok(())
    } else {
        Err(DecompressError::InvalidWindowSize(window_bits))
    }
}

/// Match offset for a position slot, reading its extra bits.
#[inline]
fn read_offset(reader: &mut BitReader, slot: u8) -> u32 {
    let slot = slot as usize;
    let extra = reader.read_bits(u32::from(POSITION_EXTRA_BITS[slot]));
    POSITION_BASE[slot] + extra + 1
}
