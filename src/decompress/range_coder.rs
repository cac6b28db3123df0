//! 16-bit arithmetic decoder for Quantum.
//!
//! The decoder keeps `low`, `high` and `code` as 16-bit registers and pulls
//! one bit from the stream per renormalization shift. It is initialised from
//! the first 16 bits of every compressed block.

use super::{BitReader, FrequencyModel};

/// Top bit of the 16-bit registers.
const MSB: u16 = 0x8000;

/// Second bit, used for underflow detection.
const UNDERFLOW_BIT: u16 = 0x4000;

/// Range decoder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeDecoder {
    low: u16,
    high: u16,
    code: u16,
}

impl RangeDecoder {
    /// Initialize the decoder from the first 16 bits of the block.
    pub fn new(reader: &mut BitReader) -> Self {
        Self {
            low: 0,
            high: 0xFFFF,
            code: reader.read_bits(16) as u16,
        }
    }

    /// Current `(low, high, code)` registers.
    pub fn state(&self) -> (u16, u16, u16) {
        (self.low, self.high, self.code)
    }

    /// Decode one symbol against `model` and update the model.
    #[inline]
    pub fn decode_symbol(&mut self, model: &mut FrequencyModel, reader: &mut BitReader) -> u8 {
        let total = u32::from(model.total());
        let range = u32::from(self.high.wrapping_sub(self.low)) + 1;
        let target =
            (((u32::from(self.code.wrapping_sub(self.low)) + 1) * total - 1) / range) & 0xFFFF;

        // First rank whose cumulative frequency is at or below the target;
        // the sentinel guarantees a hit.
        let mut end = 1;
        while end < model.len() && u32::from(model.cum_freq(end)) > target {
            end += 1;
        }
        let rank = end - 1;

        let low = u32::from(self.low);
        let upper = u32::from(model.cum_freq(rank));
        let lower = u32::from(model.cum_freq(end));
        self.high = (low + upper * range / total).wrapping_sub(1) as u16;
        self.low = (low + lower * range / total) as u16;

        // Read the symbol before the update: a rebuild may re-sort the ranks.
        let symbol = model.symbol_at(rank);
        self.normalize(reader);
        model.bump(end);
        symbol
    }

    /// Shift out settled bits, correcting for underflow.
    #[inline]
    fn normalize(&mut self, reader: &mut BitReader) {
        loop {
            if (self.low ^ self.high) & MSB != 0 {
                if self.low & UNDERFLOW_BIT != 0 && self.high & UNDERFLOW_BIT == 0 {
                    self.code ^= UNDERFLOW_BIT;
                    self.low &= UNDERFLOW_BIT - 1;
                    self.high |= UNDERFLOW_BIT;
                } else {
                    break;
                }
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
            self.code = (self.code << 1) | reader.read_bit() as u16;
        }
    }
}
