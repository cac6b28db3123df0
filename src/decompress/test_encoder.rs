//! Quantum encoder used to produce test streams.
//!
//! Mirrors the decoder exactly: the same models, the same 16-bit arithmetic
//! with underflow handling, and raw extra bits placed where the decoder's
//! 16-bit lookahead will find them.

use std::ops::Range;

use super::tables::{
    LENGTH_BASE, LENGTH_EXTRA_BITS, LENGTH_SLOTS, POSITION_BASE, POSITION_EXTRA_BITS,
};
use super::{FrequencyModel, QuantumModels};

/// One decoded unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    Literal(u8),
    Match { offset: u32, length: usize },
}

/// Expand tokens into bytes, continuing from `history`.
pub(crate) fn unroll(history: &mut Vec<u8>, tokens: &[Token]) -> Vec<u8> {
    let start = history.len();
    for token in tokens {
        match *token {
            Token::Literal(b) => history.push(b),
            Token::Match { offset, length } => {
                for _ in 0..length {
                    // Offsets reaching before the first byte read the zeroed window.
                    let byte = history
                        .len()
                        .checked_sub(offset as usize)
                        .map_or(0, |i| history[i]);
                    history.push(byte);
                }
            }
        }
    }
    history[start..].to_vec()
}

/// Greedy tokenizer for `data[range]`, searching back at most `max_offset`
/// bytes (including bytes before the range).
pub(crate) fn tokenize(data: &[u8], range: Range<usize>, max_offset: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let end = range.end;
    let mut pos = range.start;
    while pos < end {
        let mut best = (0usize, 0usize);
        let lowest = pos.saturating_sub(max_offset);
        for candidate in (lowest..pos).rev() {
            let mut len = 0;
            while len < 259 && pos + len < end && data[candidate + len] == data[pos + len] {
                len += 1;
            }
            if len > best.1 {
                best = (pos - candidate, len);
                if len == 259 {
                    break;
                }
            }
        }
        let (offset, length) = best;
        // Short matches far back are cheaper as literals and may not fit the
        // fixed-length position models.
        if length >= 5 || (length >= 3 && offset <= 64) {
            tokens.push(Token::Match {
                offset: offset as u32,
                length,
            });
            pos += length;
        } else {
            tokens.push(Token::Literal(data[pos]));
            pos += 1;
        }
    }
    tokens
}

/// Persistent encoder state for one folder.
pub(crate) struct QuantumEncoder {
    models: QuantumModels,
}

impl QuantumEncoder {
    pub fn new(window_bits: u8) -> Self {
        Self {
            models: QuantumModels::new(window_bits),
        }
    }

    pub fn models(&self) -> &QuantumModels {
        &self.models
    }

    /// Encode one block.
    pub fn encode_block(&mut self, tokens: &[Token]) -> Vec<u8> {
        let mut coder = ArithmeticEncoder::new();
        let models = &mut self.models;

        for token in tokens {
            match *token {
                Token::Literal(byte) => {
                    let band = (byte >> 6) as usize;
                    coder.encode(&mut models.selector, band as u8);
                    coder.encode(&mut models.literals[band], byte);
                }
                Token::Match { offset, length } => {
                    let (slot, extra) = position_slot(offset);
                    if length == 3 && slot < models.match3_positions.len() {
                        coder.encode(&mut models.selector, 4);
                        coder.encode(&mut models.match3_positions, slot as u8);
                        coder.write_raw(extra, POSITION_EXTRA_BITS[slot]);
                    } else if length == 4 && slot < models.match4_positions.len() {
                        coder.encode(&mut models.selector, 5);
                        coder.encode(&mut models.match4_positions, slot as u8);
                        coder.write_raw(extra, POSITION_EXTRA_BITS[slot]);
                    } else {
                        assert!(length >= 5, "length {} needs a variable match", length);
                        let (length_slot, length_extra) = length_slot(length);
                        coder.encode(&mut models.selector, 6);
                        coder.encode(&mut models.match_lengths, length_slot as u8);
                        coder.write_raw(length_extra, LENGTH_EXTRA_BITS[length_slot]);
                        coder.encode(&mut models.match_positions, slot as u8);
                        coder.write_raw(extra, POSITION_EXTRA_BITS[slot]);
                    }
                }
            }
        }

        coder.finish()
    }
}

fn position_slot(offset: u32) -> (usize, u32) {
    let value = offset - 1;
    let slot = POSITION_BASE
        .iter()
        .rposition(|&base| base <= value)
        .expect("slot 0 has base 0");
    (slot, value - POSITION_BASE[slot])
}

fn length_slot(length: usize) -> (usize, u32) {
    let value = (length - 5) as u32;
    let slot = LENGTH_BASE
        .iter()
        .rposition(|&base| base <= value)
        .expect("slot 0 has base 0");
    assert!(slot < LENGTH_SLOTS);
    let extra = value - LENGTH_BASE[slot];
    assert!(extra < (1 << LENGTH_EXTRA_BITS[slot]), "length {} too long", length);
    (slot, extra)
}

struct ArithmeticEncoder {
    low: u16,
    high: u16,
    pending: usize,
    bits: Vec<bool>,
    /// Renormalization shifts so far; the decoder has read 16 more bits.
    shifts: usize,
    /// Raw bits and the arithmetic bit index they precede.
    raw: Vec<(usize, u32, u8)>,
}

impl ArithmeticEncoder {
    fn new() -> Self {
        Self {
            low: 0,
            high: 0xFFFF,
            pending: 0,
            bits: Vec::new(),
            shifts: 0,
            raw: Vec::new(),
        }
    }

    fn encode(&mut self, model: &mut FrequencyModel, symbol: u8) {
        let rank = model.rank_of(symbol).expect("symbol belongs to model");
        let total = u32::from(model.total());
        let range = u32::from(self.high.wrapping_sub(self.low)) + 1;
        let low = u32::from(self.low);

        self.high = (low + u32::from(model.cum_freq(rank)) * range / total - 1) as u16;
        self.low = (low + u32::from(model.cum_freq(rank + 1)) * range / total) as u16;

        loop {
            if (self.low ^ self.high) & 0x8000 == 0 {
                self.emit(self.high & 0x8000 != 0);
            } else if self.low & 0x4000 != 0 && self.high & 0x4000 == 0 {
                self.pending += 1;
                self.low &= 0x3FFF;
                self.high |= 0x4000;
            } else {
                break;
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
            self.shifts += 1;
        }

        model.bump(rank + 1);
    }

    fn emit(&mut self, bit: bool) {
        self.bits.push(bit);
        for _ in 0..self.pending {
            self.bits.push(!bit);
        }
        self.pending = 0;
    }

    fn write_raw(&mut self, value: u32, count: u8) {
        if count > 0 {
            self.raw.push((16 + self.shifts, value, count));
        }
    }

    fn finish(mut self) -> Vec<u8> {
        self.pending += 1;
        self.emit(self.low & 0x4000 != 0);

        let arith_len = self
            .raw
            .iter()
            .map(|r| r.0)
            .max()
            .unwrap_or(0)
            .max(self.bits.len());

        let mut stream = Vec::with_capacity(arith_len + 64);
        let mut raw = self.raw.iter().peekable();
        for index in 0..=arith_len {
            while let Some(&&(at, value, count)) = raw.peek() {
                if at != index {
                    break;
                }
                for bit in (0..count).rev() {
                    stream.push((value >> bit) & 1 != 0);
                }
                raw.next();
            }
            if index < arith_len {
                stream.push(self.bits.get(index).copied().unwrap_or(false));
            }
        }

        // Pack MSB first into whole 16-bit words.
        let mut bytes = vec![0u8; stream.len().div_ceil(16) * 2];
        for (i, bit) in stream.iter().enumerate() {
            if *bit {
                bytes[i / 8] |= 0x80 >> (i % 8);
            }
        }
        bytes
    }
}
