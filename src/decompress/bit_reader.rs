//! Bit reader for Quantum compressed blocks.
//!
//! Reads bits MSB first, two bytes at a time. Reading past the end of the
//! input yields zero bits; the number of such bits is tracked so the decoder
//! can tell a short stream apart from a complete one.

/// Bit reader that reads from a byte slice.
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    /// Current bit buffer, left aligned
    buffer: u32,
    /// Valid bits in buffer
    bits_in_buffer: u32,
    /// Bits handed out so far
    consumed: u64,
}

impl<'a> BitReader<'a> {
    /// Create a new bit reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            buffer: 0,
            bits_in_buffer: 0,
            consumed: 0,
        }
    }

    #[inline]
    fn next_byte(&mut self) -> u8 {
        let byte = self.data.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        byte
    }

    /// Load another 16 bits if fewer than 16 are buffered.
    #[inline]
    pub fn fill(&mut self) {
        if self.bits_in_buffer < 16 {
            let word = (u32::from(self.next_byte()) << 8) | u32::from(self.next_byte());
            self.buffer |= word << (16 - self.bits_in_buffer);
            self.bits_in_buffer += 16;
        }
    }

    /// Peek at the next n bits without consuming them.
    ///
    /// `n` must not exceed the number of buffered bits; call [`fill`] first.
    ///
    /// [`fill`]: BitReader::fill
    #[inline]
    pub fn peek(&self, n: u32) -> u32 {
        debug_assert!(n <= self.bits_in_buffer);
        if n == 0 {
            0
        } else {
            self.buffer >> (32 - n)
        }
    }

    /// Drop n buffered bits.
    #[inline]
    pub fn consume(&mut self, n: u32) {
        debug_assert!(n <= self.bits_in_buffer);
        self.buffer = if n >= 32 { 0 } else { self.buffer << n };
        self.bits_in_buffer -= n;
        self.consumed += u64::from(n);
    }

    /// Read n bits (up to 32), MSB first.
    #[inline]
    pub fn read_bits(&mut self, n: u32) -> u32 {
        debug_assert!(n <= 32);
        let mut value: u64 = 0;
        let mut needed = n;
        while needed > 0 {
            self.fill();
            let run = needed.min(self.bits_in_buffer);
            value = (value << run) | u64::from(self.peek(run));
            self.consume(run);
            needed -= run;
        }
        value as u32
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> u32 {
        self.read_bits(1)
    }

    /// Bits consumed so far.
    pub fn bit_position(&self) -> u64 {
        self.consumed
    }

    /// Bits consumed beyond the end of the input (read as zero).
    pub fn bits_past_end(&self) -> u64 {
        self.consumed.saturating_sub(self.data.len() as u64 * 8)
    }

    /// Real input bits not yet consumed.
    pub fn remaining_bits(&self) -> u64 {
        (self.data.len() as u64 * 8).saturating_sub(self.consumed)
    }
}
