//! Sliding window for Quantum back-references.
//!
//! A circular history buffer sized to a power of two. Both the source and the
//! destination of a copy wrap through the mask; keeping a single run inside
//! the window is the decoder's concern.

use super::{DecompressError, Result};

/// Circular output history.
pub struct SlidingWindow {
    /// Sliding window buffer
    window: Vec<u8>,
    /// Window size mask for wrap-around
    mask: usize,
    /// Current write position in window
    pos: usize,
    /// Total bytes written
    total_written: u64,
}

impl SlidingWindow {
    /// Create a zeroed window of `window_size` bytes (a power of two).
    pub fn new(window_size: usize) -> Self {
        debug_assert!(window_size.is_power_of_two());
        Self {
            window: vec![0; window_size],
            mask: window_size - 1,
            pos: 0,
            total_written: 0,
        }
    }

    /// Resize and clear the window, keeping the allocation when it is large
    /// enough.
    pub fn reset(&mut self, window_size: usize) {
        debug_assert!(window_size.is_power_of_two());
        self.window.clear();
        self.window.resize(window_size, 0);
        self.mask = window_size - 1;
        self.pos = 0;
        self.total_written = 0;
    }

    /// Window size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.window.len()
    }

    /// Allocated capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.window.capacity()
    }

    /// Current write position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total bytes written since the last reset.
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Write a literal byte.
    #[inline]
    pub fn write_literal(&mut self, byte: u8) {
        self.window[self.pos] = byte;
        self.pos = (self.pos + 1) & self.mask;
        self.total_written += 1;
    }

    /// Copy `length` bytes starting `offset` bytes back.
    ///
    /// Overlapping copies repeat the pattern, as in any LZ77 decoder.
    #[inline]
    pub fn copy_match(&mut self, offset: u32, length: usize) -> Result<()> {
        let dist = offset as usize;
        if dist == 0 || dist > self.window.len() {
            return Err(DecompressError::InvalidBackReference {
                offset,
                position: self.pos as u32,
            });
        }

        let window_size = self.window.len();

        // Fast path: neither side wraps and the ranges don't overlap.
        if dist >= length && self.pos >= dist && self.pos + length <= window_size {
            let src_start = self.pos - dist;
            self.window
                .copy_within(src_start..src_start + length, self.pos);
            self.pos = (self.pos + length) & self.mask;
            self.total_written += length as u64;
            return Ok(());
        }

        // Slow path: the source cursor runs separately from the destination
        // and both wrap at the window end.
        let mut src = (self.pos + window_size - dist) & self.mask;
        for _ in 0..length {
            self.window[self.pos] = self.window[src];
            self.pos = (self.pos + 1) & self.mask;
            src = (src + 1) & self.mask;
        }

        self.total_written += length as u64;
        Ok(())
    }

    /// The most recent `length` bytes, ending at the write position.
    pub fn read_tail(&self, length: usize) -> Vec<u8> {
        let length = length.min(self.window.len());
        let start = self.pos.wrapping_sub(length) & self.mask;

        if start + length <= self.window.len() {
            return self.window[start..start + length].to_vec();
        }

        let mut output = Vec::with_capacity(length);
        output.extend_from_slice(&self.window[start..]);
        output.extend_from_slice(&self.window[..self.pos]);
        output
    }
}
