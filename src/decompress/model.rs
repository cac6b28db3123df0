//! Adaptive frequency model.
//!
//! Each model keeps its symbols ordered by descending frequency, stored as
//! cumulative frequencies with a zero sentinel after the last rank. Every
//! decoded symbol adds [`BUMP`] to the cumulative frequency of its rank and
//! every rank above it. Once the total passes [`RESCALE_THRESHOLD`] the table
//! is halved, and every so often it is rebuilt and re-sorted instead.

/// Increment applied per decoded symbol.
pub const BUMP: u16 = 8;

/// Total frequency above which the model is rescaled.
pub const RESCALE_THRESHOLD: u16 = 3800;

/// Rescales between two full rebuilds.
pub const REBUILD_INTERVAL: u32 = 50;

/// Rescales before the first full rebuild of a fresh model.
pub const INITIAL_REBUILD_COUNTDOWN: u32 = 4;

/// Marks a symbol with no rank in the lookup table.
const NO_RANK: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    symbol: u8,
    cum_freq: u16,
}

/// Adaptive rank/frequency table for one coding context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyModel {
    /// Ranks 0..len plus the zero sentinel.
    entries: Vec<Entry>,
    /// Symbol to rank.
    ranks: [u8; 256],
    /// Rescales left until the next full rebuild.
    countdown: u32,
    /// Full rebuilds so far.
    rebuilds: u32,
}

impl FrequencyModel {
    /// Create a model over `symbol_count` symbols starting at `base_symbol`.
    pub fn new(symbol_count: usize, base_symbol: u8) -> Self {
        debug_assert!(symbol_count > 0 && base_symbol as usize + symbol_count <= 256);

        let mut entries = Vec::with_capacity(symbol_count + 1);
        for rank in 0..symbol_count {
            entries.push(Entry {
                symbol: base_symbol.wrapping_add(rank as u8),
                cum_freq: (symbol_count - rank) as u16,
            });
        }
        entries.push(Entry {
            symbol: 0,
            cum_freq: 0,
        });

        let mut model = Self {
            entries,
            ranks: [NO_RANK; 256],
            countdown: INITIAL_REBUILD_COUNTDOWN,
            rebuilds: 0,
        };
        model.rebuild_ranks();
        model
    }

    /// Number of symbols.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total frequency (cumulative frequency of rank 0).
    #[inline]
    pub fn total(&self) -> u16 {
        self.entries[0].cum_freq
    }

    /// Cumulative frequency at `rank`; `rank == len()` is the zero sentinel.
    #[inline]
    pub fn cum_freq(&self, rank: usize) -> u16 {
        self.entries[rank].cum_freq
    }

    /// Symbol value stored at `rank`.
    #[inline]
    pub fn symbol_at(&self, rank: usize) -> u8 {
        self.entries[rank].symbol
    }

    /// Current rank of `symbol`, if it belongs to this model.
    pub fn rank_of(&self, symbol: u8) -> Option<usize> {
        match self.ranks[symbol as usize] {
            NO_RANK => None,
            rank => Some(rank as usize),
        }
    }

    /// Rescales left before the next full rebuild.
    pub fn rebuild_countdown(&self) -> u32 {
        self.countdown
    }

    /// Full rebuilds since the model was created.
    pub fn rebuild_count(&self) -> u32 {
        self.rebuilds
    }

    /// Cumulative frequencies of all ranks, sentinel included.
    pub fn cum_freqs(&self) -> impl Iterator<Item = u16> + '_ {
        self.entries.iter().map(|e| e.cum_freq)
    }

    /// Symbols in rank order.
    pub fn symbols(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries[..self.len()].iter().map(|e| e.symbol)
    }

    /// Add [`BUMP`] to every rank below `end`, rescaling when the total
    /// passes [`RESCALE_THRESHOLD`].
    ///
    /// After decoding the symbol at rank `r` the caller passes `r + 1`.
    pub fn bump(&mut self, end: usize) {
        for entry in &mut self.entries[..end] {
            entry.cum_freq += BUMP;
        }
        if self.total() > RESCALE_THRESHOLD {
            self.rescale();
        }
    }

    fn rescale(&mut self) {
        self.countdown -= 1;
        if self.countdown > 0 {
            self.halve();
        } else {
            self.countdown = REBUILD_INTERVAL;
            self.rebuilds += 1;
            self.rebuild();
        }
    }

    /// Halve cumulative frequencies in place, keeping them strictly decreasing.
    fn halve(&mut self) {
        for rank in (0..self.len()).rev() {
            let next = self.entries[rank + 1].cum_freq;
            let halved = self.entries[rank].cum_freq >> 1;
            self.entries[rank].cum_freq = if halved <= next { next + 1 } else { halved };
        }
    }

    /// Halve the per-symbol frequencies and re-sort by them.
    fn rebuild(&mut self) {
        let len = self.len();

        // Cumulative to halved absolute frequencies. The next rank is still
        // cumulative when each rank is converted.
        for rank in 0..len {
            let next = self.entries[rank + 1].cum_freq;
            let entry = &mut self.entries[rank];
            entry.cum_freq = (entry.cum_freq - next + 1) >> 1;
        }

        // Exchange sort, descending. Equal frequencies are never swapped, and
        // the resulting order of ties is part of the format.
        for i in 0..len.saturating_sub(1) {
            for j in i + 1..len {
                if self.entries[i].cum_freq < self.entries[j].cum_freq {
                    self.entries.swap(i, j);
                }
            }
        }

        for rank in (0..len).rev() {
            self.entries[rank].cum_freq += self.entries[rank + 1].cum_freq;
        }

        self.rebuild_ranks();
    }

    fn rebuild_ranks(&mut self) {
        let len = self.len();
        for (rank, entry) in self.entries[..len].iter().enumerate() {
            self.ranks[entry.symbol as usize] = rank as u8;
        }
    }
}
