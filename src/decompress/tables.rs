//! Quantum position and length slot tables.

/// Number of position slots.
pub const POSITION_SLOTS: usize = 42;

/// Number of length slots for selector 6.
pub const LENGTH_SLOTS: usize = 27;

/// Extra bits read after each position slot.
pub const POSITION_EXTRA_BITS: [u8; POSITION_SLOTS] = position_extra_bits();

/// Base offset (minus one) of each position slot.
pub const POSITION_BASE: [u32; POSITION_SLOTS] = slot_bases(&POSITION_EXTRA_BITS);

/// Extra bits read after each length slot.
pub const LENGTH_EXTRA_BITS: [u8; LENGTH_SLOTS] = length_extra_bits();

/// Base length (minus five) of each length slot.
pub const LENGTH_BASE: [u32; LENGTH_SLOTS] = slot_bases(&LENGTH_EXTRA_BITS);

const fn position_extra_bits() -> [u8; POSITION_SLOTS] {
    let mut table = [0u8; POSITION_SLOTS];
    let mut i = 0;
    while i < POSITION_SLOTS {
        table[i] = ((if i < 2 { 0 } else { i - 2 }) >> 1) as u8;
        i += 1;
    }
    table
}

const fn length_extra_bits() -> [u8; LENGTH_SLOTS] {
    let mut table = [0u8; LENGTH_SLOTS];
    let mut i = 0;
    while i < LENGTH_SLOTS {
        // The last slot is the single longest length.
        table[i] = if i == LENGTH_SLOTS - 1 {
            0
        } else {
            ((if i < 2 { 0 } else { i - 2 }) >> 2) as u8
        };
        i += 1;
    }
    table
}

const fn slot_bases<const N: usize>(extra_bits: &[u8; N]) -> [u32; N] {
    let mut table = [0u32; N];
    let mut i = 1;
    while i < N {
        table[i] = table[i - 1] + (1 << extra_bits[i - 1]);
        i += 1;
    }
    table
}
