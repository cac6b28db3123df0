//! Cabinet format detection and the folder compression word.
//!
//! Zero dependencies.

/// Cabinet file signature.
pub const CAB_SIGNATURE: &[u8; 4] = b"MSCF";

/// Returns true when `data` starts with the cabinet signature.
pub fn is_cabinet(data: &[u8]) -> bool {
    data.starts_with(CAB_SIGNATURE)
}

const METHOD_MASK: u16 = 0x000F;
const LEVEL_MASK: u16 = 0x00F0;
const WINDOW_MASK: u16 = 0x1F00;

const METHOD_NONE: u16 = 0;
const METHOD_MSZIP: u16 = 1;
const METHOD_QUANTUM: u16 = 2;
const METHOD_LZX: u16 = 3;

/// Compression method of a folder, decoded from the CFFOLDER `typeCompress`
/// word.
///
/// The low nibble selects the method. Quantum keeps its level in bits 4-7 and
/// its window size (log2) in bits 8-12; LZX uses bits 8-12 for its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// Stored, no compression.
    None,
    /// Deflate with `CK` block prefixes.
    MsZip,
    /// Quantum.
    Quantum { level: u8, window_bits: u8 },
    /// LZX.
    Lzx { window_bits: u8 },
    /// Any other low nibble.
    Unknown(u16),
}

impl CompressionType {
    pub fn from_raw(raw: u16) -> Self {
        let window_bits = ((raw & WINDOW_MASK) >> 8) as u8;
        match raw & METHOD_MASK {
            METHOD_NONE => Self::None,
            METHOD_MSZIP => Self::MsZip,
            METHOD_QUANTUM => Self::Quantum {
                level: ((raw & LEVEL_MASK) >> 4) as u8,
                window_bits,
            },
            METHOD_LZX => Self::Lzx { window_bits },
            _ => Self::Unknown(raw),
        }
    }

    pub fn to_raw(self) -> u16 {
        match self {
            Self::None => METHOD_NONE,
            Self::MsZip => METHOD_MSZIP,
            Self::Quantum { level, window_bits } => {
                METHOD_QUANTUM
                    | ((u16::from(level) << 4) & LEVEL_MASK)
                    | ((u16::from(window_bits) << 8) & WINDOW_MASK)
            }
            Self::Lzx { window_bits } => METHOD_LZX | ((u16::from(window_bits) << 8) & WINDOW_MASK),
            Self::Unknown(raw) => raw,
        }
    }

    /// Short method name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::MsZip => "mszip",
            Self::Quantum { .. } => "quantum",
            Self::Lzx { .. } => "lzx",
            Self::Unknown(_) => "unknown",
        }
    }
}
