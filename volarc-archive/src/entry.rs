//! Index entries and compression kinds.

use std::fmt;

/// On-disk size of one index record: filename offset (u32), data offset
/// (u32), file size (i32), compression kind (u16).
pub const INDEX_ENTRY_LEN: u64 = 14;

/// Filename offset marking a deleted (tombstoned) index slot.
pub const TOMBSTONE: u32 = u32::MAX;

/// How an entry's data block is stored.
///
/// The game's tooling produced all four kinds; this implementation
/// extracts `Uncompressed` and `Lzh` and recognizes the rest so it can
/// report them precisely instead of misreading their blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionKind {
    /// Raw bytes (0x100). The only kind this library writes.
    Uncompressed,
    /// Run-length encoded (0x101). Recognized, not extractable.
    Rle,
    /// Plain LZ (0x102). Recognized, not extractable.
    Lz,
    /// Adaptive-Huffman LZ (0x103).
    Lzh,
    /// Any other code found in the index.
    Unknown(u16),
}

impl CompressionKind {
    /// Decode the raw index-record code.
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0x100 => Self::Uncompressed,
            0x101 => Self::Rle,
            0x102 => Self::Lz,
            0x103 => Self::Lzh,
            other => Self::Unknown(other),
        }
    }

    /// The raw code written to an index record.
    pub fn to_raw(self) -> u16 {
        match self {
            Self::Uncompressed => 0x100,
            Self::Rle => 0x101,
            Self::Lz => 0x102,
            Self::Lzh => 0x103,
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether extraction is implemented for this kind.
    pub fn is_supported(self) -> bool {
        matches!(self, Self::Uncompressed | Self::Lzh)
    }
}

impl fmt::Display for CompressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uncompressed => write!(f, "uncompressed"),
            Self::Rle => write!(f, "rle"),
            Self::Lz => write!(f, "lz"),
            Self::Lzh => write!(f, "lzh"),
            Self::Unknown(raw) => write!(f, "unknown({:#06x})", raw),
        }
    }
}

/// One live entry of a parsed archive.
#[derive(Debug, Clone)]
pub struct VolEntry {
    /// Filename from the string table.
    pub name: String,
    /// Absolute file offset of the entry's VBLK header.
    pub data_offset: u32,
    /// Decoded (uncompressed) size in bytes.
    pub size: u32,
    /// Storage kind of the data block.
    pub kind: CompressionKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_raw_round_trip() {
        for raw in [0x100u16, 0x101, 0x102, 0x103, 0x1FF, 0] {
            assert_eq!(CompressionKind::from_raw(raw).to_raw(), raw);
        }
    }

    #[test]
    fn test_kind_support() {
        assert!(CompressionKind::Uncompressed.is_supported());
        assert!(CompressionKind::Lzh.is_supported());
        assert!(!CompressionKind::Rle.is_supported());
        assert!(!CompressionKind::Lz.is_supported());
        assert!(!CompressionKind::Unknown(0x3E7).is_supported());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(CompressionKind::Lzh.to_string(), "lzh");
        assert_eq!(CompressionKind::Unknown(0x1FF).to_string(), "unknown(0x01ff)");
    }
}
