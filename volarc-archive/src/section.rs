//! Section framing for the VOL container.
//!
//! Every structure in a VOL file is introduced by an 8-byte header: a
//! 4-byte ASCII tag followed by a little-endian u32 length whose top bit
//! is a marker meaning "this section's payload is padded to a 4-byte
//! boundary". The game's tools always set the marker, so a clear bit is
//! treated as corruption. The low 31 bits are the payload length, which
//! excludes the header itself and the padding.

use std::io::{Read, Write};

use volarc_core::{Result, VolError};

/// Outermost section; its length spans the three metadata sections.
pub const TAG_VOL: [u8; 4] = *b"VOL ";
/// Empty legacy header section.
pub const TAG_HEADER: [u8; 4] = *b"volh";
/// Filename string table.
pub const TAG_STRINGS: [u8; 4] = *b"vols";
/// Index table of 14-byte entry records.
pub const TAG_INDEX: [u8; 4] = *b"voli";
/// One data block per stored file.
pub const TAG_BLOCK: [u8; 4] = *b"VBLK";

/// Bytes a section header occupies on disk.
pub const SECTION_HEADER_LEN: u64 = 8;

const PADDING_MARKER: u32 = 0x8000_0000;

/// Round up to the next 4-byte boundary.
pub fn pad4(len: u64) -> u64 {
    (len + 3) & !3
}

/// A decoded section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    /// The 4-byte ASCII tag.
    pub tag: [u8; 4],
    /// Payload length in bytes (marker bit stripped).
    pub length: u32,
}

impl SectionHeader {
    /// Read a header from `reader`; `offset` is the header's position in
    /// the file, used only for error reporting.
    pub fn read<R: Read>(reader: &mut R, offset: u64) -> Result<Self> {
        let mut raw = [0u8; 8];
        reader.read_exact(&mut raw)?;

        let tag = [raw[0], raw[1], raw[2], raw[3]];
        let word = u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]);
        if word & PADDING_MARKER == 0 {
            return Err(VolError::malformed_header(
                offset,
                format!("padding marker clear in section {:?}", tag_name(tag)),
            ));
        }

        Ok(Self {
            tag,
            length: word & !PADDING_MARKER,
        })
    }

    /// Read a header and require a specific tag.
    pub fn expect<R: Read>(reader: &mut R, offset: u64, tag: [u8; 4]) -> Result<Self> {
        let header = Self::read(reader, offset)?;
        if header.tag != tag {
            return Err(VolError::malformed_header(
                offset,
                format!(
                    "expected section {:?}, found {:?}",
                    tag_name(tag),
                    tag_name(header.tag)
                ),
            ));
        }
        Ok(header)
    }

    /// Write a header with the padding marker set.
    ///
    /// Rejects lengths that collide with the marker bit.
    pub fn write<W: Write>(writer: &mut W, tag: [u8; 4], length: u64) -> Result<()> {
        if length > u64::from(!PADDING_MARKER) {
            return Err(VolError::size_overflow(format!(
                "section {:?} length {} exceeds 31 bits",
                tag_name(tag),
                length
            )));
        }
        writer.write_all(&tag)?;
        writer.write_all(&(length as u32 | PADDING_MARKER).to_le_bytes())?;
        Ok(())
    }
}

fn tag_name(tag: [u8; 4]) -> String {
    tag.iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                char::from(b)
            } else {
                '.'
            }
        })
        .collect()
}
