//! Reading VOL archives.
//!
//! A VOL file opens with four sections in a fixed order: the outer
//! `"VOL "` (whose length spans the metadata that follows), an empty
//! legacy `"volh"`, the `"vols"` filename string table, and the `"voli"`
//! index table. Entry data blocks (`"VBLK"`) follow at the offsets the
//! index records name.
//!
//! Index slots can be tombstoned by the game's delete operation, which
//! overwrites the slot's filename offset with `0xFFFFFFFF`. The visible
//! entry count is the number of records before the first tombstone;
//! records after it are never consulted, matching the original tooling.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use volarc_core::{BitReader, Result, VolError};
use volarc_lzh::LzhDecoder;

use crate::entry::{CompressionKind, INDEX_ENTRY_LEN, TOMBSTONE, VolEntry};
use crate::section::{
    SECTION_HEADER_LEN, SectionHeader, TAG_BLOCK, TAG_HEADER, TAG_INDEX, TAG_STRINGS, TAG_VOL,
};

/// A parsed VOL archive over any seekable byte source.
#[derive(Debug)]
pub struct VolReader<R: Read + Seek> {
    reader: R,
    entries: Vec<VolEntry>,
}

impl VolReader<BufReader<File>> {
    /// Open and parse an archive file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read + Seek> VolReader<R> {
    /// Parse the metadata sections of an archive.
    ///
    /// Data blocks are not touched until [`Self::extract`].
    pub fn new(mut reader: R) -> Result<Self> {
        reader.seek(SeekFrom::Start(0))?;

        let outer = SectionHeader::expect(&mut reader, 0, TAG_VOL)?;
        let declared = u64::from(outer.length);

        let legacy = SectionHeader::expect(&mut reader, 8, TAG_HEADER)?;
        if legacy.length != 0 {
            return Err(VolError::malformed_header(
                8,
                format!("legacy header section has length {}", legacy.length),
            ));
        }

        let strings = SectionHeader::expect(&mut reader, 16, TAG_STRINGS)?;
        let strings_len = u64::from(strings.length);
        if strings_len < 4 {
            return Err(VolError::malformed_header(
                16,
                "string table too short for its length field",
            ));
        }
        if 16 + strings_len > declared {
            return Err(VolError::malformed_header(
                16,
                format!(
                    "string table length {} overflows declared archive header length {}",
                    strings_len, declared
                ),
            ));
        }

        let mut word = [0u8; 4];
        reader.read_exact(&mut word)?;
        let names_len = u64::from(u32::from_le_bytes(word));
        if names_len > strings_len - 4 {
            return Err(VolError::malformed_header(
                24,
                format!(
                    "string table claims {} name bytes in a {} byte payload",
                    names_len,
                    strings_len - 4
                ),
            ));
        }
        let mut names = vec![0u8; (strings_len - 4) as usize];
        reader.read_exact(&mut names)?;
        let names = &names[..names_len as usize];

        let index_pos = 16 + SECTION_HEADER_LEN + strings_len;
        let index = SectionHeader::expect(&mut reader, index_pos, TAG_INDEX)?;
        let index_len = u64::from(index.length);
        if 16 + strings_len + SECTION_HEADER_LEN + index_len > declared {
            return Err(VolError::malformed_header(
                index_pos,
                format!(
                    "index table length {} overflows declared archive header length {}",
                    index_len, declared
                ),
            ));
        }

        let mut records = vec![0u8; index_len as usize];
        reader.read_exact(&mut records)?;

        let entries = parse_entries(&records, names, index_pos)?;
        Ok(Self { reader, entries })
    }

    /// Number of live entries (records before the first tombstone).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no live entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The live entries in index order.
    pub fn entries(&self) -> &[VolEntry] {
        &self.entries
    }

    /// A live entry by index.
    pub fn entry(&self, index: usize) -> Result<&VolEntry> {
        self.entries
            .get(index)
            .ok_or_else(|| VolError::index_out_of_range(index, self.entries.len()))
    }

    /// An entry's filename.
    pub fn name(&self, index: usize) -> Result<&str> {
        Ok(&self.entry(index)?.name)
    }

    /// An entry's decoded size in bytes.
    pub fn size(&self, index: usize) -> Result<u32> {
        Ok(self.entry(index)?.size)
    }

    /// An entry's storage kind.
    pub fn kind(&self, index: usize) -> Result<CompressionKind> {
        Ok(self.entry(index)?.kind)
    }

    /// Index of the entry with this exact name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Whether an entry with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Decode one entry's bytes into `sink`, returning the byte count.
    pub fn extract<W: Write>(&mut self, index: usize, sink: &mut W) -> Result<u64> {
        let entry = self.entry(index)?.clone();
        let offset = u64::from(entry.data_offset);

        self.reader.seek(SeekFrom::Start(offset))?;
        let block = SectionHeader::expect(&mut self.reader, offset, TAG_BLOCK)?;

        match entry.kind {
            CompressionKind::Uncompressed => {
                if block.length != entry.size {
                    return Err(VolError::malformed_header(
                        offset,
                        format!(
                            "data block length {} does not match entry size {}",
                            block.length, entry.size
                        ),
                    ));
                }
                let copied = io::copy(&mut (&mut self.reader).take(entry.size.into()), sink)?;
                if copied != u64::from(entry.size) {
                    return Err(VolError::malformed_header(
                        offset,
                        format!("data block truncated at {} of {} bytes", copied, entry.size),
                    ));
                }
                Ok(copied)
            }
            CompressionKind::Lzh => {
                let mut packed = vec![0u8; block.length as usize];
                self.reader.read_exact(&mut packed)?;

                // The compressed stream has no terminator; decode
                // exactly the decoded size the index promises. Trailing
                // pad bits of the final byte are ignored.
                let mut decoder = LzhDecoder::from_reader(BitReader::new(&packed));
                let mut buf = [0u8; 8192];
                let mut remaining = entry.size as usize;
                while remaining > 0 {
                    let want = buf.len().min(remaining);
                    let n = decoder.read(&mut buf[..want]);
                    if n == 0 {
                        return Err(VolError::malformed_header(
                            offset,
                            format!(
                                "compressed stream ended {} bytes short of entry size {}",
                                remaining, entry.size
                            ),
                        ));
                    }
                    sink.write_all(&buf[..n])?;
                    remaining -= n;
                }
                Ok(u64::from(entry.size))
            }
            other => Err(VolError::unsupported_compression(other.to_raw())),
        }
    }

    /// Decode one entry into a fresh `Vec`.
    pub fn extract_to_vec(&mut self, index: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.entry(index)?.size as usize);
        self.extract(index, &mut out)?;
        Ok(out)
    }

    /// Decode the entry with this exact name into `sink`.
    pub fn extract_by_name<W: Write>(&mut self, name: &str, sink: &mut W) -> Result<u64> {
        let index = self
            .index_of(name)
            .ok_or_else(|| VolError::name_not_found(name))?;
        self.extract(index, sink)
    }
}

/// Decode index records up to the first tombstone, resolving names.
fn parse_entries(records: &[u8], names: &[u8], index_pos: u64) -> Result<Vec<VolEntry>> {
    let mut entries = Vec::new();

    for (slot, record) in records.chunks_exact(INDEX_ENTRY_LEN as usize).enumerate() {
        let name_offset = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
        if name_offset == TOMBSTONE {
            break;
        }
        let record_pos = index_pos + SECTION_HEADER_LEN + slot as u64 * INDEX_ENTRY_LEN;

        let data_offset = u32::from_le_bytes([record[4], record[5], record[6], record[7]]);
        let size = i32::from_le_bytes([record[8], record[9], record[10], record[11]]);
        let raw_kind = u16::from_le_bytes([record[12], record[13]]);

        if size < 0 {
            return Err(VolError::malformed_header(
                record_pos,
                format!("negative file size {} in index record {}", size, slot),
            ));
        }

        let name = name_at(names, name_offset).ok_or_else(|| {
            VolError::malformed_header(
                record_pos,
                format!(
                    "index record {} names string-table offset {} past the table",
                    slot, name_offset
                ),
            )
        })?;

        entries.push(VolEntry {
            name,
            data_offset,
            size: size as u32,
            kind: CompressionKind::from_raw(raw_kind),
        });
    }

    Ok(entries)
}

/// The NUL-terminated string starting at `offset` within the name bytes.
fn name_at(names: &[u8], offset: u32) -> Option<String> {
    let start = offset as usize;
    if start >= names.len() {
        return None;
    }
    let end = names[start..]
        .iter()
        .position(|&b| b == 0)
        .map(|n| start + n)?;
    Some(String::from_utf8_lossy(&names[start..end]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_at() {
        let names = b"alpha\0beta\0";
        assert_eq!(name_at(names, 0).as_deref(), Some("alpha"));
        assert_eq!(name_at(names, 6).as_deref(), Some("beta"));
        assert_eq!(name_at(names, 11), None);
        // Unterminated tail is rejected.
        assert_eq!(name_at(b"oops", 0), None);
    }

    #[test]
    fn test_sentinel_truncates_entries() {
        // Three records, the second tombstoned: only the first is live.
        let names = b"one\0two\0";
        let mut records = Vec::new();
        for (name_offset, data_offset) in [(0u32, 100u32), (TOMBSTONE, 0), (4, 200)] {
            records.extend_from_slice(&name_offset.to_le_bytes());
            records.extend_from_slice(&data_offset.to_le_bytes());
            records.extend_from_slice(&5i32.to_le_bytes());
            records.extend_from_slice(&0x100u16.to_le_bytes());
        }

        let entries = parse_entries(&records, names, 0).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "one");
        assert_eq!(entries[0].data_offset, 100);
    }

    #[test]
    fn test_bad_name_offset_rejected() {
        let mut record = Vec::new();
        record.extend_from_slice(&42u32.to_le_bytes());
        record.extend_from_slice(&0u32.to_le_bytes());
        record.extend_from_slice(&0i32.to_le_bytes());
        record.extend_from_slice(&0x100u16.to_le_bytes());

        let err = parse_entries(&record, b"tiny\0", 0).unwrap_err();
        assert!(matches!(err, VolError::MalformedHeader { .. }));
    }
}
