//! Creating and rewriting VOL archives.
//!
//! The writer lays the whole archive out in memory before touching the
//! destination, so a rejected build (duplicate names, overflow) leaves
//! nothing behind. Entries are sorted case-insensitively by file name,
//! every data block is stored uncompressed, and every offset is padded
//! to a 4-byte boundary exactly as the game's own packer did it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use volarc_core::{Result, VolError};

use crate::entry::{CompressionKind, INDEX_ENTRY_LEN};
use crate::reader::VolReader;
use crate::section::{
    SECTION_HEADER_LEN, SectionHeader, TAG_BLOCK, TAG_HEADER, TAG_INDEX, TAG_STRINGS, TAG_VOL,
    pad4,
};

/// Accumulates files and writes them out as a VOL archive.
#[derive(Debug, Default)]
pub struct VolBuilder {
    files: Vec<SourceFile>,
}

#[derive(Debug)]
struct SourceFile {
    name: String,
    data: Vec<u8>,
    /// Where the bytes came from, for the self-overwrite check.
    origin: Option<PathBuf>,
}

impl VolBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files queued so far.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files are queued.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Queue in-memory bytes under the given archive name.
    pub fn add_file(&mut self, name: impl Into<String>, data: Vec<u8>) -> &mut Self {
        self.files.push(SourceFile {
            name: name.into(),
            data,
            origin: None,
        });
        self
    }

    /// Queue a file from disk; its archive name is the path's file name.
    pub fn add_path<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .ok_or_else(|| VolError::name_not_found(path.display().to_string()))?
            .to_string_lossy()
            .into_owned();
        let data = fs::read(path)?;
        self.files.push(SourceFile {
            name,
            data,
            origin: Some(path.to_path_buf()),
        });
        Ok(self)
    }

    /// Serialize the archive into a byte buffer.
    pub fn build(&self) -> Result<Vec<u8>> {
        // Sort on the file-name component only, case-insensitively, the
        // order the game's binary search over the index expects.
        let mut order: Vec<&SourceFile> = self.files.iter().collect();
        order.sort_by_key(|f| sort_key(&f.name));

        for pair in order.windows(2) {
            if sort_key(&pair[0].name) == sort_key(&pair[1].name) {
                return Err(VolError::duplicate_name(&pair[1].name));
            }
        }

        // String table payload: name-byte count, then the NUL-terminated
        // names, padded to 4.
        let mut names = Vec::new();
        let mut name_offsets = Vec::with_capacity(order.len());
        for file in &order {
            name_offsets.push(names.len() as u64);
            names.extend_from_slice(file.name.as_bytes());
            names.push(0);
        }
        let strings_payload = 4 + pad4(names.len() as u64);
        let index_payload = order.len() as u64 * INDEX_ENTRY_LEN;
        let declared = 3 * SECTION_HEADER_LEN + strings_payload + index_payload;

        // First block lands after the four headers and both padded
        // tables; each next block starts at the previous one rounded
        // past its header, data, and padding.
        let mut data_offsets = Vec::with_capacity(order.len());
        let mut offset = 4 * SECTION_HEADER_LEN + strings_payload + pad4(index_payload);
        for file in &order {
            data_offsets.push(offset);
            offset = pad4(offset + SECTION_HEADER_LEN + file.data.len() as u64);
        }

        for (file, &name_offset) in order.iter().zip(&name_offsets) {
            if name_offset > u64::from(u32::MAX) {
                return Err(VolError::size_overflow(format!(
                    "string table offset for {} exceeds 32 bits",
                    file.name
                )));
            }
            if file.data.len() as u64 > i32::MAX as u64 {
                return Err(VolError::size_overflow(format!(
                    "{} is larger than the format's size field allows",
                    file.name
                )));
            }
        }
        // `offset` now points past the final padded block.
        if offset > u64::from(u32::MAX) {
            return Err(VolError::size_overflow(format!(
                "archive would end at byte {}, past the 32-bit offset limit",
                offset
            )));
        }

        let mut out = Vec::with_capacity(pad4(offset) as usize);
        SectionHeader::write(&mut out, TAG_VOL, declared)?;
        SectionHeader::write(&mut out, TAG_HEADER, 0)?;

        SectionHeader::write(&mut out, TAG_STRINGS, strings_payload)?;
        out.write_all(&(names.len() as u32).to_le_bytes())?;
        out.write_all(&names)?;
        write_padding(&mut out)?;

        SectionHeader::write(&mut out, TAG_INDEX, index_payload)?;
        for ((file, &name_offset), &data_offset) in
            order.iter().zip(&name_offsets).zip(&data_offsets)
        {
            out.write_all(&(name_offset as u32).to_le_bytes())?;
            out.write_all(&(data_offset as u32).to_le_bytes())?;
            out.write_all(&(file.data.len() as i32).to_le_bytes())?;
            out.write_all(&CompressionKind::Uncompressed.to_raw().to_le_bytes())?;
        }
        write_padding(&mut out)?;

        for (file, &data_offset) in order.iter().zip(&data_offsets) {
            debug_assert_eq!(out.len() as u64, data_offset);
            SectionHeader::write(&mut out, TAG_BLOCK, file.data.len() as u64)?;
            out.write_all(&file.data)?;
            write_padding(&mut out)?;
        }

        Ok(out)
    }

    /// Build the archive and write it to `path`.
    ///
    /// Refuses to write over a file that is also one of the queued
    /// sources.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.check_self_overwrite(path)?;
        let bytes = self.build()?;
        fs::write(path, bytes)?;
        Ok(())
    }

    fn check_self_overwrite(&self, dest: &Path) -> Result<()> {
        // The destination only collides with a source if it already
        // exists, in which case both sides canonicalize.
        let Ok(dest_real) = fs::canonicalize(dest) else {
            return Ok(());
        };
        for file in &self.files {
            if let Some(origin) = &file.origin {
                if fs::canonicalize(origin).map(|p| p == dest_real).unwrap_or(false) {
                    return Err(VolError::self_overwrite(dest));
                }
            }
        }
        Ok(())
    }
}

/// Pack files into a new archive at `path`.
pub fn create<P: AsRef<Path>>(path: P, files: Vec<(String, Vec<u8>)>) -> Result<()> {
    let mut builder = VolBuilder::new();
    for (name, data) in files {
        builder.add_file(name, data);
    }
    builder.write_to(path)
}

/// Rewrite an archive from its own live entries.
///
/// Tombstoned slots and their orphaned data blocks are dropped and
/// every surviving entry is stored uncompressed. The new bytes go to a
/// sibling temp file first and replace the original by rename, so a
/// failed repack leaves the archive untouched.
pub fn repack<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let mut reader = VolReader::open(path)?;
    let mut builder = VolBuilder::new();
    for index in 0..reader.len() {
        let name = reader.name(index)?.to_owned();
        let data = reader.extract_to_vec(index)?;
        builder.add_file(name, data);
    }
    drop(reader);

    let file_name = path
        .file_name()
        .ok_or_else(|| VolError::name_not_found(path.display().to_string()))?
        .to_string_lossy()
        .into_owned();
    // PID-qualified so a stray sibling file is never clobbered.
    let temp = path.with_file_name(format!("{}.repack.{}", file_name, std::process::id()));
    builder.write_to(&temp)?;
    fs::rename(&temp, path)?;
    Ok(())
}

/// Zero bytes up to the next 4-byte boundary.
fn write_padding(out: &mut Vec<u8>) -> Result<()> {
    let pad = pad4(out.len() as u64) as usize - out.len();
    out.write_all(&[0u8; 3][..pad])?;
    Ok(())
}

/// Lowercased file-name component; directories in the stored name do
/// not take part in ordering or duplicate detection.
fn sort_key(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);
    base.to_ascii_lowercase()
}
