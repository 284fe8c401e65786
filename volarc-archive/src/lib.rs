//! # volarc-archive
//!
//! The VOL container format: a small sectioned archive holding a
//! filename string table, a fixed-width index, and one tagged data
//! block per file. [`VolReader`] parses and extracts (raw and
//! LZH-compressed entries); [`VolBuilder`] packs new archives with the
//! exact offset and padding layout of the original tooling, always
//! storing data uncompressed.
//!
//! ## Example
//!
//! ```
//! use std::io::Cursor;
//! use volarc_archive::{VolBuilder, VolReader};
//!
//! let mut builder = VolBuilder::new();
//! builder.add_file("hello.txt", b"hi there".to_vec());
//! let bytes = builder.build().unwrap();
//!
//! let mut archive = VolReader::new(Cursor::new(bytes)).unwrap();
//! assert_eq!(archive.len(), 1);
//! assert_eq!(archive.extract_to_vec(0).unwrap(), b"hi there");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod entry;
pub mod reader;
pub mod section;
pub mod writer;

pub use entry::{CompressionKind, VolEntry};
pub use reader::VolReader;
pub use writer::{VolBuilder, create, repack};
