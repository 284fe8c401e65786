//! # volarc-core
//!
//! Core components for the volarc VOL-archive library.
//!
//! This crate provides the building blocks shared by the codec and
//! container layers:
//!
//! - [`bitstream`]: MSB-first bit reading for the adaptive Huffman codes
//! - [`ringbuffer`]: the 4 KB circular history window for LZ back-references
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! The workspace is a small layered stack:
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │ volarc-cli: list / extract / create / repack│
//! ├────────────────────────────────────────────┤
//! │ volarc-archive: VOL container parse + pack  │
//! ├────────────────────────────────────────────┤
//! │ volarc-lzh: adaptive Huffman + LZ decoder   │
//! ├────────────────────────────────────────────┤
//! │ volarc-core (this crate): bits, window,     │
//! │ errors                                      │
//! └────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod ringbuffer;

// Re-exports for convenience
pub use bitstream::BitReader;
pub use error::{Result, VolError};
pub use ringbuffer::{LZH_WINDOW, WindowBuffer};
