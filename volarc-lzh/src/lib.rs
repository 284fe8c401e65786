//! # volarc-lzh
//!
//! Decoder for the LZH compression scheme found inside VOL archives: an
//! LZ77 stream over a 4 KB circular history window whose symbols (256
//! literal bytes plus 58 run lengths) are coded with an adaptive Huffman
//! tree. No code table is transmitted; the tree starts balanced and is
//! rebalanced after every symbol on both sides.
//!
//! There is no compressor here. Archives written by this workspace pack
//! entries uncompressed; this crate exists to read the compressed
//! entries of existing game archives. [`HuffmanTree::encoded_path`] is
//! public so tests (and an eventual encoder) can produce valid streams.
//!
//! ## Example
//!
//! ```
//! use volarc_lzh::LzhDecoder;
//!
//! // An empty stream decodes to nothing.
//! let mut decoder = LzhDecoder::new(&[]);
//! let mut out = [0u8; 64];
//! assert_eq!(decoder.read(&mut out), 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod decode;
pub mod tree;

pub use decode::{LzhDecoder, MAX_RUN, MIN_RUN};
pub use tree::{HuffmanTree, LZH_SYMBOLS, NodeIndex, Symbol};
