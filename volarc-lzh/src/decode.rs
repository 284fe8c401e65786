//! LZH stream decoding.
//!
//! A stream is a bit-packed sequence of Huffman-coded symbols. Symbols
//! below 256 are literal bytes. Symbols 256 and above are run lengths
//! (`symbol - 253`, so 3 through 60 bytes) followed by a 12-bit window
//! offset packed in a variable-width form: short offsets spend fewer
//! bits on their upper half.
//!
//! Blocks carry no length header. The decoder runs until the bit stream
//! is exhausted; the trailing pad bits of the final byte may decode as
//! spurious symbols, so callers that know the decoded size (the archive
//! layer always does) read exactly that many bytes and stop.

use volarc_core::{BitReader, WindowBuffer};

use crate::tree::{HuffmanTree, Symbol};

/// Smallest run a match symbol can encode.
pub const MIN_RUN: usize = 3;
/// Largest run a match symbol can encode (symbol 313).
pub const MAX_RUN: usize = 60;
/// Match symbols encode `symbol - LENGTH_BASE` bytes.
const LENGTH_BASE: usize = 253;

/// Variable-width offset ranges, keyed on the 8-bit seed value.
///
/// Each row is `(seed_limit, extra_bits, upper_base)`: seeds below the
/// limit (and at or above the previous row's limit) read `extra_bits`
/// more bits, and the upper six bits of the offset start at `upper_base`
/// for the row, stepping once per `2^(6 - extra_bits)` seed values.
const OFFSET_RANGES: [(u16, u8, u16); 6] = [
    (0x20, 1, 0x00),
    (0x50, 2, 0x01),
    (0x90, 3, 0x04),
    (0xC0, 4, 0x0C),
    (0xF0, 5, 0x18),
    (0x100, 6, 0x30),
];

/// Streaming decoder for one LZH-compressed entry.
#[derive(Debug)]
pub struct LzhDecoder<'a> {
    tree: HuffmanTree,
    reader: BitReader<'a>,
    window: WindowBuffer,
    finished: bool,
}

impl<'a> LzhDecoder<'a> {
    /// Create a decoder over one entry's compressed bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self::from_reader(BitReader::new(data))
    }

    /// Create a decoder from an already-positioned bit reader.
    pub fn from_reader(reader: BitReader<'a>) -> Self {
        Self {
            tree: HuffmanTree::lzh(),
            reader,
            window: WindowBuffer::lzh(),
            finished: false,
        }
    }

    /// Whether the compressed bit stream has been fully consumed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Walk the tree root-to-leaf, one bit per level.
    fn next_symbol(&mut self) -> Symbol {
        let mut node = self.tree.root();
        while !self.tree.is_leaf(node) {
            node = self.tree.child(node, self.reader.read_bit());
        }
        self.tree.symbol_of(node)
    }

    /// Decode a 12-bit window offset.
    ///
    /// The upper six bits arrive as an 8-bit seed classified into one of
    /// six ranges; the range decides how many further bits join the low
    /// six, which are the seed's remaining bits shifted together with
    /// the extra bits.
    fn decode_offset(&mut self) -> u16 {
        let seed = u16::from(self.reader.read_byte());

        let mut start = 0u16;
        let mut extra = 0u8;
        let mut base = 0u16;
        for &(limit, range_extra, range_base) in &OFFSET_RANGES {
            if seed < limit {
                extra = range_extra;
                base = range_base;
                break;
            }
            start = limit;
        }

        let group = 1u16 << (6 - extra);
        let upper = base + (seed - start) / group;

        let mut low = seed;
        for _ in 0..extra {
            low = (low << 1) | u16::from(self.reader.read_bit());
        }

        upper << 6 | (low & 0x3F)
    }

    /// Decode one symbol into the window. Returns true once the bit
    /// stream is exhausted.
    fn decode_one(&mut self) -> bool {
        let symbol = self.next_symbol();
        self.tree.update_count(symbol);

        if symbol < 256 {
            self.window.push(symbol as u8);
        } else {
            let length = symbol as usize - LENGTH_BASE;
            let offset = self.decode_offset();
            self.window.copy_back(usize::from(offset), length);
        }
        self.reader.at_end()
    }

    /// Decode until the stream ends or the window headroom drops below
    /// one maximum-length run.
    fn fill(&mut self) {
        while !self.finished && self.window.free() >= MAX_RUN {
            if self.reader.at_end() {
                self.finished = true;
                break;
            }
            if self.decode_one() {
                self.finished = true;
            }
        }
    }

    /// Decode into `out`, returning the number of bytes produced.
    ///
    /// Returns less than `out.len()` only when the stream is exhausted;
    /// zero means end of stream.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let mut total = 0;
        while total < out.len() {
            if self.window.is_empty() {
                self.fill();
                if self.window.is_empty() {
                    break;
                }
            }
            total += self.window.read_into(&mut out[total..]);
        }
        total
    }

    /// Zero-copy view of the next decoded bytes.
    ///
    /// Decodes more input if nothing is pending. The slice is bounded by
    /// the window's wraparound point; call [`Self::consume`] with the
    /// number of bytes actually used, then peek again. An empty slice
    /// means end of stream.
    pub fn peek_run(&mut self) -> &[u8] {
        if self.window.is_empty() {
            self.fill();
        }
        self.window.peek_run()
    }

    /// Release `count` bytes previously returned by [`Self::peek_run`].
    pub fn consume(&mut self, count: usize) {
        self.window.consume(count);
    }
}
