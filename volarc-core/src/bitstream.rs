//! Bit-level reading for the LZH variable-length codes.
//!
//! The VOL LZH streams are packed MSB-first: the first bit of the stream
//! is the most significant bit of the first byte. `BitReader` is a
//! strictly forward, single-pass cursor over a caller-owned byte slice;
//! it never mutates the buffer and cannot seek backward.
//!
//! Reading past the end of the slice yields `false`/zero bits rather than
//! an error. The decoder relies on this: an LZH block carries no length
//! header, so end of data is discovered by draining the bit stream.
//!
//! # Example
//!
//! ```
//! use volarc_core::bitstream::BitReader;
//!
//! let data = [0b1011_0101];
//! let mut reader = BitReader::new(&data);
//! assert!(reader.read_bit());  // MSB first
//! assert!(!reader.read_bit());
//! assert_eq!(reader.bit_position(), 2);
//! ```

/// An MSB-first bit cursor over a borrowed byte slice.
#[derive(Debug)]
pub struct BitReader<'a> {
    /// Source bytes.
    data: &'a [u8],
    /// Index of the next byte to buffer.
    next: usize,
    /// Byte currently being consumed, left-aligned on unread bits.
    buffer: u8,
    /// Number of unread bits left in `buffer`.
    bits_in_buffer: u8,
    /// Total bits consumed so far.
    total_bits_read: usize,
}

impl<'a> BitReader<'a> {
    /// Create a new `BitReader` over the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            next: 0,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_read: 0,
        }
    }

    /// Read a single bit, most significant first.
    ///
    /// Returns `false` once the stream is exhausted; the cursor does not
    /// advance past the end.
    pub fn read_bit(&mut self) -> bool {
        if self.bits_in_buffer == 0 {
            if self.next >= self.data.len() {
                return false;
            }
            self.buffer = self.data[self.next];
            self.next += 1;
            self.bits_in_buffer = 8;
        }

        let bit = self.buffer & 0x80 != 0;
        self.buffer <<= 1;
        self.bits_in_buffer -= 1;
        self.total_bits_read += 1;
        bit
    }

    /// Read the next 8 bits as a byte.
    ///
    /// When the cursor is not byte-aligned this combines the tail of the
    /// buffered byte with the head of the next one. Missing trailing bits
    /// past the end of the stream read as zero.
    pub fn read_byte(&mut self) -> u8 {
        if self.bits_in_buffer == 0 && self.next < self.data.len() {
            // Aligned fast path.
            let byte = self.data[self.next];
            self.next += 1;
            self.total_bits_read += 8;
            return byte;
        }

        let mut value = 0u8;
        for _ in 0..8 {
            value = (value << 1) | self.read_bit() as u8;
        }
        value
    }

    /// Whether every bit of the stream has been consumed.
    pub fn at_end(&self) -> bool {
        self.bits_in_buffer == 0 && self.next >= self.data.len()
    }

    /// Total number of bits consumed so far.
    pub fn bit_position(&self) -> usize {
        self.total_bits_read
    }
}
