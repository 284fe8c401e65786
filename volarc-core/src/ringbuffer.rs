//! Circular output window for LZ back-reference decoding.
//!
//! The LZH streams in VOL archives address matches as a distance into a
//! fixed 4096-byte history window. `WindowBuffer` keeps that history and
//! doubles as the staging area for decoded output: a write cursor marks
//! where the decoder appends, a read cursor marks how far the consumer
//! has drained. Back-references may overlap the write cursor (distance
//! shorter than length); bytes are copied individually in increasing
//! order so the repeat expands as the original encoder intended.

/// History window size for VOL LZH streams (4 KB).
pub const LZH_WINDOW: usize = 4096;

/// A circular buffer with independent read and write cursors.
#[derive(Debug, Clone)]
pub struct WindowBuffer {
    /// The underlying storage, zero-initialized.
    buffer: Vec<u8>,
    /// Write cursor (next decoded byte lands here).
    head: usize,
    /// Read cursor (next byte handed to the consumer).
    tail: usize,
    /// Decoded bytes not yet consumed.
    pending: usize,
    /// Mask for efficient modulo (capacity - 1).
    mask: usize,
}

impl WindowBuffer {
    /// Create a new window of the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or not a power of 2.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        assert!(
            capacity.is_power_of_two(),
            "Capacity must be a power of 2, got {}",
            capacity
        );

        Self {
            buffer: vec![0; capacity],
            head: 0,
            tail: 0,
            pending: 0,
            mask: capacity - 1,
        }
    }

    /// Create a window sized for VOL LZH streams (4 KB).
    pub fn lzh() -> Self {
        Self::new(LZH_WINDOW)
    }

    /// Get the capacity of the window.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of decoded bytes awaiting consumption.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Free space before the write cursor would overtake unread data.
    pub fn free(&self) -> usize {
        self.capacity() - self.pending
    }

    /// Check whether no decoded bytes are waiting.
    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }

    /// Append a literal byte at the write cursor.
    pub fn push(&mut self, byte: u8) {
        debug_assert!(self.pending < self.capacity(), "window overrun");
        self.buffer[self.head] = byte;
        self.head = (self.head + 1) & self.mask;
        self.pending += 1;
    }

    /// Copy `length` bytes starting `offset + 1` positions behind the
    /// write cursor, appending them at the write cursor.
    ///
    /// `offset` is zero-based: offset 0 names the most recently written
    /// byte. Self-overlapping copies (`length > offset + 1`) are legal
    /// and produce a periodic repeat.
    pub fn copy_back(&mut self, offset: usize, length: usize) {
        debug_assert!(offset < self.capacity());
        debug_assert!(self.pending + length <= self.capacity(), "window overrun");

        let mut src = self.head.wrapping_sub(offset + 1) & self.mask;
        for _ in 0..length {
            let byte = self.buffer[src];
            self.buffer[self.head] = byte;
            self.head = (self.head + 1) & self.mask;
            src = (src + 1) & self.mask;
        }
        self.pending += length;
    }

    /// The next contiguous run of unconsumed bytes.
    ///
    /// Bounded by the wraparound point: after consuming the returned
    /// slice the caller must peek again for the remainder. Empty means
    /// nothing is pending.
    pub fn peek_run(&self) -> &[u8] {
        let n = self.pending.min(self.capacity() - self.tail);
        &self.buffer[self.tail..self.tail + n]
    }

    /// Mark `count` bytes as consumed, freeing their window space.
    ///
    /// # Panics
    ///
    /// Panics if `count` exceeds the pending byte count (logic error).
    pub fn consume(&mut self, count: usize) {
        assert!(count <= self.pending, "consumed more than pending");
        self.tail = (self.tail + count) & self.mask;
        self.pending -= count;
    }

    /// Drain up to `out.len()` pending bytes into `out`, returning the
    /// number of bytes copied.
    pub fn read_into(&mut self, out: &mut [u8]) -> usize {
        let mut copied = 0;
        while copied < out.len() && self.pending > 0 {
            let run = self.peek_run();
            let n = run.len().min(out.len() - copied);
            out[copied..copied + n].copy_from_slice(&run[..n]);
            self.consume(n);
            copied += n;
        }
        copied
    }
}
