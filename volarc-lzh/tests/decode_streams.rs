//! Round-trip tests for the LZH decoder.
//!
//! There is no production compressor, so these tests carry a minimal
//! encoder: an MSB-first bit writer driven by `HuffmanTree` (the
//! decoder's own tree type keeps both sides adapted in lockstep) and the
//! inverse of the variable-width offset packing.
//!
//! The encoder pads the final byte with zero bits, which a real decoder
//! may interpret as spurious trailing symbols. The archive layer stops
//! at the known decoded size; these tests do the same by reading exactly
//! the expected length.

use volarc_lzh::{HuffmanTree, LzhDecoder, MAX_RUN, MIN_RUN};

struct BitWriter {
    bytes: Vec<u8>,
    current: u8,
    filled: u8,
}

impl BitWriter {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            current: 0,
            filled: 0,
        }
    }

    fn push_bit(&mut self, bit: bool) {
        self.current = self.current << 1 | bit as u8;
        self.filled += 1;
        if self.filled == 8 {
            self.bytes.push(self.current);
            self.current = 0;
            self.filled = 0;
        }
    }

    fn push_bits(&mut self, value: u16, count: u8) {
        for i in (0..count).rev() {
            self.push_bit(value >> i & 1 == 1);
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.bytes.push(self.current << (8 - self.filled));
        }
        self.bytes
    }
}

#[derive(Clone, Copy)]
enum Token {
    Literal(u8),
    /// `offset` 0 names the most recently written byte.
    Match {
        offset: u16,
        length: usize,
    },
}

/// (range start seed, extra bits, first upper-six value of the range)
const OFFSET_RANGES: [(u16, u8, u16); 6] = [
    (0x00, 1, 0x00),
    (0x20, 2, 0x01),
    (0x50, 3, 0x04),
    (0x90, 4, 0x0C),
    (0xC0, 5, 0x18),
    (0xF0, 6, 0x30),
];

struct StreamEncoder {
    tree: HuffmanTree,
    bits: BitWriter,
}

impl StreamEncoder {
    fn new() -> Self {
        Self {
            tree: HuffmanTree::lzh(),
            bits: BitWriter::new(),
        }
    }

    fn put_symbol(&mut self, symbol: u16) {
        let (path, len) = self.tree.encoded_path(symbol);
        for i in (0..len).rev() {
            self.bits.push_bit(path >> i & 1 == 1);
        }
        self.tree.update_count(symbol);
    }

    fn put_offset(&mut self, offset: u16) {
        assert!(offset < 4096);
        let upper = offset >> 6;
        let low = offset & 0x3F;

        let row = OFFSET_RANGES
            .iter()
            .rev()
            .find(|&&(_, _, base)| upper >= base)
            .copied()
            .unwrap();
        let (start, extra, base) = row;
        let group = 1u16 << (6 - extra);
        let code = start + (upper - base) * group;

        // The seed byte the decoder reads is the top (extra + 2) bits of
        // the code followed by the high bits of the low six; the extra
        // bits then complete the low six.
        self.bits.push_bits(code >> (6 - extra), extra + 2);
        self.bits.push_bits(low, 6);
    }

    fn encode(tokens: &[Token]) -> Vec<u8> {
        let mut encoder = Self::new();
        for &token in tokens {
            match token {
                Token::Literal(byte) => encoder.put_symbol(u16::from(byte)),
                Token::Match { offset, length } => {
                    assert!((MIN_RUN..=MAX_RUN).contains(&length));
                    encoder.put_symbol((length + 253) as u16);
                    encoder.put_offset(offset);
                }
            }
        }
        encoder.bits.finish()
    }
}

/// What the token stream should decode to.
fn expand(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::new();
    for &token in tokens {
        match token {
            Token::Literal(byte) => out.push(byte),
            Token::Match { offset, length } => {
                let start = out.len() - 1 - offset as usize;
                for i in 0..length {
                    let byte = out[start + i];
                    out.push(byte);
                }
            }
        }
    }
    out
}

fn decode_exact(data: &[u8], len: usize) -> Vec<u8> {
    let mut decoder = LzhDecoder::new(data);
    let mut out = vec![0u8; len];
    assert_eq!(decoder.read(&mut out), len, "stream ended early");
    out
}

#[test]
fn test_literal_only_stream() {
    let tokens: Vec<Token> = b"Hello, adaptive Huffman coding!"
        .iter()
        .map(|&b| Token::Literal(b))
        .collect();
    let expected = expand(&tokens);
    let stream = StreamEncoder::encode(&tokens);

    assert_eq!(decode_exact(&stream, expected.len()), expected);
}

#[test]
fn test_overlapping_run_expands() {
    // "A" then a five-byte run at offset 0 decodes to "AAAAAA".
    let tokens = [
        Token::Literal(b'A'),
        Token::Match {
            offset: 0,
            length: 5,
        },
    ];
    let stream = StreamEncoder::encode(&tokens);
    assert_eq!(decode_exact(&stream, 6), b"AAAAAA");
}

#[test]
fn test_periodic_and_extreme_run_lengths() {
    let mut tokens = vec![Token::Literal(b'x'), Token::Literal(b'y')];
    // Period-2 repeat, then the shortest and longest legal runs.
    tokens.push(Token::Match {
        offset: 1,
        length: 8,
    });
    tokens.push(Token::Match {
        offset: 3,
        length: MIN_RUN,
    });
    tokens.push(Token::Match {
        offset: 0,
        length: MAX_RUN,
    });
    let expected = expand(&tokens);
    let stream = StreamEncoder::encode(&tokens);

    assert_eq!(decode_exact(&stream, expected.len()), expected);
}

#[test]
fn test_every_literal_value() {
    let tokens: Vec<Token> = (0u16..256).map(|b| Token::Literal(b as u8)).collect();
    let expected = expand(&tokens);
    let stream = StreamEncoder::encode(&tokens);

    assert_eq!(decode_exact(&stream, expected.len()), expected);
}

#[test]
fn test_repeated_phrase_adapts_tree() {
    // Heavy symbol repetition forces many tree rebalances on both sides.
    let phrase = b"the quick brown fox jumps over the lazy dog. ";
    let mut tokens = Vec::new();
    for _ in 0..20 {
        tokens.extend(phrase.iter().map(|&b| Token::Literal(b)));
        tokens.push(Token::Match {
            offset: phrase.len() as u16 - 1,
            length: 30,
        });
    }
    let expected = expand(&tokens);
    let stream = StreamEncoder::encode(&tokens);

    assert_eq!(decode_exact(&stream, expected.len()), expected);
}

#[test]
fn test_large_stream_wraps_window() {
    // Pseudo-random mix of literals and matches, well past the 4 KB
    // window so the circular history wraps several times.
    let mut state = 0x2545_F491u32;
    let mut rng = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };

    let mut tokens = Vec::new();
    let mut produced = 0usize;
    while produced < 20_000 {
        if produced > 64 && rng() % 3 == 0 {
            let length = MIN_RUN + (rng() as usize % (MAX_RUN - MIN_RUN + 1));
            let reach = produced.min(4000) - 1;
            let offset = (rng() as usize % reach) as u16;
            tokens.push(Token::Match { offset, length });
            produced += length;
        } else {
            tokens.push(Token::Literal((rng() % 251) as u8));
            produced += 1;
        }
    }
    let expected = expand(&tokens);
    let stream = StreamEncoder::encode(&tokens);

    assert_eq!(decode_exact(&stream, expected.len()), expected);
}

#[test]
fn test_chunked_reads_match_single_read() {
    let phrase = b"chunked reads must see identical bytes";
    let tokens: Vec<Token> = phrase.iter().map(|&b| Token::Literal(b)).collect();
    let stream = StreamEncoder::encode(&tokens);

    let whole = decode_exact(&stream, phrase.len());

    let mut decoder = LzhDecoder::new(&stream);
    let mut chunked = Vec::new();
    let mut buf = [0u8; 7];
    while chunked.len() < phrase.len() {
        let want = buf.len().min(phrase.len() - chunked.len());
        let n = decoder.read(&mut buf[..want]);
        assert!(n > 0, "stream ended early");
        chunked.extend_from_slice(&buf[..n]);
    }
    assert_eq!(chunked, whole);
}

#[test]
fn test_peek_and_consume_drain() {
    let tokens = [
        Token::Literal(b'a'),
        Token::Literal(b'b'),
        Token::Match {
            offset: 1,
            length: 10,
        },
    ];
    let expected = expand(&tokens);
    let stream = StreamEncoder::encode(&tokens);

    let mut decoder = LzhDecoder::new(&stream);
    let mut out = Vec::new();
    while out.len() < expected.len() {
        let run = decoder.peek_run();
        assert!(!run.is_empty(), "stream ended early");
        let n = run.len().min(expected.len() - out.len());
        out.extend_from_slice(&run[..n]);
        decoder.consume(n);
    }
    assert_eq!(out, expected);
}
