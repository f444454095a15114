//! LZ77 codec: greedy back-reference matching over a bounded window.
//!
//! The encoder walks the input once, at each position scanning candidate
//! distances from the far end of the window down to the previous byte and
//! keeping the longest match (ties go to the nearest candidate). Matches
//! shorter than the configured minimum become literals. The bit stream
//! interleaves one decision bit per emitted item with either a literal or
//! a packed `(length, distance)` token, and the header records the actual
//! extremes seen so token widths are as tight as the data allows.
//!
//! The decoder writes into a cyclic window no larger than the furthest
//! back-reference plus one, which is what lets a small device decompress
//! streams much larger than its RAM.

use crate::MAX_BYTE_LENGTH;
use picopack_core::bitstream::{BitReader, BitStream};
use picopack_core::codes::{Lomont1, bits_required};
use picopack_core::error::{PicoPackError, Result};
use picopack_core::window::CyclicWindow;

/// Matcher parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lz77Options {
    /// Shortest match worth a token; shorter runs become literals.
    pub min_length: usize,
    /// Longest match the encoder will extend to.
    pub max_length: usize,
    /// Furthest back-reference the encoder will consider.
    pub max_distance: usize,
}

impl Lz77Options {
    /// Default parameters: a 1 KiB window with 2..256 byte matches.
    pub const DEFAULT: Self = Self {
        min_length: 2,
        max_length: 256,
        max_distance: 1023,
    };
}

impl Default for Lz77Options {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One matcher decision: a literal byte or a back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lz77Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference; `distance` 0 is the previous byte.
    Match {
        /// Number of bytes to copy.
        length: usize,
        /// How far back the source starts, counting from 0.
        distance: usize,
    },
}

/// Greedy matcher output over the whole input.
pub fn tokenize(input: &[u8], options: &Lz77Options) -> Vec<Lz77Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < input.len() {
        let mut best_length = 0usize;
        let mut best_distance = 0usize;

        // Scan from the furthest candidate toward distance 0; `>=` on the
        // comparison makes ties prefer the most recent occurrence.
        let max_distance = options.max_distance.min(pos.saturating_sub(1));
        if pos > 0 {
            let mut distance = max_distance as isize;
            while distance >= 0 {
                let source = pos - 1 - distance as usize;
                let limit = (input.len() - pos).min(options.max_length);
                let mut length = 0usize;
                while length < limit && input[source + length] == input[pos + length] {
                    length += 1;
                }
                if length >= best_length {
                    best_length = length;
                    best_distance = distance as usize;
                }
                distance -= 1;
            }
        }

        if best_length >= options.min_length {
            tokens.push(Lz77Token::Match {
                length: best_length,
                distance: best_distance,
            });
            pos += best_length;
        } else {
            tokens.push(Lz77Token::Literal(input[pos]));
            pos += 1;
        }
    }
    tokens
}

/// Split matcher output into the parallel decision/literal/match lists the
/// LZ formats are built from, with the observed extremes.
#[derive(Debug, Default)]
pub(crate) struct MatchStreams {
    pub decisions: Vec<u32>,
    pub literals: Vec<u32>,
    pub distances: Vec<u32>,
    pub lengths: Vec<u32>,
    pub min_length: u32,
    pub max_distance: u32,
}

pub(crate) fn split_streams(tokens: &[Lz77Token]) -> MatchStreams {
    let mut streams = MatchStreams::default();
    for token in tokens {
        match *token {
            Lz77Token::Literal(byte) => {
                streams.decisions.push(0);
                streams.literals.push(byte as u32);
            }
            Lz77Token::Match { length, distance } => {
                streams.decisions.push(1);
                streams.distances.push(distance as u32);
                streams.lengths.push(length as u32);
            }
        }
    }
    streams.min_length = streams.lengths.iter().copied().min().unwrap_or(0);
    streams.max_distance = streams.distances.iter().copied().max().unwrap_or(0);
    // Store lengths relative to the observed minimum.
    for length in &mut streams.lengths {
        *length -= streams.min_length;
    }
    streams
}

/// Compress `input` with the default parameters.
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    compress_with(input, &Lz77Options::DEFAULT)
}

/// Compress `input` with explicit matcher parameters.
pub fn compress_with(input: &[u8], options: &Lz77Options) -> Result<Vec<u8>> {
    if input.len() > MAX_BYTE_LENGTH {
        return Err(PicoPackError::input_too_large(input.len(), MAX_BYTE_LENGTH));
    }
    let tokens = tokenize(input, options);
    let streams = split_streams(&tokens);

    let max_distance = streams.max_distance;
    let min_length = streams.min_length;
    let max_token = streams
        .lengths
        .iter()
        .zip(&streams.distances)
        .map(|(&length, &distance)| length as u64 * (max_distance as u64 + 1) + distance as u64)
        .max()
        .unwrap_or(0);
    let max_token = u32::try_from(max_token)
        .map_err(|_| PicoPackError::input_too_large(max_token as usize, u32::MAX as usize))?;

    let bits_per_symbol = bits_required(streams.literals.iter().copied().max().unwrap_or(0));
    let bits_per_token = bits_required(max_token);

    let mut out = BitStream::new();
    Lomont1::BYTE_COUNT.encode(&mut out, input.len() as u32);
    Lomont1::SYMBOL_BITS.encode(&mut out, bits_per_symbol - 1);
    Lomont1::TOKEN_BITS.encode(&mut out, bits_per_token - 1);
    Lomont1::MIN_LENGTH.encode(&mut out, min_length);
    Lomont1::LZ_TOKEN.encode(&mut out, max_token);
    Lomont1::LZ_DISTANCE.encode(&mut out, max_distance);

    for token in &tokens {
        match *token {
            Lz77Token::Literal(byte) => {
                out.push_bit(false);
                out.write(byte as u32, bits_per_symbol);
            }
            Lz77Token::Match { length, distance } => {
                out.push_bit(true);
                let packed = (length as u32 - min_length) * (max_distance + 1) + distance as u32;
                out.write(packed, bits_per_token);
            }
        }
    }
    Ok(out.to_bytes())
}

/// Incremental block decoder writing into a caller-supplied cyclic window.
#[derive(Debug)]
pub struct Lz77Decoder<'a> {
    reader: BitReader<'a>,
    window: CyclicWindow<'a>,
    byte_length: u32,
    bits_per_symbol: u32,
    bits_per_token: u32,
    min_length: u32,
    max_distance: u32,
}

impl<'a> Lz77Decoder<'a> {
    /// Parse the header and bind the output window.
    ///
    /// For non-empty streams the window must hold the furthest
    /// back-reference and the longest run:
    /// `window.len() >= max(max_distance, max_length) + 1`.
    pub fn new(source: &'a [u8], window: &'a mut [u8]) -> Result<Self> {
        let mut reader = BitReader::new(source);
        let byte_length = Lomont1::BYTE_COUNT.decode(&mut reader)?;
        let bits_per_symbol = Lomont1::SYMBOL_BITS.decode(&mut reader)? + 1;
        let bits_per_token = Lomont1::TOKEN_BITS.decode(&mut reader)? + 1;
        let min_length = Lomont1::MIN_LENGTH.decode(&mut reader)?;
        let max_token = Lomont1::LZ_TOKEN.decode(&mut reader)?;
        let max_distance = Lomont1::LZ_DISTANCE.decode(&mut reader)?;

        if bits_per_symbol > 32 || bits_per_token > 32 {
            return Err(PicoPackError::invalid_header(format!(
                "lz77 field widths {bits_per_symbol}/{bits_per_token} exceed 32 bits"
            )));
        }
        if max_distance == u32::MAX {
            return Err(PicoPackError::invalid_header(
                "lz77 maximum distance out of range",
            ));
        }
        if byte_length > 0 {
            let max_length = max_token / (max_distance + 1) + min_length;
            let needed = max_distance.max(max_length) as usize + 1;
            if window.len() < needed {
                return Err(PicoPackError::buffer_too_small(needed, window.len()));
            }
        }

        Ok(Self {
            reader,
            window: CyclicWindow::new(window),
            byte_length,
            bits_per_symbol,
            bits_per_token,
            min_length,
            max_distance,
        })
    }

    /// Declared decompressed byte count.
    pub fn byte_length(&self) -> u32 {
        self.byte_length
    }

    /// Bytes produced so far.
    pub fn byte_index(&self) -> usize {
        self.window.index()
    }

    /// The cyclic window, for the caller to drain produced bytes from.
    pub fn window(&self) -> &[u8] {
        self.window.as_slice()
    }

    /// Decode one block (a literal or a whole run) into the window and
    /// return its byte count; `Ok(None)` at the declared end.
    pub fn next_block(&mut self) -> Result<Option<u32>> {
        if self.window.index() >= self.byte_length as usize {
            return Ok(None);
        }
        if self.reader.read_bit()? == 0 {
            let literal = self.reader.read_bits(self.bits_per_symbol)?;
            self.window.push(literal as u8);
            Ok(Some(1))
        } else {
            let token = self.reader.read_bits(self.bits_per_token)?;
            let length = token / (self.max_distance + 1) + self.min_length;
            let distance = token % (self.max_distance + 1);
            self.window.copy_back(distance as usize, length as usize)?;
            Ok(Some(length))
        }
    }
}

/// Decompress an LZ77 stream, failing if the declared byte count exceeds
/// `capacity`. The cyclic window is allocated internally at full output
/// size, which always satisfies the window bound.
pub fn decompress(source: &[u8], capacity: usize) -> Result<Vec<u8>> {
    let length = crate::decoded_len(source)? as usize;
    if length > capacity {
        return Err(PicoPackError::buffer_too_small(length, capacity));
    }
    let mut output = vec![0u8; length];
    {
        let mut decoder = Lz77Decoder::new(source, &mut output)?;
        while decoder.next_block()?.is_some() {}
        if decoder.byte_index() != length {
            return Err(PicoPackError::corrupted(
                decoder.reader.position(),
                "short lz77 decode",
            ));
        }
    }
    Ok(output)
}
