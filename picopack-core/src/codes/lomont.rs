//! Lomont method-1 universal code.
//!
//! The integer is split into chunks, low bits first. Each chunk is preceded
//! by a continuation bit: 1 means another chunk follows, 0 means this chunk
//! is the last. The chunk width starts at `chunk_size` and grows (or
//! shrinks, clamped to 1) by `delta` after every chunk, which lets a single
//! family cover both small dense fields and rare huge ones.
//!
//! All PicoPack header fields use this code; the parameter pairs in use are
//! exposed as named constants.

use crate::bitstream::{BitReader, BitStream};
use crate::error::{PicoPackError, Result};

/// Parameters for the Lomont-1 chunked code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lomont1 {
    /// Initial chunk width in bits (≥ 1).
    pub chunk_size: i32,
    /// Signed change applied to the chunk width after each chunk.
    pub delta: i32,
}

impl Lomont1 {
    /// Byte counts and totals: `(6, 0)`.
    pub const BYTE_COUNT: Self = Self::new(6, 0);
    /// Bits-per-symbol fields: `(3, 0)`.
    pub const SYMBOL_BITS: Self = Self::new(3, 0);
    /// Minimum codeword/match lengths: `(2, 0)`.
    pub const MIN_LENGTH: Self = Self::new(2, 0);
    /// Huffman codeword-length spans: `(4, -1)`.
    pub const LENGTH_SPAN: Self = Self::new(4, -1);
    /// Bits-per-token fields: `(5, 0)`.
    pub const TOKEN_BITS: Self = Self::new(5, 0);
    /// LZCL maximum distances: `(10, 0)`.
    pub const LZCL_DISTANCE: Self = Self::new(10, 0);
    /// LZ77 maximum distances: `(14, -7)`.
    pub const LZ_DISTANCE: Self = Self::new(14, -7);
    /// LZ77 maximum tokens: `(25, -10)`.
    pub const LZ_TOKEN: Self = Self::new(25, -10);
    /// Arithmetic compressed-region bit lengths: `(8, -1)`.
    pub const BIT_LENGTH: Self = Self::new(8, -1);

    /// Create a parameter pair. `chunk_size` must be at least 1.
    pub const fn new(chunk_size: i32, delta: i32) -> Self {
        Self { chunk_size, delta }
    }

    /// Append `value` to `out`.
    pub fn encode(&self, out: &mut BitStream, value: u32) {
        debug_assert!(self.chunk_size >= 1, "chunk size must be at least 1");
        let mut remaining = value;
        let mut chunk_size = self.chunk_size;
        loop {
            let width = chunk_size as u32;
            let chunk = if width >= 32 {
                let c = remaining;
                remaining = 0;
                c
            } else {
                let c = remaining & ((1 << width) - 1);
                remaining >>= width;
                c
            };
            out.push_bit(remaining != 0);
            out.write(chunk, width);
            if remaining == 0 {
                return;
            }
            chunk_size = (chunk_size + self.delta).max(1);
        }
    }

    /// Decode one value from `reader`.
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u32> {
        let mut value = 0u64;
        let mut shift = 0u32;
        let mut chunk_size = self.chunk_size;
        loop {
            let more = reader.read_bit()?;
            let chunk = reader.read_bits(chunk_size as u32)? as u64;
            if shift >= 64 {
                if chunk != 0 {
                    return Err(PicoPackError::corrupted(
                        reader.position(),
                        "universal code overflows 32 bits",
                    ));
                }
            } else {
                value |= chunk << shift;
            }
            shift += chunk_size as u32;
            chunk_size = (chunk_size + self.delta).max(1);
            if more == 0 {
                break;
            }
        }
        u32::try_from(value).map_err(|_| {
            PicoPackError::corrupted(reader.position(), "universal code overflows 32 bits")
        })
    }

    /// Number of bits `encode` would emit for `value`.
    pub fn encoded_len(&self, value: u32) -> usize {
        let mut remaining = value;
        let mut chunk_size = self.chunk_size;
        let mut bits = 0usize;
        loop {
            let width = chunk_size as u32;
            remaining = if width >= 32 { 0 } else { remaining >> width };
            bits += 1 + width as usize;
            if remaining == 0 {
                return bits;
            }
            chunk_size = (chunk_size + self.delta).max(1);
        }
    }

}
