//! Fixed-width symbol codec.
//!
//! The simplest stream format: a header-declared bit width, then every
//! symbol in exactly that many bits. On its own it only "compresses"
//! alphabets narrower than a byte, but as an LZCL sub-codec it is the
//! fallback that keeps incompressible sub-streams from expanding.

use crate::MAX_BYTE_LENGTH;
use picopack_core::bitstream::{BitReader, BitStream};
use picopack_core::codes::{Lomont1, bits_required};
use picopack_core::error::{PicoPackError, Result};

/// Append the fixed-width header and body for `values`.
///
/// Layout: optional list length (Lomont-1(6,0)), `bits_per_symbol - 1`
/// (Lomont-1(3,0)), then each value in `bits_per_symbol` bits.
pub fn encode_stream(out: &mut BitStream, values: &[u32], with_length: bool) {
    if with_length {
        Lomont1::BYTE_COUNT.encode(out, values.len() as u32);
    }
    let bits_per_symbol = values.iter().copied().map(bits_required).max().unwrap_or(1);
    Lomont1::SYMBOL_BITS.encode(out, bits_per_symbol - 1);
    for &value in values {
        out.write(value, bits_per_symbol);
    }
}

/// Incremental fixed-width decoder.
#[derive(Debug)]
pub struct FixedDecoder<'a> {
    reader: BitReader<'a>,
    bits_per_symbol: u32,
    /// Symbols left, or `None` when the outer framing bounds the stream.
    remaining: Option<u32>,
}

impl<'a> FixedDecoder<'a> {
    /// Parse a standalone stream (with its leading length field).
    pub fn new(source: &'a [u8]) -> Result<Self> {
        let mut reader = BitReader::new(source);
        let length = Lomont1::BYTE_COUNT.decode(&mut reader)?;
        let mut decoder = Self::from_reader(reader)?;
        decoder.remaining = Some(length);
        Ok(decoder)
    }

    /// Parse a headerless-length stream at the reader's position
    /// (LZCL sub-codec form). The caller bounds the symbol count.
    pub fn from_reader(mut reader: BitReader<'a>) -> Result<Self> {
        let bits_per_symbol = Lomont1::SYMBOL_BITS.decode(&mut reader)? + 1;
        if bits_per_symbol > 32 {
            return Err(PicoPackError::invalid_header(format!(
                "fixed symbol width {bits_per_symbol} exceeds 32 bits"
            )));
        }
        Ok(Self {
            reader,
            bits_per_symbol,
            remaining: None,
        })
    }

    /// Number of symbols declared, when known.
    pub fn len(&self) -> Option<u32> {
        self.remaining
    }

    /// Whether a declared stream has no symbols left.
    pub fn is_empty(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Decode the next symbol; `Ok(None)` at the declared end.
    pub fn next_symbol(&mut self) -> Result<Option<u32>> {
        match self.remaining {
            Some(0) => return Ok(None),
            Some(ref mut n) => *n -= 1,
            None => {}
        }
        Ok(Some(self.reader.read_bits(self.bits_per_symbol)?))
    }
}

/// Compress `input` with the fixed-width codec.
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    if input.len() > MAX_BYTE_LENGTH {
        return Err(PicoPackError::input_too_large(input.len(), MAX_BYTE_LENGTH));
    }
    let values: Vec<u32> = input.iter().map(|&b| b as u32).collect();
    let mut out = BitStream::new();
    encode_stream(&mut out, &values, true);
    Ok(out.to_bytes())
}

/// Decompress a fixed-width stream, failing if the declared byte count
/// exceeds `capacity`.
pub fn decompress(source: &[u8], capacity: usize) -> Result<Vec<u8>> {
    let mut decoder = FixedDecoder::new(source)?;
    let length = decoder.len().unwrap_or(0) as usize;
    if length > capacity {
        return Err(PicoPackError::buffer_too_small(length, capacity));
    }
    let mut output = Vec::with_capacity(length);
    while let Some(symbol) = decoder.next_symbol()? {
        output.push(symbol as u8);
    }
    Ok(output)
}
