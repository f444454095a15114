//! Sub-codec frames: the 2-bit dispatch shared by LZCL.
//!
//! Each LZCL sub-stream travels in a small self-describing frame: a 2-bit
//! codec tag, the payload bit length (Lomont-1(6,0)), then the chosen
//! codec's own header and body. The length field lets the decoder step
//! over a frame without parsing its interior, so frames can be laid out
//! back to back and each sub-decoder keeps a private cursor into the
//! shared buffer.

use crate::arith::{self, ArithmeticDecoder};
use crate::fixed::{self, FixedDecoder};
use crate::golomb::{self, GolombDecoder};
use crate::huffman::{self, HuffmanDecoder};
use picopack_core::bitstream::{BitReader, BitStream};
use picopack_core::codes::Lomont1;
use picopack_core::error::{PicoPackError, Result};

/// Frame tag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubCodecTag {
    /// Fixed-width symbols.
    Fixed = 0,
    /// Arithmetic coding.
    Arithmetic = 1,
    /// Canonical Huffman.
    Huffman = 2,
    /// Golomb codes.
    Golomb = 3,
}

impl SubCodecTag {
    /// Parse a 2-bit tag value.
    pub fn from_bits(tag: u32) -> Result<Self> {
        match tag {
            0 => Ok(Self::Fixed),
            1 => Ok(Self::Arithmetic),
            2 => Ok(Self::Huffman),
            3 => Ok(Self::Golomb),
            other => Err(PicoPackError::InvalidCodecTag { tag: other }),
        }
    }
}

/// Which sub-codecs the encoder may choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubCodecSet {
    /// Allow fixed-width frames.
    pub fixed: bool,
    /// Allow arithmetic frames.
    pub arithmetic: bool,
    /// Allow Huffman frames.
    pub huffman: bool,
    /// Allow Golomb frames.
    pub golomb: bool,
}

impl SubCodecSet {
    /// Every sub-codec enabled.
    pub const ALL: Self = Self {
        fixed: true,
        arithmetic: true,
        huffman: true,
        golomb: true,
    };
}

impl Default for SubCodecSet {
    fn default() -> Self {
        Self::ALL
    }
}

/// Encode `values` with every enabled candidate, append the shortest as a
/// frame, and report which codec won. Fixed is the fallback when nothing
/// else is enabled; ties keep the earliest tag.
pub fn write_best_frame(
    out: &mut BitStream,
    values: &[u32],
    set: &SubCodecSet,
) -> Result<SubCodecTag> {
    let mut fallback = BitStream::new();
    fixed::encode_stream(&mut fallback, values, false);
    let mut best = (SubCodecTag::Fixed, fallback);
    let mut have_candidate = set.fixed;

    let mut consider = |tag: SubCodecTag, payload: BitStream, best: &mut (SubCodecTag, BitStream), have: &mut bool| {
        if !*have || payload.len() < best.1.len() {
            *best = (tag, payload);
            *have = true;
        }
    };

    if set.arithmetic {
        let mut payload = BitStream::new();
        arith::encode_stream(&mut payload, values)?;
        consider(SubCodecTag::Arithmetic, payload, &mut best, &mut have_candidate);
    }
    if set.huffman {
        let mut payload = BitStream::new();
        huffman::encode_stream(&mut payload, values, false)?;
        consider(SubCodecTag::Huffman, payload, &mut best, &mut have_candidate);
    }
    if set.golomb {
        let mut payload = BitStream::new();
        let m = golomb::optimal_parameter(values);
        golomb::encode_stream(&mut payload, values, m);
        consider(SubCodecTag::Golomb, payload, &mut best, &mut have_candidate);
    }

    let (tag, payload) = best;
    out.write(tag as u32, 2);
    Lomont1::BYTE_COUNT.encode(out, payload.len() as u32);
    out.append(&payload);
    Ok(tag)
}

/// A parsed sub-codec frame, ready to produce symbols.
#[derive(Debug)]
pub enum SubDecoder<'a> {
    /// Fixed-width frame.
    Fixed(FixedDecoder<'a>),
    /// Arithmetic frame.
    Arithmetic(ArithmeticDecoder<'a>),
    /// Huffman frame (open-ended; the outer loop bounds it).
    Huffman(HuffmanDecoder<'a>),
    /// Golomb frame.
    Golomb(GolombDecoder<'a>),
}

impl<'a> SubDecoder<'a> {
    /// Parse one frame at the outer reader's position and step the outer
    /// reader past it. The returned decoder keeps its own cursor.
    pub fn read_frame(outer: &mut BitReader<'a>) -> Result<Self> {
        let tag = SubCodecTag::from_bits(outer.read_bits(2)?)?;
        let payload_bits = Lomont1::BYTE_COUNT.decode(outer)? as usize;
        let inner = *outer;
        let decoder = match tag {
            SubCodecTag::Fixed => Self::Fixed(FixedDecoder::from_reader(inner)?),
            SubCodecTag::Arithmetic => Self::Arithmetic(ArithmeticDecoder::from_reader(inner)?),
            SubCodecTag::Huffman => Self::Huffman(HuffmanDecoder::from_reader(inner)?),
            SubCodecTag::Golomb => Self::Golomb(GolombDecoder::from_reader(inner)?),
        };
        outer.skip(payload_bits);
        Ok(decoder)
    }

    /// Decode one symbol from the frame.
    pub fn next_symbol(&mut self) -> Result<Option<u32>> {
        match self {
            Self::Fixed(decoder) => decoder.next_symbol(),
            Self::Arithmetic(decoder) => decoder.next_symbol(),
            Self::Huffman(decoder) => decoder.next_symbol(),
            Self::Golomb(decoder) => decoder.next_symbol(),
        }
    }
}
