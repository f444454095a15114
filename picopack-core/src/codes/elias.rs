//! Elias-family universal codes: Gamma, Delta, Omega, Even-Rodeh, Stout-k.
//!
//! These are the classical recursive prefix codes. The PicoPack decoders
//! only ever need Lomont-1, but the encoder side keeps the whole family so
//! header layouts can be compared against alternatives.
//!
//! Gamma/Delta/Omega encode positive integers; Even-Rodeh and Stout-k also
//! cover zero.

use super::bits_required;
use crate::bitstream::{BitReader, BitStream};
use crate::error::{PicoPackError, Result};

/// Encode `value` (≥ 1) with the Elias Gamma code: `n` zeros followed by
/// the `n + 1`-bit value, where `n = floor(log2 value)`.
pub fn encode_gamma(out: &mut BitStream, value: u32) {
    assert!(value >= 1, "gamma code domain is positive integers");
    let n = bits_required(value) - 1;
    out.write(0, n);
    out.write(value, n + 1);
}

/// Decode one Elias Gamma value.
pub fn decode_gamma(reader: &mut BitReader<'_>) -> Result<u32> {
    let mut n = 0u32;
    while reader.read_bit()? == 0 {
        n += 1;
        if n > 31 {
            return Err(PicoPackError::corrupted(
                reader.position(),
                "gamma prefix overflows 32 bits",
            ));
        }
    }
    let mut value = 1u32;
    for _ in 0..n {
        value = (value << 1) | reader.read_bit()?;
    }
    Ok(value)
}

/// Encode `value` (≥ 1) with the Elias Delta code: the bit count goes out
/// Gamma-coded, then the value without its leading 1.
pub fn encode_delta(out: &mut BitStream, value: u32) {
    assert!(value >= 1, "delta code domain is positive integers");
    let n = bits_required(value) - 1;
    encode_gamma(out, n + 1);
    out.write(value, n);
}

/// Decode one Elias Delta value.
pub fn decode_delta(reader: &mut BitReader<'_>) -> Result<u32> {
    let n = decode_gamma(reader)? - 1;
    if n > 31 {
        return Err(PicoPackError::corrupted(
            reader.position(),
            "delta length overflows 32 bits",
        ));
    }
    Ok((1 << n) | reader.read_bits(n)?)
}

/// Encode `value` (≥ 1) with the Elias Omega code: recursively
/// length-prefixed groups, each with a leading 1, terminated by a 0.
pub fn encode_omega(out: &mut BitStream, value: u32) {
    assert!(value >= 1, "omega code domain is positive integers");
    let mut groups = Vec::new();
    let mut k = value;
    while k > 1 {
        groups.push(k);
        k = bits_required(k) - 1;
    }
    for &group in groups.iter().rev() {
        out.write(group, bits_required(group));
    }
    out.push_bit(false);
}

/// Decode one Elias Omega value.
pub fn decode_omega(reader: &mut BitReader<'_>) -> Result<u32> {
    let mut n = 1u32;
    loop {
        if reader.read_bit()? == 0 {
            return Ok(n);
        }
        if n > 31 {
            return Err(PicoPackError::corrupted(
                reader.position(),
                "omega group overflows 32 bits",
            ));
        }
        let mut value = 1u32;
        for _ in 0..n {
            value = (value << 1) | reader.read_bit()?;
        }
        n = value;
    }
}

/// Shared recursive length-prefix scheme behind Even-Rodeh and Stout-k:
/// values below `2^(width-1)` go out directly in `width` bits; larger
/// values emit a chain of bit-length prefixes down to a `width`-bit head,
/// terminated by a 0.
fn encode_prefixed(out: &mut BitStream, value: u32, width: u32) {
    if value < 1 << (width - 1) {
        out.write(value, width);
        return;
    }
    let mut groups = vec![value];
    let mut cur = value;
    while bits_required(cur) > width {
        cur = bits_required(cur);
        groups.push(cur);
    }
    for (i, &group) in groups.iter().rev().enumerate() {
        let bits = if i == 0 { width } else { bits_required(group) };
        out.write(group, bits);
    }
    out.push_bit(false);
}

fn decode_prefixed(reader: &mut BitReader<'_>, width: u32) -> Result<u32> {
    let mut n = reader.read_bits(width)?;
    if n < 1 << (width - 1) {
        return Ok(n);
    }
    loop {
        if reader.read_bit()? == 0 {
            return Ok(n);
        }
        if n > 32 {
            return Err(PicoPackError::corrupted(
                reader.position(),
                "length-prefix group overflows 32 bits",
            ));
        }
        let mut value = 1u32;
        for _ in 0..n - 1 {
            value = (value << 1) | reader.read_bit()?;
        }
        n = value;
    }
}

/// Encode `value` (≥ 0) with the Even-Rodeh code.
pub fn encode_even_rodeh(out: &mut BitStream, value: u32) {
    encode_prefixed(out, value, 3);
}

/// Decode one Even-Rodeh value.
pub fn decode_even_rodeh(reader: &mut BitReader<'_>) -> Result<u32> {
    decode_prefixed(reader, 3)
}

/// The Stout-k code: the Even-Rodeh scheme with a `k`-bit head instead of
/// the fixed 3 bits. `k = 3` reproduces Even-Rodeh exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stout {
    /// Head width in bits (≥ 2).
    pub k: u32,
}

impl Stout {
    /// Create a Stout code with the given head width.
    pub const fn new(k: u32) -> Self {
        Self { k }
    }

    /// Append `value` (≥ 0) to `out`.
    pub fn encode(&self, out: &mut BitStream, value: u32) {
        assert!(self.k >= 2, "stout head width must be at least 2");
        encode_prefixed(out, value, self.k);
    }

    /// Decode one value from `reader`.
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<u32> {
        decode_prefixed(reader, self.k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(
        value: u32,
        encode: impl Fn(&mut BitStream, u32),
        decode: impl Fn(&mut BitReader<'_>) -> Result<u32>,
    ) {
        let mut bs = BitStream::new();
        encode(&mut bs, value);
        let written = bs.len();
        let bytes = bs.to_bytes();
        let mut reader = BitReader::new(&bytes);
        assert_eq!(decode(&mut reader).unwrap(), value, "value {value}");
        assert_eq!(reader.position(), written, "position for {value}");
    }

    #[test]
    fn test_gamma_known_codewords() {
        let mut bs = BitStream::new();
        encode_gamma(&mut bs, 1);
        assert_eq!(bs.len(), 1); // "1"
        bs.clear();
        encode_gamma(&mut bs, 5);
        assert_eq!(bs.len(), 5); // "00101"
        assert_eq!(bs.read(5).unwrap(), 0b00101);
    }

    #[test]
    fn test_gamma_delta_omega_exhaustive() {
        for v in 1..=1024 {
            roundtrip(v, encode_gamma, decode_gamma);
            roundtrip(v, encode_delta, decode_delta);
            roundtrip(v, encode_omega, decode_omega);
        }
    }

    #[test]
    fn test_even_rodeh_exhaustive() {
        for v in 0..=1024 {
            roundtrip(v, encode_even_rodeh, decode_even_rodeh);
        }
    }

    #[test]
    fn test_stout_exhaustive() {
        for k in 2..=6 {
            let code = Stout::new(k);
            for v in 0..=1024 {
                roundtrip(v, |bs, x| code.encode(bs, x), |r| code.decode(r));
            }
        }
    }

    #[test]
    fn test_stout_three_matches_even_rodeh() {
        let code = Stout::new(3);
        for v in [0u32, 3, 4, 7, 8, 100, 65535] {
            let mut a = BitStream::new();
            encode_even_rodeh(&mut a, v);
            let mut b = BitStream::new();
            code.encode(&mut b, v);
            assert_eq!(a.to_bytes(), b.to_bytes());
            assert_eq!(a.len(), b.len());
        }
    }

    #[test]
    fn test_geometric_large_values() {
        let mut v: u64 = 1;
        while v <= 1 << 28 {
            roundtrip(v as u32, encode_gamma, decode_gamma);
            roundtrip(v as u32, encode_delta, decode_delta);
            roundtrip(v as u32, encode_omega, decode_omega);
            roundtrip(v as u32, encode_even_rodeh, decode_even_rodeh);
            v = v * 13 / 8 + 1;
        }
    }
}
