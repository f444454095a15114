//! Binary Adaptive Sequential Coding (BASC) for lists of integers.
//!
//! BASC tracks the bit length of the previous value. A value no wider than
//! its predecessor costs one flag bit plus the predecessor's width; a wider
//! value spends one 1-bit per extra width bit, a closing 0, and then its
//! own bits with the leading 1 implied. Lists whose values drift in
//! magnitude (frequency tables, run lengths) stay close to their
//! instantaneous entropy without any up-front model.
//!
//! This is the native format of the Arithmetic codec's frequency table,
//! and it is streamable: [`BascReader`] yields one value per call so a
//! decoder can replay a table in place without materializing it.

use super::{bits_required, lomont::Lomont1};
use crate::bitstream::{BitReader, BitStream};
use crate::error::{PicoPackError, Result};

/// Lomont-1 parameters for the list-length and first-width fields.
const HEADER: Lomont1 = Lomont1::BYTE_COUNT;

/// Append a BASC-coded list to `out`.
///
/// The leading field is `values.len() + 1`, so an empty list is a single
/// Lomont-1 field and a zero field never occurs in a well-formed stream.
pub fn encode(out: &mut BitStream, values: &[u32]) {
    HEADER.encode(out, values.len() as u32 + 1);
    if values.is_empty() {
        return;
    }
    let mut prev_bits = bits_required(values[0]);
    HEADER.encode(out, prev_bits);
    out.write(values[0], prev_bits);

    for &value in &values[1..] {
        let bits = bits_required(value);
        if bits <= prev_bits {
            out.push_bit(false);
            out.write(value, prev_bits);
        } else {
            for _ in 0..bits - prev_bits {
                out.push_bit(true);
            }
            out.push_bit(false);
            // Leading 1 implied.
            out.write(value, bits - 1);
        }
        prev_bits = bits;
    }
}

/// Number of bits [`encode`] would emit for `values`.
pub fn encoded_len(values: &[u32]) -> usize {
    let mut bits = HEADER.encoded_len(values.len() as u32 + 1);
    if values.is_empty() {
        return bits;
    }
    let mut prev_bits = bits_required(values[0]);
    bits += HEADER.encoded_len(prev_bits) + prev_bits as usize;
    for &value in &values[1..] {
        let width = bits_required(value);
        if width <= prev_bits {
            bits += 1 + prev_bits as usize;
        } else {
            bits += (width - prev_bits) as usize + 1 + (width - 1) as usize;
        }
        prev_bits = width;
    }
    bits
}

/// Decode a full BASC list.
pub fn decode(reader: &mut BitReader<'_>) -> Result<Vec<u32>> {
    let mut basc = BascReader::begin(reader)?;
    let mut values = Vec::with_capacity(basc.remaining() as usize);
    while basc.remaining() > 0 {
        values.push(basc.next(reader)?);
    }
    Ok(values)
}

/// Streamed BASC decoder, yielding one value per call.
///
/// The reader's position is owned by the caller between calls, so a table
/// replay can run against a throwaway cursor while the main decode
/// position stays put.
#[derive(Debug)]
pub struct BascReader {
    /// Values left in the list.
    remaining: u32,
    /// Bit width of the previous value.
    prev_bits: u32,
    /// Set until the first value has been read.
    first: bool,
}

impl BascReader {
    /// Read the list-length field and prepare to stream values.
    pub fn begin(reader: &mut BitReader<'_>) -> Result<Self> {
        let field = HEADER.decode(reader)?;
        if field == 0 {
            return Err(PicoPackError::corrupted(
                reader.position(),
                "BASC length field must be at least 1",
            ));
        }
        Ok(Self {
            remaining: field - 1,
            prev_bits: 0,
            first: true,
        })
    }

    /// Values not yet read.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Read the next value.
    pub fn next(&mut self, reader: &mut BitReader<'_>) -> Result<u32> {
        if self.remaining == 0 {
            return Err(PicoPackError::corrupted(
                reader.position(),
                "BASC list exhausted",
            ));
        }
        self.remaining -= 1;

        let value = if self.first {
            self.first = false;
            self.prev_bits = HEADER.decode(reader)?;
            if self.prev_bits > 32 {
                return Err(PicoPackError::corrupted(
                    reader.position(),
                    "BASC width overflows 32 bits",
                ));
            }
            reader.read_bits(self.prev_bits)?
        } else if reader.read_bit()? == 0 {
            reader.read_bits(self.prev_bits)?
        } else {
            let mut delta = 0u32;
            loop {
                delta += 1;
                if reader.read_bit()? == 0 {
                    break;
                }
            }
            let bits = self.prev_bits + delta;
            if bits > 32 {
                return Err(PicoPackError::corrupted(
                    reader.position(),
                    "BASC width overflows 32 bits",
                ));
            }
            reader.read_bits(bits - 1)? | (1 << (bits - 1))
        };
        self.prev_bits = bits_required(value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(values: &[u32]) {
        let mut bs = BitStream::new();
        encode(&mut bs, values);
        assert_eq!(bs.len(), encoded_len(values), "len for {values:?}");
        let bytes = bs.to_bytes();
        let mut reader = BitReader::new(&bytes);
        assert_eq!(decode(&mut reader).unwrap(), values, "for {values:?}");
        assert_eq!(reader.position(), bs.len(), "position for {values:?}");
    }

    #[test]
    fn test_empty_list() {
        roundtrip(&[]);
        let mut bs = BitStream::new();
        encode(&mut bs, &[]);
        // Just the length field: value 1 in one Lomont-1(6,0) chunk.
        assert_eq!(bs.len(), 7);
    }

    #[test]
    fn test_single_values() {
        for v in [0u32, 1, 2, 7, 8, 255, 256, 1 << 20, u32::MAX] {
            roundtrip(&[v]);
        }
    }

    #[test]
    fn test_growing_and_shrinking_widths() {
        roundtrip(&[5, 1, 9]);
        roundtrip(&[1, 2, 4, 8, 16, 32, 64, 128]);
        roundtrip(&[128, 64, 32, 16, 8, 4, 2, 1]);
        roundtrip(&[0, 0, 0, 0]);
        roundtrip(&[u32::MAX, 0, u32::MAX, 1]);
    }

    #[test]
    fn test_frequency_table_shape() {
        // Typical arithmetic table: mostly small counts with spikes.
        let table: Vec<u32> = (0..256).map(|i| if i % 7 == 0 { 200 } else { i % 4 }).collect();
        roundtrip(&table);
    }

    #[test]
    fn test_streamed_matches_bulk() {
        let values = [3u32, 3, 100, 1, 0, 65535, 2];
        let mut bs = BitStream::new();
        encode(&mut bs, &values);
        let bytes = bs.to_bytes();

        let mut reader = BitReader::new(&bytes);
        let mut basc = BascReader::begin(&mut reader).unwrap();
        assert_eq!(basc.remaining(), values.len() as u32);
        for &expected in &values {
            assert_eq!(basc.next(&mut reader).unwrap(), expected);
        }
        assert_eq!(basc.remaining(), 0);
        assert!(basc.next(&mut reader).is_err());
    }

    #[test]
    fn test_zero_length_field_rejected() {
        let mut bs = BitStream::new();
        Lomont1::BYTE_COUNT.encode(&mut bs, 0);
        let bytes = bs.to_bytes();
        let mut reader = BitReader::new(&bytes);
        assert!(BascReader::begin(&mut reader).is_err());
    }
}
