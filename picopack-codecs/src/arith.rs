//! Static arithmetic codec on a 30-bit integer range.
//!
//! The coder narrows `[low, high]` inside `[0, 2^31)` by cumulative symbol
//! frequencies and renormalizes at the quarter boundaries: E1 (upper half
//! empty) emits a 0, E2 (lower half empty) emits a 1, and E3 (straddling
//! the middle half) defers the decision by counting pending opposite bits.
//! The model is static: a frequency table over `[symbol_min, symbol_max]`,
//! BASC-coded so the decoder can replay it in place per symbol instead of
//! expanding it into RAM.
//!
//! End-of-stream uses a counting trick rather than a stop symbol: the
//! header records the covered bit span, and once the decoder has counted
//! past it every further read returns 0. The encoder only needs two tag
//! bits (plus any pending E3 backlog) to terminate.

use crate::MAX_BYTE_LENGTH;
use picopack_core::bitstream::{BitReader, BitStream};
use picopack_core::codes::{BascReader, Lomont1, basc};
use picopack_core::error::{PicoPackError, Result};

/// Quarter boundary of the coding interval.
const Q25: u32 = 0x2000_0000;
/// Half boundary.
const Q50: u32 = 2 * Q25;
/// Three-quarter boundary.
const Q75: u32 = 3 * Q25;
/// Interval size; `high` stays strictly below this.
const Q100: u32 = 0x8000_0000;

/// Largest representable total count; keeps `step` arithmetic exact.
const MAX_TOTAL: usize = (1 << 29) - 1;

/// Append the arithmetic header, frequency table and body for `values`.
///
/// Wire layout: `total` (Lomont-1(6,0)), covered bit span (Lomont-1(8,-1)),
/// `symbol_min` and `symbol_max` (Lomont-1(6,0)), table bit length
/// (Lomont-1(6,0)), BASC-coded counts, then the coded body. The covered
/// span counts the three table header fields, the table, and the body,
/// plus one: the decoder pre-increments its counter before each compare.
pub fn encode_stream(out: &mut BitStream, values: &[u32]) -> Result<()> {
    if values.len() > MAX_TOTAL {
        return Err(PicoPackError::input_too_large(values.len(), MAX_TOTAL));
    }
    let total = values.len() as u32;
    Lomont1::BYTE_COUNT.encode(out, total);

    let (symbol_min, symbol_max) = match (values.iter().min(), values.iter().max()) {
        (Some(&min), Some(&max)) => (min, max),
        _ => (0, 0),
    };
    let mut counts = vec![0u32; (symbol_max - symbol_min + 1) as usize];
    if values.is_empty() {
        counts.clear();
    } else {
        for &value in values {
            counts[(value - symbol_min) as usize] += 1;
        }
    }

    let mut table = BitStream::new();
    Lomont1::BYTE_COUNT.encode(&mut table, symbol_min);
    Lomont1::BYTE_COUNT.encode(&mut table, symbol_max);
    Lomont1::BYTE_COUNT.encode(&mut table, basc::encoded_len(&counts) as u32);
    basc::encode(&mut table, &counts);

    let mut body = BitStream::new();
    if !values.is_empty() {
        let mut sums = Vec::with_capacity(counts.len() + 1);
        let mut running = 0u32;
        sums.push(0);
        for &count in &counts {
            running += count;
            sums.push(running);
        }
        encode_body(&mut body, values, &sums, symbol_min, total);
    }

    Lomont1::BIT_LENGTH.encode(out, (table.len() + body.len() + 1) as u32);
    out.append(&table);
    out.append(&body);
    Ok(())
}

/// Emit a resolved bit followed by the deferred E3 backlog.
fn emit(out: &mut BitStream, bit: bool, scaling: &mut u32) {
    out.push_bit(bit);
    for _ in 0..*scaling {
        out.push_bit(!bit);
    }
    *scaling = 0;
}

fn encode_body(out: &mut BitStream, values: &[u32], sums: &[u32], symbol_min: u32, total: u32) {
    let mut low = 0u32;
    let mut high = Q100 - 1;
    let mut scaling = 0u32;

    for &value in values {
        let index = (value - symbol_min) as usize;
        let low_count = sums[index];
        let high_count = sums[index + 1];

        // The interval is open at the top, hence the +1 and -1.
        let step = (high - low + 1) / total;
        high = low + step * high_count - 1;
        low += step * low_count;

        loop {
            if high < Q50 {
                emit(out, false, &mut scaling);
                low *= 2;
                high = 2 * high + 1;
            } else if low >= Q50 {
                emit(out, true, &mut scaling);
                low = 2 * (low - Q50);
                high = 2 * (high - Q50) + 1;
            } else if low >= Q25 && high < Q75 {
                scaling += 1;
                low = 2 * (low - Q25);
                high = 2 * (high - Q25) + 1;
            } else {
                break;
            }
        }
    }

    // Two tag bits pin the final interval; the decoder's zero-fill covers
    // everything after them.
    if low < Q25 {
        out.push_bit(false);
        for _ in 0..scaling + 1 {
            out.push_bit(true);
        }
    } else {
        out.push_bit(true);
        out.push_bit(false);
    }
}

/// Incremental arithmetic decoder.
///
/// Holds the interval, a 31-bit lookahead buffer, and the bit position of
/// the in-stream frequency table; each symbol lookup replays the table
/// from there with a throwaway cursor.
#[derive(Debug)]
pub struct ArithmeticDecoder<'a> {
    reader: BitReader<'a>,
    low: u32,
    high: u32,
    total: u32,
    symbol_min: u32,
    /// Bit position of the BASC table.
    table_start: usize,
    /// 31-bit lookahead.
    buffer: u32,
    /// Covered bit span from the header.
    bit_length: u64,
    /// Bits consumed against that span.
    bits_read: u64,
    /// Symbols left to decode.
    remaining: u32,
}

impl<'a> ArithmeticDecoder<'a> {
    /// Parse a standalone stream. The leading `total` field doubles as the
    /// decompressed byte count.
    pub fn new(source: &'a [u8]) -> Result<Self> {
        Self::from_reader(BitReader::new(source))
    }

    /// Parse a stream at the reader's position (also the LZCL sub-codec
    /// form; arithmetic always knows its own symbol count).
    pub fn from_reader(mut reader: BitReader<'a>) -> Result<Self> {
        let total = Lomont1::BYTE_COUNT.decode(&mut reader)?;
        if total as usize > MAX_TOTAL {
            return Err(PicoPackError::invalid_header(format!(
                "arithmetic total {total} exceeds 2^29 - 1"
            )));
        }
        let bit_length = Lomont1::BIT_LENGTH.decode(&mut reader)?;

        let region_start = reader.position();
        let symbol_min = Lomont1::BYTE_COUNT.decode(&mut reader)?;
        let _symbol_max = Lomont1::BYTE_COUNT.decode(&mut reader)?;
        let table_bits = Lomont1::BYTE_COUNT.decode(&mut reader)?;
        let table_start = reader.position();
        reader.skip(table_bits as usize);

        let mut decoder = Self {
            bits_read: (reader.position() - region_start) as u64,
            reader,
            low: 0,
            high: Q100 - 1,
            total,
            symbol_min,
            table_start,
            buffer: 0,
            bit_length: bit_length as u64,
            remaining: total,
        };
        for _ in 0..31 {
            decoder.buffer = (decoder.buffer << 1) | decoder.next_bit()?;
        }
        Ok(decoder)
    }

    /// Symbols left to decode.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Read one body bit, or 0 once the covered span is exhausted.
    fn next_bit(&mut self) -> Result<u32> {
        self.bits_read += 1;
        if self.bits_read < self.bit_length {
            self.reader.read_bit()
        } else {
            Ok(0)
        }
    }

    /// Replay the frequency table to find the symbol whose cumulative
    /// interval contains `target`.
    fn lookup(&self, target: u32) -> Result<(u32, u32, u32)> {
        let mut replay = self.reader;
        replay.set_position(self.table_start);
        let mut table = BascReader::begin(&mut replay)?;
        if table.remaining() == 0 {
            return Err(PicoPackError::corrupted(
                self.table_start,
                "empty frequency table with symbols pending",
            ));
        }

        let mut low_count = 0u32;
        let mut high_count = table.next(&mut replay)?;
        let mut symbol = self.symbol_min;
        let mut index = self.symbol_min;
        while high_count <= target {
            if table.remaining() == 0 {
                return Err(PicoPackError::corrupted(
                    replay.position(),
                    "frequency table does not cover coded value",
                ));
            }
            let count = table.next(&mut replay)?;
            low_count = high_count;
            high_count += count;
            index += 1;
            if count != 0 {
                symbol = index;
            }
        }
        Ok((symbol, low_count, high_count))
    }

    /// Decode the next symbol; `Ok(None)` after `total` symbols.
    pub fn next_symbol(&mut self) -> Result<Option<u32>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        let step = (self.high - self.low + 1) / self.total;
        let offset = self.buffer.checked_sub(self.low).ok_or_else(|| {
            PicoPackError::corrupted(self.reader.position(), "buffer left the coding interval")
        })?;
        let (symbol, low_count, high_count) = self.lookup(offset / step)?;

        self.high = self.low + step * high_count - 1;
        self.low += step * low_count;
        if self.buffer < self.low || self.buffer > self.high {
            return Err(PicoPackError::corrupted(
                self.reader.position(),
                "buffer left the coding interval",
            ));
        }

        // E1/E2 scaling.
        while self.high < Q50 || self.low >= Q50 {
            if self.high < Q50 {
                self.low *= 2;
                self.high = 2 * self.high + 1;
                self.buffer = 2 * self.buffer + self.next_bit()?;
            } else {
                self.low = 2 * (self.low - Q50);
                self.high = 2 * (self.high - Q50) + 1;
                self.buffer = 2 * (self.buffer - Q50) + self.next_bit()?;
            }
        }
        // E3 scaling.
        while Q25 <= self.low && self.high < Q75 {
            self.low = 2 * (self.low - Q25);
            self.high = 2 * (self.high - Q25) + 1;
            self.buffer = 2 * (self.buffer - Q25) + self.next_bit()?;
        }

        Ok(Some(symbol))
    }
}

/// Compress `input` with the arithmetic codec.
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    if input.len() > MAX_BYTE_LENGTH {
        return Err(PicoPackError::input_too_large(input.len(), MAX_BYTE_LENGTH));
    }
    let values: Vec<u32> = input.iter().map(|&b| b as u32).collect();
    let mut out = BitStream::new();
    encode_stream(&mut out, &values)?;
    Ok(out.to_bytes())
}

/// Decompress an arithmetic stream, failing if the declared byte count
/// exceeds `capacity`.
pub fn decompress(source: &[u8], capacity: usize) -> Result<Vec<u8>> {
    let mut decoder = ArithmeticDecoder::new(source)?;
    let length = decoder.remaining() as usize;
    if length > capacity {
        return Err(PicoPackError::buffer_too_small(length, capacity));
    }
    let mut output = Vec::with_capacity(length);
    while let Some(symbol) = decoder.next_symbol()? {
        output.push(symbol as u8);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(input: &[u8]) {
        let packed = compress(input).unwrap();
        let output = decompress(&packed, input.len()).unwrap();
        assert_eq!(output, input, "arithmetic roundtrip ({} bytes)", input.len());
    }

    #[test]
    fn test_roundtrip_text() {
        roundtrip(b"arithmetic coding squeezes fractional bits");
        roundtrip(b"aabbbbccccccccdddddddddddddddd");
    }

    #[test]
    fn test_roundtrip_edges() {
        roundtrip(&[]);
        roundtrip(&[0x41]);
        roundtrip(&[0u8; 100]);
        roundtrip(&[0xFF; 100]);
        let all: Vec<u8> = (0..=255).collect();
        roundtrip(&all);
    }

    #[test]
    fn test_roundtrip_two_symbol_skew() {
        // Heavily skewed two-symbol input: well under a bit per symbol.
        let mut input = vec![b'0'; 2000];
        for i in (0..2000).step_by(97) {
            input[i] = b'1';
        }
        let packed = compress(&input).unwrap();
        assert!(packed.len() < 500, "got {}", packed.len());
        roundtrip(&input);
    }

    #[test]
    fn test_total_is_first_field() {
        let packed = compress(b"12345678").unwrap();
        let mut reader = BitReader::new(&packed);
        assert_eq!(Lomont1::BYTE_COUNT.decode(&mut reader).unwrap(), 8);
    }

    #[test]
    fn test_empty_is_header_only() {
        let packed = compress(&[]).unwrap();
        let mut decoder = ArithmeticDecoder::new(&packed).unwrap();
        assert_eq!(decoder.remaining(), 0);
        assert_eq!(decoder.next_symbol().unwrap(), None);
    }

    #[test]
    fn test_capacity_exceeded() {
        let packed = compress(b"overflow me").unwrap();
        assert!(matches!(
            decompress(&packed, 5),
            Err(PicoPackError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_subcodec_values_roundtrip() {
        // Sub-codec use feeds arbitrary u32 symbols, not just bytes.
        let values = [1000u32, 1000, 1003, 1000, 1001, 1001, 1000, 1002];
        let mut bs = BitStream::new();
        encode_stream(&mut bs, &values).unwrap();
        let bytes = bs.to_bytes();

        let mut decoder = ArithmeticDecoder::from_reader(BitReader::new(&bytes)).unwrap();
        for &v in &values {
            assert_eq!(decoder.next_symbol().unwrap(), Some(v));
        }
        assert_eq!(decoder.next_symbol().unwrap(), None);
    }
}
