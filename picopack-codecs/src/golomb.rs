//! Golomb symbol stream codec (LZCL sub-codec).
//!
//! A Golomb stream is just the parameter `m` followed by one Golomb
//! codeword per symbol; there is no table, which makes it the cheapest
//! header of the four sub-codecs and a frequent winner on short, skewed
//! sub-streams like decision runs.
//!
//! The stream bit length is unimodal in `m`, which the parameter search
//! exploits: walk down power-of-two candidates while the cost improves,
//! binary-search the surrounding range, then probe the neighbors.

use picopack_core::bitstream::{BitReader, BitStream};
use picopack_core::codes::{Golomb, Lomont1};
use picopack_core::error::{PicoPackError, Result};

/// Lomont-1 parameters for the `m` header field.
const PARAMETER: Lomont1 = Lomont1::BYTE_COUNT;

/// Append the Golomb header (`m`) and one codeword per value.
pub fn encode_stream(out: &mut BitStream, values: &[u32], m: u32) {
    debug_assert!(m >= 1, "golomb parameter must be at least 1");
    PARAMETER.encode(out, m);
    let code = Golomb::new(m);
    for &value in values {
        code.encode(out, value);
    }
}

/// Exact bit length [`encode_stream`] would produce.
pub fn stream_len(values: &[u32], m: u32) -> usize {
    let code = Golomb::new(m);
    PARAMETER.encoded_len(m) + values.iter().map(|&v| code.encoded_len(v)).sum::<usize>()
}

/// Find the parameter minimizing the stream length for `values`.
pub fn optimal_parameter(values: &[u32]) -> u32 {
    let max = values.iter().copied().max().unwrap_or(0);
    let mut m = max
        .max(1)
        .checked_next_power_of_two()
        .unwrap_or(1 << 31);

    // Halve while the cost keeps improving.
    let mut best = stream_len(values, m);
    while m > 1 {
        let cost = stream_len(values, m / 2);
        if cost <= best {
            best = cost;
            m /= 2;
        } else {
            break;
        }
    }

    // The minimum now sits between the neighbors of m; binary search the
    // unimodal range, then probe one step either side.
    let mut lo = (m / 2).max(1);
    let mut hi = m.saturating_mul(2);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if stream_len(values, mid) <= stream_len(values, mid + 1) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    let mut candidate = lo;
    for probe in [candidate.saturating_sub(1).max(1), candidate + 1] {
        if stream_len(values, probe) < stream_len(values, candidate) {
            candidate = probe;
        }
    }
    candidate
}

/// Incremental Golomb stream decoder. The symbol count is bounded by the
/// outer framing, so the decoder itself is open-ended.
#[derive(Debug)]
pub struct GolombDecoder<'a> {
    reader: BitReader<'a>,
    code: Golomb,
}

impl<'a> GolombDecoder<'a> {
    /// Parse the `m` header field at the reader's position.
    pub fn from_reader(mut reader: BitReader<'a>) -> Result<Self> {
        let m = PARAMETER.decode(&mut reader)?;
        if m == 0 {
            return Err(PicoPackError::invalid_header(
                "golomb parameter must be at least 1",
            ));
        }
        Ok(Self {
            reader,
            code: Golomb::new(m),
        })
    }

    /// Decode the next symbol.
    pub fn next_symbol(&mut self) -> Result<Option<u32>> {
        Ok(Some(self.code.decode(&mut self.reader)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(values: &[u32], m: u32) {
        let mut bs = BitStream::new();
        encode_stream(&mut bs, values, m);
        assert_eq!(bs.len(), stream_len(values, m));

        let bytes = bs.to_bytes();
        let mut decoder = GolombDecoder::from_reader(BitReader::new(&bytes)).unwrap();
        for &v in values {
            assert_eq!(decoder.next_symbol().unwrap(), Some(v), "m={m}");
        }
    }

    #[test]
    fn test_roundtrip_various_parameters() {
        let values = [0u32, 1, 5, 13, 2, 2, 40, 0, 7];
        for m in [1, 2, 3, 4, 7, 8, 16, 64] {
            roundtrip(&values, m);
        }
    }

    #[test]
    fn test_optimal_parameter_is_no_worse_than_neighbors() {
        let runs = [1u32, 1, 2, 1, 3, 1, 1, 2, 9, 1, 1, 1, 2, 4];
        let m = optimal_parameter(&runs);
        let best = stream_len(&runs, m);
        assert!(best <= stream_len(&runs, m + 1));
        if m > 1 {
            assert!(best <= stream_len(&runs, m - 1));
        }
        roundtrip(&runs, m);
    }

    #[test]
    fn test_optimal_parameter_brute_force_small() {
        let values = [3u32, 0, 1, 6, 2, 2, 1, 0, 0, 5, 30];
        let m = optimal_parameter(&values);
        let found = stream_len(&values, m);
        let brute = (1..=64).map(|p| stream_len(&values, p)).min().unwrap();
        assert_eq!(found, brute);
    }

    #[test]
    fn test_all_zero_values() {
        let values = [0u32; 16];
        let m = optimal_parameter(&values);
        assert!(m >= 1);
        roundtrip(&values, m);
    }

    #[test]
    fn test_zero_parameter_rejected() {
        let mut bs = BitStream::new();
        PARAMETER.encode(&mut bs, 0);
        let bytes = bs.to_bytes();
        assert!(GolombDecoder::from_reader(BitReader::new(&bytes)).is_err());
    }
}
