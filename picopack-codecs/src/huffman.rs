//! Canonical Huffman codec with an in-stream decoding table.
//!
//! The encoder builds an ordinary Huffman tree, then rewrites the
//! codewords into canonical form so the table can be shipped as nothing
//! but per-length symbol lists. The table layout is chosen for the
//! decoder, not the encoder: a decoder holds five small fields and walks
//! the table inside the compressed stream for every symbol, so it needs
//! no decode tree and no table copy.
//!
//! # Table layout
//!
//! After the header fields, one row per codeword length from `min_len` to
//! `max_len`: a count in `bits_per_count` bits, then that many symbols in
//! `bits_per_symbol` bits each, in canonical order. Decoding reads
//! `min_len` bits, then per row either indexes the symbol list (when the
//! accumulator falls inside the row) or shifts in one more bit and skips
//! the row.

use std::collections::BTreeMap;

use crate::MAX_BYTE_LENGTH;
use picopack_core::bitstream::{BitReader, BitStream};
use picopack_core::codes::{Lomont1, bits_required};
use picopack_core::error::{PicoPackError, Result};

/// Longest representable codeword; the decoder accumulates into a `u32`.
const MAX_CODEWORD_LENGTH: u32 = 32;

/// A canonical codeword: value plus bit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Codeword {
    value: u32,
    len: u32,
}

/// Compute codeword lengths for `(symbol, frequency)` pairs by repeatedly
/// coalescing the two lowest-frequency nodes (ties take the first minimum
/// in insertion order; canonicalization erases the choice from the wire).
fn build_code_lengths(freqs: &[(u32, u64)]) -> Vec<(u32, u32)> {
    debug_assert!(!freqs.is_empty());
    if freqs.len() == 1 {
        // A lone symbol still needs one bit on the wire.
        return vec![(freqs[0].0, 1)];
    }

    const LEAF: u32 = u32::MAX;
    #[derive(Clone, Copy)]
    struct Node {
        freq: u64,
        symbol: u32,
        left: u32,
        right: u32,
    }

    let mut nodes: Vec<Node> = freqs
        .iter()
        .map(|&(symbol, freq)| Node {
            freq,
            symbol,
            left: LEAF,
            right: LEAF,
        })
        .collect();
    let mut active: Vec<u32> = (0..nodes.len() as u32).collect();

    fn take_min(active: &mut Vec<u32>, nodes: &[Node]) -> u32 {
        let mut best = 0;
        for i in 1..active.len() {
            if nodes[active[i] as usize].freq < nodes[active[best] as usize].freq {
                best = i;
            }
        }
        active.remove(best)
    }

    while active.len() > 1 {
        let left = take_min(&mut active, &nodes);
        let right = take_min(&mut active, &nodes);
        let parent = Node {
            freq: nodes[left as usize].freq + nodes[right as usize].freq,
            symbol: 0,
            left,
            right,
        };
        nodes.push(parent);
        active.push(nodes.len() as u32 - 1);
    }

    // Collect leaf depths with an explicit stack.
    let mut lengths = Vec::with_capacity(freqs.len());
    let mut stack = vec![(active[0], 0u32)];
    while let Some((index, depth)) = stack.pop() {
        let node = nodes[index as usize];
        if node.left == LEAF {
            lengths.push((node.symbol, depth));
        } else {
            stack.push((node.left, depth + 1));
            stack.push((node.right, depth + 1));
        }
    }
    lengths
}

/// Assign canonical codewords to `(symbol, length)` pairs sorted by
/// (length, symbol): start at zero, incrementing and left-shifting as the
/// lengths grow.
fn assign_canonical(leaves: &[(u32, u32)]) -> Vec<(u32, Codeword)> {
    let mut code = 0u32;
    let mut width = leaves[0].1;
    let mut out = Vec::with_capacity(leaves.len());
    for &(symbol, len) in leaves {
        while width < len {
            code <<= 1;
            width += 1;
        }
        out.push((symbol, Codeword { value: code, len }));
        code += 1;
    }
    out
}

/// Append the Huffman header, table and body for `values`.
pub fn encode_stream(out: &mut BitStream, values: &[u32], with_length: bool) -> Result<()> {
    if with_length {
        Lomont1::BYTE_COUNT.encode(out, values.len() as u32);
    }

    if values.is_empty() {
        // Minimal parseable header: one-bit symbols, an empty table.
        Lomont1::SYMBOL_BITS.encode(out, 0); // bits_per_symbol = 1
        Lomont1::SYMBOL_BITS.encode(out, 0); // bits_per_count = 1
        Lomont1::MIN_LENGTH.encode(out, 0); // min_len = 1
        Lomont1::LENGTH_SPAN.encode(out, 0); // max_len = 2
        out.write(0, 1); // zero codewords of length 1
        out.write(0, 1); // zero codewords of length 2
        return Ok(());
    }

    let mut freqs: BTreeMap<u32, u64> = BTreeMap::new();
    for &value in values {
        *freqs.entry(value).or_insert(0) += 1;
    }
    let freq_list: Vec<(u32, u64)> = freqs.into_iter().collect();

    let mut leaves = build_code_lengths(&freq_list);
    leaves.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

    let min_len = leaves[0].1;
    let max_len = leaves[leaves.len() - 1].1;
    if max_len > MAX_CODEWORD_LENGTH {
        return Err(PicoPackError::invalid_header(format!(
            "huffman codeword length {max_len} exceeds {MAX_CODEWORD_LENGTH} bits"
        )));
    }
    // The span field stores (max_len - min_len) - 1, so the wire cannot say
    // max_len == min_len; pad with an empty row instead.
    let wire_max_len = max_len.max(min_len + 1);

    // Row sizes for the per-length counts.
    let mut row_counts = vec![0u32; (wire_max_len - min_len + 1) as usize];
    for &(_, len) in &leaves {
        row_counts[(len - min_len) as usize] += 1;
    }
    let bits_per_count = bits_required(row_counts.iter().copied().max().unwrap_or(0));
    let bits_per_symbol = bits_required(leaves.iter().map(|&(s, _)| s).max().unwrap_or(0));

    Lomont1::SYMBOL_BITS.encode(out, bits_per_symbol - 1);
    Lomont1::SYMBOL_BITS.encode(out, bits_per_count - 1);
    Lomont1::MIN_LENGTH.encode(out, min_len - 1);
    Lomont1::LENGTH_SPAN.encode(out, (wire_max_len - min_len) - 1);

    // Table rows: count, then that row's symbols in canonical order.
    let mut leaf_index = 0;
    for &count in &row_counts {
        out.write(count, bits_per_count);
        for _ in 0..count {
            out.write(leaves[leaf_index].0, bits_per_symbol);
            leaf_index += 1;
        }
    }

    // Body: canonical codewords, MSB-first.
    let codes: BTreeMap<u32, Codeword> = assign_canonical(&leaves).into_iter().collect();
    for &value in values {
        let codeword = codes[&value];
        out.write(codeword.value, codeword.len);
    }
    Ok(())
}

/// Incremental Huffman decoder.
///
/// State is five header fields plus a reader; the codeword table is read
/// out of the stream on every symbol.
#[derive(Debug)]
pub struct HuffmanDecoder<'a> {
    reader: BitReader<'a>,
    /// Bit position of the first table row.
    table_position: usize,
    bits_per_symbol: u32,
    bits_per_count: u32,
    min_len: u32,
    max_len: u32,
    /// Symbols left, or `None` when the outer framing bounds the stream.
    remaining: Option<u32>,
}

impl<'a> HuffmanDecoder<'a> {
    /// Parse a standalone stream (with its leading length field).
    pub fn new(source: &'a [u8]) -> Result<Self> {
        let mut reader = BitReader::new(source);
        let length = Lomont1::BYTE_COUNT.decode(&mut reader)?;
        let mut decoder = Self::from_reader(reader)?;
        decoder.remaining = Some(length);
        Ok(decoder)
    }

    /// Parse a headerless-length stream at the reader's position
    /// (LZCL sub-codec form); the outer loop bounds the symbol count.
    pub fn from_reader(mut reader: BitReader<'a>) -> Result<Self> {
        let bits_per_symbol = Lomont1::SYMBOL_BITS.decode(&mut reader)? + 1;
        let bits_per_count = Lomont1::SYMBOL_BITS.decode(&mut reader)? + 1;
        let min_len = Lomont1::MIN_LENGTH.decode(&mut reader)? + 1;
        let span = Lomont1::LENGTH_SPAN.decode(&mut reader)? + 1;
        let max_len = min_len + span;

        if bits_per_symbol > 32 || bits_per_count > 32 {
            return Err(PicoPackError::invalid_header(format!(
                "huffman field widths {bits_per_symbol}/{bits_per_count} exceed 32 bits"
            )));
        }
        if max_len > MAX_CODEWORD_LENGTH {
            return Err(PicoPackError::invalid_header(format!(
                "huffman codeword length {max_len} exceeds {MAX_CODEWORD_LENGTH} bits"
            )));
        }

        // Walk the table once to find where the body starts; the rows are
        // revisited in place on every decoded symbol.
        let table_position = reader.position();
        for _ in min_len..=max_len {
            let count = reader.read_bits(bits_per_count)?;
            reader.skip(count as usize * bits_per_symbol as usize);
        }
        if reader.position() > reader.bit_len() {
            return Err(PicoPackError::unexpected_eof(reader.bit_len()));
        }

        Ok(Self {
            reader,
            table_position,
            bits_per_symbol,
            bits_per_count,
            min_len,
            max_len,
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

        let mut accumulator = 0u32;
        let mut first_on_row = 0u32;
        for _ in 0..self.min_len {
            accumulator = (accumulator << 1) | self.reader.read_bit()?;
            first_on_row <<= 1;
        }

        let mut table_index = self.table_position;
        for len in self.min_len..=self.max_len {
            let count = self.reader.read_at(&mut table_index, self.bits_per_count)?;
            if count > 0 && accumulator >= first_on_row && accumulator - first_on_row < count {
                let item = accumulator - first_on_row;
                table_index += item as usize * self.bits_per_symbol as usize;
                let symbol = self.reader.read_at(&mut table_index, self.bits_per_symbol)?;
                return Ok(Some(symbol));
            }
            first_on_row += count;
            if len < self.max_len {
                accumulator = (accumulator << 1) | self.reader.read_bit()?;
                first_on_row <<= 1;
                table_index += count as usize * self.bits_per_symbol as usize;
            }
        }
        Err(PicoPackError::corrupted(
            self.reader.position(),
            "bits match no huffman codeword",
        ))
    }
}

/// Compress `input` with the Huffman codec.
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    if input.len() > MAX_BYTE_LENGTH {
        return Err(PicoPackError::input_too_large(input.len(), MAX_BYTE_LENGTH));
    }
    let values: Vec<u32> = input.iter().map(|&b| b as u32).collect();
    let mut out = BitStream::new();
    encode_stream(&mut out, &values, true)?;
    Ok(out.to_bytes())
}

/// Decompress a Huffman stream, failing if the declared byte count
/// exceeds `capacity`.
pub fn decompress(source: &[u8], capacity: usize) -> Result<Vec<u8>> {
    let mut decoder = HuffmanDecoder::new(source)?;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(input: &[u8]) {
        let packed = compress(input).unwrap();
        let output = decompress(&packed, input.len()).unwrap();
        assert_eq!(output, input, "huffman roundtrip");
    }

    #[test]
    fn test_roundtrip_text() {
        roundtrip(b"this is an example of a huffman tree");
        roundtrip(b"aaaaaaaaaabbbbbcc");
    }

    #[test]
    fn test_roundtrip_edges() {
        roundtrip(&[]);
        roundtrip(&[0x41]);
        roundtrip(&[0xFF; 100]);
        roundtrip(&[0u8; 100]);
        let all: Vec<u8> = (0..=255).collect();
        roundtrip(&all);
    }

    #[test]
    fn test_single_symbol_is_one_bit_each() {
        // 100 identical bytes: one codeword of length 1.
        let packed = compress(&[b'x'; 100]).unwrap();
        // Header dominates; the body is 100 bits.
        assert!(packed.len() < 40, "got {}", packed.len());
        roundtrip(&[b'x'; 100]);
    }

    #[test]
    fn test_canonical_lengths_two_plus_two() {
        // Frequencies 2,1,1 give lengths 1,2,2 and canonical codes 0,10,11.
        let freqs = [(b'a' as u32, 2u64), (b'b' as u32, 1), (b'c' as u32, 1)];
        let mut leaves = build_code_lengths(&freqs);
        leaves.sort_by(|x, y| x.1.cmp(&y.1).then(x.0.cmp(&y.0)));
        assert_eq!(leaves, vec![(97, 1), (98, 2), (99, 2)]);

        let codes = assign_canonical(&leaves);
        assert_eq!(codes[0].1, Codeword { value: 0b0, len: 1 });
        assert_eq!(codes[1].1, Codeword { value: 0b10, len: 2 });
        assert_eq!(codes[2].1, Codeword { value: 0b11, len: 2 });
    }

    #[test]
    fn test_deterministic_output() {
        let input = b"determinism: two runs, one byte stream";
        assert_eq!(compress(input).unwrap(), compress(input).unwrap());
    }

    #[test]
    fn test_declared_length_is_first_field() {
        let packed = compress(b"12345").unwrap();
        let mut reader = BitReader::new(&packed);
        assert_eq!(Lomont1::BYTE_COUNT.decode(&mut reader).unwrap(), 5);
    }

    #[test]
    fn test_capacity_exceeded() {
        let packed = compress(b"hello world").unwrap();
        assert!(matches!(
            decompress(&packed, 4),
            Err(PicoPackError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_subcodec_form_roundtrip() {
        let values = [0u32, 1, 1, 0, 1, 1, 1, 0, 900, 900];
        let mut bs = BitStream::new();
        encode_stream(&mut bs, &values, false).unwrap();
        let bytes = bs.to_bytes();

        let mut decoder = HuffmanDecoder::from_reader(BitReader::new(&bytes)).unwrap();
        assert_eq!(decoder.len(), None);
        for &v in &values {
            assert_eq!(decoder.next_symbol().unwrap(), Some(v));
        }
    }

    #[test]
    fn test_truncated_stream_fails() {
        let packed = compress(b"some reasonably long huffman input").unwrap();
        let cut = &packed[..packed.len() / 2];
        let result = HuffmanDecoder::new(cut).and_then(|mut d| {
            while d.next_symbol()?.is_some() {}
            Ok(())
        });
        assert!(result.is_err());
    }
}
