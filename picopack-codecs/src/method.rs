//! Codec selection and dispatch.
//!
//! The four public codecs share the same outer contract (bytes in, bytes
//! out, a leading decompressed-size field), so callers that pick a codec
//! at runtime go through [`Method`].

use std::fmt;
use std::str::FromStr;

use crate::{arith, huffman, lz77, lzcl};
use picopack_core::bitstream::BitReader;
use picopack_core::codes::Lomont1;
use picopack_core::error::{PicoPackError, Result};

/// One of the four PicoPack codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Canonical Huffman.
    Huffman,
    /// Static arithmetic coding.
    Arithmetic,
    /// LZ77 with interleaved literals and tokens.
    Lz77,
    /// LZ77 sub-streams under per-stream sub-codecs.
    Lzcl,
}

impl Method {
    /// All methods, in tag order.
    pub const ALL: [Method; 4] = [
        Method::Huffman,
        Method::Arithmetic,
        Method::Lz77,
        Method::Lzcl,
    ];

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Method::Huffman => "huffman",
            Method::Arithmetic => "arith",
            Method::Lz77 => "lz77",
            Method::Lzcl => "lzcl",
        }
    }

    /// Compress `input` with this codec.
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        match self {
            Method::Huffman => huffman::compress(input),
            Method::Arithmetic => arith::compress(input),
            Method::Lz77 => lz77::compress(input),
            Method::Lzcl => lzcl::compress(input),
        }
    }

    /// Decompress `source`, failing if the declared byte count exceeds
    /// `capacity`.
    pub fn decompress(&self, source: &[u8], capacity: usize) -> Result<Vec<u8>> {
        match self {
            Method::Huffman => huffman::decompress(source, capacity),
            Method::Arithmetic => arith::decompress(source, capacity),
            Method::Lz77 => lz77::decompress(source, capacity),
            Method::Lzcl => lzcl::decompress(source, capacity),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = PicoPackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "huffman" | "huff" => Ok(Method::Huffman),
            "arith" | "arithmetic" => Ok(Method::Arithmetic),
            "lz77" | "lz" => Ok(Method::Lz77),
            "lzcl" => Ok(Method::Lzcl),
            other => Err(PicoPackError::invalid_header(format!(
                "unknown method '{other}'"
            ))),
        }
    }
}

/// Read the decompressed byte count from any PicoPack stream.
///
/// Every codec leads with the same Lomont-1(6,0) field: Huffman, LZ77 and
/// LZCL store the byte count outright, and the arithmetic codec's symbol
/// total is the byte count.
pub fn decoded_len(source: &[u8]) -> Result<u32> {
    Lomont1::BYTE_COUNT.decode(&mut BitReader::new(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("huffman".parse::<Method>().unwrap(), Method::Huffman);
        assert_eq!("ARITH".parse::<Method>().unwrap(), Method::Arithmetic);
        assert_eq!("lz77".parse::<Method>().unwrap(), Method::Lz77);
        assert_eq!("lzcl".parse::<Method>().unwrap(), Method::Lzcl);
        assert!("brotli".parse::<Method>().is_err());
    }

    #[test]
    fn test_dispatch_roundtrip() {
        let input = b"dispatch the same bytes through all four codecs";
        for method in Method::ALL {
            let packed = method.compress(input).unwrap();
            let output = method.decompress(&packed, input.len()).unwrap();
            assert_eq!(output, input, "{method}");
        }
    }

    #[test]
    fn test_decoded_len_all_methods() {
        let input = b"size probe";
        for method in Method::ALL {
            let packed = method.compress(input).unwrap();
            assert_eq!(decoded_len(&packed).unwrap(), input.len() as u32, "{method}");
        }
    }
}
