//! # PicoPack Codecs
//!
//! Four lossless codecs over the PicoPack bit-stream substrate, built for
//! decoders on resource-constrained targets:
//!
//! - **Huffman** (`huffman`): canonical codes with a table layout the
//!   decoder walks inside the compressed stream.
//! - **Arithmetic** (`arith`): a 30-bit range coder whose frequency table
//!   is replayed in place per symbol.
//! - **LZ77** (`lz77`): greedy back-references with literals and packed
//!   tokens interleaved in one stream.
//! - **LZCL** (`lzcl`): the LZ77 model split into sub-streams, each under
//!   the best of {Fixed, Arithmetic, Huffman, Golomb}.
//!
//! Every codec offers one-shot `compress`/`decompress` plus an incremental
//! decoder that parses the header once and then produces one symbol
//! (Huffman, Arithmetic) or one block (LZ77, LZCL) per call, holding only
//! a small state struct: header tables are never expanded into memory.
//!
//! ## Example
//!
//! ```rust
//! use picopack_codecs::{Method, decoded_len};
//!
//! let input = b"abcabcabcabcabcabcabcabcabcabc";
//! let packed = Method::Lzcl.compress(input).unwrap();
//! assert_eq!(decoded_len(&packed).unwrap() as usize, input.len());
//!
//! let output = Method::Lzcl.decompress(&packed, input.len()).unwrap();
//! assert_eq!(&output, input);
//! ```
//!
//! ## Streaming decompression
//!
//! The LZ decoders write into a caller-supplied cyclic window sized from
//! the stream header, so output far larger than RAM can be drained block
//! by block:
//!
//! ```rust
//! use picopack_codecs::{Lz77Decoder, lz77};
//!
//! let packed = lz77::compress(b"tiny tiny tiny tiny window").unwrap();
//! let mut window = vec![0u8; 1024];
//! let mut decoder = Lz77Decoder::new(&packed, &mut window).unwrap();
//! let mut output = Vec::new();
//! let mut index = 0usize;
//! while let Some(produced) = decoder.next_block().unwrap() {
//!     for _ in 0..produced {
//!         output.push(decoder.window()[index % 1024]);
//!         index += 1;
//!     }
//! }
//! assert_eq!(output, b"tiny tiny tiny tiny window");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod arith;
pub mod fixed;
pub mod golomb;
pub mod huffman;
pub mod lz77;
pub mod lzcl;
pub mod method;
pub mod subcodec;

// Re-exports
pub use arith::ArithmeticDecoder;
pub use fixed::FixedDecoder;
pub use golomb::GolombDecoder;
pub use huffman::HuffmanDecoder;
pub use lz77::{Lz77Decoder, Lz77Options, Lz77Token};
pub use lzcl::{LzclDecoder, LzclOptions};
pub use method::{Method, decoded_len};
pub use subcodec::{SubCodecSet, SubCodecTag, SubDecoder};

/// Largest input the formats can describe (the byte count is a `u32`).
pub const MAX_BYTE_LENGTH: usize = u32::MAX as usize;
