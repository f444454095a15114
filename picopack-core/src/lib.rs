//! # PicoPack Core
//!
//! Substrate for the PicoPack compression codecs: bit-level I/O, the
//! universal integer codes that make every header self-describing, and the
//! cyclic window used by low-memory LZ decompression.
//!
//! ## Architecture
//!
//! The PicoPack stack is small and layered:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ CLI                                                     │
//! │     thin compress / decompress / verify adapter         │
//! ├─────────────────────────────────────────────────────────┤
//! │ Codecs                                                  │
//! │     Huffman, Arithmetic, LZ77, LZCL (+ sub-codecs)      │
//! ├─────────────────────────────────────────────────────────┤
//! │ Core (this crate)                                       │
//! │     BitStream / BitReader, universal codes, window      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Decoders built on this crate keep their header tables inside the
//! compressed stream and re-read them through [`bitstream::BitReader`]'s
//! random-access reads, so decode state stays within a few dozen bytes.
//!
//! ## Example
//!
//! ```rust
//! use picopack_core::bitstream::{BitReader, BitStream};
//! use picopack_core::codes::Lomont1;
//!
//! let mut bs = BitStream::new();
//! Lomont1::BYTE_COUNT.encode(&mut bs, 1234);
//! let bytes = bs.to_bytes();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(Lomont1::BYTE_COUNT.decode(&mut reader).unwrap(), 1234);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod codes;
pub mod error;
pub mod window;

// Re-exports for convenience
pub use bitstream::{BitReader, BitStream};
pub use codes::{BascReader, Golomb, Lomont1, Stout, Truncated, bits_required};
pub use error::{PicoPackError, Result};
pub use window::CyclicWindow;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitStream};
    pub use crate::codes::{Golomb, Lomont1, Truncated, bits_required};
    pub use crate::error::{PicoPackError, Result};
    pub use crate::window::CyclicWindow;
}
