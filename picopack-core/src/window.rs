//! Cyclic output window for LZ decompression.
//!
//! The LZ77 and LZCL block decoders write into a caller-supplied buffer in
//! a cyclical manner: byte `i` of the output lands at `i % capacity`. The
//! buffer only has to be as large as the furthest back-reference plus one,
//! so a decoder can stream megabytes through a few hundred bytes of RAM
//! while the caller drains each block as it is produced.
//!
//! Unlike a power-of-two ring, the capacity here is arbitrary (it is
//! derived from `max_distance + 1` in the stream header), so indexing is
//! plain modulo arithmetic.

use crate::error::{PicoPackError, Result};

/// A cyclic window over a caller-supplied byte buffer.
#[derive(Debug)]
pub struct CyclicWindow<'a> {
    /// Underlying storage.
    buf: &'a mut [u8],
    /// Total bytes written so far (not wrapped).
    index: usize,
}

impl<'a> CyclicWindow<'a> {
    /// Wrap a buffer. The buffer may be empty only for empty streams.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, index: 0 }
    }

    /// Window capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Total bytes written so far.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The underlying buffer, for the caller to drain produced bytes from.
    pub fn as_slice(&self) -> &[u8] {
        self.buf
    }

    /// Write one literal byte at the current position.
    pub fn push(&mut self, byte: u8) {
        let capacity = self.buf.len();
        self.buf[self.index % capacity] = byte;
        self.index += 1;
    }

    /// Copy `length` bytes from `distance` back, byte by byte, so that
    /// self-overlapping runs repeat as they should.
    ///
    /// `distance` counts back from the last written byte: 0 repeats the
    /// previous byte. It must be less than the capacity so the source
    /// stays behind the write cursor.
    pub fn copy_back(&mut self, distance: usize, length: usize) -> Result<()> {
        let capacity = self.buf.len();
        if distance + 1 > capacity {
            return Err(PicoPackError::invalid_distance(distance, capacity));
        }
        // Positive delta that looks back when taken modulo the capacity.
        let delta = capacity - distance - 1;
        for _ in 0..length {
            self.buf[self.index % capacity] = self.buf[(self.index + delta) % capacity];
            self.index += 1;
        }
        Ok(())
    }
}
