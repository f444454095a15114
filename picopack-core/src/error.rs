//! Error types for PicoPack operations.
//!
//! The error surface is deliberately narrow: compressed streams carry no
//! redundancy, so corruption is only ever detected as an inconsistent
//! header, a read past the end of the buffer, or an impossible value.
//! None of these are recoverable; they are all surfaced to the caller.

use std::io;
use thiserror::Error;

/// The main error type for PicoPack operations.
#[derive(Debug, Error)]
pub enum PicoPackError {
    /// I/O error from an underlying reader/writer (CLI and file helpers).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Bit-stream read past the end of the buffer.
    #[error("Unexpected end of stream at bit {bit_position}")]
    UnexpectedEof {
        /// Bit position of the failed read.
        bit_position: usize,
    },

    /// Header fields are out of range or mutually inconsistent.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// The stream body contradicts its own header.
    #[error("Corrupted data at bit {bit_position}: {message}")]
    CorruptedData {
        /// Bit position where the corruption was detected.
        bit_position: usize,
        /// Description of the corruption.
        message: String,
    },

    /// Output or window buffer too small for the declared stream.
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// Back-reference distance reaches outside the cyclic window.
    #[error("Invalid back-reference distance: {distance} exceeds window size {window}")]
    InvalidDistance {
        /// The invalid distance value.
        distance: usize,
        /// Window capacity in bytes.
        window: usize,
    },

    /// Sub-codec tag outside the defined range 0-3.
    #[error("Invalid sub-codec tag: {tag}")]
    InvalidCodecTag {
        /// The tag value found.
        tag: u32,
    },

    /// Input exceeds a structural limit of the format.
    #[error("Input too large: {size} exceeds limit {max}")]
    InputTooLarge {
        /// Actual size.
        size: usize,
        /// Format limit.
        max: usize,
    },
}

/// Result type alias for PicoPack operations.
pub type Result<T> = std::result::Result<T, PicoPackError>;

impl PicoPackError {
    /// Create an unexpected end-of-stream error.
    pub fn unexpected_eof(bit_position: usize) -> Self {
        Self::UnexpectedEof { bit_position }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a corrupted data error.
    pub fn corrupted(bit_position: usize, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            bit_position,
            message: message.into(),
        }
    }

    /// Create a buffer too small error.
    pub fn buffer_too_small(needed: usize, available: usize) -> Self {
        Self::BufferTooSmall { needed, available }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, window: usize) -> Self {
        Self::InvalidDistance { distance, window }
    }

    /// Create an input too large error.
    pub fn input_too_large(size: usize, max: usize) -> Self {
        Self::InputTooLarge { size, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PicoPackError::unexpected_eof(117);
        assert!(err.to_string().contains("bit 117"));

        let err = PicoPackError::buffer_too_small(4096, 1024);
        assert!(err.to_string().contains("4096"));

        let err = PicoPackError::invalid_header("total exceeds 2^29");
        assert!(err.to_string().contains("total exceeds"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: PicoPackError = io_err.into();
        assert!(matches!(err, PicoPackError::Io(_)));
    }
}
