//! Decode error types.

use thiserror::Error;

/// Errors produced while decoding a resource buffer.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("read past end of data at offset {offset:#x} (need {need} bytes, have {have})")]
    OutOfBounds {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("string at offset {offset:#x} is not valid UTF-8: {source}")]
    InvalidEncoding {
        offset: usize,
        source: std::string::FromUtf8Error,
    },

    /// The checksum word of a length-prefixed string did not equal `length + 8`.
    ///
    /// Heuristic readers treat this as "no string here".
    #[error("no valid string header at offset {offset:#x} (checksum {checksum:#x}, length {length})")]
    InvalidString {
        offset: usize,
        checksum: u32,
        length: u32,
    },

    #[error("invalid magic: expected \"ERTM\", found {found:?}")]
    InvalidMagic { found: [u8; 4] },

    #[error("unsupported {kind} subtype {subtype:#x}")]
    UnsupportedSubtype { kind: &'static str, subtype: u32 },

    /// A backward marker scan ran off the start of an opaque blob.
    #[error("heuristic scan underflowed at offset {offset:#x}")]
    HeuristicScanUnderflow { offset: usize },

    #[error("invalid geometry: {message}")]
    InvalidGeometry { message: String },

    #[error("{context}: {message}")]
    Malformed {
        context: &'static str,
        message: String,
    },
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
