//! Error types for the huffc compression engine.
//!
//! All operations return structured errors rather than panicking, including
//! when decoding hostile or truncated input.

use thiserror::Error;

/// Top-level error type for all operations in the system.
///
/// Each variant corresponds to a specific failure domain:
/// - Bit buffer: indexing or removing bits that are not there
/// - Huffman: tree construction, encode or decode failures
/// - Format: malformed or truncated serialized records
/// - I/O: file system operations performed by the CLI
#[derive(Debug, Error)]
pub enum Error {
    /// Bit buffer misuse (e.g., reading past the end)
    #[error("bit buffer error: {0}")]
    BitBuffer(#[from] BitBufferError),

    /// Huffman codec error (e.g., empty input, corrupt stream)
    #[error("huffman codec error: {0}")]
    Huffman(#[from] HuffmanError),

    /// Serialized record could not be parsed
    #[error("invalid format: {0}")]
    Format(#[from] FormatError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True if this error came from parsing a malformed record.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }

    /// True if the payload did not resolve to whole code words.
    pub fn is_corrupt_stream(&self) -> bool {
        matches!(self, Error::Huffman(HuffmanError::CorruptStream { .. }))
    }
}

/// Bit buffer errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitBufferError {
    /// Index is not below the buffer length (or the buffer is empty)
    #[error("bit index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    /// Attempted to remove a bit from an empty buffer
    #[error("cannot remove a bit from an empty buffer")]
    EmptyBuffer,
}

/// Huffman codec errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HuffmanError {
    /// No byte values to build a tree from
    #[error("empty input: cannot build a huffman tree")]
    EmptyInput,

    /// Byte value has no code word in the code map
    #[error("byte {0:#04x} has no code word")]
    UnknownSymbol(u8),

    /// Bit stream ended inside a code word, or followed a missing branch
    #[error("corrupt bit stream at bit position {position}")]
    CorruptStream { position: usize },
}

/// Serialized record errors. Every variant is an invalid-format condition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// Input ends before a fixed-size header field
    #[error("input too short for {section}: need at least {required} bytes, got {actual}")]
    TooShort {
        section: &'static str,
        required: usize,
        actual: usize,
    },

    /// Magic signature does not match
    #[error("bad signature: expected C0 DE 0D DE, got {actual:02X?}")]
    BadSignature { actual: [u8; 4] },

    /// A table or payload read ran past the end of the input
    #[error("truncated {section} at offset {offset}")]
    Truncated { section: &'static str, offset: usize },

    /// The header declares no table entries
    #[error("table has no entries")]
    EmptyTable,

    /// A frequency table entry carries a zero count
    #[error("zero count for byte {symbol:#04x}")]
    ZeroCount { symbol: u8 },

    /// A code-word table entry declared a zero-length code word
    #[error("empty code word for byte {symbol:#04x}")]
    InvalidCodeWord { symbol: u8 },

    /// The same byte value appears twice in the table
    #[error("byte {0:#04x} listed twice in the table")]
    DuplicateSymbol(u8),

    /// A code word is a prefix of another, or a branch has a `1` child
    /// without a `0` child
    #[error("code word for byte {symbol:#04x} breaks the prefix property")]
    NotPrefixFree { symbol: u8 },

    /// A count does not fit its 32-bit header field
    #[error("{field} value {value} does not fit in 32 bits")]
    TooLarge { field: &'static str, value: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
