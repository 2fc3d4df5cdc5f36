//! huffc-core: byte-oriented Huffman compression
//!
//! This library turns an arbitrary byte buffer into a self-contained
//! compressed record and back:
//! - Counts byte frequencies and builds a deterministic Huffman tree
//! - Derives prefix-free code words and packs the encoded bits LSB-first
//! - Serializes the code table and payload behind a fixed signature
//! - Decodes either by code-word lookup or by walking the tree
//!
//! # Architecture
//!
//! - `bitbuf`: growable bit sequence with structural equality
//! - `frequency`: byte histogram
//! - `tree`: Huffman tree, code map and tree-walk decoding
//! - `encoder` / `decoder`: bytes to bits and back
//! - `wire`: binary record format
//! - `codec`: the end-to-end pipeline
//! - `stats`: compression statistics
//!
//! # Design Principles
//!
//! - **No panics**: malformed or truncated input yields a structured error
//! - **Deterministic**: the same counts always produce the same codes, so a
//!   decoder can rebuild the tree from a stored frequency table
//!
//! # Example
//! ```
//! use huffc_core::codec::{compress, decompress};
//! use huffc_core::decoder::DecodeStrategy;
//! use huffc_core::wire::TableForm;
//!
//! let data = b"abracadabra";
//! let record = compress(data, TableForm::CodeWords).unwrap();
//! let restored = decompress(&record, TableForm::CodeWords, DecodeStrategy::Tree).unwrap();
//! assert_eq!(restored, data);
//! ```

pub mod bitbuf;
pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frequency;
pub mod stats;
pub mod tree;
pub mod wire;

// Re-export commonly used types
pub use error::{Error, Result};
