//! Recovers the original bytes from an encoded bit sequence.
//!
//! Two strategies produce identical output for identical input:
//! - **Table-walk**: accumulate bits until they equal a code word in the
//!   reverse (code word -> byte) lookup, emit the byte, start over.
//! - **Tree-walk**: descend the Huffman tree one bit at a time from the
//!   current cursor until a leaf is reached.
//!
//! Neither strategy can tell whether the codes match the distribution the
//! payload was encoded with. A mismatch shows up either as a
//! `CorruptStream` error or as wrong output; callers detect the latter by
//! round-tripping.

use std::str::FromStr;

use tracing::trace;

use crate::bitbuf::BitBuffer;
use crate::error::{Error, HuffmanError, Result};
use crate::tree::{CodeMap, HuffmanTree};

/// How to decode a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeStrategy {
    /// Reverse lookup of accumulated code words
    #[default]
    Table,
    /// Bit-by-bit tree traversal
    Tree,
}

impl FromStr for DecodeStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "table" => Ok(DecodeStrategy::Table),
            "tree" => Ok(DecodeStrategy::Tree),
            other => Err(Error::Config(format!("unknown decode strategy: {other}"))),
        }
    }
}

/// Decode `bits` by table-walk over `codes`.
///
/// # Errors
/// `HuffmanError::CorruptStream` if the bits end inside a partial code
/// word, or the accumulated bits grow longer than any code word.
pub fn decode_with_table(codes: &CodeMap, bits: &BitBuffer) -> Result<Vec<u8>> {
    let inverse = codes.invert();
    let max_len = codes.max_len();

    let mut output = Vec::new();
    let mut scratch = BitBuffer::with_capacity(max_len);

    for (index, bit) in bits.iter().enumerate() {
        scratch.push(bit);
        if let Some(&byte) = inverse.get(&scratch) {
            output.push(byte);
            scratch.clear();
        } else if scratch.len() >= max_len {
            return Err(HuffmanError::CorruptStream {
                position: index + 1 - scratch.len(),
            }
            .into());
        }
    }

    if !scratch.is_empty() {
        return Err(HuffmanError::CorruptStream {
            position: bits.len() - scratch.len(),
        }
        .into());
    }

    trace!(bits = bits.len(), bytes = output.len(), "table-walk decode");
    Ok(output)
}

/// Decode `bits` by repeated tree traversal until the cursor reaches the end.
///
/// # Errors
/// `HuffmanError::CorruptStream` if the bits end before a leaf is reached.
pub fn decode_with_tree(tree: &HuffmanTree, bits: &BitBuffer) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut cursor = 0;

    while cursor < bits.len() {
        output.push(tree.decode_symbol(&mut cursor, bits)?);
    }

    trace!(bits = bits.len(), bytes = output.len(), "tree-walk decode");
    Ok(output)
}
