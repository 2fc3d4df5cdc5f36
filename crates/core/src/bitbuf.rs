//! Growable bit-level storage for code words and packed payloads.
//!
//! A `BitBuffer` is an ordered sequence of bits addressed by a zero-based
//! index. Bits are stored LSB-first inside 64-bit words, and packed into
//! bytes the same way: bit `i` of the buffer lands in bit `i % 8` of byte
//! `i / 8`.
//!
//! # Invariants
//! - `len <= capacity()`
//! - every storage bit at an index `>= len` is zero, so equality, hashing
//!   and `to_bytes` can work on whole words
//!
//! # Example
//! ```
//! use huffc_core::bitbuf::BitBuffer;
//!
//! let mut bits = BitBuffer::new();
//! bits.push(true);
//! bits.push(false);
//! bits.push(true);
//! assert_eq!(bits.to_string(), "101");
//! assert_eq!(bits.to_bytes(), vec![0b0000_0101]);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{BitBufferError, Result};

const BITS_PER_WORD: usize = 64;

/// Words allocated by `new()`.
const DEFAULT_WORDS: usize = 2;

/// Ordered, growable sequence of bits with structural equality.
#[derive(Clone)]
pub struct BitBuffer {
    /// Backing storage; `words.len() * 64` is the capacity in bits
    words: Vec<u64>,
    /// Number of valid bits
    len: usize,
}

impl BitBuffer {
    /// Create an empty buffer with the default capacity.
    pub fn new() -> Self {
        Self {
            words: vec![0; DEFAULT_WORDS],
            len: 0,
        }
    }

    /// Create an empty buffer able to hold at least `bits` bits without growing.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: vec![0; bits.div_ceil(BITS_PER_WORD).max(DEFAULT_WORDS)],
            len: 0,
        }
    }

    /// Rebuild a buffer from `to_bytes` output.
    ///
    /// Returns `None` if `bytes` holds fewer than `bit_len` bits. Bits past
    /// `bit_len` in the final byte are ignored.
    pub fn from_bytes(bytes: &[u8], bit_len: usize) -> Option<Self> {
        if bit_len > bytes.len().saturating_mul(8) {
            return None;
        }

        let mut buffer = Self::with_capacity(bit_len);
        for (i, &byte) in bytes[..bit_len.div_ceil(8)].iter().enumerate() {
            buffer.words[i / 8] |= (byte as u64) << (8 * (i % 8));
        }
        buffer.len = bit_len;
        buffer.clear_tail();
        Some(buffer)
    }

    /// Number of bits stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bits the buffer can hold before reallocating.
    pub fn capacity(&self) -> usize {
        self.words.len() * BITS_PER_WORD
    }

    /// Append one bit. Amortized O(1).
    pub fn push(&mut self, bit: bool) {
        if self.len == self.capacity() {
            self.grow(self.len + 1);
        }
        if bit {
            self.words[self.len / BITS_PER_WORD] |= 1u64 << (self.len % BITS_PER_WORD);
        }
        self.len += 1;
    }

    /// Append all bits of `other` in order. `other` is left unchanged.
    pub fn append(&mut self, other: &BitBuffer) {
        if other.is_empty() {
            return;
        }
        self.reserve(other.len);

        let shift = self.len % BITS_PER_WORD;
        let base = self.len / BITS_PER_WORD;

        for (i, &word) in other.used_words().iter().enumerate() {
            if shift == 0 {
                self.words[base + i] |= word;
            } else {
                self.words[base + i] |= word << shift;
                let carry = word >> (BITS_PER_WORD - shift);
                // Non-zero carry bits sit below the new length, so the word exists.
                if carry != 0 {
                    self.words[base + i + 1] |= carry;
                }
            }
        }

        self.len += other.len;
    }

    /// Read the bit at `index`.
    ///
    /// # Errors
    /// `BitBufferError::OutOfRange` if the buffer is empty or `index >= len()`.
    pub fn read_bit(&self, index: usize) -> Result<bool> {
        if index >= self.len {
            return Err(BitBufferError::OutOfRange {
                index,
                len: self.len,
            }
            .into());
        }
        Ok(self.bit(index))
    }

    /// The bit at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| self.bit(index))
    }

    /// Remove and return the last bit.
    ///
    /// # Errors
    /// `BitBufferError::EmptyBuffer` if there is nothing to remove.
    pub fn remove_last(&mut self) -> Result<bool> {
        self.pop().ok_or_else(|| BitBufferError::EmptyBuffer.into())
    }

    /// Remove and return the last bit, or `None` if the buffer is empty.
    pub fn pop(&mut self) -> Option<bool> {
        if self.len == 0 {
            return None;
        }
        let index = self.len - 1;
        let bit = self.bit(index);
        self.words[index / BITS_PER_WORD] &= !(1u64 << (index % BITS_PER_WORD));
        self.len = index;
        Some(bit)
    }

    /// Reset the length to zero, keeping the allocation for reuse.
    pub fn clear(&mut self) {
        let used = self.len.div_ceil(BITS_PER_WORD);
        self.words[..used].fill(0);
        self.len = 0;
    }

    /// Number of bytes `to_bytes` produces: `ceil(len / 8)`.
    pub fn byte_count(&self) -> usize {
        self.len.div_ceil(8)
    }

    /// Pack the bits into bytes, LSB-first. Unused high bits of the final
    /// byte are zero.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.byte_count());
        self.write_bytes(&mut bytes);
        bytes
    }

    /// Append the packed bytes to `out` without an intermediate allocation.
    pub fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend(
            (0..self.byte_count())
                .map(|i| (self.words[i / 8] >> (8 * (i % 8))) as u8),
        );
    }

    /// Iterate over the bits in index order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bit(i))
    }

    /// True if `prefix` is a prefix of this buffer (equal buffers included).
    pub fn starts_with(&self, prefix: &BitBuffer) -> bool {
        if prefix.len > self.len {
            return false;
        }
        let full = prefix.len / BITS_PER_WORD;
        if self.words[..full] != prefix.words[..full] {
            return false;
        }
        let rest = prefix.len % BITS_PER_WORD;
        if rest == 0 {
            return true;
        }
        let mask = (1u64 << rest) - 1;
        self.words[full] & mask == prefix.words[full]
    }

    fn bit(&self, index: usize) -> bool {
        (self.words[index / BITS_PER_WORD] >> (index % BITS_PER_WORD)) & 1 == 1
    }

    fn used_words(&self) -> &[u64] {
        &self.words[..self.len.div_ceil(BITS_PER_WORD)]
    }

    fn reserve(&mut self, additional: usize) {
        let needed = self.len + additional;
        if needed > self.capacity() {
            self.grow(needed);
        }
    }

    /// Grow by at least 1.5x, and to at least `min_bits`.
    fn grow(&mut self, min_bits: usize) {
        let current = self.words.len();
        let geometric = current + current / 2 + 1;
        let target = geometric.max(min_bits.div_ceil(BITS_PER_WORD));
        self.words.resize(target, 0);
    }

    /// Zero the storage bits past `len` in the last used word.
    fn clear_tail(&mut self) {
        let rest = self.len % BITS_PER_WORD;
        if rest != 0 {
            self.words[self.len / BITS_PER_WORD] &= (1u64 << rest) - 1;
        }
    }
}

impl Default for BitBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for BitBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.used_words() == other.used_words()
    }
}

impl Eq for BitBuffer {}

impl Hash for BitBuffer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        self.used_words().hash(state);
    }
}

impl fmt::Display for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitBuffer(\"{}\")", self)
    }
}

impl Extend<bool> for BitBuffer {
    fn extend<I: IntoIterator<Item = bool>>(&mut self, iter: I) {
        for bit in iter {
            self.push(bit);
        }
    }
}

impl FromIterator<bool> for BitBuffer {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut buffer = BitBuffer::new();
        buffer.extend(iter);
        buffer
    }
}
