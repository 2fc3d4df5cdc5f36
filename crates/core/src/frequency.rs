//! Per-byte-value occurrence statistics.
//!
//! A `FrequencyModel` maps each byte value that occurs in the input to its
//! exact count. Values that never occur are absent, so every stored weight
//! is strictly positive. Normalized probabilities are derived on demand for
//! statistics; tree construction always works on the exact counts.

use std::collections::BTreeMap;

use crate::error::{FormatError, Result};

/// Exact byte counts for one input buffer.
///
/// # Invariants
/// - every stored count is `> 0`
/// - `total` is the sum of the stored counts
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrequencyModel {
    counts: BTreeMap<u8, u32>,
    total: u64,
}

impl FrequencyModel {
    /// Count every byte of `bytes` in a single pass.
    ///
    /// Counts saturate at `u32::MAX`, the widest value the frequency table
    /// can carry on the wire.
    pub fn compute(bytes: &[u8]) -> Self {
        let mut histogram = [0u64; 256];
        for &byte in bytes {
            histogram[byte as usize] += 1;
        }

        let counts: BTreeMap<u8, u32> = histogram
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(byte, &count)| (byte as u8, u32::try_from(count).unwrap_or(u32::MAX)))
            .collect();

        let total = counts.values().map(|&c| c as u64).sum();
        Self { counts, total }
    }

    /// Build a model from explicit `(byte, count)` pairs.
    ///
    /// Zero counts are dropped.
    ///
    /// # Errors
    /// `FormatError::DuplicateSymbol` if a byte value appears twice.
    pub fn from_counts<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u8, u32)>,
    {
        let mut counts = BTreeMap::new();
        for (byte, count) in pairs {
            if counts.insert(byte, count).is_some() {
                return Err(FormatError::DuplicateSymbol(byte).into());
            }
        }
        counts.retain(|_, count| *count > 0);

        let total = counts.values().map(|&c| c as u64).sum();
        Ok(Self { counts, total })
    }

    /// Count for `byte`, or 0 if it does not occur.
    pub fn count(&self, byte: u8) -> u32 {
        self.counts.get(&byte).copied().unwrap_or(0)
    }

    /// Number of distinct byte values.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts (the input length, unless counts saturated).
    pub fn total(&self) -> u64 {
        self.total
    }

    /// `(byte, count)` pairs in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        self.counts.iter().map(|(&byte, &count)| (byte, count))
    }

    /// Normalized weights: count / total.
    pub fn probabilities(&self) -> BTreeMap<u8, f64> {
        let total = self.total as f64;
        self.counts
            .iter()
            .map(|(&byte, &count)| (byte, count as f64 / total))
            .collect()
    }

    /// Shannon entropy in bits per symbol. 0.0 for a single-valued model.
    pub fn entropy_bits(&self) -> f64 {
        self.probabilities()
            .values()
            .map(|&p| -p * p.log2())
            .sum::<f64>()
            .max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_compute_counts() {
        let model = FrequencyModel::compute(&[0, 1, 1, 2, 1, 2, 1, 2, 2]);

        assert_eq!(model.len(), 3);
        assert_eq!(model.count(0), 1);
        assert_eq!(model.count(1), 4);
        assert_eq!(model.count(2), 4);
        assert_eq!(model.count(3), 0);
        assert_eq!(model.total(), 9);
    }

    #[test]
    fn test_empty_input() {
        let model = FrequencyModel::compute(&[]);
        assert!(model.is_empty());
        assert_eq!(model.total(), 0);
    }

    #[test]
    fn test_iteration_is_ordered() {
        let model = FrequencyModel::compute(b"zebra");
        let bytes: Vec<u8> = model.iter().map(|(b, _)| b).collect();
        assert_eq!(bytes, b"aberz".to_vec());
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = FrequencyModel::compute(b"hello world");
        let sum: f64 = model.probabilities().values().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!((model.probabilities()[&b'l'] - 3.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_entropy() {
        assert_eq!(FrequencyModel::compute(b"aaaa").entropy_bits(), 0.0);

        let uniform: Vec<u8> = (0..=255).collect();
        let entropy = FrequencyModel::compute(&uniform).entropy_bits();
        assert!((entropy - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_counts_drops_zeros() {
        let model = FrequencyModel::from_counts([(7, 3), (9, 0), (1, 2)]).unwrap();
        assert_eq!(model.len(), 2);
        assert_eq!(model.total(), 5);
        assert_eq!(model, FrequencyModel::compute(&[7, 1, 7, 1, 7]));
    }

    #[test]
    fn test_from_counts_rejects_duplicates() {
        let result = FrequencyModel::from_counts([(4, 1), (4, 2)]);
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::DuplicateSymbol(4)))
        ));
    }
}
