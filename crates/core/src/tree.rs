//! Huffman tree construction, code assignment and bit-by-bit decoding.
//!
//! # Construction
//!
//! One leaf per byte value is pushed into a min-heap keyed by
//! `(weight, smallest byte value in the subtree)`. The two lowest entries
//! are merged repeatedly, the first one extracted becoming the left child.
//! Subtrees partition the byte values, so the key is unique per entry and
//! the resulting tree depends only on the counts, never on the order in
//! which a map yields them. A decoder rebuilding the tree from a stored
//! frequency table therefore recovers exactly the encoder's codes.
//!
//! # Single-symbol input
//!
//! A tree with one leaf and no internal node would give that byte an empty
//! code word. The lone leaf is instead hung as the left child of an
//! internal node without a right child, which yields the one-bit code `0`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use tracing::trace;

use crate::bitbuf::BitBuffer;
use crate::error::{FormatError, HuffmanError, Result};
use crate::frequency::FrequencyModel;

/// A node of the Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        byte: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<Node>,
        /// Absent only for the single-symbol tree
        right: Option<Box<Node>>,
    },
}

impl Node {
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } => *weight,
            Node::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// Heap entry for tree construction.
struct Pending {
    weight: u64,
    /// Smallest byte value under this node, the tie-break key
    min_byte: u8,
    node: Node,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (lighter, then smaller byte = higher priority)
        (other.weight, other.min_byte).cmp(&(self.weight, self.min_byte))
    }
}

/// Binary prefix tree over the byte values of a `FrequencyModel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Build the tree for `model`.
    ///
    /// # Errors
    /// `HuffmanError::EmptyInput` if the model has no byte values.
    pub fn build(model: &FrequencyModel) -> Result<Self> {
        Self::from_leaves(model.iter().map(|(byte, count)| (byte, count as u64)))
    }

    /// Build from `(byte, weight)` leaves given in any order.
    fn from_leaves<I>(leaves: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u8, u64)>,
    {
        let mut heap: BinaryHeap<Pending> = leaves
            .into_iter()
            .map(|(byte, weight)| Pending {
                weight,
                min_byte: byte,
                node: Node::Leaf { byte, weight },
            })
            .collect();

        while heap.len() > 1 {
            let (Some(first), Some(second)) = (heap.pop(), heap.pop()) else {
                break;
            };
            let weight = first.weight + second.weight;
            heap.push(Pending {
                weight,
                min_byte: first.min_byte.min(second.min_byte),
                node: Node::Internal {
                    weight,
                    left: Box::new(first.node),
                    right: Some(Box::new(second.node)),
                },
            });
        }

        let root = match heap.pop() {
            None => return Err(HuffmanError::EmptyInput.into()),
            Some(Pending { node: leaf @ Node::Leaf { .. }, .. }) => Node::Internal {
                weight: leaf.weight(),
                left: Box::new(leaf),
                right: None,
            },
            Some(pending) => pending.node,
        };

        let tree = Self { root };
        trace!(
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            weight = tree.weight(),
            "built huffman tree"
        );
        Ok(tree)
    }

    /// Rebuild the tree shape from a prefix-free code map, so that code
    /// word tables can also be decoded by tree-walk.
    ///
    /// Counts are not part of a code map; every node gets weight 0.
    ///
    /// # Errors
    /// - `HuffmanError::EmptyInput` for an empty map
    /// - `FormatError::InvalidCodeWord` for an empty code word
    /// - `FormatError::NotPrefixFree` if a code word is a prefix of another,
    ///   or a node would have a right child but no left child
    pub fn from_code_map(codes: &CodeMap) -> Result<Self> {
        let entries: Vec<(u8, &BitBuffer)> = codes.iter().collect();
        if entries.is_empty() {
            return Err(HuffmanError::EmptyInput.into());
        }

        let root = shape_from_codes(&entries, 0)?;
        if let Node::Leaf { byte, .. } = root {
            return Err(FormatError::InvalidCodeWord { symbol: byte }.into());
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Total weight, i.e. the number of counted input bytes.
    pub fn weight(&self) -> u64 {
        self.root.weight()
    }

    /// Derive the code word of every leaf: left edges append `0`, right
    /// edges append `1`.
    pub fn code_map(&self) -> CodeMap {
        let mut codes = BTreeMap::new();
        let mut path = BitBuffer::new();
        collect_codes(&self.root, &mut path, &mut codes);
        CodeMap { codes }
    }

    /// Code word length of every byte value.
    pub fn code_lengths(&self) -> BTreeMap<u8, usize> {
        self.code_map()
            .iter()
            .map(|(byte, code)| (byte, code.len()))
            .collect()
    }

    /// Decode one byte starting at bit `*cursor` of `bits`.
    ///
    /// Walks from the root (`0` = left, `1` = right) until a leaf is
    /// reached and advances `*cursor` by exactly the number of bits
    /// consumed.
    ///
    /// # Errors
    /// `HuffmanError::CorruptStream` if the bits run out before a leaf is
    /// reached, or a `1` selects a missing right branch.
    pub fn decode_symbol(&self, cursor: &mut usize, bits: &BitBuffer) -> Result<u8> {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { byte, .. } => return Ok(*byte),
                Node::Internal { left, right, .. } => {
                    let position = *cursor;
                    if position >= bits.len() {
                        return Err(HuffmanError::CorruptStream { position }.into());
                    }
                    let bit = bits.read_bit(position)?;
                    *cursor += 1;

                    node = if bit {
                        right
                            .as_deref()
                            .ok_or(HuffmanError::CorruptStream { position })?
                    } else {
                        left.as_ref()
                    };
                }
            }
        }
    }

    /// Number of leaves, one per distinct byte value.
    pub fn leaf_count(&self) -> usize {
        count_nodes(&self.root, true)
    }

    /// Number of internal nodes; `leaf_count() - 1` except for the
    /// single-symbol tree, which has one.
    pub fn internal_count(&self) -> usize {
        count_nodes(&self.root, false)
    }

    /// Length of the longest code word.
    pub fn depth(&self) -> usize {
        fn depth_of(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Internal { left, right, .. } => {
                    1 + depth_of(left).max(right.as_deref().map_or(0, depth_of))
                }
            }
        }
        depth_of(&self.root)
    }
}

fn collect_codes(node: &Node, path: &mut BitBuffer, codes: &mut BTreeMap<u8, BitBuffer>) {
    match node {
        Node::Leaf { byte, .. } => {
            // path keeps being mutated while backtracking; store a copy
            codes.insert(*byte, path.clone());
        }
        Node::Internal { left, right, .. } => {
            path.push(false);
            collect_codes(left, path, codes);
            path.pop();

            if let Some(right) = right {
                path.push(true);
                collect_codes(right, path, codes);
                path.pop();
            }
        }
    }
}

/// Build the subtree for `entries`, all of which share their first `depth` bits.
fn shape_from_codes(entries: &[(u8, &BitBuffer)], depth: usize) -> Result<Node> {
    if let [(byte, code)] = entries {
        if code.len() == depth {
            return Ok(Node::Leaf {
                byte: *byte,
                weight: 0,
            });
        }
    }
    if let Some((byte, _)) = entries.iter().find(|(_, code)| code.len() <= depth) {
        return Err(FormatError::NotPrefixFree { symbol: *byte }.into());
    }

    let (ones, zeros): (Vec<_>, Vec<_>) = entries
        .iter()
        .copied()
        .partition(|(_, code)| code.get(depth) == Some(true));

    if zeros.is_empty() {
        let symbol = ones.first().map_or(0, |(byte, _)| *byte);
        return Err(FormatError::NotPrefixFree { symbol }.into());
    }

    let left = shape_from_codes(&zeros, depth + 1)?;
    let right = if ones.is_empty() {
        None
    } else {
        Some(Box::new(shape_from_codes(&ones, depth + 1)?))
    };
    Ok(Node::Internal {
        weight: 0,
        left: Box::new(left),
        right,
    })
}

fn count_nodes(node: &Node, leaves: bool) -> usize {
    match node {
        Node::Leaf { .. } => usize::from(leaves),
        Node::Internal { left, right, .. } => {
            usize::from(!leaves)
                + count_nodes(left, leaves)
                + right.as_deref().map_or(0, |r| count_nodes(r, leaves))
        }
    }
}

/// Mapping from byte value to its code word.
///
/// Iteration is in ascending byte order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeMap {
    codes: BTreeMap<u8, BitBuffer>,
}

impl CodeMap {
    /// Build a code map from explicit `(byte, code word)` pairs.
    ///
    /// No prefix check is made; see `is_prefix_free`.
    pub fn from_codes<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u8, BitBuffer)>,
    {
        Self {
            codes: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, byte: u8) -> Option<&BitBuffer> {
        self.codes.get(&byte)
    }

    pub fn contains(&self, byte: u8) -> bool {
        self.codes.contains_key(&byte)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitBuffer)> + '_ {
        self.codes.iter().map(|(&byte, code)| (byte, code))
    }

    /// Length of the longest code word, 0 for an empty map.
    pub fn max_len(&self) -> usize {
        self.codes.values().map(BitBuffer::len).max().unwrap_or(0)
    }

    /// Reverse lookup from code word to byte value.
    pub fn invert(&self) -> HashMap<BitBuffer, u8> {
        self.codes
            .iter()
            .map(|(&byte, code)| (code.clone(), byte))
            .collect()
    }

    /// True if no code word is a prefix of another (or equal to it).
    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<&BitBuffer> = self.codes.values().collect();
        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !b.starts_with(a))
        })
    }

    /// Number of payload bits needed to encode an input with these counts.
    pub fn encoded_bits(&self, model: &FrequencyModel) -> u64 {
        model
            .iter()
            .map(|(byte, count)| {
                count as u64 * self.get(byte).map_or(0, |code| code.len() as u64)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn code(map: &CodeMap, byte: u8) -> String {
        map.get(byte).unwrap().to_string()
    }

    #[test]
    fn test_empty_model() {
        let result = HuffmanTree::build(&FrequencyModel::default());
        assert!(matches!(
            result,
            Err(Error::Huffman(HuffmanError::EmptyInput))
        ));
    }

    #[test]
    fn test_skewed_frequencies() {
        let data = [0u8, 1, 1, 2, 1, 2, 1, 2, 2];
        let tree = HuffmanTree::build(&FrequencyModel::compute(&data)).unwrap();
        let codes = tree.code_map();

        // (1,0) and (4,1) merge first; byte 2 then sits alone on the light side
        assert_eq!(code(&codes, 2), "0");
        assert_eq!(code(&codes, 0), "10");
        assert_eq!(code(&codes, 1), "11");
        assert_eq!(tree.weight(), 9);
        assert_eq!(tree.leaf_count(), 3);
        assert_eq!(tree.internal_count(), 2);
    }

    #[test]
    fn test_most_frequent_gets_shortest_code() {
        let model = FrequencyModel::from_counts([(b'a', 1), (b'b', 3), (b'c', 5)]).unwrap();
        let codes = HuffmanTree::build(&model).unwrap().code_map();

        let shortest = codes.iter().map(|(_, c)| c.len()).min().unwrap();
        assert_eq!(codes.get(b'c').unwrap().len(), shortest);
        assert!(codes.get(b'a').unwrap().len() > shortest);
    }

    #[test]
    fn test_single_symbol_tree() {
        let tree = HuffmanTree::build(&FrequencyModel::compute(b"zzzz")).unwrap();
        let codes = tree.code_map();

        assert_eq!(codes.len(), 1);
        assert_eq!(code(&codes, b'z'), "0");
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.internal_count(), 1);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_single_symbol_decode_consumes_one_bit() {
        let tree = HuffmanTree::build(&FrequencyModel::compute(b"q")).unwrap();
        let bits: BitBuffer = [false, false, false].into_iter().collect();

        let mut cursor = 0;
        for expected_cursor in 1..=3 {
            assert_eq!(tree.decode_symbol(&mut cursor, &bits).unwrap(), b'q');
            assert_eq!(cursor, expected_cursor);
        }
    }

    #[test]
    fn test_single_symbol_rejects_one_bit() {
        let tree = HuffmanTree::build(&FrequencyModel::compute(b"q")).unwrap();
        let bits: BitBuffer = [true].into_iter().collect();

        let mut cursor = 0;
        let result = tree.decode_symbol(&mut cursor, &bits);
        assert!(matches!(
            result,
            Err(Error::Huffman(HuffmanError::CorruptStream { position: 0 }))
        ));
    }

    #[test]
    fn test_full_alphabet_uniform() {
        let data: Vec<u8> = (0..=255).collect();
        let tree = HuffmanTree::build(&FrequencyModel::compute(&data)).unwrap();
        let codes = tree.code_map();

        assert_eq!(tree.leaf_count(), 256);
        assert_eq!(tree.internal_count(), 255);
        assert_eq!(codes.len(), 256);
        assert!(codes.iter().all(|(_, c)| c.len() == 8));
        assert!(codes.is_prefix_free());
    }

    #[test]
    fn test_pending_pops_lightest_then_smallest_byte() {
        let entries = [(3u64, 9u8), (1, 200), (3, 2), (1, 7), (2, 0), (3, 5)];
        let pending = |(weight, byte): (u64, u8)| Pending {
            weight,
            min_byte: byte,
            node: Node::Leaf { byte, weight },
        };

        let forward: BinaryHeap<Pending> = entries.iter().copied().map(pending).collect();
        let backward: BinaryHeap<Pending> = entries.iter().rev().copied().map(pending).collect();

        let order = |heap: BinaryHeap<Pending>| -> Vec<(u64, u8)> {
            let mut heap = heap;
            std::iter::from_fn(|| heap.pop())
                .map(|p| (p.weight, p.min_byte))
                .collect()
        };
        let expected = vec![(1, 7), (1, 200), (2, 0), (3, 2), (3, 5), (3, 9)];
        assert_eq!(order(forward), expected);
        assert_eq!(order(backward), expected);
    }

    #[test]
    fn test_tie_break_ignores_insertion_order() {
        use rand::seq::SliceRandom;
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        // Many equal weights, so every merge involves a tie
        let leaves: Vec<(u8, u64)> = (0..40u8).map(|b| (b, 1 + (b as u64 % 4))).collect();
        let reference = HuffmanTree::from_leaves(leaves.iter().copied()).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..20 {
            let mut shuffled = leaves.clone();
            shuffled.shuffle(&mut rng);
            let tree = HuffmanTree::from_leaves(shuffled).unwrap();
            assert_eq!(tree, reference);
        }

        let reversed = HuffmanTree::from_leaves(leaves.iter().rev().copied()).unwrap();
        assert_eq!(reversed.code_map(), reference.code_map());
    }

    #[test]
    fn test_decode_symbol_advances_cursor() {
        let data = [0u8, 1, 1, 2, 1, 2, 1, 2, 2];
        let tree = HuffmanTree::build(&FrequencyModel::compute(&data)).unwrap();

        // "11" -> 1, "0" -> 2, "10" -> 0
        let bits: BitBuffer = "11010".chars().map(|c| c == '1').collect();
        let mut cursor = 0;
        assert_eq!(tree.decode_symbol(&mut cursor, &bits).unwrap(), 1);
        assert_eq!(cursor, 2);
        assert_eq!(tree.decode_symbol(&mut cursor, &bits).unwrap(), 2);
        assert_eq!(cursor, 3);
        assert_eq!(tree.decode_symbol(&mut cursor, &bits).unwrap(), 0);
        assert_eq!(cursor, 5);
    }

    #[test]
    fn test_decode_symbol_truncated() {
        let data = [0u8, 1, 1, 2, 1, 2, 1, 2, 2];
        let tree = HuffmanTree::build(&FrequencyModel::compute(&data)).unwrap();
        let bits: BitBuffer = [true].into_iter().collect();

        let mut cursor = 0;
        assert!(matches!(
            tree.decode_symbol(&mut cursor, &bits),
            Err(Error::Huffman(HuffmanError::CorruptStream { position: 1 }))
        ));
    }

    #[test]
    fn test_skewed_depth() {
        // Fibonacci counts give the deepest possible tree
        let fib = [1u32, 1, 2, 3, 5, 8, 13, 21, 34, 55];
        let model = FrequencyModel::from_counts(fib.iter().enumerate().map(|(i, &c)| (i as u8, c)))
            .unwrap();
        let tree = HuffmanTree::build(&model).unwrap();

        assert_eq!(tree.depth(), 9);
        assert!(tree.code_map().is_prefix_free());
    }

    #[test]
    fn test_code_map_helpers() {
        let model = FrequencyModel::compute(b"abracadabra");
        let codes = HuffmanTree::build(&model).unwrap().code_map();

        let inverse = codes.invert();
        assert_eq!(inverse.len(), codes.len());
        for (byte, code) in codes.iter() {
            assert_eq!(inverse[code], byte);
        }

        let expected: u64 = model
            .iter()
            .map(|(b, c)| c as u64 * codes.get(b).unwrap().len() as u64)
            .sum();
        assert_eq!(codes.encoded_bits(&model), expected);
        assert!(codes.max_len() >= 1);
    }

    #[test]
    fn test_prefix_free_detection() {
        let bits = |s: &str| s.chars().map(|c| c == '1').collect::<BitBuffer>();
        let bad = CodeMap::from_codes([(1, bits("01")), (2, bits("011"))]);
        assert!(!bad.is_prefix_free());

        let good = CodeMap::from_codes([(1, bits("00")), (2, bits("01")), (3, bits("1"))]);
        assert!(good.is_prefix_free());
    }

    #[test]
    fn test_from_code_map_matches_built_tree() {
        let model = FrequencyModel::compute(b"she sells sea shells by the sea shore");
        let built = HuffmanTree::build(&model).unwrap();
        let rebuilt = HuffmanTree::from_code_map(&built.code_map()).unwrap();

        assert_eq!(rebuilt.code_map(), built.code_map());
        assert_eq!(rebuilt.leaf_count(), built.leaf_count());
        assert_eq!(rebuilt.depth(), built.depth());
        assert_eq!(rebuilt.weight(), 0);
    }

    #[test]
    fn test_from_code_map_single_symbol() {
        let built = HuffmanTree::build(&FrequencyModel::compute(b"kkk")).unwrap();
        let rebuilt = HuffmanTree::from_code_map(&built.code_map()).unwrap();

        assert_eq!(rebuilt.internal_count(), 1);
        assert_eq!(code(&rebuilt.code_map(), b'k'), "0");
    }

    #[test]
    fn test_from_code_map_rejects_bad_shapes() {
        let bits = |s: &str| s.chars().map(|c| c == '1').collect::<BitBuffer>();

        let prefix = CodeMap::from_codes([(1, bits("0")), (2, bits("01"))]);
        assert!(matches!(
            HuffmanTree::from_code_map(&prefix),
            Err(Error::Format(FormatError::NotPrefixFree { symbol: 1 }))
        ));

        let right_only = CodeMap::from_codes([(7, bits("1"))]);
        assert!(matches!(
            HuffmanTree::from_code_map(&right_only),
            Err(Error::Format(FormatError::NotPrefixFree { symbol: 7 }))
        ));

        let empty_code = CodeMap::from_codes([(3, BitBuffer::new())]);
        assert!(matches!(
            HuffmanTree::from_code_map(&empty_code),
            Err(Error::Format(FormatError::InvalidCodeWord { symbol: 3 }))
        ));

        assert!(matches!(
            HuffmanTree::from_code_map(&CodeMap::default()),
            Err(Error::Huffman(HuffmanError::EmptyInput))
        ));
    }
}
