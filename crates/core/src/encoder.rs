//! Maps a byte buffer to a single bit sequence using a code map.

use crate::bitbuf::BitBuffer;
use crate::error::{HuffmanError, Result};
use crate::tree::CodeMap;

/// Encode `bytes` by appending the code word of each byte in order.
///
/// The output length is the sum of the code word lengths of all input
/// bytes.
///
/// # Errors
/// `HuffmanError::UnknownSymbol` if a byte has no code word. This cannot
/// happen when `codes` was derived from the same input's frequencies.
pub fn encode(codes: &CodeMap, bytes: &[u8]) -> Result<BitBuffer> {
    // Dense lookup so the hot loop does not walk the map
    let table: [Option<&BitBuffer>; 256] = std::array::from_fn(|b| codes.get(b as u8));

    let mut output = BitBuffer::with_capacity(bytes.len());
    for &byte in bytes {
        let code = table[byte as usize].ok_or(HuffmanError::UnknownSymbol(byte))?;
        output.append(code);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::frequency::FrequencyModel;
    use crate::tree::HuffmanTree;

    fn bits(s: &str) -> BitBuffer {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_encode_concatenates_code_words() {
        let codes = CodeMap::from_codes([(b'a', bits("0")), (b'b', bits("10")), (b'c', bits("11"))]);
        let encoded = encode(&codes, b"abca").unwrap();
        assert_eq!(encoded.to_string(), "010110");
    }

    #[test]
    fn test_encode_length_matches_code_lengths() {
        let data = b"mississippi river";
        let model = FrequencyModel::compute(data);
        let codes = HuffmanTree::build(&model).unwrap().code_map();

        let encoded = encode(&codes, data).unwrap();
        let expected: usize = data.iter().map(|&b| codes.get(b).unwrap().len()).sum();
        assert_eq!(encoded.len(), expected);
        assert_eq!(encoded.len() as u64, codes.encoded_bits(&model));
    }

    #[test]
    fn test_encode_unknown_symbol() {
        let codes = CodeMap::from_codes([(b'a', bits("0"))]);
        let result = encode(&codes, b"ab");
        assert!(matches!(
            result,
            Err(Error::Huffman(HuffmanError::UnknownSymbol(b'b')))
        ));
    }

    #[test]
    fn test_encode_empty_input() {
        let codes = CodeMap::from_codes([(b'a', bits("0"))]);
        assert!(encode(&codes, b"").unwrap().is_empty());
    }

    #[test]
    fn test_single_symbol_encodes_one_bit_each() {
        let data = vec![7u8; 100];
        let codes = HuffmanTree::build(&FrequencyModel::compute(&data))
            .unwrap()
            .code_map();
        let encoded = encode(&codes, &data).unwrap();

        assert_eq!(encoded.len(), 100);
        assert!(encoded.iter().all(|bit| !bit));
    }
}
