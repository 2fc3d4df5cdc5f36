//! End-to-end pipeline: bytes to record and back.
//!
//! ```text
//! compress:   bytes -> FrequencyModel -> HuffmanTree -> CodeMap
//!                   -> encode -> serialize -> record bytes
//! decompress: record bytes -> deserialize -> (tree | code map)
//!                   -> decode -> bytes
//! ```
//!
//! Either the whole output is returned or an error; no partial output.

use tracing::debug;

use crate::decoder::{decode_with_table, decode_with_tree, DecodeStrategy};
use crate::encoder::encode;
use crate::error::Result;
use crate::frequency::FrequencyModel;
use crate::stats::CompressionStats;
use crate::tree::HuffmanTree;
use crate::wire::{self, Record, Table, TableForm};

/// Compress `data` into a serialized record.
///
/// # Errors
/// `HuffmanError::EmptyInput` for empty `data`; `FormatError::TooLarge` if
/// the payload bit count does not fit the header.
pub fn compress(data: &[u8], form: TableForm) -> Result<Vec<u8>> {
    compress_with_stats(data, form).map(|(record, _)| record)
}

/// Compress `data` and report statistics about the run.
pub fn compress_with_stats(data: &[u8], form: TableForm) -> Result<(Vec<u8>, CompressionStats)> {
    let mut stats = CompressionStats::new(form);

    let model = FrequencyModel::compute(data);
    let tree = HuffmanTree::build(&model)?;
    let codes = tree.code_map();
    stats.record_input(data, &model, &codes);

    let payload = encode(&codes, data)?;
    let table = match form {
        TableForm::CodeWords => Table::CodeWords(codes),
        TableForm::Frequencies => Table::Frequencies(model),
    };
    let record = wire::serialize(&table, &payload)?;

    stats.record_output(payload.len(), table.encoded_len(), record.len());
    stats.complete();

    debug!(
        input = data.len(),
        output = record.len(),
        symbols = stats.distinct_symbols,
        payload_bits = payload.len(),
        table = %form,
        "compressed"
    );
    Ok((record, stats))
}

/// Parse a serialized record and decode its payload.
///
/// # Errors
/// Any `FormatError` from parsing, or `HuffmanError::CorruptStream` if the
/// payload does not resolve to whole code words.
pub fn decompress(bytes: &[u8], form: TableForm, strategy: DecodeStrategy) -> Result<Vec<u8>> {
    let record = wire::deserialize(bytes, form)?;
    let output = decode_record(&record, strategy)?;

    debug!(
        input = bytes.len(),
        output = output.len(),
        table = %form,
        strategy = ?strategy,
        "decompressed"
    );
    Ok(output)
}

/// Decode the payload of a parsed record.
///
/// A code-word table is used directly by table-walk, or turned back into a
/// tree for tree-walk. A frequency table always rebuilds the tree first.
pub fn decode_record(record: &Record, strategy: DecodeStrategy) -> Result<Vec<u8>> {
    let payload = &record.payload;
    match (&record.table, strategy) {
        (Table::CodeWords(codes), DecodeStrategy::Table) => decode_with_table(codes, payload),
        (Table::CodeWords(codes), DecodeStrategy::Tree) => {
            decode_with_tree(&HuffmanTree::from_code_map(codes)?, payload)
        }
        (Table::Frequencies(model), DecodeStrategy::Table) => {
            decode_with_table(&HuffmanTree::build(model)?.code_map(), payload)
        }
        (Table::Frequencies(model), DecodeStrategy::Tree) => {
            decode_with_tree(&HuffmanTree::build(model)?, payload)
        }
    }
}
