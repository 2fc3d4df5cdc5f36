//! Binary record serialization and parsing.
//!
//! A record packages the code table with the packed payload so the
//! original bytes can be reconstructed without any side channel.
//!
//! # Record Format
//!
//! ```text
//! +------------------+
//! | Magic (4 bytes)  |  0xC0 0xDE 0x0D 0xDE
//! +------------------+
//! | symbols (4)      |  u32 little-endian, number of table entries
//! +------------------+
//! | payload_bits (4) |  u32 little-endian, number of encoded bits
//! +------------------+
//! | table            |  one entry per distinct byte value
//! | (variable)       |
//! +------------------+
//! | payload          |  ceil(payload_bits / 8) bytes, LSB-first
//! | (variable)       |
//! +------------------+
//! ```
//!
//! # Table Entries
//!
//! The entry layout depends on the `TableForm`, which is not recorded in
//! the file; writer and reader must agree on it.
//!
//! - Code words: `byte (1) | bit_len (1) | code bits (ceil(bit_len / 8))`
//! - Frequencies: `byte (1) | count (4, u32 LE)`; the reader rebuilds the
//!   Huffman tree, whose deterministic tie-break reproduces the writer's
//!   codes.
//!
//! Any read past the end of the input is reported as an invalid format,
//! never a panic. Bytes after the payload are ignored.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::bitbuf::BitBuffer;
use crate::error::{Error, FormatError, Result};
use crate::frequency::FrequencyModel;
use crate::tree::{CodeMap, HuffmanTree};

/// File signature.
pub const MAGIC: [u8; 4] = [0xC0, 0xDE, 0x0D, 0xDE];

/// Signature plus the two 32-bit counts.
pub const HEADER_SIZE: usize = 12;

/// Byte value plus a 32-bit count.
pub const FREQUENCY_ENTRY_SIZE: usize = 5;

/// Which table encoding a record uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableForm {
    /// Self-describing code words; no tree rebuild when reading
    #[default]
    CodeWords,
    /// Raw counts; the reader rebuilds the tree
    Frequencies,
}

impl FromStr for TableForm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "code-words" => Ok(TableForm::CodeWords),
            "frequencies" => Ok(TableForm::Frequencies),
            other => Err(Error::Config(format!("unknown table form: {other}"))),
        }
    }
}

impl fmt::Display for TableForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableForm::CodeWords => write!(f, "code-words"),
            TableForm::Frequencies => write!(f, "frequencies"),
        }
    }
}

/// The table section of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Table {
    CodeWords(CodeMap),
    Frequencies(FrequencyModel),
}

impl Table {
    pub fn form(&self) -> TableForm {
        match self {
            Table::CodeWords(_) => TableForm::CodeWords,
            Table::Frequencies(_) => TableForm::Frequencies,
        }
    }

    /// Number of entries (distinct byte values).
    pub fn len(&self) -> usize {
        match self {
            Table::CodeWords(codes) => codes.len(),
            Table::Frequencies(model) => model.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the table section in bytes.
    pub fn encoded_len(&self) -> usize {
        match self {
            Table::CodeWords(codes) => codes.iter().map(|(_, code)| 2 + code.byte_count()).sum(),
            Table::Frequencies(model) => model.len() * FREQUENCY_ENTRY_SIZE,
        }
    }
}

/// A parsed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub table: Table,
    pub payload: BitBuffer,
}

/// Total size of the serialized record.
pub fn serialized_len(table: &Table, payload: &BitBuffer) -> usize {
    HEADER_SIZE + table.encoded_len() + payload.byte_count()
}

/// Serialize a table and payload into a record.
///
/// # Errors
/// `FormatError::TooLarge` if the payload bit count does not fit in 32
/// bits, or a code word is longer than 255 bits.
pub fn serialize(table: &Table, payload: &BitBuffer) -> Result<Vec<u8>> {
    let symbols = to_u32("symbol count", table.len())?;
    let payload_bits = to_u32("payload bits", payload.len())?;

    // Allocate buffer for entire record
    let total_size = serialized_len(table, payload);
    let mut record = Vec::with_capacity(total_size);

    // Write header
    record.extend_from_slice(&MAGIC);
    record.extend_from_slice(&symbols.to_le_bytes());
    record.extend_from_slice(&payload_bits.to_le_bytes());

    // Write table
    match table {
        Table::CodeWords(codes) => {
            for (byte, code) in codes.iter() {
                let bit_len = u8::try_from(code.len()).map_err(|_| FormatError::TooLarge {
                    field: "code word length",
                    value: code.len(),
                })?;
                record.push(byte);
                record.push(bit_len);
                code.write_bytes(&mut record);
            }
        }
        Table::Frequencies(model) => {
            for (byte, count) in model.iter() {
                record.push(byte);
                record.extend_from_slice(&count.to_le_bytes());
            }
        }
    }

    // Write payload
    payload.write_bytes(&mut record);

    debug_assert_eq!(record.len(), total_size);
    debug!(
        form = ?table.form(),
        symbols,
        payload_bits,
        bytes = record.len(),
        "serialized record"
    );
    Ok(record)
}

/// Parse a record written with table form `form`.
///
/// # Errors
/// A `FormatError` (invalid format) when the input is shorter than a
/// header field, the signature does not match, any table or payload read
/// runs past the end, or the table itself is malformed.
pub fn deserialize(bytes: &[u8], form: TableForm) -> Result<Record> {
    check_len(bytes, 4, "signature")?;
    let mut signature = [0u8; 4];
    signature.copy_from_slice(&bytes[0..4]);
    if signature != MAGIC {
        return Err(FormatError::BadSignature { actual: signature }.into());
    }

    check_len(bytes, 8, "symbol count")?;
    check_len(bytes, HEADER_SIZE, "payload bit count")?;

    let mut reader = Reader::new(bytes, 4);
    let symbols = reader.u32_le("header")?;
    let payload_bits = reader.u32_le("header")? as usize;
    if symbols == 0 {
        return Err(FormatError::EmptyTable.into());
    }

    let table = match form {
        TableForm::CodeWords => Table::CodeWords(read_code_words(&mut reader, symbols)?),
        TableForm::Frequencies => Table::Frequencies(read_frequencies(&mut reader, symbols)?),
    };

    let offset = reader.offset;
    let packed = reader.take(payload_bits.div_ceil(8), "payload")?;
    let payload = BitBuffer::from_bytes(packed, payload_bits)
        .ok_or(FormatError::Truncated {
            section: "payload",
            offset,
        })?;

    debug!(
        ?form,
        symbols,
        payload_bits,
        trailing = bytes.len() - reader.offset,
        "parsed record"
    );
    Ok(Record { table, payload })
}

fn read_code_words(reader: &mut Reader<'_>, symbols: u32) -> Result<CodeMap> {
    let mut pairs: Vec<(u8, BitBuffer)> = Vec::new();
    let mut seen = [false; 256];

    for _ in 0..symbols {
        let byte = reader.u8("table")?;
        let bit_len = reader.u8("table")? as usize;
        if bit_len == 0 {
            return Err(FormatError::InvalidCodeWord { symbol: byte }.into());
        }

        let offset = reader.offset;
        let packed = reader.take(bit_len.div_ceil(8), "table")?;
        let code = BitBuffer::from_bytes(packed, bit_len).ok_or(FormatError::Truncated {
            section: "table",
            offset,
        })?;

        if std::mem::replace(&mut seen[byte as usize], true) {
            return Err(FormatError::DuplicateSymbol(byte).into());
        }
        pairs.push((byte, code));
    }

    let codes = CodeMap::from_codes(pairs);
    if !codes.is_prefix_free() {
        let symbol = first_prefix_violation(&codes);
        return Err(FormatError::NotPrefixFree { symbol }.into());
    }
    // Table-walk and tree-walk must accept the same tables
    HuffmanTree::from_code_map(&codes)?;
    Ok(codes)
}

fn read_frequencies(reader: &mut Reader<'_>, symbols: u32) -> Result<FrequencyModel> {
    let mut pairs = Vec::new();
    for _ in 0..symbols {
        let byte = reader.u8("table")?;
        let count = reader.u32_le("table")?;
        if count == 0 {
            return Err(FormatError::ZeroCount { symbol: byte }.into());
        }
        pairs.push((byte, count));
    }
    FrequencyModel::from_counts(pairs)
}

/// Byte value of a code word that is a prefix of another one.
fn first_prefix_violation(codes: &CodeMap) -> u8 {
    codes
        .iter()
        .find(|(byte, code)| {
            codes
                .iter()
                .any(|(other, longer)| other != *byte && longer.starts_with(code))
        })
        .map_or(0, |(byte, _)| byte)
}

fn check_len(bytes: &[u8], required: usize, section: &'static str) -> Result<()> {
    if bytes.len() < required {
        return Err(FormatError::TooShort {
            section,
            required,
            actual: bytes.len(),
        }
        .into());
    }
    Ok(())
}

fn to_u32(field: &'static str, value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| FormatError::TooLarge { field, value }.into())
}

/// Bounds-checked little-endian reader over a byte slice.
struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    fn take(&mut self, n: usize, section: &'static str) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(FormatError::Truncated {
                section,
                offset: self.offset,
            })?;
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn u8(&mut self, section: &'static str) -> Result<u8> {
        Ok(self.take(1, section)?[0])
    }

    fn u32_le(&mut self, section: &'static str) -> Result<u32> {
        let raw = self.take(4, section)?;
        Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }
}
