//! Compression statistics.
//!
//! `CompressionStats` records what one compression run did: sizes, the
//! shape of the code, how close it came to the entropy bound, a CRC-32 of
//! the input for later verification, and timing.
//!
//! The struct is plain data filled in by the pipeline; it is not shared
//! between runs or threads.

use std::time::{Duration, Instant};

use crate::frequency::FrequencyModel;
use crate::tree::CodeMap;
use crate::wire::TableForm;

/// Statistics for a single compression run.
#[derive(Debug, Clone)]
pub struct CompressionStats {
    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Sizes ===
    /// Bytes of uncompressed input
    pub input_bytes: u64,

    /// Bytes of the serialized record
    pub output_bytes: u64,

    /// Bytes taken by the table section
    pub table_bytes: u64,

    /// Encoded payload length in bits
    pub payload_bits: u64,

    // === Code ===
    /// Table encoding used for the record
    pub table_form: TableForm,

    /// Number of distinct byte values in the input
    pub distinct_symbols: usize,

    /// Longest code word in bits
    pub max_code_len: usize,

    /// Shannon entropy of the input, bits per byte
    pub entropy_bits: f64,

    /// Payload bits per input byte
    pub average_code_len: f64,

    // === Integrity ===
    /// CRC-32 of the uncompressed input
    pub input_crc32: u32,
}

impl CompressionStats {
    /// Start a new run with the clock set to now.
    pub fn new(table_form: TableForm) -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            input_bytes: 0,
            output_bytes: 0,
            table_bytes: 0,
            payload_bits: 0,
            table_form,
            distinct_symbols: 0,
            max_code_len: 0,
            entropy_bits: 0.0,
            average_code_len: 0.0,
            input_crc32: 0,
        }
    }

    /// Record the input and the code derived from it.
    pub fn record_input(&mut self, input: &[u8], model: &FrequencyModel, codes: &CodeMap) {
        self.input_bytes = input.len() as u64;
        self.input_crc32 = crc32fast::hash(input);
        self.distinct_symbols = model.len();
        self.entropy_bits = model.entropy_bits();
        self.max_code_len = codes.max_len();
    }

    /// Record the encoded payload and the finished record.
    pub fn record_output(&mut self, payload_bits: usize, table_bytes: usize, output_bytes: usize) {
        self.payload_bits = payload_bits as u64;
        self.table_bytes = table_bytes as u64;
        self.output_bytes = output_bytes as u64;
        self.average_code_len = if self.input_bytes == 0 {
            0.0
        } else {
            self.payload_bits as f64 / self.input_bytes as f64
        };
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Output size over input size, 0.0 if nothing was compressed.
    ///
    /// Small inputs can exceed 1.0 because of the header and table.
    pub fn compression_ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            self.output_bytes as f64 / self.input_bytes as f64
        }
    }

    /// Fraction of the input size saved; negative when the record grew.
    pub fn space_savings(&self) -> f64 {
        if self.input_bytes == 0 {
            0.0
        } else {
            1.0 - self.compression_ratio()
        }
    }

    /// Entropy over average code length, at most 1.0 for a Huffman code.
    pub fn efficiency(&self) -> f64 {
        if self.average_code_len == 0.0 {
            0.0
        } else {
            self.entropy_bits / self.average_code_len
        }
    }

    /// Input bytes per second.
    pub fn throughput_bps(&self) -> f64 {
        let duration_secs = self.duration().as_secs_f64();
        if duration_secs == 0.0 {
            0.0
        } else {
            self.input_bytes as f64 / duration_secs
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Compression Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!();

        println!("Input:  {} bytes ({:.2} KiB)", self.input_bytes, self.input_bytes as f64 / 1024.0);
        println!("Output: {} bytes ({:.2} KiB)", self.output_bytes, self.output_bytes as f64 / 1024.0);
        println!("Ratio: {:.1}% (saved {:.1}%)", self.compression_ratio() * 100.0, self.space_savings() * 100.0);
        println!("CRC-32: {:08x}", self.input_crc32);
        println!();

        println!("=== Code ===");
        println!("Table form: {}", self.table_form);
        println!("Table: {} bytes", self.table_bytes);
        println!("Distinct symbols: {}", self.distinct_symbols);
        println!("Payload: {} bits", self.payload_bits);
        println!("Longest code word: {} bits", self.max_code_len);
        println!("Entropy: {:.4} bits/byte", self.entropy_bits);
        println!("Average code length: {:.4} bits/byte", self.average_code_len);
        println!("Efficiency: {:.1}%", self.efficiency() * 100.0);
        println!();

        println!("=== Performance ===");
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
        println!();
    }

    /// Export as `key=value` lines (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             input_bytes={}\n\
             output_bytes={}\n\
             table_form={}\n\
             table_bytes={}\n\
             payload_bits={}\n\
             distinct_symbols={}\n\
             max_code_len={}\n\
             entropy_bits={:.4}\n\
             average_code_len={:.4}\n\
             compression_ratio={:.4}\n\
             input_crc32={:08x}\n",
            self.duration().as_millis(),
            self.input_bytes,
            self.output_bytes,
            self.table_form,
            self.table_bytes,
            self.payload_bits,
            self.distinct_symbols,
            self.max_code_len,
            self.entropy_bits,
            self.average_code_len,
            self.compression_ratio(),
            self.input_crc32,
        )
    }
}

impl Default for CompressionStats {
    fn default() -> Self {
        Self::new(TableForm::default())
    }
}
