//! huffc: Huffman file compressor
//!
//! ## Usage
//!
//! ```bash
//! # Compress (writes notes.txt.het)
//! huffc -e notes.txt
//!
//! # Compress with a frequency table, check the round trip, show statistics
//! huffc -e notes.txt -o notes.het -t frequencies --verify --stats
//!
//! # Decompress (the table form must match the one used to compress)
//! huffc -d notes.het notes.out -t frequencies
//! ```

mod config;

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use huffc_core::codec::{compress_with_stats, decompress};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::{Args, Config, Mode};

/// Failures reported by the binary.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] huffc_core::Error),

    #[error("verification failed: input crc32 {expected:08x}, restored crc32 {actual:08x}")]
    Verification { expected: u32, actual: u32 },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Core(err.into())
    }
}

fn main() -> ExitCode {
    let config = match Config::from_args(Args::parse()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("huffc: {err}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.log_level);
    debug!(
        input = %config.mode.input().display(),
        output = %config.mode.output().display(),
        table = %config.table_form,
        strategy = ?config.strategy,
        "resolved configuration"
    );

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("huffc: {}: {err}", config.mode.input().display());
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr subscriber; `RUST_LOG` overrides `--log-level`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: &Config) -> Result<(), CliError> {
    match &config.mode {
        Mode::Encode { input, output } => {
            let data = fs::read(input)?;
            let (record, stats) = compress_with_stats(&data, config.table_form)?;

            if config.verify {
                verify(config, &record, stats.input_crc32)?;
            }

            fs::write(output, &record)?;
            info!(output = %output.display(), bytes = record.len(), "wrote record");
            println!(
                "{} -> {} ({} -> {} bytes)",
                input.display(),
                output.display(),
                data.len(),
                record.len()
            );

            if config.print_stats {
                stats.print_summary();
            }
        }
        Mode::Decode { input, output } => {
            let record = fs::read(input)?;
            let data = decompress(&record, config.table_form, config.strategy)?;

            fs::write(output, &data)?;
            info!(output = %output.display(), bytes = data.len(), "wrote restored data");
            println!(
                "{} -> {} ({} -> {} bytes)",
                input.display(),
                output.display(),
                record.len(),
                data.len()
            );
        }
    }
    Ok(())
}

/// Decode `record` in memory and compare its CRC-32 with the input's.
fn verify(config: &Config, record: &[u8], expected: u32) -> Result<(), CliError> {
    let restored = decompress(record, config.table_form, config.strategy)?;
    let actual = crc32fast::hash(&restored);
    if actual != expected {
        return Err(CliError::Verification { expected, actual });
    }
    info!(crc32 = %format!("{actual:08x}"), "verified round trip");
    Ok(())
}
