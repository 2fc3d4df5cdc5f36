//! Configuration for the huffc command line.
//!
//! `Args` is the raw clap surface; `Config` is the validated form the
//! rest of the binary works with.

use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser};
use huffc_core::decoder::DecodeStrategy;
use huffc_core::wire::TableForm;
use huffc_core::{Error, Result};

/// Extension appended to the input name when no output is given.
pub const DEFAULT_EXTENSION: &str = "het";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Parser, Debug)]
#[command(name = "huffc")]
#[command(version)]
#[command(about = "Huffman file compressor", long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["encode", "decode"])))]
pub struct Args {
    /// Compress FILE
    #[arg(short, long, value_name = "FILE")]
    pub encode: Option<PathBuf>,

    /// Decompress FILE1 into FILE2
    #[arg(short, long, num_args = 2, value_names = ["FILE1", "FILE2"])]
    pub decode: Option<Vec<PathBuf>>,

    /// Output path for --encode (default: FILE.het)
    #[arg(short, long, value_name = "OUTPUT", requires = "encode")]
    pub output: Option<PathBuf>,

    /// Table form stored in the file (code-words, frequencies)
    #[arg(short, long, default_value = "code-words")]
    pub table: String,

    /// Decoding strategy (table, tree)
    #[arg(long, default_value = "table")]
    pub strategy: String,

    /// Decode the result in memory and compare CRC-32 with the input
    #[arg(long, requires = "encode")]
    pub verify: bool,

    /// Print compression statistics
    #[arg(long, requires = "encode")]
    pub stats: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// What to do with which files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Encode { input: PathBuf, output: PathBuf },
    Decode { input: PathBuf, output: PathBuf },
}

impl Mode {
    pub fn input(&self) -> &Path {
        match self {
            Mode::Encode { input, .. } | Mode::Decode { input, .. } => input,
        }
    }

    pub fn output(&self) -> &Path {
        match self {
            Mode::Encode { output, .. } | Mode::Decode { output, .. } => output,
        }
    }
}

/// Validated configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub table_form: TableForm,
    pub strategy: DecodeStrategy,
    /// Round-trip check after encoding
    pub verify: bool,
    /// Print the statistics summary after encoding
    pub print_stats: bool,
    /// Lowercase tracing level
    pub log_level: String,
}

impl Config {
    /// Validate parsed arguments.
    ///
    /// # Errors
    /// `Error::Config` for unknown table forms, strategies or log levels,
    /// or when the output path equals the input path.
    pub fn from_args(args: Args) -> Result<Self> {
        let mode = match (args.encode, args.decode) {
            (Some(input), None) => {
                let output = args.output.unwrap_or_else(|| default_output(&input));
                Mode::Encode { input, output }
            }
            (None, Some(files)) => match <[PathBuf; 2]>::try_from(files) {
                Ok([input, output]) => Mode::Decode { input, output },
                Err(_) => return Err(Error::Config("--decode requires FILE1 and FILE2".to_string())),
            },
            _ => {
                return Err(Error::Config(
                    "exactly one of --encode or --decode is required".to_string(),
                ))
            }
        };

        if mode.input() == mode.output() {
            return Err(Error::Config(format!(
                "output would overwrite input: {}",
                mode.input().display()
            )));
        }

        let log_level = args.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(Error::Config(format!("unknown log level: {}", args.log_level)));
        }

        Ok(Config {
            mode,
            table_form: args.table.parse()?,
            strategy: args.strategy.parse()?,
            verify: args.verify,
            print_stats: args.stats,
            log_level,
        })
    }
}

/// `FILE` -> `FILE.het`
pub fn default_output(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(DEFAULT_EXTENSION);
    PathBuf::from(name)
}
