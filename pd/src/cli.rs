//! CLI argument parsing for pidigits

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pd")]
#[command(author, version, about = "Generate, pack, search and verify digits of pi", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute digits of pi into chunk files
    Compute {
        /// Number of digits after the decimal point
        #[arg(short, long, required = true)]
        digits: u64,

        /// Digits per output file (default: 1000000)
        #[arg(short = 's', long)]
        chunk_size: Option<usize>,

        /// Directory to store digit chunks
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Extra guard digits for rounding safety (default: 10)
        #[arg(short, long)]
        guard: Option<u32>,

        /// Allow overwriting a non-empty output directory
        #[arg(long)]
        overwrite: bool,
    },

    /// Pack text chunks into a two-digits-per-byte binary
    Pack {
        /// Directory containing text digit chunks
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// Directory to store packed output
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Search for a digit sequence
    Search {
        /// Digit sequence to search for
        #[arg(required = true)]
        pattern: String,

        /// Directory containing the corpus to search
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// Search the packed binary instead of text chunks
        #[arg(short, long)]
        packed: bool,
    },

    /// Create or verify SHA-256 checksums
    Hash {
        /// Directory containing the corpus
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// Checksum file path (default: <input-dir>/checksums.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verify an existing checksum file instead of creating one
        #[arg(long)]
        verify: bool,
    },

    /// Compare an external pi digit file with the generated chunks
    Compare {
        /// Path to the external digit file
        #[arg(short, long, required = true)]
        source: PathBuf,

        /// Directory containing generated digit chunks
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// Write the normalized fractional digits to this path
        #[arg(short, long)]
        normalize_output: Option<PathBuf>,
    },
}
