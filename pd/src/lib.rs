//! pidigits - chunked pi digit corpus
//!
//! Generates the fractional digits of pi with Chudnovsky binary splitting,
//! stores them as range-named text chunks, packs them two digits per byte,
//! and searches or verifies either representation without ever holding the
//! whole corpus in memory.
//!
//! # Architecture
//!
//! ```text
//! data/pi_digits/
//! ├── manifest.json                  # TextManifest
//! ├── pi_digits_0000001_1000000.txt
//! ├── pi_digits_1000001_2000000.txt
//! ├── ...
//! └── checksums.txt                  # optional, "<sha256>  <name>" lines
//!
//! data/pi_packed/
//! ├── manifest.json                  # PackedManifest
//! └── pi_digits.bin                  # one byte (0..=99) per digit pair
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pidigits::{GenerateOptions, generate_corpus, pack_digits, search_packed};
//!
//! generate_corpus("data/pi_digits", &GenerateOptions { digits: 1_000_000, ..Default::default() })?;
//! pack_digits("data/pi_digits", "data/pi_packed")?;
//! let position = search_packed("data/pi_packed", "999999")?;
//! ```

pub mod checksum;
pub mod chunks;
pub mod cli;
pub mod compare;
pub mod config;
pub mod digits;
pub mod error;
pub mod generate;
pub mod manifest;
pub mod pack;
pub mod search;
pub mod series;

pub use checksum::{ChecksumFailure, sha256_file, verify_checksums, write_checksums};
pub use chunks::{ChunkFile, chunk_filename, list_chunk_files, list_chunk_files_auto, read_chunk, write_chunks};
pub use compare::{Comparison, compare_corpus, compare_digits, extract_fractional};
pub use digits::{PiDigits, compute_pi_digits};
pub use error::{CorpusError, Result};
pub use generate::{GenerateOptions, generate_corpus};
pub use manifest::{CorpusManifest, PackedManifest, TextManifest, load_manifest, write_manifest};
pub use pack::{PackWriter, PackedCorpus, PackedDigits, decode_byte, pack_digits};
pub use search::{Kmp, normalize_pattern, search_chunks, search_packed};
pub use series::{Triple, binary_split, terms_for_digits};

/// Default digits per text chunk
pub const DEFAULT_CHUNK_SIZE: usize = 1_000_000;

/// Default guard digits carried past the requested precision
pub const DEFAULT_GUARD: u32 = 10;

/// Default read block for the packed binary (4MB)
pub const DEFAULT_BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// Read block for checksum hashing (1MB)
pub const HASH_BLOCK_SIZE: usize = 1024 * 1024;
