//! Digit pattern search over either corpus representation
//!
//! Positions are 1-indexed from the first fractional digit. "Not found" is
//! `Ok(None)`; errors are reserved for unreadable or inconsistent corpora.

use std::path::Path;
use tracing::{debug, info};

use crate::DEFAULT_BLOCK_SIZE;
use crate::chunks::{check_coverage, list_chunk_files_auto, read_chunk};
use crate::error::{CorpusError, Result};
use crate::manifest::load_text_manifest;
use crate::pack::PackedCorpus;

/// Reduce a user pattern to its fractional digits
///
/// `"3.14159"` becomes `"14159"`; anything that is not a digit is dropped.
pub fn normalize_pattern(raw: &str) -> Result<String> {
    let tail = match raw.split_once('.') {
        Some((_, after)) => after,
        None => raw,
    };
    let digits: String = tail.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(CorpusError::InvalidPattern(format!("{:?} contains no digits", raw)));
    }
    Ok(digits)
}

/// Find the first occurrence of `pattern` in a chunked text corpus
///
/// The last `len(pattern) - 1` digits of each chunk are carried into the
/// next, so matches straddling a chunk boundary are found.
pub fn search_chunks(dir: impl AsRef<Path>, pattern: &str) -> Result<Option<u64>> {
    let dir = dir.as_ref();
    let pattern = normalize_pattern(pattern)?;

    let manifest = load_text_manifest(dir)?;
    let chunks = list_chunk_files_auto(dir)?;
    if chunks.is_empty() {
        return Err(CorpusError::NotFound {
            path: dir.join("pi_digits_*.txt"),
        });
    }
    check_coverage(&chunks, manifest.digits)?;

    let keep = pattern.len() - 1;
    let mut carry = String::new();
    let mut processed = 0u64;

    for chunk in &chunks {
        let data = read_chunk(chunk)?;
        let mut combined = std::mem::take(&mut carry);
        let carry_len = combined.len() as u64;
        combined.push_str(&data);

        if let Some(idx) = combined.find(&pattern) {
            let position = processed - carry_len + idx as u64 + 1;
            info!(%pattern, position, "Pattern found in text corpus");
            return Ok(Some(position));
        }

        processed += data.len() as u64;
        carry = combined.split_off(combined.len().saturating_sub(keep));
        debug!(start = chunk.start, carry = carry.len(), "search_chunks: chunk scanned");
    }

    info!(%pattern, processed, "Pattern not found in text corpus");
    Ok(None)
}

/// Knuth-Morris-Pratt automaton over decimal digits
#[derive(Debug, Clone)]
pub struct Kmp {
    pattern: Vec<u8>,
    lps: Vec<usize>,
    matched: usize,
}

impl Kmp {
    /// Build the automaton for an ASCII digit pattern
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() || !pattern.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CorpusError::InvalidPattern(format!("{:?} is not a digit string", pattern)));
        }
        let pattern: Vec<u8> = pattern.bytes().map(|b| b - b'0').collect();
        let lps = build_lps(&pattern);
        Ok(Self {
            pattern,
            lps,
            matched: 0,
        })
    }

    pub fn pattern_len(&self) -> usize {
        self.pattern.len()
    }

    /// Feed one digit (0..=9); true when a full match ends at it
    pub fn feed(&mut self, digit: u8) -> bool {
        while self.matched > 0 && digit != self.pattern[self.matched] {
            self.matched = self.lps[self.matched - 1];
        }
        if digit == self.pattern[self.matched] {
            self.matched += 1;
            if self.matched == self.pattern.len() {
                self.matched = self.lps[self.matched - 1];
                return true;
            }
        }
        false
    }
}

/// Longest proper prefix that is also a suffix, for each prefix length
fn build_lps(pattern: &[u8]) -> Vec<usize> {
    let mut lps = vec![0; pattern.len()];
    let mut len = 0;
    let mut i = 1;
    while i < pattern.len() {
        if pattern[i] == pattern[len] {
            len += 1;
            lps[i] = len;
            i += 1;
        } else if len > 0 {
            len = lps[len - 1];
        } else {
            lps[i] = 0;
            i += 1;
        }
    }
    lps
}

/// Find the first occurrence of `pattern` in a packed corpus
pub fn search_packed(dir: impl AsRef<Path>, pattern: &str) -> Result<Option<u64>> {
    search_packed_with(dir, pattern, DEFAULT_BLOCK_SIZE)
}

/// [`search_packed`] reading `block_size` bytes at a time
pub fn search_packed_with(dir: impl AsRef<Path>, pattern: &str, block_size: usize) -> Result<Option<u64>> {
    let pattern = normalize_pattern(pattern)?;
    let corpus = PackedCorpus::open(dir)?;
    let mut kmp = Kmp::new(&pattern)?;
    let len = kmp.pattern_len() as u64;

    let mut digits = corpus.digits(block_size)?;
    while let Some(digit) = digits.next() {
        if kmp.feed(digit?) {
            let position = digits.position() - len + 1;
            info!(%pattern, position, "Pattern found in packed corpus");
            return Ok(Some(position));
        }
    }

    info!(%pattern, digits = corpus.manifest.digits, "Pattern not found in packed corpus");
    Ok(None)
}
