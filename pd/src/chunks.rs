//! Chunked text store
//!
//! Digits live in files named by the inclusive 1-indexed range they cover,
//! e.g. `pi_digits_0000001_1000000.txt`. Discovery parses filenames into
//! candidates, keeps the longest file for each start position and then
//! insists on contiguity.

use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::error::{CorpusError, Result};
use crate::manifest::{TextManifest, write_manifest};

static CHUNK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^pi_digits_(\d+)_(\d+)\.txt$").expect("chunk name regex"));

/// A chunk file and the inclusive digit range it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFile {
    pub start: u64,
    pub end: u64,
    pub path: PathBuf,
}

impl ChunkFile {
    /// Number of digits the filename promises
    pub fn digit_count(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Filename for the chunk covering `[start, end]`
pub fn chunk_filename(start: u64, end: u64, width: usize) -> String {
    format!("pi_digits_{:0width$}_{:0width$}.txt", start, end, width = width)
}

/// Parse a chunk filename into its `(start, end)` range
pub fn parse_chunk_name(name: &str) -> Option<(u64, u64)> {
    let caps = CHUNK_NAME.captures(name)?;
    let start = caps[1].parse().ok()?;
    let end = caps[2].parse().ok()?;
    Some((start, end))
}

/// Order and validate chunk candidates
///
/// For each start position only the candidate with the largest end survives,
/// so a longer regeneration shadows a shorter leftover. The survivors must
/// then tile the range without gaps or overlaps.
pub fn resolve_chunks(candidates: impl IntoIterator<Item = ChunkFile>) -> Result<Vec<ChunkFile>> {
    let mut by_start: BTreeMap<u64, ChunkFile> = BTreeMap::new();

    for chunk in candidates {
        match by_start.get(&chunk.start) {
            Some(existing) if existing.end >= chunk.end => {
                debug!(discarded = ?chunk.path, kept = ?existing.path, "resolve_chunks: shorter duplicate");
            }
            Some(existing) => {
                debug!(discarded = ?existing.path, kept = ?chunk.path, "resolve_chunks: shorter duplicate");
                by_start.insert(chunk.start, chunk);
            }
            None => {
                by_start.insert(chunk.start, chunk);
            }
        }
    }

    let chunks: Vec<ChunkFile> = by_start.into_values().collect();

    for pair in chunks.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let expected = prev.end + 1;
        if next.start <= prev.end {
            return Err(CorpusError::Overlap {
                expected,
                actual: next.start,
                previous_end: prev.end,
            });
        }
        if next.start > expected {
            return Err(CorpusError::Gap {
                expected,
                actual: next.start,
            });
        }
    }

    Ok(chunks)
}

/// Check that resolved chunks cover exactly `[1, digits]`
pub fn check_coverage(chunks: &[ChunkFile], digits: u64) -> Result<()> {
    let (Some(first), Some(last)) = (chunks.first(), chunks.last()) else {
        return Err(CorpusError::Format(format!("no chunks for {} declared digits", digits)));
    };
    if first.start > 1 {
        return Err(CorpusError::Gap {
            expected: 1,
            actual: first.start,
        });
    }
    if first.start == 0 {
        return Err(CorpusError::Format("chunk ranges are 1-indexed; found start 0".to_string()));
    }
    if last.end != digits {
        return Err(CorpusError::Format(format!(
            "chunks end at digit {} but the manifest declares {}",
            last.end, digits
        )));
    }
    Ok(())
}

fn candidate(dir: &Path, name: &str) -> Option<ChunkFile> {
    let (start, end) = parse_chunk_name(name)?;
    if end < start {
        warn!(name, "Ignoring chunk file with inverted range");
        return None;
    }
    Some(ChunkFile {
        start,
        end,
        path: dir.join(name),
    })
}

/// List chunk files of any padding width, resolved and ordered by start
pub fn list_chunk_files_auto(dir: impl AsRef<Path>) -> Result<Vec<ChunkFile>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| CorpusError::from_io(e, dir))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str()
            && let Some(chunk) = candidate(dir, name)
        {
            candidates.push(chunk);
        }
    }

    let chunks = resolve_chunks(candidates)?;
    debug!(?dir, count = chunks.len(), "list_chunk_files_auto: resolved");
    Ok(chunks)
}

/// List chunk files whose range fields are exactly `width` characters wide
pub fn list_chunk_files(dir: impl AsRef<Path>, width: usize) -> Result<Vec<ChunkFile>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(CorpusError::NotFound { path: dir.to_path_buf() });
    }

    let field = "?".repeat(width);
    let pattern = format!(
        "{}/pi_digits_{field}_{field}.txt",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let paths = glob::glob(&pattern).map_err(|e| CorpusError::Config(format!("Invalid glob pattern: {}", e)))?;

    let mut candidates = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| CorpusError::Io(e.into_error()))?;
        if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && let Some(chunk) = candidate(dir, name)
        {
            candidates.push(chunk);
        }
    }

    resolve_chunks(candidates)
}

/// Read a chunk's digits, checking them against the range in its name
pub fn read_chunk(chunk: &ChunkFile) -> Result<String> {
    let content = fs::read_to_string(&chunk.path).map_err(|e| CorpusError::from_io(e, &chunk.path))?;
    let digits = content.trim();

    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_digit()) {
        return Err(CorpusError::Format(format!(
            "{} contains non-digit character {:?}",
            chunk.path.display(),
            bad
        )));
    }
    if digits.len() as u64 != chunk.digit_count() {
        return Err(CorpusError::Format(format!(
            "{} holds {} digits but its name covers {}",
            chunk.path.display(),
            digits.len(),
            chunk.digit_count()
        )));
    }

    Ok(digits.to_string())
}

/// Split `fractional` into chunk files and write the text manifest
pub fn write_chunks(dir: impl AsRef<Path>, fractional: &str, chunk_size: usize) -> Result<TextManifest> {
    let dir = dir.as_ref();
    if chunk_size == 0 {
        return Err(CorpusError::Config("chunk size must be positive".to_string()));
    }
    if fractional.is_empty() || !fractional.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CorpusError::Config("fractional digits must be a non-empty digit string".to_string()));
    }
    fs::create_dir_all(dir)?;

    let manifest = TextManifest::new(fractional.len() as u64, chunk_size as u64);
    let bytes = fractional.as_bytes();

    let mut count = 0usize;
    for (idx, piece) in bytes.chunks(chunk_size).enumerate() {
        let start = (idx * chunk_size + 1) as u64;
        let end = start + piece.len() as u64 - 1;
        fs::write(dir.join(chunk_filename(start, end, manifest.width)), piece)?;
        count += 1;
    }

    write_manifest(dir, &manifest)?;
    info!(?dir, digits = manifest.digits, chunks = count, "Wrote chunks");
    Ok(manifest)
}
