//! Comparison against an external reference expansion

use std::path::Path;
use tracing::info;

use crate::chunks::{check_coverage, list_chunk_files, read_chunk};
use crate::error::Result;
use crate::manifest::load_text_manifest;

/// Length of the excerpts reported around a mismatch
const EXCERPT_LEN: usize = 10;

/// Outcome of comparing generated digits with a reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    Match,
    Mismatch {
        /// 1-indexed position of the first differing digit
        position: u64,
        /// Reference digits from the mismatch on
        source: String,
        /// Generated digits from the mismatch on
        generated: String,
    },
}

impl Comparison {
    pub fn is_match(&self) -> bool {
        matches!(self, Comparison::Match)
    }
}

/// Pull the fractional digits out of free-form reference text
///
/// Takes what follows the first `"3."`, else the first `.`, else the whole
/// text, and keeps only ASCII digits.
pub fn extract_fractional(text: &str) -> String {
    let tail = if let Some(idx) = text.find("3.") {
        &text[idx + 2..]
    } else if let Some(idx) = text.find('.') {
        &text[idx + 1..]
    } else {
        text
    };
    tail.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn excerpt(s: &str, from: usize) -> String {
    s.get(from..).unwrap_or("").chars().take(EXCERPT_LEN).collect()
}

/// Compare reference digits with generated chunks in corpus order
///
/// Both sides must have the same length; a longer or shorter reference is
/// reported as a mismatch at the first position one side lacks.
pub fn compare_digits<I>(source: &str, chunks: I) -> Result<Comparison>
where
    I: IntoIterator<Item = Result<String>>,
{
    let source_bytes = source.as_bytes();
    let mut offset = 0usize;

    for chunk in chunks {
        let chunk = chunk?;
        if offset + chunk.len() > source_bytes.len() {
            let diverge = chunk
                .bytes()
                .zip(&source_bytes[offset..])
                .position(|(g, s)| g != *s)
                .unwrap_or(source_bytes.len() - offset);
            return Ok(Comparison::Mismatch {
                position: (offset + diverge) as u64 + 1,
                source: excerpt(source, offset + diverge),
                generated: excerpt(&chunk, diverge),
            });
        }

        if let Some(i) = chunk
            .bytes()
            .zip(&source_bytes[offset..])
            .position(|(g, s)| g != *s)
        {
            return Ok(Comparison::Mismatch {
                position: (offset + i) as u64 + 1,
                source: excerpt(source, offset + i),
                generated: excerpt(&chunk, i),
            });
        }
        offset += chunk.len();
    }

    if offset != source_bytes.len() {
        return Ok(Comparison::Mismatch {
            position: offset as u64 + 1,
            source: excerpt(source, offset),
            generated: String::new(),
        });
    }
    Ok(Comparison::Match)
}

/// Compare a text corpus on disk with reference digits
pub fn compare_corpus(dir: impl AsRef<Path>, source: &str) -> Result<Comparison> {
    let dir = dir.as_ref();
    let manifest = load_text_manifest(dir)?;
    let chunks = list_chunk_files(dir, manifest.width)?;
    check_coverage(&chunks, manifest.digits)?;

    let result = compare_digits(source, chunks.iter().map(read_chunk))?;
    match &result {
        Comparison::Match => info!(digits = manifest.digits, "Corpus matches reference"),
        Comparison::Mismatch { position, .. } => info!(position, "Corpus differs from reference"),
    }
    Ok(result)
}
