//! Corpus generation: compute digits, then lay them out as chunks

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::chunks::write_chunks;
use crate::digits::compute_pi_digits;
use crate::error::{CorpusError, Result};
use crate::manifest::TextManifest;

/// Options for a generation run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Fractional digits to produce
    pub digits: u64,
    /// Digits per chunk file
    pub chunk_size: usize,
    /// Extra digits carried to absorb rounding
    pub guard: u32,
    /// Replace an existing non-empty output directory
    pub overwrite: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            digits: 0,
            chunk_size: crate::DEFAULT_CHUNK_SIZE,
            guard: crate::DEFAULT_GUARD,
            overwrite: false,
        }
    }
}

impl GenerateOptions {
    pub fn validate(&self) -> Result<()> {
        if self.digits == 0 {
            return Err(CorpusError::Config("digits must be positive".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(CorpusError::Config("chunk size must be positive".to_string()));
        }
        Ok(())
    }
}

/// Make `dir` ready for a fresh corpus
///
/// A non-empty directory is refused unless `overwrite` is set, in which case
/// its contents are removed so nothing from an earlier run survives.
fn prepare_output_dir(dir: &Path, overwrite: bool) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        return Ok(());
    }

    let entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    if entries.is_empty() {
        return Ok(());
    }
    if !overwrite {
        return Err(CorpusError::Config(format!(
            "{} is not empty; pass overwrite to replace it",
            dir.display()
        )));
    }

    for entry in entries {
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        debug!(?path, "prepare_output_dir: removed");
    }
    Ok(())
}

/// Generate a chunked text corpus in `dir`
pub fn generate_corpus(dir: impl AsRef<Path>, options: &GenerateOptions) -> Result<TextManifest> {
    let dir = dir.as_ref();
    options.validate()?;
    prepare_output_dir(dir, options.overwrite)?;

    info!(digits = options.digits, guard = options.guard, "Computing digits of pi");
    let pi = compute_pi_digits(options.digits, options.guard)?;

    info!(?dir, chunk_size = options.chunk_size, "Writing chunks");
    write_chunks(dir, &pi.fractional, options.chunk_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunks::{list_chunk_files, read_chunk};
    use tempfile::TempDir;

    fn options(digits: u64, chunk_size: usize) -> GenerateOptions {
        GenerateOptions {
            digits,
            chunk_size,
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_small_corpus() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("pi");
        let manifest = generate_corpus(&dir, &options(50, 20)).unwrap();
        assert_eq!(manifest.digits, 50);
        assert_eq!(manifest.width, 2);

        let chunks = list_chunk_files(&dir, manifest.width).unwrap();
        let text: String = chunks.iter().map(|c| read_chunk(c).unwrap()).collect();
        assert_eq!(text, "14159265358979323846264338327950288419716939937510");
    }

    #[test]
    fn test_refuses_non_empty_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("stray.txt"), "x").unwrap();

        let err = generate_corpus(temp.path(), &options(10, 5)).unwrap_err();
        assert!(matches!(err, CorpusError::Config(_)));
        assert!(temp.path().join("stray.txt").exists());
    }

    #[test]
    fn test_overwrite_replaces_everything() {
        let temp = TempDir::new().unwrap();
        generate_corpus(temp.path(), &options(30, 7)).unwrap();

        let mut opts = options(12, 5);
        opts.overwrite = true;
        let manifest = generate_corpus(temp.path(), &opts).unwrap();
        assert_eq!(manifest.digits, 12);

        let chunks = list_chunk_files(temp.path(), manifest.width).unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(!temp.path().join("pi_digits_01_07.txt").exists());
    }

    #[test]
    fn test_invalid_options() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            generate_corpus(temp.path(), &options(0, 5)),
            Err(CorpusError::Config(_))
        ));
        assert!(matches!(
            generate_corpus(temp.path(), &options(10, 0)),
            Err(CorpusError::Config(_))
        ));
    }
}
