//! SHA-256 checksum records for a corpus directory
//!
//! The record is plain text, one `"<hex digest>  <filename>"` line per file,
//! starting with the manifest so that edits to it are caught as well.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::HASH_BLOCK_SIZE;
use crate::chunks::list_chunk_files;
use crate::error::{CorpusError, Result};
use crate::manifest::{CorpusManifest, MANIFEST_NAME, load_manifest};

/// Default checksum filename inside a corpus directory
pub const CHECKSUM_NAME: &str = "checksums.txt";

/// A single failed checksum entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumFailure {
    /// Listed file does not exist
    Missing(String),
    /// Listed file hashes to a different digest
    Mismatch(String),
}

impl ChecksumFailure {
    pub fn file_name(&self) -> &str {
        match self {
            ChecksumFailure::Missing(name) | ChecksumFailure::Mismatch(name) => name,
        }
    }
}

impl fmt::Display for ChecksumFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumFailure::Missing(name) => write!(f, "missing {}", name),
            ChecksumFailure::Mismatch(name) => write!(f, "mismatch {}", name),
        }
    }
}

/// Hash a file in fixed-size blocks, returning lowercase hex
pub fn sha256_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| CorpusError::from_io(e, path))?;
    let mut hasher = Sha256::new();
    let mut block = vec![0u8; HASH_BLOCK_SIZE];

    loop {
        match file.read(&mut block) {
            Ok(0) => break,
            Ok(n) => hasher.update(&block[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Files covered by the checksum record, manifest first
fn covered_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let manifest: CorpusManifest = load_manifest(dir)?;
    manifest.validate()?;

    let mut files = vec![dir.join(MANIFEST_NAME)];
    match manifest {
        CorpusManifest::Text(m) => {
            files.extend(list_chunk_files(dir, m.width)?.into_iter().map(|c| c.path));
        }
        CorpusManifest::Packed(m) => files.push(dir.join(m.binary_file)),
    }
    Ok(files)
}

/// Write the checksum record for the corpus in `dir` to `output`
pub fn write_checksums(dir: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let output = output.as_ref();

    let mut content = String::new();
    for path in covered_files(dir)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let digest = sha256_file(&path)?;
        debug!(%name, %digest, "write_checksums: hashed");
        content.push_str(&format!("{}  {}\n", digest, name));
    }

    fs::write(output, content)?;
    info!(?output, "Wrote checksums");
    Ok(output.to_path_buf())
}

/// Verify every entry of a checksum record against the files in `dir`
///
/// All entries are checked; failures are collected into a single
/// [`CorpusError::Integrity`].
pub fn verify_checksums(dir: impl AsRef<Path>, checksum_path: impl AsRef<Path>) -> Result<usize> {
    let dir = dir.as_ref();
    let checksum_path = checksum_path.as_ref();

    let text = fs::read_to_string(checksum_path).map_err(|e| CorpusError::from_io(e, checksum_path))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(CorpusError::Format(format!("{} is empty", checksum_path.display())));
    }

    let mut failures = Vec::new();
    let mut checked = 0;
    for line in text.lines() {
        let Some((digest, name)) = line.split_once("  ") else {
            debug!(line, "verify_checksums: skipping unrecognised line");
            continue;
        };
        checked += 1;

        match sha256_file(dir.join(name)) {
            Ok(actual) if actual.eq_ignore_ascii_case(digest.trim()) => {}
            Ok(_) => failures.push(ChecksumFailure::Mismatch(name.to_string())),
            Err(CorpusError::NotFound { .. }) => failures.push(ChecksumFailure::Missing(name.to_string())),
            Err(e) => return Err(e),
        }
    }

    if !failures.is_empty() {
        warn!(failed = failures.len(), checked, "Checksum verification failed");
        return Err(CorpusError::Integrity { failures });
    }

    info!(checked, "Checksums verified");
    Ok(checked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunks::write_chunks;
    use crate::pack::pack_digits;
    use tempfile::TempDir;

    #[test]
    fn test_sha256_known_value() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("abc");
        fs::write(&path, "abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_record_layout() {
        let temp = TempDir::new().unwrap();
        write_chunks(temp.path(), "1415926535", 4).unwrap();
        let out = temp.path().join(CHECKSUM_NAME);
        write_checksums(temp.path(), &out).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        let names: Vec<&str> = text.lines().map(|l| l.split_once("  ").unwrap().1).collect();
        assert_eq!(
            names,
            vec!["manifest.json", "pi_digits_01_04.txt", "pi_digits_05_08.txt", "pi_digits_09_10.txt"]
        );
        assert!(text.lines().all(|l| l.split_once("  ").unwrap().0.len() == 64));

        assert_eq!(verify_checksums(temp.path(), &out).unwrap(), 4);
    }

    #[test]
    fn test_single_byte_corruption_reports_only_that_file() {
        let temp = TempDir::new().unwrap();
        write_chunks(temp.path(), "14159265358979323846", 5).unwrap();
        let out = temp.path().join(CHECKSUM_NAME);
        write_checksums(temp.path(), &out).unwrap();

        let victim = temp.path().join("pi_digits_06_10.txt");
        let mut bytes = fs::read(&victim).unwrap();
        bytes[2] = if bytes[2] == b'0' { b'1' } else { b'0' };
        fs::write(&victim, bytes).unwrap();

        match verify_checksums(temp.path(), &out).unwrap_err() {
            CorpusError::Integrity { failures } => {
                assert_eq!(failures, vec![ChecksumFailure::Mismatch("pi_digits_06_10.txt".to_string())]);
            }
            other => panic!("expected integrity error, got {other:?}"),
        }
    }

    #[test]
    fn test_failures_are_aggregated() {
        let temp = TempDir::new().unwrap();
        write_chunks(temp.path(), "14159265358979323846", 5).unwrap();
        let out = temp.path().join(CHECKSUM_NAME);
        write_checksums(temp.path(), &out).unwrap();

        fs::remove_file(temp.path().join("pi_digits_01_05.txt")).unwrap();
        fs::write(temp.path().join("manifest.json"), "{}\n").unwrap();

        match verify_checksums(temp.path(), &out).unwrap_err() {
            CorpusError::Integrity { failures } => {
                assert_eq!(failures.len(), 2);
                assert!(failures.contains(&ChecksumFailure::Mismatch("manifest.json".to_string())));
                assert!(failures.contains(&ChecksumFailure::Missing("pi_digits_01_05.txt".to_string())));
            }
            other => panic!("expected integrity error, got {other:?}"),
        }
    }

    #[test]
    fn test_packed_corpus_checksums() {
        let temp = TempDir::new().unwrap();
        let text = temp.path().join("text");
        let packed = temp.path().join("packed");
        write_chunks(&text, "1415926535897", 5).unwrap();
        pack_digits(&text, &packed).unwrap();

        let out = packed.join(CHECKSUM_NAME);
        write_checksums(&packed, &out).unwrap();
        let record = fs::read_to_string(&out).unwrap();
        assert!(record.contains("  manifest.json\n"));
        assert!(record.contains("  pi_digits.bin\n"));
        assert_eq!(verify_checksums(&packed, &out).unwrap(), 2);
    }

    #[test]
    fn test_empty_record_is_format_error() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join(CHECKSUM_NAME);
        fs::write(&out, "\n").unwrap();
        assert!(matches!(verify_checksums(temp.path(), &out), Err(CorpusError::Format(_))));
    }
}
