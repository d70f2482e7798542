//! Corpus manifests
//!
//! Every corpus directory carries a `manifest.json` that is the single source
//! of truth for the files around it. Tools never share live state; each one
//! loads and validates the manifest before touching the corpus.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{CorpusError, Result};

/// Manifest filename inside a corpus directory
pub const MANIFEST_NAME: &str = "manifest.json";

/// Current manifest format version
pub const FORMAT_VERSION: u32 = 1;

/// Only supported pack scheme
pub const PACK_SCHEME: &str = "two_digits_per_byte";

/// Filename template recorded in text manifests
pub const FILE_TEMPLATE: &str = "pi_digits_{start}_{end}.txt";

/// Manifest of a chunked text corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextManifest {
    pub format_version: u32,
    /// Total fractional digits across all chunks
    pub digits: u64,
    /// Digits per chunk; the last chunk may be shorter
    pub chunk_size: u64,
    pub index_base: u64,
    pub fractional_only: bool,
    /// Zero-padding width of both range fields in chunk filenames
    pub width: usize,
    pub file_template: String,
}

impl TextManifest {
    pub fn new(digits: u64, chunk_size: u64) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            digits,
            chunk_size,
            index_base: 1,
            fractional_only: true,
            width: digits.to_string().len(),
            file_template: FILE_TEMPLATE.to_string(),
        }
    }

    /// Check the fields every consumer relies on
    pub fn validate(&self) -> Result<()> {
        validate_common(self.format_version, self.index_base, self.fractional_only)?;
        if self.width == 0 {
            return Err(CorpusError::Format("width must be positive".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(CorpusError::Format("chunk_size must be positive".to_string()));
        }
        Ok(())
    }
}

/// Manifest of a packed binary corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedManifest {
    pub format_version: u32,
    /// Real digits encoded; a trailing synthetic zero is not counted
    pub digits: u64,
    pub index_base: u64,
    pub fractional_only: bool,
    pub pack_scheme: String,
    /// Name of the binary file, relative to the manifest
    pub binary_file: String,
}

impl PackedManifest {
    pub fn new(digits: u64, binary_file: impl Into<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            digits,
            index_base: 1,
            fractional_only: true,
            pack_scheme: PACK_SCHEME.to_string(),
            binary_file: binary_file.into(),
        }
    }

    /// Check the fields every consumer relies on; unknown schemes are fatal
    pub fn validate(&self) -> Result<()> {
        if self.pack_scheme != PACK_SCHEME {
            return Err(CorpusError::UnsupportedPackScheme(self.pack_scheme.clone()));
        }
        validate_common(self.format_version, self.index_base, self.fractional_only)
    }

    /// Bytes the binary file must hold for this digit count
    pub fn expected_bytes(&self) -> u64 {
        self.digits.div_ceil(2)
    }
}

/// Either kind of manifest, told apart by its fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorpusManifest {
    Text(TextManifest),
    Packed(PackedManifest),
}

impl CorpusManifest {
    pub fn validate(&self) -> Result<()> {
        match self {
            CorpusManifest::Text(m) => m.validate(),
            CorpusManifest::Packed(m) => m.validate(),
        }
    }

    pub fn digits(&self) -> u64 {
        match self {
            CorpusManifest::Text(m) => m.digits,
            CorpusManifest::Packed(m) => m.digits,
        }
    }
}

fn validate_common(format_version: u32, index_base: u64, fractional_only: bool) -> Result<()> {
    if format_version != FORMAT_VERSION {
        return Err(CorpusError::Format(format!(
            "unsupported format_version {} (expected {})",
            format_version, FORMAT_VERSION
        )));
    }
    if index_base != 1 {
        return Err(CorpusError::Format(format!("index_base must be 1, got {}", index_base)));
    }
    if !fractional_only {
        return Err(CorpusError::Format("fractional_only must be true".to_string()));
    }
    Ok(())
}

/// Write a manifest, replacing any previous one
pub fn write_manifest<T: Serialize>(dir: impl AsRef<Path>, manifest: &T) -> Result<()> {
    let path = dir.as_ref().join(MANIFEST_NAME);
    let mut content = serde_json::to_string_pretty(manifest).map_err(|source| CorpusError::ManifestParse {
        path: path.clone(),
        source,
    })?;
    content.push('\n');
    fs::write(&path, content)?;
    debug!(?path, "Wrote manifest");
    Ok(())
}

/// Load a manifest without validating it
pub fn load_manifest<T: DeserializeOwned>(dir: impl AsRef<Path>) -> Result<T> {
    let path = dir.as_ref().join(MANIFEST_NAME);
    let content = fs::read_to_string(&path).map_err(|e| CorpusError::from_io(e, &path))?;
    serde_json::from_str(&content).map_err(|source| CorpusError::ManifestParse { path, source })
}

/// Load and validate a text corpus manifest
pub fn load_text_manifest(dir: impl AsRef<Path>) -> Result<TextManifest> {
    let manifest: TextManifest = load_manifest(dir)?;
    manifest.validate()?;
    Ok(manifest)
}

/// Load and validate a packed corpus manifest
pub fn load_packed_manifest(dir: impl AsRef<Path>) -> Result<PackedManifest> {
    let manifest: PackedManifest = load_manifest(dir)?;
    manifest.validate()?;
    Ok(manifest)
}
