//! Configuration for pidigits

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the chunked text corpus
    #[serde(rename = "text-dir")]
    pub text_dir: PathBuf,

    /// Directory holding the packed binary corpus
    #[serde(rename = "packed-dir")]
    pub packed_dir: PathBuf,

    /// Digits per text chunk
    #[serde(rename = "chunk-size")]
    pub chunk_size: usize,

    /// Guard digits carried past the requested precision
    pub guard: u32,

    /// Bytes read per block when streaming the packed binary
    #[serde(rename = "block-size")]
    pub block_size: usize,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            text_dir: PathBuf::from("data/pi_digits"),
            packed_dir: PathBuf::from("data/pi_packed"),
            chunk_size: crate::DEFAULT_CHUNK_SIZE,
            guard: crate::DEFAULT_GUARD,
            block_size: crate::DEFAULT_BLOCK_SIZE,
            log_level: None,
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    ///
    /// Order: explicit path, `./pidigits.yml`, `<config_dir>/pidigits/pidigits.yml`.
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::load_from_file(config_path)
                .context(format!("Failed to load config from {}", config_path.display()));
        }

        let default_paths = [
            Some(PathBuf::from("pidigits.yml")),
            dirs::config_dir().map(|p| p.join("pidigits").join("pidigits.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Config::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
