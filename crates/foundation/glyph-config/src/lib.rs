//! # glyph-config
//!
//! Configuration for the glyph codec, read from YAML.
//!
//! ```yaml
//! # ~/.config/glyph/config.yaml
//! codec:
//!   residue: pass_through      # or: reject (default)
//! codebook: ~/glyphs/book.yaml # optional custom table
//! draft_path: /tmp/drafts.json # optional, defaults to the data dir
//! ```
//!
//! A missing config file is not an error: defaults apply.

use std::path::{Path, PathBuf};

use glyph_core::{CodecConfig, Codebook, CodebookError, CodebookTable};
use serde::{Deserialize, Serialize};

/// Result type for glyph-config operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid codebook {path}: {source}")]
    Codebook {
        path: PathBuf,
        #[source]
        source: CodebookError,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphConfig {
    pub codec: CodecConfig,
    /// Custom codebook table; the standard codebook when unset
    pub codebook: Option<PathBuf>,
    /// Draft file; `<data_dir>/glyph/drafts.json` when unset
    pub draft_path: Option<PathBuf>,
}

impl GlyphConfig {
    /// `<config_dir>/glyph/config.yaml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("glyph")
            .join("config.yaml")
    }

    /// Load from the default location, falling back to defaults
    pub fn load_default() -> Result<Self> {
        Self::load_or_default(Self::default_path())
    }

    /// Load from `path` if it exists, otherwise return defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load from `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: Self = read_yaml(path)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Where drafts are persisted
    pub fn draft_path(&self) -> PathBuf {
        self.draft_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("glyph")
                .join("drafts.json")
        })
    }

    /// The configured codebook, or the standard one
    pub fn load_codebook(&self) -> Result<Codebook> {
        match &self.codebook {
            Some(path) => load_codebook(path),
            None => Ok(Codebook::standard().clone()),
        }
    }
}

/// Read and validate a codebook table file
pub fn load_codebook(path: impl AsRef<Path>) -> Result<Codebook> {
    let path = path.as_ref();
    let table: CodebookTable = read_yaml(path)?;
    let codebook = Codebook::from_table(&table).map_err(|source| ConfigError::Codebook {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        "Loaded codebook with {} entries from {}",
        codebook.len(),
        path.display()
    );
    Ok(codebook)
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyph_core::ResiduePolicy;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GlyphConfig::load_or_default(dir.path().join("nope.yaml")).unwrap();
        assert_eq!(config, GlyphConfig::default());
        assert_eq!(config.codec.residue, ResiduePolicy::Reject);
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "codec:\n  residue: pass_through\ndraft_path: /tmp/glyph-drafts.json\n",
        )
        .unwrap();

        let config = GlyphConfig::load(&path).unwrap();
        assert_eq!(config.codec.residue, ResiduePolicy::PassThrough);
        assert_eq!(config.draft_path(), PathBuf::from("/tmp/glyph-drafts.json"));
        assert!(config.codebook.is_none());
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "codec: [unclosed").unwrap();
        assert!(matches!(GlyphConfig::load(&path), Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn test_standard_codebook_by_default() {
        let codebook = GlyphConfig::default().load_codebook().unwrap();
        assert_eq!(codebook.encode_char('F'), "🟡⚪");
    }

    #[test]
    fn test_custom_codebook_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.yaml");
        let mut table = CodebookTable::standard();
        table.entries.insert("F".to_string(), "⚪⚪⚪".to_string());
        table.entries.insert("A".to_string(), "⚪⚪🔴".to_string());
        std::fs::write(&path, serde_yaml::to_string(&table).unwrap()).unwrap();

        let config = GlyphConfig {
            codebook: Some(path),
            ..GlyphConfig::default()
        };
        let codebook = config.load_codebook().unwrap();
        assert_eq!(codebook.encode_char('F'), "⚪⚪⚪");
    }

    #[test]
    fn test_invalid_codebook_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.yaml");
        let mut table = CodebookTable::standard();
        table.entries.insert("2".to_string(), "🔴🟢".to_string());
        std::fs::write(&path, serde_yaml::to_string(&table).unwrap()).unwrap();

        let err = load_codebook(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Codebook {
                source: CodebookError::PrefixConflict { .. },
                ..
            }
        ));
    }
}
