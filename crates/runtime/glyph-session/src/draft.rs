//! Draft persistence
//!
//! Stores the current draft of each mode to disk as JSON so an unfinished
//! input survives a restart.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::session::Mode;

/// Serializable draft state
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DraftFile {
    /// Version for migration support
    version: u32,

    /// Draft text keyed by mode name
    drafts: BTreeMap<String, String>,
}

impl Default for DraftFile {
    fn default() -> Self {
        Self {
            version: 1,
            drafts: BTreeMap::new(),
        }
    }
}

/// One draft string per mode, in a single JSON file
#[derive(Debug, Clone)]
pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    /// Create storage at specific path
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the storage path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Draft for `mode`; empty drafts count as none
    pub fn load(&self, mode: Mode) -> crate::Result<Option<String>> {
        let file = self.read()?;
        Ok(file
            .drafts
            .get(mode.key())
            .filter(|draft| !draft.is_empty())
            .cloned())
    }

    /// Replace the draft for `mode`
    pub fn save(&self, mode: Mode, draft: &str) -> crate::Result<()> {
        let mut file = self.read()?;
        file.drafts.insert(mode.key().to_string(), draft.to_string());
        self.write(&file)
    }

    /// Remove the draft for `mode`
    pub fn clear(&self, mode: Mode) -> crate::Result<()> {
        let mut file = self.read()?;
        if file.drafts.remove(mode.key()).is_some() {
            self.write(&file)?;
            tracing::info!("Cleared {} draft in {}", mode.key(), self.path.display());
        }
        Ok(())
    }

    fn read(&self) -> crate::Result<DraftFile> {
        if !self.path.exists() {
            return Ok(DraftFile::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, file: &DraftFile) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(file)?;

        // Write to temp file first, then rename (atomic)
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)?;
        std::fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}
