use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One persisted exclusion entry. The handle is stored for display only;
/// the DID is what suppresses future prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredUser {
    pub did: String,
    pub handle: String,
}

/// The operator's ignore list, the only state that survives across runs.
/// Loaded once at start, mutated in memory, rewritten in full at exit.
/// Single writer by design; two instances sharing one file are
/// unsupported (last save wins).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IgnoreList {
    records: Vec<IgnoredUser>,
}

impl IgnoreList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the ignore file. A missing file is created holding the empty
    /// state `[]`. Anything that is not a valid JSON array of records,
    /// including a zero-byte file, is a decode failure; the valid empty
    /// representation is `[]`, never an empty file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let empty = Self::new();
            empty.save(path)?;
            return Ok(empty);
        }

        let content = fs::read_to_string(path)?;
        let records: Vec<IgnoredUser> =
            serde_json::from_str(&content).map_err(|e| Error::decode("ignore file", e))?;
        Ok(Self { records })
    }

    /// Rewrite the file with the full current collection, pretty-printed
    /// with 2-space indentation. `fs::write` truncates before writing, so
    /// a shorter collection never leaves stale trailing bytes behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(&self.records)
            .map_err(|e| Error::decode("ignore list", e))?;
        content.push('\n');
        fs::write(path, content)?;
        Ok(())
    }

    pub fn contains(&self, did: &str) -> bool {
        self.records.iter().any(|r| r.did == did)
    }

    pub fn push(&mut self, record: IgnoredUser) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IgnoredUser> {
        self.records.iter()
    }
}
