//! Small persistent key-value store for "has seen this hint" flags.
//!
//! The detail view receives a `Box<dyn HintStore>` so tests run against the
//! in-memory store and the app against the JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// The two persisted hint flags, one per display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HintKey {
    Viewer2D,
    ViewerInteractive,
}

impl HintKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viewer2D => "hasSeenImageViewer2DMessage",
            Self::ViewerInteractive => "hasSeenImageViewerInteractiveMessage",
        }
    }
}

pub trait HintStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn has_seen(&self, key: HintKey) -> bool {
        self.get(key.as_str()).is_some()
    }

    fn mark_seen(&mut self, key: HintKey) -> Result<()> {
        self.set(key.as_str(), "true")
    }
}

/// Volatile store, used in tests and when no config directory exists.
#[derive(Debug, Default)]
pub struct MemoryHintStore {
    values: BTreeMap<String, String>,
}

impl HintStore for MemoryHintStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Flags persisted as a flat JSON object. The file is read once on open and
/// rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`. An unreadable or corrupt
    /// file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = std::fs::read_to_string(&path)
            .ok()
            .and_then(|s| match serde_json::from_str(&s) {
                Ok(v) => Some(v),
                Err(e) => {
                    log::warn!("ignoring corrupt hint file {}: {}", path.display(), e);
                    None
                }
            })
            .unwrap_or_default();
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HintStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json)?;
        log::debug!("hint store: {} = {} ({})", key, value, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_marks_seen() {
        let mut s = MemoryHintStore::default();
        assert!(!s.has_seen(HintKey::Viewer2D));
        s.mark_seen(HintKey::Viewer2D).unwrap();
        assert!(s.has_seen(HintKey::Viewer2D));
        assert!(!s.has_seen(HintKey::ViewerInteractive));
        assert_eq!(s.get("hasSeenImageViewer2DMessage").as_deref(), Some("true"));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hints.json");

        let mut s = JsonFileStore::open(&path);
        assert!(!s.has_seen(HintKey::ViewerInteractive));
        s.mark_seen(HintKey::ViewerInteractive).unwrap();

        let reopened = JsonFileStore::open(&path);
        assert!(reopened.has_seen(HintKey::ViewerInteractive));
        assert!(!reopened.has_seen(HintKey::Viewer2D));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hints.json");
        std::fs::write(&path, "{not json").unwrap();
        let s = JsonFileStore::open(&path);
        assert!(!s.has_seen(HintKey::Viewer2D));
    }
}
