use crate::store::{read_document, write_document, StoreError};
use crate::utils::{normalize_path, DESCRIPTIONS_FILE};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DescriptionError {
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
}

/// Free-text annotations keyed by absolute descriptor or workspace path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptionMap {
    entries: BTreeMap<String, String>,
}

fn key_of(path: &Path) -> String {
    normalize_path(path).to_string_lossy().to_string()
}

impl DescriptionMap {
    pub fn get(&self, path: &Path) -> Option<&str> {
        self.entries.get(&key_of(path)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set or clear a description. Empty text clears. Returns whether the
    /// map changed.
    pub fn set(&mut self, path: &Path, text: &str) -> bool {
        let key = key_of(path);
        if text.is_empty() {
            return self.entries.remove(&key).is_some();
        }
        self.entries.insert(key, text.to_string()).as_deref() != Some(text)
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        self.entries.remove(&key_of(path)).is_some()
    }

    /// Move a description to another path. Returns whether one was moved.
    pub fn rename(&mut self, old: &Path, new: &Path) -> bool {
        match self.entries.remove(&key_of(old)) {
            Some(text) => {
                self.entries.insert(key_of(new), text);
                true
            }
            None => false,
        }
    }
}

/// The `descriptions.json` document of the primary directory
pub fn descriptions_path(dir: &Path) -> PathBuf {
    dir.join(DESCRIPTIONS_FILE)
}

pub async fn read_descriptions(path: &Path) -> Result<DescriptionMap, DescriptionError> {
    let entries: BTreeMap<String, String> = read_document(path, Some(BTreeMap::new())).await?;
    Ok(DescriptionMap { entries })
}

pub async fn write_descriptions(path: &Path, map: &DescriptionMap) -> Result<(), DescriptionError> {
    write_document(path, &map.entries).await?;
    Ok(())
}

/// Set (or with empty text, clear) the description of one file and persist
/// the map. Clearing a description that does not exist changes nothing.
pub async fn set_description(
    path: &Path,
    target: &Path,
    text: &str,
) -> Result<bool, DescriptionError> {
    let mut map = read_descriptions(path).await?;
    let changed = map.set(target, text);
    if changed {
        write_descriptions(path, &map).await?;
    }
    Ok(changed)
}
