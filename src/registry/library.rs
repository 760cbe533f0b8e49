use super::RegistryError;
use crate::store::{read_document, write_document};
use crate::utils::{expand_path, normalize_path, pretty_path, LIBRARY_FILE};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Get the path to a root's library list (`<root>/library.json`)
pub fn library_path(root: &Path) -> PathBuf {
    root.join(LIBRARY_FILE)
}

async fn read_library(root: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    let entries: Vec<String> = read_document(&library_path(root), Some(Vec::new())).await?;
    Ok(entries.iter().map(|e| expand_path(e, None)).collect())
}

async fn write_library(root: &Path, entries: &[PathBuf]) -> Result<(), RegistryError> {
    let portable: Vec<String> = entries.iter().map(|p| pretty_path(p)).collect();
    write_document(&library_path(root), &portable).await?;
    Ok(())
}

/// Load the imported descriptors referenced by a root.
///
/// Entries whose file is gone are dropped, duplicates removed, and the list
/// is written back sorted so stale references heal themselves.
pub async fn load_library(root: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    let path = library_path(root);
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut descriptors: Vec<PathBuf> = Vec::new();
    for entry in read_library(root).await? {
        if !entry.exists() {
            warn!(library = %path.display(), entry = %entry.display(), "Dropping missing library entry");
            continue;
        }
        if !descriptors.contains(&entry) {
            descriptors.push(entry);
        }
    }

    descriptors.sort();
    write_library(root, &descriptors).await?;

    Ok(descriptors)
}

/// Reference an external descriptor from a root. Returns false when it was
/// already listed.
pub async fn add_to_library(root: &Path, descriptor: &Path) -> Result<bool, RegistryError> {
    let descriptor = normalize_path(descriptor);
    let mut entries = read_library(root).await?;
    if entries.contains(&descriptor) {
        return Ok(false);
    }

    entries.push(descriptor);
    write_library(root, &entries).await?;
    debug!(root = %root.display(), "Added library entry");
    Ok(true)
}

/// Drop a descriptor from a root's library. Returns whether it was listed.
pub async fn remove_from_library(root: &Path, descriptor: &Path) -> Result<bool, RegistryError> {
    if !library_path(root).exists() {
        return Ok(false);
    }

    let descriptor = normalize_path(descriptor);
    let mut entries = read_library(root).await?;
    let before = entries.len();
    entries.retain(|e| *e != descriptor);
    if entries.len() == before {
        return Ok(false);
    }

    write_library(root, &entries).await?;
    Ok(true)
}

/// Point a library entry at a renamed descriptor. Returns whether the old
/// path was listed.
pub async fn replace_in_library(
    root: &Path,
    old: &Path,
    new: &Path,
) -> Result<bool, RegistryError> {
    if !library_path(root).exists() {
        return Ok(false);
    }

    let old = normalize_path(old);
    let mut entries = read_library(root).await?;
    let Some(index) = entries.iter().position(|e| *e == old) else {
        return Ok(false);
    };

    entries.remove(index);
    entries.push(normalize_path(new));
    write_library(root, &entries).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_library_heals_stale_entries() {
        let root = TempDir::new().unwrap();
        let external = TempDir::new().unwrap();
        let b = external.path().join("b.sublime-project");
        let a = external.path().join("a.sublime-project");
        tokio::fs::write(&a, "{}").await.unwrap();
        tokio::fs::write(&b, "{}").await.unwrap();
        let gone = external.path().join("gone.sublime-project");

        let raw = vec![
            b.display().to_string(),
            gone.display().to_string(),
            a.display().to_string(),
            b.display().to_string(),
        ];
        write_document(&library_path(root.path()), &raw).await.unwrap();

        let loaded = load_library(root.path()).await.unwrap();
        assert_eq!(loaded, vec![a.clone(), b.clone()]);

        // Rewritten on disk too
        let reread = read_library(root.path()).await.unwrap();
        assert_eq!(reread, vec![a, b]);
    }

    #[tokio::test]
    async fn test_missing_library_is_empty() {
        let root = TempDir::new().unwrap();
        assert!(load_library(root.path()).await.unwrap().is_empty());
        assert!(!library_path(root.path()).exists());
        assert!(!remove_from_library(root.path(), Path::new("/x.sublime-project"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_add_replace_remove() {
        let root = TempDir::new().unwrap();
        let old = Path::new("/ext/old.sublime-project");
        let new = Path::new("/ext/new.sublime-project");

        assert!(add_to_library(root.path(), old).await.unwrap());
        assert!(!add_to_library(root.path(), old).await.unwrap());
        assert!(replace_in_library(root.path(), old, new).await.unwrap());
        assert_eq!(read_library(root.path()).await.unwrap(), vec![new.to_path_buf()]);
        assert!(remove_from_library(root.path(), new).await.unwrap());
        assert!(read_library(root.path()).await.unwrap().is_empty());
    }
}
