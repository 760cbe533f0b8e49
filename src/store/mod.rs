//! Small JSON documents kept one per file.
//!
//! Every persisted document of the project manager (library lists, the
//! recent ledger, descriptions, descriptor and workspace files) goes through
//! these three functions. Documents are always read and written whole.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::warn;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error in {path}: {source}")]
    JsonError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Document not found: {0}")]
    NotFound(PathBuf),
}

/// Read a document.
///
/// A missing file yields `default`. When `default` is given, an unreadable or
/// malformed file yields it as well; without a default both are errors.
pub async fn read_document<T>(path: &Path, default: Option<T>) -> Result<T, StoreError>
where
    T: DeserializeOwned,
{
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return default.ok_or_else(|| StoreError::NotFound(path.to_path_buf()));
        }
        Err(e) => {
            return match default {
                Some(default) => {
                    warn!(path = %path.display(), error = %e, "Unreadable document, using default");
                    Ok(default)
                }
                None => Err(e.into()),
            };
        }
    };

    match serde_json::from_str(&content) {
        Ok(document) => Ok(document),
        Err(source) => match default {
            Some(default) => {
                warn!(path = %path.display(), error = %source, "Malformed document, using default");
                Ok(default)
            }
            None => Err(StoreError::JsonError {
                path: path.to_path_buf(),
                source,
            }),
        },
    }
}

/// Write a document atomically, creating parent directories as needed.
pub async fn write_document<T>(path: &Path, document: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string_pretty(document).map_err(|source| StoreError::JsonError {
        path: path.to_path_buf(),
        source,
    })?;

    // Write atomically using temp file + rename
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);
    fs::write(&temp_path, &content).await?;
    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    Ok(())
}

/// Remove a document. Removing a missing document is not an error.
pub async fn delete_document(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_document_uses_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");

        let list: Vec<String> = read_document(&path, Some(Vec::new())).await.unwrap();
        assert!(list.is_empty());

        let result: Result<Vec<String>, _> = read_document(&path, None).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_malformed_document_without_default_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let result: Result<HashMap<String, String>, _> = read_document(&path, None).await;
        assert!(matches!(result, Err(StoreError::JsonError { .. })));

        let masked: HashMap<String, String> =
            read_document(&path, Some(HashMap::new())).await.unwrap();
        assert!(masked.is_empty());
    }

    #[tokio::test]
    async fn test_write_creates_parents_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/doc.json");

        write_document(&path, &vec!["a", "b"]).await.unwrap();

        let list: Vec<String> = read_document(&path, None).await.unwrap();
        assert_eq!(list, vec!["a", "b"]);
        assert!(!dir.path().join("nested/deeper/doc.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        write_document(&path, &Vec::<String>::new()).await.unwrap();

        delete_document(&path).await.unwrap();
        assert!(!path.exists());
        delete_document(&path).await.unwrap();
    }
}
