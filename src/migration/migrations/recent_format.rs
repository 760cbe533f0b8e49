//! Drop a `recent.json` written before workspaces were tracked.
//!
//! Old ledgers are a plain list of descriptor paths. They cannot be
//! converted, so the ledger is deleted and the host history cleared so both
//! start empty together.

use crate::migration::types::{Migration, MigrationContext, MigrationError, MigrationOutcome};
use crate::store::{delete_document, read_document};
use crate::utils::RECENT_FILE;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

pub struct RecentFormatMigration;

impl RecentFormatMigration {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RecentFormatMigration {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Migration for RecentFormatMigration {
    fn name(&self) -> &str {
        "recent_format"
    }

    fn description(&self) -> &str {
        "Remove recent projects recorded without workspaces"
    }

    async fn is_needed(&self, ctx: &MigrationContext) -> Result<bool, MigrationError> {
        let path = ctx.primary_dir.join(RECENT_FILE);
        if !path.exists() {
            return Ok(false);
        }
        let entries: Vec<Value> = read_document(&path, Some(Vec::new())).await?;
        Ok(entries.first().is_some_and(|first| !first.is_object()))
    }

    async fn apply(&self, ctx: &MigrationContext) -> Result<MigrationOutcome, MigrationError> {
        let path = ctx.primary_dir.join(RECENT_FILE);
        delete_document(&path).await?;
        info!(path = %path.display(), "Removed recent projects in the old format");
        Ok(MigrationOutcome {
            settings_changed: false,
            clear_recent_history: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::write_document;
    use serde_json::json;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> MigrationContext {
        MigrationContext {
            settings_path: dir.path().join("settings.json"),
            primary_dir: dir.path().to_path_buf(),
        }
    }

    #[tokio::test]
    async fn test_old_format_is_removed() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let path = dir.path().join(RECENT_FILE);
        write_document(&path, &json!(["~/Projects/A.sublime-project"]))
            .await
            .unwrap();

        let migration = RecentFormatMigration::new();
        assert!(migration.is_needed(&ctx).await.unwrap());
        let outcome = migration.apply(&ctx).await.unwrap();
        assert!(outcome.clear_recent_history);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_current_format_is_kept() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let path = dir.path().join(RECENT_FILE);
        write_document(
            &path,
            &json!([{"project": "~/Projects/A/A.sublime-project", "workspaces": []}]),
        )
        .await
        .unwrap();

        assert!(!RecentFormatMigration::new().is_needed(&ctx).await.unwrap());
        assert!(path.exists());
    }
}
