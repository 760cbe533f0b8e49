//! Replace `projects_path` and `use_local_projects_dir` with `projects`.

use crate::config::{DirList, DEFAULT_DIR_TOKEN, HOSTNAME_TOKEN};
use crate::migration::types::{Migration, MigrationContext, MigrationError, MigrationOutcome};
use crate::store::{read_document, write_document, StoreError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::Path;

const PROJECTS_PATH_KEY: &str = "projects_path";
const LOCAL_DIR_KEY: &str = "use_local_projects_dir";

pub struct LegacySettingsMigration;

impl LegacySettingsMigration {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LegacySettingsMigration {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_raw(path: &Path) -> Result<Option<Map<String, Value>>, MigrationError> {
    match read_document::<Map<String, Value>>(path, None).await {
        Ok(map) => Ok(Some(map)),
        Err(StoreError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn projects_is_default(settings: &Map<String, Value>) -> bool {
    match settings.get("projects") {
        None => true,
        Some(Value::String(s)) => s == DEFAULT_DIR_TOKEN,
        Some(_) => false,
    }
}

/// New `projects` value from the legacy keys, `None` to keep the default
fn migrated_projects(paths: &[String], local_dirs: bool) -> Option<Value> {
    let local = |dir: &str| format!("{} - {}", dir, HOSTNAME_TOKEN);

    if local_dirs {
        if paths.is_empty() {
            return Some(Value::String(local(DEFAULT_DIR_TOKEN)));
        }
        let dirs: Vec<Value> = paths
            .iter()
            .map(|p| local(p.as_str()))
            .chain(paths.iter().cloned())
            .chain([local(DEFAULT_DIR_TOKEN), DEFAULT_DIR_TOKEN.to_string()])
            .map(Value::String)
            .collect();
        return Some(Value::Array(dirs));
    }

    match paths {
        [] => None,
        [single] => Some(Value::String(single.clone())),
        _ => Some(Value::Array(paths.iter().cloned().map(Value::String).collect())),
    }
}

#[async_trait]
impl Migration for LegacySettingsMigration {
    fn name(&self) -> &str {
        "legacy_settings"
    }

    fn description(&self) -> &str {
        "Replace projects_path and use_local_projects_dir with projects"
    }

    async fn is_needed(&self, ctx: &MigrationContext) -> Result<bool, MigrationError> {
        Ok(read_raw(&ctx.settings_path)
            .await?
            .is_some_and(|s| s.contains_key(PROJECTS_PATH_KEY) && projects_is_default(&s)))
    }

    async fn apply(&self, ctx: &MigrationContext) -> Result<MigrationOutcome, MigrationError> {
        let Some(mut settings) = read_raw(&ctx.settings_path).await? else {
            return Ok(MigrationOutcome::default());
        };

        let paths = match settings.remove(PROJECTS_PATH_KEY) {
            Some(Value::Null) | None => Vec::new(),
            Some(value) => serde_json::from_value::<DirList>(value)?.entries(),
        };
        let local_dirs = settings
            .remove(LOCAL_DIR_KEY)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        if let Some(projects) = migrated_projects(&paths, local_dirs) {
            settings.insert("projects".to_string(), projects);
        }

        write_document(&ctx.settings_path, &settings).await?;
        Ok(MigrationOutcome {
            settings_changed: true,
            clear_recent_history: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> MigrationContext {
        MigrationContext {
            settings_path: dir.path().join("settings.json"),
            primary_dir: dir.path().join("Projects"),
        }
    }

    #[test]
    fn test_migrated_projects() {
        let paths = vec!["~/a".to_string(), "~/b".to_string()];
        assert_eq!(
            migrated_projects(&paths, true),
            Some(json!([
                "~/a - $hostname",
                "~/b - $hostname",
                "~/a",
                "~/b",
                "$default - $hostname",
                "$default"
            ]))
        );
        assert_eq!(migrated_projects(&[], true), Some(json!("$default - $hostname")));
        assert_eq!(migrated_projects(&paths[..1], false), Some(json!("~/a")));
        assert_eq!(migrated_projects(&paths, false), Some(json!(["~/a", "~/b"])));
        assert_eq!(migrated_projects(&[], false), None);
    }

    #[tokio::test]
    async fn test_rewrites_legacy_keys() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        write_document(
            &ctx.settings_path,
            &json!({"projects_path": ["~/code"], "use_local_projects_dir": false, "display_in_status_bar": true}),
        )
        .await
        .unwrap();

        let migration = LegacySettingsMigration::new();
        assert!(migration.is_needed(&ctx).await.unwrap());
        let outcome = migration.apply(&ctx).await.unwrap();
        assert!(outcome.settings_changed);

        let raw = read_raw(&ctx.settings_path).await.unwrap().unwrap();
        assert_eq!(raw.get("projects"), Some(&json!("~/code")));
        assert!(!raw.contains_key(PROJECTS_PATH_KEY));
        assert!(!raw.contains_key(LOCAL_DIR_KEY));
        assert_eq!(raw.get("display_in_status_bar"), Some(&json!(true)));
        assert!(!migration.is_needed(&ctx).await.unwrap());
    }

    #[tokio::test]
    async fn test_not_needed_when_projects_customized() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let migration = LegacySettingsMigration::new();
        assert!(!migration.is_needed(&ctx).await.unwrap());

        write_document(
            &ctx.settings_path,
            &json!({"projects_path": ["~/code"], "projects": ["~/elsewhere"]}),
        )
        .await
        .unwrap();
        assert!(!migration.is_needed(&ctx).await.unwrap());
    }
}
