use super::RecentError;
use crate::store::{delete_document, read_document, write_document};
use crate::utils::{expand_path, normalize_path, pretty_path, RECENT_FILE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Number of projects remembered
pub const MAX_RECENT: usize = 50;

/// One project of the ledger with its workspaces, most recent last
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEntry {
    pub project: String,
    #[serde(default)]
    pub workspaces: Vec<String>,
}

impl RecentEntry {
    pub fn project_path(&self) -> PathBuf {
        expand_path(&self.project, None)
    }

    pub fn workspace_paths(&self) -> Vec<PathBuf> {
        self.workspaces.iter().map(|w| expand_path(w, None)).collect()
    }

    fn is_for(&self, project: &Path) -> bool {
        self.project_path() == normalize_path(project)
    }
}

/// The `recent.json` document of the primary directory
#[derive(Debug, Clone)]
pub struct RecencyLedger {
    path: PathBuf,
}

impl RecencyLedger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Ledger kept in a root directory
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(RECENT_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, oldest first. A missing or unreadable ledger is empty.
    pub async fn load(&self) -> Result<Vec<RecentEntry>, RecentError> {
        Ok(read_document(&self.path, Some(Vec::new())).await?)
    }

    async fn save(&self, entries: &[RecentEntry]) -> Result<(), RecentError> {
        write_document(&self.path, entries).await?;
        Ok(())
    }

    /// Mark a workspace of a project as just used.
    ///
    /// The workspace moves to the end of its project's list and the project
    /// to the end of the ledger. Only the newest [`MAX_RECENT`] projects are
    /// kept.
    pub async fn record_use(&self, project: &Path, workspace: &Path) -> Result<(), RecentError> {
        let mut entries = self.load().await?;
        let workspace_key = pretty_path(&normalize_path(workspace));

        let mut entry = match entries.iter().position(|e| e.is_for(project)) {
            Some(index) => entries.remove(index),
            None => RecentEntry {
                project: pretty_path(&normalize_path(project)),
                workspaces: Vec::new(),
            },
        };

        let workspace_path = normalize_path(workspace);
        entry
            .workspaces
            .retain(|w| expand_path(w, None) != workspace_path);
        entry.workspaces.push(workspace_key);
        entries.push(entry);

        if entries.len() > MAX_RECENT {
            let overflow = entries.len() - MAX_RECENT;
            entries.drain(..overflow);
        }

        self.save(&entries).await?;
        debug!(project = %project.display(), workspace = %workspace.display(), "Recorded use");
        Ok(())
    }

    /// Workspaces of a project, most recently used last. Empty when the
    /// project was never used.
    pub async fn rank(&self, project: &Path) -> Result<Vec<PathBuf>, RecentError> {
        let entries = self.load().await?;
        Ok(entries
            .iter()
            .find(|e| e.is_for(project))
            .map(RecentEntry::workspace_paths)
            .unwrap_or_default())
    }

    /// Projects of the ledger, most recently used last
    pub async fn projects(&self) -> Result<Vec<PathBuf>, RecentError> {
        let entries = self.load().await?;
        Ok(entries.iter().map(RecentEntry::project_path).collect())
    }

    /// Delete the ledger document
    pub async fn clear(&self) -> Result<(), RecentError> {
        delete_document(&self.path).await?;
        info!(path = %self.path.display(), "Cleared recent projects");
        Ok(())
    }

    /// Rewrite references to moved files, `moves` being `(old, new)` pairs
    /// of descriptor or workspace paths
    pub async fn rename_paths(&self, moves: &[(PathBuf, PathBuf)]) -> Result<(), RecentError> {
        if moves.is_empty() || !self.path.exists() {
            return Ok(());
        }

        let rename = |stored: &mut String| {
            let current = expand_path(stored, None);
            if let Some((_, new)) = moves.iter().find(|(old, _)| normalize_path(old) == current) {
                *stored = pretty_path(&normalize_path(new));
            }
        };

        let mut entries = self.load().await?;
        for entry in &mut entries {
            rename(&mut entry.project);
            entry.workspaces.iter_mut().for_each(rename);
        }
        self.save(&entries).await
    }

    /// Drop a project's entry
    pub async fn forget_project(&self, project: &Path) -> Result<(), RecentError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut entries = self.load().await?;
        let before = entries.len();
        entries.retain(|e| !e.is_for(project));
        if entries.len() != before {
            self.save(&entries).await?;
        }
        Ok(())
    }

    /// Drop one workspace from its project's entry
    pub async fn forget_workspace(&self, project: &Path, workspace: &Path) -> Result<(), RecentError> {
        if !self.path.exists() {
            return Ok(());
        }
        let workspace = normalize_path(workspace);
        let mut entries = self.load().await?;
        let Some(entry) = entries.iter_mut().find(|e| e.is_for(project)) else {
            return Ok(());
        };
        entry.workspaces.retain(|w| expand_path(w, None) != workspace);
        self.save(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(i: usize) -> PathBuf {
        PathBuf::from(format!("/projects/P{i}/P{i}.sublime-project"))
    }

    fn workspace(i: usize, name: &str) -> PathBuf {
        PathBuf::from(format!("/projects/P{i}/{name}.sublime-workspace"))
    }

    #[tokio::test]
    async fn test_record_use_moves_workspace_and_project_to_end() {
        let dir = TempDir::new().unwrap();
        let ledger = RecencyLedger::in_dir(dir.path());

        ledger.record_use(&project(1), &workspace(1, "a")).await.unwrap();
        ledger.record_use(&project(1), &workspace(1, "b")).await.unwrap();
        ledger.record_use(&project(2), &workspace(2, "x")).await.unwrap();
        ledger.record_use(&project(1), &workspace(1, "a")).await.unwrap();

        let entries = ledger.load().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].project_path(), project(1));
        assert_eq!(
            ledger.rank(&project(1)).await.unwrap(),
            vec![workspace(1, "b"), workspace(1, "a")]
        );
    }

    #[tokio::test]
    async fn test_ledger_is_capped() {
        let dir = TempDir::new().unwrap();
        let ledger = RecencyLedger::in_dir(dir.path());

        for i in 0..(MAX_RECENT + 5) {
            ledger.record_use(&project(i), &workspace(i, "w")).await.unwrap();
        }

        let projects = ledger.projects().await.unwrap();
        assert_eq!(projects.len(), MAX_RECENT);
        assert_eq!(projects[0], project(5));
        assert_eq!(projects[MAX_RECENT - 1], project(MAX_RECENT + 4));
        assert!(ledger.rank(&project(0)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_twice_is_fine() {
        let dir = TempDir::new().unwrap();
        let ledger = RecencyLedger::in_dir(dir.path());
        ledger.clear().await.unwrap();

        ledger.record_use(&project(1), &workspace(1, "a")).await.unwrap();
        ledger.clear().await.unwrap();
        ledger.clear().await.unwrap();
        assert!(ledger.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rename_paths() {
        let dir = TempDir::new().unwrap();
        let ledger = RecencyLedger::in_dir(dir.path());
        ledger.record_use(&project(1), &workspace(1, "a")).await.unwrap();

        let moves = vec![
            (project(1), project(9)),
            (workspace(1, "a"), workspace(9, "a")),
        ];
        ledger.rename_paths(&moves).await.unwrap();

        assert!(ledger.rank(&project(1)).await.unwrap().is_empty());
        assert_eq!(
            ledger.rank(&project(9)).await.unwrap(),
            vec![workspace(9, "a")]
        );
    }

    #[tokio::test]
    async fn test_forget() {
        let dir = TempDir::new().unwrap();
        let ledger = RecencyLedger::in_dir(dir.path());
        ledger.record_use(&project(1), &workspace(1, "a")).await.unwrap();
        ledger.record_use(&project(1), &workspace(1, "b")).await.unwrap();
        ledger.record_use(&project(2), &workspace(2, "a")).await.unwrap();

        ledger.forget_workspace(&project(1), &workspace(1, "a")).await.unwrap();
        assert_eq!(ledger.rank(&project(1)).await.unwrap(), vec![workspace(1, "b")]);

        ledger.forget_project(&project(1)).await.unwrap();
        assert_eq!(ledger.projects().await.unwrap(), vec![project(2)]);
    }
}
