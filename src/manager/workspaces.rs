use super::{remap, Manager, ManagerError};
use crate::descriptions::{read_descriptions, write_descriptions};
use crate::host::Host;
use crate::registry::WorkspaceDocument;
use crate::store::{read_document, write_document};
use crate::utils::{
    is_valid_name, normalize_path, project_file_name, stem_name, workspace_file_name,
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

impl<H: Host> Manager<H> {
    /// Target of a new or renamed workspace, refusing taken names.
    /// An empty name stands for the project's own name.
    fn workspace_target(&self, project: &str, source: &Path, name: &str) -> Result<PathBuf, ManagerError> {
        let name = if name.is_empty() { project } else { name };
        if !is_valid_name(name) {
            return Err(ManagerError::InvalidName(name.to_string()));
        }

        let folder = source.parent().unwrap_or(Path::new(""));
        let target = folder.join(workspace_file_name(name));
        if target == source || target.exists() {
            return Err(ManagerError::NameConflict {
                kind: "workspace",
                name: name.to_string(),
            });
        }
        Ok(target)
    }

    /// Add a workspace to a project and open it in a new window.
    ///
    /// The new file is a copy of the default workspace with its project
    /// reference rewritten, so the host's session layout carries over.
    pub async fn add_workspace(&mut self, project: &str, name: &str) -> Result<PathBuf, ManagerError> {
        let source = self.default_workspace(project).await?;
        let target = self.workspace_target(project, &source, name)?;

        fs::copy(&source, &target).await?;
        let mut document: WorkspaceDocument =
            read_document(&target, Some(WorkspaceDocument::default())).await?;
        document.project = Some(project_file_name(project));
        write_document(&target, &document).await?;
        info!(project = %project, workspace = %target.display(), "Added workspace");

        self.refresh().await?;
        self.open_in_new_window(project, Some(target.clone()), false)
            .await?;
        Ok(target)
    }

    /// Rename one workspace file, keeping its description and recent use
    pub async fn rename_workspace(
        &mut self,
        project: &str,
        workspace: &Path,
        new_name: &str,
    ) -> Result<PathBuf, ManagerError> {
        let target = self.workspace_target(project, workspace, new_name)?;
        let was_current = self.current_project().as_deref() == Some(project);
        let mut closed = self.close_project(project)?;

        fs::rename(workspace, &target).await?;
        let moves = vec![(workspace.to_path_buf(), target.clone())];

        let descriptions_path = self.registry.descriptions_path();
        let mut descriptions = read_descriptions(&descriptions_path).await?;
        if descriptions.rename(workspace, &target) {
            write_descriptions(&descriptions_path, &descriptions).await?;
        }
        self.registry.ledger().rename_paths(&moves).await?;
        info!(project = %project, from = %stem_name(workspace), to = %stem_name(&target), "Renamed workspace");

        self.refresh().await?;
        remap(&mut closed, &moves);
        self.reopen_workspaces(project, &closed, was_current).await?;
        Ok(target)
    }

    /// Delete a workspace file. Removing one that is already gone only
    /// cleans up what still refers to it.
    pub async fn remove_workspace(&mut self, project: &str, workspace: &Path) -> Result<(), ManagerError> {
        let descriptor = self.project(project)?.descriptor_path.clone();
        let was_current = self.current_project().as_deref() == Some(project);
        let mut closed = self.close_project(project)?;

        match fs::remove_file(workspace).await {
            Ok(()) => {
                info!(project = %project, workspace = %workspace.display(), "Removed workspace");
                self.host
                    .status_message(&format!("Workspace \"{}\" is removed.", stem_name(workspace)));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let descriptions_path = self.registry.descriptions_path();
        let mut descriptions = read_descriptions(&descriptions_path).await?;
        if descriptions.remove(workspace) {
            write_descriptions(&descriptions_path, &descriptions).await?;
        }
        self.registry
            .ledger()
            .forget_workspace(&descriptor, workspace)
            .await?;

        self.refresh().await?;
        let removed = normalize_path(workspace);
        closed.retain(|w| normalize_path(w) != removed);
        self.reopen_workspaces(project, &closed, was_current).await
    }
}
