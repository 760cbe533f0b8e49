use super::{Manager, ManagerError};
use crate::host::{Host, LaunchRequest};
use crate::registry::ProjectDescriptor;
use crate::store::read_document;
use crate::utils::{default_workspace_path, expand_path, real_path};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

impl<H: Host> Manager<H> {
    /// Detach a project from every window showing it.
    ///
    /// Windows other than the active one are closed. Returns the workspaces
    /// that were shown, the active window's first, for [`reopen_workspaces`].
    ///
    /// [`reopen_workspaces`]: Manager::reopen_workspaces
    pub fn close_project(&self, project: &str) -> Result<Vec<PathBuf>, ManagerError> {
        let descriptor = real_path(&self.project(project)?.descriptor_path);
        let active = self.host.active_window().map(|w| w.id);

        let mut closed = Vec::new();
        for window in self.host.windows() {
            let shows_project = window
                .project_file
                .as_deref()
                .is_some_and(|p| real_path(p) == descriptor);
            if !shows_project {
                continue;
            }

            let is_active = Some(window.id) == active;
            if let Some(workspace) = window.workspace_file {
                if is_active {
                    closed.insert(0, workspace);
                } else {
                    closed.push(workspace);
                }
            }
            self.host.close_workspace(window.id);
            if !is_active {
                self.host.close_window(window.id);
            }
        }

        if !closed.is_empty() {
            debug!(project = %project, windows = closed.len(), "Closed project windows");
        }
        Ok(closed)
    }

    /// Close the windows showing one workspace
    pub fn close_workspace_windows(&self, workspace: &Path) {
        let target = real_path(workspace);
        for window in self.host.windows() {
            if window.workspace_file.as_deref().map(real_path).as_ref() == Some(&target) {
                self.host.close_window(window.id);
            }
        }
    }

    /// Open workspaces closed by an earlier [`close_project`], then give the
    /// focus back to the window that had it.
    ///
    /// The first workspace replaces the current window's when
    /// `in_current_window` is set; every other one gets a new window.
    ///
    /// [`close_project`]: Manager::close_project
    pub async fn reopen_workspaces(
        &mut self,
        project: &str,
        workspaces: &[PathBuf],
        in_current_window: bool,
    ) -> Result<(), ManagerError> {
        let Some((first, rest)) = workspaces.split_first() else {
            return Ok(());
        };

        let original = self
            .host
            .active_window()
            .and_then(|w| w.workspace_file.or(w.project_file));

        if in_current_window {
            self.switch_project(project, Some(first.clone())).await?;
        } else {
            self.open_in_new_window(project, Some(first.clone()), false)
                .await?;
        }
        for workspace in rest {
            self.open_in_new_window(project, Some(workspace.clone()), false)
                .await?;
        }

        if let Some(path) = original {
            self.host.launch(LaunchRequest::Focus { path });
        }
        Ok(())
    }

    /// Open a workspace of a project in the active window
    pub async fn switch_project(
        &mut self,
        project: &str,
        workspace: Option<PathBuf>,
    ) -> Result<(), ManagerError> {
        let workspace = match workspace {
            Some(workspace) => workspace,
            None => self.default_workspace(project).await?,
        };
        let descriptor = self.project(project)?.descriptor_path.clone();
        self.registry.ledger().record_use(&descriptor, &workspace).await?;

        let active = self.host.active_window();
        if let Some(window) = &active {
            self.host.close_workspace(window.id);
        }

        let goto = self.settings().reopen_project_goto;
        if goto && self.is_workspace_open(&workspace) {
            // Already shown elsewhere: drop this window and go there
            if let Some(window) = &active {
                self.host.close_window(window.id);
            }
            self.host.launch(LaunchRequest::Focus {
                path: workspace.clone(),
            });
        } else {
            if !goto {
                self.close_workspace_windows(&workspace);
            }
            self.host.launch(LaunchRequest::OpenWorkspace {
                workspace: workspace.clone(),
                new_window: false,
            });
        }

        info!(project = %project, workspace = %workspace.display(), "Switched project");
        self.refresh().await
    }

    /// Open a workspace of a project in a new window.
    ///
    /// With `close_project`, windows already showing the project are
    /// detached first.
    pub async fn open_in_new_window(
        &mut self,
        project: &str,
        workspace: Option<PathBuf>,
        close_project: bool,
    ) -> Result<(), ManagerError> {
        let workspace = match workspace {
            Some(workspace) => workspace,
            None => self.default_workspace(project).await?,
        };
        let descriptor = self.project(project)?.descriptor_path.clone();
        self.registry.ledger().record_use(&descriptor, &workspace).await?;

        if self.settings().reopen_project_goto {
            if self.is_workspace_open(&workspace) {
                self.host
                    .status_message("Can't open the same workspace in several windows!");
                self.host.launch(LaunchRequest::Focus {
                    path: workspace.clone(),
                });
                return self.refresh().await;
            }
            if close_project {
                self.close_project(project)?;
            }
        } else {
            self.close_workspace_windows(&workspace);
        }

        self.host.launch(LaunchRequest::OpenWorkspace {
            workspace: workspace.clone(),
            new_window: true,
        });
        info!(project = %project, workspace = %workspace.display(), "Opened project in a new window");
        self.refresh().await
    }

    /// Add a project's folders to the active window
    pub async fn append_project(&mut self, project: &str) -> Result<(), ManagerError> {
        let descriptor = self.project(project)?.descriptor_path.clone();
        self.registry
            .ledger()
            .record_use(&descriptor, &default_workspace_path(&descriptor))
            .await?;

        let data: ProjectDescriptor = read_document(&descriptor, Some(ProjectDescriptor::default())).await?;
        let folders: Vec<PathBuf> = data
            .folders
            .iter()
            .filter_map(|f| f.path.as_deref())
            .map(|p| expand_path(p, Some(&descriptor)))
            .collect();

        self.host.launch(LaunchRequest::AppendFolders { folders });
        Ok(())
    }

    /// Open the descriptor file for editing
    pub fn edit_project(&self, project: &str) -> Result<(), ManagerError> {
        let descriptor = &self.project(project)?.descriptor_path;
        self.host.open_file(descriptor);
        Ok(())
    }

    pub fn add_folder(&self) {
        self.host.prompt_add_folder();
    }

    /// Forget every recently used project, here and in the host
    pub async fn clear_recent(&self) -> Result<(), ManagerError> {
        self.registry.ledger().clear().await?;
        self.host.clear_recent_history();
        Ok(())
    }
}
