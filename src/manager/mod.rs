//! Project and workspace operations driven from a host window.
//!
//! Every mutation follows the same order: close the windows showing the
//! affected files, touch the disk, rescan, reopen what was closed.

mod projects;
mod startup;
mod windows;
mod workspaces;

pub use startup::StartupReport;

use crate::config::{ConfigError, Settings};
use crate::descriptions::{read_descriptions, DescriptionError, DescriptionMap};
use crate::display::{
    rank_projects, rank_workspaces, status_label, DisplayError, ProjectListing, RankContext,
    WorkspaceListing,
};
use crate::host::{Host, OpenFiles};
use crate::recent::RecentError;
use crate::registry::{ProjectRecord, ProjectRegistry, ProjectTable, RegistryError};
use crate::store::StoreError;
use crate::template::TemplateEngine;
use crate::utils::{file_name_string, normalize_path, stem_name};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Project \"{0}\" doesn't exist !")]
    ProjectNotFound(String),

    #[error("Workspace \"{0}\" doesn't exist !")]
    WorkspaceNotFound(String),

    #[error("No active project !")]
    NoActiveProject,

    #[error("Another {kind} is already named {name}")]
    NameConflict { kind: &'static str, name: String },

    #[error("Invalid name \"{0}\": the only characters allowed are letters, digits and [.,_- ]")]
    InvalidName(String),

    #[error("Please remove the existing file \"{0}\" first")]
    FileCollision(PathBuf),

    #[error("Project file not found!")]
    NoProjectFile,

    #[error("This project was created by Project Manager!")]
    AlreadyManaged,

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Registry error: {0}")]
    RegistryError(RegistryError),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Recent projects error: {0}")]
    RecentError(#[from] RecentError),

    #[error("Descriptions error: {0}")]
    DescriptionError(#[from] DescriptionError),

    #[error("Display error: {0}")]
    DisplayError(#[from] DisplayError),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),
}

impl From<RegistryError> for ManagerError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ProjectNotFound(name) => ManagerError::ProjectNotFound(name),
            RegistryError::IoError(e) => ManagerError::Io(e),
            other => ManagerError::RegistryError(other),
        }
    }
}

/// How an error reaches the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Transient status line message
    Status,
    /// Blocking dialog
    Dialog,
}

impl ManagerError {
    pub fn severity(&self) -> Severity {
        match self {
            ManagerError::ProjectNotFound(_)
            | ManagerError::WorkspaceNotFound(_)
            | ManagerError::NoActiveProject => Severity::Status,
            _ => Severity::Dialog,
        }
    }

    /// Show the error through the host
    pub fn report(&self, host: &dyn Host) {
        let message = self.to_string();
        match self.severity() {
            Severity::Status => host.status_message(&message),
            Severity::Dialog => host.message_dialog(&message),
        }
    }
}

/// Long-lived service tying the registry to a host.
///
/// Operations act on behalf of the host's active window: "current project"
/// always means the project shown there when the operation starts.
pub struct Manager<H: Host> {
    registry: ProjectRegistry,
    host: H,
    engine: TemplateEngine,
}

impl<H: Host> Manager<H> {
    pub fn new(registry: ProjectRegistry, host: H) -> Self {
        Self {
            registry,
            host,
            engine: TemplateEngine::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn registry(&self) -> &ProjectRegistry {
        &self.registry
    }

    pub fn table(&self) -> &ProjectTable {
        self.registry.table()
    }

    pub fn settings(&self) -> &Settings {
        self.registry.settings()
    }

    /// Rescan the root directories
    pub async fn refresh(&mut self) -> Result<(), ManagerError> {
        self.registry.refresh().await?;
        Ok(())
    }

    pub async fn apply_settings(&mut self, settings: Settings) -> Result<(), ManagerError> {
        self.registry.apply_settings(settings).await?;
        Ok(())
    }

    pub fn project(&self, name: &str) -> Result<&ProjectRecord, ManagerError> {
        Ok(self.registry.project(name)?)
    }

    /// Managed project shown in the active window
    pub fn current_project(&self) -> Option<String> {
        let window = self.host.active_window()?;
        let project_file = window.project_file?;
        let name = stem_name(&project_file);
        self.table().contains(&name).then_some(name)
    }

    pub fn workspace_count(&self, project: &str) -> usize {
        self.table()
            .get(project)
            .map_or(0, |p| p.workspaces.len())
    }

    /// Path of a project's workspace given its name
    pub fn find_workspace(&self, project: &str, workspace: &str) -> Result<PathBuf, ManagerError> {
        self.project(project)?
            .workspace_named(workspace)
            .map(|w| w.path.clone())
            .ok_or_else(|| ManagerError::WorkspaceNotFound(workspace.to_string()))
    }

    /// The workspace opened when none is chosen: the one named after the
    /// project, else the most recently used, else the first by file name.
    pub async fn default_workspace(&self, project: &str) -> Result<PathBuf, ManagerError> {
        let record = self.project(project)?;

        if let Some(workspace) = record.workspace_named(project) {
            return Ok(workspace.path.clone());
        }

        let recent = self.registry.ledger().rank(&record.descriptor_path).await?;
        if let Some(last) = recent
            .iter()
            .rev()
            .find(|r| record.workspace_at(r).is_some())
        {
            return Ok(last.clone());
        }

        let mut workspaces: Vec<&Path> = record.workspaces.iter().map(|w| w.path.as_path()).collect();
        workspaces.sort_by_key(|p| file_name_string(p));
        workspaces
            .first()
            .map(|p| p.to_path_buf())
            .ok_or_else(|| ManagerError::WorkspaceNotFound(project.to_string()))
    }

    pub async fn descriptions(&self) -> Result<DescriptionMap, ManagerError> {
        Ok(read_descriptions(&self.registry.descriptions_path()).await?)
    }

    /// Projects in menu order
    pub async fn ranked_projects(&self) -> Result<Vec<ProjectListing>, ManagerError> {
        let recent = self.registry.ledger().load().await?;
        let descriptions = self.descriptions().await?;
        let open = OpenFiles::from_host(&self.host);
        let current = self.current_project();
        let ctx = RankContext {
            settings: self.settings(),
            open: &open,
            recent: &recent,
            descriptions: &descriptions,
            current_project: current.as_deref(),
        };
        Ok(rank_projects(self.table(), &ctx, &self.engine)?)
    }

    /// Workspaces of a project in menu order
    pub async fn ranked_workspaces(&self, project: &str) -> Result<Vec<WorkspaceListing>, ManagerError> {
        let recent = self.registry.ledger().load().await?;
        let descriptions = self.descriptions().await?;
        let open = OpenFiles::from_host(&self.host);
        let current = self.current_project();
        let ctx = RankContext {
            settings: self.settings(),
            open: &open,
            recent: &recent,
            descriptions: &descriptions,
            current_project: current.as_deref(),
        };
        Ok(rank_workspaces(self.table(), &ctx, project).await?)
    }

    /// Status bar label of the active window
    pub fn status_label(&self) -> Option<String> {
        let window = self.host.active_window()?;
        status_label(self.table(), &window, self.settings())
    }

    /// Whether a descriptor lives inside one of the root directories
    fn is_managed(&self, descriptor: &Path) -> bool {
        self.registry.which_root(descriptor).is_some()
    }

    fn is_workspace_open(&self, workspace: &Path) -> bool {
        OpenFiles::from_host(&self.host).is_workspace_open(workspace)
    }
}

/// Replace the old path of each moved file, leaving the others as they are
fn remap(paths: &mut [PathBuf], moves: &[(PathBuf, PathBuf)]) {
    for path in paths.iter_mut() {
        let current = normalize_path(path);
        if let Some((_, new)) = moves.iter().find(|(old, _)| normalize_path(old) == current) {
            *path = new.clone();
        }
    }
}
