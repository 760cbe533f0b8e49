mod library;
mod reorganize;
mod scan;
mod types;

pub use library::{add_to_library, library_path, load_library, remove_from_library, replace_in_library};
pub use reorganize::{reorganize_layout, ReorganizeReport};
pub use scan::{scan_projects, which_root};
pub use types::{
    BufferEntry, FolderEntry, NameCollision, ProjectDescriptor, ProjectOrigin, ProjectRecord,
    ProjectTable, WorkspaceDocument, WorkspaceRecord,
};

use crate::config::Settings;
use crate::host::Host;
use crate::descriptions::descriptions_path;
use crate::recent::RecencyLedger;
use crate::store::StoreError;
use crate::utils::computer_name;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::info;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Directory \"{0}\" does not exist.")]
    MissingDirectory(PathBuf),

    #[error("Project \"{0}\" doesn't exist")]
    ProjectNotFound(String),
}

/// The long-lived project registry.
///
/// Holds the resolved root directories and the table produced by the last
/// scan. The table is only ever replaced wholesale by [`refresh`], never
/// patched.
///
/// [`refresh`]: ProjectRegistry::refresh
pub struct ProjectRegistry {
    settings: Settings,
    default_dir: PathBuf,
    hostname: String,
    roots: Vec<PathBuf>,
    table: ProjectTable,
}

impl ProjectRegistry {
    /// Resolve the root directories for this machine and scan them
    pub async fn open(settings: Settings, default_dir: PathBuf) -> Result<Self, RegistryError> {
        Self::open_for_host(settings, default_dir, computer_name()).await
    }

    pub async fn open_for_host(
        settings: Settings,
        default_dir: PathBuf,
        hostname: String,
    ) -> Result<Self, RegistryError> {
        let roots = settings.project_dirs(&default_dir, &hostname);
        let mut registry = Self {
            settings,
            default_dir,
            hostname,
            roots,
            table: ProjectTable::default(),
        };
        registry.refresh().await?;
        Ok(registry)
    }

    /// Take new settings into account and rescan
    pub async fn apply_settings(&mut self, settings: Settings) -> Result<(), RegistryError> {
        self.roots = settings.project_dirs(&self.default_dir, &self.hostname);
        self.settings = settings;
        info!(roots = self.roots.len(), "Settings changed, rescanning projects");
        self.refresh().await?;
        Ok(())
    }

    /// Rescan every root directory from disk
    pub async fn refresh(&mut self) -> Result<&ProjectTable, RegistryError> {
        if !self.default_dir.is_dir() {
            fs::create_dir_all(&self.default_dir).await?;
        }
        if !self.primary_dir().is_dir() {
            return Err(RegistryError::MissingDirectory(self.primary_dir().to_path_buf()));
        }

        self.table = scan_projects(&self.roots).await?;
        Ok(&self.table)
    }

    /// Move flat-layout projects into their own folders and rescan if
    /// anything moved
    pub async fn reorganize(&mut self, host: &dyn Host) -> Result<ReorganizeReport, RegistryError> {
        let report = reorganize_layout(&self.roots, host).await?;
        if report.changed() {
            self.refresh().await?;
        }
        Ok(report)
    }

    pub fn table(&self) -> &ProjectTable {
        &self.table
    }

    pub fn project(&self, name: &str) -> Result<&ProjectRecord, RegistryError> {
        self.table
            .get(name)
            .ok_or_else(|| RegistryError::ProjectNotFound(name.to_string()))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// First root directory; holds the recent ledger and descriptions
    pub fn primary_dir(&self) -> &Path {
        self.roots.first().map(PathBuf::as_path).unwrap_or(&self.default_dir)
    }

    pub fn default_dir(&self) -> &Path {
        &self.default_dir
    }

    /// Root directory containing a descriptor, `None` for imported ones
    pub fn which_root(&self, descriptor: &Path) -> Option<&Path> {
        which_root(descriptor, &self.roots).map(PathBuf::as_path)
    }

    pub fn ledger(&self) -> RecencyLedger {
        RecencyLedger::in_dir(self.primary_dir())
    }

    pub fn descriptions_path(&self) -> PathBuf {
        descriptions_path(self.primary_dir())
    }
}
