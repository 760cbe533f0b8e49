use crate::store::{read_document, write_document, StoreError};
use crate::utils::expand_path;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Placeholder for the default projects directory in `projects`
pub const DEFAULT_DIR_TOKEN: &str = "$default";

/// Placeholder for the machine name in `projects`
pub const HOSTNAME_TOKEN: &str = "$hostname";

/// One directory or several
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirList {
    One(String),
    Many(Vec<String>),
}

impl DirList {
    pub fn entries(&self) -> Vec<String> {
        match self {
            DirList::One(dir) => vec![dir.clone()],
            DirList::Many(dirs) => dirs.clone(),
        }
    }
}

/// The `projects` setting: directories for every machine, or per machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectsSetting {
    Dirs(DirList),
    PerHost(HashMap<String, DirList>),
}

impl Default for ProjectsSetting {
    fn default() -> Self {
        ProjectsSetting::Dirs(DirList::One(DEFAULT_DIR_TOKEN.to_string()))
    }
}

impl ProjectsSetting {
    /// Whether the setting still holds its out-of-the-box value
    pub fn is_default(&self) -> bool {
        *self == ProjectsSetting::default()
    }
}

fn default_true() -> bool {
    true
}

fn default_indicator() -> String {
    "*".to_string()
}

fn default_display_format() -> String {
    "{{project_group}}{{project_name}}{{active_project_indicator}}".to_string()
}

/// Project manager settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Root directories holding projects. The first one is the primary
    /// directory; the default directory is always scanned too.
    #[serde(default)]
    pub projects: ProjectsSetting,
    #[serde(default = "default_true")]
    pub show_recent_projects_first: bool,
    #[serde(default = "default_true")]
    pub show_active_projects_first: bool,
    #[serde(default = "default_true")]
    pub show_recent_workspaces_first: bool,
    #[serde(default = "default_true")]
    pub show_most_recent_workspace_second: bool,
    #[serde(default)]
    pub show_default_workspace_first: bool,
    #[serde(default = "default_indicator")]
    pub active_project_indicator: String,
    #[serde(default = "default_indicator")]
    pub active_workspace_indicator: String,
    /// Placeholders: {{project_group}}, {{project_name}}, {{active_project_indicator}}
    #[serde(default = "default_display_format")]
    pub project_display_format: String,
    /// Ask which workspace to open when opening a project
    #[serde(default = "default_true")]
    pub activate_workspaces: bool,
    /// Ask which root directory to use when creating or importing
    #[serde(default = "default_true")]
    pub prompt_project_location: bool,
    /// Focus the window of an already open workspace instead of reopening it
    #[serde(default = "default_true")]
    pub reopen_project_goto: bool,
    #[serde(default)]
    pub display_in_status_bar: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            projects: ProjectsSetting::default(),
            show_recent_projects_first: true,
            show_active_projects_first: true,
            show_recent_workspaces_first: true,
            show_most_recent_workspace_second: true,
            show_default_workspace_first: false,
            active_project_indicator: default_indicator(),
            active_workspace_indicator: default_indicator(),
            project_display_format: default_display_format(),
            activate_workspaces: true,
            prompt_project_location: true,
            reopen_project_goto: true,
            display_in_status_bar: false,
        }
    }
}

impl Settings {
    /// Resolve the root directories for this machine.
    ///
    /// `$default` and `$hostname` are substituted and `~` expanded. The
    /// default directory is appended when missing, so the list is never
    /// empty and its first element is the primary directory.
    pub fn project_dirs(&self, default_dir: &Path, hostname: &str) -> Vec<PathBuf> {
        let entries = match &self.projects {
            ProjectsSetting::Dirs(dirs) => dirs.entries(),
            ProjectsSetting::PerHost(hosts) => hosts
                .get(hostname)
                .map(DirList::entries)
                .unwrap_or_default(),
        };

        let default_str = default_dir.to_string_lossy();
        let mut dirs: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let substituted = entry
                .replace(DEFAULT_DIR_TOKEN, &default_str)
                .replace(HOSTNAME_TOKEN, hostname);
            let dir = expand_path(&substituted, None);
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }

        let default_dir = expand_path(&default_str, None);
        if !dirs.contains(&default_dir) {
            dirs.push(default_dir);
        }

        dirs
    }
}

/// Read the settings document, `None` when it does not exist yet
pub async fn read_settings(path: &Path) -> Result<Option<Settings>, ConfigError> {
    match read_document::<Settings>(path, None).await {
        Ok(settings) => Ok(Some(settings)),
        Err(StoreError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write the settings document
pub async fn write_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    write_document(path, settings).await?;
    Ok(())
}
