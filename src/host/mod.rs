//! The editor hosting the project manager.
//!
//! Windows, launching new instances and user notifications belong to the
//! host; the project manager only drives them through [`Host`]. Prompts that
//! wait for an answer are not part of the trait, see [`crate::command`].

mod memory;

pub use memory::MemoryHost;

use crate::utils::real_path;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Host-assigned window identifier
pub type WindowId = u64;

/// What a host window currently shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowInfo {
    pub id: WindowId,
    pub project_file: Option<PathBuf>,
    pub workspace_file: Option<PathBuf>,
    /// Project data of the window (descriptor contents, possibly unsaved)
    pub project_data: Option<serde_json::Value>,
}

/// Work for the host's process launcher
#[derive(Debug, Clone, PartialEq)]
pub enum LaunchRequest {
    /// Open a workspace and its project, in a new window or the current one
    OpenWorkspace { workspace: PathBuf, new_window: bool },
    /// Bring the window showing this file to the front
    Focus { path: PathBuf },
    /// Add folders to the current window
    AppendFolders { folders: Vec<PathBuf> },
}

pub trait Host: Send + Sync {
    /// All live windows
    fn windows(&self) -> Vec<WindowInfo>;

    fn active_window(&self) -> Option<WindowInfo>;

    /// Detach the project and workspace from a window, keeping it open
    fn close_workspace(&self, window: WindowId);

    fn close_window(&self, window: WindowId);

    fn launch(&self, request: LaunchRequest);

    fn open_file(&self, path: &Path);

    /// Let the user pick a folder to add to the current window
    fn prompt_add_folder(&self);

    /// Blocking dialog
    fn message_dialog(&self, message: &str);

    /// Transient status line message
    fn status_message(&self, message: &str);

    /// Forget the host's own list of recent projects and workspaces
    fn clear_recent_history(&self);
}

/// Descriptor and workspace files open in any window, resolved to real paths
#[derive(Debug, Clone, Default)]
pub struct OpenFiles {
    pub projects: HashSet<PathBuf>,
    pub workspaces: HashSet<PathBuf>,
}

impl OpenFiles {
    pub fn from_host(host: &dyn Host) -> Self {
        let mut open = Self::default();
        for window in host.windows() {
            if let Some(project) = &window.project_file {
                open.projects.insert(real_path(project));
            }
            if let Some(workspace) = &window.workspace_file {
                open.workspaces.insert(real_path(workspace));
            }
        }
        open
    }

    pub fn is_project_open(&self, descriptor: &Path) -> bool {
        self.projects.contains(&real_path(descriptor))
    }

    pub fn is_workspace_open(&self, workspace: &Path) -> bool {
        self.workspaces.contains(&real_path(workspace))
    }
}
