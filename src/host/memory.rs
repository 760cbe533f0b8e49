use super::{Host, LaunchRequest, WindowId, WindowInfo};
use crate::registry::WorkspaceDocument;
use crate::utils::real_path;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct State {
    windows: Vec<WindowInfo>,
    active: Option<WindowId>,
    next_id: WindowId,
    launches: Vec<LaunchRequest>,
    dialogs: Vec<String>,
    statuses: Vec<String>,
    opened_files: Vec<PathBuf>,
    folder_prompts: usize,
    history_clears: usize,
}

/// A host that keeps its windows in memory and records every request.
///
/// Launching a workspace opens (or reuses) a window showing it, so a
/// sequence of operations can be followed window by window.
#[derive(Debug, Default)]
pub struct MemoryHost {
    state: Mutex<State>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Open a window showing a project/workspace pair and make it active
    pub fn add_window(&self, project_file: Option<&Path>, workspace_file: Option<&Path>) -> WindowId {
        let mut state = self.state();
        state.next_id += 1;
        let id = state.next_id;
        state.windows.push(WindowInfo {
            id,
            project_file: project_file.map(Path::to_path_buf),
            workspace_file: workspace_file.map(Path::to_path_buf),
            project_data: None,
        });
        state.active = Some(id);
        id
    }

    pub fn set_project_data(&self, window: WindowId, data: serde_json::Value) {
        let mut state = self.state();
        if let Some(w) = state.windows.iter_mut().find(|w| w.id == window) {
            w.project_data = Some(data);
        }
    }

    pub fn set_active(&self, window: WindowId) {
        self.state().active = Some(window);
    }

    pub fn launches(&self) -> Vec<LaunchRequest> {
        self.state().launches.clone()
    }

    pub fn dialogs(&self) -> Vec<String> {
        self.state().dialogs.clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.state().statuses.clone()
    }

    pub fn opened_files(&self) -> Vec<PathBuf> {
        self.state().opened_files.clone()
    }

    pub fn folder_prompts(&self) -> usize {
        self.state().folder_prompts
    }

    pub fn history_clears(&self) -> usize {
        self.state().history_clears
    }

    /// Workspace files shown by live windows
    pub fn open_workspaces(&self) -> Vec<PathBuf> {
        self.state()
            .windows
            .iter()
            .filter_map(|w| w.workspace_file.clone())
            .collect()
    }
}

/// The descriptor a workspace file points at, next to it on disk
fn project_of_workspace(workspace: &Path) -> Option<PathBuf> {
    let content = std::fs::read_to_string(workspace).ok()?;
    let document: WorkspaceDocument = serde_json::from_str(&content).ok()?;
    let project = document.project?;
    let project = Path::new(&project).file_name()?.to_os_string();
    workspace.parent().map(|dir| dir.join(project))
}

impl Host for MemoryHost {
    fn windows(&self) -> Vec<WindowInfo> {
        self.state().windows.clone()
    }

    fn active_window(&self) -> Option<WindowInfo> {
        let state = self.state();
        let active = state.active?;
        state.windows.iter().find(|w| w.id == active).cloned()
    }

    fn close_workspace(&self, window: WindowId) {
        let mut state = self.state();
        if let Some(w) = state.windows.iter_mut().find(|w| w.id == window) {
            w.project_file = None;
            w.workspace_file = None;
            w.project_data = None;
        }
    }

    fn close_window(&self, window: WindowId) {
        let mut state = self.state();
        state.windows.retain(|w| w.id != window);
        if state.active == Some(window) {
            state.active = state.windows.first().map(|w| w.id);
        }
    }

    fn launch(&self, request: LaunchRequest) {
        let mut state = self.state();
        state.launches.push(request.clone());

        match request {
            LaunchRequest::OpenWorkspace {
                workspace,
                new_window,
            } => {
                let project_file = project_of_workspace(&workspace);
                let reuse = match (new_window, state.active) {
                    (false, Some(id)) => state.windows.iter().position(|w| w.id == id),
                    _ => None,
                };
                match reuse {
                    Some(index) => {
                        let window = &mut state.windows[index];
                        window.project_file = project_file;
                        window.workspace_file = Some(workspace);
                    }
                    None => {
                        state.next_id += 1;
                        let id = state.next_id;
                        state.windows.push(WindowInfo {
                            id,
                            project_file,
                            workspace_file: Some(workspace),
                            project_data: None,
                        });
                        state.active = Some(id);
                    }
                }
            }
            LaunchRequest::Focus { path } => {
                let target = real_path(&path);
                let found = state.windows.iter().find(|w| {
                    w.workspace_file.as_deref().map(real_path).as_ref() == Some(&target)
                        || w.project_file.as_deref().map(real_path).as_ref() == Some(&target)
                });
                if let Some(id) = found.map(|w| w.id) {
                    state.active = Some(id);
                }
            }
            LaunchRequest::AppendFolders { .. } => {}
        }
    }

    fn open_file(&self, path: &Path) {
        self.state().opened_files.push(path.to_path_buf());
    }

    fn prompt_add_folder(&self) {
        self.state().folder_prompts += 1;
    }

    fn message_dialog(&self, message: &str) {
        self.state().dialogs.push(message.to_string());
    }

    fn status_message(&self, message: &str) {
        self.state().statuses.push(message.to_string());
    }

    fn clear_recent_history(&self) {
        self.state().history_clears += 1;
    }
}
