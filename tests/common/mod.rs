#![allow(dead_code)]

use project_manager::utils::{project_file_name, workspace_file_name};
use project_manager::{Manager, MemoryHost, ProjectRegistry, Settings};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Default projects directory inside a test directory
pub fn projects_dir(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("Projects")
}

/// A source folder a project can point at
pub fn create_source_folder(temp_dir: &TempDir, name: &str) -> PathBuf {
    let folder = temp_dir.path().join("src").join(name);
    std::fs::create_dir_all(&folder).expect("Failed to create source folder");
    folder
}

fn write_json(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    let content = serde_json::to_string_pretty(value).expect("Failed to serialize");
    std::fs::write(path, content).expect("Failed to write file");
}

/// Write `<root>/<relative>/<name>.sublime-project` where `name` is the last
/// component of `relative`, together with its default workspace. Returns the
/// descriptor path.
pub fn write_project(root: &Path, relative: &str, folder: Option<&Path>) -> PathBuf {
    let name = relative.rsplit('/').next().unwrap_or(relative);
    let directory = root.join(relative);
    let descriptor = directory.join(project_file_name(name));

    let folders: Vec<Value> = folder
        .map(|f| vec![json!({ "path": f.to_string_lossy() })])
        .unwrap_or_default();
    write_json(&descriptor, &json!({ "folders": folders }));
    write_json(
        &directory.join(workspace_file_name(name)),
        &json!({ "project": project_file_name(name) }),
    );
    descriptor
}

/// Write an extra workspace next to a descriptor
pub fn write_workspace(descriptor: &Path, name: &str, buffers: &[&str]) -> PathBuf {
    let workspace = descriptor
        .parent()
        .expect("Descriptor has a parent")
        .join(workspace_file_name(name));
    let buffers: Vec<Value> = buffers.iter().map(|b| json!({ "file": b })).collect();
    let project = descriptor
        .file_name()
        .expect("Descriptor has a file name")
        .to_string_lossy()
        .to_string();
    write_json(&workspace, &json!({ "project": project, "buffers": buffers }));
    workspace
}

/// Open a manager over the test directory's default projects directory
pub async fn open_manager(temp_dir: &TempDir, settings: Settings) -> Manager<MemoryHost> {
    let registry = ProjectRegistry::open(settings, projects_dir(temp_dir))
        .await
        .expect("Should open registry");
    Manager::new(registry, MemoryHost::new())
}

/// Settings with every optional prompt and reordering turned off
pub fn plain_settings() -> Settings {
    Settings {
        show_recent_projects_first: false,
        show_active_projects_first: false,
        show_recent_workspaces_first: false,
        show_most_recent_workspace_second: false,
        activate_workspaces: false,
        prompt_project_location: false,
        ..Settings::default()
    }
}
