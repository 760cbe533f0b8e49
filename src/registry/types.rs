use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Where a project's descriptor lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectOrigin {
    /// Inside a managed root directory, in a sub-folder named after it
    Owned,
    /// Anywhere else, referenced from a root's library list
    Imported,
}

/// One workspace file of a project
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceRecord {
    pub path: PathBuf,
    /// File name without extension. Equal to the project name for the
    /// default workspace.
    pub name: String,
    /// Descriptor file name recorded inside the workspace
    pub affiliated_project: String,
}

impl WorkspaceRecord {
    pub fn is_default_for(&self, project: &str) -> bool {
        self.name == project
    }
}

/// A project as found on disk by the last refresh
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    pub name: String,
    pub descriptor_path: PathBuf,
    /// First folder declared in the descriptor, empty when none
    pub root_folder: PathBuf,
    /// Sub-path between the owning root and the project folder, with a
    /// trailing separator when not empty
    pub group: String,
    /// Sorted by path, never empty after a refresh
    pub workspaces: Vec<WorkspaceRecord>,
    pub origin: ProjectOrigin,
    /// Filled in from live host windows when a listing is built
    pub is_open: bool,
}

impl ProjectRecord {
    pub fn workspace_named(&self, name: &str) -> Option<&WorkspaceRecord> {
        self.workspaces.iter().find(|w| w.name == name)
    }

    pub fn workspace_at(&self, path: &Path) -> Option<&WorkspaceRecord> {
        self.workspaces.iter().find(|w| w.path == path)
    }

    /// Folder holding the descriptor and its workspaces
    pub fn folder(&self) -> &Path {
        self.descriptor_path.parent().unwrap_or(Path::new(""))
    }
}

/// Two projects with the same name found during one scan
#[derive(Debug, Clone, PartialEq)]
pub struct NameCollision {
    pub name: String,
    /// The descriptor that was dropped
    pub shadowed: PathBuf,
    /// The descriptor kept in the table
    pub kept: PathBuf,
}

/// Result of a full scan, keyed by project name
#[derive(Debug, Clone, Default)]
pub struct ProjectTable {
    pub projects: BTreeMap<String, ProjectRecord>,
    pub collisions: Vec<NameCollision>,
}

impl ProjectTable {
    pub fn get(&self, name: &str) -> Option<&ProjectRecord> {
        self.projects.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.projects.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectRecord> {
        self.projects.values()
    }

    pub fn names(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }

    /// Find the project owning a descriptor path
    pub fn by_descriptor(&self, descriptor: &Path) -> Option<&ProjectRecord> {
        self.projects
            .values()
            .find(|p| p.descriptor_path == descriptor)
    }

    pub(crate) fn insert(&mut self, record: ProjectRecord) {
        if let Some(previous) = self.projects.get(&record.name) {
            if previous.descriptor_path != record.descriptor_path {
                self.collisions.push(NameCollision {
                    name: record.name.clone(),
                    shadowed: previous.descriptor_path.clone(),
                    kept: record.descriptor_path.clone(),
                });
            }
        }
        self.projects.insert(record.name.clone(), record);
    }
}

/// `folders` entry of a descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Project descriptor file. Only `folders` is interpreted, everything else
/// is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub folders: Vec<FolderEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `buffers` entry of a workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BufferEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Workspace file. `project` ties it to a descriptor; `buffers` is only read
/// for display. The rest of the session state is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<BufferEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkspaceDocument {
    pub fn for_project(descriptor_file_name: &str) -> Self {
        Self {
            project: Some(descriptor_file_name.to_string()),
            ..Default::default()
        }
    }

    /// Files of the open buffers, in order
    pub fn buffer_files(&self) -> Vec<String> {
        self.buffers.iter().filter_map(|b| b.file.clone()).collect()
    }
}
