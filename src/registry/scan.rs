use super::library::load_library;
use super::types::{
    ProjectDescriptor, ProjectOrigin, ProjectRecord, ProjectTable, WorkspaceDocument,
    WorkspaceRecord,
};
use super::RegistryError;
use crate::store::{read_document, write_document};
use crate::utils::{
    default_workspace_path, expand_path, file_name_string, is_project_file, is_workspace_file,
    normalize_path, real_path, stem_name,
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Scan every root and build the project table.
///
/// Roots are visited in priority order; within a root, library entries come
/// before walked descriptors. When two descriptors share a name the later
/// one wins and the collision is recorded on the table.
pub async fn scan_projects(roots: &[PathBuf]) -> Result<ProjectTable, RegistryError> {
    let mut table = ProjectTable::default();

    for root in roots {
        let library = match load_library(root).await {
            Ok(library) => library,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Could not read library, skipping it");
                Vec::new()
            }
        };
        for descriptor in library {
            if let Some(record) = read_project_logged(&descriptor, roots, ProjectOrigin::Imported).await {
                table.insert(record);
            }
        }

        let walk_root = root.clone();
        let walked = match tokio::task::spawn_blocking(move || walk_descriptors(&walk_root)).await {
            Ok(walked) => walked,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Directory walk failed");
                Vec::new()
            }
        };
        for descriptor in walked {
            if let Some(record) = read_project_logged(&descriptor, roots, ProjectOrigin::Owned).await {
                table.insert(record);
            }
        }
    }

    for collision in &table.collisions {
        warn!(
            project = %collision.name,
            kept = %collision.kept.display(),
            shadowed = %collision.shadowed.display(),
            "Two projects share a name, the later root wins"
        );
    }

    debug!(count = table.len(), "Scanned projects");
    Ok(table)
}

/// Read one project, leaving it out of the table when it cannot be read so
/// the rest of the scan goes on
async fn read_project_logged(
    descriptor: &Path,
    roots: &[PathBuf],
    origin: ProjectOrigin,
) -> Option<ProjectRecord> {
    match read_project(descriptor, roots, origin).await {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(descriptor = %descriptor.display(), error = %e, "Skipping unreadable project");
            None
        }
    }
}

/// Find the root directory a descriptor lives in, if any
pub fn which_root<'a>(descriptor: &Path, roots: &'a [PathBuf]) -> Option<&'a PathBuf> {
    let folder = real_path(descriptor.parent().unwrap_or(Path::new("")));
    roots.iter().find(|root| folder.starts_with(real_path(root)))
}

/// Collect descriptor files under a root, then prune directories left empty
/// by earlier moves. Blocking; the scan runs it on the blocking pool.
fn walk_descriptors(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }

    let mut descriptors: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if entry.file_type().is_file() && is_project_file(path) {
            let path = normalize_path(path);
            if !descriptors.contains(&path) {
                descriptors.push(path);
            }
        }
    }

    prune_empty_dirs(root);
    descriptors
}

fn prune_empty_dirs(root: &Path) {
    for entry in WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        let is_empty = std::fs::read_dir(entry.path())
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if is_empty {
            match std::fs::remove_dir(entry.path()) {
                Ok(()) => debug!(dir = %entry.path().display(), "Removed empty directory"),
                Err(e) => warn!(dir = %entry.path().display(), error = %e, "Could not remove empty directory"),
            }
        }
    }
}

/// Build the record of one descriptor
pub(crate) async fn read_project(
    descriptor: &Path,
    roots: &[PathBuf],
    origin: ProjectOrigin,
) -> Result<ProjectRecord, RegistryError> {
    let root = which_root(descriptor, roots);

    let data: ProjectDescriptor =
        read_document(descriptor, Some(ProjectDescriptor::default())).await?;
    let root_folder = data
        .folders
        .first()
        .and_then(|f| f.path.as_deref())
        .map(|p| expand_path(p, Some(descriptor)))
        .unwrap_or_default();

    let group = root.map(|r| group_of(descriptor, r)).unwrap_or_default();

    Ok(ProjectRecord {
        name: stem_name(descriptor),
        descriptor_path: descriptor.to_path_buf(),
        root_folder,
        group,
        workspaces: project_workspaces(descriptor).await?,
        origin,
        is_open: false,
    })
}

/// Relative path from the root to the folder containing the project folder,
/// with a trailing `/` when not empty
fn group_of(descriptor: &Path, root: &Path) -> String {
    let Some(grandparent) = descriptor.parent().and_then(Path::parent) else {
        return String::new();
    };

    match real_path(grandparent).strip_prefix(real_path(root)) {
        Ok(relative) => {
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect();
            if parts.is_empty() {
                String::new()
            } else {
                format!("{}/", parts.join("/"))
            }
        }
        Err(_) => String::new(),
    }
}

/// List the workspaces affiliated with a descriptor.
///
/// Candidates are the workspace files next to the descriptor whose recorded
/// project matches its file name. When none match, the default workspace is
/// written so every project always has one.
pub(crate) async fn project_workspaces(
    descriptor: &Path,
) -> Result<Vec<WorkspaceRecord>, RegistryError> {
    let folder = descriptor.parent().unwrap_or(Path::new(""));
    let descriptor_name = file_name_string(descriptor);
    let mut workspaces = Vec::new();

    let mut entries = fs::read_dir(folder).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_workspace_file(&path) || !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(affiliation) = read_affiliation(&path).await {
            if affiliation == descriptor_name {
                workspaces.push(WorkspaceRecord {
                    name: stem_name(&path),
                    path: normalize_path(&path),
                    affiliated_project: affiliation,
                });
            }
        }
    }

    if workspaces.is_empty() {
        let path = default_workspace_path(descriptor);
        let mut document: WorkspaceDocument =
            read_document(&path, Some(WorkspaceDocument::default())).await?;
        document.project = Some(descriptor_name.clone());
        write_document(&path, &document).await?;
        info!(workspace = %path.display(), "Created default workspace");

        workspaces.push(WorkspaceRecord {
            name: stem_name(&path),
            path: normalize_path(&path),
            affiliated_project: descriptor_name,
        });
    }

    workspaces.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(workspaces)
}

/// Descriptor file name recorded in a workspace, if it records one
pub(crate) async fn read_affiliation(workspace: &Path) -> Option<String> {
    let document: WorkspaceDocument = read_document(workspace, Some(WorkspaceDocument::default()))
        .await
        .ok()?;
    document
        .project
        .map(|p| file_name_string(Path::new(&p)))
        .filter(|p| !p.is_empty())
}
