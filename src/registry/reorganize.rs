use super::scan::project_workspaces;
use super::RegistryError;
use crate::host::Host;
use crate::utils::{file_name_string, is_project_file, real_path, stem_name};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// Outcome of moving flat-layout projects into their own folders
#[derive(Debug, Clone, Default)]
pub struct ReorganizeReport {
    /// Projects moved into a folder of their own
    pub moved: Vec<String>,
    /// Workspaces that were open in the active window and must be reopened
    /// from their new location
    pub relaunch: Vec<PathBuf>,
    /// Destination files that already existed and blocked a move
    pub collisions: Vec<PathBuf>,
}

impl ReorganizeReport {
    pub fn changed(&self) -> bool {
        !self.moved.is_empty()
    }
}

/// Move every descriptor found directly inside a root into `<root>/<name>/`
/// together with its workspaces.
///
/// Older layouts kept `name.sublime-project` and its workspace side by side
/// in the root, which leaves no room for several workspaces per project. The
/// active window is detached first when it shows a project being moved; the
/// workspace to reopen is returned rather than launched.
pub async fn reorganize_layout(
    roots: &[PathBuf],
    host: &dyn Host,
) -> Result<ReorganizeReport, RegistryError> {
    let mut report = ReorganizeReport::default();
    let active = host.active_window();

    for root in roots {
        if !root.is_dir() {
            continue;
        }

        let mut flat = Vec::new();
        let mut entries = fs::read_dir(root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_project_file(&path) && entry.file_type().await?.is_file() {
                flat.push(path);
            }
        }
        flat.sort();

        for descriptor in flat {
            let name = stem_name(&descriptor);
            let directory = root.join(&name);

            let moves = match plan_moves(&descriptor, &directory).await {
                Ok(moves) => moves,
                Err(e) => {
                    warn!(project = %name, error = %e, "Could not read project, left in place");
                    continue;
                }
            };

            // A blocked move leaves the project and its window untouched
            if let Some((_, target)) = moves.iter().find(|(_, target)| target.exists()) {
                warn!(project = %name, path = %target.display(), "Destination exists, project left in place");
                host.message_dialog(&format!(
                    "Please remove the existing file \"{}\" to be able to load projects.",
                    target.display()
                ));
                report.collisions.push(target.clone());
                continue;
            }

            let mut to_reopen = None;
            if let Some(window) = &active {
                let shows_it = window
                    .project_file
                    .as_deref()
                    .map_or(false, |p| real_path(p) == real_path(&descriptor));
                if shows_it {
                    let reopen_name = window
                        .workspace_file
                        .as_deref()
                        .map(file_name_string)
                        .unwrap_or_else(|| file_name_string(&descriptor));
                    to_reopen = Some(directory.join(reopen_name));
                    host.close_workspace(window.id);
                }
            }

            fs::create_dir_all(&directory).await?;
            for (from, to) in &moves {
                fs::rename(from, to).await?;
            }
            info!(project = %name, to = %directory.display(), "Moved project into its own folder");
            report.moved.push(name);

            if let Some(path) = to_reopen {
                report.relaunch.push(path);
            }
        }
    }

    Ok(report)
}

/// Source and destination of every file a move would touch, workspaces
/// first and the descriptor last
async fn plan_moves(
    descriptor: &Path,
    directory: &Path,
) -> Result<Vec<(PathBuf, PathBuf)>, RegistryError> {
    let mut files: Vec<PathBuf> = project_workspaces(descriptor)
        .await?
        .into_iter()
        .map(|w| w.path)
        .collect();
    files.push(descriptor.to_path_buf());

    Ok(files
        .into_iter()
        .map(|file| {
            let target = directory.join(file.file_name().unwrap_or_default());
            (file, target)
        })
        .collect())
}
