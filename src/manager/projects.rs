use super::{remap, Manager, ManagerError};
use crate::descriptions::{read_descriptions, set_description, write_descriptions};
use crate::host::Host;
use crate::registry::{
    add_to_library, remove_from_library, replace_in_library, ProjectOrigin, ProjectRecord,
    WorkspaceDocument,
};
use crate::store::{delete_document, read_document, write_document};
use crate::utils::{
    default_workspace_path, expand_path, file_name_string, is_valid_name, pretty_path,
    project_file_name, stem_name, workspace_file_name,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, warn};

/// One completed step of a rename, kept to undo it
#[derive(Debug)]
enum RenameStep {
    Moved { from: PathBuf, to: PathBuf },
    Affiliated { workspace: PathBuf, previous: Option<String> },
}

impl<H: Host> Manager<H> {
    /// Project name proposed when creating one from the active window: the
    /// base name of its first folder
    pub fn suggested_project_name(&self) -> String {
        self.host
            .active_window()
            .and_then(|window| {
                let data = window.project_data?;
                let path = data.get("folders")?.get(0)?.get("path")?.as_str()?.to_string();
                let folder = expand_path(&path, window.project_file.as_deref());
                Some(file_name_string(&folder))
            })
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "New Project".to_string())
    }

    /// Create a project in `root` from the active window's folders and open
    /// it in a new window.
    ///
    /// `name` may carry groups, `work/client/Alpha` creating
    /// `<root>/work/client/Alpha/Alpha.sublime-project`. Returns the
    /// descriptor path.
    pub async fn create_project(&mut self, name: &str, root: &Path) -> Result<PathBuf, ManagerError> {
        let (groups, project) = match name.rsplit_once('/') {
            Some((groups, project)) => (Some(groups), project),
            None => (None, name),
        };

        let valid_component = |c: &str| !c.is_empty() && is_valid_name(c);
        if !valid_component(project) || !groups.map_or(true, |g| g.split('/').all(valid_component)) {
            return Err(ManagerError::InvalidName(name.to_string()));
        }
        if self.table().contains(project) {
            return Err(ManagerError::NameConflict {
                kind: "project",
                name: project.to_string(),
            });
        }

        let mut directory = root.to_path_buf();
        if let Some(groups) = groups {
            directory.extend(groups.split('/'));
        }
        directory.push(project);
        let descriptor = directory.join(project_file_name(project));
        if descriptor.exists() {
            return Err(ManagerError::FileCollision(descriptor));
        }

        let window = self.host.active_window();
        let data = seed_descriptor(
            window.as_ref().and_then(|w| w.project_data.clone()),
            window.as_ref().and_then(|w| w.project_file.as_deref()),
        );
        write_document(&descriptor, &data).await?;

        let workspace = default_workspace_path(&descriptor);
        if !workspace.exists() {
            let document = WorkspaceDocument::for_project(&file_name_string(&descriptor));
            write_document(&workspace, &document).await?;
        }
        info!(project = %project, descriptor = %descriptor.display(), "Created project");

        self.refresh().await?;
        self.open_in_new_window(project, Some(workspace), true).await?;
        Ok(descriptor)
    }

    /// Rename a project together with its default workspace and folder.
    ///
    /// Returns false when there is nothing to do. Destination files are
    /// checked before anything moves; if a move fails midway the completed
    /// ones are undone and the windows reopened as they were.
    pub async fn rename_project(&mut self, project: &str, new_name: &str) -> Result<bool, ManagerError> {
        if new_name.is_empty() || new_name == project {
            self.host.status_message("Aborted");
            return Ok(false);
        }
        if !is_valid_name(new_name) {
            return Err(ManagerError::InvalidName(new_name.to_string()));
        }
        if self.table().contains(new_name) {
            return Err(ManagerError::NameConflict {
                kind: "project",
                name: new_name.to_string(),
            });
        }

        let record = self.project(project)?.clone();
        let folder = record.folder().to_path_buf();
        let new_descriptor = folder.join(project_file_name(new_name));
        if new_descriptor.exists() {
            return Err(ManagerError::FileCollision(new_descriptor));
        }

        let owned = record.origin == ProjectOrigin::Owned;
        let new_folder = match folder.parent() {
            Some(parent) if owned => Some(parent.join(new_name)),
            _ => None,
        };
        if let Some(new_folder) = &new_folder {
            if new_folder.exists() {
                return Err(ManagerError::FileCollision(new_folder.clone()));
            }
        }

        let plan = plan_workspace_renames(&record, new_name);
        let was_current = self.current_project().as_deref() == Some(project);
        let mut closed = self.close_project(project)?;

        let mut steps = Vec::new();
        if let Err(e) = apply_renames(&record, &new_descriptor, &plan, &mut steps).await {
            error!(project = %project, error = %e, "Rename failed, undoing completed steps");
            undo_renames(steps).await;
            self.refresh().await?;
            if let Err(reopen) = self.reopen_workspaces(project, &closed, was_current).await {
                warn!(project = %project, error = %reopen, "Could not reopen workspaces");
            }
            return Err(e.into());
        }

        // The files are renamed; a folder that cannot follow stays as it is
        let final_folder = match new_folder {
            Some(new_folder) => match fs::rename(&folder, &new_folder).await {
                Ok(()) => new_folder,
                Err(e) => {
                    warn!(folder = %folder.display(), error = %e, "Could not rename project folder");
                    folder.clone()
                }
            },
            None => folder.clone(),
        };

        let relocate = |path: &Path| final_folder.join(file_name_string(path));
        let mut moves = vec![(record.descriptor_path.clone(), relocate(&new_descriptor))];
        moves.extend(plan.iter().map(|(old, new)| (old.clone(), relocate(new))));

        let descriptions_path = self.registry.descriptions_path();
        let mut descriptions = read_descriptions(&descriptions_path).await?;
        let mut changed = false;
        for (old, new) in &moves {
            changed |= descriptions.rename(old, new);
        }
        if changed {
            write_descriptions(&descriptions_path, &descriptions).await?;
        }
        self.registry.ledger().rename_paths(&moves).await?;

        if !owned {
            let new_path = relocate(&new_descriptor);
            for root in self.registry.roots().to_vec() {
                replace_in_library(&root, &record.descriptor_path, &new_path).await?;
            }
        }

        info!(project = %project, new_name = %new_name, "Renamed project");
        self.refresh().await?;

        remap(&mut closed, &moves);
        self.reopen_workspaces(new_name, &closed, was_current).await?;
        Ok(true)
    }

    /// Remove a project from the manager.
    ///
    /// Owned projects lose their descriptor and workspaces, and their folder
    /// when nothing else is left in it. Imported ones are only dropped from
    /// the library lists.
    pub async fn remove_project(&mut self, project: &str) -> Result<(), ManagerError> {
        let record = self.project(project)?.clone();
        self.close_project(project)?;

        match record.origin {
            ProjectOrigin::Owned => {
                delete_document(&record.descriptor_path).await?;
                for workspace in &record.workspaces {
                    delete_document(&workspace.path).await?;
                }
                let root = self
                    .registry
                    .which_root(&record.descriptor_path)
                    .map(Path::to_path_buf);
                remove_empty_dirs(record.folder(), root.as_deref()).await?;
            }
            ProjectOrigin::Imported => {
                for root in self.registry.roots().to_vec() {
                    remove_from_library(&root, &record.descriptor_path).await?;
                }
            }
        }

        let descriptions_path = self.registry.descriptions_path();
        let mut descriptions = read_descriptions(&descriptions_path).await?;
        let mut changed = descriptions.remove(&record.descriptor_path);
        for workspace in &record.workspaces {
            changed |= descriptions.remove(&workspace.path);
        }
        if changed {
            write_descriptions(&descriptions_path, &descriptions).await?;
        }
        self.registry
            .ledger()
            .forget_project(&record.descriptor_path)
            .await?;

        info!(project = %project, "Removed project");
        self.host
            .status_message(&format!("Project \"{}\" is removed.", project));
        self.refresh().await
    }

    /// Descriptor of the active window, if it can be imported
    pub fn importable_project(&self) -> Result<PathBuf, ManagerError> {
        let descriptor = self
            .host
            .active_window()
            .and_then(|w| w.project_file)
            .ok_or(ManagerError::NoProjectFile)?;
        if self.is_managed(&descriptor) {
            return Err(ManagerError::AlreadyManaged);
        }
        Ok(descriptor)
    }

    /// Reference the active window's descriptor from a root's library.
    /// Returns false when it was already listed.
    pub async fn import_project(&mut self, root: &Path) -> Result<bool, ManagerError> {
        let descriptor = self.importable_project()?;
        let added = add_to_library(root, &descriptor).await?;
        if added {
            info!(project = %stem_name(&descriptor), root = %root.display(), "Imported project");
        }
        self.refresh().await?;
        Ok(added)
    }

    /// Projects whose first folder no longer exists. Projects without any
    /// folder are never considered dead.
    pub fn dead_projects(&self) -> Vec<String> {
        self.table()
            .iter()
            .filter(|p| !p.root_folder.as_os_str().is_empty() && !p.root_folder.exists())
            .map(|p| p.name.clone())
            .collect()
    }

    /// Current description of a descriptor or workspace
    pub async fn description_of(&self, target: &Path) -> Result<Option<String>, ManagerError> {
        let descriptions = self.descriptions().await?;
        Ok(descriptions.get(target).map(str::to_string))
    }

    /// Set, or with empty text remove, the description of a descriptor or
    /// workspace. Returns whether anything changed.
    pub async fn set_description(&self, target: &Path, text: &str) -> Result<bool, ManagerError> {
        let changed = set_description(&self.registry.descriptions_path(), target, text).await?;
        if changed {
            let message = if text.is_empty() {
                "Description removed !"
            } else {
                "Description updated !"
            };
            self.host.status_message(message);
        }
        Ok(changed)
    }
}

/// Descriptor contents for a new project, based on the window's project
/// data. Folder paths are made absolute, and portable outside Windows.
fn seed_descriptor(data: Option<Value>, window_project: Option<&Path>) -> Value {
    let mut data = match data {
        Some(data) if data.is_object() => data,
        _ => Value::Object(Map::new()),
    };

    if let Some(folders) = data.get_mut("folders").and_then(Value::as_array_mut) {
        for folder in folders.iter_mut() {
            let Some(path) = folder.get("path").and_then(Value::as_str).map(str::to_string) else {
                continue;
            };
            let expanded = expand_path(&path, window_project);
            let stored = if cfg!(windows) {
                expanded.display().to_string()
            } else {
                pretty_path(&expanded)
            };
            folder["path"] = Value::String(stored);
        }
    }
    data
}

/// Where each workspace of a project goes when it is renamed. Only the
/// default workspace changes name; when `<new_name>` is taken it becomes
/// `Workspace`, then `Workspace_1`, `Workspace_2`...
fn plan_workspace_renames(record: &ProjectRecord, new_name: &str) -> Vec<(PathBuf, PathBuf)> {
    let folder = record.folder();
    let mut plan: Vec<(PathBuf, PathBuf)> = Vec::new();

    for workspace in &record.workspaces {
        let target = if workspace.name == record.name {
            let is_free = |path: &PathBuf| !path.exists() && !plan.iter().any(|(_, t)| t == path);
            let mut candidates = std::iter::once(new_name.to_string())
                .chain(std::iter::once("Workspace".to_string()))
                .chain((1..).map(|i| format!("Workspace_{}", i)))
                .map(|name| folder.join(workspace_file_name(&name)));
            candidates
                .find(|path| is_free(path))
                .unwrap_or_else(|| workspace.path.clone())
        } else {
            workspace.path.clone()
        };
        plan.push((workspace.path.clone(), target));
    }
    plan
}

async fn apply_renames(
    record: &ProjectRecord,
    new_descriptor: &Path,
    plan: &[(PathBuf, PathBuf)],
    steps: &mut Vec<RenameStep>,
) -> Result<(), std::io::Error> {
    fs::rename(&record.descriptor_path, new_descriptor).await?;
    steps.push(RenameStep::Moved {
        from: record.descriptor_path.clone(),
        to: new_descriptor.to_path_buf(),
    });

    let affiliation = file_name_string(new_descriptor);
    for (old, new) in plan {
        if old != new {
            fs::rename(old, new).await?;
            steps.push(RenameStep::Moved {
                from: old.clone(),
                to: new.clone(),
            });
        }

        let mut document: WorkspaceDocument = read_document(new, Some(WorkspaceDocument::default()))
            .await
            .map_err(std::io::Error::other)?;
        let previous = document.project.replace(affiliation.clone());
        write_document(new, &document)
            .await
            .map_err(std::io::Error::other)?;
        steps.push(RenameStep::Affiliated {
            workspace: new.clone(),
            previous,
        });
    }
    Ok(())
}

async fn undo_renames(steps: Vec<RenameStep>) {
    for step in steps.into_iter().rev() {
        match step {
            RenameStep::Moved { from, to } => {
                if let Err(e) = fs::rename(&to, &from).await {
                    warn!(from = %to.display(), to = %from.display(), error = %e, "Could not undo rename");
                }
            }
            RenameStep::Affiliated { workspace, previous } => {
                let restored = async {
                    let mut document: WorkspaceDocument =
                        read_document(&workspace, Some(WorkspaceDocument::default())).await?;
                    document.project = previous;
                    write_document(&workspace, &document).await
                };
                if let Err(e) = restored.await {
                    warn!(workspace = %workspace.display(), error = %e, "Could not restore workspace project");
                }
            }
        }
    }
}

/// Remove `dir` and its parents while they are empty, never going above
/// `stop`
async fn remove_empty_dirs(dir: &Path, stop: Option<&Path>) -> Result<(), ManagerError> {
    let mut current = Some(dir.to_path_buf());
    while let Some(dir) = current {
        if stop.is_some_and(|stop| dir == stop) || !dir.is_dir() {
            break;
        }
        let mut entries = fs::read_dir(&dir).await?;
        if entries.next_entry().await?.is_some() {
            break;
        }
        fs::remove_dir(&dir).await?;
        info!(dir = %dir.display(), "Removed empty project folder");
        current = dir.parent().map(Path::to_path_buf);
    }
    Ok(())
}
