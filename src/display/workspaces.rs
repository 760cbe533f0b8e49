use super::{
    format_buffers, sort_by_recency, DisplayError, MenuItem, RankContext, WorkspaceListing,
    DEFAULT_WORKSPACE_LABEL,
};
use crate::registry::{ProjectTable, WorkspaceDocument};
use crate::store::read_document;
use crate::utils::normalize_path;
use std::path::PathBuf;

struct Candidate {
    path: PathBuf,
    name: String,
    buffers: Vec<String>,
}

/// Order and label the workspaces of one project.
///
/// Workspace documents are read to list their buffers; an unreadable one
/// simply shows no buffers.
pub async fn rank_workspaces(
    table: &ProjectTable,
    ctx: &RankContext<'_>,
    project: &str,
) -> Result<Vec<WorkspaceListing>, DisplayError> {
    let settings = ctx.settings;
    let record = table
        .get(project)
        .ok_or_else(|| DisplayError::ProjectNotFound(project.to_string()))?;

    let mut candidates = Vec::with_capacity(record.workspaces.len());
    for workspace in &record.workspaces {
        let document: WorkspaceDocument =
            read_document(&workspace.path, Some(WorkspaceDocument::default())).await?;
        candidates.push(Candidate {
            path: workspace.path.clone(),
            name: workspace.name.clone(),
            buffers: document.buffer_files(),
        });
    }
    candidates.sort_by(|a, b| a.name.cmp(&b.name));

    if settings.show_recent_workspaces_first {
        let descriptor = normalize_path(&record.descriptor_path);
        if let Some(entry) = ctx.recent.iter().find(|e| e.project_path() == descriptor) {
            let recent = entry.workspace_paths();
            sort_by_recency(&mut candidates, |c| {
                let path = normalize_path(&c.path);
                recent.iter().position(|r| *r == path)
            });

            // The most recent one is what the current window already shows
            let in_current_window = ctx.current_project == Some(project);
            if settings.show_most_recent_workspace_second
                && in_current_window
                && candidates.len() >= 2
                && recent.contains(&normalize_path(&candidates[0].path))
            {
                candidates.swap(0, 1);
            }
        }
    }

    if settings.show_default_workspace_first {
        if let Some(index) = candidates.iter().position(|c| c.name == project) {
            let default = candidates.remove(index);
            candidates.insert(0, default);
        }
    }

    Ok(candidates
        .into_iter()
        .map(|candidate| {
            let mut label = if candidate.name == project {
                DEFAULT_WORKSPACE_LABEL.to_string()
            } else {
                candidate.name.clone()
            };
            if ctx.open.is_workspace_open(&candidate.path) {
                label.push_str(&settings.active_workspace_indicator);
            }

            let secondary = match ctx.descriptions.get(&candidate.path) {
                Some(description) => description.to_string(),
                None => format_buffers(&candidate.buffers),
            };

            WorkspaceListing {
                path: candidate.path,
                item: MenuItem::new(label, secondary),
                buffers: candidate.buffers,
            }
        })
        .collect())
}
