use super::{sort_by_recency, DisplayError, MenuItem, ProjectListing, RankContext};
use crate::registry::{ProjectRecord, ProjectTable};
use crate::template::{ProjectLabelContext, TemplateEngine};
use crate::utils::{normalize_path, pretty_path};

/// Order and label every project of the table.
///
/// Projects are sorted by name, then optionally by recency, then optionally
/// with open projects moved to the front. Each step is stable.
pub fn rank_projects(
    table: &ProjectTable,
    ctx: &RankContext<'_>,
    engine: &TemplateEngine,
) -> Result<Vec<ProjectListing>, DisplayError> {
    let settings = ctx.settings;

    let mut projects: Vec<&ProjectRecord> = table.iter().collect();
    projects.sort_by(|a, b| a.name.cmp(&b.name));

    if settings.show_recent_projects_first {
        let recent: Vec<_> = ctx.recent.iter().map(|e| e.project_path()).collect();
        sort_by_recency(&mut projects, |p| {
            let descriptor = normalize_path(&p.descriptor_path);
            recent.iter().position(|r| *r == descriptor)
        });
    }

    let is_open = |p: &ProjectRecord| p.is_open || ctx.open.is_project_open(&p.descriptor_path);

    if settings.show_active_projects_first {
        let (open, closed): (Vec<_>, Vec<_>) = projects.into_iter().partition(|p| is_open(p));
        projects = open.into_iter().chain(closed).collect();
    }

    projects
        .into_iter()
        .map(|project| {
            let indicator = if is_open(project) {
                settings.active_project_indicator.clone()
            } else {
                String::new()
            };
            let label = engine.render_project_label(
                &settings.project_display_format,
                &ProjectLabelContext {
                    project_name: project.name.clone(),
                    project_group: project.group.clone(),
                    active_project_indicator: indicator,
                },
            )?;

            let item = match ctx.descriptions.get(&project.descriptor_path) {
                Some(description) => MenuItem::new(label, description),
                None => {
                    let mut item = MenuItem::new(label, pretty_path(&project.root_folder));
                    let count = project.workspaces.len();
                    if settings.activate_workspaces && count > 1 {
                        item.annotation = Some(format!("{} workspaces", count));
                    }
                    item
                }
            };

            Ok(ProjectListing {
                key: project.name.clone(),
                item,
                descriptor: project.descriptor_path.clone(),
            })
        })
        .collect()
}
