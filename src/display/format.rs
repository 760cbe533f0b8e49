use crate::config::Settings;
use crate::host::WindowInfo;
use crate::registry::ProjectTable;
use crate::utils::{file_name_string, stem_name};
use std::path::Path;

/// Characters of buffer names shown before the list is cut short
pub const BUFFER_DETAILS_BUDGET: usize = 80;

/// Hard limit on the length of one buffer name in the details line
const BUFFER_DETAILS_LIMIT: usize = 85;

/// Secondary line of a workspace entry: base names of its buffers joined by
/// ` / `, cut with a `[...] (+N more)` suffix once the budget is spent.
pub fn format_buffers(files: &[String]) -> String {
    let names: Vec<String> = files
        .iter()
        .map(|f| file_name_string(Path::new(f)))
        .collect();

    let mut details = String::new();
    let mut length = 0;
    for (i, name) in names.iter().enumerate() {
        let room = BUFFER_DETAILS_LIMIT.saturating_sub(length);
        let shown: String = name.chars().take(room).collect();
        length += shown.chars().count();
        details.push_str(&shown);

        let remaining = names.len() - i - 1;
        if length >= BUFFER_DETAILS_BUDGET && remaining > 0 {
            details.push_str(&format!(" [...] (+{} more)", remaining));
            break;
        }
        if remaining > 0 {
            details.push_str(" / ");
            length += 3;
        }
    }
    details
}

/// Status bar text for a window: `[group/name]`, with `:workspace` appended
/// when the window is not on the default workspace. `None` when disabled or
/// the window shows no managed project.
pub fn status_label(table: &ProjectTable, window: &WindowInfo, settings: &Settings) -> Option<String> {
    if !settings.display_in_status_bar {
        return None;
    }

    let project_file = window.project_file.as_deref()?;
    let name = stem_name(project_file);
    let project = table.get(&name)?;

    let mut label = format!("[{}{}", project.group, name);
    if let Some(workspace) = window.workspace_file.as_deref() {
        let workspace_name = stem_name(workspace);
        if workspace_name != name {
            label.push(':');
            label.push_str(&workspace_name);
        }
    }
    label.push(']');
    Some(label)
}
