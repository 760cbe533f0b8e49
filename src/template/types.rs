use serde::Serialize;

/// Context for project labels
/// Placeholders: {{project_name}}, {{project_group}}, {{active_project_indicator}}
#[derive(Debug, Clone, Serialize)]
pub struct ProjectLabelContext {
    pub project_name: String,
    pub project_group: String,
    /// The configured indicator when the project is open, empty otherwise
    pub active_project_indicator: String,
}
