/// Explicit choices that skip the matching prompts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Project name
    pub project: Option<String>,
    /// Workspace name; without `project`, of the current project
    pub workspace: Option<String>,
    /// Answer to the text prompt of the action (name or description)
    pub value: Option<String>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.project.is_none() && self.workspace.is_none() && self.value.is_none()
    }
}

/// Everything the project manager can be asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    OpenProject(Overrides),
    OpenProjectInNewWindow(Overrides),
    OpenWorkspace(Overrides),
    OpenWorkspaceInNewWindow(Overrides),
    AppendProject(Overrides),
    EditProject(Overrides),
    SetDescription(Overrides),
    RenameProject(Overrides),
    RemoveProject(Overrides),
    RenameWorkspace(Overrides),
    RemoveWorkspace(Overrides),
    CreateProject(Overrides),
    AddWorkspace(Overrides),
    AddFolder,
    ImportProject,
    RefreshProjects,
    ClearRecentProjects,
    RemoveDeadProjects,
    ShowOptions,
}

impl Action {
    /// Entries of the options menu, in menu order
    pub fn menu() -> Vec<Action> {
        let none = Overrides::default;
        vec![
            Action::OpenProject(none()),
            Action::OpenProjectInNewWindow(none()),
            Action::OpenWorkspace(none()),
            Action::OpenWorkspaceInNewWindow(none()),
            Action::AppendProject(none()),
            Action::EditProject(none()),
            Action::SetDescription(none()),
            Action::RenameProject(none()),
            Action::RemoveProject(none()),
            Action::RenameWorkspace(none()),
            Action::RemoveWorkspace(none()),
            Action::CreateProject(none()),
            Action::AddWorkspace(none()),
            Action::AddFolder,
            Action::ImportProject,
            Action::RefreshProjects,
            Action::ClearRecentProjects,
            Action::RemoveDeadProjects,
        ]
    }

    /// Look an action up by its snake_case name
    pub fn from_name(name: &str, overrides: Overrides) -> Option<Action> {
        let action = match name {
            "open_project" => Action::OpenProject(overrides),
            "open_project_in_new_window" => Action::OpenProjectInNewWindow(overrides),
            "open_workspace" => Action::OpenWorkspace(overrides),
            "open_workspace_in_new_window" => Action::OpenWorkspaceInNewWindow(overrides),
            "append_project" => Action::AppendProject(overrides),
            "edit_project" => Action::EditProject(overrides),
            "set_description" => Action::SetDescription(overrides),
            "rename_project" => Action::RenameProject(overrides),
            "remove_project" => Action::RemoveProject(overrides),
            "rename_workspace" => Action::RenameWorkspace(overrides),
            "remove_workspace" => Action::RemoveWorkspace(overrides),
            "create_project" => Action::CreateProject(overrides),
            "add_workspace" => Action::AddWorkspace(overrides),
            "add_folder" => Action::AddFolder,
            "import_project" => Action::ImportProject,
            "refresh_projects" => Action::RefreshProjects,
            "clear_recent_projects" => Action::ClearRecentProjects,
            "remove_dead_projects" => Action::RemoveDeadProjects,
            "show_options" => Action::ShowOptions,
            _ => return None,
        };
        Some(action)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::OpenProject(_) => "open_project",
            Action::OpenProjectInNewWindow(_) => "open_project_in_new_window",
            Action::OpenWorkspace(_) => "open_workspace",
            Action::OpenWorkspaceInNewWindow(_) => "open_workspace_in_new_window",
            Action::AppendProject(_) => "append_project",
            Action::EditProject(_) => "edit_project",
            Action::SetDescription(_) => "set_description",
            Action::RenameProject(_) => "rename_project",
            Action::RemoveProject(_) => "remove_project",
            Action::RenameWorkspace(_) => "rename_workspace",
            Action::RemoveWorkspace(_) => "remove_workspace",
            Action::CreateProject(_) => "create_project",
            Action::AddWorkspace(_) => "add_workspace",
            Action::AddFolder => "add_folder",
            Action::ImportProject => "import_project",
            Action::RefreshProjects => "refresh_projects",
            Action::ClearRecentProjects => "clear_recent_projects",
            Action::RemoveDeadProjects => "remove_dead_projects",
            Action::ShowOptions => "show_options",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::OpenProject(_) => "Open Project",
            Action::OpenProjectInNewWindow(_) => "Open Project in New Window",
            Action::OpenWorkspace(_) => "Open Workspace",
            Action::OpenWorkspaceInNewWindow(_) => "Open Workspace in New Window",
            Action::AppendProject(_) => "Append Project",
            Action::EditProject(_) => "Edit Project",
            Action::SetDescription(_) => "Set Description",
            Action::RenameProject(_) => "Rename Project",
            Action::RemoveProject(_) => "Remove Project",
            Action::RenameWorkspace(_) => "Rename Workspace",
            Action::RemoveWorkspace(_) => "Remove Workspace",
            Action::CreateProject(_) => "Create New Project",
            Action::AddWorkspace(_) => "Add New Workspace",
            Action::AddFolder => "Add Folder to Project",
            Action::ImportProject => "Import Project",
            Action::RefreshProjects => "Refresh Projects",
            Action::ClearRecentProjects => "Clear Recent Projects",
            Action::RemoveDeadProjects => "Remove Dead Projects",
            Action::ShowOptions => "Project Manager",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Action::OpenProject(_) => "Open project in the current window",
            Action::OpenProjectInNewWindow(_) => "Open project in a new window",
            Action::OpenWorkspace(_) => "Open new workspace in the current window",
            Action::OpenWorkspaceInNewWindow(_) => "Open new workspace in a new window",
            Action::AppendProject(_) => "Append project to current window",
            Action::EditProject(_) => "Edit project settings",
            Action::SetDescription(_) => "Set project or workspace description",
            Action::RenameProject(_) => "Rename project",
            Action::RemoveProject(_) => "Remove from Project Manager",
            Action::RenameWorkspace(_) => "Rename Workspace",
            Action::RemoveWorkspace(_) => "Remove workspace from Project Manager",
            Action::CreateProject(_) => "Create a new project and add current folders to it",
            Action::AddWorkspace(_) => "Add a new workspace to the current project",
            Action::AddFolder => "Add a folder to the current project",
            Action::ImportProject => "Import current .sublime-project file",
            Action::RefreshProjects => "Refresh Projects",
            Action::ClearRecentProjects => "Clear Recent Projects",
            Action::RemoveDeadProjects => "Remove Dead Projects",
            Action::ShowOptions => "Show every action",
        }
    }

    pub fn overrides(&self) -> Overrides {
        match self {
            Action::OpenProject(o)
            | Action::OpenProjectInNewWindow(o)
            | Action::OpenWorkspace(o)
            | Action::OpenWorkspaceInNewWindow(o)
            | Action::AppendProject(o)
            | Action::EditProject(o)
            | Action::SetDescription(o)
            | Action::RenameProject(o)
            | Action::RemoveProject(o)
            | Action::RenameWorkspace(o)
            | Action::RemoveWorkspace(o)
            | Action::CreateProject(o)
            | Action::AddWorkspace(o) => o.clone(),
            Action::AddFolder
            | Action::ImportProject
            | Action::RefreshProjects
            | Action::ClearRecentProjects
            | Action::RemoveDeadProjects
            | Action::ShowOptions => Overrides::default(),
        }
    }
}
