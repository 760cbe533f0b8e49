use super::{Action, Answer, Overrides, Prompt, Step};
use crate::display::MenuItem;
use crate::host::Host;
use crate::manager::{Manager, ManagerError};
use crate::utils::{file_name_string, is_project_file, normalize_path, pretty_path, stem_name};
use std::path::PathBuf;
use tracing::{debug, warn};

/// What to do once a project is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProjectNext {
    /// Go on to pick a workspace of it
    PickWorkspace { new_window: bool },
    Switch,
    OpenInNewWindow,
    Append,
    Edit,
    /// Go on to pick the project itself or one of its workspaces
    PickDescribed,
    Describe,
    Rename,
    Remove,
}

/// What to do once a workspace is known; `None` stands for the default one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkspaceNext {
    Switch,
    OpenInNewWindow,
    Describe,
    Rename,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootNext {
    Create,
    Import,
}

/// The question a session is waiting on, with everything needed to act on
/// its answer
#[derive(Debug, Clone)]
enum Pending {
    Menu(Vec<Action>),
    Project {
        projects: Vec<String>,
        next: ProjectNext,
    },
    Workspace {
        project: String,
        choices: Vec<PathBuf>,
        next: WorkspaceNext,
    },
    Root {
        roots: Vec<PathBuf>,
        next: RootNext,
    },
    CreateName { root: PathBuf },
    RenameProject { project: String },
    AddWorkspace { project: String },
    RenameWorkspace { project: String, workspace: PathBuf },
    Description { target: PathBuf },
    RemoveProject { project: String },
    RemoveWorkspace { project: String, workspace: PathBuf },
    Import { root: PathBuf },
    ClearRecent,
    RemoveDead { current: String, remaining: Vec<String> },
}

/// Runs one action at a time, suspending on each prompt.
///
/// [`start`](CommandSession::start) begins an action and
/// [`resume`](CommandSession::resume) feeds it the answer to the last
/// prompt. Failures are reported through the host and end the action.
/// Dismissing a prompt of an action picked from the options menu brings
/// the menu back.
#[derive(Debug, Default)]
pub struct CommandSession {
    pending: Option<Pending>,
    overrides: Overrides,
    from_menu: bool,
}

impl CommandSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a prompt is waiting for an answer
    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    pub async fn start<H: Host>(&mut self, manager: &mut Manager<H>, action: Action) -> Step {
        self.pending = None;
        self.from_menu = false;
        debug!(action = action.name(), "Starting action");
        let result = self.dispatch(manager, action).await;
        self.finish(manager, result)
    }

    pub async fn resume<H: Host>(&mut self, manager: &mut Manager<H>, answer: Answer) -> Step {
        let Some(pending) = self.pending.take() else {
            return Step::Done;
        };
        let result = self.answer(manager, pending, answer).await;
        self.finish(manager, result)
    }

    fn finish<H: Host>(&mut self, manager: &Manager<H>, result: Result<Step, ManagerError>) -> Step {
        match result {
            Ok(step) => step,
            Err(e) => {
                warn!(error = %e, "Action failed");
                e.report(manager.host());
                self.pending = None;
                Step::Done
            }
        }
    }

    fn ask(&mut self, pending: Pending, prompt: Prompt) -> Result<Step, ManagerError> {
        self.pending = Some(pending);
        Ok(Step::Prompt(prompt))
    }

    fn cancelled<H: Host>(&mut self, manager: &Manager<H>) -> Result<Step, ManagerError> {
        if self.from_menu {
            self.menu(manager)
        } else {
            Ok(Step::Done)
        }
    }

    async fn dispatch<H: Host>(&mut self, manager: &mut Manager<H>, action: Action) -> Result<Step, ManagerError> {
        self.overrides = action.overrides();
        let activate = manager.settings().activate_workspaces;

        match action {
            Action::OpenProject(_) => {
                let next = if activate {
                    ProjectNext::PickWorkspace { new_window: false }
                } else {
                    ProjectNext::Switch
                };
                self.prompt_project(manager, next).await
            }
            Action::OpenProjectInNewWindow(_) => {
                let next = if activate {
                    ProjectNext::PickWorkspace { new_window: true }
                } else {
                    ProjectNext::OpenInNewWindow
                };
                self.prompt_project(manager, next).await
            }
            Action::OpenWorkspace(_) => {
                let project = self.target_project(manager)?;
                self.prompt_workspace(manager, project, WorkspaceNext::Switch, false)
                    .await
            }
            Action::OpenWorkspaceInNewWindow(_) => {
                let project = self.target_project(manager)?;
                self.prompt_workspace(manager, project, WorkspaceNext::OpenInNewWindow, false)
                    .await
            }
            Action::AppendProject(_) => self.prompt_project(manager, ProjectNext::Append).await,
            Action::EditProject(_) => self.prompt_project(manager, ProjectNext::Edit).await,
            Action::SetDescription(_) => {
                let next = if activate {
                    ProjectNext::PickDescribed
                } else {
                    ProjectNext::Describe
                };
                self.prompt_project(manager, next).await
            }
            Action::RenameProject(_) => self.prompt_project(manager, ProjectNext::Rename).await,
            Action::RemoveProject(_) => self.prompt_project(manager, ProjectNext::Remove).await,
            Action::RenameWorkspace(_) => {
                let project = self.target_project(manager)?;
                self.prompt_workspace(manager, project, WorkspaceNext::Rename, true)
                    .await
            }
            Action::RemoveWorkspace(_) => {
                let project = self.target_project(manager)?;
                self.prompt_workspace(manager, project, WorkspaceNext::Remove, false)
                    .await
            }
            Action::CreateProject(_) => self.prompt_root(manager, RootNext::Create).await,
            Action::AddWorkspace(_) => {
                let project = self.target_project(manager)?;
                match self.overrides.value.clone() {
                    Some(name) => {
                        manager.add_workspace(&project, &name).await?;
                        Ok(Step::Done)
                    }
                    None => self.ask(
                        Pending::AddWorkspace { project },
                        Prompt::Input {
                            caption: "Workspace name:".to_string(),
                            initial: "New Workspace".to_string(),
                        },
                    ),
                }
            }
            Action::AddFolder => {
                manager.add_folder();
                Ok(Step::Done)
            }
            Action::ImportProject => self.prompt_root(manager, RootNext::Import).await,
            Action::RefreshProjects => {
                manager.refresh().await?;
                manager.host().status_message("Projects refreshed !");
                Ok(Step::Done)
            }
            Action::ClearRecentProjects => self.ask(
                Pending::ClearRecent,
                Prompt::Confirm {
                    message: "Clear recent projects ?".to_string(),
                },
            ),
            Action::RemoveDeadProjects => {
                let dead = manager.dead_projects();
                if dead.is_empty() {
                    manager.host().message_dialog("No Dead Projects.");
                    return Ok(Step::Done);
                }
                self.next_dead(manager, dead).await
            }
            Action::ShowOptions => self.menu(manager),
        }
    }

    async fn answer<H: Host>(
        &mut self,
        manager: &mut Manager<H>,
        pending: Pending,
        answer: Answer,
    ) -> Result<Step, ManagerError> {
        match (pending, answer) {
            (Pending::Menu(_), Answer::Cancelled) => Ok(Step::Done),
            (_, Answer::Cancelled) => self.cancelled(manager),

            (Pending::Menu(actions), Answer::Chosen(index)) => {
                let Some(action) = actions.get(index).cloned() else {
                    return Ok(Step::Done);
                };
                self.from_menu = true;
                self.dispatch(manager, action).await
            }
            (Pending::Project { projects, next }, Answer::Chosen(index)) => {
                let Some(project) = projects.get(index).cloned() else {
                    return self.cancelled(manager);
                };
                self.with_project(manager, project, next).await
            }
            (
                Pending::Workspace {
                    project,
                    choices,
                    next,
                },
                Answer::Chosen(index),
            ) => {
                let Some(workspace) = choices.get(index).cloned() else {
                    return self.cancelled(manager);
                };
                self.with_workspace(manager, project, Some(workspace), next)
                    .await
            }
            (Pending::Root { roots, next }, Answer::Chosen(index)) => {
                let Some(root) = roots.get(index).cloned() else {
                    return self.cancelled(manager);
                };
                self.with_root(manager, root, next).await
            }

            (Pending::CreateName { root }, Answer::Text(name)) => {
                manager.create_project(&name, &root).await?;
                Ok(Step::Done)
            }
            (Pending::RenameProject { project }, Answer::Text(name)) => {
                manager.rename_project(&project, &name).await?;
                Ok(Step::Done)
            }
            (Pending::AddWorkspace { project }, Answer::Text(name)) => {
                manager.add_workspace(&project, &name).await?;
                Ok(Step::Done)
            }
            (Pending::RenameWorkspace { project, workspace }, Answer::Text(name)) => {
                manager.rename_workspace(&project, &workspace, &name).await?;
                Ok(Step::Done)
            }
            (Pending::Description { target }, Answer::Text(text)) => {
                manager.set_description(&target, &text).await?;
                Ok(Step::Done)
            }

            (Pending::RemoveProject { project }, Answer::Confirmed(true)) => {
                manager.remove_project(&project).await?;
                Ok(Step::Done)
            }
            (Pending::RemoveWorkspace { project, workspace }, Answer::Confirmed(true)) => {
                manager.remove_workspace(&project, &workspace).await?;
                Ok(Step::Done)
            }
            (Pending::Import { root }, Answer::Confirmed(yes)) => {
                if yes {
                    manager.import_project(&root).await?;
                } else {
                    manager.refresh().await?;
                }
                Ok(Step::Done)
            }
            (Pending::ClearRecent, Answer::Confirmed(true)) => {
                manager.clear_recent().await?;
                Ok(Step::Done)
            }
            (Pending::RemoveDead { current, remaining }, Answer::Confirmed(yes)) => {
                if yes {
                    manager.remove_project(&current).await?;
                }
                self.next_dead(manager, remaining).await
            }
            (_, Answer::Confirmed(false)) => Ok(Step::Done),

            (pending, answer) => {
                debug!(?pending, ?answer, "Answer does not fit the prompt");
                self.cancelled(manager)
            }
        }
    }

    /// The project named by the overrides, else the current one
    fn target_project<H: Host>(&self, manager: &Manager<H>) -> Result<String, ManagerError> {
        match &self.overrides.project {
            Some(project) => {
                manager.project(project)?;
                Ok(project.clone())
            }
            None => manager.current_project().ok_or(ManagerError::NoActiveProject),
        }
    }

    async fn prompt_project<H: Host>(
        &mut self,
        manager: &mut Manager<H>,
        next: ProjectNext,
    ) -> Result<Step, ManagerError> {
        if self.overrides.project.is_some() || self.overrides.workspace.is_some() {
            let project = self.target_project(manager)?;
            return self.with_project(manager, project, next).await;
        }

        let listings = manager.ranked_projects().await?;
        if listings.is_empty() {
            manager
                .host()
                .message_dialog("No projects are managed currently");
            return Ok(Step::Done);
        }

        let (projects, items): (Vec<String>, Vec<MenuItem>) =
            listings.into_iter().map(|l| (l.key, l.item)).unzip();
        self.ask(
            Pending::Project { projects, next },
            Prompt::Choose {
                title: "Project".to_string(),
                items,
            },
        )
    }

    async fn with_project<H: Host>(
        &mut self,
        manager: &mut Manager<H>,
        project: String,
        next: ProjectNext,
    ) -> Result<Step, ManagerError> {
        match next {
            ProjectNext::PickWorkspace { new_window } => {
                let next = if new_window {
                    WorkspaceNext::OpenInNewWindow
                } else {
                    WorkspaceNext::Switch
                };
                return self.prompt_workspace(manager, project, next, true).await;
            }
            ProjectNext::Switch => manager.switch_project(&project, None).await?,
            ProjectNext::OpenInNewWindow => {
                manager.open_in_new_window(&project, None, true).await?
            }
            ProjectNext::Append => manager.append_project(&project).await?,
            ProjectNext::Edit => manager.edit_project(&project)?,
            ProjectNext::PickDescribed => {
                return self
                    .prompt_workspace(manager, project, WorkspaceNext::Describe, true)
                    .await;
            }
            ProjectNext::Describe => {
                let target = manager.project(&project)?.descriptor_path.clone();
                return self.describe(manager, target).await;
            }
            ProjectNext::Rename => match self.overrides.value.clone() {
                Some(name) => {
                    manager.rename_project(&project, &name).await?;
                }
                None => {
                    return self.ask(
                        Pending::RenameProject {
                            project: project.clone(),
                        },
                        Prompt::Input {
                            caption: "New project name:".to_string(),
                            initial: project,
                        },
                    );
                }
            },
            ProjectNext::Remove => {
                let message = format!("Remove \"{}\" from Project Manager?", project);
                return self.ask(Pending::RemoveProject { project }, Prompt::Confirm { message });
            }
        }
        Ok(Step::Done)
    }

    /// Pick a workspace of a project.
    ///
    /// With `allow_default`, a project with a single workspace skips the
    /// prompt and acts on its default workspace. Otherwise such a project
    /// has nothing to pick from.
    async fn prompt_workspace<H: Host>(
        &mut self,
        manager: &mut Manager<H>,
        project: String,
        next: WorkspaceNext,
        allow_default: bool,
    ) -> Result<Step, ManagerError> {
        let count = manager.project(&project)?.workspaces.len();

        if let Some(name) = self.overrides.workspace.clone() {
            if !allow_default && count == 1 {
                manager
                    .host()
                    .status_message("No workspace to execute this action");
                return Ok(Step::Done);
            }
            let workspace = manager.find_workspace(&project, &name)?;
            return self
                .with_workspace(manager, project, Some(workspace), next)
                .await;
        }

        if count < 2 {
            if !allow_default {
                manager
                    .host()
                    .status_message("No workspace to execute this action");
                return Ok(Step::Done);
            }
            return self.with_workspace(manager, project, None, next).await;
        }

        let listings = manager.ranked_workspaces(&project).await?;
        let (mut choices, mut items): (Vec<PathBuf>, Vec<MenuItem>) =
            listings.into_iter().map(|l| (l.path, l.item)).unzip();
        if next == WorkspaceNext::Describe {
            let descriptor = manager.project(&project)?.descriptor_path.clone();
            choices.insert(0, descriptor);
            items.insert(
                0,
                MenuItem::new(project.clone(), "Set description for the whole project"),
            );
        }

        self.ask(
            Pending::Workspace {
                project,
                choices,
                next,
            },
            Prompt::Choose {
                title: "Workspace".to_string(),
                items,
            },
        )
    }

    async fn with_workspace<H: Host>(
        &mut self,
        manager: &mut Manager<H>,
        project: String,
        workspace: Option<PathBuf>,
        next: WorkspaceNext,
    ) -> Result<Step, ManagerError> {
        match next {
            WorkspaceNext::Switch => {
                manager.switch_project(&project, workspace).await?;
                Ok(Step::Done)
            }
            WorkspaceNext::OpenInNewWindow => {
                manager.open_in_new_window(&project, workspace, false).await?;
                Ok(Step::Done)
            }
            WorkspaceNext::Describe => {
                let target = match workspace {
                    Some(target) => target,
                    None => manager.project(&project)?.descriptor_path.clone(),
                };
                self.describe(manager, target).await
            }
            WorkspaceNext::Rename => {
                let workspace = match workspace {
                    Some(workspace) => workspace,
                    None => manager.default_workspace(&project).await?,
                };
                match self.overrides.value.clone() {
                    Some(name) => {
                        manager.rename_workspace(&project, &workspace, &name).await?;
                        Ok(Step::Done)
                    }
                    None => {
                        let initial = stem_name(&workspace);
                        self.ask(
                            Pending::RenameWorkspace { project, workspace },
                            Prompt::Input {
                                caption: "New workspace name:".to_string(),
                                initial,
                            },
                        )
                    }
                }
            }
            WorkspaceNext::Remove => {
                let workspace = match workspace {
                    Some(workspace) => workspace,
                    None => manager.default_workspace(&project).await?,
                };
                let message = format!(
                    "Remove workspace \"{}\" from this project?\n\
                     Warning: this will close any window opened containing files \
                     attached to the corresponding project",
                    stem_name(&workspace)
                );
                self.ask(
                    Pending::RemoveWorkspace { project, workspace },
                    Prompt::Confirm { message },
                )
            }
        }
    }

    async fn describe<H: Host>(&mut self, manager: &mut Manager<H>, target: PathBuf) -> Result<Step, ManagerError> {
        if let Some(text) = self.overrides.value.clone() {
            manager.set_description(&target, &text).await?;
            return Ok(Step::Done);
        }

        let initial = match manager.description_of(&target).await? {
            Some(text) => text,
            None if is_project_file(&target) => "Project description".to_string(),
            None => "Workspace description".to_string(),
        };
        self.ask(
            Pending::Description { target },
            Prompt::Input {
                caption: "Description (empty to remove):".to_string(),
                initial,
            },
        )
    }

    /// Pick the root directory a new or imported project goes to. Only
    /// asked when several roots are configured and the setting allows it.
    async fn prompt_root<H: Host>(&mut self, manager: &mut Manager<H>, next: RootNext) -> Result<Step, ManagerError> {
        let registry = manager.registry();
        let primary = registry.primary_dir().to_path_buf();
        let default = normalize_path(registry.default_dir());

        if !manager.settings().prompt_project_location || normalize_path(&primary) == default {
            return self.with_root(manager, primary, next).await;
        }

        let mut roots = vec![primary.clone(), default.clone()];
        let mut items = vec![
            MenuItem::new("Primary Directory", pretty_path(&primary)),
            MenuItem::new("Default Directory", pretty_path(&default)),
        ];
        for root in registry.roots() {
            let normalized = normalize_path(root);
            if normalized == normalize_path(&primary) || normalized == default {
                continue;
            }
            items.push(MenuItem::new(file_name_string(root), pretty_path(root)));
            roots.push(root.clone());
        }

        self.ask(
            Pending::Root { roots, next },
            Prompt::Choose {
                title: "Location".to_string(),
                items,
            },
        )
    }

    async fn with_root<H: Host>(
        &mut self,
        manager: &mut Manager<H>,
        root: PathBuf,
        next: RootNext,
    ) -> Result<Step, ManagerError> {
        match next {
            RootNext::Create => match self.overrides.value.clone() {
                Some(name) => {
                    manager.create_project(&name, &root).await?;
                    Ok(Step::Done)
                }
                None => {
                    let initial = manager.suggested_project_name();
                    self.ask(
                        Pending::CreateName { root },
                        Prompt::Input {
                            caption: "Project name:".to_string(),
                            initial,
                        },
                    )
                }
            },
            RootNext::Import => {
                let descriptor = manager.importable_project()?;
                let message = format!("Import \"{}\"?", file_name_string(&descriptor));
                self.ask(Pending::Import { root }, Prompt::Confirm { message })
            }
        }
    }

    /// Ask about the next dead project still known, refreshing at the end
    async fn next_dead<H: Host>(
        &mut self,
        manager: &mut Manager<H>,
        mut remaining: Vec<String>,
    ) -> Result<Step, ManagerError> {
        while !remaining.is_empty() {
            let current = remaining.remove(0);
            if manager.table().contains(&current) {
                let message = format!("Remove \"{}\" from Project Manager?", current);
                return self.ask(
                    Pending::RemoveDead { current, remaining },
                    Prompt::Confirm { message },
                );
            }
        }
        manager.refresh().await?;
        Ok(Step::Done)
    }

    /// The options menu, without entries that cannot apply right now
    fn menu<H: Host>(&mut self, manager: &Manager<H>) -> Result<Step, ManagerError> {
        let current = manager.current_project();
        let workspaces = current
            .as_deref()
            .map_or(0, |project| manager.workspace_count(project));

        let actions: Vec<Action> = Action::menu()
            .into_iter()
            .filter(|action| match action {
                Action::OpenWorkspace(_)
                | Action::OpenWorkspaceInNewWindow(_)
                | Action::RemoveWorkspace(_) => workspaces >= 2,
                Action::AddWorkspace(_) | Action::RenameWorkspace(_) => current.is_some(),
                _ => true,
            })
            .collect();
        let items = actions
            .iter()
            .map(|action| MenuItem::new(action.label(), action.description()))
            .collect();

        self.overrides = Overrides::default();
        self.ask(
            Pending::Menu(actions),
            Prompt::Choose {
                title: "Project Manager".to_string(),
                items,
            },
        )
    }
}
