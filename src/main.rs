use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use project_manager::utils::home_dir;
use project_manager::{
    read_settings, Action, Answer, CommandSession, LaunchRequest, Manager, MemoryHost, Overrides,
    ProjectRegistry, Prompt, Step,
};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::EnvFilter;

const SETTINGS_FILE: &str = "Project Manager.sublime-settings";
const PROJECTS_DIR: &str = "projects";

/// Project Manager - organize editor projects and their workspaces
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings document
    #[arg(long, env = "PROJECT_MANAGER_SETTINGS")]
    settings: Option<PathBuf>,

    /// Directory holding the default projects directory
    #[arg(long, env = "PROJECT_MANAGER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Answer every confirmation with yes
    #[arg(short, long)]
    yes: bool,

    /// Descriptor shown by the active editor window
    #[arg(long, env = "PROJECT_MANAGER_ACTIVE_PROJECT")]
    active_project: Option<PathBuf>,

    /// Workspace shown by the active editor window
    #[arg(long, env = "PROJECT_MANAGER_ACTIVE_WORKSPACE")]
    active_workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
struct Target {
    /// Project to act on instead of asking
    #[arg(long)]
    project: Option<String>,

    /// Workspace to act on instead of asking
    #[arg(long)]
    workspace: Option<String>,

    /// Name or description to use instead of asking
    #[arg(long)]
    value: Option<String>,
}

impl From<Target> for Overrides {
    fn from(target: Target) -> Self {
        Overrides {
            project: target.project,
            workspace: target.workspace,
            value: target.value,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a project in the current window
    OpenProject(Target),
    /// Open a project in a new window
    OpenProjectInNewWindow(Target),
    /// Open another workspace in the current window
    OpenWorkspace(Target),
    /// Open another workspace in a new window
    OpenWorkspaceInNewWindow(Target),
    /// Add a project's folders to the current window
    AppendProject(Target),
    /// Open a project's descriptor for editing
    EditProject(Target),
    /// Set or remove a project or workspace description
    SetDescription(Target),
    RenameProject(Target),
    RemoveProject(Target),
    RenameWorkspace(Target),
    RemoveWorkspace(Target),
    /// Create a project from the current window's folders
    CreateProject(Target),
    AddWorkspace(Target),
    /// Add a folder to the current window
    AddFolder,
    /// Import the current window's project file
    ImportProject,
    RefreshProjects,
    ClearRecentProjects,
    /// Remove projects whose folder no longer exists
    RemoveDeadProjects,
    /// Show every action
    Options,
}

impl Command {
    fn into_action(self) -> Action {
        match self {
            Command::OpenProject(t) => Action::OpenProject(t.into()),
            Command::OpenProjectInNewWindow(t) => Action::OpenProjectInNewWindow(t.into()),
            Command::OpenWorkspace(t) => Action::OpenWorkspace(t.into()),
            Command::OpenWorkspaceInNewWindow(t) => Action::OpenWorkspaceInNewWindow(t.into()),
            Command::AppendProject(t) => Action::AppendProject(t.into()),
            Command::EditProject(t) => Action::EditProject(t.into()),
            Command::SetDescription(t) => Action::SetDescription(t.into()),
            Command::RenameProject(t) => Action::RenameProject(t.into()),
            Command::RemoveProject(t) => Action::RemoveProject(t.into()),
            Command::RenameWorkspace(t) => Action::RenameWorkspace(t.into()),
            Command::RemoveWorkspace(t) => Action::RemoveWorkspace(t.into()),
            Command::CreateProject(t) => Action::CreateProject(t.into()),
            Command::AddWorkspace(t) => Action::AddWorkspace(t.into()),
            Command::AddFolder => Action::AddFolder,
            Command::ImportProject => Action::ImportProject,
            Command::RefreshProjects => Action::RefreshProjects,
            Command::ClearRecentProjects => Action::ClearRecentProjects,
            Command::RemoveDeadProjects => Action::RemoveDeadProjects,
            Command::Options => Action::ShowOptions,
        }
    }
}

/// Prints what the in-memory host recorded since the last call
#[derive(Default)]
struct Transcript {
    launches: usize,
    opened: usize,
    statuses: usize,
    dialogs: usize,
    folder_prompts: usize,
}

impl Transcript {
    fn flush(&mut self, host: &MemoryHost) {
        for message in host.statuses().iter().skip(self.statuses) {
            println!("{}", message);
            self.statuses += 1;
        }
        for message in host.dialogs().iter().skip(self.dialogs) {
            println!("!! {}", message);
            self.dialogs += 1;
        }
        for request in host.launches().iter().skip(self.launches) {
            println!("{}", editor_command(request));
            self.launches += 1;
        }
        for file in host.opened_files().iter().skip(self.opened) {
            println!("subl {}", quote(file));
            self.opened += 1;
        }
        if host.folder_prompts() > self.folder_prompts {
            println!("subl --command prompt_add_folder");
            self.folder_prompts = host.folder_prompts();
        }
    }
}

fn quote(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

/// Editor command line carrying out a launch request
fn editor_command(request: &LaunchRequest) -> String {
    match request {
        LaunchRequest::OpenWorkspace {
            workspace,
            new_window: true,
        } => format!("subl -n --project {}", quote(workspace)),
        LaunchRequest::OpenWorkspace { workspace, .. } => {
            format!("subl --project {}", quote(workspace))
        }
        LaunchRequest::Focus { path } => format!("subl {}", quote(path)),
        LaunchRequest::AppendFolders { folders } => {
            let folders: Vec<String> = folders.iter().map(|f| quote(f)).collect();
            format!("subl -a {}", folders.join(" "))
        }
    }
}

/// Ask a prompt on the terminal. End of input cancels.
async fn ask(prompt: &Prompt, yes: bool, lines: &mut Lines<BufReader<Stdin>>) -> Result<Answer> {
    let mut stdout = tokio::io::stdout();
    match prompt {
        Prompt::Confirm { message } if yes => {
            println!("{} yes", message);
            return Ok(Answer::Confirmed(true));
        }
        Prompt::Confirm { message } => {
            stdout.write_all(format!("{} [y/N] ", message).as_bytes()).await?;
        }
        Prompt::Input { caption, initial } => {
            stdout
                .write_all(format!("{} [{}] ", caption, initial).as_bytes())
                .await?;
        }
        Prompt::Choose { title, items } => {
            println!("{}", title);
            for (index, item) in items.iter().enumerate() {
                match &item.annotation {
                    Some(note) => println!("{:>3}. {} ({})", index + 1, item.primary, note),
                    None => println!("{:>3}. {}", index + 1, item.primary),
                }
                if !item.secondary.is_empty() {
                    println!("     {}", item.secondary);
                }
            }
            stdout.write_all(b"> ").await?;
        }
    }
    stdout.flush().await?;

    let Some(line) = lines.next_line().await.context("Failed to read answer")? else {
        return Ok(Answer::Cancelled);
    };
    let line = line.trim();

    let answer = match prompt {
        Prompt::Confirm { .. } => Answer::Confirmed(matches!(line, "y" | "Y" | "yes")),
        Prompt::Input { initial, .. } if line.is_empty() => Answer::Text(initial.clone()),
        Prompt::Input { .. } => Answer::Text(line.to_string()),
        Prompt::Choose { items, .. } => match line.parse::<usize>() {
            Ok(n) if n >= 1 && n <= items.len() => Answer::Chosen(n - 1),
            _ => Answer::Cancelled,
        },
    };
    Ok(answer)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => home_dir()
            .context("Cannot locate the home directory, pass --data-dir")?
            .join(".project-manager"),
    };
    let settings_path = args
        .settings
        .unwrap_or_else(|| data_dir.join(SETTINGS_FILE));
    let settings = read_settings(&settings_path).await?.unwrap_or_default();

    let host = MemoryHost::new();
    if args.active_project.is_some() || args.active_workspace.is_some() {
        host.add_window(args.active_project.as_deref(), args.active_workspace.as_deref());
    }

    let registry = ProjectRegistry::open(settings, data_dir.join(PROJECTS_DIR)).await?;
    let mut manager = Manager::new(registry, host);

    let report = manager.startup(&settings_path).await?;
    if !report.migrations.migrations_applied.is_empty() {
        info!(applied = ?report.migrations.migrations_applied, "Migrations applied");
    }
    info!(projects = manager.table().len(), "Projects loaded");

    let action = args
        .command
        .map(Command::into_action)
        .unwrap_or(Action::ShowOptions);

    let mut transcript = Transcript::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session = CommandSession::new();

    let mut step = session.start(&mut manager, action).await;
    transcript.flush(manager.host());
    while let Step::Prompt(prompt) = step {
        let answer = ask(&prompt, args.yes, &mut lines).await?;
        step = session.resume(&mut manager, answer).await;
        transcript.flush(manager.host());
    }

    if let Some(label) = manager.status_label() {
        println!("{}", label);
    }
    Ok(())
}
