mod common;

use common::{
    create_source_folder, create_test_dir, open_manager, plain_settings, projects_dir,
    write_project, write_workspace,
};
use project_manager::config::{DirList, ProjectsSetting};
use project_manager::registry::load_library;
use project_manager::{
    Action, Answer, CommandSession, LaunchRequest, Overrides, Prompt, Settings, Step,
};

fn project(name: &str) -> Overrides {
    Overrides {
        project: Some(name.to_string()),
        ..Default::default()
    }
}

fn choices(step: &Step) -> Vec<String> {
    match step {
        Step::Prompt(Prompt::Choose { items, .. }) => {
            items.iter().map(|i| i.primary.clone()).collect()
        }
        other => panic!("Expected a choice, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rename_project_through_prompts() {
    let temp_dir = create_test_dir();
    write_project(&projects_dir(&temp_dir), "Alpha", None);
    let mut manager = open_manager(&temp_dir, plain_settings()).await;
    let mut session = CommandSession::new();

    let step = session
        .start(&mut manager, Action::RenameProject(Overrides::default()))
        .await;
    assert_eq!(choices(&step), vec!["Alpha"]);

    let step = session.resume(&mut manager, Answer::Chosen(0)).await;
    assert_eq!(
        step,
        Step::Prompt(Prompt::Input {
            caption: "New project name:".to_string(),
            initial: "Alpha".to_string(),
        })
    );

    let step = session
        .resume(&mut manager, Answer::Text("Beta".to_string()))
        .await;
    assert!(step.is_done());
    assert!(manager.table().contains("Beta"));
    assert!(!manager.table().contains("Alpha"));
}

#[tokio::test]
async fn test_remove_project_asks_for_confirmation() {
    let temp_dir = create_test_dir();
    let root = projects_dir(&temp_dir);
    write_project(&root, "Alpha", None);
    let mut manager = open_manager(&temp_dir, plain_settings()).await;
    let mut session = CommandSession::new();

    let step = session
        .start(&mut manager, Action::RemoveProject(project("Alpha")))
        .await;
    assert_eq!(
        step,
        Step::Prompt(Prompt::Confirm {
            message: "Remove \"Alpha\" from Project Manager?".to_string()
        })
    );

    let step = session.resume(&mut manager, Answer::Confirmed(false)).await;
    assert!(step.is_done());
    assert!(manager.table().contains("Alpha"));

    session
        .start(&mut manager, Action::RemoveProject(project("Alpha")))
        .await;
    session.resume(&mut manager, Answer::Confirmed(true)).await;
    assert!(!manager.table().contains("Alpha"));
    assert!(!root.join("Alpha").exists());
}

#[tokio::test]
async fn test_open_project_then_pick_workspace() {
    let temp_dir = create_test_dir();
    let descriptor = write_project(&projects_dir(&temp_dir), "Alpha", None);
    let review = write_workspace(&descriptor, "Review", &[]);
    let mut manager = open_manager(&temp_dir, Settings::default()).await;
    let mut session = CommandSession::new();

    let step = session
        .start(&mut manager, Action::OpenProject(Overrides::default()))
        .await;
    assert_eq!(choices(&step), vec!["Alpha"]);

    let step = session.resume(&mut manager, Answer::Chosen(0)).await;
    assert_eq!(choices(&step), vec!["(Default)", "Review"]);

    let step = session.resume(&mut manager, Answer::Chosen(1)).await;
    assert!(step.is_done());
    assert_eq!(
        manager.host().launches(),
        vec![LaunchRequest::OpenWorkspace {
            workspace: review,
            new_window: false
        }]
    );
    assert_eq!(manager.current_project().as_deref(), Some("Alpha"));
}

#[tokio::test]
async fn test_set_description_of_whole_project() {
    let temp_dir = create_test_dir();
    let descriptor = write_project(&projects_dir(&temp_dir), "Alpha", None);
    write_workspace(&descriptor, "Review", &[]);
    let mut manager = open_manager(&temp_dir, Settings::default()).await;
    let mut session = CommandSession::new();

    let step = session
        .start(&mut manager, Action::SetDescription(project("Alpha")))
        .await;
    assert_eq!(choices(&step), vec!["Alpha", "(Default)", "Review"]);

    let step = session.resume(&mut manager, Answer::Chosen(0)).await;
    assert_eq!(
        step,
        Step::Prompt(Prompt::Input {
            caption: "Description (empty to remove):".to_string(),
            initial: "Project description".to_string(),
        })
    );

    session
        .resume(&mut manager, Answer::Text("Main app".to_string()))
        .await;
    assert_eq!(
        manager.description_of(&descriptor).await.unwrap().as_deref(),
        Some("Main app")
    );
}

#[tokio::test]
async fn test_value_override_skips_the_prompt() {
    let temp_dir = create_test_dir();
    write_project(&projects_dir(&temp_dir), "Alpha", None);
    let mut manager = open_manager(&temp_dir, plain_settings()).await;
    let mut session = CommandSession::new();

    let overrides = Overrides {
        project: Some("Alpha".to_string()),
        value: Some("Review".to_string()),
        ..Default::default()
    };
    let step = session
        .start(&mut manager, Action::AddWorkspace(overrides))
        .await;
    assert!(step.is_done());
    assert_eq!(manager.workspace_count("Alpha"), 2);
}

#[tokio::test]
async fn test_remove_only_workspace_is_refused() {
    let temp_dir = create_test_dir();
    write_project(&projects_dir(&temp_dir), "Alpha", None);
    let mut manager = open_manager(&temp_dir, plain_settings()).await;
    let mut session = CommandSession::new();

    let step = session
        .start(&mut manager, Action::RemoveWorkspace(project("Alpha")))
        .await;
    assert!(step.is_done());
    assert_eq!(
        manager.host().statuses(),
        vec!["No workspace to execute this action".to_string()]
    );
    assert_eq!(manager.workspace_count("Alpha"), 1);
}

#[tokio::test]
async fn test_remove_dead_projects_one_by_one() {
    let temp_dir = create_test_dir();
    let root = projects_dir(&temp_dir);
    let gone = temp_dir.path().join("gone");
    write_project(&root, "DeadA", Some(&gone));
    write_project(&root, "DeadB", Some(&gone));
    let alive = create_source_folder(&temp_dir, "alive");
    write_project(&root, "Alive", Some(&alive));
    let mut manager = open_manager(&temp_dir, plain_settings()).await;
    let mut session = CommandSession::new();

    let step = session.start(&mut manager, Action::RemoveDeadProjects).await;
    assert_eq!(
        step,
        Step::Prompt(Prompt::Confirm {
            message: "Remove \"DeadA\" from Project Manager?".to_string()
        })
    );

    let step = session.resume(&mut manager, Answer::Confirmed(false)).await;
    assert_eq!(
        step,
        Step::Prompt(Prompt::Confirm {
            message: "Remove \"DeadB\" from Project Manager?".to_string()
        })
    );

    let step = session.resume(&mut manager, Answer::Confirmed(true)).await;
    assert!(step.is_done());
    assert_eq!(manager.table().names(), vec!["Alive", "DeadA"]);
}

#[tokio::test]
async fn test_menu_lists_workspace_actions_for_current_project() {
    let temp_dir = create_test_dir();
    let descriptor = write_project(&projects_dir(&temp_dir), "Alpha", None);
    let review = write_workspace(&descriptor, "Review", &[]);
    let mut manager = open_manager(&temp_dir, plain_settings()).await;
    manager.host().add_window(Some(&descriptor), Some(&review));
    let mut session = CommandSession::new();

    let step = session.start(&mut manager, Action::ShowOptions).await;
    let labels = choices(&step);
    assert_eq!(labels.len(), Action::menu().len());
    assert_eq!(labels[0], "Open Project");
    assert!(labels.contains(&"Remove Workspace".to_string()));
    assert!(labels.contains(&"Rename Workspace".to_string()));
}

#[tokio::test]
async fn test_create_project_asks_for_location() {
    let temp_dir = create_test_dir();
    let primary = temp_dir.path().join("Primary");
    std::fs::create_dir_all(&primary).unwrap();
    let settings = Settings {
        projects: ProjectsSetting::Dirs(DirList::One(primary.to_string_lossy().to_string())),
        ..Settings::default()
    };
    let mut manager = open_manager(&temp_dir, settings).await;
    let mut session = CommandSession::new();

    let step = session
        .start(&mut manager, Action::CreateProject(Overrides::default()))
        .await;
    assert_eq!(choices(&step), vec!["Primary Directory", "Default Directory"]);

    let step = session.resume(&mut manager, Answer::Chosen(1)).await;
    assert!(matches!(step, Step::Prompt(Prompt::Input { .. })));

    session
        .resume(&mut manager, Answer::Text("Fresh".to_string()))
        .await;
    let fresh = manager.project("Fresh").expect("Fresh should exist");
    assert_eq!(
        fresh.descriptor_path,
        projects_dir(&temp_dir).join("Fresh").join("Fresh.sublime-project")
    );
}

#[tokio::test]
async fn test_import_project_after_confirmation() {
    let temp_dir = create_test_dir();
    let outside = write_project(&temp_dir.path().join("elsewhere"), "Remote", None);
    let mut manager = open_manager(&temp_dir, plain_settings()).await;
    manager.host().add_window(Some(&outside), None);
    let mut session = CommandSession::new();

    let step = session.start(&mut manager, Action::ImportProject).await;
    assert_eq!(
        step,
        Step::Prompt(Prompt::Confirm {
            message: "Import \"Remote.sublime-project\"?".to_string()
        })
    );

    session.resume(&mut manager, Answer::Confirmed(true)).await;
    assert!(manager.table().contains("Remote"));

    // Importing again keeps a single library entry
    session.start(&mut manager, Action::ImportProject).await;
    session.resume(&mut manager, Answer::Confirmed(true)).await;
    let library = load_library(&projects_dir(&temp_dir)).await.unwrap();
    assert_eq!(library, vec![outside]);
}

#[tokio::test]
async fn test_import_of_managed_project_is_refused() {
    let temp_dir = create_test_dir();
    let managed = write_project(&projects_dir(&temp_dir), "Alpha", None);
    let mut manager = open_manager(&temp_dir, plain_settings()).await;
    manager.host().add_window(Some(&managed), None);
    let mut session = CommandSession::new();

    let step = session.start(&mut manager, Action::ImportProject).await;
    assert!(step.is_done());
    assert_eq!(
        manager.host().dialogs(),
        vec!["This project was created by Project Manager!".to_string()]
    );
}

#[tokio::test]
async fn test_clear_recent_projects() {
    let temp_dir = create_test_dir();
    let descriptor = write_project(&projects_dir(&temp_dir), "Alpha", None);
    let mut manager = open_manager(&temp_dir, plain_settings()).await;
    manager.switch_project("Alpha", None).await.unwrap();
    assert!(!manager.registry().ledger().load().await.unwrap().is_empty());
    let mut session = CommandSession::new();

    let step = session.start(&mut manager, Action::ClearRecentProjects).await;
    assert!(matches!(step, Step::Prompt(Prompt::Confirm { .. })));
    session.resume(&mut manager, Answer::Confirmed(true)).await;

    assert!(manager.registry().ledger().load().await.unwrap().is_empty());
    assert_eq!(manager.host().history_clears(), 1);
    assert!(descriptor.exists());
}
