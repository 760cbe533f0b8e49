mod common;

use common::{create_source_folder, create_test_dir, projects_dir, write_project, write_workspace};
use project_manager::config::{DirList, ProjectsSetting};
use project_manager::registry::{add_to_library, library_path};
use project_manager::{ProjectOrigin, ProjectRegistry, RegistryError, Settings};
use std::path::PathBuf;

#[tokio::test]
async fn test_scan_creates_missing_default_workspace() {
    let temp_dir = create_test_dir();
    let root = projects_dir(&temp_dir);
    let descriptor = write_project(&root, "Alpha", None);
    let workspace = descriptor.with_extension("sublime-workspace");
    std::fs::remove_file(&workspace).unwrap();

    let registry = ProjectRegistry::open(Settings::default(), root.clone())
        .await
        .expect("Should open registry");

    let project = registry.project("Alpha").expect("Alpha should be found");
    assert_eq!(project.workspaces.len(), 1);
    assert_eq!(project.workspaces[0].name, "Alpha");
    assert!(workspace.exists(), "Default workspace should be written");
    assert_eq!(project.origin, ProjectOrigin::Owned);
}

#[tokio::test]
async fn test_scan_reads_groups_and_root_folder() {
    let temp_dir = create_test_dir();
    let root = projects_dir(&temp_dir);
    let source = create_source_folder(&temp_dir, "alpha");
    write_project(&root, "work/client/Alpha", Some(&source));
    write_project(&root, "Beta", None);

    let registry = ProjectRegistry::open(Settings::default(), root)
        .await
        .expect("Should open registry");

    let alpha = registry.project("Alpha").unwrap();
    assert_eq!(alpha.group, "work/client/");
    assert_eq!(alpha.root_folder, source);

    let beta = registry.project("Beta").unwrap();
    assert_eq!(beta.group, "");
    assert_eq!(beta.root_folder, PathBuf::new());
}

#[tokio::test]
async fn test_scan_ignores_unaffiliated_workspaces() {
    let temp_dir = create_test_dir();
    let root = projects_dir(&temp_dir);
    let descriptor = write_project(&root, "Alpha", None);
    write_workspace(&descriptor, "Review", &[]);
    let stray = descriptor.parent().unwrap().join("Stray.sublime-workspace");
    std::fs::write(&stray, r#"{"project": "Other.sublime-project"}"#).unwrap();

    let registry = ProjectRegistry::open(Settings::default(), root)
        .await
        .expect("Should open registry");

    let names: Vec<&str> = registry
        .project("Alpha")
        .unwrap()
        .workspaces
        .iter()
        .map(|w| w.name.as_str())
        .collect();
    assert_eq!(names, vec!["Alpha", "Review"]);
}

#[tokio::test]
async fn test_name_collision_keeps_later_root() {
    let temp_dir = create_test_dir();
    let first = temp_dir.path().join("First");
    let default_root = projects_dir(&temp_dir);
    let shadowed = write_project(&first, "Alpha", None);
    let kept = write_project(&default_root, "Alpha", None);

    let settings = Settings {
        projects: ProjectsSetting::Dirs(DirList::Many(vec![
            first.to_string_lossy().to_string(),
            "$default".to_string(),
        ])),
        ..Settings::default()
    };
    let registry = ProjectRegistry::open(settings, default_root)
        .await
        .expect("Should open registry");

    assert_eq!(registry.project("Alpha").unwrap().descriptor_path, kept);
    assert_eq!(registry.table().collisions.len(), 1);
    assert_eq!(registry.table().collisions[0].shadowed, shadowed);
    assert_eq!(registry.primary_dir(), first.as_path());
}

#[tokio::test]
async fn test_library_projects_are_imported_and_healed() {
    let temp_dir = create_test_dir();
    let root = projects_dir(&temp_dir);
    let outside = temp_dir.path().join("elsewhere");
    let descriptor = write_project(&outside, "Remote", None);
    std::fs::create_dir_all(&root).unwrap();
    assert!(add_to_library(&root, &descriptor).await.unwrap());
    assert!(!add_to_library(&root, &descriptor).await.unwrap());

    let mut registry = ProjectRegistry::open(Settings::default(), root.clone())
        .await
        .expect("Should open registry");
    let remote = registry.project("Remote").unwrap();
    assert_eq!(remote.origin, ProjectOrigin::Imported);
    assert_eq!(remote.group, "");

    std::fs::remove_dir_all(&outside).unwrap();
    registry.refresh().await.expect("Should refresh");
    assert!(matches!(
        registry.project("Remote"),
        Err(RegistryError::ProjectNotFound(_))
    ));

    let library = std::fs::read_to_string(library_path(&root)).unwrap();
    let entries: Vec<String> = serde_json::from_str(&library).unwrap();
    assert!(entries.is_empty(), "Stale entry should be dropped");
}

#[tokio::test]
async fn test_missing_primary_directory_is_an_error() {
    let temp_dir = create_test_dir();
    let missing = temp_dir.path().join("missing");
    let settings = Settings {
        projects: ProjectsSetting::Dirs(DirList::One(missing.to_string_lossy().to_string())),
        ..Settings::default()
    };

    let result = ProjectRegistry::open(settings, projects_dir(&temp_dir)).await;
    assert!(matches!(result, Err(RegistryError::MissingDirectory(dir)) if dir == missing));
}

#[tokio::test]
async fn test_apply_settings_rescans() {
    let temp_dir = create_test_dir();
    let other = temp_dir.path().join("Other");
    write_project(&other, "Gamma", None);

    let mut registry = ProjectRegistry::open(Settings::default(), projects_dir(&temp_dir))
        .await
        .expect("Should open registry");
    assert!(registry.table().is_empty());

    let settings = Settings {
        projects: ProjectsSetting::Dirs(DirList::One(other.to_string_lossy().to_string())),
        ..Settings::default()
    };
    registry.apply_settings(settings).await.expect("Should rescan");
    assert!(registry.table().contains("Gamma"));
    assert_eq!(registry.roots().len(), 2);
}

#[tokio::test]
async fn test_unreadable_project_does_not_stop_the_scan() {
    let temp_dir = create_test_dir();
    let root = projects_dir(&temp_dir);
    write_project(&root, "Good", None);
    let bad = write_project(&root, "Bad", None);
    let blocked = bad.with_extension("sublime-workspace");
    std::fs::remove_file(&blocked).unwrap();
    std::fs::create_dir(&blocked).unwrap();
    std::fs::write(blocked.join("keep"), "").unwrap();

    let registry = ProjectRegistry::open(Settings::default(), root.clone())
        .await
        .expect("Should open registry despite the broken project");

    assert!(registry.table().contains("Good"));
    assert!(!registry.table().contains("Bad"));
    assert!(!root.join("Bad").join("Bad.sublime-workspace.tmp").exists());
}
