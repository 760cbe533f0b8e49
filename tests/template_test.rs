mod common;

use common::{create_test_dir, open_manager, projects_dir, write_project};
use project_manager::Settings;

async fn labels_with_format(format: &str) -> Vec<String> {
    let temp_dir = create_test_dir();
    let root = projects_dir(&temp_dir);
    let alpha = write_project(&root, "team/Alpha", None);
    write_project(&root, "Beta", None);

    let settings = Settings {
        project_display_format: format.to_string(),
        show_active_projects_first: false,
        active_project_indicator: " (open)".to_string(),
        ..Settings::default()
    };
    let manager = open_manager(&temp_dir, settings).await;
    manager
        .host()
        .add_window(Some(&alpha), Some(&alpha.with_extension("sublime-workspace")));

    manager
        .ranked_projects()
        .await
        .expect("Should rank projects")
        .into_iter()
        .map(|l| l.item.primary)
        .collect()
}

#[tokio::test]
async fn test_default_display_format() {
    let labels = labels_with_format(&Settings::default().project_display_format).await;
    assert_eq!(labels, vec!["team/Alpha (open)", "Beta"]);
}

#[tokio::test]
async fn test_custom_display_format() {
    let labels = labels_with_format("{{project_name}}{{active_project_indicator}} [{{project_group}}]").await;
    assert_eq!(labels, vec!["Alpha (open) [team/]", "Beta []"]);
}

#[tokio::test]
async fn test_legacy_display_format() {
    let labels = labels_with_format("{project_group}{project_name}").await;
    assert_eq!(labels, vec!["team/Alpha", "Beta"]);
}
