mod paths;

pub use paths::{
    computer_name, expand_path, home_dir, is_within, normalize_path, pretty_path, real_path,
};

use std::path::{Path, PathBuf};

/// Extension of project descriptor files
pub const PROJECT_EXTENSION: &str = "sublime-project";

/// Extension of workspace files
pub const WORKSPACE_EXTENSION: &str = "sublime-workspace";

/// Per-root list of descriptors living outside the root
pub const LIBRARY_FILE: &str = "library.json";

/// Recently used projects and workspaces (primary root only)
pub const RECENT_FILE: &str = "recent.json";

/// Free-text annotations (primary root only)
pub const DESCRIPTIONS_FILE: &str = "descriptions.json";

/// Characters allowed in project and workspace names besides alphanumerics
pub const NAME_PUNCTUATION: &str = ".,_- ";

/// `<name>.sublime-project`
pub fn project_file_name(name: &str) -> String {
    format!("{}.{}", name, PROJECT_EXTENSION)
}

/// `<name>.sublime-workspace`
pub fn workspace_file_name(name: &str) -> String {
    format!("{}.{}", name, WORKSPACE_EXTENSION)
}

pub fn is_project_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == PROJECT_EXTENSION)
}

pub fn is_workspace_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == WORKSPACE_EXTENSION)
}

/// File name with its extension stripped
pub fn stem_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Plain file name of a path
pub fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// The workspace sharing a descriptor's base name
pub fn default_workspace_path(project_file: &Path) -> PathBuf {
    project_file.with_extension(WORKSPACE_EXTENSION)
}

/// Names may only use letters, digits and `. , _ -` or space.
/// `.` and `..` are refused since they name directories.
pub fn is_valid_name(name: &str) -> bool {
    name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || NAME_PUNCTUATION.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(project_file_name("Alpha"), "Alpha.sublime-project");
        assert_eq!(workspace_file_name("Alpha"), "Alpha.sublime-workspace");
        assert_eq!(
            default_workspace_path(Path::new("/p/v1.2/v1.2.sublime-project")),
            PathBuf::from("/p/v1.2/v1.2.sublime-workspace")
        );
        assert_eq!(stem_name(Path::new("/p/v1.2.sublime-project")), "v1.2");
    }

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("My Project_2.0, beta-1"));
        assert!(is_valid_name("Проект"));
        assert!(!is_valid_name("a/b"));
        assert!(!is_valid_name("what?"));
        assert!(!is_valid_name("tab\there"));
        assert!(!is_valid_name("."));
        assert!(!is_valid_name(".."));
        assert!(is_valid_name("..."));
        assert!(is_valid_name(".hidden"));
    }
}
