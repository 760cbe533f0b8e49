use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Get the current user's home directory
pub fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Does not touch the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Expand a stored path into an absolute one.
///
/// `~` is replaced by the home directory. A relative path is resolved
/// against the directory containing `relative_to` (a file path) when given.
pub fn expand_path(path: &str, relative_to: Option<&Path>) -> PathBuf {
    let expanded = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => match home_dir() {
            Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
            None => PathBuf::from(path),
        },
        _ => PathBuf::from(path),
    };

    let absolute = match relative_to {
        Some(file) if expanded.is_relative() => file
            .parent()
            .map(|dir| dir.join(&expanded))
            .unwrap_or(expanded),
        _ => expanded,
    };

    normalize_path(&absolute)
}

/// Portable form of a path: the home directory prefix is replaced by `~`.
pub fn pretty_path(path: &Path) -> String {
    if let Some(home) = home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            if rest.as_os_str().is_empty() {
                return "~".to_string();
            }
            return format!("~{}{}", MAIN_SEPARATOR, rest.display());
        }
    }
    path.display().to_string()
}

/// Resolve symlinks when the path exists, otherwise normalize lexically.
pub fn real_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| normalize_path(path))
}

/// Whether `path` lies inside `dir` (after resolving both).
pub fn is_within(path: &Path, dir: &Path) -> bool {
    real_path(path).starts_with(real_path(dir))
}

/// Name of this machine, used for per-host settings
pub fn computer_name() -> String {
    hostname::get()
        .ok()
        .map(|h| h.to_string_lossy().trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(fallback_computer_name)
}

fn fallback_computer_name() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .ok()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
        })
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_path(Path::new("../a/b")), PathBuf::from("../a/b"));
    }

    #[test]
    fn test_expand_relative_to_file() {
        let expanded = expand_path("../src", Some(Path::new("/work/proj/proj.sublime-project")));
        assert_eq!(expanded, PathBuf::from("/work/src"));

        let absolute = expand_path("/opt/code", Some(Path::new("/work/p.sublime-project")));
        assert_eq!(absolute, PathBuf::from("/opt/code"));
    }

    #[test]
    fn test_pretty_path_round_trip() {
        if let Some(home) = home_dir() {
            let path = home.join("code").join("demo");
            let pretty = pretty_path(&path);
            assert!(pretty.starts_with('~'));
            assert_eq!(expand_path(&pretty, None), normalize_path(&path));
        }
    }

    #[test]
    fn test_pretty_path_outside_home_is_unchanged() {
        let path = Path::new("/definitely/not/home/file");
        if home_dir().map_or(true, |h| !path.starts_with(h)) {
            assert_eq!(pretty_path(path), "/definitely/not/home/file");
        }
    }

    #[test]
    fn test_computer_name_matches_system_host_name() {
        let name = computer_name();
        assert!(!name.is_empty());
        if let Ok(system) = hostname::get() {
            let system = system.to_string_lossy().trim().to_string();
            if !system.is_empty() {
                assert_eq!(name, system);
            }
        }
    }
}
