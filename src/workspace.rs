//! Workspace discovery and path resolution.
//!
//! Automatic workspace root detection by walking up from the current
//! directory looking for project markers like `.xray/`, `.git/`,
//! `Cargo.toml`, etc.
//!
//! ## Priority Order
//!
//! 1. CLI argument (`--workspace`)
//! 2. Environment variable (`XRAY_WORKSPACE`)
//! 3. Auto-detection via marker files

use anyhow::Result;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::XrayError;

/// Environment variable for explicit workspace path.
pub const ENV_WORKSPACE: &str = "XRAY_WORKSPACE";

/// Environment variable for explicit database path.
pub const ENV_DB: &str = "XRAY_DB";

/// Relative path to the store file within a workspace (spec.md §6).
pub const STORE_RELATIVE_PATH: &str = ".xray/xray.db";

/// Workspace markers in priority order.
pub const WORKSPACE_MARKERS: &[&str] = &[
    ".xray",
    ".git",
    "Cargo.toml",
    "package.json",
    "pyproject.toml",
    "go.mod",
    "build.gradle",
    "build.gradle.kts",
    "pom.xml",
    "settings.gradle",
    "settings.gradle.kts",
];

/// Directory markers - directories that indicate a project root.
pub const WORKSPACE_DIR_MARKERS: &[&str] = &[".git", "gradle"];

/// Find workspace root by walking up from current directory.
pub fn find_workspace_root() -> Option<PathBuf> {
    let cwd = env::current_dir().ok()?;
    find_workspace_root_from(&cwd)
}

/// Find workspace root by walking up from a specific starting path.
///
/// Returns `None` if no workspace markers are found before reaching the
/// filesystem root or the user's home directory.
pub fn find_workspace_root_from(start: &Path) -> Option<PathBuf> {
    let start = if start.is_absolute() {
        start.to_path_buf()
    } else {
        env::current_dir().ok()?.join(start)
    };

    let home = dirs::home_dir();

    let mut current = if start.is_file() {
        start.parent()?.to_path_buf()
    } else {
        start
    };

    loop {
        if let Some(ref home) = home {
            if &current == home {
                if has_workspace_marker(&current) {
                    return Some(current);
                }
                return None;
            }
        }

        if has_workspace_marker(&current) {
            return Some(current);
        }

        match current.parent() {
            Some(parent) if parent != current => {
                current = parent.to_path_buf();
            }
            _ => return None,
        }
    }
}

fn has_workspace_marker(dir: &Path) -> bool {
    for marker in WORKSPACE_MARKERS {
        if dir.join(marker).exists() {
            return true;
        }
    }
    for marker in WORKSPACE_DIR_MARKERS {
        if dir.join(marker).is_dir() {
            return true;
        }
    }
    false
}

/// Resolve workspace root with priority: CLI arg > env var > auto-detect.
/// The boundary may pass relative or tilde-prefixed paths (spec.md §6); this
/// normalises to an absolute path and rejects non-directories.
pub fn resolve_workspace(cli_arg: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = cli_arg {
        let path = canonicalize_or_absolute(&expand_tilde(path));
        return validate_directory(path);
    }

    if let Ok(env_path) = env::var(ENV_WORKSPACE) {
        let path = canonicalize_or_absolute(&expand_tilde(Path::new(&env_path)));
        return validate_directory(path);
    }

    if let Some(workspace) = find_workspace_root() {
        return Ok(workspace);
    }

    Err(XrayError::InvalidPath {
        path: env::current_dir().unwrap_or_default(),
        reason: format!(
            "could not detect workspace root; run from a directory containing .xray/, \
             .git/, Cargo.toml, package.json, or other project markers, or specify \
             explicitly with --workspace or {ENV_WORKSPACE}"
        ),
    }
    .into())
}

fn validate_directory(path: PathBuf) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(XrayError::InvalidPath {
            path,
            reason: "not a directory".to_string(),
        }
        .into());
    }
    Ok(path)
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

/// Resolve database path with priority: CLI arg > env var > `.xray/xray.db`.
pub fn resolve_db_path(cli_arg: Option<&Path>, workspace: &Path) -> PathBuf {
    if let Some(path) = cli_arg {
        return if path.is_absolute() {
            path.to_path_buf()
        } else {
            workspace.join(path)
        };
    }

    if let Ok(env_path) = env::var(ENV_DB) {
        let path = PathBuf::from(env_path);
        return if path.is_absolute() {
            path
        } else {
            workspace.join(path)
        };
    }

    workspace.join(STORE_RELATIVE_PATH)
}

fn canonicalize_or_absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(path)
        }
    })
}

/// Set environment variables for child processes.
pub fn set_env_for_children(workspace: &Path, db: &Path) {
    env::set_var(ENV_WORKSPACE, workspace);
    env::set_var(ENV_DB, db);
}

/// Append `.xray/` to the workspace's ignore file so the store isn't
/// committed (spec.md §6), creating the file if absent.
pub fn ensure_gitignore_entry(workspace: &Path) -> Result<()> {
    let gitignore = workspace.join(".gitignore");
    let existing = fs::read_to_string(&gitignore).unwrap_or_default();
    if existing.lines().any(|l| l.trim() == ".xray/") {
        return Ok(());
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&gitignore)?;
    if !existing.is_empty() && !existing.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, ".xray/")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_find_workspace_with_xray_marker() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join(".xray")).unwrap();

        let result = find_workspace_root_from(temp.path());
        assert_eq!(result, Some(temp.path().to_path_buf()));
    }

    #[test]
    fn test_find_workspace_with_git_marker() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();

        let result = find_workspace_root_from(temp.path());
        assert_eq!(result, Some(temp.path().to_path_buf()));
    }

    #[test]
    fn test_find_workspace_with_cargo_toml() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("Cargo.toml"), "").unwrap();

        let result = find_workspace_root_from(temp.path());
        assert_eq!(result, Some(temp.path().to_path_buf()));
    }

    #[test]
    fn test_find_workspace_from_subdirectory() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join(".xray")).unwrap();

        let subdir = temp.path().join("src").join("nested");
        fs::create_dir_all(&subdir).unwrap();

        let result = find_workspace_root_from(&subdir);
        assert_eq!(result, Some(temp.path().to_path_buf()));
    }

    #[test]
    fn test_resolve_db_path_default() {
        let workspace = PathBuf::from("/home/user/project");
        let result = resolve_db_path(None, &workspace);
        assert_eq!(result, PathBuf::from("/home/user/project/.xray/xray.db"));
    }

    #[test]
    fn test_resolve_db_path_with_cli_arg() {
        let workspace = PathBuf::from("/home/user/project");
        let cli_db = PathBuf::from("custom.db");
        let result = resolve_db_path(Some(&cli_db), &workspace);
        assert_eq!(result, PathBuf::from("/home/user/project/custom.db"));
    }

    #[test]
    fn test_resolve_db_path_with_absolute_cli_arg() {
        let workspace = PathBuf::from("/home/user/project");
        let cli_db = PathBuf::from("/tmp/index.db");
        let result = resolve_db_path(Some(&cli_db), &workspace);
        assert_eq!(result, PathBuf::from("/tmp/index.db"));
    }

    #[test]
    fn test_resolve_workspace_rejects_non_directory() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("not_a_dir.txt");
        fs::write(&file, "x").unwrap();
        assert!(resolve_workspace(Some(&file)).is_err());
    }

    #[test]
    fn test_ensure_gitignore_entry_creates_and_is_idempotent() {
        let temp = tempdir().unwrap();
        ensure_gitignore_entry(temp.path()).unwrap();
        ensure_gitignore_entry(temp.path()).unwrap();
        let contents = fs::read_to_string(temp.path().join(".gitignore")).unwrap();
        assert_eq!(contents.matches(".xray/").count(), 1);
    }
}
