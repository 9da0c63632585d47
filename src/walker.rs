//! File walker (C6): discovers indexable files under a root, filtering by
//! the registry's supported extensions and a fixed set of exclusion tokens.
//!
//! Grounded on the teacher's `indexer.rs` `should_descend`/`SKIP_DIRS`, split
//! out into its own module per the expanded spec's component boundary
//! (spec.md §4.1 lists C6 as a distinct ~5% component).

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::languages::ParserRegistry;

/// Default exclusion tokens (spec.md §6): version-control metadata,
/// language cache/build-output directories, and the store dir itself.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    ".xray",
    "target",
    "node_modules",
    "dist",
    "build",
    "__pycache__",
    ".venv",
    "venv",
    ".mypy_cache",
    ".pytest_cache",
];

fn should_descend(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return true;
    }
    match entry.file_name().to_str() {
        Some(name) => !SKIP_DIRS.contains(&name),
        None => true,
    }
}

/// Walk `root`, returning every file the registry can parse, as paths
/// relative to `root` with forward slashes (spec.md §3 `file` invariant).
pub fn discover_files(root: &Path, registry: &ParserRegistry) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root).into_iter().filter_entry(should_descend);
    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        if registry.is_supported(entry.path()) {
            if let Ok(relative) = entry.path().strip_prefix(root) {
                files.push(relative.to_path_buf());
            }
        }
    }
    files.sort();
    files
}
