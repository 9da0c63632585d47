#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;
use xray_cli::indexer::{build_full_index, NullProgress};
use xray_cli::languages::ParserRegistry;
use xray_cli::store::IndexStore;

use super::cli::CliRunner;

/// Builder for creating test workspaces with fluent API.
pub struct TestWorkspaceBuilder {
    files: HashMap<PathBuf, String>,
    auto_index: bool,
}

impl Default for TestWorkspaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspaceBuilder {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            auto_index: true,
        }
    }

    /// Add a file with inline content.
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.files
            .insert(path.as_ref().to_path_buf(), content.into());
        self
    }

    /// Disable automatic indexing after the workspace is created.
    pub fn without_auto_index(mut self) -> Self {
        self.auto_index = false;
        self
    }

    pub fn build(self) -> Result<TestWorkspace> {
        let temp_dir = tempfile::tempdir()?;
        let root = temp_dir.path().to_path_buf();

        for (path, content) in &self.files {
            let full_path = root.join(path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&full_path, content)?;
        }

        let db_path = root.join(".xray/xray.db");
        let store = IndexStore::open(&db_path)?;

        if self.auto_index {
            let registry = ParserRegistry::new();
            build_full_index(&root, &store, &registry, &mut NullProgress)?;
        }

        Ok(TestWorkspace {
            _temp_dir: temp_dir,
            root,
            db_path,
            store,
        })
    }
}

/// A test workspace with automatic cleanup.
pub struct TestWorkspace {
    _temp_dir: TempDir,
    root: PathBuf,
    db_path: PathBuf,
    store: IndexStore,
}

impl TestWorkspace {
    pub fn builder() -> TestWorkspaceBuilder {
        TestWorkspaceBuilder::new()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    pub fn cli_bin() -> &'static str {
        env!("CARGO_BIN_EXE_xray")
    }

    pub fn cli(&self) -> CliRunner<'_> {
        CliRunner::new(self)
    }

    pub fn write_file(&self, path: impl AsRef<Path>, content: impl AsRef<str>) -> Result<()> {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full_path, content.as_ref())?;
        Ok(())
    }

    pub fn reindex(&self) -> Result<()> {
        let registry = ParserRegistry::new();
        build_full_index(&self.root, &self.store, &registry, &mut NullProgress)?;
        Ok(())
    }
}
