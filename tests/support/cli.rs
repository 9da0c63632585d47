#![allow(dead_code)]

use std::process::Command;

use anyhow::Result;

use super::workspace::TestWorkspace;

/// Runner for CLI commands against a test workspace.
pub struct CliRunner<'a> {
    workspace: &'a TestWorkspace,
    args: Vec<String>,
    format: Option<&'static str>,
}

impl<'a> CliRunner<'a> {
    pub fn new(workspace: &'a TestWorkspace) -> Self {
        Self {
            workspace,
            args: Vec::new(),
            format: None,
        }
    }

    pub fn find(mut self, query: &str) -> Self {
        self.args.extend(["find".into(), query.into()]);
        self
    }

    pub fn symbol_at(mut self, file_and_line: &str) -> Self {
        self.args.extend(["symbol-at".into(), file_and_line.into()]);
        self
    }

    pub fn impact(mut self, name: &str) -> Self {
        self.args.extend(["impact".into(), name.into()]);
        self
    }

    pub fn dependencies(mut self, name: &str) -> Self {
        self.args.extend(["dependencies".into(), name.into()]);
        self
    }

    pub fn stats(mut self) -> Self {
        self.args.push("stats".into());
        self
    }

    pub fn overview(mut self) -> Self {
        self.args.push("overview".into());
        self
    }

    pub fn max_depth(mut self, depth: i64) -> Self {
        self.args.extend(["--max-depth".into(), depth.to_string()]);
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.args.extend(["--limit".into(), n.to_string()]);
        self
    }

    pub fn json(mut self) -> Self {
        self.format = Some("json");
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn run(self) -> Result<CliOutput> {
        let mut cmd = Command::new(TestWorkspace::cli_bin());

        cmd.args(&self.args)
            .arg("--db")
            .arg(self.workspace.db_path())
            .current_dir(self.workspace.root());

        if let Some(format) = self.format {
            cmd.arg("--format").arg(format);
        }

        let output = cmd.output()?;

        Ok(CliOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status,
            json_mode: self.format == Some("json"),
        })
    }
}

/// Output from a CLI command.
pub struct CliOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    json_mode: bool,
}

impl CliOutput {
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.status.success(),
            "Command failed with status {:?}\nstderr: {}\nstdout: {}",
            self.status,
            self.stderr,
            self.stdout
        );
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert!(
            !self.status.success(),
            "Expected command to fail, but it succeeded.\nstdout: {}",
            self.stdout
        );
        self
    }

    pub fn assert_stdout_contains(&self, needle: &str) -> &Self {
        assert!(
            self.stdout.contains(needle),
            "Expected stdout to contain '{}', got:\n{}",
            needle,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, needle: &str) -> &Self {
        assert!(
            self.stderr.contains(needle),
            "Expected stderr to contain '{}', got:\n{}",
            needle,
            self.stderr
        );
        self
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        assert!(self.json_mode, "Command was not run with --format json");
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn json_value(&self) -> Result<serde_json::Value> {
        self.json()
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
