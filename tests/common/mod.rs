//! Common test utilities and helpers
//!
//! Builds throwaway workspaces of JSON package manifests and runs the
//! monoforge binary against them.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test workspace context
///
/// Creates a temporary monorepo with a workspace manifest and helpers for
/// adding member packages.
pub struct TestWorkspace {
    /// Temporary directory holding the workspace
    pub dir: TempDir,
}

impl TestWorkspace {
    /// Create a workspace whose manifest declares the given member patterns
    pub fn new(patterns: &[&str]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let patterns_json: Vec<String> = patterns.iter().map(|p| format!("\"{p}\"")).collect();
        std::fs::write(
            dir.path().join("package.json"),
            format!(
                "{{ \"name\": \"workspace\", \"workspaces\": [{}] }}",
                patterns_json.join(", ")
            ),
        )
        .expect("Failed to write workspace manifest");
        Self { dir }
    }

    /// Get the workspace root directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add a member package with dependencies and an optional build script.
    ///
    /// The directory is derived from the package name, so scoped names like
    /// `@scope/app` land under `@scope/app/`.
    pub fn add_package(&self, name: &str, deps: &[&str], build_script: Option<&str>) {
        let dir = self.dir.path().join(name);
        std::fs::create_dir_all(&dir).expect("Failed to create package directory");

        let deps_json: Vec<String> = deps
            .iter()
            .map(|d| format!("\"{d}\": \"^1.0.0\""))
            .collect();
        let scripts = match build_script {
            Some(script) => format!(", \"scripts\": {{ \"build\": \"{script}\" }}"),
            None => String::new(),
        };
        std::fs::write(
            dir.join("package.json"),
            format!(
                "{{ \"name\": \"{name}\", \"dependencies\": {{ {} }}{scripts} }}",
                deps_json.join(", ")
            ),
        )
        .expect("Failed to write package manifest");
        std::fs::write(dir.join("index.js"), format!("// {name}"))
            .expect("Failed to write package source");
    }

    /// Overwrite a file inside the workspace
    pub fn write_file(&self, rel: &str, content: &str) {
        std::fs::write(self.dir.path().join(rel), content).expect("Failed to write file");
    }

    /// Read a file from the workspace, empty string when missing
    pub fn read_file(&self, rel: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(rel)).unwrap_or_default()
    }

    /// Whether a file exists in the workspace
    pub fn file_exists(&self, rel: &str) -> bool {
        self.dir.path().join(rel).exists()
    }

    /// Whitespace-separated entries of a log file written by build scripts
    pub fn log_entries(&self, rel: &str) -> Vec<String> {
        self.read_file(rel)
            .split_whitespace()
            .map(ToString::to_string)
            .collect()
    }

    /// Run the monoforge binary with the given arguments, cwd = workspace
    pub fn run(&self, args: &[&str]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_monoforge"));
        cmd.current_dir(self.dir.path());
        for arg in args {
            cmd.arg(arg);
        }
        cmd.output().expect("Failed to execute monoforge")
    }
}
