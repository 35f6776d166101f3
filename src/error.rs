//! Error types for monoforge
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Graph construction errors
///
/// All of these are fatal: a failed graph build never hands a partial
/// graph to the scheduler.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Manifest file not found
    #[error("Manifest not found at '{path}'")]
    ManifestNotFound { path: PathBuf },

    /// Manifest could not be parsed
    #[error("Failed to parse manifest '{path}': {error}")]
    ManifestParse { path: PathBuf, error: String },

    /// No ancestor manifest declares workspace membership
    #[error("No workspace root found above '{path}'")]
    WorkspaceNotFound { path: PathBuf },

    /// Circular dependency detected
    #[error("Circular dependency detected: {}", cycle.join(" -> "))]
    CycleDetected { cycle: Vec<String> },

    /// Workspace member pattern is not a valid glob
    #[error("Invalid workspace member pattern '{pattern}': {error}")]
    InvalidMemberPattern { pattern: String, error: String },

    /// IO error while reading a manifest
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecError {
    /// Failed to spawn a subprocess
    #[error("Failed to spawn '{command}' for package '{package}': {error}")]
    Spawn {
        package: String,
        command: String,
        error: String,
    },

    /// Subprocess exited with a non-zero code
    #[error("Command '{command}' failed for package '{package}' (exit code {code:?})")]
    CommandFailed {
        package: String,
        command: String,
        code: Option<i32>,
    },

    /// A callback action failed for one node
    #[error("Action failed for package '{package}': {error}")]
    Action { package: String, error: String },

    /// One or more node actions failed during plan execution
    #[error("Execution failed for {} package(s): {}", failed.len(), failed.join(", "))]
    NodesFailed { failed: Vec<String> },

    /// Graph error
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Incremental build errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Failed to hash a package directory
    #[error("Failed to hash package directory '{path}': {error}")]
    Hash { path: PathBuf, error: String },

    /// Failed to read or write a cache record
    #[error("Cache record error for '{path}': {error}")]
    Record { path: PathBuf, error: String },

    /// Execution error
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Graph error
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    Parse { path: PathBuf, error: String },
}

/// Top-level monoforge error type
#[derive(Error, Debug)]
pub enum MonoforgeError {
    /// Graph error
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Execution error
    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),

    /// Build error
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
