//! Package manifest (package.json) parsing
//!
//! Only the fields the orchestrator interprets are modeled: `name`,
//! `dependencies`, `devDependencies`, `scripts`, and `workspaces`.
//! Everything else in the document is ignored. Dependency version strings
//! are carried but never interpreted beyond key presence.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// A package manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PackageManifest {
    /// Package name, unique across the working graph
    pub name: String,

    /// Runtime dependencies (name -> version constraint)
    #[serde(default)]
    pub dependencies: HashMap<String, String>,

    /// Development dependencies, traversed exactly like `dependencies`
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: HashMap<String, String>,

    /// Named scripts (script name -> shell command)
    #[serde(default)]
    pub scripts: HashMap<String, String>,

    /// Workspace member glob patterns; present only on a workspace root
    #[serde(default)]
    pub workspaces: Option<Vec<String>>,
}

impl PackageManifest {
    /// Load a manifest from a file path
    pub fn load(path: &Path) -> Result<Self, GraphError> {
        if !path.exists() {
            return Err(GraphError::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| GraphError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Self::from_json(&content).map_err(|e| GraphError::ManifestParse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse a manifest from a JSON string
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Whether this manifest declares workspace membership
    pub fn is_workspace_root(&self) -> bool {
        self.workspaces.is_some()
    }

    /// Names of all declared dependencies, runtime and development
    pub fn dependency_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .dependencies
            .keys()
            .chain(self.dev_dependencies.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
