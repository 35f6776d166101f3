//! Orchestrator configuration
//!
//! Reads optional settings from `monoforge.toml` next to the workspace
//! manifest. The configuration is an explicit object threaded through the
//! graph builder, scheduler, and incremental builder; there is no global
//! singleton.

pub mod defaults;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Orchestrator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrchestratorConfig {
    /// Workspace member discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Incremental build settings
    #[serde(default)]
    pub build: BuildConfig,
}

/// Workspace member discovery settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveryConfig {
    /// Path patterns excluded while expanding member globs
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
}

fn default_ignore() -> Vec<String> {
    defaults::DEFAULT_DISCOVERY_IGNORE
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            ignore: default_ignore(),
        }
    }
}

/// Incremental build settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildConfig {
    /// Manifest script to run when building a package
    #[serde(default = "default_script")]
    pub script: String,

    /// Whether a rebuilt package forces its transitive dependants to rebuild
    #[serde(default = "default_cascade")]
    pub cascade: bool,

    /// Content hashing settings
    #[serde(default)]
    pub hash: HashConfig,
}

fn default_script() -> String {
    defaults::DEFAULT_BUILD_SCRIPT.to_string()
}

fn default_cascade() -> bool {
    true
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            script: default_script(),
            cascade: default_cascade(),
            hash: HashConfig::default(),
        }
    }
}

/// Content hashing settings
///
/// Exclusion entries are exact file names, except the special entry `.*`
/// which matches any dot-prefixed name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HashConfig {
    /// Cache record file name, one per package directory
    #[serde(default = "default_record_file")]
    pub record_file: String,

    /// Folder names excluded from hashing
    #[serde(default = "default_excluded_folders")]
    pub excluded_folders: Vec<String>,

    /// File names excluded from hashing
    #[serde(default = "default_excluded_files")]
    pub excluded_files: Vec<String>,
}

fn default_record_file() -> String {
    defaults::DEFAULT_RECORD_FILE.to_string()
}

fn default_excluded_folders() -> Vec<String> {
    defaults::DEFAULT_EXCLUDED_FOLDERS
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_excluded_files() -> Vec<String> {
    defaults::DEFAULT_EXCLUDED_FILES
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            record_file: default_record_file(),
            excluded_folders: default_excluded_folders(),
            excluded_files: default_excluded_files(),
        }
    }
}

impl OrchestratorConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load `monoforge.toml` from a directory if present, defaults otherwise
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(defaults::CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_on_empty_config() {
        let config: OrchestratorConfig = toml::from_str("").expect("empty config should parse");

        assert_eq!(config.build.script, "build");
        assert!(config.build.cascade);
        assert_eq!(config.build.hash.record_file, ".monoforge-hash");
        assert!(config
            .build
            .hash
            .excluded_folders
            .contains(&"node_modules".to_string()));
        assert!(!config.discovery.ignore.is_empty());
    }

    #[test]
    fn test_partial_config_overrides_only_named_fields() {
        let config: OrchestratorConfig = toml::from_str(
            r#"
[build]
script = "compile"
cascade = false
"#,
        )
        .expect("config should parse");

        assert_eq!(config.build.script, "compile");
        assert!(!config.build.cascade);
        // untouched sections keep their defaults
        assert_eq!(config.build.hash.record_file, ".monoforge-hash");
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = OrchestratorConfig::load_or_default(dir.path()).expect("should not fail");
        assert_eq!(config, OrchestratorConfig::default());
    }

    #[test]
    fn test_load_or_default_with_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(defaults::CONFIG_FILE_NAME),
            "[build]\nscript = \"make\"\n",
        )
        .expect("write config");

        let config = OrchestratorConfig::load_or_default(dir.path()).expect("should load");
        assert_eq!(config.build.script, "make");
    }

    #[test]
    fn test_malformed_config_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(defaults::CONFIG_FILE_NAME), "not toml [")
            .expect("write config");

        let result = OrchestratorConfig::load_or_default(dir.path());
        assert!(matches!(
            result,
            Err(crate::error::ConfigError::Parse { .. })
        ));
    }
}
