//! Default configuration values

/// Package manifest file name
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Orchestrator configuration file name, looked up next to the workspace manifest
pub const CONFIG_FILE_NAME: &str = "monoforge.toml";

/// Cache record file name written into each package directory
pub const DEFAULT_RECORD_FILE: &str = ".monoforge-hash";

/// Manifest script invoked by the incremental builder
pub const DEFAULT_BUILD_SCRIPT: &str = "build";

/// Folders excluded from content hashing (".*" matches any dot-prefixed name)
pub const DEFAULT_EXCLUDED_FOLDERS: &[&str] =
    &[".*", "node_modules", "dist", "lib", "bundle", "logs"];

/// Files excluded from content hashing
pub const DEFAULT_EXCLUDED_FILES: &[&str] = &[".*"];

/// Path patterns ignored during workspace member discovery
pub const DEFAULT_DISCOVERY_IGNORE: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/bin/**",
    "**/lib/**",
    "**/bundle/**",
    "**/logs/**",
];

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
