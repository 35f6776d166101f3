//! Package directory content hashing and cache records
//!
//! The incremental builder decides skip-vs-build by comparing a SHA-256
//! digest of a package directory against the digest stored in the package's
//! cache record. Hashing walks files in sorted relative-path order so the
//! digest is stable across platforms and runs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::config::HashConfig;
use crate::error::BuildError;

/// Persisted cache record, one per package directory
#[derive(Debug, Serialize, Deserialize)]
pub struct HashRecord {
    /// Content hash of the package directory at the last successful build
    pub hash: String,
}

/// Hash a package directory with the configured exclusions.
///
/// Both the relative path and the contents of every file feed the digest,
/// so renames are changes too.
pub fn hash_package_dir(dir: &Path, config: &HashConfig) -> Result<String, BuildError> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            if entry.path() == dir {
                return true;
            }
            if entry.file_type().is_dir() {
                !is_excluded(&name, &config.excluded_folders)
            } else {
                !is_excluded(&name, &config.excluded_files)
            }
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .collect();
    files.sort();

    let mut hasher = Sha256::new();
    for path in files {
        let relative = path.strip_prefix(dir).unwrap_or(&path);
        hasher.update(relative.to_string_lossy().as_bytes());
        let content = fs::read(&path).map_err(|e| BuildError::Hash {
            path: path.clone(),
            error: e.to_string(),
        })?;
        hasher.update(&content);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Exclusion entries are exact names; `.*` matches any dot-prefixed name
fn is_excluded(name: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .any(|p| if p == ".*" { name.starts_with('.') } else { p == name })
}

/// Read the stored hash for a package directory.
///
/// A missing, unreadable, or malformed record reads as `None`; the next
/// build then recomputes and rewrites it.
pub fn read_record(dir: &Path, record_file: &str) -> Option<String> {
    let path = dir.join(record_file);
    let content = fs::read_to_string(path).ok()?;
    let record: HashRecord = serde_json::from_str(&content).ok()?;
    Some(record.hash)
}

/// Persist the hash for a package directory
pub fn write_record(dir: &Path, record_file: &str, hash: &str) -> Result<(), BuildError> {
    let path = dir.join(record_file);
    let record = HashRecord {
        hash: hash.to_string(),
    };
    let content = serde_json::to_string(&record).map_err(|e| BuildError::Record {
        path: path.clone(),
        error: e.to_string(),
    })?;
    fs::write(&path, content).map_err(|e| BuildError::Record {
        path,
        error: e.to_string(),
    })
}

/// Delete the stored record; missing records are fine
pub fn delete_record(dir: &Path, record_file: &str) -> Result<(), BuildError> {
    let path = dir.join(record_file);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuildError::Record {
            path,
            error: e.to_string(),
        }),
    }
}
