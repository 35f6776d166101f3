//! Workspace member discovery
//!
//! Expands the workspace manifest's member glob patterns into the list of
//! package manifest paths, honoring the configured ignore patterns.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::config::defaults;
use crate::error::GraphError;

/// Find every member package manifest under a workspace root.
///
/// A member pattern like `packages/*` matches package directories relative
/// to the workspace root; the manifest is expected directly inside each
/// matched directory. Results are sorted for deterministic graph builds.
pub fn find_member_manifests(
    workspace_dir: &Path,
    patterns: &[String],
    ignore: &[String],
) -> Result<Vec<PathBuf>, GraphError> {
    let members = build_globset(
        patterns
            .iter()
            .map(|p| format!("{}/{}", p.trim_end_matches('/'), defaults::MANIFEST_FILE_NAME)),
    )?;
    let ignored = build_globset(ignore.iter().cloned())?;

    let mut manifests = Vec::new();
    for entry in WalkDir::new(workspace_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file()
            || entry.file_name() != defaults::MANIFEST_FILE_NAME
        {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(workspace_dir) else {
            continue;
        };
        if members.is_match(relative) && !ignored.is_match(relative) {
            manifests.push(entry.path().to_path_buf());
        }
    }

    manifests.sort();
    Ok(manifests)
}

fn build_globset<I: IntoIterator<Item = String>>(patterns: I) -> Result<GlobSet, GraphError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(&pattern).map_err(|e| GraphError::InvalidMemberPattern {
            pattern: pattern.clone(),
            error: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| GraphError::InvalidMemberPattern {
            pattern: String::new(),
            error: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch_manifest(root: &Path, rel: &str) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).expect("create dir");
        fs::write(dir.join("package.json"), "{ \"name\": \"x\" }").expect("write manifest");
    }

    #[test]
    fn test_patterns_select_member_manifests() {
        let tmp = TempDir::new().expect("tempdir");
        touch_manifest(tmp.path(), "packages/a");
        touch_manifest(tmp.path(), "packages/b");
        touch_manifest(tmp.path(), "tools/t");
        touch_manifest(tmp.path(), "unrelated/x");

        let found = find_member_manifests(
            tmp.path(),
            &["packages/*".to_string(), "tools/*".to_string()],
            &[],
        )
        .expect("discovery should succeed");

        let rels: Vec<String> = found
            .iter()
            .map(|p| {
                p.strip_prefix(tmp.path())
                    .expect("under root")
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        assert_eq!(
            rels,
            vec![
                "packages/a/package.json",
                "packages/b/package.json",
                "tools/t/package.json"
            ]
        );
    }

    #[test]
    fn test_ignore_patterns_are_honored() {
        let tmp = TempDir::new().expect("tempdir");
        touch_manifest(tmp.path(), "packages/a");
        touch_manifest(tmp.path(), "packages/a/node_modules/dep");

        let found = find_member_manifests(
            tmp.path(),
            &["packages/**".to_string()],
            &["**/node_modules/**".to_string()],
        )
        .expect("discovery should succeed");

        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("packages/a/package.json"));
    }

    #[test]
    fn test_workspace_root_manifest_is_not_a_member() {
        let tmp = TempDir::new().expect("tempdir");
        fs::write(
            tmp.path().join("package.json"),
            "{ \"name\": \"root\", \"workspaces\": [\"packages/*\"] }",
        )
        .expect("write root manifest");
        touch_manifest(tmp.path(), "packages/a");

        let found = find_member_manifests(tmp.path(), &["packages/*".to_string()], &[])
            .expect("discovery should succeed");

        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("packages/a/package.json"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let tmp = TempDir::new().expect("tempdir");
        let result = find_member_manifests(tmp.path(), &["packages/[".to_string()], &[]);
        assert!(matches!(
            result,
            Err(GraphError::InvalidMemberPattern { .. })
        ));
    }
}
