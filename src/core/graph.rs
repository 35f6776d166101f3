//! Dependency graph construction
//!
//! Builds a bidirectional dependency graph (dependencies / dependants) from
//! package manifests, either for a single package closure or for a whole
//! repository. Nodes live in an arena keyed by name and edges are stored as
//! adjacency-by-name, which keeps diamonds cheap and makes cycle detection a
//! plain coloring pass over the arena.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{defaults, OrchestratorConfig};
use crate::core::manifest::PackageManifest;
use crate::error::GraphError;
use crate::infra::discovery;

/// Name of the synthetic root used to aggregate multi-root repositories
pub const VIRTUAL_ROOT_NAME: &str = "::workspace::";

/// One graph vertex representing a package
#[derive(Debug, Clone)]
pub struct PackageNode {
    /// Package name, unique across the working graph
    pub name: String,

    /// Location of the package manifest
    pub path: PathBuf,

    /// Parsed manifest; `None` only for the virtual aggregation root
    pub manifest: Option<PackageManifest>,

    /// Names of packages this one requires (forward edges)
    pub dependencies: BTreeSet<String>,

    /// Names of packages requiring this one (reverse edges, derived)
    pub dependants: BTreeSet<String>,

    /// True only for the synthetic aggregation root; never passed to an action
    pub is_virtual: bool,
}

impl PackageNode {
    /// Directory containing the package manifest
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Dependency graph rooted at a single package
#[derive(Debug, Clone)]
pub struct PackageGraph {
    nodes: HashMap<String, Arc<PackageNode>>,
    root: String,
}

impl PackageGraph {
    /// Look up a node by name
    pub fn node(&self, name: &str) -> Option<&Arc<PackageNode>> {
        self.nodes.get(name)
    }

    /// Name of the root node
    pub fn root(&self) -> &str {
        &self.root
    }

    /// All node names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of nodes, the virtual root included when present
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Full repository graph: the arena plus its root set
#[derive(Debug, Clone)]
pub struct RepositoryGraph {
    nodes: HashMap<String, Arc<PackageNode>>,
    roots: Vec<String>,
    workspace_dir: PathBuf,
}

impl RepositoryGraph {
    /// Look up a node by name
    pub fn node(&self, name: &str) -> Option<&Arc<PackageNode>> {
        self.nodes.get(name)
    }

    /// Names of the root nodes (empty `dependants`), sorted
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// All node names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of discovered packages
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the repository has no packages
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Collapse the repository into a single-rooted graph for scheduling.
    ///
    /// A repository with one root tree is returned as-is. Multiple root
    /// trees are unified under a virtual node whose `dependencies` are the
    /// real roots, so leveling has a single entry point.
    pub fn aggregated(&self) -> PackageGraph {
        if self.roots.len() == 1 {
            return PackageGraph {
                nodes: self.nodes.clone(),
                root: self.roots[0].clone(),
            };
        }

        let mut nodes: HashMap<String, Arc<PackageNode>> = HashMap::new();
        for (name, node) in &self.nodes {
            if self.roots.contains(name) {
                let mut patched = (**node).clone();
                patched.dependants.insert(VIRTUAL_ROOT_NAME.to_string());
                nodes.insert(name.clone(), Arc::new(patched));
            } else {
                nodes.insert(name.clone(), node.clone());
            }
        }
        nodes.insert(
            VIRTUAL_ROOT_NAME.to_string(),
            Arc::new(PackageNode {
                name: VIRTUAL_ROOT_NAME.to_string(),
                path: self.workspace_dir.join(defaults::MANIFEST_FILE_NAME),
                manifest: None,
                dependencies: self.roots.iter().cloned().collect(),
                dependants: BTreeSet::new(),
                is_virtual: true,
            }),
        );

        PackageGraph {
            nodes,
            root: VIRTUAL_ROOT_NAME.to_string(),
        }
    }
}

/// Node under construction, before the arena is frozen
#[derive(Debug)]
struct NodeData {
    path: PathBuf,
    manifest: PackageManifest,
    dependencies: BTreeSet<String>,
    dependants: BTreeSet<String>,
}

/// Graph builder over an explicit configuration
pub struct GraphBuilder<'a> {
    config: &'a OrchestratorConfig,
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder using the given configuration
    pub fn new(config: &'a OrchestratorConfig) -> Self {
        Self { config }
    }

    /// Build the dependency closure of a single package.
    ///
    /// Walks `dependencies` and `devDependencies` transitively, resolving
    /// unseen names against `<workspaceRoot>/<name>/package.json`. A name
    /// with no manifest under the workspace root is an external dependency
    /// and its edge is omitted. Each manifest is read at most once.
    pub fn build_package_graph(&self, entry_manifest: &Path) -> Result<PackageGraph, GraphError> {
        let entry_manifest = absolutize(entry_manifest)?;
        let entry_dir = entry_manifest
            .parent()
            .ok_or_else(|| GraphError::ManifestNotFound {
                path: entry_manifest.clone(),
            })?;
        let workspace_root = find_workspace_root(entry_dir)?;

        let manifest = PackageManifest::load(&entry_manifest)?;
        let root_name = manifest.name.clone();

        let mut nodes: HashMap<String, NodeData> = HashMap::new();
        nodes.insert(
            root_name.clone(),
            NodeData {
                path: entry_manifest,
                manifest,
                dependencies: BTreeSet::new(),
                dependants: BTreeSet::new(),
            },
        );

        // Worklist of nodes whose dependency edges still need resolving.
        let mut pending: Vec<String> = vec![root_name.clone()];
        while let Some(name) = pending.pop() {
            let dep_names = nodes[&name].manifest.dependency_names();
            for dep in dep_names {
                if dep == name {
                    continue;
                }
                if !nodes.contains_key(&dep) {
                    let dep_manifest = workspace_root
                        .join(&dep)
                        .join(defaults::MANIFEST_FILE_NAME);
                    if !dep_manifest.exists() {
                        tracing::debug!("'{dep}' not in workspace, treating as external");
                        continue;
                    }
                    let manifest = PackageManifest::load(&dep_manifest)?;
                    nodes.insert(
                        dep.clone(),
                        NodeData {
                            path: dep_manifest,
                            manifest,
                            dependencies: BTreeSet::new(),
                            dependants: BTreeSet::new(),
                        },
                    );
                    pending.push(dep.clone());
                }
                link(&mut nodes, &name, &dep);
            }
        }

        detect_cycles(&nodes)?;

        Ok(PackageGraph {
            nodes: freeze(nodes),
            root: root_name,
        })
    }

    /// Build the graph of every package declared by a workspace manifest.
    ///
    /// Members come from the manifest's `workspaces` glob patterns; each
    /// discovered manifest is read exactly once and edges are linked only
    /// among discovered names (no filesystem probing outside the set).
    pub fn build_repository_graph(
        &self,
        workspace_manifest: &Path,
    ) -> Result<RepositoryGraph, GraphError> {
        let workspace_manifest = absolutize(workspace_manifest)?;
        let manifest = PackageManifest::load(&workspace_manifest)?;
        let workspace_dir = workspace_manifest
            .parent()
            .ok_or_else(|| GraphError::ManifestNotFound {
                path: workspace_manifest.clone(),
            })?
            .to_path_buf();

        let patterns = manifest
            .workspaces
            .ok_or_else(|| GraphError::WorkspaceNotFound {
                path: workspace_manifest.clone(),
            })?;

        let member_manifests =
            discovery::find_member_manifests(&workspace_dir, &patterns, &self.config.discovery.ignore)?;

        let mut nodes: HashMap<String, NodeData> = HashMap::new();
        for path in member_manifests {
            let manifest = PackageManifest::load(&path)?;
            let name = manifest.name.clone();
            if nodes.contains_key(&name) {
                tracing::warn!("Duplicate package name '{name}' at {}, keeping first", path.display());
                continue;
            }
            nodes.insert(
                name,
                NodeData {
                    path,
                    manifest,
                    dependencies: BTreeSet::new(),
                    dependants: BTreeSet::new(),
                },
            );
        }

        let names: Vec<String> = nodes.keys().cloned().collect();
        for name in &names {
            for dep in nodes[name].manifest.dependency_names() {
                if dep != *name && nodes.contains_key(&dep) {
                    link(&mut nodes, name, &dep);
                }
            }
        }

        detect_cycles(&nodes)?;

        let mut roots: Vec<String> = nodes
            .iter()
            .filter(|(_, data)| data.dependants.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        roots.sort();

        Ok(RepositoryGraph {
            nodes: freeze(nodes),
            roots,
            workspace_dir,
        })
    }
}

/// Record the edge `from -> to` on both endpoints
fn link(nodes: &mut HashMap<String, NodeData>, from: &str, to: &str) {
    if let Some(data) = nodes.get_mut(from) {
        data.dependencies.insert(to.to_string());
    }
    if let Some(data) = nodes.get_mut(to) {
        data.dependants.insert(from.to_string());
    }
}

/// Convert the construction arena into the shared immutable form
fn freeze(nodes: HashMap<String, NodeData>) -> HashMap<String, Arc<PackageNode>> {
    nodes
        .into_iter()
        .map(|(name, data)| {
            let node = PackageNode {
                name: name.clone(),
                path: data.path,
                manifest: Some(data.manifest),
                dependencies: data.dependencies,
                dependants: data.dependants,
                is_virtual: false,
            };
            (name, Arc::new(node))
        })
        .collect()
}

/// Locate the workspace root for a package directory.
///
/// Walks ancestors upward, skipping any directory whose name starts with
/// `@` (scoped-namespace convention), and returns the first remaining
/// ancestor whose manifest declares workspace membership.
fn find_workspace_root(package_dir: &Path) -> Result<PathBuf, GraphError> {
    let mut current = package_dir.parent();
    while let Some(dir) = current {
        let scoped = dir
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('@'));
        if !scoped {
            let candidate = dir.join(defaults::MANIFEST_FILE_NAME);
            if candidate.exists() && PackageManifest::load(&candidate)?.is_workspace_root() {
                return Ok(dir.to_path_buf());
            }
        }
        current = dir.parent();
    }
    Err(GraphError::WorkspaceNotFound {
        path: package_dir.to_path_buf(),
    })
}

/// Three-color cycle detection over the whole arena.
///
/// Gray nodes are on the current DFS path; revisiting one means the
/// dependency edges form a directed cycle.
fn detect_cycles(nodes: &HashMap<String, NodeData>) -> Result<(), GraphError> {
    let mut done: HashSet<String> = HashSet::new();
    let mut in_progress: HashSet<String> = HashSet::new();
    let mut path: Vec<String> = Vec::new();

    let mut names: Vec<&String> = nodes.keys().collect();
    names.sort();

    for name in names {
        if !done.contains(name) {
            visit(name, nodes, &mut done, &mut in_progress, &mut path)?;
        }
    }
    Ok(())
}

fn visit(
    name: &str,
    nodes: &HashMap<String, NodeData>,
    done: &mut HashSet<String>,
    in_progress: &mut HashSet<String>,
    path: &mut Vec<String>,
) -> Result<(), GraphError> {
    if in_progress.contains(name) {
        let start = path.iter().position(|n| n == name).unwrap_or(0);
        let mut cycle: Vec<String> = path[start..].to_vec();
        cycle.push(name.to_string());
        return Err(GraphError::CycleDetected { cycle });
    }
    if done.contains(name) {
        return Ok(());
    }

    in_progress.insert(name.to_string());
    path.push(name.to_string());

    for dep in &nodes[name].dependencies {
        visit(dep, nodes, done, in_progress, path)?;
    }

    path.pop();
    in_progress.remove(name);
    done.insert(name.to_string());
    Ok(())
}

/// Resolve to an absolute path without requiring the file to exist
fn absolutize(path: &Path) -> Result<PathBuf, GraphError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| GraphError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    Ok(cwd.join(path))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrchestratorConfig;
    use std::fs;
    use tempfile::TempDir;

    /// Write a package manifest under `<root>/<rel>/package.json`
    fn write_package(root: &Path, rel: &str, name: &str, deps: &[&str]) -> PathBuf {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).expect("create package dir");
        let deps_json: Vec<String> = deps
            .iter()
            .map(|d| format!("\"{d}\": \"^1.0.0\""))
            .collect();
        let content = format!(
            "{{ \"name\": \"{name}\", \"dependencies\": {{ {} }} }}",
            deps_json.join(", ")
        );
        let path = dir.join("package.json");
        fs::write(&path, content).expect("write manifest");
        path
    }

    /// Workspace root manifest with member patterns
    fn write_workspace(root: &Path, patterns: &[&str]) -> PathBuf {
        let patterns_json: Vec<String> = patterns.iter().map(|p| format!("\"{p}\"")).collect();
        let content = format!(
            "{{ \"name\": \"workspace\", \"workspaces\": [{}] }}",
            patterns_json.join(", ")
        );
        let path = root.join("package.json");
        fs::write(&path, content).expect("write workspace manifest");
        path
    }

    #[test]
    fn test_package_graph_builds_symmetric_edges() {
        let tmp = TempDir::new().expect("tempdir");
        write_workspace(tmp.path(), &["*"]);
        write_package(tmp.path(), "a", "a", &[]);
        write_package(tmp.path(), "b", "b", &["a"]);
        let entry = write_package(tmp.path(), "c", "c", &["a", "b"]);

        let config = OrchestratorConfig::default();
        let graph = GraphBuilder::new(&config)
            .build_package_graph(&entry)
            .expect("graph should build");

        assert_eq!(graph.root(), "c");
        assert_eq!(graph.names(), vec!["a", "b", "c"]);

        // symmetry: B in A.dependants iff A in B.dependencies
        for name in graph.names() {
            let node = graph.node(&name).expect("node exists");
            for dep in &node.dependencies {
                assert!(
                    graph.node(dep).expect("dep exists").dependants.contains(&name),
                    "{dep} should list {name} as dependant"
                );
            }
            for dependant in &node.dependants {
                assert!(
                    graph
                        .node(dependant)
                        .expect("dependant exists")
                        .dependencies
                        .contains(&name),
                    "{dependant} should list {name} as dependency"
                );
            }
        }
    }

    #[test]
    fn test_diamond_dependency_succeeds() {
        let tmp = TempDir::new().expect("tempdir");
        write_workspace(tmp.path(), &["*"]);
        write_package(tmp.path(), "base", "base", &[]);
        write_package(tmp.path(), "left", "left", &["base"]);
        write_package(tmp.path(), "right", "right", &["base"]);
        let entry = write_package(tmp.path(), "top", "top", &["left", "right"]);

        let config = OrchestratorConfig::default();
        let graph = GraphBuilder::new(&config)
            .build_package_graph(&entry)
            .expect("diamond is not a cycle");

        assert_eq!(graph.len(), 4);
        let base = graph.node("base").expect("base exists");
        assert_eq!(
            base.dependants.iter().cloned().collect::<Vec<_>>(),
            vec!["left", "right"]
        );
    }

    #[test]
    fn test_cycle_is_detected_with_path() {
        let tmp = TempDir::new().expect("tempdir");
        write_workspace(tmp.path(), &["*"]);
        write_package(tmp.path(), "a", "a", &["b"]);
        write_package(tmp.path(), "b", "b", &["c"]);
        write_package(tmp.path(), "c", "c", &["a"]);
        let entry = tmp.path().join("a/package.json");

        let config = OrchestratorConfig::default();
        let result = GraphBuilder::new(&config).build_package_graph(&entry);

        match result {
            Err(GraphError::CycleDetected { cycle }) => {
                assert_eq!(cycle.first(), cycle.last());
                assert!(cycle.len() >= 4, "cycle should name every participant: {cycle:?}");
                for name in ["a", "b", "c"] {
                    assert!(cycle.contains(&name.to_string()));
                }
            }
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn test_external_dependency_edge_is_omitted() {
        let tmp = TempDir::new().expect("tempdir");
        write_workspace(tmp.path(), &["*"]);
        let entry = write_package(tmp.path(), "app", "app", &["serde", "local"]);
        write_package(tmp.path(), "local", "local", &[]);

        let config = OrchestratorConfig::default();
        let graph = GraphBuilder::new(&config)
            .build_package_graph(&entry)
            .expect("externals are not errors");

        assert_eq!(graph.names(), vec!["app", "local"]);
        let app = graph.node("app").expect("app exists");
        assert!(!app.dependencies.contains("serde"));
        assert!(app.dependencies.contains("local"));
    }

    #[test]
    fn test_scoped_package_dir_skips_one_level() {
        let tmp = TempDir::new().expect("tempdir");
        write_workspace(tmp.path(), &["@scope/*"]);
        write_package(tmp.path(), "@scope/common", "@scope/common", &[]);
        let entry = write_package(tmp.path(), "@scope/app", "@scope/app", &["@scope/common"]);

        let config = OrchestratorConfig::default();
        let graph = GraphBuilder::new(&config)
            .build_package_graph(&entry)
            .expect("scoped workspace should resolve");

        assert_eq!(graph.root(), "@scope/app");
        assert!(graph.node("@scope/common").is_some());
    }

    #[test]
    fn test_missing_workspace_root_fails() {
        let tmp = TempDir::new().expect("tempdir");
        // no ancestor declares workspaces
        let entry = write_package(tmp.path(), "lonely", "lonely", &[]);

        let config = OrchestratorConfig::default();
        let result = GraphBuilder::new(&config).build_package_graph(&entry);
        assert!(matches!(result, Err(GraphError::WorkspaceNotFound { .. })));
    }

    #[test]
    fn test_repository_graph_roots_and_edges() {
        let tmp = TempDir::new().expect("tempdir");
        let ws = write_workspace(tmp.path(), &["packages/*"]);
        write_package(tmp.path(), "packages/a", "a", &[]);
        write_package(tmp.path(), "packages/b", "b", &["a"]);
        write_package(tmp.path(), "packages/c", "c", &["a", "b"]);
        write_package(tmp.path(), "packages/tool", "tool", &["left-out", "a"]);

        let config = OrchestratorConfig::default();
        let repo = GraphBuilder::new(&config)
            .build_repository_graph(&ws)
            .expect("repository graph should build");

        assert_eq!(repo.len(), 4);
        // edges only among discovered names
        assert!(!repo.node("tool").unwrap().dependencies.contains("left-out"));
        // roots are exactly the nodes nothing depends on
        assert_eq!(repo.roots(), &["c".to_string(), "tool".to_string()]);
    }

    #[test]
    fn test_repository_aggregation_synthesizes_virtual_root() {
        let tmp = TempDir::new().expect("tempdir");
        let ws = write_workspace(tmp.path(), &["packages/*"]);
        write_package(tmp.path(), "packages/a", "a", &[]);
        write_package(tmp.path(), "packages/x", "x", &["a"]);
        write_package(tmp.path(), "packages/y", "y", &["a"]);

        let config = OrchestratorConfig::default();
        let repo = GraphBuilder::new(&config)
            .build_repository_graph(&ws)
            .expect("repository graph should build");
        let graph = repo.aggregated();

        assert_eq!(graph.root(), VIRTUAL_ROOT_NAME);
        let root = graph.node(VIRTUAL_ROOT_NAME).expect("virtual root exists");
        assert!(root.is_virtual);
        assert_eq!(
            root.dependencies.iter().cloned().collect::<Vec<_>>(),
            vec!["x", "y"]
        );
    }

    #[test]
    fn test_single_root_repository_needs_no_virtual_root() {
        let tmp = TempDir::new().expect("tempdir");
        let ws = write_workspace(tmp.path(), &["packages/*"]);
        write_package(tmp.path(), "packages/a", "a", &[]);
        write_package(tmp.path(), "packages/app", "app", &["a"]);

        let config = OrchestratorConfig::default();
        let repo = GraphBuilder::new(&config)
            .build_repository_graph(&ws)
            .expect("repository graph should build");
        let graph = repo.aggregated();

        assert_eq!(graph.root(), "app");
        assert!(graph.node(VIRTUAL_ROOT_NAME).is_none());
    }
}
