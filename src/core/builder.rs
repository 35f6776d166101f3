//! Incremental build orchestration
//!
//! Supplies the per-node compilation action that the executor drives over a
//! dependency graph: compare the package's content hash against its stored
//! record to decide skip-vs-build, run the configured build script, persist
//! the new hash, and cascade a forced rebuild to all transitive dependants
//! on success. A failed build erases the stored record so the package is
//! re-evaluated on the next run.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::config::OrchestratorConfig;
use crate::core::executor::{ExecutionReport, NodeAction, TreeExecutor};
use crate::core::graph::{GraphBuilder, PackageGraph, PackageNode};
use crate::core::scheduler::{compute_execution_plan, ExecutionMode};
use crate::error::{BuildError, ExecError};
use crate::infra::{hasher, process};

/// Incremental builder over a dependency graph
pub struct TreeBuilder {
    config: OrchestratorConfig,
    executor: TreeExecutor,
    /// Names flagged for unconditional rebuild this run; written by sibling
    /// tasks concurrently, hence the mutex. The level invariant means a
    /// write can only target nodes scheduled in a later group.
    forced: Arc<Mutex<HashSet<String>>>,
}

impl TreeBuilder {
    /// Create a builder using the given configuration
    pub fn new(config: OrchestratorConfig) -> Self {
        let executor = TreeExecutor::new(config.clone());
        Self {
            config,
            executor,
            forced: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Bound the number of builds in flight within one group
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.executor = self.executor.with_jobs(jobs);
        self
    }

    /// Build one package and its dependency closure
    pub async fn build_package(
        &self,
        entry_manifest: &Path,
        mode: ExecutionMode,
    ) -> Result<ExecutionReport, BuildError> {
        self.forced.lock().expect("forced set lock").clear();

        let graph = GraphBuilder::new(&self.config).build_package_graph(entry_manifest)?;
        let plan = compute_execution_plan(&graph, mode);
        let action = self.compilation_action(&graph, false);

        let report = self.executor.execute_plan(&graph, &plan, &action).await;
        Ok(report.ok()?)
    }

    /// Build every package of a repository.
    ///
    /// With `force_all` set, hash comparison is bypassed for every node.
    pub async fn build_repository(
        &self,
        workspace_manifest: &Path,
        mode: ExecutionMode,
        force_all: bool,
    ) -> Result<ExecutionReport, BuildError> {
        self.forced.lock().expect("forced set lock").clear();

        let repository = GraphBuilder::new(&self.config).build_repository_graph(workspace_manifest)?;
        let graph = repository.aggregated();
        let plan = compute_execution_plan(&graph, mode);
        let action = self.compilation_action(&graph, force_all);

        let report = self.executor.execute_plan(&graph, &plan, &action).await;
        Ok(report.ok()?)
    }

    /// The compilation callback handed to the executor
    fn compilation_action(&self, graph: &PackageGraph, force_all: bool) -> NodeAction {
        let graph = graph.clone();
        let config = self.config.clone();
        let forced = Arc::clone(&self.forced);

        Arc::new(move |node| {
            let graph = graph.clone();
            let config = config.clone();
            let forced = Arc::clone(&forced);
            Box::pin(async move {
                compile_node(&node, &graph, &config, &forced, force_all)
                    .await
                    .map_err(|e| match e {
                        BuildError::Exec(exec) => exec,
                        other => ExecError::Action {
                            package: node.name.clone(),
                            error: other.to_string(),
                        },
                    })
            })
        })
    }
}

/// Build one node: skip when the content hash matches the stored record and
/// no forced rebuild applies, otherwise run the configured script.
async fn compile_node(
    node: &PackageNode,
    graph: &PackageGraph,
    config: &OrchestratorConfig,
    forced: &Mutex<HashSet<String>>,
    force_all: bool,
) -> Result<(), BuildError> {
    let name = &node.name;
    let hash_config = &config.build.hash;

    let must_build = force_all || forced.lock().expect("forced set lock").contains(name);
    if !must_build {
        let current = hasher::hash_package_dir(node.dir(), hash_config)?;
        let stored = hasher::read_record(node.dir(), &hash_config.record_file);
        if stored.as_deref() == Some(current.as_str()) {
            tracing::info!("{name} already built");
            return Ok(());
        }
    }

    let script = node
        .manifest
        .as_ref()
        .and_then(|m| m.scripts.get(&config.build.script));
    let Some(script) = script else {
        tracing::debug!("{name} has no '{}' script, nothing to build", config.build.script);
        return Ok(());
    };

    match process::run_command(script, node.dir(), name).await {
        Ok(()) => {
            let hash = hasher::hash_package_dir(node.dir(), hash_config)?;
            hasher::write_record(node.dir(), &hash_config.record_file, &hash)?;
            if config.build.cascade {
                force_dependants(graph, node, forced);
            }
            Ok(())
        }
        Err(error) => {
            // force re-evaluation on the next run
            hasher::delete_record(node.dir(), &hash_config.record_file)?;
            Err(error.into())
        }
    }
}

/// Flag all transitive dependants of a node as forced to rebuild.
///
/// Post-order walk over the dependants closure, excluding the node itself.
fn force_dependants(graph: &PackageGraph, node: &PackageNode, forced: &Mutex<HashSet<String>>) {
    let mut visited: HashSet<String> = HashSet::new();
    let mut collected: Vec<String> = Vec::new();
    visited.insert(node.name.clone());
    for dependant in &node.dependants {
        collect_dependants(graph, dependant, &mut visited, &mut collected);
    }

    if collected.is_empty() {
        return;
    }
    tracing::debug!("{} forces rebuild of: {}", node.name, collected.join(", "));
    let mut set = forced.lock().expect("forced set lock");
    for name in collected {
        set.insert(name);
    }
}

fn collect_dependants(
    graph: &PackageGraph,
    name: &str,
    visited: &mut HashSet<String>,
    collected: &mut Vec<String>,
) {
    if !visited.insert(name.to_string()) {
        return;
    }
    if let Some(node) = graph.node(name) {
        if node.is_virtual {
            return;
        }
        for dependant in &node.dependants {
            collect_dependants(graph, dependant, visited, collected);
        }
    }
    collected.push(name.to_string());
}
