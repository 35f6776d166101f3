//! Plan execution
//!
//! Drives a per-node action across the ordered groups of an execution plan.
//! Nodes inside a group run concurrently through a bounded worker pool;
//! groups are separated by a barrier, so a group starts only after every
//! action in the previous group has settled. The action is either a literal
//! shell command or an arbitrary async callback; the executor does not care
//! which.

use std::path::Path;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};

use crate::config::OrchestratorConfig;
use crate::core::graph::{GraphBuilder, PackageGraph};
use crate::core::scheduler::{compute_execution_plan, ExecutionMode, ExecutionPlan};
use crate::error::ExecError;
use crate::infra::process;

/// Async per-node action
pub type NodeAction =
    Arc<dyn Fn(Arc<crate::core::graph::PackageNode>) -> BoxFuture<'static, Result<(), ExecError>> + Send + Sync>;

/// What to run against each node
pub enum CommandAction {
    /// A shell command, spawned in each node's directory
    Command(String),
    /// An arbitrary async callback
    Callback(NodeAction),
}

impl CommandAction {
    fn into_node_action(self) -> NodeAction {
        match self {
            Self::Command(command) => Arc::new(move |node| {
                let command = command.clone();
                Box::pin(async move { process::run_command(&command, node.dir(), &node.name).await })
            }),
            Self::Callback(action) => action,
        }
    }
}

/// Outcome of a plan execution
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Nodes whose action completed successfully, in settlement group order
    pub executed: Vec<String>,
    /// Nodes whose action failed, with their errors
    pub failed: Vec<(String, ExecError)>,
}

impl ExecutionReport {
    /// Convert into a result, failing if any node failed
    pub fn ok(self) -> Result<Self, ExecError> {
        if self.failed.is_empty() {
            Ok(self)
        } else {
            Err(ExecError::NodesFailed {
                failed: self.failed.into_iter().map(|(name, _)| name).collect(),
            })
        }
    }
}

/// Executor of actions against a dependency graph
pub struct TreeExecutor {
    config: OrchestratorConfig,
    jobs: usize,
}

impl TreeExecutor {
    /// Create an executor with the default per-group concurrency bound
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            config,
            jobs: num_cpus::get().max(1),
        }
    }

    /// Bound the number of actions in flight within one group
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Build the graph and plan for a single package closure
    pub fn plan_for_package(
        &self,
        manifest: &Path,
        mode: ExecutionMode,
    ) -> Result<(PackageGraph, ExecutionPlan), ExecError> {
        let graph = GraphBuilder::new(&self.config).build_package_graph(manifest)?;
        let plan = compute_execution_plan(&graph, mode);
        Ok((graph, plan))
    }

    /// Build the graph and plan for a whole repository.
    ///
    /// Multiple root trees are unified under a virtual aggregating root so
    /// leveling has a single entry point; the virtual node never reaches an
    /// action.
    pub fn plan_for_repository(
        &self,
        workspace_manifest: &Path,
        mode: ExecutionMode,
    ) -> Result<(PackageGraph, ExecutionPlan), ExecError> {
        let repository = GraphBuilder::new(&self.config).build_repository_graph(workspace_manifest)?;
        let graph = repository.aggregated();
        let plan = compute_execution_plan(&graph, mode);
        Ok((graph, plan))
    }

    /// Run an action over every node of a package closure
    pub async fn exec_cmd_on_package(
        &self,
        manifest: &Path,
        action: CommandAction,
        mode: ExecutionMode,
    ) -> Result<ExecutionReport, ExecError> {
        let (graph, plan) = self.plan_for_package(manifest, mode)?;
        let action = action.into_node_action();
        self.execute_plan(&graph, &plan, &action).await.ok()
    }

    /// Run an action over every package of a repository
    pub async fn exec_cmd_on_repository(
        &self,
        workspace_manifest: &Path,
        action: CommandAction,
        mode: ExecutionMode,
    ) -> Result<ExecutionReport, ExecError> {
        let (graph, plan) = self.plan_for_repository(workspace_manifest, mode)?;
        let action = action.into_node_action();
        self.execute_plan(&graph, &plan, &action).await.ok()
    }

    /// Execute a plan group by group.
    ///
    /// Within a group, non-virtual nodes run concurrently (bounded by the
    /// jobs setting) and a failure never cancels in-flight siblings. After
    /// a group with failures has settled, later groups are not started;
    /// their nodes would run against unbuilt dependencies.
    pub async fn execute_plan(
        &self,
        graph: &PackageGraph,
        plan: &ExecutionPlan,
        action: &NodeAction,
    ) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        for group in plan {
            let tasks = group
                .iter()
                .filter_map(|name| graph.node(name))
                .filter(|node| !node.is_virtual)
                .map(|node| {
                    let node = Arc::clone(node);
                    let action = Arc::clone(action);
                    async move {
                        let name = node.name.clone();
                        (name, action(node).await)
                    }
                });

            let mut settled: Vec<(String, Result<(), ExecError>)> = stream::iter(tasks)
                .buffer_unordered(self.jobs)
                .collect()
                .await;
            settled.sort_by(|a, b| a.0.cmp(&b.0));

            for (name, result) in settled {
                match result {
                    Ok(()) => report.executed.push(name),
                    Err(error) => {
                        tracing::error!("{name}: {error}");
                        report.failed.push((name, error));
                    }
                }
            }

            if !report.failed.is_empty() {
                break;
            }
        }

        report
    }
}
