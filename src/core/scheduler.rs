//! Execution planning
//!
//! Turns a dependency graph into an ordered sequence of groups that are safe
//! to run concurrently. Tree modes honor "all dependencies before
//! dependants" even across diamonds; All modes deliberately ignore edge
//! structure for order-insensitive operations.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::core::graph::PackageGraph;

/// How a plan is derived and traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Groups ordered leaves-first; nodes within a group run concurrently
    TreeParallel,
    /// Same ordering, but every group is a singleton
    TreeSequential,
    /// One group with every node; dependency order is ignored.
    ///
    /// Callers are responsible for only using this with order-insensitive
    /// actions (e.g. linting); nothing stops a build from being run this
    /// way, and it will violate build-order correctness if it is.
    AllParallel,
    /// Every node in one strict sequence by name, dependency order ignored.
    /// The same caller responsibility as [`ExecutionMode::AllParallel`] applies.
    AllSequential,
}

impl ExecutionMode {
    /// Derive a mode from the CLI-style flag pair
    pub fn from_flags(all: bool, sequential: bool) -> Self {
        match (all, sequential) {
            (true, true) => Self::AllSequential,
            (true, false) => Self::AllParallel,
            (false, true) => Self::TreeSequential,
            (false, false) => Self::TreeParallel,
        }
    }
}

/// Ordered groups of node names; each group is safe to run concurrently
pub type ExecutionPlan = Vec<Vec<String>>;

/// Compute the ordered group partition for a graph under a mode.
///
/// The result is deterministic: identical graphs produce identical plans,
/// with names sorted inside every group.
pub fn compute_execution_plan(graph: &PackageGraph, mode: ExecutionMode) -> ExecutionPlan {
    match mode {
        ExecutionMode::TreeParallel => level_groups(graph),
        ExecutionMode::TreeSequential => level_groups(graph)
            .into_iter()
            .flatten()
            .map(|name| vec![name])
            .collect(),
        ExecutionMode::AllParallel => {
            let names = graph.names();
            if names.is_empty() {
                Vec::new()
            } else {
                vec![names]
            }
        }
        ExecutionMode::AllSequential => graph.names().into_iter().map(|name| vec![name]).collect(),
    }
}

/// Assign a level to every node reachable from the root.
///
/// For every edge P -> C, `level(C) > level(P)`; when C is reachable via
/// several paths its level is the maximum implied by any path, so C is
/// fully processed before the last of its consumers needs it. A node
/// reached at a greater depth than its recorded level is promoted and
/// re-enqueued, which propagates the promotion to its own dependencies.
/// The explicit worklist keeps arbitrarily deep chains off the call stack.
pub fn assign_levels(graph: &PackageGraph) -> HashMap<String, u32> {
    let mut levels: HashMap<String, u32> = HashMap::new();
    let mut worklist: VecDeque<(String, u32)> = VecDeque::new();

    levels.insert(graph.root().to_string(), 0);
    worklist.push_back((graph.root().to_string(), 0));

    while let Some((name, depth)) = worklist.pop_front() {
        let Some(node) = graph.node(&name) else {
            continue;
        };
        for dep in &node.dependencies {
            let dep_depth = depth + 1;
            let promoted = levels
                .get(dep)
                .map_or(true, |&recorded| dep_depth > recorded);
            if promoted {
                levels.insert(dep.clone(), dep_depth);
                worklist.push_back((dep.clone(), dep_depth));
            }
        }
    }

    levels
}

/// Bucket nodes by level, deepest bucket first, names sorted within
fn level_groups(graph: &PackageGraph) -> ExecutionPlan {
    let levels = assign_levels(graph);

    let mut buckets: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for (name, level) in levels {
        buckets.entry(level).or_default().push(name);
    }

    buckets
        .into_iter()
        .rev()
        .map(|(_, mut names)| {
            names.sort();
            names
        })
        .collect()
}
