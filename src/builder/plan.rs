//! Per-job step planning.
//!
//! The steps a job runs form a small dependency graph. Most edges encode
//! the fixed clean → configure → build → test order; the interesting one
//! is the host compiler prerequisite: UWP and ARM64 builds execute
//! `hermesc` while building, so a native x64 compiler must exist before
//! they configure or build.

use std::collections::HashMap;
use std::fmt;

use anyhow::{anyhow, Result};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::core::job::BuildJob;
use crate::core::options::Stages;

/// One step of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    /// Delete the job's build directory.
    Clean,
    /// Build the x64 `hermesc` into the tools directory.
    HostCompiler,
    Configure,
    /// Build and stage artifacts.
    Build,
    Test,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Clean => "clean",
            Step::HostCompiler => "host-compiler",
            Step::Configure => "configure",
            Step::Build => "build",
            Step::Test => "test",
        };
        f.write_str(name)
    }
}

/// `(before, after)` pairs; an edge is only added when both steps are
/// part of the plan.
const DEPENDENCIES: &[(Step, Step)] = &[
    (Step::Clean, Step::HostCompiler),
    (Step::Clean, Step::Configure),
    (Step::Clean, Step::Build),
    (Step::Clean, Step::Test),
    (Step::HostCompiler, Step::Configure),
    (Step::HostCompiler, Step::Build),
    (Step::HostCompiler, Step::Test),
    (Step::Configure, Step::Build),
    (Step::Configure, Step::Test),
    (Step::Build, Step::Test),
];

/// Dependency graph of the steps one job runs.
#[derive(Debug, Clone)]
pub struct JobPlan {
    graph: DiGraph<Step, ()>,
    nodes: HashMap<Step, NodeIndex>,
}

impl JobPlan {
    /// Plan a job.
    ///
    /// `clean_build` requests deletion of the build directory first;
    /// `host_compiler_ready` is true when `hermesc` already exists or was
    /// built earlier in this run.
    pub fn new(
        job: &BuildJob,
        stages: &Stages,
        clean_build: bool,
        host_compiler_ready: bool,
    ) -> Self {
        let test = stages.test && !job.is_uwp();
        let compiles = stages.configure || stages.build || test;

        let mut steps = Vec::new();
        if clean_build {
            steps.push(Step::Clean);
        }
        if compiles && job.needs_host_compiler() && !host_compiler_ready {
            steps.push(Step::HostCompiler);
        }
        if stages.configure {
            steps.push(Step::Configure);
        }
        if stages.build {
            steps.push(Step::Build);
        }
        if test {
            steps.push(Step::Test);
        }

        JobPlan::from_steps(&steps)
    }

    fn from_steps(steps: &[Step]) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        for &step in steps {
            nodes.insert(step, graph.add_node(step));
        }
        for (before, after) in DEPENDENCIES {
            if let (Some(&a), Some(&b)) = (nodes.get(before), nodes.get(after)) {
                graph.add_edge(a, b, ());
            }
        }
        JobPlan { graph, nodes }
    }

    pub fn contains(&self, step: Step) -> bool {
        self.nodes.contains_key(&step)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Steps in execution order (prerequisites first).
    pub fn steps(&self) -> Result<Vec<Step>> {
        let order = toposort(&self.graph, None).map_err(|cycle| {
            anyhow!("cycle in job plan at step `{}`", self.graph[cycle.node_id()])
        })?;
        Ok(order.into_iter().map(|n| self.graph[n]).collect())
    }
}
