// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The DAG orchestrator: registers tasks and `requires` edges, walks the
//! graph to readiness, routes ready tasks to a [`Scheduler`], and halts
//! downstream work on failure.
//!
//! Grounded on spec.md §4.5 and
//! `examples/original_source/auto_process_ngs/test/test_pipeliner.py`'s
//! `TestPipeline`, including the failure-blocks-descendants scenario
//! (`test_pipeline_stops_on_task_failure`).

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::task::{Output, OutputMap, Task, TaskId};
use indexmap::IndexMap;
use jobgraph_runner::ShellRunner;
use jobgraph_scheduler::Scheduler;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// A DAG of [`Task`]s plus the `requires` edges between them.
///
/// Tasks are registered with [`Pipeline::add_task`]; [`Pipeline::run`]
/// walks the graph, running every ready task (in the concurrency model of
/// spec.md §5) until each task is either completed or permanently blocked.
///
/// Unlike the Python source — where a task object constructed outside the
/// pipeline remains directly queryable by the caller after `run()` returns
/// — task ownership here passes into the `Pipeline` at `add_task` time.
/// Callers recover post-run state (`output`, `exit_code`, blocked status)
/// through [`Pipeline::task`]/[`Pipeline::output`]/[`Pipeline::is_blocked`],
/// addressed by the [`TaskId`] each task reports at construction.
#[derive(Default)]
pub struct Pipeline {
    tasks: IndexMap<TaskId, Task>,
    requires: HashMap<TaskId, HashSet<TaskId>>,
    blocked: HashSet<TaskId>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Register `task`, recording `requires` as its prerequisite edges.
    /// Returns the task's [`TaskId`] for use in later `requires` lists.
    ///
    /// Calling this again for a `TaskId` already present merges the new
    /// `requires` into the recorded set (spec.md §4.5: "additional calls
    /// merge prerequisites") rather than replacing the registered task.
    pub fn add_task(&mut self, task: Task, requires: impl IntoIterator<Item = TaskId>) -> TaskId {
        let id = task.id();
        self.requires.entry(id.clone()).or_default().extend(requires);
        self.tasks.entry(id.clone()).or_insert(task);
        id
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn output(&self, id: &TaskId) -> Option<Output> {
        self.tasks.get(id).map(Task::output)
    }

    pub fn exit_code(&self, id: &TaskId) -> Option<i32> {
        self.tasks.get(id).and_then(Task::exit_code)
    }

    pub fn is_blocked(&self, id: &TaskId) -> bool {
        self.blocked.contains(id)
    }

    /// Run every registered task to completion (or permanent block),
    /// returning `0` on success and `1` if any task failed.
    ///
    /// If `sched` is `None`, the pipeline builds and tears down its own
    /// [`Scheduler`] using [`PipelineConfig::scheduler`]. `working_dir` is
    /// used both as every command's cwd and as the root of the
    /// `.jobgraph/scripts` directory wrapper scripts are written under.
    pub async fn run(
        &mut self,
        working_dir: &Path,
        sched: Option<Arc<Scheduler>>,
    ) -> Result<i32, PipelineError> {
        self.check_requires_are_registered()?;
        self.check_acyclic()?;

        let (sched, owns_scheduler) = match sched {
            Some(sched) => (sched, false),
            None => (
                Arc::new(Scheduler::new(
                    Arc::new(ShellRunner::new()),
                    self.config.scheduler.clone(),
                )),
                true,
            ),
        };
        if owns_scheduler {
            sched.start()?;
        }

        let scripts_dir = working_dir.join(".jobgraph").join("scripts");
        let mut outputs: OutputMap = OutputMap::new();
        let mut done: HashSet<TaskId> = HashSet::new();
        let mut failed: HashSet<TaskId> = HashSet::new();
        self.blocked.clear();
        let mut pipeline_failed = false;

        let mut pending: HashSet<TaskId> = self.tasks.keys().cloned().collect();
        let mut join_set: JoinSet<(TaskId, Task, i32)> = JoinSet::new();

        while !pending.is_empty() || !join_set.is_empty() {
            // Downstream of a failed (or already-blocked) task is blocked
            // permanently: not launched, `setup` never invoked.
            let newly_blocked: Vec<TaskId> = pending
                .iter()
                .filter(|id| {
                    self.requires
                        .get(*id)
                        .into_iter()
                        .flatten()
                        .any(|req| failed.contains(req) || self.blocked.contains(req))
                })
                .cloned()
                .collect();
            for id in newly_blocked {
                pending.remove(&id);
                self.blocked.insert(id.clone());
                pipeline_failed = true;
                if let Some(task) = self.tasks.get(&id) {
                    warn!(task = %task.name(), "task blocked: a prerequisite failed");
                }
            }

            let ready: Vec<TaskId> = pending
                .iter()
                .filter(|id| {
                    self.requires
                        .get(*id)
                        .into_iter()
                        .flatten()
                        .all(|req| done.contains(req))
                })
                .cloned()
                .collect();

            for id in ready {
                pending.remove(&id);
                if let Some(mut task) = self.tasks.shift_remove(&id) {
                    let sched = sched.clone();
                    let working_dir = working_dir.to_path_buf();
                    let scripts_dir = scripts_dir.clone();
                    let outputs_snapshot = outputs.clone();
                    info!(task = %task.name(), "task ready, dispatching");
                    join_set.spawn(async move {
                        if let Err(error) =
                            task.run(&sched, &working_dir, &scripts_dir, &outputs_snapshot).await
                        {
                            warn!(task = %task.name(), %error, "task failed before producing an exit code");
                        }
                        let exit_code = task.exit_code().unwrap_or(1);
                        (id, task, exit_code)
                    });
                }
            }

            if join_set.is_empty() {
                // Nothing ready, nothing in flight, but tasks remain: the
                // acyclic check above should have ruled this out already.
                break;
            }

            if let Some(joined) = join_set.join_next().await {
                let (id, task, exit_code) = joined.map_err(|_| PipelineError::TaskPanicked)?;
                outputs.insert(id.clone(), task.output());
                if exit_code == 0 {
                    done.insert(id.clone());
                } else {
                    failed.insert(id.clone());
                    pipeline_failed = true;
                }
                self.tasks.insert(id, task);
            }
        }

        if owns_scheduler {
            sched.stop();
            sched.join().await;
        }

        Ok(if pipeline_failed { 1 } else { 0 })
    }

    fn check_requires_are_registered(&self) -> Result<(), PipelineError> {
        for reqs in self.requires.values() {
            for req in reqs {
                if !self.tasks.contains_key(req) {
                    return Err(PipelineError::UnknownTask {
                        task: req.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Kahn's-algorithm topological pre-check: spec.md §9 notes a cyclic
    /// DAG otherwise manifests as no task ever becoming ready, i.e. an
    /// indefinite hang. Detecting it up front and failing fast is the
    /// recommended (and implemented) behavior.
    fn check_acyclic(&self) -> Result<(), PipelineError> {
        let mut indegree: HashMap<TaskId, usize> = HashMap::new();
        let mut dependents: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        for id in self.tasks.keys() {
            let reqs = self.requires.get(id).cloned().unwrap_or_default();
            indegree.insert(id.clone(), reqs.len());
            for req in reqs {
                dependents.entry(req).or_default().push(id.clone());
            }
        }

        let mut queue: VecDeque<TaskId> = indegree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| id.clone())
            .collect();

        let mut visited = 0usize;
        while let Some(id) = queue.pop_front() {
            visited += 1;
            for dependent in dependents.get(&id).into_iter().flatten() {
                if let Some(degree) = indegree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent.clone());
                    }
                }
            }
        }

        if visited != self.tasks.len() {
            let stuck = indegree
                .into_iter()
                .find(|(_, degree)| *degree > 0)
                .map(|(id, _)| id.to_string())
                .unwrap_or_else(|| "<unknown>".to_string());
            return Err(PipelineError::Cycle { task: stuck });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
