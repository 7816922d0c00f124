// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task lifecycle: a user-overridable [`PipelineTask`] trait, the
//! engine-owned [`Task`] wrapper that tracks execution state around it, and
//! the deferred-argument machinery (`Output`, `Arg<T>`) that lets one
//! task's constructor refer to another task's not-yet-computed output.
//!
//! Grounded on spec.md §4.4 and
//! `examples/original_source/auto_process_ngs/test/test_pipeliner.py`'s
//! `TestPipelineTask`. The Python source relies on live-reference aliasing
//! for deferred outputs (a task's `output()` returns a container that later
//! mutates in place); this is replaced by the explicit `Arg::From(TaskId)`
//! thunk the spec itself recommends (§9 "Deferred argument resolution").

use crate::command::PipelineCommand;
use crate::error::PipelineError;
use jobgraph_core::{CommandSpec, ScriptBuilder};
use jobgraph_scheduler::{Scheduler, SchedulerJob};
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

jobgraph_core::define_id! {
    /// Opaque identity assigned to a [`Task`] at construction time. Used to
    /// record `requires` edges in a [`crate::Pipeline`] and to address a
    /// producer's [`Output`] from an [`Arg::From`].
    pub struct TaskId;
}

/// A type-erased value a task advertises via [`PipelineTask::output`].
///
/// Stands in for the Python source's habit of returning whatever live
/// object (list, string, `FileCollector`, ...) a task happens to hold;
/// since Rust has no dynamic subclassing, downstream tasks recover the
/// concrete type with [`Output::downcast`]/[`Output::downcast_ref`].
#[derive(Clone)]
pub struct Output(Arc<dyn Any + Send + Sync>);

impl Output {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// An output carrying no meaningful value (e.g. a task whose `output()`
    /// is `None` in the Python source).
    pub fn empty() -> Self {
        Self::new(())
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn downcast<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Output(..)")
    }
}

/// Outputs of every task that has completed so far, keyed by [`TaskId`].
/// Passed to [`PipelineTask::resolve_args`] at `run` time.
pub type OutputMap = HashMap<TaskId, Output>;

/// An argument that is either an immediate value or a reference to another
/// task's (not-yet-computed) output, resolved exactly once at `run` time.
///
/// Replaces the Python source's reliance on aliasing: constructing
/// `Arg::From(producer.id())` instead of capturing a live reference means
/// resolution is an explicit, one-time lookup in the consuming task's
/// [`PipelineTask::resolve_args`].
#[derive(Debug, Clone)]
pub enum Arg<T> {
    Value(T),
    From(TaskId),
}

impl<T> Arg<T> {
    /// Resolve against the outputs collected so far. Returns `None` if this
    /// is a `From` reference to a task that hasn't completed yet (a
    /// programming error if `requires` was set up correctly) or whose
    /// output isn't of type `T`.
    pub fn resolve(&self, outputs: &OutputMap) -> Option<T>
    where
        T: Clone + Any,
    {
        match self {
            Arg::Value(value) => Some(value.clone()),
            Arg::From(id) => outputs.get(id).and_then(Output::downcast::<T>),
        }
    }
}

/// Engine-provided accumulator passed to [`PipelineTask::setup`].
///
/// Mirrors the Python source's `self.add_cmd(...)` / `self.fail(...)`
/// calls available inside `setup()`.
#[derive(Default)]
pub struct SetupCtx {
    commands: Vec<(String, CommandSpec)>,
    failure: Option<(String, i32)>,
}

impl SetupCtx {
    /// Append a command to run once `setup()` returns. Calls made after
    /// [`SetupCtx::fail`] are silently dropped, matching spec.md §4.4's
    /// "suppresses any not-yet-submitted commands".
    pub fn add_cmd<C: PipelineCommand>(&mut self, command: C) {
        if self.failure.is_none() {
            self.commands.push((command.label().to_string(), command.cmd()));
        }
    }

    /// Mark the task as failed with the default exit code (1). Only the
    /// first call takes effect.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.fail_with_code(message, 1);
    }

    /// Mark the task as failed with an explicit exit code.
    pub fn fail_with_code(&mut self, message: impl Into<String>, exit_code: i32) {
        if self.failure.is_none() {
            self.failure = Some((message.into(), exit_code));
        }
    }

    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// The unit of work a caller implements: three phases plus an output query.
///
/// `resolve_args` and `finish` default to no-ops; most tasks only need
/// `setup` and `output`. Implementors typically hold their constructor
/// arguments as `Arg<T>` fields so `resolve_args` can fill in values that
/// depend on another task's result.
pub trait PipelineTask: Send {
    /// Resolve any `Arg::From` fields against `outputs`. Called once, at
    /// the start of [`Task::run`], before `setup`.
    fn resolve_args(&mut self, _outputs: &OutputMap) {}

    /// Accumulate commands (via `ctx.add_cmd`) or fail the task (via
    /// `ctx.fail`).
    fn setup(&mut self, ctx: &mut SetupCtx);

    /// Called after every accumulated command has finished, regardless of
    /// exit code — but skipped entirely if `setup` called `ctx.fail`
    /// (spec.md §9, "`finish` on command failure").
    fn finish(&mut self) {}

    /// The value this task advertises downstream. May be queried before
    /// `run`, in which case it reflects whatever state `resolve_args`/
    /// `setup` haven't yet set.
    fn output(&self) -> Output;
}

/// Engine-owned wrapper around a user's [`PipelineTask`]: tracks the
/// execution state spec.md §3 assigns to a `PipelineTask` record
/// (`exit_code`, `completed`, `stdout`, `failure_reason`) without requiring
/// the trait itself to carry it.
pub struct Task {
    id: TaskId,
    name: String,
    spec: Box<dyn PipelineTask>,
    exit_code: Option<i32>,
    completed: bool,
    stdout: String,
    failure_reason: Option<String>,
}

impl Task {
    /// Wrap `spec` as a named task. `name` is a caller-chosen display
    /// label (the Python source's first constructor argument), independent
    /// of the concrete `spec` type.
    pub fn new(name: impl Into<String>, spec: impl PipelineTask + 'static) -> Self {
        Self {
            id: TaskId::new(Uuid::new_v4().to_string()),
            name: name.into(),
            spec: Box::new(spec),
            exit_code: None,
            completed: false,
            stdout: String::new(),
            failure_reason: None,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id.clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The task's current output. Before `run`, reflects construction-time
    /// state; after, the final value.
    pub fn output(&self) -> Output {
        self.spec.output()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Run this task to completion: resolve deferred arguments, call
    /// `setup`, dispatch any accumulated commands to `sched` and wait for
    /// them, then call `finish` (unless `setup` called `ctx.fail`).
    ///
    /// Always synchronous (blocks until every submitted command finishes);
    /// spec.md §4.4 step 4 allows a non-blocking mode but no caller in this
    /// workspace needs one, since [`crate::Pipeline`] always awaits a
    /// task's commands before considering it complete.
    pub async fn run(
        &mut self,
        sched: &Scheduler,
        working_dir: &Path,
        scripts_dir: &Path,
        outputs: &OutputMap,
    ) -> Result<i32, PipelineError> {
        self.spec.resolve_args(outputs);

        let mut ctx = SetupCtx::default();
        self.spec.setup(&mut ctx);

        if let Some((message, exit_code)) = ctx.failure {
            info!(task = %self.name, exit_code, %message, "task failed in setup, commands not dispatched");
            self.failure_reason = Some(message);
            self.exit_code = Some(exit_code);
            self.completed = true;
            return Ok(exit_code);
        }

        let mut jobs: Vec<SchedulerJob> = Vec::with_capacity(ctx.commands.len());
        for (label, command) in &ctx.commands {
            let script_path = ScriptBuilder::build(label, command, scripts_dir)?;
            let job = sched.submit(
                vec![script_path.to_string_lossy().into_owned()],
                working_dir.to_path_buf(),
                None,
                None,
                HashSet::new(),
            )?;
            jobs.push(job);
        }

        let poll_interval = sched.poll_interval();
        let mut exit_codes = Vec::with_capacity(jobs.len());
        for job in &jobs {
            exit_codes.push(job.wait(poll_interval).await);
        }

        self.stdout = jobs.iter().map(SchedulerJob::stdout).collect::<Vec<_>>().concat();
        let exit_code = exit_codes.into_iter().find(|&code| code != 0).unwrap_or(0);
        self.exit_code = Some(exit_code);

        self.spec.finish();
        self.completed = true;

        debug!(task = %self.name, exit_code, "task finished");
        Ok(exit_code)
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
