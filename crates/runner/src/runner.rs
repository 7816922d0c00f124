// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The external runner capability: spec §6 reduced to a trait.
//!
//! `jobgraph-scheduler` depends only on this trait, never on a concrete
//! implementation, so a host application can swap in an SSH-backed runner,
//! a container-backed runner, or (in tests) a fake one without touching the
//! scheduler loop.

use crate::error::RunnerError;
use async_trait::async_trait;
use std::path::Path;

jobgraph_core::define_id! {
    /// Opaque handle a [`Runner`] assigns to a submitted script.
    pub struct JobHandle;
}

/// Capability that actually starts, polls, and reaps external processes.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Start `script_path` detached with working directory `cwd`. Returns
    /// immediately with an opaque handle.
    async fn submit(&self, script_path: &Path, cwd: &Path) -> Result<JobHandle, RunnerError>;

    /// True while the job has not yet exited.
    async fn is_running(&self, job: &JobHandle) -> bool;

    /// The job's exit code, once it is no longer running.
    async fn exit_code(&self, job: &JobHandle) -> Option<i32>;

    /// The job's final captured stdout.
    async fn stdout(&self, job: &JobHandle) -> String;

    /// Request termination of a still-running job. Best-effort: a job that
    /// has already exited is a no-op.
    async fn terminate(&self, job: &JobHandle);
}
