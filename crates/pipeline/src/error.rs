// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use jobgraph_core::CoreError;
use jobgraph_scheduler::SchedulerError;
use thiserror::Error;

/// Errors raised by [`crate::Pipeline`] construction or `run()`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("dependency graph contains a cycle involving task {task}")]
    Cycle { task: String },

    #[error("task {task} is referenced as a dependency but was never added")]
    UnknownTask { task: String },

    #[error("failed to build wrapper script: {0}")]
    Script(#[from] CoreError),

    #[error("internal scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("a task panicked while executing")]
    TaskPanicked,
}
