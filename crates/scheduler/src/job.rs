// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State holder for one submitted unit of work.

use jobgraph_runner::{JobHandle, Runner};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle state of a [`SchedulerJob`]. Transitions are strictly
/// `Pending -> Running -> Finished`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Finished { exit_code: i32 },
}

struct JobInner {
    job_number: u64,
    name: Option<String>,
    wait_for: HashSet<String>,
    argv: Vec<String>,
    cwd: PathBuf,
    runner: Option<Arc<dyn Runner>>,
    state: Mutex<JobState>,
    job_handle: Mutex<Option<JobHandle>>,
    stdout: Mutex<String>,
}

/// A handle to one submitted unit of work, returned by [`Scheduler::submit`](crate::Scheduler::submit).
///
/// Cheap to clone; all clones observe the same underlying state.
#[derive(Clone)]
pub struct SchedulerJob(Arc<JobInner>);

impl SchedulerJob {
    pub(crate) fn new(
        job_number: u64,
        name: Option<String>,
        wait_for: HashSet<String>,
        argv: Vec<String>,
        cwd: PathBuf,
        runner: Option<Arc<dyn Runner>>,
    ) -> Self {
        Self(Arc::new(JobInner {
            job_number,
            name,
            wait_for,
            argv,
            cwd,
            runner,
            state: Mutex::new(JobState::Pending),
            job_handle: Mutex::new(None),
            stdout: Mutex::new(String::new()),
        }))
    }

    pub fn job_number(&self) -> u64 {
        self.0.job_number
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn wait_for(&self) -> &HashSet<String> {
        &self.0.wait_for
    }

    pub fn argv(&self) -> &[String] {
        &self.0.argv
    }

    pub fn cwd(&self) -> &std::path::Path {
        &self.0.cwd
    }

    pub(crate) fn runner_override(&self) -> Option<Arc<dyn Runner>> {
        self.0.runner.clone()
    }

    pub fn state(&self) -> JobState {
        self.0.state.lock().clone()
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.state() {
            JobState::Finished { exit_code } => Some(exit_code),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state(), JobState::Running)
    }

    pub fn stdout(&self) -> String {
        self.0.stdout.lock().clone()
    }

    pub(crate) fn mark_running(&self, job_handle: JobHandle) {
        *self.0.state.lock() = JobState::Running;
        *self.0.job_handle.lock() = Some(job_handle);
    }

    pub(crate) fn mark_finished(&self, exit_code: i32, stdout: String) {
        *self.0.stdout.lock() = stdout;
        *self.0.state.lock() = JobState::Finished { exit_code };
    }

    /// Poll until the job finishes, sleeping `poll_interval` between checks.
    pub async fn wait(&self, poll_interval: Duration) -> i32 {
        loop {
            if let JobState::Finished { exit_code } = self.state() {
                return exit_code;
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
