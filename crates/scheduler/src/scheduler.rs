// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scheduler loop itself: a single background task that repeatedly
//! reaps finished jobs, drains newly submitted ones, and dispatches
//! whichever waiting jobs have both capacity and satisfied dependencies.
//!
//! Grounded on `examples/original_source/simple_scheduler.py`'s
//! `SimpleScheduler.run`, which performs the same four passes in the same
//! order: completion, intake, dispatch, sleep.

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::job::SchedulerJob;
use jobgraph_runner::Runner;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Dispatches external command invocations under a concurrency cap, honoring
/// named-dependency wait conditions between them.
///
/// Submission (`submit`) is synchronous and cheap: it validates names,
/// reserves a job number, and hands the job to the background loop over a
/// channel. The loop itself only starts once [`Scheduler::start`] is called.
pub struct Scheduler {
    default_runner: Arc<dyn Runner>,
    config: SchedulerConfig,
    names: Mutex<HashSet<String>>,
    submit_tx: mpsc::UnboundedSender<SchedulerJob>,
    submit_rx: Mutex<Option<mpsc::UnboundedReceiver<SchedulerJob>>>,
    job_numbers: AtomicU64,
    n_running: Arc<AtomicUsize>,
    n_waiting: Arc<AtomicUsize>,
    started: AtomicBool,
    stopped: Arc<AtomicBool>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(default_runner: Arc<dyn Runner>, config: SchedulerConfig) -> Self {
        let (submit_tx, submit_rx) = mpsc::unbounded_channel();
        Self {
            default_runner,
            config,
            names: Mutex::new(HashSet::new()),
            submit_tx,
            submit_rx: Mutex::new(Some(submit_rx)),
            job_numbers: AtomicU64::new(0),
            n_running: Arc::new(AtomicUsize::new(0)),
            n_waiting: Arc::new(AtomicUsize::new(0)),
            started: AtomicBool::new(false),
            stopped: Arc::new(AtomicBool::new(false)),
            loop_handle: Mutex::new(None),
        }
    }

    /// Submit a new job. `argv[0]` is the executable to invoke (typically a
    /// wrapper script built by the pipeline layer); any remaining entries
    /// are informational only, since [`Runner::submit`] takes a single
    /// script path and working directory.
    ///
    /// Fails synchronously if `name` collides with a previously submitted
    /// name, if `wait_for` references a name that was never submitted, or
    /// if the scheduler has already been stopped.
    pub fn submit(
        &self,
        argv: Vec<String>,
        cwd: PathBuf,
        runner: Option<Arc<dyn Runner>>,
        name: Option<String>,
        wait_for: HashSet<String>,
    ) -> Result<SchedulerJob, SchedulerError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(SchedulerError::Stopped);
        }

        {
            let mut names = self.names.lock();
            if let Some(name) = &name {
                if names.contains(name) {
                    return Err(SchedulerError::DuplicateName { name: name.clone() });
                }
            }
            for dep in &wait_for {
                if !names.contains(dep) {
                    return Err(SchedulerError::UnknownDependency { name: dep.clone() });
                }
            }
            if let Some(name) = &name {
                names.insert(name.clone());
            }
        }

        let job_number = self.job_numbers.fetch_add(1, Ordering::SeqCst) + 1;
        let job = SchedulerJob::new(job_number, name, wait_for, argv, cwd, runner);

        if self.submit_tx.send(job.clone()).is_err() {
            warn!("scheduler loop has already exited; job will never run");
        }
        self.n_waiting.fetch_add(1, Ordering::SeqCst);

        Ok(job)
    }

    /// Start the background loop. May only be called once.
    pub fn start(&self) -> Result<(), SchedulerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyStarted);
        }

        let rx = self
            .submit_rx
            .lock()
            .take()
            .expect("submit_rx only taken once, guarded by `started`");

        let handle = tokio::spawn(run_loop(
            self.default_runner.clone(),
            self.config.clone(),
            rx,
            self.n_running.clone(),
            self.n_waiting.clone(),
            self.stopped.clone(),
        ));
        *self.loop_handle.lock() = Some(handle);
        Ok(())
    }

    /// Request loop termination after the current poll iteration. Jobs still
    /// running at that point are left running; the scheduler simply stops
    /// observing them.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Number of jobs currently executing.
    pub fn n_running(&self) -> usize {
        self.n_running.load(Ordering::SeqCst)
    }

    /// Number of jobs submitted but not yet dispatched.
    pub fn n_waiting(&self) -> usize {
        self.n_waiting.load(Ordering::SeqCst)
    }

    /// True when neither running nor waiting jobs remain.
    pub fn is_empty(&self) -> bool {
        self.n_running() == 0 && self.n_waiting() == 0
    }

    /// The configured poll interval, exposed so callers that need to poll
    /// an individual [`SchedulerJob`] (e.g. `jobgraph-pipeline`) can match
    /// the loop's own cadence instead of guessing one.
    pub fn poll_interval(&self) -> std::time::Duration {
        self.config.poll_interval
    }

    /// Wait for the background loop task to exit (after [`Scheduler::stop`]).
    pub async fn join(&self) {
        let handle = self.loop_handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

async fn run_loop(
    default_runner: Arc<dyn Runner>,
    config: SchedulerConfig,
    mut submit_rx: mpsc::UnboundedReceiver<SchedulerJob>,
    n_running: Arc<AtomicUsize>,
    n_waiting: Arc<AtomicUsize>,
    stopped: Arc<AtomicBool>,
) {
    let mut waiting: Vec<SchedulerJob> = Vec::new();
    let mut running: Vec<(SchedulerJob, jobgraph_runner::JobHandle)> = Vec::new();
    let mut completed_names: HashSet<String> = HashSet::new();

    loop {
        // Pass 1: completion. Reap any job whose runner reports it no
        // longer running, recording its name as satisfied for dependents.
        let mut still_running = Vec::with_capacity(running.len());
        for (job, handle) in running.drain(..) {
            if default_runner_or_job_runner(&default_runner, &job)
                .is_running(&handle)
                .await
            {
                still_running.push((job, handle));
                continue;
            }
            let runner = default_runner_or_job_runner(&default_runner, &job);
            let exit_code = runner.exit_code(&handle).await.unwrap_or(-1);
            let stdout = runner.stdout(&handle).await;
            job.mark_finished(exit_code, stdout);
            if let Some(name) = job.name() {
                completed_names.insert(name.to_string());
            }
            debug!(job_number = job.job_number(), exit_code, "job finished");
        }
        running = still_running;

        // Pass 2: intake. Drain every job submitted since the last pass.
        while let Ok(job) = submit_rx.try_recv() {
            waiting.push(job);
        }

        // Pass 3: dispatch. Walk waiting jobs in submission order, promoting
        // any whose dependencies are satisfied while capacity remains.
        // Jobs blocked only on an unfinished dependency do not block later
        // jobs in the list from being considered in the same pass.
        let mut remaining = Vec::with_capacity(waiting.len());
        for job in waiting.drain(..) {
            let has_capacity = config
                .max_concurrent
                .map_or(true, |cap| running.len() < cap);
            let deps_ready = job
                .wait_for()
                .iter()
                .all(|dep| completed_names.contains(dep));

            if has_capacity && deps_ready {
                let runner = default_runner_or_job_runner(&default_runner, &job);
                let script_path = match job.argv().first() {
                    Some(path) => PathBuf::from(path),
                    None => {
                        job.mark_finished(127, String::new());
                        if let Some(name) = job.name() {
                            completed_names.insert(name.to_string());
                        }
                        continue;
                    }
                };
                match runner.submit(&script_path, job.cwd()).await {
                    Ok(handle) => {
                        job.mark_running(handle.clone());
                        running.push((job, handle));
                    }
                    Err(error) => {
                        warn!(job_number = job.job_number(), %error, "job failed to start");
                        job.mark_finished(127, String::new());
                        if let Some(name) = job.name() {
                            completed_names.insert(name.to_string());
                        }
                    }
                }
            } else {
                remaining.push(job);
            }
        }
        waiting = remaining;

        n_running.store(running.len(), Ordering::SeqCst);
        n_waiting.store(waiting.len(), Ordering::SeqCst);

        if stopped.load(Ordering::SeqCst) {
            break;
        }

        tokio::time::sleep(config.poll_interval).await;
    }
}

fn default_runner_or_job_runner(default_runner: &Arc<dyn Runner>, job: &SchedulerJob) -> Arc<dyn Runner> {
    job.runner_override().unwrap_or_else(|| default_runner.clone())
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
