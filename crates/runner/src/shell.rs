// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A [`Runner`] that forks/execs wrapper scripts as real child processes.

use crate::error::RunnerError;
use crate::runner::{JobHandle, Runner};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::Notify;
use uuid::Uuid;

struct Entry {
    stdout: Mutex<String>,
    exit_code: Mutex<Option<i32>>,
    kill: Notify,
}

/// Default [`Runner`] implementation: spawns each script via `tokio::process`,
/// captures stdout into memory, and tracks exit status per [`JobHandle`].
#[derive(Default)]
pub struct ShellRunner {
    entries: Mutex<HashMap<JobHandle, Arc<Entry>>>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Runner for ShellRunner {
    async fn submit(&self, script_path: &Path, cwd: &Path) -> Result<JobHandle, RunnerError> {
        let mut command = Command::new(script_path);
        command
            .current_dir(cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                path: script_path.to_path_buf(),
                source,
            })?;

        let stdout_pipe = child.stdout.take();
        let entry = Arc::new(Entry {
            stdout: Mutex::new(String::new()),
            exit_code: Mutex::new(None),
            kill: Notify::new(),
        });

        let handle = JobHandle::new(Uuid::new_v4().to_string());
        self.entries.lock().insert(handle.clone(), entry.clone());

        tokio::spawn(async move {
            if let Some(mut pipe) = stdout_pipe {
                let mut buf = Vec::new();
                if pipe.read_to_end(&mut buf).await.is_ok() {
                    *entry.stdout.lock() = String::from_utf8_lossy(&buf).into_owned();
                }
            }

            let code = tokio::select! {
                status = child.wait() => status.ok().and_then(|s| s.code()).unwrap_or(-1),
                _ = entry.kill.notified() => {
                    let _ = child.kill().await;
                    child.wait().await.ok().and_then(|s| s.code()).unwrap_or(-1)
                }
            };
            *entry.exit_code.lock() = Some(code);
        });

        Ok(handle)
    }

    async fn is_running(&self, job: &JobHandle) -> bool {
        match self.entries.lock().get(job) {
            Some(entry) => entry.exit_code.lock().is_none(),
            None => false,
        }
    }

    async fn exit_code(&self, job: &JobHandle) -> Option<i32> {
        self.entries
            .lock()
            .get(job)
            .and_then(|entry| *entry.exit_code.lock())
    }

    async fn stdout(&self, job: &JobHandle) -> String {
        self.entries
            .lock()
            .get(job)
            .map(|entry| entry.stdout.lock().clone())
            .unwrap_or_default()
    }

    async fn terminate(&self, job: &JobHandle) {
        if let Some(entry) = self.entries.lock().get(job) {
            entry.kill.notify_one();
        }
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
