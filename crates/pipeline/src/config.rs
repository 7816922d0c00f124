// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tunables for a [`crate::Pipeline`]'s own, internally-managed [`Scheduler`]
//! (used when [`crate::Pipeline::run`] is called with `sched = None`).
//!
//! [`Scheduler`]: jobgraph_scheduler::Scheduler

use jobgraph_scheduler::SchedulerConfig;
use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::Pipeline`]. Loadable from TOML via
/// `jobgraph_core::config::from_toml_file`, following the same pattern as
/// `SchedulerConfig`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Used to build the scheduler the pipeline owns when the caller
    /// doesn't supply one of its own. Ignored when `run` is given an
    /// external scheduler.
    pub scheduler: SchedulerConfig,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
