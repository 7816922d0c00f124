// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised synchronously from [`crate::Scheduler::submit`] and
/// [`crate::Scheduler::start`].
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("job name {name:?} was already submitted")]
    DuplicateName { name: String },

    #[error("job waits for unknown name {name:?}")]
    UnknownDependency { name: String },

    #[error("scheduler has been stopped and no longer accepts submissions")]
    Stopped,

    #[error("scheduler has already been started")]
    AlreadyStarted,
}
