// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wrapper-script generation: frames a command's stdout with
//! COMMAND/HOSTNAME/USER/START/END/EXIT_CODE markers.

use crate::command::CommandSpec;
use crate::error::CoreError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static SCRIPT_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Replace whitespace and punctuation with underscores, lowercase the
/// result. Used to derive a collision-safe wrapper-script filename from a
/// command's label (see [`ScriptBuilder::build`]) — not the same
/// normalization as `PipelineCommand::name`, which only folds whitespace.
pub fn normalise(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .to_lowercase()
}

/// Produces standalone shell scripts that wrap a [`CommandSpec`] with a
/// fixed stdout preamble/postamble (see spec §3 `WrappedScript`).
pub struct ScriptBuilder;

impl ScriptBuilder {
    /// Write a wrapper script for `command` under `scripts_dir`, returning
    /// the script's path. The filename is derived from `label` plus a
    /// monotonic counter, so repeated calls with the same label never
    /// collide.
    pub fn build(
        label: &str,
        command: &CommandSpec,
        scripts_dir: &Path,
    ) -> Result<PathBuf, CoreError> {
        std::fs::create_dir_all(scripts_dir).map_err(|source| CoreError::ScriptWrite {
            path: scripts_dir.to_path_buf(),
            source,
        })?;

        let suffix = SCRIPT_COUNTER.fetch_add(1, Ordering::Relaxed);
        let filename = format!("{}_{}.sh", normalise(label), suffix);
        let path = scripts_dir.join(filename);

        let body = format!(
            "#!/bin/bash\n\
             echo \"#### COMMAND {label}\"\n\
             echo \"#### HOSTNAME $HOSTNAME\"\n\
             echo \"#### USER $USER\"\n\
             echo \"#### START $(date)\"\n\
             {command}\n\
             exit_code=$?\n\
             echo \"#### END $(date)\"\n\
             echo \"#### EXIT_CODE $exit_code\"\n\
             exit $exit_code",
            label = label,
            command = command.to_shell_string(),
        );

        std::fs::write(&path, body).map_err(|source| CoreError::ScriptWrite {
            path: path.clone(),
            source,
        })?;
        mark_executable(&path)?;

        Ok(path)
    }
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)
        .map_err(|source| CoreError::ScriptWrite {
            path: path.to_path_buf(),
            source,
        })?
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).map_err(|source| CoreError::ScriptWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
