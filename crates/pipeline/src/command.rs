// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two convenience shapes for producing [`CommandSpec`]s inside a task's
//! `setup()`: a trait for user-defined commands, and an ad-hoc wrapper for
//! one-off invocations.

use crate::error::PipelineError;
use jobgraph_core::{CommandSpec, ScriptBuilder};
use std::path::{Path, PathBuf};

/// Lowercase `label` and replace each whitespace character with `_`,
/// leaving any other punctuation untouched. Grounded on the original
/// source's `label.lower().replace(' ', '_')`.
fn fold_whitespace(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Something that can render a [`CommandSpec`] and a human-readable label.
///
/// Rust has no equivalent to deriving a name from a subclass's runtime type
/// identity, so implementors supply [`PipelineCommand::label`] explicitly
/// rather than having it inferred from the concrete type.
pub trait PipelineCommand {
    /// The human-readable label shown in the wrapper script's `COMMAND` line.
    fn label(&self) -> &str;

    /// The command this invocation wraps.
    fn cmd(&self) -> CommandSpec;

    /// A dependency-safe name: `label`, lowercased, with whitespace (and
    /// only whitespace) replaced by underscores. Punctuation is left
    /// alone — this is deliberately not the same normalization
    /// [`jobgraph_core::ScriptBuilder`] applies to filenames.
    fn name(&self) -> String {
        fold_whitespace(self.label())
    }

    /// Render this command as a standalone wrapper script under `scripts_dir`.
    fn make_wrapper_script(&self, scripts_dir: &Path) -> Result<PathBuf, PipelineError> {
        ScriptBuilder::build(self.label(), &self.cmd(), scripts_dir).map_err(PipelineError::from)
    }
}

/// An ad-hoc [`PipelineCommand`]: a label plus a variadic token list, with no
/// need to define a new type.
#[derive(Debug, Clone)]
pub struct PipelineCommandWrapper {
    label: String,
    tokens: Vec<String>,
}

impl PipelineCommandWrapper {
    /// `tokens[0]` is the program; the rest are its arguments.
    pub fn new(label: impl Into<String>, tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            label: label.into(),
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Append further argument tokens.
    pub fn add_args(&mut self, tokens: impl IntoIterator<Item = impl Into<String>>) {
        self.tokens.extend(tokens.into_iter().map(Into::into));
    }
}

impl PipelineCommand for PipelineCommandWrapper {
    fn label(&self) -> &str {
        &self.label
    }

    fn cmd(&self) -> CommandSpec {
        CommandSpec::from_tokens(&self.tokens)
            .unwrap_or_else(|| CommandSpec::new("true", std::iter::empty::<String>()))
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
