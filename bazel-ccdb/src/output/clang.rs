// SPDX-License-Identifier: GPL-3.0-or-later

//! This module defines the entries of the JSON compilation database.
//!
//! The definition of the JSON compilation database files is done in the
//! LLVM project [documentation](https://clang.llvm.org/docs/JSONCompilationDatabase.html).

use crate::config;
use crate::translate::NormalizedInvocation;
use serde::{Deserialize, Serialize};
use std::path;
use thiserror::Error;

/// Represents an entry of the compilation database.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The main translation unit source processed by this compilation step.
    /// This is used by tools as the key into the compilation database.
    pub file: path::PathBuf,
    /// The compile command argv as list of strings. `arguments[0]` is the
    /// executable name, the arguments are not escaped.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub arguments: Vec<String>,
    /// The compile command as a single shell-escaped string.
    ///
    /// Either `arguments` or `command` is present, never both.
    #[serde(skip_serializing_if = "String::is_empty")]
    #[serde(default)]
    pub command: String,
    /// The working directory of the compilation. All relative paths in the
    /// `arguments` or `file` fields are relative to this directory.
    pub directory: path::PathBuf,
    /// The name of the output created by this compilation step.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub output: Option<path::PathBuf>,
}

impl Entry {
    /// Create an Entry from arguments (preferred).
    pub fn from_arguments(
        file: impl Into<path::PathBuf>,
        arguments: Vec<String>,
        directory: impl Into<path::PathBuf>,
        output: Option<impl Into<path::PathBuf>>,
    ) -> Self {
        Entry {
            file: file.into(),
            arguments,
            command: String::default(),
            directory: directory.into(),
            output: output.map(|o| o.into()),
        }
    }

    /// Create an Entry from a shell command string.
    pub fn from_command(
        file: impl Into<path::PathBuf>,
        command: String,
        directory: impl Into<path::PathBuf>,
        output: Option<impl Into<path::PathBuf>>,
    ) -> Self {
        Entry {
            file: file.into(),
            arguments: Vec::default(),
            command,
            directory: directory.into(),
            output: output.map(|o| o.into()),
        }
    }

    /// Project a translated invocation into the configured entry shape.
    pub fn from_invocation(invocation: NormalizedInvocation, format: &config::EntryFormat) -> Self {
        let NormalizedInvocation { file, arguments, directory, output } = invocation;
        let output = output.filter(|_| format.include_output_field);

        if format.use_array_format {
            Entry::from_arguments(file, arguments, directory, output)
        } else {
            Entry::from_command(file, shell_words::join(&arguments), directory, output)
        }
    }

    /// Semantic validation of the entry. Checking all fields for
    /// valid values and formats.
    pub fn validate(self) -> Result<Self, EntryError> {
        if self.file.as_os_str().is_empty() {
            return Err(EntryError::EmptyFileName);
        }
        if self.directory.as_os_str().is_empty() {
            return Err(EntryError::EmptyDirectory);
        }
        if self.command.is_empty() && self.arguments.is_empty() {
            return Err(EntryError::CommandOrArgumentsAreMissing);
        }
        if !self.command.is_empty() && !self.arguments.is_empty() {
            return Err(EntryError::CommandOrArgumentsArePresent);
        }
        if !self.command.is_empty() {
            shell_words::split(&self.command)?;
        }
        Ok(self)
    }
}

/// Represents the possible errors that can occur when validating an entry.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("Entry has an empty file field")]
    EmptyFileName,
    #[error("Entry has an empty directory field")]
    EmptyDirectory,
    #[error("Both command and arguments fields are empty")]
    CommandOrArgumentsAreMissing,
    #[error("Both command and arguments fields are present")]
    CommandOrArgumentsArePresent,
    #[error("Entry has an invalid command field: {0}")]
    InvalidCommand(#[from] shell_words::ParseError),
}
