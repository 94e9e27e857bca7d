// SPDX-License-Identifier: GPL-3.0-or-later

//! This module declares the output file format: the JSON compilation database
//! format, as declared by the Clang project.

use super::{clang, json};
use thiserror::Error;

/// Represents errors that can occur while working with file formats.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("Generic IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Format syntax error: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("Format semantic error: {0}")]
    Semantic(#[from] clang::EntryError),
}

/// The type represents a JSON compilation database format.
///
/// The format is a JSON array, each object of it represents a compilation
/// command.
pub struct JsonCompilationDatabase;

impl JsonCompilationDatabase {
    /// Writes the entries as a JSON array. Only valid entries are serialized,
    /// the first invalid one stops the writing.
    pub fn write(
        writer: impl std::io::Write,
        entries: impl Iterator<Item = clang::Entry>,
    ) -> Result<(), SerializationError> {
        json::serialize_result_seq(writer, entries.map(|entry| entry.validate().map_err(SerializationError::Semantic)))
    }
}
