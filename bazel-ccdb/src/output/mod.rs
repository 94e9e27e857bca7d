// SPDX-License-Identifier: GPL-3.0-or-later

//! This module is responsible for writing the compilation database.
//!
//! The `OutputWriter` struct represents the main entry point for writing output.
//! The input to the `OutputWriter` is a sequence of translated invocations,
//! which are projected into the configured entry shape and written atomically.

pub mod clang;
mod formats;
mod json;
mod statistics;
mod writers;

use crate::config;
use crate::translate::NormalizedInvocation;
use std::path;
use std::sync::Arc;
use thiserror::Error;
use writers::{AtomicClangOutputWriter, ClangOutputWriter, ConverterClangOutputWriter, IteratorWriter};

// Re-export types for convenience.
pub use formats::{JsonCompilationDatabase, SerializationError};
pub use statistics::Statistics;

/// A stack of output writers for Clang compilation databases.
type ClangWriterStack = ConverterClangOutputWriter<AtomicClangOutputWriter<ClangOutputWriter>>;

/// Represents the output writer for JSON compilation databases.
pub struct OutputWriter {
    writer: ClangWriterStack,
    path: path::PathBuf,
}

impl OutputWriter {
    /// Creates the writer stack for the given output file.
    ///
    /// The entries are written into a temporary file next to the output file,
    /// which replaces the output file only when all entries were written.
    pub fn create(
        final_path: &path::Path,
        format: &config::Format,
        stats: Arc<Statistics>,
    ) -> Result<Self, WriterCreationError> {
        let temp_path = final_path.with_extension("tmp");

        let base_writer = ClangOutputWriter::create(&temp_path, stats)?;
        let atomic_writer = AtomicClangOutputWriter::new(base_writer, &temp_path, final_path);
        let formatted_writer = ConverterClangOutputWriter::new(atomic_writer, &format.entries);

        Ok(Self { writer: formatted_writer, path: final_path.to_path_buf() })
    }

    /// Writes the invocations using the configured output writer.
    pub fn write(self, invocations: impl Iterator<Item = NormalizedInvocation>) -> Result<(), WriterError> {
        log::debug!("Writing compilation database: {}", self.path.display());
        self.writer.write(invocations)
    }
}

/// Represents errors that can occur while creating an output writer.
#[derive(Error, Debug)]
pub enum WriterCreationError {
    #[error("Failed to create the output writer {0}: {1}")]
    Io(path::PathBuf, std::io::Error),
}

/// Represents errors that can occur while writing output.
#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Serialization error {0}: {1}")]
    Io(path::PathBuf, SerializationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::Ordering;
    use tempfile::tempdir;

    fn invocation(file: &str) -> NormalizedInvocation {
        NormalizedInvocation {
            file: PathBuf::from(file),
            arguments: vec!["cc".into(), "-c".into(), file.into()],
            directory: PathBuf::from("/ws"),
            output: None,
        }
    }

    #[test]
    fn test_write_replaces_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("compile_commands.json");
        fs::write(&path, "previous content").unwrap();
        let stats = Statistics::new();

        let sut = OutputWriter::create(&path, &config::Format::default(), Arc::clone(&stats)).unwrap();
        sut.write(vec![invocation("/ws/a.c"), invocation("/ws/b.c")].into_iter()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert!(!dir.path().join("compile_commands.tmp").exists());
        assert_eq!(stats.entries_written.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_write_failure_leaves_no_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("compile_commands.json");

        let sut = OutputWriter::create(&path, &config::Format::default(), Statistics::new()).unwrap();
        let result = sut.write(vec![invocation("/ws/a.c"), invocation("")].into_iter());

        assert!(result.is_err());
        assert!(!path.exists());
        assert!(!dir.path().join("compile_commands.tmp").exists());
    }
}
