// SPDX-License-Identifier: GPL-3.0-or-later

use super::clang::Entry;
use super::formats::{JsonCompilationDatabase, SerializationError};
use super::statistics::Statistics;
use super::{WriterCreationError, WriterError};
use crate::config;
use crate::translate::NormalizedInvocation;
use std::sync::Arc;
use std::{fs, io, path};

/// A trait representing a writer for iterator type `T`.
///
/// This trait is implemented by types that can consume an iterator of type `T`
/// and write its elements to some output.
pub(super) trait IteratorWriter<T> {
    /// Writes the iterator as a sequence of elements.
    fn write(self, items: impl Iterator<Item = T>) -> Result<(), WriterError>;
}

/// Projects the translated invocations into compilation database entries.
pub(super) struct ConverterClangOutputWriter<T: IteratorWriter<Entry>> {
    format: config::EntryFormat,
    writer: T,
}

impl<T: IteratorWriter<Entry>> ConverterClangOutputWriter<T> {
    pub(super) fn new(writer: T, format: &config::EntryFormat) -> Self {
        Self { format: format.clone(), writer }
    }
}

impl<T: IteratorWriter<Entry>> IteratorWriter<NormalizedInvocation> for ConverterClangOutputWriter<T> {
    fn write(self, invocations: impl Iterator<Item = NormalizedInvocation>) -> Result<(), WriterError> {
        let format = self.format;
        let entries = invocations.map(move |invocation| Entry::from_invocation(invocation, &format));
        self.writer.write(entries)
    }
}

/// The type represents a writer that writes JSON compilation database files atomically.
///
/// The file is first written to a temporary file and then renamed to the final file name.
/// When the writing fails, the temporary file is removed and the final file is untouched.
pub(super) struct AtomicClangOutputWriter<T: IteratorWriter<Entry>> {
    writer: T,
    temp_path: path::PathBuf,
    final_path: path::PathBuf,
}

impl<T: IteratorWriter<Entry>> AtomicClangOutputWriter<T> {
    pub(super) fn new(writer: T, temp_path: &path::Path, final_path: &path::Path) -> Self {
        Self { writer, temp_path: temp_path.to_path_buf(), final_path: final_path.to_path_buf() }
    }
}

impl<T: IteratorWriter<Entry>> IteratorWriter<Entry> for AtomicClangOutputWriter<T> {
    fn write(self, entries: impl Iterator<Item = Entry>) -> Result<(), WriterError> {
        if let Err(error) = self.writer.write(entries) {
            if let Err(remove_error) = fs::remove_file(&self.temp_path) {
                log::debug!("Failed to remove temporary file {}: {remove_error}", self.temp_path.display());
            }
            return Err(error);
        }

        fs::rename(&self.temp_path, &self.final_path)
            .map_err(|err| WriterError::Io(self.final_path, SerializationError::Io(err)))?;

        Ok(())
    }
}

/// The type represents a writer that writes JSON compilation database files from given entries.
pub(super) struct ClangOutputWriter {
    output: io::BufWriter<fs::File>,
    path: path::PathBuf,
    stats: Arc<Statistics>,
}

impl ClangOutputWriter {
    pub(super) fn create(path: &path::Path, stats: Arc<Statistics>) -> Result<Self, WriterCreationError> {
        let output = fs::File::create(path)
            .map(io::BufWriter::new)
            .map_err(|err| WriterCreationError::Io(path.to_path_buf(), err))?;

        Ok(Self { output, path: path.to_path_buf(), stats })
    }
}

impl IteratorWriter<Entry> for ClangOutputWriter {
    fn write(self, entries: impl Iterator<Item = Entry>) -> Result<(), WriterError> {
        let stats = self.stats;
        let counted = entries.inspect(move |_| Statistics::increment(&stats.entries_written));

        let mut output = self.output;
        JsonCompilationDatabase::write(&mut output, counted).map_err(|err| WriterError::Io(self.path.clone(), err))?;
        io::Write::flush(&mut output)
            .map_err(|err| WriterError::Io(self.path, SerializationError::Io(err)))
    }
}
