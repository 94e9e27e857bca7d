// SPDX-License-Identifier: GPL-3.0-or-later

use crate::database::{BuildError, DatabaseBuilder};
use crate::output::{OutputWriter, Statistics, WriterCreationError, WriterError};
use crate::query::{QueryError, QuerySource};
use crate::translate::{ActionTranslator, CompilerResolver};
use crate::{config, context};
use std::path;
use std::sync::Arc;
use thiserror::Error;

/// Represents the failures of one generation run.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Query(#[from] QueryError),
    #[error("{0}")]
    Build(#[from] BuildError),
    #[error("{0}")]
    WriterCreation(#[from] WriterCreationError),
    #[error("{0}")]
    Writer(#[from] WriterError),
}

/// The generation pipeline, which is independent of the query source.
///
/// The whole query output is translated before the output file is touched,
/// so a failing translation leaves the previous compilation database intact.
pub struct Generation {
    builder: DatabaseBuilder,
    output: path::PathBuf,
    format: config::Format,
    stats: Arc<Statistics>,
}

impl Generation {
    pub(super) fn create(
        context: &context::Context,
        directory: &path::Path,
        output: path::PathBuf,
        format: &config::Format,
    ) -> Self {
        let stats = Statistics::new();
        let compiler = CompilerResolver::new(&context.environment);
        let translator = ActionTranslator::new(compiler, format.paths);
        let builder = DatabaseBuilder::new(translator, directory, Arc::clone(&stats));

        Self { builder, output, format: format.clone(), stats }
    }

    /// Query the actions, translate them and write the result to the output file.
    pub(super) fn run(mut self, source: &impl QuerySource) -> Result<(), GenerationError> {
        let result = self.query_and_write(source);

        log::info!("{}", self.stats);
        result
    }

    fn query_and_write(&mut self, source: &impl QuerySource) -> Result<(), GenerationError> {
        let actions = source.query()?;

        let entries = self.builder.build(&actions)?;
        if entries.is_empty() {
            log::warn!("No compilation database entries were produced");
        }

        let writer = OutputWriter::create(&self.output, &self.format, Arc::clone(&self.stats))?;
        writer.write(entries.into_iter())?;
        log::info!("Compilation database written: {}", self.output.display());

        Ok(())
    }
}
