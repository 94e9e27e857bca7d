// SPDX-License-Identifier: GPL-3.0-or-later

mod generate;

use crate::query::{AqueryFile, BazelQuery, QueryError};
use crate::workspace::{Workspace, WorkspaceError};
use crate::{args, config, context};
use generate::Generation;
use std::path::Path;
use std::process::ExitCode;

pub use generate::GenerationError;

/// Represent the modes the application can run in.
///
/// - query: run `bazel aquery` in the workspace and convert its output.
/// - replay: convert a previously saved `bazel aquery` output.
///
/// The two modes differ only in the source of the actions. The conversion and
/// the output writing are the same.
pub enum Mode {
    Query { workspace: Workspace, link_external: bool, query: BazelQuery, generation: Generation },
    Replay { source: AqueryFile, generation: Generation },
}

impl Mode {
    /// Configure the application mode based on the command line arguments and the configuration.
    ///
    /// Here we are checking if the command line arguments and configuration are valid.
    /// If the arguments are valid, we create the appropriate mode instance.
    /// If that is not the case, we try to return a useful error message.
    pub fn configure(
        context: context::Context,
        workspace: Workspace,
        args: args::Arguments,
        config: config::Main,
    ) -> Result<Self, ConfigurationError> {
        let output = workspace.resolve(Path::new(&args.output));
        let generation = Generation::create(&context, workspace.root(), output, &config.format);

        match args.mode {
            args::Mode::Query { arguments } => {
                log::debug!("Mode: query the workspace");

                let mut query_config = config.query;
                if let Some(target) = args.target {
                    query_config.target = target;
                }
                let query = BazelQuery::create(&query_config, workspace.root(), &arguments);
                let link_external = config.workspace.link_external;

                Ok(Self::Query { workspace, link_external, query, generation })
            }
            args::Mode::Replay { input } => {
                log::debug!("Mode: replay query output");

                let source = AqueryFile::create(&context.current_directory.join(&input))
                    .map_err(ConfigurationError::InvalidInput)?;

                Ok(Self::Replay { source, generation })
            }
        }
    }

    /// It actually runs the application mode.
    ///
    /// These errors are all run-time errors, the user were passing valid
    /// arguments and configurations.
    pub fn run(self) -> ExitCode {
        let status = match self {
            Self::Query { workspace, link_external, query, generation } => {
                Self::prepare(&workspace, link_external).and_then(|_| generation.run(&query).map_err(RunError::from))
            }
            Self::Replay { source, generation } => generation.run(&source).map_err(RunError::from),
        };
        match status {
            Ok(_) => ExitCode::SUCCESS,
            Err(error) => {
                log::error!("bazel-ccdb: {error}");
                ExitCode::FAILURE
            }
        }
    }

    fn prepare(workspace: &Workspace, link_external: bool) -> Result<(), RunError> {
        if link_external {
            workspace.link_external()?;
        } else {
            log::debug!("External directory link is disabled");
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid input file: {0}")]
    InvalidInput(QueryError),
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("{0}")]
    Workspace(#[from] WorkspaceError),
    #[error("{0}")]
    Generation(#[from] GenerationError),
}
