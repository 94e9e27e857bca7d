// SPDX-License-Identifier: GPL-3.0-or-later

//! Assembles the compilation database from the query output.
//!
//! The builder decides which actions make it into the database. Actions of
//! tool configurations duplicate the actions of the real build (the same
//! source compiled for the execution platform), and sources of the Bazel
//! internal repository are not part of the user's code. Everything else is
//! translated, and the first translation failure aborts the whole batch.

use crate::output::Statistics;
use crate::query::AqueryOutput;
use crate::translate::{ActionTranslator, NormalizedInvocation, TranslationError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Sources under this directory are generated or bootstrap files of Bazel itself.
pub const INTERNAL_SOURCE_DIRECTORY: &str = "external/bazel_tools";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Unable to translate compiler action #{index} of {target}: {source}")]
    Translation {
        index: usize,
        target: String,
        #[source]
        source: TranslationError,
    },
}

pub struct DatabaseBuilder {
    translator: ActionTranslator,
    directory: PathBuf,
    stats: Arc<Statistics>,
}

impl DatabaseBuilder {
    /// Create a builder for the workspace rooted at `directory`.
    pub fn new(translator: ActionTranslator, directory: &Path, stats: Arc<Statistics>) -> Self {
        Self { translator, directory: directory.to_path_buf(), stats }
    }

    /// Translate the actions of the query output in their original order.
    pub fn build(&mut self, output: &AqueryOutput) -> Result<Vec<NormalizedInvocation>, BuildError> {
        let tool_configurations: HashSet<u64> =
            output.configuration.iter().filter(|config| config.is_tool).map(|config| config.id).collect();
        log::debug!("Tool configurations: {tool_configurations:?}");

        let mut entries = Vec::with_capacity(output.actions.len());
        for (index, action) in output.actions.iter().enumerate() {
            Statistics::increment(&self.stats.actions_received);

            if tool_configurations.contains(&action.configuration_id) {
                log::debug!("Skipping action #{index}: tool configuration {}", action.configuration_id);
                Statistics::increment(&self.stats.skipped_tool_configuration);
                continue;
            }

            let entry = self.translator.translate(&self.directory, action).map_err(|source| {
                let target = output
                    .target_label(action.target_id)
                    .map(|label| format!("target {label}"))
                    .unwrap_or_else(|| format!("target #{}", action.target_id));
                BuildError::Translation { index, target, source }
            })?;

            if self.is_internal_source(&entry.file) {
                log::debug!("Skipping action #{index}: internal source {}", entry.file.display());
                Statistics::increment(&self.stats.skipped_internal_source);
                continue;
            }

            log::debug!("Translated action #{index}: {entry:?}");
            Statistics::increment(&self.stats.entries_produced);
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Checks the source location relative to the workspace root, so it works
    /// with both anchored and as-is source paths.
    fn is_internal_source(&self, file: &Path) -> bool {
        file.strip_prefix(&self.directory).unwrap_or(file).starts_with(INTERNAL_SOURCE_DIRECTORY)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::PathFormat;
    use crate::query::{Configuration, RawInvocation, Target};
    use crate::translate::CompilerResolver;
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;

    fn action(target_id: u64, configuration_id: u64, arguments: &[&str]) -> RawInvocation {
        RawInvocation {
            target_id,
            configuration_id,
            arguments: arguments.iter().map(|s| s.to_string()).collect(),
            environment: HashMap::new(),
        }
    }

    fn configuration(id: u64, is_tool: bool) -> Configuration {
        Configuration {
            id,
            mnemonic: if is_tool { "k8-opt-exec".into() } else { "k8-fastbuild".into() },
            platform_name: "k8".into(),
            is_tool,
        }
    }

    fn builder(paths: PathFormat, stats: &Arc<Statistics>) -> DatabaseBuilder {
        let translator = ActionTranslator::new(CompilerResolver::new(&HashMap::new()), paths);
        DatabaseBuilder::new(translator, Path::new("/ws"), Arc::clone(stats))
    }

    fn files(entries: &[NormalizedInvocation]) -> Vec<&Path> {
        entries.iter().map(|entry| entry.file.as_path()).collect()
    }

    #[test]
    fn test_build_keeps_order() {
        let stats = Statistics::new();
        let mut sut = builder(PathFormat::Absolute, &stats);
        let input = AqueryOutput {
            actions: vec![
                action(1, 1, &["gcc", "-c", "src/b.cc"]),
                action(2, 1, &["gcc", "-c", "src/a.cc"]),
                action(3, 1, &["gcc", "-c", "src/c.cc"]),
            ],
            targets: vec![],
            configuration: vec![configuration(1, false)],
        };

        let result = sut.build(&input).unwrap();

        assert_eq!(
            files(&result),
            vec![Path::new("/ws/src/b.cc"), Path::new("/ws/src/a.cc"), Path::new("/ws/src/c.cc")]
        );
        assert_eq!(stats.actions_received.load(Ordering::Relaxed), 3);
        assert_eq!(stats.entries_produced.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_build_skips_tool_configurations() {
        let stats = Statistics::new();
        let mut sut = builder(PathFormat::Absolute, &stats);
        let input = AqueryOutput {
            actions: vec![
                action(1, 1, &["gcc", "-c", "src/a.cc"]),
                action(1, 2, &["gcc", "-c", "src/a.cc"]),
                // Tool actions are not translated, even when they are malformed.
                action(2, 2, &[]),
            ],
            targets: vec![],
            configuration: vec![configuration(1, false), configuration(2, true)],
        };

        let result = sut.build(&input).unwrap();

        assert_eq!(files(&result), vec![Path::new("/ws/src/a.cc")]);
        assert_eq!(stats.skipped_tool_configuration.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_build_skips_internal_sources() {
        for paths in [PathFormat::Absolute, PathFormat::AsIs] {
            let stats = Statistics::new();
            let mut sut = builder(paths, &stats);
            let input = AqueryOutput {
                actions: vec![
                    action(1, 1, &["gcc", "-c", "external/bazel_tools/tools/cpp/empty.cc"]),
                    action(2, 1, &["gcc", "-c", "external/zlib/inflate.c"]),
                    action(3, 1, &["gcc", "-c", "src/bazel_tools.cc"]),
                ],
                targets: vec![],
                configuration: vec![],
            };

            let result = sut.build(&input).unwrap();

            assert_eq!(result.len(), 2, "path format: {paths:?}");
            assert_eq!(stats.skipped_internal_source.load(Ordering::Relaxed), 1);
        }
    }

    #[test]
    fn test_build_fails_fast() {
        let stats = Statistics::new();
        let mut sut = builder(PathFormat::Absolute, &stats);
        let input = AqueryOutput {
            actions: vec![
                action(1, 1, &["gcc", "-c", "src/a.cc"]),
                action(7, 1, &[]),
                action(3, 1, &["gcc", "-c", "src/c.cc"]),
            ],
            targets: vec![Target { id: 7, label: "//src:broken".into() }],
            configuration: vec![],
        };

        let result = sut.build(&input);

        match result {
            Err(BuildError::Translation { index, target, source }) => {
                assert_eq!(index, 1);
                assert_eq!(target, "target //src:broken");
                assert_eq!(source, TranslationError::EmptyArguments { target_id: 7 });
            }
            Ok(_) => panic!("Expected translation error"),
        }
        assert_eq!(stats.actions_received.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_build_reports_unknown_target() {
        let stats = Statistics::new();
        let mut sut = builder(PathFormat::Absolute, &stats);
        let input = AqueryOutput {
            actions: vec![action(9, 1, &["gcc", "-o", "a.o"])],
            targets: vec![],
            configuration: vec![],
        };

        let error = sut.build(&input).unwrap_err();

        assert!(error.to_string().contains("target #9"));
        assert!(matches!(
            error,
            BuildError::Translation { source: TranslationError::MissingSourceFile { target_id: 9 }, .. }
        ));
    }
}
