// SPDX-License-Identifier: GPL-3.0-or-later

//! This module translates the compiler actions of the build graph into
//! compilation database entries.
//!
//! The translation is a single left-to-right pass over the argument list of
//! the action. Each argument is dropped, rewritten or kept as is, but the
//! relative order of the arguments never changes. The steps are:
//!
//! - the compiler executable is resolved (`compiler` module),
//! - sandbox specific flags are dropped,
//! - path arguments are anchored to the workspace root (`paths` module),
//! - the source and the output files are recorded,
//! - language standards are pinned and repeated flags are dropped (`flags` module).

mod compiler;
mod flags;
mod paths;

pub use compiler::{CompilerResolver, WRAPPER_SCRIPT};
pub use flags::{DEDUPLICATED_FLAG_PREFIXES, FlagDeduplicator, LEGACY_STANDARDS, PINNED_STANDARD, pin_version};
pub use paths::{PREFIX_PATH_FLAGS, PathResolver, VALUE_PATH_FLAGS};

use crate::config::PathFormat;
use crate::query::RawInvocation;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Build sandbox path remapping, it must not leak into the compilation database.
const DEBUG_PREFIX_MAP_FLAG: &str = "-fdebug-prefix-map";

const SOURCE_FLAG: &str = "-c";
const OUTPUT_FLAG: &str = "-o";

/// Represents a single source file compilation, the result of the translation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NormalizedInvocation {
    /// The source file which is compiled.
    pub file: PathBuf,
    /// The compiler arguments, the first one is the compiler executable.
    pub arguments: Vec<String>,
    /// The working directory of the compilation.
    pub directory: PathBuf,
    /// The object file which is produced, if the arguments name it.
    pub output: Option<PathBuf>,
}

/// Represents the reasons the translation of an action fails.
#[derive(Debug, Error, PartialEq)]
pub enum TranslationError {
    #[error("Empty arguments for compiler action of target {target_id}")]
    EmptyArguments { target_id: u64 },
    #[error("Unable to find source file (no `-c <file>` pair) for target {target_id}")]
    MissingSourceFile { target_id: u64 },
}

/// Translates the compiler actions of one run.
///
/// The translator owns the compiler resolution cache, so the same instance is
/// used for all actions of the query.
#[derive(Debug)]
pub struct ActionTranslator {
    compiler: CompilerResolver,
    paths: PathFormat,
}

impl ActionTranslator {
    pub fn new(compiler: CompilerResolver, paths: PathFormat) -> Self {
        Self { compiler, paths }
    }

    /// Translate one compiler action.
    ///
    /// The `directory` is the workspace root, the relative paths of the action
    /// are interpreted relative to it.
    pub fn translate(
        &mut self,
        directory: &Path,
        action: &RawInvocation,
    ) -> Result<NormalizedInvocation, TranslationError> {
        let target_id = action.target_id;
        let (executable, rest) =
            action.arguments.split_first().ok_or(TranslationError::EmptyArguments { target_id })?;

        let resolver = match self.paths {
            PathFormat::Absolute => Some(PathResolver::new(directory)),
            PathFormat::AsIs => None,
        };
        let mut deduplicator = FlagDeduplicator::default();

        let mut arguments = Vec::with_capacity(action.arguments.len());
        arguments.push(self.compiler.resolve(executable));

        let mut source = None;
        let mut output = None;
        // The previous token is always the original argument, never the rewritten one.
        for (previous, current) in action.arguments.iter().zip(rest) {
            if current.starts_with(DEBUG_PREFIX_MAP_FLAG) {
                log::trace!("Dropping argument: {current}");
                continue;
            }

            let token = match &resolver {
                Some(resolver) => resolver.rewrite(previous, current),
                None => Cow::Borrowed(current.as_str()),
            };
            match previous.as_str() {
                SOURCE_FLAG if !current.is_empty() => source = Some(token.to_string()),
                OUTPUT_FLAG => output = Some(token.to_string()),
                _ => {}
            }

            let token = pin_version(&token);
            if !deduplicator.admit(token) {
                log::trace!("Dropping repeated argument: {token}");
                continue;
            }
            arguments.push(token.to_string());
        }

        let file = source.ok_or(TranslationError::MissingSourceFile { target_id })?;

        Ok(NormalizedInvocation {
            file: PathBuf::from(file),
            arguments,
            directory: directory.to_path_buf(),
            output: output.map(PathBuf::from),
        })
    }
}
