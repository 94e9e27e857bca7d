// SPDX-License-Identifier: GPL-3.0-or-later

use super::{AqueryOutput, QueryError, QuerySource};
use crate::config;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// The target which selects every package of the workspace.
const ALL_TARGETS: &str = "//...";

/// Flags which are passed to every query.
///
/// - The `jsonproto` output is decoded by this program, artifacts are not used.
/// - Logging and progress report is silenced on the console.
/// - Param files would hide the compiler arguments until the compilation happened.
/// - Layering check depends on generated module maps, which prevents the query
///   before the first build.
/// - Header parsing generates compile actions without source files.
const QUERY_FLAGS: [&str; 10] = [
    "--output=jsonproto",
    "--include_artifacts=false",
    "--ui_event_filters=-info",
    "--noshow_progress",
    "--features=-compiler_param_file",
    "--host_features=-compiler_param_file",
    "--features=-layering_check",
    "--host_features=-layering_check",
    "--features=-parse_headers",
    "--host_features=-parse_headers",
];

/// Runs the `aquery` command of Bazel in the workspace root.
#[derive(Debug)]
pub struct BazelQuery {
    executable: PathBuf,
    arguments: Vec<String>,
    directory: PathBuf,
}

impl BazelQuery {
    /// Assemble the query command from the configuration and the extra arguments
    /// given on the command line.
    pub fn create(config: &config::Query, directory: &Path, extra: &[String]) -> Self {
        let mut arguments = vec!["aquery".to_string(), Self::scope(&config.mnemonic, &config.target)];
        arguments.extend(QUERY_FLAGS.iter().map(|flag| flag.to_string()));
        arguments.extend(config.flags.iter().cloned());
        arguments.extend(extra.iter().cloned());

        Self { executable: config.executable.clone(), arguments, directory: directory.to_path_buf() }
    }

    /// The query expression selecting the compile actions of the target.
    fn scope(mnemonic: &str, target: &str) -> String {
        if target == ALL_TARGETS {
            format!("mnemonic('{mnemonic}', {target})")
        } else {
            format!("mnemonic('{mnemonic}', deps({target}))")
        }
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    fn command_line(&self) -> String {
        let mut words = vec![self.executable.display().to_string()];
        words.extend(self.arguments.iter().cloned());
        shell_words::join(words)
    }
}

impl QuerySource for BazelQuery {
    fn query(&self) -> Result<AqueryOutput, QueryError> {
        let executable = which::which(&self.executable)
            .map_err(|err| QueryError::ExecutableNotFound(self.executable.clone(), err))?;

        let command_line = self.command_line();
        log::info!("Query command: {command_line}");

        let output = Command::new(&executable)
            .args(&self.arguments)
            .current_dir(&self.directory)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|err| QueryError::Spawn(command_line.clone(), err))?;

        if !output.status.success() {
            return Err(QueryError::Failed(command_line, output.status));
        }
        log::debug!("Query produced {} bytes of output", output.stdout.len());

        AqueryOutput::from_reader(output.stdout.as_slice())
    }
}
