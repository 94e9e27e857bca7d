// SPDX-License-Identifier: GPL-3.0-or-later

//! This module contains the command line interface of the application.
//!
//! The command line parsing is implemented using the `clap` library.
//! The module is defining types to represent a structured form of the
//! program invocation. The `Arguments` type is used to represent all
//! possible invocations of the program.

use anyhow::anyhow;
use clap::{Arg, ArgAction, ArgMatches, Command, arg, command};
use std::fmt;

/// Common constants used in the module.
const DEFAULT_OUTPUT_FILE: &str = "compile_commands.json";
const QUERY_ARGUMENTS: &str = "QUERY_ARGS";

/// Represents the command line arguments of the application.
#[derive(Debug, PartialEq)]
pub struct Arguments {
    // The verbosity level, the number of `-v` flags.
    pub verbose: u8,
    // The path of the configuration file.
    pub config: Option<String>,
    // The query target, overrides the configuration.
    pub target: Option<String>,
    // The path of the compilation database.
    pub output: String,
    // The mode of the application.
    pub mode: Mode,
}

/// Represents the mode of the application.
#[derive(Debug, PartialEq)]
pub enum Mode {
    /// Run the Bazel query with extra arguments.
    Query { arguments: Vec<String> },
    /// Read the query output from a file.
    Replay { input: String },
}

impl Arguments {
    /// The default log filter for the verbosity level.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl TryFrom<ArgMatches> for Arguments {
    type Error = anyhow::Error;

    fn try_from(matches: ArgMatches) -> Result<Self, Self::Error> {
        let verbose = matches.get_count("verbose");
        let config = matches.get_one::<String>("config").map(String::to_string);
        let target = matches.get_one::<String>("target").map(String::to_string);
        let output = matches
            .get_one::<String>("output")
            .map(String::to_string)
            .ok_or_else(|| anyhow!("missing output file"))?;

        let mode = match matches.get_one::<String>("input") {
            Some(input) => Mode::Replay { input: input.to_string() },
            None => {
                let arguments = matches
                    .get_many::<String>(QUERY_ARGUMENTS)
                    .map(|values| values.cloned().collect())
                    .unwrap_or_default();
                Mode::Query { arguments }
            }
        };

        Ok(Arguments { verbose, config, target, output, mode })
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Arguments:")?;
        writeln!(f, "  config: {}", self.config.as_deref().unwrap_or("-"))?;
        writeln!(f, "  target: {}", self.target.as_deref().unwrap_or("-"))?;
        writeln!(f, "  output: {}", self.output)?;
        match &self.mode {
            Mode::Query { arguments } => write!(f, "  mode: query {}", shell_words::join(arguments)),
            Mode::Replay { input } => write!(f, "  mode: replay {input}"),
        }
    }
}

/// Represents the command line interface of the application.
///
/// Without the `--input` flag the application queries Bazel, with it the
/// application replays a previously saved query output.
pub fn cli() -> Command {
    command!()
        .about("Generates a JSON compilation database from the compile actions of a Bazel workspace")
        .args(&[
            arg!(-v --verbose ... "Sets the level of verbosity").action(ArgAction::Count),
            arg!(-c --config <FILE> "Path of the config file"),
            arg!(-t --target <LABEL> "Query target, overrides the configuration"),
            arg!(-o --output <FILE> "Path of the result file, relative paths are resolved against the workspace root")
                .default_value(DEFAULT_OUTPUT_FILE)
                .hide_default_value(false),
            arg!(-i --input <FILE> "Read the query output from the file, instead of running Bazel")
                .conflicts_with_all(["target", QUERY_ARGUMENTS]),
            Arg::new(QUERY_ARGUMENTS)
                .help("Extra arguments of the Bazel query")
                .action(ArgAction::Append)
                .num_args(1..)
                .last(true),
        ])
}
