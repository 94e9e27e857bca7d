// SPDX-License-Identifier: GPL-3.0-or-later

//! This module produces the raw material of the compilation database: the
//! compiler actions reported by the Bazel action graph query.
//!
//! The query output is the `jsonproto` form of the `ActionGraphContainer`
//! message. Only the parts which are relevant to build the compilation
//! database are modeled here, unknown fields are ignored.
//!
//! Two sources are implemented:
//! - `BazelQuery` runs `bazel aquery` and decodes its standard output,
//! - `AqueryFile` replays a previously saved query output.

mod bazel;
mod file;

pub use bazel::BazelQuery;
pub use file::AqueryFile;

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// A single action reported by the query.
///
/// Produced by the query sources, read-only afterwards.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawInvocation {
    #[serde(default)]
    pub target_id: u64,
    #[serde(default)]
    pub configuration_id: u64,
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default, rename = "environmentVariables", deserialize_with = "key_value_pairs")]
    pub environment: HashMap<String, String>,
}

/// A build target the actions belong to.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Target {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub label: String,
}

/// A build configuration the actions were configured for.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub mnemonic: String,
    #[serde(default)]
    pub platform_name: String,
    #[serde(default)]
    pub is_tool: bool,
}

/// The decoded output of one action graph query.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct AqueryOutput {
    #[serde(default)]
    pub actions: Vec<RawInvocation>,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub configuration: Vec<Configuration>,
}

impl AqueryOutput {
    /// Decode the query output and check that it has something to work on.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, QueryError> {
        let output: AqueryOutput = serde_json::from_reader(reader)?;
        if output.actions.is_empty() {
            return Err(QueryError::NoActions);
        }
        log::debug!(
            "Query returned {} actions, {} targets, {} configurations",
            output.actions.len(),
            output.targets.len(),
            output.configuration.len()
        );
        Ok(output)
    }

    /// Returns the label of the target, if the query reported it.
    pub fn target_label(&self, id: u64) -> Option<&str> {
        self.targets.iter().find(|target| target.id == id).map(|target| target.label.as_str())
    }
}

/// The environment of an action is a list of key-value objects in the query output.
fn key_value_pairs<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct KeyValue {
        #[serde(default)]
        key: String,
        #[serde(default)]
        value: String,
    }

    let pairs: Vec<KeyValue> = Deserialize::deserialize(deserializer)?;
    Ok(pairs.into_iter().map(|pair| (pair.key, pair.value)).collect())
}

/// Responsible for producing the action graph query output.
pub trait QuerySource {
    fn query(&self) -> Result<AqueryOutput, QueryError>;
}

/// Represents the errors of the query sources.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unable to find `{0}` executable: {1}")]
    ExecutableNotFound(PathBuf, which::Error),
    #[error("Unable to run `{0}`: {1}")]
    Spawn(String, std::io::Error),
    #[error("Unable to run `{0}`: {1}")]
    Failed(String, std::process::ExitStatus),
    #[error("Unable to read query output {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("Unable to parse query output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unable to find any actions from the query, likely there are BUILD file errors")]
    NoActions,
}
