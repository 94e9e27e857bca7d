// SPDX-License-Identifier: GPL-3.0-or-later

use crate::environment;
use crate::environment::KEY_BAZEL__WORKSPACE_DIRECTORY;
use anyhow::{Context as AnyhowContext, Result};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Application context containing runtime environment information.
///
/// This struct captures the environmental context needed at startup: the
/// working directory and the environment variables. Later phases (configuration
/// loading, workspace location, compiler resolution) read from this snapshot
/// instead of the process state.
#[derive(Debug, Clone)]
pub struct Context {
    /// Current working directory when the program was invoked
    pub current_directory: PathBuf,
    /// All environment variables at startup
    pub environment: HashMap<String, String>,
}

impl Context {
    /// Capture the current application context.
    ///
    /// This function performs I/O operations to gather system state and should
    /// be called early in the application lifecycle.
    pub fn capture() -> Result<Self> {
        let current_directory =
            env::current_dir().with_context(|| "Failed to get current working directory")?;

        let environment = env::vars().collect::<HashMap<String, String>>();

        Ok(Context { current_directory, environment })
    }

    /// The workspace directory reported by `bazel run`, if any.
    pub fn workspace_directory(&self) -> Option<PathBuf> {
        self.environment
            .get(KEY_BAZEL__WORKSPACE_DIRECTORY)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Application Context:")?;
        writeln!(f, "Current Directory: {}", self.current_directory.display())?;
        writeln!(f, "Total Environment Variables: {} entries", self.environment.len())?;

        writeln!(f, "Relevant Environment Variables:")?;
        let mut relevant: Vec<_> =
            self.environment.iter().filter(|(key, _)| environment::relevant_env(key)).collect();
        relevant.sort();
        for (key, value) in relevant {
            writeln!(f, "  {}={}", key, value)?;
        }

        Ok(())
    }
}
