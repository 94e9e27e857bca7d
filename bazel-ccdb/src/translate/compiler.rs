// SPDX-License-Identifier: GPL-3.0-or-later

//! Resolves the compiler executable of the invocations.
//!
//! Bazel C++ toolchains often record a wrapper script in place of the real
//! compiler. The wrapper only makes sense inside the build sandbox, so it is
//! replaced with the compiler the user points at with the `CXX` variable.

use crate::environment::COMPILER_OVERRIDE_KEYS;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;

/// The file name of the wrapper script Bazel toolchains record as compiler.
pub const WRAPPER_SCRIPT: &str = "cc_wrapper.sh";

#[derive(Debug)]
pub struct CompilerResolver {
    replacement: Option<String>,
    cache: HashMap<String, String>,
}

impl CompilerResolver {
    /// Create a resolver which takes the override from the given environment.
    ///
    /// The override keys are consulted in order, the first non-empty value wins.
    pub fn new(environment: &HashMap<String, String>) -> Self {
        let replacement = COMPILER_OVERRIDE_KEYS
            .iter()
            .filter_map(|key| environment.get(*key))
            .find(|value| !value.is_empty())
            .cloned();

        match &replacement {
            Some(compiler) => log::debug!("Wrapper script will be replaced with: {compiler}"),
            None => log::debug!("No compiler override is set, wrapper scripts are kept"),
        }

        Self { replacement, cache: HashMap::new() }
    }

    /// Returns the compiler to record for the given executable.
    pub fn resolve(&mut self, executable: &str) -> String {
        if let Some(resolved) = self.cache.get(executable) {
            return resolved.clone();
        }

        let resolved = match &self.replacement {
            Some(replacement) if Self::is_wrapper(executable) => replacement.clone(),
            _ => executable.to_string(),
        };
        self.cache.insert(executable.to_string(), resolved.clone());
        resolved
    }

    fn is_wrapper(executable: &str) -> bool {
        Path::new(executable).file_name() == Some(OsStr::new(WRAPPER_SCRIPT))
    }
}
