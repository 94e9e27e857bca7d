// SPDX-License-Identifier: GPL-3.0-or-later

// Set by `bazel run` to the root of the workspace the command was invoked from.
pub const KEY_BAZEL__WORKSPACE_DIRECTORY: &str = "BUILD_WORKSPACE_DIRECTORY";

// man page for `exec` (Linux system call)
pub const KEY_OS__PATH: &str = "PATH";

// https://www.gnu.org/software/make/manual/html_node/Implicit-Variables.html
pub const KEY_MAKE__CXX_COMPILER: &str = "CXX";
// Some toolchain setups export the lowercase variant only.
pub const KEY_MAKE__CXX_COMPILER_LOWER: &str = "cxx";

pub const KEY_LOGGING: &str = "RUST_LOG";

/// The compiler override variables in the order they are consulted.
pub const COMPILER_OVERRIDE_KEYS: [&str; 2] = [KEY_MAKE__CXX_COMPILER, KEY_MAKE__CXX_COMPILER_LOWER];

pub fn relevant_env(key: &str) -> bool {
    matches!(
        key,
        KEY_BAZEL__WORKSPACE_DIRECTORY | KEY_MAKE__CXX_COMPILER | KEY_MAKE__CXX_COMPILER_LOWER | KEY_LOGGING
    )
        // Windows PATH variable is case sensitive and not always capitalized
        || key.to_uppercase() == KEY_OS__PATH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevant_env() {
        assert!(relevant_env("BUILD_WORKSPACE_DIRECTORY"));
        assert!(relevant_env("CXX"));
        assert!(relevant_env("cxx"));
        assert!(relevant_env("Path"));
        assert!(!relevant_env("CC"));
        assert!(!relevant_env("HOME"));
    }
}
