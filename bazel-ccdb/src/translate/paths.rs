// SPDX-License-Identifier: GPL-3.0-or-later

//! Anchors the workspace relative paths of the compiler arguments to the
//! workspace root.
//!
//! Bazel reports the arguments relative to the execution root. The compilation
//! database consumers run in a different directory, therefore the path carrying
//! arguments are made absolute. The rewrite is purely lexical: the filesystem is
//! not consulted, and the current directory marker (`.`) of the include and
//! dependency flags is kept as is. Values are always appended to the base
//! directory, an absolute value included (`/usr/include` becomes
//! `<base>/usr/include`).

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// Flags which carry the path in the same token (e.g. `-Iinclude`).
pub const PREFIX_PATH_FLAGS: [&str; 2] = ["-I", "-frandom-seed="];

/// Flags which are followed by a path in the next token (e.g. `-isystem include`).
pub const VALUE_PATH_FLAGS: [&str; 3] = ["-isystem", "-iquote", "-MF"];

/// Flags naming the source and the output file in the next token. These are
/// anchored even when the value is the current directory.
pub const FILE_PATH_FLAGS: [&str; 2] = ["-c", "-o"];

const CURRENT_DIRECTORY: &str = ".";

/// Rewrites path arguments relative to a base directory.
#[derive(Debug)]
pub struct PathResolver {
    base: PathBuf,
}

impl PathResolver {
    pub fn new(base: &Path) -> Self {
        Self { base: base.to_path_buf() }
    }

    /// Rewrite the token if it is a path argument.
    ///
    /// The `previous` token is the original argument before the current one
    /// in the compiler invocation. The rewrite is not idempotent: calling this
    /// more than once on the same token anchors it again.
    pub fn rewrite<'a>(&self, previous: &str, token: &'a str) -> Cow<'a, str> {
        if FILE_PATH_FLAGS.contains(&previous) {
            return Cow::Owned(self.anchor(token));
        }
        if VALUE_PATH_FLAGS.contains(&previous) {
            return if token == CURRENT_DIRECTORY { Cow::Borrowed(token) } else { Cow::Owned(self.anchor(token)) };
        }

        for prefix in PREFIX_PATH_FLAGS {
            match token.strip_prefix(prefix) {
                None | Some("") => continue,
                Some(CURRENT_DIRECTORY) => return Cow::Borrowed(token),
                Some(value) => return Cow::Owned(format!("{prefix}{}", self.anchor(value))),
            }
        }

        Cow::Borrowed(token)
    }

    fn anchor(&self, value: &str) -> String {
        // `Path::join` would replace the base with an absolute value.
        let relative: PathBuf = Path::new(value)
            .components()
            .filter(|component| !matches!(component, Component::RootDir | Component::Prefix(_)))
            .collect();
        normalize(&self.base.join(relative)).to_string_lossy().into_owned()
    }
}

/// Lexically clean the path: drop `.` components and resolve `..` against the
/// preceding component.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match result.components().next_back() {
                Some(Component::Normal(_)) => {
                    result.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => result.push(component.as_os_str()),
            },
            _ => result.push(component.as_os_str()),
        }
    }
    result
}
