// SPDX-License-Identifier: GPL-3.0-or-later

//! Locates the Bazel workspace and prepares it for the compilation database.
//!
//! Bazel compiles the sources of external repositories from the `external`
//! directory of the execution root. The compilation database refers to them
//! with the same relative paths, so the workspace root gets an `external`
//! symlink which points into the output base. The link goes through the
//! `bazel-out` convenience symlink, which keeps the workspace movable.

use crate::context::Context;
use crate::environment::KEY_BAZEL__WORKSPACE_DIRECTORY;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The convenience symlink Bazel creates in the workspace root.
pub const OUTPUT_LINK: &str = "bazel-out";
/// The name of the link this module maintains.
pub const EXTERNAL_LINK: &str = "external";
/// Where the external link points to, relative to the workspace root.
pub const EXTERNAL_LINK_TARGET: &str = "bazel-out/../../../external";

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Workspace directory is unknown, BUILD_WORKSPACE_DIRECTORY is not set (run it with `bazel run`)")]
    UnknownRoot,
    #[error("Output directory link is missing: {0} (build the workspace first)")]
    MissingOutput(PathBuf),
    #[error("Unable to resolve external directory link {0}: {1}")]
    InspectLink(PathBuf, std::io::Error),
    #[error("Unable to remove invalid external directory link {0}: {1}")]
    RemoveLink(PathBuf, std::io::Error),
    #[error("Unable to create external directory link {0}: {1}")]
    CreateLink(PathBuf, std::io::Error),
    #[error("External directory link is not supported on this platform")]
    LinkNotSupported,
}

/// The root directory of the Bazel workspace.
#[derive(Clone, Debug, PartialEq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Locate the workspace root.
    ///
    /// The root is reported by `bazel run` in the environment. Without that,
    /// the current directory is taken only when `fallback_to_current` is set.
    pub fn locate(context: &Context, fallback_to_current: bool) -> Result<Self, WorkspaceError> {
        match context.workspace_directory() {
            Some(root) => Ok(Self { root }),
            None if fallback_to_current => {
                log::debug!("{KEY_BAZEL__WORKSPACE_DIRECTORY} is not set, using the current directory");
                Ok(Self { root: context.current_directory.clone() })
            }
            None => Err(WorkspaceError::UnknownRoot),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a path given by the user against the workspace root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Make sure the `external` link exists and points into the output base.
    ///
    /// A link pointing elsewhere is replaced. Anything else than a link with
    /// that name is reported as an error and left untouched.
    #[cfg(unix)]
    pub fn link_external(&self) -> Result<(), WorkspaceError> {
        use std::fs;
        use std::io::ErrorKind;

        let output = self.root.join(OUTPUT_LINK);
        if fs::symlink_metadata(&output).is_err() {
            return Err(WorkspaceError::MissingOutput(output));
        }

        let link = self.root.join(EXTERNAL_LINK);
        match fs::read_link(&link) {
            Ok(current) if current == Path::new(EXTERNAL_LINK_TARGET) => {
                log::debug!("External directory link is up to date: {}", link.display());
                return Ok(());
            }
            Ok(current) => {
                log::warn!(
                    "External directory link points to the wrong place ({}), relinking it",
                    current.display()
                );
                fs::remove_file(&link).map_err(|err| WorkspaceError::RemoveLink(link.clone(), err))?;
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(WorkspaceError::InspectLink(link, err)),
        }

        std::os::unix::fs::symlink(EXTERNAL_LINK_TARGET, &link)
            .map_err(|err| WorkspaceError::CreateLink(link.clone(), err))?;
        log::info!("Created external directory link: {} -> {EXTERNAL_LINK_TARGET}", link.display());
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn link_external(&self) -> Result<(), WorkspaceError> {
        Err(WorkspaceError::LinkNotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn context(current_directory: &str, environment: &[(&str, &str)]) -> Context {
        Context {
            current_directory: PathBuf::from(current_directory),
            environment: environment.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_locate_from_environment() {
        let context = context("/home/user", &[(KEY_BAZEL__WORKSPACE_DIRECTORY, "/ws")]);

        let sut = Workspace::locate(&context, false).unwrap();

        assert_eq!(sut.root(), Path::new("/ws"));
        assert_eq!(sut.resolve(Path::new("compile_commands.json")), PathBuf::from("/ws/compile_commands.json"));
    }

    #[test]
    fn test_locate_without_environment() {
        let context = context("/home/user", &[]);

        assert!(matches!(Workspace::locate(&context, false), Err(WorkspaceError::UnknownRoot)));
        assert_eq!(Workspace::locate(&context, true).unwrap().root(), Path::new("/home/user"));
    }

    #[test]
    fn test_locate_ignores_empty_environment() {
        let context = context("/home/user", &[(KEY_BAZEL__WORKSPACE_DIRECTORY, "")]);

        assert!(matches!(Workspace::locate(&context, false), Err(WorkspaceError::UnknownRoot)));
    }

    #[cfg(unix)]
    mod links {
        use super::*;
        use std::fs;
        use std::os::unix::fs::symlink;
        use tempfile::TempDir;

        fn workspace(dir: &TempDir) -> Workspace {
            Workspace { root: dir.path().to_path_buf() }
        }

        #[test]
        fn test_link_requires_output() {
            let dir = TempDir::new().unwrap();

            let result = workspace(&dir).link_external();

            assert!(matches!(result, Err(WorkspaceError::MissingOutput(_))));
            assert!(fs::symlink_metadata(dir.path().join(EXTERNAL_LINK)).is_err());
        }

        #[test]
        fn test_link_created() {
            let dir = TempDir::new().unwrap();
            symlink("/nonexistent/output/base/execroot/_main/bazel-out", dir.path().join(OUTPUT_LINK)).unwrap();

            workspace(&dir).link_external().unwrap();

            let target = fs::read_link(dir.path().join(EXTERNAL_LINK)).unwrap();
            assert_eq!(target, PathBuf::from(EXTERNAL_LINK_TARGET));
        }

        #[test]
        fn test_link_is_idempotent() {
            let dir = TempDir::new().unwrap();
            fs::create_dir(dir.path().join(OUTPUT_LINK)).unwrap();

            let sut = workspace(&dir);
            sut.link_external().unwrap();
            sut.link_external().unwrap();

            let target = fs::read_link(dir.path().join(EXTERNAL_LINK)).unwrap();
            assert_eq!(target, PathBuf::from(EXTERNAL_LINK_TARGET));
        }

        #[test]
        fn test_wrong_link_replaced() {
            let dir = TempDir::new().unwrap();
            fs::create_dir(dir.path().join(OUTPUT_LINK)).unwrap();
            symlink("/somewhere/else", dir.path().join(EXTERNAL_LINK)).unwrap();

            workspace(&dir).link_external().unwrap();

            let target = fs::read_link(dir.path().join(EXTERNAL_LINK)).unwrap();
            assert_eq!(target, PathBuf::from(EXTERNAL_LINK_TARGET));
        }

        #[test]
        fn test_directory_is_not_replaced() {
            let dir = TempDir::new().unwrap();
            fs::create_dir(dir.path().join(OUTPUT_LINK)).unwrap();
            fs::create_dir(dir.path().join(EXTERNAL_LINK)).unwrap();

            let result = workspace(&dir).link_external();

            assert!(matches!(result, Err(WorkspaceError::InspectLink(_, _))));
            assert!(dir.path().join(EXTERNAL_LINK).is_dir());
        }
    }
}
