// SPDX-License-Identifier: GPL-3.0-or-later

//! This module defines the configuration of the application.
//!
//! The configuration is either loaded from a file or used with default
//! values, which are defined in the code.
//!
//! The configuration file syntax is based on the YAML format.
//! The default configuration file name is `bazel-ccdb.yml`.
//!
//! The configuration file location is searched in the following order:
//! 1. The current working directory
//! 2. The workspace root directory
//! 3. The local configuration directory of the user
//! 4. The configuration directory of the user
//! 5. The local configuration directory of the application
//! 6. The configuration directory of the application
//!
//! ```yaml
//! schema: 1.0
//!
//! query:
//!   executable: bazel
//!   target: //...
//!   mnemonic: CppCompile
//!   flags: ["--config=clang"]
//!
//! workspace:
//!   link_external: true
//!
//! format:
//!   paths: absolute
//!   entries:
//!     use_array_format: true
//!     include_output_field: true
//! ```

// Re-Export the types and the loader module content.
pub use loader::{ConfigError, Loader};
pub use types::*;
pub use validation::Validator;

mod types {
    use serde::Deserialize;
    use std::fmt;
    use std::path::PathBuf;

    /// Represents the application configuration.
    #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Main {
        #[serde(deserialize_with = "validate_schema_version", default = "default_schema")]
        pub schema: String,
        #[serde(default)]
        pub query: Query,
        #[serde(default)]
        pub workspace: Workspace,
        #[serde(default)]
        pub format: Format,
    }

    impl Default for Main {
        fn default() -> Self {
            Self {
                schema: default_schema(),
                query: Query::default(),
                workspace: Workspace::default(),
                format: Format::default(),
            }
        }
    }

    impl fmt::Display for Main {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(f, "Configuration:")?;
            match serde_yml::to_string(self) {
                Ok(yaml_string) => {
                    for line in yaml_string.lines() {
                        writeln!(f, "{}", line)?;
                    }
                    Ok(())
                }
                Err(error) => writeln!(f, "  (can't be serialized: {error})"),
            }
        }
    }

    /// The build graph query parameters.
    #[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Query {
        /// The Bazel executable, looked up on the `PATH` when it's not a path.
        #[serde(default = "default_executable")]
        pub executable: PathBuf,
        /// The label whose dependencies are queried.
        #[serde(default = "default_target")]
        pub target: String,
        /// The action mnemonic which selects the compile actions.
        #[serde(default = "default_mnemonic")]
        pub mnemonic: String,
        /// Extra flags appended to the query command.
        #[serde(default)]
        pub flags: Vec<String>,
    }

    impl Default for Query {
        fn default() -> Self {
            Self {
                executable: default_executable(),
                target: default_target(),
                mnemonic: default_mnemonic(),
                flags: vec![],
            }
        }
    }

    /// Workspace bootstrap options.
    #[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Workspace {
        /// Create the `external` symlink in the workspace root, which makes
        /// the paths of external repositories resolvable from the root.
        #[serde(default = "default_enabled")]
        pub link_external: bool,
    }

    impl Default for Workspace {
        fn default() -> Self {
            Self { link_external: true }
        }
    }

    /// Format configuration matching the YAML format.
    #[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Format {
        #[serde(default)]
        pub paths: PathFormat,
        #[serde(default)]
        pub entries: EntryFormat,
    }

    /// How the paths of the compiler arguments are written.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
    pub enum PathFormat {
        /// Relative paths are anchored to the workspace root. (Default)
        #[default]
        #[serde(rename = "absolute")]
        Absolute,
        /// Leave the paths as Bazel reports them.
        #[serde(rename = "as-is")]
        AsIs,
    }

    /// Configuration for formatting output entries matching the YAML format.
    #[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct EntryFormat {
        #[serde(default = "default_enabled")]
        pub use_array_format: bool,
        #[serde(default = "default_enabled")]
        pub include_output_field: bool,
    }

    impl Default for EntryFormat {
        fn default() -> Self {
            Self { use_array_format: true, include_output_field: true }
        }
    }

    const SUPPORTED_SCHEMA_VERSION: &str = "1.0";

    fn default_schema() -> String {
        String::from(SUPPORTED_SCHEMA_VERSION)
    }

    fn default_executable() -> PathBuf {
        PathBuf::from("bazel")
    }

    fn default_target() -> String {
        String::from("//...")
    }

    fn default_mnemonic() -> String {
        String::from("CppCompile")
    }

    fn default_enabled() -> bool {
        true
    }

    // Custom deserialization function to validate the schema version
    fn validate_schema_version<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let schema: String = Deserialize::deserialize(deserializer)?;
        if schema != SUPPORTED_SCHEMA_VERSION {
            use serde::de::Error;
            Err(Error::custom(format!(
                "Unsupported schema version: {schema}. Expected: {SUPPORTED_SCHEMA_VERSION}"
            )))
        } else {
            Ok(schema)
        }
    }
}

pub mod validation {

    use super::types::*;
    use thiserror::Error;

    /// Trait for validating configuration objects
    pub trait Validator<T> {
        type Error: std::error::Error;

        fn validate(config: &T) -> Result<(), Self::Error>;
    }

    /// Validation errors for configuration
    #[derive(Debug, Error)]
    pub enum ValidationError {
        #[error("Empty string value for field '{field}'")]
        EmptyString { field: String },
        #[error("Multiple validation errors: {errors:?}")]
        Multiple { errors: Vec<ValidationError> },
    }

    /// Combinator for collecting and handling validation errors
    #[derive(Default)]
    struct ValidationCollector {
        errors: Vec<ValidationError>,
    }

    impl ValidationCollector {
        fn add(&mut self, error: ValidationError) {
            self.errors.push(error);
        }

        fn add_result(&mut self, result: Result<(), ValidationError>) {
            if let Err(error) = result {
                match error {
                    ValidationError::Multiple { errors } => self.errors.extend(errors),
                    single_error => self.errors.push(single_error),
                }
            }
        }

        fn finish(mut self) -> Result<(), ValidationError> {
            match self.errors.len() {
                0 => Ok(()),
                1 => Err(self.errors.remove(0)),
                _ => Err(ValidationError::Multiple { errors: self.errors }),
            }
        }
    }

    impl Validator<Main> for Main {
        type Error = ValidationError;

        fn validate(config: &Main) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::default();
            collector.add_result(Query::validate(&config.query));
            collector.finish()
        }
    }

    impl Validator<Query> for Query {
        type Error = ValidationError;

        fn validate(config: &Query) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::default();

            if config.executable.as_os_str().is_empty() {
                collector.add(ValidationError::EmptyString { field: "query.executable".to_string() });
            }
            if config.target.trim().is_empty() {
                collector.add(ValidationError::EmptyString { field: "query.target".to_string() });
            }
            if config.mnemonic.trim().is_empty() {
                collector.add(ValidationError::EmptyString { field: "query.mnemonic".to_string() });
            }
            for (idx, flag) in config.flags.iter().enumerate() {
                if flag.trim().is_empty() {
                    collector.add(ValidationError::EmptyString { field: format!("query.flags[{idx}]") });
                }
            }

            collector.finish()
        }
    }

}

pub mod loader {
    use super::{Main, Validator};
    use crate::context::Context;
    use directories::{BaseDirs, ProjectDirs};
    use log::{debug, info};
    use std::fs::OpenOptions;
    use std::path::{Path, PathBuf};
    use thiserror::Error;

    /// The name of the configuration file in the default locations.
    pub const CONFIG_FILE_NAME: &str = "bazel-ccdb.yml";

    pub struct Loader {}

    impl Loader {
        /// Loads the configuration from the specified file or the default locations.
        ///
        /// If the configuration file is specified, it will be used. Otherwise, the default locations
        /// will be searched for the configuration file. If the configuration file is not found, the
        /// default configuration will be returned.
        pub fn load(
            context: &Context,
            workspace_root: Option<&Path>,
            filename: &Option<String>,
        ) -> Result<Main, ConfigError> {
            if let Some(path) = filename {
                return Self::from_file(Path::new(path));
            }

            for location in Self::file_locations(context, workspace_root) {
                debug!("Checking configuration file: {}", location.display());
                if location.is_file() {
                    return Self::from_file(location.as_path());
                }
            }
            debug!("Configuration file not found. Using the default configuration.");
            Ok(Main::default())
        }

        /// The default locations where the configuration file can be found.
        fn file_locations(context: &Context, workspace_root: Option<&Path>) -> Vec<PathBuf> {
            let mut locations = Vec::new();

            locations.push(context.current_directory.clone());
            if let Some(root) = workspace_root {
                locations.push(root.to_path_buf());
            }
            if let Some(base_dirs) = BaseDirs::new() {
                locations.push(base_dirs.config_local_dir().to_path_buf());
                locations.push(base_dirs.config_dir().to_path_buf());
            }
            if let Some(proj_dirs) = ProjectDirs::from("com.github", "rizsotto", "bazel-ccdb") {
                locations.push(proj_dirs.config_local_dir().to_path_buf());
                locations.push(proj_dirs.config_dir().to_path_buf());
            }
            // filter out duplicate elements from the list
            locations.dedup();
            // append the default configuration file name to the locations
            locations.iter().map(|p| p.join(CONFIG_FILE_NAME)).collect()
        }

        /// Loads the configuration from the specified file.
        pub fn from_file(path: &Path) -> Result<Main, ConfigError> {
            info!("Loading configuration file: {}", path.display());

            let reader = OpenOptions::new()
                .read(true)
                .open(path)
                .map_err(|source| ConfigError::FileAccess { path: path.to_path_buf(), source })?;

            let content: Main = Self::from_reader(reader)
                .map_err(|source| ConfigError::ParseError { path: path.to_path_buf(), source })?;

            Main::validate(&content)
                .map_err(|source| ConfigError::ValidationError { path: path.to_path_buf(), source })?;

            Ok(content)
        }

        /// Define the deserialization format of the config file.
        fn from_reader<R, T>(rdr: R) -> serde_yml::Result<T>
        where
            R: std::io::Read,
            T: serde::de::DeserializeOwned,
        {
            serde_yml::from_reader(rdr)
        }
    }

    /// Represents all possible configuration-related errors.
    #[derive(Debug, Error)]
    pub enum ConfigError {
        /// Error when opening or reading a configuration file.
        #[error("Failed to access configuration file '{path}': {source}")]
        FileAccess {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        /// Error when parsing the configuration file format.
        #[error("Failed to parse configuration from file '{path}': {source}")]
        ParseError {
            path: PathBuf,
            #[source]
            source: serde_yml::Error,
        },
        /// Error when configuration validation fails.
        #[error("Configuration validation failed '{path}': {source}")]
        ValidationError {
            path: PathBuf,
            #[source]
            source: crate::config::validation::ValidationError,
        },
    }

    #[cfg(test)]
    mod test {
        use super::super::*;
        use super::*;
        use std::collections::HashMap;
        use std::fs;
        use tempfile::TempDir;

        fn context(current_directory: &Path) -> Context {
            Context { current_directory: current_directory.to_path_buf(), environment: HashMap::new() }
        }

        #[test]
        fn test_full_config() {
            let content: &[u8] = br#"
            schema: 1.0

            query:
              executable: /opt/bazel/bin/bazelisk
              target: //src/main:app
              mnemonic: CppCompile
              flags: ["--config=clang", "--keep_going"]

            workspace:
              link_external: false

            format:
              paths: as-is
              entries:
                use_array_format: false
                include_output_field: false
            "#;

            let result: Main = Loader::from_reader(content).unwrap();

            let expected = Main {
                schema: String::from("1.0"),
                query: Query {
                    executable: PathBuf::from("/opt/bazel/bin/bazelisk"),
                    target: "//src/main:app".into(),
                    mnemonic: "CppCompile".into(),
                    flags: vec!["--config=clang".into(), "--keep_going".into()],
                },
                workspace: Workspace { link_external: false },
                format: Format {
                    paths: PathFormat::AsIs,
                    entries: EntryFormat { use_array_format: false, include_output_field: false },
                },
            };

            assert_eq!(expected, result);
        }

        #[test]
        fn test_incomplete_config() {
            let content: &[u8] = br#"
            schema: 1.0

            query:
              target: //lib:core
            "#;

            let result: Main = Loader::from_reader(content).unwrap();

            assert_eq!(result.query.target, "//lib:core");
            assert_eq!(result.query.executable, PathBuf::from("bazel"));
            assert_eq!(result.query.mnemonic, "CppCompile");
            assert!(result.workspace.link_external);
            assert_eq!(result.format, Format::default());
        }

        #[test]
        fn test_unsupported_schema() {
            let content: &[u8] = br#"
            schema: 4.0
            "#;

            let result: serde_yml::Result<Main> = Loader::from_reader(content);

            assert!(result.is_err());
        }

        #[test]
        fn test_load_from_current_directory() {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join(CONFIG_FILE_NAME), "schema: 1.0\nquery:\n  target: //cwd:app\n").unwrap();

            let result = Loader::load(&context(dir.path()), None, &None).unwrap();

            assert_eq!(result.query.target, "//cwd:app");
        }

        #[test]
        fn test_load_from_workspace_root() {
            let cwd = TempDir::new().unwrap();
            let root = TempDir::new().unwrap();
            fs::write(root.path().join(CONFIG_FILE_NAME), "schema: 1.0\nquery:\n  target: //root:app\n").unwrap();

            let result = Loader::load(&context(cwd.path()), Some(root.path()), &None).unwrap();

            assert_eq!(result.query.target, "//root:app");
        }

        #[test]
        fn test_load_explicit_file_missing() {
            let dir = TempDir::new().unwrap();
            let missing = dir.path().join("missing.yml").display().to_string();

            let result = Loader::load(&context(dir.path()), None, &Some(missing));

            assert!(matches!(result, Err(ConfigError::FileAccess { .. })));
        }

        #[test]
        fn test_load_invalid_file() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("config.yml");
            fs::write(&path, "schema: 1.0\nquery:\n  mnemonic: \"\"\n").unwrap();

            let result = Loader::load(&context(dir.path()), None, &Some(path.display().to_string()));

            assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
        }

        #[test]
        fn test_display_renders_yaml() {
            let output = Main::default().to_string();

            assert!(output.starts_with("Configuration:"));
            assert!(output.contains("mnemonic: CppCompile"));
            assert!(output.contains("as-is") || output.contains("absolute"));
        }
    }
}
