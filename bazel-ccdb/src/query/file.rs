// SPDX-License-Identifier: GPL-3.0-or-later

use super::{AqueryOutput, QueryError, QuerySource};
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Represents a saved query output as the source of the actions.
///
/// The file content is what `bazel aquery --output=jsonproto` printed, which
/// makes it possible to generate the compilation database without Bazel.
#[derive(Debug)]
pub struct AqueryFile {
    path: PathBuf,
}

impl AqueryFile {
    pub fn create(path: &Path) -> Result<Self, QueryError> {
        if !path.is_file() {
            return Err(QueryError::Read(
                path.to_path_buf(),
                io::Error::new(io::ErrorKind::NotFound, "query output file not found"),
            ));
        }
        Ok(Self { path: path.to_path_buf() })
    }
}

impl QuerySource for AqueryFile {
    fn query(&self) -> Result<AqueryOutput, QueryError> {
        log::info!("Reading query output: {}", self.path.display());

        let reader = fs::File::open(&self.path)
            .map(io::BufReader::new)
            .map_err(|err| QueryError::Read(self.path.clone(), err))?;

        AqueryOutput::from_reader(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();

        let result = AqueryFile::create(&dir.path().join("aquery.json"));
        assert!(matches!(result, Err(QueryError::Read(_, _))));
    }

    #[test]
    fn test_read_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aquery.json");
        fs::write(&path, r#"{"actions": [{"targetId": 1, "arguments": ["cc", "-c", "a.c"]}]}"#).unwrap();

        let sut = AqueryFile::create(&path).unwrap();
        let result = sut.query().unwrap();

        assert_eq!(result.actions.len(), 1);
        assert_eq!(result.actions[0].arguments, vec!["cc", "-c", "a.c"]);
    }

    #[test]
    fn test_read_file_without_actions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aquery.json");
        fs::write(&path, r#"{"targets": []}"#).unwrap();

        let sut = AqueryFile::create(&path).unwrap();
        assert!(matches!(sut.query(), Err(QueryError::NoActions)));
    }
}
