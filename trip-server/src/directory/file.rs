//! File-backed directory for development and testing without API access.
//!
//! Reads the same JSON the directory API serves.

use std::path::{Path, PathBuf};

use super::error::DirectoryError;
use super::parse_terminals;
use super::types::TerminalDto;

/// Directory source that reads a JSON file on every fetch.
#[derive(Debug, Clone)]
pub struct FileDirectory {
    path: PathBuf,
}

impl FileDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file.
    pub async fn fetch_all(&self) -> Result<Vec<TerminalDto>, DirectoryError> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| DirectoryError::Io {
                path: self.path.clone(),
                source,
            })?;
        parse_terminals(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn reads_directory_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("directory.json");
        std::fs::write(
            &path,
            r#"[{"id": 1, "name": "Cubao", "latitude": 14.62, "longitude": 121.05, "routes": []}]"#,
        )
        .unwrap();

        let terminals = FileDirectory::new(&path).fetch_all().await.unwrap();

        assert_eq!(terminals.len(), 1);
        assert_eq!(terminals[0].name, "Cubao");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let source = FileDirectory::new(dir.path().join("absent.json"));

        assert!(matches!(
            source.fetch_all().await,
            Err(DirectoryError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn malformed_file_fails_whole_fetch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("directory.json");
        std::fs::write(&path, r#"[{"id": 1, "name": "Cubao""#).unwrap();

        assert!(matches!(
            FileDirectory::new(&path).fetch_all().await,
            Err(DirectoryError::Json { .. })
        ));
    }
}
