use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::debug;

use super::OsintSnapshot;

/// Abstraction over snapshot sourcing so fixtures, files and upstream pipelines can be swapped.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Retrieve the snapshot to evaluate.
    async fn load_snapshot(&self) -> Result<OsintSnapshot>;
}

/// Document encodings understood by [`FileSnapshotRepository`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Json5,
    Yaml,
}

impl SnapshotFormat {
    /// Guess the encoding from the file extension; unknown extensions are read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json5") => Self::Json5,
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    fn decode(self, raw: &str) -> Result<Value> {
        let value: Value = match self {
            Self::Json => serde_json::from_str(raw)?,
            Self::Json5 => json5::from_str(raw)?,
            Self::Yaml => serde_yaml::from_str(raw)?,
        };
        Ok(value)
    }
}

/// Loads a snapshot document from disk, decoding it at most once.
pub struct FileSnapshotRepository {
    path: PathBuf,
    cache: OnceCell<OsintSnapshot>,
}

impl FileSnapshotRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_snapshot(&self) -> Result<OsintSnapshot> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read snapshot file at {}", self.path.display()))?;
        let format = SnapshotFormat::from_path(&self.path);
        let value = format.decode(&raw).with_context(|| {
            format!(
                "failed to parse {:?} snapshot at {}",
                format,
                self.path.display()
            )
        })?;
        let snapshot = OsintSnapshot::from_json_value(value)
            .with_context(|| format!("invalid snapshot at {}", self.path.display()))?;
        debug!(
            path = %self.path.display(),
            leaks = snapshot.leak_records().len(),
            categories = snapshot.file_inventory().len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl SnapshotRepository for FileSnapshotRepository {
    async fn load_snapshot(&self) -> Result<OsintSnapshot> {
        let snapshot = self.cache.get_or_try_init(|| self.read_snapshot())?;
        Ok(snapshot.clone())
    }
}

/// Serves an already-constructed snapshot.
#[derive(Debug, Clone)]
pub struct InMemorySnapshotRepository {
    snapshot: OsintSnapshot,
}

impl InMemorySnapshotRepository {
    pub fn new(snapshot: OsintSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotRepository {
    async fn load_snapshot(&self) -> Result<OsintSnapshot> {
        Ok(self.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{LeakRecord, SeverityCounts};

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(
            SnapshotFormat::from_path(Path::new("a/b.json5")),
            SnapshotFormat::Json5
        );
        assert_eq!(
            SnapshotFormat::from_path(Path::new("snap.YML")),
            SnapshotFormat::Yaml
        );
        assert_eq!(
            SnapshotFormat::from_path(Path::new("snap.txt")),
            SnapshotFormat::Json
        );
    }

    #[tokio::test]
    async fn loads_json5_with_comments() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("snapshot.json5");
        write(
            &path,
            r#"
// exported from the scan pipeline
{
    vulnerabilityCounts: { critical: 1, high: 2 },
    leakRecords: [
        { email: "ops@acme.io", databaseName: "Collection1" },
    ],
}
"#,
        );

        let repo = FileSnapshotRepository::new(&path);
        let snapshot = repo.load_snapshot().await.unwrap();
        assert_eq!(
            snapshot.vulnerability_counts(),
            Some(&SeverityCounts::new(1, 2, 0, 0))
        );
        assert_eq!(
            snapshot.leak_records(),
            &[LeakRecord::new("ops@acme.io", "Collection1")]
        );
    }

    #[tokio::test]
    async fn loads_yaml_documents() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("snapshot.yaml");
        write(
            &path,
            "openPorts: [22, 443]\nfileInventory:\n  PDF:\n    - https://acme.io/a.pdf\n",
        );

        let snapshot = FileSnapshotRepository::new(&path)
            .load_snapshot()
            .await
            .unwrap();
        assert_eq!(snapshot.open_ports(), &[22, 443]);
        assert_eq!(snapshot.file_inventory()["PDF"].len(), 1);
    }

    #[tokio::test]
    async fn caches_first_successful_load() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("snapshot.json");
        write(&path, r#"{"openPorts": [80]}"#);

        let repo = FileSnapshotRepository::new(&path);
        let first = repo.load_snapshot().await.unwrap();
        write(&path, r#"{"openPorts": [8080]}"#);
        let second = repo.load_snapshot().await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_file_reports_path() {
        let repo = FileSnapshotRepository::new("/definitely/not/here.json");
        let err = futures::executor::block_on(repo.load_snapshot()).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn malformed_document_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("broken.json");
        write(&path, "[1, 2, 3]");
        let repo = FileSnapshotRepository::new(&path);
        let err = futures::executor::block_on(repo.load_snapshot()).unwrap_err();
        assert!(format!("{err:#}").contains("must be an object"));
    }

    #[tokio::test]
    async fn in_memory_repository_returns_snapshot() {
        let snapshot = OsintSnapshot::builder().open_ports([25]).build();
        let repo = InMemorySnapshotRepository::new(snapshot.clone());
        assert_eq!(repo.load_snapshot().await.unwrap(), snapshot);
    }
}
