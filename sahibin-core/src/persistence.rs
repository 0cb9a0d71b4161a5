//! Storage backends for the statistics document.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt as _;
use tokio::sync::Mutex;

use crate::model::StatisticsAggregate;
use crate::ports::{StatsRepository, StoreError};

/// Fixed key of the single statistics document.
pub const STATS_DOCUMENT_KEY: &str = "user_stats";

/// Stores the aggregate as a pretty-printed JSON file named after
/// [`STATS_DOCUMENT_KEY`] inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    dir: PathBuf,
    path: PathBuf,
}

impl JsonFileRepository {
    /// Create a repository rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(format!("{STATS_DOCUMENT_KEY}.json"));
        Self { dir, path }
    }

    /// Location of the statistics document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StatsRepository for JsonFileRepository {
    async fn load(&self) -> Result<Option<StatisticsAggregate>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Io(err)),
        };
        let aggregate = serde_json::from_slice(&bytes)?;
        Ok(Some(aggregate))
    }

    async fn save(&self, aggregate: &StatisticsAggregate) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(aggregate)?;
        fs::create_dir_all(&self.dir).await?;

        // Write next to the target and rename so readers never see a partial file.
        let temp_path = self.path.with_extension("json.tmp");
        let committed = match write_synced(&temp_path, &bytes).await {
            Ok(()) => fs::rename(&temp_path, &self.path).await,
            Err(err) => Err(err),
        };

        if let Err(err) = committed {
            if let Err(cleanup) = fs::remove_file(&temp_path).await
                && cleanup.kind() != ErrorKind::NotFound
            {
                log::warn!(
                    "Failed to remove temporary statistics file {}: {cleanup}",
                    temp_path.display()
                );
            }
            return Err(StoreError::Io(err));
        }
        Ok(())
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// Keeps the aggregate in memory as its serialized JSON form.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    document: Mutex<Option<Vec<u8>>>,
}

impl MemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw bytes of the stored document, if any.
    pub async fn raw_document(&self) -> Option<Vec<u8>> {
        self.document.lock().await.clone()
    }
}

#[async_trait]
impl StatsRepository for MemoryRepository {
    async fn load(&self) -> Result<Option<StatisticsAggregate>, StoreError> {
        let guard = self.document.lock().await;
        match guard.as_deref() {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, aggregate: &StatisticsAggregate) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(aggregate)?;
        *self.document.lock().await = Some(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;

    use super::*;
    use crate::model::ScanRecord;

    fn sample() -> StatisticsAggregate {
        StatisticsAggregate {
            total_scans: 1,
            recyclable_count: 1,
            non_recyclable_count: 0,
            total_co2_saved: 0.3,
            total_energy_saved: 0.8,
            total_water_saved: 5.0,
            total_trees_saved: 0.012,
            category_counts: BTreeMap::from([("GLASS".to_owned(), 1)]),
            scan_history: vec![ScanRecord {
                waste_type: "GLASS".to_owned(),
                confidence_percent: 91.25,
                timestamp: Utc::now(),
            }],
        }
    }

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = JsonFileRepository::new(dir.path().join("nested"));
        assert!(
            repo.load().await.expect("load succeeds").is_none(),
            "no document yet"
        );
    }

    #[tokio::test]
    async fn save_then_load_returns_same_aggregate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = JsonFileRepository::new(dir.path().join("data"));
        let aggregate = sample();

        repo.save(&aggregate).await.expect("save succeeds");
        let loaded = repo.load().await.expect("load succeeds");

        assert_eq!(loaded, Some(aggregate), "document round trips");
        assert!(
            !repo.path().with_extension("json.tmp").exists(),
            "temporary file is renamed away"
        );
        assert!(
            repo.path().ends_with("user_stats.json"),
            "document is stored under its fixed key"
        );
    }

    #[tokio::test]
    async fn corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = JsonFileRepository::new(dir.path());
        std::fs::write(repo.path(), b"{ not json").expect("write corrupt file");

        let err = repo.load().await.expect_err("corrupt file must not load");
        assert!(matches!(err, StoreError::Json(_)), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn failed_rename_removes_temporary_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = JsonFileRepository::new(dir.path());
        // A non-empty directory at the target path makes the rename fail.
        std::fs::create_dir_all(repo.path().join("occupied")).expect("block target");

        let err = repo.save(&sample()).await.expect_err("rename must fail");
        assert!(matches!(err, StoreError::Io(_)), "unexpected error: {err}");
        assert!(
            !repo.path().with_extension("json.tmp").exists(),
            "temporary file is cleaned up"
        );
    }

    #[tokio::test]
    async fn loads_document_with_offset_less_timestamps() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = JsonFileRepository::new(dir.path());
        std::fs::write(
            repo.path(),
            r#"{
                "total_scans": 1,
                "recyclable_count": 1,
                "non_recyclable_count": 0,
                "total_co2_saved": 0.3,
                "total_energy_saved": 0.8,
                "total_water_saved": 5,
                "total_trees_saved": 0.012,
                "category_counts": { "GLASS": 1 },
                "scan_history": [
                    { "waste_type": "GLASS", "confidence": 91.2, "timestamp": "2025-01-04T10:11:12.123456" }
                ]
            }"#,
        )
        .expect("write document");

        let loaded = repo
            .load()
            .await
            .expect("load succeeds")
            .expect("document present");
        assert_eq!(loaded.total_scans, 1, "counters kept");
        assert_eq!(
            loaded.scan_history[0].timestamp.to_rfc3339(),
            "2025-01-04T10:11:12.123456+00:00",
            "timestamp read as utc"
        );

        repo.save(&loaded).await.expect("save succeeds");
        let text = std::fs::read_to_string(repo.path()).expect("read document");
        assert!(
            text.contains("2025-01-04T10:11:12.123456Z"),
            "rewritten with an explicit offset"
        );
    }

    #[tokio::test]
    async fn document_uses_original_field_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = JsonFileRepository::new(dir.path());
        repo.save(&sample()).await.expect("save succeeds");

        let text = std::fs::read_to_string(repo.path()).expect("read document");
        for key in [
            "\"total_scans\"",
            "\"recyclable_count\"",
            "\"category_counts\"",
            "\"scan_history\"",
            "\"confidence\"",
        ] {
            assert!(text.contains(key), "missing key {key}");
        }
    }
}
