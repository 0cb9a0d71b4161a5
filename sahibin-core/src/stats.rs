//! Serialized access to the durable statistics aggregate.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::model::{
    RECENT_SCANS_LIMIT, ScanRecord, StatisticsAggregate, StatsSnapshot, WasteCategoryInfo,
};
use crate::ports::{StatsRepository, StoreError};

/// Default number of scan records kept in the durable document.
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Result of a committed scan.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedScan {
    /// The history entry that was appended.
    pub record: ScanRecord,
    /// Statistics after the scan was applied.
    pub snapshot: StatsSnapshot,
}

/// Single writer for the statistics aggregate.
///
/// Every load-mutate-persist cycle and every read runs under one lock, so
/// concurrent scans never lose increments. Cycles run on their own task and
/// finish even when the caller is dropped.
#[derive(Clone)]
pub struct StatisticsStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    repository: Arc<dyn StatsRepository>,
    history_limit: usize,
    lock: Mutex<()>,
}

impl StatisticsStore {
    /// Create a store keeping at most `history_limit` records (never fewer than
    /// the number exposed by snapshots).
    #[must_use]
    pub fn new(repository: Arc<dyn StatsRepository>, history_limit: usize) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                repository,
                history_limit: history_limit.max(RECENT_SCANS_LIMIT),
                lock: Mutex::new(()),
            }),
        }
    }

    /// Number of history records retained in the durable document.
    #[must_use]
    pub fn history_limit(&self) -> usize {
        self.inner.history_limit
    }

    /// Record one scan of `info` and persist the updated aggregate.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the aggregate cannot be loaded or saved. The
    /// durable document is left as it was in that case.
    pub async fn record_scan(
        &self,
        info: &'static WasteCategoryInfo,
        confidence_percent: f64,
    ) -> Result<RecordedScan, StoreError> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.commit(info, confidence_percent).await })
            .await
            .map_err(|err| StoreError::Aborted(err.to_string()))?
    }

    /// Current statistics. An empty aggregate is reported until the first scan.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the aggregate cannot be loaded.
    pub async fn snapshot(&self) -> Result<StatsSnapshot, StoreError> {
        let _guard = self.inner.lock.lock().await;
        let aggregate = self.inner.load_or_default().await?;
        Ok(aggregate.snapshot())
    }
}

impl StoreInner {
    async fn load_or_default(&self) -> Result<StatisticsAggregate, StoreError> {
        Ok(self.repository.load().await?.unwrap_or_default())
    }

    async fn commit(
        &self,
        info: &WasteCategoryInfo,
        confidence_percent: f64,
    ) -> Result<RecordedScan, StoreError> {
        let _guard = self.lock.lock().await;

        let mut aggregate = self.load_or_default().await?;
        let record = ScanRecord {
            waste_type: info.label.to_owned(),
            confidence_percent: confidence_percent.clamp(0.0, 100.0),
            timestamp: Utc::now(),
        };
        aggregate.apply_scan(info, record.clone(), self.history_limit);

        if let Err(err) = self.repository.save(&aggregate).await {
            log::error!("Failed to persist scan of {}: {err}", info.label);
            return Err(err);
        }

        log::debug!(
            "Recorded {} scan, {} total",
            info.label,
            aggregate.total_scans
        );

        Ok(RecordedScan {
            record,
            snapshot: aggregate.snapshot(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::WasteCatalog;
    use crate::persistence::MemoryRepository;

    fn info(label: &str) -> &'static WasteCategoryInfo {
        WasteCatalog::builtin().lookup(label).expect("label is built in")
    }

    #[tokio::test]
    async fn empty_store_reports_zeroes() {
        let store = StatisticsStore::new(Arc::new(MemoryRepository::new()), 100);
        let snapshot = store.snapshot().await.expect("snapshot");

        assert_eq!(snapshot.items_detected, 0, "no scans yet");
        assert!(snapshot.recycling_rate.abs() < f64::EPSILON, "zero rate");
        assert!(snapshot.recent_scans.is_empty(), "no history");
    }

    #[tokio::test]
    async fn record_scan_returns_updated_snapshot() {
        let repo = Arc::new(MemoryRepository::new());
        let store = StatisticsStore::new(Arc::clone(&repo) as Arc<dyn StatsRepository>, 100);

        let recorded = store
            .record_scan(info("BATTERY"), 88.5)
            .await
            .expect("record succeeds");

        assert_eq!(recorded.record.waste_type, "BATTERY", "canonical label");
        assert_eq!(recorded.snapshot.items_detected, 1, "one scan");
        assert_eq!(
            recorded.snapshot.recent_scans,
            vec![recorded.record.clone()],
            "history holds the new record"
        );
        assert!(repo.raw_document().await.is_some(), "aggregate was persisted");
        assert_eq!(
            store.snapshot().await.expect("snapshot"),
            recorded.snapshot,
            "snapshot reads the persisted state"
        );
    }

    #[tokio::test]
    async fn history_limit_never_drops_below_exposed_window() {
        let store = StatisticsStore::new(Arc::new(MemoryRepository::new()), 3);
        assert_eq!(store.history_limit(), RECENT_SCANS_LIMIT, "limit is raised");

        for _ in 0..12 {
            store
                .record_scan(info("PAPER"), 70.0)
                .await
                .expect("record succeeds");
        }
        let snapshot = store.snapshot().await.expect("snapshot");
        assert_eq!(snapshot.recent_scans.len(), RECENT_SCANS_LIMIT, "window");
        assert_eq!(snapshot.items_detected, 12, "counters keep counting");
    }
}
