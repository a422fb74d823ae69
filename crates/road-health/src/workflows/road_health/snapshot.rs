use super::index::InspectionIndex;
use super::policy::ScoringPolicy;
use super::report::NetworkTotals;
use super::scoring::{score_roads, ScoredRoad};
use crate::error::ReportError;
use crate::workflows::datasets::{DatasetLoadError, DatasetLoader, LoadReport, LoadedDatasets};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::SystemTime;
use tracing::{info, warn};

/// Change marker for a dataset source. Two equal fingerprints mean the
/// previously loaded snapshot is still valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFingerprint {
    Modified(Vec<Option<SystemTime>>),
    Generation(u64),
}

/// Where the registry and inspection datasets come from.
pub trait DatasetSource: Send + Sync {
    fn fingerprint(&self) -> SourceFingerprint;
    fn load(&self) -> Result<LoadedDatasets, DatasetLoadError>;
}

/// Registry and inspection CSV exports on disk, fingerprinted by mtime.
#[derive(Debug, Clone)]
pub struct CsvDatasetSource {
    registry_path: PathBuf,
    inspections_path: PathBuf,
}

impl CsvDatasetSource {
    pub fn new(registry_path: impl Into<PathBuf>, inspections_path: impl Into<PathBuf>) -> Self {
        Self {
            registry_path: registry_path.into(),
            inspections_path: inspections_path.into(),
        }
    }
}

impl DatasetSource for CsvDatasetSource {
    fn fingerprint(&self) -> SourceFingerprint {
        let modified = [&self.registry_path, &self.inspections_path]
            .into_iter()
            .map(|path| {
                std::fs::metadata(path)
                    .and_then(|metadata| metadata.modified())
                    .ok()
            })
            .collect();
        SourceFingerprint::Modified(modified)
    }

    fn load(&self) -> Result<LoadedDatasets, DatasetLoadError> {
        DatasetLoader::from_paths(&self.registry_path, &self.inspections_path)
    }
}

/// Datasets held in memory; every [`replace`](Self::replace) bumps the
/// generation so the store picks up the new contents.
#[derive(Debug, Default)]
pub struct InMemoryDatasetSource {
    datasets: RwLock<LoadedDatasets>,
    generation: AtomicU64,
}

impl InMemoryDatasetSource {
    pub fn new(datasets: LoadedDatasets) -> Self {
        Self {
            datasets: RwLock::new(datasets),
            generation: AtomicU64::new(0),
        }
    }

    pub fn replace(&self, datasets: LoadedDatasets) {
        *self
            .datasets
            .write()
            .unwrap_or_else(PoisonError::into_inner) = datasets;
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl DatasetSource for InMemoryDatasetSource {
    fn fingerprint(&self) -> SourceFingerprint {
        SourceFingerprint::Generation(self.generation.load(Ordering::SeqCst))
    }

    fn load(&self) -> Result<LoadedDatasets, DatasetLoadError> {
        Ok(self
            .datasets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

/// Immutable, fully derived view of both datasets.
#[derive(Debug)]
pub struct RoadSnapshot {
    pub roads: Vec<ScoredRoad>,
    pub index: InspectionIndex,
    pub totals: NetworkTotals,
    pub load_report: LoadReport,
    fingerprint: SourceFingerprint,
}

impl RoadSnapshot {
    pub fn build(datasets: LoadedDatasets, policy: &ScoringPolicy) -> Self {
        Self::with_fingerprint(datasets, policy, SourceFingerprint::Generation(0))
    }

    fn with_fingerprint(
        datasets: LoadedDatasets,
        policy: &ScoringPolicy,
        fingerprint: SourceFingerprint,
    ) -> Self {
        let index = InspectionIndex::build(&datasets.inspections);
        let roads = score_roads(&datasets.registry, &index, policy);
        let totals = NetworkTotals::from_roads(&roads);
        Self {
            roads,
            index,
            totals,
            load_report: datasets.report,
            fingerprint,
        }
    }
}

/// Owns the current [`RoadSnapshot`] and rebuilds it when the source changes.
///
/// Readers always get a complete snapshot: a rebuild runs to completion
/// before the shared `Arc` is swapped. Only one rebuild runs at a time;
/// callers arriving mid-rebuild wait for it and reuse its result.
pub struct SnapshotStore<S> {
    source: S,
    scoring: ScoringPolicy,
    current: RwLock<Option<Arc<RoadSnapshot>>>,
    rebuild: Mutex<()>,
    invalidated: AtomicBool,
}

impl<S: DatasetSource> SnapshotStore<S> {
    pub fn new(source: S, scoring: ScoringPolicy) -> Self {
        Self {
            source,
            scoring,
            current: RwLock::new(None),
            rebuild: Mutex::new(()),
            invalidated: AtomicBool::new(false),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Snapshot matching the source as it is now, rebuilding if needed.
    ///
    /// A failed rebuild falls back to the previous snapshot when one exists.
    pub fn current(&self) -> Result<Arc<RoadSnapshot>, ReportError> {
        let fingerprint = self.source.fingerprint();
        if let Some(snapshot) = self.fresh(&fingerprint) {
            return Ok(snapshot);
        }

        let _guard = self.rebuild.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(snapshot) = self.fresh(&fingerprint) {
            return Ok(snapshot);
        }
        self.rebuild_locked(fingerprint)
    }

    /// Forces a rebuild on the next [`current`](Self::current).
    pub fn invalidate(&self) {
        self.invalidated.store(true, Ordering::SeqCst);
    }

    /// Invalidates and immediately rebuilds.
    pub fn refresh(&self) -> Result<Arc<RoadSnapshot>, ReportError> {
        self.invalidate();
        self.current()
    }

    pub fn is_loaded(&self) -> bool {
        self.read_current().is_some()
    }

    fn fresh(&self, fingerprint: &SourceFingerprint) -> Option<Arc<RoadSnapshot>> {
        if self.invalidated.load(Ordering::SeqCst) {
            return None;
        }
        self.read_current()
            .filter(|snapshot| snapshot.fingerprint == *fingerprint)
    }

    fn read_current(&self) -> Option<Arc<RoadSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn rebuild_locked(
        &self,
        fingerprint: SourceFingerprint,
    ) -> Result<Arc<RoadSnapshot>, ReportError> {
        self.invalidated.store(false, Ordering::SeqCst);

        match self.source.load() {
            Ok(datasets) => {
                let snapshot = Arc::new(RoadSnapshot::with_fingerprint(
                    datasets,
                    &self.scoring,
                    fingerprint,
                ));
                info!(
                    roads = snapshot.roads.len(),
                    inspected_roads = snapshot.index.key_count(),
                    inspections = snapshot.index.event_count(),
                    "road snapshot rebuilt"
                );
                *self.current.write().unwrap_or_else(PoisonError::into_inner) =
                    Some(Arc::clone(&snapshot));
                Ok(snapshot)
            }
            Err(error) => {
                self.invalidated.store(true, Ordering::SeqCst);
                match self.read_current() {
                    Some(stale) => {
                        warn!(%error, "snapshot rebuild failed; serving previous snapshot");
                        Ok(stale)
                    }
                    None => Err(error.into()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::datasets::{RawInspectionRow, RawRegistryRow};

    fn datasets(ids: &[&str]) -> LoadedDatasets {
        let registry: Vec<RawRegistryRow> = ids
            .iter()
            .map(|id| RawRegistryRow {
                road_id: Some(id.to_string()),
                district: Some("Pune".to_string()),
                pci_score: Some("55".to_string()),
                iri_value: Some("3".to_string()),
                length_km: Some("4.5".to_string()),
                ..RawRegistryRow::default()
            })
            .collect();
        let inspections = vec![RawInspectionRow {
            road_id: Some("MA-RD-SEG-0001".to_string()),
            inspection_date: Some("2025-06-01".to_string()),
            condition_score: Some("60".to_string()),
        }];
        DatasetLoader::load(&registry, &inspections)
    }

    struct FailingSource;

    impl DatasetSource for FailingSource {
        fn fingerprint(&self) -> SourceFingerprint {
            SourceFingerprint::Generation(0)
        }

        fn load(&self) -> Result<LoadedDatasets, DatasetLoadError> {
            Err(DatasetLoadError::Io {
                dataset: crate::workflows::datasets::DatasetKind::Registry,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            })
        }
    }

    #[test]
    fn reuses_snapshot_until_source_changes() {
        let store = SnapshotStore::new(
            InMemoryDatasetSource::new(datasets(&["MA-6-SEG-0001"])),
            ScoringPolicy::default(),
        );
        let first = store.current().expect("snapshot");
        let again = store.current().expect("snapshot");
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(first.totals.total_roads, 1);
        assert_eq!(first.roads[0].inspections.len(), 1);

        store
            .source()
            .replace(datasets(&["MA-6-SEG-0001", "MA-6-SEG-0002"]));
        let rebuilt = store.current().expect("snapshot");
        assert!(!Arc::ptr_eq(&first, &rebuilt));
        assert_eq!(rebuilt.totals.total_roads, 2);
        assert_eq!(rebuilt.totals.total_length_km, 9.0);
    }

    #[test]
    fn invalidate_forces_rebuild() {
        let store = SnapshotStore::new(
            InMemoryDatasetSource::new(datasets(&["MA-6-SEG-0001"])),
            ScoringPolicy::default(),
        );
        let first = store.current().expect("snapshot");
        let refreshed = store.refresh().expect("snapshot");
        assert!(!Arc::ptr_eq(&first, &refreshed));
        assert!(Arc::ptr_eq(&refreshed, &store.current().expect("snapshot")));
    }

    #[test]
    fn missing_data_without_prior_snapshot_is_unavailable() {
        let store = SnapshotStore::new(FailingSource, ScoringPolicy::default());
        let error = store.current().expect_err("no data");
        assert_eq!(error.kind(), "data_unavailable");
        assert!(!store.is_loaded());
    }

    #[test]
    fn concurrent_readers_share_one_rebuild() {
        let store = Arc::new(SnapshotStore::new(
            InMemoryDatasetSource::new(datasets(&["MA-6-SEG-0001"])),
            ScoringPolicy::default(),
        ));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.current().expect("snapshot"))
            })
            .collect();
        let snapshots: Vec<Arc<RoadSnapshot>> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread"))
            .collect();
        assert!(snapshots
            .windows(2)
            .all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }
}
