use road_health::workflows::road_health::{
    CsvDatasetSource, DatasetSource, ScoringPolicy, SnapshotStore,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const REGISTRY: &str = include_str!("fixtures/road_registry.csv");
const INSPECTIONS: &str = include_str!("fixtures/road_inspections.csv");

fn write_fixtures(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let registry = dir.join("road_registry.csv");
    let inspections = dir.join("road_inspections.csv");
    fs::write(&registry, REGISTRY).expect("write registry");
    fs::write(&inspections, INSPECTIONS).expect("write inspections");
    (registry, inspections)
}

#[test]
fn csv_source_loads_and_caches_snapshot() {
    let dir = TempDir::new().expect("temp dir");
    let (registry, inspections) = write_fixtures(dir.path());
    let store = SnapshotStore::new(
        CsvDatasetSource::new(&registry, &inspections),
        ScoringPolicy::default(),
    );

    let first = store.current().expect("snapshot loads");
    assert_eq!(first.roads.len(), 7);
    assert_eq!(first.load_report.registry_duplicates, 1);
    assert_eq!(first.index.event_count(), 7);

    let second = store.current().expect("snapshot cached");
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn refresh_picks_up_rewritten_files() {
    let dir = TempDir::new().expect("temp dir");
    let (registry, inspections) = write_fixtures(dir.path());
    let store = SnapshotStore::new(
        CsvDatasetSource::new(&registry, &inspections),
        ScoringPolicy::default(),
    );
    assert_eq!(store.current().expect("snapshot").roads.len(), 7);

    let trimmed: String = REGISTRY.lines().take(3).map(|line| format!("{line}\n")).collect();
    fs::write(&registry, trimmed).expect("rewrite registry");

    let refreshed = store.refresh().expect("refresh succeeds");
    assert_eq!(refreshed.roads.len(), 2);
    assert_eq!(refreshed.totals.total_roads, 2);
}

#[test]
fn missing_files_surface_as_data_unavailable() {
    let dir = TempDir::new().expect("temp dir");
    let source = CsvDatasetSource::new(
        dir.path().join("absent_registry.csv"),
        dir.path().join("absent_inspections.csv"),
    );
    assert!(source.load().is_err());

    let store = SnapshotStore::new(source, ScoringPolicy::default());
    let error = store.current().expect_err("nothing to load");
    assert_eq!(error.kind(), "data_unavailable");
    assert!(error.to_string().contains("road registry"));
}

#[test]
fn failed_rebuild_keeps_serving_previous_snapshot() {
    let dir = TempDir::new().expect("temp dir");
    let (registry, inspections) = write_fixtures(dir.path());
    let store = SnapshotStore::new(
        CsvDatasetSource::new(&registry, &inspections),
        ScoringPolicy::default(),
    );
    let original = store.current().expect("snapshot");

    fs::remove_file(&inspections).expect("remove inspections");
    let stale = store.refresh().expect("stale snapshot served");
    assert!(Arc::ptr_eq(&original, &stale));
}
