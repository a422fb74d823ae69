mod normalizer;
mod parser;

use crate::workflows::road_health::domain::{InspectionEvent, RegistryRecord};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

pub use normalizer::normalize_road_id;
pub use parser::{
    read_inspection_rows, read_registry_rows, ParsedRows, RawInspectionRow, RawRegistryRow,
};

use parser::{clean_text, parse_flag, parse_number, parse_whole};

const UNKNOWN_DISTRICT: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Registry,
    Inspections,
}

impl DatasetKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Registry => "road registry",
            Self::Inspections => "inspection history",
        }
    }
}

#[derive(Debug)]
pub enum DatasetLoadError {
    Io {
        dataset: DatasetKind,
        source: std::io::Error,
    },
    Csv {
        dataset: DatasetKind,
        source: csv::Error,
    },
}

impl DatasetLoadError {
    pub fn dataset(&self) -> DatasetKind {
        match self {
            DatasetLoadError::Io { dataset, .. } | DatasetLoadError::Csv { dataset, .. } => {
                *dataset
            }
        }
    }
}

impl fmt::Display for DatasetLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetLoadError::Io { dataset, source } => {
                write!(f, "failed to read {}: {}", dataset.label(), source)
            }
            DatasetLoadError::Csv { dataset, source } => {
                write!(f, "invalid {} CSV data: {}", dataset.label(), source)
            }
        }
    }
}

impl std::error::Error for DatasetLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetLoadError::Io { source, .. } => Some(source),
            DatasetLoadError::Csv { source, .. } => Some(source),
        }
    }
}

/// Row accounting for one load, surfaced by the refresh endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub registry_rows: usize,
    pub registry_kept: usize,
    pub registry_missing_id: usize,
    pub registry_duplicates: usize,
    pub registry_malformed: usize,
    pub inspection_rows: usize,
    pub inspection_kept: usize,
    pub inspection_missing_id: usize,
    pub inspection_malformed: usize,
}

/// Cleaned registry records and raw inspection events, both in source order.
#[derive(Debug, Clone, Default)]
pub struct LoadedDatasets {
    pub registry: Vec<RegistryRecord>,
    pub inspections: Vec<InspectionEvent>,
    pub report: LoadReport,
}

pub struct DatasetLoader;

impl DatasetLoader {
    pub fn from_paths<P, Q>(registry: P, inspections: Q) -> Result<LoadedDatasets, DatasetLoadError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let registry_file =
            std::fs::File::open(registry.as_ref()).map_err(|source| DatasetLoadError::Io {
                dataset: DatasetKind::Registry,
                source,
            })?;
        let inspection_file =
            std::fs::File::open(inspections.as_ref()).map_err(|source| DatasetLoadError::Io {
                dataset: DatasetKind::Inspections,
                source,
            })?;
        Self::from_readers(registry_file, inspection_file)
    }

    pub fn from_readers<R, S>(registry: R, inspections: S) -> Result<LoadedDatasets, DatasetLoadError>
    where
        R: Read,
        S: Read,
    {
        let registry_rows =
            read_registry_rows(registry).map_err(|source| DatasetLoadError::Csv {
                dataset: DatasetKind::Registry,
                source,
            })?;
        let inspection_rows =
            read_inspection_rows(inspections).map_err(|source| DatasetLoadError::Csv {
                dataset: DatasetKind::Inspections,
                source,
            })?;

        let mut loaded = Self::load(&registry_rows.rows, &inspection_rows.rows);
        loaded.report.registry_malformed = registry_rows.malformed;
        loaded.report.inspection_malformed = inspection_rows.malformed;
        if registry_rows.malformed + inspection_rows.malformed > 0 {
            warn!(
                registry = registry_rows.malformed,
                inspections = inspection_rows.malformed,
                "skipped rows the CSV reader could not decode"
            );
        }
        Ok(loaded)
    }

    /// Validates header-mapped rows into typed records. Never fails: numeric
    /// fields fall back to zero, unrecognized flags to false.
    pub fn load(registry_rows: &[RawRegistryRow], inspection_rows: &[RawInspectionRow]) -> LoadedDatasets {
        let mut report = LoadReport {
            registry_rows: registry_rows.len(),
            inspection_rows: inspection_rows.len(),
            ..LoadReport::default()
        };

        let mut seen: HashSet<String> = HashSet::with_capacity(registry_rows.len());
        let mut registry = Vec::with_capacity(registry_rows.len());
        for row in registry_rows {
            let Some(record) = registry_record(row.clone()) else {
                report.registry_missing_id += 1;
                continue;
            };
            if !seen.insert(record.road_id.clone()) {
                debug!(road_id = %record.road_id, "duplicate registry identifier ignored");
                report.registry_duplicates += 1;
                continue;
            }
            registry.push(record);
        }

        let mut inspections = Vec::with_capacity(inspection_rows.len());
        for row in inspection_rows {
            match inspection_event(row.clone()) {
                Some(event) => inspections.push(event),
                None => report.inspection_missing_id += 1,
            }
        }

        report.registry_kept = registry.len();
        report.inspection_kept = inspections.len();
        info!(
            roads = report.registry_kept,
            inspections = report.inspection_kept,
            duplicates = report.registry_duplicates,
            "datasets loaded"
        );

        LoadedDatasets {
            registry,
            inspections,
            report,
        }
    }
}

fn registry_record(row: RawRegistryRow) -> Option<RegistryRecord> {
    let road_id = clean_text(row.road_id);
    if road_id.is_empty() {
        return None;
    }

    let district = clean_text(row.district);
    Some(RegistryRecord {
        road_id,
        name: clean_text(row.name),
        district: if district.is_empty() {
            UNKNOWN_DISTRICT.to_string()
        } else {
            district
        },
        taluka: clean_text(row.taluka),
        highway_ref: clean_text(row.highway_ref),
        category: clean_text(row.category),
        pci: parse_number(row.pci_score.as_deref())
            .unwrap_or(0.0)
            .clamp(0.0, 100.0),
        iri: parse_number(row.iri_value.as_deref()).unwrap_or(0.0),
        year_constructed: parse_whole(row.year_constructed.as_deref()).unwrap_or(0),
        surface_type: clean_text(row.surface_type),
        terrain_type: clean_text(row.terrain_type),
        length_km: parse_number(row.length_km.as_deref()).unwrap_or(0.0),
        avg_daily_traffic: parse_number(row.avg_daily_traffic.as_deref()).unwrap_or(0.0),
        truck_percentage: parse_number(row.truck_percentage.as_deref()).unwrap_or(0.0),
        flood_prone: parse_flag(row.flood_prone.as_deref()),
        landslide_prone: parse_flag(row.landslide_prone.as_deref()),
        ghat_section: parse_flag(row.ghat_section_flag.as_deref()),
    })
}

fn inspection_event(row: RawInspectionRow) -> Option<InspectionEvent> {
    let road_id = clean_text(row.road_id);
    if road_id.is_empty() {
        return None;
    }

    Some(InspectionEvent {
        road_id,
        inspection_date: clean_text(row.inspection_date),
        condition_score: parse_number(row.condition_score.as_deref()).unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn registry_row(id: &str, pci: &str) -> RawRegistryRow {
        RawRegistryRow {
            road_id: Some(id.to_string()),
            pci_score: Some(pci.to_string()),
            ..RawRegistryRow::default()
        }
    }

    #[test]
    fn malformed_numbers_fall_back_to_documented_defaults() {
        let row = RawRegistryRow {
            road_id: Some(" MA-6-SEG-0001 ".to_string()),
            name: Some("  Pune Bypass ".to_string()),
            pci_score: Some("n/a".to_string()),
            iri_value: Some("".to_string()),
            year_constructed: Some("unknown".to_string()),
            length_km: Some("12,5".to_string()),
            flood_prone: Some("Yes".to_string()),
            ghat_section_flag: Some("nope".to_string()),
            ..RawRegistryRow::default()
        };

        let loaded = DatasetLoader::load(&[row], &[]);
        let record = &loaded.registry[0];
        assert_eq!(record.road_id, "MA-6-SEG-0001");
        assert_eq!(record.name, "Pune Bypass");
        assert_eq!(record.district, "Unknown");
        assert_eq!(record.pci, 0.0);
        assert_eq!(record.iri, 0.0);
        assert_eq!(record.year_constructed, 0);
        assert_eq!(record.length_km, 125.0);
        assert!(record.flood_prone);
        assert!(!record.ghat_section);
    }

    #[test]
    fn pci_is_clamped_into_its_documented_range() {
        let loaded = DatasetLoader::load(&[registry_row("A", "140"), registry_row("B", "-3")], &[]);
        assert_eq!(loaded.registry[0].pci, 100.0);
        assert_eq!(loaded.registry[1].pci, 0.0);
    }

    #[test]
    fn missing_and_duplicate_identifiers_are_counted_not_kept() {
        let rows = vec![
            registry_row("MA-6-SEG-0001", "70"),
            registry_row("  ", "50"),
            registry_row("MA-6-SEG-0001", "20"),
            registry_row("MA-6-SEG-0002", "40"),
        ];
        let inspections = vec![
            RawInspectionRow {
                road_id: Some("MA-6-SEG-0001".to_string()),
                inspection_date: Some(" 2025-03-01 ".to_string()),
                condition_score: Some("bad".to_string()),
            },
            RawInspectionRow::default(),
        ];

        let loaded = DatasetLoader::load(&rows, &inspections);
        assert_eq!(
            loaded
                .registry
                .iter()
                .map(|record| record.road_id.as_str())
                .collect::<Vec<_>>(),
            vec!["MA-6-SEG-0001", "MA-6-SEG-0002"]
        );
        assert_eq!(loaded.registry[0].pci, 70.0, "first row wins");
        assert_eq!(loaded.report.registry_missing_id, 1);
        assert_eq!(loaded.report.registry_duplicates, 1);
        assert_eq!(loaded.inspections.len(), 1);
        assert_eq!(loaded.inspections[0].inspection_date, "2025-03-01");
        assert_eq!(loaded.inspections[0].condition_score, 0.0);
        assert_eq!(loaded.report.inspection_missing_id, 1);
    }

    #[test]
    fn load_does_not_mutate_input_rows() {
        let rows = vec![registry_row(" X ", "55")];
        let before = rows.clone();
        let _ = DatasetLoader::load(&rows, &[]);
        assert_eq!(rows, before);
    }

    #[test]
    fn from_readers_parses_both_tables() {
        let registry = "road_id,name,district,pci_score,iri_value,year_constructed,length_km\n\
MA-6-SEG-0001,NH 6 Segment 1,Pune,35,5,2010,12.5\n";
        let inspections = "road_id,inspection_date,condition_score\n\
MA-NH 6-SEG-0001,2025-06-01,41\n";
        let loaded = DatasetLoader::from_readers(Cursor::new(registry), Cursor::new(inspections))
            .expect("datasets load");
        assert_eq!(loaded.registry.len(), 1);
        assert_eq!(loaded.registry[0].district, "Pune");
        assert_eq!(loaded.registry[0].year_constructed, 2010);
        assert_eq!(loaded.inspections[0].condition_score, 41.0);
        assert_eq!(loaded.report.registry_kept, 1);
        assert_eq!(loaded.report.inspection_kept, 1);
    }

    #[test]
    fn from_paths_reports_which_dataset_is_missing() {
        let error = DatasetLoader::from_paths("./missing-registry.csv", "./missing-inspections.csv")
            .expect_err("expected io error");
        assert_eq!(error.dataset(), DatasetKind::Registry);
        assert!(matches!(error, DatasetLoadError::Io { .. }));
    }
}
