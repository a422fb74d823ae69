use serde::{Deserialize, Serialize};
use std::io::Read;

const TRUTHY_TOKENS: [&str; 5] = ["true", "yes", "y", "1", "t"];

/// Registry row exactly as exported, every field optional text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRegistryRow {
    #[serde(alias = "id")]
    pub road_id: Option<String>,
    pub name: Option<String>,
    pub district: Option<String>,
    pub taluka: Option<String>,
    #[serde(alias = "highway")]
    pub highway_ref: Option<String>,
    pub category: Option<String>,
    #[serde(alias = "pci")]
    pub pci_score: Option<String>,
    #[serde(alias = "iri")]
    pub iri_value: Option<String>,
    pub year_constructed: Option<String>,
    pub surface_type: Option<String>,
    pub terrain_type: Option<String>,
    #[serde(alias = "length")]
    pub length_km: Option<String>,
    #[serde(alias = "traffic")]
    pub avg_daily_traffic: Option<String>,
    pub truck_percentage: Option<String>,
    pub flood_prone: Option<String>,
    pub landslide_prone: Option<String>,
    #[serde(alias = "ghat_section")]
    pub ghat_section_flag: Option<String>,
}

/// Inspection row exactly as exported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInspectionRow {
    #[serde(alias = "id")]
    pub road_id: Option<String>,
    #[serde(alias = "date")]
    pub inspection_date: Option<String>,
    #[serde(alias = "score")]
    pub condition_score: Option<String>,
}

/// Rows that deserialized, plus a count of rows the CSV layer rejected.
#[derive(Debug, Clone, Default)]
pub struct ParsedRows<T> {
    pub rows: Vec<T>,
    pub malformed: usize,
}

pub fn read_registry_rows<R: Read>(reader: R) -> Result<ParsedRows<RawRegistryRow>, csv::Error> {
    read_rows(reader)
}

pub fn read_inspection_rows<R: Read>(
    reader: R,
) -> Result<ParsedRows<RawInspectionRow>, csv::Error> {
    read_rows(reader)
}

fn read_rows<R, T>(reader: R) -> Result<ParsedRows<T>, csv::Error>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    // An unreadable header means the table itself is unusable.
    csv_reader.headers()?;

    let mut parsed = ParsedRows {
        rows: Vec::new(),
        malformed: 0,
    };
    for record in csv_reader.deserialize::<T>() {
        match record {
            Ok(row) => parsed.rows.push(row),
            Err(err) if err.is_io_error() => return Err(err),
            Err(_) => parsed.malformed += 1,
        }
    }

    Ok(parsed)
}

/// Lenient float parsing: thousands separators are stripped, anything with
/// letters or a non-finite result is rejected.
pub(crate) fn parse_number(value: Option<&str>) -> Option<f64> {
    let value = value?.trim();
    if value.is_empty() || value.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    value
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

/// Whole-number parsing that tolerates a trailing fraction (`"2015.0"`).
pub(crate) fn parse_whole(value: Option<&str>) -> Option<i32> {
    let parsed = parse_number(value)?.trunc();
    if parsed < i32::MIN as f64 || parsed > i32::MAX as f64 {
        return None;
    }
    Some(parsed as i32)
}

pub(crate) fn parse_flag(value: Option<&str>) -> bool {
    value
        .map(str::trim)
        .map(|token| {
            TRUTHY_TOKENS
                .iter()
                .any(|truthy| truthy.eq_ignore_ascii_case(token))
        })
        .unwrap_or(false)
}

pub(crate) fn clean_text(value: Option<String>) -> String {
    value.map(|text| text.trim().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn numbers_tolerate_separators_and_reject_text() {
        assert_eq!(parse_number(Some(" 1,234.5 ")), Some(1234.5));
        assert_eq!(parse_number(Some("NaN")), None);
        assert_eq!(parse_number(Some("inf")), None);
        assert_eq!(parse_number(Some("12 km")), None);
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(None), None);
    }

    #[test]
    fn whole_numbers_accept_float_exports() {
        assert_eq!(parse_whole(Some("2015.0")), Some(2015));
        assert_eq!(parse_whole(Some("1e12")), None);
        assert_eq!(parse_whole(Some("unknown")), None);
    }

    #[test]
    fn flags_recognize_truthy_tokens_only() {
        for token in ["true", "TRUE", " yes ", "Y", "1", "t"] {
            assert!(parse_flag(Some(token)), "{token}");
        }
        for token in ["false", "0", "no", "", "maybe"] {
            assert!(!parse_flag(Some(token)), "{token}");
        }
        assert!(!parse_flag(None));
    }

    #[test]
    fn registry_rows_accept_export_and_short_headers() {
        let csv = "id,name,pci,iri_value,length,flood_prone\n\
MA-6-SEG-0001, Pune Bypass ,35,5,12.5,True\n";
        let parsed = read_registry_rows(Cursor::new(csv)).expect("rows parse");
        assert_eq!(parsed.malformed, 0);
        let row = &parsed.rows[0];
        assert_eq!(row.road_id.as_deref(), Some("MA-6-SEG-0001"));
        assert_eq!(row.name.as_deref(), Some("Pune Bypass"));
        assert_eq!(row.pci_score.as_deref(), Some("35"));
        assert_eq!(row.iri_value.as_deref(), Some("5"));
        assert_eq!(row.length_km.as_deref(), Some("12.5"));
        assert_eq!(row.flood_prone.as_deref(), Some("True"));
        assert!(row.district.is_none());
    }

    #[test]
    fn short_rows_leave_trailing_fields_empty() {
        let csv = "road_id,inspection_date,condition_score\nMA-RD-SEG-0042,2025-01-10\n";
        let parsed = read_inspection_rows(Cursor::new(csv)).expect("rows parse");
        assert_eq!(parsed.rows.len(), 1);
        assert!(parsed.rows[0].condition_score.is_none());
    }
}
