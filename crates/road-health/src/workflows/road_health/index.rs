use super::domain::InspectionEvent;
use crate::workflows::datasets::normalize_road_id;
use std::collections::HashMap;

/// Inspection events grouped by normalized road key.
///
/// Events keep their source order within a key. The most recent inspection
/// date per key is the lexicographic maximum of its non-empty date strings,
/// which matches chronological order for fixed-width ISO-8601 dates.
#[derive(Debug, Clone, Default)]
pub struct InspectionIndex {
    events: HashMap<String, Vec<InspectionEvent>>,
    latest: HashMap<String, String>,
}

impl InspectionIndex {
    pub fn build(inspections: &[InspectionEvent]) -> Self {
        let mut index = Self::default();
        for event in inspections {
            let key = normalize_road_id(&event.road_id);

            let date = event.inspection_date.trim();
            let newer = index
                .latest
                .get(&key)
                .map_or(true, |latest| latest.as_str() < date);
            if !date.is_empty() && newer {
                index.latest.insert(key.clone(), date.to_string());
            }

            index.events.entry(key).or_default().push(event.clone());
        }
        index
    }

    /// Events for `key`, empty when the road was never inspected.
    pub fn lookup(&self, key: &str) -> &[InspectionEvent] {
        self.events.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn latest_date(&self, key: &str) -> Option<&str> {
        self.latest.get(key).map(String::as_str)
    }

    pub fn key_count(&self) -> usize {
        self.events.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }
}
