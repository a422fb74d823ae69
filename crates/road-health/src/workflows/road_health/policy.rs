use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Year treated as "now" when ageing pavement for the decay rate.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2026;
/// A road inspected within this many days counts as recently inspected.
pub const DEFAULT_RECENT_DAYS: i64 = 90;
/// Required gap between inspections before a road is overdue.
pub const DEFAULT_CYCLE_DAYS: i64 = 365;
/// Window before the cycle elapses in which a road is due soon.
pub const DEFAULT_DUE_SOON_DAYS: i64 = 30;

/// Constants feeding the metric deriver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub reference_year: i32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            reference_year: DEFAULT_REFERENCE_YEAR,
        }
    }
}

/// Inspection-cycle windows used to classify a road's inspection status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionPolicy {
    pub recent_window_days: i64,
    pub cycle_days: i64,
    pub due_soon_window_days: i64,
    /// Cycle overrides keyed by lowercased road category.
    #[serde(default)]
    pub category_cycle_days: BTreeMap<String, i64>,
}

impl Default for InspectionPolicy {
    fn default() -> Self {
        Self {
            recent_window_days: DEFAULT_RECENT_DAYS,
            cycle_days: DEFAULT_CYCLE_DAYS,
            due_soon_window_days: DEFAULT_DUE_SOON_DAYS,
            category_cycle_days: BTreeMap::new(),
        }
    }
}

impl InspectionPolicy {
    pub fn cycle_for(&self, category: &str) -> i64 {
        self.category_cycle_days
            .get(&category.trim().to_ascii_lowercase())
            .copied()
            .unwrap_or(self.cycle_days)
    }

    /// Every cycle must leave room for the due-soon window after the recent
    /// window closes, otherwise a single gap could carry two statuses.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.recent_window_days <= 0 || self.due_soon_window_days <= 0 {
            return Err(PolicyError::NonPositiveWindow);
        }

        let cycles = std::iter::once(("default", self.cycle_days)).chain(
            self.category_cycle_days
                .iter()
                .map(|(category, days)| (category.as_str(), *days)),
        );
        for (category, cycle) in cycles {
            if cycle - self.due_soon_window_days <= self.recent_window_days {
                return Err(PolicyError::OverlappingWindows {
                    category: category.to_string(),
                    cycle_days: cycle,
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("inspection windows must be positive")]
    NonPositiveWindow,
    #[error("cycle of {cycle_days} days for '{category}' leaves no gap between the recent and due-soon windows")]
    OverlappingWindows { category: String, cycle_days: i64 },
}
