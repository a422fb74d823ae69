use super::domain::{Band, InspectionStatusFilter, PriorityLevel, ReportType};
use super::policy::InspectionPolicy;
use super::scoring::ScoredRoad;
use crate::error::ReportError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROW_LIMIT: usize = 25;
pub const MAX_ROW_LIMIT: usize = 500;

/// Report request as received from a client. Every field is optional at the
/// wire level; [`ReportRequest::validate`] enforces what is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRequest {
    pub report_type: Option<String>,
    pub district: Option<String>,
    pub condition_band: Option<String>,
    pub priority_level: Option<String>,
    pub cibil_min: Option<f64>,
    pub cibil_max: Option<f64>,
    pub inspection_status: Option<String>,
    pub inspection_date_from: Option<String>,
    pub inspection_date_to: Option<String>,
    pub as_of: Option<String>,
    pub limit: Option<usize>,
}

/// Validated filter configuration. `None` fields are always satisfied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportFilters {
    pub report_type: ReportType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_band: Option<Band>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_level: Option<PriorityLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cibil_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cibil_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspection_status: Option<InspectionStatusFilter>,
    /// Canonical `YYYY-MM-DD`, compared as strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspection_date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspection_date_to: Option<String>,
}

impl ReportFilters {
    pub fn for_report(report_type: ReportType) -> Self {
        Self {
            report_type,
            district: None,
            condition_band: None,
            priority_level: None,
            cibil_min: None,
            cibil_max: None,
            inspection_status: None,
            inspection_date_from: None,
            inspection_date_to: None,
        }
    }
}

/// A validated request: filters plus evaluation date and row limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportQuery {
    pub filters: ReportFilters,
    pub as_of: NaiveDate,
    pub limit: usize,
}

impl ReportRequest {
    pub fn validate(self, today: NaiveDate) -> Result<ReportQuery, ReportError> {
        let report_type = match present(self.report_type) {
            None => return Err(invalid("reportType is required")),
            Some(raw) => ReportType::parse(&raw)
                .ok_or_else(|| invalid(format!("unknown reportType '{raw}'")))?,
        };

        let condition_band = present(self.condition_band)
            .map(|raw| {
                Band::parse(&raw).ok_or_else(|| invalid(format!("unknown conditionBand '{raw}'")))
            })
            .transpose()?;
        let priority_level = present(self.priority_level)
            .map(|raw| {
                PriorityLevel::parse(&raw)
                    .ok_or_else(|| invalid(format!("unknown priorityLevel '{raw}'")))
            })
            .transpose()?;
        let inspection_status = present(self.inspection_status)
            .map(|raw| {
                InspectionStatusFilter::parse(&raw)
                    .ok_or_else(|| invalid(format!("unknown inspectionStatus '{raw}'")))
            })
            .transpose()?;

        for (field, value) in [("cibilMin", self.cibil_min), ("cibilMax", self.cibil_max)] {
            if value.is_some_and(|bound| !bound.is_finite()) {
                return Err(invalid(format!("{field} must be a finite number")));
            }
        }
        if let (Some(min), Some(max)) = (self.cibil_min, self.cibil_max) {
            if min > max {
                return Err(invalid("cibilMin must not exceed cibilMax"));
            }
        }

        let date_from = present(self.inspection_date_from)
            .map(|raw| canonical_date("inspectionDateFrom", &raw))
            .transpose()?;
        let date_to = present(self.inspection_date_to)
            .map(|raw| canonical_date("inspectionDateTo", &raw))
            .transpose()?;
        if let (Some(from), Some(to)) = (&date_from, &date_to) {
            if from > to {
                return Err(invalid(
                    "inspectionDateFrom must not be after inspectionDateTo",
                ));
            }
        }

        let as_of = match present(self.as_of) {
            Some(raw) => parse_date("asOf", &raw)?,
            None => today,
        };
        let limit = match self.limit {
            None => DEFAULT_ROW_LIMIT,
            Some(limit) if (1..=MAX_ROW_LIMIT).contains(&limit) => limit,
            Some(_) => {
                return Err(invalid(format!(
                    "limit must be between 1 and {MAX_ROW_LIMIT}"
                )))
            }
        };

        Ok(ReportQuery {
            filters: ReportFilters {
                report_type,
                district: present(self.district),
                condition_band,
                priority_level,
                cibil_min: self.cibil_min,
                cibil_max: self.cibil_max,
                inspection_status,
                inspection_date_from: date_from,
                inspection_date_to: date_to,
            },
            as_of,
            limit,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn invalid(message: impl Into<String>) -> ReportError {
    ReportError::Validation(message.into())
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ReportError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| invalid(format!("{field} must be a YYYY-MM-DD date (got '{raw}')")))
}

fn canonical_date(field: &str, raw: &str) -> Result<String, ReportError> {
    parse_date(field, raw).map(|date| date.format("%Y-%m-%d").to_string())
}

/// Decides per road whether it satisfies every populated filter.
pub struct FilterEvaluator<'a> {
    filters: &'a ReportFilters,
    policy: &'a InspectionPolicy,
    as_of: NaiveDate,
}

impl<'a> FilterEvaluator<'a> {
    pub fn new(filters: &'a ReportFilters, policy: &'a InspectionPolicy, as_of: NaiveDate) -> Self {
        Self {
            filters,
            policy,
            as_of,
        }
    }

    pub fn matches(&self, road: &ScoredRoad) -> bool {
        let filters = self.filters;
        let metrics = &road.metrics;

        if let Some(district) = &filters.district {
            if road.record.district != *district {
                return false;
            }
        }
        if let Some(band) = filters.condition_band {
            if metrics.band != band {
                return false;
            }
        }
        if let Some(priority) = filters.priority_level {
            if metrics.priority != priority {
                return false;
            }
        }
        if let Some(min) = filters.cibil_min {
            if metrics.composite_score < min {
                return false;
            }
        }
        if let Some(max) = filters.cibil_max {
            if metrics.composite_score > max {
                return false;
            }
        }
        if let Some(wanted) = filters.inspection_status {
            if !wanted.accepts(road.inspection_status(self.as_of, self.policy)) {
                return false;
            }
        }
        if filters.inspection_date_from.is_some() || filters.inspection_date_to.is_some() {
            let Some(last) = road.last_inspection.as_deref() else {
                return false;
            };
            if let Some(from) = filters.inspection_date_from.as_deref() {
                if last < from {
                    return false;
                }
            }
            if let Some(to) = filters.inspection_date_to.as_deref() {
                if last > to {
                    return false;
                }
            }
        }

        true
    }
}
