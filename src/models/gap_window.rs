use chrono::{DateTime, Utc};
use serde::Serialize;

/// A reported span of suspected (bad segments) or confirmed (no segments)
/// missing science data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_full_gap: bool,
    pub segment_ids: Vec<String>,
}

impl GapWindow {
    pub fn full(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            is_full_gap: true,
            segment_ids: Vec::new(),
        }
    }

    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }
}

/// Result of analyzing one deployment's segments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapReport {
    pub windows: Vec<GapWindow>,
    pub latest: DateTime<Utc>,
    pub staleness_hours: f64,
    pub is_stale: bool,
    pub has_issues: bool,
}
