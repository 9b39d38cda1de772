// src/export/model.rs

use crate::core::gaps::DeploymentReport;
use crate::utils::time::format_minute;
use serde::Serialize;

/// Flat row exported for every gap window.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct GapExport {
    pub deployment: String,
    pub start: String,
    pub end: String,
    pub hours: f64,
    pub full_gap: bool,
    pub segments: String,
}

/// One row per window; segment ids are `;`-joined so CSV stays flat.
pub(crate) fn reports_to_rows(reports: &[DeploymentReport]) -> Vec<GapExport> {
    reports
        .iter()
        .flat_map(|r| {
            r.report.windows.iter().map(|w| GapExport {
                deployment: r.deployment.clone(),
                start: format_minute(&w.start),
                end: format_minute(&w.end),
                hours: (w.duration_hours() * 100.0).round() / 100.0,
                full_gap: w.is_full_gap,
                segments: w.segment_ids.join(";"),
            })
        })
        .collect()
}
