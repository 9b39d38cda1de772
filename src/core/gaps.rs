//! Per-deployment data gap check: fetch segments, analyze, report.
//!
//! Each deployment is handled independently; a failure is reported and
//! the loop moves on to the next one.

use crate::core::calculator::{AnalyzerParams, analyze};
use crate::core::tbd::TbdLocator;
use crate::errors::{AppError, AppResult};
use crate::models::deployment::DeploymentName;
use crate::models::gap_window::{GapReport, GapWindow};
use crate::source::SegmentSource;
use crate::ui::messages::{error, warning};
use crate::utils::time::{format_hours, format_minute};
use chrono::{DateTime, Utc};
use log::info;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct GapCheckOptions {
    pub slocum_dir: Option<PathBuf>,
    pub check_tbds: bool,
    pub available_tbds_only: bool,
    pub with_profiles: bool,
    pub params: AnalyzerParams,
}

/// Threshold values given on the command line, layered over configuration.
#[derive(Debug, Clone, Default)]
pub struct ThresholdOverrides {
    pub max_lag_hours: Option<f64>,
    pub merge_distance_hours: Option<f64>,
    pub full_gap_threshold_hours: Option<f64>,
    pub duration_threshold_hours: Option<f64>,
    pub sci_density_ratio: Option<f64>,
}

impl ThresholdOverrides {
    /// Apply the overrides and reject any unusable result.
    pub fn apply(&self, mut params: AnalyzerParams) -> AppResult<AnalyzerParams> {
        if let Some(h) = self.max_lag_hours {
            params.max_lag_hours = h;
        }
        if let Some(h) = self.merge_distance_hours {
            params.merge_distance_hours = h;
        }
        if let Some(h) = self.full_gap_threshold_hours {
            params.full_gap_threshold_hours = h;
        }
        if let Some(h) = self.duration_threshold_hours {
            params.duration_threshold_hours = h;
        }
        if let (Some(sci), Some(ratio)) = (params.sci.as_mut(), self.sci_density_ratio) {
            sci.density_ratio = ratio;
        }

        params.validate()?;
        Ok(params)
    }
}

/// What happened to one deployment.
#[derive(Debug)]
pub enum DeploymentOutcome {
    Report(GapReport),
    /// The deployment name could not be parsed; nothing was fetched.
    Rejected(AppError),
    FetchFailed(AppError),
    AnalysisFailed(AppError),
}

/// Fetch and analyze a single deployment.
pub fn check_deployment(
    source: &dyn SegmentSource,
    deployment: &DeploymentName,
    options: &GapCheckOptions,
    now: DateTime<Utc>,
) -> DeploymentOutcome {
    let segments = match source.segments(deployment, options.with_profiles) {
        Ok(segments) => segments,
        Err(e) => return DeploymentOutcome::FetchFailed(e),
    };

    match analyze(&segments, &options.params, now) {
        Ok(report) => DeploymentOutcome::Report(report),
        Err(e) => DeploymentOutcome::AnalysisFailed(e),
    }
}

/// tbd lookup for a deployment, or the reason it is unavailable.
pub fn tbd_locator(options: &GapCheckOptions, deployment: &DeploymentName) -> Result<TbdLocator, String> {
    let Some(slocum_dir) = options.slocum_dir.as_deref() else {
        return Err(format!(
            "Data directory not provided, unable to check tbd availability for {deployment}."
        ));
    };

    let dir = deployment.directory(slocum_dir);
    if !dir.is_dir() {
        return Err(format!(
            "Deployment directory {} does not exist, check deployment name and/or data directory provided. Will not check for tbd availability.",
            dir.display()
        ));
    }

    Ok(TbdLocator::for_deployment(slocum_dir, deployment))
}

/// Plain-text status report for one deployment.
pub fn render_report(
    deployment: &DeploymentName,
    report: &GapReport,
    locator: Option<&TbdLocator>,
    available_tbds_only: bool,
) -> String {
    let mut out = format!("*****  {deployment} data status:\n\n");

    if !report.has_issues {
        out.push_str("No data gap issues noted.\n\n");
    }

    if report.is_stale {
        out.push_str(&format!(
            "Latest data {} ({} hours)\n\n",
            format_minute(&report.latest),
            format_hours(report.staleness_hours)
        ));
    }

    for window in &report.windows {
        render_window(&mut out, window, locator, available_tbds_only);
    }

    out
}

fn render_window(out: &mut String, window: &GapWindow, locator: Option<&TbdLocator>, available_only: bool) {
    let (start, end) = (format_minute(&window.start), format_minute(&window.end));

    if window.is_full_gap {
        out.push_str(&format!("Full gap from {start} to {end} (no segments)\n\n"));
        return;
    }

    out.push_str(&format!("Gap from {start} to {end}\nIncludes segments\n"));
    for id in &window.segment_ids {
        match locator {
            Some(loc) if loc.locate(id).is_some() => out.push_str(&format!("{id} (tbd YES)\n")),
            Some(_) if available_only => {}
            Some(_) => out.push_str(&format!("{id} (no tbd)\n")),
            None => out.push_str(&format!("{id}\n")),
        }
    }
    out.push('\n');
}

/// Successful analysis kept for export.
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    pub deployment: String,
    pub report: GapReport,
}

pub struct GapsLogic;

impl GapsLogic {
    /// Check every deployment in order, printing one report (or failure) each.
    pub fn run(
        source: &dyn SegmentSource,
        deployments: &[String],
        options: &GapCheckOptions,
        now: DateTime<Utc>,
    ) -> Vec<DeploymentReport> {
        let mut done = Vec::new();

        for raw in deployments {
            let deployment = match DeploymentName::parse(raw) {
                Ok(d) => d,
                Err(e) => {
                    report_outcome(raw, &DeploymentOutcome::Rejected(e));
                    continue;
                }
            };

            let locator = if options.check_tbds {
                tbd_locator(options, &deployment).map_err(warning).ok()
            } else {
                None
            };

            info!("checking {deployment}");
            let outcome = check_deployment(source, &deployment, options, now);

            if let DeploymentOutcome::Report(report) = &outcome {
                print!(
                    "{}",
                    render_report(&deployment, report, locator.as_ref(), options.available_tbds_only)
                );
                done.push(DeploymentReport {
                    deployment: deployment.name.clone(),
                    report: report.clone(),
                });
            } else {
                report_outcome(&deployment.name, &outcome);
            }
        }

        done
    }
}

fn report_outcome(deployment: &str, outcome: &DeploymentOutcome) {
    match outcome {
        DeploymentOutcome::Report(_) => {}
        DeploymentOutcome::Rejected(e) => error(format!("Skipping {deployment}: {e}")),
        DeploymentOutcome::FetchFailed(e) => error(format!(
            "Issue reading from dataset {deployment}-trajectory-raw-rt: {e}"
        )),
        DeploymentOutcome::AnalysisFailed(e) => {
            error(format!("Issue getting data gap information for {deployment}: {e}"))
        }
    }
}
