//! Segment gap analysis: groups bad segments into gap windows, reports
//! silent spans between segments, and measures how stale the stream is.

use crate::core::calculator::{classify, staleness};
use crate::errors::{AppError, AppResult};
use crate::models::gap_window::{GapReport, GapWindow};
use crate::models::segment::{SciFlagParams, Segment};
use chrono::{DateTime, TimeDelta, Utc};

/// Thresholds driving the analysis. All values are in hours.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerParams {
    /// Segments this short or shorter are never classified bad.
    pub duration_threshold_hours: f64,
    /// Bad segments whose starts are at most this far apart share a window.
    pub merge_distance_hours: f64,
    /// Silence between segments longer than this is a full gap.
    pub full_gap_threshold_hours: f64,
    /// Latest data older than this is reported as stale.
    pub max_lag_hours: f64,
    /// Profile-level check; disabled when `None`.
    pub sci: Option<SciFlagParams>,
}

impl Default for AnalyzerParams {
    fn default() -> Self {
        Self {
            duration_threshold_hours: 1.0,
            merge_distance_hours: 12.0,
            full_gap_threshold_hours: 6.0,
            max_lag_hours: 6.0,
            sci: None,
        }
    }
}

impl AnalyzerParams {
    /// Every threshold must be a finite, non-negative number.
    pub fn validate(&self) -> AppResult<()> {
        let mut values = vec![
            ("max_lag_hours", self.max_lag_hours),
            ("merge_distance_hours", self.merge_distance_hours),
            ("full_gap_threshold_hours", self.full_gap_threshold_hours),
            ("duration_threshold_hours", self.duration_threshold_hours),
        ];
        if let Some(sci) = &self.sci {
            values.push(("sci_density_ratio", sci.density_ratio));
        }

        for (key, value) in values {
            check_non_negative(key, value)?;
        }
        Ok(())
    }
}

fn check_non_negative(key: &str, value: f64) -> AppResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Config(format!("{key} must be a non-negative number")));
    }
    Ok(())
}

fn hours(h: f64) -> AppResult<TimeDelta> {
    let ms = h * 3_600_000.0;
    if !ms.is_finite() {
        return Err(AppError::Config(format!("{h} hours is not a usable duration")));
    }
    TimeDelta::try_milliseconds(ms.round() as i64)
        .ok_or_else(|| AppError::Config(format!("{h} hours is out of range")))
}

/// Analyze one deployment's segments as of `now`.
///
/// Fails only when there is nothing to analyze.
pub fn analyze(segments: &[Segment], params: &AnalyzerParams, now: DateTime<Utc>) -> AppResult<GapReport> {
    params.validate()?;

    let mut sorted = segments.to_vec();
    sorted.sort_by_key(|s| s.start);

    let latest = staleness::latest_end(&sorted)
        .ok_or_else(|| AppError::MalformedSegment("no segments to analyze".into()))?;

    let mut windows = bad_segment_windows(&sorted, params)?;
    windows.extend(full_gap_windows(&sorted, params.full_gap_threshold_hours)?);
    windows.sort_by_key(|w| w.start);

    let staleness_hours = staleness::staleness_hours(latest, now);
    let is_stale = staleness_hours > params.max_lag_hours;
    let has_issues = is_stale || !windows.is_empty();

    Ok(GapReport {
        windows,
        latest,
        staleness_hours,
        is_stale,
        has_issues,
    })
}

/// Maximal runs of bad segments, split where consecutive starts are more
/// than `merge_distance_hours` apart.
fn bad_segment_windows(sorted: &[Segment], params: &AnalyzerParams) -> AppResult<Vec<GapWindow>> {
    let bad = classify::bad_segments(sorted, params.duration_threshold_hours, params.sci.as_ref());
    let merge_distance = hours(params.merge_distance_hours)?;

    let mut runs: Vec<Vec<&Segment>> = Vec::new();
    for seg in bad {
        let extends = runs
            .last()
            .and_then(|run| run.last())
            .is_some_and(|prev| seg.start - prev.start <= merge_distance);

        match runs.last_mut() {
            Some(run) if extends => run.push(seg),
            _ => runs.push(vec![seg]),
        }
    }

    Ok(runs
        .into_iter()
        .filter_map(|run| {
            let first = run.first()?;
            let last = run.last()?;
            let (start, end) = (first.start, last.end);

            let segment_ids = sorted
                .iter()
                .filter(|s| s.start >= start && s.start < end)
                .map(|s| s.source_id.clone())
                .collect();

            Some(GapWindow {
                start,
                end,
                is_full_gap: false,
                segment_ids,
            })
        })
        .collect())
}

/// Spans with no segment at all, longer than `threshold_hours`.
fn full_gap_windows(sorted: &[Segment], threshold_hours: f64) -> AppResult<Vec<GapWindow>> {
    let threshold = hours(threshold_hours)?;

    Ok(sorted
        .windows(2)
        .filter(|w| w[1].start - w[0].end > threshold)
        .map(|w| GapWindow::full(w[0].end, w[1].start))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 27, 0, 0, 0).unwrap() + TimeDelta::hours(h)
    }

    fn seg(id: &str, start: i64, end: i64, temp: u64) -> Segment {
        Segment::new(id, at(start), at(end), 100, temp).unwrap()
    }

    fn fresh(segments: &[Segment]) -> DateTime<Utc> {
        staleness::latest_end(segments).unwrap() + TimeDelta::hours(1)
    }

    #[test]
    fn adjacent_bad_segments_form_one_window() {
        let segments = vec![seg("A", 0, 2, 0), seg("B", 2, 4, 0), seg("C", 10, 12, 50)];
        let report = analyze(&segments, &AnalyzerParams::default(), fresh(&segments)).unwrap();

        // 4h -> 10h is exactly 6h of silence: not a full gap
        assert_eq!(report.windows.len(), 1);
        let w = &report.windows[0];
        assert_eq!((w.start, w.end), (at(0), at(4)));
        assert!(!w.is_full_gap);
        assert_eq!(w.segment_ids, vec!["A", "B"]);
        assert!(report.has_issues);
    }

    #[test]
    fn silence_between_good_segments_is_full_gap() {
        let segments = vec![seg("A", 0, 2, 50), seg("B", 20, 22, 50)];
        let report = analyze(&segments, &AnalyzerParams::default(), fresh(&segments)).unwrap();

        assert_eq!(
            report.windows,
            vec![GapWindow {
                start: at(2),
                end: at(20),
                is_full_gap: true,
                segment_ids: vec![],
            }]
        );
    }

    #[test]
    fn clean_fresh_stream_has_no_issues() {
        let segments = vec![seg("A", 0, 2, 50), seg("B", 3, 5, 50), seg("C", 6, 8, 40)];
        let report = analyze(&segments, &AnalyzerParams::default(), at(10)).unwrap();

        assert!(report.windows.is_empty());
        assert!(!report.is_stale);
        assert!(!report.has_issues);
        assert_eq!(report.staleness_hours, 2.0);
    }

    #[test]
    fn stale_stream_is_reported_regardless_of_windows() {
        let segments = vec![seg("A", 0, 2, 50), seg("B", 3, 5, 50)];
        let report = analyze(&segments, &AnalyzerParams::default(), at(15)).unwrap();

        assert_eq!(report.staleness_hours, 10.0);
        assert!(report.is_stale);
        assert!(report.has_issues);
        assert!(report.windows.is_empty());
        assert_eq!(report.latest, at(5));
    }

    #[test]
    fn duration_threshold_is_strict() {
        let exact = vec![seg("A", 0, 1, 0), seg("B", 1, 3, 50)];
        let report = analyze(&exact, &AnalyzerParams::default(), at(4)).unwrap();
        assert!(report.windows.is_empty());

        let above = vec![
            Segment::new("A", at(0), at(1) + TimeDelta::minutes(1), 100, 0).unwrap(),
            seg("B", 2, 3, 50),
        ];
        let report = analyze(&above, &AnalyzerParams::default(), at(4)).unwrap();
        assert_eq!(report.windows.len(), 1);
        assert_eq!(report.windows[0].segment_ids, vec!["A"]);
    }

    #[test]
    fn merge_distance_boundary_is_inclusive() {
        let params = AnalyzerParams {
            full_gap_threshold_hours: 24.0,
            ..AnalyzerParams::default()
        };

        let merged = vec![seg("A", 0, 2, 0), seg("B", 12, 14, 0)];
        let report = analyze(&merged, &params, at(15)).unwrap();
        assert_eq!(report.windows.len(), 1);
        assert_eq!((report.windows[0].start, report.windows[0].end), (at(0), at(14)));

        let split = vec![seg("A", 0, 2, 0), seg("B", 13, 15, 0)];
        let report = analyze(&split, &params, at(16)).unwrap();
        assert_eq!(report.windows.len(), 2);
    }

    #[test]
    fn window_lists_good_segments_started_inside_it() {
        let segments = vec![seg("A", 0, 2, 0), seg("B", 3, 5, 80), seg("C", 6, 9, 0)];
        let report = analyze(&segments, &AnalyzerParams::default(), at(10)).unwrap();

        assert_eq!(report.windows.len(), 1);
        assert_eq!(report.windows[0].segment_ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn full_gaps_and_bad_runs_stay_distinct_and_sorted() {
        let segments = vec![
            seg("A", 0, 2, 0),
            seg("B", 30, 32, 50),
            seg("C", 33, 35, 0),
            seg("D", 60, 62, 0),
        ];
        let report = analyze(&segments, &AnalyzerParams::default(), at(63)).unwrap();

        let kinds: Vec<(i64, bool)> = report
            .windows
            .iter()
            .map(|w| ((w.start - at(0)).num_hours(), w.is_full_gap))
            .collect();
        assert_eq!(
            kinds,
            vec![(0, false), (2, true), (33, false), (35, true), (60, false)]
        );

        let bad: Vec<&GapWindow> = report.windows.iter().filter(|w| !w.is_full_gap).collect();
        for pair in bad.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn unsorted_input_is_sorted_before_analysis() {
        let segments = vec![seg("C", 10, 12, 50), seg("B", 2, 4, 0), seg("A", 0, 2, 0)];
        let report = analyze(&segments, &AnalyzerParams::default(), at(13)).unwrap();
        assert_eq!(report.windows[0].segment_ids, vec!["A", "B"]);
    }

    #[test]
    fn analysis_is_repeatable() {
        let segments = vec![seg("A", 0, 2, 0), seg("B", 20, 22, 50), seg("C", 23, 26, 0)];
        let params = AnalyzerParams::default();
        let first = analyze(&segments, &params, at(40)).unwrap();
        let second = analyze(&segments, &params, at(40)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn sci_path_flags_unprofiled_segments_only_when_enabled() {
        let segments = vec![
            seg("A", 0, 3, 500).with_max_depth(Some(40.0)).with_profile_count(Some(0)),
            seg("B", 3, 6, 500).with_max_depth(Some(40.0)).with_profile_count(Some(6)),
        ];

        let report = analyze(&segments, &AnalyzerParams::default(), at(7)).unwrap();
        assert!(report.windows.is_empty());

        let params = AnalyzerParams {
            sci: Some(SciFlagParams::default()),
            ..AnalyzerParams::default()
        };
        let report = analyze(&segments, &params, at(7)).unwrap();
        assert_eq!(report.windows.len(), 1);
        assert_eq!(report.windows[0].segment_ids, vec!["A"]);
    }

    #[test]
    fn unusable_thresholds_are_rejected() {
        let segments = vec![seg("A", 0, 2, 50), seg("B", 2, 3, 50)];

        let params = AnalyzerParams {
            merge_distance_hours: f64::NEG_INFINITY,
            ..AnalyzerParams::default()
        };
        let err = analyze(&segments, &params, at(4)).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let params = AnalyzerParams {
            full_gap_threshold_hours: f64::NAN,
            ..AnalyzerParams::default()
        };
        assert!(matches!(analyze(&segments, &params, at(4)), Err(AppError::Config(_))));

        let params = AnalyzerParams {
            sci: Some(SciFlagParams {
                density_ratio: -1.0,
                ..SciFlagParams::default()
            }),
            ..AnalyzerParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn threshold_outside_time_range_is_an_error() {
        assert!(matches!(hours(-1e300), Err(AppError::Config(_))));
        assert!(matches!(hours(f64::INFINITY), Err(AppError::Config(_))));
        assert_eq!(hours(1.5).unwrap(), TimeDelta::minutes(90));
    }

    #[test]
    fn empty_input_is_malformed() {
        let err = analyze(&[], &AnalyzerParams::default(), at(0)).unwrap_err();
        assert!(matches!(err, AppError::MalformedSegment(_)));
    }
}
