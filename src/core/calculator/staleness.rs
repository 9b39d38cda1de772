use crate::models::segment::Segment;
use chrono::{DateTime, Utc};

/// Newest end time across all segments.
pub fn latest_end(segments: &[Segment]) -> Option<DateTime<Utc>> {
    segments.iter().map(|s| s.end).max()
}

/// Hours between `latest` and `now` (negative if data is from the future).
pub fn staleness_hours(latest: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - latest).num_seconds() as f64 / 3600.0
}
