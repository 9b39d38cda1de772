//! Decides which segments count as "bad" (suspected missing science data).

use crate::models::segment::{SciFlagParams, Segment};

/// A segment is bad when it is long enough to matter and either lacks
/// temperature samples (tbd) or, when enabled, lacks profiles (sci).
pub fn is_bad(segment: &Segment, duration_threshold_hours: f64, sci: Option<&SciFlagParams>) -> bool {
    if segment.duration_hours() <= duration_threshold_hours {
        return false;
    }

    segment.tbd_flag() || sci.is_some_and(|p| segment.sci_flag(p))
}

/// Bad subset of `segments`, order preserved.
pub fn bad_segments<'a>(
    segments: &'a [Segment],
    duration_threshold_hours: f64,
    sci: Option<&SciFlagParams>,
) -> Vec<&'a Segment> {
    segments
        .iter()
        .filter(|s| is_bad(s, duration_threshold_hours, sci))
        .collect()
}
