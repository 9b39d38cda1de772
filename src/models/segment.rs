use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Tunables for the profile-level (sci) check.
///
/// A segment is suspected of missing profile processing when it has no
/// profiles, carries more than `noise_floor` temperature samples, and its
/// sample count exceeds `profiles * max_depth * density_ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SciFlagParams {
    pub noise_floor: u64,
    pub density_ratio: f64,
}

impl Default for SciFlagParams {
    fn default() -> Self {
        Self {
            noise_floor: 10,
            density_ratio: 3.0,
        }
    }
}

/// One contiguous telemetry unit, sourced from one binary data file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub source_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub depth_samples: u64,
    pub temp_samples: u64,
    pub max_depth: Option<f64>,
    pub profile_count: Option<u32>,
}

impl Segment {
    /// Build a segment, rejecting spans that end before they start.
    pub fn new(
        source_id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        depth_samples: u64,
        temp_samples: u64,
    ) -> AppResult<Self> {
        let source_id = source_id.into();
        if end < start {
            return Err(AppError::MalformedSegment(format!(
                "{source_id}: end {end} precedes start {start}"
            )));
        }

        Ok(Self {
            source_id,
            start,
            end,
            depth_samples,
            temp_samples,
            max_depth: None,
            profile_count: None,
        })
    }

    pub fn with_max_depth(mut self, max_depth: Option<f64>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_profile_count(mut self, profile_count: Option<u32>) -> Self {
        self.profile_count = profile_count;
        self
    }

    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }

    /// No temperature samples: the tbd file was likely never processed.
    pub fn tbd_flag(&self) -> bool {
        self.temp_samples == 0
    }

    /// Temperature data present but no profiles were built from it.
    pub fn sci_flag(&self, params: &SciFlagParams) -> bool {
        let (Some(profiles), Some(max_depth)) = (self.profile_count, self.max_depth) else {
            return false;
        };

        profiles == 0
            && self.temp_samples > params.noise_floor
            && self.temp_samples as f64 > profiles as f64 * max_depth * params.density_ratio
    }
}
