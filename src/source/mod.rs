//! Upstream data sources: ERDDAP segments and the glider deployment API.

pub mod erddap;
pub mod glider_api;

use crate::errors::AppResult;
use crate::models::deployment::DeploymentName;
use crate::models::segment::Segment;

/// Supplies the segments of one real-time deployment.
///
/// `with_profiles` asks the source to populate `profile_count` when it can.
pub trait SegmentSource {
    fn segments(&self, deployment: &DeploymentName, with_profiles: bool) -> AppResult<Vec<Segment>>;
}
