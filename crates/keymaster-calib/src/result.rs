use serde::{Deserialize, Serialize};

use crate::transform::Transform4x4;

/// Outcome of one calibration call.
///
/// Serialized with the wire names
/// `{rmse, transform_elements, source_platform, num_points_used}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Root-mean-square distance between transformed source and target points.
    pub rmse: f64,
    /// Transform from the source (ARW) frame to the target (RWP) frame.
    #[serde(rename = "transform_elements")]
    pub transform: Transform4x4,
    /// Tag of the backend that produced the result.
    pub source_platform: String,
    /// Number of correspondences the fit was computed from.
    pub num_points_used: usize,
}
