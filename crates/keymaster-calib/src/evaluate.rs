use glam::DVec3;

use crate::point::Point3;
use crate::result::CalibrationResult;
use crate::transform::Transform4x4;

/// Length of `v` without squaring its components directly, so coordinates
/// near the limits of `f64` do not overflow or underflow.
fn scaled_length(v: DVec3) -> f64 {
    let magnitude = v.abs().max_element();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return v.length();
    }
    magnitude * (v / magnitude).length()
}

/// Euclidean distance between each transformed source point and its target.
///
/// Pairs beyond the shorter of the two slices are ignored.
pub fn residuals(transform: &Transform4x4, source: &[Point3], target: &[Point3]) -> Vec<f64> {
    source
        .iter()
        .zip(target.iter())
        .map(|(s, t)| scaled_length(transform.apply(*s).to_dvec3() - t.to_dvec3()))
        .collect()
}

/// Root-mean-square alignment error, `sqrt(mean(‖T·s_i - t_i‖²))`.
///
/// Returns `0.0` when there are no correspondences.
pub fn rmse(transform: &Transform4x4, source: &[Point3], target: &[Point3]) -> f64 {
    let residuals = residuals(transform, source, target);
    if residuals.is_empty() {
        return 0.0;
    }
    let largest = residuals.iter().fold(0.0_f64, |acc, r| acc.max(*r));
    if largest == 0.0 || !largest.is_finite() {
        return largest;
    }
    let mean_sq = residuals
        .iter()
        .map(|r| (r / largest) * (r / largest))
        .sum::<f64>()
        / residuals.len() as f64;
    largest * mean_sq.sqrt()
}

/// Score a transform against the correspondences it was fitted on.
///
/// # Arguments
///
/// * `transform` - Transform from the source to the target frame.
/// * `source` - Source points.
/// * `target` - Target points.
/// * `source_platform` - Tag of the backend that produced the transform.
pub fn evaluate(
    transform: &Transform4x4,
    source: &[Point3],
    target: &[Point3],
    source_platform: &str,
) -> CalibrationResult {
    CalibrationResult {
        rmse: rmse(transform, source, target),
        transform: *transform,
        source_platform: source_platform.to_string(),
        num_points_used: source.len().min(target.len()),
    }
}
