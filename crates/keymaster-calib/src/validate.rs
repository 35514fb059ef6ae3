use glam::DVec3;
use keymaster_linalg::{rigid::centroid, svd::singular_values_n3};

use crate::error::{CalibrationError, PointSet};
use crate::mode::FitMode;
use crate::point::Point3;

/// Relative tolerance below which a singular value does not count toward the rank.
pub const RANK_TOLERANCE: f64 = 1e-8;

/// Correspondences that passed [`validate`], with the quantities the solver reuses.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    source: Vec<Point3>,
    target: Vec<Point3>,
    mode: FitMode,
    source_centroid: DVec3,
    target_centroid: DVec3,
    singular_values: [f64; 3],
}

impl ValidatedInput {
    /// The source (ARW) points.
    #[inline]
    pub fn source(&self) -> &[Point3] {
        &self.source
    }

    /// The target (RWP) points.
    #[inline]
    pub fn target(&self) -> &[Point3] {
        &self.target
    }

    /// The fit mode the input was validated for.
    #[inline]
    pub fn mode(&self) -> FitMode {
        self.mode
    }

    /// Number of correspondences.
    #[inline]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Whether there are no correspondences. Never true for validated input.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Mean of the source points.
    #[inline]
    pub fn source_centroid(&self) -> DVec3 {
        self.source_centroid
    }

    /// Mean of the target points.
    #[inline]
    pub fn target_centroid(&self) -> DVec3 {
        self.target_centroid
    }

    /// Singular values of the centered source points, descending.
    #[inline]
    pub fn singular_values(&self) -> [f64; 3] {
        self.singular_values
    }

    /// Numerical rank of the centered source points.
    pub fn rank(&self) -> usize {
        numerical_rank(&self.singular_values)
    }
}

/// Number of singular values above [`RANK_TOLERANCE`] times the largest one.
///
/// PRECONDITION: `singular_values` is sorted in descending order.
pub fn numerical_rank(singular_values: &[f64; 3]) -> usize {
    let largest = singular_values[0];
    if largest <= 0.0 || !largest.is_finite() {
        return 0;
    }
    singular_values
        .iter()
        .filter(|s| **s > RANK_TOLERANCE * largest)
        .count()
}

fn check_finite(points: &[Point3], set: PointSet) -> Result<(), CalibrationError> {
    match points.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(CalibrationError::NonFiniteInput { set, index }),
        None => Ok(()),
    }
}

/// Check that two point sets can be fitted with the given mode.
///
/// Checks, in order: equal lengths, the mode's minimum point count, finite
/// coordinates, and the rank of the centered source points (non-collinear for
/// rigid and similarity fits, non-coplanar for affine fits).
///
/// # Arguments
///
/// * `source` - Points in the source (ARW) frame.
/// * `target` - Corresponding points in the target (RWP) frame.
/// * `mode` - The fit mode to validate for.
///
/// # Returns
///
/// The points together with their centroids and the source singular values.
pub fn validate(
    source: &[Point3],
    target: &[Point3],
    mode: FitMode,
) -> Result<ValidatedInput, CalibrationError> {
    if source.len() != target.len() {
        return Err(CalibrationError::LengthMismatch {
            source_len: source.len(),
            target_len: target.len(),
        });
    }

    if source.len() < mode.min_points() {
        return Err(CalibrationError::InsufficientPoints {
            mode,
            required: mode.min_points(),
            actual: source.len(),
        });
    }

    check_finite(source, PointSet::Source)?;
    check_finite(target, PointSet::Target)?;

    let source_vecs = source.iter().map(|p| p.to_dvec3()).collect::<Vec<_>>();
    let target_vecs = target.iter().map(|p| p.to_dvec3()).collect::<Vec<_>>();
    let source_centroid = centroid(&source_vecs);
    let target_centroid = centroid(&target_vecs);

    let centered = source_vecs
        .iter()
        .map(|p| (*p - source_centroid).to_array())
        .collect::<Vec<_>>();
    let singular_values = singular_values_n3(&centered);

    let rank = numerical_rank(&singular_values);
    if rank < mode.required_rank() {
        return Err(CalibrationError::DegenerateGeometry {
            mode,
            required: mode.required_rank(),
            rank,
            singular_values,
        });
    }

    Ok(ValidatedInput {
        source: source.to_vec(),
        target: target.to_vec(),
        mode,
        source_centroid,
        target_centroid,
        singular_values,
    })
}
