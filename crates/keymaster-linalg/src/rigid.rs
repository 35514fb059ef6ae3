//! Rigid and similarity alignment utilities (Kabsch / Umeyama)

use glam::{DMat3, DVec3};
use thiserror::Error;

use crate::svd::{svd3, svd_n3};

/// Rotation (R), translation (t) and scale (s) such that `dst ≈ s * R * src + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UmeyamaOutput {
    /// Proper rotation, `det(R) = +1`.
    pub rotation: DMat3,
    /// Translation applied after rotation and scaling.
    pub translation: DVec3,
    /// Uniform scale, exactly `1.0` when scaling is not estimated.
    pub scale: f64,
}

/// Error type for Umeyama rigid alignment operations.
#[derive(Debug, Error, PartialEq)]
pub enum UmeyamaError {
    /// Source and destination arrays must have the same length
    #[error("Source and destination arrays must have the same length")]
    MismatchedInputLengths,

    /// Nothing to align
    #[error("Source and destination arrays must not be empty")]
    EmptyInput,

    /// All source points coincide so the scale is undefined
    #[error("Source points have no spread around their centroid")]
    DegenerateSource,
}

/// Result type alias for Umeyama.
pub type UmeyamaResult = Result<UmeyamaOutput, UmeyamaError>;

/// Mean of a set of points, the origin for an empty set.
pub fn centroid(points: &[DVec3]) -> DVec3 {
    if points.is_empty() {
        return DVec3::ZERO;
    }
    let sum = points.iter().fold(DVec3::ZERO, |acc, p| acc + *p);
    sum / points.len() as f64
}

/// Cross-covariance `H = Σ (src_i - mu_src)(dst_i - mu_dst)ᵀ`.
///
/// PRECONDITION: `src` and `dst` have the same length.
pub fn cross_covariance(src: &[DVec3], dst: &[DVec3], mu_src: DVec3, mu_dst: DVec3) -> DMat3 {
    let mut h = DMat3::ZERO;
    for (s, d) in src.iter().zip(dst.iter()) {
        let sc = *s - mu_src;
        let dc = *d - mu_dst;
        // outer product sc * dcᵀ, column by column
        h += DMat3::from_cols(sc * dc.x, sc * dc.y, sc * dc.z);
    }
    h
}

/// Points relative to `mu`, divided by their largest absolute coordinate.
///
/// Returns the divisor alongside, zero when every point equals `mu`.
fn normalized(points: &[DVec3], mu: DVec3) -> (Vec<DVec3>, f64) {
    let centered = points.iter().map(|p| *p - mu).collect::<Vec<_>>();
    let magnitude = centered
        .iter()
        .fold(0.0_f64, |acc, p| acc.max(p.abs().max_element()));
    if magnitude == 0.0 || !magnitude.is_finite() {
        return (centered, magnitude);
    }
    let scaled = centered.into_iter().map(|p| p / magnitude).collect();
    (scaled, magnitude)
}

/// Umeyama/Kabsch alignment with precomputed centroids.
///
/// With `H = U Σ Vᵀ` the rotation is `R = V · diag(1, 1, d) · Uᵀ` where
/// `d = sign(det(V Uᵀ))` rules out reflections. When `with_scaling` is set the
/// uniform scale is `tr(Σ · diag(1, 1, d)) / Σ‖src_i - mu_src‖²`.
///
/// Both point sets are brought to unit magnitude before H is formed, and the
/// source is expressed in its own principal axes. The rows of H then fall off
/// with the source singular values, which lets the decomposition resolve the
/// rotation about the long axis of nearly collinear sources.
pub fn umeyama_from_centroids(
    src: &[DVec3],
    dst: &[DVec3],
    mu_src: DVec3,
    mu_dst: DVec3,
    with_scaling: bool,
) -> UmeyamaResult {
    if src.len() != dst.len() {
        return Err(UmeyamaError::MismatchedInputLengths);
    }
    if src.is_empty() {
        return Err(UmeyamaError::EmptyInput);
    }

    let (src_n, src_magnitude) = normalized(src, mu_src);
    let (dst_n, dst_magnitude) = normalized(dst, mu_dst);

    // principal axes of the source, rows of H' = axesᵀ H
    let rows = src_n.iter().map(|p| p.to_array()).collect::<Vec<_>>();
    let (_, axes) = svd_n3(&rows);
    let src_principal = src_n
        .iter()
        .map(|p| axes.transpose() * *p)
        .collect::<Vec<_>>();
    let h_principal = cross_covariance(&src_principal, &dst_n, DVec3::ZERO, DVec3::ZERO);

    // H'ᵀ = U' Σ V'ᵀ, so H = (axes V') Σ U'ᵀ
    let svd_result = svd3(&h_principal.transpose());
    let u = axes * *svd_result.v();
    let v = *svd_result.u();

    // Handle reflection: flip the axis of the smallest singular value
    let d = (v * u.transpose()).determinant();
    let correction = if d < 0.0 {
        DVec3::new(1.0, 1.0, -1.0)
    } else {
        DVec3::ONE
    };
    let rotation = v * DMat3::from_diagonal(correction) * u.transpose();

    let scale = if with_scaling {
        let src_spread: f64 = src_n.iter().map(|p| p.length_squared()).sum();
        if src_magnitude == 0.0 || src_spread <= f64::MIN_POSITIVE {
            return Err(UmeyamaError::DegenerateSource);
        }
        svd_result.singular_values().dot(correction) / src_spread
            * (dst_magnitude / src_magnitude)
    } else {
        1.0
    };

    let translation = mu_dst - scale * (rotation * mu_src);

    Ok(UmeyamaOutput {
        rotation,
        translation,
        scale,
    })
}

/// Umeyama/Kabsch algorithm.
///
/// Returns the transform mapping `src` onto `dst`; the scale is `1.0` unless
/// `with_scaling` is set.
///
/// Example:
///
/// ```
/// use glam::DVec3;
/// use keymaster_linalg::rigid::umeyama;
///
/// let src = [DVec3::X, DVec3::Y, DVec3::Z, DVec3::ZERO];
/// let dst = src.map(|p| p + DVec3::new(1.0, 2.0, 3.0));
/// let out = umeyama(&src, &dst, false).unwrap();
/// assert!(out.translation.abs_diff_eq(DVec3::new(1.0, 2.0, 3.0), 1e-12));
/// ```
pub fn umeyama(src: &[DVec3], dst: &[DVec3], with_scaling: bool) -> UmeyamaResult {
    if src.len() != dst.len() {
        return Err(UmeyamaError::MismatchedInputLengths);
    }
    umeyama_from_centroids(src, dst, centroid(src), centroid(dst), with_scaling)
}
