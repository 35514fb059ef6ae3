use faer::prelude::SpSolverLstsq;
use glam::{DMat3, DVec3};
use keymaster_linalg::rigid::umeyama_from_centroids;

use crate::error::CalibrationError;
use crate::mode::FitMode;
use crate::transform::Transform4x4;
use crate::validate::{numerical_rank, ValidatedInput};

/// Compute the transform that best maps the source points onto the target points.
///
/// * Rigid: Kabsch, `R = V · diag(1, 1, d) · Uᵀ` from the SVD of the
///   cross-covariance `H = Σ (s_i - c_s)(t_i - c_t)ᵀ = U Σ Vᵀ`, with
///   `d = sign(det(V Uᵀ))`, and `t = c_t - R c_s`.
/// * Similarity: as rigid plus the Umeyama scale.
/// * Affine: linear least squares on the centered coordinates, solved with a
///   QR decomposition, and `t = c_t - A c_s`. The diagonal of the triangular
///   factor is checked for a rank drop before the system is solved.
///
/// A solution that overflows to non-finite values is reported as
/// [`CalibrationError::SingularSystem`].
pub fn solve(input: &ValidatedInput) -> Result<Transform4x4, CalibrationError> {
    let transform = match input.mode() {
        FitMode::Rigid => solve_umeyama(input, false)?,
        FitMode::Similarity => solve_umeyama(input, true)?,
        FitMode::Affine => solve_affine(input)?,
    };

    if !transform.is_finite() {
        return Err(CalibrationError::SingularSystem(
            "solution contains non-finite values".to_string(),
        ));
    }

    Ok(transform)
}

fn solve_umeyama(
    input: &ValidatedInput,
    with_scaling: bool,
) -> Result<Transform4x4, CalibrationError> {
    let src = input
        .source()
        .iter()
        .map(|p| p.to_dvec3())
        .collect::<Vec<_>>();
    let dst = input
        .target()
        .iter()
        .map(|p| p.to_dvec3())
        .collect::<Vec<_>>();

    let alignment = umeyama_from_centroids(
        &src,
        &dst,
        input.source_centroid(),
        input.target_centroid(),
        with_scaling,
    )
    .map_err(|e| CalibrationError::SingularSystem(e.to_string()))?;

    Ok(Transform4x4::from_linear_translation(
        &(alignment.rotation * alignment.scale),
        alignment.translation,
    ))
}

/// Numerical rank of a triangular factor from the magnitudes of its diagonal.
fn triangular_rank(r: &faer::Mat<f64>) -> usize {
    let mut diagonal = [0, 1, 2].map(|k| r.read(k, k).abs());
    diagonal.sort_by(|a, b| b.total_cmp(a));
    numerical_rank(&diagonal)
}

/// Centered coordinates divided by their largest magnitude, one point per row.
fn centered_matrix(points: impl Iterator<Item = DVec3>, mu: DVec3) -> (faer::Mat<f64>, f64) {
    let centered = points.map(|p| p - mu).collect::<Vec<_>>();
    let magnitude = centered
        .iter()
        .fold(0.0_f64, |acc, p| acc.max(p.abs().max_element()));
    let divisor = if magnitude > 0.0 && magnitude.is_finite() {
        magnitude
    } else {
        1.0
    };

    let mut mat = faer::Mat::<f64>::zeros(centered.len(), 3);
    for (i, p) in centered.iter().enumerate() {
        for j in 0..3 {
            mat.write(i, j, p[j] / divisor);
        }
    }
    (mat, divisor)
}

fn solve_affine(input: &ValidatedInput) -> Result<Transform4x4, CalibrationError> {
    let mu_src = input.source_centroid();
    let mu_dst = input.target_centroid();

    // X * Aᵀ = Y with one centered correspondence per row, both sides at unit magnitude
    let (mat_x, src_magnitude) =
        centered_matrix(input.source().iter().map(|p| p.to_dvec3()), mu_src);
    let (mat_y, dst_magnitude) =
        centered_matrix(input.target().iter().map(|p| p.to_dvec3()), mu_dst);

    let qr = mat_x.qr();
    let rank = triangular_rank(&qr.compute_thin_r());
    if rank < FitMode::Affine.required_rank() {
        return Err(CalibrationError::SingularSystem(format!(
            "affine system has rank {rank}, needs {}",
            FitMode::Affine.required_rank()
        )));
    }

    let a_t = qr.solve_lstsq(mat_y);
    let ratio = dst_magnitude / src_magnitude;

    // row c of Aᵀ is column c of A
    let column = |c: usize| DVec3::new(a_t.read(c, 0), a_t.read(c, 1), a_t.read(c, 2)) * ratio;
    let linear = DMat3::from_cols(column(0), column(1), column(2));
    let translation = mu_dst - linear * mu_src;

    Ok(Transform4x4::from_linear_translation(&linear, translation))
}
