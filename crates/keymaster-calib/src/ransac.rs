use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;
use crate::evaluate::residuals;
use crate::point::Point3;
use crate::solve::solve;
use crate::validate::{validate, ValidatedInput};

/// Parameters for RANSAC outlier rejection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacParams {
    /// Maximum number of RANSAC iterations.
    pub max_iterations: usize,
    /// Inlier threshold on the point-to-point distance, in target units.
    pub threshold: f64,
    /// Minimum number of inliers required for acceptance. The fit mode's own
    /// minimum applies when this is smaller.
    pub min_inliers: usize,
    /// Optional RNG seed for deterministic runs.
    pub random_seed: Option<u64>,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            threshold: 0.01,
            min_inliers: 0,
            random_seed: Some(0),
        }
    }
}

/// Drop correspondences that disagree with the best consensus transform.
///
/// Minimal samples are drawn, validated and solved with the input's fit mode;
/// a correspondence is an inlier when its residual is at most
/// `params.threshold`. The model with the most inliers wins, ties going to
/// the smaller residual sum. The inliers are validated again and returned.
pub fn reject_outliers(
    input: &ValidatedInput,
    params: &RansacParams,
) -> Result<ValidatedInput, CalibrationError> {
    let mode = input.mode();
    let sample_size = mode.min_points();
    let required = params.min_inliers.max(sample_size);
    let n = input.len();

    if n < required {
        return Err(CalibrationError::InsufficientPoints {
            mode,
            required,
            actual: n,
        });
    }

    let mut rng = match params.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => {
            let mut tr = rand::rng();
            StdRng::from_rng(&mut tr)
        }
    };

    let source = input.source();
    let target = input.target();

    let mut best_inliers: Vec<usize> = Vec::new();
    let mut best_score = f64::INFINITY;

    for _ in 0..params.max_iterations {
        let sample = rand::seq::index::sample(&mut rng, n, sample_size);
        let mut s_src = Vec::with_capacity(sample_size);
        let mut s_dst = Vec::with_capacity(sample_size);
        for idx in sample.iter() {
            s_src.push(source[idx]);
            s_dst.push(target[idx]);
        }

        // degenerate samples are skipped
        let Ok(candidate) = validate(&s_src, &s_dst, mode) else {
            continue;
        };
        let Ok(transform) = solve(&candidate) else {
            continue;
        };

        let mut inliers = Vec::new();
        let mut score = 0.0f64;
        for (i, r) in residuals(&transform, source, target).into_iter().enumerate() {
            if r <= params.threshold {
                inliers.push(i);
                score += r;
            }
        }

        if inliers.len() > best_inliers.len()
            || (inliers.len() == best_inliers.len() && score < best_score)
        {
            best_inliers = inliers;
            best_score = score;
        }

        if best_inliers.len() == n {
            break;
        }
    }

    if best_inliers.len() < required {
        return Err(CalibrationError::InsufficientPoints {
            mode,
            required,
            actual: best_inliers.len(),
        });
    }

    let (inlier_src, inlier_dst): (Vec<Point3>, Vec<Point3>) = best_inliers
        .iter()
        .map(|&i| (source[i], target[i]))
        .unzip();

    validate(&inlier_src, &inlier_dst, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::mode::FitMode;
    use glam::{DMat3, DVec3};

    fn grid_points() -> Vec<Point3> {
        let mut points = Vec::new();
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..2 {
                    points.push(Point3::new(i as f64, j as f64 * 0.5, k as f64 * 2.0));
                }
            }
        }
        points
    }

    fn rigid_targets(points: &[Point3]) -> Vec<Point3> {
        let rotation = DMat3::from_rotation_y(0.4);
        let translation = DVec3::new(1.0, -1.0, 0.5);
        points
            .iter()
            .map(|p| Point3::from(rotation * p.to_dvec3() + translation))
            .collect()
    }

    #[test]
    fn test_reject_outliers_removes_gross_errors() -> Result<(), CalibrationError> {
        let src = grid_points();
        let mut dst = rigid_targets(&src);
        // corrupt three correspondences
        for idx in [3, 11, 20] {
            dst[idx].x += 5.0;
            dst[idx].z -= 3.0;
        }

        let input = validate(&src, &dst, FitMode::Rigid)?;
        let filtered = reject_outliers(&input, &RansacParams::default())?;
        assert_eq!(filtered.len(), src.len() - 3);
        assert!(!filtered.source().contains(&src[3]));
        assert!(!filtered.source().contains(&src[11]));
        assert!(!filtered.source().contains(&src[20]));
        Ok(())
    }

    #[test]
    fn test_reject_outliers_keeps_clean_input() -> Result<(), CalibrationError> {
        let src = grid_points();
        let dst = rigid_targets(&src);
        let input = validate(&src, &dst, FitMode::Rigid)?;
        let filtered = reject_outliers(&input, &RansacParams::default())?;
        assert_eq!(filtered, input);
        Ok(())
    }

    #[test]
    fn test_reject_outliers_deterministic() -> Result<(), CalibrationError> {
        let src = grid_points();
        let mut dst = rigid_targets(&src);
        dst[0].y += 1.0;
        let input = validate(&src, &dst, FitMode::Affine)?;
        let params = RansacParams {
            random_seed: Some(17),
            ..Default::default()
        };
        assert_eq!(
            reject_outliers(&input, &params)?,
            reject_outliers(&input, &params)?
        );
        Ok(())
    }

    #[test]
    fn test_reject_outliers_min_inliers() -> Result<(), CalibrationError> {
        let src = grid_points();
        let dst = rigid_targets(&src);
        let input = validate(&src, &dst, FitMode::Rigid)?;
        let params = RansacParams {
            min_inliers: src.len() + 1,
            ..Default::default()
        };
        let err = reject_outliers(&input, &params).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientPoints);
        Ok(())
    }

    #[test]
    fn test_ransac_params_serde_defaults() -> Result<(), serde_json::Error> {
        let params: RansacParams = serde_json::from_str(r#"{"threshold": 0.5}"#)?;
        assert_eq!(params.threshold, 0.5);
        assert_eq!(params.max_iterations, 500);
        assert_eq!(params.random_seed, Some(0));
        Ok(())
    }
}
