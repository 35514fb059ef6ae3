use crate::error::CalibrationError;
use crate::evaluate::evaluate;
use crate::mode::FitMode;
use crate::point::Point3;
use crate::ransac::{reject_outliers, RansacParams};
use crate::result::CalibrationResult;
use crate::solve::solve;
use crate::validate::validate;

/// Platform tag reported by [`ClosedFormBackend::default`].
pub const DEFAULT_PLATFORM: &str = "rust";

/// Options for a single [`calibrate`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationConfig {
    /// Family of transforms to fit.
    pub mode: FitMode,
    /// Tag written to [`CalibrationResult::source_platform`].
    pub source_platform: String,
    /// Run RANSAC before the final fit when set.
    pub outlier_rejection: Option<RansacParams>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            mode: FitMode::default(),
            source_platform: DEFAULT_PLATFORM.to_string(),
            outlier_rejection: None,
        }
    }
}

/// Fit a transform from `source` to `target` and score it.
///
/// Runs validation, the optional outlier rejection, the solver and the
/// evaluator in that order. The reported RMSE and point count refer to the
/// correspondences the final fit used.
///
/// # Example
///
/// ```
/// use keymaster_calib::{calibrate, CalibrationConfig, FitMode, Point3};
///
/// let source = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let target = source
///     .iter()
///     .map(|p| Point3::new(p.x + 1.0, p.y, p.z))
///     .collect::<Vec<_>>();
///
/// let config = CalibrationConfig {
///     mode: FitMode::Rigid,
///     ..Default::default()
/// };
/// let result = calibrate(&source, &target, &config).unwrap();
/// assert!(result.rmse < 1e-12);
/// assert_eq!(result.num_points_used, 3);
/// ```
pub fn calibrate(
    source: &[Point3],
    target: &[Point3],
    config: &CalibrationConfig,
) -> Result<CalibrationResult, CalibrationError> {
    let mut input = validate(source, target, config.mode)?;
    if let Some(params) = &config.outlier_rejection {
        input = reject_outliers(&input, params)?;
    }
    let transform = solve(&input)?;
    Ok(evaluate(
        &transform,
        input.source(),
        input.target(),
        &config.source_platform,
    ))
}

/// A source of calibration results.
///
/// The service holds one backend behind this trait; results from different
/// backends are told apart by their platform tag.
pub trait CalibrationBackend: Send + Sync {
    /// Tag written to every result this backend produces.
    fn platform(&self) -> &str;

    /// Fit a transform from `source` to `target`.
    fn calibrate(
        &self,
        source: &[Point3],
        target: &[Point3],
        mode: FitMode,
        outlier_rejection: Option<&RansacParams>,
    ) -> Result<CalibrationResult, CalibrationError>;
}

/// Backend running the closed-form solvers of this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedFormBackend {
    platform: String,
}

impl ClosedFormBackend {
    /// Create a backend reporting the given platform tag.
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }
}

impl Default for ClosedFormBackend {
    fn default() -> Self {
        Self::new(DEFAULT_PLATFORM)
    }
}

impl CalibrationBackend for ClosedFormBackend {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn calibrate(
        &self,
        source: &[Point3],
        target: &[Point3],
        mode: FitMode,
        outlier_rejection: Option<&RansacParams>,
    ) -> Result<CalibrationResult, CalibrationError> {
        let config = CalibrationConfig {
            mode,
            source_platform: self.platform.clone(),
            outlier_rejection: outlier_rejection.copied(),
        };
        calibrate(source, target, &config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use glam::{DMat3, DVec3};

    fn sample_points() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
        ]
    }

    #[test]
    fn test_calibrate_default_config() -> Result<(), CalibrationError> {
        let src = sample_points();
        let linear = DMat3::from_cols(
            DVec3::new(1.0, 0.5, 0.0),
            DVec3::new(0.0, 2.0, 0.0),
            DVec3::new(0.0, 0.0, 0.5),
        );
        let dst = src
            .iter()
            .map(|p| Point3::from(linear * p.to_dvec3() + DVec3::X))
            .collect::<Vec<_>>();

        let result = calibrate(&src, &dst, &CalibrationConfig::default())?;
        assert!(result.rmse < 1e-12);
        assert_eq!(result.num_points_used, 5);
        assert_eq!(result.source_platform, "rust");
        assert!(result.transform.linear().abs_diff_eq(linear, 1e-10));
        Ok(())
    }

    #[test]
    fn test_calibrate_propagates_validation_errors() {
        let src = sample_points();
        let err = calibrate(&src, &src[..2], &CalibrationConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LengthMismatch);
    }

    #[test]
    fn test_backend_platform_tag() -> Result<(), CalibrationError> {
        let backend = ClosedFormBackend::new("python");
        assert_eq!(backend.platform(), "python");
        assert_eq!(ClosedFormBackend::default().platform(), "rust");

        let src = sample_points();
        let result = backend.calibrate(&src, &src, FitMode::Rigid, None)?;
        assert_eq!(result.source_platform, "python");
        assert!(result.rmse < 1e-12);
        Ok(())
    }

    #[test]
    fn test_backend_as_trait_object() -> Result<(), CalibrationError> {
        let backend: Box<dyn CalibrationBackend> = Box::new(ClosedFormBackend::default());
        let src = sample_points();
        let dst = src
            .iter()
            .map(|p| Point3::new(p.x, p.y, p.z + 2.0))
            .collect::<Vec<_>>();
        let params = RansacParams::default();
        let result = backend.calibrate(&src, &dst, FitMode::Similarity, Some(&params))?;
        assert!(result.rmse < 1e-12);
        assert_eq!(result.num_points_used, 5);
        Ok(())
    }
}
