#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Calibration pipeline and backend abstraction.
pub mod backend;

/// Error types of the calibration engine.
pub mod error;

/// Fit evaluation: residuals and RMSE.
pub mod evaluate;

/// Fit modes and their requirements.
pub mod mode;

/// 3D point value type.
pub mod point;

/// RANSAC outlier rejection.
pub mod ransac;

/// Calibration result.
pub mod result;

/// Transform solvers.
pub mod solve;

/// Homogeneous 4x4 transforms.
pub mod transform;

/// Input validation.
pub mod validate;

pub use backend::{calibrate, CalibrationBackend, CalibrationConfig, ClosedFormBackend};
pub use error::{CalibrationError, ErrorKind};
pub use evaluate::evaluate;
pub use mode::FitMode;
pub use point::Point3;
pub use ransac::{reject_outliers, RansacParams};
pub use result::CalibrationResult;
pub use solve::solve;
pub use transform::Transform4x4;
pub use validate::{validate, ValidatedInput};
