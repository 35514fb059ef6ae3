use serde::Serialize;
use thiserror::Error;

use crate::mode::FitMode;

/// Which of the two point sets an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSet {
    /// The points to be transformed (ARW frame).
    Source,
    /// The reference points (RWP frame).
    Target,
}

impl std::fmt::Display for PointSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointSet::Source => f.write_str("source"),
            PointSet::Target => f.write_str("target"),
        }
    }
}

/// Discriminant of [`CalibrationError`], stable across versions and used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Source and target counts differ.
    LengthMismatch,
    /// Fewer correspondences than the fit mode needs.
    InsufficientPoints,
    /// The source points do not span enough dimensions.
    DegenerateGeometry,
    /// The least-squares system could not be solved.
    SingularSystem,
    /// A coordinate is NaN or infinite.
    NonFiniteInput,
}

impl ErrorKind {
    /// snake_case name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::LengthMismatch => "length_mismatch",
            ErrorKind::InsufficientPoints => "insufficient_points",
            ErrorKind::DegenerateGeometry => "degenerate_geometry",
            ErrorKind::SingularSystem => "singular_system",
            ErrorKind::NonFiniteInput => "non_finite_input",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types for the calibration engine.
///
/// Every variant is a deterministic precondition failure; retrying with the
/// same input fails the same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// Source and target point sets have different lengths.
    #[error("Mismatched point counts: source ({source_len}) != target ({target_len})")]
    LengthMismatch {
        /// Number of source points.
        source_len: usize,
        /// Number of target points.
        target_len: usize,
    },

    /// Not enough correspondences for the requested fit.
    #[error("{mode} fit requires at least {required} correspondences, got {actual}")]
    InsufficientPoints {
        /// Requested fit mode.
        mode: FitMode,
        /// Minimum number of correspondences.
        required: usize,
        /// Number of correspondences available.
        actual: usize,
    },

    /// The source points are collinear (rigid, similarity) or coplanar (affine).
    #[error(
        "{mode} fit needs source points spanning {required} dimensions, they span {rank} \
         (singular values {singular_values:?})"
    )]
    DegenerateGeometry {
        /// Requested fit mode.
        mode: FitMode,
        /// Rank required by the fit mode.
        required: usize,
        /// Numerical rank of the centered source points.
        rank: usize,
        /// Singular values of the centered source points, descending.
        singular_values: [f64; 3],
    },

    /// The least-squares system has no stable solution.
    #[error("Least-squares system is singular: {0}")]
    SingularSystem(String),

    /// A coordinate is NaN or infinite.
    #[error("Non-finite coordinate in {set} point {index}")]
    NonFiniteInput {
        /// Point set containing the bad coordinate.
        set: PointSet,
        /// Index of the offending point.
        index: usize,
    },
}

impl CalibrationError {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalibrationError::LengthMismatch { .. } => ErrorKind::LengthMismatch,
            CalibrationError::InsufficientPoints { .. } => ErrorKind::InsufficientPoints,
            CalibrationError::DegenerateGeometry { .. } => ErrorKind::DegenerateGeometry,
            CalibrationError::SingularSystem(_) => ErrorKind::SingularSystem,
            CalibrationError::NonFiniteInput { .. } => ErrorKind::NonFiniteInput,
        }
    }
}
