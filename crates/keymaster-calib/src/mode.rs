use serde::{Deserialize, Serialize};

/// Degrees of freedom of the fitted transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Rotation and translation (6 DOF).
    #[serde(alias = "RIGID")]
    Rigid,
    /// Rotation, uniform scale and translation (7 DOF).
    #[serde(alias = "SIMILARITY")]
    Similarity,
    /// Full linear map and translation (12 DOF).
    #[default]
    #[serde(alias = "AFFINE")]
    Affine,
}

impl FitMode {
    /// All supported modes.
    pub const ALL: [FitMode; 3] = [FitMode::Rigid, FitMode::Similarity, FitMode::Affine];

    /// Minimum number of correspondences.
    pub const fn min_points(self) -> usize {
        match self {
            FitMode::Rigid | FitMode::Similarity => 3,
            FitMode::Affine => 4,
        }
    }

    /// Minimum rank of the centered source points: non-collinear (2) or
    /// non-coplanar (3).
    pub const fn required_rank(self) -> usize {
        match self {
            FitMode::Rigid | FitMode::Similarity => 2,
            FitMode::Affine => 3,
        }
    }

    /// Number of free parameters of the transform.
    pub const fn degrees_of_freedom(self) -> usize {
        match self {
            FitMode::Rigid => 6,
            FitMode::Similarity => 7,
            FitMode::Affine => 12,
        }
    }

    /// Lowercase name, as used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            FitMode::Rigid => "rigid",
            FitMode::Similarity => "similarity",
            FitMode::Affine => "affine",
        }
    }
}

impl std::fmt::Display for FitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown fit mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown fit mode '{0}', expected one of: rigid, similarity, affine")]
pub struct ParseFitModeError(String);

impl std::str::FromStr for FitMode {
    type Err = ParseFitModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FitMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseFitModeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fit_mode() {
        assert_eq!("rigid".parse(), Ok(FitMode::Rigid));
        assert_eq!("AFFINE".parse(), Ok(FitMode::Affine));
        assert_eq!(" Similarity ".parse(), Ok(FitMode::Similarity));
        assert!("projective".parse::<FitMode>().is_err());
    }

    #[test]
    fn test_fit_mode_serde() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&FitMode::Rigid)?, "\"rigid\"");
        assert_eq!(
            serde_json::from_str::<FitMode>("\"RIGID\"")?,
            FitMode::Rigid
        );
        assert_eq!(
            serde_json::from_str::<FitMode>("\"affine\"")?,
            FitMode::Affine
        );
        Ok(())
    }

    #[test]
    fn test_fit_mode_requirements() {
        assert_eq!(FitMode::default(), FitMode::Affine);
        assert_eq!(FitMode::Rigid.min_points(), 3);
        assert_eq!(FitMode::Affine.min_points(), 4);
        assert_eq!(FitMode::Affine.degrees_of_freedom(), 12);
    }
}
