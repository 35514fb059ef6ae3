use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A point in 3D space.
///
/// Serialized as `{"x": .., "y": .., "z": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    /// The x coordinate.
    pub x: f64,
    /// The y coordinate.
    pub y: f64,
    /// The z coordinate.
    pub z: f64,
}

impl Point3 {
    /// Create a new point from its coordinates.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Whether every coordinate is neither NaN nor infinite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Squared Euclidean distance to another point.
    #[inline]
    pub fn distance_squared(&self, other: &Point3) -> f64 {
        self.to_dvec3().distance_squared(other.to_dvec3())
    }

    /// Convert to a glam vector.
    #[inline]
    pub fn to_dvec3(self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    /// Convert to a plain array.
    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

impl From<DVec3> for Point3 {
    fn from(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Point3> for DVec3 {
    fn from(p: Point3) -> Self {
        p.to_dvec3()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point3_json() -> Result<(), Box<dyn std::error::Error>> {
        let p: Point3 = serde_json::from_str(r#"{"x": 1, "y": 2.5, "z": -3}"#)?;
        assert_eq!(p, Point3::new(1.0, 2.5, -3.0));
        assert_eq!(serde_json::to_string(&p)?, r#"{"x":1.0,"y":2.5,"z":-3.0}"#);
        Ok(())
    }

    #[test]
    fn test_point3_conversions() {
        let p = Point3::from([1.0, 2.0, 3.0]);
        assert_eq!(DVec3::from(p), DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(Point3::from(DVec3::new(1.0, 2.0, 3.0)), p);
        assert_eq!(p.distance_squared(&Point3::new(1.0, 2.0, 5.0)), 4.0);
        assert!(!Point3::new(f64::NAN, 0.0, 0.0).is_finite());
    }
}
