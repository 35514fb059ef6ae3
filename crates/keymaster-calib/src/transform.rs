use glam::{DMat3, DMat4, DVec3};
use serde::{Deserialize, Serialize};

use crate::point::Point3;

/// A 4x4 homogeneous transform stored as 16 values in row-major order.
///
/// Maps source coordinates to target coordinates, `target ≈ T · source`.
/// Transforms built by the solvers always have the bottom row `[0, 0, 0, 1]`.
///
/// Serialized as a flat array of exactly 16 numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transform4x4([f64; 16]);

impl Transform4x4 {
    /// The identity transform.
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Create a transform from 16 row-major elements.
    ///
    /// The bottom row is taken as given.
    pub const fn from_row_major(elements: [f64; 16]) -> Self {
        Self(elements)
    }

    /// Create an affine transform `x ↦ linear · x + translation`.
    pub fn from_linear_translation(linear: &DMat3, translation: DVec3) -> Self {
        let mut elements = Self::IDENTITY.0;
        for r in 0..3 {
            let row = linear.row(r);
            elements[4 * r] = row.x;
            elements[4 * r + 1] = row.y;
            elements[4 * r + 2] = row.z;
            elements[4 * r + 3] = translation[r];
        }
        Self(elements)
    }

    /// The 16 elements in row-major order.
    #[inline]
    pub fn elements(&self) -> &[f64; 16] {
        &self.0
    }

    /// Element at `row`, `col`.
    ///
    /// PRECONDITION: `row < 4` and `col < 4`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[4 * row + col]
    }

    /// The upper-left 3x3 block.
    pub fn linear(&self) -> DMat3 {
        DMat3::from_cols(
            DVec3::new(self.get(0, 0), self.get(1, 0), self.get(2, 0)),
            DVec3::new(self.get(0, 1), self.get(1, 1), self.get(2, 1)),
            DVec3::new(self.get(0, 2), self.get(1, 2), self.get(2, 2)),
        )
    }

    /// The translation column.
    pub fn translation(&self) -> DVec3 {
        DVec3::new(self.get(0, 3), self.get(1, 3), self.get(2, 3))
    }

    /// Apply the transform to a point.
    #[inline]
    pub fn apply(&self, point: Point3) -> Point3 {
        Point3::from(self.linear() * point.to_dvec3() + self.translation())
    }

    /// Whether every element is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Convert to a glam (column-major) matrix.
    pub fn to_dmat4(&self) -> DMat4 {
        DMat4::from_cols_array(&self.0).transpose()
    }
}

impl Default for Transform4x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}
