//! Double precision Singular Value Decomposition (SVD) for small matrices.
//!
//! Point-set alignment only ever needs two decompositions:
//!
//! * the full SVD of a 3×3 cross-covariance matrix (Kabsch / Umeyama), and
//! * the SVD of a tall N×3 matrix of centered points, used to decide whether
//!   a point set is collinear or coplanar and to find its principal axes.
//!
//! # Mathematical Background
//!
//! Every real 3×3 matrix factors as
//!
//! ```text
//! A = U Σ Vᵀ
//! ```
//!
//! with U and V orthogonal and Σ = diag(σ₁, σ₂, σ₃), σ₁ ≥ σ₂ ≥ σ₃ ≥ 0.
//!
//! # Implementation Details
//!
//! Both [`svd3`] and [`svd_n3`] run one-sided (Hestenes) Jacobi directly on
//! the columns of the input and accumulate the rotations into V. AᵀA is never
//! formed, so small singular values keep their relative precision.
//!
//! * The input is divided by its largest absolute entry first, so column dot
//!   products neither overflow nor underflow for coordinates far from unit
//!   magnitude. Singular values are scaled back on return.
//! * [`svd3`] then sorts the columns of B = A V and orthogonalizes B with a
//!   Givens QR to get U.
//!
//! Both routines use a fixed sweep order and a bounded sweep count, so the
//! output is bit-reproducible for identical input.
//!
//! # Example
//!
//! ```
//! use glam::DMat3;
//! use keymaster_linalg::svd::svd3;
//!
//! let matrix = DMat3::from_cols_array(&[
//!     1.0, 0.0, 0.0,
//!     0.0, 2.0, 0.0,
//!     0.0, 0.0, 3.0,
//! ]);
//!
//! let svd_result = svd3(&matrix);
//! let u = svd_result.u();
//! let s = svd_result.s();
//! let v = svd_result.v();
//! ```
//!
//! # See also
//!
//! * [`crate::rigid`] for using SVD in rigid body transformations

use glam::{DMat3, DVec3};

/// Upper bound on Jacobi sweeps. Convergence is quadratic, a handful suffice.
const MAX_SWEEPS: usize = 32;

type Rows3 = [[f64; 3]; 3];

const IDENTITY_ROWS: Rows3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

#[derive(Debug, Clone, Copy)]
/// Plane rotation `[c s; -s c]`.
struct Givens {
    cos_theta: f64,
    sin_theta: f64,
}

impl Givens {
    /// Rotation mapping `(a, b)` onto `(hypot(a, b), 0)`.
    fn zeroing(a: f64, b: f64) -> Self {
        let rho = a.hypot(b);
        if rho <= f64::MIN_POSITIVE {
            Givens {
                cos_theta: 1.0,
                sin_theta: 0.0,
            }
        } else {
            Givens {
                cos_theta: a / rho,
                sin_theta: b / rho,
            }
        }
    }

    /// Jacobi rotation annihilating the `(p, q)` entry of a symmetric matrix
    /// with diagonal entries `app`, `aqq` and off-diagonal entry `apq`.
    fn jacobi(app: f64, aqq: f64, apq: f64) -> Self {
        let theta = (aqq - app) / (2.0 * apq);
        let t = theta.signum() / (theta.abs() + theta.hypot(1.0));
        let cos_theta = 1.0 / t.hypot(1.0);
        Givens {
            cos_theta,
            sin_theta: t * cos_theta,
        }
    }
}

#[derive(Debug)]
/// Q and R factors of a 3x3 matrix.
struct QR3 {
    q: DMat3,
    /// Upper triangular.
    r: DMat3,
}

#[derive(Debug, Clone)]
/// Result of [`svd3`]: `A = U S Vᵀ`.
pub struct SVD3Set {
    u: DMat3,
    s: DMat3,
    v: DMat3,
}

impl SVD3Set {
    /// Left singular vectors, one per column.
    #[inline]
    pub fn u(&self) -> &DMat3 {
        &self.u
    }

    /// Singular values on the diagonal, descending.
    #[inline]
    pub fn s(&self) -> &DMat3 {
        &self.s
    }

    /// Right singular vectors, one per column.
    #[inline]
    pub fn v(&self) -> &DMat3 {
        &self.v
    }

    /// Singular values in descending order.
    #[inline]
    pub fn singular_values(&self) -> DVec3 {
        DVec3::new(self.s.x_axis.x, self.s.y_axis.y, self.s.z_axis.z)
    }
}

#[inline]
fn to_rows(m: &DMat3) -> Rows3 {
    m.transpose().to_cols_array_2d()
}

#[inline]
fn from_rows(rows: &Rows3) -> DMat3 {
    DMat3::from_cols_array_2d(rows).transpose()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Largest absolute entry, or 1 when it is not a usable divisor.
///
/// Zero is returned as is so callers can short-circuit the zero matrix.
fn magnitude<'a>(values: impl IntoIterator<Item = &'a f64>) -> f64 {
    let max = values.into_iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if max.is_finite() {
        max
    } else {
        1.0
    }
}

/// Rotate pairs of columns until they are mutually orthogonal and return
/// the accumulated rotation as rows of V, so that `A V` equals the rotated
/// columns.
fn orthogonalize_columns(cols: &mut [Vec<f64>; 3]) -> Rows3 {
    let mut v = IDENTITY_ROWS;

    for _ in 0..MAX_SWEEPS {
        let mut rotated = false;
        for (p, q) in [(0, 1), (0, 2), (1, 2)] {
            let alpha = dot(&cols[p], &cols[p]);
            let beta = dot(&cols[q], &cols[q]);
            let gamma = dot(&cols[p], &cols[q]);

            if gamma == 0.0 || gamma.abs() <= f64::EPSILON * alpha.sqrt() * beta.sqrt() {
                continue;
            }
            rotated = true;

            let g = Givens::jacobi(alpha, beta, gamma);
            let (c, s) = (g.cos_theta, g.sin_theta);

            let (head, tail) = cols.split_at_mut(q);
            for (xp, xq) in head[p].iter_mut().zip(tail[0].iter_mut()) {
                let (a, b) = (*xp, *xq);
                *xp = c * a - s * b;
                *xq = s * a + c * b;
            }
            for row in v.iter_mut() {
                let (a, b) = (row[p], row[q]);
                row[p] = c * a - s * b;
                row[q] = s * a + c * b;
            }
        }
        if !rotated {
            break;
        }
    }

    v
}

/// Sorts the singular values in descending order and adjusts the corresponding singular vectors accordingly.
///
/// Every swap negates one of the swapped columns so `det(V)` keeps its sign.
pub fn sort_singular_values(b: &mut DMat3, v: &mut DMat3) {
    let mut rho = [
        b.x_axis.length_squared(),
        b.y_axis.length_squared(),
        b.z_axis.length_squared(),
    ];

    for (i, j) in [(0, 1), (0, 2), (1, 2)] {
        if rho[i] < rho[j] {
            rho.swap(i, j);

            let (bi, bj) = (b.col(i), b.col(j));
            *b.col_mut(i) = bj;
            *b.col_mut(j) = -bi;

            let (vi, vj) = (v.col(i), v.col(j));
            *v.col_mut(i) = vj;
            *v.col_mut(j) = -vi;
        }
    }
}

/// Implements a QR decomposition of a Matrix using Givens rotations
fn qr_decomposition(b_mat: &DMat3) -> QR3 {
    let mut r = to_rows(b_mat);
    let mut q = IDENTITY_ROWS;

    // zero r[1][0], r[2][0] and then r[2][1]
    for (i, j) in [(0, 1), (0, 2), (1, 2)] {
        let g = Givens::zeroing(r[i][i], r[j][i]);
        let (c, s) = (g.cos_theta, g.sin_theta);

        for k in 0..3 {
            let x = r[i][k];
            let y = r[j][k];
            r[i][k] = c * x + s * y;
            r[j][k] = -s * x + c * y;
        }
        r[j][i] = 0.0;

        // Q <- Q * Gᵀ
        for row in q.iter_mut() {
            let x = row[i];
            let y = row[j];
            row[i] = c * x + s * y;
            row[j] = -s * x + c * y;
        }
    }

    QR3 {
        q: from_rows(&q),
        r: from_rows(&r),
    }
}

/// Singular value decomposition of a 3x3 matrix, `A = U S Vᵀ`.
pub fn svd3(a: &DMat3) -> SVD3Set {
    let scale = magnitude(&a.to_cols_array());
    if scale == 0.0 {
        return SVD3Set {
            u: DMat3::IDENTITY,
            s: DMat3::ZERO,
            v: DMat3::IDENTITY,
        };
    }

    let mut cols = [a.x_axis, a.y_axis, a.z_axis].map(|c| (c / scale).to_array().to_vec());
    let mut v = from_rows(&orthogonalize_columns(&mut cols));
    // B = (A / scale) * V, with orthogonal columns
    let [b0, b1, b2] = cols.map(|c| DVec3::from_slice(&c));
    let mut b = DMat3::from_cols(b0, b1, b2);

    sort_singular_values(&mut b, &mut v);

    // B = Q * R with R (numerically) diagonal
    let qr = qr_decomposition(&b);
    let mut u = qr.q;
    let r = qr.r;

    let mut sigma = [r.x_axis.x, r.y_axis.y, r.z_axis.z];
    for (k, value) in sigma.iter_mut().enumerate() {
        if *value < 0.0 {
            *u.col_mut(k) = -u.col(k);
            *value = -*value;
        }
        *value *= scale;
    }

    SVD3Set {
        u,
        s: DMat3::from_diagonal(DVec3::from_array(sigma)),
        v,
    }
}

/// Singular values (descending) and right singular vectors (as columns, in
/// the same order) of an N×3 matrix given by rows.
///
/// For a matrix of centered points the columns of V are the principal axes.
pub fn svd_n3(rows: &[[f64; 3]]) -> (DVec3, DMat3) {
    let scale = magnitude(rows.iter().flatten());
    if scale == 0.0 {
        return (DVec3::ZERO, DMat3::IDENTITY);
    }

    let mut cols: [Vec<f64>; 3] = [0, 1, 2].map(|c| rows.iter().map(|r| r[c] / scale).collect());
    let v = from_rows(&orthogonalize_columns(&mut cols));

    let norms = cols.map(|c| dot(&c, &c).sqrt());
    let mut order = [0, 1, 2];
    order.sort_by(|&i, &j| norms[j].total_cmp(&norms[i]));

    let sv = DVec3::from_array(order.map(|k| norms[k] * scale));
    let axes = DMat3::from_cols(v.col(order[0]), v.col(order[1]), v.col(order[2]));
    (sv, axes)
}

/// Singular values of an N×3 matrix given by rows, sorted in descending order.
///
/// Example:
///
/// ```
/// use keymaster_linalg::svd::singular_values_n3;
///
/// // points on the x axis span a single direction
/// let rows = [[1.0, 0.0, 0.0], [-2.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
/// let sv = singular_values_n3(&rows);
/// assert!(sv[0] > 0.0);
/// assert_eq!(sv[1], 0.0);
/// assert_eq!(sv[2], 0.0);
/// ```
pub fn singular_values_n3(rows: &[[f64; 3]]) -> [f64; 3] {
    svd_n3(rows).0.to_array()
}
