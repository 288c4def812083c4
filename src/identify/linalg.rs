//! Small fixed-size linear algebra for 3D point clouds.
//!
//! Provides vector helpers, a cyclic Jacobi eigen-solver for symmetric 3×3
//! matrices, and principal component analysis of point sets.

pub type Vec3 = [f64; 3];

#[inline]
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn neg(a: Vec3) -> Vec3 {
    [-a[0], -a[1], -a[2]]
}

#[inline]
pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm_sq(a: Vec3) -> f64 {
    dot(a, a)
}

#[inline]
pub fn norm(a: Vec3) -> f64 {
    norm_sq(a).sqrt()
}

/// Returns `a / |a|`, or `None` for a (near) zero vector.
pub fn normalize(a: Vec3) -> Option<Vec3> {
    let n = norm(a);
    if n > f64::EPSILON && n.is_finite() {
        Some(scale(a, 1.0 / n))
    } else {
        None
    }
}

/// Eigen-decomposition of a symmetric 3×3 matrix.
///
/// Eigenvalues are sorted ascending; `vectors[k]` is the unit eigenvector of
/// `values[k]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetricEigen {
    pub values: [f64; 3],
    pub vectors: [Vec3; 3],
}

const JACOBI_MAX_SWEEPS: usize = 50;

/// Diagonalizes a symmetric 3×3 matrix with cyclic Jacobi rotations.
///
/// Returns `None` if the matrix has non-finite entries.
pub fn symmetric_eigen(matrix: [[f64; 3]; 3]) -> Option<SymmetricEigen> {
    if matrix.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }

    let mut a = matrix;
    let mut v = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    let scale_ref = a.iter().flatten().fold(0.0f64, |m, x| m.max(x.abs()));
    if scale_ref == 0.0 {
        return Some(SymmetricEigen {
            values: [0.0; 3],
            vectors: v,
        });
    }
    let tolerance = scale_ref * 1e-15;

    for _ in 0..JACOBI_MAX_SWEEPS {
        let off = a[0][1].abs() + a[0][2].abs() + a[1][2].abs();
        if off <= tolerance {
            break;
        }

        for (p, q) in [(0usize, 1usize), (0, 2), (1, 2)] {
            if a[p][q].abs() <= tolerance * 1e-3 {
                continue;
            }

            let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
            let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
            let t = if theta == 0.0 { 1.0 } else { t };
            let c = 1.0 / (t * t + 1.0).sqrt();
            let s = t * c;

            // A' = Jᵀ A J with J the rotation in the (p, q) plane.
            for k in 0..3 {
                let akp = a[k][p];
                let akq = a[k][q];
                a[k][p] = c * akp - s * akq;
                a[k][q] = s * akp + c * akq;
            }
            for k in 0..3 {
                let apk = a[p][k];
                let aqk = a[q][k];
                a[p][k] = c * apk - s * aqk;
                a[q][k] = s * apk + c * aqk;
            }
            for row in v.iter_mut() {
                let vp = row[p];
                let vq = row[q];
                row[p] = c * vp - s * vq;
                row[q] = s * vp + c * vq;
            }
        }
    }

    let mut order = [0usize, 1, 2];
    order.sort_by(|&i, &j| a[i][i].total_cmp(&a[j][j]));

    let column = |k: usize| [v[0][k], v[1][k], v[2][k]];

    Some(SymmetricEigen {
        values: order.map(|k| a[k][k]),
        vectors: order.map(column),
    })
}

/// Principal component analysis of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointCloudPca {
    pub centroid: Vec3,
    pub eigen: SymmetricEigen,
}

impl PointCloudPca {
    /// Direction of least variance (best-fit plane normal).
    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.eigen.vectors[0]
    }

    /// Variance along the least-variance direction, clamped at zero.
    #[inline]
    pub fn min_variance(&self) -> f64 {
        self.eigen.values[0].max(0.0)
    }

    /// Variance along the largest-variance direction, clamped at zero.
    #[inline]
    pub fn max_variance(&self) -> f64 {
        self.eigen.values[2].max(0.0)
    }

    /// Mean squared distance from the centroid.
    #[inline]
    pub fn total_variance(&self) -> f64 {
        self.eigen.values.iter().map(|v| v.max(0.0)).sum()
    }
}

/// Computes centroid and covariance eigen-decomposition of `points`.
///
/// Returns `None` for an empty set or non-finite input.
pub fn pca<I>(points: I) -> Option<PointCloudPca>
where
    I: IntoIterator<Item = Vec3>,
    I::IntoIter: Clone,
{
    let points = points.into_iter();

    let mut count = 0usize;
    let mut sum = [0.0; 3];
    for p in points.clone() {
        sum = add(sum, p);
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let centroid = scale(sum, 1.0 / count as f64);

    let mut cov = [[0.0f64; 3]; 3];
    for p in points {
        let d = sub(p, centroid);
        for r in 0..3 {
            for c in r..3 {
                cov[r][c] += d[r] * d[c];
            }
        }
    }
    for r in 0..3 {
        for c in r..3 {
            cov[r][c] /= count as f64;
            cov[c][r] = cov[r][c];
        }
    }

    symmetric_eigen(cov).map(|eigen| PointCloudPca { centroid, eigen })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "{a} != {b}");
    }

    #[test]
    fn diagonal_matrix_is_sorted() {
        let eig = symmetric_eigen([[3.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 2.0]]).unwrap();
        assert_eq!(eig.values, [1.0, 2.0, 3.0]);
        assert_eq!(eig.vectors[0], [0.0, 1.0, 0.0]);
        assert_eq!(eig.vectors[2], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn eigenpairs_satisfy_definition() {
        let m = [[4.0, 1.0, -2.0], [1.0, 2.0, 0.5], [-2.0, 0.5, 3.0]];
        let eig = symmetric_eigen(m).unwrap();
        for k in 0..3 {
            let v = eig.vectors[k];
            assert_close(norm(v), 1.0, 1e-12);
            let mv = [dot(m[0], v), dot(m[1], v), dot(m[2], v)];
            for r in 0..3 {
                assert_close(mv[r], eig.values[k] * v[r], 1e-10);
            }
        }
        assert_close(eig.values.iter().sum::<f64>(), 9.0, 1e-10);
    }

    #[test]
    fn zero_matrix_is_handled() {
        let eig = symmetric_eigen([[0.0; 3]; 3]).unwrap();
        assert_eq!(eig.values, [0.0; 3]);
    }

    #[test]
    fn non_finite_matrix_is_rejected() {
        assert!(symmetric_eigen([[f64::NAN, 0.0, 0.0], [0.0; 3], [0.0; 3]]).is_none());
    }

    #[test]
    fn pca_of_tilted_plane_recovers_normal() {
        let normal = normalize([1.0, 1.0, 1.0]).unwrap();
        let u = normalize([1.0, -1.0, 0.0]).unwrap();
        let w = cross(normal, u);
        let mut points = Vec::new();
        for i in -3..=3 {
            for j in -3..=3 {
                points.push(add(scale(u, i as f64), scale(w, j as f64)));
            }
        }
        let fit = pca(points.iter().copied()).unwrap();
        assert_close(dot(fit.normal(), normal).abs(), 1.0, 1e-10);
        assert_close(fit.min_variance(), 0.0, 1e-10);
        assert_close(fit.centroid[0], 0.0, 1e-12);
    }

    #[test]
    fn pca_of_empty_set_is_none() {
        assert!(pca(std::iter::empty::<Vec3>()).is_none());
    }

    #[test]
    fn normalize_rejects_zero_vector() {
        assert!(normalize([0.0; 3]).is_none());
        assert_eq!(normalize([0.0, 3.0, 0.0]), Some([0.0, 1.0, 0.0]));
    }
}
