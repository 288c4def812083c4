//! Minimum-image metric for (possibly triclinic) periodic boxes.

use super::error::Error;
use super::linalg::{Vec3, add, cross, dot, norm, norm_sq, normalize, scale, sub};
use crate::model::frame::SimBox;

/// Validated box geometry used for every distance in the pipeline.
///
/// A box without periodic axes is treated as open space with the identity
/// basis, whatever its stored vectors.
#[derive(Debug, Clone)]
pub struct Metric {
    /// Box vectors as rows.
    vectors: [Vec3; 3],
    /// Rows of the inverse transpose: `fractional[k] = dot(inverse[k], x)`.
    inverse: [Vec3; 3],
    periodic: [bool; 3],
    /// Perpendicular distance between opposite faces, per axis.
    widths: [f64; 3],
    orthogonal: bool,
}

impl Metric {
    /// Validates `simbox` and precomputes its inverse.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBox`] if a periodic axis has a non-finite or
    /// zero-length vector, or if the box vectors are linearly dependent while
    /// any axis is periodic.
    ///
    /// A zero-length vector on a non-periodic axis (a slab box written with
    /// `c = 0`) is replaced by a unit vector normal to the other two.
    pub fn new(simbox: &SimBox) -> Result<Self, Error> {
        if !simbox.is_periodic() {
            let identity = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
            return Ok(Self {
                vectors: identity,
                inverse: identity,
                periodic: [false; 3],
                widths: [1.0; 3],
                orthogonal: true,
            });
        }

        let mut vectors = simbox.vectors;
        if vectors.iter().flatten().any(|v| !v.is_finite()) {
            return Err(Error::invalid_box("box vectors must be finite"));
        }
        for (axis, v) in vectors.iter().enumerate() {
            if simbox.periodic[axis] && norm(*v) <= 0.0 {
                return Err(Error::invalid_box(format!(
                    "periodic axis {} has a zero-length box vector",
                    axis_name(axis)
                )));
            }
        }
        for axis in 0..3 {
            if !simbox.periodic[axis] && norm(vectors[axis]) <= 0.0 {
                vectors[axis] = open_axis(&vectors, axis);
            }
        }

        let [a, b, c] = vectors;
        let volume = dot(a, cross(b, c));
        let scale_ref = norm(a) * norm(b) * norm(c);
        if volume.abs() <= 1e-12 * scale_ref.max(f64::MIN_POSITIVE) {
            return Err(Error::invalid_box(
                "box vectors are linearly dependent (zero volume)",
            ));
        }

        // Reciprocal vectors: dot(inverse[i], vectors[j]) == δij.
        let inverse = [
            scale(cross(b, c), 1.0 / volume),
            scale(cross(c, a), 1.0 / volume),
            scale(cross(a, b), 1.0 / volume),
        ];
        let widths = inverse.map(|r| 1.0 / norm(r));
        let orthogonal = dot(a, b) == 0.0 && dot(a, c) == 0.0 && dot(b, c) == 0.0;

        Ok(Self {
            vectors,
            inverse,
            periodic: simbox.periodic,
            widths,
            orthogonal,
        })
    }

    #[inline]
    pub fn periodic(&self) -> [bool; 3] {
        self.periodic
    }

    /// Box vector of `axis` (after open-axis substitution).
    #[inline]
    pub fn vector(&self, axis: usize) -> Vec3 {
        self.vectors[axis]
    }

    /// Perpendicular box widths (1.0 along non-periodic axes of an open box).
    #[inline]
    pub fn widths(&self) -> [f64; 3] {
        self.widths
    }

    /// Smallest perpendicular width over the periodic axes.
    pub fn min_periodic_width(&self) -> Option<f64> {
        (0..3)
            .filter(|&k| self.periodic[k])
            .map(|k| self.widths[k])
            .min_by(f64::total_cmp)
    }

    /// Fractional coordinates of `x` in the box basis.
    #[inline]
    pub fn fractional(&self, x: Vec3) -> Vec3 {
        [
            dot(self.inverse[0], x),
            dot(self.inverse[1], x),
            dot(self.inverse[2], x),
        ]
    }

    /// Shortest periodic image of the displacement `d`.
    ///
    /// Negating `d` negates the result exactly for orthogonal boxes. Callers
    /// that need exact symmetry for every box evaluate each unordered pair in
    /// one fixed order (see [`Metric::pair_vector`]).
    pub fn minimum_image(&self, d: Vec3) -> Vec3 {
        if !self.periodic.iter().any(|&p| p) {
            return d;
        }

        let f = self.fractional(d);
        let mut shifted = d;
        for k in 0..3 {
            if self.periodic[k] {
                let shift = f[k].round();
                if shift != 0.0 {
                    shifted = sub(shifted, scale(self.vectors[k], shift));
                }
            }
        }

        if self.orthogonal {
            return shifted;
        }

        // Rounding fractional coordinates is not exact for skewed cells; the
        // true minimum image is among the neighboring images.
        let mut best = shifted;
        let mut best_sq = norm_sq(shifted);
        let range = |k: usize| if self.periodic[k] { -1i32..=1 } else { 0..=0 };
        for i in range(0) {
            for j in range(1) {
                for l in range(2) {
                    if i == 0 && j == 0 && l == 0 {
                        continue;
                    }
                    let offset = add(
                        add(
                            scale(self.vectors[0], i as f64),
                            scale(self.vectors[1], j as f64),
                        ),
                        scale(self.vectors[2], l as f64),
                    );
                    let candidate = add(shifted, offset);
                    let candidate_sq = norm_sq(candidate);
                    if candidate_sq < best_sq {
                        best = candidate;
                        best_sq = candidate_sq;
                    }
                }
            }
        }
        best
    }

    /// Minimum-image vector from particle `i` to particle `j`.
    ///
    /// Always evaluated from the lower to the higher index and negated when
    /// needed, so `pair_vector(i, j) == -pair_vector(j, i)` bit for bit.
    pub fn pair_vector(&self, positions: &[Vec3], i: usize, j: usize) -> Vec3 {
        if i <= j {
            self.minimum_image(sub(positions[j], positions[i]))
        } else {
            let v = self.minimum_image(sub(positions[i], positions[j]));
            [-v[0], -v[1], -v[2]]
        }
    }
}

/// Unit vector standing in for the missing box vector of a non-periodic
/// `axis`, normal to the other two when they span a plane.
fn open_axis(vectors: &[Vec3; 3], axis: usize) -> Vec3 {
    let unit = |k: usize| {
        let mut e = [0.0; 3];
        e[k] = 1.0;
        e
    };
    let u = vectors[(axis + 1) % 3];
    let w = vectors[(axis + 2) % 3];
    if let Some(n) = normalize(cross(u, w)) {
        return n;
    }

    // Only one usable vector left: take the Cartesian axis least aligned
    // with it and remove its parallel part.
    let Some(d) = normalize(u).or_else(|| normalize(w)) else {
        return unit(axis);
    };
    let e = (0..3)
        .map(unit)
        .min_by(|x, y| dot(*x, d).abs().total_cmp(&dot(*y, d).abs()))
        .unwrap_or(unit(axis));
    normalize(sub(e, scale(d, dot(e, d)))).unwrap_or(unit(axis))
}

fn axis_name(axis: usize) -> char {
    ['x', 'y', 'z'][axis]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_box_returns_raw_displacement() {
        let metric = Metric::new(&SimBox::open()).unwrap();
        assert_eq!(metric.minimum_image([40.0, -7.0, 3.0]), [40.0, -7.0, 3.0]);
        assert_eq!(metric.fractional([1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn orthorhombic_wraps_each_periodic_axis() {
        let metric = Metric::new(&SimBox::orthorhombic([10.0, 10.0, 10.0])).unwrap();
        assert_eq!(metric.minimum_image([9.0, -9.0, 4.0]), [-1.0, 1.0, 4.0]);
        assert_eq!(metric.widths(), [10.0, 10.0, 10.0]);
    }

    #[test]
    fn non_periodic_axis_is_not_wrapped() {
        let simbox = SimBox::orthorhombic([10.0, 10.0, 10.0]).with_periodicity([true, true, false]);
        let metric = Metric::new(&simbox).unwrap();
        assert_eq!(metric.minimum_image([9.0, 0.0, 9.0]), [-1.0, 0.0, 9.0]);
    }

    #[test]
    fn triclinic_minimum_image_is_shortest() {
        let simbox = SimBox::triclinic([[10.0, 0.0, 0.0], [8.0, 6.0, 0.0], [0.0, 0.0, 10.0]]);
        let metric = Metric::new(&simbox).unwrap();
        let d = metric.minimum_image([0.0, 5.5, 0.0]);

        // Brute force over a wide image range.
        let mut best = f64::INFINITY;
        for i in -3..=3 {
            for j in -3..=3 {
                let v = [
                    0.0 + 10.0 * i as f64 + 8.0 * j as f64,
                    5.5 + 6.0 * j as f64,
                    0.0,
                ];
                best = best.min(norm(v));
            }
        }
        assert!((norm(d) - best).abs() < 1e-12);
    }

    #[test]
    fn pair_vector_is_antisymmetric() {
        let simbox = SimBox::from_lengths_angles([7.0, 8.0, 9.0], [75.0, 85.0, 65.0]);
        let metric = Metric::new(&simbox).unwrap();
        let positions = vec![[0.3, 6.9, 1.1], [6.8, 0.2, 8.7]];
        let ij = metric.pair_vector(&positions, 0, 1);
        let ji = metric.pair_vector(&positions, 1, 0);
        assert_eq!(ij, [-ji[0], -ji[1], -ji[2]]);
        assert_eq!(norm(ij).to_bits(), norm(ji).to_bits());
    }

    #[test]
    fn triclinic_widths_are_perpendicular() {
        let simbox = SimBox::triclinic([[10.0, 0.0, 0.0], [5.0, 5.0, 0.0], [0.0, 0.0, 4.0]]);
        let metric = Metric::new(&simbox).unwrap();
        let widths = metric.widths();
        assert!((widths[0] - 5.0 * 2f64.sqrt()).abs() < 1e-12);
        assert!((widths[1] - 5.0).abs() < 1e-12);
        assert!((widths[2] - 4.0).abs() < 1e-12);
        assert_eq!(metric.min_periodic_width(), Some(4.0));
    }

    #[test]
    fn errors_on_degenerate_box() {
        let flat = SimBox::triclinic([[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        assert!(matches!(Metric::new(&flat), Err(Error::InvalidBox { .. })));

        let zero_axis = SimBox::orthorhombic([5.0, 0.0, 5.0]);
        assert!(matches!(Metric::new(&zero_axis), Err(Error::InvalidBox { .. })));

        let zero_periodic_c = SimBox::triclinic([[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0; 3]]);
        assert!(matches!(Metric::new(&zero_periodic_c), Err(Error::InvalidBox { .. })));
    }

    #[test]
    fn slab_box_without_c_vector_is_accepted() {
        let slab = SimBox::triclinic([[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0; 3]])
            .with_periodicity([true, true, false]);
        let metric = Metric::new(&slab).unwrap();
        assert!(norm(sub(metric.vector(2), [0.0, 0.0, 1.0])) < 1e-12);
        assert_eq!(metric.minimum_image([9.0, -6.0, 50.0]), [-1.0, 4.0, 50.0]);
        assert!((metric.widths()[2] - 1.0).abs() < 1e-12);
        assert_eq!(metric.min_periodic_width(), Some(10.0));
    }

    #[test]
    fn single_periodic_axis_fills_both_open_axes() {
        let wire = SimBox::triclinic([[12.0, 0.0, 0.0], [0.0; 3], [0.0; 3]])
            .with_periodicity([true, false, false]);
        let metric = Metric::new(&wire).unwrap();
        assert!(norm(sub(metric.vector(1), [0.0, 1.0, 0.0])) < 1e-12);
        assert!(norm(sub(metric.vector(2), [0.0, 0.0, 1.0])) < 1e-12);
        assert_eq!(metric.minimum_image([11.0, 30.0, -30.0]), [-1.0, 30.0, -30.0]);
    }
}
