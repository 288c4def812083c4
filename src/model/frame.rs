use serde::{Deserialize, Serialize};

/// Simulation box descriptor.
///
/// Box vectors are stored as rows (`a`, `b`, `c`). Each axis carries its own
/// periodicity flag; a non-periodic axis is never wrapped, whatever the
/// length of its box vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimBox {
    pub vectors: [[f64; 3]; 3],
    pub periodic: [bool; 3],
}

impl SimBox {
    /// A box without periodicity along any axis.
    pub fn open() -> Self {
        Self {
            vectors: [[0.0; 3]; 3],
            periodic: [false; 3],
        }
    }

    /// A rectangular box, periodic along all three axes.
    pub fn orthorhombic(lengths: [f64; 3]) -> Self {
        Self {
            vectors: [
                [lengths[0], 0.0, 0.0],
                [0.0, lengths[1], 0.0],
                [0.0, 0.0, lengths[2]],
            ],
            periodic: [true; 3],
        }
    }

    /// A general box from its three vectors, periodic along all axes.
    pub fn triclinic(vectors: [[f64; 3]; 3]) -> Self {
        Self {
            vectors,
            periodic: [true; 3],
        }
    }

    /// Builds a box from edge lengths and angles (α, β, γ in degrees).
    ///
    /// Uses the usual convention: `a` along x, `b` in the xy-plane and `c`
    /// completing a right-handed cell. Angles of exactly 90° produce exact
    /// zeros off the diagonal.
    pub fn from_lengths_angles(lengths: [f64; 3], angles_deg: [f64; 3]) -> Self {
        let [a, b, c] = lengths;
        let [alpha, beta, gamma] = angles_deg;

        let cos_deg = |deg: f64| {
            if deg == 90.0 {
                0.0
            } else {
                deg.to_radians().cos()
            }
        };
        let sin_deg = |deg: f64| {
            if deg == 90.0 {
                1.0
            } else {
                deg.to_radians().sin()
            }
        };

        let (cos_a, cos_b, cos_g) = (cos_deg(alpha), cos_deg(beta), cos_deg(gamma));
        let sin_g = sin_deg(gamma);

        let bx = b * cos_g;
        let by = b * sin_g;
        let cx = c * cos_b;
        let cy = if sin_g != 0.0 {
            c * (cos_a - cos_b * cos_g) / sin_g
        } else {
            0.0
        };
        let cz = (c * c - cx * cx - cy * cy).max(0.0).sqrt();

        Self::triclinic([[a, 0.0, 0.0], [bx, by, 0.0], [cx, cy, cz]])
    }

    /// Returns the same box with new per-axis periodicity flags.
    pub fn with_periodicity(mut self, periodic: [bool; 3]) -> Self {
        self.periodic = periodic;
        self
    }

    #[inline]
    pub fn is_periodic(&self) -> bool {
        self.periodic.iter().any(|&p| p)
    }

    /// Edge lengths |a|, |b|, |c|.
    pub fn lengths(&self) -> [f64; 3] {
        self.vectors.map(|v| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt())
    }

    /// Returns `true` if all three box vectors are mutually orthogonal.
    pub fn is_orthorhombic(&self) -> bool {
        let [a, b, c] = self.vectors;
        let dot = |u: [f64; 3], v: [f64; 3]| u[0] * v[0] + u[1] * v[1] + u[2] * v[2];
        dot(a, b) == 0.0 && dot(a, c) == 0.0 && dot(b, c) == 0.0
    }
}

impl Default for SimBox {
    fn default() -> Self {
        Self::open()
    }
}

/// One analyzed snapshot: one reference point per lipid plus the box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub positions: Vec<[f64; 3]>,
    #[serde(rename = "box", default)]
    pub simbox: SimBox,
}

impl Frame {
    pub fn new(positions: Vec<[f64; 3]>, simbox: SimBox) -> Self {
        Self { positions, simbox }
    }

    #[inline]
    pub fn particle_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
