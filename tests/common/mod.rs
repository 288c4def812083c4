//! Synthetic membrane models shared by the integration tests.
//!
//! Every model uses unit lattice spacing, a leaflet separation of
//! [`THICKNESS`] and is meant to be analyzed with [`CUTOFF`], which links
//! each particle to part of the apposed leaflet.

#![allow(dead_code)]

use std::f64::consts::PI;

use membrane_topology::{Frame, SimBox};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub const THICKNESS: f64 = 1.5;
pub const CUTOFF: f64 = 2.5;

/// A frame plus the expected leaflet membership of its particles.
#[derive(Debug, Clone)]
pub struct Model {
    pub frame: Frame,
    /// Upper (or outer) leaflet indices, ascending.
    pub upper: Vec<usize>,
    /// Lower (or inner) leaflet indices, ascending.
    pub lower: Vec<usize>,
    /// Indices expected in both leaflets.
    pub rim: Vec<usize>,
}

impl Model {
    fn from_layers(upper: Vec<[f64; 3]>, lower: Vec<[f64; 3]>, simbox: SimBox) -> Self {
        let n_upper = upper.len();
        let n_lower = lower.len();
        let mut positions = upper;
        positions.extend(lower);
        Self {
            frame: Frame::new(positions, simbox),
            upper: (0..n_upper).collect(),
            lower: (n_upper..n_upper + n_lower).collect(),
            rim: Vec::new(),
        }
    }

    /// Displaces every coordinate uniformly within `±amplitude`.
    pub fn jittered(mut self, amplitude: f64, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        for p in &mut self.frame.positions {
            for x in p.iter_mut() {
                *x += rng.gen_range(-amplitude..=amplitude);
            }
        }
        self
    }

    /// Moves every particle by `shift` and wraps periodic axes into the box.
    pub fn translated(mut self, shift: [f64; 3]) -> Self {
        let lengths = self.frame.simbox.lengths();
        let periodic = self.frame.simbox.periodic;
        for p in &mut self.frame.positions {
            for k in 0..3 {
                p[k] += shift[k];
                if periodic[k] {
                    p[k] = p[k].rem_euclid(lengths[k]);
                }
            }
        }
        self
    }
}

/// Square lattice of `nx × ny` points in the plane `z = height(x, y)`.
fn sheet(nx: usize, ny: usize, height: impl Fn(f64, f64) -> f64) -> Vec<[f64; 3]> {
    let mut points = Vec::with_capacity(nx * ny);
    for i in 0..nx {
        for j in 0..ny {
            let (x, y) = (i as f64 + 0.5, j as f64 + 0.5);
            points.push([x, y, height(x, y)]);
        }
    }
    points
}

/// Flat bilayer filling an `n × n` periodic box.
pub fn flat_bilayer(n: usize) -> Model {
    let mid = 10.0;
    Model::from_layers(
        sheet(n, n, |_, _| mid + THICKNESS / 2.0),
        sheet(n, n, |_, _| mid - THICKNESS / 2.0),
        SimBox::orthorhombic([n as f64, n as f64, 20.0]),
    )
}

/// Finite `n × n` bilayer patch in open space, so every edge is exposed.
pub fn flat_patch(n: usize) -> Model {
    Model::from_layers(
        sheet(n, n, |_, _| THICKNESS / 2.0),
        sheet(n, n, |_, _| -THICKNESS / 2.0),
        SimBox::open(),
    )
}

/// `model`'s frame with particle `k` taken from index `order[k]`.
pub fn reordered(model: &Model, order: &[usize]) -> Frame {
    Frame::new(
        order.iter().map(|&i| model.frame.positions[i]).collect(),
        model.frame.simbox,
    )
}

/// Two single-particle-thick sheets `gap` apart along z, with z not periodic.
pub fn parallel_sheets(n: usize, gap: f64) -> Model {
    Model::from_layers(
        sheet(n, n, |_, _| gap),
        sheet(n, n, |_, _| 0.0),
        SimBox::orthorhombic([n as f64, n as f64, 100.0]).with_periodicity([true, true, false]),
    )
}

/// Bilayer undulating as `amplitude · sin(2πx / length)` along x.
pub fn curved_bilayer(length: usize, width: usize, amplitude: f64) -> Model {
    let mid = 15.0;
    let wave = move |x: f64| amplitude * (2.0 * PI * x / length as f64).sin();
    Model::from_layers(
        sheet(length, width, |x, _| mid + wave(x) + THICKNESS / 2.0),
        sheet(length, width, |x, _| mid + wave(x) - THICKNESS / 2.0),
        SimBox::orthorhombic([length as f64, width as f64, 30.0]),
    )
}

/// Bilayer with a Gaussian bump of the given height and width in its center.
pub fn bulged_bilayer(n: usize, height: f64, sigma: f64) -> Model {
    let mid = 15.0;
    let c = n as f64 / 2.0;
    let bump = move |x: f64, y: f64| {
        let r2 = (x - c).powi(2) + (y - c).powi(2);
        height * (-r2 / (2.0 * sigma * sigma)).exp()
    };
    Model::from_layers(
        sheet(n, n, |x, y| mid + bump(x, y) + THICKNESS / 2.0),
        sheet(n, n, |x, y| mid + bump(x, y) - THICKNESS / 2.0),
        SimBox::orthorhombic([n as f64, n as f64, 30.0]),
    )
}

/// Bilayer in a hexagonal (triclinic) box, on a triangular lattice.
pub fn hexagonal_bilayer(n: usize) -> Model {
    let h = 3f64.sqrt() / 2.0;
    let layer = |z: f64| {
        let mut points = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                points.push([i as f64 + 0.5 * j as f64, h * j as f64, z]);
            }
        }
        points
    };
    let nf = n as f64;
    Model::from_layers(
        layer(10.0 + THICKNESS / 2.0),
        layer(10.0 - THICKNESS / 2.0),
        SimBox::triclinic([[nf, 0.0, 0.0], [0.5 * nf, h * nf, 0.0], [0.0, 0.0, 20.0]]),
    )
}

/// Roughly uniform points on a sphere (Fibonacci lattice), unit spacing.
pub fn sphere(center: [f64; 3], radius: f64) -> Vec<[f64; 3]> {
    let n = (4.0 * PI * radius * radius).round() as usize;
    let golden = PI * (3.0 - 5f64.sqrt());
    (0..n)
        .map(|k| {
            let y = 1.0 - 2.0 * (k as f64 + 0.5) / n as f64;
            let r = (1.0 - y * y).sqrt();
            let phi = golden * k as f64;
            [
                center[0] + radius * r * phi.cos(),
                center[1] + radius * y,
                center[2] + radius * r * phi.sin(),
            ]
        })
        .collect()
}

/// Two concentric shells, outer first, in a periodic cubic box.
pub fn vesicle(outer_radius: f64, box_length: f64) -> Model {
    let c = box_length / 2.0;
    Model::from_layers(
        sphere([c, c, c], outer_radius),
        sphere([c, c, c], outer_radius - THICKNESS),
        SimBox::orthorhombic([box_length; 3]),
    )
}

/// Two flat disks joined by a ring of rim lipids at mid-plane.
///
/// Upper disk first, then lower disk, then the rim.
pub fn bicelle(radius: f64) -> Model {
    let mid = 15.0;
    let c = 20.0;
    let r = radius as i64;
    let disk = |z: f64| {
        let mut points = Vec::new();
        for i in -r..=r {
            for j in -r..=r {
                let (x, y) = (i as f64, j as f64);
                if x * x + y * y <= radius * radius {
                    points.push([c + x, c + y, z]);
                }
            }
        }
        points
    };

    let rim_radius = radius + 1.0;
    let rim_count = (2.0 * PI * rim_radius).round() as usize;
    let rim: Vec<[f64; 3]> = (0..rim_count)
        .map(|k| {
            let t = 2.0 * PI * k as f64 / rim_count as f64;
            [c + rim_radius * t.cos(), c + rim_radius * t.sin(), mid]
        })
        .collect();

    let mut model = Model::from_layers(
        disk(mid + THICKNESS / 2.0),
        disk(mid - THICKNESS / 2.0),
        SimBox::orthorhombic([40.0, 40.0, 30.0]),
    );
    let start = model.frame.positions.len();
    model.frame.positions.extend(rim);
    model.rim = (start..model.frame.positions.len()).collect();
    model
}

/// Indices of `model`'s disk particles within `radius` of the disk axis.
pub fn disk_interior(model: &Model, indices: &[usize], radius: f64) -> Vec<usize> {
    indices
        .iter()
        .copied()
        .filter(|&i| {
            let p = model.frame.positions[i];
            ((p[0] - 20.0).powi(2) + (p[1] - 20.0).powi(2)).sqrt() <= radius
        })
        .collect()
}
