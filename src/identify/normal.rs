//! Local surface normals from neighborhood PCA.
//!
//! For every particle the point cloud made of the particle and its neighbors
//! (in local minimum-image coordinates) is fitted with a plane; the normal is
//! the direction of least variance. The sign of a PCA normal is arbitrary and
//! is fixed later by the leaflet splitter.

use super::linalg::{Vec3, neg, normalize, pca};
use super::spatial::NeighborGraph;

/// Ratio of middle to largest variance below which a neighborhood counts as
/// collinear and cannot define a plane.
const COLLINEAR_RATIO: f64 = 1e-9;

/// Local geometry around one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    /// Unit normal, `None` when the neighborhood cannot define a plane.
    pub normal: Option<Vec3>,
    /// Vector from the local centroid to the particle.
    pub offset_from_centroid: Vec3,
    /// RMS distance of the neighborhood points from their centroid.
    pub spread: f64,
}

impl LocalFrame {
    fn unreliable() -> Self {
        Self {
            normal: None,
            offset_from_centroid: [0.0; 3],
            spread: 0.0,
        }
    }

    #[inline]
    pub fn is_reliable(&self) -> bool {
        self.normal.is_some()
    }
}

/// Estimates the local frame of particle `i`.
///
/// Particles with fewer than `min_neighbors` neighbors, and neighborhoods
/// that are coincident or collinear, get an unreliable frame.
pub fn estimate_local_frame(graph: &NeighborGraph, i: usize, min_neighbors: usize) -> LocalFrame {
    let neighbors = graph.neighbors(i);
    if neighbors.len() < min_neighbors {
        return LocalFrame::unreliable();
    }

    let points = std::iter::once([0.0; 3]).chain(neighbors.iter().map(|n| n.offset));
    let Some(fit) = pca(points) else {
        return LocalFrame::unreliable();
    };

    let largest = fit.max_variance();
    let middle = fit.eigen.values[1].max(0.0);
    if largest <= 0.0 || middle <= COLLINEAR_RATIO * largest {
        return LocalFrame::unreliable();
    }

    let Some(normal) = normalize(fit.normal()) else {
        return LocalFrame::unreliable();
    };

    LocalFrame {
        normal: Some(normal),
        offset_from_centroid: neg(fit.centroid),
        spread: fit.total_variance().sqrt(),
    }
}

/// Estimates local frames for every particle of one aggregate.
///
/// The result is aligned with `members`.
pub fn estimate_normals(graph: &NeighborGraph, members: &[usize], min_neighbors: usize) -> Vec<LocalFrame> {
    members
        .iter()
        .map(|&i| estimate_local_frame(graph, i, min_neighbors))
        .collect()
}
