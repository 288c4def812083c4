use serde::{Deserialize, Serialize};

use super::frame::Frame;

/// A connected component of the neighbor graph.
///
/// Indices are sorted ascending and refer to the caller's position array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub(crate) indices: Vec<usize>,
}

impl Aggregate {
    pub(crate) fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }
}

/// One monolayer of a membrane.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaflet {
    pub(crate) indices: Vec<usize>,
    pub(crate) centroid: [f64; 3],
    pub(crate) plane_normal: [f64; 3],
    pub(crate) rms_deviation: f64,
    pub(crate) planarity: f64,
    pub(crate) is_planar: bool,
}

impl Leaflet {
    /// Particle indices, sorted ascending. Pivot particles are included.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    /// Centroid of the leaflet in unwrapped coordinates.
    ///
    /// The coordinates are those of the source aggregate after removing
    /// periodic jumps, so the point may lie outside the primary box.
    #[inline]
    pub fn centroid(&self) -> [f64; 3] {
        self.centroid
    }

    /// Unit normal of the least-squares plane through the leaflet.
    #[inline]
    pub fn plane_normal(&self) -> [f64; 3] {
        self.plane_normal
    }

    /// Root-mean-square distance of the members to their best-fit plane.
    #[inline]
    pub fn rms_deviation(&self) -> f64 {
        self.rms_deviation
    }

    /// RMS plane deviation divided by the aggregate's characteristic size.
    #[inline]
    pub fn planarity(&self) -> f64 {
        self.planarity
    }

    #[inline]
    pub fn is_planar(&self) -> bool {
        self.is_planar
    }
}

/// Global shape class of a membrane.
///
/// A planar membrane is a [`MembraneShape::Bicelle`] only when some of its
/// pivots join into a loop around the membrane's edge (or around a pore).
/// Scattered pivots, such as the corners of a finite flat patch, leave it
/// [`MembraneShape::Planar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembraneShape {
    Planar,
    Curved,
    Vesicle,
    Bicelle,
}

impl std::fmt::Display for MembraneShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MembraneShape::Planar => write!(f, "planar"),
            MembraneShape::Curved => write!(f, "curved"),
            MembraneShape::Vesicle => write!(f, "vesicle"),
            MembraneShape::Bicelle => write!(f, "bicelle"),
        }
    }
}

/// A bilayer: exactly two leaflets.
///
/// Leaflet 0 is the upper leaflet of an open membrane, or the outer leaflet
/// of a closed one. Pivot particles (bicelle rim) are reported by both
/// leaflets and listed once in [`Membrane::pivots`].
#[derive(Debug, Clone, PartialEq)]
pub struct Membrane {
    pub(crate) leaflets: [Leaflet; 2],
    pub(crate) aggregates: Vec<usize>,
    pub(crate) pivots: Vec<usize>,
    pub(crate) closed: bool,
    pub(crate) has_rim: bool,
}

impl Membrane {
    /// Number of leaflets, always 2.
    #[inline]
    pub fn len(&self) -> usize {
        self.leaflets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn leaflets(&self) -> &[Leaflet; 2] {
        &self.leaflets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Leaflet> {
        self.leaflets.iter()
    }

    /// Indices into [`Snapshot::aggregates`] this membrane was built from.
    ///
    /// One entry for a split aggregate, two for a paired pair of monolayers.
    #[inline]
    pub fn aggregates(&self) -> &[usize] {
        &self.aggregates
    }

    #[inline]
    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// `true` if a connected group of pivots closes around its own centre.
    #[inline]
    pub fn has_rim(&self) -> bool {
        self.has_rim
    }

    /// `true` iff every leaflet is planar.
    pub fn is_planar(&self) -> bool {
        self.leaflets.iter().all(Leaflet::is_planar)
    }

    /// Total number of distinct particles in the membrane.
    pub fn particle_count(&self) -> usize {
        self.leaflets[0].size() + self.leaflets[1].size() - self.pivots.len()
    }

    pub fn shape(&self) -> MembraneShape {
        match (self.is_planar(), self.has_rim, self.closed) {
            (true, true, _) => MembraneShape::Bicelle,
            (true, false, _) => MembraneShape::Planar,
            (false, _, true) => MembraneShape::Vesicle,
            (false, _, false) => MembraneShape::Curved,
        }
    }
}

impl std::ops::Index<usize> for Membrane {
    type Output = Leaflet;

    fn index(&self, index: usize) -> &Leaflet {
        &self.leaflets[index]
    }
}

impl<'a> IntoIterator for &'a Membrane {
    type Item = &'a Leaflet;
    type IntoIter = std::slice::Iter<'a, Leaflet>;

    fn into_iter(self) -> Self::IntoIter {
        self.leaflets.iter()
    }
}

/// Result of identifying one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub(crate) frame: Frame,
    pub(crate) aggregates: Vec<Aggregate>,
    pub(crate) membranes: Vec<Membrane>,
}

impl Snapshot {
    /// The frame this snapshot was identified from.
    #[inline]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    #[inline]
    pub fn aggregates(&self) -> &[Aggregate] {
        &self.aggregates
    }

    #[inline]
    pub fn membranes(&self) -> &[Membrane] {
        &self.membranes
    }

    #[inline]
    pub fn particle_count(&self) -> usize {
        self.frame.particle_count()
    }

    /// Index of the aggregate containing `particle`.
    pub fn aggregate_of(&self, particle: usize) -> Option<usize> {
        self.aggregates.iter().position(|a| a.contains(particle))
    }

    /// The membrane built from aggregate `aggregate`, if any.
    pub fn membrane_of(&self, aggregate: usize) -> Option<&Membrane> {
        self.membranes
            .iter()
            .find(|m| m.aggregates.contains(&aggregate))
    }

    /// `(membrane, leaflet)` positions holding `particle`.
    ///
    /// A pivot particle yields its first leaflet.
    pub fn leaflet_of(&self, particle: usize) -> Option<(usize, usize)> {
        self.membranes.iter().enumerate().find_map(|(m, membrane)| {
            membrane
                .iter()
                .position(|leaflet| leaflet.contains(particle))
                .map(|l| (m, l))
        })
    }
}
