//! Serializable summary of a [`Snapshot`].

use serde::{Deserialize, Serialize};

use crate::model::membrane::{Aggregate, Leaflet, Membrane, MembraneShape, Snapshot};

/// Everything `identify` found in one frame, in a flat JSON-friendly form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotReport {
    pub particle_count: usize,
    pub aggregates: Vec<AggregateReport>,
    pub membranes: Vec<MembraneReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub id: usize,
    pub size: usize,
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembraneReport {
    pub id: usize,
    /// Source aggregates, in leaflet order for paired monolayers.
    pub aggregates: Vec<usize>,
    pub shape: MembraneShape,
    pub closed: bool,
    pub planar: bool,
    pub pivots: Vec<usize>,
    pub leaflets: Vec<LeafletReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafletReport {
    pub size: usize,
    pub planar: bool,
    pub planarity: f64,
    pub rms_deviation: f64,
    pub centroid: [f64; 3],
    pub plane_normal: [f64; 3],
    pub indices: Vec<usize>,
}

impl SnapshotReport {
    /// Number of leaflets over all membranes.
    pub fn leaflet_count(&self) -> usize {
        self.membranes.iter().map(|m| m.leaflets.len()).sum()
    }
}

impl From<&Snapshot> for SnapshotReport {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            particle_count: snapshot.particle_count(),
            aggregates: snapshot
                .aggregates()
                .iter()
                .enumerate()
                .map(|(id, a)| AggregateReport::new(id, a))
                .collect(),
            membranes: snapshot
                .membranes()
                .iter()
                .enumerate()
                .map(|(id, m)| MembraneReport::new(id, m))
                .collect(),
        }
    }
}

impl AggregateReport {
    fn new(id: usize, aggregate: &Aggregate) -> Self {
        Self {
            id,
            size: aggregate.size(),
            indices: aggregate.indices().to_vec(),
        }
    }
}

impl MembraneReport {
    fn new(id: usize, membrane: &Membrane) -> Self {
        Self {
            id,
            aggregates: membrane.aggregates().to_vec(),
            shape: membrane.shape(),
            closed: membrane.is_closed(),
            planar: membrane.is_planar(),
            pivots: membrane.pivots().to_vec(),
            leaflets: membrane.iter().map(LeafletReport::from).collect(),
        }
    }
}

impl From<&Leaflet> for LeafletReport {
    fn from(leaflet: &Leaflet) -> Self {
        Self {
            size: leaflet.size(),
            planar: leaflet.is_planar(),
            planarity: leaflet.planarity(),
            rms_deviation: leaflet.rms_deviation(),
            centroid: leaflet.centroid(),
            plane_normal: leaflet.plane_normal(),
            indices: leaflet.indices().to_vec(),
        }
    }
}
