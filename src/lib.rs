//! Identification of lipid membranes in coarse-grained simulation frames.
//!
//! Each lipid is reduced to one reference point (typically its head group).
//! From these points the library builds a cutoff neighbor graph under
//! periodic boundary conditions, groups the lipids into aggregates, estimates
//! local surface normals, and splits every bilayer-shaped aggregate into two
//! leaflets.
//!
//! # Features
//!
//! - **Periodic boxes**: Orthorhombic and triclinic boxes with per-axis
//!   periodicity, using minimum-image distances throughout
//! - **Leaflet assignment**: Orientation-consistent normals, outward for
//!   vesicles and upward for open bilayers, with shared rim (pivot) lipids
//!   for bicelles
//! - **Planarity**: Plane fit per leaflet with a configurable threshold
//! - **Monolayer pairing**: Optional pairing of apposed single leaflets when
//!   the cutoff is smaller than the bilayer thickness
//! - **JSON I/O**: Frames in, reports out
//!
//! # Quick Start
//!
//! ```
//! use membrane_topology::{Frame, IdentifyConfig, IdentifyError, SimBox, identify};
//!
//! // Two 6×6 lattices two units apart in a periodic box
//! let mut positions = Vec::new();
//! for z in [11.0, 9.0] {
//!     for i in 0..6 {
//!         for j in 0..6 {
//!             positions.push([i as f64, j as f64, z]);
//!         }
//!     }
//! }
//! let frame = Frame::new(positions, SimBox::orthorhombic([6.0, 6.0, 20.0]));
//!
//! let snapshot = identify(&frame, &IdentifyConfig::with_cutoff(2.5))?;
//!
//! assert_eq!(snapshot.aggregates().len(), 1);
//! assert_eq!(snapshot.membranes().len(), 1);
//!
//! let membrane = &snapshot.membranes()[0];
//! assert_eq!(membrane[0].size(), 36);
//! assert!(membrane[0].contains(0));
//! assert!(membrane[1].contains(36));
//! assert!(membrane.is_planar());
//! # Ok::<(), IdentifyError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`identify`]: Main identification function
//! - [`io`]: JSON frame input and report output
//! - [`IdentifyConfig`]: Cutoff and splitting thresholds
//!
//! # Data Types
//!
//! - [`Frame`]: Particle positions plus simulation box
//! - [`SimBox`]: Box vectors and per-axis periodicity
//! - [`Snapshot`]: Aggregates and membranes of one frame
//! - [`Aggregate`]: Connected component of the neighbor graph
//! - [`Membrane`]: Two leaflets, pivots, and shape
//! - [`Leaflet`]: Sorted particle indices with plane-fit statistics
//! - [`MembraneShape`]: Planar, curved, vesicle, or bicelle

mod identify;
mod model;

pub mod io;

pub use model::frame::{Frame, SimBox};
pub use model::membrane::{Aggregate, Leaflet, Membrane, MembraneShape, Snapshot};

pub use identify::{IdentifyConfig, identify};

pub use identify::Error as IdentifyError;
