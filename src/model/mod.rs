//! Core data structures flowing through `membrane-topology`.
//!
//! - [`frame`] – Particle positions and the simulation box.
//! - [`membrane`] – Identification results: aggregates, leaflets, membranes.
//!
//! The input ([`Frame`]) is kept apart from the result ([`Snapshot`]); the
//! [`crate::identify`] pipeline turns one into the other without modifying
//! the positions.
//!
//! [`Frame`]: frame::Frame
//! [`Snapshot`]: membrane::Snapshot

pub mod frame;
pub mod membrane;
