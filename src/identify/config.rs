//! Configuration for membrane identification.
//!
//! [`IdentifyConfig`] carries the neighbor cutoff and the thresholds used by
//! the leaflet splitter. Every field has a default, so a TOML file only needs
//! the values it changes:
//!
//! ```toml
//! cutoff = 2.0
//! planarity_threshold = 0.3
//! ```

use serde::{Deserialize, Serialize};

use super::error::Error;

/// Main configuration for [`identify`](super::identify).
///
/// # Examples
///
/// ```
/// use membrane_topology::IdentifyConfig;
///
/// let config = IdentifyConfig {
///     cutoff: 2.5,
///     pair_monolayers: true,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentifyConfig {
    /// Neighbor cutoff distance. Pairs at exactly this distance are neighbors.
    pub cutoff: f64,

    /// Largest RMS plane deviation, relative to the aggregate's characteristic
    /// size, for which a leaflet is still planar.
    pub planarity_threshold: f64,

    /// Aggregates smaller than this are never split.
    pub min_aggregate_size: usize,

    /// Neighbors required for a reliable local normal.
    pub min_normal_neighbors: usize,

    /// Offset from the local centroid, relative to the local spread, below
    /// which a particle cannot be assigned to a side.
    pub pivot_offset_band: f64,

    /// Minimum cosine between a particle's normal and the mean normal of its
    /// neighbors; particles below it sit on an edge.
    pub pivot_alignment: f64,

    /// Largest fraction of pivot particles an aggregate may have and still
    /// form a membrane.
    pub max_pivot_fraction: f64,

    /// Non-pivot particles required on each side of a split.
    pub min_leaflet_size: usize,

    /// Pair apposed single-sided aggregates into membranes.
    pub pair_monolayers: bool,

    /// Search distance for monolayer pairing; `None` means twice the cutoff.
    pub pairing_cutoff: Option<f64>,

    /// Fraction of each monolayer that must face the other one to pair them.
    pub pairing_min_fraction: f64,

    /// Accept frames without particles (producing an empty snapshot).
    pub allow_empty: bool,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            cutoff: 2.0,
            planarity_threshold: 0.25,
            min_aggregate_size: 3,
            min_normal_neighbors: 3,
            pivot_offset_band: 0.1,
            pivot_alignment: 0.5,
            max_pivot_fraction: 0.5,
            min_leaflet_size: 2,
            pair_monolayers: false,
            pairing_cutoff: None,
            pairing_min_fraction: 0.5,
            allow_empty: true,
        }
    }
}

impl IdentifyConfig {
    /// Default settings with the given cutoff.
    pub fn with_cutoff(cutoff: f64) -> Self {
        Self {
            cutoff,
            ..Default::default()
        }
    }

    /// Parses settings from TOML; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] for malformed TOML or unknown keys, and
    /// the errors of [`validate`](Self::validate) for out-of-range values.
    pub fn from_toml_str(toml: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the settings as TOML.
    pub fn to_toml_string(&self) -> String {
        // Plain scalars and options only; serialization cannot fail.
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Effective monolayer pairing distance.
    pub fn effective_pairing_cutoff(&self) -> f64 {
        self.pairing_cutoff.unwrap_or(2.0 * self.cutoff)
    }

    /// Checks every field against its valid range.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.cutoff.is_finite() && self.cutoff > 0.0) {
            return Err(Error::InvalidCutoff(self.cutoff));
        }
        if !(self.planarity_threshold.is_finite() && self.planarity_threshold >= 0.0) {
            return Err(Error::invalid_parameter(
                "planarity_threshold",
                "must be a non-negative finite number",
            ));
        }
        if self.min_aggregate_size < 2 {
            return Err(Error::invalid_parameter(
                "min_aggregate_size",
                "a membrane needs at least 2 particles",
            ));
        }
        if self.min_normal_neighbors < 2 {
            return Err(Error::invalid_parameter(
                "min_normal_neighbors",
                "a plane needs at least 2 neighbors besides the particle itself",
            ));
        }
        if !(self.pivot_offset_band.is_finite() && self.pivot_offset_band >= 0.0) {
            return Err(Error::invalid_parameter(
                "pivot_offset_band",
                "must be a non-negative finite number",
            ));
        }
        if !(-1.0..=1.0).contains(&self.pivot_alignment) {
            return Err(Error::invalid_parameter(
                "pivot_alignment",
                "must be a cosine in [-1, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.max_pivot_fraction) {
            return Err(Error::invalid_parameter(
                "max_pivot_fraction",
                "must be a fraction in [0, 1]",
            ));
        }
        if self.min_leaflet_size == 0 {
            return Err(Error::invalid_parameter(
                "min_leaflet_size",
                "must be at least 1",
            ));
        }
        if let Some(pairing) = self.pairing_cutoff {
            if !(pairing.is_finite() && pairing > 0.0) {
                return Err(Error::invalid_parameter(
                    "pairing_cutoff",
                    "must be a positive finite distance",
                ));
            }
        }
        if !(self.pairing_min_fraction > 0.0 && self.pairing_min_fraction <= 1.0) {
            return Err(Error::invalid_parameter(
                "pairing_min_fraction",
                "must be a fraction in (0, 1]",
            ));
        }
        Ok(())
    }
}
