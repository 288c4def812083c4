//! Error types for membrane identification.
//!
//! Only invalid input is an error. Aggregates that cannot be split into two
//! leaflets are a normal outcome and show up as a missing membrane.

use thiserror::Error;

/// Errors that can occur while identifying membranes in a frame.
#[derive(Debug, Error)]
pub enum Error {
    /// The neighbor cutoff is zero, negative, or not finite.
    #[error("neighbor cutoff must be a positive finite distance (got {0})")]
    InvalidCutoff(f64),

    /// The simulation box cannot be used for minimum-image distances.
    #[error("invalid simulation box: {detail}")]
    InvalidBox {
        /// Description of the problem.
        detail: String,
    },

    /// A particle coordinate is NaN or infinite.
    #[error("particle {index} has a non-finite coordinate")]
    NonFinitePosition {
        /// Offending particle index.
        index: usize,
    },

    /// A tuning parameter is out of its valid range.
    #[error("invalid value for '{name}': {detail}")]
    InvalidParameter {
        /// Configuration field name.
        name: &'static str,
        /// Description of the problem.
        detail: String,
    },

    /// Failed to parse a configuration file.
    #[error("failed to parse identification settings: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The frame contains no particles and empty frames are not accepted.
    #[error("frame is empty: at least one particle is required")]
    EmptyFrame,
}

impl Error {
    /// Creates an [`InvalidBox`](Error::InvalidBox) error.
    pub fn invalid_box(detail: impl Into<String>) -> Self {
        Self::InvalidBox {
            detail: detail.into(),
        }
    }

    /// Creates an [`InvalidParameter`](Error::InvalidParameter) error.
    ///
    /// # Arguments
    ///
    /// * `name`: Configuration field name
    /// * `detail`: Description of the accepted range
    pub fn invalid_parameter(name: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            detail: detail.into(),
        }
    }
}
