use thiserror::Error;

use crate::identify::Error as IdentifyError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("malformed JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("invalid frame: {0}")]
    Identify(#[from] IdentifyError),
}
