//! Error types for assembly and conversion.

use ertm_decode::DecodeError;
use thiserror::Error;

/// Errors produced while loading, assembling or exporting resources.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to decode {name}: {source}")]
    Decode { name: String, source: DecodeError },

    #[error("I/O error on {name}: {source}")]
    Io {
        name: String,
        source: std::io::Error,
    },

    #[error("{name} (referenced by {referrer}) was not found")]
    MissingDependency { name: String, referrer: String },

    #[error("cyclic reference: {}", chain.join(" -> "))]
    CyclicReference { chain: Vec<String> },

    #[error("{name} is nested deeper than {limit} levels")]
    DepthExceeded { name: String, limit: usize },

    #[error("{name} produced no geometry")]
    NoGeometry { name: String },

    #[error("{name} is not a supported resource file")]
    UnsupportedFile { name: String },
}

impl Error {
    pub(crate) fn decode(name: &str, source: DecodeError) -> Self {
        Self::Decode {
            name: name.to_owned(),
            source,
        }
    }

    pub(crate) fn io(name: &str, source: std::io::Error) -> Self {
        Self::Io {
            name: name.to_owned(),
            source,
        }
    }
}

/// Result type for high-level operations.
pub type Result<T> = std::result::Result<T, Error>;
