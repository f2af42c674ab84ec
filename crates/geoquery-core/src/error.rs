//! Error types for GeoQuery

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoqueryError {
    // Query specification errors. These reject an evaluation attempt before
    // any work begins; an empty result is never one of these.
    #[error("No target layer selected")]
    MissingTargetLayer,

    #[error("Search value is blank")]
    BlankSearchValue,

    #[error("Buffer radius must be positive, got {radius}")]
    InvalidRadius { radius: f64 },

    #[error("Nearest count must be at least 1")]
    InvalidCount,

    #[error("Source geometry has no extent")]
    DegenerateSource,

    // Layer resolution errors
    #[error("Layer not found: {name}")]
    UnknownLayer { name: String },

    // Session errors
    #[error("Result index {index} out of range for {len} result(s)")]
    ResultIndexOutOfRange { index: usize, len: usize },

    #[error("No query result is currently presented")]
    NoActiveResult,

    #[error("Query requires a trigger point that has not been supplied")]
    MissingTriggerPoint,

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeoqueryError {
    /// True for errors caused by an ill-formed query specification, as
    /// opposed to an unresolvable layer or a session misuse. The
    /// presentation layer uses this to phrase the rejection.
    pub fn is_invalid_spec(&self) -> bool {
        matches!(
            self,
            GeoqueryError::MissingTargetLayer
                | GeoqueryError::BlankSearchValue
                | GeoqueryError::InvalidRadius { .. }
                | GeoqueryError::InvalidCount
                | GeoqueryError::DegenerateSource
        )
    }
}

pub type Result<T> = std::result::Result<T, GeoqueryError>;
