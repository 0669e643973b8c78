//! Error types for oxicc

use thiserror::Error;

use crate::icc::IccError;

/// Result type for oxicc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in oxicc operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A required input was empty or missing
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The profile container was rejected
    #[error(transparent)]
    Icc(#[from] IccError),

    /// A named profile or device could not be resolved
    #[error("Not found: {0}")]
    NotFound(String),

    /// The profile is not of the requested ICC version
    #[error("Profile version {found} filtered out")]
    VersionFiltered { found: u8 },

    /// A rank map could not be read
    #[error("Rank map error: {0}")]
    RankMap(String),

    /// JSON parse or write error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
