//! ICC Profile Error Types

use thiserror::Error;

use super::types::fourcc;

/// Structural errors that reject a profile container before any tag is read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IccError {
    /// Profile data is too small
    #[error("Profile too small: expected {expected} bytes, got {actual}")]
    TooSmall { expected: usize, actual: usize },

    /// Invalid profile signature (should be 'acsp')
    #[error("Invalid profile signature: '{}' (expected 'acsp')", fourcc(*.0))]
    InvalidSignature(u32),

    /// Profile size in header doesn't match data
    #[error("Size mismatch: header says {header_size} bytes, data is {actual_size} bytes")]
    SizeMismatch {
        header_size: u32,
        actual_size: usize,
    },

    /// Tag offset is out of bounds
    #[error(
        "Tag '{}' out of bounds: offset {offset} + size {size} > profile size {profile_size}",
        fourcc(*.tag)
    )]
    TagOutOfBounds {
        tag: u32,
        offset: u32,
        size: u32,
        profile_size: usize,
    },

    /// Corrupted or invalid data
    #[error("Corrupted data: {0}")]
    CorruptedData(String),
}

impl IccError {
    /// True for the errors that mean "bytes are there but are not a profile"
    pub fn is_corrupted(&self) -> bool {
        !matches!(self, Self::TooSmall { .. })
    }
}
