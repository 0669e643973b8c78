//! ICC Profile Container Format
//!
//! Byte level building blocks following ICC.1:2022.
//!
//! # Structure
//!
//! An ICC profile consists of:
//! 1. A 128-byte header
//! 2. A tag table: count, then 12 byte entries (signature, offset, size)
//! 3. Tag data (may overlap)
//!
//! Everything is big-endian. [`crate::Profile`] builds on these types.

pub mod header;
pub mod tag;
pub mod tags;

mod error;
mod types;

pub use error::IccError;
pub use header::{
    ColorSpace, FLAGS_OFFSET, HEADER_SIZE, INTENT_OFFSET, IccHeader, MIN_PROFILE_SIZE,
    PROFILE_ID_OFFSET, PROFILE_SIGNATURE, ProfileClass, ProfileVersion, RenderingIntent,
    SignatureKind,
};
pub use tag::{CmmIds, Tag, TagStatus};
pub use tags::TagData;
pub use types::{DateTimeNumber, S15Fixed16, TagSignature, TypeSignature, XyzNumber};

pub(crate) use types::{pad4, read_u32, write_u32};
