//! # oxicc - ICC profile containers and device matching
//!
//! Reads and writes ICC profile containers, keeps their MD5 profile ID
//! correct and ranks profiles against the devices they were made for.
//!
//! ## Layers
//!
//! - [`icc`]: byte level header, tag table and tag type codecs
//! - [`Profile`]: a profile with lazily decoded tags and write back
//! - [`identity`]: profile ID computation and checks
//! - [`ProfileContext`]: search paths and the profile cache
//! - [`matching`]: device descriptors, rank maps and pattern matching
//! - [`settings`]: per device assignments and rank maps
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use oxicc_core::{Device, DeviceDescriptor, LoadFlags, ProfileContext};
//!
//! let ctx = ProfileContext::from_env();
//! let profile = ctx.from_file(Path::new("sRGB.icc"), LoadFlags::default())?;
//! println!("{:?} {}", profile.description(), profile.identity(false));
//!
//! let device = Device::new("monitor", "0").with_properties(
//!     DeviceDescriptor::new()
//!         .with("manufacturer", "EIZO")
//!         .with("model", "CG2420"),
//! );
//! let mut list = ctx.profiles(&[], LoadFlags::default());
//! let ranks = list.device_rank(&device, ctx.policy());
//! # Ok::<(), oxicc_core::Error>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod icc;
pub mod identity;
pub mod matching;
pub mod profile;
pub mod profiles;
pub mod settings;

pub use cache::ProfileContext;
pub use config::{LoadFlags, PROFILE_PATH_ENV, RankPolicy, SearchPaths};
pub use error::{Error, Result};
pub use icc::{
    ColorSpace, IccError, ProfileClass, ProfileVersion, RenderingIntent, SignatureKind, Tag,
    TagData, TagSignature, TagStatus, TypeSignature,
};
pub use identity::{IdCheck, ProfileId};
pub use matching::{
    Device, DeviceClassTable, DeviceDescriptor, RankMap, dict_match, match_device, match_pattern,
    rank_profile, select_profile,
};
pub use profile::{DeviceEmbedOptions, Profile};
pub use profiles::ProfileList;
pub use settings::{MemorySettings, SettingsStore};
