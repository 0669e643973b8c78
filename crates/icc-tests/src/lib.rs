//! # icc-tests
//!
//! Scenario and parity tests for oxicc.
//!
//! This crate provides fixtures shared by the integration tests:
//! - handcrafted byte level profiles
//! - profiles written by lcms2
//! - device descriptions, rank maps and profiles embedding them
//! - temporary profile directories
//!
//! ## Reference Implementations
//!
//! - **lcms2**: writes real profiles and reads ours back
//! - **moxcms**: independent header parser

pub mod fixtures;

pub use fixtures::{
    ProfileDir, device, eizo_monitor, eizo_rank_map, minimal_profile, profile_for, read_only,
};
