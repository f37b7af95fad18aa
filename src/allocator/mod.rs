//! Position allocation for carrier samples.
//!
//! This module provides:
//! - Sequential and keyed pseudorandom position policies
//! - Exclusion sets so metadata and payload positions never overlap

mod positions;

pub use positions::{labeled_key, seed_from_key, PositionAllocator, PositionPolicy};
