//! Embedding algorithms for each carrier substrate.
//!
//! This module provides:
//! - A generic LSB read/write primitive over `u8`, `i16` and `i32` samples
//! - [`Scheme`], composing position policy, framing and cipher per tier
//! - Raster, audio and DCT-domain codecs built on top of them

pub mod audio;
pub mod dct;
mod lsb;
pub mod raster;
mod scheme;
mod transform;

pub use lsb::LsbSample;
pub use scheme::{PayloadKind, Scheme, Tier};
