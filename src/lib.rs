//! Pixelghost - keyed steganography for images and audio.
//!
//! Hides payloads in the low-order bits or DCT coefficients of in-memory
//! carriers so that only a holder of the key can recover them.
//!
//! # Features
//!
//! - **Three LSB tiers**: sequential, keyed pseudorandom, keyed + AES-256-GCM
//! - **Deterministic positions**: ChaCha20 partial Fisher-Yates seeded from the key
//! - **DCT image-in-image**: one bit per 8×8 block in the sign of a mid-band coefficient
//! - **Audio LSB**: 8, 16 and 32-bit PCM
//! - **Capacity reports**: pure functions of carrier shape, serializable to JSON
//!
//! # Architecture
//!
//! ```text
//! Payload → Encrypt (tier 3) → Frame (delimiter | length prefix) → Allocate positions → Write LSBs
//! ```
//!
//! # Example
//!
//! ```rust
//! use pixelghost::carrier::RasterImage;
//! use pixelghost::stego::{raster, PayloadKind, Scheme};
//!
//! let cover = RasterImage::filled(64, 64, 3, 128).unwrap();
//! let scheme = Scheme::keyed("correct horse", PayloadKind::Text).unwrap();
//!
//! let stego = raster::hide(&cover, b"meet at dawn", &scheme).unwrap();
//! let message = raster::reveal(&stego, &scheme).unwrap();
//! assert_eq!(message, b"meet at dawn");
//! ```

pub mod allocator;
pub mod capacity;
pub mod carrier;
pub mod config;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod stego;

pub use config::CodecConfig;
pub use error::{Error, Result};
pub use stego::{PayloadKind, Scheme, Tier};
