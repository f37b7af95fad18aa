//! In-memory carriers handed over by the media layer.
//!
//! Container decoding and encoding (PNG, WAV, ...) happen outside the crate;
//! codecs only ever see these flat sample buffers.

mod audio;
mod raster;
mod secret;

pub use audio::{AudioPcm, PcmSamples, SampleWidth};
pub use raster::{RasterImage, RasterShape};
pub use secret::{deserialize_image, header_len, serialize_image};
