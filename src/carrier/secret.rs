//! Serialized form of a secret image payload.
//!
//! Layout: ASCII `"{width},{height},{channels}:"` followed by the raw
//! interleaved samples.

use crate::carrier::raster::RasterImage;
use crate::error::{Error, Result};

const HEADER_SEPARATOR: u8 = b':';

/// Length of the ASCII header for the given shape.
pub fn header_len(width: u32, height: u32, channels: u8) -> usize {
    format!("{width},{height},{channels}:").len()
}

/// Serialize an image to header + samples.
pub fn serialize_image(image: &RasterImage) -> Vec<u8> {
    let header = format!("{},{},{}:", image.width(), image.height(), image.channels());
    let mut bytes = Vec::with_capacity(header.len() + image.samples().len());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(image.samples());
    bytes
}

/// Parse header + samples back into an image.
pub fn deserialize_image(bytes: &[u8]) -> Result<RasterImage> {
    let header_end = bytes
        .iter()
        .position(|&b| b == HEADER_SEPARATOR)
        .ok_or_else(|| Error::Format("missing header separator".to_string()))?;

    let header = std::str::from_utf8(&bytes[..header_end])
        .map_err(|_| Error::Format("header is not ASCII".to_string()))?;
    let fields: Vec<&str> = header.split(',').collect();
    if fields.len() != 3 {
        return Err(Error::Format(format!(
            "header has {} fields, expected 3",
            fields.len()
        )));
    }

    let parse = |field: &str, name: &str| -> Result<u32> {
        field
            .parse::<u32>()
            .map_err(|_| Error::Format(format!("invalid {name} {field:?}")))
    };
    let width = parse(fields[0], "width")?;
    let height = parse(fields[1], "height")?;
    let channels = u8::try_from(parse(fields[2], "channels")?)
        .map_err(|_| Error::Format("channel count out of range".to_string()))?;

    let samples = &bytes[header_end + 1..];
    let expected = width as u64 * height as u64 * channels as u64;
    if samples.len() as u64 != expected {
        return Err(Error::Format(format!(
            "{width}x{height}x{channels} image needs {expected} bytes, got {}",
            samples.len()
        )));
    }

    RasterImage::new(width, height, channels, samples.to_vec()).map_err(|e| match e {
        Error::UnsupportedFormat(msg) => Error::Format(msg),
        other => other,
    })
}
