//! Capacity reports for every carrier substrate.
//!
//! All functions are pure: they look at carrier shape only and never touch
//! sample data.

use crate::carrier::{header_len, AudioPcm, RasterShape};
use crate::config::{dct_params::BLOCK_SIZE, AUDIO_DELIMITER};
use crate::stego::dct::{fit_secret_dimensions, usable_blocks};
use crate::stego::{PayloadKind, Scheme, Tier};
use serde::Serialize;

/// Stream parameters echoed in audio reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioDetails {
    pub duration_seconds: f64,
    pub channels: u16,
    pub sample_rate: u32,
    pub sample_width: usize,
}

/// How much a carrier can hold.
///
/// `max_payload_units` is in bytes for text payloads and in pixels for
/// image payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityReport {
    pub cover_dimensions: String,
    pub total_units: u64,
    pub max_payload_units: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_square_dimensions: Option<String>,
    pub available_bits: u64,
    pub usable_bits: u64,
    pub overhead_bits: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_echo: Option<String>,
}

impl CapacityReport {
    fn new(cover_dimensions: String, total_units: u64, available_bits: u64, overhead_bits: u64) -> Self {
        Self {
            cover_dimensions,
            total_units,
            max_payload_units: 0,
            max_square_dimensions: None,
            available_bits,
            usable_bits: available_bits.saturating_sub(overhead_bits),
            overhead_bits,
            audio: None,
            key_echo: None,
        }
    }

    /// Attach the caller-supplied key label to the report.
    pub fn with_key_echo(mut self, key: impl Into<String>) -> Self {
        self.key_echo = Some(key.into());
        self
    }
}

fn dimensions(shape: &RasterShape) -> String {
    format!("{}x{}", shape.width, shape.height)
}

/// Text capacity of an LSB raster carrier.
pub fn raster_message(shape: &RasterShape, tier: Tier) -> CapacityReport {
    let units = shape.color_sample_count() as u64;
    let overhead = Scheme::overhead_for(tier, PayloadKind::Text) as u64;
    let mut report = CapacityReport::new(dimensions(shape), units, units, overhead);
    report.max_payload_units = report.usable_bits / 8;
    report
}

/// Secret-image capacity of an LSB raster carrier.
///
/// The secret is assumed to have as many color channels as the cover.
pub fn raster_image(shape: &RasterShape, tier: Tier) -> CapacityReport {
    let units = shape.color_sample_count() as u64;
    let overhead = Scheme::overhead_for(tier, PayloadKind::Image) as u64;
    let mut report = CapacityReport::new(dimensions(shape), units, units, overhead);

    let channels = shape.color_channels() as u8;
    let bytes = report.usable_bits / 8;
    let fits = |side: u64| {
        let side32 = u32::try_from(side).unwrap_or(u32::MAX);
        header_len(side32, side32, channels) as u64 + side * side * channels as u64 <= bytes
    };
    let mut side = ((bytes / channels as u64) as f64).sqrt() as u64;
    while side > 0 && !fits(side) {
        side -= 1;
    }
    let side32 = u32::try_from(side).unwrap_or(u32::MAX);
    let header = header_len(side32, side32, channels) as u64;

    report.max_payload_units = bytes.saturating_sub(header) / channels as u64;
    report.max_square_dimensions = Some(format!("{side}x{side}"));
    report
}

/// Secret-image capacity of the DCT embedder.
///
/// Bits are counted per block: one per usable block and color channel.
pub fn dct_image(shape: &RasterShape) -> CapacityReport {
    let channels = shape.color_channels() as u64;
    let full_blocks = (shape.width as u64 / BLOCK_SIZE as u64) * (shape.height as u64 / BLOCK_SIZE as u64);
    let usable = usable_blocks(shape) as u64;
    let mut report = CapacityReport::new(
        dimensions(shape),
        shape.pixel_count() as u64,
        full_blocks * channels,
        (full_blocks - usable) * channels,
    );

    report.max_payload_units = usable / 8;
    let side = fit_secret_dimensions(shape, 1, 1).map_or(0, |(w, _)| w);
    report.max_square_dimensions = Some(format!("{side}x{side}"));
    report
}

/// Text capacity of an audio carrier.
pub fn audio_message(audio: &AudioPcm) -> CapacityReport {
    let samples = audio.samples().len() as u64;
    let overhead = (AUDIO_DELIMITER.len() * 8) as u64;
    let mut report = CapacityReport::new(format!("{samples} samples"), samples, samples, overhead);
    report.max_payload_units = report.usable_bits / 8;
    report.audio = Some(AudioDetails {
        duration_seconds: audio.duration_seconds(),
        channels: audio.channels(),
        sample_rate: audio.sample_rate(),
        sample_width: audio.samples().width().bytes(),
    });
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::PcmSamples;

    #[test]
    fn test_raster_message_per_tier() {
        let shape = RasterShape::new(100, 100, 3).unwrap();

        let t1 = raster_message(&shape, Tier::Sequential);
        assert_eq!(t1.total_units, 30_000);
        assert_eq!(t1.usable_bits, 30_000 - 24);
        assert_eq!(t1.max_payload_units, 3747);

        let t2 = raster_message(&shape, Tier::Keyed);
        assert_eq!(t2.overhead_bits, 32 + 32);
        assert_eq!(t2.max_payload_units, 3742);

        let t3 = raster_message(&shape, Tier::Encrypted);
        assert_eq!(t3.overhead_bits, 32 + 224);
        assert_eq!(t3.max_payload_units, (30_000 - 256) / 8);
    }

    #[test]
    fn test_raster_ignores_alpha() {
        let rgba = RasterShape::new(10, 10, 4).unwrap();
        assert_eq!(raster_message(&rgba, Tier::Keyed).total_units, 300);
        let gray_alpha = RasterShape::new(10, 10, 2).unwrap();
        assert_eq!(raster_message(&gray_alpha, Tier::Keyed).total_units, 100);
    }

    #[test]
    fn test_raster_image_square() {
        let shape = RasterShape::new(100, 100, 3).unwrap();
        let report = raster_image(&shape, Tier::Keyed);
        // 3742 usable bytes: a 35x35 RGB secret needs 3675 + 8 header bytes.
        assert_eq!(report.max_square_dimensions.as_deref(), Some("35x35"));
        assert!(report.max_payload_units >= 35 * 35);
    }

    #[test]
    fn test_dct_report() {
        let shape = RasterShape::new(512, 512, 3).unwrap();
        let report = dct_image(&shape);
        assert_eq!(report.available_bits, 4096 * 3);
        assert_eq!(report.usable_bits, 4095 * 3);
        assert_eq!(report.max_square_dimensions.as_deref(), Some("16x16"));

        let tiny = dct_image(&RasterShape::new(4, 4, 1).unwrap());
        assert_eq!(tiny.usable_bits, 0);
        assert_eq!(tiny.max_square_dimensions.as_deref(), Some("0x0"));
    }

    #[test]
    fn test_audio_report() {
        let audio = AudioPcm::new(2, 8_000, PcmSamples::I16(vec![0; 16_000])).unwrap();
        let report = audio_message(&audio);
        assert_eq!(report.usable_bits, 16_000 - 160);
        assert_eq!(report.max_payload_units, (16_000 - 160) / 8);
        let details = report.audio.unwrap();
        assert_eq!(details.channels, 2);
        assert!((details.duration_seconds - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_shape() {
        let shape = RasterShape::new(20, 10, 1).unwrap();
        let json = serde_json::to_value(raster_message(&shape, Tier::Sequential)).unwrap();
        assert_eq!(json["cover_dimensions"], "20x10");
        assert!(json.get("key_echo").is_none());

        let json = serde_json::to_value(raster_message(&shape, Tier::Keyed).with_key_echo("k1")).unwrap();
        assert_eq!(json["key_echo"], "k1");
    }
}
