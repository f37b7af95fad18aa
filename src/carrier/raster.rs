//! Interleaved 8-bit raster images.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Width, height and channel count of a raster carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterShape {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl RasterShape {
    /// Create a shape, rejecting channel counts outside 1..=4.
    pub fn new(width: u32, height: u32, channels: u8) -> Result<Self> {
        if !(1..=4).contains(&channels) {
            return Err(Error::UnsupportedFormat(format!(
                "{channels} channels (expected 1 to 4)"
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
        })
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of interleaved samples.
    pub fn sample_count(&self) -> usize {
        self.pixel_count() * self.channels as usize
    }

    /// Channels that carry color (alpha excluded).
    pub fn color_channels(&self) -> usize {
        match self.channels {
            1 | 2 => 1,
            _ => 3,
        }
    }

    /// Whether the last channel is alpha.
    pub fn has_alpha(&self) -> bool {
        matches!(self.channels, 2 | 4)
    }

    /// Samples usable as LSB carrier units.
    pub fn color_sample_count(&self) -> usize {
        self.pixel_count() * self.color_channels()
    }
}

/// An image as a flat, row-major, channel-interleaved sample buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    shape: RasterShape,
    samples: Vec<u8>,
}

impl RasterImage {
    /// Wrap a sample buffer, checking it matches the declared shape.
    pub fn new(width: u32, height: u32, channels: u8, samples: Vec<u8>) -> Result<Self> {
        let shape = RasterShape::new(width, height, channels)?;
        if samples.len() != shape.sample_count() {
            return Err(Error::Format(format!(
                "{width}x{height}x{channels} image needs {} samples, got {}",
                shape.sample_count(),
                samples.len()
            )));
        }
        Ok(Self { shape, samples })
    }

    /// An image with every sample set to `value`.
    pub fn filled(width: u32, height: u32, channels: u8, value: u8) -> Result<Self> {
        let shape = RasterShape::new(width, height, channels)?;
        Ok(Self {
            shape,
            samples: vec![value; shape.sample_count()],
        })
    }

    pub fn shape(&self) -> RasterShape {
        self.shape
    }

    pub fn width(&self) -> u32 {
        self.shape.width
    }

    pub fn height(&self) -> u32 {
        self.shape.height
    }

    pub fn channels(&self) -> u8 {
        self.shape.channels
    }

    /// Raw interleaved samples.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Consume the image, returning its sample buffer.
    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    fn index(&self, x: u32, y: u32, channel: usize) -> usize {
        debug_assert!(x < self.width() && y < self.height());
        debug_assert!(channel < self.channels() as usize);
        (y as usize * self.width() as usize + x as usize) * self.channels() as usize + channel
    }

    /// Read one sample.
    pub fn get(&self, x: u32, y: u32, channel: usize) -> u8 {
        self.samples[self.index(x, y, channel)]
    }

    /// Write one sample.
    pub fn set(&mut self, x: u32, y: u32, channel: usize, value: u8) {
        let idx = self.index(x, y, channel);
        self.samples[idx] = value;
    }

    /// Color samples in carrier order, alpha skipped.
    pub fn color_samples(&self) -> Vec<u8> {
        if !self.shape.has_alpha() {
            return self.samples.clone();
        }
        let color = self.shape.color_channels();
        self.samples
            .chunks_exact(self.channels() as usize)
            .flat_map(|pixel| pixel[..color].iter().copied())
            .collect()
    }

    /// A copy of this image with its color samples replaced.
    pub fn with_color_samples(&self, color_samples: &[u8]) -> Result<Self> {
        if color_samples.len() != self.shape.color_sample_count() {
            return Err(Error::Format(format!(
                "expected {} color samples, got {}",
                self.shape.color_sample_count(),
                color_samples.len()
            )));
        }
        if !self.shape.has_alpha() {
            return Ok(Self {
                shape: self.shape,
                samples: color_samples.to_vec(),
            });
        }

        let color = self.shape.color_channels();
        let mut samples = self.samples.clone();
        for (pixel, src) in samples
            .chunks_exact_mut(self.channels() as usize)
            .zip(color_samples.chunks_exact(color))
        {
            pixel[..color].copy_from_slice(src);
        }
        Ok(Self {
            shape: self.shape,
            samples,
        })
    }

    /// Single-channel luma (BT.601) version; alpha is dropped.
    pub fn to_grayscale(&self) -> Self {
        let channels = self.channels() as usize;
        let samples = match self.shape.color_channels() {
            1 => self.samples.iter().step_by(channels).copied().collect(),
            _ => self
                .samples
                .chunks_exact(channels)
                .map(|p| {
                    let luma = 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64;
                    luma.round().clamp(0.0, 255.0) as u8
                })
                .collect(),
        };
        Self {
            shape: RasterShape {
                channels: 1,
                ..self.shape
            },
            samples,
        }
    }

    /// Three-channel version; gray is replicated and alpha is dropped.
    pub fn to_rgb(&self) -> Self {
        let channels = self.channels() as usize;
        let samples = match self.shape.color_channels() {
            1 => self
                .samples
                .iter()
                .step_by(channels)
                .flat_map(|&v| [v, v, v])
                .collect(),
            _ => self
                .samples
                .chunks_exact(channels)
                .flat_map(|p| [p[0], p[1], p[2]])
                .collect(),
        };
        Self {
            shape: RasterShape {
                channels: 3,
                ..self.shape
            },
            samples,
        }
    }

    /// Bilinear resample to the given size.
    pub fn resize(&self, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || self.width() == 0 || self.height() == 0 {
            return Err(Error::UnsupportedFormat(format!(
                "cannot resize {}x{} to {width}x{height}",
                self.width(),
                self.height()
            )));
        }
        if width == self.width() && height == self.height() {
            return Ok(self.clone());
        }

        let channels = self.channels() as usize;
        let scale_x = self.width() as f64 / width as f64;
        let scale_y = self.height() as f64 / height as f64;
        let max_x = (self.width() - 1) as f64;
        let max_y = (self.height() - 1) as f64;

        let mut out = Self::filled(width, height, self.channels(), 0)?;
        for y in 0..height {
            let sy = ((y as f64 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
            let y0 = sy.floor() as u32;
            let y1 = (y0 + 1).min(self.height() - 1);
            let fy = sy - y0 as f64;
            for x in 0..width {
                let sx = ((x as f64 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
                let x0 = sx.floor() as u32;
                let x1 = (x0 + 1).min(self.width() - 1);
                let fx = sx - x0 as f64;
                for c in 0..channels {
                    let top = self.get(x0, y0, c) as f64 * (1.0 - fx) + self.get(x1, y0, c) as f64 * fx;
                    let bottom =
                        self.get(x0, y1, c) as f64 * (1.0 - fx) + self.get(x1, y1, c) as f64 * fx;
                    let value = top * (1.0 - fy) + bottom * fy;
                    out.set(x, y, c, value.round().clamp(0.0, 255.0) as u8);
                }
            }
        }
        Ok(out)
    }
}
