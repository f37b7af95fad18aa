//! Decoded PCM sample buffers.

use crate::error::{Error, Result};
use serde::Serialize;

/// Bytes per PCM sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SampleWidth {
    /// Unsigned 8-bit.
    U8,
    /// Signed 16-bit.
    I16,
    /// Signed 32-bit.
    I32,
}

impl SampleWidth {
    /// Size of one sample in bytes.
    pub fn bytes(&self) -> usize {
        match self {
            SampleWidth::U8 => 1,
            SampleWidth::I16 => 2,
            SampleWidth::I32 => 4,
        }
    }
}

impl TryFrom<usize> for SampleWidth {
    type Error = Error;

    fn try_from(bytes: usize) -> Result<Self> {
        match bytes {
            1 => Ok(SampleWidth::U8),
            2 => Ok(SampleWidth::I16),
            4 => Ok(SampleWidth::I32),
            other => Err(Error::UnsupportedFormat(format!(
                "sample width of {other} bytes"
            ))),
        }
    }
}

/// Samples stored at their native width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PcmSamples {
    U8(Vec<u8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
}

impl PcmSamples {
    pub fn len(&self) -> usize {
        match self {
            PcmSamples::U8(s) => s.len(),
            PcmSamples::I16(s) => s.len(),
            PcmSamples::I32(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn width(&self) -> SampleWidth {
        match self {
            PcmSamples::U8(_) => SampleWidth::U8,
            PcmSamples::I16(_) => SampleWidth::I16,
            PcmSamples::I32(_) => SampleWidth::I32,
        }
    }
}

/// Interleaved PCM audio with its stream parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPcm {
    channels: u16,
    sample_rate: u32,
    samples: PcmSamples,
}

impl AudioPcm {
    /// Wrap decoded samples.
    pub fn new(channels: u16, sample_rate: u32, samples: PcmSamples) -> Result<Self> {
        if channels == 0 {
            return Err(Error::UnsupportedFormat("zero audio channels".to_string()));
        }
        if samples.len() % channels as usize != 0 {
            return Err(Error::Format(format!(
                "{} samples do not divide into {channels} channels",
                samples.len()
            )));
        }
        Ok(Self {
            channels,
            sample_rate,
            samples,
        })
    }

    /// Decode little-endian PCM bytes of the given sample width.
    pub fn from_le_bytes(
        bytes: &[u8],
        sample_width: usize,
        channels: u16,
        sample_rate: u32,
    ) -> Result<Self> {
        let width = SampleWidth::try_from(sample_width)?;
        if bytes.len() % width.bytes() != 0 {
            return Err(Error::Format(format!(
                "{} bytes is not a whole number of {}-byte samples",
                bytes.len(),
                width.bytes()
            )));
        }

        let samples = match width {
            SampleWidth::U8 => PcmSamples::U8(bytes.to_vec()),
            SampleWidth::I16 => PcmSamples::I16(
                bytes
                    .chunks_exact(2)
                    .map(|b| i16::from_le_bytes([b[0], b[1]]))
                    .collect(),
            ),
            SampleWidth::I32 => PcmSamples::I32(
                bytes
                    .chunks_exact(4)
                    .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect(),
            ),
        };
        Self::new(channels, sample_rate, samples)
    }

    /// Encode back to little-endian PCM bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match &self.samples {
            PcmSamples::U8(s) => s.clone(),
            PcmSamples::I16(s) => s.iter().flat_map(|v| v.to_le_bytes()).collect(),
            PcmSamples::I32(s) => s.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &PcmSamples {
        &self.samples
    }

    /// Frames (one sample per channel).
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds, or 0 for an unknown sample rate.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// A copy of this stream carrying different samples of the same width.
    pub(crate) fn with_samples(&self, samples: PcmSamples) -> Self {
        debug_assert_eq!(samples.width(), self.samples.width());
        Self {
            channels: self.channels,
            sample_rate: self.sample_rate,
            samples,
        }
    }
}
