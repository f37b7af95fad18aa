//! LSB embedding in PCM audio samples.
//!
//! One bit per sample, sequential positions, terminated by
//! `"###END_OF_MESSAGE###"`.

use crate::carrier::{AudioPcm, PcmSamples};
use crate::config::AUDIO_DELIMITER;
use crate::error::{Error, Result};
use crate::stego::scheme::Scheme;
use tracing::info;

fn scheme() -> Scheme {
    Scheme::with_delimiter(AUDIO_DELIMITER)
}

/// Hide a message in the audio samples. Returns a new stream.
pub fn hide(audio: &AudioPcm, message: &[u8]) -> Result<AudioPcm> {
    let scheme = scheme();
    let samples = match audio.samples() {
        PcmSamples::U8(s) => {
            let mut s = s.clone();
            scheme.embed(&mut s, message)?;
            PcmSamples::U8(s)
        }
        PcmSamples::I16(s) => {
            let mut s = s.clone();
            scheme.embed(&mut s, message)?;
            PcmSamples::I16(s)
        }
        PcmSamples::I32(s) => {
            let mut s = s.clone();
            scheme.embed(&mut s, message)?;
            PcmSamples::I32(s)
        }
    };
    info!(
        bytes = message.len(),
        sample_width = audio.samples().width().bytes(),
        "message hidden in audio"
    );
    Ok(audio.with_samples(samples))
}

/// Recover a message hidden with [`hide`].
pub fn reveal(audio: &AudioPcm) -> Result<Vec<u8>> {
    let scheme = scheme();
    let message = match audio.samples() {
        PcmSamples::U8(s) => scheme.extract(s),
        PcmSamples::I16(s) => scheme.extract(s),
        PcmSamples::I32(s) => scheme.extract(s),
    }
    .map_err(Error::conceal)?;
    info!(bytes = message.len(), "message revealed from audio");
    Ok(message)
}
