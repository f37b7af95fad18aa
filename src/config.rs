//! Configuration constants and types for the codecs.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sentinel appended to text payloads in sequential raster mode.
pub const MESSAGE_DELIMITER: &str = "###";

/// Sentinel appended to text payloads hidden in audio.
pub const AUDIO_DELIMITER: &str = "###END_OF_MESSAGE###";

/// Width of the big-endian length prefix, in bits.
pub const LENGTH_PREFIX_BITS: usize = 32;

/// Bytes of keyed check value appended to unencrypted keyed payloads.
pub const CHECK_BYTES: usize = 4;

/// Password-based key derivation parameters.
pub mod kdf_params {
    /// PBKDF2-HMAC-SHA256 iteration count.
    pub const ITERATIONS: u32 = 480_000;

    /// Lowest iteration count accepted by [`super::CodecConfig::validate`].
    pub const MIN_ITERATIONS: u32 = 1_000;

    /// Output length in bytes (256 bits).
    pub const KEY_LENGTH: usize = 32;

    /// Fixed salt for text payload encryption keys.
    pub const MESSAGE_SALT: &[u8] = b"message_encryption_salt";

    /// Fixed salt for image payload encryption keys.
    pub const IMAGE_SALT: &[u8] = b"image_encryption_salt";

    /// Context appended to the passphrase before hashing it into a position seed.
    pub const POSITION_CONTEXT: &str = "_pixel";
}

/// Labels appended to a seed key to split it into independent position streams.
pub mod seed_labels {
    /// Positions holding the 32-bit length prefix.
    pub const LENGTH: &str = "_length";

    /// Positions holding image payload bytes.
    pub const DATA: &str = "_data";

    /// Domain separator for the keyed payload check.
    pub const CHECK: &str = "_check";
}

/// Transform-domain embedding parameters.
pub mod dct_params {
    /// Side of a transform block in samples.
    pub const BLOCK_SIZE: usize = 8;

    /// Row of the mid-band coefficient carrying the bit.
    pub const COEFF_ROW: usize = 4;

    /// Column of the mid-band coefficient carrying the bit.
    pub const COEFF_COL: usize = 3;

    /// Blocks reserved at the start of channel 0 for the dimension header.
    pub const METADATA_BLOCKS: usize = 1;

    /// Default coefficient magnitude forced on the first attempt.
    pub const DEFAULT_STRENGTH: f64 = 8.0;

    /// Default minimum magnitude the coefficient must keep after clipping.
    pub const DEFAULT_MARGIN: f64 = 1.0;

    /// How many times the strength is doubled before giving up on a block.
    pub const MAX_ATTEMPTS: usize = 10;
}

/// Tunable codec settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecConfig {
    /// PBKDF2 iteration count for the encrypted tier.
    pub kdf_iterations: u32,

    /// Initial coefficient magnitude for transform-domain embedding.
    pub dct_strength: f64,

    /// Minimum coefficient magnitude verified after rounding and clipping.
    pub dct_margin: f64,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: kdf_params::ITERATIONS,
            dct_strength: dct_params::DEFAULT_STRENGTH,
            dct_margin: dct_params::DEFAULT_MARGIN,
        }
    }
}

impl CodecConfig {
    /// Create a configuration with a custom iteration count.
    pub fn with_iterations(kdf_iterations: u32) -> Self {
        Self {
            kdf_iterations,
            ..Self::default()
        }
    }

    /// Load a JSON configuration file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CodecConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.kdf_iterations < kdf_params::MIN_ITERATIONS {
            return Err(Error::InvalidConfig(format!(
                "kdf_iterations must be at least {}",
                kdf_params::MIN_ITERATIONS
            )));
        }
        if !(self.dct_strength.is_finite() && self.dct_strength > 0.0) {
            return Err(Error::InvalidConfig(
                "dct_strength must be a positive number".to_string(),
            ));
        }
        if !(self.dct_margin.is_finite() && self.dct_margin >= 0.0) {
            return Err(Error::InvalidConfig(
                "dct_margin must be a non-negative number".to_string(),
            ));
        }
        if self.dct_margin >= self.dct_strength {
            return Err(Error::InvalidConfig(
                "dct_margin must be smaller than dct_strength".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = CodecConfig::default();
        assert_eq!(config.kdf_iterations, 480_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_low_iterations() {
        let config = CodecConfig::with_iterations(10);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_margin_above_strength() {
        let config = CodecConfig {
            dct_margin: 9.0,
            ..CodecConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"kdf_iterations": 2000, "dct_strength": 12.0, "dct_margin": 2.0}}"#
        )
        .unwrap();

        let config = CodecConfig::load(file.path()).unwrap();
        assert_eq!(config.kdf_iterations, 2000);
        assert_eq!(config.dct_strength, 12.0);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = CodecConfig::load(file.path());
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
