//! Error types for the steganography codecs.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while hiding or revealing a payload.
#[derive(Error, Debug)]
pub enum Error {
    /// The framed payload does not fit in the carrier.
    #[error("Payload exceeds carrier capacity: need {needed} bits, have {available} bits")]
    Capacity { needed: u64, available: u64 },

    /// Malformed length prefix or framing.
    #[error("Invalid framing: {0}")]
    InvalidFraming(String),

    /// Malformed serialized payload (e.g. secret image header).
    #[error("Malformed payload: {0}")]
    Format(String),

    /// Authenticated decryption failed (wrong key or corrupted data).
    #[error("Authentication failed: wrong key or corrupted data")]
    Authentication,

    /// Unexpected sample width, channel layout or carrier shape.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Key derivation error.
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Encryption error.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// A transform-domain bit could not be made to survive rounding.
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Decoding found nothing usable: wrong key, corrupted data or no hidden data.
    #[error("No valid payload found")]
    NoPayload,

    /// Invalid codec configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether this is the collapsed "nothing to reveal" outcome.
    pub fn is_no_payload(&self) -> bool {
        matches!(self, Error::NoPayload)
    }

    /// Collapse decode-side failures into [`Error::NoPayload`].
    ///
    /// Wrong key, corrupted carrier and absent payload must be
    /// indistinguishable to the caller. Precondition failures (capacity,
    /// unsupported carrier) pass through unchanged.
    pub(crate) fn conceal(self) -> Self {
        match self {
            Error::InvalidFraming(ref reason) | Error::Format(ref reason) => {
                tracing::debug!(%reason, "decode rejected");
                tracing::warn!("no valid payload found");
                Error::NoPayload
            }
            Error::Authentication => {
                tracing::debug!("decode rejected: authentication tag mismatch");
                tracing::warn!("no valid payload found");
                Error::NoPayload
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conceal_collapses_decode_failures() {
        assert!(Error::Authentication.conceal().is_no_payload());
        assert!(Error::InvalidFraming("bad length".into()).conceal().is_no_payload());
        assert!(Error::Format("no separator".into()).conceal().is_no_payload());
    }

    #[test]
    fn test_conceal_keeps_precondition_errors() {
        let err = Error::Capacity {
            needed: 10,
            available: 5,
        }
        .conceal();
        assert!(matches!(err, Error::Capacity { needed: 10, available: 5 }));

        let err = Error::UnsupportedFormat("sample width 3".into()).conceal();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }
}
