//! Payload framing and byte-to-bit conversion.

use crate::config::LENGTH_PREFIX_BITS;
use crate::error::{Error, Result};

/// How a decoder finds the end of the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Framing {
    /// Payload bytes are followed by a sentinel sequence.
    Delimiter(Vec<u8>),
    /// A 32-bit big-endian bit count is stored in its own position subset.
    LengthPrefix,
}

impl Framing {
    /// Delimiter framing with the given sentinel.
    pub fn delimiter(sentinel: &str) -> Self {
        Framing::Delimiter(sentinel.as_bytes().to_vec())
    }

    /// Bits spent on framing, independent of the payload.
    pub fn overhead_bits(&self) -> usize {
        match self {
            Framing::Delimiter(sentinel) => sentinel.len() * 8,
            Framing::LengthPrefix => LENGTH_PREFIX_BITS,
        }
    }

    /// Total bits a payload of `payload_len` bytes occupies once framed.
    pub fn framed_bits(&self, payload_len: usize) -> usize {
        payload_len * 8 + self.overhead_bits()
    }
}

/// Convert bytes to bits, most significant bit first.
pub fn to_bits(bytes: &[u8]) -> Vec<bool> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1 == 1);
        }
    }
    bits
}

/// Append the sentinel to a payload.
///
/// Fails if the payload already contains the sentinel, since the decoder
/// would stop at the first occurrence.
pub fn delimit(payload: &[u8], sentinel: &[u8]) -> Result<Vec<u8>> {
    if sentinel.is_empty() {
        return Err(Error::InvalidFraming("empty delimiter".to_string()));
    }
    if payload.windows(sentinel.len()).any(|w| w == sentinel) {
        return Err(Error::InvalidFraming(
            "payload contains the delimiter sequence".to_string(),
        ));
    }
    let mut framed = Vec::with_capacity(payload.len() + sentinel.len());
    framed.extend_from_slice(payload);
    framed.extend_from_slice(sentinel);
    Ok(framed)
}

/// Encode a bit count as a 32-bit big-endian prefix.
pub fn length_prefix(bit_len: usize) -> Result<Vec<bool>> {
    if bit_len == 0 {
        return Err(Error::InvalidFraming("empty payload".to_string()));
    }
    let len = u32::try_from(bit_len)
        .map_err(|_| Error::InvalidFraming(format!("payload of {bit_len} bits overflows prefix")))?;
    Ok(to_bits(&len.to_be_bytes()))
}
