//! Bit-to-byte conversion and frame validation.

use crate::config::LENGTH_PREFIX_BITS;
use crate::error::{Error, Result};

/// Pack bits (most significant first) into bytes.
///
/// A trailing group of fewer than 8 bits is dropped.
pub fn from_bits(bits: &[bool]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
        .collect()
}

/// Parse a 32-bit length prefix and check it against the remaining capacity.
///
/// The count is in bits and must be a positive multiple of 8 that fits in
/// `remaining` positions.
pub fn read_length_prefix(bits: &[bool], remaining: usize) -> Result<usize> {
    if bits.len() != LENGTH_PREFIX_BITS {
        return Err(Error::InvalidFraming(format!(
            "length prefix has {} bits, expected {}",
            bits.len(),
            LENGTH_PREFIX_BITS
        )));
    }
    let bytes = from_bits(bits);
    let len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;

    if len == 0 || len > remaining {
        return Err(Error::InvalidFraming(format!(
            "length {len} outside 1..={remaining}"
        )));
    }
    if len % 8 != 0 {
        return Err(Error::InvalidFraming(format!(
            "length {len} is not a whole number of bytes"
        )));
    }
    Ok(len)
}

/// Incremental scanner that stops at the first delimiter occurrence.
#[derive(Debug)]
pub struct DelimiterScanner<'a> {
    sentinel: &'a [u8],
    bytes: Vec<u8>,
    current: u8,
    filled: u8,
}

impl<'a> DelimiterScanner<'a> {
    /// Create a scanner for the given sentinel.
    pub fn new(sentinel: &'a [u8]) -> Self {
        Self {
            sentinel,
            bytes: Vec::new(),
            current: 0,
            filled: 0,
        }
    }

    /// Feed one bit. Returns `true` once the sentinel has been seen.
    pub fn push(&mut self, bit: bool) -> bool {
        self.current = (self.current << 1) | bit as u8;
        self.filled += 1;
        if self.filled < 8 {
            return false;
        }
        self.bytes.push(self.current);
        self.current = 0;
        self.filled = 0;
        !self.sentinel.is_empty() && self.bytes.ends_with(self.sentinel)
    }

    /// The payload preceding the sentinel, if the sentinel was found.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if self.sentinel.is_empty() || !self.bytes.ends_with(self.sentinel) {
            return Err(Error::NoPayload);
        }
        self.bytes.truncate(self.bytes.len() - self.sentinel.len());
        Ok(self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::encoder::{length_prefix, to_bits};

    #[test]
    fn test_from_bits_inverts_to_bits() {
        let data = b"Hello, World!";
        assert_eq!(from_bits(&to_bits(data)), data);
    }

    #[test]
    fn test_from_bits_drops_partial_byte() {
        let mut bits = to_bits(b"A");
        bits.extend_from_slice(&[true, true, true]);
        assert_eq!(from_bits(&bits), b"A");
    }

    #[test]
    fn test_read_length_prefix_valid() {
        let bits = length_prefix(80).unwrap();
        assert_eq!(read_length_prefix(&bits, 1000).unwrap(), 80);
    }

    #[test]
    fn test_read_length_prefix_exact_capacity() {
        let bits = length_prefix(96).unwrap();
        assert_eq!(read_length_prefix(&bits, 96).unwrap(), 96);
        assert!(read_length_prefix(&bits, 95).is_err());
    }

    #[test]
    fn test_read_length_prefix_rejects_zero() {
        let bits = vec![false; 32];
        assert!(matches!(
            read_length_prefix(&bits, 100),
            Err(Error::InvalidFraming(_))
        ));
    }

    #[test]
    fn test_read_length_prefix_rejects_partial_bytes() {
        let bits = length_prefix(13).unwrap();
        assert!(read_length_prefix(&bits, 100).is_err());
    }

    #[test]
    fn test_scanner_stops_at_delimiter() {
        let bits = to_bits(b"hello!!###garbage");
        let mut scanner = DelimiterScanner::new(b"###");
        let mut consumed = 0;
        for bit in bits {
            consumed += 1;
            if scanner.push(bit) {
                break;
            }
        }
        assert_eq!(consumed, 80);
        assert_eq!(scanner.finish().unwrap(), b"hello!!");
    }

    #[test]
    fn test_scanner_without_delimiter() {
        let mut scanner = DelimiterScanner::new(b"###");
        for bit in to_bits(b"no sentinel here") {
            assert!(!scanner.push(bit));
        }
        assert!(scanner.finish().unwrap_err().is_no_payload());
    }
}
