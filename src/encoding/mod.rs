//! BitStream codec: payload framing and bit conversion.
//!
//! Two framing modes are supported:
//! - delimiter: a sentinel is appended and the decoder stops at its first occurrence
//! - length prefix: a 32-bit big-endian bit count stored apart from the payload

mod decoder;
mod encoder;

pub use decoder::{from_bits, read_length_prefix, DelimiterScanner};
pub use encoder::{delimit, length_prefix, to_bits, Framing};
