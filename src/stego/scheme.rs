//! Security tiers composed from a position policy, a framing and an
//! optional cipher.
//!
//! | Tier        | Positions           | Framing                       | Cipher      |
//! |-------------|---------------------|-------------------------------|-------------|
//! | Sequential  | `0, 1, 2, ...`      | delimiter (text), prefix (image) | none     |
//! | Keyed       | keyed, sample order | 32-bit prefix                 | none        |
//! | Encrypted   | keyed, ascending    | 32-bit prefix                 | AES-256-GCM |
//!
//! Keyed payloads carry no cipher tag, so a 32-bit keyed check value is
//! appended to the body instead. A wrong key then fails extraction rather
//! than returning the bits it happened to read.

use crate::allocator::{labeled_key, PositionAllocator, PositionPolicy};
use crate::config::{
    kdf_params, seed_labels, CodecConfig, CHECK_BYTES, LENGTH_PREFIX_BITS, MESSAGE_DELIMITER,
};
use crate::crypto::{Cipher, KeyDerivation, CIPHER_OVERHEAD};
use crate::encoding::{delimit, from_bits, length_prefix, read_length_prefix, to_bits};
use crate::encoding::{DelimiterScanner, Framing};
use crate::error::{Error, Result};
use crate::stego::lsb::{self, LsbSample};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::debug;
use zeroize::Zeroizing;

/// Security level of an LSB embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Deterministic sequential positions.
    Sequential,
    /// Keyed pseudorandom positions.
    Keyed,
    /// Keyed pseudorandom positions over an encrypted payload.
    Encrypted,
}

impl Tier {
    /// Numeric level, 1 to 3.
    pub fn level(&self) -> u8 {
        match self {
            Tier::Sequential => 1,
            Tier::Keyed => 2,
            Tier::Encrypted => 3,
        }
    }

    /// Whether this tier needs a passphrase.
    pub fn is_keyed(&self) -> bool {
        !matches!(self, Tier::Sequential)
    }
}

impl TryFrom<u8> for Tier {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            1 => Ok(Tier::Sequential),
            2 => Ok(Tier::Keyed),
            3 => Ok(Tier::Encrypted),
            other => Err(Error::InvalidConfig(format!("unknown tier {other}"))),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Sequential => "sequential",
            Tier::Keyed => "keyed",
            Tier::Encrypted => "encrypted",
        };
        write!(f, "{name}")
    }
}

/// What the payload bytes represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadKind {
    /// A text message.
    Text,
    /// A serialized secret image.
    Image,
}

impl PayloadKind {
    fn cipher_salt(&self) -> &'static [u8] {
        match self {
            PayloadKind::Text => kdf_params::MESSAGE_SALT,
            PayloadKind::Image => kdf_params::IMAGE_SALT,
        }
    }

    fn body_label(&self) -> &'static str {
        match self {
            PayloadKind::Text => "",
            PayloadKind::Image => seed_labels::DATA,
        }
    }
}

/// A fully configured embedding strategy for one call.
///
/// Holds no carrier state: the same scheme can embed into or extract from
/// any number of carriers, from any thread.
pub struct Scheme {
    tier: Tier,
    kind: PayloadKind,
    allocator: PositionAllocator,
    framing: Framing,
    seed_key: Zeroizing<Vec<u8>>,
    cipher: Option<Cipher>,
}

impl fmt::Debug for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheme")
            .field("tier", &self.tier)
            .field("kind", &self.kind)
            .field("policy", &self.allocator.policy())
            .field("framing", &self.framing)
            .finish_non_exhaustive()
    }
}

impl Scheme {
    /// Tier 1: sequential positions.
    ///
    /// Text uses the `"###"` delimiter; images use a sequential length prefix.
    pub fn sequential(kind: PayloadKind) -> Self {
        let framing = match kind {
            PayloadKind::Text => Framing::delimiter(MESSAGE_DELIMITER),
            PayloadKind::Image => Framing::LengthPrefix,
        };
        Self {
            tier: Tier::Sequential,
            kind,
            allocator: PositionAllocator::new(PositionPolicy::Sequential),
            framing,
            seed_key: Zeroizing::new(Vec::new()),
            cipher: None,
        }
    }

    /// Tier 1 text with a custom delimiter.
    pub fn with_delimiter(sentinel: &str) -> Self {
        Self {
            framing: Framing::delimiter(sentinel),
            ..Self::sequential(PayloadKind::Text)
        }
    }

    /// Tier 2: positions drawn from the passphrase.
    pub fn keyed(passphrase: &str, kind: PayloadKind) -> Result<Self> {
        if passphrase.is_empty() {
            return Err(Error::KeyDerivation("empty passphrase".to_string()));
        }
        Ok(Self {
            tier: Tier::Keyed,
            kind,
            allocator: PositionAllocator::new(PositionPolicy::Keyed),
            framing: Framing::LengthPrefix,
            seed_key: Zeroizing::new(passphrase.as_bytes().to_vec()),
            cipher: None,
        })
    }

    /// Tier 3: derived position seed plus an authenticated cipher.
    pub fn encrypted(passphrase: &str, kind: PayloadKind, config: &CodecConfig) -> Result<Self> {
        let kdf = KeyDerivation::new(kind.cipher_salt(), config.kdf_iterations);
        let keys = kdf.derive(passphrase)?;
        Ok(Self {
            tier: Tier::Encrypted,
            kind,
            allocator: PositionAllocator::new(PositionPolicy::KeyedSorted),
            framing: Framing::LengthPrefix,
            seed_key: Zeroizing::new(keys.position_seed.to_vec()),
            cipher: Some(Cipher::new(&keys.cipher_key)),
        })
    }

    /// Build the scheme for a tier; keyed tiers require a passphrase.
    pub fn new(
        tier: Tier,
        passphrase: Option<&str>,
        kind: PayloadKind,
        config: &CodecConfig,
    ) -> Result<Self> {
        let require = || {
            passphrase.ok_or_else(|| {
                Error::KeyDerivation(format!("tier {} requires a passphrase", tier.level()))
            })
        };
        match tier {
            Tier::Sequential => Ok(Self::sequential(kind)),
            Tier::Keyed => Self::keyed(require()?, kind),
            Tier::Encrypted => Self::encrypted(require()?, kind, config),
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    pub fn framing(&self) -> &Framing {
        &self.framing
    }

    pub fn policy(&self) -> PositionPolicy {
        self.allocator.policy()
    }

    /// Bytes the cipher adds to every payload.
    pub fn cipher_overhead(&self) -> usize {
        if self.cipher.is_some() {
            CIPHER_OVERHEAD
        } else {
            0
        }
    }

    /// Bytes of keyed check value added to every payload.
    pub fn check_overhead(&self) -> usize {
        Self::check_bytes_for(self.tier)
    }

    fn check_bytes_for(tier: Tier) -> usize {
        match tier {
            Tier::Keyed => CHECK_BYTES,
            _ => 0,
        }
    }

    fn body_overhead(&self) -> usize {
        self.cipher_overhead() + self.check_overhead()
    }

    /// Bits spent on framing, checks and encryption, independent of payload size.
    pub fn overhead_bits(&self) -> usize {
        self.framing.overhead_bits() + self.body_overhead() * 8
    }

    /// Overhead of the standard scheme for a tier, without deriving keys.
    pub fn overhead_for(tier: Tier, kind: PayloadKind) -> usize {
        let framing = match (tier, kind) {
            (Tier::Sequential, PayloadKind::Text) => MESSAGE_DELIMITER.len() * 8,
            _ => LENGTH_PREFIX_BITS,
        };
        let body = match tier {
            Tier::Encrypted => CIPHER_OVERHEAD,
            _ => Self::check_bytes_for(tier),
        };
        framing + body * 8
    }

    /// Carrier units needed for a payload of `payload_len` bytes.
    pub fn framed_bits(&self, payload_len: usize) -> usize {
        self.framing.framed_bits(payload_len + self.body_overhead())
    }

    /// Largest payload, in bytes, that fits in `units` carrier units.
    pub fn max_payload_bytes(&self, units: usize) -> usize {
        units.saturating_sub(self.overhead_bits()) / 8
    }

    fn header_key(&self) -> Vec<u8> {
        labeled_key(&self.seed_key, seed_labels::LENGTH)
    }

    fn body_key(&self) -> Vec<u8> {
        labeled_key(&self.seed_key, self.kind.body_label())
    }

    /// Truncated `SHA-256(seed || "_check" || payload)`.
    fn check_value(&self, payload: &[u8]) -> [u8; CHECK_BYTES] {
        let mut hasher = Sha256::new();
        hasher.update(self.seed_key.as_slice());
        hasher.update(seed_labels::CHECK.as_bytes());
        hasher.update(payload);
        let digest = hasher.finalize();
        let mut check = [0u8; CHECK_BYTES];
        check.copy_from_slice(&digest[..CHECK_BYTES]);
        check
    }

    fn seal_body(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if let Some(cipher) = &self.cipher {
            return cipher.encrypt(payload);
        }
        if self.check_overhead() == 0 {
            return Ok(payload.to_vec());
        }
        if payload.is_empty() {
            return Err(Error::InvalidFraming("empty payload".to_string()));
        }
        let mut body = payload.to_vec();
        body.extend_from_slice(&self.check_value(payload));
        Ok(body)
    }

    fn open_body(&self, mut body: Vec<u8>) -> Result<Vec<u8>> {
        if let Some(cipher) = &self.cipher {
            return cipher.decrypt(&body);
        }
        if self.check_overhead() == 0 {
            return Ok(body);
        }
        if body.len() <= CHECK_BYTES {
            return Err(Error::InvalidFraming(format!(
                "body of {} bytes is too short for a check value",
                body.len()
            )));
        }
        let stored = body.split_off(body.len() - CHECK_BYTES);
        if stored != self.check_value(&body) {
            return Err(Error::InvalidFraming("keyed check mismatch".to_string()));
        }
        Ok(body)
    }

    /// Write a framed payload into the carrier samples.
    ///
    /// All validation happens before the first sample is modified.
    pub fn embed<S: LsbSample>(&self, samples: &mut [S], payload: &[u8]) -> Result<()> {
        let capacity = samples.len();

        match &self.framing {
            Framing::Delimiter(sentinel) => {
                let bits = to_bits(&delimit(payload, sentinel)?);
                if bits.len() > capacity {
                    return Err(Error::Capacity {
                        needed: bits.len() as u64,
                        available: capacity as u64,
                    });
                }
                let positions = self.allocator.generate(&[], capacity, bits.len(), &[])?;
                debug!(tier = %self.tier, bits = bits.len(), capacity, "embedding delimited payload");
                lsb::embed(samples, &bits, &positions);
            }
            Framing::LengthPrefix => {
                let body = self.seal_body(payload)?;
                let body_bits = to_bits(&body);
                let needed = LENGTH_PREFIX_BITS + body_bits.len();
                if needed > capacity {
                    return Err(Error::Capacity {
                        needed: needed as u64,
                        available: capacity as u64,
                    });
                }
                let header_bits = length_prefix(body_bits.len())?;

                let header_pos =
                    self.allocator
                        .generate(&self.header_key(), capacity, LENGTH_PREFIX_BITS, &[])?;
                let body_pos = self.allocator.generate(
                    &self.body_key(),
                    capacity,
                    body_bits.len(),
                    &header_pos,
                )?;

                debug!(
                    tier = %self.tier,
                    bits = needed,
                    capacity,
                    "embedding length-prefixed payload"
                );
                lsb::embed(samples, &header_bits, &header_pos);
                lsb::embed(samples, &body_bits, &body_pos);
            }
        }
        Ok(())
    }

    /// Read a framed payload back from carrier samples.
    ///
    /// Returns the specific failure (framing, check value, authentication); public
    /// codec entry points collapse these into [`Error::NoPayload`].
    pub fn extract<S: LsbSample>(&self, samples: &[S]) -> Result<Vec<u8>> {
        let capacity = samples.len();

        match &self.framing {
            Framing::Delimiter(sentinel) => {
                // Delimiter framing is only paired with sequential positions,
                // so the scan can stop as soon as the sentinel appears.
                let mut scanner = DelimiterScanner::new(sentinel);
                for sample in samples {
                    if scanner.push(sample.lsb()) {
                        break;
                    }
                }
                scanner.finish()
            }
            Framing::LengthPrefix => {
                if capacity < LENGTH_PREFIX_BITS {
                    return Err(Error::InvalidFraming(format!(
                        "carrier of {capacity} units cannot hold a length prefix"
                    )));
                }
                let header_pos =
                    self.allocator
                        .generate(&self.header_key(), capacity, LENGTH_PREFIX_BITS, &[])?;
                let header_bits = lsb::extract(samples, &header_pos);
                let body_len = read_length_prefix(&header_bits, capacity - LENGTH_PREFIX_BITS)?;

                let body_pos =
                    self.allocator
                        .generate(&self.body_key(), capacity, body_len, &header_pos)?;
                let body = from_bits(&lsb::extract(samples, &body_pos));
                debug!(tier = %self.tier, bits = body_len, capacity, "extracted length-prefixed payload");

                self.open_body(body)
            }
        }
    }
}
