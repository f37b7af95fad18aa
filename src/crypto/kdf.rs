//! Passphrase key derivation.
//!
//! One passphrase yields two independent secrets:
//! - a position seed, `SHA-256(passphrase || "_pixel")`, used only to seed
//!   the position allocator
//! - a 256-bit cipher key, PBKDF2-HMAC-SHA256 over a fixed salt
//!
//! Both are pure functions of the passphrase so encoder and decoder agree
//! without storing anything in the carrier.

use crate::config::kdf_params;
use crate::error::{Error, Result};
use pbkdf2::pbkdf2_hmac;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

/// Secrets derived from one passphrase.
pub struct DerivedKeys {
    /// Seed for the position allocator.
    pub position_seed: [u8; 32],
    /// AES-256 key for the cipher layer.
    pub cipher_key: Zeroizing<[u8; kdf_params::KEY_LENGTH]>,
}

impl fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKeys").finish_non_exhaustive()
    }
}

/// Key derivation with a fixed salt and iteration count.
#[derive(Debug, Clone)]
pub struct KeyDerivation {
    salt: Vec<u8>,
    iterations: u32,
}

impl KeyDerivation {
    /// Create a KDF for the given salt and iteration count.
    pub fn new(salt: &[u8], iterations: u32) -> Self {
        Self {
            salt: salt.to_vec(),
            iterations,
        }
    }

    /// The salt in use.
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// Hash the passphrase with the position context into a seed.
    pub fn position_seed(passphrase: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(passphrase.as_bytes());
        hasher.update(kdf_params::POSITION_CONTEXT.as_bytes());
        hasher.finalize().into()
    }

    /// Derive a 256-bit cipher key from a passphrase.
    pub fn derive_cipher_key(
        &self,
        passphrase: &str,
    ) -> Result<Zeroizing<[u8; kdf_params::KEY_LENGTH]>> {
        if passphrase.is_empty() {
            return Err(Error::KeyDerivation("empty passphrase".to_string()));
        }
        if self.iterations == 0 {
            return Err(Error::KeyDerivation(
                "iteration count must be positive".to_string(),
            ));
        }

        let mut key = Zeroizing::new([0u8; kdf_params::KEY_LENGTH]);
        pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), &self.salt, self.iterations, &mut *key);
        Ok(key)
    }

    /// Derive both the position seed and the cipher key.
    pub fn derive(&self, passphrase: &str) -> Result<DerivedKeys> {
        let cipher_key = self.derive_cipher_key(passphrase)?;
        Ok(DerivedKeys {
            position_seed: Self::position_seed(passphrase),
            cipher_key,
        })
    }
}
