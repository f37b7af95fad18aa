//! Cryptographic operations for the encrypted tier.
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption
//! - PBKDF2-HMAC-SHA256 cipher keys and SHA-256 position seeds

mod cipher;
mod kdf;

pub use cipher::{Cipher, CIPHER_OVERHEAD, NONCE_SIZE, TAG_SIZE};
pub use kdf::{DerivedKeys, KeyDerivation};
