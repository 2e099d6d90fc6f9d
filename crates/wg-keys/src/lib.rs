//! Curve25519 key pairs for WireGuard registration.
//!
//! Private keys never appear in `Debug` output; the only way to get the
//! secret material out is [`PrivateKey::to_base64`], which exists solely so
//! the config emitter can write it into the final file.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::rngs::OsRng;
use std::fmt;
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};

/// Key parsing errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KeyError {
    #[error("invalid base64 encoding")]
    InvalidBase64,

    #[error("invalid key length (expected 32 bytes)")]
    InvalidLength,
}

fn decode32(s: &str) -> Result<[u8; 32], KeyError> {
    let bytes = BASE64.decode(s).map_err(|_| KeyError::InvalidBase64)?;
    let arr: [u8; 32] = bytes.try_into().map_err(|_| KeyError::InvalidLength)?;
    Ok(arr)
}

/// WireGuard client private key.
///
/// The inner `StaticSecret` zeroizes itself on drop.
#[derive(Clone)]
pub struct PrivateKey {
    secret: StaticSecret,
}

impl PrivateKey {
    /// Generate a fresh random private key.
    pub fn generate() -> Self {
        Self {
            secret: StaticSecret::random_from_rng(OsRng),
        }
    }

    /// Derive the matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            key: X25519Public::from(&self.secret),
        }
    }

    /// Encode the secret as base64 for the `PrivateKey =` config line.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.secret.to_bytes())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey([redacted])")
    }
}

/// WireGuard public key (ours or the server's).
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    key: X25519Public,
}

impl PublicKey {
    /// Parse a base64-encoded key, e.g. from a registration response.
    pub fn from_base64(s: &str) -> Result<Self, KeyError> {
        Ok(Self {
            key: X25519Public::from(decode32(s)?),
        })
    }

    /// Encode as base64.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.key.to_bytes())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}...)", &self.to_base64()[..8])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base64())
    }
}

/// A freshly generated key pair, one per endpoint registration.
#[derive(Clone)]
pub struct KeyPair {
    pub private: PrivateKey,
    pub public: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let private = PrivateKey::generate();
        let public = private.public_key();
        Self { private, public }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .finish()
    }
}
