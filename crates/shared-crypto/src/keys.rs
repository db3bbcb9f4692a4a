//! # Recipient Key Material
//!
//! secp256k1 key pairs for envelope recipients, with hex key-file loading.
//!
//! Key files hold one hex string: the SEC1 compressed point (66 hex chars)
//! for public keys, the raw scalar (64 hex chars) for private keys.

use crate::CryptoError;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use std::path::Path;

/// Length in bytes of a SEC1 compressed secp256k1 point.
pub const COMPRESSED_POINT_LEN: usize = 33;

/// Length in bytes of a recipient fingerprint.
pub const FINGERPRINT_LEN: usize = 8;

/// A recipient's public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientPublicKey {
    inner: k256::PublicKey,
}

impl RecipientPublicKey {
    /// Parse from SEC1 bytes (compressed or uncompressed).
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKey` if the bytes are not a curve point.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        k256::PublicKey::from_sec1_bytes(bytes)
            .map(|inner| Self { inner })
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    /// Parse from a hex string.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKey` for non-hex input or a non-point.
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Self::from_sec1_bytes(&bytes)
    }

    /// Load from a key file containing the hex-encoded compressed point.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyFileUnreadable` for I/O failures and
    /// `CryptoError::InvalidKey` for bad contents.
    pub fn from_key_file(path: &Path) -> Result<Self, CryptoError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| CryptoError::KeyFileUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Self::from_hex(&contents)
    }

    /// SEC1 compressed encoding (33 bytes).
    #[must_use]
    pub fn to_sec1_bytes(&self) -> Vec<u8> {
        self.inner.to_encoded_point(true).as_bytes().to_vec()
    }

    /// Short identifier used to match key slots to key holders.
    #[must_use]
    pub fn fingerprint(&self) -> [u8; FINGERPRINT_LEN] {
        let digest = blake3::hash(&self.to_sec1_bytes());
        let mut fp = [0u8; FINGERPRINT_LEN];
        fp.copy_from_slice(&digest.as_bytes()[..FINGERPRINT_LEN]);
        fp
    }

    pub(crate) fn as_k256(&self) -> &k256::PublicKey {
        &self.inner
    }
}

/// A recipient's key pair (private key holder side).
#[derive(Clone)]
pub struct RecipientKeyPair {
    secret: k256::SecretKey,
}

impl RecipientKeyPair {
    /// Generate a fresh key pair.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            secret: k256::SecretKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Parse from the hex-encoded raw scalar.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKey` for non-hex input or an invalid
    /// scalar.
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        k256::SecretKey::from_slice(&bytes)
            .map(|secret| Self { secret })
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    /// Load from a key file containing the hex-encoded scalar.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyFileUnreadable` for I/O failures and
    /// `CryptoError::InvalidKey` for bad contents.
    pub fn from_key_file(path: &Path) -> Result<Self, CryptoError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| CryptoError::KeyFileUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Self::from_hex(&contents)
    }

    /// The public half of this key pair.
    #[must_use]
    pub fn public_key(&self) -> RecipientPublicKey {
        RecipientPublicKey {
            inner: self.secret.public_key(),
        }
    }

    /// Hex encoding of the raw scalar, for writing key files.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.secret.to_bytes())
    }

    pub(crate) fn as_k256(&self) -> &k256::SecretKey {
        &self.secret
    }
}
