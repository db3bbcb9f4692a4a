//! # Two-Recipient Encryption Envelope
//!
//! Seals a print-file buffer for two independent key holders: the
//! originating organization and the destination supplier.
//!
//! ## Layout
//!
//! ```text
//! outer layer  ── key slots: [origin, destination]
//! │                body: Enc_SK(inner layer bytes)
//! └─ inner layer ── key slots: [origin]
//!                    body: Enc_SK(plaintext)
//! ```
//!
//! One ephemeral session key `SK` protects both layers. The destination
//! holder unwraps `SK` from the outer layer and a single [`open`] call
//! falls through the inner layer to the plaintext; the origin holder can do
//! the same, or peel one layer at a time with [`open_layer`] for audit.
//! `SK` is zeroized as soon as sealing completes.
//!
//! Each key slot wraps `SK` for one recipient: an ephemeral secp256k1 ECDH
//! agreement, a BLAKE3-derived wrapping key, and an XChaCha20-Poly1305 wrap
//! of the session key bytes.

use crate::errors::CryptoError;
use crate::keys::{RecipientKeyPair, RecipientPublicKey, FINGERPRINT_LEN};
use crate::symmetric::{self, Nonce, SessionKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};

/// Leading magic bytes of a serialized envelope layer.
pub const ENVELOPE_MAGIC: &[u8; 4] = b"PFE1";

/// Domain-separation context for session-key wrapping keys.
const KEY_WRAP_CONTEXT: &str = "print-file envelope key wrap v1";

/// One recipient's wrap of the session key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct KeySlot {
    /// Fingerprint of the recipient public key this slot is for.
    recipient: [u8; FINGERPRINT_LEN],
    /// SEC1 compressed ephemeral public key for the ECDH agreement.
    ephemeral_pub: Vec<u8>,
    /// Nonce for the session-key wrap.
    wrap_nonce: [u8; 24],
    /// Session key bytes under the derived wrapping key.
    wrapped_key: Vec<u8>,
}

/// One layer of a sealed envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeLayer {
    /// Session-key wraps, one per recipient of this layer.
    slots: Vec<KeySlot>,
    /// Nonce for the body cipher.
    body_nonce: [u8; 24],
    /// Body ciphertext.
    body: Vec<u8>,
}

impl EnvelopeLayer {
    /// Seal one layer for a set of recipients under a shared session key.
    fn seal_layer(
        plaintext: &[u8],
        recipients: &[&RecipientPublicKey],
        session: &SessionKey,
    ) -> Result<Self, CryptoError> {
        let (body, body_nonce) = symmetric::encrypt(session, plaintext)?;

        let mut slots = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            slots.push(wrap_session_key(session, recipient)?);
        }

        Ok(Self {
            slots,
            body_nonce: *body_nonce.as_bytes(),
            body,
        })
    }

    /// Serialize with the leading magic.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = ENVELOPE_MAGIC.to_vec();
        // Envelope layers are plain old data; serialization cannot fail.
        bytes.extend(bincode::serialize(self).unwrap_or_default());
        bytes
    }

    /// Parse a serialized layer.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::MalformedEnvelope` when the magic or framing
    /// does not match.
    pub fn parse(bytes: &[u8]) -> Result<Self, CryptoError> {
        let payload = bytes
            .strip_prefix(ENVELOPE_MAGIC.as_slice())
            .ok_or_else(|| CryptoError::MalformedEnvelope("missing magic".to_string()))?;
        bincode::deserialize(payload)
            .map_err(|e| CryptoError::MalformedEnvelope(e.to_string()))
    }

    /// Recover the session key using the holder's private key.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::NoMatchingRecipient` if no slot is addressed
    /// to the presented key pair.
    pub fn unwrap_session_key(&self, keypair: &RecipientKeyPair) -> Result<SessionKey, CryptoError> {
        let holder_pub = keypair.public_key();
        let fingerprint = holder_pub.fingerprint();

        let slot = self
            .slots
            .iter()
            .find(|slot| slot.recipient == fingerprint)
            .ok_or(CryptoError::NoMatchingRecipient)?;

        let ephemeral_pub = RecipientPublicKey::from_sec1_bytes(&slot.ephemeral_pub)?;
        let shared = k256::ecdh::diffie_hellman(
            keypair.as_k256().to_nonzero_scalar(),
            ephemeral_pub.as_k256().as_affine(),
        );
        let kek = derive_wrapping_key(
            shared.raw_secret_bytes().as_slice(),
            &slot.ephemeral_pub,
            &holder_pub.to_sec1_bytes(),
        );

        let key_bytes = symmetric::decrypt(
            &kek,
            &slot.wrapped_key,
            &Nonce::from_bytes(slot.wrap_nonce),
        )?;
        let key_bytes: [u8; 32] = key_bytes
            .try_into()
            .map_err(|_| CryptoError::MalformedEnvelope("bad session key length".to_string()))?;
        Ok(SessionKey::from_bytes(key_bytes))
    }

    /// Decrypt this layer's body with a session key.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::DecryptionFailed` on AEAD failure.
    pub fn open_body(&self, session: &SessionKey) -> Result<Vec<u8>, CryptoError> {
        symmetric::decrypt(session, &self.body, &Nonce::from_bytes(self.body_nonce))
    }

    /// Number of key slots on this layer.
    #[must_use]
    pub fn recipient_count(&self) -> usize {
        self.slots.len()
    }
}

/// Wrap a session key for one recipient.
fn wrap_session_key(
    session: &SessionKey,
    recipient: &RecipientPublicKey,
) -> Result<KeySlot, CryptoError> {
    let ephemeral = k256::ecdh::EphemeralSecret::random(&mut rand::rngs::OsRng);
    let ephemeral_pub_bytes = ephemeral
        .public_key()
        .to_encoded_point(true)
        .as_bytes()
        .to_vec();

    let shared = ephemeral.diffie_hellman(recipient.as_k256());
    let kek = derive_wrapping_key(
        shared.raw_secret_bytes().as_slice(),
        &ephemeral_pub_bytes,
        &recipient.to_sec1_bytes(),
    );

    let (wrapped_key, wrap_nonce) = symmetric::encrypt(&kek, session.as_bytes())?;

    Ok(KeySlot {
        recipient: recipient.fingerprint(),
        ephemeral_pub: ephemeral_pub_bytes,
        wrap_nonce: *wrap_nonce.as_bytes(),
        wrapped_key,
    })
}

/// Derive the key-wrapping key from an ECDH shared secret.
///
/// Binds both public points so a wrap cannot be replayed against a
/// different recipient.
fn derive_wrapping_key(shared: &[u8], ephemeral_pub: &[u8], recipient_pub: &[u8]) -> SessionKey {
    let mut hasher = blake3::Hasher::new_derive_key(KEY_WRAP_CONTEXT);
    hasher.update(shared);
    hasher.update(ephemeral_pub);
    hasher.update(recipient_pub);
    SessionKey::from_bytes(*hasher.finalize().as_bytes())
}

/// Seal plaintext for the originating organization and the destination
/// supplier.
///
/// The inner layer is wrapped for the origin only; the outer layer is
/// wrapped for origin and destination. The session key is ephemeral,
/// shared by both layers and zeroized when sealing returns.
///
/// # Errors
///
/// Returns `CryptoError::EncryptionFailed` if sealing fails or the sealed
/// artifact does not verify as encrypted.
pub fn seal(
    plaintext: &[u8],
    origin: &RecipientPublicKey,
    destination: &RecipientPublicKey,
) -> Result<Vec<u8>, CryptoError> {
    let session = SessionKey::generate();

    let inner = EnvelopeLayer::seal_layer(plaintext, &[origin], &session)?;
    let outer = EnvelopeLayer::seal_layer(&inner.to_bytes(), &[origin, destination], &session)?;
    let sealed = outer.to_bytes();

    // The artifact leaves the trust boundary as-is; refuse to hand back
    // anything that does not verify as a sealed envelope.
    if !is_sealed(&sealed) {
        return Err(CryptoError::EncryptionFailed(
            "sealed artifact failed verification".to_string(),
        ));
    }
    Ok(sealed)
}

/// Whether bytes verify as a sealed envelope (magic, framing, key slots).
#[must_use]
pub fn is_sealed(bytes: &[u8]) -> bool {
    match EnvelopeLayer::parse(bytes) {
        Ok(layer) => layer.recipient_count() > 0 && !layer.body.is_empty(),
        Err(_) => false,
    }
}

/// Recover the plaintext with either recipient's private key.
///
/// Unwraps the outer layer with the holder's key and falls through nested
/// layers, reusing the recovered session key where a layer carries no slot
/// for the holder.
///
/// # Errors
///
/// Returns `CryptoError::NoMatchingRecipient` when the outer layer has no
/// slot for the key, or a decryption/framing error for damaged envelopes.
pub fn open(bytes: &[u8], keypair: &RecipientKeyPair) -> Result<Vec<u8>, CryptoError> {
    let outer = EnvelopeLayer::parse(bytes)?;
    let mut session = outer.unwrap_session_key(keypair)?;
    let mut body = outer.open_body(&session)?;

    while let Ok(layer) = EnvelopeLayer::parse(&body) {
        if let Ok(inner_session) = layer.unwrap_session_key(keypair) {
            session = inner_session;
        }
        body = layer.open_body(&session)?;
    }
    Ok(body)
}

/// Peel exactly one layer, returning its decrypted body.
///
/// The audit path: the origin holder opens the outer layer to obtain the
/// inner envelope bytes, then opens the inner layer for the plaintext.
///
/// # Errors
///
/// As [`open`], for a single layer.
pub fn open_layer(bytes: &[u8], keypair: &RecipientKeyPair) -> Result<Vec<u8>, CryptoError> {
    let layer = EnvelopeLayer::parse(bytes)?;
    let session = layer.unwrap_session_key(keypair)?;
    layer.open_body(&session)
}
