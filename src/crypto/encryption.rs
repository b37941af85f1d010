// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Symmetric Encryption (AES-256-GCM)
//!
//! Authenticated encryption of blob payloads with a detached IV, matching
//! the wire shape `{ ciphertext, iv }`. The ciphertext carries the GCM tag
//! appended; decryption fails closed on any tampering.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;
use zeroize::Zeroize;

use super::derive::{derive_item_key, MasterKey};
use crate::payload::Payload;

/// IV size for AES-256-GCM (96 bits = 12 bytes).
pub const IV_SIZE: usize = 12;
/// Authentication tag size (16 bytes).
const TAG_SIZE: usize = 16;

/// Encryption error types.
#[derive(Error, Debug)]
pub enum EncryptionError {
    #[error("Encryption failed")]
    EncryptionFailed,
    #[error("Decryption failed: data may be corrupted or wrong key")]
    DecryptionFailed,
    #[error("Ciphertext too short")]
    CiphertextTooShort,
    #[error("IV must be {IV_SIZE} bytes")]
    InvalidIv,
    #[error("Payload is not valid JSON: {0}")]
    PayloadInvalid(String),
}

/// 256-bit symmetric encryption key.
#[derive(Clone)]
pub struct SymmetricKey {
    bytes: [u8; 32],
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't expose key bytes in debug output
        f.debug_struct("SymmetricKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl SymmetricKey {
    /// Generates a new random symmetric key.
    pub fn generate() -> Self {
        let rng = SystemRandom::new();
        let key = ring::rand::generate::<[u8; 32]>(&rng)
            .expect("System RNG should not fail")
            .expose();
        SymmetricKey { bytes: key }
    }

    /// Creates a key from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        SymmetricKey { bytes }
    }

    /// Returns a reference to the key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

/// Ciphertext plus its detached IV, as stored server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    /// AES-256-GCM ciphertext with the 16-byte tag appended.
    pub ciphertext: Vec<u8>,
    /// 96-bit IV, freshly random per encryption.
    pub iv: Vec<u8>,
}

/// Encrypts raw bytes under a symmetric key with a fresh random IV.
pub fn seal(key: &SymmetricKey, plaintext: &[u8]) -> Result<EncryptedBlob, EncryptionError> {
    let rng = SystemRandom::new();

    // IVs must never repeat for the same key, so each call draws a fresh
    // random nonce rather than sharing a counter across devices.
    let mut iv = [0u8; IV_SIZE];
    rng.fill(&mut iv)
        .map_err(|_| EncryptionError::EncryptionFailed)?;

    let unbound_key = UnboundKey::new(&AES_256_GCM, key.as_bytes())
        .map_err(|_| EncryptionError::EncryptionFailed)?;
    let sealing_key = LessSafeKey::new(unbound_key);

    let mut in_out = plaintext.to_vec();
    let nonce = Nonce::assume_unique_for_key(iv);
    sealing_key
        .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| EncryptionError::EncryptionFailed)?;

    Ok(EncryptedBlob {
        ciphertext: in_out,
        iv: iv.to_vec(),
    })
}

/// Decrypts raw bytes under a symmetric key with a detached IV.
pub fn open(key: &SymmetricKey, ciphertext: &[u8], iv: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    if ciphertext.len() < TAG_SIZE {
        return Err(EncryptionError::CiphertextTooShort);
    }
    let iv: [u8; IV_SIZE] = iv.try_into().map_err(|_| EncryptionError::InvalidIv)?;
    let nonce = Nonce::assume_unique_for_key(iv);

    let unbound_key = UnboundKey::new(&AES_256_GCM, key.as_bytes())
        .map_err(|_| EncryptionError::DecryptionFailed)?;
    let opening_key = LessSafeKey::new(unbound_key);

    let mut buffer = ciphertext.to_vec();
    let plaintext = opening_key
        .open_in_place(nonce, Aad::empty(), &mut buffer)
        .map_err(|_| EncryptionError::DecryptionFailed)?;

    Ok(plaintext.to_vec())
}

/// Encrypts a payload for one logical item.
///
/// Derives the per-item key from the master key, JSON-serializes the
/// payload, and seals it with a fresh IV. The payload's `type` and `key`
/// metadata travel inside the ciphertext, never outside.
pub fn encrypt_payload(
    master: &MasterKey,
    logical_id: &str,
    payload: &Payload,
) -> Result<EncryptedBlob, EncryptionError> {
    let key = derive_item_key(master, logical_id);
    let plaintext =
        serde_json::to_vec(payload).map_err(|e| EncryptionError::PayloadInvalid(e.to_string()))?;
    seal(&key, &plaintext)
}

/// Decrypts and parses a payload for one logical item.
///
/// Fails closed: a tampered ciphertext, a wrong IV, a key derived for a
/// different logical id, or unparseable plaintext all yield an error.
pub fn decrypt_payload(
    master: &MasterKey,
    logical_id: &str,
    ciphertext: &[u8],
    iv: &[u8],
) -> Result<Payload, EncryptionError> {
    let key = derive_item_key(master, logical_id);
    let plaintext = open(&key, ciphertext, iv)?;
    serde_json::from_slice(&plaintext).map_err(|e| EncryptionError::PayloadInvalid(e.to_string()))
}
