// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Opaque Identifier and Item Key Derivation
//!
//! Derives everything the sync protocol needs from the master key:
//! server-visible opaque identifiers (keyed one-way, uncorrelatable without
//! the master key) and a unique 256-bit AES key per logical item, so
//! compromise of one item's key does not expose the others.

use ring::hmac;
use zeroize::Zeroize;

use super::encryption::SymmetricKey;
use super::kdf::HKDF;

/// Domain-separation salt for opaque identifier derivation.
const OPAQUE_ID_SALT: &[u8] = b"Valise_Opaque_Id_v1";
/// Domain-separation salt for per-item key derivation.
const ITEM_KEY_SALT: &[u8] = b"Valise_Item_Key_v1";
/// Domain-separation info for the mapper cache fingerprint.
const FINGERPRINT_INFO: &[u8] = b"Valise_Mapper_Fingerprint_v1";

/// Opaque identifiers are HMAC output truncated to 16 bytes (32 hex chars).
const OPAQUE_ID_BYTES: usize = 16;

/// Root symmetric secret for a logged-in session.
///
/// Supplied by the account layer at login. All per-item keys and opaque
/// identifiers derive from it; losing it makes existing server blobs
/// permanently unrecoverable, by design. Zeroized on drop.
#[derive(Clone)]
pub struct MasterKey {
    bytes: Vec<u8>,
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't expose key bytes in debug output
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl MasterKey {
    /// Creates a master key from raw secret bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        MasterKey { bytes }
    }

    /// Returns a reference to the raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Stable fingerprint used to key caches derived from this master key.
    ///
    /// Not a secret-revealing value: it is itself an HKDF output and cannot
    /// be inverted to the master key.
    pub fn fingerprint(&self) -> [u8; 32] {
        HKDF::derive_key(None, &self.bytes, FINGERPRINT_INFO)
    }
}

/// Derives the server-visible opaque identifier for a logical item.
///
/// HMAC-SHA256 keyed by the master key over the salted logical id,
/// truncated to 16 bytes and hex-encoded. Deterministic across devices
/// holding the same master key; one-way for everyone else.
pub fn derive_opaque_id(master: &MasterKey, logical_id: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, master.as_bytes());
    let mut message = Vec::with_capacity(OPAQUE_ID_SALT.len() + logical_id.len());
    message.extend_from_slice(OPAQUE_ID_SALT);
    message.extend_from_slice(logical_id.as_bytes());
    let tag = hmac::sign(&key, &message);
    hex::encode(&tag.as_ref()[..OPAQUE_ID_BYTES])
}

/// Derives the 256-bit AES key for a logical item.
///
/// HKDF-SHA256 with a fixed application salt and the logical id as info.
pub fn derive_item_key(master: &MasterKey, logical_id: &str) -> SymmetricKey {
    let bytes = HKDF::derive_key(Some(ITEM_KEY_SALT), master.as_bytes(), logical_id.as_bytes());
    SymmetricKey::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn master() -> MasterKey {
        MasterKey::from_bytes(vec![42u8; 32])
    }

    #[test]
    fn test_opaque_id_deterministic() {
        assert_eq!(
            derive_opaque_id(&master(), "tickets-active"),
            derive_opaque_id(&master(), "tickets-active")
        );
    }

    #[test]
    fn test_opaque_id_shape() {
        let id = derive_opaque_id(&master(), "tickets-active");
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_opaque_ids_unrelated_per_logical_id() {
        let a = derive_opaque_id(&master(), "tickets-active");
        let b = derive_opaque_id(&master(), "tickets-archive");
        assert_ne!(a, b);
    }

    #[test]
    fn test_opaque_id_differs_per_master_key() {
        let other = MasterKey::from_bytes(vec![43u8; 32]);
        assert_ne!(
            derive_opaque_id(&master(), "tickets-active"),
            derive_opaque_id(&other, "tickets-active")
        );
    }

    #[test]
    fn test_item_keys_unique_per_logical_id() {
        let a = derive_item_key(&master(), "tickets-active");
        let b = derive_item_key(&master(), "theme");
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_item_key_deterministic_across_instances() {
        let m1 = MasterKey::from_bytes(vec![9u8; 16]);
        let m2 = MasterKey::from_bytes(vec![9u8; 16]);
        assert_eq!(
            derive_item_key(&m1, "theme").as_bytes(),
            derive_item_key(&m2, "theme").as_bytes()
        );
    }

    #[test]
    fn test_fingerprint_tracks_master_key() {
        let other = MasterKey::from_bytes(vec![1u8; 32]);
        assert_eq!(master().fingerprint(), master().fingerprint());
        assert_ne!(master().fingerprint(), other.fingerprint());
    }
}
