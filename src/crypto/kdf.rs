// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Key Derivation (HKDF-SHA256)
//!
//! Thin wrapper around `ring::hkdf` producing 256-bit keys with
//! domain-separated `info` strings.

use ring::hkdf::{Salt, HKDF_SHA256};

/// HKDF-SHA256 key derivation.
pub struct HKDF;

impl HKDF {
    /// Derives a 256-bit key from input keying material.
    ///
    /// `salt` defaults to an all-zero salt when `None` (RFC 5869 behavior).
    /// `info` provides domain separation between derived keys.
    pub fn derive_key(salt: Option<&[u8]>, ikm: &[u8], info: &[u8]) -> [u8; 32] {
        let salt = Salt::new(HKDF_SHA256, salt.unwrap_or(&[]));
        let prk = salt.extract(ikm);
        let info_parts = [info];
        let okm = prk
            .expand(&info_parts, HKDF_SHA256)
            .expect("HKDF-SHA256 expand with fixed-length output should not fail");

        let mut out = [0u8; 32];
        okm.fill(&mut out)
            .expect("HKDF-SHA256 fill of 32 bytes should not fail");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_deterministic() {
        let a = HKDF::derive_key(Some(b"salt"), b"ikm", b"info");
        let b = HKDF::derive_key(Some(b"salt"), b"ikm", b"info");
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_key_info_separates_domains() {
        let a = HKDF::derive_key(Some(b"salt"), b"ikm", b"info-a");
        let b = HKDF::derive_key(Some(b"salt"), b"ikm", b"info-b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_derive_key_none_salt_matches_empty_salt() {
        let a = HKDF::derive_key(None, b"ikm", b"info");
        let b = HKDF::derive_key(Some(&[]), b"ikm", b"info");
        assert_eq!(a, b);
    }
}
