// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Blob Mapper
//!
//! Bidirectional association between logical item identifiers and their
//! server-visible opaque identifiers. Recomputed from the master key; the
//! cache carries a key fingerprint so a stale mapping is structurally
//! detectable rather than relying on manual invalidation.

use std::collections::HashMap;

use crate::crypto::{derive_opaque_id, MasterKey};

/// Logical id of the not-yet-consumed ticket set.
pub const TICKETS_ACTIVE: &str = "tickets-active";
/// Logical id of the consumed ticket set.
pub const TICKETS_ARCHIVE: &str = "tickets-archive";

/// Preference keys that participate in sync.
///
/// Keys absent from this list (including ones written by newer client
/// versions) are simply never mapped, so their blobs are skipped on pull.
pub const SYNCED_PREFERENCE_KEYS: &[&str] = &[
    "theme",
    "default-model",
    "sidebar-collapsed",
    "send-on-enter",
];

/// Returns every logical id this client version knows how to sync.
pub fn known_logical_ids() -> impl Iterator<Item = &'static str> {
    [TICKETS_ACTIVE, TICKETS_ARCHIVE]
        .into_iter()
        .chain(SYNCED_PREFERENCE_KEYS.iter().copied())
}

/// Cached opaque-id mapping for one master key.
#[derive(Clone)]
pub struct BlobMapper {
    by_opaque: HashMap<String, &'static str>,
    by_logical: HashMap<&'static str, String>,
    fingerprint: [u8; 32],
}

impl BlobMapper {
    /// Builds the mapping for every known logical id.
    pub fn build(master: &MasterKey) -> Self {
        let mut by_opaque = HashMap::new();
        let mut by_logical = HashMap::new();
        for logical in known_logical_ids() {
            let opaque = derive_opaque_id(master, logical);
            by_opaque.insert(opaque.clone(), logical);
            by_logical.insert(logical, opaque);
        }
        BlobMapper {
            by_opaque,
            by_logical,
            fingerprint: master.fingerprint(),
        }
    }

    /// True if this mapping was built from the given master key.
    pub fn is_current(&self, master: &MasterKey) -> bool {
        self.fingerprint == master.fingerprint()
    }

    /// Resolves a server-visible opaque id back to its logical id.
    ///
    /// `None` means the blob is unknown to this client version and should
    /// be skipped, not treated as an error.
    pub fn logical_id(&self, opaque_id: &str) -> Option<&'static str> {
        self.by_opaque.get(opaque_id).copied()
    }

    /// Returns the opaque id for a known logical id.
    pub fn opaque_id(&self, logical_id: &str) -> Option<&str> {
        self.by_logical.get(logical_id).map(String::as_str)
    }

    /// Number of mapped items.
    pub fn len(&self) -> usize {
        self.by_opaque.len()
    }

    /// True if the mapping is empty (never the case after `build`).
    pub fn is_empty(&self) -> bool {
        self.by_opaque.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn master() -> MasterKey {
        MasterKey::from_bytes(vec![5u8; 32])
    }

    #[test]
    fn test_build_maps_every_known_id() {
        let mapper = BlobMapper::build(&master());
        assert_eq!(mapper.len(), 2 + SYNCED_PREFERENCE_KEYS.len());
        for logical in known_logical_ids() {
            let opaque = mapper.opaque_id(logical).unwrap().to_string();
            assert_eq!(mapper.logical_id(&opaque), Some(logical));
        }
    }

    #[test]
    fn test_unknown_opaque_id_resolves_to_none() {
        let mapper = BlobMapper::build(&master());
        assert_eq!(mapper.logical_id("00000000000000000000000000000000"), None);
    }

    #[test]
    fn test_mapping_tracks_master_key() {
        let mapper = BlobMapper::build(&master());
        assert!(mapper.is_current(&master()));

        let other = MasterKey::from_bytes(vec![6u8; 32]);
        assert!(!mapper.is_current(&other));

        // Same logical ids, different key: opaque ids must not collide
        let other_mapper = BlobMapper::build(&other);
        assert_ne!(
            mapper.opaque_id(TICKETS_ACTIVE),
            other_mapper.opaque_id(TICKETS_ACTIVE)
        );
    }
}
