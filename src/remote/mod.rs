// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Remote Blob Store
//!
//! Wire types and the transport seam for the server-side blob store. The
//! server sees only `{ id, ciphertext, iv, version }` and cannot
//! distinguish blob types. Implementations: [`MockRemoteStore`] for tests
//! and an HTTP-backed [`HttpRemoteStore`] behind the `network` feature;
//! hosts with their own networking stack inject a [`RemoteStore`] of their
//! own.

#[cfg(feature = "network")]
mod http;
mod mock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "network")]
pub use http::{HttpRemoteStore, RemoteConfig};
pub use mock::{MockRemoteStore, RecordedRequest};

/// Remote store error types.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Bearer token rejected (401). Drives the refresh-and-retry path.
    #[error("Authentication rejected by server")]
    Unauthorized,

    /// Non-success HTTP status other than 401.
    #[error("HTTP error: {0}")]
    Http(u16),

    /// Transport failure after bounded retries.
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the protocol shape.
    #[error("Invalid server response: {0}")]
    InvalidResponse(String),
}

/// The unit of sync as stored server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// Opaque identifier, 32 hex chars.
    pub id: String,
    /// AES-256-GCM ciphertext with tag, base64 on the wire.
    #[serde(with = "b64")]
    pub ciphertext: Vec<u8>,
    /// 96-bit IV, base64 on the wire.
    #[serde(with = "b64")]
    pub iv: Vec<u8>,
    /// Write version. Constant 1: the server always overwrites, and the
    /// merge rules compensate at the application layer.
    pub version: u32,
}

/// Response of `GET /auth/sync/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server-side timestamp of the most recent write.
    pub last_sync: u64,
}

/// Response of `GET /auth/sync?since=<cursor>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullResponse {
    /// Blobs changed since the cursor.
    pub blobs: Vec<Blob>,
    /// Server time the batch was produced at; becomes the new cursor.
    pub server_time: u64,
}

/// Response of `POST /auth/sync`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResponse {
    /// Opaque ids the server accepted.
    pub accepted: Vec<String>,
}

/// Blob store operations, bearer-token authenticated.
pub trait RemoteStore {
    /// Cheap staleness check.
    fn status(&self, token: &str) -> Result<StatusResponse, RemoteError>;

    /// Fetches all blobs changed since the cursor.
    fn pull(&self, token: &str, since: u64) -> Result<PullResponse, RemoteError>;

    /// Submits fresh blobs.
    fn push(&self, token: &str, blobs: &[Blob]) -> Result<PushResponse, RemoteError>;
}

/// Base64 serde for blob byte fields.
mod b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD
            .decode(text.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_wire_shape() {
        let blob = Blob {
            id: "aabb".into(),
            ciphertext: vec![1, 2, 3],
            iv: vec![4, 5, 6],
            version: 1,
        };
        let json = serde_json::to_value(&blob).unwrap();
        assert_eq!(json["id"], "aabb");
        assert_eq!(json["ciphertext"], "AQID");
        assert_eq!(json["iv"], "BAUG");
        assert_eq!(json["version"], 1);

        let back: Blob = serde_json::from_value(json).unwrap();
        assert_eq!(back, blob);
    }

    #[test]
    fn test_blob_rejects_invalid_base64() {
        let json = serde_json::json!({
            "id": "aabb", "ciphertext": "not base64!!", "iv": "BAUG", "version": 1
        });
        assert!(serde_json::from_value::<Blob>(json).is_err());
    }
}
