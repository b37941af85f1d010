// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session Credentials
//!
//! The master key and access token for a logged-in session. Replaced
//! atomically on login and dropped on logout; the account layer that
//! produces them is out of scope.

use thiserror::Error;
use zeroize::Zeroize;

use crate::crypto::MasterKey;

/// Token refresh failure.
#[derive(Error, Debug)]
#[error("token refresh failed: {0}")]
pub struct RefreshError(pub String);

/// Supplies a fresh access token when the server rejects the current one.
pub trait TokenRefresher: Send + Sync {
    /// Obtains a new access token.
    fn refresh(&self) -> Result<String, RefreshError>;
}

/// Credentials for one logged-in session.
pub struct Credentials {
    master_key: MasterKey,
    access_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't expose secrets in debug output
        f.debug_struct("Credentials")
            .field("master_key", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.access_token.zeroize();
    }
}

impl Credentials {
    /// Creates credentials from the account layer's outputs.
    pub fn new(master_key: MasterKey, access_token: String) -> Self {
        Credentials {
            master_key,
            access_token,
        }
    }

    /// The session's master key.
    pub fn master_key(&self) -> &MasterKey {
        &self.master_key
    }

    /// The current access token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Replaces the access token after a refresh.
    pub fn set_access_token(&mut self, token: String) {
        self.access_token.zeroize();
        self.access_token = token;
    }
}
