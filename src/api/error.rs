// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Error Types
//!
//! Unified error type for the Valise API layer. Failures surface through
//! the controller's return value (and the event channel); nothing is
//! thrown past the controller boundary uncaught.

use thiserror::Error;

use crate::crypto::EncryptionError;
use crate::remote::RemoteError;
use crate::storage::SettingsError;

/// Unified error type for Valise operations.
#[derive(Error, Debug)]
pub enum ValiseError {
    /// Cryptographic operation failed.
    #[error("encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    /// Local settings store failed.
    #[error("storage error: {0}")]
    Storage(#[from] SettingsError),

    /// Remote store call failed after retry/refresh exhaustion.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Token refresh failed, or the retried call was rejected again.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Invalid operation in current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Result type for Valise operations.
pub type ValiseResult<T> = Result<T, ValiseError>;
