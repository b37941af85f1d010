// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync Configuration

/// Configuration for sync triggers and behavior.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Delay after a local mutation before a debounced sync fires
    /// (milliseconds). Coalesces bursts of local writes into one
    /// network round trip.
    pub debounce_ms: u64,
    /// Interval between cheap remote status checks (milliseconds).
    pub status_poll_interval_ms: u64,
    /// Safety-net interval after which a full sync runs even if no
    /// trigger fired (milliseconds).
    pub full_sync_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            debounce_ms: 2_000,
            status_poll_interval_ms: 60_000,
            full_sync_interval_ms: 15 * 60_000,
        }
    }
}
