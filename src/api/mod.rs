// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Valise API Layer
//!
//! The sync controller and its surroundings: unified error type,
//! lifecycle events, configuration, credentials, mutual exclusion, and
//! trigger scheduling.
//!
//! # Overview
//!
//! ```ignore
//! use std::sync::Arc;
//! use valise::{
//!     EventDispatcher, InProcessLock, MemorySettings, MockRemoteStore,
//!     SyncController,
//! };
//!
//! let store = MemorySettings::new();
//! let controller = SyncController::new(
//!     MockRemoteStore::new(),
//!     &store,
//!     Arc::new(EventDispatcher::new()),
//!     Box::new(InProcessLock::new()),
//! );
//! controller.set_credentials(master_key, access_token, None);
//! let outcome = controller.sync()?;
//! ```

#[cfg(feature = "testing")]
pub mod config;
#[cfg(not(feature = "testing"))]
mod config;

#[cfg(feature = "testing")]
pub mod controller;
#[cfg(not(feature = "testing"))]
mod controller;

#[cfg(feature = "testing")]
pub mod credentials;
#[cfg(not(feature = "testing"))]
mod credentials;

#[cfg(feature = "testing")]
pub mod error;
#[cfg(not(feature = "testing"))]
mod error;

#[cfg(feature = "testing")]
pub mod events;
#[cfg(not(feature = "testing"))]
mod events;

#[cfg(feature = "testing")]
pub mod lock;
#[cfg(not(feature = "testing"))]
mod lock;

#[cfg(feature = "testing")]
pub mod scheduler;
#[cfg(not(feature = "testing"))]
mod scheduler;

// Error types
pub use error::{ValiseError, ValiseResult};

// Configuration
pub use config::SyncConfig;

// Events
pub use events::{CallbackHandler, EventDispatcher, EventHandler, ValiseEvent};

// Credentials
pub use credentials::{Credentials, RefreshError, TokenRefresher};

// Mutual exclusion
pub use lock::{InProcessLock, LockGuard, LockProvider};

// Sync Controller
pub use controller::{SyncController, SyncOutcome, SyncReport};

// Trigger scheduling
pub use scheduler::{SyncScheduler, TriggerAction};
