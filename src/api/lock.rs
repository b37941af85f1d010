// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Named Mutual Exclusion
//!
//! Capability seam for the platform's named exclusive lock (Web Locks,
//! file locks, ...). Hosts without a cross-process lock fall back to
//! [`InProcessLock`], which only excludes callers within one process.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Held lock; dropping it releases the name.
pub trait LockGuard: Send {}

/// Named exclusive lock provider.
pub trait LockProvider: Send + Sync {
    /// Attempts to acquire the named lock without waiting.
    ///
    /// `None` means another holder owns the name right now; callers must
    /// not queue.
    fn try_acquire(&self, name: &str) -> Option<Box<dyn LockGuard>>;
}

/// In-process fallback lock.
///
/// Weaker than a platform named lock: two separate processes syncing the
/// same account are not excluded. The merge rules keep that safe, but
/// multi-process hosts should supply a real platform lock.
#[derive(Default)]
pub struct InProcessLock {
    held: Arc<Mutex<HashSet<String>>>,
}

impl InProcessLock {
    /// Creates a lock provider with no names held.
    pub fn new() -> Self {
        Self::default()
    }
}

struct InProcessGuard {
    held: Arc<Mutex<HashSet<String>>>,
    name: String,
}

impl LockGuard for InProcessGuard {}

impl Drop for InProcessGuard {
    fn drop(&mut self) {
        let mut held = self.held.lock().expect("lock set mutex poisoned");
        held.remove(&self.name);
    }
}

impl LockProvider for InProcessLock {
    fn try_acquire(&self, name: &str) -> Option<Box<dyn LockGuard>> {
        let mut held = self.held.lock().expect("lock set mutex poisoned");
        if !held.insert(name.to_string()) {
            return None;
        }
        Some(Box::new(InProcessGuard {
            held: Arc::clone(&self.held),
            name: name.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_while_held() {
        let lock = InProcessLock::new();
        let guard = lock.try_acquire("sync").unwrap();
        assert!(lock.try_acquire("sync").is_none());
        drop(guard);
        assert!(lock.try_acquire("sync").is_some());
    }

    #[test]
    fn test_names_are_independent() {
        let lock = InProcessLock::new();
        let _a = lock.try_acquire("a").unwrap();
        assert!(lock.try_acquire("b").is_some());
    }
}
