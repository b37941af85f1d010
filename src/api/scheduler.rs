// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Trigger Scheduling
//!
//! Host-driven decision logic for when to sync: a debounced sync after
//! local mutations, a cheap periodic status check, a fallback full-sync
//! timer, and a status check on visibility transitions. The scheduler
//! holds no threads and no clock; the host calls [`SyncScheduler::due`]
//! from its own tick with its own notion of now (milliseconds).

use super::config::SyncConfig;

/// What the host should do now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    /// Run a full pull/push sync.
    FullSync,
    /// Hit the cheap status endpoint; escalate to a full sync only when
    /// the server is ahead of the local cursor.
    StatusCheck,
}

/// Tracks trigger deadlines for one controller.
#[derive(Debug)]
pub struct SyncScheduler {
    config: SyncConfig,
    debounce_deadline: Option<u64>,
    next_status_check: u64,
    next_full_sync: u64,
    status_check_requested: bool,
}

impl SyncScheduler {
    /// Creates a scheduler with all timers starting at `now`.
    pub fn new(config: SyncConfig, now: u64) -> Self {
        SyncScheduler {
            next_status_check: now + config.status_poll_interval_ms,
            next_full_sync: now + config.full_sync_interval_ms,
            config,
            debounce_deadline: None,
            status_check_requested: false,
        }
    }

    /// Records a local mutation; restarts the debounce window so a burst
    /// of writes coalesces into one sync.
    pub fn note_local_change(&mut self, now: u64) {
        self.debounce_deadline = Some(now + self.config.debounce_ms);
    }

    /// Records the document/tab becoming visible.
    pub fn note_visibility_visible(&mut self) {
        self.status_check_requested = true;
    }

    /// Returns the action that is due, highest priority first.
    pub fn due(&self, now: u64) -> Option<TriggerAction> {
        if let Some(deadline) = self.debounce_deadline {
            if now >= deadline {
                return Some(TriggerAction::FullSync);
            }
        }
        if now >= self.next_full_sync {
            return Some(TriggerAction::FullSync);
        }
        if self.status_check_requested || now >= self.next_status_check {
            return Some(TriggerAction::StatusCheck);
        }
        None
    }

    /// Records a completed full sync; resets every timer.
    pub fn note_synced(&mut self, now: u64) {
        self.debounce_deadline = None;
        self.status_check_requested = false;
        self.next_full_sync = now + self.config.full_sync_interval_ms;
        self.next_status_check = now + self.config.status_poll_interval_ms;
    }

    /// Records a completed status check that did not escalate.
    pub fn note_status_checked(&mut self, now: u64) {
        self.status_check_requested = false;
        self.next_status_check = now + self.config.status_poll_interval_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SyncConfig {
        SyncConfig {
            debounce_ms: 100,
            status_poll_interval_ms: 1_000,
            full_sync_interval_ms: 10_000,
        }
    }

    #[test]
    fn test_idle_scheduler_has_nothing_due() {
        let scheduler = SyncScheduler::new(config(), 0);
        assert_eq!(scheduler.due(1), None);
    }

    #[test]
    fn test_local_change_debounces() {
        let mut scheduler = SyncScheduler::new(config(), 0);
        scheduler.note_local_change(0);
        assert_eq!(scheduler.due(50), None);
        assert_eq!(scheduler.due(100), Some(TriggerAction::FullSync));
    }

    #[test]
    fn test_burst_of_changes_coalesces() {
        let mut scheduler = SyncScheduler::new(config(), 0);
        scheduler.note_local_change(0);
        scheduler.note_local_change(90);
        // First deadline would have been 100; the burst pushed it out
        assert_eq!(scheduler.due(100), None);
        assert_eq!(scheduler.due(190), Some(TriggerAction::FullSync));

        scheduler.note_synced(190);
        assert_eq!(scheduler.due(200), None);
    }

    #[test]
    fn test_status_poll_interval() {
        let mut scheduler = SyncScheduler::new(config(), 0);
        assert_eq!(scheduler.due(999), None);
        assert_eq!(scheduler.due(1_000), Some(TriggerAction::StatusCheck));

        scheduler.note_status_checked(1_000);
        assert_eq!(scheduler.due(1_500), None);
        assert_eq!(scheduler.due(2_000), Some(TriggerAction::StatusCheck));
    }

    #[test]
    fn test_visibility_requests_status_check() {
        let mut scheduler = SyncScheduler::new(config(), 0);
        scheduler.note_visibility_visible();
        assert_eq!(scheduler.due(1), Some(TriggerAction::StatusCheck));
        scheduler.note_status_checked(1);
        assert_eq!(scheduler.due(2), None);
    }

    #[test]
    fn test_fallback_timer_fires_full_sync() {
        let mut scheduler = SyncScheduler::new(config(), 0);
        assert_eq!(scheduler.due(10_000), Some(TriggerAction::FullSync));
        scheduler.note_synced(10_000);
        assert_eq!(scheduler.due(10_001), None);
    }

    #[test]
    fn test_debounce_outranks_status_check() {
        let mut scheduler = SyncScheduler::new(config(), 0);
        scheduler.note_local_change(900);
        // At 1000 both the debounce and the status poll are due
        assert_eq!(scheduler.due(1_000), Some(TriggerAction::FullSync));
    }
}
