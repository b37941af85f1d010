// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync Controller
//!
//! Orchestrates pull-then-push sync cycles against the remote blob store.
//! Pull always completes fully (and is persisted) before push begins, so a
//! push never re-uploads state that an unobserved remote write would
//! overwrite, and a push failure never discards already-merged pulled
//! data. Push re-encrypts the entire current local state rather than a
//! delta; that trades bandwidth for the absence of dirty-flag bookkeeping
//! and is a deliberate design choice.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, warn};

use crate::crypto::{decrypt_payload, encrypt_payload, MasterKey};
use crate::mapper::{BlobMapper, SYNCED_PREFERENCE_KEYS, TICKETS_ACTIVE, TICKETS_ARCHIVE};
use crate::merge::{merge_active, merge_archive, merge_preference, TicketState};
use crate::payload::{Payload, Ticket};
use crate::remote::{Blob, RemoteError, RemoteStore};
use crate::storage::{SettingsError, SettingsStore, LAST_SYNC_TIME};

use super::credentials::{Credentials, TokenRefresher};
use super::error::{ValiseError, ValiseResult};
use super::events::{EventDispatcher, ValiseEvent};
use super::lock::LockProvider;

/// Name of the exclusive lock serializing sync cycles.
const SYNC_LOCK: &str = "valise-sync";

/// Blob write version. Constant: the server always overwrites, and the
/// merge rules already make concurrent pushes safe.
const BLOB_VERSION: u32 = 1;

/// Result summary of one completed sync cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Blobs pulled, decrypted, and applied.
    pub pulled: usize,
    /// Pulled blobs skipped (unknown id or undecryptable).
    pub skipped: usize,
    /// Blobs pushed.
    pub pushed: usize,
    /// Cursor value after the cycle.
    pub server_time: u64,
}

/// Outcome of a `sync()` call.
///
/// `NotLoggedIn` and `AlreadyInProgress` are ordinary results, not errors:
/// the caller may retry later and nothing was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The cycle ran to completion.
    Completed(SyncReport),
    /// No credentials are set.
    NotLoggedIn,
    /// Another sync holds the lock; no network I/O was performed.
    AlreadyInProgress,
}

/// Everything owned by one logged-in session.
///
/// The mapper lives next to the credentials it was derived from, so a
/// stale mapping is structurally impossible: replacing credentials
/// replaces the mapper in the same assignment.
struct Session {
    credentials: Credentials,
    mapper: BlobMapper,
    refresher: Option<Arc<dyn TokenRefresher>>,
}

/// Controls synchronization against the remote blob store.
pub struct SyncController<'a, R: RemoteStore> {
    remote: R,
    store: &'a dyn SettingsStore,
    events: Arc<EventDispatcher>,
    lock: Box<dyn LockProvider>,
    session: Mutex<Option<Session>>,
    in_progress: AtomicBool,
}

impl<'a, R: RemoteStore> SyncController<'a, R> {
    /// Creates a new SyncController.
    pub fn new(
        remote: R,
        store: &'a dyn SettingsStore,
        events: Arc<EventDispatcher>,
        lock: Box<dyn LockProvider>,
    ) -> Self {
        SyncController {
            remote,
            store,
            events,
            lock,
            session: Mutex::new(None),
            in_progress: AtomicBool::new(false),
        }
    }

    /// Installs credentials for a logged-in session.
    ///
    /// Rebuilds the opaque-id mapping for the new master key and replaces
    /// any previous session atomically.
    pub fn set_credentials(
        &self,
        master_key: MasterKey,
        access_token: impl Into<String>,
        refresher: Option<Arc<dyn TokenRefresher>>,
    ) {
        let mapper = BlobMapper::build(&master_key);
        let session = Session {
            credentials: Credentials::new(master_key, access_token.into()),
            mapper,
            refresher,
        };
        *self.session.lock().expect("session mutex poisoned") = Some(session);
    }

    /// Drops the session on logout; the master key and cached mapping go
    /// with it.
    pub fn clear_credentials(&self) {
        *self.session.lock().expect("session mutex poisoned") = None;
    }

    /// True if credentials are set.
    pub fn is_logged_in(&self) -> bool {
        self.session.lock().expect("session mutex poisoned").is_some()
    }

    /// The persisted sync cursor, 0 if never synced.
    pub fn cursor(&self) -> ValiseResult<u64> {
        Ok(self
            .store
            .get_setting(LAST_SYNC_TIME)?
            .and_then(|v| v.as_u64())
            .unwrap_or(0))
    }

    /// Cheap staleness check: true if the server holds writes newer than
    /// the local cursor and a full sync is worth running.
    ///
    /// Returns `Ok(false)` when not logged in.
    pub fn check_remote_status(&self) -> ValiseResult<bool> {
        let Some(mut token) = self.current_token() else {
            return Ok(false);
        };
        let status = self.with_auth_retry(&mut token, |t| self.remote.status(t))?;
        Ok(status.last_sync > self.cursor()?)
    }

    /// Runs one pull-then-push sync cycle.
    ///
    /// Serialized by the named lock: a second caller while a sync is in
    /// progress gets `AlreadyInProgress` immediately rather than queuing.
    /// The in-progress flag is released on every path, success or failure.
    pub fn sync(&self) -> ValiseResult<SyncOutcome> {
        if !self.is_logged_in() {
            return Ok(SyncOutcome::NotLoggedIn);
        }
        if self.in_progress.swap(true, Ordering::SeqCst) {
            return Ok(SyncOutcome::AlreadyInProgress);
        }
        let Some(_guard) = self.lock.try_acquire(SYNC_LOCK) else {
            self.in_progress.store(false, Ordering::SeqCst);
            return Ok(SyncOutcome::AlreadyInProgress);
        };

        self.events.dispatch(ValiseEvent::SyncStarted);
        let result = self.run_cycle();
        self.in_progress.store(false, Ordering::SeqCst);

        let outcome = match result {
            Ok(report) => {
                self.events.dispatch(ValiseEvent::SyncCompleted {
                    pulled: report.pulled,
                    pushed: report.pushed,
                });
                Ok(SyncOutcome::Completed(report))
            }
            Err(e) => {
                self.events.dispatch(ValiseEvent::SyncFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        };
        self.events.dispatch(ValiseEvent::SyncEnded);
        outcome
    }

    fn run_cycle(&self) -> ValiseResult<SyncReport> {
        let (master, mut token, mapper) = self.session_snapshot()?;
        let mut report = SyncReport::default();

        // Pull
        let since = self.cursor()?;
        let response = self.with_auth_retry(&mut token, |t| self.remote.pull(t, since))?;
        for blob in &response.blobs {
            match self.apply_blob(&master, &mapper, blob)? {
                Some(logical_id) => {
                    report.pulled += 1;
                    self.events.dispatch(ValiseEvent::BlobReceived {
                        logical_id: logical_id.to_string(),
                    });
                }
                None => report.skipped += 1,
            }
        }
        // Cursor advances only after the whole batch, and never backwards
        let cursor = since.max(response.server_time);
        self.store
            .save_setting(LAST_SYNC_TIME, &Value::from(cursor))?;
        report.server_time = cursor;

        // Push the entire current local state as fresh blobs
        let blobs = self.collect_push_blobs(&master, &mapper)?;
        if blobs.is_empty() {
            return Ok(report);
        }
        self.with_auth_retry(&mut token, |t| self.remote.push(t, &blobs))?;
        report.pushed = blobs.len();

        Ok(report)
    }

    /// Decrypts and merges one pulled blob.
    ///
    /// Returns the logical id on success, `None` for a skipped blob.
    /// Skips are contained here: an unknown opaque id or an undecryptable
    /// blob must not block convergence of the rest of the batch. Local
    /// storage failures do propagate.
    fn apply_blob(
        &self,
        master: &MasterKey,
        mapper: &BlobMapper,
        blob: &Blob,
    ) -> ValiseResult<Option<&'static str>> {
        let Some(logical_id) = mapper.logical_id(&blob.id) else {
            // Possibly a newer client version's item type
            debug!(blob_id = %blob.id, "skipping blob with unknown opaque id");
            return Ok(None);
        };

        let payload = match decrypt_payload(master, logical_id, &blob.ciphertext, &blob.iv) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(logical_id, error = %e, "skipping undecryptable blob");
                return Ok(None);
            }
        };

        match payload {
            Payload::Tickets { data } if logical_id == TICKETS_ACTIVE => {
                let mut state = self.load_tickets()?;
                merge_active(&mut state, &data);
                self.save_tickets(&state)?;
            }
            Payload::Tickets { data } if logical_id == TICKETS_ARCHIVE => {
                let mut state = self.load_tickets()?;
                merge_archive(&mut state, &data);
                self.save_tickets(&state)?;
            }
            Payload::Preference { key, value } if key == logical_id => {
                let local = self.store.get_setting(logical_id)?;
                let merged = merge_preference(local, value);
                self.store.save_setting(logical_id, &merged)?;
            }
            _ => {
                // Payload metadata contradicts the id it was stored under
                warn!(logical_id, "skipping blob whose payload does not match its id");
                return Ok(None);
            }
        }
        Ok(Some(logical_id))
    }

    fn collect_push_blobs(
        &self,
        master: &MasterKey,
        mapper: &BlobMapper,
    ) -> ValiseResult<Vec<Blob>> {
        let mut blobs = Vec::new();

        for logical_id in [TICKETS_ACTIVE, TICKETS_ARCHIVE] {
            if let Some(value) = self.store.get_setting(logical_id)? {
                let data: Vec<Ticket> = parse_stored(value)?;
                let payload = Payload::Tickets { data };
                blobs.push(self.encrypt_to_blob(master, mapper, logical_id, &payload)?);
            }
        }
        for &key in SYNCED_PREFERENCE_KEYS {
            if let Some(value) = self.store.get_setting(key)? {
                let payload = Payload::Preference {
                    key: key.to_string(),
                    value,
                };
                blobs.push(self.encrypt_to_blob(master, mapper, key, &payload)?);
            }
        }

        Ok(blobs)
    }

    fn encrypt_to_blob(
        &self,
        master: &MasterKey,
        mapper: &BlobMapper,
        logical_id: &str,
        payload: &Payload,
    ) -> ValiseResult<Blob> {
        let id = mapper.opaque_id(logical_id).ok_or_else(|| {
            ValiseError::InvalidState(format!("no opaque id mapped for {logical_id}"))
        })?;
        let encrypted = encrypt_payload(master, logical_id, payload)?;
        Ok(Blob {
            id: id.to_string(),
            ciphertext: encrypted.ciphertext,
            iv: encrypted.iv,
            version: BLOB_VERSION,
        })
    }

    fn load_tickets(&self) -> ValiseResult<TicketState> {
        let active = match self.store.get_setting(TICKETS_ACTIVE)? {
            Some(value) => parse_stored(value)?,
            None => Vec::new(),
        };
        let archive = match self.store.get_setting(TICKETS_ARCHIVE)? {
            Some(value) => parse_stored(value)?,
            None => Vec::new(),
        };
        Ok(TicketState::new(active, archive))
    }

    fn save_tickets(&self, state: &TicketState) -> ValiseResult<()> {
        self.store
            .save_setting(TICKETS_ACTIVE, &to_stored(&state.active)?)?;
        self.store
            .save_setting(TICKETS_ARCHIVE, &to_stored(&state.archive)?)?;
        Ok(())
    }

    /// Retries one remote operation after a single token refresh.
    ///
    /// A 401 triggers the injected refresher once; the refreshed token is
    /// written back to the session and the same operation is retried. A
    /// second rejection, or refresh failure, is an authentication error.
    fn with_auth_retry<T>(
        &self,
        token: &mut String,
        op: impl Fn(&str) -> Result<T, RemoteError>,
    ) -> ValiseResult<T> {
        match op(token) {
            Err(RemoteError::Unauthorized) => {
                *token = self.refresh_token()?;
                op(token).map_err(|e| match e {
                    RemoteError::Unauthorized => {
                        ValiseError::Authentication("server rejected refreshed token".into())
                    }
                    other => ValiseError::Remote(other),
                })
            }
            other => other.map_err(ValiseError::from),
        }
    }

    fn refresh_token(&self) -> ValiseResult<String> {
        let refresher = {
            let session = self.session.lock().expect("session mutex poisoned");
            session.as_ref().and_then(|s| s.refresher.clone())
        }
        .ok_or_else(|| {
            ValiseError::Authentication("access token rejected and no refresher available".into())
        })?;

        let token = refresher
            .refresh()
            .map_err(|e| ValiseError::Authentication(e.to_string()))?;

        let mut session = self.session.lock().expect("session mutex poisoned");
        if let Some(s) = session.as_mut() {
            s.credentials.set_access_token(token.clone());
        }
        Ok(token)
    }

    fn session_snapshot(&self) -> ValiseResult<(MasterKey, String, BlobMapper)> {
        let session = self.session.lock().expect("session mutex poisoned");
        let Some(s) = session.as_ref() else {
            return Err(ValiseError::InvalidState("no session".into()));
        };
        debug_assert!(s.mapper.is_current(s.credentials.master_key()));
        Ok((
            s.credentials.master_key().clone(),
            s.credentials.access_token().to_string(),
            s.mapper.clone(),
        ))
    }

    /// Returns a reference to the underlying remote store.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    fn current_token(&self) -> Option<String> {
        let session = self.session.lock().expect("session mutex poisoned");
        session
            .as_ref()
            .map(|s| s.credentials.access_token().to_string())
    }
}

fn parse_stored<T: serde::de::DeserializeOwned>(value: Value) -> ValiseResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ValiseError::Storage(SettingsError::Corrupted(e.to_string())))
}

fn to_stored<T: serde::Serialize>(value: &T) -> ValiseResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| ValiseError::Storage(SettingsError::Corrupted(e.to_string())))
}
