// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock remote store for tests.
//!
//! Scripted responses plus a request log, so tests can assert exactly what
//! network I/O a sync performed.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::{Blob, PullResponse, PushResponse, RemoteError, RemoteStore, StatusResponse};

/// One request the mock has served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    /// `GET /auth/sync/status`
    Status { token: String },
    /// `GET /auth/sync?since=`
    Pull { token: String, since: u64 },
    /// `POST /auth/sync`
    Push { token: String, blob_ids: Vec<String> },
}

#[derive(Default)]
struct MockState {
    requests: Vec<RecordedRequest>,
    pull_script: VecDeque<Result<PullResponse, RemoteError>>,
    push_script: VecDeque<Result<(), RemoteError>>,
    status_last_sync: u64,
    pushed: Vec<Vec<Blob>>,
}

/// Scripted in-memory remote store.
#[derive(Default)]
pub struct MockRemoteStore {
    state: Mutex<MockState>,
}

impl MockRemoteStore {
    /// Creates a mock that answers empty pulls and accepts every push.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `last_sync` value reported by the status endpoint.
    pub fn set_status(&self, last_sync: u64) {
        self.state.lock().unwrap().status_last_sync = last_sync;
    }

    /// Queues the next pull response.
    pub fn queue_pull(&self, response: PullResponse) {
        self.state.lock().unwrap().pull_script.push_back(Ok(response));
    }

    /// Queues the next pull to fail.
    pub fn queue_pull_error(&self, error: RemoteError) {
        self.state.lock().unwrap().pull_script.push_back(Err(error));
    }

    /// Queues the next push to fail.
    pub fn queue_push_error(&self, error: RemoteError) {
        self.state.lock().unwrap().push_script.push_back(Err(error));
    }

    /// Every request served so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Blob batches accepted by push, in order.
    pub fn pushed_batches(&self) -> Vec<Vec<Blob>> {
        self.state.lock().unwrap().pushed.clone()
    }
}

impl RemoteStore for MockRemoteStore {
    fn status(&self, token: &str) -> Result<StatusResponse, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest::Status {
            token: token.to_string(),
        });
        Ok(StatusResponse {
            last_sync: state.status_last_sync,
        })
    }

    fn pull(&self, token: &str, since: u64) -> Result<PullResponse, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest::Pull {
            token: token.to_string(),
            since,
        });
        match state.pull_script.pop_front() {
            Some(scripted) => scripted,
            None => Ok(PullResponse {
                blobs: vec![],
                server_time: state.status_last_sync,
            }),
        }
    }

    fn push(&self, token: &str, blobs: &[Blob]) -> Result<PushResponse, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest::Push {
            token: token.to_string(),
            blob_ids: blobs.iter().map(|b| b.id.clone()).collect(),
        });
        if let Some(Err(e)) = state.push_script.pop_front() {
            return Err(e);
        }
        state.pushed.push(blobs.to_vec());
        Ok(PushResponse {
            accepted: blobs.iter().map(|b| b.id.clone()).collect(),
        })
    }
}
