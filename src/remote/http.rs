// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! HTTP-backed remote store.
//!
//! Bearer-token authenticated JSON over HTTPS with bounded retry and
//! exponential backoff. A 401 is surfaced immediately (the controller owns
//! the refresh-and-retry policy); transient transport failures and 5xx
//! responses are retried here.

use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::{Blob, PullResponse, PushResponse, RemoteError, RemoteStore, StatusResponse};

/// Configuration for the HTTP remote store.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Server base URL, e.g. `https://api.example.com`.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Total attempts per call (first try included).
    pub max_attempts: u32,
    /// Base delay for exponential backoff between attempts (milliseconds).
    pub retry_base_delay_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            base_url: String::new(),
            timeout_ms: 15_000,
            max_attempts: 3,
            retry_base_delay_ms: 500,
        }
    }
}

/// Remote store speaking the `/auth/sync` wire protocol.
pub struct HttpRemoteStore {
    client: Client,
    config: RemoteConfig,
}

impl HttpRemoteStore {
    /// Creates an HTTP remote store from config.
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!(
                "Valise/{}",
                option_env!("CARGO_PKG_VERSION").unwrap_or("0.1.0")
            ))
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        Ok(HttpRemoteStore { client, config })
    }

    fn request_with_retry<T: DeserializeOwned>(
        &self,
        send: impl Fn() -> Result<Response, reqwest::Error>,
    ) -> Result<T, RemoteError> {
        let mut last_error = RemoteError::Network("no attempts made".into());

        for attempt in 0..self.config.max_attempts {
            if attempt > 0 {
                let delay = self.config.retry_base_delay_ms * (1 << (attempt - 1));
                thread::sleep(Duration::from_millis(delay));
            }

            match send() {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::UNAUTHORIZED {
                        return Err(RemoteError::Unauthorized);
                    }
                    if status.is_server_error() {
                        tracing::debug!(status = status.as_u16(), attempt, "server error, will retry");
                        last_error = RemoteError::Http(status.as_u16());
                        continue;
                    }
                    if !status.is_success() {
                        return Err(RemoteError::Http(status.as_u16()));
                    }
                    return response
                        .json::<T>()
                        .map_err(|e| RemoteError::InvalidResponse(e.to_string()));
                }
                Err(e) => {
                    tracing::debug!(error = %e, attempt, "request failed, will retry");
                    last_error = RemoteError::Network(e.to_string());
                }
            }
        }

        Err(last_error)
    }
}

impl RemoteStore for HttpRemoteStore {
    fn status(&self, token: &str) -> Result<StatusResponse, RemoteError> {
        let url = format!("{}/auth/sync/status", self.config.base_url);
        self.request_with_retry(|| self.client.get(&url).bearer_auth(token).send())
    }

    fn pull(&self, token: &str, since: u64) -> Result<PullResponse, RemoteError> {
        let url = format!("{}/auth/sync", self.config.base_url);
        self.request_with_retry(|| {
            self.client
                .get(&url)
                .query(&[("since", since)])
                .bearer_auth(token)
                .send()
        })
    }

    fn push(&self, token: &str, blobs: &[Blob]) -> Result<PushResponse, RemoteError> {
        let url = format!("{}/auth/sync", self.config.base_url);
        let body = serde_json::json!({ "blobs": blobs });
        self.request_with_retry(|| {
            self.client
                .post(&url)
                .bearer_auth(token)
                .json(&body)
                .send()
        })
    }
}
