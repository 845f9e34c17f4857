//! HTTP client for the Transmission RPC endpoint.
//!
//! # Design
//! - Transmission answers the first request of a session with `409` and an
//!   `X-Transmission-Session-Id` header; the id is cached and the request
//!   retried once.
//! - Transport failures are mapped onto `DaemonError` so callers can tell
//!   fatal conditions (bad credentials, no connection) from per-call ones.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tlever_config::ClientConfig;
use tlever_torrent_core::{
    DaemonError, DaemonResult, DaemonSession, SessionInfo, TorrentChange, TorrentSnapshot,
};
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::wire::{
    Envelope, SESSION_FIELDS, TORRENT_FIELDS, TorrentList, WireSession, torrent_set_arguments,
};

/// Header carrying the CSRF session id.
pub const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";
const SUCCESS: &str = "success";

/// Parse the RPC endpoint assembled from `config`.
///
/// # Errors
///
/// Returns the URL parser's error when the host or path cannot form a URL.
pub fn parse_endpoint(config: &ClientConfig) -> Result<Url, url::ParseError> {
    Url::parse(&config.endpoint())
}

/// `DaemonSession` backed by a Transmission RPC endpoint.
pub struct TransmissionClient {
    http: Client,
    endpoint: Url,
    credentials: Option<(String, String)>,
    session_id: RwLock<Option<String>>,
}

impl TransmissionClient {
    /// Build a client for the endpoint described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `DaemonError::Transport` when the endpoint URL is malformed or
    /// the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> DaemonResult<Self> {
        let endpoint = parse_endpoint(config).map_err(|err| DaemonError::Transport {
            method: "client.build",
            detail: format!("invalid endpoint '{}': {err}", config.endpoint()),
        })?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| DaemonError::Transport {
                method: "client.build",
                detail: err.to_string(),
            })?;
        let credentials = (!config.username.is_empty())
            .then(|| (config.username.clone(), config.password.clone()));

        Ok(Self {
            http,
            endpoint,
            credentials,
            session_id: RwLock::new(None),
        })
    }

    /// Endpoint requests are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        arguments: Value,
    ) -> DaemonResult<T> {
        let body = json!({ "method": method, "arguments": arguments });
        let mut retried = false;
        loop {
            let mut request = self.http.post(self.endpoint.clone()).json(&body);
            if let Some((username, password)) = &self.credentials {
                request = request.basic_auth(username, Some(password));
            }
            if let Some(id) = self.session_id.read().await.as_deref() {
                request = request.header(SESSION_ID_HEADER, id);
            }

            let response = request
                .send()
                .await
                .map_err(|err| self.send_error(method, &err))?;

            match response.status() {
                StatusCode::CONFLICT if !retried => {
                    let id = response
                        .headers()
                        .get(SESSION_ID_HEADER)
                        .and_then(|value| value.to_str().ok())
                        .ok_or_else(|| DaemonError::Transport {
                            method,
                            detail: "409 response without a session id".to_string(),
                        })?;
                    debug!(method, "refreshing daemon session id");
                    *self.session_id.write().await = Some(id.to_string());
                    retried = true;
                    continue;
                }
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    return Err(DaemonError::Unauthorized);
                }
                status if !status.is_success() => {
                    return Err(DaemonError::Transport {
                        method,
                        detail: format!("unexpected status {status}"),
                    });
                }
                _ => {}
            }

            let envelope: Envelope = response.json().await.map_err(|err| DaemonError::Decode {
                method,
                detail: err.to_string(),
            })?;
            if envelope.result != SUCCESS {
                return Err(DaemonError::Rpc {
                    method,
                    result: envelope.result,
                });
            }
            return serde_json::from_value(envelope.arguments).map_err(|err| {
                DaemonError::Decode {
                    method,
                    detail: err.to_string(),
                }
            });
        }
    }

    fn send_error(&self, method: &'static str, err: &reqwest::Error) -> DaemonError {
        if err.is_connect() {
            DaemonError::Unreachable {
                endpoint: self.endpoint.to_string(),
                detail: err.to_string(),
            }
        } else {
            DaemonError::Transport {
                method,
                detail: err.to_string(),
            }
        }
    }

    async fn torrents(&self, ids: Option<&[String]>) -> DaemonResult<Vec<TorrentSnapshot>> {
        const METHOD: &str = "torrent-get";
        let mut arguments = json!({ "fields": TORRENT_FIELDS });
        if let Some(ids) = ids {
            arguments["ids"] = json!(ids);
        }
        let list: TorrentList = self.call(METHOD, arguments).await?;
        list.torrents
            .into_iter()
            .map(|torrent| torrent.into_snapshot(METHOD))
            .collect()
    }

    async fn call_unit(&self, method: &'static str, arguments: Value) -> DaemonResult<()> {
        self.call::<Value>(method, arguments).await.map(|_| ())
    }
}

#[async_trait]
impl DaemonSession for TransmissionClient {
    async fn get_torrent(&self, hash: &str) -> DaemonResult<TorrentSnapshot> {
        self.torrents(Some(&[hash.to_string()]))
            .await?
            .into_iter()
            .find(|torrent| torrent.hash.eq_ignore_ascii_case(hash))
            .ok_or_else(|| DaemonError::NotFound {
                hash: hash.to_string(),
            })
    }

    async fn get_torrents(&self) -> DaemonResult<Vec<TorrentSnapshot>> {
        self.torrents(None).await
    }

    async fn change_torrent(&self, ids: &[String], change: TorrentChange) -> DaemonResult<()> {
        if change.is_empty() {
            return Ok(());
        }
        self.call_unit("torrent-set", torrent_set_arguments(ids, &change))
            .await
    }

    async fn move_torrent_data(&self, ids: &[String], location: &str) -> DaemonResult<()> {
        self.call_unit(
            "torrent-set-location",
            json!({ "ids": ids, "location": location, "move": true }),
        )
        .await
    }

    async fn start_torrent(&self, ids: &[String]) -> DaemonResult<()> {
        self.call_unit("torrent-start", json!({ "ids": ids })).await
    }

    async fn get_session(&self) -> DaemonResult<SessionInfo> {
        let wire: WireSession = self
            .call("session-get", json!({ "fields": SESSION_FIELDS }))
            .await?;
        Ok(wire.into())
    }
}
