//! In-memory daemon used in place of a live RPC endpoint.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tlever_torrent_core::{
    DaemonError, DaemonResult, DaemonSession, SessionInfo, TorrentChange, TorrentSnapshot,
    TorrentState,
};

/// Which calls touching a torrent should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// `change_torrent` fails.
    Writes,
    /// `move_torrent_data` fails.
    Moves,
    /// Every call naming the torrent fails, reads included.
    All,
}

/// Mutating call recorded by [`MemoryDaemon`].
#[derive(Debug, Clone, PartialEq)]
pub enum DaemonCall {
    /// `change_torrent`.
    Change {
        /// Target hashes.
        ids: Vec<String>,
        /// Payload written.
        change: TorrentChange,
    },
    /// `move_torrent_data`.
    Move {
        /// Target hashes.
        ids: Vec<String>,
        /// Destination directory.
        location: String,
    },
    /// `start_torrent`.
    Start {
        /// Target hashes.
        ids: Vec<String>,
    },
}

#[derive(Default)]
struct State {
    session: SessionInfo,
    torrents: BTreeMap<String, TorrentSnapshot>,
    order: Vec<String>,
    failures: HashMap<String, FailureMode>,
    unauthorized: bool,
    calls: Vec<DaemonCall>,
}

/// `DaemonSession` backed by a process-local map.
///
/// Writes apply immediately, so a data move is visible to the next read.
#[derive(Default)]
pub struct MemoryDaemon {
    state: Mutex<State>,
}

impl MemoryDaemon {
    /// Daemon with the given session values and no torrents.
    #[must_use]
    pub fn new(session: SessionInfo) -> Self {
        Self {
            state: Mutex::new(State {
                session,
                ..State::default()
            }),
        }
    }

    /// Builder-style helper inserting torrents in listing order.
    #[must_use]
    pub fn with_torrents(self, torrents: impl IntoIterator<Item = TorrentSnapshot>) -> Self {
        for torrent in torrents {
            self.insert(torrent);
        }
        self
    }

    /// Insert or replace a torrent.
    pub fn insert(&self, torrent: TorrentSnapshot) {
        let mut state = self.lock();
        if !state.torrents.contains_key(&torrent.hash) {
            state.order.push(torrent.hash.clone());
        }
        state.torrents.insert(torrent.hash.clone(), torrent);
    }

    /// Current value of a torrent, if present.
    #[must_use]
    pub fn torrent(&self, hash: &str) -> Option<TorrentSnapshot> {
        self.lock().torrents.get(hash).cloned()
    }

    /// Current labels of a torrent, empty when absent.
    #[must_use]
    pub fn labels(&self, hash: &str) -> Vec<String> {
        self.torrent(hash)
            .map(|torrent| torrent.labels)
            .unwrap_or_default()
    }

    /// Overwrite labels as a concurrent client would.
    pub fn set_labels(&self, hash: &str, labels: &[&str]) {
        if let Some(torrent) = self.lock().torrents.get_mut(hash) {
            torrent.labels = labels.iter().map(|label| (*label).to_string()).collect();
        }
    }

    /// Relocate a torrent without going through the session API.
    pub fn set_download_dir(&self, hash: &str, location: &str) {
        if let Some(torrent) = self.lock().torrents.get_mut(hash) {
            torrent.download_dir = location.to_string();
        }
    }

    /// Inject failures for calls touching `hash`.
    pub fn fail(&self, hash: &str, mode: FailureMode) {
        self.lock().failures.insert(hash.to_string(), mode);
    }

    /// Make every call fail with `DaemonError::Unauthorized`.
    pub fn reject_credentials(&self) {
        self.lock().unauthorized = true;
    }

    /// Mutating calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<DaemonCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl State {
    fn check(&self, method: &'static str, ids: &[String], mode: FailureMode) -> DaemonResult<()> {
        if self.unauthorized {
            return Err(DaemonError::Unauthorized);
        }
        for id in ids {
            if !self.torrents.contains_key(id) {
                return Err(DaemonError::NotFound { hash: id.clone() });
            }
            match self.failures.get(id) {
                Some(&configured) if configured == mode || configured == FailureMode::All => {
                    return Err(DaemonError::Transport {
                        method,
                        detail: format!("injected failure for {id}"),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DaemonSession for MemoryDaemon {
    async fn get_torrent(&self, hash: &str) -> DaemonResult<TorrentSnapshot> {
        let state = self.lock();
        state.check("torrent-get", &[hash.to_string()], FailureMode::All)?;
        state
            .torrents
            .get(hash)
            .cloned()
            .ok_or_else(|| DaemonError::NotFound {
                hash: hash.to_string(),
            })
    }

    async fn get_torrents(&self) -> DaemonResult<Vec<TorrentSnapshot>> {
        let state = self.lock();
        if state.unauthorized {
            return Err(DaemonError::Unauthorized);
        }
        Ok(state
            .order
            .iter()
            .filter_map(|hash| state.torrents.get(hash).cloned())
            .collect())
    }

    async fn change_torrent(&self, ids: &[String], change: TorrentChange) -> DaemonResult<()> {
        let mut state = self.lock();
        state.check("torrent-set", ids, FailureMode::Writes)?;
        for id in ids {
            if let Some(torrent) = state.torrents.get_mut(id) {
                if let Some(labels) = &change.labels {
                    torrent.labels.clone_from(labels);
                }
                if let Some(profile) = change.throttle {
                    torrent.seed_ratio_limit = profile.seed_ratio_limit;
                    torrent.seed_ratio_mode = profile.seed_ratio_mode;
                    torrent.seed_idle_limit = profile.seed_idle_limit;
                    torrent.seed_idle_mode = profile.seed_idle_mode;
                    torrent.upload_limit = profile.upload_limit;
                    torrent.upload_limited = profile.upload_limited;
                }
            }
        }
        state.calls.push(DaemonCall::Change {
            ids: ids.to_vec(),
            change,
        });
        Ok(())
    }

    async fn move_torrent_data(&self, ids: &[String], location: &str) -> DaemonResult<()> {
        let mut state = self.lock();
        state.check("torrent-set-location", ids, FailureMode::Moves)?;
        for id in ids {
            if let Some(torrent) = state.torrents.get_mut(id) {
                torrent.download_dir = location.to_string();
            }
        }
        state.calls.push(DaemonCall::Move {
            ids: ids.to_vec(),
            location: location.to_string(),
        });
        Ok(())
    }

    async fn start_torrent(&self, ids: &[String]) -> DaemonResult<()> {
        let mut state = self.lock();
        state.check("torrent-start", ids, FailureMode::Writes)?;
        for id in ids {
            if let Some(torrent) = state.torrents.get_mut(id) {
                torrent.state = if torrent.is_complete() {
                    TorrentState::Seeding
                } else {
                    TorrentState::Downloading
                };
            }
        }
        state.calls.push(DaemonCall::Start { ids: ids.to_vec() });
        Ok(())
    }

    async fn get_session(&self) -> DaemonResult<SessionInfo> {
        let state = self.lock();
        if state.unauthorized {
            return Err(DaemonError::Unauthorized);
        }
        Ok(state.session.clone())
    }
}
