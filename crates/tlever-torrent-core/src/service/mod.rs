//! Session trait implemented by daemon transports.

use async_trait::async_trait;

use crate::error::DaemonResult;
use crate::model::{SessionInfo, TorrentChange, TorrentSnapshot};

/// Narrow view of a remote torrent daemon used by the reconciliation core.
///
/// Every call is one round-trip. Implementations own retries, timeouts and
/// authentication; callers never assume a failed call applied anything.
#[async_trait]
pub trait DaemonSession: Send + Sync {
    /// Fetch a single torrent by hash.
    async fn get_torrent(&self, hash: &str) -> DaemonResult<TorrentSnapshot>;

    /// Fetch every torrent known to the daemon.
    async fn get_torrents(&self) -> DaemonResult<Vec<TorrentSnapshot>>;

    /// Write the populated fields of `change` to every torrent in `ids`.
    async fn change_torrent(&self, ids: &[String], change: TorrentChange) -> DaemonResult<()>;

    /// Relocate torrent data to `location`, moving files on disk.
    async fn move_torrent_data(&self, ids: &[String], location: &str) -> DaemonResult<()>;

    /// Resume the given torrents.
    async fn start_torrent(&self, ids: &[String]) -> DaemonResult<()>;

    /// Fetch daemon-wide session values.
    async fn get_session(&self) -> DaemonResult<SessionInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DaemonError;
    use async_trait::async_trait;

    struct OfflineDaemon;

    #[async_trait]
    impl DaemonSession for OfflineDaemon {
        async fn get_torrent(&self, hash: &str) -> DaemonResult<TorrentSnapshot> {
            Err(DaemonError::NotFound {
                hash: hash.to_string(),
            })
        }

        async fn get_torrents(&self) -> DaemonResult<Vec<TorrentSnapshot>> {
            Ok(Vec::new())
        }

        async fn change_torrent(&self, _ids: &[String], _change: TorrentChange) -> DaemonResult<()> {
            Err(DaemonError::Unauthorized)
        }

        async fn move_torrent_data(&self, _ids: &[String], _location: &str) -> DaemonResult<()> {
            Err(DaemonError::Unauthorized)
        }

        async fn start_torrent(&self, _ids: &[String]) -> DaemonResult<()> {
            Err(DaemonError::Unauthorized)
        }

        async fn get_session(&self) -> DaemonResult<SessionInfo> {
            Ok(SessionInfo::default())
        }
    }

    #[tokio::test]
    async fn trait_is_object_safe_and_callable() -> anyhow::Result<()> {
        let daemon: Box<dyn DaemonSession> = Box::new(OfflineDaemon);
        assert!(daemon.get_torrents().await?.is_empty());
        assert!(matches!(
            daemon.get_torrent("abc").await,
            Err(DaemonError::NotFound { .. })
        ));
        let err = daemon
            .start_torrent(&["abc".to_string()])
            .await
            .expect_err("offline daemon rejects writes");
        assert!(err.is_fatal());
        Ok(())
    }
}
