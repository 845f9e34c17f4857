//! Whole-profile throttle writes.

use tlever_torrent_core::{DaemonSession, ThrottleProfile, TorrentChange};
use tracing::info;

use crate::error::{ReconcileResult, daemon_err};

/// Write all six throttle fields of `profile` to `hash` in one daemon call.
///
/// # Errors
///
/// Returns an error when the daemon rejects the write.
pub async fn apply_throttle(
    session: &dyn DaemonSession,
    hash: &str,
    profile: &ThrottleProfile,
) -> ReconcileResult<()> {
    session
        .change_torrent(&[hash.to_string()], TorrentChange::throttle(*profile))
        .await
        .map_err(daemon_err("throttle.apply"))?;
    info!(
        hash,
        upload_limit = profile.upload_limit,
        upload_limited = profile.upload_limited,
        seed_ratio_limit = profile.seed_ratio_limit,
        "applied throttle profile"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlever_test_support::{DaemonCall, MemoryDaemon, fixtures};

    #[tokio::test]
    async fn profile_is_written_in_a_single_call() -> anyhow::Result<()> {
        let daemon =
            MemoryDaemon::new(fixtures::session()).with_torrents([fixtures::torrent("h", 0.2)]);
        let profile = fixtures::tier(2.0, 640);

        apply_throttle(&daemon, "h", &profile).await?;

        let calls = daemon.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(
            &calls[0],
            DaemonCall::Change { change, .. }
                if change.throttle == Some(profile) && change.labels.is_none()
        ));
        let torrent = daemon.torrent("h").expect("torrent present");
        assert_eq!(torrent.throttle(), profile);
        Ok(())
    }
}
