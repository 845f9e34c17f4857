//! Config and torrent builders for reconciliation tests.

use tlever_config::LeverConfig;
use tlever_torrent_core::{
    IdleMode, RatioMode, SessionInfo, ThrottleProfile, TorrentSnapshot, TorrentState,
};

/// Download root used by [`session`].
pub const DOWNLOAD_ROOT: &str = "/srv/torrents";

/// Session info rooted at [`DOWNLOAD_ROOT`].
#[must_use]
pub fn session() -> SessionInfo {
    SessionInfo {
        download_dir: DOWNLOAD_ROOT.to_string(),
        seed_ratio_limit: 2.0,
        seed_ratio_limited: true,
        rpc_version: 17,
        version: "4.0.5".to_string(),
    }
}

/// Tier profile with the given threshold and upload cap.
#[must_use]
pub const fn tier(threshold: f64, upload_limit: u64) -> ThrottleProfile {
    ThrottleProfile {
        seed_ratio_limit: threshold,
        seed_ratio_mode: RatioMode::Single,
        seed_idle_limit: 30,
        seed_idle_mode: IdleMode::Off,
        upload_limit,
        upload_limited: true,
    }
}

/// Default config with a three-step ladder at ratios 1, 2 and 3.
#[must_use]
pub fn config() -> LeverConfig {
    LeverConfig {
        tiers: vec![tier(1.0, 300), tier(2.0, 200), tier(3.0, 100)],
        ..LeverConfig::default()
    }
}

/// Completed, seeding torrent stored directly under [`DOWNLOAD_ROOT`].
#[must_use]
pub fn torrent(hash: &str, ratio: f64) -> TorrentSnapshot {
    TorrentSnapshot {
        hash: hash.to_string(),
        name: format!("torrent-{hash}"),
        ratio,
        progress: 100.0,
        state: TorrentState::Seeding,
        download_dir: DOWNLOAD_ROOT.to_string(),
        eta: -1,
        ..TorrentSnapshot::default()
    }
}

/// [`torrent`] with the given labels.
#[must_use]
pub fn labelled(hash: &str, ratio: f64, labels: &[&str]) -> TorrentSnapshot {
    TorrentSnapshot {
        labels: labels.iter().map(|label| (*label).to_string()).collect(),
        ..torrent(hash, ratio)
    }
}
