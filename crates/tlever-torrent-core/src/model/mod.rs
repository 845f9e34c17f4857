//! Immutable projections of daemon state and the change payloads sent back.
//!
//! # Design
//! - Snapshots are fetched by value at the start of every pass and never cached.
//! - Change payloads carry only the fields a caller intends to write so that a
//!   throttle update never clobbers labels (and vice versa).

use serde::{Deserialize, Serialize};

/// Lifecycle state reported by the daemon for a torrent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TorrentState {
    /// Paused by a user or by a seed limit.
    #[default]
    Stopped,
    /// Verifying local data.
    Checking,
    /// Actively downloading.
    Downloading,
    /// Complete and uploading.
    Seeding,
    /// Waiting in one of the daemon queues.
    Queued,
}

impl TorrentState {
    /// Render the state as its lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Checking => "checking",
            Self::Downloading => "downloading",
            Self::Seeding => "seeding",
            Self::Queued => "queued",
        }
    }
}

/// How the idle-seeding limit of a torrent is resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdleMode {
    /// Follow the daemon-wide idle limit.
    #[default]
    Global,
    /// Use the torrent's own idle limit.
    Single,
    /// Seed regardless of idle time.
    Off,
}

impl IdleMode {
    /// Numeric code used on the daemon wire.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Global => 0,
            Self::Single => 1,
            Self::Off => 2,
        }
    }

    /// Decode a wire code, returning `None` for unknown values.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Global),
            1 => Some(Self::Single),
            2 => Some(Self::Off),
            _ => None,
        }
    }
}

/// How the seed-ratio limit of a torrent is resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RatioMode {
    /// Follow the daemon-wide ratio limit.
    #[default]
    Global,
    /// Use the torrent's own ratio limit.
    Single,
    /// Seed forever.
    Unlimited,
}

impl RatioMode {
    /// Numeric code used on the daemon wire.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Global => 0,
            Self::Single => 1,
            Self::Unlimited => 2,
        }
    }

    /// Decode a wire code, returning `None` for unknown values.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Global),
            1 => Some(Self::Single),
            2 => Some(Self::Unlimited),
            _ => None,
        }
    }
}

/// Bandwidth/idle/ratio settings written to a torrent in a single call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ThrottleProfile {
    /// Ratio at which seeding stops; doubles as the tier threshold.
    pub seed_ratio_limit: f64,
    /// Ratio limit resolution mode.
    pub seed_ratio_mode: RatioMode,
    /// Minutes of inactivity before seeding stops.
    pub seed_idle_limit: u32,
    /// Idle limit resolution mode.
    pub seed_idle_mode: IdleMode,
    /// Upload cap in KiB/s.
    pub upload_limit: u64,
    /// Whether the upload cap is enforced.
    pub upload_limited: bool,
}

/// Global session values relevant to reconciliation and display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionInfo {
    /// Daemon-wide download root; category paths are relative to it.
    pub download_dir: String,
    /// Daemon-wide seed ratio limit.
    pub seed_ratio_limit: f64,
    /// Whether the daemon-wide ratio limit is enforced.
    pub seed_ratio_limited: bool,
    /// RPC protocol version.
    pub rpc_version: u32,
    /// Daemon version string.
    pub version: String,
}

/// Value snapshot of a torrent as reported by the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TorrentSnapshot {
    /// Immutable info hash.
    pub hash: String,
    /// Display name.
    pub name: String,
    /// Ordered label set.
    pub labels: Vec<String>,
    /// Upload/download ratio; negative values are daemon sentinels.
    pub ratio: f64,
    /// Completion percentage in `0..=100`.
    pub progress: f64,
    /// Lifecycle state.
    pub state: TorrentState,
    /// Absolute storage location.
    pub download_dir: String,
    /// Seconds until completion, `-1` when unavailable, `-2` when unknown.
    pub eta: i64,
    /// Current upload rate in bytes per second.
    pub rate_upload: u64,
    /// Current download rate in bytes per second.
    pub rate_download: u64,
    /// Upload cap in KiB/s.
    pub upload_limit: u64,
    /// Whether the upload cap is enforced.
    pub upload_limited: bool,
    /// Download cap in KiB/s.
    pub download_limit: u64,
    /// Whether the download cap is enforced.
    pub download_limited: bool,
    /// Idle limit in minutes.
    pub seed_idle_limit: u32,
    /// Idle limit resolution mode.
    pub seed_idle_mode: IdleMode,
    /// Seed ratio limit.
    pub seed_ratio_limit: f64,
    /// Ratio limit resolution mode.
    pub seed_ratio_mode: RatioMode,
    /// Bandwidth group, when assigned.
    pub group: Option<String>,
}

impl TorrentSnapshot {
    /// Whether the daemon reports the payload fully downloaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress >= 100.0
    }

    /// The throttle-related fields of the snapshot as a profile.
    #[must_use]
    pub const fn throttle(&self) -> ThrottleProfile {
        ThrottleProfile {
            seed_ratio_limit: self.seed_ratio_limit,
            seed_ratio_mode: self.seed_ratio_mode,
            seed_idle_limit: self.seed_idle_limit,
            seed_idle_mode: self.seed_idle_mode,
            upload_limit: self.upload_limit,
            upload_limited: self.upload_limited,
        }
    }
}

/// Partial update applied through `DaemonSession::change_torrent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TorrentChange {
    /// Replacement label set (full write, not a delta).
    pub labels: Option<Vec<String>>,
    /// Throttle profile written as one unit.
    pub throttle: Option<ThrottleProfile>,
}

impl TorrentChange {
    /// Change that replaces the full label set.
    #[must_use]
    pub const fn labels(labels: Vec<String>) -> Self {
        Self {
            labels: Some(labels),
            throttle: None,
        }
    }

    /// Change that writes every throttle field together.
    #[must_use]
    pub const fn throttle(profile: ThrottleProfile) -> Self {
        Self {
            labels: None,
            throttle: Some(profile),
        }
    }

    /// Whether the change would write nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.labels.is_none() && self.throttle.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_codes_round_trip_and_reject_unknown() {
        for mode in [IdleMode::Global, IdleMode::Single, IdleMode::Off] {
            assert_eq!(IdleMode::from_code(i64::from(mode.code())), Some(mode));
        }
        for mode in [RatioMode::Global, RatioMode::Single, RatioMode::Unlimited] {
            assert_eq!(RatioMode::from_code(i64::from(mode.code())), Some(mode));
        }
        assert_eq!(IdleMode::from_code(7), None);
        assert_eq!(RatioMode::from_code(-1), None);
    }

    #[test]
    fn modes_deserialize_from_lowercase_names() {
        let profile: ThrottleProfile = serde_json::from_str(
            r#"{"seed_ratio_limit":1.5,"seed_ratio_mode":"unlimited","seed_idle_limit":30,
                "seed_idle_mode":"off","upload_limit":100,"upload_limited":true}"#,
        )
        .expect("profile should parse");
        assert_eq!(profile.seed_ratio_mode, RatioMode::Unlimited);
        assert_eq!(profile.seed_idle_mode, IdleMode::Off);
        assert_eq!(profile.upload_limit, 100);
    }

    #[test]
    fn completion_requires_full_progress() {
        let mut torrent = TorrentSnapshot {
            progress: 99.9,
            ..TorrentSnapshot::default()
        };
        assert!(!torrent.is_complete());
        torrent.progress = 100.0;
        assert!(torrent.is_complete());
    }

    #[test]
    fn change_constructors_touch_one_concern() {
        let labels = TorrentChange::labels(vec!["a".into()]);
        assert!(labels.throttle.is_none());
        let throttle = TorrentChange::throttle(ThrottleProfile::default());
        assert!(throttle.labels.is_none());
        assert!(TorrentChange::default().is_empty());
        assert_eq!(TorrentState::Queued.as_str(), "queued");
    }
}
