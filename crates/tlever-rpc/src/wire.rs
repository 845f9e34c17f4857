//! Wire shapes of Transmission RPC payloads.

use serde::Deserialize;
use serde_json::{Map, Value, json};
use tlever_torrent_core::{
    DaemonError, DaemonResult, IdleMode, RatioMode, SessionInfo, ThrottleProfile, TorrentChange,
    TorrentSnapshot, TorrentState,
};

pub(crate) const TORRENT_FIELDS: [&str; 19] = [
    "hashString",
    "name",
    "labels",
    "uploadRatio",
    "percentDone",
    "status",
    "downloadDir",
    "eta",
    "rateUpload",
    "rateDownload",
    "uploadLimit",
    "uploadLimited",
    "downloadLimit",
    "downloadLimited",
    "seedIdleLimit",
    "seedIdleMode",
    "seedRatioLimit",
    "seedRatioMode",
    "group",
];

pub(crate) const SESSION_FIELDS: [&str; 5] = [
    "download-dir",
    "seedRatioLimit",
    "seedRatioLimited",
    "rpc-version",
    "version",
];

/// Outer response envelope shared by every method.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub(crate) result: String,
    #[serde(default)]
    pub(crate) arguments: Value,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TorrentList {
    #[serde(default)]
    pub(crate) torrents: Vec<WireTorrent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct WireTorrent {
    hash_string: String,
    name: String,
    labels: Vec<String>,
    upload_ratio: f64,
    percent_done: f64,
    status: i64,
    download_dir: String,
    eta: i64,
    rate_upload: u64,
    rate_download: u64,
    upload_limit: u64,
    upload_limited: bool,
    download_limit: u64,
    download_limited: bool,
    seed_idle_limit: u32,
    seed_idle_mode: i64,
    seed_ratio_limit: f64,
    seed_ratio_mode: i64,
    group: Option<String>,
}

impl WireTorrent {
    pub(crate) fn into_snapshot(self, method: &'static str) -> DaemonResult<TorrentSnapshot> {
        let decode = |field: &str, code: i64| DaemonError::Decode {
            method,
            detail: format!("unknown {field} code {code}"),
        };
        let state = state_from_code(self.status).ok_or_else(|| decode("status", self.status))?;
        let seed_idle_mode = IdleMode::from_code(self.seed_idle_mode)
            .ok_or_else(|| decode("seedIdleMode", self.seed_idle_mode))?;
        let seed_ratio_mode = RatioMode::from_code(self.seed_ratio_mode)
            .ok_or_else(|| decode("seedRatioMode", self.seed_ratio_mode))?;

        Ok(TorrentSnapshot {
            hash: self.hash_string,
            name: self.name,
            labels: self.labels,
            ratio: self.upload_ratio,
            progress: self.percent_done * 100.0,
            state,
            download_dir: self.download_dir,
            eta: self.eta,
            rate_upload: self.rate_upload,
            rate_download: self.rate_download,
            upload_limit: self.upload_limit,
            upload_limited: self.upload_limited,
            download_limit: self.download_limit,
            download_limited: self.download_limited,
            seed_idle_limit: self.seed_idle_limit,
            seed_idle_mode,
            seed_ratio_limit: self.seed_ratio_limit,
            seed_ratio_mode,
            group: self.group.filter(|group| !group.is_empty()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireSession {
    #[serde(rename = "download-dir")]
    download_dir: String,
    #[serde(rename = "seedRatioLimit")]
    seed_ratio_limit: f64,
    #[serde(rename = "seedRatioLimited")]
    seed_ratio_limited: bool,
    #[serde(rename = "rpc-version")]
    rpc_version: u32,
    version: String,
}

impl From<WireSession> for SessionInfo {
    fn from(wire: WireSession) -> Self {
        Self {
            download_dir: wire.download_dir,
            seed_ratio_limit: wire.seed_ratio_limit,
            seed_ratio_limited: wire.seed_ratio_limited,
            rpc_version: wire.rpc_version,
            version: wire.version,
        }
    }
}

/// Transmission status codes; the three waiting states collapse to `Queued`.
pub(crate) const fn state_from_code(code: i64) -> Option<TorrentState> {
    match code {
        0 => Some(TorrentState::Stopped),
        1 | 3 | 5 => Some(TorrentState::Queued),
        2 => Some(TorrentState::Checking),
        4 => Some(TorrentState::Downloading),
        6 => Some(TorrentState::Seeding),
        _ => None,
    }
}

/// `torrent-set` arguments carrying only the fields present in `change`.
pub(crate) fn torrent_set_arguments(ids: &[String], change: &TorrentChange) -> Value {
    let mut arguments = Map::new();
    arguments.insert("ids".to_string(), json!(ids));
    if let Some(labels) = &change.labels {
        arguments.insert("labels".to_string(), json!(labels));
    }
    if let Some(profile) = &change.throttle {
        insert_throttle(&mut arguments, profile);
    }
    Value::Object(arguments)
}

fn insert_throttle(arguments: &mut Map<String, Value>, profile: &ThrottleProfile) {
    let fields = [
        ("seedRatioLimit", json!(profile.seed_ratio_limit)),
        ("seedRatioMode", json!(profile.seed_ratio_mode.code())),
        ("seedIdleLimit", json!(profile.seed_idle_limit)),
        ("seedIdleMode", json!(profile.seed_idle_mode.code())),
        ("uploadLimit", json!(profile.upload_limit)),
        ("uploadLimited", json!(profile.upload_limited)),
    ];
    for (key, value) in fields {
        arguments.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn torrent_decodes_codes_and_scales_progress() -> anyhow::Result<()> {
        let wire: WireTorrent = serde_json::from_value(json!({
            "hashString": "abc",
            "name": "debian.iso",
            "labels": ["%tier-1"],
            "uploadRatio": 1.25,
            "percentDone": 0.5,
            "status": 3,
            "downloadDir": "/srv/torrents",
            "eta": -1,
            "seedIdleMode": 2,
            "seedRatioMode": 1,
            "group": ""
        }))?;
        let snapshot = wire.into_snapshot("torrent-get")?;
        assert_eq!(snapshot.state, TorrentState::Queued);
        assert!((snapshot.progress - 50.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.seed_idle_mode, IdleMode::Off);
        assert_eq!(snapshot.seed_ratio_mode, RatioMode::Single);
        assert_eq!(snapshot.group, None);
        Ok(())
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        let wire = WireTorrent {
            status: 9,
            ..WireTorrent::default()
        };
        assert!(matches!(
            wire.into_snapshot("torrent-get"),
            Err(DaemonError::Decode { .. })
        ));
    }

    #[test]
    fn set_arguments_only_include_requested_fields() {
        let ids = vec!["abc".to_string()];
        let labels = torrent_set_arguments(&ids, &TorrentChange::labels(vec!["x".into()]));
        assert_eq!(labels, json!({"ids": ["abc"], "labels": ["x"]}));

        let profile = ThrottleProfile {
            seed_ratio_limit: 2.0,
            seed_ratio_mode: RatioMode::Single,
            seed_idle_limit: 30,
            seed_idle_mode: IdleMode::Off,
            upload_limit: 250,
            upload_limited: true,
        };
        let throttle = torrent_set_arguments(&ids, &TorrentChange::throttle(profile));
        assert_eq!(
            throttle,
            json!({
                "ids": ["abc"],
                "seedRatioLimit": 2.0,
                "seedRatioMode": 1,
                "seedIdleLimit": 30,
                "seedIdleMode": 2,
                "uploadLimit": 250,
                "uploadLimited": true
            })
        );
    }
}
