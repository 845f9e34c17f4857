//! Read-only projection of a torrent for display.

use tlever_torrent_core::{
    DaemonError, DaemonSession, RatioMode, SessionInfo, TorrentSnapshot, TorrentState,
};

use crate::error::{ReconcileResult, daemon_err};
use crate::label::{Label, LabelCodec, TierLabel};

const RATE_UNITS: [&str; 5] = ["B/s", "KiB/s", "MiB/s", "GiB/s", "TiB/s"];
const RATE_STEP: f64 = 1024.0;
const TAG_SEPARATOR: &str = ", ";

/// Display-ready view of one torrent.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    /// Display name.
    pub name: String,
    /// Info hash.
    pub hash: String,
    /// Ratio with its effective limit.
    pub ratio: String,
    /// Completion percentage.
    pub progress: f64,
    /// Lifecycle state.
    pub status: TorrentState,
    /// Bandwidth group.
    pub group: Option<String>,
    /// Tier label, if any.
    pub tier: Option<TierLabel>,
    /// Category payload, if any.
    pub category: Option<String>,
    /// Tag names joined with `", "`.
    pub tags: String,
    /// Upload rate and limit.
    pub upload: String,
    /// Download rate and limit.
    pub download: String,
    /// Time remaining.
    pub eta: String,
}

impl StatusSnapshot {
    /// Key/value rows in display order.
    #[must_use]
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let or_none = |value: Option<String>| value.unwrap_or_else(|| "None".to_string());
        vec![
            ("Name", self.name.clone()),
            ("Hash", self.hash.clone()),
            ("Status", self.status.as_str().to_string()),
            ("Progress", format!("{:.1}%", self.progress)),
            ("Ratio", self.ratio.clone()),
            ("Tier", or_none(self.tier.map(|tier| tier.to_string()))),
            ("Category", or_none(self.category.clone())),
            ("Tags", self.tags.clone()),
            ("Group", or_none(self.group.clone())),
            ("Upload", self.upload.clone()),
            ("Download", self.download.clone()),
            ("ETA", self.eta.clone()),
        ]
    }
}

/// Build the display view of `torrent`.
#[must_use]
pub fn project_status(
    torrent: &TorrentSnapshot,
    session: &SessionInfo,
    codec: &LabelCodec,
) -> StatusSnapshot {
    let mut tier = None;
    let mut category = None;
    let mut tags = Vec::new();
    for label in codec.parse_all(&torrent.labels) {
        match label {
            Label::Tier(found) => {
                tier.get_or_insert(found);
            }
            Label::Category(path) => {
                category.get_or_insert(path);
            }
            Label::Tag(name) => tags.push(name),
            Label::Other(_) => {}
        }
    }

    let ratio_limit = match torrent.seed_ratio_mode {
        RatioMode::Global => format!("[{:.2}] (Global)", session.seed_ratio_limit),
        RatioMode::Single => format!("[{:.2}]", torrent.seed_ratio_limit),
        RatioMode::Unlimited => "[Unlimited]".to_string(),
    };

    StatusSnapshot {
        name: torrent.name.clone(),
        hash: torrent.hash.clone(),
        ratio: format!("{:.2} {ratio_limit}", torrent.ratio),
        progress: torrent.progress,
        status: torrent.state,
        group: torrent.group.clone(),
        tier,
        category,
        tags: tags.join(TAG_SEPARATOR),
        upload: format_direction(
            torrent.upload_limited,
            torrent.rate_upload,
            torrent.upload_limit,
        ),
        download: format_direction(
            torrent.download_limited,
            torrent.rate_download,
            torrent.download_limit,
        ),
        eta: format_eta(torrent.eta),
    }
}

/// Read `hash` and the session, then project. `None` when the torrent is
/// gone.
///
/// # Errors
///
/// Returns an error for daemon failures other than "not found".
pub async fn fetch_status(
    session: &dyn DaemonSession,
    codec: &LabelCodec,
    hash: &str,
) -> ReconcileResult<Option<StatusSnapshot>> {
    let torrent = match session.get_torrent(hash).await {
        Ok(torrent) => torrent,
        Err(DaemonError::NotFound { .. }) => return Ok(None),
        Err(err) => return Err(daemon_err("status.torrent")(err)),
    };
    let info = session
        .get_session()
        .await
        .map_err(daemon_err("status.session"))?;
    Ok(Some(project_status(&torrent, &info, codec)))
}

/// Scale a byte rate into the largest unit it exceeds, truncated.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn format_rate(bytes_per_sec: u64) -> String {
    let mut size = bytes_per_sec as f64;
    let mut unit = 0;
    while size > RATE_STEP && unit < RATE_UNITS.len() - 1 {
        size /= RATE_STEP;
        unit += 1;
    }
    format!("{} {}", size.trunc() as u64, RATE_UNITS[unit])
}

/// Render an ETA in seconds, mapping the daemon sentinels.
#[must_use]
pub fn format_eta(eta: i64) -> String {
    match eta {
        -1 => "Not Available".to_string(),
        -2 => "Unknown".to_string(),
        seconds => seconds.to_string(),
    }
}

fn format_direction(limited: bool, rate: u64, limit_kib: u64) -> String {
    if limited {
        let limit = limit_kib.saturating_mul(1024);
        format!("{} [{}]", format_rate(rate), format_rate(limit))
    } else {
        "[Global]".to_string()
    }
}
