//! Bandwidth bands for complete torrents that outgrew the tier ladder.
//!
//! # Design
//! - Bands are read from config in increasing `min_ratio` order; the
//!   highest band strictly below a torrent's ratio wins.
//! - Releasing keeps the clog profile but lifts the upload cap.

use tlever_config::{ClogBand, LeverConfig};
use tlever_torrent_core::{DaemonSession, ThrottleProfile};
use tracing::debug;

use crate::batch::{BatchReport, run_batch};
use crate::error::{ReconcileResult, daemon_err};
use crate::throttle::apply_throttle;

/// What a clog pass did to a torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClogOutcome {
    /// Incomplete or below every band.
    Skipped,
    /// Upload capped at `upload_limit` KiB/s.
    Clogged {
        /// Applied cap.
        upload_limit: u64,
    },
    /// Upload cap lifted.
    Released,
}

/// Highest band whose `min_ratio` is below `ratio`.
#[must_use]
pub fn select_band(bands: &[ClogBand], ratio: f64) -> Option<&ClogBand> {
    bands.iter().rev().find(|band| band.min_ratio < ratio)
}

/// Cap uploads of complete torrents above the lowest band.
///
/// # Errors
///
/// Returns an error when listing fails or a fatal daemon error aborts the
/// pass.
pub async fn set_clog(
    session: &dyn DaemonSession,
    config: &LeverConfig,
) -> ReconcileResult<BatchReport<ClogOutcome>> {
    let torrents = session
        .get_torrents()
        .await
        .map_err(daemon_err("clog.list"))?;
    run_batch("clog set", torrents, |torrent| async move {
        let band = select_band(&config.clog.bands, torrent.ratio);
        let Some(band) = band.filter(|_| torrent.is_complete()) else {
            debug!(hash = %torrent.hash, ratio = torrent.ratio, "below clog bands, skipping");
            return Ok(ClogOutcome::Skipped);
        };
        let profile = ThrottleProfile {
            upload_limit: band.upload_limit,
            upload_limited: true,
            ..config.clog.profile
        };
        apply_throttle(session, &torrent.hash, &profile).await?;
        Ok(ClogOutcome::Clogged {
            upload_limit: band.upload_limit,
        })
    })
    .await
}

/// Lift the upload cap on complete torrents above the lowest band.
///
/// # Errors
///
/// Returns an error when listing fails or a fatal daemon error aborts the
/// pass.
pub async fn unset_clog(
    session: &dyn DaemonSession,
    config: &LeverConfig,
) -> ReconcileResult<BatchReport<ClogOutcome>> {
    let torrents = session
        .get_torrents()
        .await
        .map_err(daemon_err("clog.list"))?;
    let released = ThrottleProfile {
        upload_limited: false,
        ..config.clog.profile
    };
    let released = &released;
    run_batch("clog unset", torrents, |torrent| async move {
        if !torrent.is_complete() || select_band(&config.clog.bands, torrent.ratio).is_none() {
            return Ok(ClogOutcome::Skipped);
        }
        apply_throttle(session, &torrent.hash, released).await?;
        Ok(ClogOutcome::Released)
    })
    .await
}
