//! Ratio ladder classification and the tier passes built on it.
//!
//! # Design
//! - Classification is pure; [`reconcile_tier`] is the only place that turns
//!   a plan into label and throttle writes.
//! - Only complete torrents are tiered. Incomplete torrents are skipped
//!   without resetting anything.
//! - A free label takes precedence over the ratio.
//! - Promotion swaps out tier `index - 1`. Any other numeric tier label is
//!   removed in the same pass, so a torrent that jumped several tiers ends
//!   with exactly one.

use std::collections::BTreeSet;

use tlever_config::LeverConfig;
use tlever_torrent_core::{DaemonSession, ThrottleProfile, TorrentSnapshot, TorrentState};
use tracing::{debug, info, warn};

use crate::batch::{BatchReport, run_batch};
use crate::error::{ReconcileResult, daemon_err};
use crate::label::{Label, LabelCodec, TierLabel};
use crate::store::{LABEL_SEPARATOR, LabelStore};
use crate::throttle::apply_throttle;

/// Ordered tier table; tier `i` covers ratios below `tiers[i].seed_ratio_limit`
/// and at or above the previous tier's limit.
#[derive(Debug, Clone, PartialEq)]
pub struct TierLadder {
    tiers: Vec<ThrottleProfile>,
}

impl TierLadder {
    /// Ladder over the given profiles, whose ratio limits must be strictly
    /// increasing.
    #[must_use]
    pub const fn new(tiers: Vec<ThrottleProfile>) -> Self {
        Self { tiers }
    }

    /// Ladder configured in `config.tiers`.
    #[must_use]
    pub fn from_config(config: &LeverConfig) -> Self {
        Self::new(config.tiers.clone())
    }

    /// Throttle profile of tier `index`.
    #[must_use]
    pub fn profile(&self, index: usize) -> Option<&ThrottleProfile> {
        self.tiers.get(index)
    }

    /// Smallest tier whose threshold is above `ratio`.
    ///
    /// Negative or NaN ratios and ratios at or above the last threshold
    /// return `None`.
    #[must_use]
    pub fn classify(&self, ratio: f64) -> Option<usize> {
        if ratio.is_nan() || ratio < 0.0 {
            return None;
        }
        self.tiers
            .iter()
            .position(|tier| ratio < tier.seed_ratio_limit)
    }
}

/// Desired tier state for one torrent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TierPlan {
    /// Download not finished; leave untouched.
    Incomplete,
    /// Carries the free label.
    Free,
    /// Belongs in the given tier.
    Assign(usize),
    /// Ratio is outside every tier.
    OutOfBounds(f64),
}

/// Compute the tier plan for `torrent` without touching the daemon.
#[must_use]
pub fn plan_tier(torrent: &TorrentSnapshot, ladder: &TierLadder, codec: &LabelCodec) -> TierPlan {
    if !torrent.is_complete() {
        return TierPlan::Incomplete;
    }
    let free = torrent
        .labels
        .iter()
        .any(|raw| codec.parse(raw) == Label::Tier(TierLabel::Free));
    if free {
        return TierPlan::Free;
    }
    ladder
        .classify(torrent.ratio)
        .map_or(TierPlan::OutOfBounds(torrent.ratio), TierPlan::Assign)
}

/// What [`reconcile_tier`] did to a torrent.
#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome {
    /// Incomplete torrent, nothing written.
    Skipped,
    /// Free profile re-applied.
    Free,
    /// Label and profile for `tier` applied.
    Assigned {
        /// Target tier.
        tier: usize,
        /// Whether the previous tier's label was replaced.
        swapped: bool,
        /// Numeric tier labels removed besides the one swapped out.
        cleaned: Vec<String>,
    },
    /// Ratio outside the ladder, nothing written.
    OutOfBounds {
        /// Observed ratio.
        ratio: f64,
    },
}

/// Bring one torrent's tier label and throttle profile in line with its
/// ratio.
///
/// # Errors
///
/// Returns an error when a daemon read or write fails. Writes issued before
/// the failure stay applied; the next pass converges.
pub async fn reconcile_tier(
    session: &dyn DaemonSession,
    config: &LeverConfig,
    torrent: &TorrentSnapshot,
) -> ReconcileResult<TierOutcome> {
    let codec = LabelCodec::from(&config.general.prefix);
    let ladder = TierLadder::from_config(config);
    let hash = torrent.hash.as_str();

    match plan_tier(torrent, &ladder, &codec) {
        TierPlan::Incomplete => {
            debug!(hash, progress = torrent.progress, "torrent incomplete, skipping");
            Ok(TierOutcome::Skipped)
        }
        TierPlan::Free => {
            apply_throttle(session, hash, &config.general.free).await?;
            info!(hash, "free tier re-applied");
            Ok(TierOutcome::Free)
        }
        TierPlan::OutOfBounds(ratio) => {
            warn!(hash, ratio, "ratio outside the tier ladder, leaving unchanged");
            Ok(TierOutcome::OutOfBounds { ratio })
        }
        TierPlan::Assign(index) => {
            let Some(profile) = ladder.profile(index) else {
                return Ok(TierOutcome::OutOfBounds {
                    ratio: torrent.ratio,
                });
            };
            let store = LabelStore::new(session, codec);
            let target = codec.tier_label(index);

            let numeric = numeric_tier_labels(&torrent.labels, &codec);
            let mut cleaned = Vec::new();
            if numeric.len() > 1 {
                warn!(hash, labels = ?numeric, "multiple tier labels present, cleaning");
                cleaned = remove_tier_labels(&store, hash, &numeric, &target).await?;
            }

            let swapped = if index == 0 {
                store.add_label(hash, &target).await?;
                false
            } else {
                store
                    .swap_label(hash, &codec.tier_label(index - 1), &target)
                    .await?
            };
            // A lone label that is not the previous tier survives the swap.
            if numeric.len() == 1 && !swapped {
                cleaned = remove_tier_labels(&store, hash, &numeric, &target).await?;
            }
            apply_throttle(session, hash, profile).await?;
            info!(hash, tier = index, ratio = torrent.ratio, "tier assigned");
            Ok(TierOutcome::Assigned {
                tier: index,
                swapped,
                cleaned,
            })
        }
    }
}

/// Run [`reconcile_tier`] over every torrent.
///
/// # Errors
///
/// Returns an error when listing fails or a fatal daemon error aborts the
/// pass.
pub async fn set_tiers(
    session: &dyn DaemonSession,
    config: &LeverConfig,
) -> ReconcileResult<BatchReport<TierOutcome>> {
    let torrents = session
        .get_torrents()
        .await
        .map_err(daemon_err("tiers.list"))?;
    run_batch("tier set", torrents, |torrent| async move {
        reconcile_tier(session, config, &torrent).await
    })
    .await
}

/// What [`unset_tiers`] did to a torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsetOutcome {
    /// No numeric tier label present.
    Untouched,
    /// Numeric tier labels removed and the free profile applied.
    Cleared {
        /// Labels removed.
        removed: Vec<String>,
    },
}

/// Remove every numeric tier label from every torrent and apply the free
/// profile to those that had one. Free labels are kept.
///
/// # Errors
///
/// Returns an error when listing fails or a fatal daemon error aborts the
/// pass.
pub async fn unset_tiers(
    session: &dyn DaemonSession,
    config: &LeverConfig,
) -> ReconcileResult<BatchReport<UnsetOutcome>> {
    let codec = LabelCodec::from(&config.general.prefix);
    let pattern = codec.numeric_tier_pattern()?;
    let torrents = session
        .get_torrents()
        .await
        .map_err(daemon_err("tiers.list"))?;

    let pattern = &pattern;
    run_batch("tier unset", torrents, |torrent| async move {
        let hash = torrent.hash.as_str();
        if !pattern.is_match(&torrent.labels.join(LABEL_SEPARATOR)) {
            return Ok(UnsetOutcome::Untouched);
        }
        let store = LabelStore::new(session, codec);
        let mut removed = Vec::new();
        for label in numeric_tier_labels(&torrent.labels, &codec) {
            if store.remove_label(hash, &label).await? {
                removed.push(label);
            }
        }
        apply_throttle(session, hash, &config.general.free).await?;
        info!(hash, removed = ?removed, "tier labels cleared");
        Ok(UnsetOutcome::Cleared { removed })
    })
    .await
}

/// What [`activate_tiers`] did to a torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateOutcome {
    /// No numeric tier label; left alone.
    Untiered,
    /// Tiered and already running.
    Running,
    /// Tiered and stopped; start requested.
    Started,
}

/// Start every stopped torrent that carries a numeric tier label.
///
/// # Errors
///
/// Returns an error when listing fails or a fatal daemon error aborts the
/// pass.
pub async fn activate_tiers(
    session: &dyn DaemonSession,
    config: &LeverConfig,
) -> ReconcileResult<BatchReport<ActivateOutcome>> {
    let codec = LabelCodec::from(&config.general.prefix);
    let torrents = session
        .get_torrents()
        .await
        .map_err(daemon_err("tiers.list"))?;

    run_batch("tier activate", torrents, |torrent| async move {
        if numeric_tier_labels(&torrent.labels, &codec).is_empty() {
            return Ok(ActivateOutcome::Untiered);
        }
        if torrent.state != TorrentState::Stopped {
            return Ok(ActivateOutcome::Running);
        }
        session
            .start_torrent(&[torrent.hash.clone()])
            .await
            .map_err(daemon_err("tiers.activate"))?;
        info!(hash = %torrent.hash, "started tiered torrent");
        Ok(ActivateOutcome::Started)
    })
    .await
}

/// Combined result of [`enforce_tiers`].
#[derive(Debug)]
pub struct EnforceReport {
    /// Result of the assignment pass.
    pub set: BatchReport<TierOutcome>,
    /// Result of the activation pass.
    pub activate: BatchReport<ActivateOutcome>,
}

impl EnforceReport {
    /// Whether both passes finished without per-torrent failures.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.set.is_clean() && self.activate.is_clean()
    }
}

/// [`set_tiers`] followed by [`activate_tiers`].
///
/// # Errors
///
/// Returns an error when either pass aborts.
pub async fn enforce_tiers(
    session: &dyn DaemonSession,
    config: &LeverConfig,
) -> ReconcileResult<EnforceReport> {
    let set = set_tiers(session, config).await?;
    let activate = activate_tiers(session, config).await?;
    Ok(EnforceReport { set, activate })
}

async fn remove_tier_labels(
    store: &LabelStore<'_>,
    hash: &str,
    labels: &[String],
    keep: &str,
) -> ReconcileResult<Vec<String>> {
    let mut removed = Vec::new();
    for label in labels.iter().filter(|label| label.as_str() != keep) {
        if store.remove_label(hash, label).await? {
            removed.push(label.clone());
        }
    }
    Ok(removed)
}

fn numeric_tier_labels(labels: &[String], codec: &LabelCodec) -> Vec<String> {
    let mut seen = BTreeSet::new();
    labels
        .iter()
        .filter(|raw| matches!(codec.parse(raw), Label::Tier(TierLabel::Index(_))))
        .filter(|raw| seen.insert(raw.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlever_test_support::{MemoryDaemon, fixtures};

    const CODEC: LabelCodec = LabelCodec::new('%', '@', '#');

    fn ladder() -> TierLadder {
        TierLadder::from_config(&fixtures::config())
    }

    #[test]
    fn classify_is_monotonic_over_half_open_ranges() {
        let ladder = ladder();
        assert_eq!(ladder.classify(0.0), Some(0));
        assert_eq!(ladder.classify(0.5), Some(0));
        assert_eq!(ladder.classify(1.0), Some(1));
        assert_eq!(ladder.classify(1.5), Some(1));
        assert_eq!(ladder.classify(2.999), Some(2));
        assert_eq!(ladder.classify(3.0), None);
        assert_eq!(ladder.classify(3.5), None);
        assert_eq!(ladder.classify(-1.0), None);
        assert_eq!(ladder.classify(f64::NAN), None);

        let mut previous = 0;
        for step in 0..300 {
            let ratio = f64::from(step) / 100.0;
            let tier = ladder.classify(ratio).expect("inside ladder");
            assert!(tier >= previous);
            previous = tier;
        }
    }

    #[test]
    fn plan_gates_on_progress_then_free_label() {
        let ladder = ladder();
        let mut torrent = fixtures::labelled("h", 0.1, &["%tier-free"]);
        assert_eq!(plan_tier(&torrent, &ladder, &CODEC), TierPlan::Free);

        torrent.progress = 99.9;
        assert_eq!(plan_tier(&torrent, &ladder, &CODEC), TierPlan::Incomplete);

        let torrent = fixtures::torrent("h", 3.5);
        assert_eq!(plan_tier(&torrent, &ladder, &CODEC), TierPlan::OutOfBounds(3.5));
        let torrent = fixtures::torrent("h", 1.5);
        assert_eq!(plan_tier(&torrent, &ladder, &CODEC), TierPlan::Assign(1));
    }

    #[tokio::test]
    async fn promotion_swaps_previous_label_and_applies_profile() -> anyhow::Result<()> {
        let config = fixtures::config();
        let torrent = fixtures::labelled("h", 1.5, &["linux", "%tier-0"]);
        let daemon = MemoryDaemon::new(fixtures::session()).with_torrents([torrent.clone()]);

        let outcome = reconcile_tier(&daemon, &config, &torrent).await?;

        assert_eq!(
            outcome,
            TierOutcome::Assigned {
                tier: 1,
                swapped: true,
                cleaned: Vec::new()
            }
        );
        assert_eq!(daemon.labels("h"), vec!["linux", "%tier-1"]);
        let stored = daemon.torrent("h").expect("torrent present");
        assert_eq!(stored.throttle(), config.tiers[1]);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_tier_labels_are_cleaned() -> anyhow::Result<()> {
        let config = fixtures::config();
        let torrent = fixtures::labelled("h", 2.5, &["%tier-0", "%tier-1"]);
        let daemon = MemoryDaemon::new(fixtures::session()).with_torrents([torrent.clone()]);

        let outcome = reconcile_tier(&daemon, &config, &torrent).await?;

        assert_eq!(
            outcome,
            TierOutcome::Assigned {
                tier: 2,
                swapped: false,
                cleaned: vec!["%tier-0".to_string(), "%tier-1".to_string()],
            }
        );
        assert_eq!(daemon.labels("h"), vec!["%tier-2"]);
        Ok(())
    }

    #[tokio::test]
    async fn jump_over_several_tiers_leaves_one_label() -> anyhow::Result<()> {
        let config = fixtures::config();
        let torrent = fixtures::labelled("h", 2.5, &["%tier-0", "linux"]);
        let daemon = MemoryDaemon::new(fixtures::session()).with_torrents([torrent.clone()]);

        let outcome = reconcile_tier(&daemon, &config, &torrent).await?;

        assert_eq!(
            outcome,
            TierOutcome::Assigned {
                tier: 2,
                swapped: false,
                cleaned: vec!["%tier-0".to_string()],
            }
        );
        assert_eq!(daemon.labels("h"), vec!["linux", "%tier-2"]);
        Ok(())
    }

    #[tokio::test]
    async fn out_of_bounds_and_incomplete_torrents_are_not_written() -> anyhow::Result<()> {
        let config = fixtures::config();
        let mut incomplete = fixtures::torrent("a", 0.5);
        incomplete.progress = 99.9;
        let high = fixtures::labelled("b", 3.5, &["%tier-2"]);
        let daemon =
            MemoryDaemon::new(fixtures::session()).with_torrents([incomplete, high]);

        let report = set_tiers(&daemon, &config).await?;

        assert!(report.is_clean());
        assert_eq!(report.outcome("a"), Some(&TierOutcome::Skipped));
        assert_eq!(
            report.outcome("b"),
            Some(&TierOutcome::OutOfBounds { ratio: 3.5 })
        );
        assert!(daemon.calls().is_empty());
        assert_eq!(daemon.labels("b"), vec!["%tier-2"]);
        Ok(())
    }

    #[tokio::test]
    async fn unset_removes_every_numeric_label_and_keeps_free() -> anyhow::Result<()> {
        let config = fixtures::config();
        let daemon = MemoryDaemon::new(fixtures::session()).with_torrents([
            fixtures::labelled("a", 1.5, &["%tier-0", "linux", "%tier-1"]),
            fixtures::labelled("b", 0.5, &["%tier-free"]),
        ]);

        let report = unset_tiers(&daemon, &config).await?;

        assert_eq!(
            report.outcome("a"),
            Some(&UnsetOutcome::Cleared {
                removed: vec!["%tier-0".to_string(), "%tier-1".to_string()]
            })
        );
        assert_eq!(report.outcome("b"), Some(&UnsetOutcome::Untouched));
        assert_eq!(daemon.labels("a"), vec!["linux"]);
        assert_eq!(daemon.labels("b"), vec!["%tier-free"]);
        let cleared = daemon.torrent("a").expect("torrent present");
        assert_eq!(cleared.throttle(), config.general.free);
        Ok(())
    }

    #[tokio::test]
    async fn activate_starts_only_stopped_tiered_torrents() -> anyhow::Result<()> {
        let config = fixtures::config();
        let mut stopped = fixtures::labelled("a", 0.5, &["%tier-0"]);
        stopped.state = TorrentState::Stopped;
        let running = fixtures::labelled("b", 0.5, &["%tier-0"]);
        let mut untiered = fixtures::labelled("c", 0.5, &["%tier-free"]);
        untiered.state = TorrentState::Stopped;
        let daemon =
            MemoryDaemon::new(fixtures::session()).with_torrents([stopped, running, untiered]);

        let report = activate_tiers(&daemon, &config).await?;

        assert_eq!(report.outcome("a"), Some(&ActivateOutcome::Started));
        assert_eq!(report.outcome("b"), Some(&ActivateOutcome::Running));
        assert_eq!(report.outcome("c"), Some(&ActivateOutcome::Untiered));
        assert_eq!(
            daemon.torrent("a").map(|torrent| torrent.state),
            Some(TorrentState::Seeding)
        );
        assert_eq!(
            daemon.torrent("c").map(|torrent| torrent.state),
            Some(TorrentState::Stopped)
        );
        Ok(())
    }

    #[tokio::test]
    async fn enforce_promotes_then_resumes() -> anyhow::Result<()> {
        let config = fixtures::config();
        let mut paused = fixtures::labelled("h", 1.2, &["%tier-0"]);
        paused.state = TorrentState::Stopped;
        let daemon = MemoryDaemon::new(fixtures::session()).with_torrents([paused]);

        let report = enforce_tiers(&daemon, &config).await?;

        assert!(report.is_clean());
        assert_eq!(daemon.labels("h"), vec!["%tier-1"]);
        assert_eq!(report.activate.outcome("h"), Some(&ActivateOutcome::Started));
        Ok(())
    }
}
