//! Label operations against the daemon.
//!
//! # Design
//! - Every mutation is one read followed by at most one full label-set write.
//!   There is no revision token: a concurrent edit between the read and the
//!   write is overwritten (last writer wins).
//! - Mutations that would not change the label set skip the write.

use regex::Regex;
use tlever_torrent_core::{DaemonError, DaemonSession, TorrentChange};
use tracing::{debug, info};

use crate::error::{ReconcileError, ReconcileResult, daemon_err};
use crate::label::{Label, LabelCodec};

/// Separator used when the label list is flattened for pattern matching.
pub const LABEL_SEPARATOR: &str = ",";

/// Typed label operations keyed by torrent hash.
#[derive(Clone, Copy)]
pub struct LabelStore<'a> {
    session: &'a dyn DaemonSession,
    codec: LabelCodec,
}

impl<'a> LabelStore<'a> {
    /// Store writing through `session` and parsing with `codec`.
    #[must_use]
    pub const fn new(session: &'a dyn DaemonSession, codec: LabelCodec) -> Self {
        Self { session, codec }
    }

    /// Codec used to parse and encode labels.
    #[must_use]
    pub const fn codec(&self) -> &LabelCodec {
        &self.codec
    }

    /// Current raw labels.
    ///
    /// # Errors
    ///
    /// Returns an error when the torrent cannot be read.
    pub async fn labels(&self, hash: &str) -> ReconcileResult<Vec<String>> {
        self.session
            .get_torrent(hash)
            .await
            .map(|torrent| torrent.labels)
            .map_err(daemon_err("labels.read"))
    }

    /// Current labels parsed into typed variants.
    ///
    /// # Errors
    ///
    /// Returns an error when the torrent cannot be read.
    pub async fn parsed_labels(&self, hash: &str) -> ReconcileResult<Vec<Label>> {
        Ok(self.codec.parse_all(&self.labels(hash).await?))
    }

    /// Exact membership test. A missing torrent has no labels.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures other than "not found".
    pub async fn has_label(&self, hash: &str, label: &str) -> ReconcileResult<bool> {
        Ok(self
            .labels_or_empty(hash)
            .await?
            .iter()
            .any(|existing| existing == label))
    }

    /// Whether `pattern` matches the labels joined with [`LABEL_SEPARATOR`].
    /// A missing torrent has no labels.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures other than "not found".
    pub async fn has_label_matching(&self, hash: &str, pattern: &Regex) -> ReconcileResult<bool> {
        let joined = self.labels_or_empty(hash).await?.join(LABEL_SEPARATOR);
        Ok(pattern.is_match(&joined))
    }

    /// Append `label` unless already present. Returns `true` when written.
    ///
    /// # Errors
    ///
    /// Returns an error for unwritable labels or daemon failures.
    pub async fn add_label(&self, hash: &str, label: &str) -> ReconcileResult<bool> {
        ensure_writable(label)?;
        let mut labels = self.labels(hash).await?;
        if labels.iter().any(|existing| existing == label) {
            debug!(hash, label, "label already present, skipping");
            return Ok(false);
        }
        labels.push(label.to_string());
        self.write(hash, labels).await?;
        info!(hash, label, "added label");
        Ok(true)
    }

    /// Drop every occurrence of `label`. Returns `true` when written.
    ///
    /// # Errors
    ///
    /// Returns an error when the daemon read or write fails.
    pub async fn remove_label(&self, hash: &str, label: &str) -> ReconcileResult<bool> {
        let labels = self.labels(hash).await?;
        if !labels.iter().any(|existing| existing == label) {
            debug!(hash, label, "label absent, skipping removal");
            return Ok(false);
        }
        let retained = labels
            .into_iter()
            .filter(|existing| existing != label)
            .collect();
        self.write(hash, retained).await?;
        info!(hash, label, "removed label");
        Ok(true)
    }

    /// Replace `old` with `new` in one write.
    ///
    /// When `old` is absent only `new` is added (idempotently) and `false` is
    /// returned; when present `old` is removed, `new` added, and `true`
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns an error for unwritable labels or daemon failures.
    pub async fn swap_label(&self, hash: &str, old: &str, new: &str) -> ReconcileResult<bool> {
        ensure_writable(new)?;
        let labels = self.labels(hash).await?;
        let had_old = labels.iter().any(|existing| existing == old);
        let had_new = labels.iter().any(|existing| existing == new);

        if !had_old {
            debug!(hash, old, "old label absent, skipping removal");
            if !had_new {
                let mut labels = labels;
                labels.push(new.to_string());
                self.write(hash, labels).await?;
                info!(hash, label = new, "added label");
            }
            return Ok(false);
        }

        let mut swapped: Vec<String> = labels
            .into_iter()
            .filter(|existing| existing != old)
            .collect();
        if !swapped.iter().any(|existing| existing == new) {
            swapped.push(new.to_string());
        }
        self.write(hash, swapped).await?;
        info!(hash, old, new, "swapped label");
        Ok(true)
    }

    async fn labels_or_empty(&self, hash: &str) -> ReconcileResult<Vec<String>> {
        match self.session.get_torrent(hash).await {
            Ok(torrent) => Ok(torrent.labels),
            Err(DaemonError::NotFound { .. }) => Ok(Vec::new()),
            Err(err) => Err(daemon_err("labels.read")(err)),
        }
    }

    async fn write(&self, hash: &str, labels: Vec<String>) -> ReconcileResult<()> {
        self.session
            .change_torrent(&[hash.to_string()], TorrentChange::labels(labels))
            .await
            .map_err(daemon_err("labels.write"))
    }
}

fn ensure_writable(label: &str) -> ReconcileResult<()> {
    if label.trim().is_empty() {
        return Err(ReconcileError::InvalidLabel {
            label: label.to_string(),
            reason: "labels must not be blank",
        });
    }
    if label.contains(LABEL_SEPARATOR) {
        return Err(ReconcileError::InvalidLabel {
            label: label.to_string(),
            reason: "labels must not contain ','",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlever_test_support::{DaemonCall, FailureMode, MemoryDaemon, fixtures};

    const CODEC: LabelCodec = LabelCodec::new('%', '@', '#');

    fn daemon(labels: &[&str]) -> MemoryDaemon {
        MemoryDaemon::new(fixtures::session()).with_torrents([fixtures::labelled("h", 1.0, labels)])
    }

    #[tokio::test]
    async fn add_label_is_idempotent() -> anyhow::Result<()> {
        let daemon = daemon(&["linux"]);
        let store = LabelStore::new(&daemon, CODEC);

        assert!(store.add_label("h", "#keep").await?);
        assert!(!store.add_label("h", "#keep").await?);
        assert_eq!(daemon.labels("h"), vec!["linux", "#keep"]);
        assert_eq!(daemon.calls().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn remove_label_is_idempotent() -> anyhow::Result<()> {
        let daemon = daemon(&["linux", "#keep"]);
        let store = LabelStore::new(&daemon, CODEC);

        assert!(store.remove_label("h", "#keep").await?);
        assert!(!store.remove_label("h", "#keep").await?);
        assert_eq!(daemon.labels("h"), vec!["linux"]);
        assert_eq!(daemon.calls().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn swap_with_absent_old_only_adds_once() -> anyhow::Result<()> {
        let daemon = daemon(&["linux"]);
        let store = LabelStore::new(&daemon, CODEC);

        assert!(!store.swap_label("h", "X", "Y").await?);
        assert!(!store.swap_label("h", "X", "Y").await?);
        assert_eq!(daemon.labels("h"), vec!["linux", "Y"]);
        assert_eq!(daemon.calls().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn swap_with_present_old_replaces_in_one_write() -> anyhow::Result<()> {
        let daemon = daemon(&["%tier-0", "linux"]);
        let store = LabelStore::new(&daemon, CODEC);

        assert!(store.swap_label("h", "%tier-0", "%tier-1").await?);
        assert_eq!(daemon.labels("h"), vec!["linux", "%tier-1"]);
        assert_eq!(daemon.calls().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn matching_and_membership_treat_missing_torrent_as_unlabelled() -> anyhow::Result<()> {
        let daemon = daemon(&["linux", "%tier-4"]);
        let store = LabelStore::new(&daemon, CODEC);
        let pattern = CODEC.numeric_tier_pattern()?;

        assert!(store.has_label("h", "linux").await?);
        assert!(!store.has_label("h", "lin").await?);
        assert!(store.has_label_matching("h", &pattern).await?);
        assert!(!store.has_label("missing", "linux").await?);
        assert!(!store.has_label_matching("missing", &pattern).await?);
        Ok(())
    }

    #[tokio::test]
    async fn parsed_labels_are_typed() -> anyhow::Result<()> {
        let daemon = daemon(&["@tv", "#keep", "%tier-free"]);
        let store = LabelStore::new(&daemon, CODEC);
        let parsed = store.parsed_labels("h").await?;
        assert_eq!(
            parsed,
            vec![
                Label::Category("tv".into()),
                Label::Tag("keep".into()),
                Label::Tier(crate::label::TierLabel::Free),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_edit_between_read_and_write_is_overwritten() -> anyhow::Result<()> {
        let daemon = daemon(&["linux"]);
        let store = LabelStore::new(&daemon, CODEC);

        let snapshot = store.labels("h").await?;
        daemon.set_labels("h", &["linux", "external"]);
        let mut next = snapshot;
        next.push("#keep".into());
        store.write("h", next).await?;

        assert_eq!(daemon.labels("h"), vec!["linux", "#keep"]);
        Ok(())
    }

    #[tokio::test]
    async fn blank_and_separator_labels_are_rejected() {
        let daemon = daemon(&[]);
        let store = LabelStore::new(&daemon, CODEC);
        assert!(matches!(
            store.add_label("h", "  ").await,
            Err(ReconcileError::InvalidLabel { .. })
        ));
        assert!(matches!(
            store.swap_label("h", "a", "b,c").await,
            Err(ReconcileError::InvalidLabel { .. })
        ));
        assert!(daemon.calls().is_empty());
    }

    #[tokio::test]
    async fn write_failures_propagate_as_daemon_errors() {
        let daemon = daemon(&[]);
        daemon.fail("h", FailureMode::Writes);
        let store = LabelStore::new(&daemon, CODEC);
        let err = store
            .add_label("h", "#keep")
            .await
            .expect_err("injected failure");
        assert!(matches!(
            err,
            ReconcileError::Daemon {
                operation: "labels.write",
                ..
            }
        ));
        assert!(
            !daemon
                .calls()
                .iter()
                .any(|call| matches!(call, DaemonCall::Change { .. }))
        );
    }
}
