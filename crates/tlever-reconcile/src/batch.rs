//! Per-torrent fault isolation for passes over the whole torrent list.
//!
//! # Design
//! - A failing torrent is logged and recorded; the pass moves on.
//! - Fatal daemon errors (bad credentials, unreachable endpoint) abort the
//!   pass immediately since every later call would fail the same way.

use std::future::Future;

use tlever_torrent_core::TorrentSnapshot;
use tracing::{debug, warn};

use crate::error::{ReconcileError, ReconcileResult};

/// A torrent whose work failed during a batch pass.
#[derive(Debug)]
pub struct TorrentFailure {
    /// Info hash.
    pub hash: String,
    /// Display name.
    pub name: String,
    /// Failure cause.
    pub error: ReconcileError,
}

/// Outcome of a batch pass in listing order.
#[derive(Debug)]
pub struct BatchReport<T> {
    /// Successful per-torrent outcomes keyed by hash.
    pub outcomes: Vec<(String, T)>,
    /// Torrents whose work failed.
    pub failures: Vec<TorrentFailure>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            outcomes: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> BatchReport<T> {
    /// Whether every torrent succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Outcome recorded for `hash`, if it succeeded.
    #[must_use]
    pub fn outcome(&self, hash: &str) -> Option<&T> {
        self.outcomes
            .iter()
            .find(|(candidate, _)| candidate == hash)
            .map(|(_, outcome)| outcome)
    }

    /// Failure recorded for `hash`, if any.
    #[must_use]
    pub fn failed(&self, hash: &str) -> Option<&TorrentFailure> {
        self.failures.iter().find(|failure| failure.hash == hash)
    }
}

pub(crate) async fn run_batch<T, F, Fut>(
    operation: &'static str,
    torrents: Vec<TorrentSnapshot>,
    mut work: F,
) -> ReconcileResult<BatchReport<T>>
where
    F: FnMut(TorrentSnapshot) -> Fut,
    Fut: Future<Output = ReconcileResult<T>>,
{
    let mut report = BatchReport::default();
    debug!(operation, torrents = torrents.len(), "starting batch pass");
    for torrent in torrents {
        let hash = torrent.hash.clone();
        let name = torrent.name.clone();
        match work(torrent).await {
            Ok(outcome) => report.outcomes.push((hash, outcome)),
            Err(error) if error.is_fatal() => return Err(error),
            Err(error) => {
                warn!(operation, hash = %hash, error = %error.detail(), "torrent failed, continuing");
                report.failures.push(TorrentFailure { hash, name, error });
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::daemon_err;
    use tlever_test_support::fixtures;
    use tlever_torrent_core::DaemonError;

    #[tokio::test]
    async fn failures_are_recorded_and_the_pass_continues() -> anyhow::Result<()> {
        let torrents = vec![
            fixtures::torrent("a", 0.1),
            fixtures::torrent("b", 0.2),
            fixtures::torrent("c", 0.3),
        ];
        let report = run_batch("test", torrents, |torrent| async move {
            if torrent.hash == "b" {
                Err(daemon_err("test")(DaemonError::NotFound { hash: torrent.hash }))
            } else {
                Ok(torrent.ratio)
            }
        })
        .await?;

        assert!(!report.is_clean());
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.outcome("c"), Some(&0.3));
        assert!(report.outcome("b").is_none());
        assert_eq!(report.failed("b").map(|f| f.name.as_str()), Some("torrent-b"));
        Ok(())
    }

    #[tokio::test]
    async fn fatal_errors_abort_the_pass() {
        let torrents = vec![fixtures::torrent("a", 0.1), fixtures::torrent("b", 0.2)];
        let mut seen = Vec::new();
        let result: ReconcileResult<BatchReport<()>> = run_batch("test", torrents, |torrent| {
            seen.push(torrent.hash);
            async { Err(daemon_err("test")(DaemonError::Unauthorized)) }
        })
        .await;

        assert!(result.is_err_and(|err| err.is_fatal()));
        assert_eq!(seen, vec!["a".to_string()]);
    }
}
