//! # Design
//!
//! - Constant messages with structured context fields.
//! - Daemon failures keep the operation that issued the call so batch
//!   reports can say which step broke.

use thiserror::Error;
use tlever_torrent_core::DaemonError;

/// Errors produced by reconciliation operations.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A daemon call failed.
    #[error("daemon call failed")]
    Daemon {
        /// Operation that issued the call.
        operation: &'static str,
        /// Underlying daemon error.
        #[source]
        source: DaemonError,
    },
    /// A category name cannot be used as a relative storage path.
    #[error("invalid category name")]
    InvalidCategory {
        /// Offending name.
        name: String,
        /// Static reason for the rejection.
        reason: &'static str,
    },
    /// A label cannot be written to the daemon.
    #[error("invalid label")]
    InvalidLabel {
        /// Offending label.
        label: String,
        /// Static reason for the rejection.
        reason: &'static str,
    },
    /// A label search pattern failed to compile.
    #[error("invalid label pattern")]
    Pattern {
        /// Pattern source.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

impl ReconcileError {
    /// Whether the failure should abort a batch instead of being recorded
    /// against a single torrent.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::Daemon { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// Human-readable detail including context fields.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Daemon { operation, source } => {
                format!("{operation}: {}", source.detail())
            }
            Self::InvalidCategory { name, reason } => format!("{self} '{name}': {reason}"),
            Self::InvalidLabel { label, reason } => format!("{self} '{label}': {reason}"),
            Self::Pattern { pattern, source } => format!("{self} '{pattern}': {source}"),
        }
    }
}

/// Convenience alias for reconciliation results.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

pub(crate) fn daemon_err(operation: &'static str) -> impl FnOnce(DaemonError) -> ReconcileError {
    move |source| ReconcileError::Daemon { operation, source }
}
