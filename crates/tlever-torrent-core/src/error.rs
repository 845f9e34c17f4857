//! Error types for daemon session calls.

use thiserror::Error;

/// Primary error type surfaced by `DaemonSession` implementations.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// The daemon rejected the configured credentials.
    #[error("daemon authentication failed")]
    Unauthorized,
    /// The daemon could not be reached at all.
    #[error("daemon unreachable")]
    Unreachable {
        /// Endpoint that was contacted.
        endpoint: String,
        /// Human-readable detail from the transport.
        detail: String,
    },
    /// A request reached the daemon but the exchange failed mid-flight.
    #[error("daemon transport failure")]
    Transport {
        /// RPC method being invoked.
        method: &'static str,
        /// Human-readable detail from the transport.
        detail: String,
    },
    /// The requested torrent does not exist in the daemon.
    #[error("torrent not found")]
    NotFound {
        /// Hash that was requested.
        hash: String,
    },
    /// The daemon answered with a non-success result string.
    #[error("daemon rejected request")]
    Rpc {
        /// RPC method being invoked.
        method: &'static str,
        /// Result string returned by the daemon.
        result: String,
    },
    /// The daemon response could not be decoded.
    #[error("daemon response could not be decoded")]
    Decode {
        /// RPC method being invoked.
        method: &'static str,
        /// Human-readable decode detail.
        detail: String,
    },
}

impl DaemonError {
    /// Whether the failure means no further daemon call can succeed, so a
    /// batch must stop rather than continue with the next torrent.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Unreachable { .. })
    }

    /// Human-readable detail including the context fields.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Unauthorized => self.to_string(),
            Self::Unreachable { endpoint, detail } => format!("{self} ({endpoint}): {detail}"),
            Self::Transport { method, detail } | Self::Decode { method, detail } => {
                format!("{self} ({method}): {detail}")
            }
            Self::NotFound { hash } => format!("{self}: {hash}"),
            Self::Rpc { method, result } => format!("{self} ({method}): {result}"),
        }
    }
}

/// Convenience alias for daemon call results.
pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors_cover_auth_and_connectivity() {
        assert!(DaemonError::Unauthorized.is_fatal());
        assert!(
            DaemonError::Unreachable {
                endpoint: "http://127.0.0.1:9091".into(),
                detail: "connection refused".into(),
            }
            .is_fatal()
        );
        assert!(
            !DaemonError::NotFound {
                hash: "abc".into()
            }
            .is_fatal()
        );
        assert!(
            !DaemonError::Transport {
                method: "torrent-set",
                detail: "reset".into(),
            }
            .is_fatal()
        );
    }

    #[test]
    fn detail_includes_context() {
        let err = DaemonError::Rpc {
            method: "torrent-set",
            result: "invalid argument".into(),
        };
        let detail = err.detail();
        assert!(detail.contains("torrent-set"));
        assert!(detail.contains("invalid argument"));
    }
}
