//! CLI error type, exit codes and daemon connection helpers.

use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;
use tlever_config::{ClientConfig, ConfigError, LeverConfig};
use tlever_reconcile::ReconcileError;
use tlever_rpc::{TransmissionClient, parse_endpoint};
use tlever_torrent_core::{DaemonError, DaemonSession, SessionInfo};
use tracing::{debug, info};

/// CLI-level error type mapped onto process exit codes.
#[derive(Debug)]
pub(crate) enum CliError {
    /// Bad arguments or configuration.
    Validation(String),
    /// The daemon cannot be reached or rejected the credentials.
    Unreachable(anyhow::Error),
    /// Any other operational failure.
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) fn from_config(err: &ConfigError) -> Self {
        Self::Validation(err.detail())
    }

    pub(crate) fn from_daemon(err: &DaemonError) -> Self {
        if err.is_fatal() {
            Self::Unreachable(anyhow!(err.detail()))
        } else {
            Self::Failure(anyhow!(err.detail()))
        }
    }

    pub(crate) fn from_reconcile(err: &ReconcileError) -> Self {
        match err {
            ReconcileError::InvalidCategory { .. } | ReconcileError::InvalidLabel { .. } => {
                Self::Validation(err.detail())
            }
            _ if err.is_fatal() => Self::Unreachable(anyhow!(err.detail())),
            _ => Self::Failure(anyhow!(err.detail())),
        }
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable(_) => 1,
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Unreachable(error) | Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Loaded configuration and live daemon session handed to command handlers.
#[derive(Clone, Copy)]
pub(crate) struct AppContext<'a> {
    pub(crate) session: &'a dyn DaemonSession,
    pub(crate) config: &'a LeverConfig,
}

/// Build the RPC client for the configured endpoint.
///
/// A host or path that cannot form a URL is a configuration problem, not a
/// daemon failure.
pub(crate) fn connect(config: &ClientConfig) -> CliResult<TransmissionClient> {
    parse_endpoint(config).map_err(|err| {
        CliError::validation(format!(
            "invalid Client endpoint '{}': {err}",
            config.endpoint()
        ))
    })?;
    let client = TransmissionClient::new(config).map_err(|err| CliError::from_daemon(&err))?;
    debug!(endpoint = %client.endpoint(), "daemon client ready");
    Ok(client)
}

/// Confirm the daemon answers before any command runs.
pub(crate) async fn verify_session(session: &dyn DaemonSession) -> CliResult<SessionInfo> {
    let info = session
        .get_session()
        .await
        .map_err(|err| CliError::from_daemon(&err))?;
    info!(
        version = %info.version,
        rpc_version = info.rpc_version,
        download_dir = %info.download_dir,
        "connected to daemon"
    );
    Ok(info)
}
