use tlever_reconcile::{
    ActivateOutcome, TierOutcome, UnsetOutcome, activate_tiers, enforce_tiers, set_tiers,
    unset_tiers,
};

use crate::client::{AppContext, CliError, CliResult};
use crate::output::{batch_lines, render_batch};

pub(crate) async fn handle_set(ctx: &AppContext<'_>) -> CliResult<()> {
    let report = set_tiers(ctx.session, ctx.config)
        .await
        .map_err(|err| CliError::from_reconcile(&err))?;
    render_batch("tier set", &report, set_kind)
}

pub(crate) async fn handle_unset(ctx: &AppContext<'_>) -> CliResult<()> {
    let report = unset_tiers(ctx.session, ctx.config)
        .await
        .map_err(|err| CliError::from_reconcile(&err))?;
    render_batch("tier unset", &report, |outcome| match outcome {
        UnsetOutcome::Untouched => "untouched",
        UnsetOutcome::Cleared { .. } => "cleared",
    })
}

pub(crate) async fn handle_activate(ctx: &AppContext<'_>) -> CliResult<()> {
    let report = activate_tiers(ctx.session, ctx.config)
        .await
        .map_err(|err| CliError::from_reconcile(&err))?;
    render_batch("tier activate", &report, activate_kind)
}

pub(crate) async fn handle_enforce(ctx: &AppContext<'_>) -> CliResult<()> {
    let report = enforce_tiers(ctx.session, ctx.config)
        .await
        .map_err(|err| CliError::from_reconcile(&err))?;
    for line in batch_lines("tier set", &report.set, set_kind) {
        println!("{line}");
    }
    let activated = render_batch("tier activate", &report.activate, activate_kind);
    if !report.set.is_clean() {
        return Err(CliError::failure(anyhow::anyhow!(
            "tier set finished with {} failed torrent(s)",
            report.set.failures.len()
        )));
    }
    activated
}

const fn set_kind(outcome: &TierOutcome) -> &'static str {
    match outcome {
        TierOutcome::Skipped => "incomplete",
        TierOutcome::Free => "free",
        TierOutcome::Assigned { .. } => "tiered",
        TierOutcome::OutOfBounds { .. } => "out of bounds",
    }
}

const fn activate_kind(outcome: &ActivateOutcome) -> &'static str {
    match outcome {
        ActivateOutcome::Untiered => "untiered",
        ActivateOutcome::Running => "running",
        ActivateOutcome::Started => "started",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlever_test_support::{FailureMode, MemoryDaemon, fixtures};

    #[tokio::test]
    async fn partial_failure_exits_with_failure_code() {
        let config = fixtures::config();
        let daemon = MemoryDaemon::new(fixtures::session())
            .with_torrents([fixtures::torrent("a", 0.5), fixtures::torrent("b", 1.5)]);
        daemon.fail("b", FailureMode::Writes);
        let ctx = AppContext {
            session: &daemon,
            config: &config,
        };

        let err = handle_enforce(&ctx).await.expect_err("partial failure");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(daemon.labels("a"), vec!["%tier-0"]);
    }

    #[tokio::test]
    async fn rejected_credentials_exit_as_unreachable() {
        let config = fixtures::config();
        let daemon =
            MemoryDaemon::new(fixtures::session()).with_torrents([fixtures::torrent("a", 0.5)]);
        daemon.reject_credentials();
        let ctx = AppContext {
            session: &daemon,
            config: &config,
        };
        let err = handle_set(&ctx).await.expect_err("unauthorized");
        assert_eq!(err.exit_code(), 1);
    }
}
