use tlever_reconcile::{ClogOutcome, set_clog, unset_clog};

use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_batch;

pub(crate) async fn handle_set(ctx: &AppContext<'_>) -> CliResult<()> {
    let report = set_clog(ctx.session, ctx.config)
        .await
        .map_err(|err| CliError::from_reconcile(&err))?;
    render_batch("clog set", &report, kind)
}

pub(crate) async fn handle_unset(ctx: &AppContext<'_>) -> CliResult<()> {
    let report = unset_clog(ctx.session, ctx.config)
        .await
        .map_err(|err| CliError::from_reconcile(&err))?;
    render_batch("clog unset", &report, kind)
}

const fn kind(outcome: &ClogOutcome) -> &'static str {
    match outcome {
        ClogOutcome::Skipped => "skipped",
        ClogOutcome::Clogged { .. } => "clogged",
        ClogOutcome::Released => "released",
    }
}
