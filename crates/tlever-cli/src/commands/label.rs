use tlever_reconcile::{LabelCodec, LabelStore};

use crate::cli::NameHashArgs;
use crate::client::{AppContext, CliError, CliResult};

pub(crate) async fn handle_add(ctx: &AppContext<'_>, args: NameHashArgs) -> CliResult<()> {
    let store = store(ctx);
    let written = store
        .add_label(&args.hash, &args.name)
        .await
        .map_err(|err| CliError::from_reconcile(&err))?;
    report(&args, written, "added", "already present");
    Ok(())
}

pub(crate) async fn handle_remove(ctx: &AppContext<'_>, args: NameHashArgs) -> CliResult<()> {
    let store = store(ctx);
    let written = store
        .remove_label(&args.hash, &args.name)
        .await
        .map_err(|err| CliError::from_reconcile(&err))?;
    report(&args, written, "removed", "not present");
    Ok(())
}

fn store<'a>(ctx: &AppContext<'a>) -> LabelStore<'a> {
    LabelStore::new(ctx.session, LabelCodec::from(&ctx.config.general.prefix))
}

fn report(args: &NameHashArgs, written: bool, done: &str, skipped: &str) {
    let state = if written { done } else { skipped };
    println!("{}: label '{}' {state}", args.hash, args.name);
}
