use tlever_reconcile::{LabelCodec, LabelStore, add_tag, remove_tag};

use crate::cli::NameHashArgs;
use crate::client::{AppContext, CliError, CliResult};

pub(crate) async fn handle_add(ctx: &AppContext<'_>, args: NameHashArgs) -> CliResult<()> {
    let store = LabelStore::new(ctx.session, LabelCodec::from(&ctx.config.general.prefix));
    let written = add_tag(&store, &args.hash, &args.name)
        .await
        .map_err(|err| CliError::from_reconcile(&err))?;
    let state = if written { "added" } else { "already present" };
    println!("{}: tag '{}' {state}", args.hash, args.name);
    Ok(())
}

pub(crate) async fn handle_remove(ctx: &AppContext<'_>, args: NameHashArgs) -> CliResult<()> {
    let store = LabelStore::new(ctx.session, LabelCodec::from(&ctx.config.general.prefix));
    let written = remove_tag(&store, &args.hash, &args.name)
        .await
        .map_err(|err| CliError::from_reconcile(&err))?;
    let state = if written { "removed" } else { "not present" };
    println!("{}: tag '{}' {state}", args.hash, args.name);
    Ok(())
}
