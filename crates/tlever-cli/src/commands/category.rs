use tlever_reconcile::{CategoryOutcome, create_category, enforce_categories, remove_category};

use crate::cli::NameHashArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_batch;

pub(crate) async fn handle_add(ctx: &AppContext<'_>, args: NameHashArgs) -> CliResult<()> {
    let change = create_category(ctx.session, ctx.config, &args.hash, &args.name)
        .await
        .map_err(|err| CliError::from_reconcile(&err))?;
    for removed in &change.removed {
        println!("removed category label {removed}");
    }
    println!(
        "{}: category '{}' set, data moved to {}",
        args.hash, change.category, change.location
    );
    Ok(())
}

pub(crate) async fn handle_remove(ctx: &AppContext<'_>, args: NameHashArgs) -> CliResult<()> {
    let change = remove_category(ctx.session, ctx.config, &args.hash, &args.name)
        .await
        .map_err(|err| CliError::from_reconcile(&err))?;
    if change.removed.is_empty() {
        println!(
            "{}: no '{}' category label, data moved to {}",
            args.hash, change.category, change.location
        );
    } else {
        println!(
            "{}: category '{}' removed, data moved to {}",
            args.hash, change.category, change.location
        );
    }
    Ok(())
}

pub(crate) async fn handle_enforce(ctx: &AppContext<'_>) -> CliResult<()> {
    let report = enforce_categories(ctx.session, ctx.config)
        .await
        .map_err(|err| CliError::from_reconcile(&err))?;
    for (hash, outcome) in &report.outcomes {
        match outcome {
            CategoryOutcome::Moved { from, to, .. } => println!("{hash}: moved {from} -> {to}"),
            CategoryOutcome::Conflict { categories } => {
                println!("{hash}: conflicting categories {}", categories.join(", "));
            }
            CategoryOutcome::Invalid { category, reason } => {
                println!("{hash}: invalid category '{category}': {reason}");
            }
            CategoryOutcome::Uncategorized | CategoryOutcome::InPlace { .. } => {}
        }
    }
    render_batch("category enforce", &report, |outcome| match outcome {
        CategoryOutcome::Uncategorized => "uncategorized",
        CategoryOutcome::InPlace { .. } => "in place",
        CategoryOutcome::Moved { .. } => "moved",
        CategoryOutcome::Conflict { .. } => "conflicting",
        CategoryOutcome::Invalid { .. } => "invalid",
    })
}
