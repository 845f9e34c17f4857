//! Polling status view for a single torrent.

use std::time::Duration;

use anyhow::anyhow;
use chrono::Local;
use tlever_reconcile::{LabelCodec, fetch_status};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::cli::HashArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{redraw, status_lines};

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const QUIT_KEY: &str = "q";

pub(crate) async fn handle_show(ctx: &AppContext<'_>, args: HashArgs) -> CliResult<()> {
    let codec = LabelCodec::from(&ctx.config.general.prefix);
    let mut ticker = interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let lines = frame(ctx, &codec, &args.hash).await?;
                redraw(&lines);
            }
            line = input.next_line() => match line {
                Ok(Some(line)) if line.trim().eq_ignore_ascii_case(QUIT_KEY) => break,
                Ok(Some(_)) => {}
                Ok(None) => {
                    debug!("stdin closed, leaving status view");
                    break;
                }
                Err(err) => return Err(CliError::failure(anyhow!("failed to read stdin: {err}"))),
            },
        }
    }
    Ok(())
}

/// Lines for one refresh. Only fatal daemon errors end the view; anything
/// else is drawn and retried on the next tick.
async fn frame(ctx: &AppContext<'_>, codec: &LabelCodec, hash: &str) -> CliResult<Vec<String>> {
    match fetch_status(ctx.session, codec, hash).await {
        Ok(Some(status)) => Ok(status_lines(&status, Local::now())),
        Ok(None) => Ok(vec![format!("torrent {hash} not found")]),
        Err(err) if err.is_fatal() => Err(CliError::from_reconcile(&err)),
        Err(err) => {
            warn!(hash, error = %err.detail(), "status refresh failed");
            Ok(vec![
                format!("refresh failed at {}", Local::now().format("%H:%M:%S")),
                err.detail(),
                format!("retrying every {}s, '{QUIT_KEY}' to quit", POLL_INTERVAL.as_secs()),
            ])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlever_test_support::{FailureMode, MemoryDaemon, fixtures};

    #[tokio::test]
    async fn transient_errors_are_drawn_and_fatal_ones_end_the_view() -> anyhow::Result<()> {
        let config = fixtures::config();
        let daemon =
            MemoryDaemon::new(fixtures::session()).with_torrents([fixtures::torrent("h", 1.0)]);
        let ctx = AppContext {
            session: &daemon,
            config: &config,
        };
        let codec = LabelCodec::from(&config.general.prefix);

        let lines = frame(&ctx, &codec, "h")
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        assert!(lines.iter().any(|line| line.contains("torrent-h")));

        daemon.fail("h", FailureMode::All);
        let lines = frame(&ctx, &codec, "h")
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        assert!(lines[0].starts_with("refresh failed"));
        assert!(lines[1].contains("injected failure"));

        daemon.reject_credentials();
        let Err(err) = frame(&ctx, &codec, "h").await else {
            panic!("rejected credentials kept the view open");
        };
        assert_eq!(err.exit_code(), 1);
        Ok(())
    }
}
