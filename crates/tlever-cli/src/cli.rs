//! Argument parsing, startup and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tlever_config::{LoadedConfig, load};
use tlever_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use tracing::{info, warn};

use crate::client::{AppContext, CliError, CliResult, connect, verify_session};
use crate::commands::{category, clog, label, tag, tier, tui};

const VERBOSE_LOG_LEVEL: &str = "debug";

/// Parses CLI arguments, executes the requested command, and reports errors.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    match execute(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn execute(cli: Cli) -> CliResult<()> {
    let loaded = load(cli.config.as_deref()).map_err(|err| CliError::from_config(&err))?;
    init_cli_logging(&cli, &loaded);

    let client = connect(&loaded.config.client)?;
    verify_session(&client).await?;

    let ctx = AppContext {
        session: &client,
        config: &loaded.config,
    };
    dispatch(&ctx, cli.command).await
}

fn init_cli_logging(cli: &Cli, loaded: &LoadedConfig) {
    let format = cli.log_format.map_or_else(
        || {
            loaded
                .config
                .general
                .log_format
                .as_deref()
                .map_or_else(LogFormat::infer, LogFormat::from_name)
        },
        LogFormat::from,
    );
    let level = if cli.verbose {
        VERBOSE_LOG_LEVEL
    } else {
        DEFAULT_LOG_LEVEL
    };
    let logging = LoggingConfig {
        level,
        format,
        ..LoggingConfig::default()
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    match &loaded.source {
        Some(path) => info!(path = %path.display(), "configuration loaded"),
        None => warn!("configuration file not found, using default values"),
    }
}

pub(crate) async fn dispatch(ctx: &AppContext<'_>, command: Command) -> CliResult<()> {
    match command {
        Command::Category(command) => match command {
            CategoryCommand::Add(args) => category::handle_add(ctx, args).await,
            CategoryCommand::Remove(args) => category::handle_remove(ctx, args).await,
            CategoryCommand::Enforce => category::handle_enforce(ctx).await,
        },
        Command::Label(command) => match command {
            LabelCommand::Add(args) => label::handle_add(ctx, args).await,
            LabelCommand::Remove(args) => label::handle_remove(ctx, args).await,
        },
        Command::Tag(command) => match command {
            TagCommand::Add(args) => tag::handle_add(ctx, args).await,
            TagCommand::Remove(args) => tag::handle_remove(ctx, args).await,
        },
        Command::Tier(command) => match command {
            TierCommand::Set => tier::handle_set(ctx).await,
            TierCommand::Unset => tier::handle_unset(ctx).await,
            TierCommand::Activate => tier::handle_activate(ctx).await,
            TierCommand::Enforce => tier::handle_enforce(ctx).await,
        },
        Command::Clog(command) => match command {
            ClogCommand::Set => clog::handle_set(ctx).await,
            ClogCommand::Unset => clog::handle_unset(ctx).await,
        },
        Command::Tui(TuiCommand::Show(args)) => tui::handle_show(ctx, args).await,
    }
}

#[derive(Parser)]
#[command(
    name = "tlever",
    version,
    about = "Tier, category and tag maintenance for a Transmission daemon"
)]
pub(crate) struct Cli {
    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub(crate) verbose: bool,
    #[arg(long, global = true, help = "Path to the configuration file")]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, global = true, value_enum, help = "Log output format")]
    pub(crate) log_format: Option<LogFormatArg>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Storage categories encoded as labels.
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Raw labels.
    #[command(subcommand)]
    Label(LabelCommand),
    /// Prefixed tag labels.
    #[command(subcommand)]
    Tag(TagCommand),
    /// Ratio tier ladder.
    #[command(subcommand)]
    Tier(TierCommand),
    /// Upload caps for torrents above the ladder.
    #[command(subcommand)]
    Clog(ClogCommand),
    /// Live status view.
    #[command(subcommand)]
    Tui(TuiCommand),
}

#[derive(Debug, Subcommand)]
pub(crate) enum CategoryCommand {
    /// Label a torrent with a category and move it there.
    Add(NameHashArgs),
    /// Move a torrent back to the download root and drop the category.
    Remove(NameHashArgs),
    /// Move every categorised torrent to its category directory.
    Enforce,
}

#[derive(Debug, Subcommand)]
pub(crate) enum LabelCommand {
    /// Add a label.
    Add(NameHashArgs),
    /// Remove a label.
    Remove(NameHashArgs),
}

#[derive(Debug, Subcommand)]
pub(crate) enum TagCommand {
    /// Add a tag.
    Add(NameHashArgs),
    /// Remove a tag.
    Remove(NameHashArgs),
}

#[derive(Debug, Subcommand)]
pub(crate) enum TierCommand {
    /// Assign tier labels and profiles from current ratios.
    Set,
    /// Remove numeric tier labels and apply the free profile.
    Unset,
    /// Start stopped torrents that carry a tier label.
    Activate,
    /// `set` followed by `activate`.
    Enforce,
}

#[derive(Debug, Subcommand)]
pub(crate) enum ClogCommand {
    /// Cap uploads of torrents above the clog bands.
    Set,
    /// Lift the clog upload cap.
    Unset,
}

#[derive(Debug, Subcommand)]
pub(crate) enum TuiCommand {
    /// Poll and display one torrent.
    Show(HashArgs),
}

#[derive(Debug, Args)]
pub(crate) struct NameHashArgs {
    #[arg(help = "Label, tag or category name")]
    pub(crate) name: String,
    #[arg(help = "Torrent info hash")]
    pub(crate) hash: String,
}

#[derive(Debug, Args)]
pub(crate) struct HashArgs {
    #[arg(help = "Torrent info hash")]
    pub(crate) hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlever_test_support::{MemoryDaemon, fixtures};

    #[test]
    fn global_flags_parse_after_subcommands() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from([
            "tlever",
            "category",
            "add",
            "tv",
            "abc123",
            "-v",
            "--log-format",
            "json",
            "--config",
            "/tmp/tlever.json",
        ])?;
        assert!(cli.verbose);
        assert_eq!(cli.log_format, Some(LogFormatArg::Json));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/tlever.json")));
        assert!(matches!(
            cli.command,
            Command::Category(CategoryCommand::Add(NameHashArgs { ref name, ref hash }))
                if name == "tv" && hash == "abc123"
        ));
        Ok(())
    }

    #[test]
    fn every_subcommand_is_reachable() {
        for line in [
            "category enforce",
            "label remove x h",
            "tag add keep h",
            "tier set",
            "tier unset",
            "tier activate",
            "tier enforce",
            "clog set",
            "clog unset",
            "tui show h",
        ] {
            let args = std::iter::once("tlever").chain(line.split_whitespace());
            assert!(Cli::try_parse_from(args).is_ok(), "{line} should parse");
        }
        assert!(Cli::try_parse_from(["tlever", "tier", "promote"]).is_err());
    }

    #[tokio::test]
    async fn dispatch_routes_to_handlers() -> Result<(), Box<dyn std::error::Error>> {
        let config = fixtures::config();
        let daemon = MemoryDaemon::new(fixtures::session())
            .with_torrents([fixtures::torrent("h", 1.5)]);
        let ctx = AppContext {
            session: &daemon,
            config: &config,
        };

        let cli = Cli::try_parse_from(["tlever", "tier", "set"])?;
        dispatch(&ctx, cli.command).await?;
        assert_eq!(daemon.labels("h"), vec!["%tier-1"]);

        let cli = Cli::try_parse_from(["tlever", "tag", "add", "keep", "h"])?;
        dispatch(&ctx, cli.command).await?;
        assert_eq!(daemon.labels("h"), vec!["%tier-1", "#keep"]);
        Ok(())
    }
}
