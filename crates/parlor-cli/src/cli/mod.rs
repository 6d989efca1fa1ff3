//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use parlor_core::config::{self, Config};

mod commands;

#[derive(Parser)]
#[command(name = "parlor")]
#[command(version = "0.1")]
#[command(about = "Terminal chat client for a conversational AI backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Backend base URL (overrides PARLOR_BASE_URL and the config file)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Model id to prefer at startup
    #[arg(short, long)]
    model: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List the models the backend serves
    Models,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns stdout, so logs go to a file under the parlor home dir.
    // The guard must outlive dispatch so buffered lines are flushed on exit.
    let _log_guard = init_logging();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;
    let base_url = config::resolve_base_url(cli.base_url.as_deref(), &config)
        .context("resolve backend base URL")?;

    // default to chat mode
    let Some(command) = cli.command else {
        let model = cli.model.or(config.model);
        return commands::chat::run(&base_url, model).await;
    };

    match command {
        Commands::Models => commands::models::list(&base_url).await,

        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
        },
    }
}

/// Initializes file logging. Returns `None` when the log directory cannot be
/// created; running without logs beats refusing to start.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let logs_dir = config::paths::logs_dir();
    if let Err(e) = std::fs::create_dir_all(&logs_dir) {
        eprintln!("warning: could not create log directory: {e}");
        return None;
    }

    let appender = tracing_appender::rolling::daily(&logs_dir, "parlor.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = tracing_subscriber::EnvFilter::try_from_env("PARLOR_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Some(guard)
}
