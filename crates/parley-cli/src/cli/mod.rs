//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use parley_core::{config, logging};

mod commands;

#[derive(Parser)]
#[command(name = "parley")]
#[command(version)]
#[command(about = "Chat with a session-based assistant from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Backend base URL (overrides config and PARLEY_BASE_URL)
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sends one message and prints the assistant's reply
    Exec {
        /// The message to send
        #[arg(short, long)]
        prompt: String,
    },

    /// Prints the stored conversation
    History,

    /// Manage the stored session
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum SessionCommands {
    /// Shows the stored session id
    Show,
    /// Starts a new session, replacing the stored one
    New,
    /// Forgets the stored session id
    Clear,
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, base_url } = cli;
    let base_url = base_url.as_deref();

    match command {
        // Config commands must work even when the config file is broken.
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },
        // default to chat mode
        None => {
            let (config, _log_guard) = prepare(base_url)?;
            commands::chat::run(&config, base_url).await
        }
        Some(Commands::Exec { prompt }) => {
            let (config, _log_guard) = prepare(base_url)?;
            commands::exec::run(&config, base_url, &prompt).await
        }
        Some(Commands::History) => {
            let (config, _log_guard) = prepare(base_url)?;
            commands::history::run(&config, base_url).await
        }
        Some(Commands::Session { command }) => {
            let (config, _log_guard) = prepare(base_url)?;
            match command {
                SessionCommands::Show => commands::session::show(),
                SessionCommands::New => commands::session::new(&config, base_url).await,
                SessionCommands::Clear => commands::session::clear(),
            }
        }
    }
}

/// Loads config and starts file logging. The guard must outlive the command.
fn prepare(base_url: Option<&str>) -> Result<(config::Config, Option<logging::LogGuard>)> {
    let config = config::Config::load().context("load config")?;
    let log_guard = match logging::init(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e:#}");
            None
        }
    };
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), ?base_url, "parley starting");
    Ok((config, log_guard))
}
