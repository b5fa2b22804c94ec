//! Magpie CLI - resilient mention-reply bot
//!
//! Usage:
//!   magpie run              Run the bot loop
//!   magpie init             Write a default magpie.toml
//!   magpie check            Verify credentials and connectivity, then exit

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use magpie_bot::{BotState, ReplyPipeline, ShutdownSignal, Supervisor};
use magpie_client::{ClaudeClient, Credentials, SocialClient, TwitterClient};
use magpie_core::{BotConfig, MagpieError};
use magpie_resilience::{BotMetrics, CircuitBreaker};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "magpie")]
#[command(author, version, about = "Resilient mention-reply bot")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot loop
    Run {
        /// Configuration file path
        #[arg(long, default_value = "magpie.toml")]
        config: PathBuf,
    },

    /// Write a default configuration file
    Init {
        /// Configuration file path
        #[arg(long, default_value = "magpie.toml")]
        config: PathBuf,
    },

    /// Verify credentials and connectivity, then exit
    Check {
        /// Configuration file path
        #[arg(long, default_value = "magpie.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to initialize logging")?;

    match cli.command {
        Commands::Run { config } => run(&config).await,
        Commands::Init { config } => init(&config),
        Commands::Check { config } => check(&config).await,
    }
}

/// Build clients, authenticate, and hand control to the supervisor
async fn run(config_path: &Path) -> Result<()> {
    info!("Magpie starting...");

    let config = BotConfig::load_or_default(config_path)?;
    let credentials = Credentials::from_env()?;

    let twitter = TwitterClient::new(credentials.twitter_token, config.http_timeout())?;
    let claude = ClaudeClient::new(
        credentials.anthropic_api_key,
        &config.model,
        config.http_timeout(),
    )?;

    // Authentication failure at startup is fatal; the loop never starts
    let account_id = twitter
        .authenticate()
        .await
        .map_err(MagpieError::from)
        .context("Failed to authenticate with the social platform")?;

    let state = BotState::load(Path::new(&config.state_file));
    if let Some(id) = &state.last_mention_id {
        info!("Resuming from mention {}", id);
    }

    let metrics = Arc::new(BotMetrics::new());
    let breaker = Arc::new(CircuitBreaker::from_config(&config.breaker));

    let shutdown = ShutdownSignal::new();
    shutdown.install_signal_handlers();
    info!("Press Ctrl+C to stop");

    let pipeline = ReplyPipeline::new(
        &config,
        account_id,
        Arc::new(twitter),
        Arc::new(claude),
        metrics.clone(),
        breaker.clone(),
        state,
    );

    let mut supervisor = Supervisor::new(pipeline, metrics, breaker, config, shutdown);
    supervisor.run().await;

    Ok(())
}

/// Write a default configuration file
fn init(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    BotConfig::write_default(config_path)?;
    println!("Wrote {}", config_path.display());
    Ok(())
}

/// Verify credentials resolve and the social platform accepts them
async fn check(config_path: &Path) -> Result<()> {
    let config = BotConfig::load_or_default(config_path)?;
    let credentials = Credentials::from_env()?;

    let twitter = TwitterClient::new(credentials.twitter_token, config.http_timeout())?;
    let account_id = twitter
        .authenticate()
        .await
        .map_err(MagpieError::from)
        .context("Failed to authenticate with the social platform")?;

    println!("OK: authenticated as account {}", account_id);
    Ok(())
}
