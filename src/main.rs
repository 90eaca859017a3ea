//! Command line entry point for Player Spotlight
//!
//! Runs one trigger against the configured database and prints the reply the
//! bot would send.

use anyhow::Result;
use clap::{Parser, Subcommand};
use player_spotlight::config::AppConfig;
use player_spotlight::delivery::{ConsoleDelivery, MessageHandle, MessageKind};
use player_spotlight::service::{ActionContext, AppState};
use player_spotlight::stats::StatsCategory;
use player_spotlight::types::{ChatId, StatsWindow, UserId};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Player Spotlight - leaderboards, ranks and bot statistics
#[derive(Parser)]
#[command(
    name = "player-spotlight",
    version,
    about = "Leaderboard, rank and statistics backend for a chat game bot",
    long_about = "Player Spotlight reads player statistics from the bot's SQLite database, \
                 renders paginated overall and daily leaderboards, per-user rank reports \
                 and aggregate bot statistics, and prints the replies the bot would send."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Database path override
    #[arg(long, global = true, value_name = "FILE", help = "Override SQLite database path")]
    database: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        global = true,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, global = true, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, global = true, help = "Validate configuration and exit without reading stats")]
    dry_run: bool,

    /// Dump metrics after the command
    #[arg(long, global = true, help = "Print collected metrics in Prometheus text format")]
    metrics: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the first leaderboard page
    Leaderboard {
        /// Viewer the page is rendered for
        #[arg(long, default_value_t = 0)]
        viewer: UserId,
        /// Show the daily board instead of the overall one
        #[arg(long)]
        daily: bool,
        #[arg(long, default_value_t = 0)]
        chat: ChatId,
        /// Print the reply as JSON instead of delivering it
        #[arg(long)]
        json: bool,
    },
    /// Show a page through its action token (e.g. leaderboard_2)
    Page {
        token: String,
        #[arg(long, default_value_t = 0)]
        viewer: UserId,
        #[arg(long)]
        daily: bool,
        #[arg(long, default_value_t = 0)]
        chat: ChatId,
        #[arg(long)]
        json: bool,
    },
    /// Show a user's overall and daily rank
    Rank {
        user: UserId,
        #[arg(long, default_value_t = 0)]
        chat: ChatId,
        #[arg(long)]
        json: bool,
    },
    /// Show the stats overview, optionally followed by one category
    Stats {
        /// bot, users, groups or top_players
        #[arg(long)]
        category: Option<StatsCategory>,
        #[arg(long, default_value_t = 0)]
        chat: ChatId,
    },
    /// Show a user's info card, optionally toggled to the daily view
    Userinfo {
        user: UserId,
        #[arg(long)]
        daily: bool,
        #[arg(long, default_value_t = 0)]
        chat: ChatId,
    },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(database) = &args.database {
        config.database.path = database.clone();
    }

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    Ok(config)
}

fn window_of(daily: bool) -> StatsWindow {
    if daily {
        StatsWindow::Daily
    } else {
        StatsWindow::Overall
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Display startup information
fn display_banner(config: &AppConfig) {
    info!("🏆 Player Spotlight");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Database: {}", config.database.path.display());
    info!("   Per page: {}", config.leaderboard.per_page);
    info!("   Fetch limit: {}", config.leaderboard.fetch_limit);
}

async fn run(app: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Leaderboard {
            viewer,
            daily,
            chat,
            json,
        } => {
            let window = window_of(daily);
            if json {
                print_json(&app.leaderboard.on_initial_request(window, viewer).await)?;
            } else {
                app.leaderboard.deliver_initial(window, chat, viewer).await?;
            }
        }
        Command::Page {
            token,
            viewer,
            daily,
            chat,
            json,
        } => {
            let window = window_of(daily);
            if json {
                match app.leaderboard.on_page_action(window, viewer, &token).await {
                    Some(reply) => print_json(&reply)?,
                    None => println!("null"),
                }
            } else {
                let message = MessageHandle::new(chat, 1, MessageKind::Text);
                let outcome = app
                    .leaderboard
                    .deliver_page_action(window, &ActionContext::new(viewer, message, token))
                    .await;
                info!("Page action finished: {:?}", outcome);
            }
        }
        Command::Rank { user, chat, json } => {
            if json {
                print_json(&app.ranks.on_rank_request(user).await)?;
            } else {
                app.ranks.deliver_rank(chat, user).await?;
            }
        }
        Command::Stats { category, chat } => {
            let overview = app.stats.on_stats_request(chat).await?;
            if let Some(category) = category {
                let action = ActionContext::new(0, overview, category.action());
                let outcome = app.stats.on_stats_action(&action).await;
                info!("Stats action finished: {:?}", outcome);
            }
        }
        Command::Userinfo { user, daily, chat } => {
            let card = app.ranks.deliver_userinfo(chat, user).await?;
            if daily {
                let token = player_spotlight::service::rank::userinfo_action(StatsWindow::Daily, user);
                let outcome = app
                    .ranks
                    .deliver_userinfo_action(&ActionContext::new(user, card, token))
                    .await;
                info!("Userinfo toggle finished: {:?}", outcome);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = player_spotlight::config::validate_config(&config) {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_banner(&config);
        info!("Dry run completed - exiting without reading stats");
        return Ok(());
    }

    let Some(command) = args.command else {
        display_banner(&config);
        info!("No command given, see --help");
        return Ok(());
    };

    let delivery = Arc::new(ConsoleDelivery::quiet());
    let app = match AppState::with_sqlite(config, delivery) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&app, command).await {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }

    if args.metrics {
        print!("{}", app.metrics.export_text()?);
    }

    Ok(())
}
