use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::{webhooks, Polling};

use treatbot::cli::{Cli, Commands};
use treatbot::core::config::Config;
use treatbot::core::{init_logger, log_startup_configuration};
use treatbot::giveaway::{Giveaway, MembershipGate, OpenGate, PrizeTable};
use treatbot::storage::codes::pool_status;
use treatbot::storage::seed::seed_codes_from_csv;
use treatbot::storage::{create_pool, get_connection, SeedReport};
use treatbot::telegram::admin::format_status_report;
use treatbot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, TelegramMembership};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to the matching subcommand.
///
/// # Errors
/// Returns an error if startup fails (configuration, logging, database, bot setup).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    let config = Config::from_env().context("invalid startup configuration")?;
    init_logger(&config.log_file_path)?;
    log_startup_configuration(&config);

    match cli.command {
        Some(Commands::Run { polling }) => run_bot(config, polling).await,
        Some(Commands::Seed { csv }) => run_seed(&config, csv.as_deref()),
        Some(Commands::Status) => run_status(&config),
        None => {
            log::info!("No command specified, running bot in webhook mode");
            run_bot(config, false).await
        }
    }
}

/// Seeds the code pool from the configured (or given) CSV file
fn run_seed(config: &Config, csv: Option<&str>) -> Result<()> {
    let db_pool = create_pool(&config.database_path).context("Failed to create database pool")?;
    let mut conn = get_connection(&db_pool)?;
    let path = csv.unwrap_or(&config.codes_csv);

    match seed_codes_from_csv(&mut conn, path).with_context(|| format!("Failed to load codes from {}", path))? {
        SeedReport::Skipped { existing } => println!("Code pool already has {} codes, nothing loaded", existing),
        SeedReport::Loaded {
            inserted, duplicates, ..
        } => println!("Loaded {} codes ({} duplicates skipped)", inserted, duplicates),
    }
    Ok(())
}

/// Prints the code pool status
fn run_status(config: &Config) -> Result<()> {
    let db_pool = create_pool(&config.database_path).context("Failed to create database pool")?;
    let conn = get_connection(&db_pool)?;
    println!("{}", format_status_report(&config.bot_name, &pool_status(&conn)?));
    Ok(())
}

async fn run_bot(config: Config, polling: bool) -> Result<()> {
    // Fail before touching the database if the bot can't start
    config.bot_token().context("running the bot needs BOT_TOKEN")?;
    let webhook_url = if polling {
        None
    } else {
        Some(config.webhook_url().context("webhook mode needs DOMAIN")?)
    };

    let db_pool = Arc::new(create_pool(&config.database_path).context("Failed to create database pool")?);
    {
        let mut conn = get_connection(&db_pool)?;
        seed_codes_from_csv(&mut conn, &config.codes_csv)
            .with_context(|| format!("Failed to load codes from {}", config.codes_csv))?;
    }

    let bot = create_bot(&config)?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let gate: Arc<dyn MembershipGate> = if config.required_channels.is_empty() {
        Arc::new(OpenGate)
    } else {
        Arc::new(TelegramMembership::new(bot.clone(), config.required_channels.clone()))
    };

    let config = Arc::new(config);
    let giveaway = Arc::new(Giveaway::new(
        Arc::clone(&db_pool),
        PrizeTable::halloween(),
        gate,
        config.trigger_phrase.clone(),
    ));
    let handler_deps = HandlerDeps::new(Arc::clone(&db_pool), giveaway, Arc::clone(&config));

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema(handler_deps))
        .error_handler(LoggingErrorHandler::with_custom_text("An error has occurred in the dispatcher"))
        .enable_ctrlc_handler()
        .build();

    match webhook_url {
        Some(url) => {
            log::info!("🍬 {} starting with WEBHOOK mode...", config.bot_name);
            log::info!("🔌 Listening on {}", config.listen_addr());

            let listener = webhooks::axum(bot, webhooks::Options::new(config.listen_addr(), url))
                .await
                .context("Failed to set up webhook")?;

            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
        None => {
            log::info!("🍬 {} starting with long polling...", config.bot_name);
            bot.delete_webhook().await?;

            let listener = Polling::builder(bot).drop_pending_updates().build();
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
    }

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
