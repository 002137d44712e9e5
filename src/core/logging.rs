//! Logging initialization and startup diagnostics

use anyhow::Result;
use simplelog::*;
use std::fs::OpenOptions;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// The log file is appended to so restarts keep the award history readable.
///
/// # Arguments
/// * `log_file_path` - Path to the log file
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at startup. The token is never printed.
pub fn log_startup_configuration(config: &config::Config) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🍬 {} configuration", config.bot_name);
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("📡 Domain: {}", config.domain.as_deref().unwrap_or("(not set)"));
    log::info!("🔌 Port: {}", config.port);
    log::info!("🗄️  Database: {}", config.database_path);
    log::info!("📄 Codes file: {}", config.codes_csv);
    log::info!("🗣️  Trigger phrase: '{}'", config.trigger_phrase);

    for warning in &config.warnings {
        log::warn!("⚠️ {}", warning);
    }

    match config.admin_user_id {
        Some(id) => log::info!("✅ Admin user: {}", id),
        None => log::warn!("⚠️  ADMIN_USER_ID not set - /status and /winners are disabled"),
    }

    if config.required_channels.is_empty() {
        log::info!("🔓 No channel membership required");
    } else {
        log::info!("🔒 Required channels (any of): {}", config.required_channels.join(", "));
    }
}
