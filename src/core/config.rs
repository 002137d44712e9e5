//! Startup configuration
//!
//! Everything is read once from the environment into an immutable [`Config`]
//! which is then handed to the components that need it. Tuning constants that
//! never come from the environment live in the nested modules below.

use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_PORT: u16 = 8443;
pub const DEFAULT_DATABASE_PATH: &str = "winners.db";
pub const DEFAULT_CODES_CSV: &str = "codes.csv";
pub const DEFAULT_LOG_FILE_PATH: &str = "treatbot.log";
pub const DEFAULT_BOT_NAME: &str = "Trick or Treat Bot";
pub const DEFAULT_TRIGGER_PHRASE: &str = "trick or treat";

/// Errors raised while reading the startup configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("{name}='{value}' is invalid: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Immutable runtime configuration
#[derive(Debug)]
pub struct Config {
    /// Bot token, also used as the secret webhook path. Only `run` needs it.
    bot_token: Option<SecretString>,
    /// Public base URL, e.g. `https://treats.up.railway.app`
    pub domain: Option<String>,
    pub port: u16,
    /// `None` disables admin commands for everyone
    pub admin_user_id: Option<i64>,
    /// Channels the user must have joined (any one of them is enough)
    pub required_channels: Vec<String>,
    pub database_path: String,
    pub codes_csv: String,
    pub log_file_path: String,
    pub bot_name: String,
    pub trigger_phrase: String,
    /// Problems that disabled an optional setting, logged once the logger is up
    pub warnings: Vec<String>,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = get("BOT_TOKEN").or_else(|| get("TELOXIDE_TOKEN"));
        let mut warnings = Vec::new();

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let admin_user_id = match get("ADMIN_USER_ID") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(0) => None,
                Ok(id) => Some(id),
                Err(_) => {
                    warnings.push(format!(
                        "ADMIN_USER_ID '{}' is not a valid numeric ID. Admin commands will be disabled.",
                        raw
                    ));
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            bot_token: bot_token.map(SecretString::from),
            domain: get("DOMAIN").map(|d| d.trim_end_matches('/').to_string()),
            port,
            admin_user_id,
            required_channels: parse_channel_list(get("REQUIRED_CHANNELS").as_deref().unwrap_or_default()),
            database_path: get("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            codes_csv: get("CODES_CSV").unwrap_or_else(|| DEFAULT_CODES_CSV.to_string()),
            log_file_path: get("LOG_FILE_PATH").unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string()),
            bot_name: get("BOT_NAME").unwrap_or_else(|| DEFAULT_BOT_NAME.to_string()),
            trigger_phrase: get("TRIGGER_PHRASE")
                .map(|p| p.to_lowercase())
                .unwrap_or_else(|| DEFAULT_TRIGGER_PHRASE.to_string()),
            warnings,
        })
    }

    /// The bot token; a missing token is an error only for commands that talk
    /// to Telegram.
    pub fn bot_token(&self) -> Result<&SecretString, ConfigError> {
        self.bot_token.as_ref().ok_or(ConfigError::Missing("BOT_TOKEN"))
    }

    /// Webhook URL Telegram should post updates to: `{DOMAIN}/{BOT_TOKEN}`.
    pub fn webhook_url(&self) -> Result<Url, ConfigError> {
        let domain = self.domain.as_deref().ok_or(ConfigError::Missing("DOMAIN"))?;
        let raw = format!("{}/{}", domain, self.bot_token()?.expose_secret());
        Url::parse(&raw).map_err(|e| ConfigError::Invalid {
            name: "DOMAIN",
            value: domain.to_string(),
            reason: e.to_string(),
        })
    }

    /// Address the webhook listener binds to.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_user_id == Some(user_id)
    }
}

/// Splits a comma-separated channel list, dropping blanks.
pub fn parse_channel_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|ch| !ch.is_empty())
        .map(str::to_string)
        .collect()
}

/// Telegram transport configuration
pub mod network {
    use super::Duration;

    /// Timeout for Bot API requests (in seconds)
    pub const TIMEOUT_SECS: u64 = 30;

    pub fn timeout() -> Duration {
        Duration::from_secs(TIMEOUT_SECS)
    }
}

/// Reply formatting limits
pub mod messages {
    /// Maximum characters per chunk when sending long listings.
    /// Telegram caps messages at 4096; the margin leaves room for headers.
    pub const MAX_CHUNK_CHARS: usize = 3800;
}

/// SQLite connection tuning
pub mod database {
    use super::Duration;

    /// Maximum number of pooled connections
    pub const POOL_SIZE: u32 = 8;

    /// How long a writer waits on a locked database before failing
    pub const BUSY_TIMEOUT_SECS: u64 = 5;

    pub fn busy_timeout() -> Duration {
        Duration::from_secs(BUSY_TIMEOUT_SECS)
    }
}
