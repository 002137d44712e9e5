//! Bot initialization and message helpers
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Conversion of a Telegram message into a giveaway trigger event

use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use teloxide::prelude::*;
use teloxide::types::{Message, User};
use teloxide::utils::command::BotCommands;

use crate::core::config::{self, Config};
use crate::giveaway::{ChatContext, TriggerEvent};

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "how to get your candy")]
    Start,
    #[command(description = "code pool status (admin only)")]
    Status,
    #[command(description = "list all winners (admin only)")]
    Winners,
}

/// Creates a Bot instance with a request timeout
pub fn create_bot(config: &Config) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    Ok(Bot::with_client(config.bot_token()?.expose_secret(), client))
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

/// Name stored with a win: the @username if set, else the first name.
pub fn display_name(user: &User) -> String {
    user.username.clone().unwrap_or_else(|| user.first_name.clone())
}

/// Builds a trigger event from a text message. `None` for messages without
/// text or sender.
pub fn trigger_event(msg: &Message) -> Option<TriggerEvent> {
    let user = msg.from.as_ref()?;
    let text = msg.text()?;
    let user_id = i64::try_from(user.id.0).ok()?;

    let context = if msg.chat.is_private() {
        ChatContext::Private
    } else {
        ChatContext::Group
    };

    Some(TriggerEvent {
        user_id,
        display_name: display_name(user),
        text: text.to_string(),
        context,
    })
}
