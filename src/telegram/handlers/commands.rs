//! Message and command handler implementations (/start, trigger phrase)

use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::trigger_event;

const GENERIC_FAILURE_TEXT: &str = "⚠️ Something went wrong, please try again in a moment.";

/// Handle /start command
pub(super) async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let text = format!(
        "👻 Welcome to {}!\n\nSend me '{}' in this chat to get your candy code. One treat per person! 🍬",
        deps.config.bot_name,
        deps.giveaway.trigger_phrase()
    );
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle any non-command text message
///
/// Storage failures are logged and answered with a generic apology so the
/// dispatcher keeps serving other users.
pub(super) async fn handle_text_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(event) = trigger_event(msg) else {
        return Ok(());
    };

    if !deps.giveaway.is_trigger(&event.text) {
        return Ok(());
    }

    log::info!(
        "📨 Received trigger from user {} in {:?} chat",
        event.user_id,
        event.context
    );

    match deps.giveaway.handle(&event).await {
        Ok(outcome) => {
            if let Some(reply) = outcome.reply_text(deps.giveaway.trigger_phrase()) {
                bot.send_message(msg.chat.id, reply).await?;
            }
        }
        Err(e) => {
            log::error!("❌ Giveaway failed for user {}: {}", event.user_id, e);
            bot.send_message(msg.chat.id, GENERIC_FAILURE_TEXT).await?;
        }
    }
    Ok(())
}
