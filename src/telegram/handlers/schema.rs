//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands::{handle_start_command, handle_text_message};
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::admin::{handle_status_command, handle_winners_command};
use crate::telegram::bot::Command;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// Commands are matched first; every other text message goes to the
/// trick-or-treat flow.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                let user_id = msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok()).unwrap_or(0);
                log::info!("🎯 /{:?} from user {}", cmd, user_id);

                let result = match cmd {
                    Command::Start => return handle_start_command(&bot, &msg, &deps).await,
                    Command::Status => handle_status_command(&bot, msg.chat.id, user_id, &deps).await,
                    Command::Winners => handle_winners_command(&bot, msg.chat.id, user_id, &deps).await,
                };

                if let Err(e) = result {
                    log::error!("❌ /{:?} failed for user {}: {}", cmd, user_id, e);
                    report_failure(&bot, msg.chat.id, &e.to_string()).await;
                }
                Ok(())
            }
        })
}

/// Tells the user a command failed. Returns false if even that reply could
/// not be delivered.
async fn report_failure(bot: &Bot, chat_id: ChatId, error: &str) -> bool {
    match bot.send_message(chat_id, format!("❌ Command failed: {}", error)).await {
        Ok(_) => true,
        Err(e) => {
            log::warn!("⚠️ Failed to send error reply to chat {}: {}", chat_id, e);
            false
        }
    }
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|text| !text.starts_with('/')).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_text_message(&bot, &msg, &deps).await }
        })
}
