//! Admin commands: code pool status and the winners listing
//!
//! Both are restricted to the single configured admin. Replies are plain
//! text; the winners listing is split into chunks that fit one message.

use teloxide::prelude::*;

use crate::core::config;
use crate::core::error::AppResult;
use crate::giveaway::Tier;
use crate::storage::codes::pool_status;
use crate::storage::winners::{list_winners, tier_counts};
use crate::storage::{get_connection, TierStatus, Winner};
use crate::telegram::handlers::HandlerDeps;

pub const ADMIN_ONLY_TEXT: &str = "⛔ This command is for admins only.";
pub const NO_WINNERS_TEXT: &str = "📭 No winners yet!";

pub fn format_status_report(bot_name: &str, statuses: &[TierStatus]) -> String {
    let mut message = format!("📊 {} Code Pool Status\n\n", bot_name);

    let mut total = 0;
    let mut available = 0;
    for status in statuses {
        total += status.total;
        available += status.available;
        message.push_str(&format!(
            "{} {}: {}/{} available ({} used)\n",
            status.tier.emoji(),
            status.tier,
            status.available,
            status.total,
            status.used
        ));
    }

    message.push_str(&format!(
        "\nTotal: {}/{} available ({} used)",
        available,
        total,
        total - available
    ));
    message
}

pub fn format_winners_header(bot_name: &str, winners: &[Winner]) -> String {
    let counts = tier_counts(winners);
    let count = |tier: Tier| counts.get(&tier).copied().unwrap_or(0);

    format!(
        "🎃 {} Winners 🎃\n\n\
        📊 Statistics:\n\
        🎃 Large Candy: {}\n\
        🍭 Medium Candy: {}\n\
        🍬 Small Candy: {}\n\
        👥 Total Winners: {}\n\n\
        📜 All Winners (showing all {}):\n",
        bot_name,
        count(Tier::Large),
        count(Tier::Medium),
        count(Tier::Small),
        winners.len(),
        winners.len()
    )
}

pub fn format_winner_line(winner: &Winner) -> String {
    let name = if winner.display_name.is_empty() {
        winner.user_id.to_string()
    } else {
        winner.display_name.clone()
    };
    format!(
        "{} @{} - {} - CODE: {} ({})\n",
        winner.tier.emoji(),
        name,
        winner.tier,
        winner.code,
        winner.awarded_at
    )
}

/// Packs lines into chunks of at most `max_chars` characters, keeping lines
/// whole. A single line longer than `max_chars` is split.
pub fn chunk_lines<I>(lines: I, max_chars: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in lines {
        let line_len = line.chars().count();

        if line_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        if current_len + line_len > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(&line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Handles /status
pub async fn handle_status_command(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> AppResult<()> {
    if !deps.config.is_admin(user_id) {
        log::warn!("User {} tried to access /status without permission", user_id);
        bot.send_message(chat_id, ADMIN_ONLY_TEXT).await?;
        return Ok(());
    }

    let statuses = {
        let conn = get_connection(&deps.db_pool)?;
        pool_status(&conn)?
    };
    bot.send_message(chat_id, format_status_report(&deps.config.bot_name, &statuses))
        .await?;
    Ok(())
}

/// Handles /winners
pub async fn handle_winners_command(bot: &Bot, chat_id: ChatId, user_id: i64, deps: &HandlerDeps) -> AppResult<()> {
    if !deps.config.is_admin(user_id) {
        log::warn!("User {} tried to access /winners without permission", user_id);
        bot.send_message(chat_id, ADMIN_ONLY_TEXT).await?;
        return Ok(());
    }

    let winners = {
        let conn = get_connection(&deps.db_pool)?;
        list_winners(&conn)?
    };

    if winners.is_empty() {
        bot.send_message(chat_id, NO_WINNERS_TEXT).await?;
        return Ok(());
    }

    bot.send_message(chat_id, format_winners_header(&deps.config.bot_name, &winners))
        .await?;

    let chunks = chunk_lines(winners.iter().map(format_winner_line), config::messages::MAX_CHUNK_CHARS);
    log::info!("Sending {} winners in {} chunks to admin {}", winners.len(), chunks.len(), user_id);
    for chunk in chunks {
        bot.send_message(chat_id, chunk).await?;
    }
    Ok(())
}
