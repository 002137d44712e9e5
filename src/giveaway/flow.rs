//! The trick-or-treat flow for one incoming message.
//!
//! Order per event: trigger match → chat context → eligibility → gate → draw
//! → withdraw → commit → deliver. Only the last two steps write.

use rusqlite::Connection;
use std::sync::Arc;

use crate::core::error::AppResult;
use crate::giveaway::gate::{GateDecision, MembershipGate};
use crate::giveaway::prize::{PrizeTable, Tier};
use crate::storage::codes::{release_code, withdraw_code, Withdrawal};
use crate::storage::winners::{has_won, record_winner, RecordOutcome};
use crate::storage::{get_connection, DbPool};

/// Where the message was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatContext {
    /// One-to-one chat with the bot
    Private,
    /// Group, supergroup or channel
    Group,
}

/// An incoming text message, stripped of transport details
#[derive(Debug, Clone)]
pub struct TriggerEvent {
    pub user_id: i64,
    pub display_name: String,
    pub text: String,
    pub context: ChatContext,
}

/// What the bot should tell the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text does not contain the trigger phrase; stay silent
    Ignored,
    /// Trigger sent in a group; prizes are only handed out in private
    RedirectToPrivate { already_won: bool },
    AlreadyClaimed,
    MembershipRequired { channels: Vec<String> },
    /// Drawn tier has no codes left; the user may try again
    SoldOut { tier: Tier },
    Won { tier: Tier, code: String, message: String },
}

impl Outcome {
    /// Plain-text reply for this outcome, `None` when nothing should be sent.
    pub fn reply_text(&self, trigger_phrase: &str) -> Option<String> {
        match self {
            Outcome::Ignored => None,
            Outcome::RedirectToPrivate { already_won: true } | Outcome::AlreadyClaimed => {
                Some("🧛‍♂️ You've already claimed your candy!".to_string())
            }
            Outcome::RedirectToPrivate { already_won: false } => {
                Some("🎃 Please start a private chat with me to receive CANDY CODE!".to_string())
            }
            Outcome::MembershipRequired { channels } => {
                let links = channels
                    .iter()
                    .map(|ch| format!("👉 {}", ch))
                    .collect::<Vec<_>>()
                    .join("\n");
                Some(format!(
                    "🔒 Sorry! You must join one of our channels first to receive candy codes.\n\n{}\n\nAfter joining, come back and type '{}' again! 🎃",
                    links, trigger_phrase
                ))
            }
            Outcome::SoldOut { tier } => Some(format!(
                "😔 Sorry, all {} Candy prizes have been claimed! Try again later.",
                tier
            )),
            Outcome::Won { message, .. } => Some(message.clone()),
        }
    }
}

/// Uniform `[0, 1)` source for the prize draw
pub type Sampler = Arc<dyn Fn() -> f64 + Send + Sync>;

pub struct Giveaway {
    db_pool: Arc<DbPool>,
    prizes: PrizeTable,
    gate: Arc<dyn MembershipGate>,
    trigger_phrase: String,
    /// Fixed draw source; `None` draws from the thread RNG
    sampler: Option<Sampler>,
}

impl Giveaway {
    pub fn new(
        db_pool: Arc<DbPool>,
        prizes: PrizeTable,
        gate: Arc<dyn MembershipGate>,
        trigger_phrase: impl Into<String>,
    ) -> Self {
        Self {
            db_pool,
            prizes,
            gate,
            trigger_phrase: trigger_phrase.into().to_lowercase(),
            sampler: None,
        }
    }

    /// Replaces the random source, e.g. with a fixed value in tests.
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn trigger_phrase(&self) -> &str {
        &self.trigger_phrase
    }

    pub fn is_trigger(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.trigger_phrase)
    }

    /// Runs the flow for one message.
    ///
    /// The early `has_won` check only saves a draw; the winners table's unique
    /// constraint decides. A code withdrawn for a user who lost that race goes
    /// back to the pool.
    pub async fn handle(&self, event: &TriggerEvent) -> AppResult<Outcome> {
        if !self.is_trigger(&event.text) {
            return Ok(Outcome::Ignored);
        }

        let already_won = {
            let conn = get_connection(&self.db_pool)?;
            has_won(&conn, event.user_id)?
        };

        if event.context == ChatContext::Group {
            log::info!(
                "📢 Trigger from user {} in a group - redirecting to private chat",
                event.user_id
            );
            return Ok(Outcome::RedirectToPrivate { already_won });
        }

        if already_won {
            log::info!("✋ User {} has already won", event.user_id);
            return Ok(Outcome::AlreadyClaimed);
        }

        if let GateDecision::Denied { channels } = self.gate.check(event.user_id).await {
            log::info!("❌ User {} is not a member of any required channel", event.user_id);
            return Ok(Outcome::MembershipRequired { channels });
        }

        let prize = match &self.sampler {
            Some(sample) => self.prizes.draw(sample()),
            None => self.prizes.draw_random(&mut rand::thread_rng()),
        };
        let conn = get_connection(&self.db_pool)?;

        let code = match withdraw_code(&conn, prize.tier)? {
            Withdrawal::Claimed(code) => code,
            Withdrawal::NotAvailable => {
                log::info!("❌ No more {} codes available", prize.tier);
                return Ok(Outcome::SoldOut { tier: prize.tier });
            }
        };

        match record_winner(&conn, event.user_id, &event.display_name, prize.tier, &code)? {
            RecordOutcome::Recorded => {
                log::info!(
                    "✅ Prize sent to user {}: {} with code {}",
                    event.user_id,
                    prize.tier,
                    code
                );
                Ok(Outcome::Won {
                    tier: prize.tier,
                    message: prize.render(&code),
                    code,
                })
            }
            RecordOutcome::AlreadyWon => {
                log::warn!(
                    "⚠️ User {} won concurrently; returning {} code {} to the pool",
                    event.user_id,
                    prize.tier,
                    code
                );
                return_to_pool(&conn, &code);
                Ok(Outcome::AlreadyClaimed)
            }
        }
    }
}

/// Releases a withdrawn code after a lost race. Returns whether the code is
/// back in the pool; otherwise it stays used with no winner.
fn return_to_pool(conn: &Connection, code: &str) -> bool {
    match release_code(conn, code) {
        Ok(true) => true,
        Ok(false) => {
            log::warn!("⚠️ Code {} was not marked used; it was not returned to the pool", code);
            false
        }
        Err(e) => {
            log::error!("Failed to release code {}: {}", code, e);
            false
        }
    }
}
