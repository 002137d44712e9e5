//! Channel membership gate backed by `getChatMember`.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberKind, Recipient};

use crate::giveaway::{GateDecision, MembershipGate};

/// Passes a user who has joined at least one of the configured channels.
pub struct TelegramMembership {
    bot: Bot,
    channels: Vec<String>,
}

impl TelegramMembership {
    pub fn new(bot: Bot, channels: Vec<String>) -> Self {
        Self { bot, channels }
    }
}

/// Channel ids like `-1001234` are numeric chats; anything else is a public
/// `@username`.
pub fn channel_recipient(channel: &str) -> Recipient {
    match channel.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) if channel.starts_with('@') => Recipient::ChannelUsername(channel.to_string()),
        Err(_) => Recipient::ChannelUsername(format!("@{}", channel)),
    }
}

/// Owners, administrators and regular members count as joined.
pub fn is_joined(kind: &ChatMemberKind) -> bool {
    kind.is_owner() || kind.is_administrator() || kind.is_member()
}

#[async_trait]
impl MembershipGate for TelegramMembership {
    async fn check(&self, user_id: i64) -> GateDecision {
        if self.channels.is_empty() {
            return GateDecision::Allowed;
        }

        let denied = GateDecision::Denied {
            channels: self.channels.clone(),
        };
        let Ok(uid) = u64::try_from(user_id) else {
            return denied;
        };

        for channel in &self.channels {
            match self.bot.get_chat_member(channel_recipient(channel), UserId(uid)).await {
                Ok(member) if is_joined(&member.kind) => {
                    log::info!("✅ User {} is a member of {}", user_id, channel);
                    return GateDecision::Allowed;
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("⚠️ Error checking {} membership: {}", channel, e);
                }
            }
        }

        denied
    }
}
