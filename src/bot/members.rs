use anyhow::Context;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberStatus, UserId};

use crate::services::finalize::{ChatMemberGate, ChatRole};

/// Membership lookups over the Telegram API. Telegram calls a chat's creator
/// "owner"; both owner and administrator may manage raffles.
#[derive(Clone)]
pub struct TelegramMemberGate {
    bot: Bot,
}

impl TelegramMemberGate {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatMemberGate for TelegramMemberGate {
    async fn role(&self, chat_id: i64, user_id: i64) -> anyhow::Result<ChatRole> {
        let member = self
            .bot
            .get_chat_member(ChatId(chat_id), UserId(user_id as u64))
            .await
            .context("getChatMember request failed")?;

        Ok(match member.status() {
            ChatMemberStatus::Owner => ChatRole::Owner,
            ChatMemberStatus::Administrator => ChatRole::Administrator,
            _ => ChatRole::Other,
        })
    }
}

/// True when the user may manage raffles in the chat: the configured bot
/// administrator, or a creator/administrator of the chat itself. Lookup
/// failures count as "not an admin".
pub async fn is_chat_admin(bot: &Bot, chat_id: i64, user_id: i64, admin_user_id: i64) -> bool {
    if admin_user_id != 0 && user_id == admin_user_id {
        return true;
    }

    let gate = TelegramMemberGate::new(bot.clone());
    match gate.role(chat_id, user_id).await {
        Ok(ChatRole::Owner | ChatRole::Administrator) => true,
        Ok(_) => false,
        Err(e) => {
            tracing::warn!(
                "Failed to check member role for user {} in chat {}: {}",
                user_id,
                chat_id,
                e
            );
            false
        }
    }
}
