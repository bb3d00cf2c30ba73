use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};

use crate::bot::members::TelegramMemberGate;
use crate::config::Config;
use crate::database::{connection::DatabaseManager, models::*, store::SqliteRaffleStore};
use crate::services::finalize::{
    Announcement, FinalizeError, FinalizeOutcome, FinalizeService, RaffleRef,
};
use crate::utils::markdown::escape_markdown;

/// Watches private-chat messages for a forwarded raffle message, the signal
/// to draw a winner. Anything else (group chatter, forwards of unrelated
/// messages, forwards from strangers) is dropped without a reply.
pub async fn forward_handler(
    bot: Bot,
    msg: Message,
    db: DatabaseManager,
    config: Config,
) -> ResponseResult<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let origin_chat = match msg.forward_from_chat() {
        Some(chat) => chat,
        None => return Ok(()),
    };
    let origin_message_id = match msg.forward_from_message_id() {
        Some(id) => id,
        None => return Ok(()),
    };
    let requester = match msg.from() {
        Some(user) => user.id.0 as i64,
        None => return Ok(()),
    };

    let raffle = RaffleRef {
        chat_id: origin_chat.id.0,
        message_id: origin_message_id as i64,
    };

    // One service per trigger; the store's conditional write is the only
    // arbiter between concurrent triggers.
    let service = FinalizeService::new(
        SqliteRaffleStore::new(db.pool.clone()),
        TelegramMemberGate::new(bot.clone()),
        config.admin_user_id,
    );

    match service.finalize(raffle, requester).await {
        Ok(FinalizeOutcome::Announced(announcement)) => {
            tracing::info!(
                "Raffle {}:{} finished, winner {}",
                announcement.chat_id,
                announcement.message_id,
                announcement.winner.user_id
            );
            deliver_announcement(&bot, &db, &announcement).await?;
            bot.send_message(msg.chat.id, "👍")
                .reply_to_message_id(msg.id)
                .await?;
        }
        Ok(FinalizeOutcome::AlreadyFinished) => {
            bot.send_message(msg.chat.id, "👍")
                .reply_to_message_id(msg.id)
                .await?;
        }
        Ok(FinalizeOutcome::Ignored) => {}
        Err(FinalizeError::NotFound) => {
            // A forward of some message that is not a raffle; not our business.
        }
        Err(err @ FinalizeError::MemberLookup(_)) => {
            tracing::error!("Could not authorize raffle trigger: {}", err);
        }
        Err(err) => {
            tracing::error!(
                "Raffle {}:{} finalization failed: {}",
                raffle.chat_id,
                raffle.message_id,
                err
            );
            bot.send_message(msg.chat.id, "👎 try again")
                .reply_to_message_id(msg.id)
                .await?;
        }
    }

    Ok(())
}

async fn deliver_announcement(
    bot: &Bot,
    db: &DatabaseManager,
    announcement: &Announcement,
) -> ResponseResult<()> {
    let template = match Chat::find_by_chat_id(&db.pool, announcement.chat_id).await {
        Ok(chat) => chat.and_then(|c| c.winner_message),
        Err(e) => {
            tracing::warn!(
                "Failed to load chat config for {}: {}",
                announcement.chat_id,
                e
            );
            None
        }
    };

    let text = winner_text(
        template.as_deref(),
        &announcement.winner,
        announcement.prize.as_deref(),
    );
    let raffle_message = MessageId(announcement.message_id as i32);

    bot.send_message(ChatId(announcement.chat_id), text)
        .reply_to_message_id(raffle_message)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;

    // The raffle is closed; drop the participate button.
    if let Err(e) = bot
        .edit_message_reply_markup(ChatId(announcement.chat_id), raffle_message)
        .await
    {
        tracing::debug!("Could not clear raffle keyboard: {}", e);
    }

    Ok(())
}

/// Renders the winner announcement from the chat template (or the default),
/// substituting `$winner` with a mention link after escaping.
fn winner_text(template: Option<&str>, winner: &Participant, prize: Option<&str>) -> String {
    let raw = match template {
        Some(template) => template.to_string(),
        None => {
            let mut text = String::from("🎉 We have a winner: $winner!");
            if let Some(prize) = prize {
                text.push_str(&format!("\n\n🎁 Prize: {prize}"));
            }
            text
        }
    };

    escape_markdown(&raw).replace("$winner", &mention(winner))
}

fn mention(winner: &Participant) -> String {
    let display = match &winner.username {
        Some(username) => format!("@{username}"),
        None => format!("user {}", winner.user_id),
    };
    format!("[{}](tg://user?id={})", escape_markdown(&display), winner.user_id)
}
