use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};

use crate::bot::members::is_chat_admin;
use crate::config::Config;
use crate::database::{connection::DatabaseManager, models::*};
use crate::utils::{
    feedback::CommandFeedback,
    markdown::escape_markdown,
    validation::{validate_prize, validate_telegram_chat_id},
};

/// Inline keyboard with the participate button and the current entry count.
pub fn join_keyboard(participants: i64) -> InlineKeyboardMarkup {
    let label = if participants > 0 {
        format!("🎉 Participate ({participants})")
    } else {
        "🎉 Participate".to_string()
    };
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(label, "join")]])
}

/// Renders the raffle post from the chat's template, or the default text
/// with an optional prize line.
pub fn raffle_text(template: Option<&str>, prize: Option<&str>) -> String {
    match template {
        Some(template) => escape_markdown(template),
        None => {
            let mut text = String::from("🎉 Raffle time! Tap the button below to participate.");
            if let Some(prize) = prize {
                text.push_str(&format!("\n\n🎁 Prize: {prize}"));
            }
            escape_markdown(&text)
        }
    }
}

pub async fn handle_randy(
    bot: Bot,
    msg: Message,
    prize: String,
    db: &DatabaseManager,
    config: &Config,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    let user = match msg.from() {
        Some(user) => user,
        None => return Ok(()),
    };
    let user_id = user.id.0 as i64;
    let username = user.username.as_ref().map_or("unknown", |v| v);

    if msg.chat.is_private() {
        CommandFeedback::new(bot.clone(), msg.chat.id)
            .info("Raffles run in groups and channels. Add me to a group and use /randy there.")
            .await?;
        return Ok(());
    }

    if let Err(e) = validate_telegram_chat_id(chat_id) {
        tracing::warn!("Chat validation failed for chat_id {}: {}", chat_id, e);
        return Ok(());
    }

    // Only chat admins start raffles; anyone else is ignored like any other noise.
    if !is_chat_admin(&bot, chat_id, user_id, config.admin_user_id).await {
        tracing::debug!(
            "Ignoring /randy from non-admin {} ({}) in chat {}",
            username,
            user_id,
            chat_id
        );
        return Ok(());
    }

    let prize = prize.trim();
    let prize = if prize.is_empty() {
        None
    } else {
        Some(prize.to_string())
    };

    if let Some(ref prize) = prize {
        if let Err(e) = validate_prize(prize) {
            CommandFeedback::new(bot.clone(), msg.chat.id)
                .validation_error(
                    &format!("Invalid prize: {e}"),
                    "Keep the prize to a single line of at most 200 characters.",
                )
                .await?;
            return Ok(());
        }
    }

    let chat = match Chat::get_or_create(&db.pool, chat_id).await {
        Ok(chat) => chat,
        Err(e) => {
            tracing::error!("Failed to load chat config for {}: {}", chat_id, e);
            CommandFeedback::new(bot.clone(), msg.chat.id)
                .error("Could not start the raffle, please try again.")
                .await?;
            return Ok(());
        }
    };

    let text = raffle_text(chat.raffle_message.as_deref(), prize.as_deref());
    let sent = bot
        .send_message(msg.chat.id, text)
        .reply_markup(join_keyboard(0))
        .parse_mode(ParseMode::MarkdownV2)
        .await?;

    if let Err(e) = Raffle::create(&db.pool, chat_id, sent.id.0 as i64, prize, user_id).await {
        tracing::error!("Failed to persist raffle {}:{}: {}", chat_id, sent.id.0, e);
        // The post has no backing raffle row; remove it.
        let _ = bot.delete_message(msg.chat.id, sent.id).await;
        CommandFeedback::new(bot.clone(), msg.chat.id)
            .error("Could not start the raffle, please try again.")
            .await?;
        return Ok(());
    }

    tracing::info!(
        "Raffle started in chat {} (message {}) by {} ({})",
        chat_id,
        sent.id.0,
        username,
        user_id
    );

    // Tidy away the command message unless the chat opted out.
    if !chat.no_delete {
        if let Err(e) = bot.delete_message(msg.chat.id, msg.id).await {
            tracing::debug!("Could not delete /randy command message: {}", e);
        }
    }

    Ok(())
}
