use teloxide::prelude::*;
use teloxide::types::{ChatMemberStatus, Recipient, UserId};

use crate::bot::commands::randy::join_keyboard;
use crate::database::{connection::DatabaseManager, models::*};

/// Handles taps on the participate button: re-checks the raffle is still
/// open, applies the chat's subscription requirement, registers the user,
/// and refreshes the entry counter on the button.
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    db: DatabaseManager,
) -> ResponseResult<()> {
    let data = match q.data.as_deref() {
        Some(data) => data,
        None => {
            bot.answer_callback_query(q.id).await?;
            return Ok(());
        }
    };

    if data != "join" {
        tracing::debug!("Ignoring unknown callback data: {}", data);
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    }

    let message = match q.message.as_ref() {
        Some(message) => message,
        None => {
            // Message too old for Telegram to include in the callback.
            bot.answer_callback_query(q.id)
                .text("This raffle can no longer be joined.")
                .await?;
            return Ok(());
        }
    };

    let chat_id = message.chat.id.0;
    let message_id = message.id.0 as i64;
    let user_id = q.from.id.0 as i64;
    let username = q.from.username.clone();

    tracing::info!(
        "Join tap from user {} on raffle {}:{}",
        user_id,
        chat_id,
        message_id
    );

    let raffle = match Raffle::find_by_ref(&db.pool, chat_id, message_id).await {
        Ok(Some(raffle)) => raffle,
        Ok(None) => {
            bot.answer_callback_query(q.id)
                .text("This raffle no longer exists.")
                .await?;
            return Ok(());
        }
        Err(e) => {
            tracing::error!("Failed to load raffle {}:{}: {}", chat_id, message_id, e);
            bot.answer_callback_query(q.id)
                .text("Something went wrong, try again.")
                .await?;
            return Ok(());
        }
    };

    if raffle.is_finished() {
        bot.answer_callback_query(q.id)
            .text("This raffle is already over.")
            .await?;
        return Ok(());
    }

    // Subscription requirement, when the chat has one.
    match Chat::find_by_chat_id(&db.pool, chat_id).await {
        Ok(Some(chat)) => {
            if let Some(channel) = chat.required_channel {
                if !is_subscribed(&bot, &channel, q.from.id).await {
                    bot.answer_callback_query(q.id)
                        .text(format!("Subscribe to {channel} first, then tap again!"))
                        .await?;
                    return Ok(());
                }
            }
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("Failed to load chat config for {}: {}", chat_id, e);
        }
    }

    let joined =
        match Participant::register(&db.pool, chat_id, message_id, user_id, username).await {
            Ok(joined) => joined,
            Err(e) => {
                tracing::error!(
                    "Failed to register participant {} for {}:{}: {}",
                    user_id,
                    chat_id,
                    message_id,
                    e
                );
                bot.answer_callback_query(q.id)
                    .text("Something went wrong, try again.")
                    .await?;
                return Ok(());
            }
        };

    if joined {
        if let Err(e) = refresh_join_counter(&bot, &db, message).await {
            tracing::warn!("Could not refresh participant counter: {}", e);
        }
        bot.answer_callback_query(q.id)
            .text("🎉 You're in! Good luck!")
            .await?;
    } else {
        bot.answer_callback_query(q.id)
            .text("You're already in this raffle.")
            .await?;
    }

    Ok(())
}

async fn is_subscribed(bot: &Bot, channel: &str, user: UserId) -> bool {
    match bot
        .get_chat_member(Recipient::ChannelUsername(channel.to_string()), user)
        .await
    {
        Ok(member) => !matches!(
            member.status(),
            ChatMemberStatus::Left | ChatMemberStatus::Banned
        ),
        Err(e) => {
            // Cannot verify (the bot may not be in the channel); let the tap through.
            tracing::warn!("Subscription check against {} failed: {}", channel, e);
            true
        }
    }
}

async fn refresh_join_counter(
    bot: &Bot,
    db: &DatabaseManager,
    message: &Message,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let count =
        Participant::count_by_raffle(&db.pool, message.chat.id.0, message.id.0 as i64).await?;

    bot.edit_message_reply_markup(message.chat.id, message.id)
        .reply_markup(join_keyboard(count))
        .await?;

    Ok(())
}
