use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::bot::commands::ensure_group_admin;
use crate::config::Config;
use crate::database::{connection::DatabaseManager, models::Chat};
use crate::utils::{feedback::CommandFeedback, validation::validate_channel_username};

pub async fn handle_no_delete(
    bot: Bot,
    msg: Message,
    db: &DatabaseManager,
    config: &Config,
) -> ResponseResult<()> {
    if !ensure_group_admin(&bot, &msg, config).await? {
        return Ok(());
    }

    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);
    let chat_id = msg.chat.id.0;

    let chat = match Chat::get_or_create(&db.pool, chat_id).await {
        Ok(chat) => chat,
        Err(e) => {
            tracing::error!("Failed to load chat config for {}: {}", chat_id, e);
            feedback.error("Could not update the setting, please try again.").await?;
            return Ok(());
        }
    };

    let no_delete = !chat.no_delete;
    if let Err(e) = Chat::set_no_delete(&db.pool, chat_id, no_delete).await {
        tracing::error!("Failed to toggle no_delete for {}: {}", chat_id, e);
        feedback.error("Could not update the setting, please try again.").await?;
        return Ok(());
    }

    if no_delete {
        feedback.success("I will leave command messages in place.").await?;
    } else {
        feedback.success("I will tidy up command messages again.").await?;
    }
    Ok(())
}

pub async fn handle_subscribe(
    bot: Bot,
    msg: Message,
    channel: String,
    db: &DatabaseManager,
    config: &Config,
) -> ResponseResult<()> {
    if !ensure_group_admin(&bot, &msg, config).await? {
        return Ok(());
    }

    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);
    let chat_id = msg.chat.id.0;
    let channel = channel.trim();

    if channel.is_empty() {
        feedback
            .info("Usage: /subscribe <@channel>. Participants must be subscribed to the channel before they can join.")
            .await?;
        return Ok(());
    }

    let channel = match validate_channel_username(channel) {
        Ok(channel) => channel,
        Err(e) => {
            feedback
                .validation_error(
                    &format!("Invalid channel: {e}"),
                    "Use the public @username of the channel, for example @mychannel.",
                )
                .await?;
            return Ok(());
        }
    };

    let saved = async {
        Chat::get_or_create(&db.pool, chat_id).await?;
        Chat::set_required_channel(&db.pool, chat_id, Some(channel.clone())).await
    }
    .await;

    if let Err(e) = saved {
        tracing::error!("Failed to set required channel for {}: {}", chat_id, e);
        feedback.error("Could not update the setting, please try again.").await?;
        return Ok(());
    }

    feedback
        .success(&format!("Participants now need to be subscribed to {channel}."))
        .await?;
    Ok(())
}

pub async fn handle_no_subscribe(
    bot: Bot,
    msg: Message,
    db: &DatabaseManager,
    config: &Config,
) -> ResponseResult<()> {
    if !ensure_group_admin(&bot, &msg, config).await? {
        return Ok(());
    }

    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);
    let chat_id = msg.chat.id.0;

    let saved = async {
        Chat::get_or_create(&db.pool, chat_id).await?;
        Chat::set_required_channel(&db.pool, chat_id, None).await
    }
    .await;

    if let Err(e) = saved {
        tracing::error!("Failed to clear required channel for {}: {}", chat_id, e);
        feedback.error("Could not update the setting, please try again.").await?;
        return Ok(());
    }

    feedback.success("Subscription requirement removed.").await?;
    Ok(())
}

pub async fn handle_id(bot: Bot, msg: Message) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, format!("Chat ID: `{}`", msg.chat.id.0))
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}
