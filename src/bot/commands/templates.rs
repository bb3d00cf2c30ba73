use teloxide::prelude::*;

use crate::bot::commands::ensure_group_admin;
use crate::config::Config;
use crate::database::{connection::DatabaseManager, models::Chat};
use crate::utils::{
    feedback::CommandFeedback,
    validation::{validate_template, validate_winner_template},
};

pub async fn handle_raffle_message(
    bot: Bot,
    msg: Message,
    text: String,
    db: &DatabaseManager,
    config: &Config,
) -> ResponseResult<()> {
    if !ensure_group_admin(&bot, &msg, config).await? {
        return Ok(());
    }

    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);
    let text = text.trim();

    if text.is_empty() {
        feedback
            .info("Usage: /rafflemessage <text>. The text replaces the default raffle post for this chat.")
            .await?;
        return Ok(());
    }

    if let Err(e) = validate_template(text) {
        feedback
            .validation_error(
                &format!("Invalid template: {e}"),
                "Use between 3 and 1000 characters.",
            )
            .await?;
        return Ok(());
    }

    if let Err(e) = save_raffle_template(db, msg.chat.id.0, text).await {
        tracing::error!("Failed to save raffle template for chat {}: {}", msg.chat.id.0, e);
        feedback.error("Could not save the template, please try again.").await?;
        return Ok(());
    }

    feedback.success("Raffle message template updated.").await?;
    Ok(())
}

pub async fn handle_winner_message(
    bot: Bot,
    msg: Message,
    text: String,
    db: &DatabaseManager,
    config: &Config,
) -> ResponseResult<()> {
    if !ensure_group_admin(&bot, &msg, config).await? {
        return Ok(());
    }

    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);
    let text = text.trim();

    if text.is_empty() {
        feedback
            .info("Usage: /winnermessage <text>. Include $winner where the winner's name should go.")
            .await?;
        return Ok(());
    }

    if let Err(e) = validate_winner_template(text) {
        feedback
            .validation_error(
                &format!("Invalid template: {e}"),
                "Example: Congratulations $winner, you won!",
            )
            .await?;
        return Ok(());
    }

    if let Err(e) = save_winner_template(db, msg.chat.id.0, text).await {
        tracing::error!("Failed to save winner template for chat {}: {}", msg.chat.id.0, e);
        feedback.error("Could not save the template, please try again.").await?;
        return Ok(());
    }

    feedback.success("Winner message template updated.").await?;
    Ok(())
}

async fn save_raffle_template(
    db: &DatabaseManager,
    chat_id: i64,
    text: &str,
) -> Result<(), sqlx::Error> {
    Chat::get_or_create(&db.pool, chat_id).await?;
    Chat::set_raffle_message(&db.pool, chat_id, Some(text.to_string())).await
}

async fn save_winner_template(
    db: &DatabaseManager,
    chat_id: i64,
    text: &str,
) -> Result<(), sqlx::Error> {
    Chat::get_or_create(&db.pool, chat_id).await?;
    Chat::set_winner_message(&db.pool, chat_id, Some(text.to_string())).await
}
