pub mod preferences;
pub mod randy;
pub mod templates;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::members::is_chat_admin;
use crate::config::Config;
use crate::utils::feedback::CommandFeedback;

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Raffle bot commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Start a raffle, optionally naming the prize")]
    Randy { prize: String },
    #[command(description = "Set this chat's raffle message template")]
    RaffleMessage { text: String },
    #[command(description = "Set this chat's winner message template ($winner placeholder)")]
    WinnerMessage { text: String },
    #[command(description = "Toggle tidying deletions on or off")]
    NoDelete,
    #[command(description = "Require subscription to a channel before joining")]
    Subscribe { channel: String },
    #[command(description = "Drop the subscription requirement")]
    NoSubscribe,
    #[command(description = "Show this chat's identifier")]
    Id,
}

/// Group-configuration commands are admin-only and make no sense in private
/// chats. Non-admin invocations are ignored without a reply, matching the
/// noise policy for unauthorized raffle triggers.
pub(crate) async fn ensure_group_admin(
    bot: &Bot,
    msg: &Message,
    config: &Config,
) -> ResponseResult<bool> {
    if msg.chat.is_private() {
        CommandFeedback::new(bot.clone(), msg.chat.id)
            .info("This command configures a group chat. Run it in the group you want to change.")
            .await?;
        return Ok(false);
    }

    let user_id = match msg.from() {
        Some(user) => user.id.0 as i64,
        None => return Ok(false),
    };

    Ok(is_chat_admin(bot, msg.chat.id.0, user_id, config.admin_user_id).await)
}
