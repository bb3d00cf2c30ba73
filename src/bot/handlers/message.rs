use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::commands::Command;
use crate::config::Config;
use crate::database::connection::DatabaseManager;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    db: DatabaseManager,
    config: Config,
) -> ResponseResult<()> {
    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Start => {
            bot.send_message(
                msg.chat.id,
                "🎉 Welcome to Raffle Bot!\n\nAdd me to a group and use /randy to start a raffle.\nForward the raffle message back to me to draw a winner.\nUse /help to see all commands.",
            )
            .await?;
        }
        Command::Randy { prize } => {
            crate::bot::commands::randy::handle_randy(bot, msg, prize, &db, &config).await?;
        }
        Command::RaffleMessage { text } => {
            crate::bot::commands::templates::handle_raffle_message(bot, msg, text, &db, &config)
                .await?;
        }
        Command::WinnerMessage { text } => {
            crate::bot::commands::templates::handle_winner_message(bot, msg, text, &db, &config)
                .await?;
        }
        Command::NoDelete => {
            crate::bot::commands::preferences::handle_no_delete(bot, msg, &db, &config).await?;
        }
        Command::Subscribe { channel } => {
            crate::bot::commands::preferences::handle_subscribe(bot, msg, channel, &db, &config)
                .await?;
        }
        Command::NoSubscribe => {
            crate::bot::commands::preferences::handle_no_subscribe(bot, msg, &db, &config).await?;
        }
        Command::Id => {
            crate::bot::commands::preferences::handle_id(bot, msg).await?;
        }
    }
    Ok(())
}
