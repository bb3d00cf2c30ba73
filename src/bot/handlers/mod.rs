pub mod callback;
pub mod forward;
pub mod message;

use teloxide::{
    dispatching::{dialogue, UpdateHandler},
    prelude::*,
};

use crate::config::Config;
use crate::database::connection::DatabaseManager;

pub struct BotHandler {
    pub db: DatabaseManager,
    pub config: Config,
}

impl BotHandler {
    pub fn new(db: DatabaseManager, config: Config) -> Self {
        Self { db, config }
    }

    pub fn schema(&self) -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
        use teloxide::dispatching::UpdateFilterExt;

        let db_commands = self.db.clone();
        let config_commands = self.config.clone();
        let db_callback = self.db.clone();
        let db_forward = self.db.clone();
        let config_forward = self.config.clone();

        dialogue::enter::<Update, teloxide::dispatching::dialogue::InMemStorage<()>, (), _>()
            .branch(
                Update::filter_message()
                    .filter_command::<crate::bot::commands::Command>()
                    .endpoint(
                        move |bot: Bot, msg: Message, cmd: crate::bot::commands::Command| {
                            let db = db_commands.clone();
                            let config = config_commands.clone();
                            async move {
                                message::command_handler(bot, msg, cmd, db, config)
                                    .await
                                    .map_err(Into::into)
                            }
                        },
                    ),
            )
            .branch(
                Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                    let db = db_callback.clone();
                    async move {
                        callback::callback_handler(bot, q, db)
                            .await
                            .map_err(Into::into)
                    }
                }),
            )
            // Non-command messages: forwarded raffle messages trigger the draw.
            .branch(Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
                let db = db_forward.clone();
                let config = config_forward.clone();
                async move {
                    forward::forward_handler(bot, msg, db, config)
                        .await
                        .map_err(Into::into)
                }
            }))
    }
}
