use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-chat settings: message templates, deletion policy, and the optional
/// channel a user must be subscribed to before joining a raffle.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub telegram_chat_id: i64,
    pub raffle_message: Option<String>,
    pub winner_message: Option<String>,
    pub no_delete: bool,
    pub required_channel: Option<String>,
    pub created_at: String,
}

impl Chat {
    pub async fn find_by_chat_id(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Chat>(
            "SELECT id, telegram_chat_id, raffle_message, winner_message, no_delete, required_channel, created_at \
             FROM chats WHERE telegram_chat_id = ?",
        )
        .bind(chat_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &sqlx::SqlitePool, chat_id: i64) -> Result<Self, sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO chats (telegram_chat_id, no_delete, created_at) VALUES (?, 0, ?)",
        )
        .bind(chat_id)
        .bind(now)
        .execute(pool)
        .await?;

        Self::find_by_chat_id(pool, chat_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn get_or_create(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
    ) -> Result<Self, sqlx::Error> {
        match Self::find_by_chat_id(pool, chat_id).await? {
            Some(chat) => Ok(chat),
            None => Self::create(pool, chat_id).await,
        }
    }

    pub async fn set_raffle_message(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        template: Option<String>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE chats SET raffle_message = ? WHERE telegram_chat_id = ?")
            .bind(template)
            .bind(chat_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn set_winner_message(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        template: Option<String>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE chats SET winner_message = ? WHERE telegram_chat_id = ?")
            .bind(template)
            .bind(chat_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn set_no_delete(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        no_delete: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE chats SET no_delete = ? WHERE telegram_chat_id = ?")
            .bind(no_delete)
            .bind(chat_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn set_required_channel(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        channel: Option<String>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE chats SET required_channel = ? WHERE telegram_chat_id = ?")
            .bind(channel)
            .bind(chat_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
