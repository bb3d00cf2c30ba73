use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status of a raffle that is still accepting participants.
pub const RAFFLE_OPEN: &str = "open";
/// Status of a raffle whose winner has been drawn.
pub const RAFFLE_FINISHED: &str = "finished";

/// A raffle, keyed by the chat it runs in and the message announcing it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Raffle {
    pub chat_id: i64,
    pub message_id: i64,
    pub prize: Option<String>,
    pub status: String,
    pub winner_id: Option<i64>,
    pub created_by: i64,
    pub created_at: String,
}

/// A user registered for a raffle. Owned by exactly one raffle.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Participant {
    pub chat_id: i64,
    pub message_id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub joined_at: String,
}

impl Raffle {
    pub fn is_finished(&self) -> bool {
        self.status == RAFFLE_FINISHED
    }

    pub async fn create(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        message_id: i64,
        prize: Option<String>,
        created_by: i64,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO raffles (chat_id, message_id, prize, status, winner_id, created_by, created_at)
            VALUES (?, ?, ?, 'open', NULL, ?, ?)
            "#,
        )
        .bind(chat_id)
        .bind(message_id)
        .bind(prize)
        .bind(created_by)
        .bind(now)
        .execute(pool)
        .await?;

        Self::find_by_ref(pool, chat_id, message_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_ref(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        message_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Raffle>(
            "SELECT chat_id, message_id, prize, status, winner_id, created_by, created_at \
             FROM raffles WHERE chat_id = ? AND message_id = ?",
        )
        .bind(chat_id)
        .bind(message_id)
        .fetch_optional(pool)
        .await
    }

    /// Conditional finish-write: records the winner and flips the status in a
    /// single statement, guarded on the status still being `open`. Returns
    /// `false` when the raffle was already finished (or does not exist), so
    /// two concurrent draws can never both claim the write.
    pub async fn finish_if_open(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        message_id: i64,
        winner_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE raffles SET status = 'finished', winner_id = ? \
             WHERE chat_id = ? AND message_id = ? AND status = 'open'",
        )
        .bind(winner_id)
        .bind(chat_id)
        .bind(message_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

impl Participant {
    /// Registers a user for a raffle. The insert is gated on the raffle still
    /// being open, and duplicate registrations are ignored; a finished
    /// raffle's participant set never changes. Returns `true` only when a new
    /// row was written.
    pub async fn register(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        message_id: i64,
        user_id: i64,
        username: Option<String>,
    ) -> Result<bool, sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO participants (chat_id, message_id, user_id, username, joined_at)
            SELECT r.chat_id, r.message_id, ?, ?, ?
            FROM raffles r
            WHERE r.chat_id = ? AND r.message_id = ? AND r.status = 'open'
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(now)
        .bind(chat_id)
        .bind(message_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn find_by_raffle(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        message_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(
            "SELECT chat_id, message_id, user_id, username, joined_at \
             FROM participants WHERE chat_id = ? AND message_id = ? ORDER BY rowid",
        )
        .bind(chat_id)
        .bind(message_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_raffle(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        message_id: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM participants WHERE chat_id = ? AND message_id = ?",
        )
        .bind(chat_id)
        .bind(message_id)
        .fetch_one(pool)
        .await
    }
}
