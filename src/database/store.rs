use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::database::models::{Participant, Raffle};
use crate::services::finalize::{FinishWrite, RaffleRef, RaffleSnapshot, RaffleStore, StoreUnavailable};

/// SQLite-backed raffle store. Any database error is reported as the
/// retryable `StoreUnavailable` kind; correctness of the finish transition
/// rests on the conditional UPDATE, not on error classification.
#[derive(Clone)]
pub struct SqliteRaffleStore {
    pool: SqlitePool,
}

impl SqliteRaffleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn unavailable(err: sqlx::Error) -> StoreUnavailable {
    StoreUnavailable(err.to_string())
}

#[async_trait]
impl RaffleStore for SqliteRaffleStore {
    async fn load(&self, raffle: RaffleRef) -> Result<Option<RaffleSnapshot>, StoreUnavailable> {
        let row = Raffle::find_by_ref(&self.pool, raffle.chat_id, raffle.message_id)
            .await
            .map_err(unavailable)?;

        match row {
            Some(row) => {
                let participants =
                    Participant::find_by_raffle(&self.pool, raffle.chat_id, raffle.message_id)
                        .await
                        .map_err(unavailable)?;
                Ok(Some(RaffleSnapshot {
                    raffle: row,
                    participants,
                }))
            }
            None => Ok(None),
        }
    }

    async fn finish(
        &self,
        raffle: RaffleRef,
        winner_id: i64,
    ) -> Result<FinishWrite, StoreUnavailable> {
        let finished =
            Raffle::finish_if_open(&self.pool, raffle.chat_id, raffle.message_id, winner_id)
                .await
                .map_err(unavailable)?;

        Ok(if finished {
            FinishWrite::Finished
        } else {
            FinishWrite::AlreadyFinished
        })
    }
}
