//! The raffle finalization engine.
//!
//! Drawing a winner must happen exactly once per raffle, no matter how many
//! times the trigger message is forwarded or how many forwards race each
//! other. The engine leans on the store's conditional finish-write for that:
//! every attempt reloads the raffle, snapshots its participants, picks a
//! winner, and asks the store to flip `open -> finished` only if the status
//! is still `open`. The loser of a race observes the already-finished state
//! and reports idempotent success instead of drawing a second winner.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::database::models::{Participant, Raffle};
use crate::services::winner;

/// Upper bound on finish attempts for a single trigger. Attempts are retried
/// back-to-back, without backoff.
pub const MAX_FINISH_ATTEMPTS: u32 = 100;

/// Identifies a raffle: the chat it runs in and its announcement message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RaffleRef {
    pub chat_id: i64,
    pub message_id: i64,
}

/// A raffle together with the participant set as of the same load.
/// Selection always runs against this snapshot, never a re-read.
#[derive(Debug, Clone)]
pub struct RaffleSnapshot {
    pub raffle: Raffle,
    pub participants: Vec<Participant>,
}

/// Result of the store's conditional finish-write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishWrite {
    /// This caller won the status flip; the winner is recorded.
    Finished,
    /// Someone else finished the raffle first (or it is gone).
    AlreadyFinished,
}

/// Transient failure reaching the raffle store. The only retryable error.
#[derive(Debug, Clone, Error)]
#[error("raffle store unavailable: {0}")]
pub struct StoreUnavailable(pub String);

/// Persistence collaborator for the engine. Backing technology is opaque.
#[async_trait]
pub trait RaffleStore: Send + Sync {
    async fn load(&self, raffle: RaffleRef) -> Result<Option<RaffleSnapshot>, StoreUnavailable>;

    async fn finish(
        &self,
        raffle: RaffleRef,
        winner_id: i64,
    ) -> Result<FinishWrite, StoreUnavailable>;
}

/// A requester's standing in the raffle's chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    Owner,
    Administrator,
    Other,
}

/// Membership-query collaborator for authorization checks.
#[async_trait]
pub trait ChatMemberGate: Send + Sync {
    async fn role(&self, chat_id: i64, user_id: i64) -> anyhow::Result<ChatRole>;
}

/// What the caller should announce, once the finish-write has been won.
/// The engine never delivers messages itself.
#[derive(Debug, Clone)]
pub struct Announcement {
    pub chat_id: i64,
    pub message_id: i64,
    pub winner: Participant,
    pub prize: Option<String>,
}

#[derive(Debug)]
pub enum FinalizeOutcome {
    /// This call drew the winner; the announcement is ready to deliver.
    Announced(Announcement),
    /// The raffle was finished before this call could draw; idempotent
    /// success, nothing to announce again.
    AlreadyFinished,
    /// The requester is not allowed to finish this raffle. Deliberately not
    /// an error: unauthorized forwards are expected noise.
    Ignored,
}

#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error("raffle not found")]
    NotFound,
    #[error("raffle has no participants")]
    NoParticipants,
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: StoreUnavailable },
    #[error("chat member lookup failed: {0}")]
    MemberLookup(anyhow::Error),
}

/// Splits a single attempt's failure into the retryable and terminal kinds,
/// so the loop never masks a fatal error as transient.
enum AttemptError {
    Transient(StoreUnavailable),
    Fatal(FinalizeError),
}

/// Orchestrates one finalization: authorization, the bounded retry loop, and
/// the conditional finish-write. Collaborators are injected at construction
/// so tests can run the engine against fakes.
#[derive(Clone)]
pub struct FinalizeService<S, G> {
    store: S,
    members: G,
    admin_user_id: i64,
}

impl<S: RaffleStore, G: ChatMemberGate> FinalizeService<S, G> {
    pub fn new(store: S, members: G, admin_user_id: i64) -> Self {
        Self {
            store,
            members,
            admin_user_id,
        }
    }

    /// Finishes a raffle on behalf of `requester`, drawing a winner at most
    /// once. Requesters who are neither the bot administrator nor a
    /// creator/administrator of the raffle's chat get `Ignored` with no state
    /// change. Only store outages are retried; `NotFound` and
    /// `NoParticipants` abort immediately.
    pub async fn finalize(
        &self,
        raffle: RaffleRef,
        requester: i64,
    ) -> Result<FinalizeOutcome, FinalizeError> {
        if !self.is_authorized(raffle.chat_id, requester).await? {
            return Ok(FinalizeOutcome::Ignored);
        }

        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match self.attempt_finish(raffle).await {
                Ok(outcome) => return Ok(outcome),
                Err(AttemptError::Fatal(err)) => return Err(err),
                Err(AttemptError::Transient(err)) => {
                    warn!(
                        "Raffle finish attempt {}/{} for chat {} message {} failed: {}",
                        attempts, MAX_FINISH_ATTEMPTS, raffle.chat_id, raffle.message_id, err
                    );
                    if attempts >= MAX_FINISH_ATTEMPTS {
                        return Err(FinalizeError::RetriesExhausted {
                            attempts,
                            last: err,
                        });
                    }
                }
            }
        }
    }

    async fn is_authorized(&self, chat_id: i64, requester: i64) -> Result<bool, FinalizeError> {
        if self.admin_user_id != 0 && requester == self.admin_user_id {
            return Ok(true);
        }
        let role = self
            .members
            .role(chat_id, requester)
            .await
            .map_err(FinalizeError::MemberLookup)?;
        Ok(matches!(role, ChatRole::Owner | ChatRole::Administrator))
    }

    /// One pass of load -> short-circuit -> select -> conditional write.
    /// The participant snapshot comes from the same load as the status check.
    async fn attempt_finish(&self, raffle: RaffleRef) -> Result<FinalizeOutcome, AttemptError> {
        let snapshot = self
            .store
            .load(raffle)
            .await
            .map_err(AttemptError::Transient)?
            .ok_or(AttemptError::Fatal(FinalizeError::NotFound))?;

        if snapshot.raffle.is_finished() {
            return Ok(FinalizeOutcome::AlreadyFinished);
        }

        let winner = winner::pick(&snapshot.participants)
            .ok_or(AttemptError::Fatal(FinalizeError::NoParticipants))?
            .clone();

        match self
            .store
            .finish(raffle, winner.user_id)
            .await
            .map_err(AttemptError::Transient)?
        {
            FinishWrite::Finished => Ok(FinalizeOutcome::Announced(Announcement {
                chat_id: raffle.chat_id,
                message_id: raffle.message_id,
                winner,
                prize: snapshot.raffle.prize,
            })),
            FinishWrite::AlreadyFinished => Ok(FinalizeOutcome::AlreadyFinished),
        }
    }
}
