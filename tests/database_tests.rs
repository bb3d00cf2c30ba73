use anyhow::Result;
use raffle_bot::database::{connection::DatabaseManager, models::*, store::SqliteRaffleStore};
use raffle_bot::services::finalize::{FinishWrite, RaffleRef, RaffleStore};
use tempfile::{tempdir, TempDir};

async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

#[tokio::test]
async fn test_chat_creation_and_retrieval() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let chat_id = -100200300i64;

    let chat = Chat::get_or_create(&db.pool, chat_id).await?;
    assert_eq!(chat.telegram_chat_id, chat_id);
    assert!(!chat.no_delete);
    assert!(chat.raffle_message.is_none());
    assert!(chat.winner_message.is_none());
    assert!(chat.required_channel.is_none());

    // A second get_or_create returns the same row
    let again = Chat::get_or_create(&db.pool, chat_id).await?;
    assert_eq!(again.id, chat.id);

    Ok(())
}

#[tokio::test]
async fn test_chat_unique_constraint() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let chat_id = -100200301i64;

    let _chat = Chat::create(&db.pool, chat_id).await?;

    let result = Chat::create(&db.pool, chat_id).await;
    assert!(result.is_err());

    Ok(())
}

#[tokio::test]
async fn test_chat_settings_updates() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let chat_id = -100200302i64;

    Chat::get_or_create(&db.pool, chat_id).await?;

    Chat::set_raffle_message(&db.pool, chat_id, Some("Join the giveaway!".to_string())).await?;
    Chat::set_winner_message(&db.pool, chat_id, Some("Congrats $winner!".to_string())).await?;
    Chat::set_no_delete(&db.pool, chat_id, true).await?;
    Chat::set_required_channel(&db.pool, chat_id, Some("@mychannel".to_string())).await?;

    let chat = Chat::find_by_chat_id(&db.pool, chat_id).await?.unwrap();
    assert_eq!(chat.raffle_message.as_deref(), Some("Join the giveaway!"));
    assert_eq!(chat.winner_message.as_deref(), Some("Congrats $winner!"));
    assert!(chat.no_delete);
    assert_eq!(chat.required_channel.as_deref(), Some("@mychannel"));

    Chat::set_required_channel(&db.pool, chat_id, None).await?;
    let chat = Chat::find_by_chat_id(&db.pool, chat_id).await?.unwrap();
    assert!(chat.required_channel.is_none());

    Ok(())
}

#[tokio::test]
async fn test_raffle_creation_and_retrieval() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let chat_id = -100200303i64;
    let message_id = 42i64;
    let created_by = 777i64;

    let raffle = Raffle::create(
        &db.pool,
        chat_id,
        message_id,
        Some("a mug".to_string()),
        created_by,
    )
    .await?;

    assert_eq!(raffle.chat_id, chat_id);
    assert_eq!(raffle.message_id, message_id);
    assert_eq!(raffle.prize.as_deref(), Some("a mug"));
    assert_eq!(raffle.status, RAFFLE_OPEN);
    assert!(raffle.winner_id.is_none());
    assert_eq!(raffle.created_by, created_by);

    let found = Raffle::find_by_ref(&db.pool, chat_id, message_id).await?;
    assert!(found.is_some());
    assert_eq!(found.unwrap().message_id, message_id);

    Ok(())
}

#[tokio::test]
async fn test_raffle_not_found() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let result = Raffle::find_by_ref(&db.pool, -1, 99999).await?;
    assert!(result.is_none());

    Ok(())
}

#[tokio::test]
async fn test_participant_registration_and_uniqueness() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let chat_id = -100200304i64;
    let message_id = 7i64;

    Raffle::create(&db.pool, chat_id, message_id, None, 1).await?;

    let joined =
        Participant::register(&db.pool, chat_id, message_id, 100, Some("alice".to_string()))
            .await?;
    assert!(joined);

    // Duplicate registration is a no-op
    let joined_again =
        Participant::register(&db.pool, chat_id, message_id, 100, Some("alice".to_string()))
            .await?;
    assert!(!joined_again);

    let joined_other = Participant::register(&db.pool, chat_id, message_id, 200, None).await?;
    assert!(joined_other);

    let participants = Participant::find_by_raffle(&db.pool, chat_id, message_id).await?;
    assert_eq!(participants.len(), 2);
    assert_eq!(participants[0].user_id, 100);
    assert_eq!(participants[0].username.as_deref(), Some("alice"));
    assert_eq!(participants[1].user_id, 200);

    let count = Participant::count_by_raffle(&db.pool, chat_id, message_id).await?;
    assert_eq!(count, 2);

    Ok(())
}

#[tokio::test]
async fn test_registration_requires_an_open_raffle() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let chat_id = -100200305i64;

    // No raffle at all
    let joined = Participant::register(&db.pool, chat_id, 1, 100, None).await?;
    assert!(!joined);

    Ok(())
}

#[tokio::test]
async fn test_finish_if_open_is_a_single_shot() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let chat_id = -100200306i64;
    let message_id = 9i64;

    Raffle::create(&db.pool, chat_id, message_id, None, 1).await?;
    Participant::register(&db.pool, chat_id, message_id, 100, None).await?;

    let finished = Raffle::finish_if_open(&db.pool, chat_id, message_id, 100).await?;
    assert!(finished);

    let raffle = Raffle::find_by_ref(&db.pool, chat_id, message_id).await?.unwrap();
    assert_eq!(raffle.status, RAFFLE_FINISHED);
    assert_eq!(raffle.winner_id, Some(100));

    // The second conditional write loses: status is no longer open
    let finished_again = Raffle::finish_if_open(&db.pool, chat_id, message_id, 200).await?;
    assert!(!finished_again);

    let raffle = Raffle::find_by_ref(&db.pool, chat_id, message_id).await?.unwrap();
    assert_eq!(raffle.winner_id, Some(100));

    Ok(())
}

#[tokio::test]
async fn test_finished_raffle_rejects_new_participants() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let chat_id = -100200307i64;
    let message_id = 11i64;

    Raffle::create(&db.pool, chat_id, message_id, None, 1).await?;
    Participant::register(&db.pool, chat_id, message_id, 100, None).await?;
    Raffle::finish_if_open(&db.pool, chat_id, message_id, 100).await?;

    let joined = Participant::register(&db.pool, chat_id, message_id, 200, None).await?;
    assert!(!joined);

    let count = Participant::count_by_raffle(&db.pool, chat_id, message_id).await?;
    assert_eq!(count, 1);

    Ok(())
}

#[tokio::test]
async fn test_store_adapter_loads_snapshots() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let chat_id = -100200308i64;
    let message_id = 13i64;

    Raffle::create(&db.pool, chat_id, message_id, Some("prize".to_string()), 1).await?;
    Participant::register(&db.pool, chat_id, message_id, 100, None).await?;
    Participant::register(&db.pool, chat_id, message_id, 200, None).await?;

    let store = SqliteRaffleStore::new(db.pool.clone());
    let raffle_ref = RaffleRef {
        chat_id,
        message_id,
    };

    let snapshot = store.load(raffle_ref).await.unwrap().unwrap();
    assert_eq!(snapshot.raffle.status, RAFFLE_OPEN);
    assert_eq!(snapshot.participants.len(), 2);

    let missing = store
        .load(RaffleRef {
            chat_id,
            message_id: 999,
        })
        .await
        .unwrap();
    assert!(missing.is_none());

    Ok(())
}

#[tokio::test]
async fn test_store_adapter_finish_reports_the_race_loser() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let chat_id = -100200309i64;
    let message_id = 17i64;

    Raffle::create(&db.pool, chat_id, message_id, None, 1).await?;
    Participant::register(&db.pool, chat_id, message_id, 100, None).await?;

    let store = SqliteRaffleStore::new(db.pool.clone());
    let raffle_ref = RaffleRef {
        chat_id,
        message_id,
    };

    let first = store.finish(raffle_ref, 100).await.unwrap();
    assert_eq!(first, FinishWrite::Finished);

    let second = store.finish(raffle_ref, 200).await.unwrap();
    assert_eq!(second, FinishWrite::AlreadyFinished);

    // Finishing something that never existed is indistinguishable from losing
    let missing = store
        .finish(
            RaffleRef {
                chat_id,
                message_id: 999,
            },
            100,
        )
        .await
        .unwrap();
    assert_eq!(missing, FinishWrite::AlreadyFinished);

    Ok(())
}
