//! Integration tests for the session controller over real stores.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use super_tictactoe::engine::{
    ActiveBoard, GameStatus, MoveError, Player, Position, Resolution, forfeit,
};
use super_tictactoe::{
    FileStore, GameId, InMemoryStore, MatchRecord, SessionConfig, SessionController, SessionError,
    StateStore, StoreError, Version,
};
use tokio::sync::broadcast;

fn controller() -> SessionController<InMemoryStore> {
    SessionController::new(InMemoryStore::new(), SessionConfig::default())
}

async fn started<S: StateStore>(controller: &SessionController<S>) -> MatchRecord {
    controller.create_match("g1", "alice").await.expect("created");
    controller.join("g1", "bob").await.expect("joined")
}

// ─────────────────────────────────────────────────────────────
//  Stores that lose write races on purpose
// ─────────────────────────────────────────────────────────────

/// Fails the first `failures` writes with a version conflict.
struct FlakyStore {
    inner: InMemoryStore,
    failures: AtomicU32,
}

#[async_trait]
impl StateStore for FlakyStore {
    async fn create(&self, record: MatchRecord) -> Result<MatchRecord, StoreError> {
        self.inner.create(record).await
    }

    async fn read(&self, game_id: &str) -> Result<MatchRecord, StoreError> {
        self.inner.read(game_id).await
    }

    async fn write(&self, record: MatchRecord, expected: Version) -> Result<MatchRecord, StoreError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::conflict(record.game_id(), expected, expected + 1));
        }
        self.inner.write(record, expected).await
    }

    async fn list(&self) -> Result<Vec<GameId>, StoreError> {
        self.inner.list().await
    }

    fn subscribe(&self) -> broadcast::Receiver<MatchRecord> {
        self.inner.subscribe()
    }
}

/// Lets a rival write land just before the next write goes through.
struct RacingStore {
    inner: InMemoryStore,
    rival: Mutex<Option<MatchRecord>>,
}

#[async_trait]
impl StateStore for RacingStore {
    async fn create(&self, record: MatchRecord) -> Result<MatchRecord, StoreError> {
        self.inner.create(record).await
    }

    async fn read(&self, game_id: &str) -> Result<MatchRecord, StoreError> {
        self.inner.read(game_id).await
    }

    async fn write(&self, record: MatchRecord, expected: Version) -> Result<MatchRecord, StoreError> {
        let rival = self.rival.lock().expect("lock").take();
        if let Some(rival) = rival {
            let base = rival.version() - 1;
            self.inner.write(rival, base).await?;
        }
        self.inner.write(record, expected).await
    }

    async fn list(&self) -> Result<Vec<GameId>, StoreError> {
        self.inner.list().await
    }

    fn subscribe(&self) -> broadcast::Receiver<MatchRecord> {
        self.inner.subscribe()
    }
}

// ─────────────────────────────────────────────────────────────
//  Lifecycle
// ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_join_starts_match() {
    let controller = controller();
    let created = controller.create_match("g1", "alice").await.expect("created");
    assert_eq!(created.state().status(), GameStatus::Waiting);
    assert_eq!(*created.version(), 0);

    let joined = controller.join("g1", "bob").await.expect("joined");
    assert_eq!(joined.state().status(), GameStatus::Playing);
    assert_eq!(joined.roster().guest(), Some("bob"));
    assert_eq!(joined.state().turn(), "alice");
    assert_eq!(*joined.version(), 1);
}

#[tokio::test]
async fn test_play_stores_move_and_routes() {
    let controller = controller();
    started(&controller).await;

    let record = controller.play("g1", "alice", 0, 4).await.expect("legal");
    assert_eq!(*record.version(), 2);
    assert_eq!(record.state().active_board(), ActiveBoard::Only(Position::Center));
    assert_eq!(record.state().turn(), "bob");
    assert_eq!(controller.snapshot("g1").await.expect("stored"), record);
}

#[tokio::test]
async fn test_rejected_move_is_not_written() {
    let controller = controller();
    let before = started(&controller).await;

    let err = controller.play("g1", "bob", 0, 0).await.unwrap_err();
    assert!(matches!(err, SessionError::Move(MoveError::NotYourTurn)));
    assert_eq!(controller.snapshot("g1").await.expect("stored"), before);
}

#[tokio::test]
async fn test_move_before_guest_joins() {
    let controller = controller();
    controller.create_match("g1", "alice").await.expect("created");
    let err = controller.play("g1", "alice", 0, 0).await.unwrap_err();
    assert!(matches!(err, SessionError::Move(MoveError::WaitingForOpponent)));
}

#[tokio::test]
async fn test_duplicate_match_id_rejected() {
    let controller = controller();
    controller.create_match("g1", "alice").await.expect("created");
    assert!(matches!(
        controller.create_match("g1", "carol").await,
        Err(SessionError::Store(_))
    ));
}

// ─────────────────────────────────────────────────────────────
//  Join semantics
// ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_rejoin_is_a_no_op() {
    let controller = controller();
    let joined = started(&controller).await;

    assert_eq!(controller.join("g1", "alice").await.expect("host"), joined);
    assert_eq!(controller.join("g1", "bob").await.expect("guest"), joined);
}

#[tokio::test]
async fn test_third_player_gets_room_full() {
    let controller = controller();
    started(&controller).await;
    let err = controller.join("g1", "carol").await.unwrap_err();
    assert!(matches!(err, SessionError::RoomFull { .. }));
}

#[tokio::test]
async fn test_join_unknown_match() {
    let controller = controller();
    let err = controller.join("nope", "bob").await.unwrap_err();
    assert!(matches!(err, SessionError::GameNotFound { ref game_id } if game_id == "nope"));
}

// ─────────────────────────────────────────────────────────────
//  Compare-and-set
// ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_conflicts_retried_until_write_lands() {
    let store = FlakyStore {
        inner: InMemoryStore::new(),
        failures: AtomicU32::new(0),
    };
    let controller = SessionController::new(store, SessionConfig::default());
    started(&controller).await;

    controller.store().failures.store(2, Ordering::SeqCst);
    let record = controller.play("g1", "alice", 4, 4).await.expect("third attempt lands");
    assert_eq!(*record.version(), 2);
}

#[tokio::test]
async fn test_conflicts_exhaust_retries() {
    let store = FlakyStore {
        inner: InMemoryStore::new(),
        failures: AtomicU32::new(0),
    };
    let controller = SessionController::new(store, SessionConfig::default().with_write_retries(2));
    started(&controller).await;

    controller.store().failures.store(2, Ordering::SeqCst);
    let err = controller.play("g1", "alice", 4, 4).await.unwrap_err();
    assert!(matches!(err, SessionError::Conflict { attempts: 2, .. }));
    assert_eq!(*controller.snapshot("g1").await.expect("stored").version(), 1);
}

#[tokio::test]
async fn test_lost_race_is_revalidated() {
    let store = RacingStore {
        inner: InMemoryStore::new(),
        rival: Mutex::new(None),
    };
    let controller = SessionController::new(store, SessionConfig::default());
    let joined = started(&controller).await;

    // Bob concedes from another device while Alice's move is in flight.
    let conceded = forfeit(joined.state(), joined.roster(), "bob").expect("forfeit");
    let rival = joined.advanced(joined.roster().clone(), conceded, Utc::now());
    *controller.store().rival.lock().expect("lock") = Some(rival);

    let err = controller.play("g1", "alice", 4, 4).await.unwrap_err();
    assert!(matches!(err, SessionError::Move(MoveError::GameAlreadyOver)));

    let stored = controller.snapshot("g1").await.expect("stored");
    assert_eq!(stored.state().match_winner(), Resolution::Won(Player::X));
    assert_eq!(stored.state().moves_played(), 0);
}

#[tokio::test]
async fn test_concurrent_duplicate_moves() {
    let controller = Arc::new(controller());
    started(&controller).await;

    let a = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.play("g1", "alice", 4, 4).await }
    });
    let b = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.play("g1", "alice", 4, 4).await }
    });
    let results = [a.await.expect("task"), b.await.expect("task")];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(r, Err(SessionError::Move(MoveError::NotYourTurn)))));
    assert_eq!(controller.snapshot("g1").await.expect("stored").state().moves_played(), 1);
}

// ─────────────────────────────────────────────────────────────
//  Subscriptions
// ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_subscriber_sees_opponent_move() {
    let controller = controller();
    started(&controller).await;
    controller.create_match("other", "carol").await.expect("created");

    let mut updates = controller.subscribe("g1");
    controller.create_match("third", "dave").await.expect("created");
    controller.play("g1", "alice", 2, 6).await.expect("legal");

    let seen = updates.next().await.expect("delivered");
    assert_eq!(seen.game_id(), "g1");
    assert_eq!(seen.state().active_board(), ActiveBoard::Only(Position::BottomLeft));
}

// ─────────────────────────────────────────────────────────────
//  Throttle
// ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_throttle_rejects_rapid_moves() {
    let config = SessionConfig::default().with_throttle_enabled(true);
    let controller = SessionController::new(InMemoryStore::new(), config);
    started(&controller).await;

    let t0 = Utc::now();
    controller.play_at("g1", "alice", 4, 0, t0).await.expect("first");
    controller
        .play_at("g1", "bob", 0, 4, t0 + Duration::milliseconds(200))
        .await
        .expect("bob's first");

    let err = controller
        .play_at("g1", "alice", 4, 8, t0 + Duration::milliseconds(500))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Throttled { retry_after_ms: 500 }));

    controller
        .play_at("g1", "alice", 4, 8, t0 + Duration::milliseconds(1500))
        .await
        .expect("after the interval");
}

#[tokio::test]
async fn test_throttle_off_by_default() {
    let controller = controller();
    started(&controller).await;
    let t0 = Utc::now();
    controller.play_at("g1", "alice", 4, 0, t0).await.expect("first");
    controller.play_at("g1", "bob", 0, 4, t0).await.expect("second");
    controller.play_at("g1", "alice", 4, 8, t0).await.expect("third");
}

// ─────────────────────────────────────────────────────────────
//  Turn deadline
// ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_expired_turn_forfeits_mover() {
    let controller = controller();
    let joined = started(&controller).await;
    let deadline = *joined.updated_at() + Duration::seconds(300);

    let err = controller
        .expire_turn_at("g1", deadline - Duration::seconds(10))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::DeadlineNotReached { remaining_secs: 10 }));

    let record = controller.expire_turn_at("g1", deadline).await.expect("expired");
    assert_eq!(record.state().status(), GameStatus::Win);
    assert_eq!(record.state().match_winner(), Resolution::Won(Player::O));
    assert_eq!(record.state().score().of(Player::O), 1);
}

#[tokio::test]
async fn test_each_move_resets_deadline() {
    let controller = controller();
    let joined = started(&controller).await;
    let later = *joined.updated_at() + Duration::seconds(200);
    let moved = controller.play_at("g1", "alice", 4, 4, later).await.expect("legal");
    assert_eq!(*moved.updated_at(), later);

    let err = controller
        .expire_turn_at("g1", later + Duration::seconds(200))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::DeadlineNotReached { .. }));
}

#[tokio::test]
async fn test_waiting_match_has_no_deadline() {
    let controller = controller();
    controller.create_match("g1", "alice").await.expect("created");
    let err = controller
        .expire_turn_at("g1", Utc::now() + Duration::days(1))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Move(MoveError::WaitingForOpponent)));
}

// ─────────────────────────────────────────────────────────────
//  Forfeit and rematch
// ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_rematch_after_forfeit() {
    let controller = controller();
    started(&controller).await;
    controller.play("g1", "alice", 4, 4).await.expect("legal");

    let err = controller.rematch("g1", "bob").await.unwrap_err();
    assert!(matches!(err, SessionError::Move(MoveError::GameNotFinished)));

    controller.forfeit("g1", "bob").await.expect("conceded");
    let err = controller.rematch("g1", "carol").await.unwrap_err();
    assert!(matches!(err, SessionError::Move(MoveError::NotAParticipant(_))));

    let record = controller.rematch("g1", "bob").await.expect("rematch");
    let state = record.state();
    assert_eq!(state.status(), GameStatus::Playing);
    assert_eq!(state.turn(), "alice");
    assert_eq!(state.moves_played(), 0);
    assert_eq!(state.score().to_pair(), [1, 0]);
}

// ─────────────────────────────────────────────────────────────
//  File store
// ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_file_backed_match_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let store = FileStore::open(dir.path()).await.expect("opened");
        let controller = SessionController::new(store, SessionConfig::default());
        started(&controller).await;
        controller.play("g1", "alice", 0, 8).await.expect("legal");
    }

    let store = FileStore::open(dir.path()).await.expect("reopened");
    let controller = SessionController::new(store, SessionConfig::default());
    let record = controller.snapshot("g1").await.expect("stored");
    assert_eq!(record.state().active_board(), ActiveBoard::Only(Position::BottomRight));
    assert_eq!(record.state().turn(), "bob");

    controller.play("g1", "bob", 8, 0).await.expect("legal");
    assert_eq!(controller.games().await.expect("listed"), vec!["g1".to_string()]);
}
