//! Integration tests for the queue service against the in-memory store.

use pickup_queue_web::{
    MemoryStore, MoveCommand, MoveType, PlayerId, PlayerStatus, PopulationState, QueueError,
    QueuePositionAllocator, QueueService, SessionConfig, SessionId, Snapshot, Store, TeamSide,
};
use std::sync::Arc;

type Service = QueueService<MemoryStore>;

/// A session of the given team size with `n` players checked in, all auto-rejoining.
async fn session_with(n: usize, team_size: usize) -> (Service, SessionId) {
    let service = QueueService::new(MemoryStore::new());
    let session = service
        .start_session(SessionConfig::with_team_size(team_size))
        .unwrap();
    for i in 1..=n {
        let player = service
            .register_player(&format!("P{i}"), None, true)
            .unwrap();
        service.check_in(session.id, player.id).await.unwrap();
    }
    (service, session.id)
}

fn next_up_ids(s: &Snapshot) -> Vec<PlayerId> {
    s.next_up.iter().map(|p| p.id).collect()
}

fn counters(service: &Service, session_id: SessionId) -> (i64, i64) {
    let a = QueuePositionAllocator::from_counters(service.session(session_id).unwrap().counters);
    (a.head(), a.tail())
}

#[tokio::test]
async fn check_in_appends_at_tail() {
    let (service, session_id) = session_with(3, 4).await;
    let queue = service.store().fetch_active_queue(session_id).unwrap();
    let positions: Vec<i64> = queue.iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
    assert!(queue.iter().all(|e| e.player.status == PlayerStatus::Available));
    assert_eq!(counters(&service, session_id), (0, 3));
}

#[tokio::test]
async fn duplicate_check_in_is_rejected() {
    let (service, session_id) = session_with(2, 4).await;
    assert!(matches!(
        service.check_in(session_id, 1).await,
        Err(QueueError::Validation(_))
    ));
    assert!(matches!(
        service.check_in(session_id, 99).await,
        Err(QueueError::PlayerNotFound(99))
    ));
    assert_eq!(counters(&service, session_id), (0, 2));
}

#[tokio::test]
async fn blank_player_name_is_rejected() {
    let service = QueueService::new(MemoryStore::new());
    assert!(matches!(
        service.register_player("   ", None, false),
        Err(QueueError::Validation(_))
    ));
}

#[tokio::test]
async fn unknown_and_ended_sessions() {
    let (service, session_id) = session_with(1, 4).await;
    let unknown = SessionId::new_v4();
    assert_eq!(
        service.populate_game(unknown).await,
        Err(QueueError::SessionNotFound(unknown))
    );

    service.end_session(session_id).await.unwrap();
    assert!(service
        .store()
        .fetch_active_queue(session_id)
        .unwrap()
        .is_empty());
    assert!(matches!(
        service.check_in(session_id, 1).await,
        Err(QueueError::InvalidState(_))
    ));
    assert!(matches!(
        service.end_session(session_id).await,
        Err(QueueError::InvalidState(_))
    ));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let service = QueueService::new(MemoryStore::new());
    assert!(matches!(
        service.start_session(SessionConfig::with_team_size(0)),
        Err(QueueError::Validation(_))
    ));
}

#[tokio::test]
async fn populate_ten_players() {
    let (service, session_id) = session_with(10, 4).await;
    let s = service.populate_game(session_id).await.unwrap();
    assert_eq!(s.state, PopulationState::Complete);
    assert_eq!(s.team_a.player_ids(), vec![1, 2, 3, 4]);
    assert_eq!(s.team_b.player_ids(), vec![5, 6, 7, 8]);
    assert_eq!(next_up_ids(&s), vec![9, 10]);

    // The layout is written back as pins.
    let queue = service.store().fetch_active_queue(session_id).unwrap();
    let pins: Vec<Option<TeamSide>> = queue.iter().map(|e| e.pinned).collect();
    assert_eq!(&pins[..4], &[Some(TeamSide::Home); 4]);
    assert_eq!(&pins[4..8], &[Some(TeamSide::Away); 4]);
    assert_eq!(&pins[8..], &[None, None]);

    // Populating again is stable.
    assert_eq!(service.populate_game(session_id).await.unwrap(), s);
}

#[tokio::test]
async fn rejected_move_writes_nothing() {
    let (service, session_id) = session_with(10, 4).await;
    service.populate_game(session_id).await.unwrap();
    let before = service.store().fetch_active_queue(session_id).unwrap();

    let result = service
        .apply_move(session_id, MoveCommand::new(10, MoveType::Bump))
        .await
        .unwrap();
    assert!(!result.success);
    assert!(result.message.is_some());
    assert_eq!(service.store().fetch_active_queue(session_id).unwrap(), before);
}

#[tokio::test]
async fn checkout_persists_across_populates() {
    let (service, session_id) = session_with(10, 4).await;
    let result = service
        .apply_move(session_id, MoveCommand::new(3, MoveType::Checkout))
        .await
        .unwrap();
    assert!(result.success);

    let s = service.populate_game(session_id).await.unwrap();
    assert_eq!(s.team_a.player_ids(), vec![1, 2, 9, 4]);
    assert_eq!(next_up_ids(&s), vec![10]);
    assert_eq!(service.store().fetch_active_queue(session_id).unwrap().len(), 9);
    assert_eq!(
        service.store().player(3).unwrap().unwrap().status,
        PlayerStatus::Benched
    );
    // Checking back in lands at the tail.
    let entry = service.check_in(session_id, 3).await.unwrap();
    assert_eq!(entry.position, 10);
}

#[tokio::test]
async fn swaps_persist() {
    let (service, session_id) = session_with(10, 4).await;
    service
        .apply_move(session_id, MoveCommand::new(2, MoveType::HorizontalSwap))
        .await
        .unwrap();
    service
        .apply_move(session_id, MoveCommand::new(8, MoveType::VerticalSwap))
        .await
        .unwrap();
    let s = service.populate_game(session_id).await.unwrap();
    assert_eq!(s.team_a.player_ids(), vec![1, 6, 3, 4]);
    assert_eq!(s.team_b.player_ids(), vec![8, 2, 7, 5]);
}

#[tokio::test]
async fn start_game_requires_complete_snapshot_and_free_court() {
    let (service, session_id) = session_with(7, 4).await;
    assert!(matches!(
        service.start_game(session_id).await,
        Err(QueueError::InsufficientPlayers(_))
    ));

    let player = service.register_player("P8", None, true).unwrap();
    service.check_in(session_id, player.id).await.unwrap();
    let game = service.start_game(session_id).await.unwrap();
    assert_eq!(game.home, vec![1, 2, 3, 4]);
    assert_eq!(game.away, vec![5, 6, 7, 8]);
    assert_eq!(game.court, "Main");
    assert_eq!(
        service.store().player(1).unwrap().unwrap().status,
        PlayerStatus::Active
    );
    assert!(matches!(
        service.start_game(session_id).await,
        Err(QueueError::InvalidState(_))
    ));
}

#[tokio::test]
async fn unknown_game_result_is_not_found() {
    let service = QueueService::new(MemoryStore::new());
    assert_eq!(
        service.resolve_promotion(42, 21, 10).await,
        Err(QueueError::GameNotFound(42))
    );
}

#[tokio::test]
async fn two_game_cycle_with_win_cap() {
    let (service, session_id) = session_with(10, 4).await;

    // Game 1: Team A wins its first game and stays on.
    let game1 = service.start_game(session_id).await.unwrap();
    let first = service.resolve_promotion(game1.id, 21, 10).await.unwrap();
    assert_eq!(first.streak, 1);
    assert_eq!(first.promoted_side, TeamSide::Home);
    assert_eq!(first.requeued_player_ids, vec![5, 6, 7, 8]);
    assert_eq!(counters(&service, session_id), (4, 18));

    let winner = service.store().player(1).unwrap().unwrap();
    assert_eq!((winner.games_played, winner.consecutive_losses), (1, 0));
    let loser = service.store().player(5).unwrap().unwrap();
    assert_eq!((loser.games_played, loser.consecutive_losses), (1, 1));

    let s = service.populate_game(session_id).await.unwrap();
    assert_eq!(s.team_a.player_ids(), vec![1, 2, 3, 4]);
    assert_eq!(s.team_b.player_ids(), vec![9, 10, 5, 6]);
    assert_eq!(next_up_ids(&s), vec![7, 8]);

    // Game 2: same roster wins again, reaches the cap, and the losers stay on instead.
    let game2 = service.start_game(session_id).await.unwrap();
    assert_eq!(game2.away, vec![9, 10, 5, 6]);
    let second = service.resolve_promotion(game2.id, 21, 18).await.unwrap();
    assert_eq!(second.winner, TeamSide::Home);
    assert_eq!(second.streak, 2);
    assert_eq!(second.promoted_side, TeamSide::Away);
    assert_eq!(second.promoted_player_ids, vec![9, 10, 5, 6]);
    assert_eq!(second.requeued_player_ids, vec![1, 2, 3, 4]);
    assert_eq!(counters(&service, session_id), (8, 26));

    let s = service.populate_game(session_id).await.unwrap();
    assert_eq!(s.team_a.player_ids(), vec![7, 8, 1, 2]);
    assert_eq!(s.team_b.player_ids(), vec![9, 10, 5, 6]);
    assert_eq!(next_up_ids(&s), vec![3, 4]);

    assert!(matches!(
        service.resolve_promotion(game2.id, 21, 18).await,
        Err(QueueError::InvalidState(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_check_ins_get_distinct_positions() {
    let service = Arc::new(QueueService::new(MemoryStore::new()));
    let session_id = service
        .start_session(SessionConfig::with_team_size(5))
        .unwrap()
        .id;
    let players: Vec<PlayerId> = (0..20)
        .map(|i| service.register_player(&format!("P{i}"), None, false).unwrap().id)
        .collect();

    let handles: Vec<_> = players
        .into_iter()
        .map(|player_id| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.check_in(session_id, player_id).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let positions: Vec<i64> = service
        .store()
        .fetch_active_queue(session_id)
        .unwrap()
        .iter()
        .map(|e| e.position)
        .collect();
    assert_eq!(positions, (0..20).collect::<Vec<_>>());
    assert_eq!(counters(&service, session_id), (0, 20));
}

#[tokio::test]
async fn snapshot_view_writes_nothing() {
    let (service, session_id) = session_with(10, 4).await;
    let before = service.store().fetch_active_queue(session_id).unwrap();

    let viewed = service.snapshot(session_id).await.unwrap();
    assert_eq!(viewed.state, PopulationState::Complete);
    assert_eq!(service.store().fetch_active_queue(session_id).unwrap(), before);
    assert!(before.iter().all(|e| e.pinned.is_none()));

    // Populating builds the same teams but also records them as pins.
    let populated = service.populate_game(session_id).await.unwrap();
    assert_eq!(populated, viewed);
    assert_ne!(service.store().fetch_active_queue(session_id).unwrap(), before);
}
