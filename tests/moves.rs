//! Integration tests for player moves: checkout, bump, horizontal and vertical swaps.

use pickup_queue_web::{
    apply_move, populate_snapshot, try_move, MoveCommand, MoveType, Player, PlayerLocation,
    QueueEntry, QueueError, SessionConfig, SessionId, Snapshot,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn snapshot_with(n: i64, team_size: usize) -> Snapshot {
    let queue: Vec<QueueEntry> = (1..=n)
        .map(|i| QueueEntry {
            id: i as u64,
            session_id: SessionId::nil(),
            player: Player::new(i, format!("P{i}")),
            position: i,
            pinned: None,
        })
        .collect();
    populate_snapshot(&queue, &SessionConfig::with_team_size(team_size), 2026).unwrap()
}

fn next_up_ids(s: &Snapshot) -> Vec<i64> {
    s.next_up.iter().map(|p| p.id).collect()
}

fn sorted_ids(s: &Snapshot) -> Vec<i64> {
    let mut ids = s.player_ids();
    ids.sort_unstable();
    ids
}

fn cmd(player_id: i64, move_type: MoveType) -> MoveCommand {
    MoveCommand::new(player_id, move_type)
}

#[test]
fn locate_classifies_every_container() {
    let s = snapshot_with(10, 4);
    assert_eq!(s.locate(3), Some(PlayerLocation::TeamA(2)));
    assert_eq!(s.locate(5), Some(PlayerLocation::TeamB(0)));
    assert_eq!(s.locate(10), Some(PlayerLocation::NextUp(1)));
    assert_eq!(s.locate(99), None);
}

#[test]
fn checkout_next_up_removes_only_that_entry() {
    let s = snapshot_with(10, 4);
    let result = apply_move(&s, &cmd(9, MoveType::Checkout));
    assert!(result.success);
    assert_eq!(next_up_ids(&result.snapshot), vec![10]);
    assert_eq!(result.snapshot.team_a, s.team_a);
    assert_eq!(result.snapshot.team_b, s.team_b);
}

#[test]
fn checkout_team_player_backfills_same_slot() {
    let s = snapshot_with(10, 4);
    let result = apply_move(&s, &cmd(3, MoveType::Checkout));
    assert!(result.success);
    assert_eq!(result.snapshot.team_a.player_ids(), vec![1, 2, 9, 4]);
    assert_eq!(next_up_ids(&result.snapshot), vec![10]);
    assert_eq!(result.snapshot.locate(3), None);
}

#[test]
fn checkout_team_player_without_replacement_is_rejected() {
    let s = snapshot_with(8, 4);
    let result = apply_move(&s, &cmd(6, MoveType::Checkout));
    assert!(!result.success);
    assert_eq!(
        result.message.as_deref(),
        Some("no available players for replacement")
    );
    assert_eq!(result.snapshot, s);
}

#[test]
fn bump_team_player_with_empty_next_up_is_rejected_unchanged() {
    let s = snapshot_with(8, 4);
    let result = apply_move(&s, &cmd(1, MoveType::Bump));
    assert!(!result.success);
    assert_eq!(result.snapshot, s);
    assert!(matches!(
        try_move(&s, &cmd(1, MoveType::Bump)),
        Err(QueueError::InsufficientPlayers(_))
    ));
}

#[test]
fn bump_team_player_goes_to_front_of_next_up() {
    let s = snapshot_with(10, 4);
    let result = apply_move(&s, &cmd(1, MoveType::Bump));
    assert!(result.success);
    assert_eq!(result.snapshot.team_a.player_ids(), vec![9, 2, 3, 4]);
    assert_eq!(next_up_ids(&result.snapshot), vec![1, 10]);
    assert_eq!(sorted_ids(&result.snapshot), sorted_ids(&s));
}

#[test]
fn bump_next_up_swaps_with_player_below() {
    let s = snapshot_with(11, 4);
    let result = apply_move(&s, &cmd(9, MoveType::Bump));
    assert!(result.success);
    assert_eq!(next_up_ids(&result.snapshot), vec![10, 9, 11]);

    let last = apply_move(&s, &cmd(11, MoveType::Bump));
    assert!(!last.success);
    assert_eq!(last.message.as_deref(), Some("no player below to bump with"));
    assert_eq!(last.snapshot, s);
}

#[test]
fn horizontal_swap_rejects_next_up_players() {
    let s = snapshot_with(10, 4);
    assert!(matches!(
        try_move(&s, &cmd(9, MoveType::HorizontalSwap)),
        Err(QueueError::Validation(_))
    ));
}

#[test]
fn horizontal_swap_is_self_inverse() {
    let s = snapshot_with(10, 4);
    let once = try_move(&s, &cmd(2, MoveType::HorizontalSwap)).unwrap();
    assert_eq!(once.team_a.player_ids(), vec![1, 6, 3, 4]);
    assert_eq!(once.team_b.player_ids(), vec![5, 2, 7, 8]);
    // Player 2 now sits in Team B slot 1; swapping it again restores the teams.
    let twice = try_move(&once, &cmd(2, MoveType::HorizontalSwap)).unwrap();
    assert_eq!(twice, s);
}

#[test]
fn vertical_swap_only_for_team_b() {
    let s = snapshot_with(10, 4);
    for id in [1, 9] {
        assert!(matches!(
            try_move(&s, &cmd(id, MoveType::VerticalSwap)),
            Err(QueueError::Validation(_))
        ));
    }
}

#[test]
fn vertical_swap_wraps_last_slot_to_first() {
    let s = snapshot_with(10, 4);
    let moved = try_move(&s, &cmd(8, MoveType::VerticalSwap)).unwrap();
    assert_eq!(moved.team_b.player_ids(), vec![8, 6, 7, 5]);
}

#[test]
fn vertical_swap_cycles_back_after_team_size_moves() {
    let s = snapshot_with(10, 4);
    let mut current = s.clone();
    for _ in 0..4 {
        current = try_move(&current, &cmd(6, MoveType::VerticalSwap)).unwrap();
    }
    assert_eq!(current.team_b.player_ids(), s.team_b.player_ids());
}

#[test]
fn unknown_player_is_not_found() {
    let s = snapshot_with(10, 4);
    assert_eq!(
        try_move(&s, &cmd(42, MoveType::Checkout)),
        Err(QueueError::PlayerNotFound(42))
    );
    let result = apply_move(&s, &cmd(42, MoveType::Checkout));
    assert!(!result.success);
    assert_eq!(result.snapshot, s);
}

#[test]
fn og_count_follows_backfill() {
    let queue: Vec<QueueEntry> = (1..=5)
        .map(|i| {
            let mut player = Player::new(i, format!("P{i}"));
            if i == 1 {
                player = player.with_birth_year(1970);
            }
            QueueEntry {
                id: i as u64,
                session_id: SessionId::nil(),
                player,
                position: i,
                pinned: None,
            }
        })
        .collect();
    let s = populate_snapshot(&queue, &SessionConfig::with_team_size(2), 2026).unwrap();
    assert_eq!(s.team_a.og_count, 1);
    let moved = try_move(&s, &cmd(1, MoveType::Checkout)).unwrap();
    assert_eq!(moved.team_a.og_count, 0);
}

#[test]
fn wire_shape_of_move_command() {
    let command: MoveCommand =
        serde_json::from_str(r#"{ "playerId": 7, "moveType": "HORIZONTAL_SWAP" }"#).unwrap();
    assert_eq!(command, cmd(7, MoveType::HorizontalSwap));
}

/// Random move sequences: every player stays in exactly one container, teams stay full
/// while anyone is next up, and only CHECKOUT removes a player (exactly that one).
#[test]
fn random_moves_conserve_players() {
    let mut rng = StdRng::seed_from_u64(7);
    let moves = [
        MoveType::Checkout,
        MoveType::Bump,
        MoveType::HorizontalSwap,
        MoveType::VerticalSwap,
    ];
    for _ in 0..50 {
        let mut s = snapshot_with(rng.gen_range(10..16), 4);
        for _ in 0..30 {
            let ids = s.player_ids();
            let player_id = ids[rng.gen_range(0..ids.len())];
            let move_type = moves[rng.gen_range(0..moves.len())];
            let before = s.clone();
            let result = apply_move(&s, &cmd(player_id, move_type));
            if !result.success {
                assert_eq!(result.snapshot, before);
                continue;
            }
            let mut expected = sorted_ids(&before);
            if move_type == MoveType::Checkout {
                expected.retain(|&id| id != player_id);
            }
            assert_eq!(sorted_ids(&result.snapshot), expected);
            let mut unique = sorted_ids(&result.snapshot);
            unique.dedup();
            assert_eq!(unique.len(), result.snapshot.player_ids().len());
            assert_eq!(result.snapshot.team_a.filled(), 4);
            assert_eq!(result.snapshot.team_b.filled(), 4);
            s = result.snapshot;
        }
    }
}
