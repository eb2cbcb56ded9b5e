//! Post-game promotion: which team stays on, who rejoins the tail, who sits.
//!
//! `consecutive_wins` and `plan_promotion` are pure; `resolve_promotion` applies a plan
//! to the store and moves the session's counters.

use crate::logic::queue_position::QueuePositionAllocator;
use crate::models::{
    GameId, GameOutcome, GameRecord, GameStatus, Player, PlayerId, PlayerStatus, QueueError,
    Score, Session, TeamKey, TeamSide,
};
use crate::store::{QueueEntry, Store, StoreWrite};
use serde::Serialize;

/// Result of resolving a finished game.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionOutcome {
    pub game_id: GameId,
    pub winner: TeamSide,
    /// Consecutive wins of the winning team on this court, this game included.
    pub streak: u32,
    #[serde(rename = "promotedTeamId")]
    pub promoted_side: TeamSide,
    pub promoted_player_ids: Vec<PlayerId>,
    #[serde(rename = "reQueuedPlayerIds")]
    pub requeued_player_ids: Vec<PlayerId>,
    pub benched_player_ids: Vec<PlayerId>,
}

/// Who goes where once a game is decided. Players carry their updated records.
#[derive(Clone, Debug, PartialEq)]
pub struct PromotionPlan {
    pub winner: TeamSide,
    pub streak: u32,
    pub promoted_side: TeamSide,
    /// Promoted players in slot order.
    pub promoted: Vec<Player>,
    /// Non-promoted players with auto-rejoin, in slot order.
    pub requeued: Vec<Player>,
    pub benched: Vec<Player>,
}

impl PromotionPlan {
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.promoted
            .iter()
            .chain(self.requeued.iter())
            .chain(self.benched.iter())
    }
}

/// Streak of `winner`, counting the game just finished.
///
/// `history` holds earlier completed games on the same court, newest first.
pub fn consecutive_wins(winner: &TeamKey, history: &[GameOutcome]) -> u32 {
    1 + history
        .iter()
        .take_while(|g| &g.winning_team == winner)
        .count() as u32
}

/// Winners stay on until their streak reaches the cap; then the losers stay on instead.
pub fn promoted_side(winner: TeamSide, streak: u32, max_consecutive_team_wins: u32) -> TeamSide {
    if streak < max_consecutive_team_wins {
        winner
    } else {
        winner.opposite()
    }
}

/// Decide the promotion for `game` given both lineups (slot order) and the court history.
///
/// Records the win or loss on every player and sets their next status.
pub fn plan_promotion(
    game: &GameRecord,
    winner: TeamSide,
    home: Vec<Player>,
    away: Vec<Player>,
    history: &[GameOutcome],
    max_consecutive_team_wins: u32,
) -> PromotionPlan {
    let streak = consecutive_wins(&TeamKey::new(game.roster(winner)), history);
    let promoted_side = promoted_side(winner, streak, max_consecutive_team_wins);

    let (mut home, mut away) = (home, away);
    let (winners, losers) = match winner {
        TeamSide::Home => (&mut home, &mut away),
        TeamSide::Away => (&mut away, &mut home),
    };
    winners.iter_mut().for_each(Player::add_win);
    losers.iter_mut().for_each(Player::add_loss);

    let (mut promoted, others) = match promoted_side {
        TeamSide::Home => (home, away),
        TeamSide::Away => (away, home),
    };
    for p in &mut promoted {
        p.status = PlayerStatus::Assigned;
    }
    let (mut requeued, mut benched): (Vec<Player>, Vec<Player>) =
        others.into_iter().partition(|p| p.auto_rejoin);
    for p in &mut requeued {
        p.status = PlayerStatus::Available;
    }
    for p in &mut benched {
        p.status = PlayerStatus::Benched;
    }

    PromotionPlan {
        winner,
        streak,
        promoted_side,
        promoted,
        requeued,
        benched,
    }
}

/// Record the score of `game`, promote one team back to the head of the queue and
/// append auto-rejoiners at the tail.
///
/// The lineups are the entries pinned to each side at the final whistle, so mid-game
/// substitutions count. Every write goes to the store as one batch: a failed commit, a
/// resolved game or a tie leaves the store untouched.
pub fn resolve_promotion<S: Store + ?Sized>(
    store: &S,
    session: &Session,
    game: &GameRecord,
    team1_score: u32,
    team2_score: u32,
) -> Result<PromotionOutcome, QueueError> {
    if game.status == GameStatus::Completed {
        return Err(QueueError::InvalidState(format!(
            "game {} already has a result",
            game.id
        )));
    }
    let score = Score {
        team1: team1_score,
        team2: team2_score,
    };
    let winner = score
        .winner()
        .ok_or_else(|| QueueError::Validation("a game cannot end in a tie".into()))?;

    let queue = store.fetch_active_queue(session.id)?;
    let home_entries = pinned_to(&queue, TeamSide::Home);
    let away_entries = pinned_to(&queue, TeamSide::Away);

    let history = store.recent_games_on_court(session.id, &game.court, game.id)?;
    let plan = plan_promotion(
        game,
        winner,
        players_of(&home_entries),
        players_of(&away_entries),
        &history,
        session.config.max_consecutive_team_wins,
    );

    let team_size = session.config.team_size;
    let mut allocator = QueuePositionAllocator::from_counters(session.counters);
    let head = allocator.head();
    let block = allocator.reserve_at_head(team_size);

    let mut writes: Vec<StoreWrite> = plan
        .players()
        .cloned()
        .map(StoreWrite::UpdatePlayer)
        .collect();
    writes.extend(
        home_entries
            .iter()
            .chain(away_entries.iter())
            .map(|e| StoreWrite::RemoveEntry(e.id)),
    );
    writes.push(StoreWrite::ShiftPositions {
        session: session.id,
        from_position: head,
        delta: team_size as i64,
    });
    writes.extend(
        plan.promoted
            .iter()
            .zip(block)
            .map(|(player, position)| StoreWrite::AppendEntry {
                session: session.id,
                player: player.id,
                position,
                pinned: Some(plan.promoted_side),
            }),
    );
    allocator.advance_head(team_size);
    let tail = allocator.reserve_tail(plan.requeued.len());
    writes.extend(
        plan.requeued
            .iter()
            .zip(tail)
            .map(|(player, position)| StoreWrite::AppendEntry {
                session: session.id,
                player: player.id,
                position,
                pinned: None,
            }),
    );
    writes.push(StoreWrite::SaveCounters {
        session: session.id,
        counters: allocator.counters(),
    });
    writes.push(StoreWrite::RecordGameResult {
        game: game.id,
        team1_score,
        team2_score,
    });
    store.commit(writes)?;

    log::info!(
        "Game {} on {}: {:?} won (streak {}), {:?} stays on, {} re-queued, {} benched",
        game.id,
        game.court,
        plan.winner,
        plan.streak,
        plan.promoted_side,
        plan.requeued.len(),
        plan.benched.len()
    );

    let ids = |players: &[Player]| players.iter().map(|p| p.id).collect::<Vec<_>>();
    Ok(PromotionOutcome {
        game_id: game.id,
        winner: plan.winner,
        streak: plan.streak,
        promoted_side: plan.promoted_side,
        promoted_player_ids: ids(&plan.promoted),
        requeued_player_ids: ids(&plan.requeued),
        benched_player_ids: ids(&plan.benched),
    })
}

/// Entries holding a slot on `side`, in slot order.
fn pinned_to(queue: &[QueueEntry], side: TeamSide) -> Vec<&QueueEntry> {
    queue.iter().filter(|e| e.pinned == Some(side)).collect()
}

fn players_of(entries: &[&QueueEntry]) -> Vec<Player> {
    entries.iter().map(|e| e.player.clone()).collect()
}
