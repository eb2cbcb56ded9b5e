//! Queue service: every mutating flow is one read-modify-write cycle against the store,
//! serialized per session and committed as a single batch. Different sessions never wait
//! on each other.

use crate::logic::{self, populate_snapshot, PromotionOutcome, QueuePositionAllocator};
use crate::models::{
    GameId, GameRecord, MoveCommand, MoveResult, MoveType, Player, PlayerId, PlayerStatus,
    PopulationState, QueueError, Session, SessionConfig, SessionId, Snapshot, TeamSide,
};
use crate::store::{QueueEntry, Store, StoreWrite};
use chrono::Datelike;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per session id, created on first use.
#[derive(Debug, Default)]
struct SessionLocks {
    locks: Mutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>,
}

impl SessionLocks {
    async fn acquire(&self, id: SessionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }

    fn forget(&self, id: SessionId) {
        self.locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
    }
}

pub struct QueueService<S> {
    store: S,
    locks: SessionLocks,
}

impl<S: Store> QueueService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: SessionLocks::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open a new session with both queue counters at zero.
    pub fn start_session(&self, config: SessionConfig) -> Result<Session, QueueError> {
        config.validate()?;
        let session = Session::new(config);
        self.store.insert_session(&session)?;
        log::info!(
            "Started session {} ({}v{}, courts {:?})",
            session.id,
            session.config.team_size,
            session.config.team_size,
            session.config.courts
        );
        Ok(session)
    }

    /// Close a session and drop its queue. Its counters are never reused.
    pub async fn end_session(&self, session_id: SessionId) -> Result<(), QueueError> {
        let guard = self.locks.acquire(session_id).await;
        self.active_session(session_id)?;
        self.store.end_session(session_id)?;
        drop(guard);
        self.locks.forget(session_id);
        log::info!("Ended session {}", session_id);
        Ok(())
    }

    pub fn register_player(
        &self,
        name: &str,
        birth_year: Option<i32>,
        auto_rejoin: bool,
    ) -> Result<Player, QueueError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QueueError::Validation("player name must not be empty".into()));
        }
        Ok(self.store.insert_player(name, birth_year, auto_rejoin)?)
    }

    pub fn session(&self, session_id: SessionId) -> Result<Session, QueueError> {
        self.store
            .session(session_id)?
            .ok_or(QueueError::SessionNotFound(session_id))
    }

    pub fn game(&self, game_id: GameId) -> Result<GameRecord, QueueError> {
        self.store
            .game(game_id)?
            .ok_or(QueueError::GameNotFound(game_id))
    }

    /// Append a registered player at the tail of the session's queue.
    pub async fn check_in(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
    ) -> Result<QueueEntry, QueueError> {
        let _guard = self.locks.acquire(session_id).await;
        let session = self.active_session(session_id)?;
        let mut player = self
            .store
            .player(player_id)?
            .ok_or(QueueError::PlayerNotFound(player_id))?;
        let queue = self.store.fetch_active_queue(session_id)?;
        if queue.iter().any(|e| e.player.id == player_id) {
            return Err(QueueError::Validation(format!(
                "player {} is already checked in",
                player_id
            )));
        }

        let mut allocator = QueuePositionAllocator::from_counters(session.counters);
        let position = allocator.reserve_tail(1).start;
        player.status = PlayerStatus::Available;
        let committed = self.store.commit(vec![
            StoreWrite::UpdatePlayer(player.clone()),
            StoreWrite::AppendEntry {
                session: session_id,
                player: player_id,
                position,
                pinned: None,
            },
            StoreWrite::SaveCounters {
                session: session_id,
                counters: allocator.counters(),
            },
        ])?;
        let id = committed
            .entries
            .first()
            .copied()
            .ok_or_else(|| QueueError::InvalidState("check-in was not recorded".into()))?;
        log::info!(
            "Checked in {} ({}) at position {} in session {}",
            player.name,
            player_id,
            position,
            session_id
        );
        Ok(QueueEntry {
            id,
            session_id,
            player,
            position,
            pinned: None,
        })
    }

    /// Current teams, next-up and court, built from the queue without writing anything.
    pub async fn snapshot(&self, session_id: SessionId) -> Result<Snapshot, QueueError> {
        let _guard = self.locks.acquire(session_id).await;
        let session = self.active_session(session_id)?;
        let queue = self.store.fetch_active_queue(session_id)?;
        populate_snapshot(&queue, &session.config, current_year())
    }

    /// Build the current snapshot. A complete snapshot's layout is written back.
    pub async fn populate_game(&self, session_id: SessionId) -> Result<Snapshot, QueueError> {
        let _guard = self.locks.acquire(session_id).await;
        let session = self.active_session(session_id)?;
        let queue = self.store.fetch_active_queue(session_id)?;
        let snapshot = populate_snapshot(&queue, &session.config, current_year())?;
        if snapshot.state == PopulationState::Complete {
            let writes = layout_writes(&queue, &snapshot)?;
            if !writes.is_empty() {
                self.store.commit(writes)?;
            }
        }
        Ok(snapshot)
    }

    /// Apply a move to a freshly built snapshot. A rejected move writes nothing.
    pub async fn apply_move(
        &self,
        session_id: SessionId,
        command: MoveCommand,
    ) -> Result<MoveResult, QueueError> {
        let _guard = self.locks.acquire(session_id).await;
        let session = self.active_session(session_id)?;
        let queue = self.store.fetch_active_queue(session_id)?;
        let snapshot = populate_snapshot(&queue, &session.config, current_year())?;

        let result = logic::apply_move(&snapshot, &command);
        if !result.success {
            log::warn!(
                "Rejected {:?} for player {}: {}",
                command.move_type,
                command.player_id,
                result.message.as_deref().unwrap_or_default()
            );
            return Ok(result);
        }

        let mut writes = layout_writes(&queue, &result.snapshot)?;
        if command.move_type == MoveType::Checkout {
            if let Some(entry) = queue.iter().find(|e| e.player.id == command.player_id) {
                let mut player = entry.player.clone();
                player.status = PlayerStatus::Benched;
                writes.push(StoreWrite::UpdatePlayer(player));
            }
        }
        self.store.commit(writes)?;
        log::info!(
            "Applied {:?} for player {} in session {}",
            command.move_type,
            command.player_id,
            session_id
        );
        Ok(result)
    }

    /// Start a game on the selected court from a complete snapshot.
    pub async fn start_game(&self, session_id: SessionId) -> Result<GameRecord, QueueError> {
        let _guard = self.locks.acquire(session_id).await;
        let session = self.active_session(session_id)?;
        let queue = self.store.fetch_active_queue(session_id)?;
        let snapshot = populate_snapshot(&queue, &session.config, current_year())?;
        if snapshot.state != PopulationState::Complete {
            return Err(QueueError::InsufficientPlayers(format!(
                "need {} checked-in players, have {}",
                2 * session.config.min_players_per_team(),
                queue.len()
            )));
        }
        let court = snapshot
            .court
            .clone()
            .ok_or_else(|| QueueError::InvalidState("no court selected".into()))?;
        if let Some(game) = self.store.active_game_on_court(session_id, &court)? {
            return Err(QueueError::InvalidState(format!(
                "game {} is still in progress on {}",
                game.id, court
            )));
        }

        let mut writes = layout_writes(&queue, &snapshot)?;
        for player in snapshot.team_a.players().chain(snapshot.team_b.players()) {
            let mut player = player.clone();
            player.status = PlayerStatus::Active;
            writes.push(StoreWrite::UpdatePlayer(player));
        }
        writes.push(StoreWrite::CreateGame {
            session: session_id,
            court: court.clone(),
            home: snapshot.team_a.player_ids(),
            away: snapshot.team_b.player_ids(),
        });
        let game = self
            .store
            .commit(writes)?
            .games
            .into_iter()
            .next()
            .ok_or_else(|| QueueError::InvalidState("game was not recorded".into()))?;
        log::info!(
            "Started game {} on {} in session {}",
            game.id,
            court,
            session_id
        );
        Ok(game)
    }

    /// Record the final score of a game and promote one of its teams.
    pub async fn resolve_promotion(
        &self,
        game_id: GameId,
        team1_score: u32,
        team2_score: u32,
    ) -> Result<PromotionOutcome, QueueError> {
        let session_id = self.game(game_id)?.session_id;
        let _guard = self.locks.acquire(session_id).await;
        let session = self.active_session(session_id)?;
        // Re-read under the lock; another request may have resolved it meanwhile.
        let game = self.game(game_id)?;
        logic::resolve_promotion(&self.store, &session, &game, team1_score, team2_score)
    }

    /// Missing sessions are NotFound; ended sessions are InvalidState. Neither is defaulted.
    fn active_session(&self, session_id: SessionId) -> Result<Session, QueueError> {
        let session = self.session(session_id)?;
        if !session.active {
            return Err(QueueError::InvalidState(format!(
                "session {} has ended",
                session_id
            )));
        }
        Ok(session)
    }
}

/// Writes that put a snapshot's layout back into the queue.
///
/// The positions already held by the snapshot's players are handed out again in layout
/// order (Team A slots, Team B slots, next-up), so no new position is ever consumed.
/// Entries missing from the snapshot (checked out) are removed. A snapshot still waiting
/// for players keeps the entries' existing pins.
fn layout_writes(queue: &[QueueEntry], snapshot: &Snapshot) -> Result<Vec<StoreWrite>, QueueError> {
    let layout = layout_of(snapshot);
    let by_player: HashMap<PlayerId, &QueueEntry> =
        queue.iter().map(|e| (e.player.id, e)).collect();
    let kept: HashSet<PlayerId> = layout.iter().map(|(id, _)| *id).collect();

    let mut writes: Vec<StoreWrite> = queue
        .iter()
        .filter(|e| !kept.contains(&e.player.id))
        .map(|e| StoreWrite::RemoveEntry(e.id))
        .collect();

    let mut positions: Vec<i64> = layout
        .iter()
        .filter_map(|(id, _)| by_player.get(id).map(|e| e.position))
        .collect();
    positions.sort_unstable();

    for ((player_id, side), position) in layout.into_iter().zip(positions) {
        let entry = by_player
            .get(&player_id)
            .ok_or(QueueError::PlayerNotFound(player_id))?;
        let pinned = if snapshot.is_populated() {
            side
        } else {
            entry.pinned
        };
        if entry.position != position || entry.pinned != pinned {
            writes.push(StoreWrite::UpdateEntry {
                entry: entry.id,
                position,
                pinned,
            });
        }
    }
    Ok(writes)
}

/// Player ids in layout order with the side each one holds.
fn layout_of(snapshot: &Snapshot) -> Vec<(PlayerId, Option<TeamSide>)> {
    let team = |side: TeamSide| {
        snapshot
            .team(side)
            .players()
            .map(move |p| (p.id, Some(side)))
    };
    team(TeamSide::Home)
        .chain(team(TeamSide::Away))
        .chain(snapshot.next_up.iter().map(|p| (p.id, None)))
        .collect()
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}
