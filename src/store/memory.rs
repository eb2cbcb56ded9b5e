//! In-memory store: plain maps behind one `RwLock`.

use super::{Committed, EntryId, QueueEntry, Store, StoreError, StoreWrite};
use crate::models::{
    GameId, GameOutcome, GameRecord, GameStatus, Player, PlayerId, QueueCounters, Score, Session,
    SessionId, TeamSide,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Debug)]
struct EntryRow {
    session_id: SessionId,
    player_id: PlayerId,
    position: i64,
    pinned: Option<TeamSide>,
}

#[derive(Clone, Debug, Default)]
struct Inner {
    players: BTreeMap<PlayerId, Player>,
    last_player_id: PlayerId,
    sessions: HashMap<SessionId, Session>,
    entries: BTreeMap<EntryId, EntryRow>,
    last_entry_id: EntryId,
    games: BTreeMap<GameId, GameRecord>,
    last_game_id: GameId,
}

impl Inner {
    fn update_player(&mut self, player: &Player) -> Result<(), StoreError> {
        let row = self
            .players
            .get_mut(&player.id)
            .ok_or(StoreError::MissingPlayer(player.id))?;
        *row = player.clone();
        Ok(())
    }

    fn session_mut(&mut self, id: SessionId) -> Result<&mut Session, StoreError> {
        self.sessions
            .get_mut(&id)
            .ok_or(StoreError::MissingSession(id))
    }

    fn append_entry(
        &mut self,
        session: SessionId,
        player: PlayerId,
        position: i64,
        pinned: Option<TeamSide>,
    ) -> Result<EntryId, StoreError> {
        if !self.sessions.contains_key(&session) {
            return Err(StoreError::MissingSession(session));
        }
        if !self.players.contains_key(&player) {
            return Err(StoreError::MissingPlayer(player));
        }
        self.last_entry_id += 1;
        let id = self.last_entry_id;
        self.entries.insert(
            id,
            EntryRow {
                session_id: session,
                player_id: player,
                position,
                pinned,
            },
        );
        Ok(id)
    }

    fn remove_entry(&mut self, entry: EntryId) -> Result<(), StoreError> {
        self.entries
            .remove(&entry)
            .map(|_| ())
            .ok_or(StoreError::MissingEntry(entry))
    }

    fn shift_positions(&mut self, session: SessionId, from_position: i64, delta: i64) {
        for row in self.entries.values_mut() {
            if row.session_id == session && row.position >= from_position {
                row.position += delta;
            }
        }
    }

    fn update_entry(
        &mut self,
        entry: EntryId,
        position: i64,
        pinned: Option<TeamSide>,
    ) -> Result<(), StoreError> {
        let row = self
            .entries
            .get_mut(&entry)
            .ok_or(StoreError::MissingEntry(entry))?;
        row.position = position;
        row.pinned = pinned;
        Ok(())
    }

    fn create_game(
        &mut self,
        session: SessionId,
        court: &str,
        home: &[PlayerId],
        away: &[PlayerId],
    ) -> Result<GameRecord, StoreError> {
        if !self.sessions.contains_key(&session) {
            return Err(StoreError::MissingSession(session));
        }
        self.last_game_id += 1;
        let game = GameRecord {
            id: self.last_game_id,
            session_id: session,
            court: court.to_string(),
            home: home.to_vec(),
            away: away.to_vec(),
            status: GameStatus::InProgress,
            score: None,
        };
        self.games.insert(game.id, game.clone());
        Ok(game)
    }

    fn record_game_result(
        &mut self,
        game: GameId,
        team1_score: u32,
        team2_score: u32,
    ) -> Result<(), StoreError> {
        let row = self
            .games
            .get_mut(&game)
            .ok_or(StoreError::MissingGame(game))?;
        row.score = Some(Score {
            team1: team1_score,
            team2: team2_score,
        });
        row.status = GameStatus::Completed;
        Ok(())
    }

    fn apply(&mut self, write: StoreWrite, committed: &mut Committed) -> Result<(), StoreError> {
        match write {
            StoreWrite::UpdatePlayer(player) => self.update_player(&player)?,
            StoreWrite::SaveCounters { session, counters } => {
                self.session_mut(session)?.counters = counters;
            }
            StoreWrite::AppendEntry {
                session,
                player,
                position,
                pinned,
            } => {
                let id = self.append_entry(session, player, position, pinned)?;
                committed.entries.push(id);
            }
            StoreWrite::RemoveEntry(entry) => self.remove_entry(entry)?,
            StoreWrite::ShiftPositions {
                session,
                from_position,
                delta,
            } => self.shift_positions(session, from_position, delta),
            StoreWrite::UpdateEntry {
                entry,
                position,
                pinned,
            } => self.update_entry(entry, position, pinned)?,
            StoreWrite::CreateGame {
                session,
                court,
                home,
                away,
            } => {
                let game = self.create_game(session, &court, &home, &away)?;
                committed.games.push(game);
            }
            StoreWrite::RecordGameResult {
                game,
                team1_score,
                team2_score,
            } => self.record_game_result(game, team1_score, team2_score)?,
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Store for MemoryStore {
    fn commit(&self, writes: Vec<StoreWrite>) -> Result<Committed, StoreError> {
        let mut g = self.write()?;
        // Stage on a copy; the live maps are only replaced once every write succeeded.
        let mut staged = g.clone();
        let mut committed = Committed::default();
        for write in writes {
            staged.apply(write, &mut committed)?;
        }
        *g = staged;
        Ok(committed)
    }

    fn insert_player(
        &self,
        name: &str,
        birth_year: Option<i32>,
        auto_rejoin: bool,
    ) -> Result<Player, StoreError> {
        let mut g = self.write()?;
        g.last_player_id += 1;
        let mut player = Player::new(g.last_player_id, name).with_auto_rejoin(auto_rejoin);
        player.birth_year = birth_year;
        g.players.insert(player.id, player.clone());
        Ok(player)
    }

    fn player(&self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        Ok(self.read()?.players.get(&id).cloned())
    }

    fn update_player(&self, player: &Player) -> Result<(), StoreError> {
        self.write()?.update_player(player)
    }

    fn insert_session(&self, session: &Session) -> Result<(), StoreError> {
        self.write()?.sessions.insert(session.id, session.clone());
        Ok(())
    }

    fn session(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        Ok(self.read()?.sessions.get(&id).cloned())
    }

    fn save_counters(&self, id: SessionId, counters: QueueCounters) -> Result<(), StoreError> {
        self.write()?.session_mut(id)?.counters = counters;
        Ok(())
    }

    fn end_session(&self, id: SessionId) -> Result<(), StoreError> {
        let mut g = self.write()?;
        g.session_mut(id)?.active = false;
        g.entries.retain(|_, row| row.session_id != id);
        Ok(())
    }

    fn fetch_active_queue(&self, session: SessionId) -> Result<Vec<QueueEntry>, StoreError> {
        let g = self.read()?;
        let mut queue = Vec::new();
        for (&id, row) in g.entries.iter().filter(|(_, r)| r.session_id == session) {
            let player = g
                .players
                .get(&row.player_id)
                .cloned()
                .ok_or(StoreError::MissingPlayer(row.player_id))?;
            queue.push(QueueEntry {
                id,
                session_id: row.session_id,
                player,
                position: row.position,
                pinned: row.pinned,
            });
        }
        queue.sort_by_key(|e| (e.position, e.id));
        Ok(queue)
    }

    fn append_to_queue(
        &self,
        session: SessionId,
        player: PlayerId,
        position: i64,
        pinned: Option<TeamSide>,
    ) -> Result<EntryId, StoreError> {
        self.write()?.append_entry(session, player, position, pinned)
    }

    fn remove_from_queue(&self, entry: EntryId) -> Result<(), StoreError> {
        self.write()?.remove_entry(entry)
    }

    fn shift_positions(
        &self,
        session: SessionId,
        from_position: i64,
        delta: i64,
    ) -> Result<(), StoreError> {
        self.write()?.shift_positions(session, from_position, delta);
        Ok(())
    }

    fn update_entry(
        &self,
        entry: EntryId,
        position: i64,
        pinned: Option<TeamSide>,
    ) -> Result<(), StoreError> {
        self.write()?.update_entry(entry, position, pinned)
    }

    fn create_game(
        &self,
        session: SessionId,
        court: &str,
        home: &[PlayerId],
        away: &[PlayerId],
    ) -> Result<GameRecord, StoreError> {
        self.write()?.create_game(session, court, home, away)
    }

    fn game(&self, id: GameId) -> Result<Option<GameRecord>, StoreError> {
        Ok(self.read()?.games.get(&id).cloned())
    }

    fn active_game_on_court(
        &self,
        session: SessionId,
        court: &str,
    ) -> Result<Option<GameRecord>, StoreError> {
        Ok(self
            .read()?
            .games
            .values()
            .find(|game| {
                game.session_id == session
                    && game.court == court
                    && game.status == GameStatus::InProgress
            })
            .cloned())
    }

    fn recent_games_on_court(
        &self,
        session: SessionId,
        court: &str,
        before_game: GameId,
    ) -> Result<Vec<GameOutcome>, StoreError> {
        Ok(self
            .read()?
            .games
            .range(..before_game)
            .rev()
            .map(|(_, game)| game)
            .filter(|game| {
                game.session_id == session
                    && game.court == court
                    && game.status == GameStatus::Completed
            })
            .filter_map(GameRecord::outcome)
            .collect())
    }

    fn record_game_result(
        &self,
        game: GameId,
        team1_score: u32,
        team2_score: u32,
    ) -> Result<(), StoreError> {
        self.write()?.record_game_result(game, team1_score, team2_score)
    }
}
