//! Persistence collaborator: the read/write operations the queue engine needs.
//!
//! Implementations own their own synchronization; every method takes `&self`.

mod memory;

pub use memory::MemoryStore;

use crate::models::{
    GameId, GameOutcome, GameRecord, Player, PlayerId, QueueCounters, Session, SessionId, TeamSide,
};
use serde::{Deserialize, Serialize};

/// Unique identifier for a queue entry.
pub type EntryId = u64;

/// A checked-in player as read back from the queue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,
    pub session_id: SessionId,
    /// Current player record (joined from the player table).
    pub player: Player,
    pub position: i64,
    /// Set while the entry holds a slot on Team A (Home) or Team B (Away).
    pub pinned: Option<TeamSide>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    MissingPlayer(PlayerId),
    MissingSession(SessionId),
    MissingEntry(EntryId),
    MissingGame(GameId),
    /// A writer panicked while holding the store lock.
    Poisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::MissingPlayer(id) => write!(f, "no player row {}", id),
            StoreError::MissingSession(id) => write!(f, "no session row {}", id),
            StoreError::MissingEntry(id) => write!(f, "no queue entry {}", id),
            StoreError::MissingGame(id) => write!(f, "no game row {}", id),
            StoreError::Poisoned => write!(f, "lock error"),
        }
    }
}

impl std::error::Error for StoreError {}

/// One write in a `Store::commit` batch.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreWrite {
    UpdatePlayer(Player),
    SaveCounters {
        session: SessionId,
        counters: QueueCounters,
    },
    AppendEntry {
        session: SessionId,
        player: PlayerId,
        position: i64,
        pinned: Option<TeamSide>,
    },
    RemoveEntry(EntryId),
    ShiftPositions {
        session: SessionId,
        from_position: i64,
        delta: i64,
    },
    UpdateEntry {
        entry: EntryId,
        position: i64,
        pinned: Option<TeamSide>,
    },
    CreateGame {
        session: SessionId,
        court: String,
        home: Vec<PlayerId>,
        away: Vec<PlayerId>,
    },
    RecordGameResult {
        game: GameId,
        team1_score: u32,
        team2_score: u32,
    },
}

/// Rows created by a committed batch, in the order their writes appeared.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Committed {
    pub entries: Vec<EntryId>,
    pub games: Vec<GameRecord>,
}

pub trait Store: Send + Sync {
    /// Apply every write in order, or none of them. On error the store is unchanged.
    fn commit(&self, writes: Vec<StoreWrite>) -> Result<Committed, StoreError>;

    // Players

    fn insert_player(
        &self,
        name: &str,
        birth_year: Option<i32>,
        auto_rejoin: bool,
    ) -> Result<Player, StoreError>;
    fn player(&self, id: PlayerId) -> Result<Option<Player>, StoreError>;
    fn update_player(&self, player: &Player) -> Result<(), StoreError>;

    // Sessions

    fn insert_session(&self, session: &Session) -> Result<(), StoreError>;
    fn session(&self, id: SessionId) -> Result<Option<Session>, StoreError>;
    fn save_counters(&self, id: SessionId, counters: QueueCounters) -> Result<(), StoreError>;
    /// Mark the session inactive and drop its queue.
    fn end_session(&self, id: SessionId) -> Result<(), StoreError>;

    // Queue

    /// Entries of the session ordered by ascending position.
    fn fetch_active_queue(&self, session: SessionId) -> Result<Vec<QueueEntry>, StoreError>;
    fn append_to_queue(
        &self,
        session: SessionId,
        player: PlayerId,
        position: i64,
        pinned: Option<TeamSide>,
    ) -> Result<EntryId, StoreError>;
    fn remove_from_queue(&self, entry: EntryId) -> Result<(), StoreError>;
    /// Add `delta` to every position `>= from_position` in the session.
    fn shift_positions(
        &self,
        session: SessionId,
        from_position: i64,
        delta: i64,
    ) -> Result<(), StoreError>;
    fn update_entry(
        &self,
        entry: EntryId,
        position: i64,
        pinned: Option<TeamSide>,
    ) -> Result<(), StoreError>;

    // Games

    fn create_game(
        &self,
        session: SessionId,
        court: &str,
        home: &[PlayerId],
        away: &[PlayerId],
    ) -> Result<GameRecord, StoreError>;
    fn game(&self, id: GameId) -> Result<Option<GameRecord>, StoreError>;
    fn active_game_on_court(
        &self,
        session: SessionId,
        court: &str,
    ) -> Result<Option<GameRecord>, StoreError>;
    /// Completed games on `court` created before `before_game`, newest first.
    fn recent_games_on_court(
        &self,
        session: SessionId,
        court: &str,
        before_game: GameId,
    ) -> Result<Vec<GameOutcome>, StoreError>;
    fn record_game_result(
        &self,
        game: GameId,
        team1_score: u32,
        team2_score: u32,
    ) -> Result<(), StoreError>;
}
