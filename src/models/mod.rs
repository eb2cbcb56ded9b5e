//! Data structures for the pickup queue: players, teams, snapshots, sessions, games.

mod command;
mod error;
mod game;
mod player;
mod session;
mod snapshot;
mod team;

pub use command::{MoveCommand, MoveResult, MoveType};
pub use error::{ErrorKind, QueueError};
pub use game::{GameId, GameOutcome, GameRecord, GameStatus, Score, TeamKey};
pub use player::{Player, PlayerId, PlayerStatus};
pub use session::{AssignmentStrategy, QueueCounters, Session, SessionConfig, SessionId};
pub use snapshot::{PlayerLocation, PopulationState, Snapshot};
pub use team::{Team, TeamSide};
