//! QueueError and its coarse ErrorKind.

use crate::models::game::GameId;
use crate::models::player::PlayerId;
use crate::models::session::SessionId;
use crate::store::StoreError;

/// Errors that can occur during queue operations.
#[derive(Clone, Debug, PartialEq)]
pub enum QueueError {
    /// Wrong move for the player's location, bad config, or a malformed request.
    Validation(String),
    /// Not enough checked-in players to populate or to backfill a slot.
    InsufficientPlayers(String),
    /// Player is not in the snapshot (or not registered).
    PlayerNotFound(PlayerId),
    SessionNotFound(SessionId),
    GameNotFound(GameId),
    /// Operation not allowed in the current state (population validation, inactive session, ...).
    InvalidState(String),
    Store(StoreError),
}

/// Coarse classification used for HTTP status mapping.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Validation,
    InsufficientPlayers,
    NotFound,
    InvalidState,
    Store,
}

impl QueueError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueueError::Validation(_) => ErrorKind::Validation,
            QueueError::InsufficientPlayers(_) => ErrorKind::InsufficientPlayers,
            QueueError::PlayerNotFound(_)
            | QueueError::SessionNotFound(_)
            | QueueError::GameNotFound(_) => ErrorKind::NotFound,
            QueueError::InvalidState(_) => ErrorKind::InvalidState,
            QueueError::Store(_) => ErrorKind::Store,
        }
    }
}

impl std::fmt::Display for QueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueError::Validation(msg) => write!(f, "{}", msg),
            QueueError::InsufficientPlayers(msg) => write!(f, "{}", msg),
            QueueError::PlayerNotFound(id) => write!(f, "Player {} not found", id),
            QueueError::SessionNotFound(id) => write!(f, "Session {} not found", id),
            QueueError::GameNotFound(id) => write!(f, "Game {} not found", id),
            QueueError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            QueueError::Store(e) => write!(f, "Store error: {}", e),
        }
    }
}

impl std::error::Error for QueueError {}

impl From<StoreError> for QueueError {
    fn from(e: StoreError) -> Self {
        QueueError::Store(e)
    }
}
