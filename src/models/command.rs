//! Move commands and their results, in the wire shape used by the API.

use crate::models::player::PlayerId;
use crate::models::snapshot::Snapshot;
use serde::{Deserialize, Serialize};

/// The four player movements.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveType {
    /// Leave the queue; a team slot is backfilled from next-up.
    Checkout,
    /// Drop one place (next-up) or off the team to the front of next-up.
    Bump,
    /// Trade places with the same slot on the other team.
    HorizontalSwap,
    /// Rotate one slot down within Team B.
    VerticalSwap,
}

/// `{ "playerId": 7, "moveType": "CHECKOUT" }`
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCommand {
    pub player_id: PlayerId,
    pub move_type: MoveType,
}

impl MoveCommand {
    pub fn new(player_id: PlayerId, move_type: MoveType) -> Self {
        Self {
            player_id,
            move_type,
        }
    }
}

/// Outcome of a move. On failure `snapshot` is the original, unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub snapshot: Snapshot,
}

impl MoveResult {
    pub fn moved(snapshot: Snapshot) -> Self {
        Self {
            success: true,
            message: None,
            snapshot,
        }
    }

    pub fn rejected(message: impl Into<String>, original: Snapshot) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            snapshot: original,
        }
    }
}
