//! Game records, team identity across games, and completed-game outcomes.

use crate::models::player::PlayerId;
use crate::models::session::SessionId;
use crate::models::team::TeamSide;
use serde::{Deserialize, Serialize};

/// Unique identifier for a game. Increases with creation order.
pub type GameId = u64;

/// Identity of a team across games: its roster, sorted.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct TeamKey(Vec<PlayerId>);

impl TeamKey {
    pub fn new(ids: &[PlayerId]) -> Self {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        Self(ids)
    }

    pub fn ids(&self) -> &[PlayerId] {
        &self.0
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    InProgress,
    Completed,
}

/// Final score, team 1 being Home.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub team1: u32,
    pub team2: u32,
}

impl Score {
    /// Side with the higher score; `None` on a tie.
    pub fn winner(&self) -> Option<TeamSide> {
        match self.team1.cmp(&self.team2) {
            std::cmp::Ordering::Greater => Some(TeamSide::Home),
            std::cmp::Ordering::Less => Some(TeamSide::Away),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// A game on a court: both rosters in slot order plus the result once known.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub session_id: SessionId,
    pub court: String,
    pub home: Vec<PlayerId>,
    pub away: Vec<PlayerId>,
    pub status: GameStatus,
    pub score: Option<Score>,
}

impl GameRecord {
    pub fn roster(&self, side: TeamSide) -> &[PlayerId] {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    /// Winning side, once a decisive score is recorded.
    pub fn winner(&self) -> Option<TeamSide> {
        self.score.and_then(|s| s.winner())
    }

    /// Outcome summary for streak computation; `None` until decided.
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.winner().map(|side| GameOutcome {
            game_id: self.id,
            winning_team: TeamKey::new(self.roster(side)),
        })
    }
}

/// One completed game as seen by the streak computation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub game_id: GameId,
    pub winning_team: TeamKey,
}
