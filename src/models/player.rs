//! Player, PlayerStatus and the skill heuristic used for team balancing.

use serde::{Deserialize, Serialize};

/// Unique identifier for a player (integer on the wire).
pub type PlayerId = i64;

/// Where a player currently stands relative to the queue and the court.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerStatus {
    /// Checked in and waiting (next up).
    #[default]
    Available,
    /// Placed on a team slot of a populated snapshot.
    Assigned,
    /// On a team of a game in progress.
    Active,
    /// Not in the queue: checked out, or sat out after a game without auto-rejoin.
    Benched,
}

/// A registered player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub birth_year: Option<i32>,
    pub games_played: u32,
    pub consecutive_losses: u32,
    /// Re-queue automatically at the tail after a game that did not promote this player.
    pub auto_rejoin: bool,
    pub status: PlayerStatus,
}

impl Player {
    /// Create a new player. Counters start at zero, status is `Available`.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            birth_year: None,
            games_played: 0,
            consecutive_losses: 0,
            auto_rejoin: false,
            status: PlayerStatus::Available,
        }
    }

    pub fn with_birth_year(mut self, year: i32) -> Self {
        self.birth_year = Some(year);
        self
    }

    pub fn with_auto_rejoin(mut self, auto_rejoin: bool) -> Self {
        self.auto_rejoin = auto_rejoin;
        self
    }

    pub fn with_record(mut self, games_played: u32, consecutive_losses: u32) -> Self {
        self.games_played = games_played;
        self.consecutive_losses = consecutive_losses;
        self
    }

    /// Skill heuristic: `games_played - 0.5 * consecutive_losses`.
    pub fn skill(&self) -> f64 {
        f64::from(self.games_played) - 0.5 * f64::from(self.consecutive_losses)
    }

    /// True when the player's age in `reference_year` meets `threshold`.
    /// Players without a birth year are never OG.
    pub fn is_og(&self, reference_year: i32, threshold: u32) -> bool {
        match self.birth_year {
            Some(year) => reference_year - year >= threshold as i32,
            None => false,
        }
    }

    /// Record a win: one more game, loss streak broken.
    pub fn add_win(&mut self) {
        self.games_played += 1;
        self.consecutive_losses = 0;
    }

    /// Record a loss: one more game, loss streak extended.
    pub fn add_loss(&mut self) {
        self.games_played += 1;
        self.consecutive_losses += 1;
    }
}
