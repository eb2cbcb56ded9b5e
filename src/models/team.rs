//! Team (fixed-length slot array with aggregates) and TeamSide.

use crate::models::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};

/// Which half of the court a team occupies. Home is Team A, Away is Team B.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    #[default]
    Home,
    Away,
}

impl TeamSide {
    pub fn opposite(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }
}

/// A team: `team_size` ordered slots plus aggregates derived from the occupants.
///
/// Slots are only empty in a short-handed game; trailing slots are left open first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub slots: Vec<Option<Player>>,
    pub average_skill: f64,
    pub total_games_played: u32,
    /// Players at or above the configured age threshold.
    pub og_count: usize,
}

impl Team {
    /// An empty team with `team_size` open slots.
    pub fn empty(team_size: usize) -> Self {
        Self {
            slots: vec![None; team_size],
            average_skill: 0.0,
            total_games_played: 0,
            og_count: 0,
        }
    }

    /// Build a team from players in slot order, padding with open slots up to `team_size`.
    pub fn from_players(
        players: Vec<Player>,
        team_size: usize,
        reference_year: i32,
        og_age_threshold: u32,
    ) -> Self {
        let mut team = Self::empty(team_size);
        for (slot, player) in team.slots.iter_mut().zip(players) {
            *slot = Some(player);
        }
        team.recompute(reference_year, og_age_threshold);
        team
    }

    /// Occupants in slot order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.slots.iter().flatten()
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players().map(|p| p.id).collect()
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Slot index holding `player_id`, if any.
    pub fn slot_of(&self, player_id: PlayerId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|p| p.id == player_id))
    }

    /// Refresh average skill, total games played and OG count.
    pub fn recompute(&mut self, reference_year: i32, og_age_threshold: u32) {
        let filled = self.filled();
        self.total_games_played = self.players().map(|p| p.games_played).sum();
        self.og_count = self
            .players()
            .filter(|p| p.is_og(reference_year, og_age_threshold))
            .count();
        self.average_skill = if filled == 0 {
            0.0
        } else {
            self.players().map(Player::skill).sum::<f64>() / filled as f64
        };
    }
}
