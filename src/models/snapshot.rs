//! Snapshot: the working unit the engine operates on, and its population state.

use crate::models::player::{Player, PlayerId};
use crate::models::team::{Team, TeamSide};
use serde::{Deserialize, Serialize};

/// Progress of a snapshot from collecting players to a game that is ready to create.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PopulationState {
    /// Not enough checked-in players yet.
    #[default]
    WaitingForPlayers,
    /// Enough players; teams are about to be dealt.
    TeamAssignment,
    /// Teams dealt; a court is about to be picked.
    CourtSelection,
    /// Teams and court chosen; final validation pending.
    GameCreation,
    /// Validated and ready to start.
    Complete,
}

/// Where a player sits in a snapshot. Produced once by `Snapshot::locate`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlayerLocation {
    TeamA(usize),
    TeamB(usize),
    NextUp(usize),
}

/// Team A, Team B and the next-up list, rebuilt from the queue on every cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub team_a: Team,
    pub team_b: Team,
    /// Checked-in players not on a team, in queue order.
    pub next_up: Vec<Player>,
    pub court: Option<String>,
    pub state: PopulationState,
    pub team_size: usize,
    /// Year used for OG counts, captured when the snapshot was built.
    pub reference_year: i32,
    pub og_age_threshold: u32,
}

impl Snapshot {
    /// Empty snapshot waiting for players.
    pub fn empty(team_size: usize, reference_year: i32, og_age_threshold: u32) -> Self {
        Self {
            team_a: Team::empty(team_size),
            team_b: Team::empty(team_size),
            next_up: Vec::new(),
            court: None,
            state: PopulationState::WaitingForPlayers,
            team_size,
            reference_year,
            og_age_threshold,
        }
    }

    pub fn is_populated(&self) -> bool {
        self.state != PopulationState::WaitingForPlayers
    }

    pub fn team(&self, side: TeamSide) -> &Team {
        match side {
            TeamSide::Home => &self.team_a,
            TeamSide::Away => &self.team_b,
        }
    }

    pub fn team_mut(&mut self, side: TeamSide) -> &mut Team {
        match side {
            TeamSide::Home => &mut self.team_a,
            TeamSide::Away => &mut self.team_b,
        }
    }

    /// Classify `player_id` as a Team A slot, Team B slot or next-up index.
    pub fn locate(&self, player_id: PlayerId) -> Option<PlayerLocation> {
        if let Some(slot) = self.team_a.slot_of(player_id) {
            return Some(PlayerLocation::TeamA(slot));
        }
        if let Some(slot) = self.team_b.slot_of(player_id) {
            return Some(PlayerLocation::TeamB(slot));
        }
        self.next_up
            .iter()
            .position(|p| p.id == player_id)
            .map(PlayerLocation::NextUp)
    }

    /// Every player id in layout order: Team A slots, Team B slots, then next-up.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.team_a
            .players()
            .chain(self.team_b.players())
            .chain(self.next_up.iter())
            .map(|p| p.id)
            .collect()
    }

    /// Recompute aggregates for one team using this snapshot's OG settings.
    pub fn recompute(&mut self, side: TeamSide) {
        let (year, threshold) = (self.reference_year, self.og_age_threshold);
        self.team_mut(side).recompute(year, threshold);
    }
}
