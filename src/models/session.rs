//! Session, SessionConfig and the persisted queue counters.

use crate::models::error::QueueError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a session.
pub type SessionId = Uuid;

/// How unpinned players are dealt onto the open team slots.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    /// First `team_size` in queue order to Team A, the next `team_size` to Team B.
    #[default]
    QueueOrder,
    /// Sort the candidates by skill and deal them alternately.
    SkillBalanced,
}

/// Configuration of one session. Every field has a default so an empty JSON body is valid.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_team_size")]
    pub team_size: usize,
    /// Smallest team a game may start with; `None` means `team_size`.
    #[serde(default)]
    pub min_players_per_team: Option<usize>,
    #[serde(default = "default_max_consecutive_team_wins")]
    pub max_consecutive_team_wins: u32,
    /// Court preference list; the first entry is used.
    #[serde(default = "default_courts")]
    pub courts: Vec<String>,
    #[serde(default = "default_og_age_threshold")]
    pub og_age_threshold: u32,
    #[serde(default)]
    pub assignment: AssignmentStrategy,
}

fn default_team_size() -> usize {
    5
}

fn default_max_consecutive_team_wins() -> u32 {
    2
}

fn default_courts() -> Vec<String> {
    vec!["Main".to_string()]
}

fn default_og_age_threshold() -> u32 {
    40
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            team_size: default_team_size(),
            min_players_per_team: None,
            max_consecutive_team_wins: default_max_consecutive_team_wins(),
            courts: default_courts(),
            og_age_threshold: default_og_age_threshold(),
            assignment: AssignmentStrategy::default(),
        }
    }
}

impl SessionConfig {
    /// Default config with the given team size.
    pub fn with_team_size(team_size: usize) -> Self {
        Self {
            team_size,
            ..Self::default()
        }
    }

    pub fn min_players_per_team(&self) -> usize {
        self.min_players_per_team.unwrap_or(self.team_size)
    }

    pub fn validate(&self) -> Result<(), QueueError> {
        if self.team_size == 0 {
            return Err(QueueError::Validation("team size must be at least 1".into()));
        }
        let min = self.min_players_per_team();
        if min == 0 || min > self.team_size {
            return Err(QueueError::Validation(format!(
                "minimum players per team must be between 1 and {}",
                self.team_size
            )));
        }
        if self.max_consecutive_team_wins == 0 {
            return Err(QueueError::Validation(
                "max consecutive team wins must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Head and tail counters of a session, as persisted by the store.
///
/// Opaque outside `QueuePositionAllocator`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct QueueCounters {
    pub(crate) head: i64,
    pub(crate) tail: i64,
}

/// One continuous run of the queue: its config, counters and whether it is still open.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub config: SessionConfig,
    pub counters: QueueCounters,
    pub active: bool,
}

impl Session {
    /// A new active session with both counters at zero.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            counters: QueueCounters::default(),
            active: true,
        }
    }
}
