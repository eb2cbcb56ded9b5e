//! Game population: queue snapshot + config → Team A, Team B, next-up and a court.
//!
//! The progression is WaitingForPlayers → TeamAssignment → CourtSelection → GameCreation →
//! Complete. `advance_population` performs one transition; `populate_snapshot` runs them all.

use crate::models::{
    AssignmentStrategy, Player, PlayerStatus, PopulationState, QueueError, SessionConfig,
    Snapshot, Team, TeamSide,
};
use crate::store::QueueEntry;
use std::cmp::Ordering;

/// Empty snapshot waiting for players.
pub fn initialize_snapshot(config: &SessionConfig, reference_year: i32) -> Snapshot {
    Snapshot::empty(config.team_size, reference_year, config.og_age_threshold)
}

/// Run the whole progression over `queue` (ordered by position).
///
/// Returns a `WaitingForPlayers` snapshot, with everyone next-up, when fewer than
/// `2 * min_players_per_team` players are checked in. That is not an error.
pub fn populate_snapshot(
    queue: &[QueueEntry],
    config: &SessionConfig,
    reference_year: i32,
) -> Result<Snapshot, QueueError> {
    let mut snapshot = initialize_snapshot(config, reference_year);
    loop {
        let next = advance_population(&snapshot, queue, config)?;
        if next.state == snapshot.state {
            return Ok(next);
        }
        snapshot = next;
    }
}

/// Perform a single state transition. `Complete` and a starved `WaitingForPlayers` are fixed points.
pub fn advance_population(
    snapshot: &Snapshot,
    queue: &[QueueEntry],
    config: &SessionConfig,
) -> Result<Snapshot, QueueError> {
    let mut next = snapshot.clone();
    match snapshot.state {
        PopulationState::WaitingForPlayers => {
            next.next_up = queue
                .iter()
                .map(|e| as_status(&e.player, PlayerStatus::Available))
                .collect();
            let needed = 2 * config.min_players_per_team();
            if queue.len() >= needed {
                next.state = PopulationState::TeamAssignment;
            } else {
                log::debug!(
                    "Waiting for players: {} checked in, {} needed",
                    queue.len(),
                    needed
                );
            }
        }
        PopulationState::TeamAssignment => {
            assign_teams(&mut next, queue, config);
            next.state = PopulationState::CourtSelection;
        }
        PopulationState::CourtSelection => {
            next.court = config.courts.first().cloned();
            next.state = PopulationState::GameCreation;
        }
        PopulationState::GameCreation => {
            validate_game(&next, config)?;
            next.state = PopulationState::Complete;
        }
        PopulationState::Complete => {}
    }
    Ok(next)
}

/// Deal players onto the two teams; everyone else stays next-up in queue order.
fn assign_teams(snapshot: &mut Snapshot, queue: &[QueueEntry], config: &SessionConfig) {
    let team_size = config.team_size;
    let per_team = team_size.min(queue.len() / 2);

    // Indices into `queue`, so that leftovers can be listed in queue order afterwards.
    let mut home: Vec<usize> = Vec::new();
    let mut away: Vec<usize> = Vec::new();
    let mut unpinned: Vec<usize> = Vec::new();
    // A pinned entry past its team's capacity waits next-up; it never switches sides.
    for (i, entry) in queue.iter().enumerate() {
        match entry.pinned {
            Some(TeamSide::Home) => {
                if home.len() < per_team {
                    home.push(i);
                }
            }
            Some(TeamSide::Away) => {
                if away.len() < per_team {
                    away.push(i);
                }
            }
            None => unpinned.push(i),
        }
    }

    let open = (per_team - home.len()) + (per_team - away.len());
    let mut candidates: Vec<usize> = unpinned.into_iter().take(open).collect();
    match config.assignment {
        AssignmentStrategy::QueueOrder => {
            for i in candidates {
                if home.len() < per_team {
                    home.push(i);
                } else {
                    away.push(i);
                }
            }
        }
        AssignmentStrategy::SkillBalanced => {
            candidates.sort_by(|&a, &b| by_skill(&queue[a].player, &queue[b].player));
            // Rank 0 to Team A, rank 1 to Team B, ...; a full team is skipped.
            for (rank, i) in candidates.into_iter().enumerate() {
                let wants_home = rank % 2 == 0;
                if (wants_home && home.len() < per_team) || away.len() >= per_team {
                    home.push(i);
                } else {
                    away.push(i);
                }
            }
        }
    }

    let team_of = |indices: &[usize]| -> Vec<Player> {
        indices
            .iter()
            .map(|&i| {
                let player = &queue[i].player;
                if player.status == PlayerStatus::Active {
                    player.clone()
                } else {
                    as_status(player, PlayerStatus::Assigned)
                }
            })
            .collect()
    };
    let (year, threshold) = (snapshot.reference_year, snapshot.og_age_threshold);
    snapshot.team_a = Team::from_players(team_of(&home), team_size, year, threshold);
    snapshot.team_b = Team::from_players(team_of(&away), team_size, year, threshold);
    snapshot.next_up = queue
        .iter()
        .enumerate()
        .filter(|(i, _)| !home.contains(i) && !away.contains(i))
        .map(|(_, e)| as_status(&e.player, PlayerStatus::Available))
        .collect();
}

/// Skill descending, then games played descending. Stable sort keeps queue order for full ties.
fn by_skill(a: &Player, b: &Player) -> Ordering {
    b.skill()
        .partial_cmp(&a.skill())
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.games_played.cmp(&a.games_played))
}

fn validate_game(snapshot: &Snapshot, config: &SessionConfig) -> Result<(), QueueError> {
    let (a, b) = (snapshot.team_a.filled(), snapshot.team_b.filled());
    if a != b {
        return Err(QueueError::InvalidState(format!(
            "team sizes differ ({} vs {})",
            a, b
        )));
    }
    if a < config.min_players_per_team() {
        return Err(QueueError::InvalidState(format!(
            "teams have {} players, minimum is {}",
            a,
            config.min_players_per_team()
        )));
    }
    if snapshot.court.is_none() {
        return Err(QueueError::InvalidState("no court selected".into()));
    }
    Ok(())
}

fn as_status(player: &Player, status: PlayerStatus) -> Player {
    Player {
        status,
        ..player.clone()
    }
}
