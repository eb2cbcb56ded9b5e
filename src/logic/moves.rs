//! Player movement: checkout, bump, horizontal swap and vertical swap.
//!
//! Moves are pure. The caller's snapshot is never touched; a rejected move hands it back as is.

use crate::models::{
    MoveCommand, MoveResult, MoveType, Player, PlayerLocation, PlayerStatus, QueueError,
    Snapshot, TeamSide,
};

/// Apply `command` and wrap the outcome in the wire-level `MoveResult`.
pub fn apply_move(snapshot: &Snapshot, command: &MoveCommand) -> MoveResult {
    match try_move(snapshot, command) {
        Ok(moved) => MoveResult::moved(moved),
        Err(e) => MoveResult::rejected(e.to_string(), snapshot.clone()),
    }
}

/// Apply `command` to an owned copy of `snapshot`.
pub fn try_move(snapshot: &Snapshot, command: &MoveCommand) -> Result<Snapshot, QueueError> {
    let location = snapshot
        .locate(command.player_id)
        .ok_or(QueueError::PlayerNotFound(command.player_id))?;
    let mut next = snapshot.clone();
    match command.move_type {
        MoveType::Checkout => checkout(&mut next, location)?,
        MoveType::Bump => bump(&mut next, location)?,
        MoveType::HorizontalSwap => horizontal_swap(&mut next, location)?,
        MoveType::VerticalSwap => vertical_swap(&mut next, location)?,
    }
    Ok(next)
}

fn team_slot(location: PlayerLocation) -> Option<(TeamSide, usize)> {
    match location {
        PlayerLocation::TeamA(slot) => Some((TeamSide::Home, slot)),
        PlayerLocation::TeamB(slot) => Some((TeamSide::Away, slot)),
        PlayerLocation::NextUp(_) => None,
    }
}

/// Next-up: plain removal. Team slot: the head of next-up takes the vacated slot.
fn checkout(snapshot: &mut Snapshot, location: PlayerLocation) -> Result<(), QueueError> {
    match location {
        PlayerLocation::NextUp(i) => {
            snapshot.next_up.remove(i);
        }
        PlayerLocation::TeamA(slot) => {
            fill_from_next_up(snapshot, TeamSide::Home, slot)?;
        }
        PlayerLocation::TeamB(slot) => {
            fill_from_next_up(snapshot, TeamSide::Away, slot)?;
        }
    }
    Ok(())
}

/// Next-up: trade places with the player below. Team slot: the head of next-up takes the
/// slot and the displaced player goes to the front of next-up.
fn bump(snapshot: &mut Snapshot, location: PlayerLocation) -> Result<(), QueueError> {
    if let PlayerLocation::NextUp(i) = location {
        if i + 1 >= snapshot.next_up.len() {
            return Err(QueueError::Validation(
                "no player below to bump with".into(),
            ));
        }
        snapshot.next_up.swap(i, i + 1);
        return Ok(());
    }
    if let Some((side, slot)) = team_slot(location) {
        if let Some(mut displaced) = fill_from_next_up(snapshot, side, slot)? {
            displaced.status = PlayerStatus::Available;
            snapshot.next_up.insert(0, displaced);
        }
    }
    Ok(())
}

/// Exchange Team A slot i with Team B slot i.
fn horizontal_swap(snapshot: &mut Snapshot, location: PlayerLocation) -> Result<(), QueueError> {
    let (_, slot) = team_slot(location).ok_or_else(|| {
        QueueError::Validation("horizontal swap only applies to players on a team".into())
    })?;
    std::mem::swap(
        &mut snapshot.team_a.slots[slot],
        &mut snapshot.team_b.slots[slot],
    );
    snapshot.recompute(TeamSide::Home);
    snapshot.recompute(TeamSide::Away);
    Ok(())
}

/// Exchange Team B slot i with slot (i + 1) mod team size.
fn vertical_swap(snapshot: &mut Snapshot, location: PlayerLocation) -> Result<(), QueueError> {
    let PlayerLocation::TeamB(slot) = location else {
        return Err(QueueError::Validation(
            "vertical swap only applies to Team B players".into(),
        ));
    };
    let slots = &mut snapshot.team_b.slots;
    let below = (slot + 1) % slots.len();
    slots.swap(slot, below);
    snapshot.recompute(TeamSide::Away);
    Ok(())
}

/// Pop the head of next-up into `side`'s `slot`, returning whoever held the slot.
fn fill_from_next_up(
    snapshot: &mut Snapshot,
    side: TeamSide,
    slot: usize,
) -> Result<Option<Player>, QueueError> {
    if snapshot.next_up.is_empty() {
        return Err(QueueError::InsufficientPlayers(
            "no available players for replacement".into(),
        ));
    }
    let mut replacement = snapshot.next_up.remove(0);
    replacement.status = PlayerStatus::Assigned;
    let displaced = snapshot.team_mut(side).slots[slot].replace(replacement);
    snapshot.recompute(side);
    Ok(displaced)
}
