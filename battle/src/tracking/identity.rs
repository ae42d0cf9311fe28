//! Slot bookkeeping and identity resolution
//!
//! Our own pokemon are always known in full from the request, so an own
//! individual missing from the roster is an inconsistency. Opponent pokemon
//! start out under a base key from team preview and are promoted to their
//! full key on first reveal, keeping every field learned so far.

use seer_protocol::{HpStatus, Player, Pokemon, PokemonDetails, ServerMessage};

use super::engine::BattleEngine;
use super::signal::ProgressSignal;
use super::state::Side;
use crate::error::{EngineError, Result};
use crate::types::{PokemonRecord, SideState, Status, base_species, identity_key};

impl BattleEngine {
    /// `|switch|` and `|drag|`: the named pokemon takes the slot
    pub(super) fn on_switch(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let (ServerMessage::Switch {
            pokemon,
            details,
            hp_status,
        }
        | ServerMessage::Drag {
            pokemon,
            details,
            hp_status,
        }) = message
        else {
            return Ok(ProgressSignal::NoAction);
        };

        let record = self.record_mut()?;
        let side = record.side_of(pokemon.player)?;
        let roster = record.current_state_mut().side_mut(side);
        let slot = field_slot(roster, pokemon)?;

        let key = resolve_identity(roster, side, pokemon, details)?;
        if let Some(previous) = roster.occupant(pokemon.player, slot)?.map(str::to_string) {
            if previous != key {
                if let Some(leaving) = roster.get_mut(&previous) {
                    leaving.leave_field();
                }
            }
        }
        place(roster, pokemon.player, slot, &key, hp_status.as_ref())?;

        self.note(format!("{} {} enters slot {slot}", pokemon.player, key));
        Ok(ProgressSignal::NoAction)
    }

    /// `|detailschange|`: permanent forme change of the slot occupant. The
    /// key is forme-independent, so the record stays where it is.
    pub(super) fn on_detailschange(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::DetailsChange {
            pokemon,
            details,
            hp_status,
        } = message
        else {
            return Ok(ProgressSignal::NoAction);
        };

        let record = self.record_mut()?;
        let side = record.side_of(pokemon.player)?;
        let roster = record.current_state_mut().side_mut(side);
        let slot = field_slot(roster, pokemon)?;

        let key = roster.require_occupant(pokemon.player, slot)?;
        let changed = roster
            .get_mut(&key)
            .ok_or_else(|| EngineError::UnknownIdentity(key.clone()))?;
        changed.set_species(&details.species);
        if let Some(hp) = hp_status {
            changed.apply_hp(hp);
        }

        self.note(format!(
            "{} {key} is now {}",
            pokemon.player, details.species
        ));
        Ok(ProgressSignal::NoAction)
    }

    /// `|replace|`: an illusion ends and the real pokemon is revealed in the slot
    pub(super) fn on_replace(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::Replace {
            pokemon,
            details,
            hp_status,
        } = message
        else {
            return Ok(ProgressSignal::NoAction);
        };

        let record = self.record_mut()?;
        let side = record.side_of(pokemon.player)?;
        let roster = record.current_state_mut().side_mut(side);
        let slot = field_slot(roster, pokemon)?;

        if let Some(disguise) = roster.occupant(pokemon.player, slot)?.map(str::to_string) {
            let elsewhere = roster.slots_holding(&disguise, slot);
            if elsewhere.len() > 1 {
                return Err(EngineError::AmbiguousReplace(disguise));
            }
            if let Some(shown) = roster.get_mut(&disguise) {
                match elsewhere.first() {
                    Some(other) => shown.slot = Some(*other),
                    None => shown.leave_field(),
                }
            }
        }

        let key = resolve_identity(roster, side, pokemon, details)?;
        place(roster, pokemon.player, slot, &key, hp_status.as_ref())?;

        self.note(format!("{} {key} revealed in slot {slot}", pokemon.player));
        Ok(ProgressSignal::NoAction)
    }

    /// `|swap|`: the pokemon moves to a 0-based position on its own side
    pub(super) fn on_swap(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::Swap { pokemon, position } = message else {
            return Ok(ProgressSignal::NoAction);
        };

        let record = self.record_mut()?;
        let side = record.side_of(pokemon.player)?;
        let roster = record.current_state_mut().side_mut(side);
        let source = field_slot(roster, pokemon)?;
        let destination = *position as usize + 1;

        let moving = roster.require_occupant(pokemon.player, source)?;
        let displaced = roster
            .occupant(pokemon.player, destination)?
            .map(str::to_string);

        roster.set_occupant(pokemon.player, source, displaced.clone())?;
        roster.set_occupant(pokemon.player, destination, Some(moving.clone()))?;
        if let Some(mon) = roster.get_mut(&moving) {
            mon.slot = Some(destination);
        }
        if let Some(mon) = displaced.as_deref().and_then(|key| roster.get_mut(key)) {
            mon.slot = Some(source);
        }

        self.note(format!(
            "{} {moving} swaps slot {source} for {destination}",
            pokemon.player
        ));
        Ok(ProgressSignal::NoAction)
    }

    pub(super) fn on_faint(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::Faint(pokemon) = message else {
            return Ok(ProgressSignal::NoAction);
        };

        let record = self.record_mut()?;
        let side = record.side_of(pokemon.player)?;
        let roster = record.current_state_mut().side_mut(side);
        let slot = field_slot(roster, pokemon)?;

        let key = roster.require_occupant(pokemon.player, slot)?;
        if let Some(mon) = roster.get_mut(&key) {
            mon.status = Some(Status::Fainted);
            mon.current_hp = Some(0);
            mon.leave_field();
        }
        roster.set_occupant(pokemon.player, slot, None)?;

        self.note(format!("{} {key} fainted in slot {slot}", pokemon.player));
        Ok(ProgressSignal::NoAction)
    }
}

/// Slot named by the position letter, checked against the slot table
fn field_slot(roster: &SideState, pokemon: &Pokemon) -> Result<usize> {
    let slot = pokemon.slot().ok_or(EngineError::UnindexedSlot {
        player: pokemon.player,
        slot: 0,
    })?;
    roster.occupant(pokemon.player, slot)?;
    Ok(slot)
}

/// Roster key for a revealed pokemon, promoting or creating opponent records
fn resolve_identity(
    roster: &mut SideState,
    side: Side,
    pokemon: &Pokemon,
    details: &PokemonDetails,
) -> Result<String> {
    let level = details.level.unwrap_or(100);
    let base_name = base_species(&details.species);
    let key = identity_key(
        pokemon.player,
        &base_name,
        level,
        details.gender,
        Some(&pokemon.name),
    );
    if let Some(known) = roster.get_mut(&key) {
        known.set_species(&details.species);
        return Ok(key);
    }
    if side == Side::Player {
        return Err(EngineError::UnknownIdentity(key));
    }

    let base = identity_key(pokemon.player, &base_name, level, details.gender, None);
    if roster.ambiguous_bases.contains(&base) {
        return Err(EngineError::AmbiguousIdentity(base));
    }

    let revealed = match roster.roster.remove(&base) {
        Some(mut hidden) => {
            hidden.set_species(&details.species);
            hidden.nickname = Some(pokemon.name.clone());
            if hidden.tera_type.is_none() {
                hidden.tera_type = details.tera_type.clone();
            }
            hidden
        }
        None => PokemonRecord::observed(pokemon.player, details, Some(pokemon.name.clone())),
    };
    roster.roster.insert(key.clone(), revealed);
    Ok(key)
}

/// Point `slot` at `key` and mark the pokemon active there
fn place(
    roster: &mut SideState,
    player: Player,
    slot: usize,
    key: &str,
    hp_status: Option<&HpStatus>,
) -> Result<()> {
    roster.set_occupant(player, slot, Some(key.to_string()))?;
    let mon = roster
        .get_mut(key)
        .ok_or_else(|| EngineError::UnknownIdentity(key.to_string()))?;
    mon.enter_slot(slot);
    if let Some(hp) = hp_status {
        mon.apply_hp(hp);
    }
    Ok(())
}
