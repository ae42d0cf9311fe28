//! One side's roster and slot table

use std::collections::BTreeMap;

use seer_protocol::Player;
use serde::{Deserialize, Serialize};

use super::pokemon::PokemonRecord;
use crate::error::{EngineError, Result};

/// One player's side of the battle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideState {
    /// Identity key to record
    pub roster: BTreeMap<String, PokemonRecord>,

    /// Slot table, 1-based through the accessors. Entries hold roster keys.
    pub slots: Vec<Option<String>>,

    pub has_megad: bool,
    pub has_zmoved: bool,
    pub has_dynamaxed: bool,
    pub has_teratyped: bool,

    /// Base keys announced more than once in team preview
    pub ambiguous_bases: Vec<String>,
}

impl SideState {
    pub fn with_slots(count: usize) -> Self {
        Self {
            slots: vec![None; count],
            ..Default::default()
        }
    }

    /// Resize the slot table (1 for singles, 2 for doubles, 3 for triples)
    pub fn set_slot_count(&mut self, count: usize) {
        self.slots.resize(count, None);
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn index(&self, player: Player, slot: usize) -> Result<usize> {
        if slot == 0 || slot > self.slots.len() {
            return Err(EngineError::UnindexedSlot { player, slot });
        }
        Ok(slot - 1)
    }

    /// Key of the pokemon in `slot`, if any
    pub fn occupant(&self, player: Player, slot: usize) -> Result<Option<&str>> {
        let index = self.index(player, slot)?;
        Ok(self.slots[index].as_deref())
    }

    /// Key of the pokemon in `slot`, failing when the slot is empty
    pub fn require_occupant(&self, player: Player, slot: usize) -> Result<String> {
        self.occupant(player, slot)?
            .map(str::to_string)
            .ok_or(EngineError::EmptySlot { player, slot })
    }

    pub fn set_occupant(&mut self, player: Player, slot: usize, key: Option<String>) -> Result<()> {
        let index = self.index(player, slot)?;
        self.slots[index] = key;
        Ok(())
    }

    pub fn is_filled(&self, slot: usize) -> bool {
        slot >= 1 && self.slots.get(slot - 1).is_some_and(Option::is_some)
    }

    /// 1-based numbers of every filled slot
    pub fn filled_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, occupant)| occupant.is_some())
            .map(|(index, _)| index + 1)
    }

    /// Other slots holding `key`, excluding `slot`
    pub fn slots_holding(&self, key: &str, except: usize) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(index, occupant)| index + 1 != except && occupant.as_deref() == Some(key))
            .map(|(index, _)| index + 1)
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&PokemonRecord> {
        self.roster.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut PokemonRecord> {
        self.roster.get_mut(key)
    }

    /// Find a roster key by nickname
    pub fn find_by_nickname(&self, nickname: &str) -> Option<&str> {
        self.roster
            .iter()
            .find(|(_, record)| record.nickname.as_deref() == Some(nickname))
            .map(|(key, _)| key.as_str())
    }

    /// Every slot is empty or points at a roster entry
    pub fn slots_consistent(&self) -> bool {
        self.slots
            .iter()
            .flatten()
            .all(|key| self.roster.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seer_protocol::PokemonDetails;

    fn record(species: &str, nickname: &str) -> PokemonRecord {
        PokemonRecord::observed(
            Player::P2,
            &PokemonDetails::parse(species),
            Some(nickname.to_string()),
        )
    }

    #[test]
    fn test_slot_table_size() {
        let mut side = SideState::with_slots(1);
        assert_eq!(side.slot_count(), 1);

        side.set_slot_count(3);
        assert_eq!(side.slots, vec![None, None, None]);
    }

    #[test]
    fn test_unindexed_slot() {
        let side = SideState::with_slots(2);
        assert_eq!(
            side.occupant(Player::P1, 3),
            Err(EngineError::UnindexedSlot {
                player: Player::P1,
                slot: 3
            })
        );
        assert!(side.occupant(Player::P1, 0).is_err());
    }

    #[test]
    fn test_require_occupant() {
        let mut side = SideState::with_slots(2);
        side.set_occupant(Player::P2, 2, Some("k".into())).unwrap();

        assert_eq!(side.require_occupant(Player::P2, 2).unwrap(), "k");
        assert_eq!(
            side.require_occupant(Player::P2, 1),
            Err(EngineError::EmptySlot {
                player: Player::P2,
                slot: 1
            })
        );
        assert_eq!(side.filled_slots().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_find_by_nickname() {
        let mut side = SideState::with_slots(1);
        let song = record("Meloetta-Pirouette", "Song");
        let key = song.identity_key();
        assert_eq!(key, "p2_Meloetta_100_None_Song");
        side.roster.insert(key.clone(), song);

        assert_eq!(side.find_by_nickname("Song"), Some(key.as_str()));
        assert_eq!(side.find_by_nickname("Boo"), None);
    }
}
