//! A snapshot of the field at one decision point

use serde::{Deserialize, Serialize};

use crate::choice::BattleChoice;
use crate::types::{SideState, Weather};

/// Which half of the field, from our point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Opponent,
}

/// The reconstructed field immediately before one decision.
///
/// Cloning produces an independent deep copy; snapshots already recorded
/// in a [`BattleRecord`](super::BattleRecord) are never mutated again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    /// Several states can share a turn because of forced switches
    pub turn: u32,
    pub player: SideState,
    pub opponent: SideState,
    pub weather: Option<Weather>,
    /// Choices legal at this point, None when nothing is asked of us
    pub battle_choice: Option<BattleChoice>,
}

impl BattleState {
    pub fn new(slot_count: usize) -> Self {
        Self {
            turn: 0,
            player: SideState::with_slots(slot_count),
            opponent: SideState::with_slots(slot_count),
            weather: None,
            battle_choice: None,
        }
    }

    pub fn side(&self, side: Side) -> &SideState {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideState {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    pub fn set_slot_count(&mut self, count: usize) {
        self.player.set_slot_count(count);
        self.opponent.set_slot_count(count);
    }

    /// Signed slot numbers of every filled slot: ours negative, theirs positive
    pub fn filled_target_slots(&self) -> Vec<i32> {
        self.player
            .filled_slots()
            .map(|slot| -(slot as i32))
            .chain(self.opponent.filled_slots().map(|slot| slot as i32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seer_protocol::Player;

    #[test]
    fn test_new_state_sizes_both_sides() {
        let state = BattleState::new(2);
        assert_eq!(state.player.slot_count(), 2);
        assert_eq!(state.opponent.slot_count(), 2);
        assert_eq!(state.battle_choice, None);
    }

    #[test]
    fn test_filled_target_slots() {
        let mut state = BattleState::new(2);
        state
            .player
            .set_occupant(Player::P1, 2, Some("mine".into()))
            .unwrap();
        state
            .opponent
            .set_occupant(Player::P2, 1, Some("theirs".into()))
            .unwrap();

        assert_eq!(state.filled_target_slots(), vec![-2, 1]);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut state = BattleState::new(1);
        let snapshot = state.clone();

        state.turn = 4;
        state.player.has_teratyped = true;

        assert_eq!(snapshot.turn, 0);
        assert!(!snapshot.player.has_teratyped);
    }
}
