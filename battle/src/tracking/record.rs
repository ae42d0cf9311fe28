//! Administrative envelope of one battle

use seer_protocol::{GameType, Player};
use serde::{Deserialize, Serialize};

use super::state::{BattleState, Side};
use crate::choice::Action;
use crate::error::{EngineError, Result};

/// Format id with brackets and spaces removed: "[Gen 9] OU" becomes "gen9ou"
pub fn normalize_format(format: &str) -> String {
    format
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ' '))
        .collect()
}

/// One battle: who played, under which rules, and every decision point.
///
/// `actions.len()` is always `states.len() - 1` or `states.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleRecord {
    pub battle_id: String,
    pub states: Vec<BattleState>,
    pub actions: Vec<Action>,

    pub player_name: String,
    pub player_id: Option<Player>,
    pub player_rating: Option<u32>,
    pub player_team_size: Option<u8>,

    pub opponent_name: Option<String>,
    pub opponent_id: Option<Player>,
    pub opponent_rating: Option<u32>,
    pub opponent_team_size: Option<u8>,

    pub rated: bool,
    pub gametype: Option<GameType>,
    pub format: Option<String>,
    pub generation: Option<u8>,
    pub turn: u32,
    pub player_victory: Option<bool>,
    pub finalized: bool,
}

impl BattleRecord {
    /// A fresh record holding the first (empty, singles-sized) state
    pub fn new(battle_id: impl Into<String>, player_name: impl Into<String>) -> Self {
        Self {
            battle_id: battle_id.into(),
            states: vec![BattleState::new(1)],
            actions: Vec::new(),
            player_name: player_name.into(),
            player_id: None,
            player_rating: None,
            player_team_size: None,
            opponent_name: None,
            opponent_id: None,
            opponent_rating: None,
            opponent_team_size: None,
            rated: false,
            gametype: None,
            format: None,
            generation: None,
            turn: 0,
            player_victory: None,
            finalized: false,
        }
    }

    pub fn current_state(&self) -> &BattleState {
        // states is never empty: `new` seeds it and nothing removes from it
        &self.states[self.states.len() - 1]
    }

    pub fn current_state_mut(&mut self) -> &mut BattleState {
        let last = self.states.len() - 1;
        &mut self.states[last]
    }

    /// Active slots per side for this battle's game type
    pub fn slot_count(&self) -> usize {
        self.gametype.map_or(1, |game_type| game_type.slot_count())
    }

    /// Map a protocol player to our point of view
    pub fn side_of(&self, player: Player) -> Result<Side> {
        match self.player_id {
            Some(own) if own == player => Ok(Side::Player),
            Some(_) => Ok(Side::Opponent),
            None => Err(EngineError::PlayerUnknown),
        }
    }

    /// Append a submitted action and open the next snapshot as a copy of
    /// the current one. Finalized records only take the action.
    pub fn record_action(&mut self, action: Action) {
        self.actions.push(action);
        if !self.finalized {
            let next = self.current_state().clone();
            self.states.push(next);
        }
    }

    pub fn finalize(&mut self) {
        self.finalized = true;
    }
}
