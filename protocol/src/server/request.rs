//! Battle request types
//!
//! These types represent the JSON structure of |request| messages.

use super::battle::{Player, PokemonDetails};
use serde::{Deserialize, Deserializer};

/// What a request is asking the player for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Wait,
    TeamPreview,
    ForceSwitch,
    Active,
}

/// A battle request asking the player to make a decision
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRequest {
    /// Request ID for synchronization
    pub rqid: Option<u64>,

    /// Active pokemon and their available moves
    #[serde(default)]
    pub active: Option<Vec<ActivePokemon>>,

    /// Information about the player's side/team
    pub side: SideInfo,

    /// Which slots need to switch (for doubles/triples)
    #[serde(default)]
    pub force_switch: Option<Vec<bool>>,

    #[serde(default)]
    pub team_preview: bool,

    #[serde(default)]
    pub wait: bool,
}

impl BattleRequest {
    pub fn kind(&self) -> RequestKind {
        if self.wait {
            RequestKind::Wait
        } else if self.team_preview {
            RequestKind::TeamPreview
        } else if self.force_switch.is_some() {
            RequestKind::ForceSwitch
        } else if self.active.is_some() {
            RequestKind::Active
        } else {
            RequestKind::Wait
        }
    }

    /// Whether slot `index` (0-based) is flagged in forceSwitch
    pub fn must_switch(&self, index: usize) -> bool {
        self.force_switch
            .as_ref()
            .and_then(|flags| flags.get(index).copied())
            .unwrap_or(false)
    }
}

/// Information about an active pokemon in battle
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePokemon {
    #[serde(default)]
    pub moves: Vec<MoveSlot>,

    #[serde(default)]
    pub trapped: bool,

    #[serde(default)]
    pub maybe_trapped: bool,

    #[serde(default)]
    pub can_mega_evo: bool,

    #[serde(default)]
    pub can_ultra_burst: bool,

    /// One entry per move, None where that move has no Z-move
    #[serde(default)]
    pub can_z_move: Option<Vec<Option<ZMoveInfo>>>,

    #[serde(default)]
    pub can_dynamax: bool,

    /// Tera type offered this turn (if available)
    #[serde(default)]
    pub can_terastallize: Option<String>,

    /// Max moves, sent alongside canDynamax and while dynamaxed
    #[serde(default)]
    pub max_moves: Option<MaxMoves>,
}

impl ActivePokemon {
    /// Z-move for the move at `index`, if any
    pub fn z_move(&self, index: usize) -> Option<&ZMoveInfo> {
        self.can_z_move.as_ref()?.get(index)?.as_ref()
    }

    /// Max move for the move at `index`, if any
    pub fn max_move(&self, index: usize) -> Option<&MaxMoveSlot> {
        self.max_moves.as_ref()?.max_moves.get(index)
    }
}

/// A move slot on an active pokemon
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSlot {
    #[serde(rename = "move")]
    pub name: String,

    /// Move ID (lowercase, no spaces)
    pub id: String,

    /// Current PP. Struggle and locked moves are sent without it
    #[serde(default)]
    pub pp: Option<u32>,

    #[serde(default, rename = "maxpp")]
    pub max_pp: Option<u32>,

    /// Target class (normal, self, allySide, etc.)
    #[serde(default)]
    pub target: Option<String>,

    #[serde(default, deserialize_with = "bool_or_string")]
    pub disabled: bool,
}

impl MoveSlot {
    pub fn is_usable(&self) -> bool {
        !self.disabled && self.pp != Some(0)
    }
}

/// Some servers send the disabling effect's name instead of `true`
fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::String(s) => !s.is_empty(),
        _ => false,
    })
}

/// Z-move information
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZMoveInfo {
    #[serde(rename = "move")]
    pub name: String,

    #[serde(default)]
    pub target: Option<String>,
}

/// Max move information (for dynamax)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxMoves {
    #[serde(default)]
    pub max_moves: Vec<MaxMoveSlot>,
}

/// A max move slot
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MaxMoveSlot {
    #[serde(rename = "move")]
    pub name: String,

    #[serde(default)]
    pub target: Option<String>,
}

/// Information about the player's side
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SideInfo {
    /// Player's display name
    pub name: String,

    /// Player ID (p1, p2, etc.)
    pub id: String,

    #[serde(default)]
    pub pokemon: Vec<SidePokemon>,
}

impl SideInfo {
    pub fn player(&self) -> Option<Player> {
        Player::parse(&self.id)
    }
}

/// A pokemon on the player's side
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidePokemon {
    /// Pokemon identifier (e.g., "p1: Pikachu")
    pub ident: String,

    /// Details string (species, level, gender, shiny)
    pub details: String,

    /// Current condition ("HP/MAXHP STATUS" or "0 fnt")
    pub condition: String,

    #[serde(default)]
    pub active: bool,

    #[serde(default)]
    pub stats: PokemonStats,

    /// Move ids in slot order
    #[serde(default)]
    pub moves: Vec<String>,

    #[serde(default)]
    pub base_ability: String,

    #[serde(default)]
    pub ability: String,

    #[serde(default)]
    pub item: String,

    #[serde(default)]
    pub tera_type: Option<String>,

    /// Tera type once terastallized, empty otherwise
    #[serde(default)]
    pub terastallized: Option<String>,

    /// Set while Revival Blessing is choosing this pokemon's slot
    #[serde(default)]
    pub reviving: bool,
}

impl SidePokemon {
    pub fn is_fainted(&self) -> bool {
        self.condition.ends_with(" fnt") || self.condition == "fnt"
    }

    /// Nickname part of the ident
    pub fn nickname(&self) -> &str {
        self.ident
            .split_once(": ")
            .map(|(_, name)| name)
            .unwrap_or(&self.ident)
    }

    pub fn parsed_details(&self) -> PokemonDetails {
        PokemonDetails::parse(&self.details)
    }

    /// Current and max HP. Max is None once fainted
    pub fn hp(&self) -> (u32, Option<u32>) {
        let hp_part = self.condition.split_whitespace().next().unwrap_or("0");
        match hp_part.split_once('/') {
            Some((current, max)) => (current.parse().unwrap_or(0), max.parse().ok()),
            None => (hp_part.parse().unwrap_or(0), None),
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.condition.split_whitespace().nth(1)
    }

    pub fn is_terastallized(&self) -> bool {
        self.terastallized.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Pokemon stats
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PokemonStats {
    #[serde(default)]
    pub atk: u32,
    #[serde(default)]
    pub def: u32,
    #[serde(default)]
    pub spa: u32,
    #[serde(default)]
    pub spd: u32,
    #[serde(default)]
    pub spe: u32,
}
