//! Per-individual battle records

use seer_protocol::{HpStatus, Player, PokemonDetails};
use serde::{Deserialize, Serialize};

use super::conditions::condition_id;
use super::stats::{Boosts, StatBlock};
use super::status::Status;

/// Species whose hyphen is part of the base name rather than a forme marker
const HYPHENATED_SPECIES: &[&str] = &[
    "Ho-Oh",
    "Porygon-Z",
    "Jangmo-o",
    "Hakamo-o",
    "Kommo-o",
    "Chi-Yu",
    "Ting-Lu",
    "Wo-Chien",
    "Chien-Pao",
];

/// Strip the forme from a species name ("Urshifu-Rapid-Strike" is "Urshifu").
///
/// Team preview hides some formes as "Species-*", which is stripped the same way.
pub fn base_species(species: &str) -> String {
    let species = species.trim_end_matches("-*");
    if let Some(name) = HYPHENATED_SPECIES
        .iter()
        .find(|name| species == **name || species.starts_with(&format!("{}-", name)))
    {
        return name.to_string();
    }

    species
        .split_once('-')
        .map_or(species, |(base, _)| base)
        .to_string()
}

/// Whether HP figures are exact or out of 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HpKind {
    Exact,
    Fraction,
}

/// An item or ability the pokemon may have, with its likelihood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub probability: f64,
}

impl Candidate {
    pub fn certain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            probability: 1.0,
        }
    }
}

/// A move the pokemon may know, with how often it has been seen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCandidate {
    pub name: String,
    pub probability: f64,
    pub use_count: u32,
}

/// What is known about one individual at a decision point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonRecord {
    pub player: Player,
    pub species: String,
    pub base_species: String,
    /// Unknown until the pokemon is first seen on the field
    pub nickname: Option<String>,
    pub level: u8,
    pub gender: Option<char>,

    pub hp_kind: HpKind,
    pub max_hp: Option<u32>,
    pub current_hp: Option<u32>,

    /// 1-based position in our request's side list
    pub team_pos: Option<usize>,
    /// 1-based field slot, None when benched or fainted
    pub slot: Option<usize>,
    pub active: bool,

    pub stats: StatBlock,
    pub boosts: Boosts,

    pub has_item: Option<bool>,
    pub items: Vec<Candidate>,
    pub abilities: Vec<Candidate>,
    pub overwritten_ability: Option<String>,
    pub moves: Vec<MoveCandidate>,

    pub status: Option<Status>,
    pub conditions: Vec<String>,

    pub tera_type: Option<String>,
    pub is_tera: bool,
    pub is_mega: bool,
    pub is_dynamax: bool,
    pub is_reviving: bool,
}

impl PokemonRecord {
    /// A pokemon seen through the battle log only
    pub fn observed(player: Player, details: &PokemonDetails, nickname: Option<String>) -> Self {
        Self {
            player,
            species: details.species.clone(),
            base_species: base_species(&details.species),
            nickname,
            level: details.level.unwrap_or(100),
            gender: details.gender,
            hp_kind: HpKind::Fraction,
            max_hp: Some(100),
            current_hp: Some(100),
            team_pos: None,
            slot: None,
            active: false,
            stats: StatBlock::default(),
            boosts: Boosts::default(),
            has_item: None,
            items: Vec::new(),
            abilities: Vec::new(),
            overwritten_ability: None,
            moves: Vec::new(),
            status: None,
            conditions: Vec::new(),
            tera_type: details.tera_type.clone(),
            is_tera: false,
            is_mega: false,
            is_dynamax: false,
            is_reviving: false,
        }
    }

    /// Key addressing this individual once its nickname is known.
    ///
    /// Built from the base species so it survives forme changes, including
    /// the ones that happen off the field (Palafin-Hero, Meloetta reverting).
    pub fn identity_key(&self) -> String {
        identity_key(
            self.player,
            &self.base_species,
            self.level,
            self.gender,
            self.nickname.as_deref(),
        )
    }

    /// Key used before the nickname is revealed
    pub fn base_key(&self) -> String {
        identity_key(self.player, &self.base_species, self.level, self.gender, None)
    }

    /// Change forme. The base species, and with it the key, stays put.
    pub fn set_species(&mut self, species: &str) {
        self.species = species.to_string();
    }

    pub fn is_fainted(&self) -> bool {
        self.status == Some(Status::Fainted)
    }

    /// Apply an HP/status string from the battle log
    pub fn apply_hp(&mut self, hp: &HpStatus) {
        self.current_hp = Some(hp.current);
        if let Some(max) = hp.max {
            self.max_hp = Some(max);
        }
        self.status = hp.status.as_deref().and_then(Status::from_protocol);
    }

    /// Count one use of a move, adding it to the candidates if new
    pub fn record_move(&mut self, name: &str) {
        let id = crate::to_id(name);
        match self.moves.iter_mut().find(|m| m.name == id) {
            Some(known) => known.use_count += 1,
            None => self.moves.push(MoveCandidate {
                name: id,
                probability: 1.0,
                use_count: 1,
            }),
        }
    }

    pub fn reveal_item(&mut self, item: &str) {
        self.has_item = Some(true);
        self.items = vec![Candidate::certain(crate::to_id(item))];
    }

    pub fn lose_item(&mut self) {
        self.has_item = Some(false);
        self.items.clear();
    }

    /// Record an ability; `overwritten` marks abilities gained from an effect
    pub fn reveal_ability(&mut self, ability: &str, overwritten: bool) {
        let id = crate::to_id(ability);
        if overwritten {
            self.overwritten_ability = Some(id);
        } else {
            self.abilities = vec![Candidate::certain(id)];
        }
    }

    pub fn add_condition(&mut self, effect: &str) {
        let id = condition_id(effect);
        if !self.conditions.contains(&id) {
            self.conditions.push(id);
        }
    }

    pub fn remove_condition(&mut self, effect: &str) {
        let id = condition_id(effect);
        self.conditions.retain(|c| *c != id);
    }

    /// Leave the field: slot pointer, boosts and volatiles are dropped
    pub fn leave_field(&mut self) {
        self.slot = None;
        self.active = false;
        self.boosts.clear();
        self.conditions.clear();
        self.is_dynamax = false;
    }

    pub fn enter_slot(&mut self, slot: usize) {
        self.slot = Some(slot);
        self.active = true;
    }
}

/// `{player}_{base species}_{level}_{gender}_{nickname}`, with "None" for unknown parts
pub fn identity_key(
    player: Player,
    base_species: &str,
    level: u8,
    gender: Option<char>,
    nickname: Option<&str>,
) -> String {
    let gender = match gender {
        Some('M') => "M",
        Some('F') => "F",
        _ => "None",
    };
    format!(
        "{}_{}_{}_{}_{}",
        player,
        base_species,
        level,
        gender,
        nickname.unwrap_or("None")
    )
}
