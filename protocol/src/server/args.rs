//! Positional fields of a battle line
//!
//! `|-boost|p2a: Fin|atk|2` is read as `["p2a: Fin", "atk", "2"]`; index 0
//! is the first field after the message type. Trailing `[tag]` fields are
//! searched by name rather than position.

use std::str::FromStr;

use anyhow::Result;

use super::battle::{HpStatus, Player, Pokemon, PokemonDetails};
use crate::ParseError;

#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    fields: &'a [&'a str],
}

impl<'a> Args<'a> {
    /// Skip the empty leading field and the message type
    pub fn new(parts: &'a [&'a str]) -> Self {
        Self {
            fields: parts.get(2..).unwrap_or_default(),
        }
    }

    /// Field as sent, empty when absent
    pub fn raw(&self, index: usize) -> &'a str {
        self.fields.get(index).copied().unwrap_or_default()
    }

    /// Field if present and non-empty
    pub fn opt(&self, index: usize) -> Option<&'a str> {
        self.fields.get(index).copied().filter(|s| !s.is_empty())
    }

    pub fn string(&self, index: usize) -> String {
        self.raw(index).to_string()
    }

    /// Everything from `index` on, rejoined. Free text may contain `|`.
    pub fn rest(&self, index: usize) -> String {
        self.fields.get(index..).unwrap_or_default().join("|")
    }

    /// Name of an effect or item. A `[tag]` in its place means none was given.
    pub fn text(&self, index: usize) -> String {
        self.opt(index)
            .filter(|s| !s.starts_with('['))
            .map(str::to_string)
            .unwrap_or_default()
    }

    pub fn require(&self, index: usize, what: &str) -> Result<&'a str> {
        self.opt(index)
            .ok_or_else(|| ParseError::MissingField(what.to_string()).into())
    }

    pub fn number<T: FromStr>(&self, index: usize, what: &str) -> Result<T> {
        self.require(index, what)?
            .parse()
            .map_err(|_| ParseError::InvalidFormat(format!("{what}: {}", self.raw(index))).into())
    }

    pub fn player(&self, index: usize) -> Result<Player> {
        Player::parse(self.require(index, "player")?)
            .ok_or_else(|| ParseError::InvalidFormat(format!("player: {}", self.raw(index))).into())
    }

    pub fn pokemon(&self, index: usize) -> Result<Pokemon> {
        Pokemon::parse(self.raw(index))
            .ok_or_else(|| ParseError::MissingField("pokemon".to_string()).into())
    }

    pub fn details(&self, index: usize) -> PokemonDetails {
        self.opt(index).map(PokemonDetails::parse).unwrap_or_default()
    }

    pub fn hp_status(&self, index: usize) -> Option<HpStatus> {
        self.opt(index).and_then(HpStatus::parse)
    }

    /// Whether a bare `[flag]` appears anywhere on the line
    pub fn flag(&self, flag: &str) -> bool {
        self.fields
            .iter()
            .any(|field| field.strip_prefix('[').and_then(|f| f.strip_suffix(']')) == Some(flag))
    }

    /// Value of a `[tag] value` field, e.g. the effect in `[from] item: Leftovers`
    pub fn tag(&self, tag: &str) -> Option<String> {
        self.fields.iter().find_map(|field| {
            field
                .strip_prefix('[')
                .and_then(|f| f.strip_prefix(tag))
                .and_then(|f| f.strip_prefix("] "))
                .map(str::to_string)
        })
    }
}
