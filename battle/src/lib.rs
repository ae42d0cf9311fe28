//! Battle state reconstruction for Pokemon Showdown clients.
//!
//! This crate turns classified protocol lines from `seer-protocol` into a
//! typed, partially observed view of one battle, and enumerates the choices
//! that are legal at each decision point.
//!
//! # Overview
//!
//! ```text
//! seer-protocol (wire format)
//!        │
//!        ▼
//! seer-battle (reconstruction + legal choices) ← THIS CRATE
//!        │
//!        ▼
//! seer-client (connection, matchmaking, policies)
//! ```
//!
//! # Main Types
//!
//! - [`BattleEngine`] - one per battle; feed it lines with [`BattleEngine::process`]
//! - [`BattleRecord`] - players, format and every [`BattleState`] snapshot
//! - [`PokemonRecord`] - what is known about one individual
//! - [`BattleChoice`] / [`Action`] - legal choice sets and submitted replies
//! - [`ProgressSignal`] - what, if anything, the caller must decide next
//!
//! # Example Usage
//!
//! ```ignore
//! use seer_battle::{BattleEngine, ProgressSignal};
//! use seer_protocol::ServerLine;
//!
//! let mut engine = BattleEngine::new("battle-gen9randombattle-1", "sagebot");
//! for text in frame.lines() {
//!     match engine.process(&ServerLine::parse(text))? {
//!         ProgressSignal::Move => { /* pick from engine.state() */ }
//!         _ => {}
//!     }
//! }
//! ```

pub mod choice;
pub mod error;
pub mod targeting;
pub mod tracking;
pub mod types;

pub use choice::{
    Action, BattleChoice, ItemChoice, MoveChoice, SlotChoice, SlotOptions, SwitchChoice,
    TeamChoice,
};
pub use error::{EngineError, Result};
pub use tracking::{BattleEngine, BattleRecord, BattleState, ProgressSignal, Side, normalize_format};
pub use types::{
    Boosts, Candidate, HpKind, MoveCandidate, PokemonRecord, SideState, StatBlock, StatRange,
    Status, Weather,
};

// Re-export protocol types the public API is expressed in
pub use seer_protocol::{GameType, Player, Stat};

/// Showdown id form of a name: lowercase ASCII letters and digits only
pub fn to_id(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_id() {
        assert_eq!(to_id("Sage Bot"), "sagebot");
        assert_eq!(to_id("Farfetch’d"), "farfetchd");
        assert_eq!(to_id("U-turn"), "uturn");
    }
}
