//! Domain types for battle state tracking

mod conditions;
mod pokemon;
mod side;
mod stats;
mod status;

pub use conditions::{Weather, condition_id};
pub use pokemon::{
    Candidate, HpKind, MoveCandidate, PokemonRecord, base_species, identity_key,
};
pub use side::SideState;
pub use stats::{Boosts, StatBlock, StatRange};
pub use status::Status;
