//! Battle reconstruction from server messages
//!
//! [`BattleEngine`] owns a [`BattleRecord`] and routes each line to a
//! handler picked by message kind. Handlers live in one file per concern.

mod decisions;
mod engine;
mod identity;
mod observe;
mod record;
mod setup;
mod signal;
mod state;

#[cfg(test)]
mod fixtures;

pub use engine::BattleEngine;
pub use record::{BattleRecord, normalize_format};
pub use signal::ProgressSignal;
pub use state::{BattleState, Side};
