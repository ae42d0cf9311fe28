use serde::{Deserialize, Serialize};

/// What, if anything, the caller must decide after a line is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressSignal {
    NoAction,
    /// Team preview: submit a team order
    TeamOrder,
    /// Turn start: submit one choice per slot
    Move,
    /// Mid-turn forced switch: submit one choice per slot
    Switch,
    /// The battle is over and its record finalized
    GameEnd,
    /// The connection is closing
    FullEnd,
}

impl ProgressSignal {
    /// Whether the caller has to answer with an action
    pub fn needs_action(&self) -> bool {
        matches!(self, Self::TeamOrder | Self::Move | Self::Switch)
    }
}
