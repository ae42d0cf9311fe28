use seer_protocol::Player;
use thiserror::Error;

/// Protocol-impossible conditions hit while reconstructing a battle.
///
/// Every variant is fatal for the battle that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("battle event received before init")]
    NotInitialized,

    #[error("own player id is not known yet")]
    PlayerUnknown,

    #[error("game type has not been announced")]
    GameTypeUnset,

    #[error("game type {0} is not supported")]
    UnsupportedGameType(String),

    #[error("slot {slot} does not exist for {player}")]
    UnindexedSlot { player: Player, slot: usize },

    #[error("slot {slot} for {player} is empty")]
    EmptySlot { player: Player, slot: usize },

    #[error("no roster entry for {0}")]
    UnknownIdentity(String),

    #[error("several hidden pokemon share the identity {0}")]
    AmbiguousIdentity(String),

    #[error("{0} occupies more than one other slot")]
    AmbiguousReplace(String),

    #[error("unknown move target class {0}")]
    UnknownMoveTarget(String),

    #[error("request addressed to {found}, expected {expected}")]
    ForeignRequest { expected: String, found: String },

    #[error("server error: {0}")]
    ServerError(String),

    #[error("server bigerror: {0}")]
    ServerBigError(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
