//! Line classifier and outbound commands for the Pokemon Showdown protocol.
//!
//! Every inbound line maps to exactly one [`ServerMessage`]. Lines that are not
//! recognized, or that fail to parse, come back as [`ServerMessage::Raw`] so
//! callers never have to handle a classification failure.

use thiserror::Error;

pub mod client;
pub mod server;

pub use client::{ClientCommand, ClientMessage};
pub use server::{
    ActivePokemon, BattleRequest, GameType, HpStatus, MaxMoveSlot, MessageKind, MoveSlot, Player,
    Pokemon, PokemonDetails, PokemonStats, RequestKind, SearchState, ServerFrame, ServerLine,
    ServerMessage, SideInfo, SidePokemon, Stat, ZMoveInfo, parse_server_frame,
    parse_server_message,
};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Empty message")]
    EmptyMessage,
}
