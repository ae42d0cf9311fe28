//! Major battle action message parsers
//!
//! Moves, switches and the other actions that change who is on the field.

use super::ServerMessage;
use super::args::Args;
use super::battle::Pokemon;
use anyhow::Result;

/// |move|POKEMON|MOVE|TARGET with optional tags such as [miss]
pub fn parse_move(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Move {
        pokemon: args.pokemon(0)?,
        move_name: args.require(1, "move")?.to_string(),
        target: args.opt(2).and_then(Pokemon::parse),
        miss: args.flag("miss"),
    })
}

/// |switch|POKEMON|DETAILS|HP STATUS
pub fn parse_switch(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Switch {
        pokemon: args.pokemon(0)?,
        details: args.details(1),
        hp_status: args.hp_status(2),
    })
}

/// |drag|POKEMON|DETAILS|HP STATUS
pub fn parse_drag(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Drag {
        pokemon: args.pokemon(0)?,
        details: args.details(1),
        hp_status: args.hp_status(2),
    })
}

/// |detailschange|POKEMON|DETAILS|HP STATUS
pub fn parse_detailschange(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::DetailsChange {
        pokemon: args.pokemon(0)?,
        details: args.details(1),
        hp_status: args.hp_status(2),
    })
}

/// |replace|POKEMON|DETAILS|HP STATUS
pub fn parse_replace(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Replace {
        pokemon: args.pokemon(0)?,
        details: args.details(1),
        hp_status: args.hp_status(2),
    })
}

/// |swap|POKEMON|POSITION
pub fn parse_swap(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Swap {
        pokemon: args.pokemon(0)?,
        position: args.number(1, "position")?,
    })
}

/// |cant|POKEMON|REASON or |cant|POKEMON|REASON|MOVE
pub fn parse_cant(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Cant {
        pokemon: args.pokemon(0)?,
        reason: args.string(1),
        move_name: args.opt(2).map(str::to_string),
    })
}

/// |faint|POKEMON
pub fn parse_faint(args: &Args) -> Result<ServerMessage> {
    args.pokemon(0).map(ServerMessage::Faint)
}
