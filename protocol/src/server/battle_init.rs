//! Lines sent once while a battle room is set up

use super::ServerMessage;
use super::args::Args;
use super::battle::GameType;
use anyhow::{Result, anyhow};

/// |init|ROOMTYPE
pub fn parse_init(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Init(args.string(0)))
}

/// |title|TITLE
pub fn parse_title(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Title(args.rest(0)))
}

/// |player|PLAYER|USERNAME|AVATAR|RATING, or a bare |player|PLAYER| when
/// someone leaves
pub fn parse_player(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::BattlePlayer {
        player: args.player(0)?,
        username: args.string(1),
        avatar: args.string(2),
        rating: args.opt(3).and_then(|r| r.parse().ok()),
    })
}

/// |teamsize|PLAYER|NUMBER
pub fn parse_teamsize(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::TeamSize {
        player: args.player(0)?,
        size: args.number(1, "team size")?,
    })
}

/// |gametype|GAMETYPE
pub fn parse_gametype(args: &Args) -> Result<ServerMessage> {
    let name = args.require(0, "game type")?;
    GameType::parse(name)
        .map(ServerMessage::GameType)
        .ok_or_else(|| anyhow!("unknown game type {name}"))
}

/// |gen|GENNUM
pub fn parse_gen(args: &Args) -> Result<ServerMessage> {
    args.number(0, "generation").map(ServerMessage::Gen)
}

/// |tier|FORMATNAME
pub fn parse_tier(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Tier(args.string(0)))
}

/// |rated| or |rated|MESSAGE
pub fn parse_rated(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Rated(args.opt(0).map(str::to_string)))
}

/// |rule|RULE: DESCRIPTION
pub fn parse_rule(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Rule(args.string(0)))
}

/// |poke|PLAYER|DETAILS|ITEM, where ITEM is "item" or empty
pub fn parse_poke(args: &Args) -> Result<ServerMessage> {
    let player = args.player(0)?;
    args.require(1, "details")?;

    Ok(ServerMessage::Poke {
        player,
        details: args.details(1),
        has_item: args.raw(2) == "item",
    })
}

/// |teampreview or |teampreview|NUMBER
pub fn parse_teampreview(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::TeamPreview(
        args.opt(0).and_then(|n| n.parse().ok()),
    ))
}
