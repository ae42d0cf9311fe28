//! Battle progress message parsers
//!
//! These messages track the flow and state of a battle.

use super::ServerMessage;
use super::args::Args;
use super::request::BattleRequest;
use anyhow::{Context, Result};

/// |request|REQUEST (JSON)
///
/// An empty body is sent as a reset between decisions and is rejected here,
/// so it falls through to a raw line.
pub fn parse_request(args: &Args) -> Result<ServerMessage> {
    let json = args.rest(0);
    if json.trim().is_empty() {
        anyhow::bail!("Empty request body");
    }

    let request: BattleRequest = serde_json::from_str(&json).context("Invalid request JSON")?;
    Ok(ServerMessage::Request(Box::new(request)))
}

/// |inactive|MESSAGE
pub fn parse_inactive(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Inactive(args.string(0)))
}

/// |inactiveoff|MESSAGE
pub fn parse_inactiveoff(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::InactiveOff(args.string(0)))
}

/// |turn|NUMBER
pub fn parse_turn(args: &Args) -> Result<ServerMessage> {
    args.number(0, "turn number").map(ServerMessage::Turn)
}

/// |win|USER
pub fn parse_win(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Win(args.string(0)))
}

/// |expire|MESSAGE
pub fn parse_expire(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Expire(args.rest(0)))
}

/// |error|MESSAGE
pub fn parse_error(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Error(args.rest(0)))
}

/// |bigerror|MESSAGE
pub fn parse_bigerror(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::BigError(args.rest(0)))
}
