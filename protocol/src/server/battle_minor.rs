//! Secondary effects: lines that adjust a pokemon or the field without
//! moving anything between slots

use super::ServerMessage;
use super::args::Args;
use super::battle::{Pokemon, Stat};
use anyhow::{Result, anyhow};

fn stat_change(args: &Args) -> Result<(Pokemon, Stat, i8)> {
    let stat = args.require(1, "stat")?;
    let stat = Stat::parse(stat).ok_or_else(|| anyhow!("unknown stat {stat}"))?;
    Ok((args.pokemon(0)?, stat, args.number(2, "boost amount")?))
}

/// |-damage|POKEMON|HP STATUS
pub fn parse_damage(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Damage {
        pokemon: args.pokemon(0)?,
        hp_status: args.hp_status(1),
    })
}

/// |-heal|POKEMON|HP STATUS
pub fn parse_heal(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Heal {
        pokemon: args.pokemon(0)?,
        hp_status: args.hp_status(1),
    })
}

/// |-sethp|POKEMON|HP
pub fn parse_sethp(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::SetHp {
        pokemon: args.pokemon(0)?,
        hp_status: args.hp_status(1),
    })
}

/// |-status|POKEMON|STATUS
pub fn parse_status(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Status {
        pokemon: args.pokemon(0)?,
        status: args.text(1),
    })
}

/// |-curestatus|POKEMON|STATUS
pub fn parse_curestatus(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::CureStatus {
        pokemon: args.pokemon(0)?,
        status: args.text(1),
    })
}

pub fn parse_cureteam(args: &Args) -> Result<ServerMessage> {
    args.pokemon(0).map(ServerMessage::CureTeam)
}

/// |-boost|POKEMON|STAT|AMOUNT
pub fn parse_boost(args: &Args) -> Result<ServerMessage> {
    let (pokemon, stat, amount) = stat_change(args)?;
    Ok(ServerMessage::Boost {
        pokemon,
        stat,
        amount,
    })
}

pub fn parse_unboost(args: &Args) -> Result<ServerMessage> {
    let (pokemon, stat, amount) = stat_change(args)?;
    Ok(ServerMessage::Unboost {
        pokemon,
        stat,
        amount,
    })
}

/// |-setboost|POKEMON|STAT|AMOUNT, used by Belly Drum and Anger Point
pub fn parse_setboost(args: &Args) -> Result<ServerMessage> {
    let (pokemon, stat, amount) = stat_change(args)?;
    Ok(ServerMessage::SetBoost {
        pokemon,
        stat,
        amount,
    })
}

pub fn parse_clearboost(args: &Args) -> Result<ServerMessage> {
    args.pokemon(0).map(ServerMessage::ClearBoost)
}

pub fn parse_clearallboost(_args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::ClearAllBoost)
}

/// |-weather|WEATHER, with [upkeep] while it carries over
pub fn parse_weather(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Weather {
        weather: args.opt(0).unwrap_or("none").to_string(),
        upkeep: args.flag("upkeep"),
    })
}

/// |-start|POKEMON|EFFECT
pub fn parse_start(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::VolatileStart {
        pokemon: args.pokemon(0)?,
        effect: args.text(1),
    })
}

/// |-end|POKEMON|EFFECT
pub fn parse_end(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::VolatileEnd {
        pokemon: args.pokemon(0)?,
        effect: args.text(1),
    })
}

/// |-item|POKEMON|ITEM, optionally [from] EFFECT
pub fn parse_item(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Item {
        pokemon: args.pokemon(0)?,
        item: args.text(1),
        from: args.tag("from"),
    })
}

/// |-enditem|POKEMON|ITEM, optionally [from] EFFECT or [eat]
pub fn parse_enditem(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::EndItem {
        pokemon: args.pokemon(0)?,
        item: args.text(1),
        from: args.tag("from"),
    })
}

/// |-ability|POKEMON|ABILITY, optionally [from] EFFECT
pub fn parse_ability(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Ability {
        pokemon: args.pokemon(0)?,
        ability: args.text(1),
        from: args.tag("from"),
    })
}

/// |-mega|POKEMON|SPECIES|MEGASTONE; older servers leave out SPECIES
pub fn parse_mega(args: &Args) -> Result<ServerMessage> {
    let megastone = match args.text(2) {
        stone if stone.is_empty() => args.text(1),
        stone => stone,
    };
    Ok(ServerMessage::Mega {
        pokemon: args.pokemon(0)?,
        megastone,
    })
}

pub fn parse_zpower(args: &Args) -> Result<ServerMessage> {
    args.pokemon(0).map(ServerMessage::ZPower)
}

/// |-terastallize|POKEMON|TYPE
pub fn parse_terastallize(args: &Args) -> Result<ServerMessage> {
    Ok(ServerMessage::Terastallize {
        pokemon: args.pokemon(0)?,
        tera_type: args.require(1, "tera type")?.to_string(),
    })
}
