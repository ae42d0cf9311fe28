//! Shared battle setups for engine tests

use seer_protocol::ServerLine;

use super::engine::BattleEngine;

pub fn line(text: &str) -> ServerLine {
    ServerLine::parse(text)
}

/// Process every line, panicking on the first engine error
pub fn feed(engine: &mut BattleEngine, lines: &[&str]) {
    for text in lines {
        if let Err(e) = engine.process(&line(text)) {
            panic!("{text}: {e}");
        }
    }
}

/// A singles battle where we are p1 ("sagebot") against p2 ("rival")
pub fn started_singles() -> BattleEngine {
    let mut engine = BattleEngine::new("battle-gen9ou-1", "sagebot");
    feed(
        &mut engine,
        &[
            "|init|battle",
            "|player|p1|sagebot|1|",
            "|player|p2|rival|2|",
            "|gametype|singles",
            "|gen|9",
            "|tier|[Gen 9] OU",
        ],
    );
    engine
}

/// A doubles battle where we are p1 ("sagebot") against p2 ("rival")
pub fn started_doubles() -> BattleEngine {
    let mut engine = BattleEngine::new("battle-gen9doublesou-1", "sagebot");
    feed(
        &mut engine,
        &[
            "|init|battle",
            "|player|p1|sagebot|1|",
            "|player|p2|rival|2|",
            "|gametype|doubles",
            "|gen|9",
            "|tier|[Gen 9] Doubles OU",
        ],
    );
    engine
}

/// Our side entry for a request body
pub fn side_pokemon(ident: &str, details: &str, condition: &str, active: bool) -> String {
    format!(
        r#"{{"ident":"p1: {ident}","details":"{details}","condition":"{condition}","active":{active},"stats":{{"atk":100,"def":100,"spa":100,"spd":100,"spe":100}},"moves":["tackle","growl","protect"],"baseAbility":"pressure","item":"leftovers","ability":"pressure","teraType":"Normal","terastallized":""}}"#
    )
}

/// One active slot entry with the given move ids and target classes
pub fn active_slot(moves: &[(&str, &str)], trapped: bool) -> String {
    let moves = moves
        .iter()
        .map(|(id, target)| {
            format!(r#"{{"move":"{id}","id":"{id}","pp":10,"maxpp":10,"target":"{target}","disabled":false}}"#)
        })
        .collect::<Vec<_>>()
        .join(",");
    format!(r#"{{"moves":[{moves}],"trapped":{trapped}}}"#)
}

/// A full `|request|` line for sagebot as p1
pub fn request_line(body: &str, pokemon: &[String]) -> String {
    let separator = if body.is_empty() { "" } else { "," };
    format!(
        r#"|request|{{{body}{separator}"side":{{"name":"sagebot","id":"p1","pokemon":[{}]}},"rqid":1}}"#,
        pokemon.join(",")
    )
}
