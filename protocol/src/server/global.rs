use super::ServerMessage;
use crate::ParseError;
use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Body of |updatesearch|
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SearchState {
    /// Formats currently being searched for on the ladder
    #[serde(default)]
    pub searching: Vec<String>,

    /// Battle room id to battle title, null when no games are running
    #[serde(default)]
    pub games: Option<BTreeMap<String, String>>,
}

impl SearchState {
    pub fn game_count(&self) -> usize {
        self.games.as_ref().map_or(0, BTreeMap::len)
    }
}

/// Strip the rank symbol the server prepends to user names
fn strip_rank(name: &str) -> String {
    name.trim()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}

pub fn parse_challstr(parts: &[&str]) -> Result<ServerMessage> {
    if parts.len() < 3 {
        return Err(ParseError::MissingField("challstr value".to_string()).into());
    }

    // CHALLSTR can contain | characters, so join everything after parts[1]
    let challstr = parts[2..].join("|");
    if challstr.is_empty() {
        return Err(ParseError::InvalidFormat("challstr cannot be empty".to_string()).into());
    }

    Ok(ServerMessage::Challstr(challstr))
}

/// |updateuser|USER|NAMED|AVATAR|SETTINGS
pub fn parse_updateuser(parts: &[&str]) -> Result<ServerMessage> {
    if parts.len() < 4 {
        return Err(ParseError::MissingField("updateuser fields".to_string()).into());
    }

    let username = strip_rank(parts[2]);
    let named = parts[3] == "1";
    let avatar = parts.get(4).unwrap_or(&"").to_string();

    Ok(ServerMessage::UpdateUser {
        username,
        named,
        avatar,
    })
}

pub fn parse_nametaken(parts: &[&str]) -> Result<ServerMessage> {
    if parts.len() < 4 {
        return Err(ParseError::MissingField("nametaken fields".to_string()).into());
    }

    Ok(ServerMessage::NameTaken {
        username: parts[2].to_string(),
        message: parts[3..].join("|"),
    })
}

pub fn parse_popup(parts: &[&str]) -> Result<ServerMessage> {
    if parts.len() < 3 {
        return Err(ParseError::MissingField("popup message".to_string()).into());
    }

    Ok(ServerMessage::Popup(parts[2..].join("|")))
}

/// |pm|SENDER|RECEIVER|MESSAGE
pub fn parse_pm(parts: &[&str]) -> Result<ServerMessage> {
    if parts.len() < 5 {
        return Err(ParseError::MissingField("pm fields".to_string()).into());
    }

    Ok(ServerMessage::Pm {
        sender: strip_rank(parts[2]),
        receiver: strip_rank(parts[3]),
        message: parts[4..].join("|"),
    })
}

/// |formats|FORMATSLIST
///
/// Sections open with ",COLUMN" followed by the section name. Format entries
/// carry a ",HEX" display flag suffix which is dropped here.
pub fn parse_formats(parts: &[&str]) -> Result<ServerMessage> {
    let mut formats = Vec::new();
    let mut expect_section_name = false;

    for part in parts.iter().skip(2) {
        if part.is_empty() {
            continue;
        }

        if let Some(column) = part.strip_prefix(',') {
            expect_section_name = column.parse::<u32>().is_ok();
            continue;
        }

        if expect_section_name {
            expect_section_name = false;
            continue;
        }

        let name = part.rsplit_once(',').map_or(*part, |(name, _)| name);
        formats.push(name.to_string());
    }

    Ok(ServerMessage::Formats(formats))
}

pub fn parse_updatesearch(parts: &[&str]) -> Result<ServerMessage> {
    if parts.len() < 3 {
        return Err(ParseError::MissingField("updatesearch json".to_string()).into());
    }

    // JSON can contain | characters
    let json_str = parts[2..].join("|");
    let state: SearchState = serde_json::from_str(&json_str)
        .map_err(|e| ParseError::InvalidFormat(format!("invalid updatesearch json: {}", e)))?;

    Ok(ServerMessage::UpdateSearch(state))
}
