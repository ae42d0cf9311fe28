//! Non-volatile status conditions

use serde::{Deserialize, Serialize};

/// Non-volatile status, plus the fainted marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "brn")]
    Burn,
    #[serde(rename = "frz")]
    Freeze,
    #[serde(rename = "par")]
    Paralysis,
    #[serde(rename = "psn")]
    Poison,
    #[serde(rename = "tox")]
    Toxic,
    #[serde(rename = "slp")]
    Sleep,
    #[serde(rename = "fnt")]
    Fainted,
}

impl Status {
    /// Parse from protocol string ("brn", "frz", "par", "psn", "tox", "slp", "fnt")
    pub fn from_protocol(s: &str) -> Option<Self> {
        match s {
            "brn" => Some(Status::Burn),
            "frz" => Some(Status::Freeze),
            "par" => Some(Status::Paralysis),
            "psn" => Some(Status::Poison),
            "tox" => Some(Status::Toxic),
            "slp" => Some(Status::Sleep),
            "fnt" => Some(Status::Fainted),
            _ => None,
        }
    }

    pub fn to_protocol(&self) -> &'static str {
        match self {
            Status::Burn => "brn",
            Status::Freeze => "frz",
            Status::Paralysis => "par",
            Status::Poison => "psn",
            Status::Toxic => "tox",
            Status::Sleep => "slp",
            Status::Fainted => "fnt",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_protocol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_names() {
        assert_eq!(Status::from_protocol("tox"), Some(Status::Toxic));
        assert_eq!(Status::from_protocol("fnt"), Some(Status::Fainted));
        assert_eq!(Status::from_protocol(""), None);
        assert_eq!(Status::Paralysis.to_string(), "par");
    }

    #[test]
    fn test_serializes_as_protocol_name() {
        let json = serde_json::to_string(&Status::Sleep).unwrap();
        assert_eq!(json, "\"slp\"");
    }
}
