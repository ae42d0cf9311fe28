//! Why a battle or a whole connection stopped

use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationCode {
    /// The configured number of battles finished
    ObjectiveComplete,
    /// A submitted action had the wrong shape for the decision point
    InvalidChoice,
    /// Login or handshake failed
    SetupError,
    /// The websocket failed or closed
    ConnectionError,
    /// The battle engine hit an inconsistency
    ProcessorError,
    /// The caller sent quit
    UserShutdown,
    OtherError,
}

impl TerminationCode {
    /// Codes that end the whole connection rather than one battle
    pub fn is_connection_fatal(self) -> bool {
        !matches!(self, Self::InvalidChoice | Self::ProcessorError)
    }
}

impl fmt::Display for TerminationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ObjectiveComplete => "objective complete",
            Self::InvalidChoice => "invalid choice",
            Self::SetupError => "setup error",
            Self::ConnectionError => "connection error",
            Self::ProcessorError => "processor error",
            Self::UserShutdown => "user shutdown",
            Self::OtherError => "other error",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{code}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct ConnectionTermination {
    pub code: TerminationCode,
    pub message: Option<String>,
}

impl ConnectionTermination {
    pub fn new(code: TerminationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    pub fn code_only(code: TerminationCode) -> Self {
        Self {
            code,
            message: None,
        }
    }
}
