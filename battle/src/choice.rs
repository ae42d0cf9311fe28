//! Legal choice sets and the actions submitted in reply
//!
//! `Display` renders the `/choose` payload the server expects.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Order to bring the team in, as 1-based team positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamChoice {
    pub order: Vec<usize>,
}

impl TeamChoice {
    /// Natural order 1..=size
    pub fn natural(size: usize) -> Self {
        Self {
            order: (1..=size).collect(),
        }
    }
}

impl Display for TeamChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.order.len() >= 10 { "," } else { "" };
        let order = self
            .order
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(separator);
        write!(f, "team {order}")
    }
}

/// A choice to use a move
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveChoice {
    /// 1-based move position
    pub move_number: usize,
    /// Target class from the request, None when the move cannot be aimed
    pub target_type: Option<String>,
    /// Signed target slot: negative for our side, positive for the opponent
    pub target: Option<i32>,
    pub tera: bool,
    pub mega: bool,
    pub dyna: bool,
    pub zmove: bool,
}

impl MoveChoice {
    pub fn new(move_number: usize, target_type: Option<String>) -> Self {
        Self {
            move_number,
            target_type,
            ..Default::default()
        }
    }
}

impl Display for MoveChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "move {}", self.move_number)?;
        if let Some(target) = self.target {
            write!(f, " {target}")?;
        }
        if self.tera {
            write!(f, " terastallize")?;
        }
        if self.mega {
            write!(f, " mega")?;
        }
        if self.dyna {
            write!(f, " dynamax")?;
        }
        if self.zmove {
            write!(f, " zmove")?;
        }
        Ok(())
    }
}

/// A choice to switch to the pokemon at a 1-based team position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchChoice {
    pub slot: usize,
}

impl Display for SwitchChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "switch {}", self.slot)
    }
}

/// A choice to use a bag item. Showdown has no such command, so these are
/// never enumerated and are refused at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemChoice {
    pub item: String,
    pub target: Option<i32>,
}

impl Display for ItemChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item {}", self.item)?;
        if let Some(target) = self.target {
            write!(f, " {target}")?;
        }
        Ok(())
    }
}

/// What one slot does this turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotChoice {
    Move(MoveChoice),
    Switch(SwitchChoice),
    Item(ItemChoice),
    Pass,
}

impl Display for SlotChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(choice) => choice.fmt(f),
            Self::Switch(choice) => choice.fmt(f),
            Self::Item(choice) => choice.fmt(f),
            Self::Pass => write!(f, "pass"),
        }
    }
}

/// Legal choices for one slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotOptions {
    Options(Vec<SlotChoice>),
    Pass,
}

impl SlotOptions {
    /// Options for this slot; a pass placeholder offers only [`SlotChoice::Pass`]
    pub fn choices(&self) -> Vec<SlotChoice> {
        match self {
            Self::Options(options) => options.clone(),
            Self::Pass => vec![SlotChoice::Pass],
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// The currently legal choice set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleChoice {
    TeamOrder(TeamChoice),
    Slots(Vec<SlotOptions>),
}

impl BattleChoice {
    pub fn slots(&self) -> Option<&[SlotOptions]> {
        match self {
            Self::Slots(slots) => Some(slots),
            Self::TeamOrder(_) => None,
        }
    }
}

/// An action submitted in reply to a decision point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Team(TeamChoice),
    Slots(Vec<SlotChoice>),
    /// Forfeit this battle only
    Resign,
    /// Forfeit everything and close the connection
    Quit,
    /// Let the server pick the first legal option
    Default,
}

impl Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Team(choice) => choice.fmt(f),
            Self::Slots(choices) => {
                for (index, choice) in choices.iter().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }
                    choice.fmt(f)?;
                }
                Ok(())
            }
            Self::Resign | Self::Quit => write!(f, "forfeit"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_order_payload() {
        assert_eq!(TeamChoice::natural(6).to_string(), "team 123456");

        let large = TeamChoice::natural(10);
        assert_eq!(large.to_string(), "team 1,2,3,4,5,6,7,8,9,10");
    }

    #[test]
    fn test_move_payload() {
        let mut choice = MoveChoice::new(2, Some("normal".into()));
        assert_eq!(choice.to_string(), "move 2");

        choice.target = Some(-1);
        choice.tera = true;
        assert_eq!(choice.to_string(), "move 2 -1 terastallize");

        let zmove = MoveChoice {
            move_number: 1,
            zmove: true,
            ..Default::default()
        };
        assert_eq!(zmove.to_string(), "move 1 zmove");
    }

    #[test]
    fn test_multi_slot_payload() {
        let action = Action::Slots(vec![
            SlotChoice::Move(MoveChoice {
                move_number: 1,
                target: Some(2),
                dyna: true,
                ..Default::default()
            }),
            SlotChoice::Switch(SwitchChoice { slot: 4 }),
            SlotChoice::Pass,
        ]);

        assert_eq!(action.to_string(), "move 1 2 dynamax,switch 4,pass");
    }

    #[test]
    fn test_terminal_payloads() {
        assert_eq!(Action::Resign.to_string(), "forfeit");
        assert_eq!(Action::Quit.to_string(), "forfeit");
        assert_eq!(Action::Default.to_string(), "default");
    }

    #[test]
    fn test_pass_placeholder_offers_pass() {
        assert_eq!(SlotOptions::Pass.choices(), vec![SlotChoice::Pass]);
        assert!(SlotOptions::Pass.is_pass());
    }
}
