//! Which slots a move can address.
//!
//! Slots are signed: our side counts -1, -2, -3 and the opponent's side
//! counts 1, 2, 3. Position 1 on one side faces position `max` on the other.

use seer_protocol::GameType;

use crate::error::{EngineError, Result};

/// Target classes that require an explicit target slot
const AIMED: &[&str] = &["adjacentAlly", "adjacentAllyOrSelf", "any", "normal", "adjacentFoe"];

/// Target classes resolved by the server without a target slot
const UNAIMED: &[&str] = &[
    "self",
    "all",
    "allAdjacent",
    "allAdjacentFoes",
    "allies",
    "allySide",
    "allyTeam",
    "foeSide",
    "randomNormal",
    "scripted",
];

/// Whether a move with this target class must be given a target slot.
/// Moves sent without a class (Struggle, locked moves) never are.
pub fn needs_target(target: Option<&str>) -> Result<bool> {
    match target {
        None => Ok(false),
        Some(target) if AIMED.contains(&target) => Ok(true),
        Some(target) if UNAIMED.contains(&target) => Ok(false),
        Some(other) => Err(EngineError::UnknownMoveTarget(other.to_string())),
    }
}

/// Whether `source` can aim a move of class `target` at `candidate`
pub fn can_target_slot(source: i32, candidate: i32, target: &str, game_type: GameType) -> Result<bool> {
    if UNAIMED.contains(&target) {
        return Ok(false);
    }

    let max = if game_type == GameType::Doubles { 2 } else { 3 };
    let facing = (source.abs() - max - 1).abs();

    let is_self = source == candidate;
    let same_side = source * candidate > 0;
    let opposite_side = source * candidate < 0;

    let adjacent_ally = same_side && (source - candidate).abs() == 1;
    let adjacent_foe = opposite_side && facing == candidate.abs();
    let corner_foe = opposite_side && (facing - candidate.abs()).abs() == 1;

    match target {
        "adjacentAlly" => Ok(adjacent_ally),
        "adjacentAllyOrSelf" => Ok(adjacent_ally || is_self),
        "any" => Ok(!is_self),
        "normal" => Ok(adjacent_ally || adjacent_foe || corner_foe),
        "adjacentFoe" => Ok(adjacent_foe || corner_foe),
        other => Err(EngineError::UnknownMoveTarget(other.to_string())),
    }
}

/// Subset of `filled` that `source` can target
pub fn valid_target_slots(
    source: i32,
    filled: &[i32],
    target: &str,
    game_type: GameType,
) -> Result<Vec<i32>> {
    let mut slots = Vec::new();
    for &candidate in filled {
        if can_target_slot(source, candidate, target, game_type)? {
            slots.push(candidate);
        }
    }
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_target() {
        assert_eq!(needs_target(Some("normal")), Ok(true));
        assert_eq!(needs_target(Some("adjacentAllyOrSelf")), Ok(true));
        assert_eq!(needs_target(Some("allAdjacentFoes")), Ok(false));
        assert_eq!(needs_target(Some("self")), Ok(false));
        assert_eq!(needs_target(None), Ok(false));
        assert!(needs_target(Some("everywhere")).is_err());
    }

    #[test]
    fn test_doubles_corner_and_ally() {
        let doubles = GameType::Doubles;

        assert!(can_target_slot(-1, 2, "normal", doubles).unwrap());
        assert!(can_target_slot(-1, 1, "normal", doubles).unwrap());
        assert!(can_target_slot(-1, -2, "adjacentAlly", doubles).unwrap());
        assert!(!can_target_slot(-1, -2, "adjacentFoe", doubles).unwrap());
        assert!(!can_target_slot(-1, -1, "adjacentAlly", doubles).unwrap());
        assert!(can_target_slot(-1, -1, "adjacentAllyOrSelf", doubles).unwrap());
    }

    #[test]
    fn test_triples_reach() {
        let triples = GameType::Triples;

        // -1 faces 3, with 2 on the corner; 1 is out of reach
        assert!(can_target_slot(-1, 3, "normal", triples).unwrap());
        assert!(can_target_slot(-1, 2, "normal", triples).unwrap());
        assert!(!can_target_slot(-1, 1, "normal", triples).unwrap());
        assert!(can_target_slot(-1, 1, "any", triples).unwrap());

        // The centre reaches every foe
        for foe in 1..=3 {
            assert!(can_target_slot(-2, foe, "adjacentFoe", triples).unwrap());
        }
        assert!(!can_target_slot(-1, -3, "adjacentAlly", triples).unwrap());
    }

    #[test]
    fn test_valid_target_slots() {
        let filled = [-1, -2, 1, 2];
        let slots = valid_target_slots(-1, &filled, "normal", GameType::Doubles).unwrap();
        assert_eq!(slots, vec![-2, 1, 2]);

        let slots = valid_target_slots(-2, &filled, "adjacentFoe", GameType::Doubles).unwrap();
        assert_eq!(slots, vec![1, 2]);

        let slots = valid_target_slots(-1, &filled, "self", GameType::Doubles).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_unknown_target_class() {
        assert_eq!(
            can_target_slot(-1, 1, "everywhere", GameType::Doubles),
            Err(EngineError::UnknownMoveTarget("everywhere".into()))
        );
    }
}
