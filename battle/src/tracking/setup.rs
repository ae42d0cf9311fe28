//! Battle setup and outcome handlers

use seer_protocol::{GameType, ServerMessage};

use super::engine::BattleEngine;
use super::record::normalize_format;
use super::signal::ProgressSignal;
use super::state::Side;
use crate::error::{EngineError, Result};
use crate::types::PokemonRecord;

impl BattleEngine {
    pub(super) fn on_init(&mut self, _message: &ServerMessage) -> Result<ProgressSignal> {
        self.start_record();
        Ok(ProgressSignal::NoAction)
    }

    pub(super) fn on_player(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::BattlePlayer {
            player,
            username,
            rating,
            ..
        } = message
        else {
            return Ok(ProgressSignal::NoAction);
        };

        // Sent with an empty name when a player leaves the room
        if username.is_empty() {
            return Ok(ProgressSignal::NoAction);
        }

        let own = crate::to_id(username) == crate::to_id(self.username());
        let record = self.record_mut()?;
        if own {
            record.player_id = Some(*player);
            record.player_rating = *rating;
        } else {
            record.opponent_name = Some(username.clone());
            record.opponent_id = Some(*player);
            record.opponent_rating = *rating;
        }
        Ok(ProgressSignal::NoAction)
    }

    pub(super) fn on_teamsize(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::TeamSize { player, size } = message else {
            return Ok(ProgressSignal::NoAction);
        };

        let record = self.record_mut()?;
        match record.side_of(*player)? {
            Side::Player => record.player_team_size = Some(*size),
            Side::Opponent => record.opponent_team_size = Some(*size),
        }
        Ok(ProgressSignal::NoAction)
    }

    pub(super) fn on_gametype(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::GameType(game_type) = message else {
            return Ok(ProgressSignal::NoAction);
        };

        if matches!(game_type, GameType::Multi | GameType::FreeForAll) {
            return Err(EngineError::UnsupportedGameType(format!("{game_type:?}")));
        }

        let record = self.record_mut()?;
        record.gametype = Some(*game_type);
        record
            .current_state_mut()
            .set_slot_count(game_type.slot_count());
        Ok(ProgressSignal::NoAction)
    }

    pub(super) fn on_gen(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        if let ServerMessage::Gen(generation) = message {
            self.record_mut()?.generation = Some(*generation);
        }
        Ok(ProgressSignal::NoAction)
    }

    pub(super) fn on_tier(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        if let ServerMessage::Tier(tier) = message {
            self.record_mut()?.format = Some(normalize_format(tier));
        }
        Ok(ProgressSignal::NoAction)
    }

    pub(super) fn on_rated(&mut self, _message: &ServerMessage) -> Result<ProgressSignal> {
        self.record_mut()?.rated = true;
        Ok(ProgressSignal::NoAction)
    }

    /// Team preview entry. Only the opponent's are kept: our request is
    /// authoritative for our own side.
    pub(super) fn on_poke(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::Poke {
            player,
            details,
            has_item,
        } = message
        else {
            return Ok(ProgressSignal::NoAction);
        };

        let record = self.record_mut()?;
        if record.side_of(*player)? == Side::Player {
            return Ok(ProgressSignal::NoAction);
        }

        let mut pokemon = PokemonRecord::observed(*player, details, None);
        if *has_item {
            pokemon.has_item = Some(true);
        }
        let key = pokemon.base_key();

        let side = &mut record.current_state_mut().opponent;
        if side.roster.contains_key(&key) {
            if !side.ambiguous_bases.contains(&key) {
                side.ambiguous_bases.push(key);
            }
        } else {
            side.roster.insert(key, pokemon);
        }
        Ok(ProgressSignal::NoAction)
    }

    pub(super) fn on_teampreview(&mut self, _message: &ServerMessage) -> Result<ProgressSignal> {
        self.record_mut()?;
        Ok(ProgressSignal::TeamOrder)
    }

    // === Outcome ===

    pub(super) fn on_win(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::Win(winner) = message else {
            return Ok(ProgressSignal::NoAction);
        };

        let victory = crate::to_id(winner) == crate::to_id(self.username());
        self.finish(victory)
    }

    pub(super) fn on_tie(&mut self, _message: &ServerMessage) -> Result<ProgressSignal> {
        self.finish(false)
    }

    pub(super) fn on_expire(&mut self, _message: &ServerMessage) -> Result<ProgressSignal> {
        self.finish(false)
    }

    pub(super) fn on_error(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let text = match message {
            ServerMessage::Error(text) => text.clone(),
            _ => String::new(),
        };
        Err(EngineError::ServerError(text))
    }

    pub(super) fn on_bigerror(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let text = match message {
            ServerMessage::BigError(text) => text.clone(),
            _ => String::new(),
        };
        Err(EngineError::ServerBigError(text))
    }

    fn finish(&mut self, victory: bool) -> Result<ProgressSignal> {
        let record = self.record_mut()?;
        record.player_victory = Some(victory);
        record.finalize();
        Ok(ProgressSignal::GameEnd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::fixtures::{feed, line, started_singles};
    use seer_protocol::Player;

    #[test]
    fn test_player_lines_fill_both_sides() {
        let mut engine = BattleEngine::new("battle-gen9ou-1", "Sage Bot");
        feed(
            &mut engine,
            &[
                "|init|battle",
                "|player|p1|rival|2|1480",
                "|player|p2|sagebot|1|1500",
                "|teamsize|p1|6",
                "|teamsize|p2|3",
                "|rated|",
            ],
        );

        let record = engine.record().unwrap();
        assert_eq!(record.player_id, Some(Player::P2));
        assert_eq!(record.player_rating, Some(1500));
        assert_eq!(record.opponent_name.as_deref(), Some("rival"));
        assert_eq!(record.opponent_id, Some(Player::P1));
        assert_eq!(record.opponent_rating, Some(1480));
        assert_eq!(record.player_team_size, Some(3));
        assert_eq!(record.opponent_team_size, Some(6));
        assert!(record.rated);
    }

    #[test]
    fn test_gametype_sizes_slot_tables() {
        let mut engine = BattleEngine::new("battle-gen9ou-1", "sagebot");
        feed(&mut engine, &["|init|battle", "|gametype|triples"]);

        let state = engine.state().unwrap();
        assert_eq!(state.player.slot_count(), 3);
        assert_eq!(state.opponent.slot_count(), 3);
    }

    #[test]
    fn test_free_for_all_is_unsupported() {
        let mut engine = BattleEngine::new("battle-gen9ffa-1", "sagebot");
        feed(&mut engine, &["|init|battle"]);
        let result = engine.process(&line("|gametype|freeforall"));
        assert!(matches!(result, Err(EngineError::UnsupportedGameType(_))));
    }

    #[test]
    fn test_format_and_generation() {
        let engine = started_singles();
        let record = engine.record().unwrap();
        assert_eq!(record.format.as_deref(), Some("gen9ou"));
        assert_eq!(record.generation, Some(9));
    }

    #[test]
    fn test_poke_creates_opponent_base_records() {
        let mut engine = started_singles();
        feed(
            &mut engine,
            &[
                "|poke|p1|Pikachu, L50, M|item",
                "|poke|p2|Urshifu-*, L80, M|item",
                "|poke|p2|Ditto|",
            ],
        );

        let state = engine.state().unwrap();
        assert!(state.player.roster.is_empty());
        assert_eq!(state.opponent.roster.len(), 2);

        let urshifu = state.opponent.get("p2_Urshifu_80_M_None").unwrap();
        assert_eq!(urshifu.has_item, Some(true));
        assert_eq!(urshifu.nickname, None);
        assert!(state.opponent.get("p2_Ditto_100_None_None").is_some());
    }

    #[test]
    fn test_duplicate_poke_marks_base_ambiguous() {
        let mut engine = started_singles();
        feed(
            &mut engine,
            &["|poke|p2|Zoroark, L80, F|", "|poke|p2|Zoroark, L80, F|"],
        );

        let side = &engine.state().unwrap().opponent;
        assert_eq!(side.ambiguous_bases, vec!["p2_Zoroark_80_F_None".to_string()]);
    }

    #[test]
    fn test_teampreview_signal() {
        let mut engine = started_singles();
        let signal = engine.process(&line("|teampreview|6")).unwrap();
        assert_eq!(signal, ProgressSignal::TeamOrder);
    }

    #[test]
    fn test_win_and_tie_finalize() {
        let mut engine = started_singles();
        assert_eq!(
            engine.process(&line("|win|rival")).unwrap(),
            ProgressSignal::GameEnd
        );
        let record = engine.record().unwrap();
        assert_eq!(record.player_victory, Some(false));
        assert!(record.finalized);

        let mut engine = started_singles();
        engine.process(&line("|tie")).unwrap();
        assert_eq!(engine.record().unwrap().player_victory, Some(false));
    }

    #[test]
    fn test_server_errors_are_fatal() {
        let mut engine = started_singles();
        assert_eq!(
            engine.process(&line("|error|[Invalid choice] There's nothing to choose")),
            Err(EngineError::ServerError(
                "[Invalid choice] There's nothing to choose".into()
            ))
        );
        assert!(matches!(
            engine.process(&line("|bigerror|Room does not exist")),
            Err(EngineError::ServerBigError(_))
        ));
    }
}
