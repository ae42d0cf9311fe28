//! BattleEngine - per-battle line processing

use std::collections::HashMap;
use std::sync::OnceLock;

use seer_protocol::{MessageKind, ServerLine, ServerMessage};

use super::record::BattleRecord;
use super::signal::ProgressSignal;
use super::state::BattleState;
use crate::choice::Action;
use crate::error::{EngineError, Result};

/// A handler mutates the engine for one message kind
pub(super) type Handler = fn(&mut BattleEngine, &ServerMessage) -> Result<ProgressSignal>;

/// Reconstructs one battle from its server lines.
///
/// The engine is created before the battle's `|init|` arrives; everything
/// except `init` requires the record to exist.
#[derive(Debug, Clone)]
pub struct BattleEngine {
    battle_id: String,
    username: String,
    record: Option<BattleRecord>,
    /// Raw lines, submitted actions and `#` bookkeeping notes
    log: Vec<String>,
}

impl BattleEngine {
    pub fn new(battle_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            battle_id: battle_id.into(),
            username: username.into(),
            record: None,
            log: Vec::new(),
        }
    }

    pub fn battle_id(&self) -> &str {
        &self.battle_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn record(&self) -> Option<&BattleRecord> {
        self.record.as_ref()
    }

    /// The snapshot decisions are currently made against
    pub fn state(&self) -> Option<&BattleState> {
        self.record.as_ref().map(BattleRecord::current_state)
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn is_finished(&self) -> bool {
        self.record.as_ref().is_some_and(|record| record.finalized)
    }

    /// Apply one server line and report what the caller must do next.
    ///
    /// Lines reaching a finalized battle are logged and otherwise ignored.
    pub fn process(&mut self, line: &ServerLine) -> Result<ProgressSignal> {
        self.log.push(line.text.clone());
        if self.is_finished() {
            return Ok(ProgressSignal::NoAction);
        }

        let handler = handlers()
            .get(&line.kind())
            .copied()
            .unwrap_or(BattleEngine::on_unhandled);
        handler(self, &line.message)
    }

    /// Record a submitted action and open the next snapshot
    pub fn record_action(&mut self, action: &Action) -> Result<()> {
        let payload = action.to_string();
        self.record_mut()?.record_action(action.clone());
        self.log.push(payload);
        Ok(())
    }

    /// Stop accepting lines, e.g. after an unrecoverable error
    pub fn finalize(&mut self) {
        if let Some(record) = self.record.as_mut() {
            record.finalize();
        }
    }

    pub(super) fn record_mut(&mut self) -> Result<&mut BattleRecord> {
        self.record.as_mut().ok_or(EngineError::NotInitialized)
    }

    pub(super) fn start_record(&mut self) {
        if self.record.is_none() {
            self.record = Some(BattleRecord::new(&self.battle_id, &self.username));
        }
    }

    /// Append a `#` bookkeeping note to the diagnostic log
    pub(super) fn note(&mut self, text: String) {
        tracing::trace!(battle_id = %self.battle_id, "{}", text);
        self.log.push(format!("# {text}"));
    }

    fn on_unhandled(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        tracing::debug!(battle_id = %self.battle_id, kind = ?message.kind(), "no handler for message");
        Ok(ProgressSignal::NoAction)
    }
}

fn handlers() -> &'static HashMap<MessageKind, Handler> {
    static HANDLERS: OnceLock<HashMap<MessageKind, Handler>> = OnceLock::new();
    HANDLERS.get_or_init(|| {
        let table: [(MessageKind, Handler); 45] = [
            // === Setup ===
            (MessageKind::Init, BattleEngine::on_init),
            (MessageKind::Player, BattleEngine::on_player),
            (MessageKind::TeamSize, BattleEngine::on_teamsize),
            (MessageKind::GameType, BattleEngine::on_gametype),
            (MessageKind::Gen, BattleEngine::on_gen),
            (MessageKind::Tier, BattleEngine::on_tier),
            (MessageKind::Rated, BattleEngine::on_rated),
            (MessageKind::Poke, BattleEngine::on_poke),
            (MessageKind::TeamPreview, BattleEngine::on_teampreview),
            // === Progress ===
            (MessageKind::Request, BattleEngine::on_request),
            (MessageKind::Turn, BattleEngine::on_turn),
            (MessageKind::Win, BattleEngine::on_win),
            (MessageKind::Tie, BattleEngine::on_tie),
            (MessageKind::Expire, BattleEngine::on_expire),
            (MessageKind::Error, BattleEngine::on_error),
            (MessageKind::BigError, BattleEngine::on_bigerror),
            // === Slots and identity ===
            (MessageKind::Switch, BattleEngine::on_switch),
            (MessageKind::Drag, BattleEngine::on_switch),
            (MessageKind::DetailsChange, BattleEngine::on_detailschange),
            (MessageKind::Replace, BattleEngine::on_replace),
            (MessageKind::Swap, BattleEngine::on_swap),
            (MessageKind::Faint, BattleEngine::on_faint),
            // === Observed information ===
            (MessageKind::Move, BattleEngine::on_move),
            (MessageKind::Damage, BattleEngine::on_hp_change),
            (MessageKind::Heal, BattleEngine::on_hp_change),
            (MessageKind::SetHp, BattleEngine::on_hp_change),
            (MessageKind::Status, BattleEngine::on_status),
            (MessageKind::CureStatus, BattleEngine::on_curestatus),
            (MessageKind::CureTeam, BattleEngine::on_cureteam),
            (MessageKind::Boost, BattleEngine::on_boost),
            (MessageKind::Unboost, BattleEngine::on_boost),
            (MessageKind::SetBoost, BattleEngine::on_boost),
            (MessageKind::ClearBoost, BattleEngine::on_clearboost),
            (MessageKind::ClearAllBoost, BattleEngine::on_clearallboost),
            (MessageKind::Weather, BattleEngine::on_weather),
            (MessageKind::VolatileStart, BattleEngine::on_volatile),
            (MessageKind::VolatileEnd, BattleEngine::on_volatile),
            (MessageKind::Item, BattleEngine::on_item),
            (MessageKind::EndItem, BattleEngine::on_item),
            (MessageKind::Ability, BattleEngine::on_ability),
            (MessageKind::Mega, BattleEngine::on_mega),
            (MessageKind::ZPower, BattleEngine::on_zpower),
            (MessageKind::Terastallize, BattleEngine::on_terastallize),
            (MessageKind::Upkeep, BattleEngine::on_unhandled),
            (MessageKind::Raw, BattleEngine::on_unhandled),
        ];
        table.into_iter().collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::TeamChoice;
    use crate::tracking::fixtures::{feed, line, started_singles};

    #[test]
    fn test_events_before_init_fail() {
        let mut engine = BattleEngine::new("battle-gen9ou-1", "sagebot");
        let result = engine.process(&line("|gametype|doubles"));
        assert_eq!(result, Err(EngineError::NotInitialized));
    }

    #[test]
    fn test_unknown_lines_are_absorbed() {
        let mut engine = started_singles();
        let signal = engine.process(&line("|-fieldactivate|move: Pay Day")).unwrap();
        assert_eq!(signal, ProgressSignal::NoAction);

        let signal = engine.process(&line("just some text")).unwrap();
        assert_eq!(signal, ProgressSignal::NoAction);
    }

    #[test]
    fn test_log_keeps_lines_and_actions() {
        let mut engine = BattleEngine::new("battle-gen9ou-1", "sagebot");
        engine.process(&line("|init|battle")).unwrap();
        engine
            .record_action(&Action::Team(TeamChoice::natural(3)))
            .unwrap();

        assert_eq!(engine.log(), ["|init|battle", "team 123"]);
        assert_eq!(engine.record().unwrap().states.len(), 2);
    }

    #[test]
    fn test_finalized_battle_ignores_lines() {
        let mut engine = started_singles();
        assert_eq!(
            engine.process(&line("|win|sagebot")).unwrap(),
            ProgressSignal::GameEnd
        );
        assert!(engine.is_finished());

        let signal = engine.process(&line("|turn|9")).unwrap();
        assert_eq!(signal, ProgressSignal::NoAction);
        assert_eq!(engine.record().unwrap().turn, 0);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let lines = [
            "|init|battle",
            "|player|p1|sagebot|1|1500",
            "|player|p2|rival|2|1480",
            "|gametype|singles",
            "|poke|p2|Garchomp, L80, M|item",
            "|switch|p2a: Chompy|Garchomp, L80, M|100/100",
            "|-damage|p2a: Chompy|64/100",
            "|-boost|p2a: Chompy|atk|2",
            "|turn|1",
        ];

        let mut first = BattleEngine::new("battle-gen9ou-1", "sagebot");
        let mut second = first.clone();
        feed(&mut first, &lines);
        feed(&mut second, &lines);

        let first = serde_json::to_string(first.record().unwrap()).unwrap();
        let second = serde_json::to_string(second.record().unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
