//! Request and turn handlers: legal choice enumeration
//!
//! A request lists everything about our side and what we may do. Moves
//! that need a target are enumerated without one; targets depend on which
//! slots are filled once the turn actually starts, so they are expanded on
//! `|turn|`.

use seer_protocol::{
    ActivePokemon, BattleRequest, GameType, Player, RequestKind, ServerMessage, SideInfo,
};

use super::engine::BattleEngine;
use super::signal::ProgressSignal;
use super::state::BattleState;
use crate::choice::{BattleChoice, MoveChoice, SlotChoice, SlotOptions, SwitchChoice, TeamChoice};
use crate::error::{EngineError, Result};
use crate::targeting::{needs_target, valid_target_slots};
use crate::types::{
    HpKind, MoveCandidate, PokemonRecord, SideState, StatBlock, Status, base_species, identity_key,
};

impl BattleEngine {
    pub(super) fn on_request(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::Request(request) = message else {
            return Ok(ProgressSignal::NoAction);
        };

        if crate::to_id(&request.side.name) != crate::to_id(self.username()) {
            return Err(EngineError::ForeignRequest {
                expected: self.username().to_string(),
                found: request.side.name.clone(),
            });
        }

        let record = self.record_mut()?;
        let player = match record.player_id {
            Some(player) => player,
            None => {
                let player = request.side.player().ok_or(EngineError::PlayerUnknown)?;
                record.player_id = Some(player);
                player
            }
        };
        let slot_count = record.slot_count();

        let state = record.current_state_mut();
        sync_own_roster(&mut state.player, player, &request.side);

        let kind = request.kind();
        state.battle_choice = match kind {
            RequestKind::Wait => None,
            RequestKind::TeamPreview => Some(BattleChoice::TeamOrder(TeamChoice::natural(
                request.side.pokemon.len(),
            ))),
            RequestKind::ForceSwitch => Some(BattleChoice::Slots(forced_switches(
                request, slot_count,
            ))),
            RequestKind::Active => Some(BattleChoice::Slots(turn_options(
                request,
                &state.player,
                slot_count,
            ))),
        };

        Ok(match kind {
            RequestKind::ForceSwitch => ProgressSignal::Switch,
            _ => ProgressSignal::NoAction,
        })
    }

    /// `|turn|`: resolve move targets against the slots filled now
    pub(super) fn on_turn(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::Turn(turn) = message else {
            return Ok(ProgressSignal::NoAction);
        };

        let record = self.record_mut()?;
        record.turn = *turn;
        let game_type = record.gametype;
        let state = record.current_state_mut();
        state.turn = *turn;

        let expanded = match &state.battle_choice {
            Some(BattleChoice::Slots(slots)) => {
                let game_type = game_type.ok_or(EngineError::GameTypeUnset)?;
                if game_type == GameType::Singles {
                    None
                } else {
                    Some(expand_targets(state, slots, game_type)?)
                }
            }
            _ => None,
        };
        if let Some(slots) = expanded {
            state.battle_choice = Some(BattleChoice::Slots(slots));
        }

        Ok(ProgressSignal::Move)
    }
}

/// Refresh our roster from the request, which discloses everything exactly
fn sync_own_roster(side: &mut SideState, player: Player, info: &SideInfo) {
    for (index, mon) in info.pokemon.iter().enumerate() {
        let details = mon.parsed_details();
        let nickname = mon.nickname().to_string();
        let key = identity_key(
            player,
            &base_species(&details.species),
            details.level.unwrap_or(100),
            details.gender,
            Some(&nickname),
        );
        let entry = side
            .roster
            .entry(key)
            .or_insert_with(|| PokemonRecord::observed(player, &details, Some(nickname)));
        entry.set_species(&details.species);

        let (current, max) = mon.hp();
        entry.hp_kind = HpKind::Exact;
        entry.current_hp = Some(current);
        if max.is_some() {
            entry.max_hp = max;
        }
        entry.stats = StatBlock::exact(&mon.stats, entry.max_hp);
        entry.team_pos = Some(index + 1);

        if mon.item.is_empty() {
            entry.lose_item();
        } else {
            entry.reveal_item(&mon.item);
        }
        if !mon.base_ability.is_empty() {
            entry.reveal_ability(&mon.base_ability, false);
        }
        let ability = crate::to_id(&mon.ability);
        entry.overwritten_ability = (!ability.is_empty()
            && ability != crate::to_id(&mon.base_ability))
        .then_some(ability);

        let moves = mon
            .moves
            .iter()
            .map(|name| {
                let name = crate::to_id(name);
                let use_count = entry
                    .moves
                    .iter()
                    .find(|known| known.name == name)
                    .map_or(0, |known| known.use_count);
                MoveCandidate {
                    name,
                    probability: 1.0,
                    use_count,
                }
            })
            .collect();
        entry.moves = moves;

        entry.status = if mon.is_fainted() {
            Some(Status::Fainted)
        } else {
            mon.status().and_then(Status::from_protocol)
        };
        entry.tera_type = mon.tera_type.clone();
        entry.is_tera = mon.is_terastallized();
        entry.active = mon.active && !mon.is_fainted();
        entry.is_reviving = mon.reviving;
    }
}

/// Healthy benched pokemon, by 1-based team position
fn bench_switches(info: &SideInfo) -> Vec<SlotChoice> {
    info.pokemon
        .iter()
        .enumerate()
        .filter(|(_, mon)| !mon.active && !mon.is_fainted())
        .map(|(index, _)| SlotChoice::Switch(SwitchChoice { slot: index + 1 }))
        .collect()
}

/// Fainted pokemon that Revival Blessing can bring back
fn revival_switches(info: &SideInfo) -> Vec<SlotChoice> {
    info.pokemon
        .iter()
        .enumerate()
        .filter(|(_, mon)| mon.is_fainted())
        .map(|(index, _)| SlotChoice::Switch(SwitchChoice { slot: index + 1 }))
        .collect()
}

fn forced_switches(request: &BattleRequest, slot_count: usize) -> Vec<SlotOptions> {
    (0..slot_count)
        .map(|index| {
            if !request.must_switch(index) {
                return SlotOptions::Pass;
            }
            let reviving = request
                .side
                .pokemon
                .get(index)
                .is_some_and(|mon| mon.reviving);
            if reviving {
                SlotOptions::Options(revival_switches(&request.side))
            } else {
                SlotOptions::Options(bench_switches(&request.side))
            }
        })
        .collect()
}

fn turn_options(request: &BattleRequest, side: &SideState, slot_count: usize) -> Vec<SlotOptions> {
    let active = request.active.as_deref().unwrap_or_default();
    (0..slot_count)
        .map(|index| {
            let Some(slot) = active.get(index) else {
                return SlotOptions::Pass;
            };
            let fainted = request
                .side
                .pokemon
                .get(index)
                .is_some_and(|mon| mon.is_fainted());
            if fainted {
                return SlotOptions::Pass;
            }

            let mut options = move_options(slot, side);
            if !slot.trapped {
                options.extend(bench_switches(&request.side));
            }
            SlotOptions::Options(options)
        })
        .collect()
}

/// Usable moves, each followed by the one-time variants still available
fn move_options(active: &ActivePokemon, side: &SideState) -> Vec<SlotChoice> {
    let mut options = Vec::new();
    for (index, slot) in active.moves.iter().enumerate() {
        if !slot.is_usable() {
            continue;
        }
        let number = index + 1;
        let base = MoveChoice::new(number, slot.target.clone());
        options.push(SlotChoice::Move(base.clone()));

        if active.can_terastallize.is_some() && !side.has_teratyped {
            options.push(SlotChoice::Move(MoveChoice {
                tera: true,
                ..base.clone()
            }));
        }
        if (active.can_mega_evo || active.can_ultra_burst) && !side.has_megad {
            options.push(SlotChoice::Move(MoveChoice {
                mega: true,
                ..base.clone()
            }));
        }
        if active.can_dynamax && !side.has_dynamaxed {
            if let Some(max_move) = active.max_move(index) {
                options.push(SlotChoice::Move(MoveChoice {
                    dyna: true,
                    ..MoveChoice::new(number, max_move.target.clone())
                }));
            }
        }
        if !side.has_zmoved {
            if let Some(z_move) = active.z_move(index) {
                options.push(SlotChoice::Move(MoveChoice {
                    zmove: true,
                    ..MoveChoice::new(number, z_move.target.clone())
                }));
            }
        }
    }
    options
}

/// One copy of each aimed move per reachable filled slot. Slots we no
/// longer occupy pass; aimed moves with nothing in reach stay untargeted.
fn expand_targets(
    state: &BattleState,
    slots: &[SlotOptions],
    game_type: GameType,
) -> Result<Vec<SlotOptions>> {
    let filled = state.filled_target_slots();

    slots
        .iter()
        .enumerate()
        .map(|(index, options)| -> Result<SlotOptions> {
            let SlotOptions::Options(choices) = options else {
                return Ok(SlotOptions::Pass);
            };
            if !state.player.is_filled(index + 1) {
                return Ok(SlotOptions::Pass);
            }

            let source = -(index as i32 + 1);
            let mut expanded = Vec::with_capacity(choices.len());
            for choice in choices {
                let SlotChoice::Move(move_choice) = choice else {
                    expanded.push(choice.clone());
                    continue;
                };
                let class = move_choice.target_type.as_deref();
                if move_choice.target.is_some() || !needs_target(class)? {
                    expanded.push(choice.clone());
                    continue;
                }

                let targets =
                    valid_target_slots(source, &filled, class.unwrap_or_default(), game_type)?;
                if targets.is_empty() {
                    expanded.push(choice.clone());
                }
                for target in targets {
                    expanded.push(SlotChoice::Move(MoveChoice {
                        target: Some(target),
                        ..move_choice.clone()
                    }));
                }
            }
            Ok(SlotOptions::Options(expanded))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::Action;
    use crate::tracking::fixtures::{
        active_slot, feed, line, request_line, side_pokemon, started_doubles, started_singles,
    };
    use assert_matches::assert_matches;

    fn team(active: usize, fainted: &[usize]) -> Vec<String> {
        let names = [
            ("Sparky", "Pikachu, L50, M"),
            ("Chomp", "Garchomp, L50, F"),
            ("Bulb", "Venusaur, L50, F"),
            ("Shell", "Blastoise, L50, M"),
            ("Char", "Charizard, L50, M"),
            ("Nap", "Snorlax, L50, M"),
        ];
        names
            .iter()
            .enumerate()
            .map(|(index, (ident, details))| {
                let condition = if fainted.contains(&index) {
                    "0 fnt"
                } else {
                    "150/150"
                };
                side_pokemon(ident, details, condition, index < active)
            })
            .collect()
    }

    fn slot_options(engine: &BattleEngine) -> Vec<SlotOptions> {
        match engine.state().unwrap().battle_choice.clone() {
            Some(BattleChoice::Slots(slots)) => slots,
            other => panic!("expected slot choices, got {other:?}"),
        }
    }

    fn count_moves(options: &SlotOptions) -> usize {
        options
            .choices()
            .iter()
            .filter(|choice| matches!(choice, SlotChoice::Move(_)))
            .count()
    }

    fn count_switches(options: &SlotOptions) -> usize {
        options
            .choices()
            .iter()
            .filter(|choice| matches!(choice, SlotChoice::Switch(_)))
            .count()
    }

    #[test]
    fn test_request_syncs_own_roster() {
        let mut engine = started_singles();
        let request = request_line(r#""wait":true"#, &team(1, &[5]));
        let signal = engine.process(&line(&request)).unwrap();
        assert_eq!(signal, ProgressSignal::NoAction);

        let state = engine.state().unwrap();
        assert_eq!(state.battle_choice, None);
        assert_eq!(state.player.roster.len(), 6);

        let sparky = state.player.get("p1_Pikachu_50_M_Sparky").unwrap();
        assert_eq!(sparky.hp_kind, HpKind::Exact);
        assert_eq!(sparky.max_hp, Some(150));
        assert_eq!(sparky.stats.spe.min, Some(100));
        assert_eq!(sparky.team_pos, Some(1));
        assert_eq!(sparky.items[0].name, "leftovers");
        assert_eq!(sparky.abilities[0].name, "pressure");
        assert_eq!(sparky.moves.len(), 3);
        assert!(sparky.active);

        let nap = state.player.get("p1_Snorlax_50_M_Nap").unwrap();
        assert!(nap.is_fainted());
        assert!(!nap.active);
    }

    #[test]
    fn test_request_follows_forme_change() {
        let mut engine = started_singles();
        let fin = |details: &str| side_pokemon("Fin", details, "300/300", true);
        let bulb = side_pokemon("Bulb", "Venusaur, L50, F", "160/160", false);

        let before = request_line(r#""wait":true"#, &[fin("Palafin, L80, M"), bulb.clone()]);
        feed(&mut engine, &[before.as_str(), "|switch|p1a: Fin|Palafin, L80, M|300/300"]);
        feed(&mut engine, &["|move|p1a: Fin|Jet Punch|p2a: Boo"]);

        let after = request_line(r#""wait":true"#, &[fin("Palafin-Hero, L80, M"), bulb]);
        feed(&mut engine, &[after.as_str()]);

        let side = &engine.state().unwrap().player;
        let mut keys: Vec<&str> = side.roster.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["p1_Palafin_80_M_Fin", "p1_Venusaur_50_F_Bulb"]);
        assert_eq!(side.get("p1_Palafin_80_M_Fin").unwrap().species, "Palafin-Hero");
        assert_eq!(
            side.occupant(Player::P1, 1).unwrap(),
            Some("p1_Palafin_80_M_Fin")
        );
    }

    #[test]
    fn test_foreign_request_is_fatal() {
        let mut engine = started_singles();
        let request = request_line(r#""wait":true"#, &team(1, &[]))
            .replace(r#""name":"sagebot""#, r#""name":"intruder""#);
        assert_matches!(
            engine.process(&line(&request)),
            Err(EngineError::ForeignRequest { found, .. }) if found == "intruder"
        );
    }

    #[test]
    fn test_team_preview_request() {
        let mut engine = started_singles();
        let request = request_line(r#""teamPreview":true"#, &team(0, &[]));
        feed(&mut engine, &[request.as_str()]);

        assert_eq!(
            engine.state().unwrap().battle_choice,
            Some(BattleChoice::TeamOrder(TeamChoice::natural(6)))
        );
        assert_eq!(
            engine.process(&line("|teampreview|6")).unwrap(),
            ProgressSignal::TeamOrder
        );
    }

    #[test]
    fn test_move_and_switch_enumeration() {
        let mut engine = started_singles();
        let moves = [("tackle", "normal"), ("growl", "allAdjacentFoes"), ("protect", "self")];
        let mut pokemon = team(1, &[]);
        pokemon.truncate(5);

        let body = format!(r#""active":[{}]"#, active_slot(&moves, false));
        feed(&mut engine, &[request_line(&body, &pokemon).as_str()]);
        let slots = slot_options(&engine);
        assert_eq!(slots.len(), 1);
        assert_eq!(count_moves(&slots[0]), 3);
        assert_eq!(count_switches(&slots[0]), 4);

        let body = format!(r#""active":[{}]"#, active_slot(&moves, true));
        feed(&mut engine, &[request_line(&body, &pokemon).as_str()]);
        let slots = slot_options(&engine);
        assert_eq!(count_moves(&slots[0]), 3);
        assert_eq!(count_switches(&slots[0]), 0);
    }

    #[test]
    fn test_disabled_and_empty_moves_are_skipped() {
        let mut engine = started_singles();
        let body = r#""active":[{"moves":[{"move":"Tackle","id":"tackle","pp":0,"maxpp":35,"target":"normal","disabled":false},{"move":"Growl","id":"growl","pp":40,"maxpp":40,"target":"allAdjacentFoes","disabled":"Taunt"},{"move":"Protect","id":"protect","pp":10,"maxpp":10,"target":"self","disabled":false}],"trapped":true}]"#;
        feed(&mut engine, &[request_line(body, &team(1, &[])).as_str()]);

        let slots = slot_options(&engine);
        assert_eq!(
            slots[0].choices(),
            vec![SlotChoice::Move(MoveChoice::new(3, Some("self".into())))]
        );
    }

    #[test]
    fn test_one_time_variants() {
        let mut engine = started_singles();
        let body = r#""active":[{"moves":[{"move":"Tackle","id":"tackle","pp":35,"maxpp":35,"target":"normal","disabled":false}],"canTerastallize":"Normal","canDynamax":true,"maxMoves":{"maxMoves":[{"move":"maxstrike","target":"adjacentFoe"}]},"canZMove":[{"move":"Breakneck Blitz","target":"normal"}],"trapped":true}]"#;
        let request = request_line(body, &team(1, &[]));
        feed(&mut engine, &[request.as_str()]);

        let choices = slot_options(&engine)[0].choices();
        let payloads: Vec<String> = choices.iter().map(ToString::to_string).collect();
        assert_eq!(
            payloads,
            vec![
                "move 1",
                "move 1 terastallize",
                "move 1 dynamax",
                "move 1 zmove"
            ]
        );

        // Once a side has used tera, the variant disappears
        feed(&mut engine, &["|switch|p1a: Sparky|Pikachu, L50, M|150/150"]);
        feed(&mut engine, &["|-terastallize|p1a: Sparky|Normal", request.as_str()]);
        let choices = slot_options(&engine)[0].choices();
        assert!(choices.iter().all(|choice| !matches!(choice, SlotChoice::Move(m) if m.tera)));
    }

    #[test]
    fn test_doubles_turn_expands_targets() {
        let mut engine = started_doubles();
        let moves = [("tackle", "normal"), ("protect", "self")];
        let body = format!(
            r#""active":[{},{}]"#,
            active_slot(&moves, false),
            active_slot(&moves, false)
        );
        let request = request_line(&body, &team(2, &[]));

        feed(
            &mut engine,
            &[
                request.as_str(),
                "|switch|p1a: Sparky|Pikachu, L50, M|150/150",
                "|switch|p1b: Chomp|Garchomp, L50, F|150/150",
                "|switch|p2a: Left|Raichu, L50, F|100/100",
                "|switch|p2b: Right|Jolteon, L50, M|100/100",
            ],
        );
        let signal = engine.process(&line("|turn|1")).unwrap();
        assert_eq!(signal, ProgressSignal::Move);

        let slots = slot_options(&engine);
        assert_eq!(slots.len(), 2);
        let targets: Vec<Option<i32>> = slots[0]
            .choices()
            .iter()
            .filter_map(|choice| match choice {
                SlotChoice::Move(m) if m.move_number == 1 => Some(m.target),
                _ => None,
            })
            .collect();
        assert_eq!(targets, vec![Some(-2), Some(1), Some(2)]);
        assert_eq!(count_moves(&slots[0]), 4);
        assert_eq!(count_switches(&slots[0]), 4);

        let action = Action::Slots(vec![slots[0].choices()[1].clone(), slots[1].choices()[0].clone()]);
        engine.record_action(&action).unwrap();
        assert_eq!(engine.record().unwrap().states.len(), 2);
        assert_eq!(engine.log().last().map(String::as_str), Some("move 1 1,move 1 -1"));

        // Next turn: the opponent's second slot has emptied
        feed(
            &mut engine,
            &[request.as_str(), "|faint|p2b: Right"],
        );
        assert_eq!(engine.process(&line("|turn|2")).unwrap(), ProgressSignal::Move);
        let slots = slot_options(&engine);
        let targets: Vec<Option<i32>> = slots[1]
            .choices()
            .iter()
            .filter_map(|choice| match choice {
                SlotChoice::Move(m) if m.move_number == 1 => Some(m.target),
                _ => None,
            })
            .collect();
        assert_eq!(targets, vec![Some(-1), Some(1)]);

        let record = engine.record().unwrap();
        assert_eq!(record.turn, 2);
        assert_eq!(record.states[0].turn, 1);
        assert!(record.current_state().player.slots_consistent());
        assert!(record.current_state().opponent.slots_consistent());
    }

    #[test]
    fn test_faint_then_forced_switch() {
        let mut engine = started_doubles();
        let moves = [("tackle", "normal")];
        let body = format!(
            r#""active":[{},{}]"#,
            active_slot(&moves, false),
            active_slot(&moves, false)
        );
        feed(
            &mut engine,
            &[
                request_line(&body, &team(2, &[])).as_str(),
                "|switch|p1a: Sparky|Pikachu, L50, M|150/150",
                "|switch|p1b: Chomp|Garchomp, L50, F|150/150",
                "|turn|1",
                "|faint|p1a: Sparky",
            ],
        );

        let state = engine.state().unwrap();
        let sparky = state.player.get("p1_Pikachu_50_M_Sparky").unwrap();
        assert_eq!(sparky.status, Some(Status::Fainted));
        assert!(!sparky.active);
        assert_eq!(sparky.slot, None);
        assert_eq!(state.player.occupant(Player::P1, 1).unwrap(), None);

        let request = request_line(r#""forceSwitch":[true,false]"#, &team(2, &[0]));
        let signal = engine.process(&line(&request)).unwrap();
        assert_eq!(signal, ProgressSignal::Switch);

        let slots = slot_options(&engine);
        assert_eq!(
            slots[0].choices(),
            (3..=6)
                .map(|slot| SlotChoice::Switch(SwitchChoice { slot }))
                .collect::<Vec<_>>()
        );
        assert_eq!(slots[1], SlotOptions::Pass);
    }

    #[test]
    fn test_revival_offers_fainted_members() {
        let mut engine = started_singles();
        let mut pokemon = team(1, &[3, 4]);
        pokemon[0] = pokemon[0].replace(r#""terastallized":"""#, r#""terastallized":"","reviving":true"#);
        let request = request_line(r#""forceSwitch":[true]"#, &pokemon);
        feed(&mut engine, &[request.as_str()]);

        let slots = slot_options(&engine);
        assert_eq!(
            slots[0].choices(),
            vec![
                SlotChoice::Switch(SwitchChoice { slot: 4 }),
                SlotChoice::Switch(SwitchChoice { slot: 5 }),
            ]
        );
    }

    #[test]
    fn test_unknown_target_class_fails_turn() {
        let mut engine = started_doubles();
        let body = format!(
            r#""active":[{}]"#,
            active_slot(&[("warp", "everywhere")], true)
        );
        feed(
            &mut engine,
            &[
                request_line(&body, &team(2, &[])).as_str(),
                "|switch|p1a: Sparky|Pikachu, L50, M|150/150",
            ],
        );
        assert_eq!(
            engine.process(&line("|turn|1")),
            Err(EngineError::UnknownMoveTarget("everywhere".into()))
        );
    }
}
