//! Observed-information handlers: moves, HP, status, boosts and revealed
//! items, abilities and one-time resources.
//!
//! Events about a pokemon the engine cannot place are logged and skipped;
//! they never carry slot information the engine relies on.

use seer_protocol::{Player, Pokemon, ServerMessage};

use super::engine::BattleEngine;
use super::signal::ProgressSignal;
use crate::error::Result;
use crate::types::{PokemonRecord, SideState, Status, Weather};

impl BattleEngine {
    pub(super) fn on_move(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::Move {
            pokemon, move_name, ..
        } = message
        else {
            return Ok(ProgressSignal::NoAction);
        };
        self.update_pokemon(pokemon, |mon| mon.record_move(move_name))
    }

    /// `|-damage|`, `|-heal|` and `|-sethp|`
    pub(super) fn on_hp_change(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let (ServerMessage::Damage { pokemon, hp_status }
        | ServerMessage::Heal { pokemon, hp_status }
        | ServerMessage::SetHp { pokemon, hp_status }) = message
        else {
            return Ok(ProgressSignal::NoAction);
        };
        let Some(hp) = hp_status else {
            return Ok(ProgressSignal::NoAction);
        };
        self.update_pokemon(pokemon, |mon| mon.apply_hp(hp))
    }

    pub(super) fn on_status(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::Status { pokemon, status } = message else {
            return Ok(ProgressSignal::NoAction);
        };
        self.update_pokemon(pokemon, |mon| mon.status = Status::from_protocol(status))
    }

    pub(super) fn on_curestatus(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::CureStatus { pokemon, .. } = message else {
            return Ok(ProgressSignal::NoAction);
        };
        self.update_pokemon(pokemon, |mon| {
            if !mon.is_fainted() {
                mon.status = None;
            }
        })
    }

    pub(super) fn on_cureteam(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::CureTeam(pokemon) = message else {
            return Ok(ProgressSignal::NoAction);
        };
        self.update_side(pokemon.player, |side| {
            for mon in side.roster.values_mut().filter(|mon| !mon.is_fainted()) {
                mon.status = None;
            }
        })
    }

    /// `|-boost|`, `|-unboost|` and `|-setboost|`
    pub(super) fn on_boost(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        match message {
            ServerMessage::Boost {
                pokemon,
                stat,
                amount,
            } => self.update_pokemon(pokemon, |mon| mon.boosts.boost(*stat, *amount)),
            ServerMessage::Unboost {
                pokemon,
                stat,
                amount,
            } => self.update_pokemon(pokemon, |mon| mon.boosts.boost(*stat, -*amount)),
            ServerMessage::SetBoost {
                pokemon,
                stat,
                amount,
            } => self.update_pokemon(pokemon, |mon| mon.boosts.set(*stat, *amount)),
            _ => Ok(ProgressSignal::NoAction),
        }
    }

    pub(super) fn on_clearboost(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::ClearBoost(pokemon) = message else {
            return Ok(ProgressSignal::NoAction);
        };
        self.update_pokemon(pokemon, |mon| mon.boosts.clear())
    }

    pub(super) fn on_clearallboost(&mut self, _message: &ServerMessage) -> Result<ProgressSignal> {
        let state = self.record_mut()?.current_state_mut();
        for mon in state
            .player
            .roster
            .values_mut()
            .chain(state.opponent.roster.values_mut())
        {
            mon.boosts.clear();
        }
        Ok(ProgressSignal::NoAction)
    }

    pub(super) fn on_weather(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::Weather { weather, .. } = message else {
            return Ok(ProgressSignal::NoAction);
        };
        self.record_mut()?.current_state_mut().weather = Weather::from_protocol(weather);
        Ok(ProgressSignal::NoAction)
    }

    /// `|-start|` and `|-end|`. Dynamax is tracked as a flag rather than a condition.
    pub(super) fn on_volatile(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let (pokemon, effect, starting) = match message {
            ServerMessage::VolatileStart { pokemon, effect } => (pokemon, effect, true),
            ServerMessage::VolatileEnd { pokemon, effect } => (pokemon, effect, false),
            _ => return Ok(ProgressSignal::NoAction),
        };

        if crate::types::condition_id(effect) == "dynamax" {
            self.update_pokemon(pokemon, |mon| mon.is_dynamax = starting)?;
            if starting {
                self.update_side(pokemon.player, |side| side.has_dynamaxed = true)?;
            }
            return Ok(ProgressSignal::NoAction);
        }

        self.update_pokemon(pokemon, |mon| {
            if starting {
                mon.add_condition(effect);
            } else {
                mon.remove_condition(effect);
            }
        })
    }

    /// `|-item|` reveals an item, `|-enditem|` removes it
    pub(super) fn on_item(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        match message {
            ServerMessage::Item { pokemon, item, .. } => {
                self.update_pokemon(pokemon, |mon| mon.reveal_item(item))
            }
            ServerMessage::EndItem { pokemon, .. } => {
                self.update_pokemon(pokemon, PokemonRecord::lose_item)
            }
            _ => Ok(ProgressSignal::NoAction),
        }
    }

    /// Abilities shown with a `[from]` effect were given by that effect
    pub(super) fn on_ability(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::Ability {
            pokemon,
            ability,
            from,
        } = message
        else {
            return Ok(ProgressSignal::NoAction);
        };
        self.update_pokemon(pokemon, |mon| {
            mon.reveal_ability(ability, from.is_some())
        })
    }

    pub(super) fn on_mega(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::Mega { pokemon, megastone } = message else {
            return Ok(ProgressSignal::NoAction);
        };
        self.update_pokemon(pokemon, |mon| {
            mon.is_mega = true;
            if !megastone.is_empty() {
                mon.reveal_item(megastone);
            }
        })?;
        self.update_side(pokemon.player, |side| side.has_megad = true)
    }

    pub(super) fn on_zpower(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::ZPower(pokemon) = message else {
            return Ok(ProgressSignal::NoAction);
        };
        self.update_side(pokemon.player, |side| side.has_zmoved = true)
    }

    pub(super) fn on_terastallize(&mut self, message: &ServerMessage) -> Result<ProgressSignal> {
        let ServerMessage::Terastallize { pokemon, tera_type } = message else {
            return Ok(ProgressSignal::NoAction);
        };
        self.update_pokemon(pokemon, |mon| {
            mon.tera_type = Some(tera_type.clone());
            mon.is_tera = true;
        })?;
        self.update_side(pokemon.player, |side| side.has_teratyped = true)
    }

    /// Apply `update` to the pokemon an event names: the slot occupant when
    /// the event carries a position, the nickname match otherwise.
    fn update_pokemon(
        &mut self,
        pokemon: &Pokemon,
        update: impl FnOnce(&mut PokemonRecord),
    ) -> Result<ProgressSignal> {
        let record = self.record_mut()?;
        let side = record.side_of(pokemon.player)?;
        let roster = record.current_state_mut().side_mut(side);

        match locate(roster, pokemon).and_then(|key| roster.get_mut(&key)) {
            Some(mon) => update(mon),
            None => tracing::debug!(
                player = %pokemon.player,
                name = %pokemon.name,
                "event for an untracked pokemon"
            ),
        }
        Ok(ProgressSignal::NoAction)
    }

    fn update_side(
        &mut self,
        player: Player,
        update: impl FnOnce(&mut SideState),
    ) -> Result<ProgressSignal> {
        let record = self.record_mut()?;
        let side = record.side_of(player)?;
        update(record.current_state_mut().side_mut(side));
        Ok(ProgressSignal::NoAction)
    }
}

/// Roster key of the pokemon an event refers to
fn locate(roster: &SideState, pokemon: &Pokemon) -> Option<String> {
    let by_slot = pokemon
        .slot()
        .and_then(|slot| roster.occupant(pokemon.player, slot).ok().flatten());
    by_slot
        .or_else(|| roster.find_by_nickname(&pokemon.name))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::fixtures::{feed, started_doubles, started_singles};
    use crate::types::HpKind;
    use seer_protocol::Stat;

    const BOO: &str = "p2_Gengar_80_F_Boo";

    fn with_gengar() -> BattleEngine {
        let mut engine = started_singles();
        feed(&mut engine, &["|switch|p2a: Boo|Gengar, L80, F|100/100"]);
        engine
    }

    fn gengar(engine: &BattleEngine) -> &PokemonRecord {
        engine.state().unwrap().opponent.get(BOO).unwrap()
    }

    #[test]
    fn test_moves_and_hp() {
        let mut engine = with_gengar();
        feed(
            &mut engine,
            &[
                "|move|p2a: Boo|Shadow Ball|p1a: Sparky",
                "|move|p2a: Boo|Shadow Ball|p1a: Sparky",
                "|-damage|p2a: Boo|61/100",
                "|-heal|p2a: Boo|67/100|[from] item: Leftovers",
            ],
        );

        let mon = gengar(&engine);
        assert_eq!(mon.moves.len(), 1);
        assert_eq!(mon.moves[0].use_count, 2);
        assert_eq!(mon.hp_kind, HpKind::Fraction);
        assert_eq!(mon.current_hp, Some(67));
    }

    #[test]
    fn test_status_lifecycle() {
        let mut engine = with_gengar();
        feed(&mut engine, &["|-status|p2a: Boo|brn"]);
        assert_eq!(gengar(&engine).status, Some(Status::Burn));

        feed(&mut engine, &["|-curestatus|p2a: Boo|brn"]);
        assert_eq!(gengar(&engine).status, None);

        feed(
            &mut engine,
            &["|-status|p2a: Boo|slp", "|-cureteam|p2a: Boo|[from] move: Aromatherapy"],
        );
        assert_eq!(gengar(&engine).status, None);
    }

    #[test]
    fn test_boosts() {
        let mut engine = with_gengar();
        feed(
            &mut engine,
            &[
                "|-boost|p2a: Boo|spa|2",
                "|-unboost|p2a: Boo|spe|1",
                "|-setboost|p2a: Boo|atk|6",
            ],
        );
        let boosts = gengar(&engine).boosts;
        assert_eq!(boosts.get(Stat::Spa), 2);
        assert_eq!(boosts.get(Stat::Spe), -1);
        assert_eq!(boosts.get(Stat::Atk), 6);

        feed(&mut engine, &["|-clearboost|p2a: Boo"]);
        assert!(gengar(&engine).boosts.is_clear());

        feed(&mut engine, &["|-boost|p2a: Boo|def|1", "|-clearallboost"]);
        assert!(gengar(&engine).boosts.is_clear());
    }

    #[test]
    fn test_weather() {
        let mut engine = started_singles();
        feed(&mut engine, &["|-weather|RainDance"]);
        assert_eq!(engine.state().unwrap().weather, Some(Weather::Rain));

        feed(&mut engine, &["|-weather|none"]);
        assert_eq!(engine.state().unwrap().weather, None);
    }

    #[test]
    fn test_conditions() {
        let mut engine = with_gengar();
        feed(
            &mut engine,
            &["|-start|p2a: Boo|Substitute", "|-start|p2a: Boo|move: Taunt"],
        );
        assert_eq!(gengar(&engine).conditions, vec!["substitute", "taunt"]);

        feed(&mut engine, &["|-end|p2a: Boo|Substitute"]);
        assert_eq!(gengar(&engine).conditions, vec!["taunt"]);
    }

    #[test]
    fn test_items_and_abilities() {
        let mut engine = with_gengar();
        feed(
            &mut engine,
            &[
                "|-item|p2a: Boo|Choice Specs|[from] move: Trick",
                "|-ability|p2a: Boo|Cursed Body",
            ],
        );
        let mon = gengar(&engine);
        assert_eq!(mon.items[0].name, "choicespecs");
        assert_eq!(mon.has_item, Some(true));
        assert_eq!(mon.abilities[0].name, "cursedbody");
        assert_eq!(mon.overwritten_ability, None);

        feed(
            &mut engine,
            &[
                "|-enditem|p2a: Boo|Choice Specs|[from] move: Knock Off",
                "|-ability|p2a: Boo|Mummy|[from] ability: Mummy",
            ],
        );
        let mon = gengar(&engine);
        assert_eq!(mon.has_item, Some(false));
        assert!(mon.items.is_empty());
        assert_eq!(mon.overwritten_ability.as_deref(), Some("mummy"));
        assert_eq!(mon.abilities[0].name, "cursedbody");
    }

    #[test]
    fn test_one_time_resources() {
        let mut engine = with_gengar();
        feed(
            &mut engine,
            &["|-terastallize|p2a: Boo|Fairy", "|-mega|p2a: Boo|Gengar|Gengarite"],
        );
        let mon = gengar(&engine);
        assert!(mon.is_tera);
        assert!(mon.is_mega);
        assert_eq!(mon.tera_type.as_deref(), Some("Fairy"));
        assert_eq!(mon.items[0].name, "gengarite");

        feed(
            &mut engine,
            &["|-zpower|p2a: Boo", "|-start|p2a: Boo|Dynamax"],
        );
        assert!(gengar(&engine).is_dynamax);
        assert!(gengar(&engine).conditions.is_empty());

        let side = &engine.state().unwrap().opponent;
        assert!(side.has_teratyped);
        assert!(side.has_megad);
        assert!(side.has_zmoved);
        assert!(side.has_dynamaxed);

        feed(&mut engine, &["|-end|p2a: Boo|Dynamax"]);
        assert!(!gengar(&engine).is_dynamax);
        assert!(engine.state().unwrap().opponent.has_dynamaxed);
    }

    #[test]
    fn test_event_without_position_uses_nickname() {
        let mut engine = started_doubles();
        feed(
            &mut engine,
            &[
                "|switch|p2b: Boo|Gengar, L80, F|100/100",
                "|-item|p2: Boo|Life Orb",
            ],
        );
        let mon = engine.state().unwrap().opponent.get(BOO).unwrap();
        assert_eq!(mon.items[0].name, "lifeorb");
    }

    #[test]
    fn test_untracked_pokemon_is_skipped() {
        let mut engine = started_singles();
        let before = engine.record().unwrap().clone();
        feed(&mut engine, &["|-damage|p2a: Ghost|50/100"]);
        assert_eq!(engine.record().unwrap(), &before);
    }
}
