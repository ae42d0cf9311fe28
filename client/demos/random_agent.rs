//! Random Agent Example
//!
//! Picks uniformly among the legal choices at every decision point and
//! prints a short summary of the field each turn.
//!
//! Configuration comes from the JSON file named by `SEER_CONFIG`, or from
//! `PS_USERNAME`, `PS_PASSWORD` and `PS_FORMAT` when no file is given.

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use seer_battle::{HpKind, SideState};
use seer_client::{
    Action, BattleState, ConnectorConfig, Policy, Session, SlotChoice, SlotOptions, TeamChoice,
    play,
};
use tracing_subscriber::EnvFilter;

struct RandomAgent;

impl RandomAgent {
    fn pick(&self, slots: &[SlotOptions]) -> Action {
        let mut rng = rand::thread_rng();
        let mut used_switches = Vec::new();
        let mut picks = Vec::with_capacity(slots.len());

        for slot in slots {
            // Two slots cannot bring in the same bench member
            let options: Vec<SlotChoice> = slot
                .choices()
                .into_iter()
                .filter(|choice| match choice {
                    SlotChoice::Switch(switch) => !used_switches.contains(&switch.slot),
                    _ => true,
                })
                .collect();

            let pick = options.choose(&mut rng).cloned().unwrap_or(SlotChoice::Pass);
            if let SlotChoice::Switch(switch) = &pick {
                used_switches.push(switch.slot);
            }
            picks.push(pick);
        }

        Action::Slots(picks)
    }
}

impl Policy for RandomAgent {
    fn team_order(&mut self, _state: &BattleState, natural: &TeamChoice) -> Action {
        let mut order = natural.order.clone();
        order.shuffle(&mut rand::thread_rng());
        Action::Team(TeamChoice { order })
    }

    fn choose_moves(&mut self, state: &BattleState, slots: &[SlotOptions]) -> Action {
        print_turn(state);
        let action = self.pick(slots);
        println!("  -> {}", action);
        action
    }

    fn force_switch(&mut self, _state: &BattleState, slots: &[SlotOptions]) -> Action {
        let action = self.pick(slots);
        println!("  forced switch -> {}", action);
        action
    }
}

fn print_turn(state: &BattleState) {
    println!("\n{}", "=".repeat(40));
    println!("Turn {}", state.turn);
    if let Some(weather) = &state.weather {
        println!("Weather: {:?}", weather);
    }
    print_side("You", &state.player);
    print_side("Opponent", &state.opponent);
}

fn print_side(label: &str, side: &SideState) {
    for key in side.slots.iter().flatten() {
        let Some(pokemon) = side.get(key) else {
            continue;
        };
        let current = pokemon.current_hp.unwrap_or(0);
        let hp = match (pokemon.hp_kind, pokemon.max_hp) {
            (HpKind::Exact, Some(max)) => format!("{}/{}", current, max),
            _ => format!("{}%", current),
        };
        println!("  {:<9} {} ({})", label, pokemon.species, hp);
    }
}

fn load_config() -> Result<ConnectorConfig> {
    if let Ok(path) = std::env::var("SEER_CONFIG") {
        return ConnectorConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load {}", path));
    }

    let username = std::env::var("PS_USERNAME").context("Set PS_USERNAME or SEER_CONFIG")?;
    let password = std::env::var("PS_PASSWORD").context("Set PS_PASSWORD or SEER_CONFIG")?;
    let format = std::env::var("PS_FORMAT").unwrap_or_else(|_| "gen9randombattle".to_string());
    Ok(ConnectorConfig::new(username, password, format))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    println!("Random Agent");
    println!("============");

    let mut session = Session::connect(config).await?;
    let termination = play(&mut session, &mut RandomAgent).await;

    println!("Session ended: {}", termination);
    Ok(())
}
