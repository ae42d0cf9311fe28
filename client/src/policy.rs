//! Decision policies and the loop that plays them

use seer_battle::{Action, BattleChoice, BattleState, ProgressSignal, SlotOptions, TeamChoice};

use crate::controller::Step;
use crate::session::Session;
use crate::termination::{ConnectionTermination, TerminationCode};

/// Picks an action for each decision point.
///
/// Every method receives the snapshot and the legal choices for it; the
/// returned action must match the decision's shape (one entry per slot for
/// moves and switches).
pub trait Policy {
    fn team_order(&mut self, state: &BattleState, natural: &TeamChoice) -> Action {
        let _ = (state, natural);
        Action::Default
    }

    fn choose_moves(&mut self, state: &BattleState, slots: &[SlotOptions]) -> Action;

    fn force_switch(&mut self, state: &BattleState, slots: &[SlotOptions]) -> Action;
}

/// Lets the server pick every time
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPolicy;

impl Policy for DefaultPolicy {
    fn choose_moves(&mut self, _state: &BattleState, _slots: &[SlotOptions]) -> Action {
        Action::Default
    }

    fn force_switch(&mut self, _state: &BattleState, _slots: &[SlotOptions]) -> Action {
        Action::Default
    }
}

/// Route a decision step to the policy. Steps that need no answer give None.
pub fn decide<P: Policy + ?Sized>(policy: &mut P, step: &Step) -> Option<Action> {
    if !step.signal.needs_action() {
        return None;
    }
    let state = step.state()?;

    let action = match (&state.battle_choice, step.signal) {
        (Some(BattleChoice::TeamOrder(natural)), ProgressSignal::TeamOrder) => {
            policy.team_order(state, natural)
        }
        (Some(BattleChoice::Slots(slots)), ProgressSignal::Move) => {
            policy.choose_moves(state, slots)
        }
        (Some(BattleChoice::Slots(slots)), ProgressSignal::Switch) => {
            policy.force_switch(state, slots)
        }
        (choice, signal) => {
            tracing::warn!(?signal, has_choice = choice.is_some(), "no matching choice set, sending default");
            Action::Default
        }
    };
    Some(action)
}

/// Drive `session` with `policy` until the connection ends
pub async fn play<P: Policy + ?Sized>(
    session: &mut Session,
    policy: &mut P,
) -> ConnectionTermination {
    let mut action = None;
    loop {
        let step = session.next(action.take()).await;

        match step.signal {
            ProgressSignal::FullEnd => {
                return step.termination().cloned().unwrap_or_else(|| {
                    ConnectionTermination::code_only(TerminationCode::OtherError)
                });
            }
            ProgressSignal::GameEnd => {
                tracing::info!(
                    battle_id = ?step.battle_id,
                    completed = session.controller().completed_battles(),
                    termination = ?step.termination(),
                    "game over"
                );
            }
            _ => {
                if let Some(rejection) = &step.rejection {
                    tracing::warn!(battle_id = ?step.battle_id, %rejection, "policy answer refused");
                }
                action = decide(policy, &step);
            }
        }
    }
}
