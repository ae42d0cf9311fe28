//! Sans-I/O protocol flow controller
//!
//! The controller owns every battle engine on one connection. Frames go in
//! through [`FlowController::feed`]. [`FlowController::poll`] works through
//! the queued lines one at a time and stops at the first decision point; the
//! caller answers with [`FlowController::resume`] before anything else is
//! processed. Frames to transmit pile up until [`FlowController::take_outbound`].

use std::collections::{HashMap, HashSet, VecDeque};

use seer_battle::{
    Action, BattleEngine, BattleState, ProgressSignal, SlotChoice, normalize_format, to_id,
};
use seer_protocol::{ClientCommand, ClientMessage, SearchState, ServerFrame, ServerLine, ServerMessage};

use crate::config::{ConnectorConfig, Objective};
use crate::sink::BattleSink;
use crate::termination::{ConnectionTermination, TerminationCode};

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    State(Box<BattleState>),
    Termination(ConnectionTermination),
    Empty,
}

/// One surfaced decision point or lifecycle event
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub signal: ProgressSignal,
    /// None for connection-wide events
    pub battle_id: Option<String>,
    pub payload: Payload,
    /// Why the previous answer to this same decision was refused
    pub rejection: Option<ConnectionTermination>,
}

impl Step {
    fn full_end(termination: ConnectionTermination) -> Self {
        Self {
            signal: ProgressSignal::FullEnd,
            battle_id: None,
            payload: Payload::Termination(termination),
            rejection: None,
        }
    }

    pub fn state(&self) -> Option<&BattleState> {
        match &self.payload {
            Payload::State(state) => Some(&**state),
            _ => None,
        }
    }

    pub fn termination(&self) -> Option<&ConnectionTermination> {
        match &self.payload {
            Payload::Termination(termination) => Some(termination),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Poll {
    Decision(Step),
    /// Run the login side-channel, then report back through
    /// [`FlowController::authenticated`] or [`FlowController::authentication_failed`]
    Authenticate { challstr: String },
    /// Everything queued is processed; feed the next frame
    NeedInput,
}

struct Inbound {
    battle_id: Option<String>,
    line: ServerLine,
}

#[derive(Debug, Clone)]
struct Outstanding {
    battle_id: String,
    signal: ProgressSignal,
}

struct LiveBattle {
    engine: BattleEngine,
    /// Consecutive refused answers
    rejections: u32,
}

pub struct FlowController {
    config: ConnectorConfig,
    user_id: String,
    target_format: String,
    sink: Box<dyn BattleSink>,

    inbound: VecDeque<Inbound>,
    outbound: Vec<ClientMessage>,
    ready: VecDeque<Step>,
    outstanding: Option<Outstanding>,

    battles: HashMap<String, LiveBattle>,
    completed: HashSet<String>,

    logged_in: bool,
    last_search: Option<SearchState>,
    formats: Vec<String>,
    // Admission counters
    searching: usize,
    reported_games: usize,
    pending_challenge: Option<String>,
    challenged: Vec<String>,

    termination: Option<ConnectionTermination>,
}

impl FlowController {
    pub fn new(config: ConnectorConfig, sink: Box<dyn BattleSink>) -> Self {
        Self {
            user_id: to_id(&config.username),
            target_format: normalize_format(&config.target_format),
            config,
            sink,
            inbound: VecDeque::new(),
            outbound: Vec::new(),
            ready: VecDeque::new(),
            outstanding: None,
            battles: HashMap::new(),
            completed: HashSet::new(),
            logged_in: false,
            last_search: None,
            formats: Vec::new(),
            searching: 0,
            reported_games: 0,
            pending_challenge: None,
            challenged: Vec::new(),
            termination: None,
        }
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Formats the server offers, normalized
    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    pub fn battle(&self, battle_id: &str) -> Option<&BattleEngine> {
        self.battles.get(battle_id).map(|battle| &battle.engine)
    }

    pub fn live_battles(&self) -> usize {
        self.battles.len()
    }

    pub fn completed_battles(&self) -> usize {
        self.completed.len()
    }

    pub fn termination(&self) -> Option<&ConnectionTermination> {
        self.termination.as_ref()
    }

    /// Queue a frame's lines. Ignored once the session has ended.
    pub fn feed(&mut self, frame: ServerFrame) {
        if self.termination.is_some() {
            return;
        }

        let battle_id = frame.battle_id().map(str::to_string);
        for line in frame.lines {
            self.inbound.push_back(Inbound {
                battle_id: battle_id.clone(),
                line,
            });
        }
    }

    pub fn take_outbound(&mut self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.outbound)
    }

    /// Advance to the next thing the caller has to look at.
    ///
    /// While a decision is outstanding it is returned again and no further
    /// lines are processed. After the session ends every call returns the
    /// same `FullEnd` step.
    pub fn poll(&mut self) -> Poll {
        loop {
            if let Some(step) = self.ready.pop_front() {
                return Poll::Decision(step);
            }
            if let Some(termination) = &self.termination {
                return Poll::Decision(Step::full_end(termination.clone()));
            }
            if let Some(outstanding) = self.outstanding.clone() {
                if let Some(step) = self.decision_step(&outstanding, None) {
                    return Poll::Decision(step);
                }
                self.outstanding = None;
            }

            let Some(Inbound { battle_id, line }) = self.inbound.pop_front() else {
                return Poll::NeedInput;
            };

            let poll = match battle_id {
                Some(battle_id) => self.process_battle_line(battle_id, &line).map(Poll::Decision),
                None => self.process_global_line(&line),
            };
            if let Some(poll) = poll {
                return poll;
            }
        }
    }

    /// Answer the outstanding decision. `None` leaves it unanswered.
    pub fn resume(&mut self, action: Option<Action>) {
        if self.termination.is_some() {
            return;
        }

        match (self.outstanding.take(), action) {
            (_, Some(Action::Quit)) => self.quit(),
            (Some(outstanding), Some(Action::Resign)) => self.resign(&outstanding.battle_id),
            (Some(outstanding), Some(action)) => self.submit(outstanding, action),
            (Some(outstanding), None) => {
                tracing::debug!(battle_id = %outstanding.battle_id, "decision left unanswered");
            }
            (None, Some(action)) => {
                tracing::warn!(?action, "no decision is outstanding, action dropped");
            }
            (None, None) => {}
        }
    }

    pub fn authenticated(&mut self, assertion: String) {
        tracing::info!(username = %self.config.username, "sending login assertion");
        self.outbound
            .push(ClientMessage::global(ClientCommand::TrustedLogin {
                username: self.config.username.clone(),
                assertion,
            }));
    }

    pub fn authentication_failed(&mut self, reason: impl Into<String>) {
        self.terminate(ConnectionTermination::new(TerminationCode::SetupError, reason));
    }

    pub fn connection_lost(&mut self, reason: impl Into<String>) {
        self.terminate(ConnectionTermination::new(
            TerminationCode::ConnectionError,
            reason,
        ));
    }

    // === Battles ===

    fn process_battle_line(&mut self, battle_id: String, line: &ServerLine) -> Option<Step> {
        if self.completed.contains(&battle_id) {
            return None;
        }
        if !self.battles.contains_key(&battle_id) {
            self.open_battle(&battle_id);
        }

        let battle = self.battles.get_mut(&battle_id)?;
        match battle.engine.process(line) {
            Ok(ProgressSignal::GameEnd) => {
                self.close_battle(&battle_id, None);
                None
            }
            Ok(signal) if signal.needs_action() => {
                let outstanding = Outstanding { battle_id, signal };
                let step = self.decision_step(&outstanding, None)?;
                self.outstanding = Some(outstanding);
                Some(step)
            }
            Ok(_) => None,
            Err(e) => {
                self.fail_battle(&battle_id, e.to_string());
                None
            }
        }
    }

    fn decision_step(
        &self,
        outstanding: &Outstanding,
        rejection: Option<ConnectionTermination>,
    ) -> Option<Step> {
        let state = self.battles.get(&outstanding.battle_id)?.engine.state()?;
        Some(Step {
            signal: outstanding.signal,
            battle_id: Some(outstanding.battle_id.clone()),
            payload: Payload::State(Box::new(state.clone())),
            rejection,
        })
    }

    fn open_battle(&mut self, battle_id: &str) {
        tracing::info!(battle_id, "battle started");
        self.battles.insert(
            battle_id.to_string(),
            LiveBattle {
                engine: BattleEngine::new(battle_id, self.config.username.as_str()),
                rejections: 0,
            },
        );

        match self.config.objective {
            Objective::Ladder => self.searching = self.searching.saturating_sub(1),
            Objective::Challenge | Objective::Accept => self.pending_challenge = None,
        }
    }

    /// Finalize, store and report a battle; ends the session once the
    /// objective is met
    fn close_battle(&mut self, battle_id: &str, termination: Option<ConnectionTermination>) {
        if self
            .outstanding
            .as_ref()
            .is_some_and(|outstanding| outstanding.battle_id == battle_id)
        {
            self.outstanding = None;
        }

        let mut payload = termination.clone().map_or(Payload::Empty, Payload::Termination);
        if let Some(mut battle) = self.battles.remove(battle_id) {
            battle.engine.finalize();
            self.store(&battle.engine);

            let victory = battle.engine.record().and_then(|record| record.player_victory);
            tracing::info!(battle_id, ?victory, "battle finished");

            if termination.is_none() {
                if let Some(state) = battle.engine.state() {
                    payload = Payload::State(Box::new(state.clone()));
                }
            }
        }

        self.completed.insert(battle_id.to_string());
        self.ready.push_back(Step {
            signal: ProgressSignal::GameEnd,
            battle_id: Some(battle_id.to_string()),
            payload,
            rejection: None,
        });

        if self.completed.len() >= self.config.total_battles && self.battles.is_empty() {
            self.terminate(ConnectionTermination::new(
                TerminationCode::ObjectiveComplete,
                "required number of battles completed",
            ));
        }
    }

    /// The engine for this battle can no longer be trusted
    fn fail_battle(&mut self, battle_id: &str, message: String) {
        tracing::error!(battle_id, error = %message, "battle engine failed");
        self.forfeit(battle_id);
        self.close_battle(
            battle_id,
            Some(ConnectionTermination::new(
                TerminationCode::ProcessorError,
                message,
            )),
        );
    }

    fn store(&mut self, engine: &BattleEngine) {
        if let Err(e) = self.sink.store(engine) {
            tracing::warn!(battle_id = %engine.battle_id(), error = %e, "failed to store battle");
        }
    }

    fn forfeit(&mut self, battle_id: &str) {
        self.outbound
            .push(ClientMessage::in_room(battle_id, ClientCommand::Forfeit));
    }

    // === Actions ===

    fn submit(&mut self, outstanding: Outstanding, action: Action) {
        let battle_id = outstanding.battle_id.clone();
        let slot_count = self.config.slot_count();
        let Some(battle) = self.battles.get_mut(&battle_id) else {
            tracing::warn!(battle_id = %battle_id, "answer for a battle that is gone");
            return;
        };

        if let Err(reason) = check_shape(outstanding.signal, &action, slot_count) {
            battle.rejections += 1;
            let rejections = battle.rejections;
            self.reject(outstanding, rejections, reason);
            return;
        }

        battle.rejections = 0;
        if let Err(e) = battle.engine.record_action(&action) {
            self.fail_battle(&battle_id, e.to_string());
            return;
        }

        let payload = action.to_string();
        tracing::debug!(battle_id = %battle_id, payload = %payload, "submitting choice");
        self.outbound.push(ClientMessage::in_room(
            battle_id,
            ClientCommand::Choose(payload),
        ));
    }

    fn reject(&mut self, outstanding: Outstanding, rejections: u32, reason: String) {
        let battle_id = outstanding.battle_id.clone();
        tracing::warn!(battle_id = %battle_id, rejections, reason = %reason, "action rejected");

        if rejections >= self.config.max_invalid_choices {
            self.forfeit(&battle_id);
            self.close_battle(
                &battle_id,
                Some(ConnectionTermination::new(
                    TerminationCode::InvalidChoice,
                    format!("{rejections} invalid choices in a row, last: {reason}"),
                )),
            );
            return;
        }

        let rejection = ConnectionTermination::new(TerminationCode::InvalidChoice, reason);
        if let Some(step) = self.decision_step(&outstanding, Some(rejection)) {
            self.ready.push_back(step);
            self.outstanding = Some(outstanding);
        }
    }

    fn resign(&mut self, battle_id: &str) {
        tracing::info!(battle_id, "resigning");
        if let Some(battle) = self.battles.get_mut(battle_id) {
            battle.rejections = 0;
            if let Err(e) = battle.engine.record_action(&Action::Resign) {
                tracing::warn!(battle_id, error = %e, "could not record resignation");
            }
        }
        self.forfeit(battle_id);
    }

    fn quit(&mut self) {
        let mut battle_ids: Vec<String> = self.battles.keys().cloned().collect();
        battle_ids.sort();

        for battle_id in battle_ids {
            self.forfeit(&battle_id);
            if let Some(mut battle) = self.battles.remove(&battle_id) {
                battle.engine.finalize();
                self.store(&battle.engine);
            }
        }

        self.terminate(ConnectionTermination::new(
            TerminationCode::UserShutdown,
            "user requested shutdown",
        ));
    }

    fn terminate(&mut self, termination: ConnectionTermination) {
        if self.termination.is_some() {
            return;
        }

        match termination.code {
            TerminationCode::ObjectiveComplete | TerminationCode::UserShutdown => {
                tracing::info!(termination = %termination, "session finished");
            }
            _ => tracing::error!(termination = %termination, "session terminated"),
        }

        self.outstanding = None;
        self.inbound.clear();
        self.termination = Some(termination);
    }

    // === Session and matchmaking ===

    fn process_global_line(&mut self, line: &ServerLine) -> Option<Poll> {
        match &line.message {
            ServerMessage::Challstr(challstr) => {
                if !self.logged_in {
                    return Some(Poll::Authenticate {
                        challstr: challstr.clone(),
                    });
                }
            }
            ServerMessage::UpdateUser {
                username, named, ..
            } => self.on_update_user(username, *named),
            ServerMessage::NameTaken { username, message } => {
                self.terminate(ConnectionTermination::new(
                    TerminationCode::SetupError,
                    format!("{username}: {message}"),
                ));
            }
            ServerMessage::UpdateSearch(search) => self.on_update_search(search),
            ServerMessage::Formats(formats) => {
                self.formats = formats.iter().map(|name| normalize_format(name)).collect();
                if !self.formats.contains(&self.target_format) {
                    tracing::warn!(format = %self.target_format, "target format is not offered by this server");
                }
            }
            ServerMessage::Pm {
                sender,
                receiver,
                message,
            } => self.on_pm(sender, receiver, message),
            ServerMessage::Popup(text) => tracing::info!(popup = %text, "server popup"),
            other => tracing::trace!(kind = ?other.kind(), "global line ignored"),
        }
        None
    }

    fn on_update_user(&mut self, username: &str, named: bool) {
        self.logged_in = named;
        if !named {
            return;
        }

        if to_id(username) != self.user_id {
            tracing::warn!(username, expected = %self.config.username, "logged in under another name");
        } else {
            tracing::info!(username, "logged in");
        }

        if let Some(search) = self.last_search.take() {
            self.admit(&search);
        }
    }

    fn on_update_search(&mut self, search: &SearchState) {
        if self.config.objective == Objective::Ladder {
            self.searching = search.searching.len();
        }
        self.reported_games = search.game_count();

        if self.logged_in {
            self.admit(search);
        } else {
            self.last_search = Some(search.clone());
        }
    }

    fn pending(&self) -> usize {
        match self.config.objective {
            Objective::Ladder => self.searching,
            Objective::Challenge | Objective::Accept => usize::from(self.pending_challenge.is_some()),
        }
    }

    fn in_flight(&self) -> usize {
        self.pending() + self.reported_games.max(self.battles.len())
    }

    fn objective_met(&self) -> bool {
        self.completed.len() >= self.config.total_battles
    }

    /// Start another battle if the objective and capacity allow it
    fn admit(&mut self, search: &SearchState) {
        if self.objective_met() {
            if search.game_count() == 0 && self.battles.is_empty() {
                self.terminate(ConnectionTermination::new(
                    TerminationCode::ObjectiveComplete,
                    "required number of battles completed",
                ));
            }
            return;
        }

        let in_flight = self.in_flight();
        if in_flight >= self.config.max_concurrent_battles {
            tracing::debug!(in_flight, "at battle capacity");
            return;
        }

        match self.config.objective {
            Objective::Accept => {}
            Objective::Challenge => self.issue_challenge(),
            Objective::Ladder => {
                let searching = search
                    .searching
                    .iter()
                    .any(|format| normalize_format(format) == self.target_format);
                let playing = search.games.as_ref().is_some_and(|games| {
                    games.keys().any(|room| room.contains(&self.target_format))
                });

                if !searching && !playing {
                    tracing::info!(format = %self.target_format, "searching ladder");
                    self.outbound
                        .push(ClientMessage::global(ClientCommand::Search(
                            self.target_format.clone(),
                        )));
                    self.searching += 1;
                }
            }
        }
    }

    fn issue_challenge(&mut self) {
        if self.pending_challenge.is_some() {
            return;
        }

        let next = self
            .config
            .whitelist_users
            .iter()
            .find(|user| !self.challenged.contains(&to_id(user)))
            .cloned();
        let user = match next {
            Some(user) => user,
            None => {
                // Every whitelisted user has had a turn
                self.challenged.clear();
                match self.config.whitelist_users.first() {
                    Some(user) => user.clone(),
                    None => return,
                }
            }
        };

        tracing::info!(user = %user, format = %self.target_format, "challenging");
        self.challenged.push(to_id(&user));
        self.pending_challenge = Some(to_id(&user));
        self.outbound
            .push(ClientMessage::global(ClientCommand::Challenge {
                username: user,
                format: self.target_format.clone(),
            }));
    }

    fn on_pm(&mut self, sender: &str, receiver: &str, message: &str) {
        let sender_id = to_id(sender);
        if to_id(receiver) != self.user_id || sender_id == self.user_id {
            return;
        }

        if let Some(rest) = message.strip_prefix("/challenge") {
            let format = normalize_format(rest.split('|').next().unwrap_or_default());
            if !format.is_empty() {
                self.on_challenge(sender, &format);
            }
        } else if self.pending_challenge.as_deref() == Some(sender_id.as_str())
            && message.contains("rejected")
        {
            tracing::info!(sender, "challenge rejected");
            self.pending_challenge = None;
        }
    }

    fn on_challenge(&mut self, sender: &str, format: &str) {
        if self.config.objective != Objective::Accept {
            tracing::debug!(sender, format, "ignoring inbound challenge");
            return;
        }
        if format != self.target_format {
            tracing::info!(sender, format, "ignoring challenge in another format");
            return;
        }
        if self.objective_met() || self.in_flight() >= self.config.max_concurrent_battles {
            tracing::info!(sender, "no capacity for challenge");
            return;
        }

        tracing::info!(sender, format, "accepting challenge");
        self.pending_challenge = Some(to_id(sender));
        self.outbound
            .push(ClientMessage::global(ClientCommand::Accept(sender.to_string())));
    }
}

/// Whether `action` has the shape `signal` asks for.
///
/// Legality of the individual choices is left to the server.
fn check_shape(signal: ProgressSignal, action: &Action, slot_count: usize) -> Result<(), String> {
    match (signal, action) {
        (_, Action::Default) => Ok(()),
        (ProgressSignal::TeamOrder, Action::Team(_)) => Ok(()),
        (ProgressSignal::Move | ProgressSignal::Switch, Action::Slots(choices)) => {
            if choices.len() != slot_count {
                return Err(format!(
                    "expected {slot_count} slot choices, got {}",
                    choices.len()
                ));
            }
            for choice in choices {
                match choice {
                    SlotChoice::Item(_) => {
                        return Err("item choices cannot be submitted".to_string());
                    }
                    SlotChoice::Move(_) if signal == ProgressSignal::Switch => {
                        return Err("a forced switch only takes switch or pass".to_string());
                    }
                    _ => {}
                }
            }
            Ok(())
        }
        (signal, action) => Err(format!("{action:?} does not answer a {signal:?} decision")),
    }
}
