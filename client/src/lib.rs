//! Async Pokemon Showdown connector.
//!
//! A [`Session`] owns one websocket, logs in, finds battles according to the
//! configured [`Objective`] and hands every decision point to the caller as a
//! [`Step`]. The protocol logic itself lives in the sans-I/O
//! [`FlowController`], so it can be driven and tested without a server.
//!
//! # Example
//!
//! ```ignore
//! use seer_client::{ConnectorConfig, DefaultPolicy, Session, play};
//!
//! let config = ConnectorConfig::from_json_file("seer.json")?;
//! let mut session = Session::connect(config).await?;
//! let termination = play(&mut session, &mut DefaultPolicy).await;
//! println!("finished: {termination}");
//! ```

pub mod auth;
mod config;
mod connection;
mod controller;
mod policy;
mod session;
mod sink;
mod termination;

pub use config::{
    ConfigError, ConnectorConfig, DEFAULT_LOGIN_URI, DEFAULT_SHOWDOWN_URI, Objective,
};
pub use connection::Connection;
pub use controller::{FlowController, Payload, Poll, Step};
pub use policy::{DefaultPolicy, Policy, decide, play};
pub use session::Session;
pub use sink::{BattleSink, FileSink, NullSink};
pub use termination::{ConnectionTermination, TerminationCode};

pub use seer_battle::{
    Action, BattleChoice, BattleState, ProgressSignal, SlotChoice, SlotOptions, TeamChoice,
};
pub use seer_protocol::{ClientCommand, ClientMessage, ServerFrame, ServerMessage};
