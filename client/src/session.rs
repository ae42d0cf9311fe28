use anyhow::Result;
use seer_battle::{Action, ProgressSignal};

use crate::auth;
use crate::config::ConnectorConfig;
use crate::connection::Connection;
use crate::controller::{FlowController, Poll, Step};
use crate::sink::{BattleSink, FileSink};

/// A live connection driven one decision at a time.
///
/// ```ignore
/// let mut session = Session::connect(config).await?;
/// let mut action = None;
/// loop {
///     let step = session.next(action.take()).await;
///     if step.signal == ProgressSignal::FullEnd {
///         break;
///     }
///     action = pick(&step);
/// }
/// ```
pub struct Session {
    connection: Connection,
    controller: FlowController,
    closed: bool,
}

impl Session {
    /// Validate `config`, open the websocket and persist battles per the
    /// config's save switches
    pub async fn connect(config: ConnectorConfig) -> Result<Self> {
        config.validate()?;
        let sink = FileSink::new(&config.log_dir, seer_battle::normalize_format(&config.target_format))
            .with_logs(config.save_logs)
            .with_json(config.save_json);
        Self::connect_with_sink(config, Box::new(sink)).await
    }

    pub async fn connect_with_sink(
        config: ConnectorConfig,
        sink: Box<dyn BattleSink>,
    ) -> Result<Self> {
        let connection = Connection::connect(&config.showdown_uri).await?;
        tracing::info!(uri = %config.showdown_uri, "connected");

        Ok(Self {
            connection,
            controller: FlowController::new(config, sink),
            closed: false,
        })
    }

    pub fn controller(&self) -> &FlowController {
        &self.controller
    }

    /// Answer the previous step and wait for the next one.
    ///
    /// Pass `None` on the first call and after `GameEnd`. Once a `FullEnd`
    /// step is returned the socket is closed and every later call returns it
    /// again.
    pub async fn next(&mut self, action: Option<Action>) -> Step {
        self.controller.resume(action);

        loop {
            self.flush().await;

            match self.controller.poll() {
                Poll::Decision(step) => {
                    if step.signal == ProgressSignal::FullEnd {
                        self.close().await;
                    }
                    return step;
                }
                Poll::Authenticate { challstr } => {
                    let config = self.controller.config();
                    let result = auth::get_assertion(
                        &config.login_uri,
                        &config.username,
                        &config.password,
                        &challstr,
                    )
                    .await;

                    match result {
                        Ok(assertion) => self.controller.authenticated(assertion),
                        Err(e) => self.controller.authentication_failed(format!("{e:#}")),
                    }
                }
                Poll::NeedInput => match self.connection.next_frame().await {
                    Ok(Some(frame)) => self.controller.feed(frame),
                    Ok(None) => self.controller.connection_lost("server closed the connection"),
                    Err(e) => self.controller.connection_lost(format!("{e:#}")),
                },
            }
        }
    }

    async fn flush(&mut self) {
        if self.closed {
            return;
        }
        for message in self.controller.take_outbound() {
            if let Err(e) = self.connection.send(&message).await {
                self.controller.connection_lost(format!("{e:#}"));
                return;
            }
        }
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.flush().await;
        self.closed = true;
        if let Err(e) = self.connection.close().await {
            tracing::debug!(error = %e, "websocket close failed");
        }
    }
}
