//! Session client façade
//!
//! [`SessionClient`] spawns the session actor and exposes the public API:
//! connection lifecycle calls and the command methods. All methods are cheap
//! message sends to the actor; the command methods additionally await the
//! acknowledgement outcome.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use tl_core::config::ClientConfig;
use tl_core::error::SessionError;
use tl_core::traits::{Connector, NoopObserver, SessionObserver};
use tl_core::types::ConnectionState;
use tl_protocol::AgentCommand;

use crate::router::EventRouter;
use crate::session::{Control, SessionActor};

/// Client for a tasklink orchestration service
///
/// Owns exactly one transport handle at a time, reconnects with exponential
/// backoff when the connection drops, and correlates every command with its
/// acknowledgement. Dropping the client shuts the session down.
pub struct SessionClient {
    control_tx: mpsc::UnboundedSender<Control>,
    state_rx: watch::Receiver<ConnectionState>,
}

impl SessionClient {
    /// Create a client with no observer; events and status changes are
    /// silently dropped.
    pub fn new(config: ClientConfig, connector: impl Connector) -> Self {
        Self::with_observer(config, connector, NoopObserver)
    }

    /// Create a client delivering events, status changes, and errors to
    /// `observer`.
    ///
    /// Must be called from within a tokio runtime; the session actor is
    /// spawned immediately but stays idle until [`connect`](Self::connect).
    pub fn with_observer(
        config: ClientConfig,
        connector: impl Connector,
        observer: impl SessionObserver + 'static,
    ) -> Self {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

        let router = EventRouter::new(Arc::new(observer));
        let actor = SessionActor::new(config, Arc::new(connector), router, control_rx, state_tx);
        tokio::spawn(actor.run());

        Self {
            control_tx,
            state_rx,
        }
    }

    /// Start connecting.
    ///
    /// Idempotent while a connection attempt or session is active: no second
    /// transport is created. From `Failed`, this resets the attempt counter
    /// and starts over.
    pub fn connect(&self) -> Result<(), SessionError> {
        self.send_control(Control::Connect)
    }

    /// Tear the session down and go to `Disconnected`.
    ///
    /// Cancels any scheduled reconnect and rejects all pending commands.
    pub fn disconnect(&self) -> Result<(), SessionError> {
        self.send_control(Control::Disconnect)
    }

    /// Whether the session is currently established
    pub fn is_connected(&self) -> bool {
        self.state_rx.borrow().is_connected()
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Create a new task on the orchestrator
    pub async fn add_task(
        &self,
        description: impl Into<String>,
        goal: Option<String>,
    ) -> Result<(), SessionError> {
        self.send(AgentCommand::AddTask {
            description: description.into(),
            goal,
        })
        .await
    }

    /// Change an existing task's description and/or goal
    pub async fn modify_task(
        &self,
        task_id: impl Into<String>,
        description: Option<String>,
        goal: Option<String>,
    ) -> Result<(), SessionError> {
        self.send(AgentCommand::ModifyTask {
            task_id: task_id.into(),
            description,
            goal,
        })
        .await
    }

    /// Answer a pending human-input request
    pub async fn send_human_input(
        &self,
        task_id: impl Into<String>,
        step_index: usize,
        input: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.send(AgentCommand::HumanInput {
            task_id: task_id.into(),
            step_index,
            input: input.into(),
        })
        .await
    }

    /// Pause task execution
    pub async fn pause(&self) -> Result<(), SessionError> {
        self.send(AgentCommand::Pause).await
    }

    /// Resume task execution
    pub async fn resume(&self) -> Result<(), SessionError> {
        self.send(AgentCommand::Resume).await
    }

    /// Stop task execution
    pub async fn stop(&self) -> Result<(), SessionError> {
        self.send(AgentCommand::Stop).await
    }

    /// Send a command and await its acknowledgement outcome.
    ///
    /// Fails immediately with [`SessionError::NotConnected`] unless the
    /// session is established. Otherwise the call suspends until the service
    /// acknowledges the command, the ack timeout (if configured) fires, or
    /// the connection is lost.
    pub async fn send(&self, command: AgentCommand) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send_control(Control::Send {
            command,
            reply: reply_tx,
        })?;
        reply_rx.await.map_err(|_| SessionError::ClientClosed)?
    }

    fn send_control(&self, control: Control) -> Result<(), SessionError> {
        self.control_tx
            .send(control)
            .map_err(|_| SessionError::ClientClosed)
    }
}
