//! Session actor
//!
//! A single task owns the transport link, the connection state machine, the
//! event router, and the pending-command ledger. Every transport signal and
//! every caller call arrives as a message and is processed one at a time in
//! arrival order, so no locking is needed and the ordering guarantees of the
//! protocol carry through to observers and command outcomes.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use tl_core::config::ClientConfig;
use tl_core::error::{SessionError, TransportError};
use tl_core::traits::{Connector, Link, LinkEvent};
use tl_core::types::ConnectionState;
use tl_protocol::{AgentCommand, ConnectionStatus, CorrelationId, StatusKind};

use crate::backoff::BackoffPolicy;
use crate::commands::{CommandOutcome, PendingCommand, PendingCommands};
use crate::router::EventRouter;

/// Caller requests delivered to the actor
pub(crate) enum Control {
    /// Start connecting (no-op while an attempt or session is active)
    Connect,
    /// Tear everything down and go to `Disconnected`
    Disconnect,
    /// Send a command and deliver its acknowledgement outcome to `reply`
    Send {
        command: AgentCommand,
        reply: oneshot::Sender<CommandOutcome>,
    },
}

/// Messages the actor sends itself from spawned helper tasks
enum Internal {
    /// A connection attempt finished
    ConnectFinished {
        epoch: u64,
        result: Result<Link, TransportError>,
    },
    /// The ack timeout for a command elapsed
    AckDeadline {
        correlation: CorrelationId,
        timeout: std::time::Duration,
    },
}

/// What the select loop woke up for
enum Tick {
    Control(Control),
    Internal(Internal),
    Link(Option<LinkEvent>),
    Retry,
    Shutdown,
}

pub(crate) struct SessionActor {
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    router: EventRouter,
    backoff: BackoffPolicy,

    control_rx: mpsc::UnboundedReceiver<Control>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    state_tx: watch::Sender<ConnectionState>,

    state: ConnectionState,
    link: Option<Link>,
    pending: PendingCommands,

    /// Consecutive connection failures since the last success
    attempts: u32,
    /// When the next reconnect attempt is due, if one is scheduled
    retry_at: Option<Instant>,
    /// Cancels the in-flight connection attempt, if one is running
    attempt_cancel: Option<CancellationToken>,
    /// Bumped on disconnect so outcomes of abandoned attempts are discarded
    epoch: u64,
}

impl SessionActor {
    pub(crate) fn new(
        config: ClientConfig,
        connector: Arc<dyn Connector>,
        router: EventRouter,
        control_rx: mpsc::UnboundedReceiver<Control>,
        state_tx: watch::Sender<ConnectionState>,
    ) -> Self {
        let backoff = BackoffPolicy::from_config(&config.backoff);
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        Self {
            config,
            connector,
            router,
            backoff,
            control_rx,
            internal_tx,
            internal_rx,
            state_tx,
            state: ConnectionState::Disconnected,
            link: None,
            pending: PendingCommands::new(),
            attempts: 0,
            retry_at: None,
            attempt_cancel: None,
            epoch: 0,
        }
    }

    /// Run until the owning client is dropped
    pub(crate) async fn run(mut self) {
        loop {
            let link_active = self.link.is_some();
            let retry_armed = self.retry_at.is_some();

            let tick = tokio::select! {
                control = self.control_rx.recv() => match control {
                    Some(control) => Tick::Control(control),
                    None => Tick::Shutdown,
                },
                internal = self.internal_rx.recv() => match internal {
                    Some(internal) => Tick::Internal(internal),
                    // Unreachable: the actor holds a sender clone
                    None => Tick::Shutdown,
                },
                event = Self::next_link_event(&mut self.link), if link_active => Tick::Link(event),
                _ = Self::sleep_until(self.retry_at), if retry_armed => Tick::Retry,
            };

            match tick {
                Tick::Control(Control::Connect) => self.handle_connect(),
                Tick::Control(Control::Disconnect) => self.handle_disconnect().await,
                Tick::Control(Control::Send { command, reply }) => {
                    self.handle_send(command, reply).await;
                }
                Tick::Internal(internal) => self.handle_internal(internal),
                Tick::Link(event) => self.handle_link_event(event),
                Tick::Retry => {
                    self.retry_at = None;
                    self.begin_attempt();
                }
                Tick::Shutdown => {
                    self.shutdown().await;
                    break;
                }
            }
        }
    }

    async fn next_link_event(link: &mut Option<Link>) -> Option<LinkEvent> {
        match link.as_mut() {
            Some(link) => link.events.recv().await,
            None => std::future::pending().await,
        }
    }

    async fn sleep_until(deadline: Option<Instant>) {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }

    fn handle_connect(&mut self) {
        match self.state {
            ConnectionState::Disconnected | ConnectionState::Failed => {
                self.attempts = 0;
                self.set_state(ConnectionState::Connecting);
                self.emit_status(
                    StatusKind::Connecting,
                    format!("connecting to {}", self.config.endpoint),
                );
                self.begin_attempt();
            }
            // An attempt, session, or retry timer is already outstanding;
            // starting another would violate the single-attempt invariant.
            ConnectionState::Connecting
            | ConnectionState::Connected
            | ConnectionState::Reconnecting => {
                tracing::debug!("connect() ignored; state is {}", self.state);
            }
        }
    }

    async fn handle_disconnect(&mut self) {
        self.epoch += 1;
        if let Some(cancel) = self.attempt_cancel.take() {
            cancel.cancel();
        }
        self.retry_at = None;
        self.attempts = 0;
        if let Some(link) = self.link.take() {
            let _ = link.sender.close().await;
        }
        self.pending.reject_all("disconnected by client");
        if self.state != ConnectionState::Disconnected {
            self.set_state(ConnectionState::Disconnected);
            self.emit_status(StatusKind::Disconnected, "disconnected by client");
        }
    }

    async fn handle_send(&mut self, command: AgentCommand, reply: oneshot::Sender<CommandOutcome>) {
        if !self.state.is_connected() {
            let _ = reply.send(Err(SessionError::NotConnected));
            return;
        }
        let Some(link) = self.link.as_ref() else {
            let _ = reply.send(Err(SessionError::NotConnected));
            return;
        };

        let correlation = self.pending.allocate();
        if let Err(entry) = self.pending.insert(correlation, PendingCommand::new(reply)) {
            entry.resolve(Err(SessionError::CorrelationInUse(correlation)));
            return;
        }

        tracing::debug!(
            "Sending {} command as {}",
            command.command_type(),
            correlation
        );
        if let Err(e) = link.sender.send_command(correlation, &command).await {
            self.pending.resolve(correlation, Err(SessionError::Transport(e)));
            return;
        }

        if let Some(timeout) = self.config.ack_timeout {
            let internal_tx = self.internal_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                let _ = internal_tx.send(Internal::AckDeadline {
                    correlation,
                    timeout,
                });
            });
        }
    }

    fn handle_internal(&mut self, internal: Internal) {
        match internal {
            Internal::ConnectFinished { epoch, result } => {
                if epoch != self.epoch {
                    // Attempt was abandoned by a disconnect; a connection that
                    // slipped through anyway must not resurrect the session.
                    if let Ok(link) = result {
                        Self::discard_link(link);
                    }
                    return;
                }
                self.attempt_cancel = None;
                match result {
                    Ok(link) => self.handle_connected(link),
                    Err(e) => {
                        tracing::warn!("Connection attempt failed: {}", e);
                        self.router.report(SessionError::Transport(e));
                        self.handle_connection_failure();
                    }
                }
            }
            Internal::AckDeadline {
                correlation,
                timeout,
            } => {
                if self
                    .pending
                    .resolve(correlation, Err(SessionError::AckTimeout(timeout)))
                {
                    tracing::warn!("Command {} unacknowledged after {:?}", correlation, timeout);
                }
            }
        }
    }

    fn handle_connected(&mut self, link: Link) {
        if !matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Reconnecting
        ) {
            Self::discard_link(link);
            return;
        }
        self.link = Some(link);
        self.attempts = 0;
        self.set_state(ConnectionState::Connected);
        self.emit_status(
            StatusKind::Connected,
            format!("connected to {}", self.config.endpoint),
        );
    }

    fn handle_link_event(&mut self, event: Option<LinkEvent>) {
        match event {
            Some(LinkEvent::Status(status)) => self.router.route_status(status),
            Some(LinkEvent::Event(raw)) => self.router.dispatch(raw),
            Some(LinkEvent::Ack { correlation, error }) => {
                let outcome = match error {
                    None => Ok(()),
                    Some(reason) => Err(SessionError::Rejected(reason)),
                };
                if !self.pending.resolve(correlation, outcome) {
                    tracing::debug!("Ack for unknown command {}", correlation);
                }
            }
            Some(LinkEvent::Error(message)) => self.handle_link_failure(message),
            Some(LinkEvent::Closed { reason }) => {
                tracing::info!("Connection closed: {}", reason);
                if let Some(link) = self.link.take() {
                    Self::discard_link(link);
                }
                self.pending.reject_all(&reason);
                self.set_state(ConnectionState::Disconnected);
                self.emit_status(StatusKind::Disconnected, reason);
            }
            // Event channel dropped without a close notification
            None => self.handle_link_failure("transport channel closed".to_string()),
        }
    }

    /// An established connection was interrupted
    fn handle_link_failure(&mut self, message: String) {
        tracing::warn!("Connection interrupted: {}", message);
        if let Some(link) = self.link.take() {
            Self::discard_link(link);
        }
        self.pending.reject_all(&message);
        self.router
            .report(SessionError::Transport(TransportError::Interrupted(message)));
        self.handle_connection_failure();
    }

    /// Count a failure, then either schedule the next attempt or give up
    fn handle_connection_failure(&mut self) {
        self.attempts += 1;
        if self.attempts >= self.config.max_reconnect_attempts {
            tracing::warn!(
                "Giving up after {} consecutive connection failures",
                self.attempts
            );
            self.retry_at = None;
            self.set_state(ConnectionState::Failed);
            self.emit_status(
                StatusKind::Failed,
                format!(
                    "reconnect attempts exhausted after {} failures",
                    self.attempts
                ),
            );
        } else {
            let delay = self.backoff.delay(self.attempts - 1);
            tracing::debug!(
                "Connection attempt {} failed; retrying in {:?}",
                self.attempts,
                delay
            );
            self.retry_at = Some(Instant::now() + delay);
            self.set_state(ConnectionState::Reconnecting);
        }
    }

    /// Spawn one connection attempt, cancelable and tagged with the epoch
    fn begin_attempt(&mut self) {
        let cancel = CancellationToken::new();
        self.attempt_cancel = Some(cancel.clone());

        let epoch = self.epoch;
        let connector = Arc::clone(&self.connector);
        let endpoint = self.config.endpoint.clone();
        let token = self.config.auth_token.clone();
        let connect_timeout = self.config.connect_timeout;
        let internal_tx = self.internal_tx.clone();

        tokio::spawn(async move {
            let attempt = async {
                match tokio::time::timeout(connect_timeout, connector.connect(&endpoint, &token))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(TransportError::Timeout(connect_timeout)),
                }
            };
            tokio::select! {
                _ = cancel.cancelled() => {}
                result = attempt => {
                    let _ = internal_tx.send(Internal::ConnectFinished { epoch, result });
                }
            }
        });
    }

    async fn shutdown(&mut self) {
        if let Some(cancel) = self.attempt_cancel.take() {
            cancel.cancel();
        }
        self.retry_at = None;
        if let Some(link) = self.link.take() {
            let _ = link.sender.close().await;
        }
        self.pending.reject_all("session client dropped");
        self.set_state(ConnectionState::Disconnected);
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            tracing::debug!("Connection state: {} -> {}", self.state, state);
            self.state = state;
            let _ = self.state_tx.send(state);
        }
    }

    fn emit_status(&self, kind: StatusKind, message: impl Into<String>) {
        self.router
            .route_status(ConnectionStatus::new(kind, message));
    }

    /// Close an unwanted link without blocking the actor
    fn discard_link(link: Link) {
        tokio::spawn(async move {
            let _ = link.sender.close().await;
        });
    }
}
