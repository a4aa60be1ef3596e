//! Shared test harness: a scripted in-memory transport and a recording
//! observer, plus helpers for waiting on the session actor under paused time.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use tl_client::SessionClient;
use tl_core::error::{SessionError, TransportError};
use tl_core::traits::{
    Connector, Link, LinkEvent, LinkSender, SessionObserver, LINK_EVENT_CHANNEL_CAPACITY,
};
use tl_core::types::{AuthToken, ConnectionState};
use tl_protocol::{AgentCommand, AgentEvent, ConnectionStatus, CorrelationId, StatusKind};

/// One scripted connection outcome
pub enum Outcome {
    /// Hand out a working link
    Accept,
    /// Fail the attempt with the given reason
    Refuse(&'static str),
}

/// Connector whose attempts follow a script; once the script runs out, every
/// further attempt is accepted.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    inner: Arc<Mutex<ConnectorInner>>,
}

#[derive(Default)]
struct ConnectorInner {
    script: VecDeque<Outcome>,
    links: Vec<ServerHandle>,
    attempts: usize,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        init_tracing();
        Self::default()
    }

    /// Queue `n` refused attempts
    pub fn refuse_next(&self, n: usize, reason: &'static str) {
        let mut inner = self.inner.lock().unwrap();
        for _ in 0..n {
            inner.script.push_back(Outcome::Refuse(reason));
        }
    }

    /// Queue one accepted attempt
    pub fn accept_next(&self) {
        self.inner.lock().unwrap().script.push_back(Outcome::Accept);
    }

    /// Total connection attempts observed
    pub fn attempts(&self) -> usize {
        self.inner.lock().unwrap().attempts
    }

    /// Handle for the most recently established link
    pub fn last_link(&self) -> ServerHandle {
        self.inner
            .lock()
            .unwrap()
            .links
            .last()
            .cloned()
            .expect("no link established yet")
    }

    /// Number of links handed out
    pub fn link_count(&self) -> usize {
        self.inner.lock().unwrap().links.len()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _endpoint: &str, _token: &AuthToken) -> Result<Link, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.attempts += 1;
        match inner.script.pop_front().unwrap_or(Outcome::Accept) {
            Outcome::Refuse(reason) => Err(TransportError::ConnectFailed(reason.to_string())),
            Outcome::Accept => {
                let (events_tx, events_rx) = mpsc::channel(LINK_EVENT_CHANNEL_CAPACITY);
                let sent = Arc::new(Mutex::new(Vec::new()));
                let closed = Arc::new(AtomicBool::new(false));

                let handle = ServerHandle {
                    events: events_tx,
                    sent: Arc::clone(&sent),
                    closed: Arc::clone(&closed),
                };
                inner.links.push(handle);

                Ok(Link {
                    sender: Box::new(TestSender { sent, closed }),
                    events: events_rx,
                })
            }
        }
    }
}

/// Remote side of an established test link
#[derive(Clone)]
pub struct ServerHandle {
    events: mpsc::Sender<LinkEvent>,
    sent: Arc<Mutex<Vec<(CorrelationId, AgentCommand)>>>,
    closed: Arc<AtomicBool>,
}

impl ServerHandle {
    /// Deliver a raw link event to the client
    pub async fn push(&self, event: LinkEvent) {
        self.events.send(event).await.expect("client link gone");
    }

    /// Acknowledge a command
    pub async fn ack(&self, correlation: CorrelationId, error: Option<&str>) {
        self.push(LinkEvent::Ack {
            correlation,
            error: error.map(str::to_string),
        })
        .await;
    }

    /// Commands the client has sent over this link
    pub fn sent(&self) -> Vec<(CorrelationId, AgentCommand)> {
        self.sent.lock().unwrap().clone()
    }

    /// Correlation id of the `index`-th command sent
    pub fn correlation(&self, index: usize) -> CorrelationId {
        self.sent.lock().unwrap()[index].0
    }

    /// Whether the client closed this link
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

struct TestSender {
    sent: Arc<Mutex<Vec<(CorrelationId, AgentCommand)>>>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl LinkSender for TestSender {
    async fn send_command(
        &self,
        correlation: CorrelationId,
        command: &AgentCommand,
    ) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed("link closed".to_string()));
        }
        self.sent.lock().unwrap().push((correlation, command.clone()));
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Observer recording everything it is handed
#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<AgentEvent>>,
    pub statuses: Mutex<Vec<ConnectionStatus>>,
    pub errors: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn status_kinds(&self) -> Vec<StatusKind> {
        self.statuses.lock().unwrap().iter().map(|s| s.status).collect()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }
}

impl SessionObserver for Recorder {
    fn on_event(&self, event: AgentEvent) {
        self.events.lock().unwrap().push(event);
    }
    fn on_status(&self, status: ConnectionStatus) {
        self.statuses.lock().unwrap().push(status);
    }
    fn on_error(&self, error: SessionError) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}

/// Install a subscriber once so `RUST_LOG` surfaces actor tracing in tests
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Let the actor and helper tasks run without advancing the clock
pub async fn drain() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

/// Poll a condition, advancing paused time in small steps
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

/// Wait for the client to reach `state`
pub async fn wait_for_state(client: &SessionClient, state: ConnectionState) {
    for _ in 0..10_000 {
        if client.state() == state {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "timed out waiting for state {}, current state {}",
        state,
        client.state()
    );
}
