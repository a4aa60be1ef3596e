//! Transport boundary traits
//!
//! The client does not implement a transport; it assumes a reliable
//! bidirectional message transport with built-in keepalive behind these
//! traits. A [`Connector`] performs one establishment attempt and yields a
//! [`Link`]: a sender half for outbound commands and an event channel for
//! everything the transport delivers back.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::types::AuthToken;
use tl_protocol::{AgentCommand, ConnectionStatus, CorrelationId};

/// Capacity of the event channel between a transport and the session actor
pub const LINK_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Abstraction over transport establishment
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Perform a single connection attempt.
    ///
    /// The credential is presented opaquely at establishment time; the client
    /// never inspects or refreshes it. Retry policy lives in the session
    /// state machine, not here.
    async fn connect(&self, endpoint: &str, token: &AuthToken) -> Result<Link, TransportError>;
}

/// Outbound half of an established transport connection
#[async_trait]
pub trait LinkSender: Send {
    /// Send a command as the transport's `command` named message, requesting
    /// an acknowledgement tagged with `correlation`.
    async fn send_command(
        &self,
        correlation: CorrelationId,
        command: &AgentCommand,
    ) -> Result<(), TransportError>;

    /// Close the connection gracefully
    async fn close(&self) -> Result<(), TransportError>;
}

/// An established transport connection
pub struct Link {
    /// Sender half for outbound commands
    pub sender: Box<dyn LinkSender>,
    /// Inbound signals and messages, in transport delivery order
    pub events: mpsc::Receiver<LinkEvent>,
}

/// Signals delivered by an established transport connection
#[derive(Debug)]
pub enum LinkEvent {
    /// Inbound `status` named message
    Status(ConnectionStatus),
    /// Inbound `event` named message, payload not yet validated
    Event(serde_json::Value),
    /// Acknowledgement for an outbound command
    Ack {
        /// Correlation token of the acknowledged command
        correlation: CorrelationId,
        /// Rejection reason; `None` means success
        error: Option<String>,
    },
    /// The connection was interrupted by a transport error
    Error(String),
    /// The connection ended cleanly
    Closed {
        /// Reason reported by the transport
        reason: String,
    },
}
