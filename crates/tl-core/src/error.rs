//! Error types for the tasklink client

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use tl_protocol::{CorrelationId, ProtocolError};

/// Transport-level errors
///
/// These describe failures of the underlying message transport and drive the
/// connection state machine; they are surfaced to the caller only through the
/// error observer.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The connection could not be established
    #[error("failed to establish connection: {0}")]
    ConnectFailed(String),

    /// An established connection was interrupted
    #[error("connection interrupted: {0}")]
    Interrupted(String),

    /// A message could not be sent
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// A connection attempt exceeded the configured timeout
    #[error("connection attempt timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors surfaced by session operations
#[derive(Error, Debug)]
pub enum SessionError {
    /// A command was issued while the session is not connected
    #[error("not connected to orchestration service")]
    NotConnected,

    /// The connection dropped before the command was acknowledged
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// The service explicitly rejected the command
    #[error("command rejected: {0}")]
    Rejected(String),

    /// No acknowledgement arrived within the configured timeout
    #[error("no acknowledgement within {0:?}")]
    AckTimeout(Duration),

    /// A correlation id was reused while still outstanding
    #[error("correlation id {0} already in flight")]
    CorrelationInUse(CorrelationId),

    /// The caller's observer panicked during dispatch
    #[error("observer panicked: {0}")]
    Observer(String),

    /// Transport error
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Protocol error
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The session client has been shut down
    #[error("session client is closed")]
    ClientClosed,
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
