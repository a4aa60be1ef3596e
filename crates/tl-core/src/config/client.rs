//! Session client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::{duration_secs, duration_secs_opt};
use crate::types::AuthToken;

/// Configuration for the session client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Orchestration service endpoint to connect to
    pub endpoint: String,

    /// Bearer token presented at transport establishment
    pub auth_token: AuthToken,

    /// Backoff configuration for reconnections
    pub backoff: BackoffConfig,

    /// Consecutive connection failures tolerated before giving up
    pub max_reconnect_attempts: u32,

    /// Timeout for a single connection attempt
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,

    /// Optional acknowledgement timeout for outstanding commands.
    ///
    /// The base protocol has no ack timeout: an unacknowledged command stays
    /// pending until the connection drops. Setting this bounds the wait and
    /// fails the command with a distinct timeout error instead.
    #[serde(with = "duration_secs_opt", skip_serializing_if = "Option::is_none")]
    pub ack_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:8765".to_string(),
            auth_token: AuthToken::new(""),
            backoff: BackoffConfig::default(),
            max_reconnect_attempts: 5,
            connect_timeout: Duration::from_secs(30),
            ack_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Build a config for the given endpoint and credential, defaults elsewhere
    pub fn new(endpoint: impl Into<String>, auth_token: impl Into<AuthToken>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_token: auth_token.into(),
            ..Self::default()
        }
    }
}

/// Exponential backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay before the first reconnect attempt
    #[serde(with = "duration_secs")]
    pub initial: Duration,

    /// Cap on the reconnect delay
    #[serde(with = "duration_secs")]
    pub max: Duration,

    /// Jitter factor (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(5),
            jitter: 0.0,
        }
    }
}
