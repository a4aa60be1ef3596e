//! Inbound event types
//!
//! The orchestration service pushes asynchronous events describing remote
//! state changes. Events arrive as JSON objects tagged by a `type` field;
//! [`AgentEvent::from_value`] validates the tag before deserializing so that
//! unknown and malformed messages can be distinguished and dropped cleanly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::task::{Step, Task};

/// Coarse connection state reported in a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// A connection attempt is in progress
    Connecting,
    /// The session is established
    Connected,
    /// The session ended cleanly
    Disconnected,
    /// Reconnection attempts were exhausted
    Failed,
}

/// Connection status notification
///
/// Transient value produced on every connection state transition; not
/// persisted anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Coarse state
    pub status: StatusKind,
    /// Human-readable detail
    pub message: String,
}

impl ConnectionStatus {
    /// Build a status notification
    pub fn new(status: StatusKind, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Event tags recognized by [`AgentEvent::from_value`]
const KNOWN_EVENT_TYPES: &[&str] = &["task_update", "step_update", "human_input_needed", "error"];

/// Asynchronous event pushed by the orchestration service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// A task record changed; carries the full replacement snapshot
    TaskUpdate {
        /// New authoritative snapshot
        task: Task,
    },
    /// A single step changed within a task
    StepUpdate {
        /// Task the step belongs to
        task_id: String,
        /// Index of the step within the task's step list
        step_index: usize,
        /// New step snapshot
        step: Step,
    },
    /// The orchestrator is blocked waiting for human input
    HumanInputNeeded {
        /// Task that is blocked
        task_id: String,
        /// Step that is blocked
        step_index: usize,
        /// Question to present to the human
        prompt: String,
        /// Preset answers, if the question is multiple-choice
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Vec<String>>,
    },
    /// The orchestrator reported an error not tied to a command
    Error {
        /// Error description
        message: String,
        /// Optional structured detail
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<HashMap<String, Value>>,
    },
}

impl AgentEvent {
    /// Parse a raw inbound event payload.
    ///
    /// Checks the `type` tag before deserializing so callers can tell an
    /// unknown event apart from a recognized-but-malformed one.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingEventType)?;

        if !KNOWN_EVENT_TYPES.contains(&tag) {
            return Err(ProtocolError::UnknownEventType(tag.to_string()));
        }

        let event_type = tag.to_string();
        serde_json::from_value(value)
            .map_err(|source| ProtocolError::MalformedEvent { event_type, source })
    }

    /// The wire tag for this event
    pub fn event_type(&self) -> &'static str {
        match self {
            AgentEvent::TaskUpdate { .. } => "task_update",
            AgentEvent::StepUpdate { .. } => "step_update",
            AgentEvent::HumanInputNeeded { .. } => "human_input_needed",
            AgentEvent::Error { .. } => "error",
        }
    }
}
