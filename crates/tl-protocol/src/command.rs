//! Outbound command types
//!
//! Commands are serialized as JSON objects tagged by a `type` field and sent
//! over the transport's `command` named message with acknowledgement
//! semantics: the service answers each command with a [`CommandAck`] carrying
//! an optional error reason.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token pairing an outbound command with its acknowledgement
///
/// Allocated monotonically per client; a correlation id is never reused while
/// a prior command with the same id is still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(pub u64);

impl CorrelationId {
    /// Create a correlation id from a raw value
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmd-{}", self.0)
    }
}

impl From<u64> for CorrelationId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Command sent to the orchestration service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentCommand {
    /// Create a new task
    AddTask {
        /// Task description
        description: String,
        /// Initial goal, if different from the description
        #[serde(default, skip_serializing_if = "Option::is_none")]
        goal: Option<String>,
    },
    /// Change an existing task's description and/or goal
    ModifyTask {
        /// Task to modify
        task_id: String,
        /// New description, if changing
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        /// New goal, if changing
        #[serde(default, skip_serializing_if = "Option::is_none")]
        goal: Option<String>,
    },
    /// Answer a pending human-input request
    HumanInput {
        /// Task the input is for
        task_id: String,
        /// Step the input is for
        step_index: usize,
        /// The human's answer
        input: String,
    },
    /// Pause task execution
    Pause,
    /// Resume task execution
    Resume,
    /// Stop task execution
    Stop,
}

impl AgentCommand {
    /// The wire tag for this command
    pub fn command_type(&self) -> &'static str {
        match self {
            AgentCommand::AddTask { .. } => "add_task",
            AgentCommand::ModifyTask { .. } => "modify_task",
            AgentCommand::HumanInput { .. } => "human_input",
            AgentCommand::Pause => "pause",
            AgentCommand::Resume => "resume",
            AgentCommand::Stop => "stop",
        }
    }
}

/// Acknowledgement payload returned for a command
///
/// Absence of `error` signals success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandAck {
    /// Rejection reason, if the service refused the command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
