//! tl-protocol: Wire protocol for the tasklink orchestration service
//!
//! This crate defines the JSON message types exchanged between the session
//! client and the orchestration service: task snapshots, asynchronous events,
//! and the commands a client can issue.

pub mod command;
pub mod error;
pub mod event;
pub mod task;

pub use command::{AgentCommand, CommandAck, CorrelationId};
pub use error::ProtocolError;
pub use event::{AgentEvent, ConnectionStatus, StatusKind};
pub use task::{Step, StepStatus, Task};

/// Named message carrying a connection status payload.
pub const MSG_STATUS: &str = "status";

/// Named message carrying an agent event payload.
pub const MSG_EVENT: &str = "event";

/// Named message carrying a serialized command, sent with ack semantics.
pub const MSG_COMMAND: &str = "command";
