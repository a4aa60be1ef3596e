//! Protocol error types

use thiserror::Error;

/// Errors that can occur while parsing protocol messages
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Event payload has no `type` tag
    #[error("event message has no type tag")]
    MissingEventType,

    /// Event tag is not one the client understands
    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    /// Recognized event tag with an invalid payload
    #[error("malformed {event_type} event: {source}")]
    MalformedEvent {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
