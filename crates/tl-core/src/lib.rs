//! tl-core: Core abstractions and configuration for tasklink
//!
//! This crate provides the shared types, traits, and configuration structures
//! used by the session client: the connection state model, the error
//! taxonomy, the transport boundary, and the caller-facing observer trait.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{SessionError, TransportError};
pub use types::{AuthToken, ConnectionState};
