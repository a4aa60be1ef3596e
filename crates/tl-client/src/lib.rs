//! tl-client: Session client for the tasklink orchestration service
//!
//! Maintains a persistent connection to the orchestration service over a
//! caller-supplied transport, reconnecting with exponential backoff when the
//! connection drops. Inbound typed events are routed to a caller-supplied
//! observer; outbound commands are correlated with their acknowledgements so
//! each send becomes an awaitable operation with a success/failure outcome.
//!
//! The entry point is [`SessionClient`]; everything else hangs off the actor
//! task it spawns.

pub mod backoff;
pub mod client;
mod commands;
pub mod router;
mod session;

pub use backoff::BackoffPolicy;
pub use client::SessionClient;
