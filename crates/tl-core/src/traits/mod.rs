//! Core trait definitions

mod observer;
mod transport;

pub use observer::{NoopObserver, SessionObserver};
pub use transport::{Connector, Link, LinkEvent, LinkSender, LINK_EVENT_CHANNEL_CAPACITY};
