//! Caller-facing observer trait

use crate::error::SessionError;
use tl_protocol::{AgentEvent, ConnectionStatus};

/// Sink for events, status changes, and errors, invoked synchronously by the
/// client in transport delivery order.
///
/// All methods have no-op defaults, so a caller implements only the channels
/// it cares about; unimplemented channels are silently dropped.
pub trait SessionObserver: Send + Sync {
    /// A typed event arrived from the orchestration service
    fn on_event(&self, event: AgentEvent) {
        let _ = event;
    }

    /// The connection status changed (local transition or service-reported)
    fn on_status(&self, status: ConnectionStatus) {
        let _ = status;
    }

    /// A non-fatal error occurred (transport failure, dropped message, ...)
    fn on_error(&self, error: SessionError) {
        let _ = error;
    }
}

impl<T: SessionObserver + ?Sized> SessionObserver for std::sync::Arc<T> {
    fn on_event(&self, event: AgentEvent) {
        (**self).on_event(event)
    }

    fn on_status(&self, status: ConnectionStatus) {
        (**self).on_status(status)
    }

    fn on_error(&self, error: SessionError) {
        (**self).on_error(error)
    }
}

/// Observer that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}
