//! Inbound event routing
//!
//! Maps raw inbound messages to typed [`AgentEvent`] variants and forwards
//! them to the registered observer, synchronously and in arrival order.
//! Nothing that happens here may propagate back into the transport's delivery
//! path: malformed messages are dropped with a best-effort error report, and
//! a panicking observer is caught and reported the same way.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;

use tl_core::error::SessionError;
use tl_core::traits::SessionObserver;
use tl_protocol::{AgentEvent, ConnectionStatus};

/// Routes inbound messages to a single registered observer
pub struct EventRouter {
    observer: Arc<dyn SessionObserver>,
}

impl EventRouter {
    /// Create a router delivering to `observer`
    pub fn new(observer: Arc<dyn SessionObserver>) -> Self {
        Self { observer }
    }

    /// Validate and deliver a raw `event` message.
    ///
    /// Unrecognized or malformed payloads are dropped and reported through
    /// the error observer; they never reach the event observer.
    pub fn dispatch(&self, raw: Value) {
        match AgentEvent::from_value(raw) {
            Ok(event) => {
                self.guarded(|obs| obs.on_event(event));
            }
            Err(e) => {
                tracing::debug!("Dropping inbound event: {}", e);
                self.report(SessionError::Protocol(e));
            }
        }
    }

    /// Deliver a connection status notification
    pub fn route_status(&self, status: ConnectionStatus) {
        self.guarded(|obs| obs.on_status(status));
    }

    /// Deliver an error notification
    pub fn report(&self, error: SessionError) {
        let observer = Arc::clone(&self.observer);
        let outcome = panic::catch_unwind(AssertUnwindSafe(move || observer.on_error(error)));
        if outcome.is_err() {
            tracing::warn!("Error observer panicked; report dropped");
        }
    }

    /// Invoke an observer method, isolating panics from the delivery path
    fn guarded(&self, deliver: impl FnOnce(&dyn SessionObserver)) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| deliver(self.observer.as_ref())));
        if let Err(payload) = outcome {
            let message = panic_message(&*payload);
            tracing::warn!("Observer panicked during dispatch: {}", message);
            self.report(SessionError::Observer(message));
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
