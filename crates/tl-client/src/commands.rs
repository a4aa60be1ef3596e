//! Pending-acknowledgement ledger
//!
//! Every command sent with ack semantics gets an entry here, keyed by its
//! correlation id. The entry resolves the caller's awaited outcome exactly
//! once: when the matching ack arrives, when the ack timeout fires, or when
//! the connection drops.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tokio::sync::oneshot;
use tokio::time::Instant;

use tl_core::error::SessionError;
use tl_protocol::CorrelationId;

/// Outcome delivered to a caller awaiting a command acknowledgement
pub(crate) type CommandOutcome = Result<(), SessionError>;

/// A command awaiting acknowledgement
pub(crate) struct PendingCommand {
    resolver: oneshot::Sender<CommandOutcome>,
    issued_at: Instant,
}

impl PendingCommand {
    pub(crate) fn new(resolver: oneshot::Sender<CommandOutcome>) -> Self {
        Self {
            resolver,
            issued_at: Instant::now(),
        }
    }

    pub(crate) fn resolve(self, outcome: CommandOutcome) {
        // The caller may have dropped its receiver; that's fine
        let _ = self.resolver.send(outcome);
    }
}

/// In-memory table of commands awaiting acknowledgement
#[derive(Default)]
pub(crate) struct PendingCommands {
    entries: HashMap<CorrelationId, PendingCommand>,
    next_id: u64,
}

impl PendingCommands {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Allocate the next correlation id.
    ///
    /// Monotonic, so an id is never reused while a prior one is outstanding.
    pub(crate) fn allocate(&mut self) -> CorrelationId {
        let id = CorrelationId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Record a pending command.
    ///
    /// Duplicate correlation ids are rejected rather than overwritten; the
    /// entry is handed back so the caller can fail it.
    pub(crate) fn insert(
        &mut self,
        correlation: CorrelationId,
        entry: PendingCommand,
    ) -> Result<(), PendingCommand> {
        match self.entries.entry(correlation) {
            Entry::Occupied(_) => Err(entry),
            Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    /// Resolve a pending command and remove its entry.
    ///
    /// Returns false if no entry was outstanding for `correlation`.
    pub(crate) fn resolve(&mut self, correlation: CorrelationId, outcome: CommandOutcome) -> bool {
        match self.entries.remove(&correlation) {
            Some(entry) => {
                tracing::trace!(
                    "Resolving {} after {:?}",
                    correlation,
                    entry.issued_at.elapsed()
                );
                entry.resolve(outcome);
                true
            }
            None => false,
        }
    }

    /// Reject every outstanding command with a connection-lost error.
    ///
    /// Commands are never silently dropped: each caller gets notified exactly
    /// once.
    pub(crate) fn reject_all(&mut self, reason: &str) {
        if self.entries.is_empty() {
            return;
        }
        tracing::debug!(
            "Rejecting {} pending command(s): {}",
            self.entries.len(),
            reason
        );
        for (_, entry) in self.entries.drain() {
            entry.resolve(Err(SessionError::ConnectionLost(reason.to_string())));
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
