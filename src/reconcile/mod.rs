// Retry queue for connections whose endpoint units are not yet known

use crate::graph::GraphError;
use crate::hierarchy::Hierarchy;
use crate::model::UnitConnection;
use crate::state::EntityStore;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, error, info};


/// A connection waiting for its endpoint units
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConnection {
    pub connection: UnitConnection,
    /// Failed reconciliation attempts so far
    pub attempts: u32,
}

/// FIFO of pending connections with an optional retry ceiling
pub struct ConnectionQueue {
    pending: Mutex<VecDeque<PendingConnection>>,

    /// Attempts after which a connection is dropped; 0 retries forever
    max_attempts: u32,
}

impl ConnectionQueue {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            max_attempts,
        }
    }

    pub fn push(&self, connection: UnitConnection) {
        self.pending.lock().push_back(PendingConnection {
            connection,
            attempts: 0,
        });
    }

    /// Take every queued connection in arrival order
    pub fn drain(&self) -> Vec<PendingConnection> {
        self.pending.lock().drain(..).collect()
    }

    /// Record a failed attempt and queue the connection again.
    ///
    /// Returns false if the retry ceiling was reached and it was dropped.
    pub fn retry(&self, mut pending: PendingConnection) -> bool {
        pending.attempts = pending.attempts.saturating_add(1);
        if self.max_attempts > 0 && pending.attempts >= self.max_attempts {
            return false;
        }
        self.pending.lock().push_back(pending);
        true
    }

    /// Drop every queued entry for `connection_guid`.
    ///
    /// Returns true if at least one entry was pending.
    pub fn remove(&self, connection_guid: &str) -> bool {
        let mut pending = self.pending.lock();
        let before = pending.len();
        pending.retain(|p| p.connection.guid != connection_guid);
        pending.len() != before
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

/// Outcome counters of one reconciliation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub connected: usize,
    pub roots_marked: usize,
    pub deferred: usize,
    pub dropped: usize,
    pub rejected: usize,
}

/// Drains the connection queue into the hierarchy once per cycle
pub struct ConnectionReconciler {
    queue: Arc<ConnectionQueue>,
    hierarchy: Arc<Hierarchy>,
    store: Arc<EntityStore>,
}

impl ConnectionReconciler {
    pub fn new(queue: Arc<ConnectionQueue>, hierarchy: Arc<Hierarchy>, store: Arc<EntityStore>) -> Self {
        Self {
            queue,
            hierarchy,
            store,
        }
    }

    /// Attempt every queued connection once.
    ///
    /// Connections with an unknown endpoint are retried next cycle;
    /// connections that would create a cycle are dropped.
    pub fn run_cycle(&self) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        for pending in self.queue.drain() {
            match self.hierarchy.connect(&pending.connection, &self.store) {
                Ok(marked) => {
                    summary.connected += 1;
                    if marked {
                        summary.roots_marked += 1;
                    }
                    debug!(
                        connection = %pending.connection.guid,
                        parent = %pending.connection.parent_unit,
                        child = %pending.connection.child_unit,
                        "Connection created"
                    );
                }
                Err(GraphError::UnknownUnit(unit)) => {
                    let guid = pending.connection.guid.clone();
                    let attempts = pending.attempts.saturating_add(1);
                    if self.queue.retry(pending) {
                        summary.deferred += 1;
                        info!(
                            connection = %guid,
                            unit = %unit,
                            attempts = attempts,
                            "Unable to create connection, parent or child unit not known. Trying again later"
                        );
                    } else {
                        summary.dropped += 1;
                        error!(
                            connection = %guid,
                            unit = %unit,
                            attempts = attempts,
                            "Dropping connection, endpoint unit never became known"
                        );
                    }
                }
                Err(e) => {
                    summary.rejected += 1;
                    error!(connection = %pending.connection.guid, error = %e, "Rejecting connection");
                }
            }
        }

        summary
    }
}
