//! Guarded unit hierarchy and synthetic group detection.
//!
//! The hierarchy graph and the group delta buffer live behind one mutex.
//! Root detection reads the graph and writes the group buffer in a single
//! critical section, so there is no second lock whose acquisition order
//! could invert.
//!
//! Lock order: the hierarchy guard may be held while reading
//! [`EntityStore`] (its methods release their shard guards before
//! returning). Never call into `Hierarchy` while holding a store guard.

use crate::graph::{Edge, GraphError, UnitGraph};
use crate::model::{Unit, UnitConnection};
use crate::state::EntityStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;


/// A group drained from the buffer, ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSnapshot {
    pub root: Unit,
    pub group_id: String,
    /// Root guid followed by its full descendant closure
    pub members: Vec<String>,
}

pub struct Hierarchy {
    inner: Mutex<HierarchyInner>,
}

#[derive(Default)]
struct HierarchyInner {
    graph: UnitGraph,

    /// Root units waiting for the next group report
    pending_groups: HashMap<String, Unit>,

    /// Root unit guid -> synthetic group id, stable for the process lifetime
    group_ids: HashMap<String, String>,
}

impl HierarchyInner {
    fn mark_if_root(&mut self, unit: &Unit) -> bool {
        if !self.graph.is_group_root(&unit.guid) {
            return false;
        }
        self.pending_groups.insert(unit.guid.clone(), unit.clone());
        true
    }

    fn group_id(&mut self, root_guid: &str) -> String {
        self.group_ids
            .entry(root_guid.to_string())
            .or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    }
}

impl Hierarchy {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HierarchyInner::default()),
        }
    }

    pub fn add_unit(&self, guid: &str) -> bool {
        self.inner.lock().graph.add_unit(guid)
    }

    pub fn has_unit(&self, guid: &str) -> bool {
        self.inner.lock().graph.has_unit(guid)
    }

    /// Buffer `unit` for the next group report if it is currently a root
    /// with children
    pub fn mark_if_root(&self, unit: &Unit) -> bool {
        self.inner.lock().mark_if_root(unit)
    }

    /// Add the connection's edge and re-check the parent's root status.
    ///
    /// Returns whether the parent was marked for a group report.
    pub fn connect(
        &self,
        connection: &UnitConnection,
        store: &EntityStore,
    ) -> Result<bool, GraphError> {
        let mut inner = self.inner.lock();

        let previous_parent = inner.graph.add_connection(
            &connection.guid,
            &connection.parent_unit,
            &connection.child_unit,
        )?;

        if let Some(previous) = previous_parent {
            info!(
                connection = %connection.guid,
                child = %connection.child_unit,
                from = %previous,
                to = %connection.parent_unit,
                "Unit moved to a new parent"
            );
        }

        Ok(match store.unit(&connection.parent_unit) {
            Some(parent) => inner.mark_if_root(&parent),
            None => false,
        })
    }

    /// Remove a connection, then re-check both former endpoints for root status
    pub fn disconnect(&self, connection_guid: &str, store: &EntityStore) -> Result<Edge, GraphError> {
        let mut inner = self.inner.lock();

        let edge = inner.graph.remove_connection(connection_guid)?;

        for guid in [&edge.parent, &edge.child] {
            if let Some(unit) = store.unit(guid) {
                inner.mark_if_root(&unit);
            }
        }

        Ok(edge)
    }

    /// Take every pending root, assigning group ids and computing membership.
    ///
    /// Roots that lost their root status since they were marked are dropped.
    pub fn drain_groups(&self) -> Vec<GroupSnapshot> {
        let mut inner = self.inner.lock();

        let mut roots: Vec<Unit> = inner.pending_groups.drain().map(|(_, unit)| unit).collect();
        roots.sort_by(|a, b| a.guid.cmp(&b.guid));

        let mut groups = Vec::with_capacity(roots.len());
        for root in roots {
            if !inner.graph.is_group_root(&root.guid) {
                debug!(unit = %root.guid, "Unit is no longer a group root, skipping");
                continue;
            }

            let group_id = inner.group_id(&root.guid);
            let mut members = vec![root.guid.clone()];
            members.extend(inner.graph.descendants_of(&root.guid));

            groups.push(GroupSnapshot {
                root,
                group_id,
                members,
            });
        }

        groups
    }

    /// Put roots that could not be rendered back into the group buffer.
    /// A root marked again since the drain keeps its newer state.
    pub fn defer_groups(&self, roots: impl IntoIterator<Item = Unit>) {
        let mut inner = self.inner.lock();
        for root in roots {
            inner.pending_groups.entry(root.guid.clone()).or_insert(root);
        }
    }

    pub fn pending_group_count(&self) -> usize {
        self.inner.lock().pending_groups.len()
    }

    pub fn is_group_root(&self, guid: &str) -> bool {
        self.inner.lock().graph.is_group_root(guid)
    }

    pub fn descendants_of(&self, guid: &str) -> Vec<String> {
        self.inner.lock().graph.descendants_of(guid)
    }

    pub fn has_connection(&self, connection_guid: &str) -> bool {
        self.inner.lock().graph.has_connection(connection_guid)
    }
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}
