// Unit hierarchy graph maintained from streamed connection events

use std::collections::{HashMap, HashSet};

#[cfg(test)]
mod tests;

/// Errors raised by hierarchy mutations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("unit not known: {0}")]
    UnknownUnit(String),

    #[error("connection not known: {0}")]
    UnknownConnection(String),

    #[error("connecting {parent} -> {child} would create a cycle")]
    CycleDetected { parent: String, child: String },
}

/// Position of one unit inside the hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitNode {
    parent: Option<String>,
    children: Vec<String>,
}

impl UnitNode {
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// A registered parent -> child edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub parent: String,
    pub child: String,
}

/// In-memory forest of units keyed by guid
///
/// Every unit has at most one parent. `add_connection` rejects edges that
/// would close a cycle, so descendant traversal always terminates. Adding a
/// connection for a child that already has a different parent moves the
/// child: the old edge and its connection record are dropped first.
///
/// Not synchronized; callers hold [`crate::hierarchy::Hierarchy`]'s guard.
#[derive(Debug, Default)]
pub struct UnitGraph {
    units: HashMap<String, UnitNode>,
    connections: HashMap<String, Edge>,
}

impl UnitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit. Returns false if it was already known.
    pub fn add_unit(&mut self, guid: &str) -> bool {
        if self.units.contains_key(guid) {
            return false;
        }
        self.units.insert(guid.to_string(), UnitNode::default());
        true
    }

    pub fn has_unit(&self, guid: &str) -> bool {
        self.units.contains_key(guid)
    }

    pub fn unit(&self, guid: &str) -> Option<&UnitNode> {
        self.units.get(guid)
    }

    /// Remove a unit node. Edges touching it are left in place; remove its
    /// connections first.
    pub fn remove_unit(&mut self, guid: &str) -> Option<UnitNode> {
        self.units.remove(guid)
    }

    /// Create the edge `parent -> child` under `connection_guid`.
    ///
    /// Returns the child's previous parent when the child was moved.
    /// Fails without mutating if either endpoint is unknown or if `child`
    /// is `parent` or one of its ancestors. Re-adding a known connection guid
    /// with the same endpoints is a no-op; with different endpoints the old
    /// edge is replaced.
    pub fn add_connection(
        &mut self,
        connection_guid: &str,
        parent: &str,
        child: &str,
    ) -> Result<Option<String>, GraphError> {
        if !self.has_unit(parent) {
            return Err(GraphError::UnknownUnit(parent.to_string()));
        }
        if !self.has_unit(child) {
            return Err(GraphError::UnknownUnit(child.to_string()));
        }

        let replaced = self.connections.get(connection_guid);
        if let Some(existing) = replaced {
            if existing.parent == parent && existing.child == child {
                return Ok(None);
            }
        }

        if parent == child || self.is_ancestor(child, parent, replaced) {
            return Err(GraphError::CycleDetected {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }

        if let Some(old) = self.connections.remove(connection_guid) {
            self.detach(&old);
        }

        let previous_parent = self
            .units
            .get(child)
            .and_then(|node| node.parent.clone())
            .filter(|previous| previous != parent);

        if let Some(previous) = &previous_parent {
            let stale = Edge {
                parent: previous.clone(),
                child: child.to_string(),
            };
            self.detach(&stale);
        }
        // One connection record per child
        self.connections.retain(|_, edge| edge.child != child);

        if let Some(node) = self.units.get_mut(parent) {
            if !node.children.iter().any(|c| c == child) {
                node.children.push(child.to_string());
            }
        }
        if let Some(node) = self.units.get_mut(child) {
            node.parent = Some(parent.to_string());
        }

        self.connections.insert(
            connection_guid.to_string(),
            Edge {
                parent: parent.to_string(),
                child: child.to_string(),
            },
        );

        Ok(previous_parent)
    }

    pub fn has_connection(&self, connection_guid: &str) -> bool {
        self.connections.contains_key(connection_guid)
    }

    pub fn connection(&self, connection_guid: &str) -> Option<&Edge> {
        self.connections.get(connection_guid)
    }

    /// Remove a connection and clear its edge.
    ///
    /// The connection record is always consumed. If either endpoint unit is
    /// no longer registered the edge cannot be repaired and
    /// `GraphError::UnknownUnit` is returned.
    pub fn remove_connection(&mut self, connection_guid: &str) -> Result<Edge, GraphError> {
        let edge = self
            .connections
            .remove(connection_guid)
            .ok_or_else(|| GraphError::UnknownConnection(connection_guid.to_string()))?;

        if !self.has_unit(&edge.parent) {
            return Err(GraphError::UnknownUnit(edge.parent));
        }
        if !self.has_unit(&edge.child) {
            return Err(GraphError::UnknownUnit(edge.child));
        }

        self.detach(&edge);
        Ok(edge)
    }

    /// All units reachable through `children` edges, depth-first.
    ///
    /// Direct children come first, followed by each child's own descendants.
    /// Unknown units have no descendants.
    pub fn descendants_of(&self, guid: &str) -> Vec<String> {
        let mut visited = HashSet::new();
        visited.insert(guid.to_string());
        let mut descendants = Vec::new();
        self.collect_descendants(guid, &mut visited, &mut descendants);
        descendants
    }

    /// True if the unit has no parent and at least one child
    pub fn is_group_root(&self, guid: &str) -> bool {
        self.units
            .get(guid)
            .map(|node| !node.has_parent() && node.has_children())
            .unwrap_or(false)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn collect_descendants(&self, guid: &str, visited: &mut HashSet<String>, out: &mut Vec<String>) {
        let Some(node) = self.units.get(guid) else {
            return;
        };

        let fresh: Vec<&String> = node
            .children
            .iter()
            .filter(|child| visited.insert((*child).clone()))
            .collect();

        out.extend(fresh.iter().map(|child| (*child).clone()));
        for child in fresh {
            self.collect_descendants(child, visited, out);
        }
    }

    /// True if `ancestor` is found walking up the parent chain from `guid`.
    ///
    /// The walk stops at `ignored`, the edge about to be replaced.
    fn is_ancestor(&self, ancestor: &str, guid: &str, ignored: Option<&Edge>) -> bool {
        let mut child = guid;
        let mut steps = 0;

        while let Some(parent) = self.units.get(child).and_then(|node| node.parent.as_deref()) {
            if ignored.is_some_and(|edge| edge.parent == parent && edge.child == child) {
                break;
            }
            if parent == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.units.len() {
                break;
            }
            child = parent;
        }

        false
    }

    fn detach(&mut self, edge: &Edge) {
        if let Some(parent) = self.units.get_mut(&edge.parent) {
            parent.children.retain(|c| c != &edge.child);
        }
        if let Some(child) = self.units.get_mut(&edge.child) {
            if child.parent.as_deref() == Some(edge.parent.as_str()) {
                child.parent = None;
            }
        }
    }
}
