use std::collections::HashSet;

use indexmap::IndexMap;

use crate::model::node::{DEFAULT_NODE_WIDTH, Node, NodeId};

/// Error type for forest mutations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForestError {
    #[error("node not found: {0}")]
    NotFound(NodeId),
    #[error("parent not found: {0}")]
    ParentNotFound(NodeId),
    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),
    #[error("cannot move node {node} under {parent}: it would become its own ancestor")]
    CycleDetected { node: NodeId, parent: NodeId },
}

/// An ordered set of nodes whose parent links never form a cycle.
///
/// Every mutation that can change a parent link checks the ancestor chain
/// first, so anything handed to the layout engine from here is a forest.
/// A parent id naming a node outside the forest is tolerated (the layout
/// treats it as a root).
#[derive(Debug, Clone)]
pub struct Forest {
    nodes: IndexMap<NodeId, Node>,
    default_width: f64,
}

impl Default for Forest {
    fn default() -> Self {
        Forest::new()
    }
}

impl Forest {
    pub fn new() -> Self {
        Forest {
            nodes: IndexMap::new(),
            default_width: DEFAULT_NODE_WIDTH,
        }
    }

    /// Width given to nodes created through `add_root` / `add_child`
    pub fn with_default_width(mut self, width: f64) -> Self {
        self.default_width = width;
        self
    }

    /// Build a forest from a node snapshot, rejecting duplicate ids and cycles.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, ForestError> {
        let mut map = IndexMap::with_capacity(nodes.len());
        for node in nodes {
            let id = node.id;
            if map.insert(id, node).is_some() {
                return Err(ForestError::DuplicateId(id));
            }
        }
        let forest = Forest {
            nodes: map,
            default_width: DEFAULT_NODE_WIDTH,
        };

        for node in forest.nodes.values() {
            if let Some(parent) = node.parent_id {
                if forest.would_create_cycle(node.id, parent) {
                    return Err(ForestError::CycleDetected {
                        node: node.id,
                        parent,
                    });
                }
            }
        }
        Ok(forest)
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes.into_values().collect()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// The smallest id above every id in use
    pub fn next_id(&self) -> NodeId {
        NodeId(self.nodes.keys().map(|id| id.0).max().map_or(1, |max| max + 1))
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    pub fn add_root(&mut self, text: impl Into<String>) -> NodeId {
        let id = self.next_id();
        let mut node = Node::new(id, None, text);
        node.width = self.default_width;
        self.nodes.insert(id, node);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, text: impl Into<String>) -> Result<NodeId, ForestError> {
        if !self.contains(parent) {
            return Err(ForestError::ParentNotFound(parent));
        }
        let id = self.next_id();
        let mut node = Node::new(id, Some(parent), text);
        node.width = self.default_width;
        self.nodes.insert(id, node);
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Reparenting
    // -----------------------------------------------------------------------

    /// Walk the ancestor chain of `candidate_parent`; a cycle would form if
    /// it reaches `node` (or loops on itself).
    pub fn would_create_cycle(&self, node: NodeId, candidate_parent: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent);
        while let Some(current) = cursor {
            if current == node || !visited.insert(current) {
                return true;
            }
            cursor = self.nodes.get(&current).and_then(|n| n.parent_id);
        }
        false
    }

    /// Move `id` under `new_parent`, or make it a root when `None`.
    ///
    /// The node keeps its place in the input order, so among its new siblings
    /// it sorts by that position.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), ForestError> {
        if !self.contains(id) {
            return Err(ForestError::NotFound(id));
        }
        if let Some(parent) = new_parent {
            if !self.contains(parent) {
                return Err(ForestError::ParentNotFound(parent));
            }
            if self.would_create_cycle(id, parent) {
                log::info!("event=reparent_rejected node={} parent={}", id, parent);
                return Err(ForestError::CycleDetected { node: id, parent });
            }
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent_id = new_parent;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Remove a node together with its whole subtree. Returns the removed
    /// nodes, the target first.
    pub fn remove(&mut self, id: NodeId) -> Result<Vec<Node>, ForestError> {
        if !self.contains(id) {
            return Err(ForestError::NotFound(id));
        }
        let mut doomed = vec![id];
        doomed.extend(self.descendants(id));

        let removed = doomed
            .iter()
            .filter_map(|d| self.nodes.shift_remove(d))
            .collect();
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.is_root() || n.parent_id.is_some_and(|p| !self.contains(p)))
            .map(|n| n.id)
            .collect()
    }

    /// Direct children in input order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.parent_id == Some(id))
            .map(|n| n.id)
            .collect()
    }

    /// Ancestor chain, nearest parent first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cursor = self.nodes.get(&id).and_then(|n| n.parent_id);
        while let Some(current) = cursor {
            if current == id || chain.contains(&current) || !self.contains(current) {
                break;
            }
            chain.push(current);
            cursor = self.nodes.get(&current).and_then(|n| n.parent_id);
        }
        chain
    }

    /// Every node below `id`, in pre-order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut stack: Vec<NodeId> = self.children(id).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).into_iter().rev());
        }
        out
    }
}
