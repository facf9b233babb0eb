//! Per-request resolution tree with cycle detection
//!
//! Nodes live in an arena and refer to each other by [`NodeId`].
//! A node's children are the nodes it depends on, its parents are the nodes that depend on it.

use crate::{error::Error, limits::Limits};
use std::collections::HashSet;

/// A handle of a node inside a [`ResolutionTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena index
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Names a node in diagnostics
pub trait NodeLabel {
    /// A human-readable name of the node
    fn label(&self) -> &'static str;
}

impl NodeLabel for &'static str {
    #[inline]
    fn label(&self) -> &'static str {
        self
    }
}

#[derive(Debug)]
struct Node<T> {
    data: T,
    parents: Vec<NodeId>,
    children: Vec<NodeId>,
}

/// An arena of nodes linked in both directions.
///
/// Insertions that would make a node its own ancestor are rejected and leave
/// the tree exactly as it was.
#[derive(Debug)]
pub struct ResolutionTree<T> {
    nodes: Vec<Node<T>>,
    max_children: usize,
    max_walk: usize,
}

impl<T> Default for ResolutionTree<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResolutionTree<T> {
    /// Creates an empty tree with the default limits
    #[inline]
    pub fn new() -> Self {
        Self::with_limits(&Limits::default())
    }

    /// Creates an empty tree bounded by the given limits
    #[inline]
    pub fn with_limits(limits: &Limits) -> Self {
        Self {
            nodes: Vec::new(),
            max_children: limits.max_parameters(),
            max_walk: limits.max_walk(),
        }
    }

    /// Adds a detached node
    #[inline]
    pub fn add(&mut self, data: T) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parents: Vec::new(),
            children: Vec::new(),
        });
        id
    }

    /// Returns the number of nodes in the arena
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the arena has no nodes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node data
    #[inline]
    pub fn data(&self, id: NodeId) -> &T {
        &self.nodes[id.0].data
    }

    /// Returns the node data for update
    #[inline]
    pub fn data_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.nodes[id.0].data
    }

    /// Nodes that depend on this one
    #[inline]
    pub fn parents(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].parents
    }

    /// Nodes this one depends on
    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Detaches the node from its parents and children.
    ///
    /// The node keeps its slot in the arena, so other handles stay valid.
    pub fn remove(&mut self, id: NodeId) {
        let parents = std::mem::take(&mut self.nodes[id.0].parents);
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for parent in parents {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
        for child in children {
            self.nodes[child.0].parents.retain(|&p| p != id);
        }
    }

    /// Visits `root` and everything it depends on, depth first.
    ///
    /// Each node is visited once. The visitor returns `false` to stop the walk.
    /// Fails with [`Error::ResolutionOverflow`] when more than `max_walk` nodes are visited.
    pub fn walk<F>(&self, root: NodeId, mut visit: F) -> Result<(), Error>
    where
        F: FnMut(NodeId, &T) -> bool
    {
        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            if visited.len() > self.max_walk {
                return Err(Error::ResolutionOverflow("max_walk"));
            }
            if !visit(id, &self.nodes[id.0].data) {
                break;
            }
            stack.extend(self.nodes[id.0].children.iter().rev());
        }
        Ok(())
    }

    /// Finds the first node reachable from `root` whose data matches
    pub fn find<P>(&self, root: NodeId, predicate: P) -> Result<Option<NodeId>, Error>
    where
        P: Fn(&T) -> bool
    {
        let mut found = None;
        self.walk(root, |id, data| {
            if predicate(data) {
                found = Some(id);
                return false;
            }
            true
        })?;
        Ok(found)
    }

    /// Returns `true` if `target` is reachable from `from` through parent links
    fn is_ancestor(&self, target: NodeId, from: NodeId) -> Result<bool, Error> {
        let mut visited = HashSet::new();
        let mut stack = self.nodes[from.0].parents.clone();
        while let Some(id) = stack.pop() {
            if id == target {
                return Ok(true);
            }
            if !visited.insert(id) {
                continue;
            }
            if visited.len() > self.max_walk {
                return Err(Error::ResolutionOverflow("max_walk"));
            }
            stack.extend_from_slice(&self.nodes[id.0].parents);
        }
        Ok(false)
    }
}

impl<T: NodeLabel> ResolutionTree<T> {
    /// Records that `parent` depends on `child`.
    ///
    /// Linking an already linked pair is a no-op. Fails with
    /// [`Error::DependencyCycle`] if `child` would become its own ancestor,
    /// and with [`Error::TooManyParameters`] if `parent` already has
    /// `max_parameters` children. A failed insertion leaves the tree unchanged.
    pub fn insert(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        if self.nodes[parent.0].children.contains(&child) {
            return Ok(());
        }
        if self.nodes[parent.0].children.len() >= self.max_children {
            return Err(Error::TooManyParameters(self.nodes[parent.0].data.label()));
        }

        self.nodes[child.0].parents.push(parent);
        match self.is_ancestor(child, child) {
            Ok(false) => {
                self.nodes[parent.0].children.push(child);
                Ok(())
            },
            Ok(true) => {
                self.nodes[child.0].parents.pop();

                #[cfg(feature = "tracing")]
                tracing::warn!("dependency cycle detected at {}", self.nodes[child.0].data.label());

                Err(Error::DependencyCycle(self.nodes[child.0].data.label()))
            },
            Err(err) => {
                self.nodes[child.0].parents.pop();
                Err(err)
            }
        }
    }
}
