//! In-memory node hierarchy.
//!
//! A [`Stage`] is an arena of [`Node`]s addressed by [`NodeId`]. Parents hold
//! their children as ordered id lists and each child refers back to its
//! parent by id, so the hierarchy has a single owner and no reference cycles.
//! The stage only offers the authoring needed to build hierarchies for
//! evaluation: defining nodes and appending transform ops.

use std::collections::HashMap;

use crate::geom::XformOp;
use crate::scene::{Node, NodeId, NodeKind, NodePath};
use crate::util::{Error, Result};

/// Arena-backed scene hierarchy rooted at `/`.
#[derive(Clone, Debug)]
pub struct Stage {
    nodes: Vec<Node>,
    by_path: HashMap<NodePath, NodeId>,
}

impl Stage {
    /// Create a stage holding only the root.
    pub fn new() -> Self {
        let root = Node::new(NodeId::ROOT, NodePath::root(), NodeKind::Untyped, None);
        let mut by_path = HashMap::new();
        by_path.insert(NodePath::root(), NodeId::ROOT);
        Self {
            nodes: vec![root],
            by_path,
        }
    }

    /// Define a node at `path`.
    ///
    /// Missing ancestors are created as [`NodeKind::Untyped`]. Redefining an
    /// existing node with the same kind returns its id; an untyped node takes
    /// on the new kind; any other kind change fails.
    pub fn define(&mut self, path: &str, kind: NodeKind) -> Result<NodeId> {
        let path = NodePath::parse(path)?;
        if path.is_root() {
            return Err(Error::DuplicateNode(path.to_string()));
        }

        if let Some(&id) = self.by_path.get(&path) {
            let node = &mut self.nodes[id.index()];
            if node.kind == kind {
                return Ok(id);
            }
            if node.kind == NodeKind::Untyped {
                tracing::debug!(path = %path, kind = %kind, "typing implicitly created node");
                node.kind = kind;
                return Ok(id);
            }
            return Err(Error::DuplicateNode(path.to_string()));
        }

        let parent = self.define_ancestors(&path);
        Ok(self.push_node(path, kind, parent))
    }

    /// Id of the parent of `path`, creating missing ancestors as untyped
    /// nodes from the top down.
    fn define_ancestors(&mut self, path: &NodePath) -> NodeId {
        let mut missing = Vec::new();
        let mut cursor = path.parent();
        let mut parent = NodeId::ROOT;
        while let Some(ancestor) = cursor {
            if let Some(&id) = self.by_path.get(&ancestor) {
                parent = id;
                break;
            }
            cursor = ancestor.parent();
            missing.push(ancestor);
        }
        for ancestor in missing.into_iter().rev() {
            parent = self.push_node(ancestor, NodeKind::Untyped, parent);
        }
        parent
    }

    fn push_node(&mut self, path: NodePath, kind: NodeKind, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        tracing::trace!(path = %path, %id, "define node");
        self.nodes.push(Node::new(id, path.clone(), kind, Some(parent)));
        self.nodes[parent.index()].children.push(id);
        self.by_path.insert(path, id);
        id
    }

    /// Append a transform op to a transformable node.
    pub fn add_op(&mut self, id: NodeId, op: XformOp) -> Result<()> {
        let node = self.transformable_mut(id)?;
        node.ops.push(op);
        Ok(())
    }

    /// Replace the whole op stack of a transformable node.
    pub fn set_ops(&mut self, id: NodeId, ops: Vec<XformOp>) -> Result<()> {
        self.transformable_mut(id)?.ops = ops;
        Ok(())
    }

    /// Make a transformable node ignore (or again inherit) its ancestors.
    pub fn set_resets_xform_stack(&mut self, id: NodeId, resets: bool) -> Result<()> {
        self.transformable_mut(id)?.resets_xform_stack = resets;
        Ok(())
    }

    fn transformable_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or_else(|| Error::not_found(id.to_string()))?;
        if !node.kind.is_transformable() {
            return Err(Error::invalid_kind(node.path.as_str()));
        }
        Ok(node)
    }

    /// Id of the root node.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by id.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a node by id, failing with [`Error::NodeNotFound`].
    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or_else(|| Error::not_found(id.to_string()))
    }

    /// Resolve a path to an id.
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    /// Resolve a path to a node, failing with [`Error::NodeNotFound`].
    pub fn node_at(&self, path: &str) -> Result<&Node> {
        self.lookup(path)
            .and_then(|id| self.node(id))
            .ok_or_else(|| Error::not_found(path))
    }

    /// Number of nodes including the root.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A stage always holds the root, so it is never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All nodes in definition order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Depth-first pre-order traversal below (and including) `start`.
    /// Children are visited in definition order.
    pub fn traverse(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Ancestors of `id` from its parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut cursor = self.node(id).and_then(Node::parent);
        std::iter::from_fn(move || {
            let current = cursor?;
            cursor = self.node(current).and_then(Node::parent);
            Some(current)
        })
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}
