//! Hierarchy nodes.

use std::fmt;

use crate::geom::XformOp;
use crate::scene::NodePath;

/// Stable index of a node in its [`Stage`](crate::scene::Stage) arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The hierarchy root, present in every stage.
    pub const ROOT: Self = Self(0);

    /// Arena index.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node is, which decides whether it can carry transform ops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// Pure transform group.
    Xform,
    /// Renderable geometry (cube, mesh, ...).
    Geometry,
    Camera,
    Light,
    /// Grouping without a transform.
    Scope,
    /// Placeholder, e.g. an ancestor created implicitly by a deeper define.
    #[default]
    Untyped,
}

impl NodeKind {
    /// Whether nodes of this kind carry transform ops.
    #[inline]
    pub fn is_transformable(&self) -> bool {
        matches!(self, Self::Xform | Self::Geometry | Self::Camera | Self::Light)
    }

    /// Short type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xform => "Xform",
            Self::Geometry => "Geometry",
            Self::Camera => "Camera",
            Self::Light => "Light",
            Self::Scope => "Scope",
            Self::Untyped => "",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the hierarchy arena.
///
/// The parent link is a plain id; ownership of every node stays with the
/// stage.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) path: NodePath,
    pub(crate) kind: NodeKind,
    pub(crate) ops: Vec<XformOp>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) resets_xform_stack: bool,
}

impl Node {
    pub(crate) fn new(id: NodeId, path: NodePath, kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            id,
            path,
            kind,
            ops: Vec::new(),
            parent,
            children: Vec::new(),
            resets_xform_stack: false,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Full path.
    #[inline]
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Last path component.
    #[inline]
    pub fn name(&self) -> &str {
        self.path.name()
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    pub fn is_transformable(&self) -> bool {
        self.kind.is_transformable()
    }

    /// Transform ops in authored order.
    #[inline]
    pub fn ops(&self) -> &[XformOp] {
        &self.ops
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether this node ignores every ancestor transform.
    #[inline]
    pub fn resets_xform_stack(&self) -> bool {
        self.resets_xform_stack
    }
}
