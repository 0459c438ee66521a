//! Local-to-world composition.
//!
//! `World(node) = World(parent) * Local(node)` with `World(root) = I`. The
//! ancestor chain is walked iteratively, so hierarchy depth is bounded only by
//! memory. Ancestors that cannot carry ops (scopes, untyped nodes) contribute
//! identity. A node that resets the xform stack starts a fresh chain: its
//! world transform is its local transform.

use std::fmt;

use smallvec::SmallVec;

use crate::core::{TimeCode, XformCache};
use crate::geom::{compose_ops, OpDefect};
use crate::scene::{Node, NodeId, Stage};
use crate::util::{DMat4, DVec3, Error, Result};

/// Non-fatal problem found while evaluating transforms.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// Scale op with a zero component (non-invertible transform).
    DegenerateScale {
        path: String,
        op_index: usize,
        scale: DVec3,
        time: TimeCode,
    },
    /// Inverse op whose matrix is singular; identity was used.
    SingularInverse {
        path: String,
        op_index: usize,
        time: TimeCode,
    },
    /// Batch entry that cannot carry transforms; a zero vector was emitted.
    NotTransformable { path: String },
    /// Batch entry that is not part of the stage; a zero vector was emitted.
    UnknownNode { id: NodeId },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateScale { path, op_index, scale, time } => write!(
                f,
                "{path}: op {op_index} scales by {scale} at {time}, transform is not invertible"
            ),
            Self::SingularInverse { path, op_index, time } => write!(
                f,
                "{path}: inverse op {op_index} is singular at {time}, using identity"
            ),
            Self::NotTransformable { path } => {
                write!(f, "{path} is not transformable, skipping")
            }
            Self::UnknownNode { id } => write!(f, "node {id} is not part of the stage, skipping"),
        }
    }
}

/// Record a diagnostic and log it.
pub(crate) fn report(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    tracing::warn!("{}", diagnostic);
    diagnostics.push(diagnostic);
}

/// Local matrix of one node; identity for nodes that cannot carry ops.
pub(crate) fn local_matrix(node: &Node, time: TimeCode, diagnostics: &mut Vec<Diagnostic>) -> DMat4 {
    if !node.is_transformable() {
        return DMat4::IDENTITY;
    }
    compose_ops(node.ops(), time, |op_index, defect| {
        let path = node.path().to_string();
        let diagnostic = match defect {
            OpDefect::ZeroScale(scale) => Diagnostic::DegenerateScale { path, op_index, scale, time },
            OpDefect::SingularInverse => Diagnostic::SingularInverse { path, op_index, time },
        };
        report(diagnostics, diagnostic);
    })
}

/// Walk from `id` towards the root and compose back down.
///
/// With a cache, the walk stops at the first cached ancestor and every node
/// composed on the way down is stored. `id` must belong to `stage`.
pub(crate) fn world_matrix(
    stage: &Stage,
    id: NodeId,
    time: TimeCode,
    mut cache: Option<&mut XformCache>,
    diagnostics: &mut Vec<Diagnostic>,
) -> DMat4 {
    let mut chain: SmallVec<[&Node; 16]> = SmallVec::new();
    let mut base = DMat4::IDENTITY;
    let mut cursor = Some(id);

    while let Some(current) = cursor {
        if let Some(world) = cache.as_deref_mut().and_then(|c| c.get(current)) {
            base = world;
            break;
        }
        let Some(node) = stage.node(current) else { break };
        chain.push(node);
        if node.resets_xform_stack() {
            break;
        }
        cursor = node.parent();
    }

    tracing::trace!(node = %id, depth = chain.len(), "composing world transform");

    for node in chain.iter().rev() {
        let local = local_matrix(node, time, diagnostics);
        base = if node.resets_xform_stack() { local } else { base * local };
        if let Some(cache) = cache.as_deref_mut() {
            cache.insert(node.id(), base);
        }
    }
    base
}

fn transformable<'a>(stage: &'a Stage, id: NodeId) -> Result<&'a Node> {
    let node = stage.get(id)?;
    if !node.is_transformable() {
        return Err(Error::invalid_kind(node.path().as_str()));
    }
    Ok(node)
}

/// Local-to-world transform of a transformable node.
///
/// Fails with [`Error::InvalidNodeKind`] before any evaluation when the node
/// cannot carry transforms.
pub fn compute_world_transform(stage: &Stage, id: NodeId, time: TimeCode) -> Result<DMat4> {
    transformable(stage, id)?;
    Ok(world_matrix(stage, id, time, None, &mut Vec::new()))
}

/// Product of the node's own ops.
pub fn local_transform(stage: &Stage, id: NodeId, time: TimeCode) -> Result<DMat4> {
    let node = transformable(stage, id)?;
    Ok(local_matrix(node, time, &mut Vec::new()))
}

/// World transform of the node's parent, or identity when the node resets
/// the xform stack.
pub fn parent_to_world(stage: &Stage, id: NodeId, time: TimeCode) -> Result<DMat4> {
    let node = transformable(stage, id)?;
    if node.resets_xform_stack() {
        return Ok(DMat4::IDENTITY);
    }
    Ok(match node.parent() {
        Some(parent) => world_matrix(stage, parent, time, None, &mut Vec::new()),
        None => DMat4::IDENTITY,
    })
}

/// Whether the world transform of a node may change over time: true when the
/// node or any inherited ancestor has an op with more than one time sample.
pub fn transform_might_be_time_varying(stage: &Stage, id: NodeId) -> Result<bool> {
    let mut cursor = Some(transformable(stage, id)?);
    while let Some(node) = cursor {
        if node.is_transformable() && node.ops().iter().any(|op| op.is_time_varying()) {
            return Ok(true);
        }
        if node.resets_xform_stack() {
            break;
        }
        cursor = node.parent().and_then(|p| stage.node(p));
    }
    Ok(false)
}
