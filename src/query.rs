//! World position queries.
//!
//! The three entry points collapse "make the node transformable, compute the
//! world matrix, extract the piece you want" into one call:
//!
//! - [`world_position`] - translation of one node, fails on non-transformable nodes
//! - [`world_positions_batch`] - many nodes sharing one cache, never fails
//! - [`world_transform_components`] - translation, rotation and scale of one node
//!
//! ## Example
//!
//! ```
//! use xform_eval::prelude::*;
//!
//! let mut stage = Stage::new();
//! let cube = stage.define("/World/Cube", NodeKind::Geometry)?;
//! stage.add_op(cube, XformOp::translate(DVec3::new(10.0, 5.0, 0.0)))?;
//!
//! let position = world_position(&stage, cube, TimeCode::Default)?;
//! assert_eq!(position, DVec3::new(10.0, 5.0, 0.0));
//! # Ok::<(), xform_eval::Error>(())
//! ```

use rayon::prelude::*;

use crate::compose::{self, report, world_matrix, Diagnostic};
use crate::core::{TimeCode, XformCache};
use crate::scene::{NodeId, Stage};
use crate::util::{extract_rotation, extract_scale, extract_translation, DMat4, DVec3, Result, Rotation};

/// Nodes per worker in [`world_positions_par`].
const PAR_CHUNK_SIZE: usize = 256;

/// Decomposed world transform.
///
/// `scale` is the length of each basis vector, so shear is discarded and
/// mirroring shows up as a positive scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformComponents {
    pub translation: DVec3,
    pub rotation: Rotation,
    pub scale: DVec3,
}

impl TransformComponents {
    /// Decompose an affine matrix.
    pub fn from_matrix(m: &DMat4) -> Self {
        Self {
            translation: extract_translation(m),
            rotation: extract_rotation(m),
            scale: extract_scale(m),
        }
    }
}

/// World-space position of a node.
pub fn world_position(stage: &Stage, id: NodeId, time: TimeCode) -> Result<DVec3> {
    let world = compose::compute_world_transform(stage, id, time)?;
    Ok(extract_translation(&world))
}

/// World-space translation, rotation and scale of a node.
pub fn world_transform_components(
    stage: &Stage,
    id: NodeId,
    time: TimeCode,
) -> Result<TransformComponents> {
    let world = compose::compute_world_transform(stage, id, time)?;
    Ok(TransformComponents::from_matrix(&world))
}

/// World-space positions of many nodes at one time.
///
/// The output has one entry per input id, in order. Nodes that are not
/// transformable or not part of the stage get a zero vector and a warning.
#[tracing::instrument(skip_all, fields(count = ids.len(), %time))]
pub fn world_positions_batch(stage: &Stage, ids: &[NodeId], time: TimeCode) -> Vec<DVec3> {
    BatchQuery::new(stage, time).positions(ids)
}

/// [`world_positions_batch`] split across the rayon pool.
///
/// Each chunk gets its own cache; the stage is only read. The result is
/// identical to the sequential batch.
#[tracing::instrument(skip_all, fields(count = ids.len(), %time))]
pub fn world_positions_par(stage: &Stage, ids: &[NodeId], time: TimeCode) -> Vec<DVec3> {
    ids.par_chunks(PAR_CHUNK_SIZE)
        .flat_map_iter(|chunk| BatchQuery::new(stage, time).positions(chunk))
        .collect()
}

/// A batch of queries at one time code sharing one [`XformCache`].
///
/// Diagnostics raised while evaluating are logged and kept for inspection.
pub struct BatchQuery<'a> {
    stage: &'a Stage,
    cache: XformCache,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> BatchQuery<'a> {
    /// Start a batch on `stage` at `time` with an empty cache.
    pub fn new(stage: &'a Stage, time: TimeCode) -> Self {
        Self {
            stage,
            cache: XformCache::new(time),
            diagnostics: Vec::new(),
        }
    }

    /// Time code of this batch.
    #[inline]
    pub fn time(&self) -> TimeCode {
        self.cache.time()
    }

    /// Move the batch to another time code. Cached transforms from the old
    /// time are dropped; diagnostics are kept.
    pub fn set_time(&mut self, time: TimeCode) {
        self.cache.set_time(time);
    }

    /// World transform of one node, or `None` (with a diagnostic) when the
    /// node is unknown or not transformable.
    pub fn world_transform(&mut self, id: NodeId) -> Option<DMat4> {
        let Some(node) = self.stage.node(id) else {
            report(&mut self.diagnostics, Diagnostic::UnknownNode { id });
            return None;
        };
        if !node.is_transformable() {
            let path = node.path().to_string();
            report(&mut self.diagnostics, Diagnostic::NotTransformable { path });
            return None;
        }
        let time = self.cache.time();
        Some(world_matrix(self.stage, id, time, Some(&mut self.cache), &mut self.diagnostics))
    }

    /// World position of one node, zero when it cannot be evaluated.
    pub fn world_position(&mut self, id: NodeId) -> DVec3 {
        self.world_transform(id)
            .map(|m| extract_translation(&m))
            .unwrap_or(DVec3::ZERO)
    }

    /// World positions of `ids`, in order.
    pub fn positions(&mut self, ids: &[NodeId]) -> Vec<DVec3> {
        ids.iter().map(|&id| self.world_position(id)).collect()
    }

    /// Decomposed world transforms of `ids`, in order. Entries that cannot
    /// be evaluated are `None`.
    pub fn components(&mut self, ids: &[NodeId]) -> Vec<Option<TransformComponents>> {
        ids.iter()
            .map(|&id| self.world_transform(id).map(|m| TransformComponents::from_matrix(&m)))
            .collect()
    }

    /// Diagnostics raised so far.
    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The batch cache.
    #[inline]
    pub fn cache(&self) -> &XformCache {
        &self.cache
    }
}
