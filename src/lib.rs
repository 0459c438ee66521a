//! # xform-eval
//!
//! World-space transform evaluation for scene hierarchies.
//!
//! Nodes carry ordered, possibly time-sampled transform ops (translate,
//! rotate, scale, orient, matrix). World transforms are composed from the root
//! down, optionally through a per-batch cache, and decomposed into
//! translation, rotation and scale.
//!
//! ## Modules
//!
//! - [`util`] - Errors, glam re-exports, matrix decomposition
//! - [`core`] - Time codes, time-sampled values, the transform cache
//! - [`geom`] - Transform ops
//! - [`scene`] - Node arena and paths
//! - [`compose`] - Local-to-world composition
//! - [`query`] - World position / components queries
//! - [`config`] - Persistent CLI settings
//!
//! ## Example
//!
//! ```
//! use xform_eval::prelude::*;
//!
//! let mut stage = Stage::new();
//! let parent = stage.define("/World/Parent", NodeKind::Xform)?;
//! stage.add_op(parent, XformOp::translate(DVec3::new(100.0, 0.0, 0.0)))?;
//! let child = stage.define("/World/Parent/Child", NodeKind::Geometry)?;
//! stage.add_op(child, XformOp::translate(DVec3::new(0.0, 50.0, 0.0)))?;
//!
//! let positions = world_positions_batch(&stage, &[parent, child], TimeCode::Default);
//! assert_eq!(positions[1], DVec3::new(100.0, 50.0, 0.0));
//! # Ok::<(), xform_eval::Error>(())
//! ```

pub mod util;
pub mod core;
pub mod geom;
pub mod scene;
pub mod compose;
pub mod query;
pub mod config;

// Re-export commonly used types
pub use util::{Error, Result};
pub use compose::Diagnostic;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{DMat4, DQuat, DVec3, Error, Result, Rotation};
    pub use crate::core::{TimeCode, TimeSamples, XformCache};
    pub use crate::geom::{RotationOrder, XformOp};
    pub use crate::scene::{Node, NodeId, NodeKind, NodePath, Stage};
    pub use crate::compose::{
        compute_world_transform, local_transform, parent_to_world,
        transform_might_be_time_varying, Diagnostic,
    };
    pub use crate::query::{
        world_position, world_positions_batch, world_positions_par,
        world_transform_components, BatchQuery, TransformComponents,
    };
}
