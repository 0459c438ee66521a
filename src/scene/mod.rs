//! Scene hierarchy.
//!
//! - [`Stage`] - Arena of nodes rooted at `/`
//! - [`Node`] / [`NodeId`] / [`NodeKind`] - Hierarchy entries
//! - [`NodePath`] - Validated absolute paths

mod node;
mod path;
mod stage;

pub use node::{Node, NodeId, NodeKind};
pub use path::NodePath;
pub use stage::Stage;
