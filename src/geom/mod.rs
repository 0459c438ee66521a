//! Transform op schema.
//!
//! - [`XformOp`] - One translate/rotate/scale/orient/matrix operation
//! - [`compose_ops`] - Local matrix of an ordered op stack

pub mod xform;

pub use xform::{compose_ops, OpDefect, RotationOrder, XformOp, XformOpKind, XformOpType};
