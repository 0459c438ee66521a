//! Utility types shared by the evaluator.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam plus matrix decomposition helpers

mod error;
mod math;

pub use error::*;
pub use math::*;
