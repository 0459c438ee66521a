//! Core layer - time codes, time-sampled values and the transform cache.
//!
//! This module provides:
//! - [`TimeCode`] - Default sentinel or numeric evaluation time
//! - [`TimeSamples`] - Default value plus interpolated time samples
//! - [`XformCache`] - World transforms memoized for one time code

mod time_code;
mod sample;
mod cache;

pub use time_code::TimeCode;
pub use sample::{Interpolate, SampleInterp, TimeSamples};
pub use cache::{XformCache, XformCacheKey};
