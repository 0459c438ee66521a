//! Time-sampled values.
//!
//! A [`TimeSamples`] holds an optional default value plus a list of
//! `(time, value)` samples kept sorted by time. Evaluation at a numeric time
//! interpolates linearly between the bracketing samples and holds the boundary
//! sample outside the sampled range. The default time code selects the default
//! value when one is authored, otherwise the earliest sample.

use crate::core::TimeCode;
use crate::util::{DMat4, DQuat, DVec3, Error, Result};

/// Values that can be blended between two samples.
pub trait Interpolate: Copy {
    /// Blend `a` towards `b` by `alpha` in `[0, 1]`.
    fn interpolate(a: Self, b: Self, alpha: f64) -> Self;
}

impl Interpolate for f64 {
    #[inline]
    fn interpolate(a: Self, b: Self, alpha: f64) -> Self {
        a + (b - a) * alpha
    }
}

impl Interpolate for DVec3 {
    #[inline]
    fn interpolate(a: Self, b: Self, alpha: f64) -> Self {
        a.lerp(b, alpha)
    }
}

/// Quaternions blend along the shortest arc.
impl Interpolate for DQuat {
    #[inline]
    fn interpolate(a: Self, b: Self, alpha: f64) -> Self {
        a.normalize().slerp(b.normalize(), alpha)
    }
}

/// Matrices blend component-wise.
impl Interpolate for DMat4 {
    #[inline]
    fn interpolate(a: Self, b: Self, alpha: f64) -> Self {
        a * (1.0 - alpha) + b * alpha
    }
}

/// Result of sample interpolation query.
#[derive(Clone, Copy, Debug)]
pub struct SampleInterp {
    /// Floor sample index.
    pub floor_index: usize,
    /// Ceil sample index.
    pub ceil_index: usize,
    /// Interpolation factor (0.0 = floor, 1.0 = ceil).
    pub alpha: f64,
}

impl SampleInterp {
    /// Create for exact sample (no interpolation needed).
    pub fn exact(index: usize) -> Self {
        Self {
            floor_index: index,
            ceil_index: index,
            alpha: 0.0,
        }
    }

    /// Create for interpolation between two samples.
    pub fn lerp(floor: usize, ceil: usize, alpha: f64) -> Self {
        Self {
            floor_index: floor,
            ceil_index: ceil,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Check if this is an exact sample (no interpolation).
    pub fn is_exact(&self) -> bool {
        self.floor_index == self.ceil_index || self.alpha == 0.0
    }
}

/// A default value and/or time samples for one op payload.
///
/// Never empty: every constructor stores at least one value.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSamples<T> {
    default: Option<T>,
    samples: Vec<(f64, T)>,
}

impl<T: Interpolate> TimeSamples<T> {
    /// A value with only a default, constant over time.
    pub fn constant(value: T) -> Self {
        Self {
            default: Some(value),
            samples: Vec::new(),
        }
    }

    /// Build from `(time, value)` pairs in any order.
    ///
    /// Times must be finite. When a time repeats, the later pair wins.
    pub fn from_samples(samples: impl IntoIterator<Item = (f64, T)>) -> Result<Self> {
        let mut out = Self {
            default: None,
            samples: Vec::new(),
        };
        for (time, value) in samples {
            out.set(time, value)?;
        }
        if out.samples.is_empty() {
            return Err(Error::EmptySamples);
        }
        Ok(out)
    }

    /// Set the default value alongside the time samples.
    pub fn with_default(mut self, value: T) -> Self {
        self.default = Some(value);
        self
    }

    /// Author a sample at `time`, replacing any sample already there.
    pub fn set(&mut self, time: f64, value: T) -> Result<()> {
        if !time.is_finite() {
            return Err(Error::InvalidSampleTime(time));
        }
        let idx = self.samples.partition_point(|(t, _)| *t < time);
        match self.samples.get_mut(idx) {
            Some(slot) if slot.0 == time => slot.1 = value,
            _ => self.samples.insert(idx, (time, value)),
        }
        Ok(())
    }

    /// The authored default value, if any.
    #[inline]
    pub fn default_value(&self) -> Option<T> {
        self.default
    }

    /// Authored time samples, sorted by time.
    #[inline]
    pub fn samples(&self) -> &[(f64, T)] {
        &self.samples
    }

    /// Number of time samples (the default value is not counted).
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    /// More than one time sample means the value can change over time.
    #[inline]
    pub fn is_time_varying(&self) -> bool {
        self.samples.len() > 1
    }

    /// Find the bracketing samples for a numeric time.
    ///
    /// Times before the first or after the last sample clamp to that sample.
    pub fn interp(&self, time: f64) -> SampleInterp {
        let n = self.samples.len();
        let idx = self.samples.partition_point(|(t, _)| *t <= time);
        if idx == 0 || n == 0 {
            return SampleInterp::exact(0);
        }
        if idx >= n {
            return SampleInterp::exact(n - 1);
        }

        let floor = idx - 1;
        let (t0, t1) = (self.samples[floor].0, self.samples[idx].0);
        if time == t0 {
            return SampleInterp::exact(floor);
        }
        SampleInterp::lerp(floor, idx, (time - t0) / (t1 - t0))
    }

    /// Evaluate at a time code.
    pub fn eval(&self, time: TimeCode) -> T {
        let first = self.samples.first().map(|(_, v)| *v);
        match (time.value(), first) {
            // Default only, or default time requested
            (None, _) | (Some(_), None) => match (self.default, first) {
                (Some(v), _) | (None, Some(v)) => v,
                (None, None) => unreachable!("TimeSamples is never empty"),
            },
            (Some(t), Some(_)) => {
                let interp = self.interp(t);
                let a = self.samples[interp.floor_index].1;
                if interp.is_exact() {
                    a
                } else {
                    T::interpolate(a, self.samples[interp.ceil_index].1, interp.alpha)
                }
            }
        }
    }
}

impl<T: Interpolate> From<T> for TimeSamples<T> {
    fn from(value: T) -> Self {
        Self::constant(value)
    }
}
