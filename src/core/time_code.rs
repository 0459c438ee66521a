//! Time codes for evaluating time-sampled values.
//!
//! A [`TimeCode`] is either the distinguished `Default` time, which selects
//! the non-animated default value of a property, or a numeric time. Time codes
//! are totally ordered (`Default` sorts before every numeric time) and hashable
//! so they can key the transform cache.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Time at which transforms are evaluated.
#[derive(Clone, Copy, Debug, Default)]
pub enum TimeCode {
    /// Selects authored default values instead of time samples.
    #[default]
    Default,
    /// A time on the sample timeline.
    At(f64),
}

impl TimeCode {
    /// The default time code.
    pub const DEFAULT: Self = Self::Default;

    /// Create a numeric time code.
    #[inline]
    pub const fn at(time: f64) -> Self {
        Self::At(time)
    }

    /// Check if this is the default time code.
    #[inline]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Numeric value, or `None` for the default time code.
    #[inline]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Default => None,
            Self::At(t) => Some(*t),
        }
    }

    /// Numeric value with `-0.0` folded into `0.0` so equal times hash equally.
    #[inline]
    fn normalized(&self) -> Option<f64> {
        self.value().map(|t| if t == 0.0 { 0.0 } else { t })
    }
}

impl PartialEq for TimeCode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeCode {}

impl PartialOrd for TimeCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeCode {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.normalized(), other.normalized()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.total_cmp(&b),
        }
    }
}

impl Hash for TimeCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().map(f64::to_bits).hash(state);
    }
}

impl From<f64> for TimeCode {
    fn from(time: f64) -> Self {
        Self::At(time)
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "DEFAULT"),
            Self::At(t) => write!(f, "{}", t),
        }
    }
}
