#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Running minimum and maximum of the gap sizes observed for a
/// bridge. Empty until the first observation is folded in.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct GapRange {
    bounds: Option<(i64, i64)>,
}

impl GapRange {
    pub fn new() -> Self {
        Default::default()
    }

    /// A range holding a single observation
    pub fn from_gap(gap: i64) -> Self {
        GapRange {
            bounds: Some((gap, gap)),
        }
    }

    pub fn add(&mut self, gap: i64) {
        self.bounds = match self.bounds {
            None => Some((gap, gap)),
            Some((min, max)) => Some((min.min(gap), max.max(gap))),
        };
    }

    /// Fold all observations of another range into this one
    pub fn merge(&mut self, other: &GapRange) {
        if let Some((min, max)) = other.bounds {
            self.add(min);
            self.add(max);
        }
    }

    #[inline]
    pub fn min(&self) -> Option<i64> {
        self.bounds.map(|(min, _)| min)
    }

    #[inline]
    pub fn max(&self) -> Option<i64> {
        self.bounds.map(|(_, max)| max)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }
}

/// Formats as `min:max`, or `*` if nothing has been observed.
impl std::fmt::Display for GapRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.bounds {
            Some((min, max)) => write!(f, "{}:{}", min, max),
            None => write!(f, "*"),
        }
    }
}
