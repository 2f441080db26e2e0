//! Records the scaffolder reads from its repositories: contigs,
//! templates and read placements.

pub mod junction;
pub mod orientation;

pub use self::junction::*;
pub use self::orientation::*;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

pub type ContigId = u32;
pub type ReadId = u32;
pub type TemplateId = u32;

/// An assembled contig. Only the identity and length matter here;
/// the length is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Contig {
    pub id: ContigId,
    pub length: i64,
}

impl Contig {
    /// Returns None if the length is less than 1
    pub fn new(id: ContigId, length: i64) -> Option<Self> {
        if length < 1 {
            None
        } else {
            Some(Contig { id, length })
        }
    }
}

/// Expected insert size range [silow, sihigh] of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct InsertSize {
    pub low: i64,
    pub high: i64,
}

impl InsertSize {
    /// Returns None unless `high >= low >= 0`
    pub fn new(low: i64, high: i64) -> Option<Self> {
        if low < 0 || high < low {
            None
        } else {
            Some(InsertSize { low, high })
        }
    }
}

/// A read placed near one end of the contig being expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct EndRead {
    pub read: ReadId,
    pub start: i64,
    pub finish: i64,
    pub orientation: Orientation,
}

/// Placement of a read on a current contig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct ContigMapping {
    pub contig: ContigId,
    pub start: i64,
    pub finish: i64,
    pub orientation: Orientation,
}

impl ContigMapping {
    pub fn as_end_read(&self, read: ReadId) -> EndRead {
        EndRead {
            read,
            start: self.start,
            finish: self.finish,
            orientation: self.orientation,
        }
    }
}

/// The part of a contig searched for end reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadWindow {
    /// Reads whose start lies strictly above the offset
    StartAbove(i64),
    /// Reads whose finish lies strictly below the offset
    FinishBelow(i64),
}

impl ReadWindow {
    /// The window in which reads can bridge out of the given end,
    /// when no template is longer than `puc_limit`
    pub fn at_end(contig: &Contig, end: ContigEnd, puc_limit: i64) -> Self {
        match end {
            ContigEnd::Right => ReadWindow::StartAbove(contig.length.saturating_sub(puc_limit)),
            ContigEnd::Left => ReadWindow::FinishBelow(puc_limit),
        }
    }

    pub fn contains(&self, start: i64, finish: i64) -> bool {
        match *self {
            ReadWindow::StartAbove(limit) => start > limit,
            ReadWindow::FinishBelow(limit) => finish < limit,
        }
    }
}

impl ContigEnd {
    /// Reads pointing out of this end: Forward reads at the right
    /// end, Reverse reads at the left end
    #[inline]
    pub fn outward(&self) -> Orientation {
        match self {
            ContigEnd::Right => Orientation::Forward,
            ContigEnd::Left => Orientation::Reverse,
        }
    }
}
