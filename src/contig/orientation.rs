#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::parser::ParseFieldError;

/// Orientation of a read or a contig placement relative to the
/// contig (or scaffold) coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum Orientation {
    Forward,
    Reverse,
}

impl Orientation {
    /// Parse an orientation from a single-element bytestring, where +
    /// is Forward, - is Reverse
    #[inline]
    pub fn from_bytes_plus_minus<T: AsRef<[u8]>>(bs: T) -> Option<Self> {
        match bs.as_ref() {
            b"+" => Some(Orientation::Forward),
            b"-" => Some(Orientation::Reverse),
            _ => None,
        }
    }

    #[inline]
    pub fn parse_error(opt: Option<Self>) -> Result<Self, ParseFieldError> {
        opt.ok_or(ParseFieldError::OrientationError)
    }

    #[inline]
    pub fn from_forward(forward: bool) -> Self {
        if forward {
            Orientation::Forward
        } else {
            Orientation::Reverse
        }
    }

    #[inline]
    pub fn is_forward(&self) -> bool {
        bool::from(*self)
    }

    #[inline]
    pub fn is_reverse(&self) -> bool {
        !bool::from(*self)
    }

    #[inline]
    pub fn flip(&self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reverse,
            Orientation::Reverse => Orientation::Forward,
        }
    }

    #[inline]
    pub fn write_plus_minus(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let sym = match self {
            Self::Forward => '+',
            Self::Reverse => '-',
        };
        write!(f, "{}", sym)
    }

    #[inline]
    pub fn write_sense(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let word = match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
        };
        write!(f, "{}", word)
    }
}

/// Default orientation is forward
impl Default for Orientation {
    #[inline]
    fn default() -> Orientation {
        Orientation::Forward
    }
}

/// Forward is true, reverse is false
impl From<Orientation> for bool {
    #[inline]
    fn from(o: Orientation) -> bool {
        match o {
            Orientation::Forward => true,
            Orientation::Reverse => false,
        }
    }
}

impl std::str::FromStr for Orientation {
    type Err = &'static str;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Orientation::from_bytes_plus_minus(s.as_bytes())
            .ok_or("Could not parse orientation (was not + or -)")
    }
}

/// `{}` maps `Forward` to "+" and `Reverse` to "-"; the alternate
/// flag, `{:#}`, spells out "forward" and "reverse".
///
/// # Examples
///
/// ```
/// use scaffold::contig::Orientation as O;
///
/// assert_eq!(&format!("{}", O::Forward), "+");
/// assert_eq!(&format!("{}", O::Reverse), "-");
/// assert_eq!(&format!("{:#}", O::Forward), "forward");
/// assert_eq!(&format!("{:#}", O::Reverse), "reverse");
/// ```
impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            self.write_sense(f)
        } else {
            self.write_plus_minus(f)
        }
    }
}

/// Which end of its template (subclone) a read was sequenced from.
/// The two reads of a template pair have different strands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    #[inline]
    pub fn from_bytes<T: AsRef<[u8]>>(bs: T) -> Option<Self> {
        match bs.as_ref() {
            b"F" => Some(Strand::Forward),
            b"R" => Some(Strand::Reverse),
            _ => None,
        }
    }

    #[inline]
    pub fn opposite(&self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Forward => write!(f, "F"),
            Strand::Reverse => write!(f, "R"),
        }
    }
}

/// One of the two ends of a contig
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum ContigEnd {
    Right,
    Left,
}

impl ContigEnd {
    pub const BOTH: [ContigEnd; 2] = [ContigEnd::Right, ContigEnd::Left];

    /// Right is 0, Left is 1
    #[inline]
    pub fn index(&self) -> u8 {
        match self {
            ContigEnd::Right => 0,
            ContigEnd::Left => 1,
        }
    }

    #[inline]
    pub fn as_char(&self) -> char {
        match self {
            ContigEnd::Right => 'R',
            ContigEnd::Left => 'L',
        }
    }
}
