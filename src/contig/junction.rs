use bytemuck::Contiguous;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use super::{ContigEnd, Orientation};

/// Encodes which end of contig A a bridge leaves from, and how the
/// mate read lies in contig B. The code is
/// `2 * (A-end index) + (1 if the mate is Forward in B)`, with the
/// right end of A at index 0.
///
/// "Same" junctions keep both contigs in the same relative
/// orientation, "Flip" junctions reverse B relative to A.
#[repr(u8)]
#[derive(
    Contiguous, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum Junction {
    RightSame = 0,
    RightFlip = 1,
    LeftFlip = 2,
    LeftSame = 3,
}

impl Junction {
    pub const ALL: [Junction; 4] = [
        Junction::RightSame,
        Junction::RightFlip,
        Junction::LeftFlip,
        Junction::LeftSame,
    ];

    pub fn new(end_a: ContigEnd, mate: Orientation) -> Self {
        use Junction::*;
        match (end_a, mate) {
            (ContigEnd::Right, Orientation::Reverse) => RightSame,
            (ContigEnd::Right, Orientation::Forward) => RightFlip,
            (ContigEnd::Left, Orientation::Reverse) => LeftFlip,
            (ContigEnd::Left, Orientation::Forward) => LeftSame,
        }
    }

    #[inline]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::from_integer(code)
    }

    #[inline]
    pub fn code(self) -> u8 {
        self.into_integer()
    }

    /// The end of contig A the bridge leaves from
    #[inline]
    pub fn end_a(self) -> ContigEnd {
        if self.code() < 2 {
            ContigEnd::Right
        } else {
            ContigEnd::Left
        }
    }

    /// The end of contig B the bridge arrives at
    #[inline]
    pub fn end_b(self) -> ContigEnd {
        if self.code() % 2 == 0 {
            ContigEnd::Left
        } else {
            ContigEnd::Right
        }
    }

    #[inline]
    pub fn is_left(self) -> bool {
        self.end_a() == ContigEnd::Left
    }

    /// True if B keeps the orientation of A when laid out
    #[inline]
    pub fn keeps_orientation(self) -> bool {
        matches!(self, Junction::RightSame | Junction::LeftSame)
    }

    /// The junction seen from contig B's side. RightSame and
    /// LeftSame trade places, the flips are their own mirror image.
    #[inline]
    pub fn swap(self) -> Self {
        use Junction::*;
        match self {
            RightSame => LeftSame,
            LeftSame => RightSame,
            other => other,
        }
    }

    /// Orientation of B given the orientation of an already placed A
    #[inline]
    pub fn orientation_b(self, a: Orientation) -> Orientation {
        if self.keeps_orientation() {
            a
        } else {
            a.flip()
        }
    }

    /// Whether B is laid out to the right of an already placed A
    #[inline]
    pub fn places_right(self, a: Orientation) -> bool {
        self.is_left() ^ a.is_forward()
    }

    pub fn end_string(self) -> &'static str {
        use Junction::*;
        match self {
            RightSame => "RL",
            RightFlip => "RR",
            LeftFlip => "LL",
            LeftSame => "LR",
        }
    }

    pub fn arrows(self) -> &'static str {
        use Junction::*;
        match self {
            RightSame => "---> --->",
            RightFlip => "---> <---",
            LeftFlip => "<--- --->",
            LeftSame => "<--- <---",
        }
    }
}

/// `{}` prints the numeric code used in bridge dumps, `{:#}` prints
/// the arrow picture of the two contigs.
impl std::fmt::Display for Junction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.arrows())
        } else {
            write!(f, "{}", self.code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Junction::*;
    use Orientation::*;

    #[test]
    fn codes_follow_end_and_mate_orientation() {
        assert_eq!(RightSame, Junction::new(ContigEnd::Right, Reverse));
        assert_eq!(RightFlip, Junction::new(ContigEnd::Right, Forward));
        assert_eq!(LeftFlip, Junction::new(ContigEnd::Left, Reverse));
        assert_eq!(LeftSame, Junction::new(ContigEnd::Left, Forward));

        for &end in ContigEnd::BOTH.iter() {
            for &mate in [Forward, Reverse].iter() {
                let expected = 2 * end.index() + mate.is_forward() as u8;
                assert_eq!(expected, Junction::new(end, mate).code());
            }
        }

        for (code, j) in Junction::ALL.iter().enumerate() {
            assert_eq!(code as u8, j.code());
            assert_eq!(Some(*j), Junction::from_code(code as u8));
        }
        assert_eq!(None, Junction::from_code(4));
    }

    #[test]
    fn swap_is_an_involution() {
        assert_eq!(LeftSame, RightSame.swap());
        assert_eq!(RightSame, LeftSame.swap());
        assert_eq!(RightFlip, RightFlip.swap());
        assert_eq!(LeftFlip, LeftFlip.swap());

        for j in Junction::ALL.iter() {
            assert_eq!(*j, j.swap().swap());
        }
    }

    #[test]
    fn placement_table() {
        // (junction, orientation of A) -> (orientation of B, B right of A)
        let table = [
            (RightSame, Forward, Forward, true),
            (RightSame, Reverse, Reverse, false),
            (RightFlip, Forward, Reverse, true),
            (RightFlip, Reverse, Forward, false),
            (LeftFlip, Forward, Reverse, false),
            (LeftFlip, Reverse, Forward, true),
            (LeftSame, Forward, Forward, false),
            (LeftSame, Reverse, Reverse, true),
        ];

        for &(j, a, b, right) in table.iter() {
            assert_eq!(b, j.orientation_b(a), "{:?} {:?}", j, a);
            assert_eq!(right, j.places_right(a), "{:?} {:?}", j, a);
        }
    }

    #[test]
    fn ends_and_display() {
        assert_eq!(ContigEnd::Right, RightFlip.end_a());
        assert_eq!(ContigEnd::Right, RightFlip.end_b());
        assert_eq!(ContigEnd::Left, LeftFlip.end_a());
        assert_eq!(ContigEnd::Left, LeftFlip.end_b());
        assert_eq!("LR", LeftSame.end_string());

        assert_eq!("1", format!("{}", RightFlip));
        assert_eq!("<--- --->", format!("{:#}", LeftFlip));
    }
}
