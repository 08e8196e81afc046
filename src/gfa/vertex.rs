#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use super::Orientation;

/// An oriented segment, i.e. one of the two strands of a segment.
/// Stored as `segment << 1 | strand` so that both strands of a
/// segment are adjacent when vertices are sorted.
#[repr(transparent)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Vertex(u32);

impl Vertex {
    #[inline]
    pub fn new(seg: u32, orient: Orientation) -> Self {
        Vertex(seg << 1 | orient.bit())
    }

    #[inline]
    pub fn forward(seg: u32) -> Self {
        Self::new(seg, Orientation::Forward)
    }

    #[inline]
    pub fn backward(seg: u32) -> Self {
        Self::new(seg, Orientation::Backward)
    }

    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        Vertex(raw)
    }

    #[inline]
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Index into a vector holding one entry per vertex.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn seg(&self) -> u32 {
        self.0 >> 1
    }

    #[inline]
    pub fn orient(&self) -> Orientation {
        Orientation::from_bit(self.0)
    }

    #[inline]
    pub fn is_reverse(&self) -> bool {
        self.orient().is_reverse()
    }

    /// The same segment on the other strand.
    #[inline]
    pub fn flip(&self) -> Self {
        Vertex(self.0 ^ 1)
    }
}

/// Displays the segment index followed by the orientation, e.g.
/// `12+`, or `>12` with the alternate flag.
impl std::fmt::Display for Vertex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            write!(f, "{:#}{}", self.orient(), self.seg())
        } else {
            write!(f, "{}{}", self.seg(), self.orient())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_packing() {
        let v = Vertex::backward(7);
        assert_eq!(v.raw(), 15);
        assert_eq!(v.seg(), 7);
        assert!(v.is_reverse());
        assert_eq!(v.flip(), Vertex::forward(7));
        assert_eq!(v.flip().flip(), v);
        assert_eq!(format!("{}", v), "7-");
        assert_eq!(format!("{:#}", v.flip()), ">7");
    }
}
