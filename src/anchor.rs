use bytemuck::{Pod, Zeroable};

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::gfa::Orientation;

pub const ANCHOR_TANDEM: u64 = 1 << 42;
pub const ANCHOR_KEPT: u64 = 1 << 43;
pub const ANCHOR_SEG_SHIFT: u32 = 48;
pub const ANCHOR_WT_SHIFT: u32 = 56;

/// A minimizer hit: the query k-mer ending at `qpos` matches the
/// target k-mer ending at `tpos` on strand `strand` of segment
/// `target`. On the reverse strand `tpos` is measured from the end of
/// the segment, so that anchors of a colinear reverse hit still
/// increase on both axes.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Anchor {
    pub target: u32,
    pub strand: Orientation,
    pub tpos: i32,
    pub qpos: u32,
    pub span: u8,
    pub seg: u8,
    pub tandem: bool,
    /// 255 is full weight
    pub weight: u8,
}

/// Position of the last base of a k-mer of length `span` ending at
/// `pos`, after reflecting it onto the other strand of a target of
/// length `len`.
#[inline]
pub fn reflect(len: u32, pos: u32, span: u32) -> i32 {
    len as i32 - (pos as i32 + 1 - span as i32) - 1
}

impl Anchor {
    /// Sort key along the reference: target, then strand, then
    /// position.
    #[inline]
    pub fn ref_key(&self) -> u64 {
        (self.target as u64) << 33 | (self.strand.bit() as u64) << 32 | self.tpos as u32 as u64
    }

    #[inline]
    pub fn query_key(&self) -> u64 {
        (self.span as u64) << 32 | self.qpos as u64
    }

    /// Start of the matching k-mer on the query.
    #[inline]
    pub fn qstart(&self) -> i64 {
        self.qpos as i64 + 1 - self.span as i64
    }

    pub fn pack(&self) -> PackedAnchor {
        let mut y = (self.weight as u64) << ANCHOR_WT_SHIFT
            | (self.seg as u64) << ANCHOR_SEG_SHIFT
            | self.query_key();
        if self.tandem {
            y |= ANCHOR_TANDEM;
        }
        PackedAnchor {
            x: self.ref_key(),
            y,
        }
    }

    pub fn unpack(p: PackedAnchor) -> Self {
        Anchor {
            target: (p.x >> 33) as u32,
            strand: Orientation::from_bit((p.x >> 32) as u32),
            tpos: p.x as u32 as i32,
            qpos: p.y as u32,
            span: (p.y >> 32) as u8,
            seg: (p.y >> ANCHOR_SEG_SHIFT) as u8,
            tandem: p.y & ANCHOR_TANDEM != 0,
            weight: (p.y >> ANCHOR_WT_SHIFT) as u8,
        }
    }
}

/// Two-word anchor layout for chaining code that works on raw
/// integers: `x = target << 33 | strand << 32 | tpos`, and `y` holds
/// weight (bits 56..64), query segment (48..56), flags, span (32..40)
/// and query position.
#[repr(C)]
#[derive(Zeroable, Pod, Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackedAnchor {
    pub x: u64,
    pub y: u64,
}

impl From<PackedAnchor> for [u64; 2] {
    fn from(p: PackedAnchor) -> Self {
        bytemuck::cast(p)
    }
}

impl From<[u64; 2]> for PackedAnchor {
    fn from(words: [u64; 2]) -> Self {
        bytemuck::cast(words)
    }
}

/// View packed anchors as the flat word array chaining kernels take.
pub fn as_words(anchors: &[PackedAnchor]) -> &[u64] {
    bytemuck::cast_slice(anchors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflection_onto_the_reverse_strand() {
        assert_eq!(reflect(100, 40, 5), 63);
        // a k-mer covering the first bases ends at the last base
        // once reflected
        assert_eq!(reflect(100, 4, 5), 99);
        assert_eq!(reflect(100, 99, 5), 4);
    }

    #[test]
    fn packed_layout() {
        let a = Anchor {
            target: 3,
            strand: Orientation::Backward,
            tpos: 63,
            qpos: 17,
            span: 15,
            seg: 1,
            tandem: true,
            weight: 200,
        };
        let p = a.pack();
        assert_eq!(p.x, 3 << 33 | 1 << 32 | 63);
        assert_eq!(p.y & ANCHOR_TANDEM, ANCHOR_TANDEM);
        assert_eq!(p.y & ANCHOR_KEPT, 0);
        assert_eq!(p.y >> ANCHOR_WT_SHIFT, 200);
        assert_eq!(Anchor::unpack(p), a);

        let words: [u64; 2] = p.into();
        assert_eq!(words, [p.x, p.y]);
        assert_eq!(as_words(&[p, p]).len(), 4);
    }

    #[test]
    fn reference_order_groups_strands() {
        let f = Anchor {
            target: 2,
            tpos: 900,
            ..Default::default()
        };
        let r = Anchor {
            target: 2,
            strand: Orientation::Backward,
            tpos: 1,
            ..Default::default()
        };
        let next = Anchor {
            target: 3,
            tpos: 0,
            ..Default::default()
        };
        assert!(f.ref_key() < r.ref_key());
        assert!(r.ref_key() < next.ref_key());
    }
}
